//! Trait Interface Definitions for the `did:ssid` node JSON-RPC

use ethers::types::Address;
use jsonrpsee::{core::SubscriptionResult, proc_macros::rpc, types::ErrorObjectOwned};

use crate::{
    connection::{MetaError, ModuleIndex, SignedCall, TxEvent},
    types::{DidRecord, FixedHex, PreviousKey},
};

/// Ledger JSON-RPC Interface Methods
#[rpc(server, client, namespace = "did")]
pub trait NodeApi {
    #[method(name = "dIDs")]
    async fn dids(&self, did: FixedHex) -> Result<Option<DidRecord>, ErrorObjectOwned>;

    #[method(name = "lookup")]
    async fn lookup(&self, did: FixedHex) -> Result<Option<Address>, ErrorObjectOwned>;

    #[method(name = "rLookup")]
    async fn r_lookup(&self, account: Address) -> Result<FixedHex, ErrorObjectOwned>;

    #[method(name = "prevKeys")]
    async fn prev_keys(&self, did: FixedHex) -> Result<Vec<PreviousKey>, ErrorObjectOwned>;

    #[method(name = "validators")]
    async fn validators(&self) -> Result<Vec<FixedHex>, ErrorObjectOwned>;

    #[method(name = "metaError")]
    async fn meta_error(&self, index: ModuleIndex) -> Result<MetaError, ErrorObjectOwned>;

    /// Submit a signed call, notifying every status change until the call is final
    #[subscription(name = "submitAndWatch" => "txStatus", unsubscribe = "unwatch", item = TxEvent)]
    async fn submit_and_watch(&self, call: SignedCall) -> SubscriptionResult;
}
