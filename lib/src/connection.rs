//! Chain connection collaborator.
//!
//! [`ChainConnection`] is everything the core needs from a ledger: the `did` module's storage
//! queries, the validator set, signed call submission with a status stream, and the error
//! registry used to decode module errors. Two implementations ship with the crate:
//! [`RpcConnection`] talks to a node over JSON-RPC, [`DevLedger`] is an in-memory ledger for
//! development and tests.

mod call;
mod dev;
mod rpc;

use std::{fmt, str::FromStr, sync::Arc};

use async_trait::async_trait;
use ethers::types::{Address, H256};
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use url::Url;

pub use call::*;
pub use dev::*;
pub use rpc::*;

use crate::{
    error::ConnectionError,
    types::{DidRecord, FixedHex, PreviousKey},
};

/// Endpoint of a node running on the local machine
pub const LOCAL_ENDPOINT: &str = "ws://127.0.0.1:9944";

/// Stream of status events for a submitted call
pub type TxStatusStream = BoxStream<'static, Result<TxEvent, ConnectionError>>;

/// Access to a `did:ssid` ledger
#[async_trait]
pub trait ChainConnection: Send + Sync {
    /// `did.dIDs`: the record stored for a DID
    async fn did(&self, did: &FixedHex) -> Result<Option<DidRecord>, ConnectionError>;

    /// `did.lookup`: the account a DID is bound to
    async fn lookup(&self, did: &FixedHex) -> Result<Option<Address>, ConnectionError>;

    /// `did.rLookup`: the DID bound to an account, or [`FixedHex::null`] if there is none
    async fn reverse_lookup(&self, account: Address) -> Result<FixedHex, ConnectionError>;

    /// `did.prevKeys`: keys replaced by rotation, oldest first
    async fn previous_keys(&self, did: &FixedHex) -> Result<Vec<PreviousKey>, ConnectionError>;

    /// `validatorSet.members`
    async fn validators(&self) -> Result<Vec<FixedHex>, ConnectionError>;

    /// Submit a signed call and follow its status
    async fn submit_and_watch(&self, call: SignedCall) -> Result<TxStatusStream, ConnectionError>;

    /// Look up a module error in the chain's error registry
    async fn find_meta_error(&self, index: ModuleIndex) -> Result<MetaError, ConnectionError>;
}

#[async_trait]
impl<T: ChainConnection + ?Sized> ChainConnection for Arc<T> {
    async fn did(&self, did: &FixedHex) -> Result<Option<DidRecord>, ConnectionError> {
        (**self).did(did).await
    }

    async fn lookup(&self, did: &FixedHex) -> Result<Option<Address>, ConnectionError> {
        (**self).lookup(did).await
    }

    async fn reverse_lookup(&self, account: Address) -> Result<FixedHex, ConnectionError> {
        (**self).reverse_lookup(account).await
    }

    async fn previous_keys(&self, did: &FixedHex) -> Result<Vec<PreviousKey>, ConnectionError> {
        (**self).previous_keys(did).await
    }

    async fn validators(&self) -> Result<Vec<FixedHex>, ConnectionError> {
        (**self).validators().await
    }

    async fn submit_and_watch(&self, call: SignedCall) -> Result<TxStatusStream, ConnectionError> {
        (**self).submit_and_watch(call).await
    }

    async fn find_meta_error(&self, index: ModuleIndex) -> Result<MetaError, ConnectionError> {
        (**self).find_meta_error(index).await
    }
}

/// Transaction pool and block status of a submitted call
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TxStatus {
    Ready,
    Broadcast,
    InBlock(H256),
    Retracted(H256),
    Finalized(H256),
    Usurped(H256),
    Dropped,
    Invalid,
}

/// One event of a [`TxStatusStream`]. A dispatch error is reported alongside the status of the
/// block the call was executed in.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TxEvent {
    pub status: TxStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dispatch_error: Option<DispatchError>,
}

impl From<TxStatus> for TxEvent {
    fn from(status: TxStatus) -> Self {
        Self {
            status,
            dispatch_error: None,
        }
    }
}

/// Position of an error in the chain's error registry
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleIndex {
    pub index: u8,
    pub error: u8,
}

/// Why a call failed to dispatch
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DispatchError {
    Module(ModuleIndex),
    Other(String),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::Module(ModuleIndex { index, error }) => {
                write!(f, "Module {{ index: {}, error: {} }}", index, error)
            }
            DispatchError::Other(other) => write!(f, "{}", other),
        }
    }
}

/// A decoded module error
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MetaError {
    pub section: String,
    pub name: String,
    pub docs: Vec<String>,
}

impl MetaError {
    pub fn documentation(&self) -> String {
        self.docs.join(" ")
    }
}

/// The network to connect to: a node on the local machine, or any WebSocket endpoint
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Network {
    #[default]
    Local,
    Custom(Url),
}

impl Network {
    pub fn endpoint(&self) -> Url {
        match self {
            Network::Local => Url::parse(LOCAL_ENDPOINT).expect("static url is valid"),
            Network::Custom(url) => url.clone(),
        }
    }
}

impl FromStr for Network {
    type Err = ConnectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("local") {
            return Ok(Network::Local);
        }
        let url = Url::parse(s).map_err(|_| ConnectionError::UnsupportedNetwork(s.to_string()))?;
        match url.scheme() {
            "ws" | "wss" => Ok(Network::Custom(url)),
            _ => Err(ConnectionError::UnsupportedNetwork(s.to_string())),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Local => write!(f, "local"),
            Network::Custom(url) => write!(f, "{}", url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_from_str() {
        assert_eq!(Network::from_str("local").unwrap(), Network::Local);
        assert_eq!(Network::from_str("LOCAL").unwrap(), Network::Local);
        assert_eq!(
            Network::from_str("wss://node.example:443").unwrap().endpoint(),
            Url::parse("wss://node.example:443").unwrap()
        );
        assert_eq!(
            Network::from_str("http://node.example"),
            Err(ConnectionError::UnsupportedNetwork(
                "http://node.example".into()
            ))
        );
        assert!(Network::from_str("mainnet").is_err());
        assert_eq!(Network::Local.endpoint().as_str(), "ws://127.0.0.1:9944/");
    }

    #[test]
    fn test_tx_event_serialization() {
        let event = TxEvent {
            status: TxStatus::InBlock(H256::zero()),
            dispatch_error: Some(DispatchError::Module(ModuleIndex { index: 9, error: 1 })),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json["status"]["inBlock"],
            "0x0000000000000000000000000000000000000000000000000000000000000000"
        );
        assert_eq!(json["dispatchError"]["module"]["index"], 9);
        let back: TxEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);

        let ready = serde_json::to_value(TxEvent::from(TxStatus::Ready)).unwrap();
        assert_eq!(ready, serde_json::json!({ "status": "ready" }));
    }

    #[test]
    fn test_dispatch_error_display() {
        assert_eq!(
            DispatchError::Module(ModuleIndex { index: 9, error: 1 }).to_string(),
            "Module { index: 9, error: 1 }"
        );
        assert_eq!(
            DispatchError::Other("BadOrigin".into()).to_string(),
            "BadOrigin"
        );
    }
}
