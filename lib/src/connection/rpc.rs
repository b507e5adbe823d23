//! [`ChainConnection`] over a node's JSON-RPC WebSocket endpoint.

use async_trait::async_trait;
use ethers::types::Address;
use futures::StreamExt;
use jsonrpsee::ws_client::{WsClient, WsClientBuilder};

use super::{ChainConnection, MetaError, ModuleIndex, Network, SignedCall, TxStatusStream};
use crate::{
    error::ConnectionError,
    rpc::NodeApiClient,
    types::{DidRecord, FixedHex, PreviousKey},
};

fn transport<E: ToString>(err: E) -> ConnectionError {
    ConnectionError::Transport(err.to_string())
}

/// A connection to a node, speaking the [`NodeApi`](crate::rpc::NodeApiClient) JSON-RPC interface
pub struct RpcConnection {
    client: WsClient,
}

impl RpcConnection {
    /// Connect to the endpoint of `network`
    pub async fn connect(network: &Network) -> Result<Self, ConnectionError> {
        let endpoint = network.endpoint();
        log::debug!("Connecting to {network} at {endpoint}");
        let client = WsClientBuilder::default()
            .build(endpoint.as_str())
            .await
            .map_err(transport)?;
        Ok(Self { client })
    }
}

impl From<WsClient> for RpcConnection {
    fn from(client: WsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ChainConnection for RpcConnection {
    async fn did(&self, did: &FixedHex) -> Result<Option<DidRecord>, ConnectionError> {
        self.client.dids(did.clone()).await.map_err(transport)
    }

    async fn lookup(&self, did: &FixedHex) -> Result<Option<Address>, ConnectionError> {
        self.client.lookup(did.clone()).await.map_err(transport)
    }

    async fn reverse_lookup(&self, account: Address) -> Result<FixedHex, ConnectionError> {
        self.client.r_lookup(account).await.map_err(transport)
    }

    async fn previous_keys(&self, did: &FixedHex) -> Result<Vec<PreviousKey>, ConnectionError> {
        self.client.prev_keys(did.clone()).await.map_err(transport)
    }

    async fn validators(&self) -> Result<Vec<FixedHex>, ConnectionError> {
        self.client.validators().await.map_err(transport)
    }

    async fn submit_and_watch(&self, call: SignedCall) -> Result<TxStatusStream, ConnectionError> {
        let subscription = self
            .client
            .submit_and_watch(call)
            .await
            .map_err(transport)?;
        Ok(subscription
            .map(|event| event.map_err(|e| ConnectionError::Decode(e.to_string())))
            .boxed())
    }

    async fn find_meta_error(&self, index: ModuleIndex) -> Result<MetaError, ConnectionError> {
        self.client.meta_error(index).await.map_err(transport)
    }
}
