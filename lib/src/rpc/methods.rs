//! Interface Implementations for the `did:ssid` node JSON-RPC

use async_trait::async_trait;
use ethers::types::Address;
use futures::StreamExt;
use jsonrpsee::{
    core::SubscriptionResult, types::ErrorObjectOwned, PendingSubscriptionSink,
    SubscriptionMessage,
};

use super::api::*;
use crate::{
    connection::{ChainConnection, MetaError, ModuleIndex, SignedCall},
    types::{DidRecord, FixedHex, PreviousKey},
};

/// Serves any [`ChainConnection`] over JSON-RPC
pub struct NodeMethods<C> {
    connection: C,
}

impl<C: ChainConnection> NodeMethods<C> {
    pub fn new(connection: C) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl<C: ChainConnection + 'static> NodeApiServer for NodeMethods<C> {
    async fn dids(&self, did: FixedHex) -> Result<Option<DidRecord>, ErrorObjectOwned> {
        log::debug!("did_dIDs called");
        Ok(self.connection.did(&did).await?)
    }

    async fn lookup(&self, did: FixedHex) -> Result<Option<Address>, ErrorObjectOwned> {
        log::debug!("did_lookup called");
        Ok(self.connection.lookup(&did).await?)
    }

    async fn r_lookup(&self, account: Address) -> Result<FixedHex, ErrorObjectOwned> {
        log::debug!("did_rLookup called");
        Ok(self.connection.reverse_lookup(account).await?)
    }

    async fn prev_keys(&self, did: FixedHex) -> Result<Vec<PreviousKey>, ErrorObjectOwned> {
        log::debug!("did_prevKeys called");
        Ok(self.connection.previous_keys(&did).await?)
    }

    async fn validators(&self) -> Result<Vec<FixedHex>, ErrorObjectOwned> {
        log::debug!("did_validators called");
        Ok(self.connection.validators().await?)
    }

    async fn meta_error(&self, index: ModuleIndex) -> Result<MetaError, ErrorObjectOwned> {
        log::debug!("did_metaError called");
        Ok(self.connection.find_meta_error(index).await?)
    }

    async fn submit_and_watch(
        &self,
        pending: PendingSubscriptionSink,
        call: SignedCall,
    ) -> SubscriptionResult {
        log::debug!("did_submitAndWatch called for {}", call.call.name());
        let mut events = match self.connection.submit_and_watch(call).await {
            Ok(events) => events,
            Err(e) => {
                pending.reject(ErrorObjectOwned::from(e)).await;
                return Ok(());
            }
        };

        let sink = pending.accept().await?;
        while let Some(event) = events.next().await {
            let message = SubscriptionMessage::from_json(&event?)?;
            sink.send(message).await?;
        }
        Ok(())
    }
}
