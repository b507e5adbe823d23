//! Read-only queries against a `did:ssid` ledger.
//!
//! DIDs are accepted as `did:ssid:<identifier>` or as a bare identifier. The identifier is
//! validated before anything is sent to the node, then encoded to the fixed-width form the
//! ledger keys its storage by. A failing query is logged and surfaces as
//! [`ResolverError::FetchFailed`]; the transport error itself is not returned to the caller.

use ethers::types::Address;

use crate::{
    connection::ChainConnection,
    error::{ConnectionError, ResolverError},
    types::{DidDetails, FixedHex, Identifier, PreviousKey},
};

/// Resolves DIDs, accounts and validators through a [`ChainConnection`]
pub struct Resolver<C> {
    connection: C,
}

impl<C> From<C> for Resolver<C> {
    fn from(connection: C) -> Self {
        Self { connection }
    }
}

fn fetch_failed(what: &'static str) -> impl FnOnce(ConnectionError) -> ResolverError {
    move |err| {
        log::error!("Unable to fetch {what}: {err}");
        ResolverError::FetchFailed(what)
    }
}

/// Validate `did` and encode it as a storage key
fn storage_key(did: &str) -> Result<FixedHex, ResolverError> {
    let identifier = Identifier::from_did(did)?;
    Ok(FixedHex::for_did(&identifier.did())?)
}

impl<C: ChainConnection> Resolver<C> {
    pub fn new(connection: C) -> Self {
        Self { connection }
    }

    /// The record stored for `did`, or `None` if the DID was never created
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get_did_details(&self, did: &str) -> Result<Option<DidDetails>, ResolverError> {
        let key = storage_key(did)?;
        let record = self
            .connection
            .did(&key)
            .await
            .map_err(fetch_failed("DID details"))?;

        match record {
            Some(record) => {
                let details = DidDetails::try_from(record).map_err(|e| {
                    log::error!("Stored record for {did} could not be decoded: {e}");
                    ResolverError::FetchFailed("DID details")
                })?;
                Ok(Some(details))
            }
            None => Ok(None),
        }
    }

    /// The account `did` is currently bound to
    pub async fn resolve_did_to_account(&self, did: &str) -> Result<Option<Address>, ResolverError> {
        let key = storage_key(did)?;
        self.connection
            .lookup(&key)
            .await
            .map_err(fetch_failed("account"))
    }

    /// The DID bound to `account`, still in its fixed-width encoding.
    ///
    /// Returns `None` when the ledger answers with the all-zero value.
    pub async fn resolve_account_id_to_did(
        &self,
        account: Address,
    ) -> Result<Option<FixedHex>, ResolverError> {
        let did = self
            .connection
            .reverse_lookup(account)
            .await
            .map_err(fetch_failed("DID"))?;
        if did.is_null() {
            log::trace!("No DID bound to {:?}", account);
            return Ok(None);
        }
        Ok(Some(did))
    }

    /// Whether `did` is a member of the validator set
    pub async fn is_did_validator(&self, did: &str) -> Result<bool, ResolverError> {
        let key = storage_key(did)?;
        let validators = self
            .connection
            .validators()
            .await
            .map_err(fetch_failed("validator set"))?;
        Ok(validators.iter().any(|v| v.as_str() == key.as_str()))
    }

    /// Keys that were replaced by rotation, each with the block it was replaced in
    pub async fn get_did_key_history(&self, did: &str) -> Result<Vec<PreviousKey>, ResolverError> {
        let key = storage_key(did)?;
        self.connection
            .previous_keys(&key)
            .await
            .map_err(fetch_failed("key history"))
    }
}
