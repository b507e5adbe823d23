//! In-memory development ledger.
//!
//! Every submitted call is executed immediately in a block of its own, and that block is final as
//! soon as it is produced. The `did` module rules mirror the chain: only validators may create
//! DIDs, rotate keys or update metadata, a DID is registered once, and a key is bound to at most
//! one DID.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use ethers::{
    types::{Address, H256},
    utils::keccak256,
};
use futures::{stream, StreamExt};
use tokio::sync::Mutex;

use super::{
    ChainConnection, DidCall, DispatchError, MetaError, ModuleIndex, SignedCall, TxEvent, TxStatus,
    TxStatusStream,
};
use crate::{
    error::ConnectionError,
    types::{DidRecord, FixedHex, Identifier, PreviousKey, PublicKey},
};

/// Index of the `did` module in the ledger's error registry
pub const DID_MODULE_INDEX: u8 = 9;

/// Errors of the `did` module, in registry order
const DID_MODULE_ERRORS: &[(&str, &str)] = &[
    ("DIDAlreadyExists", "The given DID already exists on chain"),
    ("DIDDoesNotExist", "The given DID does not exist on chain"),
    (
        "PublicKeyRegistered",
        "The given public key is already bound to a DID",
    ),
    ("InvalidPublicKey", "The given public key is not a valid secp256k1 key"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
enum DidModuleError {
    DidAlreadyExists = 0,
    DidDoesNotExist = 1,
    PublicKeyRegistered = 2,
    InvalidPublicKey = 3,
}

impl From<DidModuleError> for DispatchError {
    fn from(err: DidModuleError) -> Self {
        DispatchError::Module(ModuleIndex {
            index: DID_MODULE_INDEX,
            error: err as u8,
        })
    }
}

#[derive(Debug, Default)]
struct LedgerState {
    block_number: u64,
    dids: HashMap<FixedHex, DidRecord>,
    lookup: HashMap<FixedHex, Address>,
    reverse: HashMap<Address, FixedHex>,
    previous_keys: HashMap<FixedHex, Vec<PreviousKey>>,
    validators: Vec<FixedHex>,
}

impl LedgerState {
    fn is_validator(&self, account: &Address) -> bool {
        self.reverse
            .get(account)
            .map(|did| self.validators.contains(did))
            .unwrap_or(false)
    }

    fn insert(
        &mut self,
        did: FixedHex,
        public_key: PublicKey,
        metadata: String,
        block: u64,
    ) -> Result<(), DidModuleError> {
        if self.dids.contains_key(&did) {
            return Err(DidModuleError::DidAlreadyExists);
        }
        let account = public_key
            .to_address()
            .map_err(|_| DidModuleError::InvalidPublicKey)?;
        if self.reverse.contains_key(&account) {
            return Err(DidModuleError::PublicKeyRegistered);
        }
        self.lookup.insert(did.clone(), account);
        self.reverse.insert(account, did.clone());
        self.dids.insert(
            did.clone(),
            DidRecord {
                identifier: did,
                public_key,
                metadata,
                added_block: block,
            },
        );
        Ok(())
    }

    fn rotate(
        &mut self,
        did: &FixedHex,
        public_key: PublicKey,
        block: u64,
    ) -> Result<(), DidModuleError> {
        let account = public_key
            .to_address()
            .map_err(|_| DidModuleError::InvalidPublicKey)?;
        if matches!(self.reverse.get(&account), Some(bound) if bound != did) {
            return Err(DidModuleError::PublicKeyRegistered);
        }
        let record = self
            .dids
            .get_mut(did)
            .ok_or(DidModuleError::DidDoesNotExist)?;
        let previous = std::mem::replace(&mut record.public_key, public_key);
        if let Some(old_account) = self.lookup.insert(did.clone(), account) {
            self.reverse.remove(&old_account);
        }
        self.reverse.insert(account, did.clone());
        self.previous_keys
            .entry(did.clone())
            .or_default()
            .push(PreviousKey {
                public_key: previous,
                block,
            });
        Ok(())
    }

    fn apply(&mut self, call: DidCall, block: u64) -> Result<(), DidModuleError> {
        match call {
            DidCall::Add {
                public_key,
                did,
                metadata,
            } => self.insert(did, public_key, metadata, block),
            DidCall::RotateKey { did, public_key } => self.rotate(&did, public_key, block),
            DidCall::UpdateMetadata { did, metadata } => {
                let record = self
                    .dids
                    .get_mut(&did)
                    .ok_or(DidModuleError::DidDoesNotExist)?;
                record.metadata = metadata;
                Ok(())
            }
        }
    }
}

/// An in-memory ledger with instant finality
#[derive(Debug, Clone, Default)]
pub struct DevLedger {
    state: Arc<Mutex<LedgerState>>,
}

impl DevLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a DID and add it to the validator set, as a genesis configuration would.
    pub async fn add_validator(
        &self,
        identifier: &Identifier,
        public_key: PublicKey,
    ) -> Result<(), ConnectionError> {
        let did = FixedHex::for_did(identifier.as_str())
            .map_err(|e| ConnectionError::Rejected(e.to_string()))?;
        let mut state = self.state.lock().await;
        let block = state.block_number;
        state
            .insert(did.clone(), public_key, String::new(), block)
            .map_err(|e| ConnectionError::Rejected(format!("{:?}", e)))?;
        state.validators.push(did);
        log::debug!("Added validator {}", identifier.did());
        Ok(())
    }

    /// Number of the latest block
    pub async fn block_number(&self) -> u64 {
        self.state.lock().await.block_number
    }

    /// Execute a call in a new block, returning the block hash and the dispatch result.
    async fn execute(&self, call: SignedCall) -> (H256, Option<DispatchError>) {
        let mut state = self.state.lock().await;
        state.block_number += 1;
        let block = state.block_number;

        let mut preimage = block.to_be_bytes().to_vec();
        preimage.extend_from_slice(call.signature.to_vec().as_slice());
        let hash = H256(keccak256(preimage));

        let result = if !state.is_validator(&call.signer) {
            Err(DispatchError::Other("BadOrigin".to_string()))
        } else {
            state.apply(call.call, block).map_err(DispatchError::from)
        };
        if let Err(e) = &result {
            log::debug!("Call in block {block} failed to dispatch: {e}");
        }
        (hash, result.err())
    }
}

#[async_trait]
impl ChainConnection for DevLedger {
    async fn did(&self, did: &FixedHex) -> Result<Option<DidRecord>, ConnectionError> {
        Ok(self.state.lock().await.dids.get(did).cloned())
    }

    async fn lookup(&self, did: &FixedHex) -> Result<Option<Address>, ConnectionError> {
        Ok(self.state.lock().await.lookup.get(did).copied())
    }

    async fn reverse_lookup(&self, account: Address) -> Result<FixedHex, ConnectionError> {
        Ok(self
            .state
            .lock()
            .await
            .reverse
            .get(&account)
            .cloned()
            .unwrap_or_else(FixedHex::null))
    }

    async fn previous_keys(&self, did: &FixedHex) -> Result<Vec<PreviousKey>, ConnectionError> {
        Ok(self
            .state
            .lock()
            .await
            .previous_keys
            .get(did)
            .cloned()
            .unwrap_or_default())
    }

    async fn validators(&self) -> Result<Vec<FixedHex>, ConnectionError> {
        Ok(self.state.lock().await.validators.clone())
    }

    async fn submit_and_watch(&self, call: SignedCall) -> Result<TxStatusStream, ConnectionError> {
        log::trace!("Submitted {} from {:?}", call.call.name(), call.signer);
        if let Err(e) = call.verify() {
            log::debug!("Rejecting call with bad signature: {e}");
            return Ok(stream::iter([Ok(TxStatus::Invalid.into())]).boxed());
        }

        let (hash, dispatch_error) = self.execute(call).await;
        let events: Vec<Result<TxEvent, ConnectionError>> = vec![
            Ok(TxStatus::Ready.into()),
            Ok(TxStatus::Broadcast.into()),
            Ok(TxEvent {
                status: TxStatus::InBlock(hash),
                dispatch_error: dispatch_error.clone(),
            }),
            Ok(TxEvent {
                status: TxStatus::Finalized(hash),
                dispatch_error,
            }),
        ];
        Ok(stream::iter(events).boxed())
    }

    async fn find_meta_error(&self, index: ModuleIndex) -> Result<MetaError, ConnectionError> {
        let unknown = ConnectionError::UnknownModuleError {
            index: index.index,
            error: index.error,
        };
        if index.index != DID_MODULE_INDEX {
            return Err(unknown);
        }
        let (name, doc) = DID_MODULE_ERRORS
            .get(index.error as usize)
            .ok_or(unknown)?;
        Ok(MetaError {
            section: "did".to_string(),
            name: name.to_string(),
            docs: vec![doc.to_string()],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::CallSignerExt;
    use ethers::signers::{coins_bip39::English, LocalWallet, MnemonicBuilder, Signer};

    fn wallet(index: u32) -> LocalWallet {
        MnemonicBuilder::<English>::default()
            .phrase("test test test test test test test test test test test junk")
            .index(index)
            .unwrap()
            .build()
            .unwrap()
    }

    fn did(id: &str) -> FixedHex {
        FixedHex::for_did(id).unwrap()
    }

    async fn ledger() -> DevLedger {
        let ledger = DevLedger::new();
        ledger
            .add_validator(
                &Identifier::parse("swn").unwrap(),
                PublicKey::from_wallet(&wallet(0)),
            )
            .await
            .unwrap();
        ledger
    }

    async fn submit(ledger: &DevLedger, signer: &LocalWallet, call: DidCall) -> Vec<TxEvent> {
        let signed = signer.sign_call(call).unwrap();
        ledger
            .submit_and_watch(signed)
            .await
            .unwrap()
            .map(|e| e.unwrap())
            .collect()
            .await
    }

    fn add(id: &str, key: &LocalWallet) -> DidCall {
        DidCall::Add {
            public_key: PublicKey::from_wallet(key),
            did: did(id),
            metadata: "Metadata".into(),
        }
    }

    #[tokio::test]
    async fn test_genesis_validator() {
        let ledger = ledger().await;
        assert_eq!(ledger.validators().await.unwrap(), vec![did("swn")]);
        assert_eq!(
            ledger.lookup(&did("swn")).await.unwrap(),
            Some(wallet(0).address())
        );
        assert_eq!(
            ledger.reverse_lookup(wallet(0).address()).await.unwrap(),
            did("swn")
        );
        assert!(ledger
            .reverse_lookup(wallet(1).address())
            .await
            .unwrap()
            .is_null());
        assert_eq!(ledger.block_number().await, 0);
    }

    #[tokio::test]
    async fn test_add_produces_final_block() {
        let ledger = ledger().await;
        let events = submit(&ledger, &wallet(0), add("stanly", &wallet(1))).await;
        let statuses: Vec<TxStatus> = events.iter().map(|e| e.status).collect();
        assert!(matches!(
            statuses.as_slice(),
            [TxStatus::Ready, TxStatus::Broadcast, TxStatus::InBlock(a), TxStatus::Finalized(b)] if a == b
        ));
        assert!(events.iter().all(|e| e.dispatch_error.is_none()));

        let record = ledger.did(&did("stanly")).await.unwrap().unwrap();
        assert_eq!(record.added_block, 1);
        assert_eq!(record.metadata, "Metadata");
        assert_eq!(ledger.block_number().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_did_is_module_error() {
        let ledger = ledger().await;
        submit(&ledger, &wallet(0), add("stanly", &wallet(1))).await;
        let events = submit(&ledger, &wallet(0), add("stanly", &wallet(2))).await;
        assert_eq!(
            events[2].dispatch_error,
            Some(DispatchError::Module(ModuleIndex {
                index: DID_MODULE_INDEX,
                error: 0
            }))
        );
        let meta = ledger
            .find_meta_error(ModuleIndex {
                index: DID_MODULE_INDEX,
                error: 0,
            })
            .await
            .unwrap();
        assert_eq!(meta.name, "DIDAlreadyExists");
    }

    #[tokio::test]
    async fn test_non_validator_is_bad_origin() {
        let ledger = ledger().await;
        let events = submit(&ledger, &wallet(1), add("stanly", &wallet(1))).await;
        assert_eq!(
            events[2].dispatch_error,
            Some(DispatchError::Other("BadOrigin".into()))
        );
        assert!(ledger.did(&did("stanly")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rotate_key_records_history() {
        let ledger = ledger().await;
        submit(&ledger, &wallet(0), add("stanly", &wallet(1))).await;
        let rotate = DidCall::RotateKey {
            did: did("stanly"),
            public_key: PublicKey::from_wallet(&wallet(2)),
        };
        let events = submit(&ledger, &wallet(0), rotate).await;
        assert!(events[3].dispatch_error.is_none());

        assert_eq!(
            ledger.lookup(&did("stanly")).await.unwrap(),
            Some(wallet(2).address())
        );
        assert!(ledger
            .reverse_lookup(wallet(1).address())
            .await
            .unwrap()
            .is_null());
        assert_eq!(
            ledger.previous_keys(&did("stanly")).await.unwrap(),
            vec![PreviousKey {
                public_key: PublicKey::from_wallet(&wallet(1)),
                block: 2
            }]
        );
    }

    #[tokio::test]
    async fn test_key_bound_to_other_did() {
        let ledger = ledger().await;
        submit(&ledger, &wallet(0), add("stanly", &wallet(1))).await;
        let events = submit(&ledger, &wallet(0), add("other", &wallet(1))).await;
        assert_eq!(
            events[2].dispatch_error,
            Some(DispatchError::Module(ModuleIndex {
                index: DID_MODULE_INDEX,
                error: 2
            }))
        );
    }

    #[tokio::test]
    async fn test_update_missing_did() {
        let ledger = ledger().await;
        let call = DidCall::UpdateMetadata {
            did: did("ghost"),
            metadata: "x".into(),
        };
        let events = submit(&ledger, &wallet(0), call).await;
        assert_eq!(
            events[2].dispatch_error,
            Some(DispatchError::Module(ModuleIndex {
                index: DID_MODULE_INDEX,
                error: 1
            }))
        );
    }

    #[tokio::test]
    async fn test_bad_signature_is_invalid() {
        let ledger = ledger().await;
        let mut signed = wallet(0).sign_call(add("stanly", &wallet(1))).unwrap();
        signed.signer = wallet(1).address();
        let events: Vec<TxEvent> = ledger
            .submit_and_watch(signed)
            .await
            .unwrap()
            .map(|e| e.unwrap())
            .collect()
            .await;
        assert_eq!(events, vec![TxEvent::from(TxStatus::Invalid)]);
        assert_eq!(ledger.block_number().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_meta_error() {
        let ledger = ledger().await;
        assert_eq!(
            ledger
                .find_meta_error(ModuleIndex { index: 1, error: 0 })
                .await,
            Err(ConnectionError::UnknownModuleError { index: 1, error: 0 })
        );
        assert!(ledger
            .find_meta_error(ModuleIndex {
                index: DID_MODULE_INDEX,
                error: 42
            })
            .await
            .is_err());
    }
}
