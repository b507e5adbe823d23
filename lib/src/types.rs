//! Type definitions for `did:ssid` records, both the values held by callers and the values stored
//! on chain.

mod fixed_hex;
mod identifier;

use ethers::{
    core::k256::ecdsa::VerifyingKey,
    signers::LocalWallet,
    types::{Address, Bytes, H256},
    utils::public_key_to_address,
};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use fixed_hex::*;
pub use identifier::*;

use crate::error::{TransactionError, TypeError};

/// Namespace every `did:ssid` DID string starts with
pub const DID_PREFIX: &str = "did:ssid:";

/// The all-zero fixed-width value the ledger returns for an account with no DID
pub const NULL_DID: &str = "0x0000000000000000000000000000000000000000000000000000000000000000";

/// A SEC1-compressed secp256k1 public key
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PublicKey(Bytes);

impl PublicKey {
    pub fn from_wallet(wallet: &LocalWallet) -> Self {
        let point = wallet.signer().verifying_key().to_encoded_point(true);
        Self(Bytes::from(point.as_bytes().to_vec()))
    }

    /// The account controlled by this key
    pub fn to_address(&self) -> Result<Address, TypeError> {
        let key = VerifyingKey::from_sec1_bytes(self.0.as_ref())?;
        Ok(public_key_to_address(&key))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl From<Bytes> for PublicKey {
    fn from(bytes: Bytes) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A DID Document, ready to be stored on chain. Built with [`generate_did`](crate::generate_did).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DidDocument {
    public_key: PublicKey,
    #[serde(rename = "identity", with = "identifier::as_did")]
    identifier: Identifier,
    #[serde(default)]
    metadata: String,
}

impl DidDocument {
    pub(crate) fn new(public_key: PublicKey, identifier: &Identifier, metadata: String) -> Self {
        Self {
            public_key,
            identifier: identifier.clone(),
            metadata,
        }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    /// The DID string, `did:ssid:<identifier>`
    pub fn identity(&self) -> String {
        self.identifier.did()
    }

    pub fn metadata(&self) -> &str {
        &self.metadata
    }
}

/// A DID record as the ledger stores it
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DidRecord {
    pub identifier: FixedHex,
    pub public_key: PublicKey,
    pub metadata: String,
    pub added_block: u64,
}

/// A resolved DID, with the identifier decoded back into a DID string
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DidDetails {
    pub identifier: String,
    pub public_key: PublicKey,
    pub metadata: String,
    pub added_block: u64,
}

impl TryFrom<DidRecord> for DidDetails {
    type Error = TypeError;

    fn try_from(record: DidRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            identifier: record.identifier.to_string_lossy()?,
            public_key: record.public_key,
            metadata: record.metadata,
            added_block: record.added_block,
        })
    }
}

/// A key that was replaced by a rotation, and the block it was replaced at
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PreviousKey {
    pub public_key: PublicKey,
    pub block: u64,
}

/// The single terminal result of submitting a DID transaction
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum TransactionOutcome {
    /// The transaction was included in a finalized block
    Finalized { block_hash: H256 },
    /// The transaction was rejected by a chain module, with the reason decoded from the chain's
    /// error registry
    ModuleError {
        section: String,
        name: String,
        documentation: String,
    },
    /// The transaction was rejected for a reason outside of any module
    DispatchError { description: String },
    /// The transaction could not be signed, sent, or followed to a terminal status
    SubmissionError { cause: String },
}

impl TransactionOutcome {
    pub fn is_finalized(&self) -> bool {
        matches!(self, TransactionOutcome::Finalized { .. })
    }

    /// The finalized block hash, or the reason the transaction did not finalize
    pub fn into_result(self) -> Result<H256, TransactionError> {
        match self {
            TransactionOutcome::Finalized { block_hash } => Ok(block_hash),
            TransactionOutcome::ModuleError {
                section,
                name,
                documentation,
            } => Err(TransactionError::Module {
                section,
                name,
                documentation,
            }),
            TransactionOutcome::DispatchError { description } => {
                Err(TransactionError::Dispatch(description))
            }
            TransactionOutcome::SubmissionError { cause } => {
                Err(TransactionError::Submission(cause))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::signers::{coins_bip39::English, MnemonicBuilder, Signer};

    const TEST_MNEMONIC: &str =
        "test test test test test test test test test test test junk";

    fn wallet() -> LocalWallet {
        MnemonicBuilder::<English>::default()
            .phrase(TEST_MNEMONIC)
            .build()
            .unwrap()
    }

    #[test]
    fn test_public_key_address() {
        let wallet = wallet();
        let key = PublicKey::from_wallet(&wallet);
        assert_eq!(key.as_bytes().len(), 33);
        assert_eq!(key.to_address().unwrap(), wallet.address());
        assert_eq!(
            format!("{:?}", wallet.address()),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn test_invalid_public_key() {
        let key = PublicKey::from(Bytes::from(vec![0u8; 33]));
        assert!(key.to_address().is_err());
    }

    #[test]
    fn test_document_serialization() {
        let key = PublicKey::from_wallet(&wallet());
        let doc = DidDocument::new(key.clone(), &Identifier::parse("stanly").unwrap(), "".into());
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["identity"], "did:ssid:stanly");
        assert_eq!(json["metadata"], "");
        assert_eq!(json["public_key"], key.to_string());
    }

    #[test]
    fn test_document_rejects_invalid_identity() {
        let key = PublicKey::from_wallet(&wallet()).to_string();
        let parse = |identity: &str| {
            serde_json::from_value::<DidDocument>(serde_json::json!({
                "public_key": key,
                "identity": identity,
                "metadata": "",
            }))
        };
        assert!(parse("did:ssid:stan!ly").is_err());
        assert!(parse("did:ssid:ab").is_err());
        assert!(parse("stanly").is_err());
        assert!(parse("did:other:stanly").is_err());

        let doc = parse("did:ssid:stanly").unwrap();
        assert_eq!(doc.identifier().as_str(), "stanly");
        assert_eq!(doc.identity(), "did:ssid:stanly");
    }

    #[test]
    fn test_details_from_record() {
        let key = PublicKey::from_wallet(&wallet());
        let record = DidRecord {
            identifier: FixedHex::for_did("did:ssid:swn").unwrap(),
            public_key: key.clone(),
            metadata: "Metadata".into(),
            added_block: 7,
        };
        let details = DidDetails::try_from(record).unwrap();
        assert_eq!(details.identifier, "did:ssid:swn");
        assert_eq!(details.public_key, key);
        assert_eq!(details.added_block, 7);
    }

    #[test]
    fn test_outcome_into_result() {
        let hash = H256::repeat_byte(1);
        assert_eq!(
            TransactionOutcome::Finalized { block_hash: hash }.into_result(),
            Ok(hash)
        );
        assert_eq!(
            TransactionOutcome::DispatchError {
                description: "BadOrigin".into()
            }
            .into_result(),
            Err(TransactionError::Dispatch("BadOrigin".into()))
        );
        assert!(!TransactionOutcome::SubmissionError {
            cause: "closed".into()
        }
        .is_finalized());
    }
}
