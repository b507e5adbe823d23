use ethers::{signers::WalletError, types::SignatureError};
use jsonrpsee::types::ErrorObjectOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{MAX_IDENTIFIER_LEN, MIN_IDENTIFIER_LEN};

/// The closed set of error kinds a caller can branch on, regardless of which operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidMnemonic,
    InvalidIdentifierFormat,
    InvalidIdentifierLength,
    DataTooLarge,
    ModuleError,
    DispatchError,
    SubmissionError,
    FetchFailed,
}

/// Errors originating from validation of an [`Identifier`](crate::types::Identifier)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("identifier `{0}` may only contain ASCII letters and digits")]
    Format(String),
    #[error(
        "identifier `{0}` must be between {} and {} characters long",
        MIN_IDENTIFIER_LEN,
        MAX_IDENTIFIER_LEN
    )]
    Length(String),
}

impl IdentifierError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            IdentifierError::Format(_) => ErrorKind::InvalidIdentifierFormat,
            IdentifierError::Length(_) => ErrorKind::InvalidIdentifierLength,
        }
    }
}

/// Errors originating from fixed-width hex encoding and decoding, [`FixedHex`](crate::types::FixedHex)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodeError {
    #[error("{len} hex characters do not fit in a fixed-width field of {size}")]
    DataTooLarge { len: usize, size: usize },
    #[error("fixed-width value `{0}` is missing the 0x prefix")]
    MissingPrefix(String),
    #[error(transparent)]
    Hex(#[from] hex::FromHexError),
}

impl EncodeError {
    /// Only overflow belongs to the caller-facing taxonomy. Malformed values read back from the
    /// chain have no kind of their own.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            EncodeError::DataTooLarge { .. } => Some(ErrorKind::DataTooLarge),
            EncodeError::MissingPrefix(_) | EncodeError::Hex(_) => None,
        }
    }
}

/// Errors originating from the [`Keyring`](crate::keyring::Keyring)
#[derive(Error, Debug)]
pub enum KeyringError {
    #[error("mnemonic is not a valid BIP-39 phrase")]
    InvalidMnemonic,
    #[error("unable to generate mnemonic: {0}")]
    Generate(String),
    #[error(transparent)]
    Wallet(#[from] WalletError),
}

impl KeyringError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidMnemonic
    }
}

/// Errors originating during the construction of a DID document, [`generate_did`](crate::generate_did)
#[derive(Error, Debug)]
pub enum BuilderError {
    #[error("mnemonic is not a valid BIP-39 phrase")]
    InvalidMnemonic,
    #[error(transparent)]
    Identifier(#[from] IdentifierError),
    #[error("key derivation failed: {0}")]
    Keyring(#[from] KeyringError),
}

impl BuilderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BuilderError::Identifier(e) => e.kind(),
            BuilderError::InvalidMnemonic | BuilderError::Keyring(_) => ErrorKind::InvalidMnemonic,
        }
    }
}

/// General type error
#[derive(Error, Debug)]
pub enum TypeError {
    #[error("invalid secp256k1 public key: {0}")]
    PublicKey(#[from] ethers::core::k256::ecdsa::Error),
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Errors originating from a [`ChainConnection`](crate::connection::ChainConnection)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    #[error("rpc transport failure: {0}")]
    Transport(String),
    #[error("unable to decode chain value: {0}")]
    Decode(String),
    #[error("{0}")]
    Rejected(String),
    #[error("unknown module error {index}:{error}")]
    UnknownModuleError { index: u8, error: u8 },
    #[error("unsupported network `{0}`")]
    UnsupportedNetwork(String),
}

impl From<ConnectionError> for ErrorObjectOwned {
    fn from(err: ConnectionError) -> Self {
        ErrorObjectOwned::owned(-31000, err.to_string(), None::<()>)
    }
}

/// Errors originating from signing a [`DidCall`](crate::connection::DidCall)
#[derive(Error, Debug)]
pub enum SignerError {
    #[error(transparent)]
    Wallet(#[from] WalletError),
    #[error(transparent)]
    Signature(#[from] SignatureError),
    #[error("unable to encode call: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors originating from read-only queries with the [`Resolver`](crate::Resolver).
///
/// The underlying transport error is logged but never returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolverError {
    #[error("failed to fetch {0} from the chain")]
    FetchFailed(&'static str),
    #[error(transparent)]
    Identifier(#[from] IdentifierError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

impl ResolverError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolverError::FetchFailed(_) => ErrorKind::FetchFailed,
            ResolverError::Identifier(e) => e.kind(),
            ResolverError::Encode(e) => e.kind().unwrap_or(ErrorKind::FetchFailed),
        }
    }
}

/// A transaction that did not reach finality, see [`TransactionOutcome`](crate::types::TransactionOutcome)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransactionError {
    #[error("{section}.{name}: {documentation}")]
    Module {
        section: String,
        name: String,
        documentation: String,
    },
    #[error("dispatch failed: {0}")]
    Dispatch(String),
    #[error("submission failed: {0}")]
    Submission(String),
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

impl TransactionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransactionError::Module { .. } => ErrorKind::ModuleError,
            TransactionError::Dispatch(_) => ErrorKind::DispatchError,
            TransactionError::Submission(_) => ErrorKind::SubmissionError,
            TransactionError::Encode(e) => e.kind().unwrap_or(ErrorKind::SubmissionError),
        }
    }
}
