//! Fixed-width hex values, mirroring the way the ledger stores DIDs in 32-byte fields.
//!
//! Data is hex-encoded, right-padded with `0` characters up to `size` hex characters and prefixed
//! with `0x`. Values produced this way compare equal to what the chain returns for the same field
//! without decoding either side.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{DID_PREFIX, NULL_DID};
use crate::error::EncodeError;

/// Width in hex characters of the ledger's DID fields (32 bytes)
pub const DEFAULT_WIDTH: usize = 64;

/// Encode `data` into a `0x`-prefixed hex string of exactly `size + 2` characters.
///
/// Fails with [`EncodeError::DataTooLarge`] rather than truncating.
pub fn encode<T: AsRef<[u8]>>(data: T, size: usize) -> Result<String, EncodeError> {
    let encoded = hex::encode(data.as_ref());
    if encoded.len() > size {
        return Err(EncodeError::DataTooLarge {
            len: encoded.len(),
            size,
        });
    }
    Ok(format!("0x{:0<size$}", encoded, size = size))
}

/// Decode a fixed-width hex value, dropping the trailing zero padding bytes.
///
/// An odd number of hex digits is rejected with [`hex::FromHexError::OddLength`].
pub fn decode<T: AsRef<str>>(value: T) -> Result<Vec<u8>, EncodeError> {
    let value = value.as_ref();
    let digits = value
        .strip_prefix("0x")
        .ok_or_else(|| EncodeError::MissingPrefix(value.to_string()))?;
    let mut bytes = hex::decode(digits)?;
    while bytes.last() == Some(&0) {
        bytes.pop();
    }
    Ok(bytes)
}

/// A fixed-width hex value as stored on chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FixedHex(String);

impl FixedHex {
    /// Encode arbitrary data into a field of the default width.
    pub fn encode<T: AsRef<[u8]>>(data: T) -> Result<Self, EncodeError> {
        encode(data, DEFAULT_WIDTH).map(Self)
    }

    /// Encode a DID string. A bare identifier is prefixed with `did:ssid:` first.
    pub fn for_did(did: &str) -> Result<Self, EncodeError> {
        if did.starts_with(DID_PREFIX) {
            Self::encode(did)
        } else {
            Self::encode(format!("{DID_PREFIX}{did}"))
        }
    }

    /// Wrap a value read from the chain. Only the prefix and the hex digits are checked.
    pub fn from_chain<S: Into<String>>(value: S) -> Result<Self, EncodeError> {
        let value = value.into();
        decode(&value)?;
        Ok(Self(value))
    }

    /// The all-zero value the ledger returns when no mapping exists
    pub fn null() -> Self {
        Self(NULL_DID.to_string())
    }

    pub fn is_null(&self) -> bool {
        self.0 == NULL_DID
    }

    pub fn decode(&self) -> Result<Vec<u8>, EncodeError> {
        decode(&self.0)
    }

    /// Decode the value as a UTF-8 string, invalid sequences are replaced with `�`.
    pub fn to_string_lossy(&self) -> Result<String, EncodeError> {
        Ok(String::from_utf8_lossy(&self.decode()?).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FixedHex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for FixedHex {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for FixedHex {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}
