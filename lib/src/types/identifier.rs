//! Human-chosen identifiers bound to a `did:ssid` DID.
//!
//! An [`Identifier`] can only be obtained through validation, so any value of this type is known
//! to be ASCII alphanumeric and between [`MIN_IDENTIFIER_LEN`] and [`MAX_IDENTIFIER_LEN`]
//! characters long.
//!
//! ```rust
//! use lib_ssid_did::types::Identifier;
//!
//! let id = Identifier::parse("stanly").unwrap();
//! assert_eq!(id.did(), "did:ssid:stanly");
//! ```

use std::{fmt, str::FromStr, sync::OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::DID_PREFIX;
use crate::error::IdentifierError;

pub const MIN_IDENTIFIER_LEN: usize = 3;
pub const MAX_IDENTIFIER_LEN: usize = 20;

fn format_rule() -> &'static Regex {
    static FORMAT: OnceLock<Regex> = OnceLock::new();
    FORMAT.get_or_init(|| Regex::new("^[0-9a-zA-Z]+$").expect("static regex is valid"))
}

/// Check a candidate identifier against the format and length rules.
///
/// The format rule is checked first, so a string that breaks both reports
/// [`IdentifierError::Format`].
pub fn validate(candidate: &str) -> Result<(), IdentifierError> {
    if !format_rule().is_match(candidate) {
        return Err(IdentifierError::Format(candidate.to_string()));
    }
    // the format rule restricts to ASCII, so bytes == characters
    if !(MIN_IDENTIFIER_LEN..=MAX_IDENTIFIER_LEN).contains(&candidate.len()) {
        return Err(IdentifierError::Length(candidate.to_string()));
    }
    Ok(())
}

/// A validated identifier, the method-specific part of a `did:ssid` DID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

impl Identifier {
    pub fn parse<S: Into<String>>(candidate: S) -> Result<Self, IdentifierError> {
        let candidate = candidate.into();
        validate(&candidate)?;
        Ok(Self(candidate))
    }

    /// Parse either a full DID string (`did:ssid:<id>`) or a bare identifier.
    pub fn from_did(did: &str) -> Result<Self, IdentifierError> {
        Self::parse(did.strip_prefix(DID_PREFIX).unwrap_or(did))
    }

    /// The DID string for this identifier, `did:ssid:<identifier>`
    pub fn did(&self) -> String {
        format!("{}{}", DID_PREFIX, self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Serde adapter carrying an [`Identifier`] as its full DID string. Deserializing requires the
/// `did:ssid:` prefix and runs the identifier rules.
pub(crate) mod as_did {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    use super::{Identifier, DID_PREFIX};

    pub fn serialize<S: Serializer>(identifier: &Identifier, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&identifier.did())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Identifier, D::Error> {
        let did = String::deserialize(deserializer)?;
        let identifier = did
            .strip_prefix(DID_PREFIX)
            .ok_or_else(|| D::Error::custom(format!("`{did}` is not a {DID_PREFIX} DID")))?;
        Identifier::parse(identifier).map_err(D::Error::custom)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Identifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Identifier {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        id.0
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
