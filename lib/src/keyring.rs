//! Keyring collaborator: mnemonic generation, validation and key derivation.

use async_trait::async_trait;
use ethers::signers::{
    coins_bip39::{English, Mnemonic},
    LocalWallet, MnemonicBuilder,
};
use rand::thread_rng;

use crate::error::KeyringError;

/// Number of words in generated mnemonics
pub const MNEMONIC_WORDS: usize = 12;

/// Mnemonic handling and deterministic key derivation.
///
/// Derivation must be deterministic: the same mnemonic always yields the same key.
#[async_trait]
pub trait Keyring: Send + Sync {
    /// Generate a new random mnemonic phrase
    fn generate_mnemonic(&self) -> Result<String, KeyringError>;

    /// Check whether `phrase` is a valid mnemonic
    fn validate_mnemonic(&self, phrase: &str) -> bool;

    /// Derive the signing key for a mnemonic
    async fn derive_key(&self, phrase: &str) -> Result<LocalWallet, KeyringError>;
}

/// BIP-39 (English wordlist) keyring deriving secp256k1 keys at `m/44'/60'/0'/0/{index}`.
#[derive(Debug, Clone, Default)]
pub struct Bip39Keyring {
    index: u32,
}

impl Bip39Keyring {
    /// Derive keys at the given account index instead of the first one
    pub fn with_index(index: u32) -> Self {
        Self { index }
    }
}

#[async_trait]
impl Keyring for Bip39Keyring {
    fn generate_mnemonic(&self) -> Result<String, KeyringError> {
        let mnemonic = Mnemonic::<English>::new_with_count(&mut thread_rng(), MNEMONIC_WORDS)
            .map_err(|e| KeyringError::Generate(e.to_string()))?;
        Ok(mnemonic.to_phrase())
    }

    fn validate_mnemonic(&self, phrase: &str) -> bool {
        Mnemonic::<English>::new_from_phrase(phrase).is_ok()
    }

    async fn derive_key(&self, phrase: &str) -> Result<LocalWallet, KeyringError> {
        if !self.validate_mnemonic(phrase) {
            return Err(KeyringError::InvalidMnemonic);
        }
        let wallet = MnemonicBuilder::<English>::default()
            .phrase(phrase)
            .index(self.index)?
            .build()?;
        log::trace!("Derived key at index {}", self.index);
        Ok(wallet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::signers::Signer;

    const TEST_MNEMONIC: &str = "test test test test test test test test test test test junk";

    #[test]
    fn test_generate_is_valid() {
        let keyring = Bip39Keyring::default();
        let phrase = keyring.generate_mnemonic().unwrap();
        assert_eq!(phrase.split_whitespace().count(), MNEMONIC_WORDS);
        assert!(keyring.validate_mnemonic(&phrase));
    }

    #[test]
    fn test_validate() {
        let keyring = Bip39Keyring::default();
        assert!(keyring.validate_mnemonic(TEST_MNEMONIC));
        assert!(!keyring.validate_mnemonic("test test test"));
        assert!(!keyring.validate_mnemonic(
            "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon"
        ));
        assert!(!keyring.validate_mnemonic(""));
    }

    #[tokio::test]
    async fn test_derivation_is_deterministic() {
        let keyring = Bip39Keyring::default();
        let first = keyring.derive_key(TEST_MNEMONIC).await.unwrap();
        let second = keyring.derive_key(TEST_MNEMONIC).await.unwrap();
        assert_eq!(first.address(), second.address());
        assert_eq!(
            format!("{:?}", first.address()),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[tokio::test]
    async fn test_derivation_index() {
        let wallet = Bip39Keyring::with_index(1)
            .derive_key(TEST_MNEMONIC)
            .await
            .unwrap();
        assert_eq!(
            format!("{:?}", wallet.address()),
            "0x70997970c51812dc3a010c7d01b50e0d17dc79c8"
        );
    }

    #[tokio::test]
    async fn test_invalid_mnemonic() {
        let res = Bip39Keyring::default().derive_key("not a mnemonic").await;
        assert!(matches!(res, Err(KeyringError::InvalidMnemonic)));
    }
}
