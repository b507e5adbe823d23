//! Building DID documents from a mnemonic and a chosen identifier.

use crate::{
    error::BuilderError,
    keyring::Keyring,
    types::{DidDocument, Identifier, PublicKey},
};

/// Build the DID document for `identifier`, bound to the key derived from `mnemonic`.
///
/// The mnemonic is checked first, then the identifier. Nothing is submitted to the chain; pass
/// the document to [`Submitter::store_did_on_chain`](crate::Submitter::store_did_on_chain).
///
/// ```rust
/// use lib_ssid_did::{generate_did, keyring::Bip39Keyring};
///
/// # tokio_test::block_on(async {
/// let mnemonic = "test test test test test test test test test test test junk";
/// let document = generate_did(&Bip39Keyring::default(), mnemonic, "stanly", None)
///     .await
///     .unwrap();
/// assert_eq!(document.identity(), "did:ssid:stanly");
/// # })
/// ```
#[tracing::instrument(level = "debug", skip(keyring, mnemonic))]
pub async fn generate_did<K: Keyring + ?Sized>(
    keyring: &K,
    mnemonic: &str,
    identifier: &str,
    metadata: Option<&str>,
) -> Result<DidDocument, BuilderError> {
    if !keyring.validate_mnemonic(mnemonic) {
        return Err(BuilderError::InvalidMnemonic);
    }
    let identifier = Identifier::parse(identifier)?;
    let wallet = keyring.derive_key(mnemonic).await?;

    let document = DidDocument::new(
        PublicKey::from_wallet(&wallet),
        &identifier,
        metadata.unwrap_or_default().to_string(),
    );
    log::debug!("Built document for {}", document.identity());
    Ok(document)
}
