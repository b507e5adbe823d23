//! Calls into the ledger's `did` module, and signing them.

use ethers::{
    signers::{LocalWallet, Signer},
    types::{Address, Signature, H256},
    utils::keccak256,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{EncodeError, SignerError},
    types::{DidDocument, FixedHex, Identifier, PublicKey},
};

/// A call into the `did` module. DIDs are always carried in their fixed-width encoding.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "call", rename_all = "camelCase")]
pub enum DidCall {
    #[serde(rename_all = "camelCase")]
    Add {
        public_key: PublicKey,
        did: FixedHex,
        metadata: String,
    },
    #[serde(rename_all = "camelCase")]
    RotateKey { did: FixedHex, public_key: PublicKey },
    UpdateMetadata { did: FixedHex, metadata: String },
}

impl DidCall {
    /// `did.add` for a freshly built document
    pub fn add(document: &DidDocument) -> Result<Self, EncodeError> {
        Ok(DidCall::Add {
            public_key: document.public_key().clone(),
            did: FixedHex::for_did(&document.identity())?,
            metadata: document.metadata().to_string(),
        })
    }

    /// `did.rotateKey`
    pub fn rotate_key(identifier: &Identifier, public_key: PublicKey) -> Result<Self, EncodeError> {
        Ok(DidCall::RotateKey {
            did: FixedHex::for_did(identifier.as_str())?,
            public_key,
        })
    }

    /// `did.updateMetadata`
    pub fn update_metadata<S: Into<String>>(
        identifier: &Identifier,
        metadata: S,
    ) -> Result<Self, EncodeError> {
        Ok(DidCall::UpdateMetadata {
            did: FixedHex::for_did(identifier.as_str())?,
            metadata: metadata.into(),
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            DidCall::Add { .. } => "did.add",
            DidCall::RotateKey { .. } => "did.rotateKey",
            DidCall::UpdateMetadata { .. } => "did.updateMetadata",
        }
    }

    /// The DID this call operates on
    pub fn did(&self) -> &FixedHex {
        match self {
            DidCall::Add { did, .. }
            | DidCall::RotateKey { did, .. }
            | DidCall::UpdateMetadata { did, .. } => did,
        }
    }

    /// Keccak-256 hash of the canonical JSON encoding of the call, the message that gets signed
    pub fn hash(&self) -> Result<H256, serde_json::Error> {
        let encoded = serde_json::to_vec(self)?;
        Ok(H256(keccak256(encoded)))
    }
}

/// A [`DidCall`] together with the account that signed it
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SignedCall {
    pub call: DidCall,
    pub signer: Address,
    pub signature: Signature,
}

impl SignedCall {
    /// Check that `signature` was produced by `signer` over this exact call
    pub fn verify(&self) -> Result<(), SignerError> {
        let hash = self.call.hash()?;
        self.signature.verify(hash, self.signer)?;
        Ok(())
    }
}

/// Signer for calls submitted to the `did` module
pub trait CallSignerExt {
    fn sign_call(&self, call: DidCall) -> Result<SignedCall, SignerError>;
}

impl CallSignerExt for LocalWallet {
    fn sign_call(&self, call: DidCall) -> Result<SignedCall, SignerError> {
        let hash = call.hash()?;
        let signature = self.sign_hash(hash)?;
        Ok(SignedCall {
            call,
            signer: self.address(),
            signature,
        })
    }
}
