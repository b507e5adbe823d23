//! Signing, dispatching and following DID transactions to a single outcome.
//!
//! A submission moves through `Submitted -> {Broadcasting, InBlock}* -> terminal`. The status
//! stream of the connection is folded through a [`StatusTracker`] and dropped at the first
//! terminal event. Every mutating operation waits for finality; nothing is retried.

use ethers::{signers::LocalWallet, types::H256};
use futures::StreamExt;

use crate::{
    connection::{CallSignerExt, ChainConnection, DidCall, DispatchError, TxEvent, TxStatus},
    error::TransactionError,
    types::{DidDocument, Identifier, PublicKey, TransactionOutcome},
};

/// Non-terminal progress of a submitted transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Progress {
    #[default]
    Submitted,
    Broadcasting,
    InBlock(H256),
}

/// Terminal status of a submitted transaction, before module errors are decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Terminal {
    Finalized(H256),
    Dispatch(DispatchError),
    Rejected(TxStatus),
}

/// State machine over the status events of one transaction
#[derive(Debug, Clone, Default)]
pub struct StatusTracker {
    progress: Progress,
}

impl StatusTracker {
    pub fn progress(&self) -> Progress {
        self.progress
    }

    /// Advance with the next status event. Returns the terminal status once one is reached.
    pub fn observe(&mut self, event: TxEvent) -> Option<Terminal> {
        if let Some(err) = event.dispatch_error {
            return Some(Terminal::Dispatch(err));
        }
        match event.status {
            TxStatus::Ready | TxStatus::Broadcast | TxStatus::Retracted(_) => {
                self.progress = Progress::Broadcasting;
                None
            }
            TxStatus::InBlock(hash) => {
                self.progress = Progress::InBlock(hash);
                None
            }
            TxStatus::Finalized(hash) => Some(Terminal::Finalized(hash)),
            status @ (TxStatus::Usurped(_) | TxStatus::Dropped | TxStatus::Invalid) => {
                Some(Terminal::Rejected(status))
            }
        }
    }
}

/// Submits DID calls through a [`ChainConnection`]
pub struct Submitter<C> {
    connection: C,
}

impl<C> From<C> for Submitter<C> {
    fn from(connection: C) -> Self {
        Self { connection }
    }
}

impl<C: ChainConnection> Submitter<C> {
    pub fn new(connection: C) -> Self {
        Self { connection }
    }

    /// Sign `call` with `signer`, dispatch it and wait for exactly one outcome.
    #[tracing::instrument(skip_all, fields(call = call.name()))]
    pub async fn submit(&self, call: DidCall, signer: &LocalWallet) -> TransactionOutcome {
        let signed = match signer.sign_call(call) {
            Ok(signed) => signed,
            Err(e) => {
                return TransactionOutcome::SubmissionError {
                    cause: e.to_string(),
                }
            }
        };

        let mut events = match self.connection.submit_and_watch(signed).await {
            Ok(events) => events,
            Err(e) => {
                log::error!("Unable to submit transaction: {e}");
                return TransactionOutcome::SubmissionError {
                    cause: e.to_string(),
                };
            }
        };

        let mut tracker = StatusTracker::default();
        while let Some(event) = events.next().await {
            let event = match event {
                Ok(event) => event,
                Err(e) => {
                    return TransactionOutcome::SubmissionError {
                        cause: e.to_string(),
                    }
                }
            };
            log::trace!("Transaction status {:?}", event.status);
            if let Some(terminal) = tracker.observe(event) {
                return self.resolve(terminal).await;
            }
        }

        log::debug!(
            "Status stream closed at {:?} before a terminal status",
            tracker.progress()
        );
        TransactionOutcome::SubmissionError {
            cause: "status stream closed before the transaction was finalized".to_string(),
        }
    }

    async fn resolve(&self, terminal: Terminal) -> TransactionOutcome {
        match terminal {
            Terminal::Finalized(block_hash) => {
                log::debug!("Transaction finalized in block {:?}", block_hash);
                TransactionOutcome::Finalized { block_hash }
            }
            Terminal::Dispatch(DispatchError::Module(index)) => {
                match self.connection.find_meta_error(index).await {
                    Ok(meta) => TransactionOutcome::ModuleError {
                        documentation: meta.documentation(),
                        section: meta.section,
                        name: meta.name,
                    },
                    Err(e) => {
                        log::error!("Unable to decode module error {:?}: {e}", index);
                        TransactionOutcome::DispatchError {
                            description: DispatchError::Module(index).to_string(),
                        }
                    }
                }
            }
            Terminal::Dispatch(DispatchError::Other(description)) => {
                TransactionOutcome::DispatchError { description }
            }
            Terminal::Rejected(status) => TransactionOutcome::SubmissionError {
                cause: format!("transaction was not included: {:?}", status),
            },
        }
    }

    /// Create a DID on chain, returning the hash of the finalized block
    pub async fn store_did_on_chain(
        &self,
        document: &DidDocument,
        signer: &LocalWallet,
    ) -> Result<H256, TransactionError> {
        let call = DidCall::add(document)?;
        self.submit(call, signer).await.into_result()
    }

    /// Replace the key of a DID. The previous key is kept in the DID's key history.
    pub async fn update_did_key(
        &self,
        identifier: &Identifier,
        public_key: PublicKey,
        signer: &LocalWallet,
    ) -> Result<H256, TransactionError> {
        let call = DidCall::rotate_key(identifier, public_key)?;
        self.submit(call, signer).await.into_result()
    }

    pub async fn update_metadata(
        &self,
        identifier: &Identifier,
        metadata: &str,
        signer: &LocalWallet,
    ) -> Result<H256, TransactionError> {
        let call = DidCall::update_metadata(identifier, metadata)?;
        self.submit(call, signer).await.into_result()
    }
}
