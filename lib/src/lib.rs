//! did:ssid client library
//!
//! This library covers the lifecycle of `did:ssid` decentralized identifiers on a permissioned
//! ledger: building a DID document from a mnemonic and a chosen identifier, submitting it and
//! later key rotations or metadata updates as signed transactions, and resolving DIDs, accounts,
//! validators and key histories.
//!
//! Identifiers are 3 to 20 ASCII letters or digits. On chain a DID such as `did:ssid:swn` is
//! keyed by its fixed-width encoding, see [`types::FixedHex`].
//!
//! # Examples
//!
//! ## Creating a DID
//! A [`Submitter`] signs calls with a wallet derived from a mnemonic and follows each
//! transaction until it is finalized or rejected. Creating DIDs requires a validator account.
//! ```rust, no_run
//! use lib_ssid_did::{generate_did, keyring::{Bip39Keyring, Keyring}, Network, RpcConnection, Submitter};
//!
//! # tokio_test::block_on(async {
//! let keyring = Bip39Keyring::default();
//! let validator = keyring.derive_key("test test test test test test test test test test test junk").await.unwrap();
//!
//! let mnemonic = keyring.generate_mnemonic().unwrap();
//! let document = generate_did(&keyring, &mnemonic, "stanly", Some("Metadata")).await.unwrap();
//!
//! let connection = RpcConnection::connect(&Network::Local).await.unwrap();
//! let submitter = Submitter::new(connection);
//! let block = submitter.store_did_on_chain(&document, &validator).await.unwrap();
//! # })
//! ```
//!
//! ## Resolving a DID
//! ```rust, no_run
//! use lib_ssid_did::{Network, Resolver, RpcConnection};
//!
//! # tokio_test::block_on(async {
//! let connection = RpcConnection::connect(&Network::Local).await.unwrap();
//! let resolver = Resolver::new(connection);
//! let details = resolver.get_did_details("did:ssid:swn").await.unwrap();
//! let account = resolver.resolve_did_to_account("did:ssid:swn").await.unwrap();
//! # })
//! ```
//!
//! ## Serving a development ledger
//! [`NodeMethods`] exposes any [`ChainConnection`] over the node JSON-RPC interface, which is
//! what [`RpcConnection`] speaks.
//! ```rust, no_run
//! use jsonrpsee::server::Server;
//! use lib_ssid_did::{DevLedger, NodeApiServer, NodeMethods};
//!
//! # tokio_test::block_on(async {
//! let server = Server::builder().build("127.0.0.1:9944").await.unwrap();
//! let handle = server.start(NodeMethods::new(DevLedger::new()).into_rpc());
//! handle.stopped().await;
//! # })
//! ```

mod builder;
pub mod connection;
pub mod error;
pub mod keyring;
mod resolver;
pub mod rpc;
pub mod submitter;
pub mod types;

#[cfg(test)]
mod util;

pub use builder::generate_did;
pub use connection::{ChainConnection, DevLedger, Network, RpcConnection};
pub use resolver::Resolver;
pub use rpc::{NodeApiClient, NodeApiServer, NodeMethods};
pub use submitter::Submitter;
pub use types::TransactionOutcome;
