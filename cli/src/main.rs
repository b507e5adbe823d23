//! ## `ssid`: did:ssid command line client
//!
//! Creates, updates and resolves `did:ssid` DIDs against a node, and can serve an in-memory
//! development ledger that speaks the same JSON-RPC interface.
//!
//! ### Configuration
//!
//! Every flag can also be set through the environment, or a `.env` file in the working
//! directory:
//!
//! | Variable                  | Flag                   | Default     |
//! |---------------------------|------------------------|-------------|
//! | `SSID_NETWORK`            | `--network`            | `local`     |
//! | `SSID_MNEMONIC`           | `--mnemonic`           |             |
//! | `SSID_SIGNER_MNEMONIC`    | `--signer`             |             |
//! | `SSID_HOST`               | `--host` (dev-node)    | `127.0.0.1` |
//! | `SSID_PORT`               | `--port` (dev-node)    | `9944`      |
//! | `SSID_VALIDATOR_MNEMONIC` | `--validator-mnemonic` | dev phrase  |
//!
//! ### Example
//!
//! ```bash
//! ssid dev-node &
//! export SSID_SIGNER_MNEMONIC="test test test test test test test test test test test junk"
//! ssid store stanly -m "$(ssid mnemonic)" --metadata "Metadata"
//! ssid details did:ssid:stanly
//! ```
//!
//! Log output is controlled with `RUST_LOG`, e.g. `RUST_LOG=lib_ssid_did=debug`.

use std::str::FromStr;

use anyhow::{Context, Result};
use ethers::{
    signers::{LocalWallet, Signer},
    types::Address,
};
use jsonrpsee::server::Server;
use serde::Serialize;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use lib_ssid_did::{
    generate_did,
    keyring::{Bip39Keyring, Keyring},
    types::{Identifier, PublicKey},
    DevLedger, Network, NodeApiServer, NodeMethods, Resolver, RpcConnection, Submitter,
};

mod argenv;

use argenv::{Command, SignerArgs};

/// Entrypoint for the did:ssid client
pub async fn run() -> Result<()> {
    init_logging();
    load_env()?;
    let args = argenv::parse_args();
    let network = args.network;

    match args.command {
        Command::Mnemonic => {
            println!("{}", Bip39Keyring::default().generate_mnemonic()?);
        }
        Command::Generate {
            identifier,
            metadata,
            key,
        } => {
            let document = generate_did(
                &Bip39Keyring::with_index(key.index),
                &key.mnemonic,
                &identifier,
                metadata.as_deref(),
            )
            .await?;
            print_json(&document)?;
        }
        Command::Store {
            identifier,
            metadata,
            key,
            signer,
        } => {
            let document = generate_did(
                &Bip39Keyring::with_index(key.index),
                &key.mnemonic,
                &identifier,
                metadata.as_deref(),
            )
            .await?;
            let signer = signing_wallet(&signer).await?;
            let block = submitter(&network)
                .await?
                .store_did_on_chain(&document, &signer)
                .await
                .context(format!("Unable to store {}", document.identity()))?;
            println!("{} finalized in block {:?}", document.identity(), block);
        }
        Command::Details { did } => {
            print_json(&resolver(&network).await?.get_did_details(&did).await?)?;
        }
        Command::Account { did } => {
            print_json(&resolver(&network).await?.resolve_did_to_account(&did).await?)?;
        }
        Command::DidOf { account } => {
            let account = Address::from_str(&account)
                .context(format!("`{account}` is not an account address"))?;
            let did = resolver(&network)
                .await?
                .resolve_account_id_to_did(account)
                .await?
                .map(|did| did.to_string_lossy())
                .transpose()?;
            print_json(&did)?;
        }
        Command::KeyHistory { did } => {
            print_json(&resolver(&network).await?.get_did_key_history(&did).await?)?;
        }
        Command::IsValidator { did } => {
            println!("{}", resolver(&network).await?.is_did_validator(&did).await?);
        }
        Command::RotateKey { did, key, signer } => {
            let identifier = Identifier::from_did(&did)?;
            let new_key = Bip39Keyring::with_index(key.index)
                .derive_key(&key.mnemonic)
                .await?;
            let signer = signing_wallet(&signer).await?;
            let block = submitter(&network)
                .await?
                .update_did_key(&identifier, PublicKey::from_wallet(&new_key), &signer)
                .await
                .context(format!("Unable to rotate the key of {}", identifier.did()))?;
            println!("{} rotated in block {:?}", identifier.did(), block);
        }
        Command::UpdateMetadata {
            did,
            metadata,
            signer,
        } => {
            let identifier = Identifier::from_did(&did)?;
            let signer = signing_wallet(&signer).await?;
            let block = submitter(&network)
                .await?
                .update_metadata(&identifier, &metadata, &signer)
                .await
                .context(format!("Unable to update the metadata of {}", identifier.did()))?;
            println!("{} updated in block {:?}", identifier.did(), block);
        }
        Command::DevNode {
            port,
            host,
            validator,
            validator_mnemonic,
        } => {
            dev_node(host_from(host, port), &validator, &validator_mnemonic).await?;
        }
    }
    Ok(())
}

/// Serve a [`DevLedger`] with a single genesis validator until the server stops
async fn dev_node(server_host: String, validator: &str, mnemonic: &str) -> Result<()> {
    let ledger = DevLedger::new();
    let identifier = Identifier::parse(validator)?;
    let wallet = Bip39Keyring::default()
        .derive_key(mnemonic)
        .await
        .context("Unable to derive the genesis validator key")?;
    ledger
        .add_validator(&identifier, PublicKey::from_wallet(&wallet))
        .await?;

    let server = Server::builder().build(server_host).await?;
    let addr = server.local_addr()?;
    let handle = server.start(NodeMethods::new(ledger).into_rpc());

    log::info!("Genesis validator {} bound to {:?}", identifier.did(), wallet.address());
    log::info!("Server Started at {addr}");
    handle.stopped().await;
    Ok(())
}

async fn connect(network: &Network) -> Result<RpcConnection> {
    RpcConnection::connect(network)
        .await
        .context(format!("Unable to connect to {network}"))
}

async fn resolver(network: &Network) -> Result<Resolver<RpcConnection>> {
    Ok(Resolver::new(connect(network).await?))
}

async fn submitter(network: &Network) -> Result<Submitter<RpcConnection>> {
    Ok(Submitter::new(connect(network).await?))
}

async fn signing_wallet(signer: &SignerArgs) -> Result<LocalWallet> {
    Bip39Keyring::with_index(signer.index)
        .derive_key(&signer.mnemonic)
        .await
        .context("Unable to derive the signing key")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_env() -> Result<()> {
    match dotenvy::dotenv_override() {
        Ok(path) => {
            log::debug!("Env file {} was loaded successfully", path.display());
        }
        Err(err) => {
            log::debug!("env file(s) not loaded : {err}");
        }
    };
    Ok(())
}

fn host_from(host: String, port: u16) -> String {
    format!("{}:{}", host, port)
}

fn init_logging() {
    let fmt = fmt::layer().compact().with_writer(std::io::stderr);
    Registry::default()
        .with(EnvFilter::from_default_env())
        .with(fmt)
        .init()
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_from() {
        assert_eq!(host_from(String::from("abc"), 123), "abc:123");
        assert_eq!(host_from(String::from("abc"), 0), "abc:0");
    }

    #[tokio::test]
    async fn test_signing_wallet() {
        let signer = SignerArgs {
            mnemonic: argenv::DEV_MNEMONIC.to_string(),
            index: 1,
        };
        let wallet = signing_wallet(&signer).await.unwrap();
        assert_eq!(
            wallet.address(),
            Address::from_str("0x70997970c51812dc3a010c7d01b50e0d17dc79c8").unwrap()
        );

        let bad = SignerArgs {
            mnemonic: "not a mnemonic".to_string(),
            index: 0,
        };
        assert!(signing_wallet(&bad).await.is_err());
    }
}
