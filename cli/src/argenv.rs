use clap::{Parser, Subcommand};
use lib_ssid_did::Network;

//
// system arguments and environment for the client
//

pub(crate) const DEFAULT_NETWORK: &str = "local";
pub(crate) const DEFAULT_HOST: &str = "127.0.0.1";
pub(crate) const DEFAULT_PORT: u16 = 9944;
pub(crate) const DEFAULT_VALIDATOR: &str = "swn";
/// Well-known development mnemonic, only ever used to seed the genesis validator of `dev-node`
pub(crate) const DEV_MNEMONIC: &str = "test test test test test test test test test test test junk";

#[derive(Parser, Debug)]
#[command(name = "ssid", version = "0.1.0", about = "did:ssid client")]
pub struct Args {
    /// `local` or a ws:// or wss:// node endpoint
    #[arg(short = 'n', long = "network", env = "SSID_NETWORK", default_value = DEFAULT_NETWORK, global = true)]
    pub network: Network,
    #[command(subcommand)]
    pub command: Command,
}

/// Mnemonic and account index of the key a DID is bound to
#[derive(clap::Args, Debug)]
pub struct KeyArgs {
    #[arg(short = 'm', long = "mnemonic", env = "SSID_MNEMONIC")]
    pub mnemonic: String,
    #[arg(long = "index", default_value_t = 0)]
    pub index: u32,
}

/// Mnemonic and account index of the validator signing the transaction
#[derive(clap::Args, Debug)]
pub struct SignerArgs {
    #[arg(id = "signer_mnemonic", short = 's', long = "signer", env = "SSID_SIGNER_MNEMONIC")]
    pub mnemonic: String,
    #[arg(id = "signer_index", long = "signer-index", default_value_t = 0)]
    pub index: u32,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a new 12 word mnemonic
    Mnemonic,
    /// Build a DID document without submitting it
    Generate {
        identifier: String,
        #[arg(long = "metadata")]
        metadata: Option<String>,
        #[command(flatten)]
        key: KeyArgs,
    },
    /// Build a DID document and store it on chain
    Store {
        identifier: String,
        #[arg(long = "metadata")]
        metadata: Option<String>,
        #[command(flatten)]
        key: KeyArgs,
        #[command(flatten)]
        signer: SignerArgs,
    },
    /// Show the record stored for a DID
    Details { did: String },
    /// Show the account a DID is bound to
    Account { did: String },
    /// Show the DID bound to an account
    DidOf { account: String },
    /// List the keys a DID was rotated away from
    KeyHistory { did: String },
    /// Check whether a DID is a validator
    IsValidator { did: String },
    /// Bind a DID to the key derived from a new mnemonic
    RotateKey {
        did: String,
        #[command(flatten)]
        key: KeyArgs,
        #[command(flatten)]
        signer: SignerArgs,
    },
    /// Replace the metadata of a DID
    UpdateMetadata {
        did: String,
        metadata: String,
        #[command(flatten)]
        signer: SignerArgs,
    },
    /// Serve an in-memory development ledger over JSON-RPC
    DevNode {
        #[arg(short = 'p', long = "port", env = "SSID_PORT", default_value_t = DEFAULT_PORT)]
        port: u16,
        #[arg(long = "host", env = "SSID_HOST", default_value = DEFAULT_HOST)]
        host: String,
        /// Identifier of the genesis validator
        #[arg(long = "validator", default_value = DEFAULT_VALIDATOR)]
        validator: String,
        /// Mnemonic of the genesis validator's key
        #[arg(long = "validator-mnemonic", env = "SSID_VALIDATOR_MNEMONIC", default_value = DEV_MNEMONIC)]
        validator_mnemonic: String,
    },
}

pub fn parse_args() -> Args {
    let args = Args::parse();
    log::debug!("Network: {}, command: {:?}", args.network, command_name(&args.command));
    args
}

/// Name of the subcommand, for logging without leaking mnemonics
fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Mnemonic => "mnemonic",
        Command::Generate { .. } => "generate",
        Command::Store { .. } => "store",
        Command::Details { .. } => "details",
        Command::Account { .. } => "account",
        Command::DidOf { .. } => "did-of",
        Command::KeyHistory { .. } => "key-history",
        Command::IsValidator { .. } => "is-validator",
        Command::RotateKey { .. } => "rotate-key",
        Command::UpdateMetadata { .. } => "update-metadata",
        Command::DevNode { .. } => "dev-node",
    }
}
