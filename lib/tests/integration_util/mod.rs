//! Shared setup code for integration tests
use std::{future::Future, net::SocketAddr, sync::Arc, sync::Once, time::Duration};

use ethers::signers::LocalWallet;
use jsonrpsee::{
    server::Server,
    ws_client::{WsClient, WsClientBuilder},
};
use lib_ssid_did::{
    keyring::{Bip39Keyring, Keyring},
    types::{Identifier, PublicKey},
    DevLedger, NodeApiServer, NodeMethods, Resolver, RpcConnection, Submitter,
};
use tokio::time::timeout as timeout_tokio;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

pub const TEST_MNEMONIC: &str = "test test test test test test test test test test test junk";

static INIT: Once = Once::new();

#[ctor::ctor]
fn init_logging() {
    INIT.call_once(|| {
        let fmt = fmt::layer().compact();
        Registry::default()
            .with(EnvFilter::from_default_env())
            .with(fmt)
            .init()
    })
}

/// Wallet derived from [`TEST_MNEMONIC`] at account `index`. Index 0 is the genesis validator.
pub async fn wallet(index: u32) -> LocalWallet {
    Bip39Keyring::with_index(index)
        .derive_key(TEST_MNEMONIC)
        .await
        .unwrap()
}

/// Everything a test gets to talk to the node with
pub struct Context {
    /// raw JSON-RPC client
    pub client: WsClient,
    pub submitter: Submitter<Arc<RpcConnection>>,
    pub resolver: Resolver<Arc<RpcConnection>>,
    /// the genesis validator `did:ssid:swn`
    pub validator: LocalWallet,
}

async fn connect(addr: SocketAddr) -> WsClient {
    WsClientBuilder::default()
        .build(&format!("ws://{addr}"))
        .await
        .unwrap()
}

/// Test harness serving a fresh [`DevLedger`] over WebSockets.
///
/// The ledger starts with a single validator, `did:ssid:swn`, bound to [`wallet(0)`]. Optionally
/// provide a timeout [`std::time::Duration`] deadline by which the test must finish.
///
/// # Panics
///
/// If `fun` panics, the test will end upon reaching `timeout`. Default timeout is 5 seconds.
pub async fn with_client<F, R, T>(timeout: Option<Duration>, fun: F) -> T
where
    F: FnOnce(Context) -> R + 'static,
    R: Future<Output = T> + Send + 'static,
{
    let ledger = DevLedger::new();
    let validator = wallet(0).await;
    ledger
        .add_validator(
            &Identifier::parse("swn").unwrap(),
            PublicKey::from_wallet(&validator),
        )
        .await
        .unwrap();

    let server = Server::builder().build("127.0.0.1:0").await.unwrap();
    let addr = server.local_addr().unwrap();
    let handle = server.start(NodeMethods::new(ledger).into_rpc());

    let connection = Arc::new(RpcConnection::from(connect(addr).await));
    let context = Context {
        client: connect(addr).await,
        submitter: Submitter::new(connection.clone()),
        resolver: Resolver::new(connection),
        validator,
    };

    // jsonrpsee's client is !UnwindSafe, so a panicking test is bounded by the timeout instead
    let result = timeout_tokio(timeout.unwrap_or(Duration::from_secs(5)), fun(context)).await;

    handle.stop().unwrap();
    handle.stopped().await;

    if result.is_err() {
        log::debug!("Test timed out due to panic, or running too long.");
    }
    result.unwrap()
}
