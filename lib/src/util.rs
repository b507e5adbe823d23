//! Test-only logging setup. `RUST_LOG=lib_ssid_did=trace` shows every status event a
//! submission goes through.

use std::sync::Once;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

static LOGGING: Once = Once::new();

#[ctor::ctor]
fn init_test_logging() {
    LOGGING.call_once(|| {
        let _ = Registry::default()
            .with(EnvFilter::from_default_env())
            .with(fmt::layer().compact().with_test_writer())
            .try_init();
    })
}
