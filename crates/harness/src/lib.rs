//! Test support for the tracker import engine: payload fixtures, scripted
//! validators and log setup.

pub mod scripted;
pub mod setup;

pub use scripted::{CallLog, ScriptedBundleValidator, ScriptedValidator, call_log};
pub use setup::{Setup, SetupBuilder};

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Route engine logs to the test output. Honors `RUST_LOG`; safe to call
/// from every test.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tracker_engine=info,tracker_storage=info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}
