//! Stream Audit Command-Line Tools
//!
//! Shared bootstrap for the `event-audit` and `interval-audit` binaries.

use tracing_subscriber::EnvFilter;

/// Initialize tracing output. `RUST_LOG` overrides the default `info` level.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}
