//! Logging setup
//!
//! `RUST_LOG` controls the filter; the default keeps request-level events
//! (DEBUG) out of benchmark runs.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber. Later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()),
        )
        .try_init();
}
