//! Telemetry helpers for structured logging and tracing.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset: lifecycle events from this crate at
/// `info`, everything else at `warn`.
pub const DEFAULT_LOG_FILTER: &str = "prometheus_async_op=info,warn";

/// Initialize tracing. Hosts can install their own subscriber; this helper
/// installs a fmt subscriber if none is set.
///
/// `RUST_LOG` takes precedence over [`DEFAULT_LOG_FILTER`], so
/// `RUST_LOG=prometheus_async_op=debug` shows every transition.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
