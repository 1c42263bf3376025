//! Tracing/logging initialization.
//!
//! Production output is one JSON object per line, filtered by `RUST_LOG`.

use tracing_subscriber::EnvFilter;

/// Directive used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    init_with_default_filter(DEFAULT_FILTER);
}

/// Like [`init`], with a caller-chosen fallback filter (e.g. `"evbill_infra=debug"`).
pub fn init_with_default_filter(default_filter: &str) {
    let filter = filter_or(default_filter);

    // JSON logs + timestamps, configurable via RUST_LOG.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}

/// Human-readable output captured by the test harness.
pub fn init_for_tests() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter_or("debug"))
        .with_test_writer()
        .try_init();
}

fn filter_or(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}
