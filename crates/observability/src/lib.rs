//! Tracing and logging setup shared by the billing binaries and tests.

/// Initialize process-wide structured logging.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Tracing configuration (filters, layers).
pub mod tracing;

pub use self::tracing::{init_for_tests, init_with_default_filter};
