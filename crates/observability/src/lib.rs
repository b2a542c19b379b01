//! Process-wide logging setup shared by the binaries.

/// Initialize structured logging with the default filter.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    tracing::init(tracing::LogFormat::from_env(), tracing::DEFAULT_FILTER);
}

/// Subscriber construction (filters, output format).
pub mod tracing;
