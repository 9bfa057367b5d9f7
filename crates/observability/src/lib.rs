//! Tracing and logging (shared setup).

/// Initialize process-wide observability (tracing/logging).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(LogFormat::Json);
}

pub use self::tracing::LogFormat;

/// Tracing configuration (filters, layers).
pub mod tracing;
