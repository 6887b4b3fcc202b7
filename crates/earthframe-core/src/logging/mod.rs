//! Structured logging with `tracing`.
//!
//! The bridge emits `tracing` events (lifecycle transitions, correlated
//! sends, undecodable payloads); embedding applications decide where they go.
//! [`init_subscriber`] installs a stderr subscriber for binaries and demos,
//! and [`test_utils`] captures events for assertions.

pub mod test_utils;

pub use test_utils::{CapturedLogs, capture_logs};

/// Initialize the global tracing subscriber with stderr output.
///
/// `RUST_LOG` takes precedence over `level`. Subsequent calls are no-ops.
pub fn init_subscriber(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact();

    // set_global_default is a no-op if already set
    let _ = subscriber.try_init();
}
