//! Tracing subscriber setup for binaries built on Quill.

use tracing_subscriber::EnvFilter;

/// Installs a formatted stderr subscriber filtered by `RUST_LOG`.
///
/// Falls back to `info` when `RUST_LOG` is unset or unparseable. Calling
/// it twice is harmless; the second call leaves the first subscriber in
/// place.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
