//! Structured logging setup, replacing the original's bare `std::cerr`/
//! `std::cout` prints with `tracing` events the `kopt` binary installs a
//! subscriber for at startup.

use tracing_subscriber::EnvFilter;

/// Installs a `tracing-subscriber` writing to stderr, honoring `RUST_LOG`
/// and defaulting to `info` level. Safe to call more than once; later
/// calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
