//! Crate-standard logging setup for the workspace binaries.

use tracing_subscriber::EnvFilter;

/// Installs a compact `tracing` subscriber writing to stderr.
///
/// `default_filter` is an `EnvFilter` directive (`info`, `kp_gen=debug`, ...) used when `RUST_LOG`
/// is unset. Calling this more than once is harmless; later calls keep the first subscriber.
pub fn setup(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .is_err()
    {
        tracing::debug!("global subscriber already installed, keeping it");
    }
}
