//! Diagnostic logging setup.
//!
//! Diagnostics go to stderr through `tracing`; the test report itself is
//! written straight to stdout and never passes through here. `RUST_LOG`
//! takes precedence over the default level.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Safe to call more than once.
pub fn init(verbose: bool) {
    let default = if verbose { "fsconform=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
