//! Structured logging bootstrap for the CLI binary. Library crates only
//! ever emit `tracing` events; this is the one place a subscriber is
//! installed (SPEC_FULL §A "Logging").

use tracing_subscriber::EnvFilter;

/// Initializes a `tracing-subscriber` formatter respecting `RUST_LOG`, or a
/// sensible default scoped to this workspace's crates when unset.
pub fn setup_tracing(verbose: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("dotnet_acquire=debug,info")
    } else {
        EnvFilter::new("dotnet_acquire=info,warn,error")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}
