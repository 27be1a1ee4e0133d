//! Logging initialization for the CLI.
//!
//! Library code only emits `tracing` events; the binary installs the
//! subscriber. Logs go to stderr so stdout stays clean for reports and JSON.

use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Build the event filter.
///
/// `--verbose` forces DEBUG and `--quiet` forces ERROR. Otherwise `RUST_LOG`
/// is honored, falling back to WARN.
pub fn filter(verbose: bool, quiet: bool) -> EnvFilter {
    if quiet {
        EnvFilter::default().add_directive(Level::ERROR.into())
    } else if verbose {
        EnvFilter::default().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::builder()
            .with_default_directive(LevelFilter::WARN.into())
            .from_env_lossy()
    }
}

/// Initialize the tracing subscriber.
///
/// Calling it again is a no-op.
pub fn init(verbose: bool, quiet: bool) {
    let _ = tracing_subscriber::registry()
        .with(filter(verbose, quiet))
        .with(
            fmt::layer()
                .with_target(verbose)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .try_init();
}
