//! Diagnostic tracing, separate from the operator-facing output.
//!
//! The per-file error lines and the summary line are printed directly by
//! [`ConsoleReporter`](crate::reporter::ConsoleReporter) so their text stays
//! stable. Everything else (skipped files, traversal errors, pool sizing) goes
//! through `tracing` to stderr and is silent unless asked for.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global subscriber.
///
/// `RUST_LOG` wins when set. Otherwise the level is `warn`, or `debug` for
/// this crate when `verbose` is set.
pub fn init(verbose: bool) {
    let default = if verbose { "warn,treesub=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // A second call (e.g. from tests) leaves the first subscriber in place.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
}
