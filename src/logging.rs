//! Logging setup shared by both binaries.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence; otherwise `debug` when `verbose`, else
/// `info`. Output goes to stderr. `timestamps` is off for one-shot commands
/// and on for the long-running monitor.
pub fn init(verbose: bool, timestamps: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let layer = fmt::layer().with_writer(std::io::stderr).with_target(false);
    let registry = tracing_subscriber::registry().with(filter);

    if timestamps {
        registry.with(layer).init();
    } else {
        registry.with(layer.without_time()).init();
    }
}
