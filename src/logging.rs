//! Diagnostics setup
//!
//! Logs go to stderr so stdout stays machine-readable.

use tracing_subscriber::EnvFilter;

/// Default filter for the given verbosity flags; `RUST_LOG` wins when set
pub fn default_filter(verbose: bool, quiet: bool) -> &'static str {
    if verbose {
        "topicflat=debug"
    } else if quiet {
        "topicflat=error"
    } else {
        "topicflat=warn"
    }
}

/// Install the global subscriber. Safe to call more than once.
pub fn init(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose, quiet)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
