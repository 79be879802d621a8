//! Logging init: stderr, filtered by `RUST_LOG` when set.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset; `verbose` raises it to debug.
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

/// Initialize logging to stderr. Stdout stays free for command output.
pub fn init_logging(verbose: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}
