use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global tracing subscriber.
///
/// Output goes to stderr so the completion on stdout can be piped cleanly.
/// `RUST_LOG` overrides the default `warn` level, e.g. `RUST_LOG=lmquery=debug`.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // Ignore the error if a subscriber is already installed (tests, embedding).
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!cfg!(windows))
        .with_target(false)
        .compact()
        .try_init();
}
