use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber; `RUST_LOG` overrides the default `info` level.
/// Logs go to stderr so they never interleave with rendered console output.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}
