//! Structured logging initialization via `tracing`.

/// Initialize the tracing subscriber.
///
/// `level` is the default filter (`RUST_LOG` overrides it when set);
/// `format` is `"json"` for machine-readable output, anything else for
/// human-readable.
pub fn init_tracing(level: &str, format: &str) {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    if format == "json" {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
