//! Logging setup for binaries and demos

use tracing_subscriber::EnvFilter;

/// Install a `fmt` subscriber filtered by `RUST_LOG`, or by `default_filter`
/// when the variable is unset or invalid
///
/// Calling it twice is harmless: the second subscriber is not installed.
///
/// ```ignore
/// let config = AppConfig::from_yaml_file("app.yaml")?;
/// init_tracing(&config.logging.filter);
/// ```
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
