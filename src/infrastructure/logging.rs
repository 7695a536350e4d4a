//! Structured logging with tracing

use crate::config::LoggingConfig;
use crate::domain::error::{Error, Result};
use tracing_subscriber::EnvFilter;

/// Initialize logging from configuration.
///
/// The `SOLBAL_LOG` environment variable overrides the configured level
/// with a full `EnvFilter` directive.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_env("SOLBAL_LOG").unwrap_or_else(|_| EnvFilter::new(&config.level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    let init = if config.json_format {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    init.map_err(|e| Error::config(format!("failed to initialize logging: {e}")))
}

/// Validate a configured log level string.
pub fn parse_log_level(level: &str) -> Result<tracing::Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(tracing::Level::TRACE),
        "debug" => Ok(tracing::Level::DEBUG),
        "info" => Ok(tracing::Level::INFO),
        "warn" | "warning" => Ok(tracing::Level::WARN),
        "error" => Ok(tracing::Level::ERROR),
        _ => Err(Error::config(format!(
            "invalid log level: {level}. Use trace, debug, info, warn, or error"
        ))),
    }
}
