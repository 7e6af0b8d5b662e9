//! Structured logging setup

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

use crate::config::LoggingConfig;

/// Error returned when the global subscriber cannot be installed
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Invalid log filter '{filter}': {message}")]
    Filter { filter: String, message: String },

    #[error("Failed to install tracing subscriber: {0}")]
    Install(String),
}

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. Logs always go to
/// stderr so that JSON command output on stdout stays machine readable.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(value) if !value.trim().is_empty() => value,
        _ => config.level.clone(),
    };

    let env_filter = EnvFilter::try_new(&filter).map_err(|e| LoggingError::Filter {
        filter: filter.clone(),
        message: e.to_string(),
    })?;

    let result = if config.format.eq_ignore_ascii_case("json") {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_current_span(false)
            .try_init()
    } else {
        fmt()
            .compact()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init()
    };

    result.map_err(|e| LoggingError::Install(e.to_string()))
}
