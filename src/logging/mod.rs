// Logging module for structured logging using the tracing crate

use serde::{Deserialize, Serialize};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

/// Output format of log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line, for log aggregation systems
    #[default]
    Json,
    /// Human-readable multi-line output
    Pretty,
}

fn default_level() -> String {
    "info".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set (e.g. "info", "proofmark=debug")
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), String> {
        EnvFilter::try_new(&self.level)
            .map(|_| ())
            .map_err(|e| format!("Invalid logging.level '{}': {}", self.level, e))
    }
}

/// Logging error types
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Invalid log filter: {0}")]
    Filter(String),
    #[error("Failed to initialize subscriber: {0}")]
    Init(String),
}

/// Filter from `RUST_LOG`, falling back to the configured level.
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, LoggingError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => {
            EnvFilter::try_new(&config.level).map_err(|e| LoggingError::Filter(e.to_string()))
        }
    }
}

/// Initialize the global tracing subscriber
///
/// The subscriber is configured with:
/// - JSON or pretty formatting
/// - Filtering from `RUST_LOG`, or `config.level` when unset
/// - Output to stderr, keeping stdout free for command output
///
/// # Errors
///
/// Returns an error if the filter is invalid or a global subscriber is
/// already installed.
pub fn init_subscriber(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = build_filter(config)?;

    match config.format {
        LogFormat::Json => Registry::default()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Pretty => Registry::default()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    }
    .map_err(|e| LoggingError::Init(e.to_string()))
}
