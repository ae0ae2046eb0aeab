//! Error types for matterdesk.

use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    Missing(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by an injected client data source.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    #[error("Lookup failed: {0}")]
    Failed(String),

    #[error("Lookup timed out")]
    Timeout,
}

/// Client resolution errors.
///
/// `Clone` because one in-flight resolution hands the same outcome to every
/// waiter on that lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("No client record found for {key}")]
    NotFound { key: String },

    #[error("Client resolution unavailable: {reason}")]
    SourceUnavailable { reason: String },
}

/// Report generation errors.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("No report data: {reason}")]
    NoData { reason: String },

    #[error("Report generation failed: {0}")]
    Unexpected(String),
}

impl From<tera::Error> for GenerationError {
    fn from(err: tera::Error) -> Self {
        Self::Unexpected(format!("failed to render report: {}", err))
    }
}

impl From<csv::Error> for GenerationError {
    fn from(err: csv::Error) -> Self {
        Self::Unexpected(format!("failed to write csv: {}", err))
    }
}

/// Result type alias for report generation.
pub type GenerationResult<T> = std::result::Result<T, GenerationError>;
