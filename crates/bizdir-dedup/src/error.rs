//! Error types for bizdir-dedup

use bizdir_domain::IngestError;
use thiserror::Error;

/// Result type alias for dedup operations
pub type Result<T> = std::result::Result<T, DedupError>;

/// Main error type
///
/// The engine itself is total over a validated batch; these variants come
/// from configuration and from the file layer around it.
#[derive(Error, Debug)]
pub enum DedupError {
    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Batch rejected at ingestion
    #[error("Ingestion error: {0}")]
    Ingest(#[from] IngestError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(String),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Value outside its allowed range
    #[error("Value out of range: {0}")]
    OutOfRange(String),

    /// Abbreviation rule that cannot be compiled
    #[error("Invalid abbreviation rule '{token}': {message}")]
    InvalidRule { token: String, message: String },

    /// Config text could not be parsed or written
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<std::io::Error> for DedupError {
    fn from(err: std::io::Error) -> Self {
        DedupError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for DedupError {
    fn from(err: serde_json::Error) -> Self {
        DedupError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(err: toml::ser::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}
