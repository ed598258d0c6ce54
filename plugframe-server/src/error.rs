//! Error types for the server crate.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to read config {path:?}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {path:?}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid log filter: {0}")]
    LogFilter(String),

    #[error("logging already initialized: {0}")]
    LoggingInit(String),
}

/// Result type for server setup operations.
pub type ServerResult<T> = Result<T, ServerError>;
