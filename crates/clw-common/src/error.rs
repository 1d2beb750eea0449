//! Error types shared across CLW crates

use thiserror::Error;

/// Result type alias for cross-cutting CLW operations
pub type Result<T> = std::result::Result<T, CommonError>;

/// Error type for configuration and bootstrap concerns
#[derive(Error, Debug)]
pub enum CommonError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Logging setup error: {0}")]
    Logging(String),
}

impl CommonError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a logging setup error
    pub fn logging(msg: impl Into<String>) -> Self {
        Self::Logging(msg.into())
    }
}
