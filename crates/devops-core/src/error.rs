//! Configuration errors.

use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is missing or empty.
    #[error("missing required setting {0}")]
    Missing(&'static str),

    /// A setting is present but cannot be parsed.
    #[error("invalid value for {name}: {message}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// What was wrong.
        message: String,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
