//! Error types for the remote access layer.

use thiserror::Error;

/// Errors raised by the facade and its connections.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A precondition on the arguments failed; no remote call was made.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The service answered with a non-success status.
    #[error("remote call failed with status {status}: {message}")]
    Remote {
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    /// The request could not be sent or the response not read.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The service answered with data this client does not understand.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// Creates an `InvalidArgument` error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Whether this is a local precondition failure.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Whether the service reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Remote { status: 404, .. })
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Http(e.to_string())
    }
}

/// Result type for remote operations.
pub type Result<T> = std::result::Result<T, ClientError>;
