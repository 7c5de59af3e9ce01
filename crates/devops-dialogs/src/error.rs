//! Error types for the command router and dialogs.

use devops_client::ClientError;
use thiserror::Error;

/// Errors raised while handling an activity.
#[derive(Debug, Error)]
pub enum DialogError {
    /// The activity is missing something the router needs.
    #[error("invalid activity: {0}")]
    InvalidArgument(String),

    /// A facade call failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// A reply could not be delivered.
    #[error("failed to send reply: {0}")]
    Channel(String),

    /// Conversation state could not be read or written.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Conversation state could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DialogError {
    /// Creates an `InvalidArgument` error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

/// Result type for dialog operations.
pub type Result<T> = std::result::Result<T, DialogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_is_transparent() {
        let err: DialogError = ClientError::Remote {
            status: 401,
            message: "unauthorized".into(),
        }
        .into();
        assert_eq!(err.to_string(), "remote call failed with status 401: unauthorized");
        assert!(matches!(err, DialogError::Client(_)));
    }

    #[test]
    fn test_invalid_display() {
        assert_eq!(
            DialogError::invalid("missing sender").to_string(),
            "invalid activity: missing sender"
        );
    }
}
