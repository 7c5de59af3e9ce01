//! Error types for the Telegram front-end.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use devops_client::ClientError;
use devops_core::ConfigError;
use devops_dialogs::DialogError;
use serde_json::json;
use thiserror::Error;

/// Errors that can occur while starting or running the bot.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// Configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Failed to start the bot.
    #[error("failed to start bot: {0}")]
    BotStartFailed(String),

    /// The callback server could not bind or stopped with an error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),

    /// Handling an activity failed.
    #[error(transparent)]
    Dialog(#[from] DialogError),
}

/// Result type for bot operations.
pub type Result<T> = std::result::Result<T, TelegramError>;

/// Errors returned by the callback server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Bad request - missing or unknown parameters.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Sign-in is not configured.
    #[error("not found: {0}")]
    NotFound(String),

    /// The identity service or the DevOps API failed.
    #[error("upstream error: {0}")]
    Upstream(#[from] ClientError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DialogError> for ServerError {
    fn from(err: DialogError) -> Self {
        match err {
            DialogError::Client(e) => ServerError::Upstream(e),
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": self.to_string()
        }));
        (status, body).into_response()
    }
}
