//! HTTP server for the OAuth redirect and health checks.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Html,
    routing::get,
    Json, Router,
};
use chrono::{Duration, Utc};
use devops_core::config::OAUTH_CALLBACK_PATH;
use devops_dialogs::{Channel, SignIn};
use devops_models::{ConversationRef, Reply};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::error::ServerError;
use crate::state::BotState;

/// Shared state of the server routes.
#[derive(Clone)]
pub struct ServerState {
    pub bot: Arc<BotState>,
    /// Where sign-in confirmations are posted.
    pub channel: Arc<dyn Channel>,
}

impl ServerState {
    pub fn new(bot: Arc<BotState>, channel: Arc<dyn Channel>) -> Self {
        Self { bot, channel }
    }
}

/// Query string of the OAuth redirect.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Creates the server router.
pub fn create_router(state: ServerState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(OAUTH_CALLBACK_PATH, get(oauth_callback))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds `addr` and serves until the listener fails.
pub async fn serve(addr: &str, state: ServerState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "Callback server listening");
    axum::serve(listener, create_router(state)).await
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Redeems the authorization code and signs the waiting conversation in.
async fn oauth_callback(
    State(state): State<ServerState>,
    Query(params): Query<CallbackParams>,
) -> Result<Html<&'static str>, ServerError> {
    if let Some(error) = params.error {
        warn!(error = %error, "Sign-in refused by the identity service");
        return Err(ServerError::BadRequest(format!("sign-in failed: {}", error)));
    }
    let (Some(code), Some(nonce)) = (params.code, params.state) else {
        return Err(ServerError::BadRequest("code and state are required".into()));
    };
    let Some(oauth) = &state.bot.oauth else {
        return Err(ServerError::NotFound("sign-in is not configured".into()));
    };
    if !state.bot.store.has_pending_sign_in(&nonce).await {
        return Err(ServerError::BadRequest("unknown or expired sign-in state".into()));
    }

    let token = oauth.exchange_code(&code).await?;
    let profile = state.bot.service.get_profile(&token.access_token).await?;
    let display_name = profile.display_name.clone();
    let sign_in = SignIn {
        access_token: token.access_token.clone(),
        profile,
        expires_at: token
            .expires_in_secs()
            .and_then(|secs| i64::try_from(secs).ok())
            .map(|secs| Utc::now() + Duration::seconds(secs)),
    };

    let Some(conversation_id) = state.bot.store.complete_sign_in(&nonce, sign_in).await? else {
        return Err(ServerError::BadRequest("unknown or expired sign-in state".into()));
    };

    let confirmation = Reply::text(format!(
        "Signed in as {}. Send \"connect\" to pick an account and a project.",
        display_name
    ));
    if let Err(e) = state
        .channel
        .send(&ConversationRef::new(conversation_id.clone()), confirmation)
        .await
    {
        warn!(conversation_id = %conversation_id, error = %e, "Failed to confirm sign-in");
    }

    Ok(Html(
        "<html><body><p>You are signed in. You can close this window and return to the chat.</p></body></html>",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use devops_client::MockConnectionFactory;
    use devops_core::{BotConfig, NoopTelemetry};
    use devops_dialogs::{ConversationState, ConversationStore, MemoryChannel};
    use devops_models::ChannelAccount;

    fn bot_state(with_oauth: bool) -> Arc<BotState> {
        let config = BotConfig::from_lookup(|name| match name {
            "TELEGRAM_BOT_TOKEN" => Some("t".to_string()),
            "DEVOPS_APP_ID" | "DEVOPS_APP_SECRET" if with_oauth => Some("app".to_string()),
            _ => None,
        })
        .unwrap();
        Arc::new(BotState::new(
            &config,
            ChannelAccount::new("99", "devops_bot"),
            Arc::new(MockConnectionFactory::default()),
            Arc::new(NoopTelemetry),
            ConversationStore::in_memory(),
        ))
    }

    fn server(bot: Arc<BotState>) -> TestServer {
        let state = ServerState::new(bot, Arc::new(MemoryChannel::new()));
        TestServer::new(create_router(state)).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let server = server(bot_state(false));

        let response = server.get("/health").await;

        response.assert_status_ok();
        let json: Value = response.json();
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_callback_requires_code_and_state() {
        let server = server(bot_state(true));

        let response = server.get(OAUTH_CALLBACK_PATH).add_query_param("code", "abc").await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_callback_reports_provider_error() {
        let server = server(bot_state(true));

        let response = server
            .get(OAUTH_CALLBACK_PATH)
            .add_query_param("error", "access_denied")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let json: Value = response.json();
        assert!(json["error"].as_str().unwrap().contains("access_denied"));
    }

    #[tokio::test]
    async fn test_callback_without_oauth_settings() {
        let server = server(bot_state(false));

        let response = server
            .get(OAUTH_CALLBACK_PATH)
            .add_query_param("code", "abc")
            .add_query_param("state", "nonce")
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_callback_unknown_state() {
        let bot = bot_state(true);
        let waiting = ConversationState {
            pending_sign_in: Some("nonce-1".into()),
            ..Default::default()
        };
        bot.store.put("42", waiting).await.unwrap();
        let server = server(bot);

        let response = server
            .get(OAUTH_CALLBACK_PATH)
            .add_query_param("code", "abc")
            .add_query_param("state", "nonce-2")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
