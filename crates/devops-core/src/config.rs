//! Shared configuration for the DevOps bot.
//!
//! Provides functions to locate the bot's state directory and the settings
//! the bootstrap code needs to wire the bot together.
//!
//! # Storage Structure
//!
//! All application data is stored under `~/.devops-bot/`:
//!
//! ```text
//! ~/.devops-bot/
//! ├── logs/         # Telemetry and application logs
//! ├── config/       # .env.local with secrets
//! └── state/        # Conversation state
//! ```
//!
//! # Environment Variables
//!
//! - `DEVOPS_BOT_STATE_DIR`: Override the base state directory
//! - `TELEGRAM_BOT_TOKEN`: Chat platform token (required)
//! - `TELEGRAM_API_URL`: Local Bot API server / emulator override
//! - `DEVOPS_APP_ID`, `DEVOPS_APP_SECRET`: OAuth application credentials
//! - `DEVOPS_AUTHORIZE_URL`, `DEVOPS_TOKEN_URL`, `DEVOPS_APP_SCOPE`: OAuth endpoints and scope
//! - `DEVOPS_CALLBACK_URL`: Public base URL of the callback server
//! - `BOT_HTTP_PORT`: Callback server port
//! - `BOT_EULA_URL`: EULA link shown in the welcome message

use std::path::PathBuf;
use std::sync::OnceLock;

use tracing::debug;
use url::Url;

use crate::error::{ConfigError, Result};

/// Environment variable for custom state directory.
pub const STATE_DIR_ENV: &str = "DEVOPS_BOT_STATE_DIR";

pub const TELEGRAM_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";
pub const TELEGRAM_API_URL_ENV: &str = "TELEGRAM_API_URL";
pub const APP_ID_ENV: &str = "DEVOPS_APP_ID";
pub const APP_SECRET_ENV: &str = "DEVOPS_APP_SECRET";
pub const AUTHORIZE_URL_ENV: &str = "DEVOPS_AUTHORIZE_URL";
pub const TOKEN_URL_ENV: &str = "DEVOPS_TOKEN_URL";
pub const APP_SCOPE_ENV: &str = "DEVOPS_APP_SCOPE";
pub const CALLBACK_URL_ENV: &str = "DEVOPS_CALLBACK_URL";
pub const HTTP_PORT_ENV: &str = "BOT_HTTP_PORT";
pub const EULA_URL_ENV: &str = "BOT_EULA_URL";

/// Default state directory name under home.
const DEFAULT_STATE_DIR: &str = ".devops-bot";

const DEFAULT_AUTHORIZE_URL: &str = "https://app.vssps.visualstudio.com/oauth2/authorize";
const DEFAULT_TOKEN_URL: &str = "https://app.vssps.visualstudio.com/oauth2/token";
const DEFAULT_SCOPE: &str = "vso.build_execute vso.profile vso.project vso.release_manage";
const DEFAULT_CALLBACK_URL: &str = "http://localhost:3978";
const DEFAULT_HTTP_PORT: u16 = 3978;
const DEFAULT_EULA_URL: &str = "https://github.com/devops-bot/devops-bot/blob/main/EULA.md";

/// Path of the OAuth redirect handler on the callback server.
pub const OAUTH_CALLBACK_PATH: &str = "/oauth/callback";

// Subdirectory names
const LOGS_SUBDIR: &str = "logs";
const CONFIG_SUBDIR: &str = "config";
const STATE_SUBDIR: &str = "state";

static STATE_DIR_CACHE: OnceLock<PathBuf> = OnceLock::new();

/// Get the bot's state directory.
///
/// The state directory is determined by:
/// 1. `DEVOPS_BOT_STATE_DIR` environment variable if set
/// 2. `~/.devops-bot` if home directory is available
/// 3. `.devops-bot` in current directory as fallback
pub fn state_dir() -> PathBuf {
    STATE_DIR_CACHE
        .get_or_init(|| {
            std::env::var(STATE_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    dirs::home_dir()
                        .map(|h| h.join(DEFAULT_STATE_DIR))
                        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
                })
        })
        .clone()
}

/// Get the logs directory.
pub fn logs_dir() -> PathBuf {
    state_dir().join(LOGS_SUBDIR)
}

/// Get the user config directory.
pub fn config_dir() -> PathBuf {
    state_dir().join(CONFIG_SUBDIR)
}

/// Get the runtime state directory.
pub fn runtime_state_dir() -> PathBuf {
    state_dir().join(STATE_SUBDIR)
}

/// Get the conversation state file path.
pub fn conversations_file() -> PathBuf {
    runtime_state_dir().join("conversations.json")
}

/// Get the telemetry event log path (JSON lines).
pub fn telemetry_file() -> PathBuf {
    logs_dir().join("telemetry.jsonl")
}

/// Get the .env.local file path (secrets).
pub fn env_file() -> PathBuf {
    config_dir().join(".env.local")
}

/// Ensure the state directory and all subdirectories exist.
///
/// # Errors
/// Returns an error if any directory cannot be created.
pub fn ensure_all_dirs() -> std::io::Result<()> {
    std::fs::create_dir_all(logs_dir())?;
    std::fs::create_dir_all(config_dir())?;
    std::fs::create_dir_all(runtime_state_dir())?;
    Ok(())
}

/// Load environment files: the config dir's `.env.local` first, then a local
/// `.env.local` or `.env`. Variables already set are never overwritten.
pub fn load_env() {
    let env_path = env_file();
    if env_path.exists() {
        if let Err(e) = dotenvy::from_path(&env_path) {
            debug!(error = %e, path = %env_path.display(), "Could not load env file");
        }
    }
    let _ = dotenvy::from_filename(".env.local").or_else(|_| dotenvy::dotenv());
}

/// OAuth application settings used for sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthSettings {
    /// Application (client) id.
    pub app_id: String,
    /// Client secret, sent as the client assertion.
    pub app_secret: String,
    /// Authorize endpoint.
    pub authorize_url: Url,
    /// Token endpoint.
    pub token_url: Url,
    /// Space separated scopes.
    pub scope: String,
    /// Full redirect URI registered with the application.
    pub redirect_url: Url,
}

/// Settings consumed by the bootstrap code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotConfig {
    /// Chat platform token.
    pub telegram_token: String,
    /// Optional Bot API server override (local emulator).
    pub telegram_api_url: Option<Url>,
    /// OAuth settings; `None` disables sign-in.
    pub oauth: Option<OAuthSettings>,
    /// Port of the callback/health server.
    pub http_port: u16,
    /// EULA link for the welcome message.
    pub eula_url: String,
}

impl BotConfig {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which returns the value of a
    /// variable if set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let telegram_token = get(TELEGRAM_TOKEN_ENV).ok_or(ConfigError::Missing(TELEGRAM_TOKEN_ENV))?;

        let telegram_api_url = get(TELEGRAM_API_URL_ENV)
            .map(|v| parse_url(TELEGRAM_API_URL_ENV, &v))
            .transpose()?;

        let http_port = match get(HTTP_PORT_ENV) {
            Some(v) => v.parse().map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
                name: HTTP_PORT_ENV,
                message: e.to_string(),
            })?,
            None => DEFAULT_HTTP_PORT,
        };

        let oauth = match (get(APP_ID_ENV), get(APP_SECRET_ENV)) {
            (Some(app_id), Some(app_secret)) => {
                let callback = get(CALLBACK_URL_ENV).unwrap_or_else(|| DEFAULT_CALLBACK_URL.to_string());
                let redirect = format!("{}{}", callback.trim_end_matches('/'), OAUTH_CALLBACK_PATH);
                Some(OAuthSettings {
                    app_id,
                    app_secret,
                    authorize_url: parse_url(
                        AUTHORIZE_URL_ENV,
                        &get(AUTHORIZE_URL_ENV).unwrap_or_else(|| DEFAULT_AUTHORIZE_URL.to_string()),
                    )?,
                    token_url: parse_url(
                        TOKEN_URL_ENV,
                        &get(TOKEN_URL_ENV).unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string()),
                    )?,
                    scope: get(APP_SCOPE_ENV).unwrap_or_else(|| DEFAULT_SCOPE.to_string()),
                    redirect_url: parse_url(CALLBACK_URL_ENV, &redirect)?,
                })
            }
            _ => None,
        };

        Ok(Self {
            telegram_token,
            telegram_api_url,
            oauth,
            http_port,
            eula_url: get(EULA_URL_ENV).unwrap_or_else(|| DEFAULT_EULA_URL.to_string()),
        })
    }

    /// Address the callback server binds to.
    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.http_port)
    }
}

fn parse_url(name: &'static str, value: &str) -> Result<Url> {
    Url::parse(value).map_err(|e| ConfigError::Invalid {
        name,
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_state_dir_paths() {
        assert!(logs_dir().ends_with("logs"));
        assert!(config_dir().ends_with("config"));
        assert!(runtime_state_dir().ends_with("state"));
        assert!(conversations_file().ends_with("conversations.json"));
        assert!(telemetry_file().ends_with("telemetry.jsonl"));
        assert!(env_file().ends_with(".env.local"));
    }

    #[test]
    fn test_missing_token() {
        let err = BotConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(TELEGRAM_TOKEN_ENV)));
    }

    #[test]
    fn test_defaults() {
        let config = BotConfig::from_lookup(lookup(&[(TELEGRAM_TOKEN_ENV, "123:abc")])).unwrap();
        assert_eq!(config.telegram_token, "123:abc");
        assert_eq!(config.http_port, DEFAULT_HTTP_PORT);
        assert!(config.telegram_api_url.is_none());
        assert!(config.oauth.is_none());
        assert_eq!(config.bind_address(), "0.0.0.0:3978");
    }

    #[test]
    fn test_oauth_settings() {
        let config = BotConfig::from_lookup(lookup(&[
            (TELEGRAM_TOKEN_ENV, "t"),
            (APP_ID_ENV, "app"),
            (APP_SECRET_ENV, "secret"),
            (CALLBACK_URL_ENV, "https://bot.example.com/"),
        ]))
        .unwrap();
        let oauth = config.oauth.unwrap();
        assert_eq!(oauth.app_id, "app");
        assert_eq!(oauth.redirect_url.as_str(), "https://bot.example.com/oauth/callback");
        assert_eq!(oauth.authorize_url.as_str(), DEFAULT_AUTHORIZE_URL);
        assert_eq!(oauth.scope, DEFAULT_SCOPE);
    }

    #[test]
    fn test_invalid_port() {
        let err = BotConfig::from_lookup(lookup(&[(TELEGRAM_TOKEN_ENV, "t"), (HTTP_PORT_ENV, "http")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: HTTP_PORT_ENV, .. }));
    }

    #[test]
    fn test_emulator_override() {
        let config = BotConfig::from_lookup(lookup(&[
            (TELEGRAM_TOKEN_ENV, "t"),
            (TELEGRAM_API_URL_ENV, "http://localhost:8081"),
        ]))
        .unwrap();
        assert_eq!(config.telegram_api_url.unwrap().as_str(), "http://localhost:8081/");
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let config = BotConfig::from_lookup(lookup(&[
            (TELEGRAM_TOKEN_ENV, "t"),
            (APP_ID_ENV, "  "),
            (APP_SECRET_ENV, "secret"),
        ]))
        .unwrap();
        assert!(config.oauth.is_none());
    }
}
