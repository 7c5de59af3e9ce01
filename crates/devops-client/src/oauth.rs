//! OAuth sign-in against the DevOps identity service.
//!
//! The service uses the JWT-bearer assertion flow: the authorize redirect
//! carries `response_type=Assertion` and the code is exchanged by posting
//! the client secret as a client assertion.

use devops_core::OAuthSettings;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::error::{ClientError, Result};

const CLIENT_ASSERTION_TYPE: &str = "urn:ietf:params:oauth:client-assertion-type:jwt-bearer";
const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Token endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Lifetime in seconds; the service sends it either as a number or as a string.
    #[serde(default)]
    pub expires_in: Option<serde_json::Value>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl TokenResponse {
    /// Lifetime in seconds, if the service reported a usable one.
    pub fn expires_in_secs(&self) -> Option<u64> {
        match self.expires_in.as_ref()? {
            serde_json::Value::Number(n) => n.as_u64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Builds authorize links and redeems authorization codes.
#[derive(Clone)]
pub struct OAuthClient {
    client: reqwest::Client,
    settings: OAuthSettings,
}

impl OAuthClient {
    pub fn new(settings: OAuthSettings) -> Self {
        Self::with_client(reqwest::Client::new(), settings)
    }

    pub fn with_client(client: reqwest::Client, settings: OAuthSettings) -> Self {
        Self { client, settings }
    }

    pub fn settings(&self) -> &OAuthSettings {
        &self.settings
    }

    /// Link the user opens to grant access. `state` comes back unchanged on
    /// the redirect and identifies the conversation.
    pub fn authorize_url(&self, state: &str) -> Url {
        let mut url = self.settings.authorize_url.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.settings.app_id)
            .append_pair("response_type", "Assertion")
            .append_pair("state", state)
            .append_pair("scope", &self.settings.scope)
            .append_pair("redirect_uri", self.settings.redirect_url.as_str());
        url
    }

    /// Exchanges an authorization code for an access token.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse> {
        if code.trim().is_empty() {
            return Err(ClientError::invalid("authorization code must not be empty"));
        }

        let form = [
            ("client_assertion_type", CLIENT_ASSERTION_TYPE),
            ("client_assertion", self.settings.app_secret.as_str()),
            ("grant_type", GRANT_TYPE),
            ("assertion", code),
            ("redirect_uri", self.settings.redirect_url.as_str()),
        ];

        debug!(url = %self.settings.token_url, "Exchanging authorization code");
        let response = self
            .client
            .post(self.settings.token_url.clone())
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Remote {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        let token: TokenResponse = serde_json::from_slice(&body)?;
        if token.access_token.is_empty() {
            return Err(ClientError::UnexpectedResponse("token response has no access token".into()));
        }
        info!(expires_in = ?token.expires_in_secs(), "Access token issued");
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> OAuthSettings {
        OAuthSettings {
            app_id: "app-1".into(),
            app_secret: "secret".into(),
            authorize_url: Url::parse("https://auth.example.com/oauth2/authorize").unwrap(),
            token_url: Url::parse("https://auth.example.com/oauth2/token").unwrap(),
            scope: "vso.build vso.release".into(),
            redirect_url: Url::parse("https://bot.example.com/oauth/callback").unwrap(),
        }
    }

    #[test]
    fn test_authorize_url() {
        let client = OAuthClient::new(settings());
        let url = client.authorize_url("nonce-1");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        assert_eq!(url.host_str(), Some("auth.example.com"));
        assert!(pairs.contains(&("client_id".into(), "app-1".into())));
        assert!(pairs.contains(&("response_type".into(), "Assertion".into())));
        assert!(pairs.contains(&("state".into(), "nonce-1".into())));
        assert!(pairs.contains(&("scope".into(), "vso.build vso.release".into())));
        assert!(pairs.contains(&(
            "redirect_uri".into(),
            "https://bot.example.com/oauth/callback".into()
        )));
    }

    #[tokio::test]
    async fn test_empty_code_rejected() {
        let client = OAuthClient::new(settings());
        let err = client.exchange_code(" ").await.unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_expires_in_number_or_string() {
        let token: TokenResponse =
            serde_json::from_str(r#"{"access_token":"a","token_type":"jwt-bearer","expires_in":"3599"}"#).unwrap();
        assert_eq!(token.expires_in_secs(), Some(3599));

        let token: TokenResponse = serde_json::from_str(r#"{"access_token":"a","expires_in":900}"#).unwrap();
        assert_eq!(token.expires_in_secs(), Some(900));

        let token: TokenResponse = serde_json::from_str(r#"{"access_token":"a"}"#).unwrap();
        assert_eq!(token.expires_in_secs(), None);
        assert!(token.refresh_token.is_none());
    }
}
