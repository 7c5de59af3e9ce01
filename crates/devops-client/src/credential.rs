//! Per-call credentials.

/// Bearer credential built from an access token for a single call.
///
/// The token is never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
}

impl Credential {
    /// Wraps an access token.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }

    /// The raw token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Value of the `Authorization` header.
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential").field("token", &"<redacted>").finish()
    }
}
