//! Service endpoints.
//!
//! Account-less operations (profile, account list) go to the global profile
//! endpoint; everything else goes to `https://{account}.visualstudio.com`.
//! Release management lives on a sibling host, `{account}.vsrm.visualstudio.com`.

use url::Url;

use crate::error::{ClientError, Result};

/// Global profile endpoint.
pub const PROFILE_ENDPOINT: &str = "https://app.vssps.visualstudio.com";

const ACCOUNT_HOST_SUFFIX: &str = "visualstudio.com";
const RELEASE_HOST_LABEL: &str = "vsrm";

/// Target of a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base: Url,
    release: Url,
}

impl Endpoint {
    /// The global profile endpoint.
    pub fn profile() -> Self {
        let base = Url::parse(PROFILE_ENDPOINT).expect("profile endpoint is a valid URL");
        Self {
            release: base.clone(),
            base,
        }
    }

    /// The endpoint of the given account.
    ///
    /// Account names are host labels, so only ASCII letters, digits and `-`
    /// are accepted.
    pub fn for_account(account: &str) -> Result<Self> {
        let account = account.trim();
        if account.is_empty() {
            return Err(ClientError::invalid("account must not be empty"));
        }
        if !account.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(ClientError::invalid(format!("invalid account name: {}", account)));
        }

        let base = parse(&format!("https://{}.{}", account, ACCOUNT_HOST_SUFFIX))?;
        let release = parse(&format!(
            "https://{}.{}.{}",
            account, RELEASE_HOST_LABEL, ACCOUNT_HOST_SUFFIX
        ))?;
        Ok(Self { base, release })
    }

    /// Builds an endpoint from explicit URLs (emulators, tests).
    pub fn custom(base: Url, release: Url) -> Self {
        Self { base, release }
    }

    /// Base URL for core, build and profile APIs.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Base URL for release management APIs.
    pub fn release_url(&self) -> &Url {
        &self.release
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.base.as_str().trim_end_matches('/'))
    }
}

fn parse(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| ClientError::invalid(format!("invalid endpoint {}: {}", url, e)))
}

/// Builds `{base}/{segments...}?{query...}&api-version={version}` with each
/// segment percent-encoded.
pub fn api_url(base: &Url, segments: &[&str], query: &[(&str, &str)], api_version: &str) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ClientError::invalid(format!("endpoint cannot be a base URL: {}", base)))?
        .pop_if_empty()
        .extend(segments);
    {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in query {
            pairs.append_pair(key, value);
        }
        pairs.append_pair("api-version", api_version);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_endpoint() {
        let endpoint = Endpoint::for_account("contoso").unwrap();
        assert_eq!(endpoint.to_string(), "https://contoso.visualstudio.com");
        assert_eq!(endpoint.release_url().as_str(), "https://contoso.vsrm.visualstudio.com/");
    }

    #[test]
    fn test_profile_endpoint() {
        let endpoint = Endpoint::profile();
        assert_eq!(endpoint.to_string(), PROFILE_ENDPOINT);
        assert_eq!(endpoint.base_url(), endpoint.release_url());
    }

    #[test]
    fn test_account_validation() {
        assert!(Endpoint::for_account("").unwrap_err().is_invalid_argument());
        assert!(Endpoint::for_account("   ").unwrap_err().is_invalid_argument());
        assert!(Endpoint::for_account("evil.com/x").unwrap_err().is_invalid_argument());
        assert!(Endpoint::for_account("my-org-1").is_ok());
    }

    #[test]
    fn test_api_url_encodes_segments() {
        let endpoint = Endpoint::for_account("contoso").unwrap();
        let url = api_url(
            endpoint.base_url(),
            &["My Project", "_apis", "build", "builds"],
            &[("definitions", "12")],
            "2.0",
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://contoso.visualstudio.com/My%20Project/_apis/build/builds?definitions=12&api-version=2.0"
        );
    }
}
