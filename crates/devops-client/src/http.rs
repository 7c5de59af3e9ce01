//! HTTP implementation of the connection boundary.

use async_trait::async_trait;
use devops_models::{
    Account, Approval, Build, BuildDefinition, Profile, QueueBuildRequest, Release,
    ReleaseDefinition, ReleaseStartMetadata, TeamProject,
};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use url::Url;

use crate::connection::{Connection, ConnectionFactory};
use crate::credential::Credential;
use crate::endpoint::{api_url, Endpoint};
use crate::error::{ClientError, Result};

const PROFILE_API_VERSION: &str = "1.0";
const CORE_API_VERSION: &str = "2.0";
const BUILD_API_VERSION: &str = "2.0";
const RELEASE_API_VERSION: &str = "3.0-preview.1";

/// List envelope used by every collection endpoint.
#[derive(Debug, Deserialize)]
pub struct ListResponse<T> {
    /// Number of items.
    #[serde(default)]
    pub count: usize,
    /// The items.
    pub value: Vec<T>,
}

/// Opens [`HttpConnection`]s sharing one `reqwest::Client`.
#[derive(Clone, Default)]
pub struct HttpConnectionFactory {
    client: reqwest::Client,
}

impl HttpConnectionFactory {
    /// Creates a factory with a default client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a factory with a preconfigured client (proxies, timeouts).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl ConnectionFactory for HttpConnectionFactory {
    fn connect(&self, endpoint: Endpoint, credential: Credential) -> Result<Box<dyn Connection>> {
        trace!(endpoint = %endpoint, "Opening connection");
        Ok(Box::new(HttpConnection {
            client: self.client.clone(),
            endpoint,
            credential,
        }))
    }
}

/// A connection bound to one endpoint and one credential.
pub struct HttpConnection {
    client: reqwest::Client,
    endpoint: Endpoint,
    credential: Credential,
}

impl HttpConnection {
    fn core_url(&self, segments: &[&str], query: &[(&str, &str)], version: &str) -> Result<Url> {
        api_url(self.endpoint.base_url(), segments, query, version)
    }

    fn release_url(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url> {
        api_url(self.endpoint.release_url(), segments, query, RELEASE_API_VERSION)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(method = %method, url = %url, "Remote call");
        self.client
            .request(method, url)
            .header("Authorization", self.credential.authorization_header())
            .header("Accept", "application/json")
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Remote {
                status: status.as_u16(),
                message,
            });
        }
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        self.send(self.request(Method::GET, url)).await
    }

    async fn get_list<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>> {
        let list: ListResponse<T> = self.get(url).await?;
        Ok(list.value)
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: &B,
    ) -> Result<T> {
        self.send(self.request(method, url).json(body)).await
    }
}

#[async_trait]
impl Connection for HttpConnection {
    fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    async fn get_profile(&self) -> Result<Profile> {
        let url = self.core_url(&["_apis", "profile", "profiles", "me"], &[], PROFILE_API_VERSION)?;
        self.get(url).await
    }

    async fn list_accounts(&self, member_id: &str) -> Result<Vec<Account>> {
        let url = self.core_url(&["_apis", "accounts"], &[("memberId", member_id)], PROFILE_API_VERSION)?;
        self.get_list(url).await
    }

    async fn list_projects(&self) -> Result<Vec<TeamProject>> {
        let url = self.core_url(&["_apis", "projects"], &[], CORE_API_VERSION)?;
        self.get_list(url).await
    }

    async fn list_build_definitions(&self, project: &str) -> Result<Vec<BuildDefinition>> {
        let url = self.core_url(&[project, "_apis", "build", "definitions"], &[], BUILD_API_VERSION)?;
        self.get_list(url).await
    }

    async fn get_build_definition(&self, project: &str, id: i32) -> Result<BuildDefinition> {
        let id = id.to_string();
        let url = self.core_url(&[project, "_apis", "build", "definitions", id.as_str()], &[], BUILD_API_VERSION)?;
        self.get(url).await
    }

    async fn queue_build(&self, project: &str, request: &QueueBuildRequest) -> Result<Build> {
        let url = self.core_url(&[project, "_apis", "build", "builds"], &[], BUILD_API_VERSION)?;
        self.send_json(Method::POST, url, request).await
    }

    async fn list_builds(&self, project: &str, definition_id: i32) -> Result<Vec<Build>> {
        let definitions = definition_id.to_string();
        let url = self.core_url(
            &[project, "_apis", "build", "builds"],
            &[("definitions", definitions.as_str())],
            BUILD_API_VERSION,
        )?;
        self.get_list(url).await
    }

    async fn list_release_definitions(&self, project: &str) -> Result<Vec<ReleaseDefinition>> {
        let url = self.release_url(&[project, "_apis", "release", "definitions"], &[])?;
        self.get_list(url).await
    }

    async fn get_release_definition(&self, project: &str, id: i32) -> Result<ReleaseDefinition> {
        let id = id.to_string();
        let url = self.release_url(&[project, "_apis", "release", "definitions", id.as_str()], &[])?;
        self.get(url).await
    }

    async fn get_release(&self, project: &str, id: i32) -> Result<Release> {
        let id = id.to_string();
        let url = self.release_url(&[project, "_apis", "release", "releases", id.as_str()], &[])?;
        self.get(url).await
    }

    async fn create_release(&self, project: &str, metadata: &ReleaseStartMetadata) -> Result<Release> {
        let url = self.release_url(&[project, "_apis", "release", "releases"], &[])?;
        self.send_json(Method::POST, url, metadata).await
    }

    async fn list_approvals(&self, project: &str, assignee: &str) -> Result<Vec<Approval>> {
        let url = self.release_url(
            &[project, "_apis", "release", "approvals"],
            &[("assignedToFilter", assignee), ("statusFilter", "pending")],
        )?;
        self.get_list(url).await
    }

    async fn get_approval(&self, project: &str, id: i32) -> Result<Approval> {
        let id = id.to_string();
        let url = self.release_url(&[project, "_apis", "release", "approvals", id.as_str()], &[])?;
        self.get(url).await
    }

    async fn update_approval(&self, project: &str, approval: &Approval) -> Result<Approval> {
        let id = approval.id.to_string();
        let url = self.release_url(&[project, "_apis", "release", "approvals", id.as_str()], &[])?;
        self.send_json(Method::PATCH, url, approval).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection() -> HttpConnection {
        HttpConnection {
            client: reqwest::Client::new(),
            endpoint: Endpoint::for_account("contoso").unwrap(),
            credential: Credential::bearer("t"),
        }
    }

    #[test]
    fn test_list_response_decode() {
        let json = r#"{"count": 2, "value": [{"id": 1, "name": "CI"}, {"id": 2, "name": "Nightly"}]}"#;
        let list: ListResponse<BuildDefinition> = serde_json::from_str(json).unwrap();
        assert_eq!(list.count, 2);
        assert_eq!(list.value[1].name, "Nightly");
    }

    #[test]
    fn test_release_urls_use_release_host() {
        let url = connection()
            .release_url(&["Fabrikam", "_apis", "release", "approvals"], &[("statusFilter", "pending")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://contoso.vsrm.visualstudio.com/Fabrikam/_apis/release/approvals?statusFilter=pending&api-version=3.0-preview.1"
        );
    }

    #[test]
    fn test_core_urls_use_account_host() {
        let url = connection()
            .core_url(&["_apis", "projects"], &[], CORE_API_VERSION)
            .unwrap();
        assert_eq!(url.as_str(), "https://contoso.visualstudio.com/_apis/projects?api-version=2.0");
    }

    #[test]
    fn test_factory_scopes_connection() {
        let factory = HttpConnectionFactory::new();
        let endpoint = Endpoint::for_account("contoso").unwrap();
        let connection = factory.connect(endpoint.clone(), Credential::bearer("t")).unwrap();
        assert_eq!(connection.endpoint(), &endpoint);
    }
}
