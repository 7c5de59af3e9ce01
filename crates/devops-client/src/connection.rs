//! The per-call connection boundary.
//!
//! The facade never talks HTTP itself: for every operation it asks a
//! [`ConnectionFactory`] for a fresh [`Connection`] scoped to one endpoint and
//! one credential, issues the calls it needs, and drops the connection.

use async_trait::async_trait;
use devops_models::{
    Account, Approval, Build, BuildDefinition, Profile, QueueBuildRequest, Release,
    ReleaseDefinition, ReleaseStartMetadata, TeamProject,
};

use crate::credential::Credential;
use crate::endpoint::Endpoint;
use crate::error::Result;

/// Typed remote calls available on an open connection.
///
/// Each method is exactly one request to the service.
#[async_trait]
pub trait Connection: Send + Sync {
    /// The endpoint this connection is scoped to.
    fn endpoint(&self) -> &Endpoint;

    /// Profile of the authenticated user.
    async fn get_profile(&self) -> Result<Profile>;

    /// Accounts the given member belongs to.
    async fn list_accounts(&self, member_id: &str) -> Result<Vec<Account>>;

    /// Team projects of the account.
    async fn list_projects(&self) -> Result<Vec<TeamProject>>;

    /// Build definitions of a project.
    async fn list_build_definitions(&self, project: &str) -> Result<Vec<BuildDefinition>>;

    /// A single build definition.
    async fn get_build_definition(&self, project: &str, id: i32) -> Result<BuildDefinition>;

    /// Queues a build.
    async fn queue_build(&self, project: &str, request: &QueueBuildRequest) -> Result<Build>;

    /// Builds of one definition.
    async fn list_builds(&self, project: &str, definition_id: i32) -> Result<Vec<Build>>;

    /// Release definitions of a project.
    async fn list_release_definitions(&self, project: &str) -> Result<Vec<ReleaseDefinition>>;

    /// A single release definition, including its artifacts.
    async fn get_release_definition(&self, project: &str, id: i32) -> Result<ReleaseDefinition>;

    /// A single release.
    async fn get_release(&self, project: &str, id: i32) -> Result<Release>;

    /// Starts a release.
    async fn create_release(&self, project: &str, metadata: &ReleaseStartMetadata) -> Result<Release>;

    /// Pending approvals assigned to `assignee`.
    async fn list_approvals(&self, project: &str, assignee: &str) -> Result<Vec<Approval>>;

    /// A single approval.
    async fn get_approval(&self, project: &str, id: i32) -> Result<Approval>;

    /// Writes back a whole approval record.
    async fn update_approval(&self, project: &str, approval: &Approval) -> Result<Approval>;
}

/// Opens connections.
///
/// Implementations hold no per-user state, so a single factory can serve
/// every conversation concurrently. The returned handle is released when
/// dropped.
pub trait ConnectionFactory: Send + Sync {
    /// Opens a connection to `endpoint` authenticated with `credential`.
    fn connect(&self, endpoint: Endpoint, credential: Credential) -> Result<Box<dyn Connection>>;
}
