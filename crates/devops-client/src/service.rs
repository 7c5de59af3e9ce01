//! The remote access facade.
//!
//! Every operation validates its arguments first, then opens a connection
//! through the factory, performs the minimum number of remote calls and
//! drops the connection before returning. Nothing is cached and nothing is
//! retried; remote failures propagate unchanged.

use std::sync::Arc;

use devops_models::{
    Account, Approval, ApprovalStatus, ArtifactMetadata, Build, BuildDefinition, BuildVersion,
    Profile, QueueBuildRequest, Release, ReleaseDefinition, ReleaseStartMetadata, TeamProject,
};
use futures::future::try_join_all;
use tracing::{debug, info};

use crate::connection::{Connection, ConnectionFactory};
use crate::credential::Credential;
use crate::endpoint::Endpoint;
use crate::error::{ClientError, Result};

/// Facade over the DevOps REST API.
///
/// Cheap to clone; holds only the connection factory.
#[derive(Clone)]
pub struct VstsService {
    factory: Arc<dyn ConnectionFactory>,
}

impl VstsService {
    /// Creates a facade opening connections through `factory`.
    pub fn new(factory: Arc<dyn ConnectionFactory>) -> Self {
        Self { factory }
    }

    fn connect(&self, endpoint: Endpoint, token: &str) -> Result<Box<dyn Connection>> {
        self.factory.connect(endpoint, Credential::bearer(token))
    }

    fn connect_account(&self, account: &str, token: &str) -> Result<Box<dyn Connection>> {
        self.connect(Endpoint::for_account(account)?, token)
    }

    /// Profile of the token's owner.
    pub async fn get_profile(&self, token: &str) -> Result<Profile> {
        require(token, "token")?;
        let connection = self.connect(Endpoint::profile(), token)?;
        connection.get_profile().await
    }

    /// Accounts `member_id` belongs to.
    pub async fn get_accounts(&self, member_id: &str, token: &str) -> Result<Vec<Account>> {
        require(member_id, "member id")?;
        require(token, "token")?;
        let connection = self.connect(Endpoint::profile(), token)?;
        connection.list_accounts(member_id).await
    }

    /// Team projects of an account.
    pub async fn get_projects(&self, account: &str, token: &str) -> Result<Vec<TeamProject>> {
        require(account, "account")?;
        require(token, "token")?;
        let connection = self.connect_account(account, token)?;
        connection.list_projects().await
    }

    /// Build definitions of a team project.
    pub async fn get_build_definitions(
        &self,
        account: &str,
        team_project: &str,
        token: &str,
    ) -> Result<Vec<BuildDefinition>> {
        require_scope(account, team_project, token)?;
        let connection = self.connect_account(account, token)?;
        connection.list_build_definitions(team_project).await
    }

    /// A single build definition.
    pub async fn get_build_definition(
        &self,
        account: &str,
        team_project: &str,
        definition_id: i32,
        token: &str,
    ) -> Result<BuildDefinition> {
        require_scope(account, team_project, token)?;
        require_positive(definition_id, "definition id")?;
        let connection = self.connect_account(account, token)?;
        connection.get_build_definition(team_project, definition_id).await
    }

    /// Queues a build of the given definition.
    pub async fn queue_build(
        &self,
        account: &str,
        team_project: &str,
        definition_id: i32,
        token: &str,
    ) -> Result<Build> {
        require_scope(account, team_project, token)?;
        require_positive(definition_id, "definition id")?;
        let connection = self.connect_account(account, token)?;
        let build = connection
            .queue_build(team_project, &QueueBuildRequest::new(definition_id))
            .await?;
        info!(account, team_project, definition_id, build_id = build.id, "Build queued");
        Ok(build)
    }

    /// Release definitions of a team project.
    pub async fn get_release_definitions(
        &self,
        account: &str,
        team_project: &str,
        token: &str,
    ) -> Result<Vec<ReleaseDefinition>> {
        require_scope(account, team_project, token)?;
        let connection = self.connect_account(account, token)?;
        connection.list_release_definitions(team_project).await
    }

    /// A single release definition.
    pub async fn get_release_definition(
        &self,
        account: &str,
        team_project: &str,
        definition_id: i32,
        token: &str,
    ) -> Result<ReleaseDefinition> {
        require_scope(account, team_project, token)?;
        require_positive(definition_id, "definition id")?;
        let connection = self.connect_account(account, token)?;
        connection.get_release_definition(team_project, definition_id).await
    }

    /// A single release.
    pub async fn get_release(
        &self,
        account: &str,
        team_project: &str,
        release_id: i32,
        token: &str,
    ) -> Result<Release> {
        require_scope(account, team_project, token)?;
        require_positive(release_id, "release id")?;
        let connection = self.connect_account(account, token)?;
        connection.get_release(team_project, release_id).await
    }

    /// Starts a release of the given definition.
    ///
    /// Every build artifact of the definition is pinned to the most recently
    /// changed build of its linked build definition. Artifacts whose
    /// definition has no builds are left out of the request.
    pub async fn create_release(
        &self,
        account: &str,
        team_project: &str,
        definition_id: i32,
        token: &str,
    ) -> Result<Release> {
        require_scope(account, team_project, token)?;
        require_positive(definition_id, "definition id")?;
        let connection = self.connect_account(account, token)?;

        let definition = connection.get_release_definition(team_project, definition_id).await?;

        let conn: &dyn Connection = &*connection;
        let lookups = definition
            .artifacts
            .iter()
            .filter(|artifact| artifact.is_build())
            .map(move |artifact| {
                async move {
                    let build_definition_id = parse_definition_id(artifact.linked_definition_id(), &artifact.alias)?;
                    let builds = conn.list_builds(team_project, build_definition_id).await?;
                    Ok::<_, ClientError>(Build::latest(&builds).map(|build| ArtifactMetadata {
                        alias: artifact.alias.clone(),
                        instance_reference: BuildVersion {
                            id: build.id.to_string(),
                            name: Some(build.build_number.clone()),
                        },
                    }))
                }
            });
        let artifacts: Vec<ArtifactMetadata> = try_join_all(lookups).await?.into_iter().flatten().collect();

        debug!(
            definition_id,
            resolved = artifacts.len(),
            declared = definition.artifacts.len(),
            "Resolved release artifacts"
        );

        let metadata = ReleaseStartMetadata {
            definition_id,
            artifacts,
        };
        let release = connection.create_release(team_project, &metadata).await?;
        info!(account, team_project, definition_id, release_id = release.id, "Release created");
        Ok(release)
    }

    /// A single approval.
    pub async fn get_approval(
        &self,
        account: &str,
        team_project: &str,
        approval_id: i32,
        token: &str,
    ) -> Result<Approval> {
        require_scope(account, team_project, token)?;
        require_positive(approval_id, "approval id")?;
        let connection = self.connect_account(account, token)?;
        connection.get_approval(team_project, approval_id).await
    }

    /// Pending approvals assigned to `assignee` (an identity id).
    pub async fn get_approvals(
        &self,
        account: &str,
        team_project: &str,
        assignee: &str,
        token: &str,
    ) -> Result<Vec<Approval>> {
        require_scope(account, team_project, token)?;
        require(assignee, "assignee")?;
        let connection = self.connect_account(account, token)?;
        connection.list_approvals(team_project, assignee).await
    }

    /// Sets status and comments of an approval.
    ///
    /// Read-modify-write of the whole record without a concurrency token: a
    /// concurrent change made elsewhere is overwritten.
    pub async fn change_approval_status(
        &self,
        account: &str,
        team_project: &str,
        approval_id: i32,
        status: ApprovalStatus,
        comments: &str,
        token: &str,
    ) -> Result<Approval> {
        require_scope(account, team_project, token)?;
        require_positive(approval_id, "approval id")?;
        let connection = self.connect_account(account, token)?;

        let mut approval = connection.get_approval(team_project, approval_id).await?;
        approval.status = status;
        approval.comments = Some(comments.to_string());

        let updated = connection.update_approval(team_project, &approval).await?;
        info!(account, team_project, approval_id, status = %status, "Approval updated");
        Ok(updated)
    }
}

fn require(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ClientError::invalid(format!("{} must not be empty", name)));
    }
    Ok(())
}

fn require_positive(value: i32, name: &str) -> Result<()> {
    if value <= 0 {
        return Err(ClientError::invalid(format!("{} must be positive, got {}", name, value)));
    }
    Ok(())
}

fn require_scope(account: &str, team_project: &str, token: &str) -> Result<()> {
    require(account, "account")?;
    require(team_project, "team project")?;
    require(token, "token")
}

fn parse_definition_id(raw: Option<&str>, alias: &str) -> Result<i32> {
    let raw = raw.ok_or_else(|| {
        ClientError::UnexpectedResponse(format!("artifact {} has no linked build definition", alias))
    })?;
    raw.trim().parse().map_err(|_| {
        ClientError::UnexpectedResponse(format!(
            "artifact {} links to invalid build definition id {:?}",
            alias, raw
        ))
    })
}
