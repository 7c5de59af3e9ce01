//! In-memory connection factory for tests.
//!
//! Serves canned resources, records every remote call and counts how many
//! connections were opened and released, so callers can check validation
//! order and scoped release without a network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use devops_models::{
    Account, Approval, ApprovalStatus, Build, BuildDefinition, Profile, QueueBuildRequest, Release,
    ReleaseDefinition, ReleaseStartMetadata, TeamProject,
};

use crate::connection::{Connection, ConnectionFactory};
use crate::credential::Credential;
use crate::endpoint::Endpoint;
use crate::error::{ClientError, Result};

/// Resources served by the mock.
#[derive(Debug, Clone, Default)]
pub struct MockData {
    pub profile: Option<Profile>,
    pub accounts: Vec<Account>,
    pub projects: Vec<TeamProject>,
    pub build_definitions: Vec<BuildDefinition>,
    /// Builds keyed by build definition id.
    pub builds: HashMap<i32, Vec<Build>>,
    pub release_definitions: Vec<ReleaseDefinition>,
    pub releases: Vec<Release>,
    pub approvals: Vec<Approval>,
}

/// A remote call captured for verification.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCall {
    GetProfile,
    ListAccounts { member_id: String },
    ListProjects,
    ListBuildDefinitions { project: String },
    GetBuildDefinition { project: String, id: i32 },
    QueueBuild { project: String, definition_id: i32 },
    ListBuilds { project: String, definition_id: i32 },
    ListReleaseDefinitions { project: String },
    GetReleaseDefinition { project: String, id: i32 },
    GetRelease { project: String, id: i32 },
    CreateRelease { project: String, metadata: ReleaseStartMetadata },
    ListApprovals { project: String, assignee: String },
    GetApproval { project: String, id: i32 },
    UpdateApproval { project: String, approval: Approval },
}

#[derive(Default)]
struct Inner {
    data: Mutex<MockData>,
    calls: Mutex<Vec<RemoteCall>>,
    endpoints: Mutex<Vec<String>>,
    failure: Mutex<Option<ClientError>>,
    opened: AtomicUsize,
    released: AtomicUsize,
    next_id: AtomicI32,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Mock [`ConnectionFactory`]. Clones share state.
#[derive(Clone, Default)]
pub struct MockConnectionFactory {
    inner: Arc<Inner>,
}

impl MockConnectionFactory {
    /// Creates a factory serving `data`.
    pub fn new(data: MockData) -> Self {
        let factory = Self::default();
        *lock(&factory.inner.data) = data;
        factory.inner.next_id.store(1000, Ordering::SeqCst);
        factory
    }

    /// Makes the next remote call fail with `error`.
    pub fn fail_next(&self, error: ClientError) {
        *lock(&self.inner.failure) = Some(error);
    }

    /// Mutates the served data.
    pub fn with_data<R>(&self, f: impl FnOnce(&mut MockData) -> R) -> R {
        f(&mut lock(&self.inner.data))
    }

    /// Calls made so far, in order.
    pub fn calls(&self) -> Vec<RemoteCall> {
        lock(&self.inner.calls).clone()
    }

    /// Endpoints of the connections opened so far, in order.
    pub fn endpoints(&self) -> Vec<String> {
        lock(&self.inner.endpoints).clone()
    }

    /// Number of connections opened.
    pub fn opened(&self) -> usize {
        self.inner.opened.load(Ordering::SeqCst)
    }

    /// Number of connections released.
    pub fn released(&self) -> usize {
        self.inner.released.load(Ordering::SeqCst)
    }

    /// Start requests submitted so far.
    pub fn created_releases(&self) -> Vec<ReleaseStartMetadata> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RemoteCall::CreateRelease { metadata, .. } => Some(metadata),
                _ => None,
            })
            .collect()
    }

    /// Current state of an approval.
    pub fn approval(&self, id: i32) -> Option<Approval> {
        lock(&self.inner.data).approvals.iter().find(|a| a.id == id).cloned()
    }
}

impl ConnectionFactory for MockConnectionFactory {
    fn connect(&self, endpoint: Endpoint, _credential: Credential) -> Result<Box<dyn Connection>> {
        self.inner.opened.fetch_add(1, Ordering::SeqCst);
        lock(&self.inner.endpoints).push(endpoint.to_string());
        Ok(Box::new(MockConnection {
            inner: Arc::clone(&self.inner),
            endpoint,
        }))
    }
}

struct MockConnection {
    inner: Arc<Inner>,
    endpoint: Endpoint,
}

impl Drop for MockConnection {
    fn drop(&mut self) {
        self.inner.released.fetch_add(1, Ordering::SeqCst);
    }
}

impl MockConnection {
    fn record(&self, call: RemoteCall) -> Result<MutexGuard<'_, MockData>> {
        lock(&self.inner.calls).push(call);
        if let Some(error) = lock(&self.inner.failure).take() {
            return Err(error);
        }
        Ok(lock(&self.inner.data))
    }

    fn next_id(&self) -> i32 {
        self.inner.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

fn not_found(what: &str, id: i32) -> ClientError {
    ClientError::Remote {
        status: 404,
        message: format!("{} {} not found", what, id),
    }
}

#[async_trait]
impl Connection for MockConnection {
    fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    async fn get_profile(&self) -> Result<Profile> {
        let data = self.record(RemoteCall::GetProfile)?;
        data.profile.clone().ok_or(ClientError::Remote {
            status: 401,
            message: "no profile".into(),
        })
    }

    async fn list_accounts(&self, member_id: &str) -> Result<Vec<Account>> {
        let data = self.record(RemoteCall::ListAccounts {
            member_id: member_id.into(),
        })?;
        Ok(data.accounts.clone())
    }

    async fn list_projects(&self) -> Result<Vec<TeamProject>> {
        let data = self.record(RemoteCall::ListProjects)?;
        Ok(data.projects.clone())
    }

    async fn list_build_definitions(&self, project: &str) -> Result<Vec<BuildDefinition>> {
        let data = self.record(RemoteCall::ListBuildDefinitions {
            project: project.into(),
        })?;
        Ok(data.build_definitions.clone())
    }

    async fn get_build_definition(&self, project: &str, id: i32) -> Result<BuildDefinition> {
        let data = self.record(RemoteCall::GetBuildDefinition {
            project: project.into(),
            id,
        })?;
        data.build_definitions
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or_else(|| not_found("build definition", id))
    }

    async fn queue_build(&self, project: &str, request: &QueueBuildRequest) -> Result<Build> {
        let mut data = self.record(RemoteCall::QueueBuild {
            project: project.into(),
            definition_id: request.definition.id,
        })?;
        let id = self.next_id();
        let mut build = Build::new(id, format!("queued.{}", id), Utc::now());
        build.status = Some("notStarted".into());
        build.definition = Some(request.definition.clone());
        data.builds
            .entry(request.definition.id)
            .or_default()
            .push(build.clone());
        Ok(build)
    }

    async fn list_builds(&self, project: &str, definition_id: i32) -> Result<Vec<Build>> {
        let data = self.record(RemoteCall::ListBuilds {
            project: project.into(),
            definition_id,
        })?;
        Ok(data.builds.get(&definition_id).cloned().unwrap_or_default())
    }

    async fn list_release_definitions(&self, project: &str) -> Result<Vec<ReleaseDefinition>> {
        let data = self.record(RemoteCall::ListReleaseDefinitions {
            project: project.into(),
        })?;
        Ok(data.release_definitions.clone())
    }

    async fn get_release_definition(&self, project: &str, id: i32) -> Result<ReleaseDefinition> {
        let data = self.record(RemoteCall::GetReleaseDefinition {
            project: project.into(),
            id,
        })?;
        data.release_definitions
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or_else(|| not_found("release definition", id))
    }

    async fn get_release(&self, project: &str, id: i32) -> Result<Release> {
        let data = self.record(RemoteCall::GetRelease {
            project: project.into(),
            id,
        })?;
        data.releases
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| not_found("release", id))
    }

    async fn create_release(&self, project: &str, metadata: &ReleaseStartMetadata) -> Result<Release> {
        let mut data = self.record(RemoteCall::CreateRelease {
            project: project.into(),
            metadata: metadata.clone(),
        })?;
        let id = self.next_id();
        let mut release = Release::new(id, format!("Release-{}", id));
        release.status = Some("active".into());
        data.releases.push(release.clone());
        Ok(release)
    }

    async fn list_approvals(&self, project: &str, assignee: &str) -> Result<Vec<Approval>> {
        let data = self.record(RemoteCall::ListApprovals {
            project: project.into(),
            assignee: assignee.into(),
        })?;
        Ok(data
            .approvals
            .iter()
            .filter(|a| a.status == ApprovalStatus::Pending)
            .filter(|a| a.approver.as_ref().is_some_and(|who| who.id == assignee))
            .cloned()
            .collect())
    }

    async fn get_approval(&self, project: &str, id: i32) -> Result<Approval> {
        let data = self.record(RemoteCall::GetApproval {
            project: project.into(),
            id,
        })?;
        data.approvals
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| not_found("approval", id))
    }

    async fn update_approval(&self, project: &str, approval: &Approval) -> Result<Approval> {
        let mut data = self.record(RemoteCall::UpdateApproval {
            project: project.into(),
            approval: approval.clone(),
        })?;
        let stored = data
            .approvals
            .iter_mut()
            .find(|a| a.id == approval.id)
            .ok_or_else(|| not_found("approval", approval.id))?;
        *stored = approval.clone();
        Ok(approval.clone())
    }
}
