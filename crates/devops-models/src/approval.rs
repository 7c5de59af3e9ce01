//! Release approvals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of an approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ApprovalStatus {
    /// Not set.
    #[default]
    Undefined,
    /// Waiting for the approver.
    Pending,
    /// Approved.
    Approved,
    /// Rejected.
    Rejected,
    /// Reassigned to someone else.
    Reassigned,
    /// Canceled.
    Canceled,
    /// Skipped.
    Skipped,
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Undefined => "undefined",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Reassigned => "reassigned",
            Self::Canceled => "canceled",
            Self::Skipped => "skipped",
        };
        f.write_str(s)
    }
}

/// Whether the approval gates the start or the end of a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ApprovalType {
    /// Not set.
    #[default]
    Undefined,
    /// Before deployment.
    PreDeploy,
    /// After deployment.
    PostDeploy,
    /// Both.
    All,
}

/// Id and name of a related resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShallowReference {
    /// Resource id.
    pub id: i32,

    /// Resource name.
    #[serde(default)]
    pub name: String,
}

impl ShallowReference {
    /// Creates a reference.
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }
}

/// An identity (approver).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRef {
    /// Identity id.
    pub id: String,

    /// Display name.
    #[serde(default)]
    pub display_name: String,
}

/// A release approval. Updated as a whole record (read-modify-write).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Approval {
    /// Approval id.
    pub id: i32,

    /// Current status.
    #[serde(default)]
    pub status: ApprovalStatus,

    /// Approver comments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,

    /// Pre- or post-deployment.
    #[serde(default)]
    pub approval_type: ApprovalType,

    /// The release being approved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<ShallowReference>,

    /// The definition of that release.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_definition: Option<ShallowReference>,

    /// The environment being deployed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_environment: Option<ShallowReference>,

    /// Assigned approver.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approver: Option<IdentityRef>,

    /// Creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_on: Option<DateTime<Utc>>,
}

impl Approval {
    /// Creates a pending approval.
    pub fn pending(id: i32) -> Self {
        Self {
            id,
            status: ApprovalStatus::Pending,
            comments: None,
            approval_type: ApprovalType::PreDeploy,
            release: None,
            release_definition: None,
            release_environment: None,
            approver: None,
            created_on: None,
        }
    }

    /// Short description used when listing approvals.
    pub fn summary(&self) -> String {
        let release = self.release.as_ref().map(|r| r.name.as_str()).unwrap_or("release");
        match &self.release_environment {
            Some(env) => format!("{} to {}", release, env.name),
            None => release.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serde() {
        assert_eq!(serde_json::to_string(&ApprovalStatus::Approved).unwrap(), "\"approved\"");
        let s: ApprovalStatus = serde_json::from_str("\"rejected\"").unwrap();
        assert_eq!(s, ApprovalStatus::Rejected);
    }

    #[test]
    fn test_approval_deserialize() {
        let json = r#"{
            "id": 5,
            "status": "pending",
            "approvalType": "preDeploy",
            "release": {"id": 10, "name": "Release-10"},
            "releaseEnvironment": {"id": 2, "name": "Production"}
        }"#;
        let approval: Approval = serde_json::from_str(json).unwrap();
        assert_eq!(approval.id, 5);
        assert_eq!(approval.approval_type, ApprovalType::PreDeploy);
        assert_eq!(approval.summary(), "Release-10 to Production");
    }
}
