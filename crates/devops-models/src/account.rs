//! Accounts, profiles and team projects.

use serde::{Deserialize, Serialize};

/// A DevOps organization the signed-in user is a member of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Unique identifier of the account.
    pub account_id: String,

    /// Account name, the `{account}` part of `https://{account}.visualstudio.com`.
    pub account_name: String,

    /// URI of the account, if returned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_uri: Option<String>,
}

impl Account {
    /// Creates an account with the given id and name.
    pub fn new(account_id: impl Into<String>, account_name: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            account_name: account_name.into(),
            account_uri: None,
        }
    }
}

/// The profile of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Identity id, used as member id and approval assignee filter.
    pub id: String,

    /// Display name.
    #[serde(default)]
    pub display_name: String,

    /// Email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
}

impl Profile {
    /// Creates a profile.
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            email_address: None,
        }
    }
}

/// A team project: the container scoping definitions and approvals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamProject {
    /// Project id (GUID).
    pub id: String,

    /// Project name.
    pub name: String,

    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Project state (e.g. "wellFormed").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl TeamProject {
    /// Creates a project.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            state: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_deserialize() {
        let json = r#"{"accountId":"a-1","accountName":"contoso","accountUri":"https://contoso.vssps.visualstudio.com/"}"#;
        let account: Account = serde_json::from_str(json).unwrap();
        assert_eq!(account.account_id, "a-1");
        assert_eq!(account.account_name, "contoso");
        assert!(account.account_uri.is_some());
    }

    #[test]
    fn test_profile_missing_optional_fields() {
        let profile: Profile = serde_json::from_str(r#"{"id":"me"}"#).unwrap();
        assert_eq!(profile.id, "me");
        assert!(profile.display_name.is_empty());
        assert!(profile.email_address.is_none());
    }
}
