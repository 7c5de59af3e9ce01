//! Per-conversation session state.

use chrono::{DateTime, Utc};
use devops_models::{ApprovalStatus, Profile};
use serde::{Deserialize, Serialize};

/// A signed-in user's access token and profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignIn {
    /// Bearer token for facade calls.
    pub access_token: String,
    /// Profile of the token's owner.
    pub profile: Profile,
    /// When the token stops working, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl SignIn {
    pub fn new(access_token: impl Into<String>, profile: Profile) -> Self {
        Self {
            access_token: access_token.into(),
            profile,
            expires_at: None,
        }
    }

    /// Whether the token has expired at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Where a multi-turn dialog is waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "camelCase")]
pub enum DialogStep {
    /// Waiting for an account name.
    SelectAccount,
    /// Waiting for a team project name.
    SelectProject,
    /// Waiting for the comment of an approval decision.
    #[serde(rename_all = "camelCase")]
    ApprovalComment {
        approval_id: i32,
        status: ApprovalStatus,
    },
}

/// Session state of one conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sign_in: Option<SignIn>,

    /// OAuth `state` nonce of a sign-in in progress.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_sign_in: Option<String>,

    /// Selected account name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,

    /// Selected team project name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_project: Option<String>,

    /// Registry key of the dialog awaiting input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_dialog: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<DialogStep>,
}

impl ConversationState {
    /// Token of the signed-in user, unless missing or expired.
    pub fn access_token(&self) -> Option<&str> {
        self.sign_in
            .as_ref()
            .filter(|s| !s.is_expired(Utc::now()))
            .map(|s| s.access_token.as_str())
    }

    /// Profile of the signed-in user.
    pub fn profile(&self) -> Option<&Profile> {
        self.sign_in.as_ref().map(|s| &s.profile)
    }

    /// Selected account and team project, when both are set.
    pub fn scope(&self) -> Option<(&str, &str)> {
        match (self.account.as_deref(), self.team_project.as_deref()) {
            (Some(account), Some(project)) => Some((account, project)),
            _ => None,
        }
    }

    /// Records a completed sign-in. A new user invalidates the selection.
    pub fn signed_in(&mut self, sign_in: SignIn) {
        let same_user = self
            .profile()
            .is_some_and(|p| p.id == sign_in.profile.id);
        if !same_user {
            self.account = None;
            self.team_project = None;
        }
        self.sign_in = Some(sign_in);
        self.pending_sign_in = None;
    }

    /// Drops the active dialog and its step.
    pub fn end_dialog(&mut self) {
        self.active_dialog = None;
        self.step = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_expired_token_is_hidden() {
        let mut state = ConversationState::default();
        let mut sign_in = SignIn::new("tok", Profile::new("me", "Me"));
        sign_in.expires_at = Some(Utc::now() - Duration::minutes(1));
        state.sign_in = Some(sign_in);
        assert!(state.access_token().is_none());

        state.sign_in.as_mut().unwrap().expires_at = Some(Utc::now() + Duration::hours(1));
        assert_eq!(state.access_token(), Some("tok"));
    }

    #[test]
    fn test_new_user_clears_selection() {
        let mut state = ConversationState {
            account: Some("contoso".into()),
            team_project: Some("Fabrikam".into()),
            pending_sign_in: Some("nonce".into()),
            ..Default::default()
        };
        state.signed_in(SignIn::new("tok", Profile::new("me", "Me")));
        assert!(state.scope().is_none());
        assert!(state.pending_sign_in.is_none());

        state.account = Some("contoso".into());
        state.team_project = Some("Fabrikam".into());
        state.signed_in(SignIn::new("tok-2", Profile::new("me", "Me")));
        assert_eq!(state.scope(), Some(("contoso", "Fabrikam")));
    }

    #[test]
    fn test_state_json_shape() {
        let state = ConversationState {
            active_dialog: Some("approvals".into()),
            step: Some(DialogStep::ApprovalComment {
                approval_id: 5,
                status: ApprovalStatus::Approved,
            }),
            ..Default::default()
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["activeDialog"], "approvals");
        assert_eq!(json["step"]["step"], "approvalComment");
        assert_eq!(json["step"]["approvalId"], 5);
        let back: ConversationState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }
}
