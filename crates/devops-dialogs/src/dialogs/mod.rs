//! Handler dialogs started by command name.

mod approvals;
mod builds;
mod connect;
mod help;
mod releases;

use std::sync::{Arc, OnceLock};

use devops_client::{OAuthClient, VstsService};
use regex::Regex;

pub use approvals::ApprovalsDialog;
pub use builds::BuildsDialog;
pub use connect::ConnectDialog;
pub use help::HelpDialog;
pub use releases::ReleasesDialog;

use crate::context::DialogContext;
use crate::error::Result;
use crate::registry::CommandRegistry;

pub(crate) const SIGN_IN_FIRST: &str = "You are not signed in. Type \"connect\" to sign in.";
pub(crate) const SELECT_PROJECT_FIRST: &str =
    "No team project selected. Type \"connect\" to pick an account and a project.";

/// Builds the registry with every handler dialog and its aliases.
pub fn default_registry(service: VstsService, oauth: Option<OAuthClient>) -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    registry.register(Arc::new(ConnectDialog::new(service.clone(), oauth)));
    registry.register(Arc::new(BuildsDialog::new(service.clone())));
    registry.register(Arc::new(ReleasesDialog::new(service.clone())));
    registry.register(Arc::new(ApprovalsDialog::new(service)));

    let mut commands: Vec<String> = registry.commands().into_iter().map(str::to_string).collect();
    commands.push("help".to_string());
    registry.register(Arc::new(HelpDialog::new(commands)));

    registry.alias("login", "connect");
    registry.alias("build", "builds");
    registry.alias("release", "releases");
    registry.alias("approve", "approvals");
    registry.alias("start", "help");
    registry.alias("menu", "help");
    registry
}

/// Parses `"{verb} {id}"` (any case, any spacing) into the verb and id.
pub(crate) fn parse_action(text: &str) -> Option<(String, i32)> {
    static ACTION: OnceLock<Regex> = OnceLock::new();
    let action = ACTION.get_or_init(|| {
        Regex::new(r"(?i)^\s*([a-z]+)\s+(\d+)\s*$").expect("action pattern is valid")
    });
    let captures = action.captures(text)?;
    let id = captures[2].parse().ok()?;
    Some((captures[1].to_lowercase(), id))
}

/// The signed-in user's token, or `None` after telling the user to sign in.
pub(crate) async fn signed_in_token(ctx: &DialogContext<'_>) -> Result<Option<String>> {
    match ctx.state.access_token() {
        Some(token) => Ok(Some(token.to_string())),
        None => {
            ctx.say(SIGN_IN_FIRST).await?;
            Ok(None)
        }
    }
}

/// Token, account and team project for project-scoped calls.
pub(crate) struct Scope {
    pub token: String,
    pub account: String,
    pub team_project: String,
}

/// The current scope, or `None` after telling the user what is missing.
pub(crate) async fn project_scope(ctx: &DialogContext<'_>) -> Result<Option<Scope>> {
    let Some(token) = signed_in_token(ctx).await? else {
        return Ok(None);
    };
    match ctx.state.scope() {
        Some((account, team_project)) => Ok(Some(Scope {
            token,
            account: account.to_string(),
            team_project: team_project.to_string(),
        })),
        None => {
            ctx.say(SELECT_PROJECT_FIRST).await?;
            Ok(None)
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use devops_client::{MockConnectionFactory, MockData, VstsService};
    use devops_models::{Activity, ChannelAccount, ConversationRef, Profile};
    use std::sync::Arc;

    use crate::state::{ConversationState, SignIn};

    pub const ACCOUNT: &str = "contoso";
    pub const PROJECT: &str = "Fabrikam";
    pub const TOKEN: &str = "token";

    pub fn service(data: MockData) -> (VstsService, MockConnectionFactory) {
        let factory = MockConnectionFactory::new(data);
        (VstsService::new(Arc::new(factory.clone())), factory)
    }

    pub fn message(text: &str) -> Activity {
        Activity::message(
            ConversationRef::new("c1"),
            ChannelAccount::new("u1", "Ada"),
            ChannelAccount::new("bot", "devops-bot"),
            text,
        )
    }

    pub fn signed_in() -> ConversationState {
        let mut state = ConversationState::default();
        state.signed_in(SignIn::new(TOKEN, Profile::new("me", "Ada")));
        state
    }

    pub fn in_project() -> ConversationState {
        let mut state = signed_in();
        state.account = Some(ACCOUNT.into());
        state.team_project = Some(PROJECT.into());
        state
    }
}
