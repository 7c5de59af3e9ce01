//! Sign-in and account/project selection.

use async_trait::async_trait;
use devops_client::{OAuthClient, VstsService};
use devops_models::{Card, CardAction};
use tracing::{debug, info};
use uuid::Uuid;

use super::{signed_in_token, SIGN_IN_FIRST};
use crate::context::DialogContext;
use crate::dialog::{Dialog, DialogOutcome};
use crate::error::Result;
use crate::state::DialogStep;

/// `connect`: signs the user in, then asks for an account and a project.
pub struct ConnectDialog {
    service: VstsService,
    oauth: Option<OAuthClient>,
}

impl ConnectDialog {
    pub fn new(service: VstsService, oauth: Option<OAuthClient>) -> Self {
        Self { service, oauth }
    }

    async fn offer_sign_in(&self, ctx: &mut DialogContext<'_>) -> Result<DialogOutcome> {
        let Some(oauth) = &self.oauth else {
            ctx.say("Sign-in is not configured for this bot.").await?;
            return Ok(DialogOutcome::Handled);
        };

        let nonce = Uuid::new_v4().to_string();
        let url = oauth.authorize_url(&nonce);
        ctx.state.pending_sign_in = Some(nonce);
        debug!(conversation = %ctx.activity.conversation.id, "Sign-in offered");

        ctx.reply(
            Card::new("Sign in to Azure DevOps")
                .text("Open the link, grant access, then type \"connect\" again to pick a project.")
                .action(CardAction::open_url("Sign in", url.as_str())),
        )
        .await?;
        Ok(DialogOutcome::Handled)
    }

    async fn ask_account(&self, ctx: &mut DialogContext<'_>, token: &str) -> Result<DialogOutcome> {
        let Some(profile) = ctx.state.profile().cloned() else {
            ctx.say(SIGN_IN_FIRST).await?;
            return Ok(DialogOutcome::Handled);
        };

        let accounts = self.service.get_accounts(&profile.id, token).await?;
        if accounts.is_empty() {
            ctx.say(format!("No accounts found for {}.", profile.display_name))
                .await?;
            return Ok(DialogOutcome::Handled);
        }

        let card = accounts.iter().fold(
            Card::new("Choose an account").text(format!("Signed in as {}.", profile.display_name)),
            |card, account| card.action(CardAction::im_back(&account.account_name, &account.account_name)),
        );
        ctx.reply(card).await?;
        ctx.state.step = Some(DialogStep::SelectAccount);
        Ok(DialogOutcome::AwaitingInput)
    }

    async fn select_account(&self, ctx: &mut DialogContext<'_>, token: &str) -> Result<DialogOutcome> {
        let Some(profile) = ctx.state.profile().cloned() else {
            ctx.say(SIGN_IN_FIRST).await?;
            return Ok(DialogOutcome::Handled);
        };

        let accounts = self.service.get_accounts(&profile.id, token).await?;
        let Some(account) = accounts
            .into_iter()
            .find(|a| a.account_name.eq_ignore_ascii_case(ctx.text()))
        else {
            return Ok(DialogOutcome::Unrecognized);
        };

        let projects = self.service.get_projects(&account.account_name, token).await?;
        ctx.state.account = Some(account.account_name.clone());
        ctx.state.team_project = None;

        if projects.is_empty() {
            ctx.say(format!("Account {} has no team projects.", account.account_name))
                .await?;
            return Ok(DialogOutcome::Handled);
        }

        let card = projects.iter().fold(
            Card::new("Choose a team project").text(format!("Account {}.", account.account_name)),
            |card, project| card.action(CardAction::im_back(&project.name, &project.name)),
        );
        ctx.reply(card).await?;
        ctx.state.step = Some(DialogStep::SelectProject);
        Ok(DialogOutcome::AwaitingInput)
    }

    async fn select_project(&self, ctx: &mut DialogContext<'_>, token: &str) -> Result<DialogOutcome> {
        let Some(account) = ctx.state.account.clone() else {
            return Ok(DialogOutcome::Unrecognized);
        };

        let projects = self.service.get_projects(&account, token).await?;
        let Some(project) = projects
            .into_iter()
            .find(|p| p.name.eq_ignore_ascii_case(ctx.text()))
        else {
            return Ok(DialogOutcome::Unrecognized);
        };

        info!(account = %account, team_project = %project.name, "Team project selected");
        ctx.say(format!("Connected to {} / {}.", account, project.name))
            .await?;
        ctx.state.team_project = Some(project.name);
        Ok(DialogOutcome::Handled)
    }
}

#[async_trait]
impl Dialog for ConnectDialog {
    fn name(&self) -> &str {
        "connect"
    }

    async fn begin(&self, ctx: &mut DialogContext<'_>) -> Result<DialogOutcome> {
        match ctx.state.access_token().map(str::to_string) {
            Some(token) => self.ask_account(ctx, &token).await,
            None => self.offer_sign_in(ctx).await,
        }
    }

    async fn resume(&self, ctx: &mut DialogContext<'_>) -> Result<DialogOutcome> {
        let Some(token) = signed_in_token(ctx).await? else {
            return Ok(DialogOutcome::Handled);
        };
        match ctx.state.step {
            Some(DialogStep::SelectAccount) => self.select_account(ctx, &token).await,
            Some(DialogStep::SelectProject) => self.select_project(ctx, &token).await,
            _ => Ok(DialogOutcome::Unrecognized),
        }
    }
}
