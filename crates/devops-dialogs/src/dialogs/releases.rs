//! Release definitions and release creation.

use async_trait::async_trait;
use devops_client::VstsService;
use devops_models::{Card, CardAction};
use tracing::info;

use super::{parse_action, project_scope};
use crate::context::DialogContext;
use crate::dialog::{Dialog, DialogOutcome};
use crate::error::Result;

/// `releases`: lists release definitions and starts a release of the one picked.
pub struct ReleasesDialog {
    service: VstsService,
}

impl ReleasesDialog {
    pub fn new(service: VstsService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Dialog for ReleasesDialog {
    fn name(&self) -> &str {
        "releases"
    }

    async fn begin(&self, ctx: &mut DialogContext<'_>) -> Result<DialogOutcome> {
        let Some(scope) = project_scope(ctx).await? else {
            return Ok(DialogOutcome::Handled);
        };

        let definitions = self
            .service
            .get_release_definitions(&scope.account, &scope.team_project, &scope.token)
            .await?;
        if definitions.is_empty() {
            ctx.say(format!("{} has no release definitions.", scope.team_project))
                .await?;
            return Ok(DialogOutcome::Handled);
        }

        let card = definitions.iter().fold(
            Card::new("Release definitions")
                .text("Pick a definition to create a release from the latest builds."),
            |card, definition| {
                card.action(CardAction::im_back(
                    &definition.name,
                    format!("create {}", definition.id),
                ))
            },
        );
        ctx.reply(card).await?;
        Ok(DialogOutcome::AwaitingInput)
    }

    async fn resume(&self, ctx: &mut DialogContext<'_>) -> Result<DialogOutcome> {
        let definition_id = match parse_action(ctx.text()) {
            Some((verb, id)) if verb == "create" => id,
            _ => return Ok(DialogOutcome::Unrecognized),
        };
        let Some(scope) = project_scope(ctx).await? else {
            return Ok(DialogOutcome::Handled);
        };

        let release = self
            .service
            .create_release(&scope.account, &scope.team_project, definition_id, &scope.token)
            .await?;
        info!(release_id = release.id, "Release requested from chat");
        ctx.say(format!("{} created.", release.name)).await?;
        Ok(DialogOutcome::Handled)
    }
}
