//! Build definitions and queuing.

use async_trait::async_trait;
use devops_client::VstsService;
use devops_models::{Card, CardAction};

use super::{parse_action, project_scope};
use crate::context::DialogContext;
use crate::dialog::{Dialog, DialogOutcome};
use crate::error::Result;

/// `builds`: lists build definitions and queues the one picked.
pub struct BuildsDialog {
    service: VstsService,
}

impl BuildsDialog {
    pub fn new(service: VstsService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Dialog for BuildsDialog {
    fn name(&self) -> &str {
        "builds"
    }

    async fn begin(&self, ctx: &mut DialogContext<'_>) -> Result<DialogOutcome> {
        let Some(scope) = project_scope(ctx).await? else {
            return Ok(DialogOutcome::Handled);
        };

        let definitions = self
            .service
            .get_build_definitions(&scope.account, &scope.team_project, &scope.token)
            .await?;
        if definitions.is_empty() {
            ctx.say(format!("{} has no build definitions.", scope.team_project))
                .await?;
            return Ok(DialogOutcome::Handled);
        }

        let card = definitions.iter().fold(
            Card::new("Build definitions").text("Pick a definition to queue a build."),
            |card, definition| {
                card.action(CardAction::im_back(
                    &definition.name,
                    format!("queue {}", definition.id),
                ))
            },
        );
        ctx.reply(card).await?;
        Ok(DialogOutcome::AwaitingInput)
    }

    async fn resume(&self, ctx: &mut DialogContext<'_>) -> Result<DialogOutcome> {
        let definition_id = match parse_action(ctx.text()) {
            Some((verb, id)) if verb == "queue" => id,
            _ => return Ok(DialogOutcome::Unrecognized),
        };
        let Some(scope) = project_scope(ctx).await? else {
            return Ok(DialogOutcome::Handled);
        };

        let build = self
            .service
            .queue_build(&scope.account, &scope.team_project, definition_id, &scope.token)
            .await?;
        ctx.say(format!("Build {} queued.", build.build_number)).await?;
        Ok(DialogOutcome::Handled)
    }
}
