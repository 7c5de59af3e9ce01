//! Pending approvals.

use async_trait::async_trait;
use devops_client::VstsService;
use devops_models::{ApprovalStatus, Card, CardAction};

use super::{parse_action, project_scope, SIGN_IN_FIRST};
use crate::context::DialogContext;
use crate::dialog::{Dialog, DialogOutcome};
use crate::error::Result;
use crate::state::DialogStep;

/// `approvals`: lists the user's pending approvals, then approves or
/// rejects the one picked with a comment.
pub struct ApprovalsDialog {
    service: VstsService,
}

impl ApprovalsDialog {
    pub fn new(service: VstsService) -> Self {
        Self { service }
    }

    async fn decide(
        &self,
        ctx: &mut DialogContext<'_>,
        approval_id: i32,
        status: ApprovalStatus,
    ) -> Result<DialogOutcome> {
        let comment = ctx.text().to_string();
        if comment.is_empty() {
            return Ok(DialogOutcome::Unrecognized);
        }
        let Some(scope) = project_scope(ctx).await? else {
            return Ok(DialogOutcome::Handled);
        };

        let approval = self
            .service
            .change_approval_status(
                &scope.account,
                &scope.team_project,
                approval_id,
                status,
                &comment,
                &scope.token,
            )
            .await?;
        ctx.say(format!("{} is {}.", approval.summary(), approval.status))
            .await?;
        Ok(DialogOutcome::Handled)
    }
}

#[async_trait]
impl Dialog for ApprovalsDialog {
    fn name(&self) -> &str {
        "approvals"
    }

    async fn begin(&self, ctx: &mut DialogContext<'_>) -> Result<DialogOutcome> {
        let Some(scope) = project_scope(ctx).await? else {
            return Ok(DialogOutcome::Handled);
        };
        let Some(assignee) = ctx.state.profile().map(|p| p.id.clone()) else {
            ctx.say(SIGN_IN_FIRST).await?;
            return Ok(DialogOutcome::Handled);
        };

        let approvals = self
            .service
            .get_approvals(&scope.account, &scope.team_project, &assignee, &scope.token)
            .await?;
        if approvals.is_empty() {
            ctx.say("You have no pending approvals.").await?;
            return Ok(DialogOutcome::Handled);
        }

        let card = approvals.iter().fold(
            Card::new("Pending approvals").text("Approve or reject a deployment."),
            |card, approval| {
                let summary = approval.summary();
                card.action(CardAction::im_back(
                    format!("Approve {}", summary),
                    format!("approve {}", approval.id),
                ))
                .action(CardAction::im_back(
                    format!("Reject {}", summary),
                    format!("reject {}", approval.id),
                ))
            },
        );
        ctx.reply(card).await?;
        Ok(DialogOutcome::AwaitingInput)
    }

    async fn resume(&self, ctx: &mut DialogContext<'_>) -> Result<DialogOutcome> {
        if let Some(DialogStep::ApprovalComment {
            approval_id,
            status,
        }) = ctx.state.step
        {
            return self.decide(ctx, approval_id, status).await;
        }

        let (approval_id, status) = match parse_action(ctx.text()) {
            Some((verb, id)) if verb == "approve" => (id, ApprovalStatus::Approved),
            Some((verb, id)) if verb == "reject" => (id, ApprovalStatus::Rejected),
            _ => return Ok(DialogOutcome::Unrecognized),
        };

        ctx.state.step = Some(DialogStep::ApprovalComment {
            approval_id,
            status,
        });
        ctx.say(format!("Add a comment for approval {}.", approval_id))
            .await?;
        Ok(DialogOutcome::AwaitingInput)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::MemoryChannel;
    use crate::dialogs::testing;
    use devops_client::{MockData, RemoteCall};
    use devops_models::{Approval, IdentityRef, ShallowReference};

    fn data() -> MockData {
        let mut approval = Approval::pending(5);
        approval.release = Some(ShallowReference::new(10, "Release-10"));
        approval.release_environment = Some(ShallowReference::new(2, "Production"));
        approval.approver = Some(IdentityRef {
            id: "me".into(),
            display_name: "Ada".into(),
        });
        MockData {
            approvals: vec![approval, Approval::pending(6)],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_lists_my_approvals() {
        let (service, factory) = testing::service(data());
        let dialog = ApprovalsDialog::new(service);
        let channel = MemoryChannel::new();
        let mut state = testing::in_project();
        let activity = testing::message("approvals");
        let mut ctx = DialogContext::new(&activity, &channel, &mut state);

        assert_eq!(dialog.begin(&mut ctx).await.unwrap(), DialogOutcome::AwaitingInput);

        let card = channel.replies()[0].as_card().cloned().unwrap();
        assert_eq!(
            card.actions,
            vec![
                CardAction::im_back("Approve Release-10 to Production", "approve 5"),
                CardAction::im_back("Reject Release-10 to Production", "reject 5"),
            ]
        );
        assert!(matches!(
            &factory.calls()[0],
            RemoteCall::ListApprovals { assignee, .. } if assignee == "me"
        ));
    }

    #[tokio::test]
    async fn test_reject_with_comment() {
        let (service, factory) = testing::service(data());
        let dialog = ApprovalsDialog::new(service);
        let channel = MemoryChannel::new();
        let mut state = testing::in_project();

        let activity = testing::message("reject 5");
        let mut ctx = DialogContext::new(&activity, &channel, &mut state);
        assert_eq!(dialog.resume(&mut ctx).await.unwrap(), DialogOutcome::AwaitingInput);
        assert_eq!(factory.opened(), 0);

        let activity = testing::message("tests are red");
        let mut ctx = DialogContext::new(&activity, &channel, &mut state);
        assert_eq!(dialog.resume(&mut ctx).await.unwrap(), DialogOutcome::Handled);

        let stored = factory.approval(5).unwrap();
        assert_eq!(stored.status, ApprovalStatus::Rejected);
        assert_eq!(stored.comments.as_deref(), Some("tests are red"));
        assert_eq!(
            channel.replies().last().and_then(|r| r.as_text().map(str::to_string)),
            Some("Release-10 to Production is rejected.".to_string())
        );
    }

    #[tokio::test]
    async fn test_no_pending_approvals() {
        let (service, _) = testing::service(MockData::default());
        let dialog = ApprovalsDialog::new(service);
        let channel = MemoryChannel::new();
        let mut state = testing::in_project();
        let activity = testing::message("approvals");
        let mut ctx = DialogContext::new(&activity, &channel, &mut state);

        assert_eq!(dialog.begin(&mut ctx).await.unwrap(), DialogOutcome::Handled);
        assert_eq!(channel.replies().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_text_is_unrecognized() {
        let (service, _) = testing::service(data());
        let dialog = ApprovalsDialog::new(service);
        let channel = MemoryChannel::new();
        let mut state = testing::in_project();
        let activity = testing::message("queue 5");
        let mut ctx = DialogContext::new(&activity, &channel, &mut state);

        assert_eq!(dialog.resume(&mut ctx).await.unwrap(), DialogOutcome::Unrecognized);
        assert!(state.step.is_none());
    }
}
