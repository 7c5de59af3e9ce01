//! The root dialog: entry point for every inbound activity.
//!
//! Conversation updates produce welcome messages. Messages go to the active
//! child dialog if one is waiting for input; otherwise the text is resolved
//! against the [`CommandRegistry`] and the matching dialog is started. A
//! dialog answering [`DialogOutcome::Unrecognized`] hands the same activity
//! back for another resolution pass, at most [`MAX_RESOLUTION_PASSES`] times.

use std::sync::Arc;

use devops_core::{TelemetryEvent, TelemetrySink};
use devops_models::Activity;
use tracing::{debug, info, warn};

use crate::cards;
use crate::channel::Channel;
use crate::context::DialogContext;
use crate::dialog::DialogOutcome;
use crate::error::{DialogError, Result};
use crate::registry::CommandRegistry;
use crate::state::ConversationState;

/// Upper bound on command resolution per activity.
pub const MAX_RESOLUTION_PASSES: usize = 2;

/// Routes activities to dialogs.
pub struct RootDialog {
    registry: Arc<CommandRegistry>,
    telemetry: Arc<dyn TelemetrySink>,
    eula_url: String,
}

impl RootDialog {
    pub fn new(
        registry: Arc<CommandRegistry>,
        telemetry: Arc<dyn TelemetrySink>,
        eula_url: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            telemetry,
            eula_url: eula_url.into(),
        }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Handles one activity of a conversation.
    ///
    /// Faults raised by dialogs propagate to the caller. The failing dialog
    /// is ended first so the next message goes through command resolution.
    pub async fn handle(
        &self,
        activity: &Activity,
        channel: &dyn Channel,
        state: &mut ConversationState,
    ) -> Result<()> {
        validate(activity)?;

        if activity.is_conversation_update() {
            return self.welcome(activity, channel).await;
        }

        let mut ctx = DialogContext::new(activity, channel, state);

        if let Some(key) = ctx.state.active_dialog.clone() {
            match self.registry.get(&key) {
                Some(dialog) => {
                    debug!(dialog = %key, "Resuming dialog");
                    let outcome = match dialog.resume(&mut ctx).await {
                        Ok(outcome) => outcome,
                        Err(e) => {
                            ctx.state.end_dialog();
                            return Err(e);
                        }
                    };
                    if settle(&key, outcome, ctx.state) {
                        return Ok(());
                    }
                    debug!(dialog = %key, "Dialog returned control, resolving command");
                }
                None => {
                    warn!(dialog = %key, "Active dialog is not registered, dropping it");
                    ctx.state.end_dialog();
                }
            }
        }

        self.dispatch(&mut ctx).await
    }

    async fn dispatch(&self, ctx: &mut DialogContext<'_>) -> Result<()> {
        let activity = ctx.activity;
        let text = activity.command_text();
        let raw = activity.text.as_deref().unwrap_or_default();

        for pass in 1..=MAX_RESOLUTION_PASSES {
            let Some((key, dialog)) = self.registry.resolve(text) else {
                debug!(command = %text, "Unrecognized command, showing menu");
                return self.show_menu(ctx).await;
            };

            self.telemetry
                .track_event(TelemetryEvent::new(raw).with_property("dialog", key));
            info!(command = %text, dialog = %key, pass, "Dispatching command");

            let key = key.to_string();
            let outcome = match dialog.begin(ctx).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    ctx.state.end_dialog();
                    return Err(e);
                }
            };
            if settle(&key, outcome, ctx.state) {
                return Ok(());
            }
        }

        debug!(command = %text, "Command still unrecognized after re-resolution");
        self.show_menu(ctx).await
    }

    async fn welcome(&self, activity: &Activity, channel: &dyn Channel) -> Result<()> {
        for member in activity
            .members_added
            .iter()
            .filter(|member| !member.is_same(&activity.recipient))
        {
            debug!(member = %member.id, "Welcoming member");
            channel
                .send(&activity.conversation, cards::welcome(member, &self.eula_url))
                .await?;
        }
        Ok(())
    }

    async fn show_menu(&self, ctx: &DialogContext<'_>) -> Result<()> {
        ctx.reply(cards::menu(self.registry.commands())).await
    }
}

/// Applies a dialog outcome to the state. Returns `true` when the turn is over.
fn settle(key: &str, outcome: DialogOutcome, state: &mut ConversationState) -> bool {
    match outcome {
        DialogOutcome::Handled => {
            state.end_dialog();
            true
        }
        DialogOutcome::AwaitingInput => {
            state.active_dialog = Some(key.to_string());
            true
        }
        DialogOutcome::Unrecognized => {
            state.end_dialog();
            false
        }
    }
}

fn validate(activity: &Activity) -> Result<()> {
    if activity.conversation.id.trim().is_empty() {
        return Err(DialogError::invalid("activity has no conversation id"));
    }
    if !activity.is_conversation_update()
        && activity.from.as_ref().map_or(true, |from| from.id.trim().is_empty())
    {
        return Err(DialogError::invalid("activity has no sender"));
    }
    Ok(())
}
