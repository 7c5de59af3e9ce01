//! Per-turn context handed to dialogs.

use devops_models::{Activity, Reply};

use crate::channel::Channel;
use crate::error::Result;
use crate::state::ConversationState;

/// The activity being handled, where to reply, and the conversation state.
pub struct DialogContext<'a> {
    pub activity: &'a Activity,
    pub channel: &'a dyn Channel,
    pub state: &'a mut ConversationState,
}

impl<'a> DialogContext<'a> {
    pub fn new(activity: &'a Activity, channel: &'a dyn Channel, state: &'a mut ConversationState) -> Self {
        Self {
            activity,
            channel,
            state,
        }
    }

    /// Trimmed message text.
    pub fn text(&self) -> &str {
        self.activity.command_text()
    }

    /// Sends a reply to the current conversation.
    pub async fn reply(&self, reply: impl Into<Reply>) -> Result<()> {
        self.channel
            .send(&self.activity.conversation, reply.into())
            .await
    }

    /// Sends a plain text reply.
    pub async fn say(&self, text: impl Into<String>) -> Result<()> {
        self.reply(Reply::text(text)).await
    }
}
