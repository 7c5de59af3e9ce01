//! Conversational activities delivered by a channel.

use serde::{Deserialize, Serialize};

/// Kind of an inbound activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ActivityType {
    /// A user message.
    #[default]
    Message,
    /// Members were added to (or removed from) the conversation.
    ConversationUpdate,
}

/// A participant of a conversation (user or bot).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelAccount {
    /// Channel-specific id.
    pub id: String,

    /// Display name.
    #[serde(default)]
    pub name: String,
}

impl ChannelAccount {
    /// Creates an account.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Whether this account has the same id as `other`, ignoring ASCII case.
    pub fn is_same(&self, other: &ChannelAccount) -> bool {
        self.id.eq_ignore_ascii_case(&other.id)
    }
}

/// Identifies the conversation an activity belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationRef {
    /// Conversation id (for Telegram, the chat id).
    pub id: String,
}

impl ConversationRef {
    /// Creates a reference.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// One inbound conversational event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// Kind of activity.
    #[serde(rename = "type")]
    pub kind: ActivityType,

    /// Message text (messages only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Sender.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<ChannelAccount>,

    /// Receiving bot.
    pub recipient: ChannelAccount,

    /// Conversation the activity belongs to.
    pub conversation: ConversationRef,

    /// Members added (conversation updates only).
    #[serde(default)]
    pub members_added: Vec<ChannelAccount>,
}

impl Activity {
    /// Creates a message activity.
    pub fn message(
        conversation: ConversationRef,
        from: ChannelAccount,
        recipient: ChannelAccount,
        text: impl Into<String>,
    ) -> Self {
        Self {
            kind: ActivityType::Message,
            text: Some(text.into()),
            from: Some(from),
            recipient,
            conversation,
            members_added: Vec::new(),
        }
    }

    /// Creates a conversation update announcing new members.
    pub fn conversation_update(
        conversation: ConversationRef,
        recipient: ChannelAccount,
        members_added: Vec<ChannelAccount>,
    ) -> Self {
        Self {
            kind: ActivityType::ConversationUpdate,
            text: None,
            from: None,
            recipient,
            conversation,
            members_added,
        }
    }

    /// Message text, trimmed. Empty when absent.
    pub fn command_text(&self) -> &str {
        self.text.as_deref().map(str::trim).unwrap_or("")
    }

    /// Whether this is a conversation update.
    pub fn is_conversation_update(&self) -> bool {
        self.kind == ActivityType::ConversationUpdate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bot() -> ChannelAccount {
        ChannelAccount::new("Bot-1", "devops-bot")
    }

    #[test]
    fn test_is_same_ignores_case() {
        assert!(bot().is_same(&ChannelAccount::new("bot-1", "other")));
        assert!(!bot().is_same(&ChannelAccount::new("bot-2", "devops-bot")));
    }

    #[test]
    fn test_command_text_trims() {
        let activity = Activity::message(
            ConversationRef::new("c"),
            ChannelAccount::new("u", "User"),
            bot(),
            "  builds \n",
        );
        assert_eq!(activity.command_text(), "builds");
        assert!(!activity.is_conversation_update());
    }

    #[test]
    fn test_conversation_update() {
        let activity = Activity::conversation_update(
            ConversationRef::new("c"),
            bot(),
            vec![ChannelAccount::new("u", "User")],
        );
        assert!(activity.is_conversation_update());
        assert_eq!(activity.command_text(), "");
        assert!(activity.from.is_none());
    }
}
