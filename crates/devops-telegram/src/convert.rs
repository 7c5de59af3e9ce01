//! Telegram updates to bot activities.

use devops_models::{Activity, ChannelAccount, ConversationRef};
use teloxide::types::{CallbackQuery, ChatId, Message, User};

/// Account of a Telegram user.
pub fn user_account(user: &User) -> ChannelAccount {
    ChannelAccount::new(user.id.0.to_string(), user.full_name())
}

/// Conversation of a Telegram chat.
pub fn conversation(chat_id: ChatId) -> ConversationRef {
    ConversationRef::new(chat_id.0.to_string())
}

/// Turns a slash command into command text: `/builds@devops_bot 3` becomes
/// `builds 3`. Other text is only trimmed.
pub fn command_text(text: &str) -> String {
    let text = text.trim();
    let Some(command) = text.strip_prefix('/') else {
        return text.to_string();
    };

    let (head, tail) = match command.find(char::is_whitespace) {
        Some(at) => command.split_at(at),
        None => (command, ""),
    };
    let head = head.split('@').next().unwrap_or(head);
    format!("{}{}", head, tail)
}

/// Message activity for a text message. `None` without text.
pub fn message_activity(msg: &Message, me: &ChannelAccount) -> Option<Activity> {
    let text = msg.text()?;
    let from = msg.from.as_ref().map(user_account)?;
    Some(Activity::message(
        conversation(msg.chat.id),
        from,
        me.clone(),
        command_text(text),
    ))
}

/// Conversation update for a "new chat members" service message.
pub fn members_activity(msg: &Message, me: &ChannelAccount) -> Option<Activity> {
    let members = msg.new_chat_members()?;
    Some(Activity::conversation_update(
        conversation(msg.chat.id),
        me.clone(),
        members.iter().map(user_account).collect(),
    ))
}

/// Message activity for an inline button press; the button data is the text.
pub fn callback_activity(query: &CallbackQuery, me: &ChannelAccount) -> Option<Activity> {
    let data = query.data.as_deref()?;
    let chat_id = query.message.as_ref().map(|m| m.chat().id)?;
    Some(Activity::message(
        conversation(chat_id),
        user_account(&query.from),
        me.clone(),
        data,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use devops_models::ActivityType;
    use serde_json::json;

    fn me() -> ChannelAccount {
        ChannelAccount::new("99", "devops_bot")
    }

    fn ada() -> serde_json::Value {
        json!({"id": 7, "is_bot": false, "first_name": "Ada", "last_name": "Lovelace"})
    }

    fn private_message(text: &str) -> Message {
        serde_json::from_value(json!({
            "message_id": 1,
            "date": 1_700_000_000,
            "chat": {"id": 42, "type": "private", "first_name": "Ada"},
            "from": ada(),
            "text": text
        }))
        .unwrap()
    }

    #[test]
    fn test_command_text() {
        assert_eq!(command_text("/builds"), "builds");
        assert_eq!(command_text("/builds@devops_bot"), "builds");
        assert_eq!(command_text("/queue@devops_bot 3"), "queue 3");
        assert_eq!(command_text("  approve 5 "), "approve 5");
        assert_eq!(command_text("/"), "");
    }

    #[test]
    fn test_message_activity() {
        let activity = message_activity(&private_message("/help@devops_bot"), &me()).unwrap();

        assert_eq!(activity.kind, ActivityType::Message);
        assert_eq!(activity.conversation.id, "42");
        assert_eq!(activity.text.as_deref(), Some("help"));
        assert_eq!(activity.from, Some(ChannelAccount::new("7", "Ada Lovelace")));
        assert_eq!(activity.recipient, me());
    }

    #[test]
    fn test_new_members_activity() {
        let msg: Message = serde_json::from_value(json!({
            "message_id": 2,
            "date": 1_700_000_000,
            "chat": {"id": -100, "type": "group", "title": "Ops"},
            "from": ada(),
            "new_chat_members": [
                ada(),
                {"id": 99, "is_bot": true, "first_name": "DevOps", "username": "devops_bot"}
            ]
        }))
        .unwrap();

        assert!(message_activity(&msg, &me()).is_none());
        let activity = members_activity(&msg, &me()).unwrap();
        assert!(activity.is_conversation_update());
        assert_eq!(activity.conversation.id, "-100");
        assert!(activity.from.is_none());
        assert_eq!(activity.members_added.len(), 2);
        assert!(activity.members_added[1].is_same(&me()));
    }

    #[test]
    fn test_callback_activity() {
        let query: CallbackQuery = serde_json::from_value(json!({
            "id": "q1",
            "from": ada(),
            "chat_instance": "ci",
            "data": "queue 3",
            "message": {
                "message_id": 5,
                "date": 1_700_000_000,
                "chat": {"id": 42, "type": "private", "first_name": "Ada"},
                "text": "Build definitions"
            }
        }))
        .unwrap();

        let activity = callback_activity(&query, &me()).unwrap();
        assert_eq!(activity.text.as_deref(), Some("queue 3"));
        assert_eq!(activity.conversation.id, "42");
        assert_eq!(activity.from.unwrap().id, "7");
    }
}
