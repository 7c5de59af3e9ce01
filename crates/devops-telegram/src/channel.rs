//! Delivers bot replies to Telegram chats.

use async_trait::async_trait;
use devops_dialogs::{Channel, DialogError};
use devops_models::{Card, CardActionKind, ConversationRef, Reply};
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use tracing::{debug, warn};
use url::Url;

/// Telegram rejects callback data longer than this many bytes.
const MAX_CALLBACK_DATA: usize = 64;

/// [`Channel`] backed by the Bot API.
#[derive(Clone)]
pub struct TelegramChannel {
    bot: Bot,
}

impl TelegramChannel {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Channel for TelegramChannel {
    async fn send(&self, conversation: &ConversationRef, reply: Reply) -> devops_dialogs::Result<()> {
        let chat_id = chat_id(conversation)?;
        let request = match reply {
            Reply::Text(text) => self.bot.send_message(chat_id, text),
            Reply::Card(card) => {
                let request = self.bot.send_message(chat_id, card_text(&card));
                match keyboard(&card) {
                    Some(markup) => request.reply_markup(markup),
                    None => request,
                }
            }
        };

        request
            .await
            .map_err(|e| DialogError::Channel(e.to_string()))?;
        debug!(chat_id = chat_id.0, "Reply sent");
        Ok(())
    }
}

fn chat_id(conversation: &ConversationRef) -> devops_dialogs::Result<ChatId> {
    conversation
        .id
        .parse::<i64>()
        .map(ChatId)
        .map_err(|_| DialogError::Channel(format!("not a Telegram chat id: {}", conversation.id)))
}

/// Message body of a card: the title, then the text.
pub fn card_text(card: &Card) -> String {
    match &card.text {
        Some(text) => format!("{}\n\n{}", card.title, text),
        None => card.title.clone(),
    }
}

/// One button per row. Buttons Telegram would reject are left out.
pub fn keyboard(card: &Card) -> Option<InlineKeyboardMarkup> {
    let rows: Vec<Vec<InlineKeyboardButton>> = card
        .actions
        .iter()
        .filter_map(|action| match &action.kind {
            CardActionKind::ImBack(value) if value.len() <= MAX_CALLBACK_DATA => {
                Some(InlineKeyboardButton::callback(action.title.clone(), value.clone()))
            }
            CardActionKind::ImBack(value) => {
                warn!(title = %action.title, len = value.len(), "Button data too long, skipped");
                None
            }
            CardActionKind::OpenUrl(url) => match Url::parse(url) {
                Ok(url) => Some(InlineKeyboardButton::url(action.title.clone(), url)),
                Err(e) => {
                    warn!(title = %action.title, error = %e, "Invalid button URL, skipped");
                    None
                }
            },
        })
        .map(|button| vec![button])
        .collect();

    if rows.is_empty() {
        None
    } else {
        Some(InlineKeyboardMarkup::new(rows))
    }
}
