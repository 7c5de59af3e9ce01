//! Outbound replies: plain text or a card with actions.

use serde::{Deserialize, Serialize};

/// What a card button does when pressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum CardActionKind {
    /// Post the given text back to the bot as if the user typed it.
    ImBack(String),
    /// Open a URL in the user's browser.
    OpenUrl(String),
}

/// A button on a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardAction {
    /// Button caption.
    pub title: String,

    /// Button behavior.
    pub kind: CardActionKind,
}

impl CardAction {
    /// A button that posts `value` back to the bot.
    pub fn im_back(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            kind: CardActionKind::ImBack(value.into()),
        }
    }

    /// A button that opens `url`.
    pub fn open_url(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            kind: CardActionKind::OpenUrl(url.into()),
        }
    }
}

/// A rich reply with a title, optional body and buttons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Card title.
    pub title: String,

    /// Body text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Buttons, in display order.
    #[serde(default)]
    pub actions: Vec<CardAction>,
}

impl Card {
    /// Creates a card with a title and no buttons.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: None,
            actions: Vec::new(),
        }
    }

    /// Sets the body text.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Adds a button.
    pub fn action(mut self, action: CardAction) -> Self {
        self.actions.push(action);
        self
    }
}

/// A reply posted back through the channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "body", rename_all = "camelCase")]
pub enum Reply {
    /// Plain text.
    Text(String),
    /// A card.
    Card(Card),
}

impl Reply {
    /// Creates a text reply.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Returns the card, if this is a card reply.
    pub fn as_card(&self) -> Option<&Card> {
        match self {
            Self::Card(card) => Some(card),
            Self::Text(_) => None,
        }
    }

    /// Returns the text, if this is a text reply.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Card(_) => None,
        }
    }
}

impl From<Card> for Reply {
    fn from(card: Card) -> Self {
        Self::Card(card)
    }
}
