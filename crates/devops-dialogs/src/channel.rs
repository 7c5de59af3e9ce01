//! Outbound reply channel.

use std::sync::Mutex;

use async_trait::async_trait;
use devops_models::{ConversationRef, Reply};

use crate::error::Result;

/// Delivers replies to a conversation.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Posts `reply` to `conversation`.
    async fn send(&self, conversation: &ConversationRef, reply: Reply) -> Result<()>;
}

/// Channel that keeps every reply in memory.
#[derive(Default)]
pub struct MemoryChannel {
    sent: Mutex<Vec<(ConversationRef, Reply)>>,
}

impl MemoryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replies sent so far, in order.
    pub fn replies(&self) -> Vec<Reply> {
        self.sent
            .lock()
            .map(|sent| sent.iter().map(|(_, reply)| reply.clone()).collect())
            .unwrap_or_default()
    }

    /// Replies sent to one conversation.
    pub fn replies_to(&self, conversation: &str) -> Vec<Reply> {
        self.sent
            .lock()
            .map(|sent| {
                sent.iter()
                    .filter(|(conv, _)| conv.id == conversation)
                    .map(|(_, reply)| reply.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.clear();
        }
    }
}

#[async_trait]
impl Channel for MemoryChannel {
    async fn send(&self, conversation: &ConversationRef, reply: Reply) -> Result<()> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((conversation.clone(), reply));
        }
        Ok(())
    }
}
