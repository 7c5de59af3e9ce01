//! Telegram bot setup and update dispatch.

use std::sync::Arc;

use devops_core::BotConfig;
use devops_models::ChannelAccount;
use teloxide::dispatching::UpdateFilterExt;
use teloxide::prelude::*;
use tracing::{info, warn};

use crate::channel::TelegramChannel;
use crate::convert;
use crate::error::{Result, TelegramError};
use crate::handlers::{handle_callback, handle_members, handle_message};
use crate::state::BotState;

/// The Telegram bot.
pub struct TelegramBot {
    bot: Bot,
}

impl TelegramBot {
    /// Creates the bot from `config`, pointing it at the emulator or local
    /// Bot API server when one is configured.
    pub fn new(config: &BotConfig) -> Self {
        let mut bot = Bot::new(&config.telegram_token);
        if let Some(url) = &config.telegram_api_url {
            info!(url = %url, "Using custom Bot API server");
            bot = bot.set_api_url(url.clone());
        }
        Self { bot }
    }

    /// The bot's own account, used as the recipient of activities.
    pub async fn get_me(&self) -> Result<ChannelAccount> {
        let me = self
            .bot
            .get_me()
            .await
            .map_err(|e| TelegramError::BotStartFailed(e.to_string()))?;
        let mut account = convert::user_account(&me.user);
        account.name = me.username().to_string();
        Ok(account)
    }

    /// Channel that posts through this bot.
    pub fn channel(&self) -> TelegramChannel {
        TelegramChannel::new(self.bot.clone())
    }

    /// Polls for updates until Ctrl+C.
    pub async fn start_polling(&self, state: Arc<BotState>) -> Result<()> {
        info!("Starting Telegram bot in polling mode...");

        let state_for_callbacks = Arc::clone(&state);
        let state_for_members = Arc::clone(&state);
        let state_for_messages = Arc::clone(&state);

        let handler = dptree::entry()
            .branch(
                Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
                    let state = Arc::clone(&state_for_callbacks);
                    async move { handle_callback(bot, q, state).await }
                }),
            )
            .branch(
                Update::filter_message()
                    .filter(|msg: Message| msg.new_chat_members().is_some())
                    .endpoint(move |bot: Bot, msg: Message| {
                        let state = Arc::clone(&state_for_members);
                        info!(chat_id = %msg.chat.id, "Members joined");
                        async move { handle_members(bot, msg, state).await }
                    }),
            )
            .branch(
                Update::filter_message()
                    .filter(|msg: Message| msg.text().is_some())
                    .endpoint(move |bot: Bot, msg: Message| {
                        let state = Arc::clone(&state_for_messages);
                        info!(chat_id = %msg.chat.id, "Message received");
                        async move { handle_message(bot, msg, state).await }
                    }),
            );

        Dispatcher::builder(self.bot.clone(), handler)
            .default_handler(|upd| async move {
                warn!("Unhandled update: {:?}", upd.kind);
            })
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        info!("Telegram bot stopped");
        Ok(())
    }
}
