//! Update handlers.

use std::sync::Arc;

use devops_dialogs::{Channel, DialogError};
use devops_models::{Activity, Reply};
use teloxide::prelude::*;
use teloxide::types::CallbackQuery;
use tracing::{debug, error, warn};

use crate::channel::TelegramChannel;
use crate::convert;
use crate::state::BotState;

/// Sent once when a turn fails.
pub const APOLOGY: &str = "Sorry, something went wrong while talking to Azure DevOps. Please try again.";

/// Runs a turn and turns a failure into a log record and one apology.
pub async fn run_turn(state: &BotState, channel: &dyn Channel, activity: Activity) {
    let conversation = activity.conversation.clone();
    let err = match state.handle_activity(&activity, channel).await {
        Ok(()) => return,
        Err(err) => err,
    };

    match &err {
        DialogError::InvalidArgument(reason) => {
            warn!(conversation_id = %conversation.id, reason = %reason, "Activity rejected");
            return;
        }
        DialogError::Client(e) => {
            error!(conversation_id = %conversation.id, error = %e, "DevOps request failed");
        }
        other => {
            error!(conversation_id = %conversation.id, error = %other, "Turn failed");
        }
    }

    if let Err(e) = channel.send(&conversation, Reply::text(APOLOGY)).await {
        error!(conversation_id = %conversation.id, error = %e, "Failed to send apology");
    }
}

/// Handle a text message.
pub async fn handle_message(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let Some(activity) = convert::message_activity(&msg, &state.me) else {
        debug!(chat_id = %msg.chat.id, "Message without sender or text ignored");
        return Ok(());
    };
    run_turn(&state, &TelegramChannel::new(bot), activity).await;
    Ok(())
}

/// Handle members joining a chat.
pub async fn handle_members(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    if let Some(activity) = convert::members_activity(&msg, &state.me) {
        run_turn(&state, &TelegramChannel::new(bot), activity).await;
    }
    Ok(())
}

/// Handle an inline button press.
pub async fn handle_callback(bot: Bot, q: CallbackQuery, state: Arc<BotState>) -> ResponseResult<()> {
    bot.answer_callback_query(q.id.clone()).await?;

    let Some(activity) = convert::callback_activity(&q, &state.me) else {
        debug!(user_id = q.from.id.0, "Callback without data or message ignored");
        return Ok(());
    };
    run_turn(&state, &TelegramChannel::new(bot), activity).await;
    Ok(())
}
