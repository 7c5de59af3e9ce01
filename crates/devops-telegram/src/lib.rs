//! Telegram front-end for the DevOps bot.
//!
//! Converts Telegram updates into activities, runs them through the
//! [`devops_dialogs::RootDialog`] and posts the replies back. A small axum
//! server receives the OAuth redirect that completes a sign-in.
//!
//! # Environment Variables
//!
//! Required:
//! - `TELEGRAM_BOT_TOKEN`: Bot token from @BotFather
//!
//! Optional:
//! - `TELEGRAM_API_URL`: Local Bot API server or emulator
//! - `DEVOPS_APP_ID`, `DEVOPS_APP_SECRET`: Enable sign-in
//! - `DEVOPS_CALLBACK_URL`: Public base URL of the callback server
//! - `BOT_HTTP_PORT`: Callback server port (default: 3978)
//!
//! # Commands
//!
//! - `/start`, `/help` - Show the command menu
//! - `/connect` - Sign in, then pick an account and a team project
//! - `/builds` - Queue a build
//! - `/releases` - Create a release
//! - `/approvals` - Approve or reject pending deployments

pub mod bot;
pub mod channel;
pub mod convert;
pub mod error;
pub mod handlers;
pub mod server;
pub mod state;

pub use bot::TelegramBot;
pub use channel::TelegramChannel;
pub use error::{Result, ServerError, TelegramError};
pub use server::{create_router, serve, ServerState};
pub use state::BotState;
