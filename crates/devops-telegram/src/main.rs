//! DevOps Telegram bot binary.
//!
//! Start the bot with:
//! ```bash
//! TELEGRAM_BOT_TOKEN=xxx cargo run -p devops-telegram
//! ```

use std::sync::Arc;

use clap::Parser;
use devops_client::HttpConnectionFactory;
use devops_core::{config, BotConfig, FileTelemetry};
use devops_dialogs::ConversationStore;
use devops_telegram::{serve, BotState, ServerState, TelegramBot};
use tracing_subscriber::EnvFilter;

/// DevOps Telegram bot - queue builds, create releases and approve deployments from chat
#[derive(Parser, Debug)]
#[command(name = "devops-telegram")]
#[command(about = "Telegram bot for Azure DevOps builds, releases and approvals")]
struct Args {
    /// Callback server port (overrides BOT_HTTP_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Verbose logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    config::load_env();

    let filter = match args.verbose {
        0 => "devops_telegram=info,devops_dialogs=info,devops_client=info,telemetry=info,teloxide=warn",
        1 => "devops_telegram=debug,devops_dialogs=debug,devops_client=debug,telemetry=info,teloxide=info",
        2 => "devops_telegram=trace,devops_dialogs=trace,devops_client=trace,teloxide=debug,tower_http=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut bot_config = BotConfig::from_env()?;
    if let Some(port) = args.port {
        bot_config.http_port = port;
    }

    if let Err(e) = config::ensure_all_dirs() {
        tracing::warn!(error = %e, "Failed to create all directories");
    }

    let bot = TelegramBot::new(&bot_config);
    let me = match bot.get_me().await {
        Ok(me) => {
            tracing::info!(username = %me.name, "Bot initialized successfully");
            println!("\n[robot] DevOps Telegram Bot");
            println!("   Bot: @{}", me.name);
            println!(
                "   Sign-in: {}",
                if bot_config.oauth.is_some() { "enabled" } else { "disabled (DEVOPS_APP_ID not set)" }
            );
            me
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to get bot info");
            return Err(e.into());
        }
    };

    let state = Arc::new(BotState::new(
        &bot_config,
        me,
        Arc::new(HttpConnectionFactory::new()),
        Arc::new(FileTelemetry::spawn(config::telemetry_file())),
        ConversationStore::open(config::conversations_file()),
    ));

    let addr = bot_config.bind_address();
    let server_state = ServerState::new(Arc::clone(&state), Arc::new(bot.channel()));
    tokio::spawn(async move {
        if let Err(e) = serve(&addr, server_state).await {
            tracing::error!(error = %e, addr = %addr, "Callback server stopped");
        }
    });

    println!("   Callback server: {}", bot_config.bind_address());
    println!("\n[phone] Open Telegram and send /start to begin");
    println!("   Press Ctrl+C to stop\n");

    bot.start_polling(state).await?;

    Ok(())
}
