//! TGSUM - A Telegram bot that keeps recent chat messages and summarizes them on demand.
//!
//! The bot listens to every text message in the chats it is in, keeps the
//! latest 200 per chat in memory, and answers `/summarize` with a Persian
//! summary generated by an Azure `OpenAI` deployment.
//!
//! # Architecture
//!
//! - `store` holds the bounded per-chat history
//! - `ai` builds the summarization request and calls Azure `OpenAI`
//! - `bot` implements the `/summarize`, `/clear`, `/stats` and `/start` commands
//! - `telegram` talks to the Bot API (long polling, send, delete)
//! - `worker` routes each update to the handlers, one task per update
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tgsum::ai::{AzureOpenAiClient, SummaryRequestBuilder};
//! use tgsum::bot::CommandHandlers;
//! use tgsum::core::config::AppConfig;
//! use tgsum::store::MessageStore;
//! use tgsum::telegram::TelegramClient;
//! use tgsum::worker::Poller;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Set up structured logging
//!     tgsum::setup_logging();
//!
//!     let config = AppConfig::from_env()?;
//!     let telegram = Arc::new(TelegramClient::new(config.telegram_bot_token.clone())?);
//!     let me = telegram.get_me().await?;
//!
//!     let handlers = Arc::new(CommandHandlers::new(
//!         Arc::new(MessageStore::new()),
//!         SummaryRequestBuilder::new(config.azure_openai_deployment.clone()),
//!         Arc::new(AzureOpenAiClient::from_config(&config)?),
//!         telegram.clone(),
//!     ));
//!
//!     Poller::new(telegram, handlers, me.username).run().await?;
//!     Ok(())
//! }
//! ```
// Module declarations
pub mod ai;
pub mod bot;
pub mod core;
pub mod errors;
pub mod store;
pub mod telegram;
pub mod worker;

pub use errors::BotError;

/// Configure structured JSON logging.
///
/// The level comes from `RUST_LOG` and defaults to `info`. Calling this more
/// than once is harmless; later calls leave the first subscriber in place.
///
/// # Example
///
/// ```
/// tgsum::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
