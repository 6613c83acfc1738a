use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use tgsum::ai::{AzureOpenAiClient, SummaryRequestBuilder};
use tgsum::bot::CommandHandlers;
use tgsum::core::config::AppConfig;
use tgsum::store::MessageStore;
use tgsum::telegram::TelegramClient;
use tgsum::worker::Poller;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    tgsum::setup_logging();

    let config = AppConfig::from_env().map_err(|e| {
        error!("Config error: {}", e);
        anyhow!(e)
    })?;

    let telegram = Arc::new(
        TelegramClient::new(config.telegram_bot_token.clone())
            .context("Failed to create Telegram client")?,
    );
    let me = telegram
        .get_me()
        .await
        .context("Failed to fetch bot identity from Telegram")?;
    info!("Authenticated as {} (id={})", me.first_name, me.id);

    let summarizer = AzureOpenAiClient::from_config(&config)
        .context("Failed to create Azure OpenAI client")?;

    let handlers = Arc::new(CommandHandlers::new(
        Arc::new(MessageStore::new()),
        SummaryRequestBuilder::new(config.azure_openai_deployment.clone()),
        Arc::new(summarizer),
        telegram.clone(),
    ));

    Poller::new(telegram, handlers, me.username)
        .run()
        .await
        .context("Poller stopped with an error")?;

    Ok(())
}
