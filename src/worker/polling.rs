use std::sync::Arc;
use std::time::Duration;

use tokio_retry::strategy::ExponentialBackoff;
use tracing::{error, info, warn};

use super::handler::handle_update;
use crate::bot::CommandHandlers;
use crate::errors::BotError;
use crate::telegram::{LONG_POLL_TIMEOUT_SECS, TelegramClient, Update};

const MAX_POLL_BACKOFF: Duration = Duration::from_secs(30);

/// Long-polling loop that feeds updates to the command handlers.
pub struct Poller {
    client: Arc<TelegramClient>,
    handlers: Arc<CommandHandlers>,
    bot_username: Option<String>,
}

impl Poller {
    #[must_use]
    pub fn new(
        client: Arc<TelegramClient>,
        handlers: Arc<CommandHandlers>,
        bot_username: Option<String>,
    ) -> Self {
        Self {
            client,
            handlers,
            bot_username,
        }
    }

    /// Polls until Ctrl-C. Each update runs in its own task, so a slow
    /// summary in one chat does not hold up others.
    ///
    /// # Errors
    ///
    /// Returns an error if the shutdown signal cannot be installed.
    pub async fn run(self) -> Result<(), BotError> {
        info!(
            "Polling for updates as @{}",
            self.bot_username.as_deref().unwrap_or("unknown")
        );

        let mut offset: Option<i64> = None;
        let mut backoff = poll_backoff();

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            let updates = tokio::select! {
                signal = &mut shutdown => {
                    signal.map_err(|e| {
                        BotError::GeneralError(format!("Failed to listen for shutdown signal: {e}"))
                    })?;
                    info!("Shutdown signal received, stopping poller");
                    return Ok(());
                }
                result = self.client.get_updates(offset, LONG_POLL_TIMEOUT_SECS) => result,
            };

            match updates {
                Ok(updates) => {
                    backoff = poll_backoff();
                    if let Some(next) = next_offset(&updates) {
                        offset = Some(next);
                    }
                    for update in updates {
                        self.spawn_update(update);
                    }
                }
                Err(e) => {
                    let delay = backoff.next().unwrap_or(MAX_POLL_BACKOFF);
                    warn!("getUpdates failed, retrying in {:?}: {}", delay, e);
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    fn spawn_update(&self, update: Update) {
        let handlers = Arc::clone(&self.handlers);
        let bot_username = self.bot_username.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_update(&handlers, &update, bot_username.as_deref()).await {
                error!("Failed to handle update {}: {}", update.update_id, e);
            }
        });
    }
}

/// 500ms, 1s, 2s, ... capped at [`MAX_POLL_BACKOFF`].
fn poll_backoff() -> ExponentialBackoff {
    ExponentialBackoff::from_millis(2)
        .factor(250)
        .max_delay(MAX_POLL_BACKOFF)
}

/// Offset that acknowledges every update in the batch.
#[must_use]
pub fn next_offset(updates: &[Update]) -> Option<i64> {
    updates.iter().map(|u| u.update_id + 1).max()
}
