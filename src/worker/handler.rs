use tracing::{debug, info};

use crate::bot::CommandHandlers;
use crate::errors::BotError;
use crate::telegram::{ChatEvent, Update, classify_update};

/// Handles one update: runs a command, or stores a message.
///
/// # Errors
///
/// Returns an error only when a reply could not be delivered. Everything
/// else is recovered inside the command handlers.
pub async fn handle_update(
    handlers: &CommandHandlers,
    update: &Update,
    bot_username: Option<&str>,
) -> Result<(), BotError> {
    match classify_update(update, bot_username) {
        Some(ChatEvent::Command(invocation)) => {
            info!(
                "Handling {:?} command in chat {} (update_id={})",
                invocation.command, invocation.conversation_id, update.update_id
            );
            handlers.handle_command(&invocation).await
        }
        Some(ChatEvent::Message(event)) => {
            if !handlers.ingest(&event) {
                debug!(
                    "Ignored message from automated sender (update_id={})",
                    update.update_id
                );
            }
            Ok(())
        }
        None => {
            debug!("Ignored update {}", update.update_id);
            Ok(())
        }
    }
}
