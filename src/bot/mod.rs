//! Chat command orchestration

pub mod handlers;
pub mod response_builder;
pub mod stats;

use async_trait::async_trait;

use crate::core::models::{ConversationId, SentMessage};
use crate::errors::BotError;

// Re-export main types for convenience
pub use handlers::CommandHandlers;
pub use response_builder::{chunk_text, parse_count};
pub use stats::ChatStats;

/// Outbound side of the chat transport.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Sends `text` to a conversation and returns a handle to the sent message.
    async fn send_text(
        &self,
        conversation_id: ConversationId,
        text: &str,
    ) -> Result<SentMessage, BotError>;

    async fn delete_message(&self, message: SentMessage) -> Result<(), BotError>;
}
