use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use super::Messenger;
use super::response_builder::{
    MAX_REPLY_CHARS, chunk_text, format_summary_reply, help_text, parse_count, processing_notice,
};
use super::stats::ChatStats;
use crate::ai::{Summarizer, SummaryRequestBuilder, SummaryResult};
use crate::core::models::{Command, CommandInvocation, ConversationId, InboundMessage, Message};
use crate::errors::BotError;
use crate::store::MessageStore;

/// Below this many stored messages a summary is not worth an external call.
pub const MIN_MESSAGES_FOR_SUMMARY: usize = 5;

pub const INVALID_NUMBER_MESSAGE: &str = "Invalid number.";
pub const NOT_ENOUGH_MESSAGES: &str = "Not enough messages.";
pub const HISTORY_CLEARED_MESSAGE: &str = "Chat history cleared.";

/// Command and message handling for all conversations.
///
/// Holds the shared store plus the two outside collaborators: the summarizer
/// and the messenger used for replies. Cheap to share behind an `Arc`.
pub struct CommandHandlers {
    store: Arc<MessageStore>,
    builder: SummaryRequestBuilder,
    summarizer: Arc<dyn Summarizer>,
    messenger: Arc<dyn Messenger>,
}

impl CommandHandlers {
    #[must_use]
    pub fn new(
        store: Arc<MessageStore>,
        builder: SummaryRequestBuilder,
        summarizer: Arc<dyn Summarizer>,
        messenger: Arc<dyn Messenger>,
    ) -> Self {
        Self {
            store,
            builder,
            summarizer,
            messenger,
        }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<MessageStore> {
        &self.store
    }

    /// Routes a command to its handler.
    ///
    /// # Errors
    ///
    /// Returns an error only when a reply cannot be delivered.
    pub async fn handle_command(&self, invocation: &CommandInvocation) -> Result<(), BotError> {
        let id = invocation.conversation_id;
        match invocation.command {
            Command::Start => self.start(id).await,
            Command::Summarize => {
                self.summarize(
                    id,
                    &invocation.conversation_display_name,
                    &invocation.arguments,
                )
                .await
            }
            Command::Clear => self.clear(id).await,
            Command::Stats => self.stats(id).await,
        }
    }

    /// # Errors
    ///
    /// Returns an error if the reply cannot be sent.
    pub async fn start(&self, conversation_id: ConversationId) -> Result<(), BotError> {
        self.messenger
            .send_text(conversation_id, help_text())
            .await
            .map(|_| ())
    }

    /// Summarizes the most recent messages of a conversation.
    ///
    /// `arguments` may carry a count as its first token. The store lock is
    /// released before the summarizer is called.
    ///
    /// # Errors
    ///
    /// Returns an error only when a reply cannot be sent. Summarizer failures
    /// are reported to the chat, not returned.
    pub async fn summarize(
        &self,
        conversation_id: ConversationId,
        chat_name: &str,
        arguments: &[String],
    ) -> Result<(), BotError> {
        let correlation_id = Uuid::new_v4().to_string();

        let count = match parse_count(arguments.first().map(String::as_str)) {
            Ok(count) => count,
            Err(e) => {
                info!(
                    "Rejected summarize count {:?} (chat={}, corr_id={})",
                    e.0, conversation_id, correlation_id
                );
                self.messenger
                    .send_text(conversation_id, INVALID_NUMBER_MESSAGE)
                    .await?;
                return Ok(());
            }
        };

        let messages = self.store.recent(conversation_id, count);
        if messages.len() < MIN_MESSAGES_FOR_SUMMARY {
            info!(
                "Only {} message(s) stored, skipping summary (chat={}, corr_id={})",
                messages.len(),
                conversation_id,
                correlation_id
            );
            self.messenger
                .send_text(conversation_id, NOT_ENOUGH_MESSAGES)
                .await?;
            return Ok(());
        }

        info!(
            "Summarizing {} message(s) (chat={}, requested={}, corr_id={})",
            messages.len(),
            conversation_id,
            count,
            correlation_id
        );

        let processing = self
            .messenger
            .send_text(conversation_id, &processing_notice(messages.len()))
            .await?;

        let body = match self.builder.build(&messages, chat_name) {
            Ok(request) => match self.summarizer.summarize(&request).await {
                SummaryResult::Summary(summary) => summary,
                SummaryResult::Failed { reason } => {
                    error!(
                        "Summary failed (chat={}, corr_id={})",
                        conversation_id, correlation_id
                    );
                    reason
                }
            },
            Err(empty) => {
                info!(
                    "Nothing to summarize: {:?} (chat={}, corr_id={})",
                    empty, conversation_id, correlation_id
                );
                empty.user_message().to_string()
            }
        };
        let reply = format_summary_reply(messages.len(), &body);

        if let Err(e) = self.messenger.delete_message(processing).await {
            warn!(
                "Failed to delete processing notice (chat={}, corr_id={}): {}",
                conversation_id, correlation_id, e
            );
        }

        for chunk in chunk_text(&reply, MAX_REPLY_CHARS) {
            self.messenger.send_text(conversation_id, &chunk).await?;
        }

        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the confirmation cannot be sent.
    pub async fn clear(&self, conversation_id: ConversationId) -> Result<(), BotError> {
        self.store.clear(conversation_id);
        info!("Cleared history (chat={})", conversation_id);
        self.messenger
            .send_text(conversation_id, HISTORY_CLEARED_MESSAGE)
            .await
            .map(|_| ())
    }

    /// # Errors
    ///
    /// Returns an error if the reply cannot be sent.
    pub async fn stats(&self, conversation_id: ConversationId) -> Result<(), BotError> {
        let stats = ChatStats::from_messages(&self.store.all(conversation_id));
        self.messenger
            .send_text(conversation_id, &stats.to_string())
            .await
            .map(|_| ())
    }

    /// Records an inbound non-command message. Messages from bots are ignored.
    /// Returns whether the message was stored.
    pub fn ingest(&self, event: &InboundMessage) -> bool {
        if event.is_automated_sender {
            return false;
        }

        let message = Message::new(event.sender_name(), event.content(), event.timestamp);
        self.store.append(event.conversation_id, message);
        true
    }
}
