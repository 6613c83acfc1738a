//! Bounded in-memory message history per conversation.
//!
//! Each conversation keeps at most [`MAX_MESSAGES_PER_CHAT`] messages. When an
//! append would exceed that, the oldest messages are dropped first. Nothing
//! expires by time and nothing survives a restart.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::core::models::{ConversationId, Message};

pub const MAX_MESSAGES_PER_CHAT: usize = 200;

/// Shared store of recent messages, keyed by conversation.
///
/// All operations take a single short-lived lock and never await while holding
/// it, so the store can be shared between concurrently running handlers
/// behind an `Arc`.
#[derive(Debug)]
pub struct MessageStore {
    chats: Mutex<HashMap<ConversationId, VecDeque<Message>>>,
    capacity: usize,
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(MAX_MESSAGES_PER_CHAT)
    }

    /// Store with a custom per-conversation cap. A cap of zero is raised to one.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            chats: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // A panic in another handler must not take the whole history down with it.
    fn chats(&self) -> MutexGuard<'_, HashMap<ConversationId, VecDeque<Message>>> {
        self.chats.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends a message, creating the conversation log on first use and
    /// evicting the oldest entries beyond capacity.
    pub fn append(&self, conversation_id: ConversationId, message: Message) {
        let mut chats = self.chats();
        let log = chats.entry(conversation_id).or_default();
        log.push_back(message);

        let mut evicted = 0usize;
        while log.len() > self.capacity {
            log.pop_front();
            evicted += 1;
        }
        if evicted > 0 {
            debug!(
                "Evicted {} message(s) from conversation {}",
                evicted, conversation_id
            );
        }
    }

    /// Returns up to `count` of the most recent messages, oldest first.
    #[must_use]
    pub fn recent(&self, conversation_id: ConversationId, count: usize) -> Vec<Message> {
        let chats = self.chats();
        chats
            .get(&conversation_id)
            .map(|log| {
                let skip = log.len().saturating_sub(count);
                log.iter().skip(skip).cloned().collect()
            })
            .unwrap_or_default()
    }

    /// Drops the whole log for a conversation. No-op when there is none.
    pub fn clear(&self, conversation_id: ConversationId) {
        if self.chats().remove(&conversation_id).is_some() {
            debug!("Cleared history for conversation {}", conversation_id);
        }
    }

    /// Returns the full current log for a conversation, oldest first.
    #[must_use]
    pub fn all(&self, conversation_id: ConversationId) -> Vec<Message> {
        self.chats()
            .get(&conversation_id)
            .map(|log| log.iter().cloned().collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn len(&self, conversation_id: ConversationId) -> usize {
        self.chats().get(&conversation_id).map_or(0, VecDeque::len)
    }

    #[must_use]
    pub fn is_empty(&self, conversation_id: ConversationId) -> bool {
        self.len(conversation_id) == 0
    }
}
