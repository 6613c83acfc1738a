use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Key identifying a single chat. Every chat has its own independent history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub i64);

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ConversationId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// A stored chat message. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    sender: String,
    text: String,
    timestamp: DateTime<Utc>,
}

impl Message {
    #[must_use]
    pub fn new(sender: impl Into<String>, text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            sender: sender.into(),
            text: text.into(),
            timestamp,
        }
    }

    #[must_use]
    pub fn sender(&self) -> &str {
        &self.sender
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// True when the message carries any text at all (whitespace counts).
    #[must_use]
    pub fn has_text(&self) -> bool {
        !self.text.is_empty()
    }
}

/// A non-command message observed in a chat.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub conversation_id: ConversationId,
    pub sender_display_name: Option<String>,
    pub text: Option<String>,
    pub caption: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub is_automated_sender: bool,
}

impl InboundMessage {
    /// Text if present, otherwise the media caption, otherwise empty.
    #[must_use]
    pub fn content(&self) -> &str {
        non_empty(self.text.as_deref())
            .or_else(|| non_empty(self.caption.as_deref()))
            .unwrap_or("")
    }

    #[must_use]
    pub fn sender_name(&self) -> &str {
        non_empty(self.sender_display_name.as_deref()).unwrap_or("User")
    }
}

/// Commands the bot answers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Summarize,
    Clear,
    Stats,
}

impl Command {
    /// Maps a command name (without the leading slash) to a known command.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "start" | "help" => Some(Command::Start),
            "summarize" => Some(Command::Summarize),
            "clear" => Some(Command::Clear),
            "stats" => Some(Command::Stats),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommandInvocation {
    pub conversation_id: ConversationId,
    pub conversation_display_name: String,
    pub command: Command,
    pub arguments: Vec<String>,
}

/// Handle to a message the bot has sent, kept so it can be deleted later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentMessage {
    pub conversation_id: ConversationId,
    pub message_id: i64,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}
