//! Subset of the Telegram Bot API wire types the bot reads.

use serde::Deserialize;

/// Envelope around every Bot API response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<TelegramMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramMessage {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    /// Unix time in seconds.
    pub date: i64,
    pub text: Option<String>,
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub is_bot: bool,
    pub first_name: String,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: Option<String>,
    pub first_name: Option<String>,
}

impl Chat {
    /// Group title, or the user's first name for private chats.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.title
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.first_name.as_deref().filter(|s| !s.is_empty()))
            .unwrap_or("Chat")
    }
}
