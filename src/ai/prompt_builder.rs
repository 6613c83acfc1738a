//! Turns a window of stored messages into a summarization request.
//!
//! Building is pure: no I/O, and the same inputs always produce the same
//! request.

use openai_api_rs::v1::chat_completion::{ChatCompletionMessage, Content, MessageRole};

use crate::core::config::DEFAULT_DEPLOYMENT;
use crate::core::models::Message;

/// Fixed instructions sent as the system message on every request.
pub const SYSTEM_PROMPT: &str = "You are a professional Telegram chat summarizer.\n\
Summarize strictly in Persian.\n\
Tone: informal and friendly.\n\
No emojis. No formatting.\n\
Mention different opinions if any.\n\
Mention decisions if any.\n";

/// Closing cue appended after the chat transcript.
pub const SUMMARY_CUE: &str = "Persian summary:";

/// Character budget for the joined chat transcript. This is a hard cut, not
/// token-accurate and not word-aware.
pub const MAX_CHAT_TEXT_CHARS: usize = 6000;

pub const SUMMARY_TEMPERATURE: f64 = 0.4;

pub const MAX_OUTPUT_TOKENS: u32 = 1500;

/// Everything needed for one call to the summarization service.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub model: String,
    pub temperature: f64,
    pub max_output_tokens: u32,
}

impl SummaryRequest {
    /// The request as a two-message chat: system first, then user.
    #[must_use]
    pub fn to_chat_messages(&self) -> Vec<ChatCompletionMessage> {
        vec![
            ChatCompletionMessage {
                role: MessageRole::system,
                content: Content::Text(self.system_prompt.clone()),
                name: None,
                tool_calls: None,
                tool_call_id: None,
            },
            ChatCompletionMessage {
                role: MessageRole::user,
                content: Content::Text(self.user_prompt.clone()),
                name: None,
                tool_calls: None,
                tool_call_id: None,
            },
        ]
    }
}

/// Why no request was built. Neither case warrants an external call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyContent {
    NoMessages,
    NoTextMessages,
}

impl EmptyContent {
    /// Short canned reply for the chat.
    #[must_use]
    pub fn user_message(self) -> &'static str {
        match self {
            EmptyContent::NoMessages => "No messages found.",
            EmptyContent::NoTextMessages => "No text messages.",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SummaryRequestBuilder {
    model: String,
}

impl Default for SummaryRequestBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_DEPLOYMENT)
    }
}

impl SummaryRequestBuilder {
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
        }
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Builds the request for `messages` (oldest first) from the chat named
    /// `chat_name`.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyContent`] when `messages` is empty or none of them has
    /// text.
    pub fn build(
        &self,
        messages: &[Message],
        chat_name: &str,
    ) -> Result<SummaryRequest, EmptyContent> {
        if messages.is_empty() {
            return Err(EmptyContent::NoMessages);
        }

        let lines: Vec<String> = messages
            .iter()
            .filter(|m| m.has_text())
            .map(|m| format!("{}: {}", m.sender(), m.text()))
            .collect();
        if lines.is_empty() {
            return Err(EmptyContent::NoTextMessages);
        }

        let chat_text = truncate_chars(&lines.join("\n"), MAX_CHAT_TEXT_CHARS);

        // The count covers the whole window, including messages without text.
        let user_prompt = format!(
            "Chat name: {}\nMessages: {}\n\n{}\n\n{}",
            chat_name,
            messages.len(),
            chat_text,
            SUMMARY_CUE
        );

        Ok(SummaryRequest {
            system_prompt: SYSTEM_PROMPT.to_string(),
            user_prompt,
            model: self.model.clone(),
            temperature: SUMMARY_TEMPERATURE,
            max_output_tokens: MAX_OUTPUT_TOKENS,
        })
    }
}

/// Keeps the first `max_chars` characters of `text`.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
