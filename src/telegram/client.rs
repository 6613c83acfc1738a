//! Telegram Bot API client module
//!
//! Encapsulates all Bot API calls with retry logic and error handling.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, warn};

use super::types::{ApiResponse, TelegramMessage, Update, User};
use crate::bot::Messenger;
use crate::core::models::{ConversationId, SentMessage};
use crate::errors::BotError;

pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Server-side wait for `getUpdates` long polling.
pub const LONG_POLL_TIMEOUT_SECS: u64 = 30;

// Must outlast a long poll so idle polls are not reported as timeouts.
const HTTP_TIMEOUT: Duration = Duration::from_secs(LONG_POLL_TIMEOUT_SECS + 15);

pub struct TelegramClient {
    http: Client,
    api_base: String,
    token: String,
}

impl TelegramClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(token: String) -> Result<Self, BotError> {
        Self::with_api_base(TELEGRAM_API_BASE, token)
    }

    /// Client against a custom Bot API server (self-hosted, or a test double).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_api_base(api_base: &str, token: String) -> Result<Self, BotError> {
        let http = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| BotError::HttpError(format!("Failed to build Telegram HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, payload: &Value) -> Result<T, BotError> {
        let resp = self
            .http
            .post(self.method_url(method))
            .json(payload)
            .send()
            .await
            // reqwest errors embed the URL, which embeds the token.
            .map_err(|e| BotError::HttpError(format!("{method} request failed: {}", e.without_url())))?;

        let status = resp.status();
        let body: ApiResponse<T> = resp.json().await.map_err(|e| {
            BotError::ParseError(format!("{method} response (HTTP {status}): {}", e.without_url()))
        })?;

        if !body.ok {
            return Err(BotError::ApiError(format!(
                "{} error {}: {}",
                method,
                body.error_code.unwrap_or_else(|| i64::from(status.as_u16())),
                body.description.as_deref().unwrap_or("unknown")
            )));
        }

        body.result
            .ok_or_else(|| BotError::ParseError(format!("{method} response missing result")))
    }

    /// Retries transport failures only. API errors such as a missing chat
    /// are returned immediately.
    async fn with_retry<F, Fut, T>(&self, operation: F) -> Result<T, BotError>
    where
        F: FnMut() -> Fut + Send,
        Fut: std::future::Future<Output = Result<T, BotError>> + Send,
        T: Send,
    {
        let strategy = ExponentialBackoff::from_millis(2)
            .factor(100)
            .map(jitter)
            .take(3);

        RetryIf::spawn(strategy, operation, |e: &BotError| {
            let retry = matches!(e, BotError::HttpError(_));
            if retry {
                warn!("Retrying Telegram call after transport error: {}", e);
            }
            retry
        })
        .await
    }

    /// # Errors
    ///
    /// Returns an error if the call fails or the response cannot be parsed.
    pub async fn get_me(&self) -> Result<User, BotError> {
        self.call("getMe", &json!({})).await
    }

    /// Long-polls for message updates starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or the response cannot be parsed.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, BotError> {
        let mut payload = json!({
            "timeout": timeout_secs,
            "allowed_updates": ["message"],
        });
        if let Some(offset) = offset {
            payload["offset"] = json!(offset);
        }
        self.call("getUpdates", &payload).await
    }

    /// # Errors
    ///
    /// Returns an error if the message cannot be sent.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<TelegramMessage, BotError> {
        let payload = json!({
            "chat_id": chat_id,
            "text": text,
        });
        self.with_retry(|| self.call("sendMessage", &payload)).await
    }

    /// # Errors
    ///
    /// Returns an error if the message cannot be deleted.
    pub async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<(), BotError> {
        let payload = json!({
            "chat_id": chat_id,
            "message_id": message_id,
        });
        let deleted: bool = self.with_retry(|| self.call("deleteMessage", &payload)).await?;
        if !deleted {
            debug!("deleteMessage returned false for {}/{}", chat_id, message_id);
        }
        Ok(())
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send_text(
        &self,
        conversation_id: ConversationId,
        text: &str,
    ) -> Result<SentMessage, BotError> {
        let sent = self.send_message(conversation_id.0, text).await?;
        Ok(SentMessage {
            conversation_id,
            message_id: sent.message_id,
        })
    }

    async fn delete_message(&self, message: SentMessage) -> Result<(), BotError> {
        TelegramClient::delete_message(self, message.conversation_id.0, message.message_id).await
    }
}
