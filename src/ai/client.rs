//! Azure `OpenAI` chat completions client
//!
//! Sends one request per summary. There is no retry: any failure is logged
//! and reported as [`SummaryResult::Failed`].

use std::time::Duration;

use async_trait::async_trait;
use openai_api_rs::v1::chat_completion::{ChatCompletionMessage, Content, MessageRole};
use reqwest::Client;
use serde_json::{Value, json};
use tracing::{error, info};
use url::Url;

use super::prompt_builder::SummaryRequest;
use super::{Summarizer, SummaryResult};
use crate::core::config::AppConfig;
use crate::errors::BotError;

#[must_use]
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4 + 1
}

/// Client for a single Azure `OpenAI` resource.
pub struct AzureOpenAiClient {
    http: Client,
    api_key: String,
    endpoint: Url,
    api_version: String,
}

impl AzureOpenAiClient {
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(
        api_key: String,
        endpoint: Url,
        api_version: String,
        timeout: Duration,
    ) -> Result<Self, BotError> {
        let http = Client::builder().timeout(timeout).build().map_err(|e| {
            BotError::HttpError(format!("Failed to build Azure OpenAI HTTP client: {e}"))
        })?;

        Ok(Self {
            http,
            api_key,
            endpoint,
            api_version,
        })
    }

    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, BotError> {
        Self::new(
            config.azure_openai_api_key.clone(),
            config.azure_openai_endpoint.clone(),
            config.azure_openai_api_version.clone(),
            config.summary_timeout,
        )
    }

    /// URL of the chat completions operation for `deployment`.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint cannot be used as a base URL.
    pub fn completions_url(&self, deployment: &str) -> Result<Url, BotError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| {
                BotError::ConfigError(format!(
                    "Azure OpenAI endpoint cannot be a base URL: {}",
                    self.endpoint
                ))
            })?
            .pop_if_empty()
            .extend(["openai", "deployments", deployment, "chat", "completions"]);
        url.query_pairs_mut()
            .append_pair("api-version", &self.api_version);
        Ok(url)
    }

    /// Performs the HTTP call and extracts the trimmed completion text.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, timeout, non-success status, an
    /// unparseable body, or a response without completion text.
    pub async fn complete(&self, request: &SummaryRequest) -> Result<String, BotError> {
        let prompt = request.to_chat_messages();

        #[cfg(feature = "debug-logs")]
        info!("Using summarization prompt:\n{:?}", prompt);

        #[cfg(not(feature = "debug-logs"))]
        info!(
            "Generating summary with {} messages in prompt (model={})",
            prompt.len(),
            request.model
        );

        let estimated_input_tokens = prompt
            .iter()
            .map(|msg| match &msg.content {
                Content::Text(t) => estimate_tokens(t),
                Content::ImageUrl(_) => 0,
            })
            .sum::<usize>();
        info!("Estimated input tokens: {}", estimated_input_tokens);

        let request_body = json!({
            "messages": build_chat_input_from_prompt(&prompt),
            "temperature": request.temperature,
            "max_tokens": request.max_output_tokens,
        });

        let url = self.completions_url(&request.model)?;
        let response = self
            .http
            .post(url)
            .header("api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| BotError::HttpError(format!("Azure OpenAI request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|e| {
                format!("Failed to read error response body (status {status}): {e}")
            });
            return Err(BotError::OpenAIError(format!(
                "Azure OpenAI API error (status {status}): {error_text}"
            )));
        }

        let response_json: Value = response.json().await.map_err(|e| {
            BotError::OpenAIError(format!("Failed to parse Azure OpenAI response: {e}"))
        })?;

        extract_completion_text(&response_json)
            .ok_or_else(|| BotError::OpenAIError("No text in response".to_string()))
    }
}

#[async_trait]
impl Summarizer for AzureOpenAiClient {
    async fn summarize(&self, request: &SummaryRequest) -> SummaryResult {
        match self.complete(request).await {
            Ok(text) => SummaryResult::Summary(text),
            Err(e) => {
                error!("Summarization error: {}", e);
                SummaryResult::failed()
            }
        }
    }
}

/// Converts chat messages into the `messages` array of a chat completions body.
pub(crate) fn build_chat_input_from_prompt(prompt: &[ChatCompletionMessage]) -> Vec<Value> {
    prompt
        .iter()
        .filter_map(|m| {
            let role_str = match m.role {
                MessageRole::system => "system",
                MessageRole::user | MessageRole::function | MessageRole::tool => "user",
                MessageRole::assistant => "assistant",
            };

            match &m.content {
                Content::Text(t) => Some(json!({
                    "role": role_str,
                    "content": t
                })),
                Content::ImageUrl(_) => None,
            }
        })
        .collect()
}

/// Text of the first choice, trimmed. `None` when absent or blank.
pub(crate) fn extract_completion_text(response_json: &Value) -> Option<String> {
    response_json
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(endpoint: &str) -> AzureOpenAiClient {
        AzureOpenAiClient::new(
            "key".to_string(),
            Url::parse(endpoint).unwrap(),
            "2024-06-01".to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_completions_url_with_trailing_slash() {
        let url = client("https://res.openai.azure.com/")
            .completions_url("gpt-4.1")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://res.openai.azure.com/openai/deployments/gpt-4.1/chat/completions?api-version=2024-06-01"
        );
    }

    #[test]
    fn test_completions_url_without_trailing_slash() {
        let url = client("https://res.openai.azure.com")
            .completions_url("my-deploy")
            .unwrap();
        assert_eq!(url.path(), "/openai/deployments/my-deploy/chat/completions");
        assert_eq!(url.query(), Some("api-version=2024-06-01"));
    }

    #[test]
    fn test_build_chat_input_keeps_order_and_roles() {
        let prompt = vec![
            ChatCompletionMessage {
                role: MessageRole::system,
                content: Content::Text("policy".to_string()),
                name: None,
                tool_calls: None,
                tool_call_id: None,
            },
            ChatCompletionMessage {
                role: MessageRole::user,
                content: Content::Text("chat".to_string()),
                name: None,
                tool_calls: None,
                tool_call_id: None,
            },
        ];

        let input = build_chat_input_from_prompt(&prompt);
        assert_eq!(
            input,
            vec![
                json!({"role": "system", "content": "policy"}),
                json!({"role": "user", "content": "chat"}),
            ]
        );
    }

    #[test]
    fn test_extract_completion_text_trims() {
        let body = json!({"choices": [{"message": {"role": "assistant", "content": "  salam \n"}}]});
        assert_eq!(extract_completion_text(&body), Some("salam".to_string()));
    }

    #[test]
    fn test_extract_completion_text_missing_or_blank() {
        assert_eq!(extract_completion_text(&json!({"choices": []})), None);
        assert_eq!(extract_completion_text(&json!({})), None);
        let blank = json!({"choices": [{"message": {"content": "   "}}]});
        assert_eq!(extract_completion_text(&blank), None);
        let null_content = json!({"choices": [{"message": {"content": null}}]});
        assert_eq!(extract_completion_text(&null_content), None);
    }

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(""), 1);
        assert_eq!(estimate_tokens("hello"), 2);
    }
}
