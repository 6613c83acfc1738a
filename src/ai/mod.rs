//! All AI/LLM functionality

pub mod client;
pub mod prompt_builder;

use async_trait::async_trait;

// Re-export main types for convenience
pub use client::AzureOpenAiClient;
pub use prompt_builder::{EmptyContent, SummaryRequest, SummaryRequestBuilder};

/// Canonical failure text shown to users when summarization fails.
pub const CANONICAL_FAILURE_MESSAGE: &str = "Failed to summarize.";

/// Outcome of one summarization call. Failures are values, never panics or
/// `Err`s, so callers always get something they can show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryResult {
    Summary(String),
    Failed { reason: String },
}

impl SummaryResult {
    #[must_use]
    pub fn failed() -> Self {
        SummaryResult::Failed {
            reason: CANONICAL_FAILURE_MESSAGE.to_string(),
        }
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, SummaryResult::Failed { .. })
    }
}

/// The single point of coupling to the external text-generation service.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, request: &SummaryRequest) -> SummaryResult;
}
