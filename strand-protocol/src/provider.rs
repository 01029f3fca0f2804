//! The Inference Provider contract — the language-model backend.
//!
//! [`InferenceProvider`] uses RPITIT (return-position `impl Trait` in
//! traits) and is intentionally NOT object-safe. Engines are generic over
//! `P: InferenceProvider`; the object-safe boundary is
//! [`Agent`](crate::Agent).

use crate::duration::DurationMs;
use crate::result::TokenUsage;
use crate::tool::{ToolCall, ToolDefinition};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;

/// Sampling and budget options for one inference call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceOptions {
    /// Sampling temperature.
    pub temperature: f64,
    /// Maximum output tokens (None = provider default).
    pub max_tokens: Option<u32>,
    /// Nucleus sampling threshold.
    pub top_p: Option<f64>,
    /// Top-k sampling cutoff.
    pub top_k: Option<u32>,
    /// Sequences that end generation.
    pub stop_sequences: Vec<String>,
    /// Presence penalty.
    pub presence_penalty: Option<f64>,
    /// Frequency penalty.
    pub frequency_penalty: Option<f64>,
}

impl Default for InferenceOptions {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            max_tokens: None,
            top_p: None,
            top_k: None,
            stop_sequences: Vec::new(),
            presence_penalty: None,
            frequency_penalty: None,
        }
    }
}

/// Why the provider stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural completion.
    Completed,
    /// Hit the output-token limit.
    MaxTokens,
    /// The model wants a tool call executed.
    ToolCall,
    /// Content was filtered by the provider.
    ContentFilter,
    /// The provider-side request was cancelled.
    Cancelled,
}

/// Response from a tool-aware inference call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceResponse {
    /// The generated text.
    pub content: String,
    /// Tool calls the model requested natively (empty for text-only
    /// backends; engines fall back to textual Action parsing).
    pub tool_calls: Vec<ToolCall>,
    /// Why generation stopped.
    pub finish_reason: FinishReason,
    /// Token usage for this call, if the backend reports it.
    pub usage: Option<TokenUsage>,
    /// Cost of this call in USD, if the backend reports it.
    pub cost: Option<Decimal>,
}

impl InferenceResponse {
    /// A plain completed-text response.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
            finish_reason: FinishReason::Completed,
            usage: None,
            cost: None,
        }
    }
}

/// Errors from inference backends. Adapters map these into the closed
/// [`AgentError`](crate::AgentError) taxonomy at the engine boundary.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP or transport failure.
    #[error("request failed: {0}")]
    RequestFailed(String),

    /// The provider rate-limited the request.
    #[error("rate limited")]
    RateLimited {
        /// Provider-suggested wait, if any.
        retry_after: Option<DurationMs>,
    },

    /// Authentication or authorization failed.
    #[error("auth failed: {0}")]
    AuthFailed(String),

    /// The provider's response could not be parsed.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The backend is not reachable or not configured.
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// Catch-all for other errors.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl ProviderError {
    /// Whether retrying this request (in the adapter, with backoff) might
    /// succeed. The core loop never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderError::RateLimited { .. } | ProviderError::RequestFailed(_)
        )
    }
}

/// A language-model backend.
///
/// Text-only backends implement [`generate`](Self::generate) and inherit
/// [`generate_with_tools`](Self::generate_with_tools) for free; backends
/// with native function calling override it to surface tool calls.
pub trait InferenceProvider: Send + Sync {
    /// Generate text for a prompt.
    fn generate(
        &self,
        prompt: String,
        options: InferenceOptions,
    ) -> impl Future<Output = Result<String, ProviderError>> + Send;

    /// Generate with a tool catalog available to the model.
    ///
    /// The default implementation ignores the catalog and wraps
    /// [`generate`](Self::generate) — textual Action parsing in the engine
    /// still gives such backends full tool use.
    fn generate_with_tools(
        &self,
        prompt: String,
        tools: Vec<ToolDefinition>,
        options: InferenceOptions,
    ) -> impl Future<Output = Result<InferenceResponse, ProviderError>> + Send {
        let _ = tools;
        let fut = self.generate(prompt, options);
        async move { Ok(InferenceResponse::text(fut.await?)) }
    }
}
