//! Error types for each contract.
//!
//! [`AgentError`] is the closed taxonomy every run failure maps into. It is
//! deliberately NOT `#[non_exhaustive]`: callers are expected to match
//! exhaustively, and the two failure universes — policy rejection (the
//! tripwire family) and execution failure (everything else) — must never
//! be conflated.

use crate::duration::DurationMs;
use crate::value::SendableValue;
use thiserror::Error;

/// Diagnostic payload carried by every tripwire error: which guardrail
/// tripped, its message, and whatever structured info it attached.
#[derive(Debug, Clone, PartialEq)]
pub struct TripwireInfo {
    /// Name of the guardrail that triggered.
    pub guardrail: String,
    /// Human-readable reason, if the guardrail gave one.
    pub message: Option<String>,
    /// Structured diagnostic payload, if the guardrail attached one.
    pub info: Option<SendableValue>,
}

impl TripwireInfo {
    /// Create a new tripwire payload.
    pub fn new(
        guardrail: impl Into<String>,
        message: Option<String>,
        info: Option<SendableValue>,
    ) -> Self {
        Self {
            guardrail: guardrail.into(),
            message,
            info,
        }
    }
}

impl std::fmt::Display for TripwireInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.message {
            Some(msg) => write!(f, "{}: {}", self.guardrail, msg),
            None => write!(f, "{}", self.guardrail),
        }
    }
}

/// The closed failure taxonomy for agent runs.
///
/// Provider-specific and tool-specific errors are mapped into this at the
/// boundary; the core never inspects vendor error shapes. A caller gets
/// either a complete validated [`AgentResult`](crate::AgentResult) or
/// exactly one of these — never a partial result.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The run input was empty or otherwise unusable.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The run observed its cancellation flag and unwound.
    #[error("run cancelled")]
    Cancelled,

    /// The loop exhausted its iteration budget without a final answer.
    #[error("no final answer after {0} iterations")]
    MaxIterationsExceeded(u32),

    /// The run exceeded its wall-clock budget.
    #[error("run timed out after {0}")]
    Timeout(DurationMs),

    /// No tool with the requested name is registered.
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    /// A tool's execution failed and the run's policy made it fatal.
    #[error("tool {tool} failed: {underlying}")]
    ToolExecutionFailed {
        /// Name of the tool that failed.
        tool: String,
        /// Description of the underlying failure.
        underlying: String,
    },

    /// The arguments supplied for a tool call did not satisfy its
    /// parameter declarations.
    #[error("invalid arguments for tool {tool}: {reason}")]
    InvalidToolArguments {
        /// Name of the tool.
        tool: String,
        /// Why the arguments were rejected.
        reason: String,
    },

    /// No inference provider is configured, or the configured one refused
    /// to serve the request at all.
    #[error("inference provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The assembled context does not fit the model's window.
    #[error("context window exceeded: {count} tokens over limit {limit}")]
    ContextWindowExceeded {
        /// Token count of the assembled context.
        count: u64,
        /// The model's window limit.
        limit: u64,
    },

    /// A guardrail rejected the run for a reason that does not fit the
    /// four tripwire variants.
    #[error("guardrail violation: {0}")]
    GuardrailViolation(String),

    /// The requested language is not supported.
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// The model call itself failed.
    #[error("generation failed: {0}")]
    GenerationFailed(String),

    /// The provider rate-limited the run.
    #[error("rate limit exceeded")]
    RateLimitExceeded {
        /// How long the provider asked us to wait, if it said.
        retry_after: Option<DurationMs>,
    },

    /// A bug or broken collaborator contract.
    #[error("internal error: {0}")]
    Internal(String),

    /// An input guardrail tripped before the run started.
    #[error("input guardrail tripped: {0}")]
    InputTripwire(TripwireInfo),

    /// An output guardrail rejected the candidate final answer.
    #[error("output guardrail tripped: {0}")]
    OutputTripwire(TripwireInfo),

    /// A tool-input guardrail blocked a tool call before execution.
    #[error("tool input guardrail tripped: {0}")]
    ToolInputTripwire(TripwireInfo),

    /// A tool-output guardrail rejected a successful tool call's result.
    #[error("tool output guardrail tripped: {0}")]
    ToolOutputTripwire(TripwireInfo),
}

impl AgentError {
    /// True if this failure came from the guardrail (policy) universe.
    pub fn is_tripwire(&self) -> bool {
        matches!(
            self,
            AgentError::InputTripwire(_)
                | AgentError::OutputTripwire(_)
                | AgentError::ToolInputTripwire(_)
                | AgentError::ToolOutputTripwire(_)
        )
    }

    /// True if retrying the whole run might succeed. Retry policy lives in
    /// provider adapters, never in the core loop.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AgentError::RateLimitExceeded { .. } | AgentError::Timeout(_)
        )
    }
}

/// Errors a tool implementation may raise. The registry maps these into
/// typed [`ToolResult::Failure`](crate::ToolResult) entries — a tool error
/// is data for the loop, not a panic.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ToolError {
    /// The tool rejected its arguments.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// The tool started but failed.
    #[error("{0}")]
    Execution(String),

    /// Catch-all. Include context.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Errors from Memory and Session collaborators.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum MemoryError {
    /// The backing store failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}
