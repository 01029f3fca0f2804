//! The Agent contract — the object-safe boundary of the whole system.

use crate::context::ExecutionContext;
use crate::duration::DurationMs;
use crate::error::AgentError;
use crate::result::AgentResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Identity shown to guardrails, hooks, and events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentInfo {
    /// Agent name.
    pub name: String,
    /// What this agent does.
    pub description: String,
}

impl AgentInfo {
    /// Create a new identity.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Immutable per-agent execution budget and sampling settings.
///
/// Created at agent-construction time and fixed for the agent's lifetime.
/// Invariants: `max_iterations >= 1`, `timeout > 0` — the chaining setters
/// clamp rather than panic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfiguration {
    /// Maximum ReAct loop iterations.
    pub max_iterations: u32,
    /// Wall-clock budget for one run, measured from loop entry.
    pub timeout: DurationMs,
    /// Sampling temperature for model calls.
    pub temperature: f64,
    /// Maximum output tokens per model call.
    pub max_tokens: Option<u32>,
    /// Whether the first tool failure aborts the run.
    pub stop_on_tool_error: bool,
    /// How many session items to load as history (None = everything).
    pub session_history_limit: Option<usize>,
}

impl Default for AgentConfiguration {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            timeout: DurationMs::from_secs(60),
            temperature: 1.0,
            max_tokens: None,
            stop_on_tool_error: false,
            session_history_limit: None,
        }
    }
}

impl AgentConfiguration {
    /// Set the iteration budget (clamped to at least 1).
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    /// Set the wall-clock budget (clamped to at least 1ms).
    pub fn with_timeout(mut self, timeout: DurationMs) -> Self {
        self.timeout = DurationMs::from_millis(timeout.as_millis().max(1));
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the per-call output-token cap.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Make the first tool failure fatal.
    pub fn with_stop_on_tool_error(mut self, stop: bool) -> Self {
        self.stop_on_tool_error = stop;
        self
    }

    /// Bound how much session history is loaded per run.
    pub fn with_session_history_limit(mut self, limit: usize) -> Self {
        self.session_history_limit = Some(limit);
        self
    }
}

/// Something that can be run: a leaf ReAct engine, a sequential pipeline,
/// a parallel group, a fallback pair — composition is recursive because
/// they all satisfy this one trait.
///
/// `cancel` is cooperative and idempotent: it raises a flag that the
/// running loop observes at its checkpoints. In-flight model or tool calls
/// are not forcibly killed; the next checkpoint unwinds with
/// [`AgentError::Cancelled`].
#[async_trait]
pub trait Agent: Send + Sync {
    /// This agent's identity.
    fn info(&self) -> AgentInfo;

    /// Drive one run to a validated result or a typed error. Never returns
    /// a partial result.
    async fn run(&self, input: &str, context: &ExecutionContext)
        -> Result<AgentResult, AgentError>;

    /// Request cooperative cancellation of any in-flight run.
    fn cancel(&self);
}
