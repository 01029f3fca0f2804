//! The Guardrail contracts — policy validation around runs and tool calls.
//!
//! Four roles, each a single-method contract. A tripwire is a hard stop
//! signal, not a recoverable warning: the runner converts it into the
//! matching `AgentError::*Tripwire` variant and the run (or tool call)
//! fails. Guardrail failures are never retried.

use crate::agent::AgentInfo;
use crate::context::ExecutionContext;
use crate::tool::ToolDefinition;
use crate::value::SendableValue;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outcome of one guardrail check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardrailResult {
    /// True if the guardrail demands a hard stop.
    pub tripwire_triggered: bool,
    /// Structured diagnostic payload, if any.
    pub output_info: Option<SendableValue>,
    /// Human-readable reason, if any.
    pub message: Option<String>,
    /// Free-form metadata for observability sinks.
    pub metadata: BTreeMap<String, SendableValue>,
}

impl GuardrailResult {
    /// A passing result.
    pub fn passed() -> Self {
        Self {
            tripwire_triggered: false,
            output_info: None,
            message: None,
            metadata: BTreeMap::new(),
        }
    }

    /// A tripwire — hard stop.
    pub fn tripwire(message: impl Into<String>) -> Self {
        Self {
            tripwire_triggered: true,
            output_info: None,
            message: Some(message.into()),
            metadata: BTreeMap::new(),
        }
    }

    /// Attach a structured diagnostic payload.
    pub fn with_output_info(mut self, info: SendableValue) -> Self {
        self.output_info = Some(info);
        self
    }

    /// Attach a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: SendableValue) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Validates run input before the agent starts.
///
/// Guardrails that report `run_in_parallel() == false` are gates: they
/// complete in declaration order before anything else runs, so expensive
/// work is never started behind a check that was going to reject the run.
#[async_trait]
pub trait InputGuardrail: Send + Sync {
    /// Name reported in tripwire errors.
    fn name(&self) -> &str;

    /// Whether this guardrail may run concurrently with its peers.
    fn run_in_parallel(&self) -> bool {
        true
    }

    /// Validate the run input.
    async fn validate(
        &self,
        input: &str,
        agent: &AgentInfo,
        context: &ExecutionContext,
    ) -> GuardrailResult;
}

/// Validates the final output after the loop completes, before anything
/// is persisted to memory or session.
#[async_trait]
pub trait OutputGuardrail: Send + Sync {
    /// Name reported in tripwire errors.
    fn name(&self) -> &str;

    /// Validate the candidate final output.
    async fn validate(
        &self,
        output: &str,
        agent: &AgentInfo,
        context: &ExecutionContext,
    ) -> GuardrailResult;
}

/// What a tool guardrail sees: the tool being called, the arguments, and
/// which agent is calling.
#[derive(Debug, Clone)]
pub struct ToolGuardrailData {
    /// Definition of the tool being dispatched.
    pub tool: ToolDefinition,
    /// The arguments as dispatched.
    pub arguments: BTreeMap<String, SendableValue>,
    /// The agent making the call.
    pub agent: AgentInfo,
}

/// Validates a tool call immediately before the tool executes. A tripwire
/// here means the tool is never invoked.
#[async_trait]
pub trait ToolInputGuardrail: Send + Sync {
    /// Name reported in tripwire errors.
    fn name(&self) -> &str;

    /// Validate the pending tool call.
    async fn validate(
        &self,
        data: &ToolGuardrailData,
        context: &ExecutionContext,
    ) -> GuardrailResult;
}

/// Validates a tool's output immediately after it executes, before the
/// result is folded into the scratchpad. A tripwire here means the call
/// itself succeeded but its result must not be trusted.
#[async_trait]
pub trait ToolOutputGuardrail: Send + Sync {
    /// Name reported in tripwire errors.
    fn name(&self) -> &str;

    /// Validate the tool output.
    async fn validate(
        &self,
        data: &ToolGuardrailData,
        output: &SendableValue,
        context: &ExecutionContext,
    ) -> GuardrailResult;
}
