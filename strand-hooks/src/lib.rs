//! RunHooks implementations: composition and tracing.
//!
//! [`CompositeHooks`] fans every callback out to an ordered list of
//! registered hooks — observation never short-circuits, unlike guardrails.
//! [`TracingHooks`] logs the run lifecycle through `tracing`.

#![deny(missing_docs)]

use async_trait::async_trait;
use std::sync::Arc;
use strand_protocol::{
    AgentError, AgentInfo, AgentResult, GuardrailResult, RunHooks, ToolCall, ToolResult,
};
use tracing::{debug, error, info, warn};

/// An ordered fan-out over multiple hooks.
///
/// Every registered hook receives every callback, in registration order.
/// A hook cannot suppress delivery to the ones after it.
#[derive(Default)]
pub struct CompositeHooks {
    hooks: Vec<Arc<dyn RunHooks>>,
}

impl CompositeHooks {
    /// An empty composite.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a hook. Returns self for chaining.
    pub fn with(mut self, hooks: Arc<dyn RunHooks>) -> Self {
        self.hooks.push(hooks);
        self
    }

    /// Append a hook.
    pub fn push(&mut self, hooks: Arc<dyn RunHooks>) {
        self.hooks.push(hooks);
    }

    /// Number of registered hooks.
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// True if no hooks are registered.
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

#[async_trait]
impl RunHooks for CompositeHooks {
    async fn on_agent_start(&self, agent: &AgentInfo, input: &str) {
        for hooks in &self.hooks {
            hooks.on_agent_start(agent, input).await;
        }
    }

    async fn on_agent_end(&self, agent: &AgentInfo, result: &AgentResult) {
        for hooks in &self.hooks {
            hooks.on_agent_end(agent, result).await;
        }
    }

    async fn on_error(&self, agent: &AgentInfo, error: &AgentError) {
        for hooks in &self.hooks {
            hooks.on_error(agent, error).await;
        }
    }

    async fn on_handoff(&self, from: &AgentInfo, to: &AgentInfo) {
        for hooks in &self.hooks {
            hooks.on_handoff(from, to).await;
        }
    }

    async fn on_tool_start(&self, agent: &AgentInfo, call: &ToolCall) {
        for hooks in &self.hooks {
            hooks.on_tool_start(agent, call).await;
        }
    }

    async fn on_tool_end(&self, agent: &AgentInfo, result: &ToolResult) {
        for hooks in &self.hooks {
            hooks.on_tool_end(agent, result).await;
        }
    }

    async fn on_llm_start(&self, agent: &AgentInfo, prompt: &str) {
        for hooks in &self.hooks {
            hooks.on_llm_start(agent, prompt).await;
        }
    }

    async fn on_llm_end(&self, agent: &AgentInfo, response: &str) {
        for hooks in &self.hooks {
            hooks.on_llm_end(agent, response).await;
        }
    }

    async fn on_guardrail_triggered(
        &self,
        agent: &AgentInfo,
        guardrail: &str,
        result: &GuardrailResult,
    ) {
        for hooks in &self.hooks {
            hooks.on_guardrail_triggered(agent, guardrail, result).await;
        }
    }
}

/// Hooks that log the run lifecycle through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingHooks;

#[async_trait]
impl RunHooks for TracingHooks {
    async fn on_agent_start(&self, agent: &AgentInfo, input: &str) {
        info!(agent = %agent.name, input_len = input.len(), "run started");
    }

    async fn on_agent_end(&self, agent: &AgentInfo, result: &AgentResult) {
        info!(
            agent = %agent.name,
            iterations = result.iteration_count,
            duration = %result.duration,
            tool_calls = result.tool_calls.len(),
            "run completed"
        );
    }

    async fn on_error(&self, agent: &AgentInfo, err: &AgentError) {
        error!(agent = %agent.name, error = %err, "run failed");
    }

    async fn on_handoff(&self, from: &AgentInfo, to: &AgentInfo) {
        info!(from = %from.name, to = %to.name, "handoff");
    }

    async fn on_tool_start(&self, agent: &AgentInfo, call: &ToolCall) {
        debug!(agent = %agent.name, tool = %call.tool_name, call_id = %call.id, "tool call started");
    }

    async fn on_tool_end(&self, agent: &AgentInfo, result: &ToolResult) {
        debug!(
            agent = %agent.name,
            call_id = %result.call_id(),
            success = result.is_success(),
            duration = %result.duration(),
            "tool call finished"
        );
    }

    async fn on_llm_start(&self, agent: &AgentInfo, prompt: &str) {
        debug!(agent = %agent.name, prompt_len = prompt.len(), "model call started");
    }

    async fn on_llm_end(&self, agent: &AgentInfo, response: &str) {
        debug!(agent = %agent.name, response_len = response.len(), "model call finished");
    }

    async fn on_guardrail_triggered(
        &self,
        agent: &AgentInfo,
        guardrail: &str,
        result: &GuardrailResult,
    ) {
        warn!(
            agent = %agent.name,
            guardrail,
            message = result.message.as_deref().unwrap_or(""),
            "guardrail tripped"
        );
    }
}
