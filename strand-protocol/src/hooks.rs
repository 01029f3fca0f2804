//! The RunHooks interface — lifecycle observation.
//!
//! Every callback is a no-op by default; implement only what you watch.
//! The engine awaits each callback synchronously at the documented points,
//! so a slow hook delays the run — the cost is the hook author's
//! responsibility.

use crate::agent::AgentInfo;
use crate::error::AgentError;
use crate::guardrail::GuardrailResult;
use crate::result::AgentResult;
use crate::tool::{ToolCall, ToolResult};
use async_trait::async_trait;

/// Lifecycle callbacks for one run.
///
/// Implementations:
/// - a tracing logger (see `strand-hooks`)
/// - a metrics exporter
/// - a recording spy for tests
#[async_trait]
pub trait RunHooks: Send + Sync {
    /// The run was accepted and is about to start.
    async fn on_agent_start(&self, agent: &AgentInfo, input: &str) {
        let _ = (agent, input);
    }

    /// The run completed with a validated result.
    async fn on_agent_end(&self, agent: &AgentInfo, result: &AgentResult) {
        let _ = (agent, result);
    }

    /// The run failed; `error` is the typed failure the caller will see.
    async fn on_error(&self, agent: &AgentInfo, error: &AgentError) {
        let _ = (agent, error);
    }

    /// Control is being handed from one agent to another (composition).
    async fn on_handoff(&self, from: &AgentInfo, to: &AgentInfo) {
        let _ = (from, to);
    }

    /// A tool call is about to be dispatched.
    async fn on_tool_start(&self, agent: &AgentInfo, call: &ToolCall) {
        let _ = (agent, call);
    }

    /// A tool call finished (either outcome).
    async fn on_tool_end(&self, agent: &AgentInfo, result: &ToolResult) {
        let _ = (agent, result);
    }

    /// A model call is about to be made.
    async fn on_llm_start(&self, agent: &AgentInfo, prompt: &str) {
        let _ = (agent, prompt);
    }

    /// A model call returned.
    async fn on_llm_end(&self, agent: &AgentInfo, response: &str) {
        let _ = (agent, response);
    }

    /// A guardrail tripped. Fires before the matching tripwire error is
    /// returned.
    async fn on_guardrail_triggered(
        &self,
        agent: &AgentInfo,
        guardrail: &str,
        result: &GuardrailResult,
    ) {
        let _ = (agent, guardrail, result);
    }
}

/// The do-nothing hooks value, for callers that don't observe anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

#[async_trait]
impl RunHooks for NoopHooks {}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_hooks_do_nothing() {
        let hooks = NoopHooks;
        let agent = AgentInfo::new("a", "");
        hooks.on_agent_start(&agent, "input").await;
        hooks.on_error(&agent, &AgentError::Cancelled).await;
    }
}
