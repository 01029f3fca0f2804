//! Discrete run events for UIs and telemetry.
//!
//! Events are a notification vocabulary, not a control surface: consumers
//! observe, they cannot intervene (that is what hooks are for). Terminal
//! events close the stream.

use crate::tool::{ToolCall, ToolResult};
use serde::{Deserialize, Serialize};

/// One observable moment in a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    /// The run was accepted.
    Started {
        /// Agent name.
        agent: String,
    },
    /// The run finished with a validated result. Terminal.
    Completed {
        /// Agent name.
        agent: String,
        /// Final output text.
        output: String,
    },
    /// The run failed. Terminal.
    Failed {
        /// Agent name.
        agent: String,
        /// Display form of the typed error.
        error: String,
    },
    /// The run observed cancellation and unwound. Terminal.
    Cancelled {
        /// Agent name.
        agent: String,
    },
    /// The model produced a reasoning step.
    Thinking {
        /// Agent name.
        agent: String,
        /// The thought text.
        text: String,
    },
    /// A loop iteration began.
    IterationStarted {
        /// Agent name.
        agent: String,
        /// 1-based iteration number.
        iteration: u32,
    },
    /// A loop iteration finished.
    IterationCompleted {
        /// Agent name.
        agent: String,
        /// 1-based iteration number.
        iteration: u32,
    },
    /// A tool call was dispatched.
    ToolCallStarted {
        /// Agent name.
        agent: String,
        /// The dispatched call.
        call: ToolCall,
    },
    /// A tool call succeeded.
    ToolCallCompleted {
        /// Agent name.
        agent: String,
        /// The result.
        result: ToolResult,
    },
    /// A tool call failed.
    ToolCallFailed {
        /// Agent name.
        agent: String,
        /// Tool name.
        tool: String,
        /// Failure description.
        error: String,
    },
    /// A single output token (provider-level streaming, where supported).
    OutputToken {
        /// Agent name.
        agent: String,
        /// The token text.
        token: String,
    },
    /// A chunk of output text.
    OutputChunk {
        /// Agent name.
        agent: String,
        /// The chunk text.
        chunk: String,
    },
    /// A handoff to another agent was requested.
    HandoffRequested {
        /// Source agent name.
        from: String,
        /// Target agent name.
        to: String,
    },
    /// A handoff completed.
    HandoffCompleted {
        /// Source agent name.
        from: String,
        /// Target agent name.
        to: String,
    },
    /// A guardrail check began.
    GuardrailStarted {
        /// Agent name.
        agent: String,
        /// Guardrail name.
        guardrail: String,
    },
    /// A guardrail check passed.
    GuardrailPassed {
        /// Agent name.
        agent: String,
        /// Guardrail name.
        guardrail: String,
    },
    /// A guardrail tripped; the run will fail with the matching tripwire
    /// error.
    GuardrailTriggered {
        /// Agent name.
        agent: String,
        /// Guardrail name.
        guardrail: String,
        /// The guardrail's message, if any.
        message: Option<String>,
    },
}

impl AgentEvent {
    /// True for events that close the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AgentEvent::Completed { .. } | AgentEvent::Failed { .. } | AgentEvent::Cancelled { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_classification() {
        assert!(AgentEvent::Completed {
            agent: "a".into(),
            output: "x".into()
        }
        .is_terminal());
        assert!(AgentEvent::Failed {
            agent: "a".into(),
            error: "e".into()
        }
        .is_terminal());
        assert!(AgentEvent::Cancelled { agent: "a".into() }.is_terminal());
        assert!(!AgentEvent::Started { agent: "a".into() }.is_terminal());
        assert!(!AgentEvent::Thinking {
            agent: "a".into(),
            text: "t".into()
        }
        .is_terminal());
    }

    #[test]
    fn serde_tags() {
        let json = serde_json::to_value(AgentEvent::Started { agent: "a".into() }).unwrap();
        assert_eq!(json["type"], "started");
        let json = serde_json::to_value(AgentEvent::GuardrailTriggered {
            agent: "a".into(),
            guardrail: "g".into(),
            message: None,
        })
        .unwrap();
        assert_eq!(json["type"], "guardrail_triggered");
    }
}
