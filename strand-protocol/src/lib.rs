//! # strand-protocol — Protocol traits for agent execution
//!
//! This crate defines the contracts that compose to form an agent-execution
//! system. Everything else in the workspace is an implementation of one of
//! these boundaries.
//!
//! ## The Contracts
//!
//! | Contract | Trait | What it does |
//! |----------|-------|-------------|
//! | Agent | [`Agent`] | One run: input string in, validated result out |
//! | Tool | [`Tool`] | A callable capability the model can invoke |
//! | Guardrails | [`InputGuardrail`], [`OutputGuardrail`], [`ToolInputGuardrail`], [`ToolOutputGuardrail`] | Policy validation around runs and tool calls |
//! | Provider | [`InferenceProvider`] | The language-model backend |
//! | Memory | [`Memory`] | In-run conversation context |
//! | Session | [`Session`] | Externally-owned persistent history |
//! | Hooks | [`RunHooks`] | Lifecycle observation |
//!
//! ## Design Principle
//!
//! Every trait is operation-defined, not mechanism-defined. [`Agent::run`]
//! means "drive this agent to a validated result" — not "call an API" or
//! "spin a loop." A ReAct engine, a sequential pipeline, and a fallback
//! pair all implement the same trait, which is what makes composition
//! recursive.
//!
//! ## Object safety
//!
//! [`Agent`], [`Tool`], the guardrail traits, [`Memory`], [`Session`], and
//! [`RunHooks`] are object-safe (`async-trait`) so they can be shared as
//! `Arc<dyn _>`. [`InferenceProvider`] is deliberately NOT object-safe —
//! it uses native async (RPITIT) and engines are generic over it. The
//! object-safe boundary is [`Agent`].
//!
//! ## Dependency Notes
//!
//! [`SendableValue`] bridges to `serde_json::Value` for serialization —
//! JSON is the universal interchange format for agentic systems, and the
//! one documented lossy boundary (whole-number doubles decode as ints)
//! lives in that bridge.

#![deny(missing_docs)]

pub mod agent;
pub mod context;
pub mod duration;
pub mod error;
pub mod event;
pub mod guardrail;
pub mod hooks;
pub mod memory;
pub mod provider;
pub mod result;
pub mod tool;
pub mod value;

#[cfg(feature = "test-utils")]
pub mod test_utils;

// Re-exports for convenience
pub use agent::{Agent, AgentConfiguration, AgentInfo};
pub use context::{ExecutionContext, TraceContext};
pub use duration::DurationMs;
pub use error::{AgentError, MemoryError, ToolError, TripwireInfo};
pub use event::AgentEvent;
pub use guardrail::{
    GuardrailResult, InputGuardrail, OutputGuardrail, ToolGuardrailData, ToolInputGuardrail,
    ToolOutputGuardrail,
};
pub use hooks::{NoopHooks, RunHooks};
pub use memory::{Memory, MemoryMessage, MessageRole, Session};
pub use provider::{FinishReason, InferenceOptions, InferenceProvider, InferenceResponse, ProviderError};
pub use result::{AgentResult, AgentResultBuilder, TokenUsage};
pub use tool::{ParameterType, Tool, ToolCall, ToolDefinition, ToolParameter, ToolResult};
pub use value::SendableValue;
