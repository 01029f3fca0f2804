#![deny(missing_docs)]
//! # strand — umbrella crate
//!
//! A single import surface for the strand agent-execution framework.
//! Re-exports the protocol and the implementation crates behind feature
//! flags, plus a `prelude` for the happy path.

pub use strand_protocol;

#[cfg(feature = "compose")]
pub use strand_compose;
#[cfg(feature = "engine")]
pub use strand_engine;
#[cfg(feature = "guard")]
pub use strand_guard;
#[cfg(feature = "hooks")]
pub use strand_hooks;
#[cfg(feature = "memory")]
pub use strand_memory;
#[cfg(feature = "tool")]
pub use strand_tool;

/// Happy-path imports for composing strand systems.
pub mod prelude {
    pub use strand_protocol::{
        Agent, AgentConfiguration, AgentError, AgentEvent, AgentInfo, AgentResult, DurationMs,
        ExecutionContext, GuardrailResult, InferenceOptions, InferenceProvider, InferenceResponse,
        InputGuardrail, Memory, MemoryMessage, MessageRole, OutputGuardrail, ProviderError,
        SendableValue, Session, Tool, ToolCall, ToolDefinition, ToolParameter, ToolResult,
    };

    #[cfg(feature = "tool")]
    pub use strand_tool::ToolRegistry;

    #[cfg(feature = "engine")]
    pub use strand_engine::{ReactAgent, stream_run};

    #[cfg(feature = "compose")]
    pub use strand_compose::{
        ErrorPolicy, FallbackAgent, MergeStrategy, NoopAgent, ParallelAgent, SequentialAgent,
    };

    #[cfg(feature = "memory")]
    pub use strand_memory::{InMemoryMemory, InMemorySession};

    #[cfg(feature = "hooks")]
    pub use strand_hooks::{CompositeHooks, TracingHooks};
}
