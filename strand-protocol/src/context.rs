//! Execution context threaded explicitly through every run and dispatch.
//!
//! No task-local or global state: the context is a plain value passed down
//! the call tree, so composition operators can derive child spans for
//! their members and the whole trace reconstructs from the parent links.

use crate::value::SendableValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Distributed-trace coordinates for one logical operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceContext {
    /// Id shared by every span in one trace.
    pub trace_id: String,
    /// Id of this span.
    pub span_id: String,
    /// Id of the parent span, if this is not a root.
    pub parent_span_id: Option<String>,
}

impl TraceContext {
    /// Start a new trace.
    pub fn root() -> Self {
        Self {
            trace_id: Uuid::new_v4().simple().to_string(),
            span_id: Uuid::new_v4().simple().to_string(),
            parent_span_id: None,
        }
    }

    /// Derive a child span within the same trace.
    pub fn child(&self) -> Self {
        Self {
            trace_id: self.trace_id.clone(),
            span_id: Uuid::new_v4().simple().to_string(),
            parent_span_id: Some(self.span_id.clone()),
        }
    }
}

impl Default for TraceContext {
    fn default() -> Self {
        Self::root()
    }
}

/// Everything ambient a run or tool dispatch carries: trace coordinates
/// plus opaque caller metadata that passes through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionContext {
    /// Trace coordinates for this operation.
    pub trace: TraceContext,
    /// Opaque metadata (priority, tenant, request id — the protocol does
    /// not interpret it).
    pub metadata: BTreeMap<String, SendableValue>,
}

impl ExecutionContext {
    /// Create a fresh context with a new root trace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a context for a child operation: child span, same metadata.
    pub fn child(&self) -> Self {
        Self {
            trace: self.trace.child(),
            metadata: self.metadata.clone(),
        }
    }
}
