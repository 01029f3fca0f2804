//! Run results and the accumulator that builds them.

use crate::duration::DurationMs;
use crate::tool::{ToolCall, ToolResult};
use crate::value::SendableValue;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

/// Token usage aggregated over one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Input tokens consumed.
    pub input_tokens: u64,
    /// Output tokens generated.
    pub output_tokens: u64,
}

impl TokenUsage {
    /// Create a new usage record.
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    /// Total tokens in both directions.
    pub fn total(&self) -> u64 {
        self.input_tokens.saturating_add(self.output_tokens)
    }

    /// Fold another usage record into this one.
    pub fn accumulate(&mut self, other: TokenUsage) {
        self.input_tokens = self.input_tokens.saturating_add(other.input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(other.output_tokens);
    }
}

/// Immutable snapshot of one completed, validated run.
///
/// Produced only on the success path — a failed run yields an
/// [`AgentError`](crate::AgentError), never a partial result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResult {
    /// The final output text.
    pub output: String,
    /// Every tool call dispatched, in dispatch order.
    pub tool_calls: Vec<ToolCall>,
    /// One result per dispatched call, same order.
    pub tool_results: Vec<ToolResult>,
    /// Loop iterations used.
    pub iteration_count: u32,
    /// Wall-clock duration of the run.
    pub duration: DurationMs,
    /// Aggregated token usage, if the provider reported any.
    pub token_usage: Option<TokenUsage>,
    /// Aggregated cost in USD, if the provider reported any.
    pub cost: Option<Decimal>,
    /// Free-form metadata (composition operators record per-member detail
    /// here).
    pub metadata: BTreeMap<String, SendableValue>,
}

/// Mutable accumulator for a run in progress.
///
/// Single-owner: exactly one loop instance holds the builder and it is
/// never shared across tasks. `build()` freezes it into an [`AgentResult`].
#[derive(Debug)]
pub struct AgentResultBuilder {
    started: Instant,
    output: String,
    tool_calls: Vec<ToolCall>,
    tool_results: Vec<ToolResult>,
    iteration_count: u32,
    token_usage: Option<TokenUsage>,
    cost: Option<Decimal>,
    metadata: BTreeMap<String, SendableValue>,
}

impl AgentResultBuilder {
    /// Start accumulating. The run's duration is measured from this call.
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            output: String::new(),
            tool_calls: Vec::new(),
            tool_results: Vec::new(),
            iteration_count: 0,
            token_usage: None,
            cost: None,
            metadata: BTreeMap::new(),
        }
    }

    /// Record the start of an iteration; returns the new count.
    pub fn begin_iteration(&mut self) -> u32 {
        self.iteration_count += 1;
        self.iteration_count
    }

    /// Iterations recorded so far.
    pub fn iterations(&self) -> u32 {
        self.iteration_count
    }

    /// Record a dispatched tool call.
    pub fn record_tool_call(&mut self, call: ToolCall) {
        self.tool_calls.push(call);
    }

    /// Record the result of a dispatched call.
    pub fn record_tool_result(&mut self, result: ToolResult) {
        self.tool_results.push(result);
    }

    /// Fold provider-reported usage into the running total.
    pub fn add_usage(&mut self, usage: TokenUsage) {
        self.token_usage.get_or_insert_with(TokenUsage::default).accumulate(usage);
    }

    /// Fold provider-reported cost into the running total.
    pub fn add_cost(&mut self, cost: Decimal) {
        *self.cost.get_or_insert(Decimal::ZERO) += cost;
    }

    /// Set the final output.
    pub fn set_output(&mut self, output: impl Into<String>) {
        self.output = output.into();
    }

    /// Attach a metadata entry.
    pub fn insert_metadata(&mut self, key: impl Into<String>, value: SendableValue) {
        self.metadata.insert(key.into(), value);
    }

    /// Wall-clock time elapsed since the builder was created.
    pub fn elapsed(&self) -> DurationMs {
        DurationMs::from(self.started.elapsed())
    }

    /// Freeze into an immutable result.
    pub fn build(self) -> AgentResult {
        let duration = DurationMs::from(self.started.elapsed());
        AgentResult {
            output: self.output,
            tool_calls: self.tool_calls,
            tool_results: self.tool_results,
            iteration_count: self.iteration_count,
            duration,
            token_usage: self.token_usage,
            cost: self.cost,
            metadata: self.metadata,
        }
    }
}

impl Default for AgentResultBuilder {
    fn default() -> Self {
        Self::new()
    }
}
