//! Composition operators over the [`Agent`] trait.
//!
//! Every composite implements [`Agent`] itself, so pipelines nest
//! arbitrarily: a parallel group of sequential chains with a fallback leg
//! is just another agent. Each member runs under a child trace context
//! derived from the caller's, so a whole composed run reconstructs from
//! the parent-span links.

#![deny(missing_docs)]

use async_trait::async_trait;
use futures_util::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use strand_protocol::{
    Agent, AgentError, AgentInfo, AgentResult, AgentResultBuilder, ExecutionContext,
    SendableValue,
};
use tracing::{debug, warn};

/// How a [`ParallelAgent`] combines its members' results.
#[derive(Clone)]
pub enum MergeStrategy {
    /// The first successful member in declaration order wins; its result
    /// is returned unchanged (aside from merge metadata).
    FirstSuccess,
    /// Successful outputs joined in declaration order. Empty outputs are
    /// skipped, which makes [`NoopAgent`] an identity element.
    Concatenate {
        /// Separator placed between outputs.
        separator: String,
    },
    /// Outputs rendered as labeled sections, one per member, declaration
    /// order.
    Structured,
    /// Caller-supplied merge over the successful results (declaration
    /// order).
    Custom(Arc<dyn Fn(&[AgentResult]) -> String + Send + Sync>),
}

impl std::fmt::Debug for MergeStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MergeStrategy::FirstSuccess => f.write_str("FirstSuccess"),
            MergeStrategy::Concatenate { separator } => {
                f.debug_struct("Concatenate").field("separator", separator).finish()
            }
            MergeStrategy::Structured => f.write_str("Structured"),
            MergeStrategy::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// How a [`ParallelAgent`] reacts to member failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// First failure fails the group; siblings are cancelled.
    FailFast,
    /// The group succeeds if at least one member does; failures are
    /// logged and dropped.
    ContinueOnPartialFailure,
    /// Like `ContinueOnPartialFailure`, but failures are surfaced in the
    /// merged result's metadata under `"errors"`.
    CollectErrors,
}

/// Runs members one after another, feeding each member's output text as
/// the next member's input. The final result is the last member's.
pub struct SequentialAgent {
    info: AgentInfo,
    members: Vec<Arc<dyn Agent>>,
}

impl SequentialAgent {
    /// Create a pipeline. Members run in the given order.
    pub fn new(name: impl Into<String>, members: Vec<Arc<dyn Agent>>) -> Self {
        Self {
            info: AgentInfo::new(name, "sequential pipeline"),
            members,
        }
    }
}

#[async_trait]
impl Agent for SequentialAgent {
    fn info(&self) -> AgentInfo {
        self.info.clone()
    }

    async fn run(
        &self,
        input: &str,
        context: &ExecutionContext,
    ) -> Result<AgentResult, AgentError> {
        if self.members.is_empty() {
            return Err(AgentError::InvalidInput("pipeline has no members".into()));
        }

        let mut current = input.to_string();
        let mut last: Option<AgentResult> = None;
        for member in &self.members {
            debug!(pipeline = %self.info.name, member = %member.info().name, "pipeline step");
            let result = member.run(&current, &context.child()).await?;
            current = result.output.clone();
            last = Some(result);
        }
        // Non-empty members guarantee a result here.
        last.ok_or_else(|| AgentError::Internal("pipeline produced no result".into()))
    }

    fn cancel(&self) {
        for member in &self.members {
            member.cancel();
        }
    }
}

/// Runs every member concurrently on the same input and merges the
/// results.
pub struct ParallelAgent {
    info: AgentInfo,
    members: Vec<Arc<dyn Agent>>,
    merge: MergeStrategy,
    errors: ErrorPolicy,
}

impl ParallelAgent {
    /// Create a group with the default strategies
    /// ([`MergeStrategy::FirstSuccess`] + [`ErrorPolicy::FailFast`]).
    pub fn new(name: impl Into<String>, members: Vec<Arc<dyn Agent>>) -> Self {
        Self {
            info: AgentInfo::new(name, "parallel group"),
            members,
            merge: MergeStrategy::FirstSuccess,
            errors: ErrorPolicy::FailFast,
        }
    }

    /// Set the merge strategy.
    pub fn with_merge(mut self, merge: MergeStrategy) -> Self {
        self.merge = merge;
        self
    }

    /// Set the error policy.
    pub fn with_error_policy(mut self, errors: ErrorPolicy) -> Self {
        self.errors = errors;
        self
    }

    fn merge_results(
        &self,
        outcomes: Vec<(usize, Result<AgentResult, AgentError>)>,
    ) -> Result<AgentResult, AgentError> {
        let mut ordered = outcomes;
        ordered.sort_by_key(|(index, _)| *index);

        let mut successes: Vec<(usize, AgentResult)> = Vec::new();
        let mut failures: Vec<(usize, AgentError)> = Vec::new();
        for (index, outcome) in ordered {
            match outcome {
                Ok(result) => successes.push((index, result)),
                Err(error) => failures.push((index, error)),
            }
        }

        match self.errors {
            ErrorPolicy::FailFast => {
                if let Some((_, error)) = failures.drain(..).next() {
                    return Err(error);
                }
            }
            ErrorPolicy::ContinueOnPartialFailure | ErrorPolicy::CollectErrors => {
                for (index, error) in &failures {
                    warn!(group = %self.info.name, member = index, %error, "member failed");
                }
                if successes.is_empty() {
                    // Nothing to merge; surface the first failure.
                    if let Some((_, error)) = failures.drain(..).next() {
                        return Err(error);
                    }
                    return Err(AgentError::InvalidInput("group has no members".into()));
                }
            }
        }

        let mut builder = AgentResultBuilder::new();
        let results: Vec<AgentResult> =
            successes.iter().map(|(_, result)| result.clone()).collect();

        let output = match &self.merge {
            MergeStrategy::FirstSuccess => results[0].output.clone(),
            MergeStrategy::Concatenate { separator } => results
                .iter()
                .map(|r| r.output.as_str())
                .filter(|o| !o.is_empty())
                .collect::<Vec<_>>()
                .join(separator),
            MergeStrategy::Structured => {
                let sections: Vec<String> = successes
                    .iter()
                    .map(|(index, result)| format!("## member {index}\n{}", result.output))
                    .collect();
                sections.join("\n\n")
            }
            MergeStrategy::Custom(merge) => merge(&results),
        };

        let mut iterations = 0u32;
        for result in &results {
            iterations = iterations.saturating_add(result.iteration_count);
            for call in &result.tool_calls {
                builder.record_tool_call(call.clone());
            }
            for tool_result in &result.tool_results {
                builder.record_tool_result(tool_result.clone());
            }
            if let Some(usage) = result.token_usage {
                builder.add_usage(usage);
            }
            if let Some(cost) = result.cost {
                builder.add_cost(cost);
            }
        }
        for _ in 0..iterations {
            builder.begin_iteration();
        }

        builder.insert_metadata(
            "members_succeeded",
            SendableValue::Int(results.len() as i64),
        );
        if self.errors == ErrorPolicy::CollectErrors && !failures.is_empty() {
            builder.insert_metadata(
                "errors",
                SendableValue::Array(
                    failures
                        .iter()
                        .map(|(index, error)| {
                            SendableValue::from(format!("member {index}: {error}"))
                        })
                        .collect(),
                ),
            );
        }

        builder.set_output(output);
        Ok(builder.build())
    }
}

#[async_trait]
impl Agent for ParallelAgent {
    fn info(&self) -> AgentInfo {
        self.info.clone()
    }

    async fn run(
        &self,
        input: &str,
        context: &ExecutionContext,
    ) -> Result<AgentResult, AgentError> {
        if self.members.is_empty() {
            return Err(AgentError::InvalidInput("group has no members".into()));
        }

        let mut tasks: FuturesUnordered<_> = self
            .members
            .iter()
            .enumerate()
            .map(|(index, member)| {
                let member = member.clone();
                let input = input.to_string();
                let child = context.child();
                let handle =
                    tokio::spawn(async move { member.run(&input, &child).await });
                async move {
                    let outcome = match handle.await {
                        Ok(outcome) => outcome,
                        Err(join_error) => {
                            Err(AgentError::Internal(format!("member task failed: {join_error}")))
                        }
                    };
                    (index, outcome)
                }
            })
            .collect();

        let mut outcomes = Vec::with_capacity(self.members.len());
        while let Some((index, outcome)) = tasks.next().await {
            if outcome.is_err() && self.errors == ErrorPolicy::FailFast {
                // Cancel siblings cooperatively, then fail with this error.
                for member in &self.members {
                    member.cancel();
                }
                outcomes.push((index, outcome));
                drop(tasks);
                return self.merge_results(outcomes);
            }
            outcomes.push((index, outcome));
        }

        self.merge_results(outcomes)
    }

    fn cancel(&self) {
        for member in &self.members {
            member.cancel();
        }
    }
}

/// Runs the primary agent; on any error, runs the fallback with the
/// original input and returns its result as-is.
pub struct FallbackAgent {
    info: AgentInfo,
    primary: Arc<dyn Agent>,
    fallback: Arc<dyn Agent>,
}

impl FallbackAgent {
    /// Create a fallback pair.
    pub fn new(name: impl Into<String>, primary: Arc<dyn Agent>, fallback: Arc<dyn Agent>) -> Self {
        Self {
            info: AgentInfo::new(name, "conditional fallback"),
            primary,
            fallback,
        }
    }
}

#[async_trait]
impl Agent for FallbackAgent {
    fn info(&self) -> AgentInfo {
        self.info.clone()
    }

    async fn run(
        &self,
        input: &str,
        context: &ExecutionContext,
    ) -> Result<AgentResult, AgentError> {
        match self.primary.run(input, &context.child()).await {
            Ok(result) => Ok(result),
            Err(error) => {
                warn!(
                    agent = %self.info.name,
                    primary = %self.primary.info().name,
                    %error,
                    "primary failed, running fallback"
                );
                self.fallback.run(input, &context.child()).await
            }
        }
    }

    fn cancel(&self) {
        self.primary.cancel();
        self.fallback.cancel();
    }
}

/// The identity agent: empty output, no tool calls, zero iterations.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAgent;

#[async_trait]
impl Agent for NoopAgent {
    fn info(&self) -> AgentInfo {
        AgentInfo::new("noop", "does nothing")
    }

    async fn run(
        &self,
        _input: &str,
        _context: &ExecutionContext,
    ) -> Result<AgentResult, AgentError> {
        Ok(AgentResultBuilder::new().build())
    }

    fn cancel(&self) {}
}
