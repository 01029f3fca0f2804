//! Test doubles for the protocol contracts.
//!
//! Enabled by the `test-utils` feature. Downstream crates use these in
//! their own tests instead of re-implementing mocks.

use crate::agent::{Agent, AgentInfo};
use crate::context::ExecutionContext;
use crate::error::{AgentError, MemoryError};
use crate::guardrail::GuardrailResult;
use crate::memory::{Memory, MemoryMessage, Session};
use crate::provider::{InferenceOptions, InferenceProvider, InferenceResponse, ProviderError};
use crate::result::{AgentResult, AgentResultBuilder};
use crate::tool::{ToolCall, ToolDefinition, ToolResult};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// An agent that returns its input, optionally behind a fixed prefix.
#[derive(Debug, Default)]
pub struct EchoAgent {
    /// Prepended to every output.
    pub prefix: String,
}

impl EchoAgent {
    /// Echo with no prefix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Echo behind `prefix`.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

#[async_trait]
impl Agent for EchoAgent {
    fn info(&self) -> AgentInfo {
        AgentInfo::new("echo", "returns its input")
    }

    async fn run(
        &self,
        input: &str,
        _context: &ExecutionContext,
    ) -> Result<AgentResult, AgentError> {
        let mut builder = AgentResultBuilder::new();
        builder.begin_iteration();
        builder.set_output(format!("{}{}", self.prefix, input));
        Ok(builder.build())
    }

    fn cancel(&self) {}
}

/// An agent that always returns the same output, ignoring input.
#[derive(Debug)]
pub struct StaticAgent {
    name: String,
    output: String,
}

impl StaticAgent {
    /// Always answer `output`.
    pub fn new(name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            output: output.into(),
        }
    }
}

#[async_trait]
impl Agent for StaticAgent {
    fn info(&self) -> AgentInfo {
        AgentInfo::new(self.name.clone(), "returns a fixed output")
    }

    async fn run(
        &self,
        _input: &str,
        _context: &ExecutionContext,
    ) -> Result<AgentResult, AgentError> {
        let mut builder = AgentResultBuilder::new();
        builder.begin_iteration();
        builder.set_output(self.output.clone());
        Ok(builder.build())
    }

    fn cancel(&self) {}
}

/// An agent that always fails with [`AgentError::GenerationFailed`].
#[derive(Debug, Default)]
pub struct FailingAgent {
    name: String,
}

impl FailingAgent {
    /// A failing agent with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Agent for FailingAgent {
    fn info(&self) -> AgentInfo {
        AgentInfo::new(self.name.clone(), "always fails")
    }

    async fn run(
        &self,
        _input: &str,
        _context: &ExecutionContext,
    ) -> Result<AgentResult, AgentError> {
        Err(AgentError::GenerationFailed(format!(
            "{} always fails",
            self.name
        )))
    }

    fn cancel(&self) {}
}

/// A provider that replays a scripted sequence of responses.
///
/// Each call pops the next response from the front of the queue. A call
/// past the end of the script returns `ProviderError::InvalidResponse` so
/// an over-eager loop fails loudly instead of hanging.
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<Result<InferenceResponse, ProviderError>>>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    /// Script a sequence of plain-text completions.
    pub fn with_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(
                texts
                    .into_iter()
                    .map(|t| Ok(InferenceResponse::text(t)))
                    .collect(),
            ),
            calls: AtomicUsize::new(0),
        }
    }

    /// Script a sequence of full responses or errors.
    pub fn with_responses<I>(responses: I) -> Self
    where
        I: IntoIterator<Item = Result<InferenceResponse, ProviderError>>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    /// How many calls have been made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_response(&self) -> Result<InferenceResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .expect("script lock poisoned")
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::InvalidResponse("script exhausted".into())))
    }
}

impl InferenceProvider for ScriptedProvider {
    fn generate(
        &self,
        _prompt: String,
        _options: InferenceOptions,
    ) -> impl Future<Output = Result<String, ProviderError>> + Send {
        let next = self.next_response().map(|r| r.content);
        async move { next }
    }

    fn generate_with_tools(
        &self,
        _prompt: String,
        _tools: Vec<ToolDefinition>,
        _options: InferenceOptions,
    ) -> impl Future<Output = Result<InferenceResponse, ProviderError>> + Send {
        let next = self.next_response();
        async move { next }
    }
}

/// A [`Memory`] that records every call for later assertions.
#[derive(Debug, Default)]
pub struct SpyMemory {
    messages: Mutex<Vec<MemoryMessage>>,
    adds: AtomicUsize,
}

impl SpyMemory {
    /// An empty spy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `add` calls observed.
    pub fn add_count(&self) -> usize {
        self.adds.load(Ordering::SeqCst)
    }

    /// Snapshot of the stored messages.
    pub fn messages(&self) -> Vec<MemoryMessage> {
        self.messages.lock().expect("spy lock poisoned").clone()
    }
}

#[async_trait]
impl Memory for SpyMemory {
    async fn add(&self, message: MemoryMessage) -> Result<(), MemoryError> {
        self.adds.fetch_add(1, Ordering::SeqCst);
        self.messages.lock().expect("spy lock poisoned").push(message);
        Ok(())
    }

    async fn get_context(&self) -> Result<Vec<MemoryMessage>, MemoryError> {
        Ok(self.messages())
    }

    async fn clear(&self) -> Result<(), MemoryError> {
        self.messages.lock().expect("spy lock poisoned").clear();
        Ok(())
    }
}

/// A [`Session`] that records every call for later assertions.
#[derive(Debug)]
pub struct SpySession {
    id: String,
    items: Mutex<Vec<MemoryMessage>>,
    add_item_calls: AtomicUsize,
}

impl SpySession {
    /// An empty spy with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            items: Mutex::new(Vec::new()),
            add_item_calls: AtomicUsize::new(0),
        }
    }

    /// Number of `add_items` calls observed.
    pub fn add_items_count(&self) -> usize {
        self.add_item_calls.load(Ordering::SeqCst)
    }

    /// Snapshot of the stored items.
    pub fn items(&self) -> Vec<MemoryMessage> {
        self.items.lock().expect("spy lock poisoned").clone()
    }
}

#[async_trait]
impl Session for SpySession {
    fn session_id(&self) -> &str {
        &self.id
    }

    async fn item_count(&self) -> Result<usize, MemoryError> {
        Ok(self.items.lock().expect("spy lock poisoned").len())
    }

    async fn get_items(&self, limit: Option<usize>) -> Result<Vec<MemoryMessage>, MemoryError> {
        let items = self.items.lock().expect("spy lock poisoned");
        let start = limit.map_or(0, |n| items.len().saturating_sub(n));
        Ok(items[start..].to_vec())
    }

    async fn add_items(&self, items: Vec<MemoryMessage>) -> Result<(), MemoryError> {
        self.add_item_calls.fetch_add(1, Ordering::SeqCst);
        self.items.lock().expect("spy lock poisoned").extend(items);
        Ok(())
    }

    async fn pop_item(&self) -> Result<Option<MemoryMessage>, MemoryError> {
        Ok(self.items.lock().expect("spy lock poisoned").pop())
    }

    async fn clear_session(&self) -> Result<(), MemoryError> {
        self.items.lock().expect("spy lock poisoned").clear();
        Ok(())
    }
}

/// Hooks that record the order of callbacks they receive.
#[derive(Debug, Default)]
pub struct RecordingHooks {
    calls: Mutex<Vec<String>>,
}

impl RecordingHooks {
    /// An empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded callback labels, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("spy lock poisoned").clone()
    }

    fn record(&self, label: impl Into<String>) {
        self.calls.lock().expect("spy lock poisoned").push(label.into());
    }
}

#[async_trait]
impl crate::hooks::RunHooks for RecordingHooks {
    async fn on_agent_start(&self, agent: &AgentInfo, _input: &str) {
        self.record(format!("agent_start:{}", agent.name));
    }

    async fn on_agent_end(&self, agent: &AgentInfo, _result: &AgentResult) {
        self.record(format!("agent_end:{}", agent.name));
    }

    async fn on_error(&self, agent: &AgentInfo, error: &AgentError) {
        self.record(format!("error:{}:{error}", agent.name));
    }

    async fn on_handoff(&self, from: &AgentInfo, to: &AgentInfo) {
        self.record(format!("handoff:{}->{}", from.name, to.name));
    }

    async fn on_tool_start(&self, _agent: &AgentInfo, call: &ToolCall) {
        self.record(format!("tool_start:{}", call.tool_name));
    }

    async fn on_tool_end(&self, _agent: &AgentInfo, result: &ToolResult) {
        self.record(format!(
            "tool_end:{}",
            if result.is_success() { "ok" } else { "err" }
        ));
    }

    async fn on_llm_start(&self, agent: &AgentInfo, _prompt: &str) {
        self.record(format!("llm_start:{}", agent.name));
    }

    async fn on_llm_end(&self, agent: &AgentInfo, _response: &str) {
        self.record(format!("llm_end:{}", agent.name));
    }

    async fn on_guardrail_triggered(
        &self,
        _agent: &AgentInfo,
        guardrail: &str,
        _result: &GuardrailResult,
    ) {
        self.record(format!("guardrail_triggered:{guardrail}"));
    }
}
