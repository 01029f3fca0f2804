//! ReAct loop engine — model + tools in a reasoning loop.
//!
//! [`ReactAgent`] implements the object-safe [`Agent`] trait by running
//! the Reason-Act-Observe cycle: build prompt → call model → execute
//! tools → repeat until a final answer, bounded by the configured
//! iteration budget and wall-clock deadline. Generic over
//! `P: InferenceProvider` (not object-safe); the object-safe boundary is
//! [`Agent`].

#![deny(missing_docs)]

pub mod parser;
pub mod prompt;

use crate::parser::ParsedStep;
use crate::prompt::ScratchpadEntry;
use async_trait::async_trait;
use futures_util::Stream;
use std::sync::Arc;
use strand_guard::{Tripped, run_input_guardrails, run_output_guardrails};
use strand_protocol::{
    Agent, AgentConfiguration, AgentError, AgentEvent, AgentInfo, AgentResult, AgentResultBuilder,
    ExecutionContext, FinishReason, InferenceOptions, InferenceProvider, InputGuardrail, Memory,
    MemoryMessage, NoopHooks, OutputGuardrail, ProviderError, RunHooks, Session, Tool, ToolCall,
    ToolResult,
};
use strand_tool::ToolRegistry;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// A leaf agent driving a ReAct loop against one inference provider.
///
/// Collaborators are fixed at construction. `cancel()` is cooperative:
/// the loop observes the token at iteration start and before each model
/// and tool call.
pub struct ReactAgent<P: InferenceProvider> {
    info: AgentInfo,
    instructions: String,
    provider: Option<P>,
    tools: ToolRegistry,
    input_guardrails: Vec<Arc<dyn InputGuardrail>>,
    output_guardrails: Vec<Arc<dyn OutputGuardrail>>,
    memory: Option<Arc<dyn Memory>>,
    session: Option<Arc<dyn Session>>,
    hooks: Arc<dyn RunHooks>,
    config: AgentConfiguration,
    cancel: CancellationToken,
    events: Option<mpsc::UnboundedSender<AgentEvent>>,
}

impl<P: InferenceProvider> ReactAgent<P> {
    /// Create an agent with a provider and default configuration.
    pub fn new(info: AgentInfo, instructions: impl Into<String>, provider: P) -> Self {
        Self {
            info,
            instructions: instructions.into(),
            provider: Some(provider),
            tools: ToolRegistry::new(),
            input_guardrails: Vec::new(),
            output_guardrails: Vec::new(),
            memory: None,
            session: None,
            hooks: Arc::new(NoopHooks),
            config: AgentConfiguration::default(),
            cancel: CancellationToken::new(),
            events: None,
        }
    }

    /// Create an agent with no provider. Runs fail with
    /// [`AgentError::ProviderUnavailable`] at the first model call.
    pub fn unprovisioned(info: AgentInfo, instructions: impl Into<String>) -> Self {
        Self {
            info,
            instructions: instructions.into(),
            provider: None,
            tools: ToolRegistry::new(),
            input_guardrails: Vec::new(),
            output_guardrails: Vec::new(),
            memory: None,
            session: None,
            hooks: Arc::new(NoopHooks),
            config: AgentConfiguration::default(),
            cancel: CancellationToken::new(),
            events: None,
        }
    }

    /// Replace the tool registry.
    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    /// Register one tool.
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.register(tool);
        self
    }

    /// Append an input guardrail.
    pub fn with_input_guardrail(mut self, guardrail: Arc<dyn InputGuardrail>) -> Self {
        self.input_guardrails.push(guardrail);
        self
    }

    /// Append an output guardrail.
    pub fn with_output_guardrail(mut self, guardrail: Arc<dyn OutputGuardrail>) -> Self {
        self.output_guardrails.push(guardrail);
        self
    }

    /// Attach working memory.
    pub fn with_memory(mut self, memory: Arc<dyn Memory>) -> Self {
        self.memory = Some(memory);
        self
    }

    /// Attach a persistent session.
    pub fn with_session(mut self, session: Arc<dyn Session>) -> Self {
        self.session = Some(session);
        self
    }

    /// Attach lifecycle hooks.
    pub fn with_hooks(mut self, hooks: Arc<dyn RunHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: AgentConfiguration) -> Self {
        self.config = config;
        self
    }

    /// Attach an event sink. Every run emits its fine-grained
    /// [`AgentEvent`]s to it; a dropped receiver is ignored.
    pub fn with_event_sink(mut self, sink: mpsc::UnboundedSender<AgentEvent>) -> Self {
        self.events = Some(sink);
        self
    }

    fn emit(&self, event: AgentEvent) {
        if let Some(sink) = &self.events {
            let _ = sink.send(event);
        }
    }

    fn inference_options(&self) -> InferenceOptions {
        InferenceOptions {
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            ..InferenceOptions::default()
        }
    }

    /// Cancellation and deadline check, run at every loop checkpoint.
    fn checkpoint(&self, builder: &AgentResultBuilder) -> Result<(), AgentError> {
        if self.cancel.is_cancelled() {
            return Err(AgentError::Cancelled);
        }
        if builder.elapsed().as_millis() >= self.config.timeout.as_millis() {
            return Err(AgentError::Timeout(self.config.timeout));
        }
        Ok(())
    }

    async fn report_tripwire(&self, tripped: &Tripped) {
        self.hooks
            .on_guardrail_triggered(&self.info, &tripped.guardrail, &tripped.result)
            .await;
        self.emit(AgentEvent::GuardrailTriggered {
            agent: self.info.name.clone(),
            guardrail: tripped.guardrail.clone(),
            message: tripped.result.message.clone(),
        });
    }

    async fn run_tool(
        &self,
        call: ToolCall,
        context: &ExecutionContext,
        builder: &mut AgentResultBuilder,
        scratchpad: &mut Vec<ScratchpadEntry>,
    ) -> Result<(), AgentError> {
        self.checkpoint(builder)?;
        self.hooks.on_tool_start(&self.info, &call).await;
        self.emit(AgentEvent::ToolCallStarted {
            agent: self.info.name.clone(),
            call: call.clone(),
        });
        scratchpad.push(ScratchpadEntry::Action {
            tool: call.tool_name.clone(),
            arguments_json: serde_json::to_string(&call.arguments).unwrap_or_else(|_| "{}".into()),
        });

        let result = self.tools.dispatch_call(&call, &self.info, context).await?;
        self.hooks.on_tool_end(&self.info, &result).await;

        match &result {
            ToolResult::Success { output, .. } => {
                scratchpad.push(ScratchpadEntry::Observation(output.to_string()));
                self.emit(AgentEvent::ToolCallCompleted {
                    agent: self.info.name.clone(),
                    result: result.clone(),
                });
            }
            ToolResult::Failure { error, .. } => {
                scratchpad.push(ScratchpadEntry::Observation(format!("error: {error}")));
                self.emit(AgentEvent::ToolCallFailed {
                    agent: self.info.name.clone(),
                    tool: call.tool_name.clone(),
                    error: error.clone(),
                });
                if self.config.stop_on_tool_error {
                    return Err(AgentError::ToolExecutionFailed {
                        tool: call.tool_name.clone(),
                        underlying: error.clone(),
                    });
                }
            }
        }

        builder.record_tool_call(call);
        builder.record_tool_result(result);
        Ok(())
    }

    async fn execute(
        &self,
        input: &str,
        context: &ExecutionContext,
    ) -> Result<AgentResult, AgentError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(AgentError::InvalidInput("input is empty".into()));
        }

        self.emit(AgentEvent::Started {
            agent: self.info.name.clone(),
        });
        self.hooks.on_agent_start(&self.info, input).await;

        if let Err(tripped) =
            run_input_guardrails(&self.input_guardrails, input, &self.info, context).await
        {
            self.report_tripwire(&tripped).await;
            return Err(tripped.into_input_error());
        }

        let history = match &self.session {
            Some(session) => session
                .get_items(self.config.session_history_limit)
                .await
                .map_err(|e| AgentError::Internal(format!("session read failed: {e}")))?,
            None => Vec::new(),
        };

        let definitions = self.tools.definitions();
        let mut builder = AgentResultBuilder::new();
        let mut scratchpad: Vec<ScratchpadEntry> = Vec::new();
        let mut final_answer: Option<String> = None;

        while builder.iterations() < self.config.max_iterations {
            self.checkpoint(&builder)?;
            let iteration = builder.begin_iteration();
            debug!(agent = %self.info.name, iteration, "iteration started");
            self.emit(AgentEvent::IterationStarted {
                agent: self.info.name.clone(),
                iteration,
            });

            let prompt = prompt::build_prompt(
                &self.instructions,
                &definitions,
                &history,
                input,
                &scratchpad,
            );

            self.hooks.on_llm_start(&self.info, &prompt).await;
            let provider = self.provider.as_ref().ok_or_else(|| {
                AgentError::ProviderUnavailable("no inference provider configured".into())
            })?;
            let response = provider
                .generate_with_tools(prompt, definitions.clone(), self.inference_options())
                .await
                .map_err(map_provider_error)?;
            self.hooks.on_llm_end(&self.info, &response.content).await;

            if let Some(usage) = response.usage {
                builder.add_usage(usage);
            }
            if let Some(cost) = response.cost {
                builder.add_cost(cost);
            }

            match response.finish_reason {
                FinishReason::MaxTokens => {
                    return Err(AgentError::GenerationFailed(
                        "output truncated (max tokens)".into(),
                    ));
                }
                FinishReason::ContentFilter => {
                    return Err(AgentError::GenerationFailed(
                        "content filtered by provider".into(),
                    ));
                }
                FinishReason::Cancelled => return Err(AgentError::Cancelled),
                FinishReason::Completed | FinishReason::ToolCall => {}
            }

            if !response.tool_calls.is_empty() {
                // Native function calling takes precedence over anything
                // in the text.
                let thought = response.content.trim();
                if !thought.is_empty() {
                    scratchpad.push(ScratchpadEntry::Thought(thought.to_string()));
                }
                for call in response.tool_calls {
                    self.run_tool(call, context, &mut builder, &mut scratchpad)
                        .await?;
                }
            } else {
                match parser::parse(&response.content) {
                    ParsedStep::FinalAnswer(answer) => {
                        self.emit(AgentEvent::IterationCompleted {
                            agent: self.info.name.clone(),
                            iteration,
                        });
                        final_answer = Some(answer);
                        break;
                    }
                    ParsedStep::Action { tool, arguments } => {
                        let call = ToolCall::new(tool, arguments);
                        self.run_tool(call, context, &mut builder, &mut scratchpad)
                            .await?;
                    }
                    ParsedStep::Thinking(text) => {
                        self.emit(AgentEvent::Thinking {
                            agent: self.info.name.clone(),
                            text: text.clone(),
                        });
                        scratchpad.push(ScratchpadEntry::Thought(text));
                    }
                }
            }

            self.emit(AgentEvent::IterationCompleted {
                agent: self.info.name.clone(),
                iteration,
            });
        }

        let answer = match final_answer {
            Some(answer) => answer,
            None => {
                warn!(agent = %self.info.name, "iteration budget exhausted");
                return Err(AgentError::MaxIterationsExceeded(self.config.max_iterations));
            }
        };

        // Output guardrails run before anything is persisted; a rejected
        // answer must leave no trace in session or memory.
        if let Err(tripped) =
            run_output_guardrails(&self.output_guardrails, &answer, &self.info, context).await
        {
            self.report_tripwire(&tripped).await;
            return Err(tripped.into_output_error());
        }

        if let Some(session) = &self.session {
            session
                .add_items(vec![
                    MemoryMessage::user(input),
                    MemoryMessage::assistant(answer.clone()),
                ])
                .await
                .map_err(|e| AgentError::Internal(format!("session write failed: {e}")))?;
        }
        if let Some(memory) = &self.memory {
            memory
                .add(MemoryMessage::assistant(answer.clone()))
                .await
                .map_err(|e| AgentError::Internal(format!("memory write failed: {e}")))?;
        }

        builder.set_output(answer);
        Ok(builder.build())
    }
}

#[async_trait]
impl<P: InferenceProvider + 'static> Agent for ReactAgent<P> {
    fn info(&self) -> AgentInfo {
        self.info.clone()
    }

    async fn run(
        &self,
        input: &str,
        context: &ExecutionContext,
    ) -> Result<AgentResult, AgentError> {
        let outcome = self.execute(input, context).await;
        match &outcome {
            Ok(result) => {
                self.hooks.on_agent_end(&self.info, result).await;
                self.emit(AgentEvent::Completed {
                    agent: self.info.name.clone(),
                    output: result.output.clone(),
                });
            }
            Err(AgentError::Cancelled) => {
                self.hooks.on_error(&self.info, &AgentError::Cancelled).await;
                self.emit(AgentEvent::Cancelled {
                    agent: self.info.name.clone(),
                });
            }
            Err(error) => {
                self.hooks.on_error(&self.info, error).await;
                self.emit(AgentEvent::Failed {
                    agent: self.info.name.clone(),
                    error: error.to_string(),
                });
            }
        }
        outcome
    }

    fn cancel(&self) {
        self.cancel.cancel();
    }
}

fn map_provider_error(error: ProviderError) -> AgentError {
    match error {
        ProviderError::RateLimited { retry_after } => AgentError::RateLimitExceeded { retry_after },
        ProviderError::Unavailable(message) => AgentError::ProviderUnavailable(message),
        other => AgentError::GenerationFailed(other.to_string()),
    }
}

/// Wrap any agent into an event stream: `Started`, then exactly one
/// terminal event. Agents with their own event sink attached emit their
/// fine-grained events through that sink; this wrapper only reports the
/// run envelope.
pub fn stream_run(
    agent: Arc<dyn Agent>,
    input: String,
    context: ExecutionContext,
) -> impl Stream<Item = AgentEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let name = agent.info().name;
        let _ = tx.send(AgentEvent::Started {
            agent: name.clone(),
        });
        match agent.run(&input, &context).await {
            Ok(result) => {
                let _ = tx.send(AgentEvent::Completed {
                    agent: name,
                    output: result.output,
                });
            }
            Err(AgentError::Cancelled) => {
                let _ = tx.send(AgentEvent::Cancelled { agent: name });
            }
            Err(error) => {
                let _ = tx.send(AgentEvent::Failed {
                    agent: name,
                    error: error.to_string(),
                });
            }
        }
    });
    futures_util::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|event| (event, rx))
    })
}
