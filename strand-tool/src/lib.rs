//! Tool registry and guarded dispatch.
//!
//! The registry owns the catalog of callable tools. [`ToolRegistry::dispatch`]
//! is the one path a tool call takes: lookup, argument validation, input
//! guardrails, timed execution, output guardrails. A tool failure is data
//! (a [`ToolResult::Failure`] the loop can show the model); a missing tool
//! or a tripped guardrail is a typed error that fails the run.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use strand_guard::{run_tool_input_guardrails, run_tool_output_guardrails};
use strand_protocol::{
    AgentError, AgentInfo, DurationMs, ExecutionContext, SendableValue, Tool, ToolCall,
    ToolDefinition, ToolGuardrailData, ToolResult,
};
use tracing::{debug, warn};

/// The catalog of tools available to one agent.
///
/// Names are unique; registering a name twice replaces the earlier tool.
/// Iteration order (and therefore the catalog shown to the model) is
/// alphabetical by name, so prompts are deterministic.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ToolRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Last write wins on name collision.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_some() {
            warn!(tool = %name, "replacing previously registered tool");
        }
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Definitions of every registered tool, alphabetical by name.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.definition()).collect()
    }

    /// Dispatch one tool call through the full pipeline.
    ///
    /// Returns the [`ToolCall`] record (with its fresh id) together with
    /// the result. A failing tool yields `Ok` with a
    /// [`ToolResult::Failure`] — whether that ends the run is the loop's
    /// policy, not the registry's. Errors are reserved for the cases the
    /// loop cannot continue past: unknown tool, invalid arguments, or a
    /// tripped guardrail.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: BTreeMap<String, SendableValue>,
        agent: &AgentInfo,
        context: &ExecutionContext,
    ) -> Result<(ToolCall, ToolResult), AgentError> {
        let call = ToolCall::new(name, arguments);
        let result = self.dispatch_call(&call, agent, context).await?;
        Ok((call, result))
    }

    /// Dispatch a pre-built [`ToolCall`], preserving its id. The loop uses
    /// this so hooks and events see the same id the result answers.
    pub async fn dispatch_call(
        &self,
        call: &ToolCall,
        agent: &AgentInfo,
        context: &ExecutionContext,
    ) -> Result<ToolResult, AgentError> {
        let name = call.tool_name.as_str();
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| AgentError::ToolNotFound(name.to_string()))?;
        let definition = tool.definition();

        check_required_arguments(&definition, &call.arguments)?;

        debug!(tool = %name, call_id = %call.id, "dispatching tool call");

        let data = ToolGuardrailData {
            tool: definition,
            arguments: call.arguments.clone(),
            agent: agent.clone(),
        };

        run_tool_input_guardrails(&tool.input_guardrails(), &data, context)
            .await
            .map_err(|t| t.into_tool_input_error())?;

        let started = Instant::now();
        match tool.execute(call.arguments.clone()).await {
            Ok(output) => {
                let duration = DurationMs::from(started.elapsed());
                run_tool_output_guardrails(&tool.output_guardrails(), &data, &output, context)
                    .await
                    .map_err(|t| t.into_tool_output_error())?;
                debug!(tool = %name, call_id = %call.id, %duration, "tool call succeeded");
                Ok(ToolResult::Success {
                    call_id: call.id,
                    output,
                    duration,
                })
            }
            Err(error) => {
                let duration = DurationMs::from(started.elapsed());
                warn!(tool = %name, call_id = %call.id, %error, "tool call failed");
                Ok(ToolResult::Failure {
                    call_id: call.id,
                    error: error.to_string(),
                    duration,
                })
            }
        }
    }
}

fn check_required_arguments(
    definition: &ToolDefinition,
    arguments: &BTreeMap<String, SendableValue>,
) -> Result<(), AgentError> {
    for parameter in definition.parameters.iter().filter(|p| p.required) {
        match arguments.get(&parameter.name) {
            Some(value) if !value.is_null() => {}
            _ => {
                return Err(AgentError::InvalidToolArguments {
                    tool: definition.name.clone(),
                    reason: format!("missing required parameter {}", parameter.name),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use strand_protocol::{
        GuardrailResult, ParameterType, ToolError, ToolInputGuardrail, ToolOutputGuardrail,
        ToolParameter,
    };

    struct Adder;

    #[async_trait]
    impl Tool for Adder {
        fn name(&self) -> &str {
            "add"
        }

        fn description(&self) -> &str {
            "Add two integers"
        }

        fn parameters(&self) -> Vec<ToolParameter> {
            vec![
                ToolParameter::required("a", "Left operand", ParameterType::Int),
                ToolParameter::required("b", "Right operand", ParameterType::Int),
            ]
        }

        async fn execute(
            &self,
            arguments: BTreeMap<String, SendableValue>,
        ) -> Result<SendableValue, ToolError> {
            let a = arguments
                .get("a")
                .and_then(|v| v.as_int())
                .ok_or_else(|| ToolError::InvalidArguments("a must be an int".into()))?;
            let b = arguments
                .get("b")
                .and_then(|v| v.as_int())
                .ok_or_else(|| ToolError::InvalidArguments("b must be an int".into()))?;
            Ok(SendableValue::Int(a + b))
        }
    }

    struct Exploder;

    #[async_trait]
    impl Tool for Exploder {
        fn name(&self) -> &str {
            "explode"
        }

        fn description(&self) -> &str {
            "Always fails"
        }

        fn parameters(&self) -> Vec<ToolParameter> {
            vec![]
        }

        async fn execute(
            &self,
            _arguments: BTreeMap<String, SendableValue>,
        ) -> Result<SendableValue, ToolError> {
            Err(ToolError::Execution("boom".into()))
        }
    }

    fn args(pairs: &[(&str, i64)]) -> BTreeMap<String, SendableValue> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), SendableValue::Int(*v)))
            .collect()
    }

    fn agent() -> AgentInfo {
        AgentInfo::new("t", "test agent")
    }

    fn ctx() -> ExecutionContext {
        ExecutionContext::new()
    }

    #[tokio::test]
    async fn dispatch_success() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Adder));
        let (call, result) = registry
            .dispatch("add", args(&[("a", 2), ("b", 3)]), &agent(), &ctx())
            .await
            .unwrap();
        assert_eq!(call.tool_name, "add");
        assert_eq!(result.call_id(), call.id);
        match result {
            ToolResult::Success { output, .. } => assert_eq!(output, SendableValue::Int(5)),
            ToolResult::Failure { .. } => panic!("expected success"),
        }
    }

    #[tokio::test]
    async fn unknown_tool_is_fatal() {
        let registry = ToolRegistry::new();
        let err = registry
            .dispatch("nope", BTreeMap::new(), &agent(), &ctx())
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::ToolNotFound(name) if name == "nope"));
    }

    #[tokio::test]
    async fn missing_required_argument_is_fatal() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Adder));
        let err = registry
            .dispatch("add", args(&[("a", 2)]), &agent(), &ctx())
            .await
            .unwrap_err();
        match err {
            AgentError::InvalidToolArguments { tool, reason } => {
                assert_eq!(tool, "add");
                assert!(reason.contains("b"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn null_for_required_argument_is_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Adder));
        let mut arguments = args(&[("a", 2)]);
        arguments.insert("b".into(), SendableValue::Null);
        let err = registry
            .dispatch("add", arguments, &agent(), &ctx())
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::InvalidToolArguments { .. }));
    }

    #[tokio::test]
    async fn tool_failure_is_data_not_error() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Exploder));
        let (_, result) = registry
            .dispatch("explode", BTreeMap::new(), &agent(), &ctx())
            .await
            .unwrap();
        match result {
            ToolResult::Failure { error, .. } => assert!(error.contains("boom")),
            ToolResult::Success { .. } => panic!("expected failure"),
        }
    }

    struct GuardedTool {
        input_trips: bool,
        output_trips: bool,
        executions: Arc<AtomicUsize>,
    }

    struct TripInput;
    struct PassInput;
    struct TripOutput;

    #[async_trait]
    impl ToolInputGuardrail for TripInput {
        fn name(&self) -> &str {
            "trip_input"
        }

        async fn validate(
            &self,
            _data: &ToolGuardrailData,
            _context: &ExecutionContext,
        ) -> GuardrailResult {
            GuardrailResult::tripwire("blocked before execution")
        }
    }

    #[async_trait]
    impl ToolInputGuardrail for PassInput {
        fn name(&self) -> &str {
            "pass_input"
        }

        async fn validate(
            &self,
            _data: &ToolGuardrailData,
            _context: &ExecutionContext,
        ) -> GuardrailResult {
            GuardrailResult::passed()
        }
    }

    #[async_trait]
    impl ToolOutputGuardrail for TripOutput {
        fn name(&self) -> &str {
            "trip_output"
        }

        async fn validate(
            &self,
            _data: &ToolGuardrailData,
            _output: &SendableValue,
            _context: &ExecutionContext,
        ) -> GuardrailResult {
            GuardrailResult::tripwire("untrusted result")
        }
    }

    #[async_trait]
    impl Tool for GuardedTool {
        fn name(&self) -> &str {
            "guarded"
        }

        fn description(&self) -> &str {
            "Tool with guardrails attached"
        }

        fn parameters(&self) -> Vec<ToolParameter> {
            vec![]
        }

        fn input_guardrails(&self) -> Vec<Arc<dyn ToolInputGuardrail>> {
            if self.input_trips {
                vec![Arc::new(PassInput), Arc::new(TripInput)]
            } else {
                vec![Arc::new(PassInput)]
            }
        }

        fn output_guardrails(&self) -> Vec<Arc<dyn ToolOutputGuardrail>> {
            if self.output_trips {
                vec![Arc::new(TripOutput)]
            } else {
                vec![]
            }
        }

        async fn execute(
            &self,
            _arguments: BTreeMap<String, SendableValue>,
        ) -> Result<SendableValue, ToolError> {
            self.executions.fetch_add(1, Ordering::SeqCst);
            Ok(SendableValue::from("result"))
        }
    }

    #[tokio::test]
    async fn input_tripwire_prevents_execution() {
        let executions = Arc::new(AtomicUsize::new(0));
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(GuardedTool {
            input_trips: true,
            output_trips: false,
            executions: executions.clone(),
        }));
        let err = registry
            .dispatch("guarded", BTreeMap::new(), &agent(), &ctx())
            .await
            .unwrap_err();
        match err {
            AgentError::ToolInputTripwire(info) => assert_eq!(info.guardrail, "trip_input"),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(executions.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn output_tripwire_after_execution() {
        let executions = Arc::new(AtomicUsize::new(0));
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(GuardedTool {
            input_trips: false,
            output_trips: true,
            executions: executions.clone(),
        }));
        let err = registry
            .dispatch("guarded", BTreeMap::new(), &agent(), &ctx())
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::ToolOutputTripwire(_)));
        assert_eq!(executions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_execution_skips_output_guardrails() {
        // Failure path never sees output guardrails: Exploder has none,
        // so pair a tripping output guardrail with a failing execute.
        struct FailingGuarded;

        #[async_trait]
        impl Tool for FailingGuarded {
            fn name(&self) -> &str {
                "failing_guarded"
            }

            fn description(&self) -> &str {
                "Fails, with an output guardrail that would trip"
            }

            fn parameters(&self) -> Vec<ToolParameter> {
                vec![]
            }

            fn output_guardrails(&self) -> Vec<Arc<dyn ToolOutputGuardrail>> {
                vec![Arc::new(TripOutput)]
            }

            async fn execute(
                &self,
                _arguments: BTreeMap<String, SendableValue>,
            ) -> Result<SendableValue, ToolError> {
                Err(ToolError::Execution("boom".into()))
            }
        }

        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(FailingGuarded));
        let (_, result) = registry
            .dispatch("failing_guarded", BTreeMap::new(), &agent(), &ctx())
            .await
            .unwrap();
        assert!(!result.is_success());
    }

    #[test]
    fn definitions_are_alphabetical() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Exploder));
        registry.register(Arc::new(Adder));
        let names: Vec<_> = registry.definitions().iter().map(|d| d.name.clone()).collect();
        assert_eq!(names, vec!["add", "explode"]);
    }

    #[test]
    fn register_replaces_on_name_collision() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Adder));
        registry.register(Arc::new(Adder));
        assert_eq!(registry.len(), 1);
    }
}
