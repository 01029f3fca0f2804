//! Guardrail execution pipeline.
//!
//! Guardrails are declared on agents and tools; this crate runs them. The
//! four roles share one outcome model: every check yields a
//! [`GuardrailResult`], and a tripwire is surfaced as a [`Tripped`] value
//! that the caller maps into the matching `AgentError::*Tripwire` variant
//! after firing its hooks.
//!
//! Ordering contract:
//! - Input guardrails run in two phases. Gates (`run_in_parallel() ==
//!   false`) run sequentially in declaration order and short-circuit on
//!   the first tripwire. The remaining guardrails then run concurrently;
//!   the first tripwire in completion order wins, but every in-flight
//!   check is drained before the verdict is returned.
//! - Output and tool guardrails run sequentially in declaration order and
//!   short-circuit on the first tripwire.

use futures_util::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use strand_protocol::{
    AgentError, AgentInfo, ExecutionContext, GuardrailResult, InputGuardrail, OutputGuardrail,
    SendableValue, ToolGuardrailData, ToolInputGuardrail, ToolOutputGuardrail, TripwireInfo,
};
use tracing::{debug, warn};

/// A guardrail demanded a hard stop.
///
/// Carries the full [`GuardrailResult`] so callers can hand it to
/// observability hooks before converting into the error taxonomy.
#[derive(Debug, Clone, PartialEq)]
pub struct Tripped {
    /// Name of the guardrail that tripped.
    pub guardrail: String,
    /// The verdict as the guardrail produced it.
    pub result: GuardrailResult,
}

impl Tripped {
    fn new(guardrail: &str, result: GuardrailResult) -> Self {
        Self {
            guardrail: guardrail.to_string(),
            result,
        }
    }

    /// The diagnostic payload carried by tripwire errors.
    pub fn info(&self) -> TripwireInfo {
        TripwireInfo::new(
            self.guardrail.clone(),
            self.result.message.clone(),
            self.result.output_info.clone(),
        )
    }

    /// Convert into [`AgentError::InputTripwire`].
    pub fn into_input_error(self) -> AgentError {
        AgentError::InputTripwire(self.info())
    }

    /// Convert into [`AgentError::OutputTripwire`].
    pub fn into_output_error(self) -> AgentError {
        AgentError::OutputTripwire(self.info())
    }

    /// Convert into [`AgentError::ToolInputTripwire`].
    pub fn into_tool_input_error(self) -> AgentError {
        AgentError::ToolInputTripwire(self.info())
    }

    /// Convert into [`AgentError::ToolOutputTripwire`].
    pub fn into_tool_output_error(self) -> AgentError {
        AgentError::ToolOutputTripwire(self.info())
    }
}

/// Run the input guardrails for a run that is about to start.
///
/// Returns `Ok(())` when every guardrail passed, or the first [`Tripped`]
/// verdict per the ordering contract in the crate docs.
pub async fn run_input_guardrails(
    guardrails: &[Arc<dyn InputGuardrail>],
    input: &str,
    agent: &AgentInfo,
    context: &ExecutionContext,
) -> Result<(), Tripped> {
    // Phase 1: gates, sequential, declaration order.
    for guardrail in guardrails.iter().filter(|g| !g.run_in_parallel()) {
        debug!(guardrail = guardrail.name(), agent = %agent.name, "input gate");
        let result = guardrail.validate(input, agent, context).await;
        if result.tripwire_triggered {
            warn!(guardrail = guardrail.name(), "input guardrail tripped");
            return Err(Tripped::new(guardrail.name(), result));
        }
    }

    // Phase 2: the rest, concurrent. First tripwire in completion order
    // wins; drain everything so no check is left running.
    let mut pending: FuturesUnordered<_> = guardrails
        .iter()
        .filter(|g| g.run_in_parallel())
        .map(|g| async move { (g.name().to_string(), g.validate(input, agent, context).await) })
        .collect();

    let mut tripped: Option<Tripped> = None;
    while let Some((name, result)) = pending.next().await {
        if result.tripwire_triggered && tripped.is_none() {
            warn!(guardrail = %name, "input guardrail tripped");
            tripped = Some(Tripped { guardrail: name, result });
        }
    }

    match tripped {
        Some(t) => Err(t),
        None => Ok(()),
    }
}

/// Run the output guardrails over a candidate final answer. Sequential,
/// declaration order, short-circuits on the first tripwire.
pub async fn run_output_guardrails(
    guardrails: &[Arc<dyn OutputGuardrail>],
    output: &str,
    agent: &AgentInfo,
    context: &ExecutionContext,
) -> Result<(), Tripped> {
    for guardrail in guardrails {
        debug!(guardrail = guardrail.name(), agent = %agent.name, "output guardrail");
        let result = guardrail.validate(output, agent, context).await;
        if result.tripwire_triggered {
            warn!(guardrail = guardrail.name(), "output guardrail tripped");
            return Err(Tripped::new(guardrail.name(), result));
        }
    }
    Ok(())
}

/// Run a tool's input guardrails before it executes. A tripwire means the
/// tool is never invoked.
pub async fn run_tool_input_guardrails(
    guardrails: &[Arc<dyn ToolInputGuardrail>],
    data: &ToolGuardrailData,
    context: &ExecutionContext,
) -> Result<(), Tripped> {
    for guardrail in guardrails {
        debug!(guardrail = guardrail.name(), tool = %data.tool.name, "tool input guardrail");
        let result = guardrail.validate(data, context).await;
        if result.tripwire_triggered {
            warn!(guardrail = guardrail.name(), tool = %data.tool.name, "tool input guardrail tripped");
            return Err(Tripped::new(guardrail.name(), result));
        }
    }
    Ok(())
}

/// Run a tool's output guardrails over a successful result. A tripwire
/// means the call succeeded but its result must not be trusted.
pub async fn run_tool_output_guardrails(
    guardrails: &[Arc<dyn ToolOutputGuardrail>],
    data: &ToolGuardrailData,
    output: &SendableValue,
    context: &ExecutionContext,
) -> Result<(), Tripped> {
    for guardrail in guardrails {
        debug!(guardrail = guardrail.name(), tool = %data.tool.name, "tool output guardrail");
        let result = guardrail.validate(data, output, context).await;
        if result.tripwire_triggered {
            warn!(guardrail = guardrail.name(), tool = %data.tool.name, "tool output guardrail tripped");
            return Err(Tripped::new(guardrail.name(), result));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use strand_protocol::ToolDefinition;

    struct Recorded {
        name: String,
        parallel: bool,
        trip: bool,
        log: Arc<Mutex<Vec<String>>>,
        calls: Arc<AtomicUsize>,
    }

    impl Recorded {
        fn new(
            name: &str,
            parallel: bool,
            trip: bool,
            log: Arc<Mutex<Vec<String>>>,
        ) -> (Arc<dyn InputGuardrail>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Arc::new(Self {
                    name: name.to_string(),
                    parallel,
                    trip,
                    log,
                    calls: calls.clone(),
                }),
                calls,
            )
        }
    }

    #[async_trait]
    impl InputGuardrail for Recorded {
        fn name(&self) -> &str {
            &self.name
        }

        fn run_in_parallel(&self) -> bool {
            self.parallel
        }

        async fn validate(
            &self,
            _input: &str,
            _agent: &AgentInfo,
            _context: &ExecutionContext,
        ) -> GuardrailResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.log.lock().unwrap().push(self.name.clone());
            if self.trip {
                GuardrailResult::tripwire(format!("{} says no", self.name))
            } else {
                GuardrailResult::passed()
            }
        }
    }

    struct StaticOutput {
        trip: bool,
    }

    #[async_trait]
    impl OutputGuardrail for StaticOutput {
        fn name(&self) -> &str {
            "static_output"
        }

        async fn validate(
            &self,
            _output: &str,
            _agent: &AgentInfo,
            _context: &ExecutionContext,
        ) -> GuardrailResult {
            if self.trip {
                GuardrailResult::tripwire("rejected")
            } else {
                GuardrailResult::passed()
            }
        }
    }

    fn ctx() -> ExecutionContext {
        ExecutionContext::new()
    }

    fn agent() -> AgentInfo {
        AgentInfo::new("test", "test agent")
    }

    #[tokio::test]
    async fn all_pass() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (a, _) = Recorded::new("a", false, false, log.clone());
        let (b, _) = Recorded::new("b", true, false, log.clone());
        let verdict = run_input_guardrails(&[a, b], "hi", &agent(), &ctx()).await;
        assert!(verdict.is_ok());
        assert_eq!(log.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn gate_tripwire_skips_parallel_phase() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (gate, _) = Recorded::new("gate", false, true, log.clone());
        let (par, par_calls) = Recorded::new("par", true, false, log.clone());
        let verdict = run_input_guardrails(&[par, gate], "hi", &agent(), &ctx()).await;
        let tripped = verdict.unwrap_err();
        assert_eq!(tripped.guardrail, "gate");
        // Gates run first regardless of declaration position of the
        // parallel guardrails, and a gate tripwire stops everything.
        assert_eq!(par_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn gates_run_in_declaration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (first, _) = Recorded::new("first", false, false, log.clone());
        let (second, _) = Recorded::new("second", false, true, log.clone());
        let (third, third_calls) = Recorded::new("third", false, false, log.clone());
        let verdict = run_input_guardrails(&[first, second, third], "hi", &agent(), &ctx()).await;
        assert_eq!(verdict.unwrap_err().guardrail, "second");
        assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
        assert_eq!(third_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn parallel_phase_drains_everything_on_tripwire() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (a, a_calls) = Recorded::new("a", true, true, log.clone());
        let (b, b_calls) = Recorded::new("b", true, false, log.clone());
        let verdict = run_input_guardrails(&[a, b], "hi", &agent(), &ctx()).await;
        assert!(verdict.unwrap_err().result.tripwire_triggered);
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn tripped_converts_to_each_error_variant() {
        let t = Tripped {
            guardrail: "g".into(),
            result: GuardrailResult::tripwire("no"),
        };
        assert!(matches!(
            t.clone().into_input_error(),
            AgentError::InputTripwire(_)
        ));
        assert!(matches!(
            t.clone().into_output_error(),
            AgentError::OutputTripwire(_)
        ));
        assert!(matches!(
            t.clone().into_tool_input_error(),
            AgentError::ToolInputTripwire(_)
        ));
        assert!(matches!(
            t.into_tool_output_error(),
            AgentError::ToolOutputTripwire(_)
        ));
    }

    #[tokio::test]
    async fn output_guardrails_short_circuit() {
        let ok: Arc<dyn OutputGuardrail> = Arc::new(StaticOutput { trip: false });
        let bad: Arc<dyn OutputGuardrail> = Arc::new(StaticOutput { trip: true });
        assert!(
            run_output_guardrails(&[ok.clone()], "out", &agent(), &ctx())
                .await
                .is_ok()
        );
        let tripped = run_output_guardrails(&[ok, bad], "out", &agent(), &ctx())
            .await
            .unwrap_err();
        assert_eq!(tripped.result.message.as_deref(), Some("rejected"));
    }

    struct BlockSecrets;

    #[async_trait]
    impl ToolInputGuardrail for BlockSecrets {
        fn name(&self) -> &str {
            "block_secrets"
        }

        async fn validate(
            &self,
            data: &ToolGuardrailData,
            _context: &ExecutionContext,
        ) -> GuardrailResult {
            let has_secret = data
                .arguments
                .values()
                .filter_map(|v| v.as_str())
                .any(|s| s.contains("secret"));
            if has_secret {
                GuardrailResult::tripwire("secret in arguments")
            } else {
                GuardrailResult::passed()
            }
        }
    }

    #[tokio::test]
    async fn tool_input_guardrail_inspects_arguments() {
        let guard: Arc<dyn ToolInputGuardrail> = Arc::new(BlockSecrets);
        let mut arguments = std::collections::BTreeMap::new();
        arguments.insert("q".to_string(), SendableValue::from("the secret value"));
        let data = ToolGuardrailData {
            tool: ToolDefinition::new("search", "find things", vec![]),
            arguments,
            agent: agent(),
        };
        let tripped = run_tool_input_guardrails(&[guard.clone()], &data, &ctx())
            .await
            .unwrap_err();
        assert_eq!(tripped.guardrail, "block_secrets");

        let clean = ToolGuardrailData {
            tool: data.tool.clone(),
            arguments: std::collections::BTreeMap::new(),
            agent: agent(),
        };
        assert!(
            run_tool_input_guardrails(&[guard], &clean, &ctx())
                .await
                .is_ok()
        );
    }
}
