//! Parser for textual Thought / Action / Final Answer responses.
//!
//! Providers without native function calling emit tool calls as text in
//! the ReAct format. The parser is deliberately lenient: anything that is
//! not a recognizable final answer or a well-formed action is treated as a
//! thinking step and fed back through the scratchpad, which lets the model
//! correct itself on the next iteration instead of failing the run.

use std::collections::BTreeMap;
use strand_protocol::SendableValue;

/// What one model response asks the loop to do next.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedStep {
    /// The model is done; the payload is the candidate final answer.
    FinalAnswer(String),
    /// The model wants a tool executed.
    Action {
        /// Tool name.
        tool: String,
        /// Arguments for the call.
        arguments: BTreeMap<String, SendableValue>,
    },
    /// A reasoning step (including anything unparseable).
    Thinking(String),
}

const FINAL_ANSWER_MARKER: &str = "Final Answer:";
const ACTION_MARKER: &str = "Action:";
const THOUGHT_MARKER: &str = "Thought:";

/// Parse one model response.
///
/// `Final Answer:` takes priority over `Action:` — a response containing
/// both is a completed run, matching how models wrap up after their last
/// observation.
pub fn parse(response: &str) -> ParsedStep {
    if let Some(idx) = response.find(FINAL_ANSWER_MARKER) {
        let answer = response[idx + FINAL_ANSWER_MARKER.len()..].trim();
        return ParsedStep::FinalAnswer(answer.to_string());
    }

    if let Some(idx) = response.find(ACTION_MARKER) {
        let rest = &response[idx + ACTION_MARKER.len()..];
        if let Some(step) = parse_action(rest) {
            return step;
        }
        // Malformed action: a thinking step, so the scratchpad shows the
        // model what it produced.
        return ParsedStep::Thinking(response.trim().to_string());
    }

    let thought = response
        .trim()
        .strip_prefix(THOUGHT_MARKER)
        .map(str::trim)
        .unwrap_or_else(|| response.trim());
    ParsedStep::Thinking(thought.to_string())
}

/// Parse the JSON object after an `Action:` marker. The object may span
/// multiple lines; parsing stops at the end of the first JSON value.
fn parse_action(rest: &str) -> Option<ParsedStep> {
    let start = rest.find('{')?;
    let value: serde_json::Value = serde_json::Deserializer::from_str(&rest[start..])
        .into_iter()
        .next()?
        .ok()?;

    let tool = value.get("tool")?.as_str()?.to_string();
    let arguments = match value.get("arguments") {
        Some(serde_json::Value::Object(map)) => map
            .iter()
            .map(|(k, v)| (k.clone(), SendableValue::from_json(v.clone())))
            .collect(),
        None | Some(serde_json::Value::Null) => BTreeMap::new(),
        Some(_) => return None,
    };
    Some(ParsedStep::Action { tool, arguments })
}
