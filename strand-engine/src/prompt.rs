//! Deterministic prompt assembly for the ReAct loop.
//!
//! The same instructions, tools, history, and scratchpad always render the
//! same prompt text. Tools are listed alphabetically (registry order) and
//! history chronologically, so runs are reproducible given a scripted
//! provider.

use std::fmt::Write;
use strand_protocol::{MemoryMessage, MessageRole, ToolDefinition};

/// One entry in the working scratchpad.
#[derive(Debug, Clone, PartialEq)]
pub enum ScratchpadEntry {
    /// A reasoning step from the model.
    Thought(String),
    /// A tool call, rendered back as the model expressed it.
    Action {
        /// Tool name.
        tool: String,
        /// Arguments, rendered as compact JSON.
        arguments_json: String,
    },
    /// What the tool said (or how it failed).
    Observation(String),
}

impl ScratchpadEntry {
    fn render(&self, out: &mut String) {
        match self {
            ScratchpadEntry::Thought(text) => {
                let _ = writeln!(out, "Thought: {text}");
            }
            ScratchpadEntry::Action {
                tool,
                arguments_json,
            } => {
                let _ = writeln!(
                    out,
                    "Action: {{\"tool\": \"{tool}\", \"arguments\": {arguments_json}}}"
                );
            }
            ScratchpadEntry::Observation(text) => {
                let _ = writeln!(out, "Observation: {text}");
            }
        }
    }
}

fn role_label(role: MessageRole) -> &'static str {
    match role {
        MessageRole::User => "user",
        MessageRole::Assistant => "assistant",
        MessageRole::System => "system",
        MessageRole::Tool => "tool",
    }
}

/// Build the full prompt for one model call.
pub fn build_prompt(
    instructions: &str,
    tools: &[ToolDefinition],
    history: &[MemoryMessage],
    input: &str,
    scratchpad: &[ScratchpadEntry],
) -> String {
    let mut prompt = String::new();

    if !instructions.is_empty() {
        prompt.push_str(instructions.trim_end());
        prompt.push_str("\n\n");
    }

    if !tools.is_empty() {
        prompt.push_str("You have access to the following tools:\n");
        for tool in tools {
            let _ = writeln!(prompt, "- {}: {}", tool.name, tool.description);
            let _ = writeln!(prompt, "  parameters: {}", tool.input_schema());
        }
        prompt.push_str(
            "\nUse this format:\n\
             Thought: your reasoning\n\
             Action: {\"tool\": \"<name>\", \"arguments\": {...}}\n\
             ... wait for the Observation, then continue ...\n\
             Final Answer: your answer to the question\n\n\
             When you can answer without a tool, reply with the Final Answer directly.\n\n",
        );
    } else {
        prompt.push_str(
            "When you have the answer, reply with:\nFinal Answer: your answer\n\n",
        );
    }

    if !history.is_empty() {
        prompt.push_str("Previous conversation:\n");
        for message in history {
            let _ = writeln!(prompt, "{}: {}", role_label(message.role), message.content);
        }
        prompt.push('\n');
    }

    let _ = writeln!(prompt, "Question: {input}");

    for entry in scratchpad {
        entry.render(&mut prompt);
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use strand_protocol::{ParameterType, ToolParameter};

    fn weather() -> ToolDefinition {
        ToolDefinition::new(
            "get_weather",
            "Look up current weather",
            vec![ToolParameter::required(
                "city",
                "City name",
                ParameterType::String,
            )],
        )
    }

    #[test]
    fn deterministic() {
        let tools = vec![weather()];
        let a = build_prompt("Be brief.", &tools, &[], "weather in Oslo?", &[]);
        let b = build_prompt("Be brief.", &tools, &[], "weather in Oslo?", &[]);
        assert_eq!(a, b);
    }

    #[test]
    fn contains_all_sections() {
        let history = vec![
            MemoryMessage::user("hello"),
            MemoryMessage::assistant("hi there"),
        ];
        let scratchpad = vec![
            ScratchpadEntry::Thought("need the weather".into()),
            ScratchpadEntry::Action {
                tool: "get_weather".into(),
                arguments_json: "{\"city\":\"Oslo\"}".into(),
            },
            ScratchpadEntry::Observation("{\"temp_c\":4}".into()),
        ];
        let prompt = build_prompt(
            "Be brief.",
            &[weather()],
            &history,
            "weather in Oslo?",
            &scratchpad,
        );
        assert!(prompt.starts_with("Be brief."));
        assert!(prompt.contains("- get_weather: Look up current weather"));
        assert!(prompt.contains("user: hello"));
        assert!(prompt.contains("assistant: hi there"));
        assert!(prompt.contains("Question: weather in Oslo?"));
        assert!(prompt.contains("Thought: need the weather"));
        assert!(prompt.contains("Observation: {\"temp_c\":4}"));
        // Scratchpad follows the question so the model continues the trace.
        assert!(prompt.rfind("Question:").unwrap() < prompt.rfind("Observation:").unwrap());
    }

    #[test]
    fn no_tool_section_without_tools() {
        let prompt = build_prompt("", &[], &[], "hi", &[]);
        assert!(!prompt.contains("following tools"));
        assert!(prompt.contains("Final Answer:"));
        assert!(prompt.contains("Question: hi"));
    }
}
