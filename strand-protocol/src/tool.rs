//! The Tool contract — callable capabilities the model can invoke.

use crate::duration::DurationMs;
use crate::error::ToolError;
use crate::guardrail::{ToolInputGuardrail, ToolOutputGuardrail};
use crate::value::SendableValue;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

/// The type of a single tool parameter. Recursive so tools can declare
/// nested objects and typed arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterType {
    /// A UTF-8 string.
    String,
    /// A signed integer.
    Int,
    /// A 64-bit float.
    Double,
    /// A boolean.
    Bool,
    /// A homogeneous list.
    Array(Box<ParameterType>),
    /// A nested object with its own parameter list.
    Object(Vec<ToolParameter>),
    /// One of a fixed set of string values.
    OneOf(Vec<String>),
    /// Anything — the tool validates for itself.
    Any,
}

/// Declaration of one tool parameter.
///
/// Invariant: parameter names are unique within one tool's list (checked
/// by [`ToolDefinition::validate`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolParameter {
    /// Parameter name.
    pub name: String,
    /// What the parameter means, for the model's benefit.
    pub description: String,
    /// The parameter's type.
    pub param_type: ParameterType,
    /// Whether the caller must supply this parameter.
    pub required: bool,
}

impl ToolParameter {
    /// Create a required parameter.
    pub fn required(
        name: impl Into<String>,
        description: impl Into<String>,
        param_type: ParameterType,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            param_type,
            required: true,
        }
    }

    /// Create an optional parameter.
    pub fn optional(
        name: impl Into<String>,
        description: impl Into<String>,
        param_type: ParameterType,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            param_type,
            required: false,
        }
    }
}

/// What a tool looks like from the outside: name, description, and the
/// parameters it accepts. This is what guardrails and providers see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique name within a registry.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Declared parameters.
    pub parameters: Vec<ToolParameter>,
}

impl ToolDefinition {
    /// Create a new definition.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Vec<ToolParameter>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }

    /// Check the parameter-name uniqueness invariant.
    pub fn validate(&self) -> Result<(), String> {
        let mut seen = std::collections::BTreeSet::new();
        for p in &self.parameters {
            if !seen.insert(p.name.as_str()) {
                return Err(format!(
                    "tool {}: duplicate parameter name {}",
                    self.name, p.name
                ));
            }
        }
        Ok(())
    }

    /// Render a JSON-Schema object for provider-native function calling.
    pub fn input_schema(&self) -> serde_json::Value {
        object_schema(&self.parameters)
    }
}

fn object_schema(parameters: &[ToolParameter]) -> serde_json::Value {
    let mut properties = serde_json::Map::new();
    let mut required = Vec::new();
    for p in parameters {
        properties.insert(p.name.clone(), parameter_schema(p));
        if p.required {
            required.push(serde_json::Value::String(p.name.clone()));
        }
    }
    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn parameter_schema(parameter: &ToolParameter) -> serde_json::Value {
    let mut schema = type_schema(&parameter.param_type);
    if let serde_json::Value::Object(map) = &mut schema {
        map.insert(
            "description".into(),
            serde_json::Value::String(parameter.description.clone()),
        );
    }
    schema
}

fn type_schema(ty: &ParameterType) -> serde_json::Value {
    match ty {
        ParameterType::String => serde_json::json!({"type": "string"}),
        ParameterType::Int => serde_json::json!({"type": "integer"}),
        ParameterType::Double => serde_json::json!({"type": "number"}),
        ParameterType::Bool => serde_json::json!({"type": "boolean"}),
        ParameterType::Array(item) => serde_json::json!({
            "type": "array",
            "items": type_schema(item),
        }),
        ParameterType::Object(fields) => object_schema(fields),
        ParameterType::OneOf(values) => serde_json::json!({
            "type": "string",
            "enum": values,
        }),
        ParameterType::Any => serde_json::json!({}),
    }
}

/// A single dispatched tool invocation. Immutable once created; the id is
/// generated at dispatch time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique id for this call.
    pub id: Uuid,
    /// Name of the tool invoked.
    pub tool_name: String,
    /// Arguments passed to the tool.
    pub arguments: BTreeMap<String, SendableValue>,
}

impl ToolCall {
    /// Create a new call with a fresh id.
    pub fn new(tool_name: impl Into<String>, arguments: BTreeMap<String, SendableValue>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tool_name: tool_name.into(),
            arguments,
        }
    }
}

/// Outcome of exactly one dispatched [`ToolCall`]. Created once, never
/// mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ToolResult {
    /// The tool ran and produced a value.
    Success {
        /// Id of the call this result answers.
        call_id: Uuid,
        /// The tool's output.
        output: SendableValue,
        /// Wall-clock execution time.
        duration: DurationMs,
    },
    /// The tool failed (or never ran, if a guardrail blocked it upstream).
    Failure {
        /// Id of the call this result answers.
        call_id: Uuid,
        /// Description of the failure.
        error: String,
        /// Wall-clock time spent before failing.
        duration: DurationMs,
    },
}

impl ToolResult {
    /// Id of the call this result answers.
    pub fn call_id(&self) -> Uuid {
        match self {
            ToolResult::Success { call_id, .. } | ToolResult::Failure { call_id, .. } => *call_id,
        }
    }

    /// True for the `Success` variant.
    pub fn is_success(&self) -> bool {
        matches!(self, ToolResult::Success { .. })
    }

    /// Wall-clock duration of the call.
    pub fn duration(&self) -> DurationMs {
        match self {
            ToolResult::Success { duration, .. } | ToolResult::Failure { duration, .. } => {
                *duration
            }
        }
    }
}

/// A callable capability.
///
/// Object-safe so registries can hold `Arc<dyn Tool>`. Tools may attach
/// their own guardrails; the registry brackets every execution with them.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name within a registry.
    fn name(&self) -> &str;

    /// Human-readable description, shown to the model in the tool catalog.
    fn description(&self) -> &str;

    /// Declared parameters.
    fn parameters(&self) -> Vec<ToolParameter>;

    /// The full definition. Default assembles it from the parts above.
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description(), self.parameters())
    }

    /// Guardrails run before this tool executes. Default: none.
    fn input_guardrails(&self) -> Vec<Arc<dyn ToolInputGuardrail>> {
        Vec::new()
    }

    /// Guardrails run against this tool's output. Default: none.
    fn output_guardrails(&self) -> Vec<Arc<dyn ToolOutputGuardrail>> {
        Vec::new()
    }

    /// Execute with the given arguments.
    async fn execute(
        &self,
        arguments: BTreeMap<String, SendableValue>,
    ) -> Result<SendableValue, ToolError>;
}
