use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ToolUse, ToolboxError};

/// Declared type of a tool argument. Parsed argument values arrive as
/// strings and are coerced before dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ArgType {
    String,
    Integer,
    Number,
    Boolean,
}

impl Default for ArgType {
    fn default() -> Self {
        ArgType::String
    }
}

impl ArgType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArgType::String => "string",
            ArgType::Integer => "integer",
            ArgType::Number => "number",
            ArgType::Boolean => "boolean",
        }
    }

    /// Coerce a raw string value into its declared JSON type.
    ///
    /// Booleans follow the lenient convention: `true`/`1`/`yes` (any case)
    /// are true, anything else is false.
    pub fn coerce(&self, raw: &str) -> Result<Value, String> {
        match self {
            ArgType::String => Ok(Value::String(raw.to_string())),
            ArgType::Integer => raw
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .map_err(|e| format!("invalid integer '{}': {}", raw, e)),
            ArgType::Number => {
                let n = raw
                    .trim()
                    .parse::<f64>()
                    .map_err(|e| format!("invalid number '{}': {}", raw, e))?;
                serde_json::Number::from_f64(n)
                    .map(Value::Number)
                    .ok_or_else(|| format!("non-finite number '{}'", raw))
            }
            ArgType::Boolean => {
                let truthy = matches!(
                    raw.trim().to_ascii_lowercase().as_str(),
                    "true" | "1" | "yes"
                );
                Ok(Value::Bool(truthy))
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ArgSpec {
    #[serde(rename = "type", default)]
    pub arg_type: ArgType,
    #[serde(default)]
    pub description: String,
}

/// Tool metadata surfaced to prompt formatters and used by the dispatcher
/// to validate incoming arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub args: BTreeMap<String, ArgSpec>,
}

/// Outcome of dispatching one completed tool invocation. Failures are
/// reported structurally so one invalid call does not abort a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub tool: ToolUse,
    pub result: Option<Value>,
    pub error: Option<ToolboxError>,
}

impl ToolResponse {
    pub fn ok(tool: ToolUse, result: Value) -> Self {
        Self {
            tool,
            result: Some(result),
            error: None,
        }
    }

    pub fn failed(tool: ToolUse, error: ToolboxError) -> Self {
        Self {
            tool,
            result: None,
            error: Some(error),
        }
    }
}
