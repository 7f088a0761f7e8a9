use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Kind of block an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Text,
    Tool,
}

/// Lifecycle phase of a block. Every block id sees exactly one `Create`,
/// zero or more `Append`s, then exactly one `Close`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventMode {
    Create,
    Append,
    Close,
}

/// A finalized tool invocation: the tag's `<name>` content plus the
/// accumulated argument map. Repeated argument names concatenate their
/// values in arrival order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ToolUse {
    pub name: String,
    pub args: BTreeMap<String, String>,
}

/// Unit of parser output, streamed to consumers (UI renderers, the
/// `Toolbox` dispatcher) as chunks arrive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ParserEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub mode: EventMode,
    /// Stable id across all events of one block. Never reused within a
    /// parser instance.
    pub id: String,
    /// Argument name, carried on tool `Append` events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub is_tool_call: bool,
    /// Present only on a completed tool `Close`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<ToolUse>,
}

impl ParserEvent {
    pub fn text_create(id: &str) -> Self {
        Self {
            kind: EventKind::Text,
            mode: EventMode::Create,
            id: id.to_string(),
            arg: None,
            content: None,
            is_tool_call: false,
            tool: None,
        }
    }

    pub fn text_append(id: &str, content: &str) -> Self {
        Self {
            content: Some(content.to_string()),
            ..Self::text_create(id)
        }
        .with_mode(EventMode::Append)
    }

    pub fn text_close(id: &str) -> Self {
        Self::text_create(id).with_mode(EventMode::Close)
    }

    /// Tool create carries the trimmed tool name as its content.
    pub fn tool_create(id: &str, name: &str) -> Self {
        Self {
            kind: EventKind::Tool,
            mode: EventMode::Create,
            id: id.to_string(),
            arg: None,
            content: Some(name.to_string()),
            is_tool_call: true,
            tool: None,
        }
    }

    pub fn tool_append(id: &str, arg: &str, content: &str) -> Self {
        Self {
            mode: EventMode::Append,
            arg: Some(arg.to_string()),
            content: Some(content.to_string()),
            ..Self::tool_create(id, "")
        }
    }

    /// Tool append with no argument attribution, for conventions that
    /// capture whole-tag content rather than named arguments.
    pub fn tool_content(id: &str, content: &str) -> Self {
        Self {
            mode: EventMode::Append,
            content: Some(content.to_string()),
            ..Self::tool_create(id, "")
        }
    }

    pub fn tool_close(id: &str, tool: Option<ToolUse>) -> Self {
        Self {
            mode: EventMode::Close,
            content: None,
            tool,
            ..Self::tool_create(id, "")
        }
    }

    fn with_mode(mut self, mode: EventMode) -> Self {
        self.mode = mode;
        self
    }
}
