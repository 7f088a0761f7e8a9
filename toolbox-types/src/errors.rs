use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ParserError {
    /// A syntactically complete `<name>...</name>` block whose trimmed
    /// content is empty. The block cannot be attributed to any tool, so
    /// the caller must treat the whole input as invalid.
    #[error("Tool name is empty")]
    EmptyToolName,
}

/// Per-argument validation failure, collected so one bad argument does not
/// mask the others.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgError {
    pub name: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolboxError {
    #[error("Tool not found: {0}")]
    UnknownTool(String),
    #[error("Tool already registered: {0}")]
    Conflict(String),
    #[error("Validation failed for {} argument(s)", .0.len())]
    Validation(Vec<ArgError>),
    #[error("Tool execution failed: {0}")]
    Execution(String),
}
