//! Model-facing tool types.

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// A tool definition as advertised to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name, unique within one request.
    pub name: String,
    /// Human/model-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON schema for the tool input.
    pub parameters: Value,
}

impl ToolDefinition {
    /// Create a definition with a name and input schema.
    pub fn new(name: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: None,
            parameters,
        }
    }

    /// Create a full definition with a description.
    pub fn full(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: Some(description.into()),
            parameters,
        }
    }
}

/// Content of a tool result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolResultContent {
    /// Plain text content.
    Text(String),
    /// Structured JSON content.
    Structured(Value),
}

impl ToolResultContent {
    /// Render the content as text for the model.
    pub fn as_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Structured(value) => value.to_string(),
        }
    }
}

impl Default for ToolResultContent {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

#[cfg(test)]
#[path = "tool_types.test.rs"]
mod tests;
