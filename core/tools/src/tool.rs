//! The tool plugin contract.

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use swell_protocol::ToolDefinition;
use swell_protocol::ToolResultContent;

use crate::context::ToolContext;
use crate::error::ToolError;

/// Visibility gate for a tool in the model-facing config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolGate {
    /// Offered in every mode.
    #[default]
    Always,
    /// Requires a user at the other end; withheld under
    /// `BypassPermissions`.
    Interactive,
    /// Offered only in plan mode (the plan-exit tool).
    PlanOnly,
}

/// What a tool execution produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether execution succeeded.
    pub success: bool,
    /// Result content fed back to the model.
    pub content: ToolResultContent,
    /// Short form for UI, when a long result has a useful summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_result: Option<String>,
    /// Error text for failed executions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Whether the user moved this call to the background mid-flight.
    #[serde(default)]
    pub backgrounded: bool,
}

impl ToolResult {
    /// A successful text result.
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            success: true,
            content: ToolResultContent::Text(content.into()),
            short_result: None,
            error: None,
            backgrounded: false,
        }
    }

    /// A failed result with an error message.
    pub fn failure(error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            success: false,
            content: ToolResultContent::Text(error.clone()),
            short_result: None,
            error: Some(error),
            backgrounded: false,
        }
    }

    /// Set the short result.
    pub fn with_short_result(mut self, short: impl Into<String>) -> Self {
        self.short_result = Some(short.into());
        self
    }

    /// Mark the result as manually backgrounded.
    pub fn with_backgrounded(mut self, backgrounded: bool) -> Self {
        self.backgrounded = backgrounded;
        self
    }
}

/// A tool the agent can execute.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The tool name, unique within the registry.
    fn name(&self) -> &str;

    /// The model-facing definition.
    fn definition(&self) -> ToolDefinition;

    /// Visibility gate. Defaults to [`ToolGate::Always`].
    fn gate(&self) -> ToolGate {
        ToolGate::Always
    }

    /// Execute with parsed arguments.
    async fn execute(
        &self,
        args: Map<String, Value>,
        ctx: &ToolContext,
    ) -> Result<ToolResult, ToolError>;

    /// Short human-readable argument summary for UI.
    ///
    /// Defaults to the designated path field or the shell command, when
    /// present.
    fn format_compact_params(&self, args: &Map<String, Value>, _ctx: &ToolContext) -> Option<String> {
        if let Some(path) = swell_policy::path_field(&Value::Object(args.clone())) {
            return Some(path.to_string());
        }
        args.get("command")
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

#[cfg(test)]
#[path = "tool.test.rs"]
mod tests;
