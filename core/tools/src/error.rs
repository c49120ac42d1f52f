//! Tool execution error types.

use thiserror::Error;

/// Errors raised by tool plugins and the dispatcher.
#[derive(Debug, Error)]
pub enum ToolError {
    /// No tool with the requested name is registered.
    #[error("Tool not found: {name}")]
    NotFound {
        /// The unknown tool name.
        name: String,
    },

    /// The input failed the tool's own validation.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// What was wrong.
        message: String,
    },

    /// The tool ran and failed.
    #[error("Execution failed: {message}")]
    ExecutionFailed {
        /// The failure description.
        message: String,
    },

    /// Execution was cancelled through the tools token.
    #[error("Cancelled")]
    Cancelled,

    /// No MCP executor is wired but an MCP tool was called.
    #[error("MCP executor not configured")]
    McpUnavailable,
}

impl ToolError {
    /// Whether this error is the cooperative-cancellation signal.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<std::io::Error> for ToolError {
    fn from(err: std::io::Error) -> Self {
        Self::ExecutionFailed {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidInput {
            message: format!("JSON error: {err}"),
        }
    }
}

/// Result type for tool operations.
pub type Result<T> = std::result::Result<T, ToolError>;
