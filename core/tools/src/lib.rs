//! Tool plugins, the registry, and the dispatcher.
//!
//! Concrete tools live outside this workspace; this crate defines the
//! [`Tool`] plugin contract, the name→plugin [`ToolRegistry`] with
//! mode-dependent filtering and transparent MCP merging, and the
//! [`dispatch`] entry point that converts every failure into a failed
//! [`ToolResult`].

mod context;
mod dispatcher;
mod error;
mod registry;
mod tool;

pub use context::BackgroundTasks;
pub use context::LspBridge;
pub use context::Reversion;
pub use context::Subagents;
pub use context::ToolContext;
pub use context::ToolContextBuilder;
pub use dispatcher::dispatch;
pub use error::ToolError;
pub use registry::MCP_TOOL_PREFIX;
pub use registry::McpExecutor;
pub use registry::ToolRegistry;
pub use tool::Tool;
pub use tool::ToolGate;
pub use tool::ToolResult;
