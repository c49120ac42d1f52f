//! Protocol types shared across the swell runtime.
//!
//! This crate provides the foundational types used by every other crate in
//! the workspace:
//! - Permission modes and decisions
//! - Token usage accounting
//! - Tool definitions and result content
//! - Agent progress events
//! - Hook event identifiers

mod event;
mod hook_event;
mod permission;
mod tool_types;
mod usage;

pub use event::AgentEvent;
pub use hook_event::HookEventType;
pub use permission::PermissionDecision;
pub use permission::PermissionMode;
pub use tool_types::ToolDefinition;
pub use tool_types::ToolResultContent;
pub use usage::OperationType;
pub use usage::TokenUsage;
