//! Hook event identifiers.
//!
//! Mirrors `swell_hooks::HookEvent` with identical variants and serde names
//! so events can reference hook executions without depending on the hooks
//! crate.

use serde::Deserialize;
use serde::Serialize;

/// Lifecycle point at which hooks can fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookEventType {
    /// When the user submits a prompt, before the model is called.
    UserPromptSubmit,
    /// Before a tool executes.
    PreToolUse,
    /// After a tool executes.
    PostToolUse,
    /// When the turn engine finishes a turn.
    Stop,
    /// When a subagent turn finishes.
    SubagentStop,
    /// Informational notification; cannot block.
    Notification,
}

impl HookEventType {
    /// Returns the string representation of this event type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserPromptSubmit => "user_prompt_submit",
            Self::PreToolUse => "pre_tool_use",
            Self::PostToolUse => "post_tool_use",
            Self::Stop => "stop",
            Self::SubagentStop => "subagent_stop",
            Self::Notification => "notification",
        }
    }
}

impl std::fmt::Display for HookEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
#[path = "hook_event.test.rs"]
mod tests;
