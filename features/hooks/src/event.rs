//! Hook event types.

use serde::Deserialize;
use serde::Serialize;

/// Lifecycle point at which hooks fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookEvent {
    /// When the user submits a prompt, before the model is called.
    UserPromptSubmit,
    /// Before a tool executes. Can allow, deny, ask, or modify input.
    PreToolUse,
    /// After a tool executes. Can annotate the result.
    PostToolUse,
    /// When the turn engine finishes a turn.
    Stop,
    /// When a subagent turn finishes.
    SubagentStop,
    /// Informational; cannot block.
    Notification,
}

impl HookEvent {
    /// Returns the string representation of this event.
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

    /// Whether this event's hooks are allowed to block at all.
    pub fn can_block(&self) -> bool {
        !matches!(self, Self::Notification)
    }
}

impl std::fmt::Display for HookEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<HookEvent> for swell_protocol::HookEventType {
    fn from(event: HookEvent) -> Self {
        match event {
            HookEvent::UserPromptSubmit => Self::UserPromptSubmit,
            HookEvent::PreToolUse => Self::PreToolUse,
            HookEvent::PostToolUse => Self::PostToolUse,
            HookEvent::Stop => Self::Stop,
            HookEvent::SubagentStop => Self::SubagentStop,
            HookEvent::Notification => Self::Notification,
        }
    }
}

#[cfg(test)]
#[path = "event.test.rs"]
mod tests;
