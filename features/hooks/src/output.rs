//! Structured hook output.
//!
//! A hook steers the engine either through a JSON object on stdout or
//! through its exit code. A well-formed JSON object always overrides exit
//! code semantics. Recognised fields:
//!
//! ```json
//! {
//!   "continue": false,
//!   "stopReason": "why the action was blocked",
//!   "systemMessage": "shown to the user",
//!   "hookSpecificOutput": {
//!     "permissionDecision": "allow" | "deny" | "ask",
//!     "permissionDecisionReason": "...",
//!     "updatedInput": { ... },
//!     "additionalContext": "..."
//!   }
//! }
//! ```

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// Event-specific payload envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookSpecificOutput {
    /// Permission decision override for `PreToolUse`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission_decision: Option<String>,
    /// Reason accompanying the permission decision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission_decision_reason: Option<String>,
    /// Replacement tool input for `PreToolUse`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_input: Option<Value>,
    /// Extra context appended to the tool result for `PostToolUse`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_context: Option<String>,
}

/// Parsed structured output of one hook.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookOutput {
    /// When `false`, the action is blocked.
    #[serde(default, rename = "continue", skip_serializing_if = "Option::is_none")]
    pub continue_: Option<bool>,
    /// Reason for blocking.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
    /// Message surfaced to the user regardless of blocking.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_message: Option<String>,
    /// Event-specific envelope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hook_specific_output: Option<HookSpecificOutput>,
}

impl HookOutput {
    /// Whether this output blocks the action.
    pub fn blocks(&self) -> bool {
        self.continue_ == Some(false)
    }
}

/// Parse a hook's stdout into structured output.
///
/// Returns `None` unless the trimmed stdout is a well-formed JSON object;
/// anything else falls back to exit-code semantics at the caller.
pub fn parse_hook_stdout(stdout: &str) -> Option<HookOutput> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() || !trimmed.starts_with('{') {
        return None;
    }
    serde_json::from_str::<HookOutput>(trimmed).ok()
}

#[cfg(test)]
#[path = "output.test.rs"]
mod tests;
