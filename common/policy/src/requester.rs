//! The host-side approval contract.
//!
//! When the rule pipeline cannot resolve a call on its own, the engine
//! hands the decision to the host through [`PermissionRequester`]. The
//! same contract serves the turn engine when a `PreToolUse` hook answers
//! `ask`.

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use swell_protocol::PermissionMode;

/// A pending approval handed to the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionRequest {
    /// Tool awaiting approval.
    pub tool_name: String,
    /// The tool input as it would execute.
    pub tool_input: Value,
    /// The effective permission mode of the turn.
    pub permission_mode: PermissionMode,
    /// Suggested prefix rule for "allow similar next time"
    /// (e.g. `git status` for `git status -s`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_prefix: Option<String>,
    /// When set, the host UI should not offer to persist a rule.
    #[serde(default)]
    pub hide_persistent_option: bool,
}

/// What the host decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostBehavior {
    /// Run the tool.
    Allow,
    /// Refuse the tool.
    Deny,
}

/// Full host response to a [`PermissionRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostDecision {
    /// Whether the call may proceed.
    pub behavior: HostBehavior,
    /// Optional message (deny reason, typically).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Replacement tool input to execute instead of the original.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_input: Option<Value>,
    /// Switch the session to a new permission mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_permission_mode: Option<PermissionMode>,
    /// Persist a new allow rule ("always allow this").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_permission_rule: Option<String>,
    /// Whether the turn should keep recursing after this decision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub should_continue_recursion: Option<bool>,
}

impl HostDecision {
    /// A plain allow with no side effects.
    pub fn allow() -> Self {
        Self {
            behavior: HostBehavior::Allow,
            message: None,
            updated_input: None,
            new_permission_mode: None,
            new_permission_rule: None,
            should_continue_recursion: None,
        }
    }

    /// A deny with the given reason.
    pub fn deny(message: impl Into<String>) -> Self {
        Self {
            behavior: HostBehavior::Deny,
            message: Some(message.into()),
            updated_input: None,
            new_permission_mode: None,
            new_permission_rule: None,
            should_continue_recursion: None,
        }
    }
}

/// Host callback that resolves pending approvals.
///
/// Implementations must not panic; a returned error is treated by the
/// engine as a deny.
#[async_trait]
pub trait PermissionRequester: Send + Sync {
    /// Resolve a pending approval.
    async fn request_permission(
        &self,
        request: PermissionRequest,
    ) -> Result<HostDecision, String>;
}
