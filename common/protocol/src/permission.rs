//! Permission modes and decisions.

use serde::Deserialize;
use serde::Serialize;

/// Effective permission mode for a turn.
///
/// Resolution order (highest first): per-turn override, configured default,
/// `Default`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PermissionMode {
    /// Normal operation: restricted tools need an explicit allow source.
    #[default]
    Default,
    /// Every tool call is allowed without asking.
    BypassPermissions,
    /// Edit-class tools inside the Safe Zone run without asking.
    AcceptEdits,
    /// Read-mostly mode; only the designated plan file is writable.
    Plan,
}

impl PermissionMode {
    /// Returns the string representation of this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::BypassPermissions => "bypassPermissions",
            Self::AcceptEdits => "acceptEdits",
            Self::Plan => "plan",
        }
    }
}

impl std::fmt::Display for PermissionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of a permission check for a single tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "behavior", rename_all = "snake_case")]
pub enum PermissionDecision {
    /// The tool call may proceed.
    Allow,
    /// The tool call must not run.
    Deny {
        /// Human-readable reason surfaced on the tool block.
        message: String,
    },
    /// A host-side approval is required before the call may run.
    Ask,
}

impl PermissionDecision {
    /// Create a deny decision with the given reason.
    pub fn deny(message: impl Into<String>) -> Self {
        Self::Deny {
            message: message.into(),
        }
    }

    /// Returns `true` if the decision allows execution.
    pub fn is_allow(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Returns `true` if the decision denies execution.
    pub fn is_deny(&self) -> bool {
        matches!(self, Self::Deny { .. })
    }
}

#[cfg(test)]
#[path = "permission.test.rs"]
mod tests;
