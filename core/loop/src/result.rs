//! Turn options and results.

use serde::Deserialize;
use serde::Serialize;

use swell_protocol::PermissionMode;

/// Per-turn options for [`crate::AgentEngine::send_turn`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurnOptions {
    /// Model override for this turn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Output token cap for this turn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<i64>,
    /// Per-turn permission mode override (outranks the configured
    /// default).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission_mode: Option<PermissionMode>,
    /// Turn-scoped allow rules in textual form, cleared by the finaliser.
    #[serde(default)]
    pub allowed_rules: Vec<String>,
    /// When set, only these tools are offered to the model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools_allowlist: Option<Vec<String>>,
}

/// Why a turn ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum StopReason {
    /// The model stopped requesting tools and the turn finished normally.
    Completed,
    /// Another depth-0 turn was already in flight; this call was a no-op.
    AlreadyRunning,
    /// A `UserPromptSubmit` hook blocked the turn before the model ran.
    Blocked {
        /// The hook's reason.
        #[serde(rename = "message")]
        reason: String,
    },
    /// The user aborted the turn or its tools.
    Interrupted,
    /// The model call failed; an error block was appended.
    ModelError {
        /// The failure description.
        message: String,
    },
}

/// Aggregate result of one depth-0 turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnResult {
    /// Why the turn ended.
    pub stop_reason: StopReason,
    /// Number of model↔tools cycles that ran.
    pub cycles: i32,
    /// Comprehensive tokens of the last model response.
    pub total_tokens: i64,
}

impl TurnResult {
    /// A normally-completed turn.
    pub fn completed(cycles: i32, total_tokens: i64) -> Self {
        Self {
            stop_reason: StopReason::Completed,
            cycles,
            total_tokens,
        }
    }

    /// The no-op result for a rejected concurrent call.
    pub fn already_running() -> Self {
        Self {
            stop_reason: StopReason::AlreadyRunning,
            cycles: 0,
            total_tokens: 0,
        }
    }

    /// A turn blocked before the model ran.
    pub fn blocked(reason: impl Into<String>, total_tokens: i64) -> Self {
        Self {
            stop_reason: StopReason::Blocked {
                reason: reason.into(),
            },
            cycles: 0,
            total_tokens,
        }
    }

    /// An aborted turn.
    pub fn interrupted(cycles: i32, total_tokens: i64) -> Self {
        Self {
            stop_reason: StopReason::Interrupted,
            cycles,
            total_tokens,
        }
    }

    /// A turn ended by a model failure.
    pub fn model_error(message: impl Into<String>, cycles: i32, total_tokens: i64) -> Self {
        Self {
            stop_reason: StopReason::ModelError {
                message: message.into(),
            },
            cycles,
            total_tokens,
        }
    }
}

#[cfg(test)]
#[path = "result.test.rs"]
mod tests;
