//! Events emitted by the turn engine.
//!
//! These events let hosts observe the engine's progress (UI updates,
//! logging, debugging) without being coupled to its internals. They are
//! delivered over an `mpsc` channel; delivery is best-effort and never
//! blocks the engine.

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::HookEventType;
use crate::PermissionDecision;
use crate::TokenUsage;

/// Progress events published during a turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    // ========== Turn lifecycle ==========
    /// A depth-0 turn has started.
    TurnStarted {
        /// Unique identifier for this turn.
        turn_id: String,
    },
    /// One model↔tools cycle has completed.
    CycleCompleted {
        /// Turn identifier.
        turn_id: String,
        /// Cycle number within the turn (0-indexed).
        cycle: i32,
        /// Token usage for this cycle's model call.
        usage: TokenUsage,
    },
    /// The depth-0 turn has finished and the engine is idle again.
    TurnCompleted {
        /// Turn identifier.
        turn_id: String,
    },

    // ========== Content streaming ==========
    /// Text content delta from the model.
    TextDelta {
        /// The text delta.
        delta: String,
    },
    /// Reasoning content delta from the model.
    ReasoningDelta {
        /// The reasoning delta.
        delta: String,
    },

    // ========== Tool execution ==========
    /// A tool call was received and queued for execution.
    ToolQueued {
        /// Model-assigned call identifier.
        call_id: String,
        /// Tool name.
        name: String,
        /// Parsed tool input.
        input: Value,
    },
    /// A tool has started executing.
    ToolStarted {
        /// Call identifier.
        call_id: String,
        /// Tool name.
        name: String,
    },
    /// A tool has finished.
    ToolCompleted {
        /// Call identifier.
        call_id: String,
        /// Whether the tool failed.
        is_error: bool,
    },
    /// A permission check was evaluated for a tool call.
    PermissionChecked {
        /// Tool that was checked.
        tool_name: String,
        /// The resulting decision.
        decision: PermissionDecision,
    },

    // ========== Hooks ==========
    /// A hook batch was executed.
    HooksExecuted {
        /// The event the hooks ran for.
        event: HookEventType,
        /// Number of hooks that ran.
        count: i32,
        /// Whether the batch produced a blocking directive.
        blocked: bool,
    },

    // ========== Token accounting & compression ==========
    /// The latest comprehensive token total was published.
    TotalTokens {
        /// `total + cache_read + cache_creation` of the latest usage.
        tokens: i64,
    },
    /// History compression has started.
    CompressionStarted,
    /// History compression replaced a message prefix.
    CompressionCompleted {
        /// Number of messages replaced by the summary.
        replaced_messages: i32,
    },
    /// History compression failed; history is unchanged.
    CompressionFailed {
        /// Error description.
        error: String,
    },

    // ========== Errors & control ==========
    /// An error block was appended to the conversation.
    Error {
        /// The error text.
        message: String,
    },
    /// The turn was interrupted by the user.
    Interrupted,
}

#[cfg(test)]
#[path = "event.test.rs"]
mod tests;
