//! Message model error types.

use thiserror::Error;

use crate::block::ToolStage;

/// Errors from history and block mutations.
#[derive(Debug, Error)]
pub enum MessageError {
    /// A tool block was asked to move backwards through its stages.
    #[error("invalid tool stage transition for '{call_id}': {from} -> {to}")]
    InvalidStageTransition {
        /// The tool call id.
        call_id: String,
        /// Current stage.
        from: ToolStage,
        /// Requested stage.
        to: ToolStage,
    },

    /// No tool block with the given id exists in the history.
    #[error("unknown tool call id '{call_id}'")]
    UnknownToolCall {
        /// The missing call id.
        call_id: String,
    },

    /// A compression splice point did not sit on a message boundary.
    #[error("invalid compression prefix length {prefix_len} for {message_count} messages")]
    InvalidCompressionPrefix {
        /// Requested prefix length.
        prefix_len: usize,
        /// Messages currently in the history.
        message_count: usize,
    },
}
