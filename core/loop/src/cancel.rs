//! Two-level turn cancellation.
//!
//! Every depth-0 turn owns one [`TurnTokens`] pair: aborting the turn
//! implies aborting its tools, aborting the tools leaves the turn alive.
//! Recursive cycles reuse the same pair; the depth-0 finaliser clears it.

use tokio_util::sync::CancellationToken;

/// Which level of the pair fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelKind {
    /// The whole turn (and therefore its tools) was aborted.
    Turn,
    /// Only in-flight tools were aborted.
    Tools,
}

/// The cancellation token pair for one turn.
#[derive(Debug, Clone)]
pub struct TurnTokens {
    turn: CancellationToken,
    tools: CancellationToken,
}

impl TurnTokens {
    /// Create a fresh pair. The tools token is a child of the turn token.
    pub fn new() -> Self {
        let turn = CancellationToken::new();
        let tools = turn.child_token();
        Self { turn, tools }
    }

    /// The turn-level token.
    pub fn turn(&self) -> &CancellationToken {
        &self.turn
    }

    /// The tools-level token.
    pub fn tools(&self) -> &CancellationToken {
        &self.tools
    }

    /// Abort the whole turn. Idempotent; also cancels tools.
    pub fn abort_turn(&self) {
        self.turn.cancel();
    }

    /// Abort in-flight tools only. Idempotent.
    pub fn abort_tools(&self) {
        self.tools.cancel();
    }

    /// Whether the turn was aborted.
    pub fn turn_cancelled(&self) -> bool {
        self.turn.is_cancelled()
    }

    /// Whether tools were aborted (directly or via the turn).
    pub fn tools_cancelled(&self) -> bool {
        self.tools.is_cancelled()
    }

    /// Whether any level fired.
    pub fn any_cancelled(&self) -> bool {
        self.tools_cancelled() || self.turn_cancelled()
    }

    /// Wait for a cancellation and report which level fired.
    pub async fn cancelled(&self) -> CancelKind {
        self.tools.cancelled().await;
        if self.turn.is_cancelled() {
            CancelKind::Turn
        } else {
            CancelKind::Tools
        }
    }
}

impl Default for TurnTokens {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "cancel.test.rs"]
mod tests;
