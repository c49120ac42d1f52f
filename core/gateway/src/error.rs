//! Gateway error types.

use thiserror::Error;

/// Errors surfaced by a gateway implementation.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The call was cancelled through the request's token.
    #[error("cancelled")]
    Cancelled,

    /// The transport failed (connection, protocol, decode).
    #[error("transport error: {message}")]
    Transport {
        /// Human-readable description.
        message: String,
    },

    /// The provider rejected the request.
    #[error("provider error ({status}): {message}")]
    Provider {
        /// HTTP-ish status code when known, 0 otherwise.
        status: i32,
        /// Human-readable description.
        message: String,
    },
}

impl GatewayError {
    /// Whether this error is the cooperative-cancellation signal.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}
