//! Policy error types.

use thiserror::Error;

/// Errors produced while building policy state.
///
/// Note that [`crate::PermissionEngine::check`] itself never returns an
/// error; failures there surface as deny decisions.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// A rule's textual form could not be parsed.
    #[error("invalid permission rule '{rule}': {reason}")]
    InvalidRule {
        /// The offending rule text.
        rule: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A path glob inside a rule failed to compile.
    #[error("invalid glob in rule '{rule}': {source}")]
    InvalidGlob {
        /// The offending rule text.
        rule: String,
        /// The underlying glob error.
        #[source]
        source: globset::Error,
    },
}

/// Result type for policy operations.
pub type Result<T> = std::result::Result<T, PolicyError>;
