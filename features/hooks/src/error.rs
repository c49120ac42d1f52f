//! Hook engine error types.
//!
//! These surface only at configuration time; running hooks never
//! propagates errors to callers.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from loading hook configuration.
#[derive(Debug, Error)]
pub enum HookError {
    /// A matcher pattern failed validation.
    #[error("invalid matcher: {message}")]
    InvalidMatcher {
        /// Why the matcher was rejected.
        message: String,
    },

    /// The hooks config file could not be read.
    #[error("failed to read hooks file '{path}': {source}")]
    ConfigRead {
        /// The file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The hooks config file could not be parsed.
    #[error("failed to parse hooks JSON '{path}': {source}")]
    ConfigParse {
        /// The file path.
        path: PathBuf,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}
