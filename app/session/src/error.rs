//! Session error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from session persistence.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Transcript IO failed.
    #[error("transcript io error at '{path}': {source}")]
    Io {
        /// The transcript path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A transcript line failed to serialise or parse.
    #[error("transcript serialization error: {source}")]
    Serde {
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// The transcript is missing its metadata header.
    #[error("transcript '{path}' has no metadata header")]
    MissingHeader {
        /// The transcript path.
        path: PathBuf,
    },
}
