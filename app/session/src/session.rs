//! Session metadata.

use std::path::Path;
use std::path::PathBuf;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Metadata for one agent conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier (UUID v4).
    pub id: String,
    /// Working directory the session operates in.
    pub working_dir: PathBuf,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last activity timestamp.
    pub last_activity_at: DateTime<Utc>,
    /// Path of the session transcript.
    pub transcript_path: PathBuf,
}

impl Session {
    /// Create a new session whose transcript lives under `session_dir`.
    pub fn new(working_dir: impl Into<PathBuf>, session_dir: &Path) -> Self {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();
        Self {
            transcript_path: session_dir.join(format!("{id}.jsonl")),
            id,
            working_dir: working_dir.into(),
            created_at: now,
            last_activity_at: now,
        }
    }

    /// Update the last-activity timestamp to now.
    pub fn touch(&mut self) {
        self.last_activity_at = Utc::now();
    }

    /// Seconds since the last activity.
    pub fn idle_secs(&self) -> i64 {
        (Utc::now() - self.last_activity_at).num_seconds()
    }
}

#[cfg(test)]
#[path = "session.test.rs"]
mod tests;
