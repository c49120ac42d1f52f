//! JSONL transcript persistence.
//!
//! One file per session: the first line is the session metadata, every
//! following line is a message. Unparseable message lines are skipped
//! with a warning so one bad line cannot hold the whole session hostage.

use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::warn;

use swell_message::Message;

use crate::error::SessionError;
use crate::session::Session;

/// One line of the transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum TranscriptLine {
    /// The metadata header.
    Meta {
        /// The session metadata.
        session: Session,
    },
    /// A conversation message.
    Message {
        /// The message.
        message: Message,
    },
}

/// Write the whole transcript atomically-ish: to a temp file in the same
/// directory, then rename over the target.
pub async fn write_transcript(
    session: &Session,
    messages: &[Message],
) -> Result<(), SessionError> {
    let path = &session.transcript_path;
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| SessionError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    let mut content = String::new();
    append_line(
        &mut content,
        &TranscriptLine::Meta {
            session: session.clone(),
        },
    )?;
    for message in messages {
        append_line(
            &mut content,
            &TranscriptLine::Message {
                message: message.clone(),
            },
        )?;
    }

    let tmp_path = path.with_extension("jsonl.tmp");
    let mut file = tokio::fs::File::create(&tmp_path)
        .await
        .map_err(|source| SessionError::Io {
            path: tmp_path.clone(),
            source,
        })?;
    file.write_all(content.as_bytes())
        .await
        .map_err(|source| SessionError::Io {
            path: tmp_path.clone(),
            source,
        })?;
    file.flush().await.map_err(|source| SessionError::Io {
        path: tmp_path.clone(),
        source,
    })?;
    drop(file);

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|source| SessionError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Load a transcript back into session metadata and messages.
pub async fn load_transcript(path: &Path) -> Result<(Session, Vec<Message>), SessionError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SessionError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let mut session: Option<Session> = None;
    let mut messages: Vec<Message> = Vec::new();

    for (index, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<TranscriptLine>(line) {
            Ok(TranscriptLine::Meta { session: meta }) => {
                session = Some(meta);
            }
            Ok(TranscriptLine::Message { message }) => messages.push(message),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    line = index + 1,
                    "Skipping unparseable transcript line: {e}"
                );
            }
        }
    }

    let session = session.ok_or_else(|| SessionError::MissingHeader {
        path: path.to_path_buf(),
    })?;
    Ok((session, messages))
}

fn append_line(buffer: &mut String, line: &TranscriptLine) -> Result<(), SessionError> {
    let json = serde_json::to_string(line).map_err(|source| SessionError::Serde { source })?;
    buffer.push_str(&json);
    buffer.push('\n');
    Ok(())
}

#[cfg(test)]
#[path = "persistence.test.rs"]
mod tests;
