//! The session store: the message-store contract the turn engine drives.

use std::path::Path;
use std::path::PathBuf;
use std::sync::RwLock;
use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;

use tracing::debug;

use swell_gateway::WireMessage;
use swell_message::Block;
use swell_message::Message;
use swell_message::MessageError;
use swell_message::MessageHistory;
use swell_message::ToolBlock;
use swell_protocol::TokenUsage;

use crate::error::SessionError;
use crate::persistence::load_transcript;
use crate::persistence::write_transcript;
use crate::session::Session;

/// The only shared-mutable component of a turn.
///
/// All mutation goes through this API; each method is atomic with respect
/// to the interior locks, so between any two mutations the observable
/// block sequence is a valid ordering (append-only plus in-place updates
/// of tool blocks by id).
pub struct SessionStore {
    session: RwLock<Session>,
    history: RwLock<MessageHistory>,
    latest_total_tokens: AtomicI64,
}

impl SessionStore {
    /// Create a store for a fresh session.
    pub fn new(working_dir: impl Into<PathBuf>, session_dir: &Path) -> Self {
        Self {
            session: RwLock::new(Session::new(working_dir, session_dir)),
            history: RwLock::new(MessageHistory::new()),
            latest_total_tokens: AtomicI64::new(0),
        }
    }

    /// Restore a store from a persisted transcript.
    pub async fn load(path: &Path) -> Result<Self, SessionError> {
        let (session, messages) = load_transcript(path).await?;
        Ok(Self {
            session: RwLock::new(session),
            history: RwLock::new(MessageHistory::from_messages(messages)),
            latest_total_tokens: AtomicI64::new(0),
        })
    }

    /// The session id.
    pub fn session_id(&self) -> String {
        self.session
            .read()
            .map(|s| s.id.clone())
            .unwrap_or_default()
    }

    /// The transcript path.
    pub fn transcript_path(&self) -> PathBuf {
        self.session
            .read()
            .map(|s| s.transcript_path.clone())
            .unwrap_or_default()
    }

    /// The session working directory.
    pub fn working_dir(&self) -> PathBuf {
        self.session
            .read()
            .map(|s| s.working_dir.clone())
            .unwrap_or_default()
    }

    // ==========================================================
    // Append API
    // ==========================================================

    /// Append a user message, returning its id.
    pub fn append_user(&self, text: impl Into<String>) -> String {
        self.push_message(Message::user(text))
    }

    /// Append an empty assistant message (filled by streaming), returning
    /// its id.
    pub fn append_assistant(&self) -> String {
        self.push_message(Message::assistant())
    }

    /// Append a system message, returning its id.
    pub fn append_system(&self, text: impl Into<String>) -> String {
        self.push_message(Message::system(text))
    }

    /// Append an arbitrary message, returning its id.
    pub fn push_message(&self, message: Message) -> String {
        let id = message.id.clone();
        if let Ok(mut history) = self.history.write() {
            history.push(message);
        }
        id
    }

    /// Append an error block in its own message.
    pub fn append_error(&self, message: impl Into<String>) {
        if let Ok(mut history) = self.history.write() {
            history.push_error(message);
        }
    }

    /// Append a file-history snapshot marker.
    pub fn append_file_history_snapshot(&self, snapshot_id: impl Into<String>) {
        if let Ok(mut history) = self.history.write() {
            history.push(Message::system_with_blocks(vec![
                Block::FileHistorySnapshot {
                    snapshot_id: snapshot_id.into(),
                },
            ]));
        }
    }

    // ==========================================================
    // In-place mutation API
    // ==========================================================

    /// Mutate a message by id.
    pub fn with_message<F, T>(&self, message_id: &str, mutate: F) -> Option<T>
    where
        F: FnOnce(&mut Message) -> T,
    {
        let mut history = self.history.write().ok()?;
        history.message_mut(message_id).map(mutate)
    }

    /// Mutate a tool block by call id.
    pub fn update_tool_block<F>(&self, call_id: &str, mutate: F) -> Result<(), MessageError>
    where
        F: FnOnce(&mut ToolBlock) -> Result<(), MessageError>,
    {
        let mut history = self
            .history
            .write()
            .map_err(|_| MessageError::UnknownToolCall {
                call_id: call_id.to_string(),
            })?;
        history.update_tool_block(call_id, mutate)
    }

    // ==========================================================
    // Compression
    // ==========================================================

    /// Index of the first message of the most recent turn; messages
    /// strictly before it are compressible.
    pub fn compressible_prefix_len(&self) -> usize {
        self.history
            .read()
            .map(|h| h.compressible_prefix_len())
            .unwrap_or(0)
    }

    /// Replace `messages[..insert_index]` with one compress-summary block
    /// and persist the session.
    pub async fn compress_messages_and_update_session(
        &self,
        insert_index: usize,
        content: impl Into<String>,
        usage: Option<TokenUsage>,
    ) -> Result<usize, SessionError> {
        let replaced = {
            let Ok(mut history) = self.history.write() else {
                return Ok(0);
            };
            match history.compress_replace(insert_index, content, usage) {
                Ok(replaced) => replaced,
                Err(e) => {
                    debug!(%e, "Compression splice rejected");
                    return Ok(0);
                }
            }
        };
        self.save().await?;
        Ok(replaced)
    }

    // ==========================================================
    // Token publication
    // ==========================================================

    /// Publish the latest comprehensive token total (for UI).
    pub fn set_latest_total_tokens(&self, tokens: i64) {
        self.latest_total_tokens.store(tokens, Ordering::SeqCst);
    }

    /// The last published comprehensive token total.
    pub fn latest_total_tokens(&self) -> i64 {
        self.latest_total_tokens.load(Ordering::SeqCst)
    }

    // ==========================================================
    // Read API
    // ==========================================================

    /// Snapshot of all messages.
    pub fn messages(&self) -> Vec<Message> {
        self.history
            .read()
            .map(|h| h.messages().to_vec())
            .unwrap_or_default()
    }

    /// Replace the whole message log.
    pub fn set_messages(&self, messages: Vec<Message>) {
        if let Ok(mut history) = self.history.write() {
            history.set_messages(messages);
        }
    }

    /// Number of messages.
    pub fn message_count(&self) -> usize {
        self.history.read().map(|h| h.len()).unwrap_or(0)
    }

    /// The usage ledger derived from the log.
    pub fn usages(&self) -> Vec<TokenUsage> {
        self.history.read().map(|h| h.usages()).unwrap_or_default()
    }

    /// The conversation rendered to gateway wire form.
    pub fn wire_messages(&self) -> Vec<WireMessage> {
        self.history
            .read()
            .map(|h| h.wire_messages())
            .unwrap_or_default()
    }

    /// The first `len` messages rendered to wire form (compression input).
    pub fn wire_prefix(&self, len: usize) -> Vec<WireMessage> {
        self.history
            .read()
            .map(|h| h.wire_prefix(len))
            .unwrap_or_default()
    }

    // ==========================================================
    // Persistence
    // ==========================================================

    /// Persist the transcript, refreshing the activity timestamp.
    pub async fn save(&self) -> Result<(), SessionError> {
        let session = {
            let Ok(mut session) = self.session.write() else {
                return Ok(());
            };
            session.touch();
            session.clone()
        };
        let messages = self.messages();
        write_transcript(&session, &messages).await
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("session_id", &self.session_id())
            .field("messages", &self.message_count())
            .finish()
    }
}

#[cfg(test)]
#[path = "store.test.rs"]
mod tests;
