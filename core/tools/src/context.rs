//! The tool execution context.
//!
//! A capability record built by the dispatcher per execution: tools see
//! the effective permission mode, the permission engine, the tools
//! cancellation token, the working directory, the message being extended,
//! and whichever optional collaborators the host wired in.

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use swell_policy::PermissionEngine;
use swell_protocol::PermissionMode;

/// Background-task collaborator: lets a tool hand its work off to a
/// host-managed background task.
#[async_trait]
pub trait BackgroundTasks: Send + Sync {
    /// Move the given call to the background; returns the task id when the
    /// host accepted the hand-off.
    async fn background_tool(&self, call_id: &str) -> Option<String>;
}

/// Reversion collaborator: file-history snapshots around mutations.
#[async_trait]
pub trait Reversion: Send + Sync {
    /// Snapshot the given files before a mutation; returns a snapshot id.
    async fn snapshot(&self, paths: &[PathBuf]) -> Option<String>;
}

/// Subagent collaborator.
#[async_trait]
pub trait Subagents: Send + Sync {
    /// Run a subagent to completion and return its final text.
    async fn run_subagent(&self, agent_type: &str, prompt: &str) -> Result<String, String>;
}

/// LSP collaborator.
#[async_trait]
pub trait LspBridge: Send + Sync {
    /// Rendered diagnostics for a file, when the server has any.
    async fn diagnostics(&self, path: &Path) -> Option<String>;
}

/// Everything a tool execution can reach.
#[derive(Clone)]
pub struct ToolContext {
    /// The call id this execution belongs to.
    pub call_id: String,
    /// The assistant message being extended.
    pub message_id: String,
    /// Session identifier.
    pub session_id: String,
    /// Working directory.
    pub cwd: PathBuf,
    /// Effective permission mode of the turn.
    pub permission_mode: PermissionMode,
    /// The permission engine, for tools that re-check nested operations.
    pub permissions: Arc<PermissionEngine>,
    /// Tools-level cancellation token.
    pub cancel: CancellationToken,
    /// Background-task collaborator, when wired.
    pub background: Option<Arc<dyn BackgroundTasks>>,
    /// Reversion collaborator, when wired.
    pub reversion: Option<Arc<dyn Reversion>>,
    /// Subagent collaborator, when wired.
    pub subagents: Option<Arc<dyn Subagents>>,
    /// LSP collaborator, when wired.
    pub lsp: Option<Arc<dyn LspBridge>>,
}

impl ToolContext {
    /// Resolve a possibly-relative path against the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        self.permissions.safe_zone().resolve(path)
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Wait for cancellation.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await
    }
}

impl std::fmt::Debug for ToolContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolContext")
            .field("call_id", &self.call_id)
            .field("message_id", &self.message_id)
            .field("session_id", &self.session_id)
            .field("cwd", &self.cwd)
            .field("permission_mode", &self.permission_mode)
            .field("is_cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}

/// Builder for [`ToolContext`].
pub struct ToolContextBuilder {
    call_id: String,
    message_id: String,
    session_id: String,
    cwd: PathBuf,
    permission_mode: PermissionMode,
    permissions: Arc<PermissionEngine>,
    cancel: CancellationToken,
    background: Option<Arc<dyn BackgroundTasks>>,
    reversion: Option<Arc<dyn Reversion>>,
    subagents: Option<Arc<dyn Subagents>>,
    lsp: Option<Arc<dyn LspBridge>>,
}

impl ToolContextBuilder {
    /// Start a builder with the required capabilities.
    pub fn new(
        call_id: impl Into<String>,
        permissions: Arc<PermissionEngine>,
        cwd: impl Into<PathBuf>,
    ) -> Self {
        Self {
            call_id: call_id.into(),
            message_id: String::new(),
            session_id: String::new(),
            cwd: cwd.into(),
            permission_mode: PermissionMode::Default,
            permissions,
            cancel: CancellationToken::new(),
            background: None,
            reversion: None,
            subagents: None,
            lsp: None,
        }
    }

    /// Set the message id being extended.
    pub fn message_id(mut self, id: impl Into<String>) -> Self {
        self.message_id = id.into();
        self
    }

    /// Set the session id.
    pub fn session_id(mut self, id: impl Into<String>) -> Self {
        self.session_id = id.into();
        self
    }

    /// Set the effective permission mode.
    pub fn permission_mode(mut self, mode: PermissionMode) -> Self {
        self.permission_mode = mode;
        self
    }

    /// Set the cancellation token.
    pub fn cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Wire the background-task collaborator.
    pub fn background(mut self, handle: Arc<dyn BackgroundTasks>) -> Self {
        self.background = Some(handle);
        self
    }

    /// Wire the reversion collaborator.
    pub fn reversion(mut self, handle: Arc<dyn Reversion>) -> Self {
        self.reversion = Some(handle);
        self
    }

    /// Wire the subagent collaborator.
    pub fn subagents(mut self, handle: Arc<dyn Subagents>) -> Self {
        self.subagents = Some(handle);
        self
    }

    /// Wire the LSP collaborator.
    pub fn lsp(mut self, handle: Arc<dyn LspBridge>) -> Self {
        self.lsp = Some(handle);
        self
    }

    /// Build the context.
    pub fn build(self) -> ToolContext {
        ToolContext {
            call_id: self.call_id,
            message_id: self.message_id,
            session_id: self.session_id,
            cwd: self.cwd,
            permission_mode: self.permission_mode,
            permissions: self.permissions,
            cancel: self.cancel,
            background: self.background,
            reversion: self.reversion,
            subagents: self.subagents,
            lsp: self.lsp,
        }
    }
}

#[cfg(test)]
#[path = "context.test.rs"]
mod tests;
