//! Hook execution context.
//!
//! The full context is serialised to JSON and written to the hook
//! process's stdin.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::event::HookEvent;

/// Everything a hook knows about the invocation that triggered it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookContext {
    /// The event that triggered the hook.
    pub event: HookEvent,
    /// Current session identifier.
    pub session_id: String,
    /// Session working directory.
    pub working_dir: PathBuf,
    /// Path to the session transcript.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript_path: Option<PathBuf>,
    /// When the event fired.
    pub timestamp: DateTime<Utc>,
    /// Tool name, for tool events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    /// Tool input, for tool events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_input: Option<Value>,
    /// Tool result text, for `PostToolUse`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_response: Option<String>,
    /// The submitted prompt, for `UserPromptSubmit`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_prompt: Option<String>,
    /// Subagent type, for `SubagentStop`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subagent_type: Option<String>,
    /// Extra environment variables from configuration, also exported to
    /// the hook process.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, String>,
}

impl HookContext {
    /// Create a context with the required fields.
    pub fn new(event: HookEvent, session_id: impl Into<String>, working_dir: PathBuf) -> Self {
        Self {
            event,
            session_id: session_id.into(),
            working_dir,
            transcript_path: None,
            timestamp: Utc::now(),
            tool_name: None,
            tool_input: None,
            tool_response: None,
            user_prompt: None,
            subagent_type: None,
            env: HashMap::new(),
        }
    }

    /// Set the transcript path.
    pub fn with_transcript_path(mut self, path: PathBuf) -> Self {
        self.transcript_path = Some(path);
        self
    }

    /// Set tool name and input.
    pub fn with_tool(mut self, name: impl Into<String>, input: Value) -> Self {
        self.tool_name = Some(name.into());
        self.tool_input = Some(input);
        self
    }

    /// Set the tool response text.
    pub fn with_tool_response(mut self, response: impl Into<String>) -> Self {
        self.tool_response = Some(response.into());
        self
    }

    /// Set the submitted user prompt.
    pub fn with_user_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.user_prompt = Some(prompt.into());
        self
    }

    /// Set the subagent type.
    pub fn with_subagent_type(mut self, subagent_type: impl Into<String>) -> Self {
        self.subagent_type = Some(subagent_type.into());
        self
    }

    /// Extend the environment map.
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env.extend(env);
        self
    }

    /// The value hook matchers are applied to for this event, if any.
    pub fn match_target(&self) -> Option<&str> {
        self.tool_name.as_deref()
    }
}

#[cfg(test)]
#[path = "context.test.rs"]
mod tests;
