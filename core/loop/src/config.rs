//! Engine configuration.

use serde::Deserialize;
use serde::Serialize;

use swell_protocol::PermissionMode;

use crate::compress::CompressorConfig;

/// Static configuration for an [`crate::AgentEngine`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Base system prompt.
    pub system_prompt: String,
    /// Project memory injected into every model call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
    /// Response language; appended to the system prompt when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Configured default permission mode (a per-turn override outranks
    /// it).
    #[serde(default)]
    pub permission_mode: PermissionMode,
    /// Default model for agent calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Default output token cap.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<i64>,
    /// Whether to request streaming from the gateway.
    #[serde(default = "default_streaming")]
    pub streaming: bool,
    /// Whether this engine drives a subagent (fires `SubagentStop`
    /// instead of `Stop`).
    #[serde(default)]
    pub subagent: bool,
    /// Cap on stop-hook-driven re-entries; `None` follows the hook.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_stop_continuations: Option<i32>,
    /// Token-budget compression settings.
    #[serde(default)]
    pub compressor: CompressorConfig,
}

fn default_streaming() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            system_prompt: String::new(),
            memory: None,
            language: None,
            permission_mode: PermissionMode::Default,
            model: None,
            max_tokens: None,
            streaming: default_streaming(),
            subagent: false,
            max_stop_continuations: None,
            compressor: CompressorConfig::default(),
        }
    }
}

/// Reminder injected into the system prompt while plan mode is active.
pub(crate) const PLAN_MODE_REMINDER: &str = "Plan mode is active. Read and analyse freely, but do \
not modify any file except the designated plan file, and do not run state-changing commands. Use \
the plan-exit tool when the plan is ready for review.";

impl EngineConfig {
    /// Build the system prompt for a call under the given mode.
    pub(crate) fn system_prompt_for(&self, mode: PermissionMode) -> String {
        let mut prompt = self.system_prompt.clone();
        if mode == PermissionMode::Plan {
            if !prompt.is_empty() {
                prompt.push_str("\n\n");
            }
            prompt.push_str(PLAN_MODE_REMINDER);
        }
        if let Some(language) = &self.language {
            if !prompt.is_empty() {
                prompt.push_str("\n\n");
            }
            prompt.push_str(&format!("Always respond in {language}."));
        }
        prompt
    }
}

#[cfg(test)]
#[path = "config.test.rs"]
mod tests;
