//! Hook registry and batch execution.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::Deserialize;
use serde::Serialize;
use tracing::info;

use crate::context::HookContext;
use crate::event::HookEvent;
use crate::execution::HookExecution;
use crate::execution::run_hook;
use crate::matcher::HookMatcher;

fn default_enabled() -> bool {
    true
}

fn default_timeout_secs() -> i32 {
    30
}

/// One configured hook: when it fires, what it matches, what it runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookDefinition {
    /// Name for logging and identification.
    pub name: String,
    /// Event this hook fires on.
    pub event: HookEvent,
    /// Optional filter on the event's match target (tool name).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matcher: Option<HookMatcher>,
    /// Command to execute.
    pub command: String,
    /// Arguments for the command.
    #[serde(default)]
    pub args: Vec<String>,
    /// Per-hook timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: i32,
    /// Whether this hook is enabled.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Extra environment for the hook process.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, String>,
}

impl HookDefinition {
    /// Create an enabled command hook with the default timeout.
    pub fn command(
        name: impl Into<String>,
        event: HookEvent,
        command: impl Into<String>,
        args: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            event,
            matcher: None,
            command: command.into(),
            args,
            timeout_secs: default_timeout_secs(),
            enabled: true,
            env: HashMap::new(),
        }
    }

    /// Set the matcher.
    pub fn with_matcher(mut self, matcher: HookMatcher) -> Self {
        self.matcher = Some(matcher);
        self
    }

    /// Set the timeout.
    pub fn with_timeout_secs(mut self, timeout_secs: i32) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Stores hooks and runs matching batches.
///
/// Interior mutability lets the engine execute through a shared
/// `Arc<HookEngine>` while configuration reloads swap the hook list.
#[derive(Default)]
pub struct HookEngine {
    hooks: RwLock<Vec<HookDefinition>>,
}

impl HookEngine {
    /// Create an empty engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one hook.
    pub fn register(&self, hook: HookDefinition) {
        info!(name = %hook.name, event = %hook.event, "Registered hook");
        if let Ok(mut hooks) = self.hooks.write() {
            hooks.push(hook);
        }
    }

    /// Register many hooks.
    pub fn register_all(&self, hooks: impl IntoIterator<Item = HookDefinition>) {
        for hook in hooks {
            self.register(hook);
        }
    }

    /// Remove every hook.
    pub fn clear(&self) {
        if let Ok(mut hooks) = self.hooks.write() {
            hooks.clear();
        }
    }

    /// Number of registered hooks.
    pub fn len(&self) -> usize {
        self.hooks.read().map(|h| h.len()).unwrap_or(0)
    }

    /// Whether no hooks are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether any enabled hook is registered for the event.
    pub fn has_hooks_for(&self, event: HookEvent) -> bool {
        self.hooks
            .read()
            .map(|hooks| hooks.iter().any(|h| h.enabled && h.event == event))
            .unwrap_or(false)
    }

    /// Run every enabled, matching hook for the context's event.
    ///
    /// Hooks run concurrently; results come back in registration order.
    /// Failures are captured in the executions, never raised.
    pub async fn execute_hooks(&self, ctx: &HookContext) -> Vec<HookExecution> {
        let matching: Vec<HookDefinition> = match self.hooks.read() {
            Ok(hooks) => hooks
                .iter()
                .filter(|hook| hook.enabled && hook.event == ctx.event)
                .filter(|hook| match (&hook.matcher, ctx.match_target()) {
                    (Some(matcher), Some(target)) => matcher.matches(target),
                    (Some(_), None) => false,
                    (None, _) => true,
                })
                .cloned()
                .collect(),
            Err(_) => return Vec::new(),
        };

        if matching.is_empty() {
            return Vec::new();
        }

        let futures: Vec<_> = matching
            .iter()
            .map(|hook| {
                let mut ctx = ctx.clone();
                ctx.env.extend(hook.env.clone());
                async move { run_hook(hook, &ctx).await }
            })
            .collect();

        futures::future::join_all(futures).await
    }
}

impl std::fmt::Debug for HookEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookEngine")
            .field("hooks_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "registry.test.rs"]
mod tests;
