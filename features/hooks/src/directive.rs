//! Normalisation of hook batches.
//!
//! [`process_hook_results`] is the only place raw executions are
//! interpreted. Parsing precedence per hook: a well-formed JSON object on
//! stdout wins; otherwise exit code 0 means "no opinion", exit code 2
//! blocks with stderr as the reason, and any other failure is logged and
//! treated as "no opinion".

use serde_json::Value;
use tracing::debug;
use tracing::warn;

use crate::event::HookEvent;
use crate::execution::HookExecution;
use crate::output::parse_hook_stdout;

/// Exit code by which a hook blocks without printing JSON.
const BLOCK_EXIT_CODE: i32 = 2;

/// Permission decision contributed by `PreToolUse` hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HookPermissionDecision {
    /// Auto-approve the tool call.
    Allow,
    /// Require a host-side approval.
    Ask,
    /// Refuse the tool call.
    Deny,
}

/// The normalised outcome of one hook batch.
#[derive(Debug, Clone, Default)]
pub struct HookDirective {
    /// Whether the action must not proceed.
    pub should_block: bool,
    /// Reason reported for blocking.
    pub error_message: Option<String>,
    /// Permission override from `PreToolUse` hooks; the most severe
    /// decision across the batch wins (deny > ask > allow).
    pub permission_decision: Option<HookPermissionDecision>,
    /// Reason accompanying the permission decision.
    pub decision_reason: Option<String>,
    /// Replacement tool input; the last one in batch order wins.
    pub updated_input: Option<Value>,
    /// Context snippets to append to the tool result (`PostToolUse`).
    pub additional_context: Vec<String>,
    /// User-facing messages contributed by hooks.
    pub system_messages: Vec<String>,
}

impl HookDirective {
    /// Whether the batch expressed any opinion at all.
    pub fn is_neutral(&self) -> bool {
        !self.should_block
            && self.permission_decision.is_none()
            && self.updated_input.is_none()
            && self.additional_context.is_empty()
            && self.system_messages.is_empty()
    }
}

/// Interpret a batch of hook executions for one event.
pub fn process_hook_results(event: HookEvent, results: &[HookExecution]) -> HookDirective {
    let mut directive = HookDirective::default();

    for execution in results {
        if execution.timed_out {
            debug!(hook = %execution.hook_name, "Hook timed out; treating as no opinion");
            continue;
        }

        if let Some(output) = parse_hook_stdout(&execution.stdout) {
            if output.blocks() {
                mark_blocked(
                    &mut directive,
                    output
                        .stop_reason
                        .clone()
                        .unwrap_or_else(|| format!("blocked by hook '{}'", execution.hook_name)),
                );
            }
            if let Some(message) = output.system_message {
                directive.system_messages.push(message);
            }
            if let Some(data) = output.hook_specific_output {
                if let Some(decision) = data.permission_decision.as_deref() {
                    apply_permission_decision(
                        &mut directive,
                        decision,
                        data.permission_decision_reason.clone(),
                        &execution.hook_name,
                    );
                }
                if let Some(input) = data.updated_input {
                    directive.updated_input = Some(input);
                }
                if let Some(context) = data.additional_context {
                    directive.additional_context.push(context);
                }
            }
            continue;
        }

        // No structured output: fall back to exit-code semantics.
        if execution.exit_code == BLOCK_EXIT_CODE {
            let reason = if execution.stderr.trim().is_empty() {
                format!("blocked by hook '{}'", execution.hook_name)
            } else {
                execution.stderr.trim().to_string()
            };
            mark_blocked(&mut directive, reason);
        } else if !execution.success {
            warn!(
                hook = %execution.hook_name,
                exit_code = execution.exit_code,
                stderr = %execution.stderr,
                "Hook exited with error; treating as no opinion"
            );
        }
    }

    // A deny decision is a block for the tool pipeline.
    if directive.permission_decision == Some(HookPermissionDecision::Deny) {
        directive.should_block = true;
        if directive.error_message.is_none() {
            directive.error_message = directive.decision_reason.clone();
        }
    }

    if !event.can_block() && directive.should_block {
        debug!(%event, "Event cannot block; dropping block directive");
        directive.should_block = false;
        directive.error_message = None;
    }

    directive
}

fn mark_blocked(directive: &mut HookDirective, reason: String) {
    directive.should_block = true;
    if directive.error_message.is_none() {
        directive.error_message = Some(reason);
    }
}

/// Merge one hook's permission decision, keeping the most severe.
fn apply_permission_decision(
    directive: &mut HookDirective,
    decision: &str,
    reason: Option<String>,
    hook_name: &str,
) {
    let parsed = match decision {
        "allow" => HookPermissionDecision::Allow,
        "ask" => HookPermissionDecision::Ask,
        "deny" => HookPermissionDecision::Deny,
        other => {
            warn!(hook = hook_name, decision = other, "Unknown permission decision");
            return;
        }
    };
    if directive.permission_decision.is_none_or(|current| parsed > current) {
        directive.permission_decision = Some(parsed);
        directive.decision_reason = reason;
    }
}

#[cfg(test)]
#[path = "directive.test.rs"]
mod tests;
