//! The per-tool-call pipeline.
//!
//! For one tool call the order is strict: parse arguments → compact
//! params → `Running` stage → `PreToolUse` hooks → permission check →
//! execute → `End` stage → `PostToolUse` hooks. Tasks for one batch run
//! in parallel and coordinate only through the shared tokens and the
//! session store.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::RwLock;

use serde_json::Map;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::debug;
use tracing::warn;

use swell_gateway::ToolCallPayload;
use swell_hooks::HookContext;
use swell_hooks::HookEngine;
use swell_hooks::HookEvent;
use swell_hooks::HookPermissionDecision;
use swell_hooks::process_hook_results;
use swell_policy::HostBehavior;
use swell_policy::PermissionEngine;
use swell_policy::PermissionRequest;
use swell_policy::PermissionRequester;
use swell_policy::PermissionRule;
use swell_policy::suggested_prefix_for;
use swell_protocol::AgentEvent;
use swell_protocol::PermissionDecision;
use swell_protocol::PermissionMode;
use swell_session::SessionStore;
use swell_tools::ToolContextBuilder;
use swell_tools::ToolRegistry;
use swell_tools::dispatch;

use crate::cancel::TurnTokens;
use crate::engine::emit;

/// Shared dependencies for the tool tasks of one batch.
pub(crate) struct ToolTaskDeps {
    pub store: Arc<SessionStore>,
    pub registry: Arc<ToolRegistry>,
    pub permissions: Arc<PermissionEngine>,
    pub hooks: Arc<HookEngine>,
    pub requester: Option<Arc<dyn PermissionRequester>>,
    pub event_tx: Option<mpsc::Sender<AgentEvent>>,
    /// Effective mode for the turn; host decisions may switch it.
    pub mode: Arc<RwLock<PermissionMode>>,
    pub tokens: TurnTokens,
    /// The assistant message the batch extends.
    pub message_id: String,
    /// Env map handed to hook processes.
    pub hook_env: HashMap<String, String>,
}

impl ToolTaskDeps {
    fn current_mode(&self) -> PermissionMode {
        self.mode.read().map(|mode| *mode).unwrap_or_default()
    }

    fn set_mode(&self, mode: PermissionMode) {
        if let Ok(mut slot) = self.mode.write() {
            *slot = mode;
        }
    }

    fn hook_context(&self, event: HookEvent) -> HookContext {
        HookContext::new(event, self.store.session_id(), self.store.working_dir())
            .with_transcript_path(self.store.transcript_path())
            .with_env(self.hook_env.clone())
    }
}

/// What one tool task reports back to the cycle loop.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ToolTaskOutcome {
    /// Whether the plugin actually ran.
    pub executed: bool,
    /// Whether the call was manually backgrounded.
    pub backgrounded: bool,
    /// Whether the host wants the turn to keep recursing.
    pub continue_recursion: bool,
}

impl Default for ToolTaskOutcome {
    fn default() -> Self {
        Self {
            executed: false,
            backgrounded: false,
            continue_recursion: true,
        }
    }
}

/// Drive one tool call through the full pipeline.
pub(crate) async fn run_tool_call(
    deps: Arc<ToolTaskDeps>,
    call: ToolCallPayload,
    truncated: bool,
) -> ToolTaskOutcome {
    let mut outcome = ToolTaskOutcome::default();

    // Turn teardown: leave the block as-is.
    if deps.tokens.turn_cancelled() {
        outcome.continue_recursion = false;
        return outcome;
    }
    // Tools-only abort: the block still reaches End with an error.
    if deps.tokens.tools_cancelled() {
        finish_failure(&deps, &call.id, "Cancelled");
        outcome.continue_recursion = false;
        return outcome;
    }

    // Parse arguments. Empty is an empty mapping, not an error.
    let mut args = match swell_message::parse_arguments(&call.arguments) {
        Ok(args) => args,
        Err(e) => {
            let hint = if truncated { " (output truncated)" } else { "" };
            finish_failure(
                &deps,
                &call.id,
                format!("Invalid tool arguments: {e}{hint}"),
            );
            return outcome;
        }
    };

    let ctx = ToolContextBuilder::new(&call.id, deps.permissions.clone(), deps.store.working_dir())
        .message_id(&deps.message_id)
        .session_id(deps.store.session_id())
        .permission_mode(deps.current_mode())
        .cancel(deps.tokens.tools().clone())
        .build();

    let compact_params = deps
        .registry
        .get(&call.name)
        .and_then(|tool| tool.format_compact_params(&args, &ctx));

    if let Err(e) = deps.store.update_tool_block(&call.id, |block| {
        block.begin_running(args.clone(), compact_params.clone())
    }) {
        warn!(call_id = %call.id, %e, "Tool block refused the running stage");
        return outcome;
    }
    emit(
        deps.event_tx.as_ref(),
        AgentEvent::ToolStarted {
            call_id: call.id.clone(),
            name: call.name.clone(),
        },
    );

    // PreToolUse hooks.
    let mut hook_approved = false;
    if deps.hooks.has_hooks_for(HookEvent::PreToolUse) {
        let hook_ctx = deps
            .hook_context(HookEvent::PreToolUse)
            .with_tool(&call.name, Value::Object(args.clone()));
        let executions = deps.hooks.execute_hooks(&hook_ctx).await;
        let directive = process_hook_results(HookEvent::PreToolUse, &executions);
        emit(
            deps.event_tx.as_ref(),
            AgentEvent::HooksExecuted {
                event: HookEvent::PreToolUse.into(),
                count: executions.len() as i32,
                blocked: directive.should_block,
            },
        );

        if directive.should_block {
            let reason = directive
                .error_message
                .clone()
                .unwrap_or_else(|| "blocked by PreToolUse hook".to_string());
            finish_failure(&deps, &call.id, format!("Tool execution denied: {reason}"));
            return outcome;
        }

        if let Some(Value::Object(updated)) = directive.updated_input.clone() {
            args = updated;
            refresh_block_args(&deps, &call, &args, &ctx);
        }

        match directive.permission_decision {
            Some(HookPermissionDecision::Allow) => {
                hook_approved = true;
            }
            Some(HookPermissionDecision::Ask) => {
                // Pending permission: the turn waits for the host.
                match resolve_pending_permission(&deps, &call, &mut args, &ctx, &mut outcome).await
                {
                    Ok(()) => hook_approved = true,
                    Err(reason) => {
                        finish_failure(
                            &deps,
                            &call.id,
                            format!("Tool execution denied: {reason}"),
                        );
                        return outcome;
                    }
                }
            }
            // Deny surfaces as should_block above.
            Some(HookPermissionDecision::Deny) | None => {}
        }
    }

    // Permission engine (skipped when a hook or the host already
    // approved this call).
    if !hook_approved {
        let check = deps
            .permissions
            .check(&call.name, &Value::Object(args.clone()), deps.current_mode())
            .await;
        emit(
            deps.event_tx.as_ref(),
            AgentEvent::PermissionChecked {
                tool_name: call.name.clone(),
                decision: check.decision.clone(),
            },
        );
        outcome.continue_recursion = check.should_continue_recursion;
        if let Some(mode) = check.new_permission_mode {
            deps.set_mode(mode);
        }
        match check.decision {
            PermissionDecision::Allow => {
                if let Some(Value::Object(updated)) = check.updated_input {
                    args = updated;
                    refresh_block_args(&deps, &call, &args, &ctx);
                }
            }
            PermissionDecision::Deny { message } => {
                // PostToolUse is not run for denied calls.
                finish_failure(&deps, &call.id, message);
                return outcome;
            }
            PermissionDecision::Ask => {
                // The engine resolves Ask internally; reaching here means
                // no approver was configured.
                finish_failure(&deps, &call.id, "no approver configured");
                return outcome;
            }
        }
    }

    // Execute under the tools token.
    let result = dispatch(&deps.registry, &call.name, args.clone(), &ctx).await;
    outcome.executed = true;
    outcome.backgrounded = result.backgrounded;

    let result_text = result.content.as_text();
    let update = if result.success {
        deps.store.update_tool_block(&call.id, |block| {
            block.set_backgrounded(result.backgrounded);
            block.finish_success(result_text.clone(), result.short_result.clone())
        })
    } else {
        deps.store.update_tool_block(&call.id, |block| {
            block.finish_failure(
                result
                    .error
                    .clone()
                    .unwrap_or_else(|| result_text.clone()),
            )
        })
    };
    if let Err(e) = update {
        warn!(call_id = %call.id, %e, "Tool block refused the end stage");
    }
    emit(
        deps.event_tx.as_ref(),
        AgentEvent::ToolCompleted {
            call_id: call.id.clone(),
            is_error: !result.success,
        },
    );

    // PostToolUse hooks run for every executed call, success or failure.
    if deps.hooks.has_hooks_for(HookEvent::PostToolUse) {
        let hook_ctx = deps
            .hook_context(HookEvent::PostToolUse)
            .with_tool(&call.name, Value::Object(args))
            .with_tool_response(result_text);
        let executions = deps.hooks.execute_hooks(&hook_ctx).await;
        let directive = process_hook_results(HookEvent::PostToolUse, &executions);
        emit(
            deps.event_tx.as_ref(),
            AgentEvent::HooksExecuted {
                event: HookEvent::PostToolUse.into(),
                count: executions.len() as i32,
                blocked: directive.should_block,
            },
        );

        for context in &directive.additional_context {
            let appended = deps
                .store
                .update_tool_block(&call.id, |block| block.append_result_context(context));
            if let Err(e) = appended {
                debug!(call_id = %call.id, %e, "Could not append post-hook context");
            }
        }
        if directive.should_block {
            // The tool already ran; the block decision is recorded but the
            // effect is not undone.
            warn!(
                tool = %call.name,
                reason = directive.error_message.as_deref().unwrap_or(""),
                "PostToolUse hook blocked after execution"
            );
        }
        for message in directive.system_messages {
            deps.store.append_system(message);
        }
    }

    outcome
}

/// Hand a hook-raised `ask` to the host and apply its side effects.
///
/// Returns `Err(reason)` when the call must not run.
async fn resolve_pending_permission(
    deps: &Arc<ToolTaskDeps>,
    call: &ToolCallPayload,
    args: &mut Map<String, Value>,
    ctx: &swell_tools::ToolContext,
    outcome: &mut ToolTaskOutcome,
) -> Result<(), String> {
    let Some(requester) = deps.requester.clone() else {
        return Err("no approver configured".to_string());
    };

    let request = PermissionRequest {
        tool_name: call.name.clone(),
        tool_input: Value::Object(args.clone()),
        permission_mode: deps.current_mode(),
        suggested_prefix: suggested_prefix_for(&call.name, &Value::Object(args.clone())),
        hide_persistent_option: false,
    };

    let decision = requester
        .request_permission(request)
        .await
        .map_err(|e| format!("permission callback error: {e}"))?;

    if let Some(continue_recursion) = decision.should_continue_recursion {
        outcome.continue_recursion = continue_recursion;
    }
    if let Some(mode) = decision.new_permission_mode {
        deps.set_mode(mode);
    }
    if let Some(rule_text) = &decision.new_permission_rule {
        match PermissionRule::parse(rule_text) {
            Ok(rule) => deps.permissions.add_allow_rule(rule),
            Err(e) => warn!(rule = %rule_text, %e, "Ignoring unparseable host rule"),
        }
    }

    match decision.behavior {
        HostBehavior::Allow => {
            if let Some(Value::Object(updated)) = decision.updated_input {
                *args = updated;
                refresh_block_args(deps, call, args, ctx);
            }
            Ok(())
        }
        HostBehavior::Deny => Err(decision
            .message
            .unwrap_or_else(|| "denied by user".to_string())),
    }
}

/// Re-stamp the block's parsed arguments after a hook or host replaced
/// them.
fn refresh_block_args(
    deps: &Arc<ToolTaskDeps>,
    call: &ToolCallPayload,
    args: &Map<String, Value>,
    ctx: &swell_tools::ToolContext,
) {
    let compact_params = deps
        .registry
        .get(&call.name)
        .and_then(|tool| tool.format_compact_params(args, ctx));
    let refresh = deps
        .store
        .update_tool_block(&call.id, |block| block.begin_running(args.clone(), compact_params));
    if let Err(e) = refresh {
        debug!(call_id = %call.id, %e, "Could not refresh block arguments");
    }
}

/// Drive a block to `End` with an error without running the tool.
fn finish_failure(deps: &Arc<ToolTaskDeps>, call_id: &str, error: impl Into<String>) {
    let error = error.into();
    if let Err(e) = deps
        .store
        .update_tool_block(call_id, |block| block.finish_failure(error.clone()))
    {
        warn!(call_id, %e, "Tool block refused the failure stage");
    }
    emit(
        deps.event_tx.as_ref(),
        AgentEvent::ToolCompleted {
            call_id: call_id.to_string(),
            is_error: true,
        },
    );
}
