//! The turn engine driver.
//!
//! One depth-0 `send_turn` owns the loading gate, the cancellation token
//! pair, the temporary permission rules, and finalisation; the model↔tools
//! cycles run as an explicit loop inside it, so "finalise exactly once"
//! stays a local property instead of a recursion invariant.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::RwLock;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::debug;
use tracing::info;
use tracing::warn;

use swell_gateway::AgentRequest;
use swell_gateway::AgentResponse;
use swell_gateway::GatewayError;
use swell_gateway::ModelGateway;
use swell_gateway::StreamEvent;
use swell_gateway::ToolCallPayload;
use swell_hooks::HookContext;
use swell_hooks::HookEngine;
use swell_hooks::HookEvent;
use swell_hooks::process_hook_results;
use swell_message::Block;
use swell_message::ToolBlock;
use swell_policy::PermissionEngine;
use swell_policy::PermissionRequester;
use swell_policy::PermissionRule;
use swell_protocol::AgentEvent;
use swell_protocol::OperationType;
use swell_protocol::PermissionMode;
use swell_protocol::TokenUsage;
use swell_session::SessionStore;
use swell_tools::ToolRegistry;

use crate::cancel::TurnTokens;
use crate::compress::handle_usage_and_compression;
use crate::config::EngineConfig;
use crate::result::TurnOptions;
use crate::result::TurnResult;
use crate::tool_task::ToolTaskDeps;
use crate::tool_task::ToolTaskOutcome;
use crate::tool_task::run_tool_call;

/// Best-effort event emission; a slow consumer never blocks the engine.
pub(crate) fn emit(tx: Option<&mpsc::Sender<AgentEvent>>, event: AgentEvent) {
    if let Some(tx) = tx
        && let Err(e) = tx.try_send(event)
    {
        debug!("Dropping agent event: {e}");
    }
}

/// How one pass through the cycle loop ended.
enum CycleEnd {
    /// The model stopped requesting tools.
    Completed,
    /// A `UserPromptSubmit` hook blocked the turn.
    Blocked(String),
    /// The user aborted.
    Interrupted,
    /// The model call failed (non-cancel).
    ModelError(String),
}

/// Aggregate of one cycle-loop pass.
struct CycleRun {
    end: CycleEnd,
    cycles: i32,
    last_total: i64,
}

/// The agent turn engine.
pub struct AgentEngine {
    gateway: Arc<dyn ModelGateway>,
    registry: Arc<ToolRegistry>,
    permissions: Arc<PermissionEngine>,
    hooks: Arc<HookEngine>,
    store: Arc<SessionStore>,
    config: EngineConfig,
    event_tx: Option<mpsc::Sender<AgentEvent>>,
    requester: RwLock<Option<Arc<dyn PermissionRequester>>>,
    hook_env: HashMap<String, String>,
    is_loading: AtomicBool,
    tokens: Mutex<Option<TurnTokens>>,
}

impl AgentEngine {
    /// Create an engine over its collaborators.
    pub fn new(
        gateway: Arc<dyn ModelGateway>,
        registry: Arc<ToolRegistry>,
        permissions: Arc<PermissionEngine>,
        hooks: Arc<HookEngine>,
        store: Arc<SessionStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            gateway,
            registry,
            permissions,
            hooks,
            store,
            config,
            event_tx: None,
            requester: RwLock::new(None),
            hook_env: HashMap::new(),
            is_loading: AtomicBool::new(false),
            tokens: Mutex::new(None),
        }
    }

    /// Attach the host event channel.
    pub fn with_event_tx(mut self, tx: mpsc::Sender<AgentEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    /// Extra environment exported to every hook process.
    pub fn with_hook_env(mut self, env: HashMap<String, String>) -> Self {
        self.hook_env = env;
        self
    }

    /// Install the host approval callback (used for engine fall-through
    /// and for hook-raised `ask` decisions).
    pub fn set_requester(&self, requester: Arc<dyn PermissionRequester>) {
        self.permissions.set_requester(requester.clone());
        if let Ok(mut slot) = self.requester.write() {
            *slot = Some(requester);
        }
    }

    /// Whether a depth-0 turn is in flight.
    pub fn is_loading(&self) -> bool {
        self.is_loading.load(Ordering::SeqCst)
    }

    /// The session store this engine drives.
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Abort the whole in-flight turn. No-op when idle.
    pub fn abort_turn(&self) {
        if let Ok(slot) = self.tokens.lock()
            && let Some(tokens) = slot.as_ref()
        {
            info!("Aborting turn");
            tokens.abort_turn();
        }
    }

    /// Abort the in-flight tools, leaving the turn alive. No-op when idle.
    pub fn abort_tools(&self) {
        if let Ok(slot) = self.tokens.lock()
            && let Some(tokens) = slot.as_ref()
        {
            info!("Aborting tools");
            tokens.abort_tools();
        }
    }

    /// Run one full turn for a user prompt.
    ///
    /// Never returns an error: failures surface as blocks in the message
    /// store and in the result's stop reason. A second concurrent call is
    /// a no-op returning [`StopReason::AlreadyRunning`].
    pub async fn send_turn(&self, prompt: &str, options: TurnOptions) -> TurnResult {
        if self
            .is_loading
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("send_turn rejected: a turn is already in flight");
            return TurnResult::already_running();
        }

        let turn_id = uuid::Uuid::new_v4().to_string();
        emit(
            self.event_tx.as_ref(),
            AgentEvent::TurnStarted {
                turn_id: turn_id.clone(),
            },
        );

        let mode = Arc::new(RwLock::new(
            options
                .permission_mode
                .unwrap_or(self.config.permission_mode),
        ));
        self.install_temporary_rules(&options);

        let result = self.run_depth0(prompt, &options, &turn_id, &mode).await;

        // Finalisation runs exactly once per depth-0 entry, whatever the
        // outcome.
        self.permissions.clear_temporary_rules();
        if let Ok(mut slot) = self.tokens.lock() {
            *slot = None;
        }
        self.is_loading.store(false, Ordering::SeqCst);
        emit(
            self.event_tx.as_ref(),
            AgentEvent::TurnCompleted { turn_id },
        );
        result
    }

    fn install_temporary_rules(&self, options: &TurnOptions) {
        let rules: Vec<PermissionRule> = options
            .allowed_rules
            .iter()
            .filter_map(|text| match PermissionRule::parse(text) {
                Ok(rule) => Some(rule),
                Err(e) => {
                    warn!(rule = %text, %e, "Skipping unparseable turn rule");
                    None
                }
            })
            .collect();
        self.permissions.install_temporary_rules(rules);
    }

    /// The depth-0 body: cycles, persistence, stop-hooks and their
    /// re-entries.
    async fn run_depth0(
        &self,
        prompt: &str,
        options: &TurnOptions,
        turn_id: &str,
        mode: &Arc<RwLock<PermissionMode>>,
    ) -> TurnResult {
        let mut prompt_to_submit = Some(prompt.to_string());
        let mut continuations = 0;
        let mut total_cycles = 0;
        let mut last_total = 0;

        loop {
            let tokens = TurnTokens::new();
            if let Ok(mut slot) = self.tokens.lock() {
                *slot = Some(tokens.clone());
            }

            let run = self
                .run_cycles(prompt_to_submit.take(), options, turn_id, &tokens, mode)
                .await;
            total_cycles += run.cycles;
            last_total = last_total.max(run.last_total);

            // The session is persisted on every outcome, including aborts.
            if let Err(e) = self.store.save().await {
                warn!(%e, "Session persist failed; turn continues");
            }

            // Blocked prompts and cancellations skip stop-hooks; model
            // failures finalise normally.
            let result = match run.end {
                CycleEnd::Blocked(reason) => {
                    return TurnResult::blocked(reason, last_total);
                }
                CycleEnd::Interrupted => {
                    emit(self.event_tx.as_ref(), AgentEvent::Interrupted);
                    return TurnResult::interrupted(total_cycles, last_total);
                }
                CycleEnd::ModelError(message) => {
                    TurnResult::model_error(message, total_cycles, last_total)
                }
                CycleEnd::Completed => TurnResult::completed(total_cycles, last_total),
            };

            match self.run_stop_hooks().await {
                Some(reason) => {
                    if let Some(cap) = self.config.max_stop_continuations
                        && continuations >= cap
                    {
                        warn!(cap, "Stop-hook continuation cap reached");
                        return result;
                    }
                    continuations += 1;
                    info!(continuations, %reason, "Stop hook requested continuation");
                    self.store
                        .append_system(format!("A stop hook blocked completion: {reason}"));
                    // Re-enter at depth 0: fresh tokens, same finaliser.
                }
                None => return result,
            }
        }
    }

    /// Run the stop-hook batch; returns the block reason when the hooks
    /// want the conversation to continue.
    async fn run_stop_hooks(&self) -> Option<String> {
        let event = if self.config.subagent {
            HookEvent::SubagentStop
        } else {
            HookEvent::Stop
        };
        if !self.hooks.has_hooks_for(event) {
            return None;
        }

        let mut ctx = HookContext::new(event, self.store.session_id(), self.store.working_dir())
            .with_transcript_path(self.store.transcript_path())
            .with_env(self.hook_env.clone());
        if self.config.subagent {
            ctx = ctx.with_subagent_type("subagent");
        }

        let executions = self.hooks.execute_hooks(&ctx).await;
        let directive = process_hook_results(event, &executions);
        emit(
            self.event_tx.as_ref(),
            AgentEvent::HooksExecuted {
                event: event.into(),
                count: executions.len() as i32,
                blocked: directive.should_block,
            },
        );
        for message in &directive.system_messages {
            self.store.append_system(message.clone());
        }

        directive.should_block.then(|| {
            directive
                .error_message
                .unwrap_or_else(|| "stop hook requested continuation".to_string())
        })
    }

    /// The explicit model↔tools cycle loop.
    async fn run_cycles(
        &self,
        prompt: Option<String>,
        options: &TurnOptions,
        turn_id: &str,
        tokens: &TurnTokens,
        mode: &Arc<RwLock<PermissionMode>>,
    ) -> CycleRun {
        let mut cycles = 0;
        let mut last_total = 0;

        if let Some(prompt) = prompt {
            if let Some(reason) = self.run_prompt_hooks(&prompt).await {
                self.store.append_error(&reason);
                emit(
                    self.event_tx.as_ref(),
                    AgentEvent::Error {
                        message: reason.clone(),
                    },
                );
                return CycleRun {
                    end: CycleEnd::Blocked(reason),
                    cycles,
                    last_total,
                };
            }
            self.store.append_user(prompt);
        }

        loop {
            if tokens.turn_cancelled() {
                return CycleRun {
                    end: CycleEnd::Interrupted,
                    cycles,
                    last_total,
                };
            }

            let current_mode = mode.read().map(|m| *m).unwrap_or_default();
            let (response, streamed_assistant) =
                self.call_model(options, tokens, current_mode).await;

            let response = match response {
                Ok(response) => response,
                Err(e) if e.is_cancelled() || tokens.turn_cancelled() => {
                    return CycleRun {
                        end: CycleEnd::Interrupted,
                        cycles,
                        last_total,
                    };
                }
                Err(e) => {
                    let message = format!("Model call failed: {e}");
                    self.store.append_error(&message);
                    emit(
                        self.event_tx.as_ref(),
                        AgentEvent::Error {
                            message: message.clone(),
                        },
                    );
                    return CycleRun {
                        end: CycleEnd::ModelError(message),
                        cycles,
                        last_total,
                    };
                }
            };

            let assistant_id = self.materialize_assistant(streamed_assistant, &response);
            let usage = self.attach_usage(&assistant_id, options, &response);
            if let Some(usage) = &usage {
                last_total = usage.comprehensive();
            }
            cycles += 1;
            emit(
                self.event_tx.as_ref(),
                AgentEvent::CycleCompleted {
                    turn_id: turn_id.to_string(),
                    cycle: cycles - 1,
                    usage: usage.clone().unwrap_or_default(),
                },
            );

            if response.tool_calls.is_empty() {
                if response.is_truncated() {
                    let message = "Model output was cut off by the output token limit. \
                                   Try a smaller request or raise the limit."
                        .to_string();
                    self.store.append_error(&message);
                    emit(self.event_tx.as_ref(), AgentEvent::Error { message });
                }
                if let Some(usage) = &usage {
                    handle_usage_and_compression(
                        &self.config.compressor,
                        &self.gateway,
                        &self.store,
                        tokens,
                        self.event_tx.as_ref(),
                        usage,
                    )
                    .await;
                }
                return CycleRun {
                    end: CycleEnd::Completed,
                    cycles,
                    last_total,
                };
            }

            let outcomes = self
                .run_tool_batch(&response, &assistant_id, tokens, mode)
                .await;

            if let Some(usage) = &usage {
                handle_usage_and_compression(
                    &self.config.compressor,
                    &self.gateway,
                    &self.store,
                    tokens,
                    self.event_tx.as_ref(),
                    usage,
                )
                .await;
            }

            if tokens.any_cancelled() {
                return CycleRun {
                    end: CycleEnd::Interrupted,
                    cycles,
                    last_total,
                };
            }
            let all_backgrounded =
                !outcomes.is_empty() && outcomes.iter().all(|o| o.backgrounded);
            if all_backgrounded {
                debug!("Whole batch backgrounded; suppressing recursion");
                return CycleRun {
                    end: CycleEnd::Completed,
                    cycles,
                    last_total,
                };
            }
            if outcomes.iter().any(|o| !o.continue_recursion) {
                debug!("Host asked to stop recursion");
                return CycleRun {
                    end: CycleEnd::Completed,
                    cycles,
                    last_total,
                };
            }
            // Recurse: one more gateway call per model response.
        }
    }

    /// `UserPromptSubmit` hooks; returns the block reason when the turn
    /// must abort before the model runs.
    async fn run_prompt_hooks(&self, prompt: &str) -> Option<String> {
        if !self.hooks.has_hooks_for(HookEvent::UserPromptSubmit) {
            return None;
        }
        let ctx = HookContext::new(
            HookEvent::UserPromptSubmit,
            self.store.session_id(),
            self.store.working_dir(),
        )
        .with_transcript_path(self.store.transcript_path())
        .with_env(self.hook_env.clone())
        .with_user_prompt(prompt);

        let executions = self.hooks.execute_hooks(&ctx).await;
        let directive = process_hook_results(HookEvent::UserPromptSubmit, &executions);
        emit(
            self.event_tx.as_ref(),
            AgentEvent::HooksExecuted {
                event: HookEvent::UserPromptSubmit.into(),
                count: executions.len() as i32,
                blocked: directive.should_block,
            },
        );

        if directive.should_block {
            return Some(
                directive
                    .error_message
                    .unwrap_or_else(|| "prompt blocked by hook".to_string()),
            );
        }
        for message in directive.system_messages {
            self.store.append_system(message);
        }
        for context in directive.additional_context {
            self.store.append_system(context);
        }
        None
    }

    /// One gateway call, consuming the streaming sink into the store.
    async fn call_model(
        &self,
        options: &TurnOptions,
        tokens: &TurnTokens,
        mode: PermissionMode,
    ) -> (Result<AgentResponse, GatewayError>, Option<String>) {
        let mut definitions = self.registry.definitions_for_mode(mode);
        if let Some(allowlist) = &options.tools_allowlist {
            definitions.retain(|d| allowlist.contains(&d.name));
        }

        let mut request = AgentRequest {
            messages: self.store.wire_messages(),
            system_prompt: self.config.system_prompt_for(mode),
            tools: definitions,
            memory: self.config.memory.clone(),
            session_id: self.store.session_id(),
            model: options.model.clone().or_else(|| self.config.model.clone()),
            max_tokens: options.max_tokens.or(self.config.max_tokens),
            cancel: tokens.turn().clone(),
            stream: None,
        };

        if !self.config.streaming {
            return (self.gateway.call_agent(request).await, None);
        }

        let (tx, mut rx) = mpsc::channel::<StreamEvent>(64);
        request.stream = Some(tx);

        let consume = async {
            let mut assistant_id: Option<String> = None;
            while let Some(event) = rx.recv().await {
                self.apply_stream_event(&mut assistant_id, event);
            }
            assistant_id
        };
        // The gateway drops the sink when the call resolves, which ends
        // the consumer.
        let (response, assistant_id) = tokio::join!(self.gateway.call_agent(request), consume);
        (response, assistant_id)
    }

    /// Apply one streaming chunk to the store, lazily creating the
    /// assistant message.
    fn apply_stream_event(&self, assistant_id: &mut Option<String>, event: StreamEvent) {
        let message_id = assistant_id
            .get_or_insert_with(|| self.store.append_assistant())
            .clone();

        match event {
            StreamEvent::Content { delta } => {
                self.store
                    .with_message(&message_id, |m| m.append_text_delta(&delta));
                emit(self.event_tx.as_ref(), AgentEvent::TextDelta { delta });
            }
            StreamEvent::Reasoning { delta } => {
                self.store
                    .with_message(&message_id, |m| m.append_reasoning_delta(&delta));
                emit(self.event_tx.as_ref(), AgentEvent::ReasoningDelta { delta });
            }
            StreamEvent::ToolCall { delta } => {
                let known = self
                    .store
                    .update_tool_block(&delta.id, |block| {
                        if let Some(name) = &delta.name {
                            block.set_name(name);
                        }
                        block.append_arguments_delta(&delta.arguments_delta)
                    })
                    .is_ok();
                if !known {
                    self.store.with_message(&message_id, |m| {
                        let mut block = ToolBlock::streaming(
                            &delta.id,
                            delta.name.as_deref().unwrap_or_default(),
                        );
                        block.arguments_raw = delta.arguments_delta.clone();
                        m.push_block(Block::Tool(block));
                    });
                }
            }
        }
    }

    /// Ensure the assistant message exists and, when nothing was
    /// streamed, write the final content once.
    fn materialize_assistant(
        &self,
        streamed_assistant: Option<String>,
        response: &AgentResponse,
    ) -> String {
        match streamed_assistant {
            Some(id) => id,
            None => {
                let id = self.store.append_assistant();
                self.store.with_message(&id, |message| {
                    if let Some(reasoning) = &response.reasoning {
                        message.append_reasoning_delta(reasoning);
                    }
                    if let Some(content) = &response.content {
                        message.append_text_delta(content);
                    }
                });
                id
            }
        }
    }

    /// Attach the cycle's usage to the assistant message, when the
    /// response reported one.
    fn attach_usage(
        &self,
        assistant_id: &str,
        options: &TurnOptions,
        response: &AgentResponse,
    ) -> Option<TokenUsage> {
        let mut usage = response.usage.clone()?;
        usage.operation = OperationType::Agent;
        if usage.model.is_empty() {
            usage.model = options
                .model
                .clone()
                .or_else(|| self.config.model.clone())
                .unwrap_or_default();
        }
        self.store.with_message(assistant_id, |message| {
            message.usage = Some(usage.clone());
        });
        Some(usage)
    }

    /// Launch the batch in call order, await all tasks.
    async fn run_tool_batch(
        &self,
        response: &AgentResponse,
        assistant_id: &str,
        tokens: &TurnTokens,
        mode: &Arc<RwLock<PermissionMode>>,
    ) -> Vec<ToolTaskOutcome> {
        let truncated = response.is_truncated();
        let deps = Arc::new(ToolTaskDeps {
            store: self.store.clone(),
            registry: self.registry.clone(),
            permissions: self.permissions.clone(),
            hooks: self.hooks.clone(),
            requester: self.requester.read().ok().and_then(|slot| slot.clone()),
            event_tx: self.event_tx.clone(),
            mode: mode.clone(),
            tokens: tokens.clone(),
            message_id: assistant_id.to_string(),
            hook_env: self.hook_env.clone(),
        });

        // Blocks are created (and queued events emitted) in call order;
        // completions may land in any order.
        let mut handles = Vec::with_capacity(response.tool_calls.len());
        for call in &response.tool_calls {
            self.ensure_tool_block(assistant_id, call);
            emit(
                self.event_tx.as_ref(),
                AgentEvent::ToolQueued {
                    call_id: call.id.clone(),
                    name: call.name.clone(),
                    input: serde_json::from_str(&call.arguments).unwrap_or(Value::Null),
                },
            );
            handles.push(tokio::spawn(run_tool_call(
                deps.clone(),
                call.clone(),
                truncated,
            )));
        }

        futures::future::join_all(handles)
            .await
            .into_iter()
            .map(|joined| match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(%e, "Tool task panicked");
                    ToolTaskOutcome::default()
                }
            })
            .collect()
    }

    /// Create the tool block when streaming did not, and stamp the final
    /// raw arguments either way.
    fn ensure_tool_block(&self, assistant_id: &str, call: &ToolCallPayload) {
        let known = self
            .store
            .update_tool_block(&call.id, |block| {
                block.set_name(&call.name);
                block.arguments_raw = call.arguments.clone();
                Ok(())
            })
            .is_ok();
        if !known {
            self.store.with_message(assistant_id, |message| {
                let mut block = ToolBlock::streaming(&call.id, &call.name);
                block.arguments_raw = call.arguments.clone();
                message.push_block(Block::Tool(block));
            });
        }
    }
}

impl std::fmt::Debug for AgentEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentEngine")
            .field("session_id", &self.store.session_id())
            .field("is_loading", &self.is_loading())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "engine.test.rs"]
mod tests;
