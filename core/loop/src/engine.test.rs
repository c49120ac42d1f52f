use super::*;
use crate::result::StopReason;
use crate::testing::ScriptedGateway;
use crate::testing::SpyTool;
use crate::testing::plain_response;
use crate::testing::tool_response;
use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::AtomicUsize;
use swell_gateway::FinishReason;
use swell_gateway::StreamEvent;
use swell_gateway::ToolCallDelta;
use swell_hooks::HookDefinition;
use swell_message::ToolStage;
use swell_policy::HostDecision;
use swell_policy::PermissionRequest;
use swell_policy::PolicyConfig;
use swell_tools::ToolResult;

struct Harness {
    engine: Arc<AgentEngine>,
    gateway: Arc<ScriptedGateway>,
    store: Arc<SessionStore>,
    registry: Arc<ToolRegistry>,
    permissions: Arc<PermissionEngine>,
    hooks: Arc<HookEngine>,
    dir: tempfile::TempDir,
}

fn harness(mutate: impl FnOnce(&mut EngineConfig)) -> Harness {
    harness_with_policy(PolicyConfig::default(), mutate)
}

fn harness_with_policy(
    policy: PolicyConfig,
    mutate: impl FnOnce(&mut EngineConfig),
) -> Harness {
    let dir = tempfile::tempdir().expect("tempdir");
    let gateway = Arc::new(ScriptedGateway::new());
    let registry = Arc::new(ToolRegistry::new());
    let permissions = Arc::new(PermissionEngine::new(dir.path(), policy).expect("engine"));
    let hooks = Arc::new(HookEngine::new());
    let store = Arc::new(SessionStore::new(dir.path(), dir.path()));

    let mut config = EngineConfig {
        system_prompt: "You are a coding agent.".to_string(),
        streaming: false,
        ..EngineConfig::default()
    };
    mutate(&mut config);

    let engine = Arc::new(AgentEngine::new(
        gateway.clone(),
        registry.clone(),
        permissions.clone(),
        hooks.clone(),
        store.clone(),
        config,
    ));
    Harness {
        engine,
        gateway,
        store,
        registry,
        permissions,
        hooks,
        dir,
    }
}

fn sh_hook(name: &str, event: HookEvent, script: &str) -> HookDefinition {
    HookDefinition::command(
        name,
        event,
        "/bin/sh",
        vec!["-c".to_string(), script.to_string()],
    )
}

fn tool_block_of(store: &SessionStore, call_id: &str) -> swell_message::ToolBlock {
    store
        .messages()
        .iter()
        .flat_map(|m| m.tool_blocks().cloned().collect::<Vec<_>>())
        .find(|b| b.id == call_id)
        .expect("tool block")
}

struct ScriptedRequester {
    decision: HostDecision,
    calls: AtomicUsize,
    last_request: std::sync::Mutex<Option<PermissionRequest>>,
}

impl ScriptedRequester {
    fn new(decision: HostDecision) -> Arc<Self> {
        Arc::new(Self {
            decision,
            calls: AtomicUsize::new(0),
            last_request: std::sync::Mutex::new(None),
        })
    }
}

#[async_trait]
impl PermissionRequester for ScriptedRequester {
    async fn request_permission(
        &self,
        request: PermissionRequest,
    ) -> Result<HostDecision, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().expect("lock") = Some(request);
        Ok(self.decision.clone())
    }
}

// ── S1: plain answer, no tools ──────────────────────────────────────────

#[tokio::test]
async fn test_s1_plain_answer() {
    let h = harness(|_| {});
    h.gateway.push_response(plain_response("hi"));

    let result = h.engine.send_turn("hello", TurnOptions::default()).await;

    assert_eq!(result.stop_reason, StopReason::Completed);
    assert_eq!(result.cycles, 1);
    assert!(!h.engine.is_loading());

    let messages = h.store.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].text(), "hello");
    assert_eq!(messages[1].text(), "hi");
    assert_eq!(h.store.usages().len(), 1);
    assert_eq!(h.gateway.calls(), 1);

    // The session reached disk.
    assert!(h.store.transcript_path().exists());
}

#[tokio::test]
async fn test_s1_stop_hook_invoked_once() {
    let h = harness(|_| {});
    h.gateway.push_response(plain_response("hi"));
    h.hooks.register(sh_hook(
        "notify",
        HookEvent::Stop,
        "printf '{\"systemMessage\": \"turn finished\"}'",
    ));

    let result = h.engine.send_turn("hello", TurnOptions::default()).await;
    assert_eq!(result.stop_reason, StopReason::Completed);

    let system_notes: Vec<String> = h
        .store
        .messages()
        .iter()
        .filter(|m| m.role == swell_message::Role::System)
        .map(swell_message::Message::text)
        .collect();
    assert_eq!(system_notes, vec!["turn finished"]);
    assert_eq!(h.gateway.calls(), 1);
}

// ── S2: single shell tool auto-approved by rule ─────────────────────────

#[tokio::test]
async fn test_s2_tool_auto_approved_then_recursion() {
    let h = harness_with_policy(
        PolicyConfig {
            allow: vec!["Bash(git status:*)".to_string()],
            ..PolicyConfig::default()
        },
        |_| {},
    );
    let bash = SpyTool::new("Bash");
    h.registry.register(bash.clone());

    h.gateway.push_response(tool_response(vec![(
        "call-1",
        "Bash",
        r#"{"command": "git status -s"}"#,
    )]));
    h.gateway.push_response(plain_response("clean tree"));

    let result = h.engine.send_turn("status?", TurnOptions::default()).await;

    assert_eq!(result.stop_reason, StopReason::Completed);
    assert_eq!(result.cycles, 2);
    assert_eq!(bash.execution_count(), 1);
    // Recursion fairness: one gateway call per model response.
    assert_eq!(h.gateway.calls(), 2);

    let block = tool_block_of(&h.store, "call-1");
    assert_eq!(block.stage, ToolStage::End);
    assert_eq!(block.success, Some(true));
    assert_eq!(block.result.as_deref(), Some("Bash ran"));
    assert_eq!(block.compact_params.as_deref(), Some("git status -s"));
}

// ── Law 1: at most one concurrent depth-0 turn ──────────────────────────

#[tokio::test]
async fn test_second_concurrent_turn_is_noop() {
    let h = harness(|_| {});
    *h.gateway.hang_until_cancelled.lock().expect("lock") = true;

    let engine = h.engine.clone();
    let first = tokio::spawn(async move {
        engine.send_turn("first", TurnOptions::default()).await
    });

    // Wait until the first turn holds the loading gate.
    while !h.engine.is_loading() {
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let second = h.engine.send_turn("second", TurnOptions::default()).await;
    assert_eq!(second.stop_reason, StopReason::AlreadyRunning);

    h.engine.abort_turn();
    let first = first.await.expect("join");
    assert_eq!(first.stop_reason, StopReason::Interrupted);
    assert!(!h.engine.is_loading());
    // The rejected call added no messages.
    assert_eq!(h.store.messages().len(), 1);
}

// ── S3: PreToolUse ask, resolved by the host ────────────────────────────

fn ask_hook() -> HookDefinition {
    sh_hook(
        "confirm-delete",
        HookEvent::PreToolUse,
        r#"printf '{"hookSpecificOutput": {"permissionDecision": "ask", "permissionDecisionReason": "confirm"}}'"#,
    )
}

#[tokio::test]
async fn test_s3_ask_then_host_allows_with_updated_input() {
    let h = harness(|_| {});
    let delete = SpyTool::new("Delete");
    h.registry.register(delete.clone());
    h.hooks.register(ask_hook());

    let requester = ScriptedRequester::new(HostDecision {
        updated_input: Some(json!({"file_path": "/safe/x"})),
        should_continue_recursion: Some(true),
        ..HostDecision::allow()
    });
    h.engine.set_requester(requester.clone());

    h.gateway.push_response(tool_response(vec![(
        "call-1",
        "Delete",
        r#"{"file_path": "/tmp/original"}"#,
    )]));
    h.gateway.push_response(plain_response("deleted"));

    let result = h.engine.send_turn("clean up", TurnOptions::default()).await;

    assert_eq!(result.stop_reason, StopReason::Completed);
    assert_eq!(requester.calls.load(Ordering::SeqCst), 1);
    assert_eq!(delete.execution_count(), 1);

    // The tool ran with the host's replacement input.
    let args = delete.last_args.lock().expect("lock").clone().expect("args");
    assert_eq!(args.get("file_path").and_then(|v| v.as_str()), Some("/safe/x"));

    let block = tool_block_of(&h.store, "call-1");
    assert_eq!(block.success, Some(true));
    assert_eq!(h.gateway.calls(), 2);
}

#[tokio::test]
async fn test_s3_ask_then_host_denies_recursion_still_proceeds() {
    let h = harness(|_| {});
    let delete = SpyTool::new("Delete");
    h.registry.register(delete.clone());
    h.hooks.register(ask_hook());
    h.engine
        .set_requester(ScriptedRequester::new(HostDecision::deny("not today")));

    h.gateway.push_response(tool_response(vec![(
        "call-1",
        "Delete",
        r#"{"file_path": "/tmp/x"}"#,
    )]));
    h.gateway.push_response(plain_response("understood"));

    let result = h.engine.send_turn("clean up", TurnOptions::default()).await;

    assert_eq!(result.stop_reason, StopReason::Completed);
    assert_eq!(delete.execution_count(), 0);

    let block = tool_block_of(&h.store, "call-1");
    assert_eq!(block.success, Some(false));
    assert_eq!(
        block.error.as_deref(),
        Some("Tool execution denied: not today")
    );
    // The model sees the denial on the next cycle.
    assert_eq!(h.gateway.calls(), 2);
}

// ── S4: malformed arguments with length truncation ──────────────────────

#[tokio::test]
async fn test_s4_malformed_arguments_with_truncation_hint() {
    let h = harness(|_| {});
    let edit = SpyTool::new("Edit");
    let read = SpyTool::new("Read");
    h.registry.register(edit.clone());
    h.registry.register(read.clone());

    let mut response = tool_response(vec![
        ("call-1", "Edit", r#"{"file_pa"#),
        ("call-2", "Read", r#"{"file_path": "ok.txt"}"#),
    ]);
    response.finish_reason = Some(FinishReason::Length);
    h.gateway.push_response(response);
    h.gateway.push_response(plain_response("retrying"));

    let result = h.engine.send_turn("edit", TurnOptions::default()).await;
    assert_eq!(result.stop_reason, StopReason::Completed);

    let broken = tool_block_of(&h.store, "call-1");
    assert_eq!(broken.stage, ToolStage::End);
    assert_eq!(broken.success, Some(false));
    assert!(broken.error.as_deref().expect("error").contains("(output truncated)"));
    assert_eq!(edit.execution_count(), 0);

    // The sibling call is unaffected.
    let sibling = tool_block_of(&h.store, "call-2");
    assert_eq!(sibling.success, Some(true));
    assert_eq!(read.execution_count(), 1);

    // Recursion still occurs so the model can retry.
    assert_eq!(h.gateway.calls(), 2);
}

#[tokio::test]
async fn test_truncation_without_tool_calls_appends_error_block() {
    let h = harness(|_| {});
    let mut response = plain_response("half an ans");
    response.finish_reason = Some(FinishReason::Length);
    h.gateway.push_response(response);

    let result = h.engine.send_turn("hello", TurnOptions::default()).await;
    assert_eq!(result.stop_reason, StopReason::Completed);

    let has_error = h.store.messages().iter().any(|m| {
        m.blocks
            .iter()
            .any(|b| matches!(b, swell_message::Block::Error { message } if message.contains("token limit")))
    });
    assert!(has_error);
    assert_eq!(h.gateway.calls(), 1);
}

#[tokio::test]
async fn test_empty_arguments_parse_to_empty_mapping() {
    let h = harness(|_| {});
    let read = SpyTool::new("Read");
    h.registry.register(read.clone());

    h.gateway
        .push_response(tool_response(vec![("call-1", "Read", "")]));
    h.gateway.push_response(plain_response("done"));

    h.engine.send_turn("read", TurnOptions::default()).await;
    assert_eq!(read.execution_count(), 1);
    let args = read.last_args.lock().expect("lock").clone().expect("args");
    assert!(args.is_empty());
}

// ── S5: user abort during tool execution ────────────────────────────────

#[tokio::test]
async fn test_s5_abort_during_tools() {
    let h = harness(|_| {});
    let slow = SpyTool::hanging("Bash");
    h.registry.register(slow.clone());
    h.hooks.register(sh_hook(
        "never",
        HookEvent::Stop,
        "printf '{\"systemMessage\": \"should not appear\"}'",
    ));

    h.gateway.push_response(tool_response(vec![
        ("call-1", "Bash", r#"{"command": "sleep 100"}"#),
        ("call-2", "Bash", r#"{"command": "sleep 100"}"#),
    ]));

    let engine = h.engine.clone();
    let turn = tokio::spawn(async move {
        engine
            .send_turn(
                "run it",
                TurnOptions {
                    permission_mode: Some(PermissionMode::BypassPermissions),
                    ..TurnOptions::default()
                },
            )
            .await
    });

    // Let both tools start, then abort the turn.
    while slow.execution_count() < 2 {
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    h.engine.abort_turn();

    let result = turn.await.expect("join");
    assert_eq!(result.stop_reason, StopReason::Interrupted);
    assert!(!h.engine.is_loading());

    // No recursion and no stop hook after cancellation.
    assert_eq!(h.gateway.calls(), 1);
    let no_stop_note = h
        .store
        .messages()
        .iter()
        .all(|m| !m.text().contains("should not appear"));
    assert!(no_stop_note);

    // The session was still persisted.
    assert!(h.store.transcript_path().exists());
}

// ── S6: compression trigger ─────────────────────────────────────────────

#[tokio::test]
async fn test_s6_compression_trigger() {
    let h = harness(|config| {
        config.compressor.input_token_ceiling = Some(1000);
    });
    // Seed an earlier turn so there is a compressible prefix.
    h.store.append_user("earlier question");
    let id = h.store.append_assistant();
    h.store.with_message(&id, |m| m.append_text_delta("earlier answer"));

    let mut response = plain_response("fresh answer");
    response.usage = Some(TokenUsage {
        prompt_tokens: 1100,
        completion_tokens: 100,
        total_tokens: 1200,
        ..TokenUsage::agent(0, 0, "test-model")
    });
    h.gateway.push_response(response);
    h.gateway
        .set_compress_response(swell_gateway::CompressResponse {
            content: "prior context, summarised".to_string(),
            usage: Some(TokenUsage::agent(40, 10, "test-model")),
        });

    let result = h.engine.send_turn("new question", TurnOptions::default()).await;
    assert_eq!(result.stop_reason, StopReason::Completed);
    assert_eq!(h.gateway.compress_calls.load(Ordering::SeqCst), 1);

    let messages = h.store.messages();
    // [compress summary, latest user, latest assistant]
    assert_eq!(messages.len(), 3);
    match &messages[0].blocks[0] {
        swell_message::Block::Compress { summary, usage } => {
            assert_eq!(summary, "prior context, summarised");
            assert_eq!(
                usage.as_ref().map(|u| u.operation),
                Some(OperationType::Compress)
            );
        }
        other => panic!("expected compress block, got {other:?}"),
    }
    assert_eq!(h.store.latest_total_tokens(), 1200);
}

// ── Prompt hooks ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_prompt_hook_blocks_before_model() {
    let h = harness(|_| {});
    h.hooks.register(sh_hook(
        "gatekeeper",
        HookEvent::UserPromptSubmit,
        "echo 'not allowed' >&2; exit 2",
    ));

    let result = h.engine.send_turn("do bad things", TurnOptions::default()).await;
    assert_eq!(
        result.stop_reason,
        StopReason::Blocked {
            reason: "not allowed".to_string()
        }
    );
    assert_eq!(h.gateway.calls(), 0);
    assert!(!h.engine.is_loading());

    // Surfaced as an error block; the prompt itself was not appended.
    let messages = h.store.messages();
    assert_eq!(messages.len(), 1);
    assert!(matches!(
        &messages[0].blocks[0],
        swell_message::Block::Error { message } if message == "not allowed"
    ));
}

// ── Stop-hook re-entry ──────────────────────────────────────────────────

#[tokio::test]
async fn test_stop_hook_continue_reenters_once() {
    let h = harness(|_| {});
    h.gateway.push_response(plain_response("first"));
    h.gateway.push_response(plain_response("second"));
    // Block completion only on the first run (marker file breaks the
    // loop).
    h.hooks.register(sh_hook(
        "keep-going",
        HookEvent::Stop,
        r#"if [ ! -f "$SWELL_PROJECT_DIR/marker" ]; then touch "$SWELL_PROJECT_DIR/marker"; printf '{"continue": false, "stopReason": "tests missing"}'; fi"#,
    ));

    let result = h.engine.send_turn("implement", TurnOptions::default()).await;
    assert_eq!(result.stop_reason, StopReason::Completed);
    assert_eq!(h.gateway.calls(), 2);
    assert!(h.dir.path().join("marker").exists());

    // The hook's reason was fed back into the conversation.
    let reentry_note = h
        .store
        .messages()
        .iter()
        .any(|m| m.text().contains("tests missing"));
    assert!(reentry_note);
}

#[tokio::test]
async fn test_stop_hook_continuation_cap() {
    let h = harness(|config| {
        config.max_stop_continuations = Some(2);
    });
    // Always block.
    h.hooks.register(sh_hook(
        "forever",
        HookEvent::Stop,
        r#"printf '{"continue": false, "stopReason": "again"}'"#,
    ));

    let result = h.engine.send_turn("go", TurnOptions::default()).await;
    assert_eq!(result.stop_reason, StopReason::Completed);
    // Initial pass plus two capped re-entries.
    assert_eq!(h.gateway.calls(), 3);
}

// ── Permission plumbing through the turn ────────────────────────────────

#[tokio::test]
async fn test_temporary_rules_active_then_cleared() {
    let h = harness(|_| {});
    let bash = SpyTool::new("Bash");
    h.registry.register(bash.clone());

    h.gateway.push_response(tool_response(vec![(
        "call-1",
        "Bash",
        r#"{"command": "cargo test"}"#,
    )]));
    h.gateway.push_response(plain_response("ok"));

    let result = h
        .engine
        .send_turn(
            "test it",
            TurnOptions {
                allowed_rules: vec!["Bash(cargo test:*)".to_string()],
                ..TurnOptions::default()
            },
        )
        .await;
    assert_eq!(result.stop_reason, StopReason::Completed);
    assert_eq!(bash.execution_count(), 1);

    // The finaliser dropped the turn rules.
    assert_eq!(
        h.permissions.evaluate(
            "Bash",
            &json!({"command": "cargo test"}),
            PermissionMode::Default
        ),
        swell_protocol::PermissionDecision::Ask
    );
}

#[tokio::test]
async fn test_plan_mode_denies_bash_but_recursion_continues() {
    let h = harness(|_| {});
    let bash = SpyTool::new("Bash");
    h.registry.register(bash.clone());

    h.gateway.push_response(tool_response(vec![(
        "call-1",
        "Bash",
        r#"{"command": "cargo build"}"#,
    )]));
    h.gateway.push_response(plain_response("noted"));

    let result = h
        .engine
        .send_turn(
            "build",
            TurnOptions {
                permission_mode: Some(PermissionMode::Plan),
                ..TurnOptions::default()
            },
        )
        .await;
    assert_eq!(result.stop_reason, StopReason::Completed);
    assert_eq!(bash.execution_count(), 0);

    let block = tool_block_of(&h.store, "call-1");
    assert_eq!(block.success, Some(false));
    assert!(block.error.as_deref().expect("error").contains("plan mode"));
    assert_eq!(h.gateway.calls(), 2);
}

#[tokio::test]
async fn test_denied_without_approver() {
    let h = harness(|_| {});
    let bash = SpyTool::new("Bash");
    h.registry.register(bash.clone());

    h.gateway.push_response(tool_response(vec![(
        "call-1",
        "Bash",
        r#"{"command": "cargo build"}"#,
    )]));
    h.gateway.push_response(plain_response("noted"));

    h.engine.send_turn("build", TurnOptions::default()).await;
    assert_eq!(bash.execution_count(), 0);
    let block = tool_block_of(&h.store, "call-1");
    assert_eq!(block.error.as_deref(), Some("no approver configured"));
}

// ── PostToolUse annotation ──────────────────────────────────────────────

#[tokio::test]
async fn test_post_tool_hook_appends_context() {
    let h = harness(|_| {});
    let read = SpyTool::new("Read");
    h.registry.register(read.clone());
    h.hooks.register(sh_hook(
        "annotate",
        HookEvent::PostToolUse,
        r#"printf '{"hookSpecificOutput": {"additionalContext": "lint passed"}}'"#,
    ));

    h.gateway.push_response(tool_response(vec![(
        "call-1",
        "Read",
        r#"{"file_path": "x.rs"}"#,
    )]));
    h.gateway.push_response(plain_response("done"));

    h.engine.send_turn("read", TurnOptions::default()).await;

    let block = tool_block_of(&h.store, "call-1");
    let result_text = block.result.as_deref().expect("result");
    assert!(result_text.contains("Read ran"));
    assert!(result_text.contains("lint passed"));
}

// ── Backgrounded batches ────────────────────────────────────────────────

#[tokio::test]
async fn test_fully_backgrounded_batch_suppresses_recursion() {
    let h = harness(|_| {});
    let task = SpyTool::with_response(
        "Read",
        ToolResult::success("handed off").with_backgrounded(true),
    );
    h.registry.register(task.clone());

    h.gateway
        .push_response(tool_response(vec![("call-1", "Read", "{}")]));

    let result = h.engine.send_turn("run long", TurnOptions::default()).await;
    assert_eq!(result.stop_reason, StopReason::Completed);
    // No second model call for a fully-backgrounded batch.
    assert_eq!(h.gateway.calls(), 1);

    let block = tool_block_of(&h.store, "call-1");
    assert!(block.backgrounded);
}

// ── Model failure ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_model_failure_appends_error_block() {
    let h = harness(|_| {});
    h.gateway.push_error("connection reset");

    let result = h.engine.send_turn("hello", TurnOptions::default()).await;
    assert!(matches!(result.stop_reason, StopReason::ModelError { .. }));
    assert!(!h.engine.is_loading());

    let has_error = h.store.messages().iter().any(|m| {
        m.blocks.iter().any(
            |b| matches!(b, swell_message::Block::Error { message } if message.contains("connection reset")),
        )
    });
    assert!(has_error);
}

// ── Streaming ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_streaming_builds_blocks_incrementally() {
    let h = harness(|config| {
        config.streaming = true;
    });
    let bash = SpyTool::new("Bash");
    h.registry.register(bash.clone());

    h.gateway.push_stream(vec![
        StreamEvent::Reasoning {
            delta: "think".to_string(),
        },
        StreamEvent::Content {
            delta: "Run".to_string(),
        },
        StreamEvent::Content {
            delta: "ning".to_string(),
        },
        StreamEvent::ToolCall {
            delta: ToolCallDelta {
                id: "call-1".to_string(),
                name: Some("Bash".to_string()),
                arguments_delta: r#"{"command":"#.to_string(),
            },
        },
        StreamEvent::ToolCall {
            delta: ToolCallDelta {
                id: "call-1".to_string(),
                name: None,
                arguments_delta: r#" "pwd"}"#.to_string(),
            },
        },
    ]);
    h.gateway.push_response(tool_response(vec![(
        "call-1",
        "Bash",
        r#"{"command": "pwd"}"#,
    )]));
    h.gateway.push_stream(Vec::new());
    h.gateway.push_response(plain_response("done"));

    let result = h
        .engine
        .send_turn(
            "run pwd",
            TurnOptions {
                permission_mode: Some(PermissionMode::BypassPermissions),
                ..TurnOptions::default()
            },
        )
        .await;
    assert_eq!(result.stop_reason, StopReason::Completed);

    let messages = h.store.messages();
    // user + streamed assistant + post-hoc assistant for the second
    // response.
    let streamed = &messages[1];
    assert_eq!(streamed.text(), "Running");
    assert!(streamed
        .blocks
        .iter()
        .any(|b| matches!(b, swell_message::Block::Reasoning { text } if text == "think")));

    let block = tool_block_of(&h.store, "call-1");
    assert_eq!(block.stage, ToolStage::End);
    assert_eq!(block.arguments_raw, r#"{"command": "pwd"}"#);
    assert_eq!(bash.execution_count(), 1);
}

// ── Tool allowlist filtering ────────────────────────────────────────────

#[tokio::test]
async fn test_tools_allowlist_filters_request() {
    let h = harness(|_| {});
    h.registry.register(SpyTool::new("Bash"));
    h.registry.register(SpyTool::new("Read"));

    h.gateway.push_response(plain_response("hi"));
    h.engine
        .send_turn(
            "hello",
            TurnOptions {
                tools_allowlist: Some(vec!["Read".to_string()]),
                ..TurnOptions::default()
            },
        )
        .await;

    let snapshot = h
        .gateway
        .last_request
        .lock()
        .expect("lock")
        .clone()
        .expect("request");
    assert_eq!(snapshot.tool_names, vec!["Read"]);
    assert!(!snapshot.streaming);
}
