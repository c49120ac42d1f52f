use super::*;
use std::path::PathBuf;

fn make_ctx(event: HookEvent, tool_name: Option<&str>) -> HookContext {
    let mut ctx = HookContext::new(event, "test-session", PathBuf::from("/tmp"));
    if let Some(name) = tool_name {
        ctx.tool_name = Some(name.to_string());
    }
    ctx
}

fn echo_hook(name: &str, event: HookEvent, stdout: &str) -> HookDefinition {
    HookDefinition::command(
        name,
        event,
        "/bin/sh",
        vec!["-c".to_string(), format!("printf '%s' '{stdout}'")],
    )
}

#[test]
fn test_register_and_len() {
    let engine = HookEngine::new();
    assert!(engine.is_empty());

    engine.register(echo_hook("h1", HookEvent::PreToolUse, "x"));
    assert!(!engine.is_empty());
    assert_eq!(engine.len(), 1);
}

#[test]
fn test_has_hooks_for() {
    let engine = HookEngine::new();
    engine.register(echo_hook("h1", HookEvent::Stop, "x"));

    assert!(engine.has_hooks_for(HookEvent::Stop));
    assert!(!engine.has_hooks_for(HookEvent::PreToolUse));

    let mut disabled = echo_hook("h2", HookEvent::PreToolUse, "x");
    disabled.enabled = false;
    engine.register(disabled);
    assert!(!engine.has_hooks_for(HookEvent::PreToolUse));
}

#[test]
fn test_clear() {
    let engine = HookEngine::new();
    engine.register_all([
        echo_hook("h1", HookEvent::PreToolUse, "x"),
        echo_hook("h2", HookEvent::Stop, "x"),
    ]);
    assert_eq!(engine.len(), 2);
    engine.clear();
    assert!(engine.is_empty());
}

#[tokio::test]
async fn test_execute_runs_only_matching_event() {
    let engine = HookEngine::new();
    engine.register(echo_hook("pre", HookEvent::PreToolUse, "from-pre"));
    engine.register(echo_hook("stop", HookEvent::Stop, "from-stop"));

    let results = engine
        .execute_hooks(&make_ctx(HookEvent::PreToolUse, Some("Bash")))
        .await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].hook_name, "pre");
    assert_eq!(results[0].stdout, "from-pre");
}

#[tokio::test]
async fn test_matcher_filters_by_tool_name() {
    let engine = HookEngine::new();
    engine.register(
        echo_hook("bash-only", HookEvent::PreToolUse, "x").with_matcher(HookMatcher::Exact {
            value: "Bash".to_string(),
        }),
    );

    let hit = engine
        .execute_hooks(&make_ctx(HookEvent::PreToolUse, Some("Bash")))
        .await;
    assert_eq!(hit.len(), 1);

    let miss = engine
        .execute_hooks(&make_ctx(HookEvent::PreToolUse, Some("Read")))
        .await;
    assert!(miss.is_empty());

    // Matcher present but no target: hook does not fire.
    let no_target = engine
        .execute_hooks(&make_ctx(HookEvent::PreToolUse, None))
        .await;
    assert!(no_target.is_empty());
}

#[tokio::test]
async fn test_disabled_hooks_skipped() {
    let engine = HookEngine::new();
    let mut hook = echo_hook("off", HookEvent::PreToolUse, "x");
    hook.enabled = false;
    engine.register(hook);

    let results = engine
        .execute_hooks(&make_ctx(HookEvent::PreToolUse, Some("Bash")))
        .await;
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_results_in_registration_order() {
    let engine = HookEngine::new();
    engine.register(echo_hook("first", HookEvent::Stop, "1"));
    engine.register(echo_hook("second", HookEvent::Stop, "2"));

    let results = engine.execute_hooks(&make_ctx(HookEvent::Stop, None)).await;
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].hook_name, "first");
    assert_eq!(results[1].hook_name, "second");
}

#[tokio::test]
async fn test_failing_hook_does_not_poison_batch() {
    let engine = HookEngine::new();
    engine.register(HookDefinition::command(
        "broken",
        HookEvent::Stop,
        "/nonexistent/binary",
        vec![],
    ));
    engine.register(echo_hook("ok", HookEvent::Stop, "fine"));

    let results = engine.execute_hooks(&make_ctx(HookEvent::Stop, None)).await;
    assert_eq!(results.len(), 2);
    assert!(!results[0].success);
    assert!(results[1].success);
}
