use super::*;
use crate::event::HookEvent;
use std::path::PathBuf;

fn ctx() -> HookContext {
    HookContext::new(
        HookEvent::PreToolUse,
        "session-1",
        std::env::temp_dir(),
    )
    .with_tool("Bash", serde_json::json!({"command": "pwd"}))
}

fn sh_hook(name: &str, script: &str) -> HookDefinition {
    HookDefinition::command(
        name,
        HookEvent::PreToolUse,
        "/bin/sh",
        vec!["-c".to_string(), script.to_string()],
    )
}

#[tokio::test]
async fn test_successful_command_captures_stdout() {
    let execution = run_hook(&sh_hook("echo", "echo '{\"continue\": true}'"), &ctx()).await;
    assert!(execution.success);
    assert_eq!(execution.exit_code, 0);
    assert!(execution.stdout.contains("continue"));
    assert!(!execution.timed_out);
}

#[tokio::test]
async fn test_exit_code_captured() {
    let execution = run_hook(&sh_hook("block", "echo nope >&2; exit 2"), &ctx()).await;
    assert!(!execution.success);
    assert_eq!(execution.exit_code, 2);
    assert_eq!(execution.stderr.trim(), "nope");
}

#[tokio::test]
async fn test_context_delivered_on_stdin() {
    let execution = run_hook(&sh_hook("cat", "cat"), &ctx()).await;
    assert!(execution.success);
    let payload: serde_json::Value =
        serde_json::from_str(&execution.stdout).expect("stdin json");
    assert_eq!(payload["toolName"], "Bash");
    assert_eq!(payload["sessionId"], "session-1");
}

#[tokio::test]
async fn test_environment_surface() {
    let execution = run_hook(
        &sh_hook("env", "printf '%s/%s' \"$SWELL_HOOK_EVENT\" \"$SWELL_TOOL_NAME\""),
        &ctx(),
    )
    .await;
    assert_eq!(execution.stdout, "pre_tool_use/Bash");
}

#[tokio::test]
async fn test_config_env_exported() {
    let mut extra = std::collections::HashMap::new();
    extra.insert("HOOK_EXTRA".to_string(), "42".to_string());
    let ctx = ctx().with_env(extra);
    let execution = run_hook(&sh_hook("env", "printf '%s' \"$HOOK_EXTRA\""), &ctx).await;
    assert_eq!(execution.stdout, "42");
}

#[tokio::test]
async fn test_timeout_fires() {
    let hook = sh_hook("slow", "sleep 30").with_timeout_secs(1);
    let execution = run_hook(&hook, &ctx()).await;
    assert!(execution.timed_out);
    assert!(!execution.success);
}

#[tokio::test]
async fn test_spawn_failure_recorded() {
    let hook = HookDefinition::command(
        "missing",
        HookEvent::PreToolUse,
        "/nonexistent/definitely-not-a-binary",
        vec![],
    );
    let execution = run_hook(&hook, &ctx()).await;
    assert!(!execution.success);
    assert_eq!(execution.exit_code, -1);
    assert!(execution.stderr.contains("spawn failed"));
}

#[tokio::test]
async fn test_working_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut ctx = ctx();
    ctx.working_dir = dir.path().to_path_buf();
    let execution = run_hook(&sh_hook("pwd", "pwd"), &ctx).await;
    let reported = PathBuf::from(execution.stdout.trim());
    assert_eq!(
        reported.canonicalize().expect("canonical"),
        dir.path().canonicalize().expect("canonical")
    );
}
