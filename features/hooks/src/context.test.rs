use super::*;
use std::path::PathBuf;

#[test]
fn test_builder_chain() {
    let ctx = HookContext::new(HookEvent::PreToolUse, "session-1", PathBuf::from("/tmp"))
        .with_tool("Bash", serde_json::json!({"command": "pwd"}))
        .with_transcript_path(PathBuf::from("/tmp/transcript.jsonl"));

    assert_eq!(ctx.tool_name.as_deref(), Some("Bash"));
    assert_eq!(ctx.match_target(), Some("Bash"));
    assert!(ctx.transcript_path.is_some());
}

#[test]
fn test_match_target_absent_for_prompt_events() {
    let ctx = HookContext::new(HookEvent::UserPromptSubmit, "s", PathBuf::from("/tmp"))
        .with_user_prompt("hello");
    assert_eq!(ctx.match_target(), None);
}

#[test]
fn test_serialisation_uses_camel_case() {
    let ctx = HookContext::new(HookEvent::PostToolUse, "s", PathBuf::from("/tmp"))
        .with_tool("Read", serde_json::json!({"file_path": "x"}))
        .with_tool_response("contents");
    let json = serde_json::to_value(&ctx).expect("serialize");

    assert_eq!(json["sessionId"], "s");
    assert_eq!(json["toolName"], "Read");
    assert_eq!(json["toolResponse"], "contents");
    assert!(json["timestamp"].is_string());
    assert!(json.get("userPrompt").is_none());
}

#[test]
fn test_env_merge() {
    let mut extra = std::collections::HashMap::new();
    extra.insert("KEY".to_string(), "value".to_string());
    let ctx =
        HookContext::new(HookEvent::Stop, "s", PathBuf::from("/tmp")).with_env(extra);
    assert_eq!(ctx.env.get("KEY").map(String::as_str), Some("value"));
}
