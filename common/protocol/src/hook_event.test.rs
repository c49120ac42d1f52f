use super::*;

#[test]
fn test_as_str() {
    assert_eq!(HookEventType::UserPromptSubmit.as_str(), "user_prompt_submit");
    assert_eq!(HookEventType::PreToolUse.as_str(), "pre_tool_use");
    assert_eq!(HookEventType::PostToolUse.as_str(), "post_tool_use");
    assert_eq!(HookEventType::Stop.as_str(), "stop");
    assert_eq!(HookEventType::SubagentStop.as_str(), "subagent_stop");
    assert_eq!(HookEventType::Notification.as_str(), "notification");
}

#[test]
fn test_serde_names_match_as_str() {
    for event in [
        HookEventType::UserPromptSubmit,
        HookEventType::PreToolUse,
        HookEventType::PostToolUse,
        HookEventType::Stop,
        HookEventType::SubagentStop,
        HookEventType::Notification,
    ] {
        let json = serde_json::to_string(&event).expect("serialize");
        assert_eq!(json, format!("\"{}\"", event.as_str()));
    }
}
