use super::*;

#[test]
fn test_as_str() {
    assert_eq!(HookEvent::UserPromptSubmit.as_str(), "user_prompt_submit");
    assert_eq!(HookEvent::PreToolUse.as_str(), "pre_tool_use");
    assert_eq!(HookEvent::PostToolUse.as_str(), "post_tool_use");
    assert_eq!(HookEvent::Stop.as_str(), "stop");
    assert_eq!(HookEvent::SubagentStop.as_str(), "subagent_stop");
    assert_eq!(HookEvent::Notification.as_str(), "notification");
}

#[test]
fn test_only_notification_cannot_block() {
    assert!(!HookEvent::Notification.can_block());
    for event in [
        HookEvent::UserPromptSubmit,
        HookEvent::PreToolUse,
        HookEvent::PostToolUse,
        HookEvent::Stop,
        HookEvent::SubagentStop,
    ] {
        assert!(event.can_block(), "{event} should be able to block");
    }
}

#[test]
fn test_protocol_conversion() {
    let converted: swell_protocol::HookEventType = HookEvent::PreToolUse.into();
    assert_eq!(converted, swell_protocol::HookEventType::PreToolUse);
    assert_eq!(converted.as_str(), HookEvent::PreToolUse.as_str());
}

#[test]
fn test_serde_round_trip() {
    let json = serde_json::to_string(&HookEvent::SubagentStop).expect("serialize");
    assert_eq!(json, "\"subagent_stop\"");
    let back: HookEvent = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, HookEvent::SubagentStop);
}
