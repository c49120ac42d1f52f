use super::*;

#[test]
fn test_event_serde_tagging() {
    let event = AgentEvent::TotalTokens { tokens: 1200 };
    let json = serde_json::to_value(&event).expect("serialize");
    assert_eq!(json["type"], "total_tokens");
    assert_eq!(json["tokens"], 1200);
}

#[test]
fn test_tool_event_round_trip() {
    let event = AgentEvent::ToolQueued {
        call_id: "call-1".to_string(),
        name: "Bash".to_string(),
        input: serde_json::json!({"command": "git status"}),
    };
    let json = serde_json::to_string(&event).expect("serialize");
    let back: AgentEvent = serde_json::from_str(&json).expect("deserialize");
    match back {
        AgentEvent::ToolQueued { call_id, name, .. } => {
            assert_eq!(call_id, "call-1");
            assert_eq!(name, "Bash");
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn test_permission_checked_event() {
    let event = AgentEvent::PermissionChecked {
        tool_name: "Delete".to_string(),
        decision: PermissionDecision::deny("plan mode"),
    };
    let json = serde_json::to_value(&event).expect("serialize");
    assert_eq!(json["decision"]["behavior"], "deny");
}
