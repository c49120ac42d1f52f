use super::*;

#[test]
fn test_response_predicates() {
    let mut response = AgentResponse::default();
    assert!(!response.has_tool_calls());
    assert!(!response.is_truncated());

    response.tool_calls.push(ToolCallPayload {
        id: "call-1".to_string(),
        name: "Bash".to_string(),
        arguments: "{}".to_string(),
    });
    response.finish_reason = Some(FinishReason::Length);
    assert!(response.has_tool_calls());
    assert!(response.is_truncated());
}

#[test]
fn test_stream_event_serde() {
    let event = StreamEvent::ToolCall {
        delta: ToolCallDelta {
            id: "call-1".to_string(),
            name: Some("Read".to_string()),
            arguments_delta: "{\"file".to_string(),
        },
    };
    let json = serde_json::to_value(&event).expect("serialize");
    assert_eq!(json["type"], "tool_call");
    assert_eq!(json["delta"]["id"], "call-1");
}

#[test]
fn test_wire_message_constructors() {
    assert_eq!(WireMessage::user("hi").role, WireRole::User);
    assert_eq!(WireMessage::assistant("ok").role, WireRole::Assistant);
    assert_eq!(WireMessage::system("sys").role, WireRole::System);
}

#[test]
fn test_finish_reason_serde() {
    let json = serde_json::to_string(&FinishReason::ToolCalls).expect("serialize");
    assert_eq!(json, "\"tool_calls\"");
}
