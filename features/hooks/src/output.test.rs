use super::*;

#[test]
fn test_parse_empty_stdout() {
    assert!(parse_hook_stdout("").is_none());
    assert!(parse_hook_stdout("   \n").is_none());
}

#[test]
fn test_parse_non_json_stdout() {
    assert!(parse_hook_stdout("plain log line").is_none());
    assert!(parse_hook_stdout("[1, 2]").is_none());
}

#[test]
fn test_parse_continue_false() {
    let output = parse_hook_stdout(r#"{"continue": false, "stopReason": "nope"}"#)
        .expect("parse");
    assert!(output.blocks());
    assert_eq!(output.stop_reason.as_deref(), Some("nope"));
}

#[test]
fn test_parse_continue_absent_does_not_block() {
    let output = parse_hook_stdout(r#"{"systemMessage": "fyi"}"#).expect("parse");
    assert!(!output.blocks());
    assert_eq!(output.system_message.as_deref(), Some("fyi"));
}

#[test]
fn test_parse_hook_specific_output() {
    let stdout = r#"{
        "continue": true,
        "hookSpecificOutput": {
            "permissionDecision": "ask",
            "permissionDecisionReason": "confirm",
            "updatedInput": {"file_path": "/safe/x"},
            "additionalContext": "lint passed"
        }
    }"#;
    let output = parse_hook_stdout(stdout).expect("parse");
    let data = output.hook_specific_output.expect("envelope");
    assert_eq!(data.permission_decision.as_deref(), Some("ask"));
    assert_eq!(data.permission_decision_reason.as_deref(), Some("confirm"));
    assert_eq!(
        data.updated_input
            .as_ref()
            .and_then(|v| v["file_path"].as_str()),
        Some("/safe/x")
    );
    assert_eq!(data.additional_context.as_deref(), Some("lint passed"));
}

#[test]
fn test_parse_tolerates_surrounding_whitespace() {
    let output = parse_hook_stdout("  {\"continue\": false}\n").expect("parse");
    assert!(output.blocks());
}
