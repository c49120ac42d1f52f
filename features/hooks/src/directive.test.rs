use super::*;

fn execution(name: &str, exit_code: i32, stdout: &str, stderr: &str) -> HookExecution {
    HookExecution {
        hook_name: name.to_string(),
        success: exit_code == 0,
        exit_code,
        stdout: stdout.to_string(),
        stderr: stderr.to_string(),
        duration_ms: 1,
        timed_out: false,
    }
}

#[test]
fn test_empty_batch_is_neutral() {
    let directive = process_hook_results(HookEvent::PreToolUse, &[]);
    assert!(directive.is_neutral());
}

#[test]
fn test_exit_zero_no_output_is_neutral() {
    let directive =
        process_hook_results(HookEvent::PreToolUse, &[execution("h", 0, "", "")]);
    assert!(directive.is_neutral());
}

#[test]
fn test_exit_two_blocks_with_stderr_reason() {
    let directive = process_hook_results(
        HookEvent::PreToolUse,
        &[execution("h", 2, "", "don't touch that\n")],
    );
    assert!(directive.should_block);
    assert_eq!(directive.error_message.as_deref(), Some("don't touch that"));
}

#[test]
fn test_exit_two_without_stderr_gets_default_reason() {
    let directive =
        process_hook_results(HookEvent::Stop, &[execution("guard", 2, "", "")]);
    assert!(directive.should_block);
    assert_eq!(
        directive.error_message.as_deref(),
        Some("blocked by hook 'guard'")
    );
}

#[test]
fn test_other_nonzero_exit_is_no_opinion() {
    let directive =
        process_hook_results(HookEvent::PreToolUse, &[execution("h", 1, "", "boom")]);
    assert!(directive.is_neutral());
}

#[test]
fn test_json_overrides_exit_code() {
    // Exit 2 would block, but well-formed JSON saying continue wins.
    let directive = process_hook_results(
        HookEvent::PreToolUse,
        &[execution("h", 2, r#"{"continue": true}"#, "ignored")],
    );
    assert!(!directive.should_block);

    // And the reverse: exit 0 with blocking JSON blocks.
    let directive = process_hook_results(
        HookEvent::PreToolUse,
        &[execution("h", 0, r#"{"continue": false, "stopReason": "halt"}"#, "")],
    );
    assert!(directive.should_block);
    assert_eq!(directive.error_message.as_deref(), Some("halt"));
}

#[test]
fn test_timed_out_hook_is_no_opinion() {
    let mut exec = execution("slow", 0, r#"{"continue": false}"#, "");
    exec.timed_out = true;
    let directive = process_hook_results(HookEvent::PreToolUse, &[exec]);
    assert!(directive.is_neutral());
}

#[test]
fn test_permission_decision_severity() {
    let allow = execution(
        "a",
        0,
        r#"{"hookSpecificOutput": {"permissionDecision": "allow"}}"#,
        "",
    );
    let ask = execution(
        "b",
        0,
        r#"{"hookSpecificOutput": {"permissionDecision": "ask", "permissionDecisionReason": "confirm"}}"#,
        "",
    );
    let deny = execution(
        "c",
        0,
        r#"{"hookSpecificOutput": {"permissionDecision": "deny", "permissionDecisionReason": "never"}}"#,
        "",
    );

    let directive =
        process_hook_results(HookEvent::PreToolUse, &[allow.clone(), ask.clone()]);
    assert_eq!(
        directive.permission_decision,
        Some(HookPermissionDecision::Ask)
    );
    assert_eq!(directive.decision_reason.as_deref(), Some("confirm"));
    assert!(!directive.should_block);

    let directive = process_hook_results(HookEvent::PreToolUse, &[deny, ask, allow]);
    assert_eq!(
        directive.permission_decision,
        Some(HookPermissionDecision::Deny)
    );
    // Deny decision blocks the pipeline.
    assert!(directive.should_block);
    assert_eq!(directive.error_message.as_deref(), Some("never"));
}

#[test]
fn test_updated_input_last_wins() {
    let first = execution(
        "a",
        0,
        r#"{"hookSpecificOutput": {"updatedInput": {"n": 1}}}"#,
        "",
    );
    let second = execution(
        "b",
        0,
        r#"{"hookSpecificOutput": {"updatedInput": {"n": 2}}}"#,
        "",
    );
    let directive = process_hook_results(HookEvent::PreToolUse, &[first, second]);
    assert_eq!(directive.updated_input.expect("input")["n"], 2);
}

#[test]
fn test_additional_context_accumulates() {
    let a = execution(
        "a",
        0,
        r#"{"hookSpecificOutput": {"additionalContext": "one"}}"#,
        "",
    );
    let b = execution(
        "b",
        0,
        r#"{"hookSpecificOutput": {"additionalContext": "two"}}"#,
        "",
    );
    let directive = process_hook_results(HookEvent::PostToolUse, &[a, b]);
    assert_eq!(directive.additional_context, vec!["one", "two"]);
}

#[test]
fn test_notification_cannot_block() {
    let directive = process_hook_results(
        HookEvent::Notification,
        &[execution("h", 2, "", "blocked!")],
    );
    assert!(!directive.should_block);
    assert!(directive.error_message.is_none());
}

#[test]
fn test_first_block_reason_wins() {
    let directive = process_hook_results(
        HookEvent::Stop,
        &[
            execution("first", 2, "", "reason one"),
            execution("second", 2, "", "reason two"),
        ],
    );
    assert_eq!(directive.error_message.as_deref(), Some("reason one"));
}
