use super::*;

#[test]
fn test_constructors() {
    let completed = TurnResult::completed(3, 1500);
    assert_eq!(completed.stop_reason, StopReason::Completed);
    assert_eq!(completed.cycles, 3);
    assert_eq!(completed.total_tokens, 1500);

    let running = TurnResult::already_running();
    assert_eq!(running.stop_reason, StopReason::AlreadyRunning);
    assert_eq!(running.cycles, 0);

    let blocked = TurnResult::blocked("nope", 0);
    assert!(matches!(blocked.stop_reason, StopReason::Blocked { .. }));

    let interrupted = TurnResult::interrupted(1, 100);
    assert_eq!(interrupted.stop_reason, StopReason::Interrupted);

    let error = TurnResult::model_error("boom", 1, 100);
    assert!(matches!(error.stop_reason, StopReason::ModelError { .. }));
}

#[test]
fn test_options_default() {
    let options = TurnOptions::default();
    assert!(options.model.is_none());
    assert!(options.permission_mode.is_none());
    assert!(options.allowed_rules.is_empty());
    assert!(options.tools_allowlist.is_none());
}

#[test]
fn test_stop_reason_serde() {
    let json = serde_json::to_value(StopReason::Blocked {
        reason: "hook".to_string(),
    })
    .expect("serialize");
    assert_eq!(json["reason"], "blocked");
}
