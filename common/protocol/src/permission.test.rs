use super::*;

#[test]
fn test_mode_default() {
    assert_eq!(PermissionMode::default(), PermissionMode::Default);
}

#[test]
fn test_mode_as_str() {
    assert_eq!(PermissionMode::Default.as_str(), "default");
    assert_eq!(
        PermissionMode::BypassPermissions.as_str(),
        "bypassPermissions"
    );
    assert_eq!(PermissionMode::AcceptEdits.as_str(), "acceptEdits");
    assert_eq!(PermissionMode::Plan.as_str(), "plan");
}

#[test]
fn test_mode_serde_round_trip() {
    for mode in [
        PermissionMode::Default,
        PermissionMode::BypassPermissions,
        PermissionMode::AcceptEdits,
        PermissionMode::Plan,
    ] {
        let json = serde_json::to_string(&mode).expect("serialize");
        let back: PermissionMode = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(mode, back);
    }
}

#[test]
fn test_decision_predicates() {
    assert!(PermissionDecision::Allow.is_allow());
    assert!(!PermissionDecision::Allow.is_deny());

    let deny = PermissionDecision::deny("nope");
    assert!(deny.is_deny());
    assert!(!deny.is_allow());
    assert!(!PermissionDecision::Ask.is_allow());
    assert!(!PermissionDecision::Ask.is_deny());
}

#[test]
fn test_decision_deny_message() {
    let deny = PermissionDecision::deny("outside Safe Zone");
    match deny {
        PermissionDecision::Deny { message } => assert_eq!(message, "outside Safe Zone"),
        other => panic!("expected deny, got {other:?}"),
    }
}
