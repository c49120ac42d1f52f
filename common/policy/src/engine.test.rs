use super::*;
use crate::command::expand_command_rules;
use crate::requester::HostDecision;
use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

fn engine() -> PermissionEngine {
    PermissionEngine::new("/work/project", PolicyConfig::default()).expect("engine")
}

fn engine_with(config: PolicyConfig) -> PermissionEngine {
    PermissionEngine::new("/work/project", config).expect("engine")
}

fn bash_input(command: &str) -> serde_json::Value {
    json!({ "command": command })
}

#[test]
fn test_deny_rule_outranks_everything() {
    let engine = engine_with(PolicyConfig {
        allow: vec!["Bash".to_string()],
        deny: vec!["Bash(git push:*)".to_string()],
        ..PolicyConfig::default()
    });

    // Deny wins over an unconditional allow rule...
    let decision = engine.evaluate("Bash", &bash_input("git push origin"), PermissionMode::Default);
    assert!(decision.is_deny());

    // ...and over bypass mode.
    let decision = engine.evaluate(
        "Bash",
        &bash_input("git push origin"),
        PermissionMode::BypassPermissions,
    );
    assert!(decision.is_deny());
}

#[test]
fn test_deny_rule_matches_any_segment() {
    let engine = engine_with(PolicyConfig {
        deny: vec!["Bash(git push:*)".to_string()],
        ..PolicyConfig::default()
    });
    let decision = engine.evaluate(
        "Bash",
        &bash_input("git status && git push --force"),
        PermissionMode::BypassPermissions,
    );
    assert!(decision.is_deny());
}

#[test]
fn test_bypass_allows_restricted_tools() {
    let engine = engine();
    let decision = engine.evaluate(
        "Bash",
        &bash_input("terraform destroy"),
        PermissionMode::BypassPermissions,
    );
    assert!(decision.is_allow());
}

#[test]
fn test_accept_edits_safe_zone_gate() {
    let engine = engine();

    let inside = json!({ "file_path": "src/main.rs" });
    assert!(
        engine
            .evaluate("Edit", &inside, PermissionMode::AcceptEdits)
            .is_allow()
    );

    let outside = json!({ "file_path": "/etc/hosts" });
    match engine.evaluate("Write", &outside, PermissionMode::AcceptEdits) {
        PermissionDecision::Deny { message } => assert_eq!(message, "outside Safe Zone"),
        other => panic!("expected deny, got {other:?}"),
    }

    let escape = json!({ "file_path": "../sibling/file.txt" });
    assert!(
        engine
            .evaluate("Delete", &escape, PermissionMode::AcceptEdits)
            .is_deny()
    );
}

#[test]
fn test_accept_edits_without_path_denies() {
    let engine = engine();
    let decision = engine.evaluate("Edit", &json!({}), PermissionMode::AcceptEdits);
    assert!(decision.is_deny());
}

#[test]
fn test_plan_mode_denies_bash_and_delete() {
    let engine = engine();
    assert!(
        engine
            .evaluate("Bash", &bash_input("pwd"), PermissionMode::Plan)
            .is_deny()
    );
    assert!(
        engine
            .evaluate("Delete", &json!({"file_path": "x"}), PermissionMode::Plan)
            .is_deny()
    );
}

#[test]
fn test_plan_mode_allows_only_plan_file_edits() {
    let engine = engine();
    engine.set_plan_file(Some(PathBuf::from("plans/current.md")));

    let plan = json!({ "file_path": "plans/current.md" });
    assert!(engine.evaluate("Edit", &plan, PermissionMode::Plan).is_allow());

    // Path equation happens on absolutized paths.
    let dotted = json!({ "file_path": "plans/../plans/current.md" });
    assert!(engine.evaluate("Write", &dotted, PermissionMode::Plan).is_allow());

    let other = json!({ "file_path": "src/main.rs" });
    assert!(engine.evaluate("Edit", &other, PermissionMode::Plan).is_deny());
}

#[test]
fn test_plan_mode_leaves_read_tools_alone() {
    let engine = engine();
    let decision = engine.evaluate("Read", &json!({"file_path": "x"}), PermissionMode::Plan);
    assert!(decision.is_allow());
}

#[test]
fn test_allow_rules_require_every_segment_covered() {
    let engine = engine_with(PolicyConfig {
        allow: vec!["Bash(git status:*)".to_string()],
        ..PolicyConfig::default()
    });

    assert!(
        engine
            .evaluate("Bash", &bash_input("git status -s"), PermissionMode::Default)
            .is_allow()
    );

    // Second segment uncovered: falls through to Ask.
    let decision = engine.evaluate(
        "Bash",
        &bash_input("git status && git push"),
        PermissionMode::Default,
    );
    assert_eq!(decision, PermissionDecision::Ask);

    // Safe segments count as covered.
    assert!(
        engine
            .evaluate("Bash", &bash_input("pwd && git status"), PermissionMode::Default)
            .is_allow()
    );
}

#[test]
fn test_safe_commands_allowed_without_rules() {
    let engine = engine();
    assert!(
        engine
            .evaluate("Bash", &bash_input("pwd"), PermissionMode::Default)
            .is_allow()
    );
    assert!(
        engine
            .evaluate("Bash", &bash_input("ls src"), PermissionMode::Default)
            .is_allow()
    );
}

#[test]
fn test_unrestricted_tool_default_allow() {
    let engine = engine();
    assert!(
        engine
            .evaluate("Read", &json!({"file_path": "x"}), PermissionMode::Default)
            .is_allow()
    );
}

#[test]
fn test_restricted_tool_falls_through_to_ask() {
    let engine = engine();
    let decision = engine.evaluate("Bash", &bash_input("cargo test"), PermissionMode::Default);
    assert_eq!(decision, PermissionDecision::Ask);
}

#[test]
fn test_temporary_rules_and_clearing() {
    let engine = engine();
    engine.install_temporary_rules(vec![PermissionRule::BashPrefix("cargo test".to_string())]);

    assert!(
        engine
            .evaluate("Bash", &bash_input("cargo test -p core"), PermissionMode::Default)
            .is_allow()
    );

    engine.clear_temporary_rules();
    assert_eq!(
        engine.evaluate("Bash", &bash_input("cargo test -p core"), PermissionMode::Default),
        PermissionDecision::Ask
    );
}

#[test]
fn test_path_glob_allow_rule() {
    let engine = engine_with(PolicyConfig {
        allow: vec!["Edit(src/**/*.rs)".to_string()],
        ..PolicyConfig::default()
    });
    assert!(
        engine
            .evaluate("Edit", &json!({"file_path": "src/lib.rs"}), PermissionMode::Default)
            .is_allow()
    );
    assert_eq!(
        engine.evaluate("Edit", &json!({"file_path": "README.md"}), PermissionMode::Default),
        PermissionDecision::Ask
    );
}

#[test]
fn test_expansion_round_trip_allows_in_default_mode() {
    let engine = engine();
    let command = "git add -A && cargo test --workspace && make";
    let rules = expand_command_rules(command, engine.safe_zone());
    engine.install_temporary_rules(rules);

    assert!(
        engine
            .evaluate("Bash", &bash_input(command), PermissionMode::Default)
            .is_allow()
    );
}

#[test]
fn test_invalid_rule_text_rejected_at_construction() {
    let result = PermissionEngine::new(
        "/work/project",
        PolicyConfig {
            allow: vec!["Bash(".to_string()],
            ..PolicyConfig::default()
        },
    );
    assert!(result.is_err());
}

struct ScriptedRequester {
    decision: HostDecision,
    calls: AtomicUsize,
}

#[async_trait]
impl PermissionRequester for ScriptedRequester {
    async fn request_permission(&self, _request: PermissionRequest) -> Result<HostDecision, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.decision.clone())
    }
}

struct FailingRequester;

#[async_trait]
impl PermissionRequester for FailingRequester {
    async fn request_permission(&self, _request: PermissionRequest) -> Result<HostDecision, String> {
        Err("host went away".to_string())
    }
}

#[tokio::test]
async fn test_check_without_requester_denies() {
    let engine = engine();
    let outcome = engine
        .check("Bash", &bash_input("cargo test"), PermissionMode::Default)
        .await;
    match outcome.decision {
        PermissionDecision::Deny { message } => assert_eq!(message, "no approver configured"),
        other => panic!("expected deny, got {other:?}"),
    }
}

#[tokio::test]
async fn test_check_consults_requester_only_when_unresolved() {
    let engine = engine();
    let requester = Arc::new(ScriptedRequester {
        decision: HostDecision::allow(),
        calls: AtomicUsize::new(0),
    });
    engine.set_requester(requester.clone());

    // Resolved by step 6, requester untouched.
    let outcome = engine
        .check("Read", &json!({"file_path": "x"}), PermissionMode::Default)
        .await;
    assert!(outcome.decision.is_allow());
    assert_eq!(requester.calls.load(Ordering::SeqCst), 0);

    // Unresolved restricted call reaches the requester.
    let outcome = engine
        .check("Bash", &bash_input("cargo test"), PermissionMode::Default)
        .await;
    assert!(outcome.decision.is_allow());
    assert_eq!(requester.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_check_requester_error_becomes_deny() {
    let engine = engine();
    engine.set_requester(Arc::new(FailingRequester));
    let outcome = engine
        .check("Bash", &bash_input("cargo test"), PermissionMode::Default)
        .await;
    match outcome.decision {
        PermissionDecision::Deny { message } => assert_eq!(message, "permission callback error"),
        other => panic!("expected deny, got {other:?}"),
    }
}

#[tokio::test]
async fn test_host_rule_persists_for_later_calls() {
    let engine = engine();
    engine.set_requester(Arc::new(ScriptedRequester {
        decision: HostDecision {
            new_permission_rule: Some("Bash(cargo test:*)".to_string()),
            ..HostDecision::allow()
        },
        calls: AtomicUsize::new(0),
    }));

    let outcome = engine
        .check("Bash", &bash_input("cargo test"), PermissionMode::Default)
        .await;
    assert!(outcome.decision.is_allow());

    // The persisted rule now resolves without the host.
    assert!(
        engine
            .evaluate("Bash", &bash_input("cargo test -p x"), PermissionMode::Default)
            .is_allow()
    );
}
