use super::*;
use crate::event::HookEvent;
use std::io::Write;

fn write_config(json: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    file.write_all(json.as_bytes()).expect("write");
    file
}

#[test]
fn test_load_full_config() {
    let file = write_config(
        r#"{
            "hooks": [
                {
                    "name": "lint-check",
                    "event": "pre_tool_use",
                    "timeout_secs": 10,
                    "matcher": { "type": "exact", "value": "Bash" },
                    "command": "lint",
                    "args": ["--check"],
                    "env": { "LINT_MODE": "strict" }
                },
                {
                    "name": "notify",
                    "event": "stop",
                    "command": "notify-send"
                }
            ]
        }"#,
    );

    let hooks = load_hooks_from_json(file.path()).expect("load");
    assert_eq!(hooks.len(), 2);

    assert_eq!(hooks[0].name, "lint-check");
    assert_eq!(hooks[0].event, HookEvent::PreToolUse);
    assert_eq!(hooks[0].timeout_secs, 10);
    assert_eq!(hooks[0].args, vec!["--check"]);
    assert_eq!(
        hooks[0].env.get("LINT_MODE").map(String::as_str),
        Some("strict")
    );

    // Defaults apply to the minimal entry.
    assert_eq!(hooks[1].timeout_secs, 30);
    assert!(hooks[1].enabled);
    assert!(hooks[1].matcher.is_none());
}

#[test]
fn test_load_empty_config() {
    let file = write_config(r#"{}"#);
    let hooks = load_hooks_from_json(file.path()).expect("load");
    assert!(hooks.is_empty());
}

#[test]
fn test_invalid_json_rejected() {
    let file = write_config("not json");
    assert!(matches!(
        load_hooks_from_json(file.path()),
        Err(HookError::ConfigParse { .. })
    ));
}

#[test]
fn test_missing_file_rejected() {
    let result = load_hooks_from_json(std::path::Path::new("/nonexistent/hooks.json"));
    assert!(matches!(result, Err(HookError::ConfigRead { .. })));
}

#[test]
fn test_invalid_matcher_rejected_at_load() {
    let file = write_config(
        r#"{
            "hooks": [
                {
                    "name": "bad",
                    "event": "pre_tool_use",
                    "matcher": { "type": "regex", "pattern": "(" },
                    "command": "x"
                }
            ]
        }"#,
    );
    assert!(matches!(
        load_hooks_from_json(file.path()),
        Err(HookError::InvalidMatcher { .. })
    ));
}
