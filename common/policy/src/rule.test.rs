use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_parse_bare_tool() {
    let rule = PermissionRule::parse("Bash").expect("parse");
    assert_eq!(rule, PermissionRule::ToolAny("Bash".to_string()));
    assert_eq!(rule.tool_name(), "Bash");
}

#[test]
fn test_parse_bash_prefix() {
    let rule = PermissionRule::parse("Bash(git status:*)").expect("parse");
    assert_eq!(rule, PermissionRule::BashPrefix("git status".to_string()));
}

#[test]
fn test_parse_bash_exact() {
    let rule = PermissionRule::parse("Bash(cargo build)").expect("parse");
    assert_eq!(rule, PermissionRule::BashExact("cargo build".to_string()));
}

#[test]
fn test_parse_path_glob() {
    let rule = PermissionRule::parse("Edit(src/**/*.rs)").expect("parse");
    assert_eq!(
        rule,
        PermissionRule::PathGlob {
            tool: "Edit".to_string(),
            glob: "src/**/*.rs".to_string(),
        }
    );
    assert_eq!(rule.tool_name(), "Edit");
}

#[test]
fn test_parse_rejects_malformed() {
    assert!(PermissionRule::parse("").is_err());
    assert!(PermissionRule::parse("Bash(").is_err());
    assert!(PermissionRule::parse("Bash)").is_err());
    assert!(PermissionRule::parse("()").is_err());
    assert!(PermissionRule::parse("Edit([)").is_err());
}

#[test]
fn test_display_round_trip() {
    for text in [
        "Bash",
        "Bash(git status:*)",
        "Bash(cargo build)",
        "Edit(src/**/*.rs)",
        "Write(*.md)",
    ] {
        let rule = PermissionRule::parse(text).expect("parse");
        assert_eq!(rule.to_string(), text);
        let reparsed = PermissionRule::parse(&rule.to_string()).expect("reparse");
        assert_eq!(rule, reparsed);
    }
}

#[test]
fn test_serde_round_trip() {
    let rule = PermissionRule::parse("Bash(git push:*)").expect("parse");
    let json = serde_json::to_string(&rule).expect("serialize");
    assert_eq!(json, "\"Bash(git push:*)\"");
    let back: PermissionRule = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(rule, back);
}

#[test]
fn test_segment_matching_prefix_is_word_aligned() {
    let rule = PermissionRule::BashPrefix("git status".to_string());
    assert!(rule.matches_segment("git status"));
    assert!(rule.matches_segment("git status -s"));
    assert!(!rule.matches_segment("git statusx"));
    assert!(!rule.matches_segment("git stash"));
}

#[test]
fn test_segment_matching_exact() {
    let rule = PermissionRule::BashExact("pwd".to_string());
    assert!(rule.matches_segment("pwd"));
    assert!(!rule.matches_segment("pwd -P"));
}

#[test]
fn test_tool_any_matches_every_segment() {
    let rule = PermissionRule::ToolAny("Bash".to_string());
    assert!(rule.matches_segment("anything at all"));

    let other = PermissionRule::ToolAny("Read".to_string());
    assert!(!other.matches_segment("anything at all"));
}

#[test]
fn test_path_matching() {
    let rule = PermissionRule::parse("Edit(src/**/*.rs)").expect("parse");
    assert!(rule.matches_path("Edit", &["src/main.rs"]));
    assert!(rule.matches_path("Edit", &["src/deep/nested/mod.rs"]));
    assert!(!rule.matches_path("Edit", &["docs/readme.md"]));
    assert!(!rule.matches_path("Write", &["src/main.rs"]));
}

#[test]
fn test_path_matching_tries_all_candidates() {
    let rule = PermissionRule::parse("Write(*.md)").expect("parse");
    assert!(rule.matches_path("Write", &["/abs/notes.md", "notes.md"]));
}

#[test]
fn test_path_field_lookup_order() {
    let input = serde_json::json!({"file_path": "a", "path": "b"});
    assert_eq!(path_field(&input), Some("a"));

    let input = serde_json::json!({"target_file": "t"});
    assert_eq!(path_field(&input), Some("t"));

    let input = serde_json::json!({"command": "ls"});
    assert_eq!(path_field(&input), None);
}
