use super::*;

#[test]
fn test_exact() {
    let matcher = HookMatcher::Exact {
        value: "Bash".to_string(),
    };
    assert!(matcher.matches("Bash"));
    assert!(!matcher.matches("bash"));
    assert!(!matcher.matches("BashX"));
}

#[test]
fn test_wildcard() {
    let matcher = HookMatcher::Wildcard {
        pattern: "mcp__*".to_string(),
    };
    assert!(matcher.matches("mcp__server__tool"));
    assert!(!matcher.matches("Bash"));

    let single = HookMatcher::Wildcard {
        pattern: "Edi?".to_string(),
    };
    assert!(single.matches("Edit"));
    assert!(!single.matches("Edit2"));
}

#[test]
fn test_wildcard_star_matches_empty() {
    let matcher = HookMatcher::Wildcard {
        pattern: "Edit*".to_string(),
    };
    assert!(matcher.matches("Edit"));
    assert!(matcher.matches("EditFile"));
}

#[test]
fn test_regex() {
    let matcher = HookMatcher::Regex {
        pattern: "^(Edit|Write)$".to_string(),
    };
    assert!(matcher.matches("Edit"));
    assert!(matcher.matches("Write"));
    assert!(!matcher.matches("Read"));
}

#[test]
fn test_invalid_regex_matches_nothing() {
    let matcher = HookMatcher::Regex {
        pattern: "(".to_string(),
    };
    assert!(!matcher.matches("anything"));
}

#[test]
fn test_or() {
    let matcher = HookMatcher::Or {
        matchers: vec![
            HookMatcher::Exact {
                value: "Bash".to_string(),
            },
            HookMatcher::Exact {
                value: "Read".to_string(),
            },
        ],
    };
    assert!(matcher.matches("Bash"));
    assert!(matcher.matches("Read"));
    assert!(!matcher.matches("Edit"));
}

#[test]
fn test_all() {
    assert!(HookMatcher::All.matches(""));
    assert!(HookMatcher::All.matches("anything"));
}

#[test]
fn test_validate() {
    assert!(
        HookMatcher::Regex {
            pattern: "(".to_string()
        }
        .validate()
        .is_err()
    );
    assert!(
        HookMatcher::Or {
            matchers: vec![HookMatcher::Regex {
                pattern: "[".to_string()
            }]
        }
        .validate()
        .is_err()
    );
    assert!(HookMatcher::All.validate().is_ok());
    assert!(
        HookMatcher::Wildcard {
            pattern: "*".to_string()
        }
        .validate()
        .is_ok()
    );
}
