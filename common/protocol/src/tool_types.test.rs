use super::*;

#[test]
fn test_definition_constructors() {
    let def = ToolDefinition::new("Read", serde_json::json!({"type": "object"}));
    assert_eq!(def.name, "Read");
    assert!(def.description.is_none());

    let full = ToolDefinition::full("Bash", "Run a command", serde_json::json!({}));
    assert_eq!(full.description.as_deref(), Some("Run a command"));
}

#[test]
fn test_result_content_as_text() {
    let text = ToolResultContent::Text("hello".to_string());
    assert_eq!(text.as_text(), "hello");

    let structured = ToolResultContent::Structured(serde_json::json!({"ok": true}));
    assert_eq!(structured.as_text(), r#"{"ok":true}"#);
}

#[test]
fn test_result_content_untagged_serde() {
    let text: ToolResultContent = serde_json::from_str(r#""plain""#).expect("deserialize");
    assert!(matches!(text, ToolResultContent::Text(_)));

    let structured: ToolResultContent =
        serde_json::from_str(r#"{"k": 1}"#).expect("deserialize");
    assert!(matches!(structured, ToolResultContent::Structured(_)));
}
