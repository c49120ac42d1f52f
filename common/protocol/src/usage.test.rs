use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_agent_constructor() {
    let usage = TokenUsage::agent(100, 50, "test-model");
    assert_eq!(usage.prompt_tokens, 100);
    assert_eq!(usage.completion_tokens, 50);
    assert_eq!(usage.total_tokens, 150);
    assert_eq!(usage.operation, OperationType::Agent);
    assert_eq!(usage.model, "test-model");
}

#[test]
fn test_compress_constructor() {
    let usage = TokenUsage::compress(10, 5, "test-model");
    assert_eq!(usage.operation, OperationType::Compress);
    assert_eq!(usage.total_tokens, 15);
}

#[test]
fn test_comprehensive_without_cache_fields() {
    let usage = TokenUsage::agent(100, 50, "m");
    assert_eq!(usage.comprehensive(), 150);
}

#[test]
fn test_comprehensive_with_cache_fields() {
    let usage = TokenUsage {
        cache_read_input_tokens: Some(400),
        cache_creation_input_tokens: Some(25),
        ..TokenUsage::agent(100, 50, "m")
    };
    assert_eq!(usage.comprehensive(), 575);
}

#[test]
fn test_serde_skips_absent_cache_fields() {
    let usage = TokenUsage::agent(1, 2, "m");
    let json = serde_json::to_string(&usage).expect("serialize");
    assert!(!json.contains("cache_read_input_tokens"));
    assert!(!json.contains("cache_creation_input_tokens"));
}

#[test]
fn test_operation_type_display() {
    assert_eq!(OperationType::Agent.to_string(), "agent");
    assert_eq!(OperationType::Compress.to_string(), "compress");
}
