use super::*;

#[test]
fn test_streaming_constructor() {
    let block = ToolBlock::streaming("call-1", "Bash");
    assert_eq!(block.stage, ToolStage::Streaming);
    assert!(block.arguments_raw.is_empty());
    assert!(!block.is_terminal());
}

#[test]
fn test_argument_deltas_accumulate() {
    let mut block = ToolBlock::streaming("call-1", "Bash");
    block.append_arguments_delta("{\"comm").expect("delta");
    block.append_arguments_delta("and\": \"pwd\"}").expect("delta");
    assert_eq!(block.arguments_raw, "{\"command\": \"pwd\"}");
}

#[test]
fn test_stage_machine_forward_path() {
    let mut block = ToolBlock::streaming("call-1", "Bash");

    let args: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str("{\"command\": \"pwd\"}").expect("parse");
    block
        .begin_running(args, Some("pwd".to_string()))
        .expect("running");
    assert_eq!(block.stage, ToolStage::Running);

    block
        .finish_success("ok", Some("ok".to_string()))
        .expect("finish");
    assert_eq!(block.stage, ToolStage::End);
    assert_eq!(block.success, Some(true));
    assert!(block.is_terminal());
}

#[test]
fn test_stage_machine_rejects_backwards_transitions() {
    let mut block = ToolBlock::streaming("call-1", "Bash");
    block.finish_failure("cancelled").expect("finish");

    assert!(block.begin_running(Default::default(), None).is_err());
    assert!(block.finish_success("late", None).is_err());
    assert!(block.finish_failure("again").is_err());
    assert!(block.append_arguments_delta("x").is_err());
}

#[test]
fn test_streaming_can_fail_directly() {
    // A call aborted mid-stream still reaches End with an error.
    let mut block = ToolBlock::streaming("call-1", "Bash");
    block.finish_failure("aborted").expect("finish");
    assert_eq!(block.stage, ToolStage::End);
    assert_eq!(block.success, Some(false));
    assert_eq!(block.result.as_deref(), Some("aborted"));
}

#[test]
fn test_post_hook_augmentation_only_at_end() {
    let mut block = ToolBlock::streaming("call-1", "Bash");
    assert!(block.append_result_context("ctx").is_err());

    block.finish_success("result", None).expect("finish");
    block.append_result_context("hook context").expect("augment");
    assert_eq!(
        block.result.as_deref(),
        Some("result\n\nhook context")
    );
}

#[test]
fn test_running_constructor() {
    let block = ToolBlock::running("call-2", "Read", "{}", Default::default());
    assert_eq!(block.stage, ToolStage::Running);
}

#[test]
fn test_block_serde_tagging() {
    let block = Block::Tool(ToolBlock::streaming("call-1", "Bash"));
    let json = serde_json::to_value(&block).expect("serialize");
    assert_eq!(json["type"], "tool");
    assert_eq!(json["id"], "call-1");
    assert_eq!(json["stage"], "streaming");

    let back: Block = serde_json::from_value(json).expect("deserialize");
    assert_eq!(block, back);
}

#[test]
fn test_compress_block_carries_usage() {
    let block = Block::Compress {
        summary: "sum".to_string(),
        usage: Some(TokenUsage::compress(10, 2, "m")),
    };
    let json = serde_json::to_value(&block).expect("serialize");
    assert_eq!(json["type"], "compress");
    assert_eq!(json["usage"]["operation"], "compress");
}
