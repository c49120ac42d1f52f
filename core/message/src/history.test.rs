use super::*;
use crate::block::ToolStage;
use pretty_assertions::assert_eq;
use swell_protocol::OperationType;

fn history_with_turn() -> MessageHistory {
    let mut history = MessageHistory::new();
    history.push(Message::user("first question"));
    let mut assistant = Message::assistant();
    assistant.append_text_delta("first answer");
    history.push(assistant);
    history.push(Message::user("second question"));
    history
}

#[test]
fn test_push_and_accessors() {
    let mut history = MessageHistory::new();
    assert!(history.is_empty());

    let id = history.push(Message::user("hi"));
    assert_eq!(history.len(), 1);
    assert!(history.message_mut(&id).is_some());
}

#[test]
fn test_last_assistant_mut() {
    let mut history = history_with_turn();
    assert!(history.last_assistant_mut().is_none());

    history.push(Message::assistant());
    assert!(history.last_assistant_mut().is_some());
}

#[test]
fn test_tool_block_update_by_id() {
    let mut history = MessageHistory::new();
    let mut assistant = Message::assistant();
    assistant.push_block(Block::Tool(ToolBlock::streaming("call-1", "Bash")));
    history.push(assistant);

    history
        .update_tool_block("call-1", |block| block.finish_success("done", None))
        .expect("update");
    let block = history.tool_block_mut("call-1").expect("block");
    assert_eq!(block.stage, ToolStage::End);

    let missing = history.update_tool_block("nope", |_| Ok(()));
    assert!(matches!(missing, Err(MessageError::UnknownToolCall { .. })));
}

#[test]
fn test_compressible_prefix_keeps_most_recent_turn() {
    let history = history_with_turn();
    // Last user message is index 2; everything before is compressible.
    assert_eq!(history.compressible_prefix_len(), 2);
}

#[test]
fn test_compress_replace_splices_prefix() {
    let mut history = history_with_turn();
    let replaced = history
        .compress_replace(2, "what came before", Some(TokenUsage::compress(5, 1, "m")))
        .expect("compress");
    assert_eq!(replaced, 2);
    assert_eq!(history.len(), 2);

    match &history.messages()[0].blocks[0] {
        Block::Compress { summary, usage } => {
            assert_eq!(summary, "what came before");
            assert!(usage.is_some());
        }
        other => panic!("expected compress block, got {other:?}"),
    }
    assert_eq!(history.messages()[1].text(), "second question");
}

#[test]
fn test_compress_replace_rejects_bad_prefix() {
    let mut history = history_with_turn();
    assert!(history.compress_replace(0, "s", None).is_err());
    assert!(history.compress_replace(9, "s", None).is_err());
}

#[test]
fn test_compress_replace_refuses_live_tool_blocks() {
    let mut history = MessageHistory::new();
    history.push(Message::user("q"));
    let mut assistant = Message::assistant();
    assistant.push_block(Block::Tool(ToolBlock::streaming("call-1", "Bash")));
    history.push(assistant);
    history.push(Message::user("next"));

    assert!(history.compress_replace(2, "s", None).is_err());
}

#[test]
fn test_usage_ledger_order() {
    let mut history = history_with_turn();
    let assistant_id = history.messages()[1].id.clone();
    if let Some(assistant) = history.message_mut(&assistant_id) {
        assistant.usage = Some(TokenUsage::agent(10, 5, "m"));
    }
    history
        .compress_replace(2, "sum", Some(TokenUsage::compress(3, 1, "m")))
        .expect("compress");

    let mut next = Message::assistant();
    next.usage = Some(TokenUsage::agent(20, 8, "m"));
    history.push(next);

    let usages = history.usages();
    assert_eq!(usages.len(), 2);
    assert_eq!(usages[0].operation, OperationType::Compress);
    assert_eq!(usages[1].operation, OperationType::Agent);
    assert_eq!(usages[1].total_tokens, 28);
}

#[test]
fn test_wire_rendering_pairs_calls_and_results() {
    let mut history = MessageHistory::new();
    history.push(Message::user("run it"));

    let mut assistant = Message::assistant();
    assistant.append_text_delta("running");
    let mut tool = ToolBlock::running(
        "call-1",
        "Bash",
        "{\"command\":\"pwd\"}",
        serde_json::from_str("{\"command\":\"pwd\"}").expect("args"),
    );
    tool.finish_success("/work", None).expect("finish");
    assistant.push_block(Block::Tool(tool));
    history.push(assistant);

    let wire = history.wire_messages();
    assert_eq!(wire.len(), 3);
    assert!(matches!(wire[0].role, swell_gateway::WireRole::User));
    assert!(wire[1].content.contains("<tool_call id=\"call-1\""));
    assert!(wire[2].content.contains("<tool_result id=\"call-1\" success=\"true\">"));
    assert!(wire[2].content.contains("/work"));
}

#[test]
fn test_wire_rendering_skips_results_for_live_calls() {
    let mut history = MessageHistory::new();
    let mut assistant = Message::assistant();
    assistant.push_block(Block::Tool(ToolBlock::streaming("call-1", "Bash")));
    history.push(assistant);

    let wire = history.wire_messages();
    assert_eq!(wire.len(), 1);
}

#[test]
fn test_parse_arguments_empty_is_empty_map() {
    assert!(parse_arguments("").expect("parse").is_empty());
    assert!(parse_arguments("   ").expect("parse").is_empty());
}

#[test]
fn test_parse_arguments_object() {
    let args = parse_arguments("{\"file_path\": \"x\"}").expect("parse");
    assert_eq!(args.get("file_path").and_then(|v| v.as_str()), Some("x"));
}

#[test]
fn test_parse_arguments_malformed_fails() {
    assert!(parse_arguments("{\"file_pa").is_err());
    assert!(parse_arguments("[1, 2]").is_err());
}

#[test]
fn test_push_error_appends_system_error_block() {
    let mut history = MessageHistory::new();
    history.push_error("model call failed");
    assert_eq!(history.len(), 1);
    assert!(matches!(
        &history.messages()[0].blocks[0],
        Block::Error { message } if message == "model call failed"
    ));
}
