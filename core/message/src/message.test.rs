use super::*;

#[test]
fn test_user_message() {
    let message = Message::user("hello");
    assert_eq!(message.role, Role::User);
    assert_eq!(message.text(), "hello");
    assert!(message.usage.is_none());
}

#[test]
fn test_message_ids_unique() {
    assert_ne!(Message::user("a").id, Message::user("a").id);
}

#[test]
fn test_text_delta_extends_terminal_text_block() {
    let mut message = Message::assistant();
    message.append_text_delta("hel");
    message.append_text_delta("lo");
    assert_eq!(message.blocks.len(), 1);
    assert_eq!(message.text(), "hello");
}

#[test]
fn test_text_delta_after_tool_block_starts_new_block() {
    let mut message = Message::assistant();
    message.append_text_delta("before");
    message.push_block(Block::Tool(crate::block::ToolBlock::streaming("c1", "Bash")));
    message.append_text_delta("after");
    assert_eq!(message.blocks.len(), 3);
    assert_eq!(message.text(), "beforeafter");
}

#[test]
fn test_reasoning_delta() {
    let mut message = Message::assistant();
    message.append_reasoning_delta("thinking");
    message.append_reasoning_delta(" more");
    assert_eq!(message.blocks.len(), 1);
    assert!(matches!(&message.blocks[0], Block::Reasoning { text } if text == "thinking more"));
}

#[test]
fn test_tool_block_lookup() {
    let mut message = Message::assistant();
    message.push_block(Block::Tool(crate::block::ToolBlock::streaming("c1", "Bash")));
    message.push_block(Block::Tool(crate::block::ToolBlock::streaming("c2", "Read")));

    assert!(message.has_tool_blocks());
    assert_eq!(message.tool_blocks().count(), 2);
    assert!(message.tool_block_mut("c2").is_some());
    assert!(message.tool_block_mut("missing").is_none());
}
