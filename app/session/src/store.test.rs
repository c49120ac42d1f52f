use super::*;
use pretty_assertions::assert_eq;
use swell_message::ToolStage;
use swell_protocol::OperationType;

fn store_in(dir: &Path) -> SessionStore {
    SessionStore::new("/work/project", dir)
}

#[tokio::test]
async fn test_append_and_read() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = store_in(dir.path());

    store.append_user("question");
    let assistant_id = store.append_assistant();
    store.append_system("note");

    assert_eq!(store.message_count(), 3);
    let updated = store.with_message(&assistant_id, |message| {
        message.append_text_delta("answer");
        message.text()
    });
    assert_eq!(updated.as_deref(), Some("answer"));
}

#[tokio::test]
async fn test_tool_block_update() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = store_in(dir.path());

    let message_id = store.append_assistant();
    store.with_message(&message_id, |message| {
        message.push_block(Block::Tool(ToolBlock::streaming("call-1", "Bash")));
    });

    store
        .update_tool_block("call-1", |block| block.finish_success("done", None))
        .expect("update");

    let messages = store.messages();
    let block = messages[0].tool_blocks().next().expect("block");
    assert_eq!(block.stage, ToolStage::End);

    assert!(store.update_tool_block("missing", |_| Ok(())).is_err());
}

#[tokio::test]
async fn test_error_and_snapshot_blocks() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = store_in(dir.path());

    store.append_error("model exploded");
    store.append_file_history_snapshot("snap-1");

    let messages = store.messages();
    assert!(matches!(&messages[0].blocks[0], Block::Error { .. }));
    assert!(matches!(
        &messages[1].blocks[0],
        Block::FileHistorySnapshot { snapshot_id } if snapshot_id == "snap-1"
    ));
}

#[tokio::test]
async fn test_token_publication() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = store_in(dir.path());
    assert_eq!(store.latest_total_tokens(), 0);
    store.set_latest_total_tokens(1575);
    assert_eq!(store.latest_total_tokens(), 1575);
}

#[tokio::test]
async fn test_save_and_load_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = store_in(dir.path());
    store.append_user("hello");
    store.save().await.expect("save");

    let restored = SessionStore::load(&store.transcript_path())
        .await
        .expect("load");
    assert_eq!(restored.session_id(), store.session_id());
    assert_eq!(restored.message_count(), 1);
    assert_eq!(restored.messages()[0].text(), "hello");
}

#[tokio::test]
async fn test_compress_and_update_session() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = store_in(dir.path());

    store.append_user("old question");
    let assistant_id = store.append_assistant();
    store.with_message(&assistant_id, |m| m.append_text_delta("old answer"));
    store.append_user("new question");

    let prefix = store.compressible_prefix_len();
    assert_eq!(prefix, 2);

    let replaced = store
        .compress_messages_and_update_session(
            prefix,
            "summary of the start",
            Some(TokenUsage::compress(4, 2, "m")),
        )
        .await
        .expect("compress");
    assert_eq!(replaced, 2);
    assert_eq!(store.message_count(), 2);

    // The usage ledger picks up the compression usage, and the result is
    // already persisted.
    let usages = store.usages();
    assert_eq!(usages.len(), 1);
    assert_eq!(usages[0].operation, OperationType::Compress);

    let restored = SessionStore::load(&store.transcript_path())
        .await
        .expect("load");
    assert_eq!(restored.message_count(), 2);
    assert!(matches!(
        &restored.messages()[0].blocks[0],
        Block::Compress { summary, .. } if summary == "summary of the start"
    ));
}

#[tokio::test]
async fn test_compress_with_bad_index_is_noop() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = store_in(dir.path());
    store.append_user("only");

    let replaced = store
        .compress_messages_and_update_session(5, "s", None)
        .await
        .expect("compress");
    assert_eq!(replaced, 0);
    assert_eq!(store.message_count(), 1);
}

#[tokio::test]
async fn test_wire_messages_exposed() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = store_in(dir.path());
    store.append_user("hi");
    let wire = store.wire_messages();
    assert_eq!(wire.len(), 1);
    assert_eq!(wire[0].content, "hi");
}
