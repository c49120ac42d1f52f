use super::*;
use swell_message::Block;
use swell_message::ToolBlock;

fn session_in(dir: &Path) -> Session {
    Session::new("/work/project", dir)
}

#[tokio::test]
async fn test_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let session = session_in(dir.path());

    let mut assistant = Message::assistant();
    assistant.append_text_delta("hello");
    let mut tool = ToolBlock::streaming("call-1", "Bash");
    tool.finish_success("/work", None).expect("finish");
    assistant.push_block(Block::Tool(tool));

    let messages = vec![Message::user("hi"), assistant];
    write_transcript(&session, &messages).await.expect("write");

    let (loaded_session, loaded_messages) =
        load_transcript(&session.transcript_path).await.expect("load");
    assert_eq!(loaded_session.id, session.id);
    assert_eq!(loaded_messages.len(), 2);
    assert_eq!(loaded_messages[0].text(), "hi");
    let block = loaded_messages[1]
        .tool_blocks()
        .next()
        .expect("tool block");
    assert_eq!(block.id, "call-1");
    assert!(block.is_terminal());
}

#[tokio::test]
async fn test_write_creates_parent_dirs() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut session = session_in(dir.path());
    session.transcript_path = dir.path().join("nested/deeper/session.jsonl");

    write_transcript(&session, &[]).await.expect("write");
    assert!(session.transcript_path.exists());
}

#[tokio::test]
async fn test_rewrite_replaces_contents() {
    let dir = tempfile::tempdir().expect("tempdir");
    let session = session_in(dir.path());

    write_transcript(&session, &[Message::user("one")])
        .await
        .expect("write");
    write_transcript(&session, &[Message::user("one"), Message::user("two")])
        .await
        .expect("rewrite");

    let (_, messages) = load_transcript(&session.transcript_path).await.expect("load");
    assert_eq!(messages.len(), 2);
}

#[tokio::test]
async fn test_load_skips_corrupt_lines() {
    let dir = tempfile::tempdir().expect("tempdir");
    let session = session_in(dir.path());
    write_transcript(&session, &[Message::user("kept")])
        .await
        .expect("write");

    let mut content = tokio::fs::read_to_string(&session.transcript_path)
        .await
        .expect("read");
    content.push_str("this is not json\n");
    tokio::fs::write(&session.transcript_path, content)
        .await
        .expect("write corrupt");

    let (_, messages) = load_transcript(&session.transcript_path).await.expect("load");
    assert_eq!(messages.len(), 1);
}

#[tokio::test]
async fn test_load_without_header_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("broken.jsonl");
    tokio::fs::write(&path, "\n").await.expect("write");

    assert!(matches!(
        load_transcript(&path).await,
        Err(SessionError::MissingHeader { .. })
    ));
}

#[tokio::test]
async fn test_load_missing_file_fails() {
    let result = load_transcript(Path::new("/nonexistent/nope.jsonl")).await;
    assert!(matches!(result, Err(SessionError::Io { .. })));
}
