use super::*;
use crate::testing::ScriptedGateway;
use std::sync::atomic::Ordering;
use swell_gateway::CompressResponse;
use swell_message::Block;

fn usage_with_total(total: i64) -> TokenUsage {
    TokenUsage {
        prompt_tokens: total - 20,
        completion_tokens: 20,
        total_tokens: total,
        ..TokenUsage::agent(0, 0, "test-model")
    }
}

fn store_with_two_turns(dir: &std::path::Path) -> Arc<SessionStore> {
    let store = Arc::new(SessionStore::new("/work/project", dir));
    store.append_user("first");
    let id = store.append_assistant();
    store.with_message(&id, |m| m.append_text_delta("answer one"));
    store.append_user("second");
    store
}

fn config(ceiling: Option<i64>) -> CompressorConfig {
    CompressorConfig {
        input_token_ceiling: ceiling,
        ..CompressorConfig::default()
    }
}

#[tokio::test]
async fn test_publishes_comprehensive_total() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = store_with_two_turns(dir.path());
    let gateway: Arc<dyn ModelGateway> = Arc::new(ScriptedGateway::new());

    let usage = TokenUsage {
        cache_read_input_tokens: Some(400),
        cache_creation_input_tokens: Some(25),
        ..usage_with_total(150)
    };
    handle_usage_and_compression(
        &config(None),
        &gateway,
        &store,
        &TurnTokens::new(),
        None,
        &usage,
    )
    .await;

    assert_eq!(store.latest_total_tokens(), 575);
}

#[tokio::test]
async fn test_no_compression_under_ceiling() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = store_with_two_turns(dir.path());
    let scripted = Arc::new(ScriptedGateway::new());
    let gateway: Arc<dyn ModelGateway> = scripted.clone();

    handle_usage_and_compression(
        &config(Some(1000)),
        &gateway,
        &store,
        &TurnTokens::new(),
        None,
        &usage_with_total(900),
    )
    .await;

    assert_eq!(scripted.compress_calls.load(Ordering::SeqCst), 0);
    assert_eq!(store.message_count(), 3);
}

#[tokio::test]
async fn test_compression_over_ceiling_replaces_prefix() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = store_with_two_turns(dir.path());
    let scripted = Arc::new(ScriptedGateway::new());
    scripted.set_compress_response(CompressResponse {
        content: "what happened before".to_string(),
        usage: Some(TokenUsage::agent(30, 10, "test-model")),
    });
    let gateway: Arc<dyn ModelGateway> = scripted.clone();

    handle_usage_and_compression(
        &config(Some(1000)),
        &gateway,
        &store,
        &TurnTokens::new(),
        None,
        &usage_with_total(1200),
    )
    .await;

    assert_eq!(scripted.compress_calls.load(Ordering::SeqCst), 1);
    // Only the prefix older than the most recent turn was summarised.
    assert_eq!(scripted.last_compress_len.load(Ordering::SeqCst), 2);

    let messages = store.messages();
    assert_eq!(messages.len(), 2);
    match &messages[0].blocks[0] {
        Block::Compress { summary, usage } => {
            assert_eq!(summary, "what happened before");
            // The compression usage is re-stamped with the compress
            // operation.
            assert_eq!(
                usage.as_ref().map(|u| u.operation),
                Some(OperationType::Compress)
            );
        }
        other => panic!("expected compress block, got {other:?}"),
    }
    assert_eq!(messages[1].text(), "second");

    // The published total stays visible.
    assert_eq!(store.latest_total_tokens(), 1200);
}

#[tokio::test]
async fn test_compression_failure_leaves_history_intact() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = store_with_two_turns(dir.path());
    // No compress response scripted → the call errors.
    let gateway: Arc<dyn ModelGateway> = Arc::new(ScriptedGateway::new());

    handle_usage_and_compression(
        &config(Some(1000)),
        &gateway,
        &store,
        &TurnTokens::new(),
        None,
        &usage_with_total(1200),
    )
    .await;

    assert_eq!(store.message_count(), 3);
    assert_eq!(store.latest_total_tokens(), 1200);
}

#[tokio::test]
async fn test_no_compression_when_prefix_too_small() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(SessionStore::new("/work/project", dir.path()));
    store.append_user("only turn");
    let scripted = Arc::new(ScriptedGateway::new());
    let gateway: Arc<dyn ModelGateway> = scripted.clone();

    handle_usage_and_compression(
        &config(Some(100)),
        &gateway,
        &store,
        &TurnTokens::new(),
        None,
        &usage_with_total(500),
    )
    .await;

    assert_eq!(scripted.compress_calls.load(Ordering::SeqCst), 0);
    assert_eq!(store.message_count(), 1);
}

#[tokio::test]
async fn test_session_persisted_before_compression() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = store_with_two_turns(dir.path());
    let scripted = Arc::new(ScriptedGateway::new());
    scripted.set_compress_response(CompressResponse {
        content: "summary".to_string(),
        usage: None,
    });
    let gateway: Arc<dyn ModelGateway> = scripted.clone();

    handle_usage_and_compression(
        &config(Some(1000)),
        &gateway,
        &store,
        &TurnTokens::new(),
        None,
        &usage_with_total(2000),
    )
    .await;

    // The transcript exists and reflects the post-compression state.
    let restored = SessionStore::load(&store.transcript_path()).await.expect("load");
    assert_eq!(restored.message_count(), 2);
}
