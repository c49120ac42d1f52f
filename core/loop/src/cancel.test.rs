use super::*;

#[test]
fn test_fresh_pair_not_cancelled() {
    let tokens = TurnTokens::new();
    assert!(!tokens.turn_cancelled());
    assert!(!tokens.tools_cancelled());
    assert!(!tokens.any_cancelled());
}

#[test]
fn test_turn_abort_implies_tools() {
    let tokens = TurnTokens::new();
    tokens.abort_turn();
    assert!(tokens.turn_cancelled());
    assert!(tokens.tools_cancelled());
}

#[test]
fn test_tools_abort_leaves_turn_alive() {
    let tokens = TurnTokens::new();
    tokens.abort_tools();
    assert!(tokens.tools_cancelled());
    assert!(!tokens.turn_cancelled());
    assert!(tokens.any_cancelled());
}

#[test]
fn test_abort_is_idempotent() {
    let tokens = TurnTokens::new();
    tokens.abort_turn();
    tokens.abort_turn();
    tokens.abort_tools();
    assert!(tokens.turn_cancelled());
}

#[test]
fn test_clones_share_state() {
    let tokens = TurnTokens::new();
    let clone = tokens.clone();
    tokens.abort_tools();
    assert!(clone.tools_cancelled());
}

#[tokio::test]
async fn test_cancelled_reports_tools_kind() {
    let tokens = TurnTokens::new();
    let waiter = tokens.clone();
    let handle = tokio::spawn(async move { waiter.cancelled().await });
    tokens.abort_tools();
    assert_eq!(handle.await.expect("join"), CancelKind::Tools);
}

#[tokio::test]
async fn test_cancelled_reports_turn_kind() {
    let tokens = TurnTokens::new();
    let waiter = tokens.clone();
    let handle = tokio::spawn(async move { waiter.cancelled().await });
    tokens.abort_turn();
    assert_eq!(handle.await.expect("join"), CancelKind::Turn);
}
