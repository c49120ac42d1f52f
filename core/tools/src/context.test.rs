use super::*;
use std::sync::Arc;
use swell_policy::PermissionEngine;
use swell_policy::PolicyConfig;

fn permissions() -> Arc<PermissionEngine> {
    Arc::new(PermissionEngine::new("/work/project", PolicyConfig::default()).expect("engine"))
}

#[test]
fn test_builder_defaults() {
    let ctx = ToolContextBuilder::new("call-1", permissions(), "/work/project").build();
    assert_eq!(ctx.call_id, "call-1");
    assert_eq!(ctx.permission_mode, PermissionMode::Default);
    assert!(!ctx.is_cancelled());
    assert!(ctx.background.is_none());
    assert!(ctx.lsp.is_none());
}

#[test]
fn test_builder_sets_fields() {
    let ctx = ToolContextBuilder::new("call-1", permissions(), "/work/project")
        .message_id("msg-1")
        .session_id("session-1")
        .permission_mode(PermissionMode::Plan)
        .build();
    assert_eq!(ctx.message_id, "msg-1");
    assert_eq!(ctx.session_id, "session-1");
    assert_eq!(ctx.permission_mode, PermissionMode::Plan);
}

#[test]
fn test_resolve_path() {
    let ctx = ToolContextBuilder::new("call-1", permissions(), "/work/project").build();
    assert_eq!(
        ctx.resolve_path("src/main.rs"),
        PathBuf::from("/work/project/src/main.rs")
    );
    assert_eq!(ctx.resolve_path("/abs/x"), PathBuf::from("/abs/x"));
}

#[test]
fn test_cancellation_observable() {
    let token = CancellationToken::new();
    let ctx = ToolContextBuilder::new("call-1", permissions(), "/work")
        .cancel(token.clone())
        .build();
    assert!(!ctx.is_cancelled());
    token.cancel();
    assert!(ctx.is_cancelled());
}
