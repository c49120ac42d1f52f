use super::*;
use crate::context::ToolContextBuilder;
use crate::error::ToolError;
use crate::registry::McpExecutor;
use crate::tool::Tool;
use async_trait::async_trait;
use std::sync::Arc;
use swell_policy::PermissionEngine;
use swell_policy::PolicyConfig;
use swell_protocol::ToolDefinition;
use tokio_util::sync::CancellationToken;

struct OkTool;

#[async_trait]
impl Tool for OkTool {
    fn name(&self) -> &str {
        "Ok"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("Ok", serde_json::json!({"type": "object"}))
    }

    async fn execute(
        &self,
        _args: Map<String, Value>,
        _ctx: &ToolContext,
    ) -> Result<ToolResult, ToolError> {
        Ok(ToolResult::success("fine"))
    }
}

struct FailingTool;

#[async_trait]
impl Tool for FailingTool {
    fn name(&self) -> &str {
        "Failing"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("Failing", serde_json::json!({"type": "object"}))
    }

    async fn execute(
        &self,
        _args: Map<String, Value>,
        _ctx: &ToolContext,
    ) -> Result<ToolResult, ToolError> {
        Err(ToolError::ExecutionFailed {
            message: "went sideways".to_string(),
        })
    }
}

struct HangingTool;

#[async_trait]
impl Tool for HangingTool {
    fn name(&self) -> &str {
        "Hanging"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("Hanging", serde_json::json!({"type": "object"}))
    }

    async fn execute(
        &self,
        _args: Map<String, Value>,
        ctx: &ToolContext,
    ) -> Result<ToolResult, ToolError> {
        ctx.cancelled().await;
        Err(ToolError::Cancelled)
    }
}

struct FakeMcp;

#[async_trait]
impl McpExecutor for FakeMcp {
    fn definitions(&self) -> Vec<ToolDefinition> {
        Vec::new()
    }

    async fn execute(
        &self,
        tool_name: &str,
        _args: Map<String, Value>,
        _ctx: &ToolContext,
    ) -> Result<ToolResult, ToolError> {
        Ok(ToolResult::success(format!("mcp ran {tool_name}")))
    }
}

fn registry() -> ToolRegistry {
    let registry = ToolRegistry::new();
    registry.register(Arc::new(OkTool));
    registry.register(Arc::new(FailingTool));
    registry.register(Arc::new(HangingTool));
    registry
}

fn ctx(cancel: CancellationToken) -> ToolContext {
    let permissions =
        Arc::new(PermissionEngine::new("/work", PolicyConfig::default()).expect("engine"));
    ToolContextBuilder::new("call-1", permissions, "/work")
        .cancel(cancel)
        .build()
}

#[tokio::test]
async fn test_dispatch_success() {
    let result = dispatch(&registry(), "Ok", Map::new(), &ctx(CancellationToken::new())).await;
    assert!(result.success);
    assert_eq!(result.content.as_text(), "fine");
}

#[tokio::test]
async fn test_dispatch_unknown_tool() {
    let result = dispatch(
        &registry(),
        "Nope",
        Map::new(),
        &ctx(CancellationToken::new()),
    )
    .await;
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Tool not found: Nope"));
}

#[tokio::test]
async fn test_dispatch_plugin_error_becomes_failed_result() {
    let result = dispatch(
        &registry(),
        "Failing",
        Map::new(),
        &ctx(CancellationToken::new()),
    )
    .await;
    assert!(!result.success);
    assert!(result.error.as_deref().unwrap_or("").contains("went sideways"));
}

#[tokio::test]
async fn test_dispatch_mcp_routing() {
    let registry = registry();
    registry.set_mcp_executor(Arc::new(FakeMcp));
    let result = dispatch(
        &registry,
        "mcp__server__search",
        Map::new(),
        &ctx(CancellationToken::new()),
    )
    .await;
    assert!(result.success);
    assert_eq!(result.content.as_text(), "mcp ran mcp__server__search");
}

#[tokio::test]
async fn test_dispatch_mcp_without_executor() {
    let result = dispatch(
        &registry(),
        "mcp__server__search",
        Map::new(),
        &ctx(CancellationToken::new()),
    )
    .await;
    assert!(!result.success);
    assert!(result.error.as_deref().unwrap_or("").contains("Tool not found"));
}

#[tokio::test]
async fn test_dispatch_pre_cancelled() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let result = dispatch(&registry(), "Ok", Map::new(), &ctx(cancel)).await;
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Cancelled"));
}

#[tokio::test]
async fn test_dispatch_cancellation_mid_flight() {
    let cancel = CancellationToken::new();
    let registry = registry();
    let ctx = ctx(cancel.clone());

    let handle = tokio::spawn(async move {
        dispatch(&registry, "Hanging", Map::new(), &ctx).await
    });
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    cancel.cancel();

    let result = handle.await.expect("join");
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Cancelled"));
}
