use super::*;
use crate::context::ToolContextBuilder;
use std::sync::Arc;
use swell_policy::PermissionEngine;
use swell_policy::PolicyConfig;

struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "Echo"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::full(
            "Echo",
            "Echo the message back",
            serde_json::json!({
                "type": "object",
                "properties": { "message": {"type": "string"} },
                "required": ["message"]
            }),
        )
    }

    async fn execute(
        &self,
        args: Map<String, Value>,
        _ctx: &ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let message = args
            .get("message")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::InvalidInput {
                message: "message must be a string".to_string(),
            })?;
        Ok(ToolResult::success(format!("echo: {message}")))
    }
}

fn ctx() -> ToolContext {
    let permissions =
        Arc::new(PermissionEngine::new("/work", PolicyConfig::default()).expect("engine"));
    ToolContextBuilder::new("call-1", permissions, "/work").build()
}

#[tokio::test]
async fn test_tool_execute() {
    let tool = EchoTool;
    let mut args = Map::new();
    args.insert("message".to_string(), Value::String("hi".to_string()));

    let result = tool.execute(args, &ctx()).await.expect("execute");
    assert!(result.success);
    assert_eq!(result.content.as_text(), "echo: hi");
}

#[tokio::test]
async fn test_tool_invalid_input() {
    let tool = EchoTool;
    let result = tool.execute(Map::new(), &ctx()).await;
    assert!(matches!(result, Err(ToolError::InvalidInput { .. })));
}

#[test]
fn test_default_gate() {
    assert_eq!(EchoTool.gate(), ToolGate::Always);
}

#[test]
fn test_default_compact_params_prefers_path_field() {
    let tool = EchoTool;
    let args: Map<String, Value> =
        serde_json::from_str(r#"{"file_path": "src/main.rs"}"#).expect("args");
    assert_eq!(
        tool.format_compact_params(&args, &ctx()),
        Some("src/main.rs".to_string())
    );

    let args: Map<String, Value> =
        serde_json::from_str(r#"{"command": "git status"}"#).expect("args");
    assert_eq!(
        tool.format_compact_params(&args, &ctx()),
        Some("git status".to_string())
    );

    let args: Map<String, Value> = serde_json::from_str(r#"{"other": 1}"#).expect("args");
    assert_eq!(tool.format_compact_params(&args, &ctx()), None);
}

#[test]
fn test_result_constructors() {
    let ok = ToolResult::success("done").with_short_result("d");
    assert!(ok.success);
    assert_eq!(ok.short_result.as_deref(), Some("d"));
    assert!(!ok.backgrounded);

    let failed = ToolResult::failure("boom");
    assert!(!failed.success);
    assert_eq!(failed.error.as_deref(), Some("boom"));
    assert_eq!(failed.content.as_text(), "boom");

    let backgrounded = ToolResult::success("x").with_backgrounded(true);
    assert!(backgrounded.backgrounded);
}
