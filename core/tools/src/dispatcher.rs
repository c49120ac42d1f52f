//! Tool dispatch.
//!
//! The single entry point the turn engine calls once a tool call has
//! cleared hooks and permissions. Every failure mode is folded into a
//! failed [`ToolResult`]; callers never see an `Err`.

use serde_json::Map;
use serde_json::Value;
use tracing::debug;
use tracing::warn;

use crate::context::ToolContext;
use crate::registry::MCP_TOOL_PREFIX;
use crate::registry::ToolRegistry;
use crate::tool::ToolResult;

/// Execute a tool by name.
///
/// Unknown names yield `{success: false, error: "Tool not found"}`; MCP
/// names dispatch to the MCP executor; plugin errors and cancellation
/// become failed results. Execution races the context's cancellation
/// token.
pub async fn dispatch(
    registry: &ToolRegistry,
    name: &str,
    args: Map<String, Value>,
    ctx: &ToolContext,
) -> ToolResult {
    if ctx.is_cancelled() {
        return ToolResult::failure("Cancelled");
    }

    if name.starts_with(MCP_TOOL_PREFIX) {
        let Some(mcp) = registry.mcp_executor() else {
            warn!(tool = name, "MCP tool called without an MCP executor");
            return ToolResult::failure(format!("Tool not found: {name}"));
        };
        let result = tokio::select! {
            biased;
            _ = ctx.cancelled() => Err(crate::error::ToolError::Cancelled),
            result = mcp.execute(name, args, ctx) => result,
        };
        return match result {
            Ok(result) => result,
            Err(error) => ToolResult::failure(error.to_string()),
        };
    }

    let Some(tool) = registry.get(name) else {
        debug!(tool = name, "Unknown tool requested");
        return ToolResult::failure(format!("Tool not found: {name}"));
    };

    let result = tokio::select! {
        biased;
        _ = ctx.cancelled() => Err(crate::error::ToolError::Cancelled),
        result = tool.execute(args, ctx) => result,
    };

    match result {
        Ok(result) => result,
        Err(error) => {
            debug!(tool = name, %error, "Tool execution failed");
            ToolResult::failure(error.to_string())
        }
    }
}

#[cfg(test)]
#[path = "dispatcher.test.rs"]
mod tests;
