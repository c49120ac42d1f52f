//! The tool registry.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Map;
use serde_json::Value;
use tracing::debug;

use swell_protocol::PermissionMode;
use swell_protocol::ToolDefinition;

use crate::context::ToolContext;
use crate::error::ToolError;
use crate::tool::Tool;
use crate::tool::ToolGate;
use crate::tool::ToolResult;

/// Namespace prefix under which MCP tools are merged into the registry.
pub const MCP_TOOL_PREFIX: &str = "mcp__";

/// Executor for MCP-provided tools. The MCP client itself lives outside
/// this workspace.
#[async_trait]
pub trait McpExecutor: Send + Sync {
    /// Definitions of every tool the connected servers provide, already
    /// carrying the [`MCP_TOOL_PREFIX`] namespace.
    fn definitions(&self) -> Vec<ToolDefinition>;

    /// Execute a namespaced MCP tool.
    async fn execute(
        &self,
        tool_name: &str,
        args: Map<String, Value>,
        ctx: &ToolContext,
    ) -> Result<ToolResult, ToolError>;
}

/// Name → plugin map with MCP merging and mode-dependent filtering.
#[derive(Default)]
pub struct ToolRegistry {
    tools: RwLock<HashMap<String, Arc<dyn Tool>>>,
    mcp: RwLock<Option<Arc<dyn McpExecutor>>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a built-in tool, replacing any tool with the same name.
    pub fn register(&self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        debug!(tool = %name, "Registered tool");
        if let Ok(mut tools) = self.tools.write() {
            tools.insert(name, tool);
        }
    }

    /// Register many tools.
    pub fn register_all(&self, tools: impl IntoIterator<Item = Arc<dyn Tool>>) {
        for tool in tools {
            self.register(tool);
        }
    }

    /// Wire the MCP executor; its tools join the namespace transparently.
    pub fn set_mcp_executor(&self, executor: Arc<dyn McpExecutor>) {
        if let Ok(mut slot) = self.mcp.write() {
            *slot = Some(executor);
        }
    }

    /// The MCP executor, when wired.
    pub fn mcp_executor(&self) -> Option<Arc<dyn McpExecutor>> {
        self.mcp.read().ok().and_then(|slot| slot.clone())
    }

    /// A built-in tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools
            .read()
            .ok()
            .and_then(|tools| tools.get(name).cloned())
    }

    /// Whether the name resolves to a built-in or MCP tool.
    pub fn contains(&self, name: &str) -> bool {
        if name.starts_with(MCP_TOOL_PREFIX) {
            return self.mcp_executor().is_some();
        }
        self.get(name).is_some()
    }

    /// Number of built-in tools.
    pub fn len(&self) -> usize {
        self.tools.read().map(|tools| tools.len()).unwrap_or(0)
    }

    /// Whether no built-in tools are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The model-facing tool config for a permission mode.
    ///
    /// `BypassPermissions` withholds interactive tools (there is nobody to
    /// interact with); plan-only tools appear only in plan mode. MCP
    /// definitions are appended after the built-ins. Output is sorted by
    /// name for a stable prompt.
    pub fn definitions_for_mode(&self, mode: PermissionMode) -> Vec<ToolDefinition> {
        let mut definitions: Vec<ToolDefinition> = self
            .tools
            .read()
            .map(|tools| {
                tools
                    .values()
                    .filter(|tool| match tool.gate() {
                        ToolGate::Always => true,
                        ToolGate::Interactive => mode != PermissionMode::BypassPermissions,
                        ToolGate::PlanOnly => mode == PermissionMode::Plan,
                    })
                    .map(|tool| tool.definition())
                    .collect()
            })
            .unwrap_or_default();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));

        if let Some(mcp) = self.mcp_executor() {
            definitions.extend(mcp.definitions());
        }
        definitions
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools_count", &self.len())
            .field("has_mcp", &self.mcp_executor().is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "registry.test.rs"]
mod tests;
