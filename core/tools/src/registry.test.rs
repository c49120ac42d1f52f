use super::*;

struct StaticTool {
    name: &'static str,
    gate: ToolGate,
}

#[async_trait]
impl Tool for StaticTool {
    fn name(&self) -> &str {
        self.name
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name, serde_json::json!({"type": "object"}))
    }

    fn gate(&self) -> ToolGate {
        self.gate
    }

    async fn execute(
        &self,
        _args: Map<String, Value>,
        _ctx: &ToolContext,
    ) -> Result<ToolResult, ToolError> {
        Ok(ToolResult::success("ok"))
    }
}

fn tool(name: &'static str, gate: ToolGate) -> Arc<dyn Tool> {
    Arc::new(StaticTool { name, gate })
}

struct FakeMcp;

#[async_trait]
impl McpExecutor for FakeMcp {
    fn definitions(&self) -> Vec<ToolDefinition> {
        vec![ToolDefinition::new(
            "mcp__server__search",
            serde_json::json!({"type": "object"}),
        )]
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

fn populated() -> ToolRegistry {
    let registry = ToolRegistry::new();
    registry.register_all([
        tool("Bash", ToolGate::Always),
        tool("Read", ToolGate::Always),
        tool("AskUserQuestion", ToolGate::Interactive),
        tool("ExitPlanMode", ToolGate::PlanOnly),
    ]);
    registry
}

#[test]
fn test_register_and_get() {
    let registry = populated();
    assert_eq!(registry.len(), 4);
    assert!(registry.get("Bash").is_some());
    assert!(registry.get("Missing").is_none());
    assert!(registry.contains("Read"));
    assert!(!registry.contains("Missing"));
}

#[test]
fn test_register_replaces_same_name() {
    let registry = populated();
    registry.register(tool("Bash", ToolGate::Interactive));
    assert_eq!(registry.len(), 4);
    assert_eq!(
        registry.get("Bash").map(|t| t.gate()),
        Some(ToolGate::Interactive)
    );
}

#[test]
fn test_default_mode_config() {
    let registry = populated();
    let names: Vec<String> = registry
        .definitions_for_mode(PermissionMode::Default)
        .into_iter()
        .map(|d| d.name)
        .collect();
    // Interactive tools visible, plan-exit hidden.
    assert_eq!(names, vec!["AskUserQuestion", "Bash", "Read"]);
}

#[test]
fn test_bypass_withholds_interactive_tools() {
    let registry = populated();
    let names: Vec<String> = registry
        .definitions_for_mode(PermissionMode::BypassPermissions)
        .into_iter()
        .map(|d| d.name)
        .collect();
    assert_eq!(names, vec!["Bash", "Read"]);
}

#[test]
fn test_plan_mode_exposes_plan_exit() {
    let registry = populated();
    let names: Vec<String> = registry
        .definitions_for_mode(PermissionMode::Plan)
        .into_iter()
        .map(|d| d.name)
        .collect();
    assert_eq!(names, vec!["AskUserQuestion", "Bash", "ExitPlanMode", "Read"]);
}

#[test]
fn test_mcp_tools_merged_into_config() {
    let registry = populated();
    registry.set_mcp_executor(Arc::new(FakeMcp));

    let names: Vec<String> = registry
        .definitions_for_mode(PermissionMode::Default)
        .into_iter()
        .map(|d| d.name)
        .collect();
    assert!(names.contains(&"mcp__server__search".to_string()));
    assert!(registry.contains("mcp__server__search"));
}
