//! Raw hook execution.
//!
//! Runs one configured command with the JSON context on stdin and captures
//! everything the interpretation layer needs. Nothing here inspects the
//! output; see [`crate::directive`].

use std::process::Stdio;
use std::time::Duration;
use std::time::Instant;

use serde::Deserialize;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use tracing::warn;

use crate::context::HookContext;
use crate::registry::HookDefinition;

/// The raw result of running one hook command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookExecution {
    /// Name of the hook that ran.
    pub hook_name: String,
    /// Whether the process ran to completion with exit code 0.
    pub success: bool,
    /// Exit code; -1 when the process died without one or never ran.
    pub exit_code: i32,
    /// Captured stdout.
    pub stdout: String,
    /// Captured stderr.
    pub stderr: String,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: i64,
    /// Whether the per-hook timeout fired.
    pub timed_out: bool,
}

impl HookExecution {
    /// An execution record for a hook that never produced output
    /// (spawn failure, serialisation failure).
    fn failed(hook_name: &str, stderr: String, duration_ms: i64) -> Self {
        Self {
            hook_name: hook_name.to_string(),
            success: false,
            exit_code: -1,
            stdout: String::new(),
            stderr,
            duration_ms,
            timed_out: false,
        }
    }
}

/// Run one hook command to completion, honouring its timeout.
///
/// Never returns an error: failures are recorded in the execution and
/// logged. The hook process receives the context JSON on stdin plus the
/// identifying environment variables and the context's env map.
pub async fn run_hook(definition: &HookDefinition, ctx: &HookContext) -> HookExecution {
    let start = Instant::now();

    let ctx_json = match serde_json::to_string(ctx) {
        Ok(json) => json,
        Err(e) => {
            warn!(hook = %definition.name, "Failed to serialize hook context: {e}");
            return HookExecution::failed(
                &definition.name,
                format!("context serialization failed: {e}"),
                start.elapsed().as_millis() as i64,
            );
        }
    };

    debug!(
        hook = %definition.name,
        command = %definition.command,
        event = %ctx.event,
        "Executing hook command"
    );

    let mut command = tokio::process::Command::new(&definition.command);
    command
        .args(&definition.args)
        .current_dir(&ctx.working_dir)
        .env("SWELL_PROJECT_DIR", ctx.working_dir.as_os_str())
        .env("SWELL_SESSION_ID", &ctx.session_id)
        .env("SWELL_HOOK_EVENT", ctx.event.as_str())
        .env("SWELL_TOOL_NAME", ctx.tool_name.as_deref().unwrap_or(""))
        .envs(&ctx.env)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        // A timed-out hook must not linger once its future is dropped.
        .kill_on_drop(true);

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            warn!(hook = %definition.name, "Failed to spawn hook command: {e}");
            return HookExecution::failed(
                &definition.name,
                format!("spawn failed: {e}"),
                start.elapsed().as_millis() as i64,
            );
        }
    };

    if let Some(mut stdin) = child.stdin.take() {
        if let Err(e) = stdin.write_all(ctx_json.as_bytes()).await {
            warn!(hook = %definition.name, "Failed to write hook stdin: {e}");
        }
        drop(stdin);
    }

    let timeout = Duration::from_secs(definition.timeout_secs.max(1) as u64);
    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            warn!(hook = %definition.name, "Failed to wait for hook command: {e}");
            return HookExecution::failed(
                &definition.name,
                format!("wait failed: {e}"),
                start.elapsed().as_millis() as i64,
            );
        }
        Err(_) => {
            warn!(
                hook = %definition.name,
                timeout_secs = definition.timeout_secs,
                "Hook timed out"
            );
            return HookExecution {
                hook_name: definition.name.clone(),
                success: false,
                exit_code: -1,
                stdout: String::new(),
                stderr: String::new(),
                duration_ms: start.elapsed().as_millis() as i64,
                timed_out: true,
            };
        }
    };

    let exit_code = output.status.code().unwrap_or(-1);
    HookExecution {
        hook_name: definition.name.clone(),
        success: output.status.success(),
        exit_code,
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        duration_ms: start.elapsed().as_millis() as i64,
        timed_out: false,
    }
}

#[cfg(test)]
#[path = "execution.test.rs"]
mod tests;
