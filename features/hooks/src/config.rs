//! Configuration loading for hooks.
//!
//! Loads hook definitions from a JSON file of the shape:
//!
//! ```json
//! {
//!   "hooks": [
//!     {
//!       "name": "lint-check",
//!       "event": "pre_tool_use",
//!       "timeout_secs": 10,
//!       "matcher": { "type": "exact", "value": "Bash" },
//!       "command": "lint",
//!       "args": ["--check"],
//!       "env": { "LINT_MODE": "strict" }
//!     }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::HookError;
use crate::registry::HookDefinition;

#[derive(Debug, Deserialize)]
struct HooksJson {
    #[serde(default)]
    hooks: Vec<HookDefinition>,
}

/// Load hook definitions from a JSON file, validating matchers.
pub fn load_hooks_from_json(path: &Path) -> Result<Vec<HookDefinition>, HookError> {
    let content = std::fs::read_to_string(path).map_err(|source| HookError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;

    let parsed: HooksJson =
        serde_json::from_str(&content).map_err(|source| HookError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;

    for definition in &parsed.hooks {
        if let Some(matcher) = &definition.matcher {
            matcher.validate().map_err(|e| HookError::InvalidMatcher {
                message: format!("hook '{}': {e}", definition.name),
            })?;
        }
    }

    debug!(
        path = %path.display(),
        count = parsed.hooks.len(),
        "Loaded hooks from JSON"
    );

    Ok(parsed.hooks)
}

#[cfg(test)]
#[path = "config.test.rs"]
mod tests;
