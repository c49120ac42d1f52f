//! The permission engine.
//!
//! For every tool call the engine produces a decision through a fixed
//! first-match pipeline:
//!
//! 1. deny rules (deny always wins)
//! 2. `BypassPermissions` mode
//! 3. `AcceptEdits` mode for edit-class tools, gated by the Safe Zone
//! 4. plan mode (only the plan file is writable; `Bash`/`Delete` refused)
//! 5. allow rules, persistent and temporary
//! 6. unrestricted tools default-allow
//! 7. the host callback
//! 8. deny (no approver configured)
//!
//! The engine itself never returns an error to callers; callback failures
//! surface as deny decisions.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::RwLock;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use tracing::warn;

use swell_protocol::PermissionDecision;
use swell_protocol::PermissionMode;

use crate::command::is_safe_segment;
use crate::command::segment_command;
use crate::error::PolicyError;
use crate::is_edit_tool;
use crate::requester::HostBehavior;
use crate::requester::PermissionRequest;
use crate::requester::PermissionRequester;
use crate::rule::PermissionRule;
use crate::rule::path_field;
use crate::safe_zone::SafeZone;

/// Tools that require an explicit allow source in `Default` mode.
fn default_restricted_tools() -> Vec<String> {
    ["Bash", "Edit", "MultiEdit", "Write", "Delete"]
        .map(str::to_string)
        .to_vec()
}

/// Static policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Persistent allow rules in textual form.
    #[serde(default)]
    pub allow: Vec<String>,
    /// Persistent deny rules in textual form.
    #[serde(default)]
    pub deny: Vec<String>,
    /// Tools that are default-deny without an allow source.
    #[serde(default = "default_restricted_tools")]
    pub restricted_tools: Vec<String>,
    /// Additional Safe-Zone directories beyond the working directory.
    #[serde(default)]
    pub additional_directories: Vec<PathBuf>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            allow: Vec::new(),
            deny: Vec::new(),
            restricted_tools: default_restricted_tools(),
            additional_directories: Vec::new(),
        }
    }
}

/// Outcome of a full (host-inclusive) permission check.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    /// The decision for this call.
    pub decision: PermissionDecision,
    /// Replacement input supplied by the host, if any.
    pub updated_input: Option<Value>,
    /// Mode switch requested by the host, if any.
    pub new_permission_mode: Option<PermissionMode>,
    /// Whether the turn should keep recursing (host-controlled; defaults
    /// to `true`).
    pub should_continue_recursion: bool,
}

impl CheckOutcome {
    fn from_decision(decision: PermissionDecision) -> Self {
        Self {
            decision,
            updated_input: None,
            new_permission_mode: None,
            should_continue_recursion: true,
        }
    }
}

/// Mutable rule state, swapped atomically under one lock.
#[derive(Debug, Default)]
struct RuleState {
    allow: Vec<PermissionRule>,
    deny: Vec<PermissionRule>,
    /// Turn-scoped allow rules, cleared by the depth-0 finaliser.
    temporary: Vec<PermissionRule>,
}

/// Decides allow/deny/ask per tool call. See the module docs for the
/// pipeline.
pub struct PermissionEngine {
    rules: RwLock<RuleState>,
    safe_zone: SafeZone,
    restricted: HashSet<String>,
    plan_file: RwLock<Option<PathBuf>>,
    requester: RwLock<Option<Arc<dyn PermissionRequester>>>,
}

impl PermissionEngine {
    /// Build an engine for a working directory from static configuration.
    ///
    /// Fails only on unparseable rule text.
    pub fn new(working_dir: impl Into<PathBuf>, config: PolicyConfig) -> Result<Self, PolicyError> {
        let mut safe_zone = SafeZone::new(working_dir);
        for dir in &config.additional_directories {
            safe_zone = safe_zone.with_additional_dir(dir);
        }

        let allow = config
            .allow
            .iter()
            .map(|text| PermissionRule::parse(text))
            .collect::<Result<Vec<_>, _>>()?;
        let deny = config
            .deny
            .iter()
            .map(|text| PermissionRule::parse(text))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            rules: RwLock::new(RuleState {
                allow,
                deny,
                temporary: Vec::new(),
            }),
            safe_zone,
            restricted: config.restricted_tools.into_iter().collect(),
            plan_file: RwLock::new(None),
            requester: RwLock::new(None),
        })
    }

    /// Install the host approval callback.
    pub fn set_requester(&self, requester: Arc<dyn PermissionRequester>) {
        if let Ok(mut slot) = self.requester.write() {
            *slot = Some(requester);
        }
    }

    /// The Safe Zone this engine enforces.
    pub fn safe_zone(&self) -> &SafeZone {
        &self.safe_zone
    }

    /// Set (or clear) the plan file that stays writable in plan mode.
    pub fn set_plan_file(&self, path: Option<PathBuf>) {
        if let Ok(mut slot) = self.plan_file.write() {
            *slot = path.map(|p| self.safe_zone.resolve(p));
        }
    }

    /// Add a persistent allow rule ("always allow").
    pub fn add_allow_rule(&self, rule: PermissionRule) {
        debug!(rule = %rule, "Adding persistent allow rule");
        if let Ok(mut state) = self.rules.write() {
            if !state.allow.contains(&rule) {
                state.allow.push(rule);
            }
        }
    }

    /// Install turn-scoped allow rules.
    pub fn install_temporary_rules(&self, rules: Vec<PermissionRule>) {
        if rules.is_empty() {
            return;
        }
        debug!(count = rules.len(), "Installing temporary allow rules");
        if let Ok(mut state) = self.rules.write() {
            state.temporary.extend(rules);
        }
    }

    /// Drop all turn-scoped rules. Runs in the turn finaliser regardless of
    /// outcome.
    pub fn clear_temporary_rules(&self) {
        if let Ok(mut state) = self.rules.write() {
            state.temporary.clear();
        }
    }

    /// All currently-active allow rules (persistent then temporary).
    pub fn allow_rules(&self) -> Vec<PermissionRule> {
        self.rules
            .read()
            .map(|state| {
                state
                    .allow
                    .iter()
                    .chain(state.temporary.iter())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Run the rule pipeline (steps 1–6) without consulting the host.
    ///
    /// Returns `Ask` when the pipeline cannot resolve the call on its own.
    pub fn evaluate(
        &self,
        tool_name: &str,
        input: &Value,
        mode: PermissionMode,
    ) -> PermissionDecision {
        // Step 1: deny rules. Deny always wins.
        if let Some(rule) = self.first_matching_deny(tool_name, input) {
            return PermissionDecision::deny(format!("explicitly denied by rule {rule}"));
        }

        // Step 2: bypass mode.
        if mode == PermissionMode::BypassPermissions {
            return PermissionDecision::Allow;
        }

        // Step 3: accept-edits mode, gated by the Safe Zone.
        if mode == PermissionMode::AcceptEdits && is_edit_tool(tool_name) {
            return match path_field(input) {
                Some(path) if self.safe_zone.contains(path) => PermissionDecision::Allow,
                Some(_) => PermissionDecision::deny("outside Safe Zone"),
                None => PermissionDecision::deny("unable to resolve target path"),
            };
        }

        // Step 4: plan mode.
        if mode == PermissionMode::Plan {
            if matches!(tool_name, "Bash" | "Delete") {
                return PermissionDecision::deny("not allowed in plan mode");
            }
            if is_edit_tool(tool_name) {
                return if self.is_plan_file(input) {
                    PermissionDecision::Allow
                } else {
                    PermissionDecision::deny("plan mode: only the plan file is writable")
                };
            }
        }

        // Step 5: allow rules (persistent + temporary).
        if self.allowed_by_rules(tool_name, input) {
            return PermissionDecision::Allow;
        }

        // Step 6: unrestricted tools run without approval.
        if !self.restricted.contains(tool_name) {
            return PermissionDecision::Allow;
        }

        PermissionDecision::Ask
    }

    /// Full check including the host callback (steps 1–8).
    pub async fn check(
        &self,
        tool_name: &str,
        input: &Value,
        mode: PermissionMode,
    ) -> CheckOutcome {
        match self.evaluate(tool_name, input, mode) {
            PermissionDecision::Ask => self.consult_host(tool_name, input, mode).await,
            resolved => CheckOutcome::from_decision(resolved),
        }
    }

    /// Step 7/8: hand the call to the host, or deny when no approver is
    /// configured.
    async fn consult_host(
        &self,
        tool_name: &str,
        input: &Value,
        mode: PermissionMode,
    ) -> CheckOutcome {
        let requester = self.requester.read().ok().and_then(|slot| slot.clone());
        let Some(requester) = requester else {
            return CheckOutcome::from_decision(PermissionDecision::deny(
                "no approver configured",
            ));
        };

        let request = PermissionRequest {
            tool_name: tool_name.to_string(),
            tool_input: input.clone(),
            permission_mode: mode,
            suggested_prefix: crate::command::suggested_prefix_for(tool_name, input),
            hide_persistent_option: false,
        };

        match requester.request_permission(request).await {
            Ok(decision) => {
                if let Some(rule_text) = &decision.new_permission_rule {
                    match PermissionRule::parse(rule_text) {
                        Ok(rule) => self.add_allow_rule(rule),
                        Err(error) => {
                            warn!(rule = %rule_text, %error, "Ignoring unparseable host rule")
                        }
                    }
                }
                let decision_result = match decision.behavior {
                    HostBehavior::Allow => PermissionDecision::Allow,
                    HostBehavior::Deny => PermissionDecision::deny(
                        decision
                            .message
                            .clone()
                            .unwrap_or_else(|| "denied by user".to_string()),
                    ),
                };
                CheckOutcome {
                    decision: decision_result,
                    updated_input: decision.updated_input,
                    new_permission_mode: decision.new_permission_mode,
                    should_continue_recursion: decision.should_continue_recursion.unwrap_or(true),
                }
            }
            Err(error) => {
                warn!(tool = tool_name, %error, "Permission callback failed");
                CheckOutcome::from_decision(PermissionDecision::deny("permission callback error"))
            }
        }
    }

    fn first_matching_deny(&self, tool_name: &str, input: &Value) -> Option<PermissionRule> {
        let state = self.rules.read().ok()?;
        // A deny rule matches a Bash call when any one segment matches it.
        if tool_name == "Bash" {
            let command = input.get("command").and_then(Value::as_str).unwrap_or("");
            let segments = segment_command(command);
            return state
                .deny
                .iter()
                .find(|rule| {
                    rule.tool_name() == "Bash"
                        && segments.iter().any(|s| rule.matches_segment(&s.text))
                })
                .cloned();
        }
        let candidates = self.path_candidates(input);
        let candidate_refs: Vec<&str> = candidates.iter().map(String::as_str).collect();
        state
            .deny
            .iter()
            .find(|rule| rule.matches_path(tool_name, &candidate_refs))
            .cloned()
    }

    /// Step-5 allow matching.
    ///
    /// For `Bash`, every segment must be safe or covered by at least one
    /// allow rule; for path-taking tools a single rule match suffices.
    fn allowed_by_rules(&self, tool_name: &str, input: &Value) -> bool {
        let Ok(state) = self.rules.read() else {
            return false;
        };
        let rules: Vec<&PermissionRule> =
            state.allow.iter().chain(state.temporary.iter()).collect();

        if tool_name == "Bash" {
            let Some(command) = input.get("command").and_then(Value::as_str) else {
                return false;
            };
            let segments = segment_command(command);
            if segments.is_empty() {
                return false;
            }
            return segments.iter().all(|segment| {
                is_safe_segment(segment, &self.safe_zone)
                    || rules.iter().any(|rule| rule.matches_segment(&segment.text))
            });
        }

        let candidates = self.path_candidates(input);
        let candidate_refs: Vec<&str> = candidates.iter().map(String::as_str).collect();
        rules
            .iter()
            .any(|rule| rule.matches_path(tool_name, &candidate_refs))
    }

    /// Path forms a glob rule may match: the raw input and the
    /// workdir-relative resolved form.
    fn path_candidates(&self, input: &Value) -> Vec<String> {
        let Some(raw) = path_field(input) else {
            return Vec::new();
        };
        let mut candidates = vec![raw.to_string()];
        let resolved = self.safe_zone.resolve(raw);
        if let Ok(relative) = resolved.strip_prefix(self.safe_zone.working_dir()) {
            let relative = relative.to_string_lossy().to_string();
            if !relative.is_empty() && !candidates.contains(&relative) {
                candidates.push(relative);
            }
        }
        let absolute = resolved.to_string_lossy().to_string();
        if !candidates.contains(&absolute) {
            candidates.push(absolute);
        }
        candidates
    }

    /// Plan-file equation on absolutized paths, never raw strings.
    fn is_plan_file(&self, input: &Value) -> bool {
        let Some(raw) = path_field(input) else {
            return false;
        };
        let resolved = self.safe_zone.resolve(raw);
        self.plan_file
            .read()
            .ok()
            .and_then(|slot| slot.clone())
            .is_some_and(|plan| plan == resolved)
    }
}

impl std::fmt::Debug for PermissionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionEngine")
            .field("safe_zone", &self.safe_zone)
            .field("restricted", &self.restricted)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "engine.test.rs"]
mod tests;
