//! Permission policy for tool calls.
//!
//! The [`PermissionEngine`] decides, for a `(tool name, tool input,
//! permission mode)` triple, whether a call is allowed, denied, or needs a
//! host-side approval. Rules use a small textual DSL (`Bash`,
//! `Bash(git status:*)`, `Edit(src/**/*.rs)`) that round-trips through the
//! settings serialisation. Shell commands are matched segment-by-segment
//! after stripping environment assignments and redirections.

mod command;
mod engine;
mod error;
mod requester;
mod rule;
mod safe_zone;

pub use command::CommandSegment;
pub use command::expand_command_rules;
pub use command::is_blacklisted;
pub use command::is_safe_segment;
pub use command::segment_command;
pub use command::smart_prefix;
pub use command::suggested_prefix_for;
pub use engine::CheckOutcome;
pub use engine::PermissionEngine;
pub use engine::PolicyConfig;
pub use error::PolicyError;
pub use requester::HostBehavior;
pub use requester::HostDecision;
pub use requester::PermissionRequest;
pub use requester::PermissionRequester;
pub use rule::PermissionRule;
pub use rule::path_field;
pub use safe_zone::SafeZone;

/// Tools whose targets are files and that count as "edit-class" for
/// `AcceptEdits` and plan-mode gating.
pub const EDIT_TOOLS: [&str; 4] = ["Edit", "MultiEdit", "Write", "Delete"];

/// Returns `true` if `name` is an edit-class tool.
pub fn is_edit_tool(name: &str) -> bool {
    EDIT_TOOLS.contains(&name)
}
