//! The hook engine.
//!
//! Hooks are user-configured external commands run at named lifecycle
//! points. Each hook receives a JSON context on stdin and can steer the
//! engine through structured stdout or its exit code. Execution and
//! interpretation are deliberately split: [`HookEngine::execute_hooks`]
//! returns raw [`HookExecution`]s; [`process_hook_results`] is the single
//! place that turns a batch into a normalised [`HookDirective`].

mod config;
mod context;
mod directive;
mod error;
mod event;
mod execution;
mod matcher;
mod output;
mod registry;

pub use config::load_hooks_from_json;
pub use context::HookContext;
pub use directive::HookDirective;
pub use directive::HookPermissionDecision;
pub use directive::process_hook_results;
pub use error::HookError;
pub use event::HookEvent;
pub use execution::HookExecution;
pub use matcher::HookMatcher;
pub use output::HookOutput;
pub use output::HookSpecificOutput;
pub use output::parse_hook_stdout;
pub use registry::HookDefinition;
pub use registry::HookEngine;
