//! The agent turn engine.
//!
//! [`AgentEngine::send_turn`] drives one user prompt through model↔tool
//! cycles until the model stops requesting tools, enforcing permission
//! gates, pre/post-tool hooks, stop-hooks, token-budget compression,
//! parallel tool execution under shared cancellation, and session
//! persistence. The engine surfaces failures exclusively as blocks in the
//! message store; `send_turn` never returns an error.

mod cancel;
mod compress;
mod config;
mod engine;
mod result;
#[cfg(test)]
pub(crate) mod testing;
mod tool_task;

pub use cancel::CancelKind;
pub use cancel::TurnTokens;
pub use compress::CompressorConfig;
pub use config::EngineConfig;
pub use engine::AgentEngine;
pub use result::StopReason;
pub use result::TurnOptions;
pub use result::TurnResult;
