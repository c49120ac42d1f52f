//! Typed message blocks and the tool-block stage machine.

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use swell_protocol::TokenUsage;

use crate::error::MessageError;

/// Stage of a tool block. Transitions are monotonic:
/// `Streaming → Running → End`. `End` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolStage {
    /// The call is still being streamed by the model.
    Streaming,
    /// The call is executing locally.
    Running,
    /// The call has finished (success or failure).
    End,
}

impl std::fmt::Display for ToolStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Streaming => "streaming",
            Self::Running => "running",
            Self::End => "end",
        };
        write!(f, "{s}")
    }
}

/// A tool call identity accumulating facts across its stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolBlock {
    /// Model-assigned stable call id.
    pub id: String,
    /// Tool name (may arrive mid-stream).
    pub name: String,
    /// Raw argument string as received from the model.
    #[serde(default)]
    pub arguments_raw: String,
    /// Parsed argument mapping (empty until `Running`).
    #[serde(default)]
    pub arguments: Map<String, Value>,
    /// Short human-readable parameter summary for UI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compact_params: Option<String>,
    /// Current stage.
    pub stage: ToolStage,
    /// Result text, set at `End`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    /// Short result for UI, set at `End`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_result: Option<String>,
    /// Whether execution succeeded, set at `End`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    /// Error text for failed calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Whether the user manually backgrounded this call.
    #[serde(default)]
    pub backgrounded: bool,
}

impl ToolBlock {
    /// Create a block for a call first observed mid-stream.
    pub fn streaming(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments_raw: String::new(),
            arguments: Map::new(),
            compact_params: None,
            stage: ToolStage::Streaming,
            result: None,
            short_result: None,
            success: None,
            error: None,
            backgrounded: false,
        }
    }

    /// Create a block directly in `Running` (non-streaming mode).
    pub fn running(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments_raw: impl Into<String>,
        arguments: Map<String, Value>,
    ) -> Self {
        Self {
            arguments_raw: arguments_raw.into(),
            arguments,
            stage: ToolStage::Running,
            ..Self::streaming(id, name)
        }
    }

    /// Append a streamed argument fragment. Only legal while `Streaming`.
    pub fn append_arguments_delta(&mut self, delta: &str) -> Result<(), MessageError> {
        self.ensure_before(ToolStage::Running)?;
        self.arguments_raw.push_str(delta);
        Ok(())
    }

    /// Record the tool name once it is known mid-stream.
    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !name.is_empty() {
            self.name = name;
        }
    }

    /// Advance to `Running` with parsed arguments.
    pub fn begin_running(
        &mut self,
        arguments: Map<String, Value>,
        compact_params: Option<String>,
    ) -> Result<(), MessageError> {
        self.ensure_before(ToolStage::End)?;
        self.arguments = arguments;
        self.compact_params = compact_params;
        self.stage = ToolStage::Running;
        Ok(())
    }

    /// Finish the call successfully.
    pub fn finish_success(
        &mut self,
        result: impl Into<String>,
        short_result: Option<String>,
    ) -> Result<(), MessageError> {
        self.ensure_before(ToolStage::End)?;
        self.stage = ToolStage::End;
        self.result = Some(result.into());
        self.short_result = short_result;
        self.success = Some(true);
        self.error = None;
        Ok(())
    }

    /// Finish the call with an error.
    pub fn finish_failure(&mut self, error: impl Into<String>) -> Result<(), MessageError> {
        self.ensure_before(ToolStage::End)?;
        let error = error.into();
        self.stage = ToolStage::End;
        self.success = Some(false);
        if self.result.is_none() {
            self.result = Some(error.clone());
        }
        self.error = Some(error);
        Ok(())
    }

    /// Append post-hook context to the result. The only mutation a block
    /// in `End` accepts.
    pub fn append_result_context(&mut self, context: &str) -> Result<(), MessageError> {
        if self.stage != ToolStage::End {
            return Err(MessageError::InvalidStageTransition {
                call_id: self.id.clone(),
                from: self.stage,
                to: self.stage,
            });
        }
        let existing = self.result.take().unwrap_or_default();
        self.result = Some(if existing.is_empty() {
            context.to_string()
        } else {
            format!("{existing}\n\n{context}")
        });
        Ok(())
    }

    /// Mark the call as manually backgrounded.
    pub fn set_backgrounded(&mut self, backgrounded: bool) {
        self.backgrounded = backgrounded;
    }

    /// Whether the block has reached its terminal stage.
    pub fn is_terminal(&self) -> bool {
        self.stage == ToolStage::End
    }

    fn ensure_before(&self, to: ToolStage) -> Result<(), MessageError> {
        if self.stage >= to {
            return Err(MessageError::InvalidStageTransition {
                call_id: self.id.clone(),
                from: self.stage,
                to,
            });
        }
        Ok(())
    }
}

/// One typed block within a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// Plain text content.
    Text {
        /// The text.
        text: String,
    },
    /// Model reasoning content.
    Reasoning {
        /// The reasoning text.
        text: String,
    },
    /// A tool call with its lifecycle state.
    Tool(ToolBlock),
    /// A rendered diff.
    Diff {
        /// File the diff applies to.
        path: String,
        /// Unified diff text.
        diff: String,
    },
    /// A user-visible error.
    Error {
        /// The error text.
        message: String,
    },
    /// Injected memory content.
    Memory {
        /// The memory text.
        content: String,
    },
    /// A subagent invocation record.
    Subagent {
        /// Identifier of the subagent.
        agent_id: String,
        /// What the subagent was asked to do.
        description: String,
        /// Its result, once finished.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        result: Option<String>,
    },
    /// Marker for a file-history snapshot taken at this point.
    FileHistorySnapshot {
        /// Snapshot identifier.
        snapshot_id: String,
    },
    /// Replacement summary for compressed-away history.
    Compress {
        /// The summary text.
        summary: String,
        /// Usage of the compression call that produced it.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        usage: Option<TokenUsage>,
    },
}

impl Block {
    /// Create a text block.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create an error block.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// The tool block inside, if this is a tool block.
    pub fn as_tool(&self) -> Option<&ToolBlock> {
        match self {
            Self::Tool(block) => Some(block),
            _ => None,
        }
    }

    /// Mutable access to the tool block inside, if any.
    pub fn as_tool_mut(&mut self) -> Option<&mut ToolBlock> {
        match self {
            Self::Tool(block) => Some(block),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "block.test.rs"]
mod tests;
