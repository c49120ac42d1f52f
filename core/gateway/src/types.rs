//! Request and response shapes for gateway calls.

use serde::Deserialize;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use swell_protocol::TokenUsage;
use swell_protocol::ToolDefinition;

/// Role of a wire-format message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireRole {
    /// End-user content (including rendered tool results).
    User,
    /// Model output.
    Assistant,
    /// System instructions.
    System,
}

/// One message as handed to the gateway: history rendered down to the
/// provider-neutral role/content shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireMessage {
    /// Message role.
    pub role: WireRole,
    /// Rendered text content.
    pub content: String,
}

impl WireMessage {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: WireRole::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: WireRole::Assistant,
            content: content.into(),
        }
    }

    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: WireRole::System,
            content: content.into(),
        }
    }
}

/// Why the model stopped generating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural end of output.
    Stop,
    /// The model is requesting tool calls.
    ToolCalls,
    /// Output hit the token limit.
    Length,
    /// Provider-specific reason.
    Other(String),
}

/// A complete tool call in the final response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallPayload {
    /// Model-assigned stable call id.
    pub id: String,
    /// Tool name.
    pub name: String,
    /// Raw argument string (JSON, possibly empty or truncated).
    pub arguments: String,
}

/// A partial tool call observed during streaming.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallDelta {
    /// Call id the delta belongs to.
    pub id: String,
    /// Tool name, present once known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Argument-string fragment to append.
    #[serde(default)]
    pub arguments_delta: String,
}

/// Typed streaming chunks pushed to the engine's sink, in arrival order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Text content fragment.
    Content {
        /// The fragment.
        delta: String,
    },
    /// Reasoning fragment.
    Reasoning {
        /// The fragment.
        delta: String,
    },
    /// Partial tool call.
    ToolCall {
        /// The partial call.
        delta: ToolCallDelta,
    },
}

/// One agent model call.
pub struct AgentRequest {
    /// Conversation rendered to wire form.
    pub messages: Vec<WireMessage>,
    /// System prompt for this call.
    pub system_prompt: String,
    /// Tool definitions visible to the model.
    pub tools: Vec<ToolDefinition>,
    /// Project memory content, when present.
    pub memory: Option<String>,
    /// Session the call belongs to.
    pub session_id: String,
    /// Model override for this call.
    pub model: Option<String>,
    /// Output token cap for this call.
    pub max_tokens: Option<i64>,
    /// Turn-level cancellation; implementations must abort promptly.
    pub cancel: CancellationToken,
    /// When present, streaming chunks are pushed here before the final
    /// response resolves.
    pub stream: Option<mpsc::Sender<StreamEvent>>,
}

impl std::fmt::Debug for AgentRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentRequest")
            .field("messages", &self.messages.len())
            .field("tools", &self.tools.len())
            .field("session_id", &self.session_id)
            .field("model", &self.model)
            .field("streaming", &self.stream.is_some())
            .finish_non_exhaustive()
    }
}

/// Final result of one agent model call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentResponse {
    /// Text content, when any was produced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Reasoning content, when any was produced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    /// Tool calls requested by the model.
    #[serde(default)]
    pub tool_calls: Vec<ToolCallPayload>,
    /// Usage for this call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    /// Why generation stopped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
}

impl AgentResponse {
    /// Whether the model requested any tool calls.
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Whether the output was truncated by the token limit.
    pub fn is_truncated(&self) -> bool {
        self.finish_reason == Some(FinishReason::Length)
    }
}

/// One compression call.
pub struct CompressRequest {
    /// The message prefix to summarise, in wire form.
    pub messages: Vec<WireMessage>,
    /// Model override for the summarisation call.
    pub model: Option<String>,
    /// Turn-level cancellation.
    pub cancel: CancellationToken,
}

/// Result of a compression call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressResponse {
    /// The replacement summary text.
    pub content: String,
    /// Usage for the summarisation call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

#[cfg(test)]
#[path = "types.test.rs"]
mod tests;
