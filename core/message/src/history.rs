//! The append-only message log with in-place tool-block updates.

use serde_json::Map;
use serde_json::Value;
use tracing::warn;

use swell_gateway::WireMessage;
use swell_protocol::TokenUsage;

use crate::block::Block;
use crate::block::ToolBlock;
use crate::error::MessageError;
use crate::message::Message;
use crate::message::Role;

/// Ordered log of messages for one session.
///
/// Mutation is append-only plus in-place updates of the terminal
/// assistant message and of tool blocks addressed by call id. The usage
/// ledger is derived from the messages themselves so it survives
/// persistence round-trips.
#[derive(Debug, Clone, Default)]
pub struct MessageHistory {
    messages: Vec<Message>,
}

impl MessageHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a history from persisted messages.
    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    /// All messages, in order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Replace the whole log (used by session restore).
    pub fn set_messages(&mut self, messages: Vec<Message>) {
        self.messages = messages;
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Append a message, returning its id.
    pub fn push(&mut self, message: Message) -> String {
        let id = message.id.clone();
        self.messages.push(message);
        id
    }

    /// The terminal message, when it is an assistant message.
    pub fn last_assistant_mut(&mut self) -> Option<&mut Message> {
        self.messages
            .last_mut()
            .filter(|message| message.role == Role::Assistant)
    }

    /// A message by id.
    pub fn message_mut(&mut self, id: &str) -> Option<&mut Message> {
        self.messages.iter_mut().find(|message| message.id == id)
    }

    /// Locate a tool block by call id, searching newest-first.
    pub fn tool_block_mut(&mut self, call_id: &str) -> Option<&mut ToolBlock> {
        self.messages
            .iter_mut()
            .rev()
            .find_map(|message| message.tool_block_mut(call_id))
    }

    /// Apply a mutation to a tool block by call id.
    pub fn update_tool_block<F>(&mut self, call_id: &str, mutate: F) -> Result<(), MessageError>
    where
        F: FnOnce(&mut ToolBlock) -> Result<(), MessageError>,
    {
        match self.tool_block_mut(call_id) {
            Some(block) => mutate(block),
            None => Err(MessageError::UnknownToolCall {
                call_id: call_id.to_string(),
            }),
        }
    }

    /// Append an error block in its own system message.
    pub fn push_error(&mut self, message: impl Into<String>) {
        self.messages
            .push(Message::system_with_blocks(vec![Block::error(message)]));
    }

    /// Index of the first message of the most recent turn (the last user
    /// message). Everything strictly before it is compressible.
    pub fn compressible_prefix_len(&self) -> usize {
        self.messages
            .iter()
            .rposition(|message| message.role == Role::User)
            .unwrap_or(0)
    }

    /// Replace `messages[..prefix_len]` with a single compress-summary
    /// message carrying the summary text and the compression usage.
    ///
    /// Returns the number of replaced messages.
    pub fn compress_replace(
        &mut self,
        prefix_len: usize,
        summary: impl Into<String>,
        usage: Option<TokenUsage>,
    ) -> Result<usize, MessageError> {
        if prefix_len == 0 || prefix_len > self.messages.len() {
            return Err(MessageError::InvalidCompressionPrefix {
                prefix_len,
                message_count: self.messages.len(),
            });
        }
        // Guard: the splice must not separate an unfinished tool block
        // from its message (pairs are intra-message, this checks the
        // boundary is clean anyway).
        if self.messages[..prefix_len]
            .iter()
            .flat_map(Message::tool_blocks)
            .any(|block| !block.is_terminal())
        {
            warn!(prefix_len, "Refusing to compress non-terminal tool blocks");
            return Err(MessageError::InvalidCompressionPrefix {
                prefix_len,
                message_count: self.messages.len(),
            });
        }

        let summary_message = Message::system_with_blocks(vec![Block::Compress {
            summary: summary.into(),
            usage,
        }]);
        self.messages.splice(..prefix_len, [summary_message]);
        Ok(prefix_len)
    }

    /// The usage ledger, in order: assistant usages and compression usages
    /// as they appear in the log.
    pub fn usages(&self) -> Vec<TokenUsage> {
        let mut usages = Vec::new();
        for message in &self.messages {
            for block in &message.blocks {
                if let Block::Compress {
                    usage: Some(usage), ..
                } = block
                {
                    usages.push(usage.clone());
                }
            }
            if let Some(usage) = &message.usage {
                usages.push(usage.clone());
            }
        }
        usages
    }

    /// Render the log to the gateway wire form.
    ///
    /// Assistant tool blocks render as `<tool_call>` lines inside the
    /// assistant message followed by one user message carrying the
    /// `<tool_result>` payloads, so the model sees call and result
    /// adjacent and in order.
    pub fn wire_messages(&self) -> Vec<WireMessage> {
        render_wire(&self.messages)
    }

    /// Render only the first `len` messages to wire form (compression
    /// input).
    pub fn wire_prefix(&self, len: usize) -> Vec<WireMessage> {
        render_wire(&self.messages[..len.min(self.messages.len())])
    }
}

/// Wire-form rendering shared by [`MessageHistory::wire_messages`] and
/// [`MessageHistory::wire_prefix`].
fn render_wire(messages: &[Message]) -> Vec<WireMessage> {
    let mut wire = Vec::with_capacity(messages.len());
    for message in messages {
        match message.role {
            Role::User => wire.push(WireMessage::user(render_plain(message))),
            Role::System => wire.push(WireMessage::system(render_plain(message))),
            Role::Assistant => {
                let mut content = message.text();
                let tool_blocks: Vec<&ToolBlock> = message.tool_blocks().collect();
                for block in &tool_blocks {
                    content.push_str(&format!(
                        "\n<tool_call id=\"{}\" name=\"{}\">{}</tool_call>",
                        block.id, block.name, block.arguments_raw
                    ));
                }
                wire.push(WireMessage::assistant(content));

                let results: String = tool_blocks
                    .iter()
                    .filter(|block| block.is_terminal())
                    .map(|block| {
                        format!(
                            "<tool_result id=\"{}\" success=\"{}\">\n{}\n</tool_result>",
                            block.id,
                            block.success.unwrap_or(false),
                            block.result.as_deref().unwrap_or("")
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                if !results.is_empty() {
                    wire.push(WireMessage::user(results));
                }
            }
        }
    }
    wire
}

/// Render a non-assistant message's blocks to text.
fn render_plain(message: &Message) -> String {
    message
        .blocks
        .iter()
        .map(|block| match block {
            Block::Text { text } | Block::Reasoning { text } => text.clone(),
            Block::Error { message } => format!("<error>{message}</error>"),
            Block::Memory { content } => content.clone(),
            Block::Compress { summary, .. } => {
                format!("<compression_summary>\n{summary}\n</compression_summary>")
            }
            Block::Diff { path, diff } => format!("diff for {path}:\n{diff}"),
            Block::Subagent {
                agent_id, result, ..
            } => format!(
                "<subagent id=\"{agent_id}\">{}</subagent>",
                result.as_deref().unwrap_or("")
            ),
            Block::FileHistorySnapshot { snapshot_id } => {
                format!("<file_snapshot id=\"{snapshot_id}\"/>")
            }
            Block::Tool(tool) => format!(
                "<tool_call id=\"{}\" name=\"{}\"/>",
                tool.id, tool.name
            ),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse a raw tool-argument string into a mapping.
///
/// An empty string parses to an empty mapping; anything else must be a
/// JSON object.
pub fn parse_arguments(raw: &str) -> Result<Map<String, Value>, serde_json::Error> {
    if raw.trim().is_empty() {
        return Ok(Map::new());
    }
    serde_json::from_str::<Map<String, Value>>(raw)
}

#[cfg(test)]
#[path = "history.test.rs"]
mod tests;
