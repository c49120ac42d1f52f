//! Messages: ordered sequence entries composed of blocks.

use serde::Deserialize;
use serde::Serialize;
use swell_protocol::TokenUsage;

use crate::block::Block;
use crate::block::ToolBlock;

/// Message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// End-user content.
    User,
    /// Model output.
    Assistant,
    /// Engine-injected content.
    System,
}

/// One entry in the conversation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message id.
    pub id: String,
    /// Message role.
    pub role: Role,
    /// Ordered blocks.
    pub blocks: Vec<Block>,
    /// Usage attached to assistant messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

impl Message {
    fn new(role: Role, blocks: Vec<Block>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            blocks,
            usage: None,
        }
    }

    /// Create a user message with one text block.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, vec![Block::text(text)])
    }

    /// Create an empty assistant message (filled during streaming).
    pub fn assistant() -> Self {
        Self::new(Role::Assistant, Vec::new())
    }

    /// Create a system message with one text block.
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, vec![Block::text(text)])
    }

    /// Create a system message from arbitrary blocks.
    pub fn system_with_blocks(blocks: Vec<Block>) -> Self {
        Self::new(Role::System, blocks)
    }

    /// Append a text delta to the terminal text block, creating one when
    /// the last block is not text.
    pub fn append_text_delta(&mut self, delta: &str) {
        if let Some(Block::Text { text }) = self.blocks.last_mut() {
            text.push_str(delta);
        } else {
            self.blocks.push(Block::text(delta));
        }
    }

    /// Append a reasoning delta to the terminal reasoning block, creating
    /// one when the last block is not reasoning.
    pub fn append_reasoning_delta(&mut self, delta: &str) {
        if let Some(Block::Reasoning { text }) = self.blocks.last_mut() {
            text.push_str(delta);
        } else {
            self.blocks.push(Block::Reasoning {
                text: delta.to_string(),
            });
        }
    }

    /// Append a block.
    pub fn push_block(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// All tool blocks in this message.
    pub fn tool_blocks(&self) -> impl Iterator<Item = &ToolBlock> {
        self.blocks.iter().filter_map(Block::as_tool)
    }

    /// Find a tool block by call id.
    pub fn tool_block_mut(&mut self, call_id: &str) -> Option<&mut ToolBlock> {
        self.blocks
            .iter_mut()
            .filter_map(Block::as_tool_mut)
            .find(|block| block.id == call_id)
    }

    /// Whether the message carries any tool blocks.
    pub fn has_tool_blocks(&self) -> bool {
        self.tool_blocks().next().is_some()
    }

    /// Concatenated text content of the message.
    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                Block::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "message.test.rs"]
mod tests;
