//! Token usage accounting.

use serde::Deserialize;
use serde::Serialize;

/// The operation a usage record was produced by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    /// A regular agent model call.
    #[default]
    Agent,
    /// A history-compression model call.
    Compress,
}

impl OperationType {
    /// Returns the string representation of this operation type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Agent => "agent",
            Self::Compress => "compress",
        }
    }
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Token usage reported for one model call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Prompt (input) tokens.
    #[serde(default)]
    pub prompt_tokens: i64,
    /// Completion (output) tokens.
    #[serde(default)]
    pub completion_tokens: i64,
    /// Total tokens as reported by the gateway.
    #[serde(default)]
    pub total_tokens: i64,
    /// Tokens served from the prompt cache, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_read_input_tokens: Option<i64>,
    /// Tokens written to the prompt cache, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_creation_input_tokens: Option<i64>,
    /// Model that produced this usage.
    #[serde(default)]
    pub model: String,
    /// Operation that produced this usage.
    #[serde(default)]
    pub operation: OperationType,
}

impl TokenUsage {
    /// Create a usage record for an agent call.
    pub fn agent(prompt: i64, completion: i64, model: impl Into<String>) -> Self {
        Self {
            prompt_tokens: prompt,
            completion_tokens: completion,
            total_tokens: prompt + completion,
            cache_read_input_tokens: None,
            cache_creation_input_tokens: None,
            model: model.into(),
            operation: OperationType::Agent,
        }
    }

    /// Create a usage record for a compression call.
    pub fn compress(prompt: i64, completion: i64, model: impl Into<String>) -> Self {
        Self {
            operation: OperationType::Compress,
            ..Self::agent(prompt, completion, model)
        }
    }

    /// The comprehensive token count used for budget accounting:
    /// `total + cache_read + cache_creation`, absent fields counting as 0.
    pub fn comprehensive(&self) -> i64 {
        self.total_tokens
            + self.cache_read_input_tokens.unwrap_or(0)
            + self.cache_creation_input_tokens.unwrap_or(0)
    }
}

#[cfg(test)]
#[path = "usage.test.rs"]
mod tests;
