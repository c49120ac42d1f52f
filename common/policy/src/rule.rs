//! The permission rule DSL.
//!
//! Rules are written in the same textual form the settings file uses:
//!
//! - `Bash`: any invocation of the named tool
//! - `Bash(git status:*)`: shell segments beginning with `git status`
//! - `Bash(cargo build)`: exactly that shell segment
//! - `Edit(src/**/*.rs)`: path-taking tool, target matched by glob
//!
//! Parsing and [`std::fmt::Display`] round-trip.

use globset::GlobBuilder;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde_json::Value;

use crate::error::PolicyError;

/// The input fields a path-taking tool may carry its target in, in
/// lookup order.
const PATH_FIELDS: [&str; 3] = ["file_path", "target_file", "path"];

/// Extract the designated path field from a tool input.
pub fn path_field(input: &Value) -> Option<&str> {
    PATH_FIELDS
        .iter()
        .find_map(|field| input.get(field).and_then(Value::as_str))
}

/// A parsed permission rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PermissionRule {
    /// Matches every invocation of the named tool.
    ToolAny(String),
    /// Matches a shell segment exactly.
    BashExact(String),
    /// Matches shell segments beginning with the prefix (word-aligned).
    BashPrefix(String),
    /// Matches a path-taking tool whose target matches the glob.
    PathGlob {
        /// Tool the rule applies to.
        tool: String,
        /// Glob over the designated path field.
        glob: String,
    },
}

impl PermissionRule {
    /// Parse a rule from its textual form.
    pub fn parse(text: &str) -> Result<Self, PolicyError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(PolicyError::InvalidRule {
                rule: text.to_string(),
                reason: "empty rule".to_string(),
            });
        }

        let Some(open) = text.find('(') else {
            if text.contains(')') {
                return Err(PolicyError::InvalidRule {
                    rule: text.to_string(),
                    reason: "unmatched ')'".to_string(),
                });
            }
            return Ok(Self::ToolAny(text.to_string()));
        };

        if !text.ends_with(')') {
            return Err(PolicyError::InvalidRule {
                rule: text.to_string(),
                reason: "missing closing ')'".to_string(),
            });
        }

        let tool = &text[..open];
        let pattern = &text[open + 1..text.len() - 1];
        if tool.is_empty() || pattern.is_empty() {
            return Err(PolicyError::InvalidRule {
                rule: text.to_string(),
                reason: "empty tool name or pattern".to_string(),
            });
        }

        if tool == "Bash" {
            if let Some(prefix) = pattern.strip_suffix(":*") {
                if prefix.is_empty() {
                    return Err(PolicyError::InvalidRule {
                        rule: text.to_string(),
                        reason: "empty command prefix".to_string(),
                    });
                }
                return Ok(Self::BashPrefix(prefix.to_string()));
            }
            return Ok(Self::BashExact(pattern.to_string()));
        }

        // Validate the glob eagerly so malformed rules are rejected at load
        // time rather than silently never matching.
        GlobBuilder::new(pattern)
            .literal_separator(false)
            .build()
            .map_err(|source| PolicyError::InvalidGlob {
                rule: text.to_string(),
                source,
            })?;

        Ok(Self::PathGlob {
            tool: tool.to_string(),
            glob: pattern.to_string(),
        })
    }

    /// The tool this rule applies to.
    pub fn tool_name(&self) -> &str {
        match self {
            Self::ToolAny(name) => name,
            Self::BashExact(_) | Self::BashPrefix(_) => "Bash",
            Self::PathGlob { tool, .. } => tool,
        }
    }

    /// Whether this rule matches a single shell segment.
    ///
    /// Prefix rules match word-aligned: `Bash(git status:*)` matches
    /// `git status` and `git status -s` but not `git statusx`.
    pub fn matches_segment(&self, segment: &str) -> bool {
        match self {
            Self::ToolAny(name) => name == "Bash",
            Self::BashExact(cmd) => segment == cmd,
            Self::BashPrefix(prefix) => {
                segment == prefix || segment.starts_with(&format!("{prefix} "))
            }
            Self::PathGlob { .. } => false,
        }
    }

    /// Whether this rule matches a path-taking tool call.
    ///
    /// `candidates` are the textual forms of the target path to try
    /// (typically the raw input and its workdir-relative form).
    pub fn matches_path(&self, tool: &str, candidates: &[&str]) -> bool {
        match self {
            Self::ToolAny(name) => name == tool,
            Self::PathGlob {
                tool: rule_tool,
                glob,
            } => {
                if rule_tool != tool {
                    return false;
                }
                let Ok(compiled) = GlobBuilder::new(glob).literal_separator(false).build() else {
                    return false;
                };
                let matcher = compiled.compile_matcher();
                candidates.iter().any(|c| matcher.is_match(c))
            }
            Self::BashExact(_) | Self::BashPrefix(_) => false,
        }
    }
}

impl std::fmt::Display for PermissionRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ToolAny(name) => write!(f, "{name}"),
            Self::BashExact(cmd) => write!(f, "Bash({cmd})"),
            Self::BashPrefix(prefix) => write!(f, "Bash({prefix}:*)"),
            Self::PathGlob { tool, glob } => write!(f, "{tool}({glob})"),
        }
    }
}

impl Serialize for PermissionRule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PermissionRule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "rule.test.rs"]
mod tests;
