//! Hook matchers.
//!
//! A matcher filters which invocations a hook fires for by inspecting the
//! event's match target (the tool name, for tool events). Patterns are
//! validated at load time; a matcher that cannot be evaluated matches
//! nothing.

use serde::Deserialize;
use serde::Serialize;

use crate::error::HookError;

/// A matcher deciding whether a hook fires for a given value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HookMatcher {
    /// Matches an exact string value.
    Exact {
        /// The expected value.
        value: String,
    },

    /// Matches a glob-style wildcard pattern.
    /// Supports `*` (any characters) and `?` (single character).
    Wildcard {
        /// The pattern.
        pattern: String,
    },

    /// Matches using a regular expression.
    Regex {
        /// The pattern.
        pattern: String,
    },

    /// Matches if any inner matcher matches.
    Or {
        /// The alternatives.
        matchers: Vec<HookMatcher>,
    },

    /// Matches everything.
    All,
}

impl HookMatcher {
    /// Returns `true` if the given value matches.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::Exact { value: expected } => value == expected,
            Self::Wildcard { pattern } => glob_match(pattern, value),
            Self::Regex { pattern } => compiled(pattern).is_some_and(|re| re.is_match(value)),
            Self::Or { matchers } => matchers.iter().any(|m| m.matches(value)),
            Self::All => true,
        }
    }

    /// Validate this matcher, rejecting invalid patterns at load time.
    pub fn validate(&self) -> Result<(), HookError> {
        match self {
            Self::Regex { pattern } => {
                regex::Regex::new(pattern).map_err(|e| HookError::InvalidMatcher {
                    message: format!("invalid regex '{pattern}': {e}"),
                })?;
                Ok(())
            }
            Self::Or { matchers } => {
                for m in matchers {
                    m.validate()?;
                }
                Ok(())
            }
            Self::Exact { .. } | Self::Wildcard { .. } | Self::All => Ok(()),
        }
    }
}

/// Compile a regex pattern, logging and matching nothing on failure.
///
/// Validation normally rejects bad patterns up front; this guard covers
/// matchers built programmatically without going through `validate`.
fn compiled(pattern: &str) -> Option<regex::Regex> {
    match regex::Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!("Invalid regex pattern '{pattern}': {e}");
            None
        }
    }
}

/// Glob-style matching with `*` (any run, including empty) and `?` (one
/// character).
///
/// Iterative two-cursor scan with star backtracking: on a mismatch after
/// a `*`, the star re-absorbs one more character of the value and the
/// scan resumes past it. Linear in practice for the short tool-name
/// patterns hooks use.
fn glob_match(pattern: &str, value: &str) -> bool {
    let pat: Vec<char> = pattern.chars().collect();
    let val: Vec<char> = value.chars().collect();

    let mut p = 0;
    let mut v = 0;
    // Position of the last `*` seen and the value index it has consumed
    // up to.
    let mut backtrack: Option<(usize, usize)> = None;

    while v < val.len() {
        if p < pat.len() && (pat[p] == '?' || pat[p] == val[v]) {
            p += 1;
            v += 1;
        } else if p < pat.len() && pat[p] == '*' {
            backtrack = Some((p, v));
            p += 1;
        } else if let Some((star, consumed)) = backtrack {
            p = star + 1;
            v = consumed + 1;
            backtrack = Some((star, consumed + 1));
        } else {
            return false;
        }
    }

    // Only trailing stars may remain unconsumed.
    pat[p..].iter().all(|&c| c == '*')
}

#[cfg(test)]
#[path = "matcher.test.rs"]
mod tests;
