//! Shell command segmentation and rule expansion.
//!
//! A command line is split into pipeline/sequence segments on unquoted
//! `;`, `|`, `&` and newlines. Each segment is then stripped of leading
//! environment-variable assignments and of redirections before matching.
//! Allow-rule matching requires every segment to be covered; the safe
//! command set and the blacklist are decided per segment.

use crate::rule::PermissionRule;
use crate::safe_zone::SafeZone;

/// Commands that are implicitly allowed regardless of rules.
const SAFE_COMMANDS: [&str; 3] = ["pwd", "true", "false"];

/// Commands that are safe only when their path arguments stay inside the
/// Safe Zone.
const ZONE_BOUND_COMMANDS: [&str; 2] = ["cd", "ls"];

/// Commands that are never implicitly safe and are omitted from rule
/// expansion.
const BLACKLISTED_COMMANDS: [&str; 9] = [
    "rm", "sudo", "su", "shutdown", "reboot", "halt", "poweroff", "mkfs", "dd",
];

/// CLIs whose natural permission granularity is the first two words
/// (`git status`, `cargo build`), used by smart prefix extraction.
const MULTI_WORD_CLIS: [&str; 10] = [
    "git", "cargo", "npm", "pnpm", "yarn", "go", "docker", "kubectl", "pip", "pip3",
];

/// One pipeline/sequence segment of a shell command, normalised for
/// matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSegment {
    /// Words of the segment after stripping assignments and redirections.
    pub words: Vec<String>,
    /// Canonical text form (`words` joined with single spaces).
    pub text: String,
}

impl CommandSegment {
    fn from_words(words: Vec<String>) -> Self {
        let text = words.join(" ");
        Self { words, text }
    }

    /// The command word, if any.
    pub fn program(&self) -> Option<&str> {
        self.words.first().map(String::as_str)
    }
}

/// Split a command line into segments on unquoted separators.
///
/// `&&`, `||`, `;`, `|`, `&` and newlines all end a segment; quoting and
/// backslash escapes are respected. Empty segments are dropped.
pub fn segment_command(command: &str) -> Vec<CommandSegment> {
    let mut pieces: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_single = false;
    let mut in_double = false;
    let mut escaped = false;

    for ch in command.chars() {
        if escaped {
            current.push(ch);
            escaped = false;
            continue;
        }
        match ch {
            '\\' if !in_single => {
                current.push(ch);
                escaped = true;
            }
            '\'' if !in_double => {
                in_single = !in_single;
                current.push(ch);
            }
            '"' if !in_single => {
                in_double = !in_double;
                current.push(ch);
            }
            ';' | '|' | '&' | '\n' if !in_single && !in_double => {
                // Doubled operators (&&, ||) fall out naturally: the second
                // char just ends an empty piece that is dropped below.
                pieces.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    pieces.push(current);

    pieces
        .iter()
        .filter_map(|piece| {
            let words = split_words(piece);
            let words = strip_assignments_and_redirections(words);
            if words.is_empty() {
                None
            } else {
                Some(CommandSegment::from_words(words))
            }
        })
        .collect()
}

/// Split a segment into words, falling back to whitespace splitting when
/// the quoting is malformed.
fn split_words(piece: &str) -> Vec<String> {
    shlex::split(piece)
        .unwrap_or_else(|| piece.split_whitespace().map(str::to_string).collect())
}

/// Drop leading `NAME=value` assignments and any redirection tokens.
fn strip_assignments_and_redirections(words: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(words.len());
    let mut seen_program = false;
    let mut skip_next = false;

    for word in words {
        if skip_next {
            skip_next = false;
            continue;
        }
        if !seen_program && is_env_assignment(&word) {
            continue;
        }
        match redirection_kind(&word) {
            Redirection::Standalone => {
                // The target is the following word.
                skip_next = true;
                continue;
            }
            Redirection::SelfContained => continue,
            Redirection::None => {}
        }
        seen_program = true;
        out.push(word);
    }
    out
}

fn is_env_assignment(word: &str) -> bool {
    let Some(eq) = word.find('=') else {
        return false;
    };
    let name = &word[..eq];
    !name.is_empty()
        && name
            .chars()
            .enumerate()
            .all(|(i, c)| c == '_' || c.is_ascii_alphabetic() || (i > 0 && c.is_ascii_digit()))
}

enum Redirection {
    /// A bare operator (`>`, `2>`, `<`); the next word is its target.
    Standalone,
    /// Operator with attached target (`>out.txt`, `2>&1`).
    SelfContained,
    /// Not a redirection.
    None,
}

fn redirection_kind(word: &str) -> Redirection {
    let stripped = word.trim_start_matches(|c: char| c.is_ascii_digit() || c == '&');
    if !stripped.starts_with('>') && !stripped.starts_with('<') {
        return Redirection::None;
    }
    let rest = stripped.trim_start_matches(['>', '<']);
    if rest.is_empty() {
        Redirection::Standalone
    } else {
        // `2>&1` or `>file`: target travels with the operator.
        Redirection::SelfContained
    }
}

/// Whether a segment belongs to the implicit safe set.
///
/// `pwd`, `true` and `false` are always safe; `cd` and `ls` are safe when
/// every path argument resolves inside the Safe Zone.
pub fn is_safe_segment(segment: &CommandSegment, zone: &SafeZone) -> bool {
    let Some(program) = segment.program() else {
        return true;
    };
    if SAFE_COMMANDS.contains(&program) {
        return true;
    }
    if ZONE_BOUND_COMMANDS.contains(&program) {
        return segment.words[1..]
            .iter()
            .filter(|arg| !arg.starts_with('-'))
            .all(|arg| zone.contains(arg));
    }
    false
}

/// Whether a program is on the always-unsafe blacklist.
pub fn is_blacklisted(program: &str) -> bool {
    BLACKLISTED_COMMANDS.contains(&program)
}

/// Extract the smart permission prefix for a segment.
///
/// Known multi-word CLIs yield their first two words (`git status`); other
/// commands yield the first word.
pub fn smart_prefix(segment: &CommandSegment) -> Option<String> {
    let program = segment.program()?;
    if MULTI_WORD_CLIS.contains(&program)
        && let Some(sub) = segment.words.get(1)
        && !sub.starts_with('-')
    {
        return Some(format!("{program} {sub}"));
    }
    Some(program.to_string())
}

/// Suggested "allow similar" prefix for a host approval prompt.
///
/// Only single-segment shell commands get a suggestion; compound
/// commands are approved whole or not at all.
pub fn suggested_prefix_for(tool_name: &str, input: &serde_json::Value) -> Option<String> {
    if tool_name != "Bash" {
        return None;
    }
    let command = input.get("command")?.as_str()?;
    let segments = segment_command(command);
    match segments.as_slice() {
        [only] => smart_prefix(only),
        _ => None,
    }
}

/// Expand a shell command into the allow rules that would cover it.
///
/// Safe, blacklisted and zone-bound segments are omitted. A segment that
/// extends past its smart prefix expands into `Bash(prefix:*)`; a segment
/// equal to its prefix expands into `Bash(segment)`.
pub fn expand_command_rules(command: &str, zone: &SafeZone) -> Vec<PermissionRule> {
    let mut rules: Vec<PermissionRule> = Vec::new();
    for segment in segment_command(command) {
        if is_safe_segment(&segment, zone) {
            continue;
        }
        let Some(program) = segment.program() else {
            continue;
        };
        if is_blacklisted(program) || ZONE_BOUND_COMMANDS.contains(&program) {
            continue;
        }
        let Some(prefix) = smart_prefix(&segment) else {
            continue;
        };
        let rule = if segment.text == prefix {
            PermissionRule::BashExact(segment.text.clone())
        } else {
            PermissionRule::BashPrefix(prefix)
        };
        if !rules.contains(&rule) {
            rules.push(rule);
        }
    }
    rules
}

#[cfg(test)]
#[path = "command.test.rs"]
mod tests;
