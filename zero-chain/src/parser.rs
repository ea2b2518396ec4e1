//! Extraction of chain/gate signals from prompt-engine responses.
//!
//! The prompt engine answers in free-form Markdown. Each signal lives behind
//! its own `extract_*` function so that a structured response format can
//! replace one pattern at a time.
//!
//! | Signal | Convention |
//! |--------|------------|
//! | step | `Step 3 of 7`, `Progress 2/4` (case-insensitive) |
//! | chain id | `chain-<token>` / `chain_<token>`, `#n` suffix kept |
//! | gate | first `### <name>` heading, only when the text mentions `Gate` |
//! | gate criteria | up to five `-` / `•` bullets |
//! | shell verify | `Shell verification: <command>` |
//! | attempts | `Attempt 2/5` |

use crate::state::ChainState;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Maximum number of gate criteria kept from a response.
pub const MAX_GATE_CRITERIA: usize = 5;

/// Substrings that switch on gate extraction.
const GATE_TRIGGERS: &[&str] = &["## Inline Gates", "Gate"];

// ============================================================================
// Regex Patterns
// ============================================================================

static STEP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:step|progress)\s+(\d+)(?:\s+of\s+|\s*/\s*)(\d+)").unwrap()
});
static CHAIN_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"chain[-_][A-Za-z0-9_#-]+").unwrap());
static GATE_HEADING_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*###[ \t]+(.+)$").unwrap());
static BULLET_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*[-•][ \t]*(.*)$").unwrap());
static SHELL_VERIFY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Shell verification:[ \t]*(.*)").unwrap());
static ATTEMPT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Attempt\s+(\d+)\s*/\s*(\d+)").unwrap());

// ============================================================================
// Public API
// ============================================================================

/// Parse a raw tool response into a [`ChainState`].
///
/// Returns `None` when the response carries nothing worth tracking.
pub fn parse_response(response: &Value) -> Option<ChainState> {
    parse_text(&normalize_response(response))
}

/// Parse already-normalized response text.
pub fn parse_text(text: &str) -> Option<ChainState> {
    let mut state = ChainState::default();

    if let Some((current, total)) = extract_step(text) {
        state.current_step = current;
        state.total_steps = total;
    }
    if let Some(chain_id) = extract_chain_id(text) {
        state.chain_id = chain_id;
    }
    if mentions_gate(text) {
        state.pending_gate = extract_gate(text);
        state.gate_criteria = extract_gate_criteria(text);
    }
    state.pending_shell_verify = extract_shell_verify(text);
    if let Some(attempt) = extract_attempt(text) {
        state.shell_verify_attempts = attempt;
    }

    if state.is_active() {
        Some(state)
    } else {
        tracing::trace!("No chain signal in response");
        None
    }
}

/// Flatten a tool response into plain text.
///
/// Strings pass through. Objects contribute their `content` (a string, or
/// the `text` of each content block joined by single spaces), falling back
/// to a top-level `text`. Anything else is stringified.
pub fn normalize_response(response: &Value) -> String {
    match response {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Object(map) => match map.get("content") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Array(blocks)) => join_blocks(blocks),
            Some(other) => other.to_string(),
            None => match map.get("text") {
                Some(Value::String(s)) => s.clone(),
                _ => response.to_string(),
            },
        },
        Value::Array(blocks) => join_blocks(blocks),
        other => other.to_string(),
    }
}

fn join_blocks(blocks: &[Value]) -> String {
    blocks
        .iter()
        .filter_map(|block| match block {
            Value::String(s) => Some(s.as_str()),
            Value::Object(map) => map.get("text").and_then(Value::as_str),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// Extractors
// ============================================================================

/// First `Step n of m` / `Progress n/m` marker.
pub fn extract_step(text: &str) -> Option<(u32, u32)> {
    let caps = STEP_PATTERN.captures(text)?;
    let current = caps[1].parse().ok()?;
    let total = caps[2].parse().ok()?;
    Some((current, total))
}

/// First `chain-…` / `chain_…` token, prefix and `#n` suffix included.
pub fn extract_chain_id(text: &str) -> Option<String> {
    CHAIN_ID_PATTERN.find(text).map(|m| m.as_str().to_string())
}

/// Whether the text announces a gate at all.
pub fn mentions_gate(text: &str) -> bool {
    GATE_TRIGGERS.iter().any(|trigger| text.contains(trigger))
}

/// Name of the first `### <name>` heading.
pub fn extract_gate(text: &str) -> Option<String> {
    GATE_HEADING_PATTERN
        .captures_iter(text)
        .map(|caps| caps[1].trim().to_string())
        .find(|name| !name.is_empty())
}

/// Up to [`MAX_GATE_CRITERIA`] non-empty bullet lines.
pub fn extract_gate_criteria(text: &str) -> Vec<String> {
    BULLET_PATTERN
        .captures_iter(text)
        .map(|caps| caps[1].trim().to_string())
        .filter(|item| !item.is_empty())
        .take(MAX_GATE_CRITERIA)
        .collect()
}

/// Command following `Shell verification:` on the same line.
pub fn extract_shell_verify(text: &str) -> Option<String> {
    let caps = SHELL_VERIFY_PATTERN.captures(text)?;
    let command = caps[1].trim();
    (!command.is_empty()).then(|| command.to_string())
}

/// Observed attempt number from `Attempt n/m`. The denominator is dropped.
pub fn extract_attempt(text: &str) -> Option<u32> {
    let caps = ATTEMPT_PATTERN.captures(text)?;
    caps[1].parse().ok()
}
