//! Human-facing rendering of a [`ChainState`].

use crate::state::{ChainState, MAX_SHELL_VERIFY_ATTEMPTS};
use std::fmt;
use std::str::FromStr;
use zero_common::Error;

/// Tool name the model is told to call to continue a chain.
pub const PROMPT_ENGINE_TOOL: &str = "prompt_engine";

const GATE_RESPONSE_FORMAT: &str = "GATE_REVIEW: PASS|FAIL - <reason>";
const VERIFY_INSTRUCTION: &str =
    "  Run the command; continue on success, fix and retry on failure.";

/// How much detail a reminder carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderMode {
    /// One line per active facet; injected after compaction.
    Full,
    /// A status line plus a single call-to-action; injected after tool calls.
    Inline,
}

impl fmt::Display for ReminderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Inline => write!(f, "inline"),
        }
    }
}

impl FromStr for ReminderMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "inline" => Ok(Self::Inline),
            other => Err(Error::InvalidInput(format!("Unknown reminder mode: {other}"))),
        }
    }
}

/// Render a reminder. Returns an empty string when nothing applies.
pub fn format_reminder(state: &ChainState, mode: ReminderMode) -> String {
    match mode {
        ReminderMode::Full => format_full(state),
        ReminderMode::Inline => format_inline(state),
    }
}

fn format_full(state: &ChainState) -> String {
    let mut lines = Vec::new();

    if state.has_step() {
        lines.push(match state.chain_id() {
            Some(id) => format!(
                "[Chain] {id} - Step {}/{}",
                state.current_step, state.total_steps
            ),
            None => format!("[Chain] Step {}/{}", state.current_step, state.total_steps),
        });
    }

    if let Some(gate) = &state.pending_gate {
        lines.push(format!("[Gate] {gate} - Respond: {GATE_RESPONSE_FORMAT}"));
    }

    if let Some(command) = &state.pending_shell_verify {
        lines.push(format!(
            "[Verify] `{command}` - Attempt {}/{MAX_SHELL_VERIFY_ATTEMPTS}",
            state.shell_verify_attempts
        ));
        lines.push(VERIFY_INSTRUCTION.to_string());
    }

    lines.join("\n")
}

fn format_inline(state: &ChainState) -> String {
    let mut fragments = Vec::new();

    if state.has_step() {
        fragments.push(format!(
            "[{}] {}/{}",
            state.chain_id().unwrap_or("active"),
            state.current_step,
            state.total_steps
        ));
    }
    if let Some(gate) = &state.pending_gate {
        fragments.push(format!("Gate: {gate}"));
    }
    if state.pending_shell_verify.is_some() {
        fragments.push(format!(
            "Verify: {}/{MAX_SHELL_VERIFY_ATTEMPTS}",
            state.shell_verify_attempts
        ));
    }

    if fragments.is_empty() {
        return String::new();
    }

    let status = fragments.join(" | ");
    match inline_action(state) {
        Some(action) => format!("{status}\n{action}"),
        None => status,
    }
}

/// The single most relevant call-to-action: verify > gate > chain.
fn inline_action(state: &ChainState) -> Option<String> {
    if let Some(command) = &state.pending_shell_verify {
        return Some(format!(
            "→ Run `{command}` and report the result before continuing"
        ));
    }
    if state.pending_gate.is_some() {
        return Some(format!("→ Respond: {GATE_RESPONSE_FORMAT}"));
    }
    if state.has_step() {
        return Some(match state.chain_id() {
            Some(id) => format!("→ Continue: {PROMPT_ENGINE_TOOL}(chain_id:\"{id}\")"),
            None => format!("→ Continue: {PROMPT_ENGINE_TOOL} with the next step"),
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(id: &str, current: u32, total: u32) -> ChainState {
        ChainState {
            chain_id: id.into(),
            current_step: current,
            total_steps: total,
            ..ChainState::default()
        }
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("full".parse::<ReminderMode>().unwrap(), ReminderMode::Full);
        assert_eq!(" Inline ".parse::<ReminderMode>().unwrap(), ReminderMode::Inline);
        assert!("verbose".parse::<ReminderMode>().is_err());
        assert_eq!(ReminderMode::Inline.to_string(), "inline");
    }

    #[test]
    fn test_full_step_only() {
        let out = format_reminder(&step("chain-a", 2, 4), ReminderMode::Full);
        assert_eq!(out, "[Chain] chain-a - Step 2/4");
        assert_eq!(out.lines().count(), 1);
        assert!(!out.contains("[Gate]"));
        assert!(!out.contains("[Verify]"));
    }

    #[test]
    fn test_full_step_without_id() {
        let out = format_reminder(&step("", 2, 4), ReminderMode::Full);
        assert_eq!(out, "[Chain] Step 2/4");
    }

    #[test]
    fn test_full_all_facets_in_order() {
        let state = ChainState {
            pending_gate: Some("code-quality".into()),
            pending_shell_verify: Some("npm test".into()),
            shell_verify_attempts: 2,
            ..step("chain-a", 1, 3)
        };
        let out = format_reminder(&state, ReminderMode::Full);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            vec![
                "[Chain] chain-a - Step 1/3",
                "[Gate] code-quality - Respond: GATE_REVIEW: PASS|FAIL - <reason>",
                "[Verify] `npm test` - Attempt 2/5",
                VERIFY_INSTRUCTION,
            ]
        );
    }

    #[test]
    fn test_full_inactive_is_empty() {
        assert_eq!(format_reminder(&ChainState::default(), ReminderMode::Full), "");
    }

    #[test]
    fn test_inline_chain() {
        let out = format_reminder(&step("chain-build#9", 1, 3), ReminderMode::Inline);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "[chain-build#9] 1/3");
        assert_eq!(lines[1], "→ Continue: prompt_engine(chain_id:\"chain-build#9\")");
    }

    #[test]
    fn test_inline_chain_without_id() {
        let out = format_reminder(&step("", 1, 3), ReminderMode::Inline);
        assert!(out.starts_with("[active] 1/3\n"));
        assert!(out.ends_with("prompt_engine with the next step"));
    }

    #[test]
    fn test_inline_verify_beats_gate() {
        let state = ChainState {
            pending_gate: Some("review".into()),
            pending_shell_verify: Some("cargo test".into()),
            shell_verify_attempts: 3,
            ..step("chain-a", 2, 4)
        };
        let out = format_reminder(&state, ReminderMode::Inline);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "[chain-a] 2/4 | Gate: review | Verify: 3/5");
        assert!(lines[1].contains("cargo test"));
        assert!(!lines[1].contains("GATE_REVIEW"));
    }

    #[test]
    fn test_inline_gate_beats_chain() {
        let state = ChainState {
            pending_gate: Some("review".into()),
            ..step("chain-a", 2, 4)
        };
        let out = format_reminder(&state, ReminderMode::Inline);
        assert_eq!(
            out,
            "[chain-a] 2/4 | Gate: review\n→ Respond: GATE_REVIEW: PASS|FAIL - <reason>"
        );
    }

    #[test]
    fn test_inline_gate_only() {
        let state = ChainState {
            pending_gate: Some("review".into()),
            ..ChainState::default()
        };
        let out = format_reminder(&state, ReminderMode::Inline);
        assert!(out.starts_with("Gate: review\n"));
    }

    #[test]
    fn test_inline_inactive_is_empty() {
        assert_eq!(format_reminder(&ChainState::default(), ReminderMode::Inline), "");
    }
}
