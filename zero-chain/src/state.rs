//! The per-session chain/gate record.

use serde::{Deserialize, Serialize};

/// Display ceiling for shell verification attempts.
pub const MAX_SHELL_VERIFY_ATTEMPTS: u32 = 5;

/// Workflow state recovered from a prompt-engine response.
///
/// A fresh value is built on every successful parse and replaces whatever
/// the session held before. Field names double as the on-disk record keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainState {
    /// Resume token for the chain; empty when unknown.
    #[serde(default)]
    pub chain_id: String,

    /// 1-based step index; 0 means no active chain.
    #[serde(default)]
    pub current_step: u32,

    /// Total steps; 0 means unknown.
    #[serde(default)]
    pub total_steps: u32,

    /// Gate awaiting a PASS/FAIL verdict.
    #[serde(default)]
    pub pending_gate: Option<String>,

    /// Criteria bullets for the pending gate (at most five).
    #[serde(default)]
    pub gate_criteria: Vec<String>,

    /// Most recently invoked prompt id.
    #[serde(default)]
    pub last_prompt_id: String,

    /// Shell command whose success confirms the current step.
    #[serde(default)]
    pub pending_shell_verify: Option<String>,

    /// Verification attempts observed so far.
    #[serde(default)]
    pub shell_verify_attempts: u32,
}

impl ChainState {
    /// Whether the state carries anything worth persisting or reminding about.
    pub fn is_active(&self) -> bool {
        self.has_step() || self.pending_gate.is_some() || self.pending_shell_verify.is_some()
    }

    /// Whether a chain step is in progress.
    pub fn has_step(&self) -> bool {
        self.current_step > 0
    }

    /// The chain id, or `None` when it is unknown.
    pub fn chain_id(&self) -> Option<&str> {
        Some(self.chain_id.as_str()).filter(|id| !id.is_empty())
    }

    /// Replace the chain id with an explicit value from the tool-call arguments.
    ///
    /// Blank overrides are ignored so that a missing argument never erases a
    /// token recovered from the response text.
    pub fn apply_chain_id_override(&mut self, chain_id: Option<&str>) {
        if let Some(id) = chain_id.map(str::trim).filter(|id| !id.is_empty()) {
            self.chain_id = id.to_string();
        }
    }
}
