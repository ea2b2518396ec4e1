//! Session-scoped chain state with an optional file tier.
//!
//! Construct one store per process and pass it by reference. Every failure
//! in here degrades to "no tracked state"; nothing is returned as an error.

use crate::backend::{MemoryBackend, StateBackend};
use crate::state::ChainState;
use crate::workspace::WorkspaceHint;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Maps session ids to their latest [`ChainState`].
pub struct SessionStateStore {
    memory: MemoryBackend,
    file: Option<Arc<dyn StateBackend>>,
}

impl SessionStateStore {
    /// A store with only the in-memory tier.
    pub fn in_memory() -> Self {
        Self {
            memory: MemoryBackend::new(),
            file: None,
        }
    }

    /// A store that falls back to (and optionally writes through to) `file`.
    pub fn with_file_tier(file: Arc<dyn StateBackend>) -> Self {
        Self {
            memory: MemoryBackend::new(),
            file: Some(file),
        }
    }

    /// Look up a session's state, promoting a file-tier hit into memory.
    pub fn load(&self, session_id: &str, hint: &WorkspaceHint) -> Option<ChainState> {
        match self.memory.get(session_id, hint) {
            Ok(Some(state)) => return Some(state),
            Ok(None) => {}
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "Memory tier lookup failed");
                return None;
            }
        }

        let file = self.file.as_ref()?;
        match file.get(session_id, hint) {
            Ok(Some(state)) => {
                debug!(session_id = %session_id, backend = file.name(), "Recovered chain state");
                if let Err(e) = self.memory.set(session_id, &state, hint) {
                    warn!(session_id = %session_id, error = %e, "Failed to promote chain state");
                }
                Some(state)
            }
            Ok(None) => {
                debug!(session_id = %session_id, "No chain state recorded");
                None
            }
            Err(e) => {
                warn!(session_id = %session_id, backend = file.name(), error = %e, "Chain state lookup failed");
                None
            }
        }
    }

    /// Replace a session's state. With `persist`, also write the file tier.
    pub fn save(&self, session_id: &str, state: &ChainState, hint: &WorkspaceHint, persist: bool) {
        if let Err(e) = self.memory.set(session_id, state, hint) {
            warn!(session_id = %session_id, error = %e, "Failed to store chain state");
        }

        info!(
            session_id = %session_id,
            chain_id = %state.chain_id,
            step = state.current_step,
            total = state.total_steps,
            gate = state.pending_gate.as_deref().unwrap_or(""),
            verify = state.pending_shell_verify.is_some(),
            "Chain state updated"
        );

        if !persist {
            return;
        }
        if let Some(file) = &self.file {
            if let Err(e) = file.set(session_id, state, hint) {
                warn!(session_id = %session_id, backend = file.name(), error = %e, "Chain state not persisted");
            }
        }
    }

    /// Forget a session in every tier. Clearing an unknown session is a no-op.
    pub fn clear(&self, session_id: &str, hint: &WorkspaceHint) {
        if let Err(e) = self.memory.delete(session_id, hint) {
            warn!(session_id = %session_id, error = %e, "Failed to drop chain state");
        }
        if let Some(file) = &self.file {
            if let Err(e) = file.delete(session_id, hint) {
                warn!(session_id = %session_id, backend = file.name(), error = %e, "Chain state record not removed");
            }
        }
        debug!(session_id = %session_id, "Chain state cleared");
    }

    /// Session ids held in memory.
    pub fn sessions(&self) -> Vec<String> {
        self.memory.session_ids().unwrap_or_default()
    }
}

impl Default for SessionStateStore {
    fn default() -> Self {
        Self::in_memory()
    }
}
