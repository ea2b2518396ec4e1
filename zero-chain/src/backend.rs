//! Storage tiers behind [`crate::store::SessionStateStore`].
//!
//! Both tiers implement [`StateBackend`]. The memory tier is authoritative;
//! the file tier is a best-effort recovery cache for short-lived hook
//! processes.

use crate::state::ChainState;
use crate::workspace::{StateDirResolver, WorkspaceHint};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::debug;
use zero_common::{Error, Result, ResultExt};

/// A keyed tier holding one [`ChainState`] per session.
pub trait StateBackend: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Fetch a session's record. Absent or unreadable records are `Ok(None)`.
    fn get(&self, session_id: &str, hint: &WorkspaceHint) -> Result<Option<ChainState>>;

    /// Store a session's record, replacing any previous one.
    fn set(&self, session_id: &str, state: &ChainState, hint: &WorkspaceHint) -> Result<()>;

    /// Remove a session's record. Removing an absent record succeeds.
    fn delete(&self, session_id: &str, hint: &WorkspaceHint) -> Result<()>;
}

// ============================================================================
// Memory
// ============================================================================

/// Process-wide in-memory tier.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    states: Mutex<HashMap<String, ChainState>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session ids currently held, sorted.
    pub fn session_ids(&self) -> Result<Vec<String>> {
        let states = self.lock()?;
        let mut ids: Vec<String> = states.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, ChainState>>> {
        self.states
            .lock()
            .map_err(|e| Error::Internal(format!("Lock error: {e}")))
    }
}

impl StateBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn get(&self, session_id: &str, _hint: &WorkspaceHint) -> Result<Option<ChainState>> {
        Ok(self.lock()?.get(session_id).cloned())
    }

    fn set(&self, session_id: &str, state: &ChainState, _hint: &WorkspaceHint) -> Result<()> {
        self.lock()?.insert(session_id.to_string(), state.clone());
        Ok(())
    }

    fn delete(&self, session_id: &str, _hint: &WorkspaceHint) -> Result<()> {
        self.lock()?.remove(session_id);
        Ok(())
    }
}

// ============================================================================
// File
// ============================================================================

/// One pretty-printed JSON record per session.
///
/// Path: `{resolved dir}/{encoded session id}.json`. Writes overwrite in
/// place; there is no locking.
#[derive(Debug, Clone)]
pub struct FileBackend {
    resolver: StateDirResolver,
}

impl FileBackend {
    pub fn new(resolver: StateDirResolver) -> Self {
        Self { resolver }
    }

    /// Record path for a session.
    pub fn record_path(&self, session_id: &str, hint: &WorkspaceHint) -> PathBuf {
        self.resolver
            .resolve(hint)
            .join(format!("{}.json", encode_session_id(session_id)))
    }
}

impl StateBackend for FileBackend {
    fn name(&self) -> &'static str {
        "file"
    }

    fn get(&self, session_id: &str, hint: &WorkspaceHint) -> Result<Option<ChainState>> {
        let path = self.record_path(session_id, hint);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::from(e).with_context(format!(
                    "Failed to read chain state from {}",
                    path.display()
                )))
            }
        };

        match serde_json::from_str::<ChainState>(&content) {
            Ok(state) => Ok(Some(state)),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Ignoring malformed chain state record");
                Ok(None)
            }
        }
    }

    fn set(&self, session_id: &str, state: &ChainState, hint: &WorkspaceHint) -> Result<()> {
        let path = self.record_path(session_id, hint);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .context(format!("Failed to create state directory: {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(state)?;
        fs::write(&path, json)
            .context(format!("Failed to write chain state to {}", path.display()))
    }

    fn delete(&self, session_id: &str, hint: &WorkspaceHint) -> Result<()> {
        let path = self.record_path(session_id, hint);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::from(e)
                .with_context(format!("Failed to remove chain state {}", path.display()))),
        }
    }
}

/// Map a session id onto a safe file stem.
///
/// Bytes outside `[A-Za-z0-9_-]` are percent-encoded (`.` becomes `%2E`,
/// `%` becomes `%25`), so distinct ids never share a record. The empty id
/// becomes `%`, which no non-empty id can encode to.
pub fn encode_session_id(session_id: &str) -> String {
    if session_id.is_empty() {
        return "%".to_string();
    }
    let mut stem = String::with_capacity(session_id.len());
    for byte in session_id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' {
            stem.push(char::from(byte));
        } else {
            stem.push_str(&format!("%{byte:02X}"));
        }
    }
    stem
}
