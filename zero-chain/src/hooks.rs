//! Host hook dispatch.
//!
//! Translates host event payloads into parser and store calls and returns
//! the text to inject into the conversation, if any. Payloads are decoded
//! leniently: missing fields mean "nothing to do", never an error.

use crate::backend::FileBackend;
use crate::parser;
use crate::reminder::{format_reminder, ReminderMode};
use crate::state::ChainState;
use crate::store::SessionStateStore;
use crate::workspace::{StateDirResolver, WorkspaceHint};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;
use zero_common::util::one_line_preview;
use zero_common::{ChainConfig, Error};

/// Session id used when the payload carries none.
pub const DEFAULT_SESSION_ID: &str = "default";

/// Host events the tracker reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookEvent {
    PostToolUse,
    UserPromptSubmit,
    PreCompact,
    SessionEnd,
}

impl HookEvent {
    /// Event name as the host spells it.
    pub fn host_name(self) -> &'static str {
        match self {
            Self::PostToolUse => "PostToolUse",
            Self::UserPromptSubmit => "UserPromptSubmit",
            Self::PreCompact => "PreCompact",
            Self::SessionEnd => "SessionEnd",
        }
    }
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.host_name())
    }
}

impl FromStr for HookEvent {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "PostToolUse" | "post-tool-use" => Ok(Self::PostToolUse),
            "UserPromptSubmit" | "prompt-submit" => Ok(Self::UserPromptSubmit),
            "PreCompact" | "pre-compact" => Ok(Self::PreCompact),
            "SessionEnd" | "session-end" => Ok(Self::SessionEnd),
            other => Err(Error::InvalidInput(format!("Unknown hook event: {other}"))),
        }
    }
}

/// Resolve the session id: `sessionID`, then `session_id`, else `"default"`.
///
/// Blank ids are skipped; non-blank ids are used verbatim.
pub fn resolve_session_id(payload: &Value) -> String {
    ["sessionID", "session_id"]
        .iter()
        .filter_map(|key| payload.get(key).and_then(Value::as_str))
        .find(|id| !id.trim().is_empty())
        .unwrap_or(DEFAULT_SESSION_ID)
        .to_string()
}

/// Workspace hint from the payload's `cwd`.
pub fn workspace_hint(payload: &Value) -> WorkspaceHint {
    WorkspaceHint {
        project_dir: payload
            .get("cwd")
            .and_then(Value::as_str)
            .filter(|cwd| !cwd.trim().is_empty())
            .map(PathBuf::from),
    }
}

/// Prompt id from a `>>prompt_id ...` command argument.
pub fn prompt_id_from_command(command: &str) -> Option<String> {
    let rest = command.trim_start().strip_prefix(">>")?;
    rest.split_whitespace()
        .next()
        .map(str::to_string)
        .filter(|id| !id.is_empty())
}

/// Event-driven front end over the parser and the session store.
pub struct ChainTracker {
    store: SessionStateStore,
    tool_marker: String,
    persist: bool,
}

impl ChainTracker {
    pub fn new(store: SessionStateStore, tool_marker: impl Into<String>, persist: bool) -> Self {
        Self {
            store,
            tool_marker: tool_marker.into(),
            persist,
        }
    }

    /// Build a tracker with a file tier resolved from configuration.
    pub fn from_config(config: &ChainConfig) -> Self {
        let file = FileBackend::new(StateDirResolver::from_config(config));
        Self::new(
            SessionStateStore::with_file_tier(Arc::new(file)),
            config.tool_marker.clone(),
            config.persist,
        )
    }

    pub fn store(&self) -> &SessionStateStore {
        &self.store
    }

    /// Route a payload to the matching handler.
    pub fn handle(&self, event: HookEvent, payload: &Value) -> Option<String> {
        match event {
            HookEvent::PostToolUse => self.on_tool_executed(payload),
            HookEvent::UserPromptSubmit => self.on_prompt_submit(payload),
            HookEvent::PreCompact => self.on_compaction(payload),
            HookEvent::SessionEnd => {
                self.on_session_end(payload);
                None
            }
        }
    }

    /// Whether a tool name belongs to the prompt engine.
    pub fn is_tracked_tool(&self, tool_name: &str) -> bool {
        tool_name.contains(&self.tool_marker)
    }

    /// After a tool call: parse, save, and return the inline reminder.
    pub fn on_tool_executed(&self, payload: &Value) -> Option<String> {
        let tool_name = payload.get("tool_name").and_then(Value::as_str).unwrap_or("");
        if !self.is_tracked_tool(tool_name) {
            return None;
        }

        let session_id = resolve_session_id(payload);
        let hint = workspace_hint(payload);
        let response = ["tool_response", "tool_output", "output"]
            .iter()
            .find_map(|key| payload.get(key).filter(|v| !v.is_null()))?;

        let Some(mut state) = parser::parse_response(response) else {
            debug!(
                session_id = %session_id,
                preview = %one_line_preview(&parser::normalize_response(response), 80),
                "No chain signal in tool response"
            );
            return None;
        };

        let input = payload.get("tool_input");
        state.apply_chain_id_override(
            input
                .and_then(|i| i.get("chain_id"))
                .and_then(Value::as_str),
        );
        if let Some(prompt_id) = input
            .and_then(|i| i.get("command"))
            .and_then(Value::as_str)
            .and_then(prompt_id_from_command)
        {
            state.last_prompt_id = prompt_id;
        }

        self.store.save(&session_id, &state, &hint, self.persist);
        non_empty(format_reminder(&state, ReminderMode::Inline))
    }

    /// Before the user's prompt is sent: restate any active chain inline.
    pub fn on_prompt_submit(&self, payload: &Value) -> Option<String> {
        let state = self.active_state(payload)?;
        non_empty(format_reminder(&state, ReminderMode::Inline))
    }

    /// Before compaction: return the full reminder for an active chain.
    pub fn on_compaction(&self, payload: &Value) -> Option<String> {
        let state = self.active_state(payload)?;
        non_empty(format_reminder(&state, ReminderMode::Full))
    }

    /// Session over: drop its state everywhere.
    pub fn on_session_end(&self, payload: &Value) {
        let session_id = resolve_session_id(payload);
        self.store.clear(&session_id, &workspace_hint(payload));
    }

    fn active_state(&self, payload: &Value) -> Option<ChainState> {
        let session_id = resolve_session_id(payload);
        self.store
            .load(&session_id, &workspace_hint(payload))
            .filter(ChainState::is_active)
    }
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}
