//! Zero Chain - chain and gate tracking for prompt-engine tool responses.
//!
//! The prompt engine drives multi-step "chains" and approval "gates" through
//! free-form text. This crate:
//! - extracts workflow signals from tool responses ([`parser`])
//! - keeps the latest [`ChainState`] per session ([`store`], [`backend`])
//! - renders reminders that get injected back into the conversation ([`reminder`])
//! - maps host hook events onto the above ([`hooks`])

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod backend;
pub mod hooks;
pub mod parser;
pub mod reminder;
pub mod state;
pub mod store;
pub mod workspace;

pub use backend::{FileBackend, MemoryBackend, StateBackend};
pub use hooks::{resolve_session_id, ChainTracker, HookEvent};
pub use parser::{normalize_response, parse_response, parse_text};
pub use reminder::{format_reminder, ReminderMode};
pub use state::{ChainState, MAX_SHELL_VERIFY_ATTEMPTS};
pub use store::SessionStateStore;
pub use workspace::{StateDirResolver, WorkspaceHint};
