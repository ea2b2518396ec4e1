//! Resolution of the directory holding per-session records.
//!
//! Order: explicit override, host project root, the caller's project
//! directory, then a directory next to the running executable.

use std::path::{Path, PathBuf};
use zero_common::ChainConfig;

/// Host-provided project roots, most specific first.
pub const HOST_ROOT_ENVS: &[&str] = &["CODECODER_PROJECT_DIR", "CLAUDE_PROJECT_DIR"];

/// Records live here below a project root.
pub const PROJECT_STATE_SUBDIR: &str = ".codecoder/chain-state";

/// Records live here below the fallback directory.
pub const FALLBACK_STATE_SUBDIR: &str = "chain-state";

/// Per-call workspace information supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceHint {
    /// Project directory of the session (the hook payload's `cwd`).
    pub project_dir: Option<PathBuf>,
}

impl WorkspaceHint {
    /// A hint with no project directory.
    pub fn none() -> Self {
        Self::default()
    }

    /// A hint pointing at a project directory.
    pub fn project(dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: Some(dir.into()),
        }
    }
}

/// Where a resolved directory came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateDirSource {
    Override,
    HostRoot,
    ProjectHint,
    Fallback,
}

/// Resolves the record directory for a given [`WorkspaceHint`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateDirResolver {
    override_dir: Option<PathBuf>,
    host_root: Option<PathBuf>,
    fallback_dir: PathBuf,
}

impl StateDirResolver {
    /// Build a resolver from explicit parts.
    pub fn new(
        override_dir: Option<PathBuf>,
        host_root: Option<PathBuf>,
        fallback_dir: PathBuf,
    ) -> Self {
        Self {
            override_dir,
            host_root,
            fallback_dir,
        }
    }

    /// Build a resolver from configuration and the process environment.
    ///
    /// `config.state_dir` already carries `ZERO_CHAIN_STATE_DIR` once
    /// environment overrides have been applied.
    pub fn from_config(config: &ChainConfig) -> Self {
        let host_root = HOST_ROOT_ENVS
            .iter()
            .filter_map(|key| std::env::var_os(key))
            .map(PathBuf::from)
            .find(|p| !p.as_os_str().is_empty());

        Self::new(config.state_dir_path(), host_root, default_fallback_dir())
    }

    /// Resolve the record directory for this call.
    pub fn resolve(&self, hint: &WorkspaceHint) -> PathBuf {
        self.resolve_with_source(hint).0
    }

    /// Resolve the record directory and report which rule applied.
    pub fn resolve_with_source(&self, hint: &WorkspaceHint) -> (PathBuf, StateDirSource) {
        if let Some(dir) = &self.override_dir {
            return (dir.clone(), StateDirSource::Override);
        }
        if let Some(root) = &self.host_root {
            return (root.join(PROJECT_STATE_SUBDIR), StateDirSource::HostRoot);
        }
        if let Some(project) = hint.project_dir.as_deref().filter(|p| !is_blank(p)) {
            return (project.join(PROJECT_STATE_SUBDIR), StateDirSource::ProjectHint);
        }
        (self.fallback_dir.join(FALLBACK_STATE_SUBDIR), StateDirSource::Fallback)
    }
}

fn is_blank(path: &Path) -> bool {
    path.as_os_str().is_empty()
}

/// Directory of the running executable, or the current directory.
fn default_fallback_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}
