//! Configuration management for the Zero chain tracker.
//!
//! The tracker reads `~/.codecoder/chain.json` if it exists.
//!
//! # Configuration Priority
//!
//! 1. Environment variables (ZERO_* prefix)
//! 2. Explicit config file values
//! 3. Default values
//!
//! # Environment Variable Mapping
//!
//! - `ZERO_LOG_LEVEL` → observability.log_level
//! - `ZERO_LOG_FORMAT` → observability.log_format
//! - `ZERO_CHAIN_TOOL_MARKER` → chain.tool_marker
//! - `ZERO_CHAIN_PERSIST` → chain.persist
//! - `ZERO_CHAIN_STATE_DIR` → chain.state_dir

use crate::error::{Error, Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".codecoder"),
        |dirs| dirs.home_dir().join(".codecoder"),
    )
}

/// Get the configuration file path.
pub fn config_path() -> PathBuf {
    config_dir().join("chain.json")
}

// ============================================================================
// Observability
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level", alias = "level")]
    pub log_level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format", alias = "format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "warn".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

// ============================================================================
// Chain Tracking
// ============================================================================

/// Chain/gate tracking configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Substring identifying the prompt-engine tool in tool names.
    #[serde(default = "default_tool_marker")]
    pub tool_marker: String,

    /// Write each saved state to the file tier as well.
    ///
    /// Hook processes are short-lived, so without this the state does not
    /// survive to the next event.
    #[serde(default = "default_true")]
    pub persist: bool,

    /// Explicit directory for per-session records. Supports `~`.
    #[serde(default)]
    pub state_dir: Option<String>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            tool_marker: default_tool_marker(),
            persist: true,
            state_dir: None,
        }
    }
}

impl ChainConfig {
    /// The explicit state directory with `~` expanded, if configured.
    pub fn state_dir_path(&self) -> Option<PathBuf> {
        self.state_dir
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| PathBuf::from(shellexpand::tilde(s).into_owned()))
    }
}

fn default_tool_marker() -> String {
    "prompt_engine".into()
}

fn default_true() -> bool {
    true
}

// ============================================================================
// Root
// ============================================================================

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Chain tracking configuration
    #[serde(default)]
    pub chain: ChainConfig,
}

impl Config {
    /// Load configuration from the default path.
    pub fn load() -> Result<Self> {
        let path = config_path();
        if !path.exists() {
            tracing::debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read config from {}", path.display()))?;

        serde_json::from_str(&content).map_err(|e| {
            Error::Config(format!("Failed to parse config from {}: {e}", path.display()))
        })
    }

    /// Load configuration with environment variable overrides.
    pub fn load_with_env() -> Result<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable source.
    ///
    /// Split out from [`Config::apply_env_overrides`] so tests do not have to
    /// mutate the process environment.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup("ZERO_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Some(format) = lookup("ZERO_LOG_FORMAT") {
            self.observability.log_format = format;
        }
        if let Some(marker) = lookup("ZERO_CHAIN_TOOL_MARKER").filter(|m| !m.trim().is_empty()) {
            self.chain.tool_marker = marker;
        }
        if let Some(persist) = lookup("ZERO_CHAIN_PERSIST") {
            self.chain.persist = parse_flag(&persist);
        }
        if let Some(dir) = lookup("ZERO_CHAIN_STATE_DIR") {
            self.chain.state_dir = Some(dir);
        }
    }
}

/// Interpret an environment flag. Anything but an explicit "off" value is on.
fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.observability.log_level, "warn");
        assert_eq!(config.observability.log_format, "pretty");
        assert_eq!(config.chain.tool_marker, "prompt_engine");
        assert!(config.chain.persist);
        assert!(config.chain.state_dir.is_none());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{ "chain": { "persist": false } }"#).unwrap();
        assert!(!config.chain.persist);
        assert_eq!(config.chain.tool_marker, "prompt_engine");
        assert_eq!(config.observability, ObservabilityConfig::default());
    }

    #[test]
    fn test_observability_aliases() {
        let config: Config =
            serde_json::from_str(r#"{ "observability": { "level": "debug", "format": "json" } }"#)
                .unwrap();
        assert_eq!(config.observability.log_level, "debug");
        assert_eq!(config.observability.log_format, "json");
    }

    #[test]
    fn test_apply_overrides() {
        let vars: HashMap<&str, &str> = [
            ("ZERO_LOG_LEVEL", "trace"),
            ("ZERO_CHAIN_TOOL_MARKER", "prompts_mcp"),
            ("ZERO_CHAIN_PERSIST", "off"),
            ("ZERO_CHAIN_STATE_DIR", "/tmp/chain"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|k| vars.get(k).map(|v| (*v).to_string()));

        assert_eq!(config.observability.log_level, "trace");
        assert_eq!(config.observability.log_format, "pretty");
        assert_eq!(config.chain.tool_marker, "prompts_mcp");
        assert!(!config.chain.persist);
        assert_eq!(config.chain.state_dir_path(), Some(PathBuf::from("/tmp/chain")));
    }

    #[test]
    fn test_blank_marker_is_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|k| (k == "ZERO_CHAIN_TOOL_MARKER").then(|| "  ".to_string()));
        assert_eq!(config.chain.tool_marker, "prompt_engine");
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("1"));
        assert!(parse_flag("yes"));
        assert!(!parse_flag("FALSE"));
        assert!(!parse_flag(" no "));
    }

    #[test]
    fn test_state_dir_tilde_expansion() {
        let chain = ChainConfig {
            state_dir: Some("~/chain-state".into()),
            ..ChainConfig::default()
        };
        let path = chain.state_dir_path().unwrap();
        if std::env::var_os("HOME").is_some() {
            assert!(!path.to_string_lossy().starts_with('~'));
        }
        assert!(path.ends_with("chain-state"));

        let blank = ChainConfig {
            state_dir: Some("   ".into()),
            ..ChainConfig::default()
        };
        assert!(blank.state_dir_path().is_none());
    }

    #[test]
    fn test_load_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("chain.json");
        fs::write(&path, r#"{ "chain": { "tool_marker": "engine" } }"#).unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.chain.tool_marker, "engine");

        fs::write(&path, "{ broken").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
