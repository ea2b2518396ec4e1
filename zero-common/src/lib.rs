//! Zero Common - shared plumbing for the Zero chain tracker.
//!
//! This crate provides:
//! - Configuration types and loading
//! - Error types and handling utilities
//! - Logging setup
//! - Small string utilities

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod logging;
pub mod util;

pub use config::{ChainConfig, Config, ObservabilityConfig};
pub use error::{Error, Result, ResultExt};

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::config::{ChainConfig, Config};
    pub use crate::error::{Error, Result, ResultExt};
    pub use crate::logging::init_logging;
}
