//! Logging utilities for Zero hook processes.
//!
//! Hook processes talk to the host over stdout, so every layer built here
//! writes to stderr. `RUST_LOG` always wins over the configured level.

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Modules that only produce noise at debug level.
pub const NOISY_MODULES: &[&str] = &["regex", "regex_automata"];

/// Build the default EnvFilter with noise suppression.
fn build_filter(log_level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let mut directives = String::from(log_level);
    for module in NOISY_MODULES {
        directives.push_str(&format!(",{}=warn", module));
    }

    EnvFilter::new(&directives)
}

/// Initialize logging with the given configuration.
///
/// # Arguments
///
/// * `log_level` - Base log level (trace, debug, info, warn, error)
/// * `log_format` - Output format: "json" for structured JSON, "pretty" for human-readable
///
/// Calling this twice is harmless; the second subscriber is dropped.
pub fn init_logging(log_level: &str, log_format: &str) {
    let filter = build_filter(log_level);

    let subscriber = tracing_subscriber::registry().with(filter);

    if log_format == "json" {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_span_events(FmtSpan::CLOSE)
            .with_current_span(true)
            .with_target(true)
            .with_file(true)
            .with_line_number(true);
        let _ = subscriber.with(fmt_layer).try_init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .with_target(true)
            .with_file(false)
            .with_line_number(false);
        let _ = subscriber.with(fmt_layer).try_init();
    }

    tracing::debug!(
        log_level = %log_level,
        log_format = %log_format,
        "Logging initialized"
    );
}

/// Create a tracing span for one hook event.
///
/// # Example
///
/// ```ignore
/// let span = hook_span!("post_tool_use", session_id);
/// let _enter = span.enter();
/// ```
#[macro_export]
macro_rules! hook_span {
    ($event:expr, $session_id:expr) => {
        tracing::info_span!("hook_event", event = $event, session_id = %$session_id)
    };
    ($event:expr, $session_id:expr, $($field:tt)*) => {
        tracing::info_span!("hook_event", event = $event, session_id = %$session_id, $($field)*)
    };
}
