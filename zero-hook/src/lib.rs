//! Zero Hook - host hook entry point for chain tracking.
//!
//! The host spawns one process per event and writes the event payload to
//! stdin. Anything printed to stdout is read back as hook output, so this
//! crate only ever prints a single JSON object (or nothing).

use serde_json::{json, Value};
use tracing::warn;
use zero_chain::{ChainTracker, HookEvent};

/// Decode a raw stdin payload. Blank input is an empty object.
pub fn parse_payload(input: &str) -> anyhow::Result<Value> {
    if input.trim().is_empty() {
        return Ok(json!({}));
    }
    let payload: Value = serde_json::from_str(input)?;
    if !payload.is_object() {
        anyhow::bail!("Hook payload must be a JSON object");
    }
    Ok(payload)
}

/// Hook output carrying context to inject into the conversation.
pub fn render_output(event: HookEvent, context: &str) -> Value {
    json!({
        "hookSpecificOutput": {
            "hookEventName": event.host_name(),
            "additionalContext": context,
        }
    })
}

/// Run one hook event end to end and return what should go to stdout.
///
/// Malformed payloads are logged and produce no output; a hook must never
/// break the host.
pub fn run_hook(tracker: &ChainTracker, event: HookEvent, input: &str) -> Option<String> {
    let payload = match parse_payload(input) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(event = %event, error = %e, "Ignoring malformed hook payload");
            return None;
        }
    };

    let session_id = zero_chain::resolve_session_id(&payload);
    let span = zero_common::hook_span!(event.host_name(), session_id);
    let _enter = span.enter();

    let context = tracker.handle(event, &payload)?;
    Some(render_output(event, &context).to_string())
}
