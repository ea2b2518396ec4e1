//! Integration tests for the hook entry point.
//!
//! Builds the tracker the same way `main` does and replays a session's
//! worth of hook payloads through `run_hook`.

use serde_json::Value;
use zero_chain::{ChainTracker, HookEvent};
use zero_common::ChainConfig;

fn tracker_for(dir: &std::path::Path) -> ChainTracker {
    let config = ChainConfig {
        state_dir: Some(dir.to_string_lossy().into_owned()),
        ..ChainConfig::default()
    };
    ChainTracker::from_config(&config)
}

fn context_of(output: &str) -> String {
    let value: Value = serde_json::from_str(output).unwrap();
    value["hookSpecificOutput"]["additionalContext"]
        .as_str()
        .unwrap()
        .to_string()
}

#[test]
fn test_session_lifecycle_across_processes() {
    let tmp = tempfile::tempdir().unwrap();

    let tool = r#"{
        "sessionID": "abc",
        "tool_name": "mcp__prompts__prompt_engine",
        "tool_input": { "chain_id": "chain-release#4" },
        "tool_response": {
            "content": [
                { "type": "text", "text": "Step 2 of 5" },
                { "type": "text", "text": "Shell verification: make check\nAttempt 1/5" }
            ]
        }
    }"#;
    let out = zero_hook::run_hook(&tracker_for(tmp.path()), HookEvent::PostToolUse, tool).unwrap();
    let context = context_of(&out);
    assert!(context.starts_with("[chain-release#4] 2/5 | Verify: 1/5\n"));
    assert!(context.contains("make check"));
    assert!(tmp.path().join("abc.json").exists());

    let compact = zero_hook::run_hook(
        &tracker_for(tmp.path()),
        HookEvent::PreCompact,
        r#"{ "sessionID": "abc" }"#,
    )
    .unwrap();
    let full = context_of(&compact);
    assert!(full.starts_with("[Chain] chain-release#4 - Step 2/5\n[Verify] `make check` - Attempt 1/5"));

    let end = zero_hook::run_hook(
        &tracker_for(tmp.path()),
        HookEvent::SessionEnd,
        r#"{ "sessionID": "abc" }"#,
    );
    assert_eq!(end, None);
    assert!(!tmp.path().join("abc.json").exists());

    let after = zero_hook::run_hook(
        &tracker_for(tmp.path()),
        HookEvent::PreCompact,
        r#"{ "sessionID": "abc" }"#,
    );
    assert_eq!(after, None);
}

#[test]
fn test_untracked_tool_and_empty_stdin_are_silent() {
    let tmp = tempfile::tempdir().unwrap();
    let tracker = tracker_for(tmp.path());

    let bash = r#"{ "session_id": "s", "tool_name": "Bash", "tool_response": "Step 1 of 2" }"#;
    assert_eq!(zero_hook::run_hook(&tracker, HookEvent::PostToolUse, bash), None);
    assert_eq!(zero_hook::run_hook(&tracker, HookEvent::PreCompact, ""), None);
    assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
}

#[test]
fn test_persist_disabled_keeps_disk_clean() {
    let tmp = tempfile::tempdir().unwrap();
    let config = ChainConfig {
        state_dir: Some(tmp.path().to_string_lossy().into_owned()),
        persist: false,
        ..ChainConfig::default()
    };
    let tracker = ChainTracker::from_config(&config);

    let tool = r#"{ "session_id": "s", "tool_name": "prompt_engine", "tool_response": "Progress 1/2" }"#;
    assert!(zero_hook::run_hook(&tracker, HookEvent::PostToolUse, tool).is_some());
    assert!(!tmp.path().join("s.json").exists());

    let prompt = zero_hook::run_hook(&tracker, HookEvent::UserPromptSubmit, r#"{ "session_id": "s" }"#)
        .unwrap();
    assert!(context_of(&prompt).starts_with("[active] 1/2"));
}
