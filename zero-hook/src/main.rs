#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::Read;
use zero_chain::{format_reminder, ChainTracker, HookEvent, ReminderMode, WorkspaceHint};
use zero_common::config::Config;
use zero_common::logging::init_logging;

/// `zero-hook` - chain and gate tracking for prompt-engine workflows.
#[derive(Parser, Debug)]
#[command(name = "zero-hook")]
#[command(author = "theonlyhennygod")]
#[command(version = "0.1.0")]
#[command(about = "Tracks prompt-engine chains and gates across host hook events.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Handle a PostToolUse event (payload on stdin)
    PostToolUse,

    /// Handle a UserPromptSubmit event (payload on stdin)
    PromptSubmit,

    /// Handle a PreCompact event (payload on stdin)
    PreCompact,

    /// Handle a SessionEnd event (payload on stdin)
    SessionEnd,

    /// Print the tracked state of a session
    Status {
        /// Session identifier
        #[arg(long, default_value = "default")]
        session: String,

        /// Project directory used to locate the record
        #[arg(long)]
        project_dir: Option<std::path::PathBuf>,

        /// Reminder mode (full, inline)
        #[arg(long, default_value = "full")]
        mode: ReminderMode,
    },
}

impl Commands {
    fn hook_event(&self) -> Option<HookEvent> {
        match self {
            Self::PostToolUse => Some(HookEvent::PostToolUse),
            Self::PromptSubmit => Some(HookEvent::UserPromptSubmit),
            Self::PreCompact => Some(HookEvent::PreCompact),
            Self::SessionEnd => Some(HookEvent::SessionEnd),
            Self::Status { .. } => None,
        }
    }
}

fn load_config() -> Config {
    let mut config = Config::load().unwrap_or_else(|e| {
        eprintln!("zero-hook: {e}; using defaults");
        Config::default()
    });
    config.apply_env_overrides();
    config
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config();
    init_logging(&config.observability.log_level, &config.observability.log_format);

    let tracker = ChainTracker::from_config(&config.chain);

    if let Some(event) = cli.command.hook_event() {
        let mut input = String::new();
        std::io::stdin().read_to_string(&mut input)?;
        if let Some(output) = zero_hook::run_hook(&tracker, event, &input) {
            println!("{output}");
        }
        return Ok(());
    }

    if let Commands::Status {
        session,
        project_dir,
        mode,
    } = cli.command
    {
        let hint = WorkspaceHint { project_dir };
        match tracker.store().load(&session, &hint) {
            Some(state) if state.is_active() => println!("{}", format_reminder(&state, mode)),
            _ => println!("No active chain for session {session}"),
        }
    }

    Ok(())
}
