//! Command implementations

pub mod backends;
pub mod build;
pub mod completions;
pub mod configure;
pub mod op;
pub mod run;

use anyhow::{Context, Result};
use edaforge::ops::{PhaseOutcome, Session, SessionOptions};

use crate::cli::SessionArgs;

/// Open a session for the current directory.
fn open_session(args: SessionArgs) -> Result<Session> {
    let cwd = std::env::current_dir().context("failed to get current directory")?;
    let opts = SessionOptions {
        manifest: args.manifest,
        tool: args.tool,
        work_root: args.work_root,
    };
    Session::open(&cwd, &opts)
}

fn report(phase: &str, outcome: &PhaseOutcome) {
    match outcome {
        PhaseOutcome::Skipped => eprintln!("    Skipped {} (nothing to do)", phase),
        PhaseOutcome::Completed { command } => eprintln!("    Finished {} `{}`", phase, command),
    }
}
