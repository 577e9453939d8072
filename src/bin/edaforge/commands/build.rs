//! `edaforge build` command

use anyhow::Result;

use crate::cli::BuildArgs;
use crate::commands::{open_session, report};

pub fn execute(args: BuildArgs) -> Result<()> {
    let session = open_session(args.session)?;
    let outcome = session.controller().build()?;
    report("build", &outcome);
    Ok(())
}
