//! `edaforge run` command

use anyhow::Result;

use crate::cli::RunArgs;
use crate::commands::{open_session, report};

pub fn execute(args: RunArgs) -> Result<()> {
    let session = open_session(args.session)?;
    let outcome = session.controller().run(&args.args)?;
    report("run", &outcome);
    Ok(())
}
