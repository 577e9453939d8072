//! `edaforge op` command
//!
//! Backend-declared operations outside configure/build/run.

use anyhow::Result;

use crate::cli::OpArgs;
use crate::commands::{open_session, report};

pub fn execute(args: OpArgs) -> Result<()> {
    let session = open_session(args.session)?;
    let outcome = session.controller().extra(&args.name)?;
    report(&args.name, &outcome);
    Ok(())
}
