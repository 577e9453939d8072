//! `edaforge configure` command

use anyhow::Result;

use crate::cli::ConfigureArgs;
use crate::commands::open_session;

/// Warnings are already reported through the log as dispatch finds them.
pub fn execute(args: ConfigureArgs) -> Result<()> {
    let session = open_session(args.session)?;
    let fileset = session.manifest.fileset();
    let result = session.controller().configure(&fileset)?;

    for path in &result.generated {
        println!("{}", path.display());
    }
    eprintln!(
        "  Configured `{}` for {} ({} files, {} warnings)",
        session.backend.id(),
        session.ctx.name,
        result.generated.len(),
        result.warnings.len()
    );

    Ok(())
}
