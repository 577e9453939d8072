//! Hook script execution.

use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::backend::error::BackendError;
use crate::core::hooks::{HookPoint, HookScript, Hooks};
use crate::util::process::{ToolInvocation, ToolRunner};

/// Run every hook registered at `point`, in order, inside `work_root`.
///
/// The first failing hook stops the sequence.
pub fn run_hooks(runner: &dyn ToolRunner, hooks: &Hooks, point: HookPoint, work_root: &Path) -> Result<()> {
    for script in hooks.scripts(point) {
        tracing::info!("running {} hook `{}`", point.as_str(), script.name);
        run_hook(runner, script, work_root)
            .with_context(|| format!("{} hook `{}` failed", point.as_str(), script.name))?;
    }
    Ok(())
}

fn run_hook(runner: &dyn ToolRunner, script: &HookScript, work_root: &Path) -> Result<()> {
    let Some((program, args)) = script.cmd.split_first() else {
        bail!("hook has an empty command");
    };

    let mut invocation = ToolInvocation::new(program.clone(), work_root).args(args.iter().cloned());
    for (key, value) in &script.env {
        invocation = invocation.env(key.clone(), value.clone());
    }

    match runner.run(&invocation)? {
        Some(0) => Ok(()),
        code => Err(BackendError::ToolFailed {
            program: program.clone(),
            code,
        }
        .into()),
    }
}
