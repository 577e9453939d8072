//! Configure, build and run phases of one backend.
//!
//! The controller owns the order of operations: generated files must exist
//! before build, run or any extra operation is attempted, hooks wrap the
//! build and run phases, and a non-zero tool exit fails the phase.

use anyhow::{Context, Result};

use crate::backend::capabilities::Phase;
use crate::backend::context::BuildContext;
use crate::backend::error::BackendError;
use crate::backend::trait_def::{unsupported, ConfigureResult, EdaBackend};
use crate::core::fileset::FileSet;
use crate::core::hooks::{HookPoint, Hooks};
use crate::ops::hooks::run_hooks;
use crate::util::process::{ToolInvocation, ToolRunner};

/// What a build, run or extra phase did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseOutcome {
    /// The backend has nothing to do for this phase
    Skipped,
    /// The tool ran and exited successfully
    Completed { command: String },
}

/// Drives one backend through its lifecycle.
pub struct PhaseController<'a> {
    backend: &'a dyn EdaBackend,
    ctx: BuildContext,
    runner: &'a dyn ToolRunner,
    hooks: Hooks,
}

impl<'a> PhaseController<'a> {
    pub fn new(backend: &'a dyn EdaBackend, ctx: BuildContext, runner: &'a dyn ToolRunner) -> Self {
        PhaseController {
            backend,
            ctx,
            runner,
            hooks: Hooks::default(),
        }
    }

    /// Set the hooks to run around build and run.
    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn context(&self) -> &BuildContext {
        &self.ctx
    }

    /// Generate the backend's scripts into the work root.
    pub fn configure(&self, fileset: &FileSet) -> Result<ConfigureResult> {
        tracing::info!(
            "configuring `{}` for {} in {}",
            self.backend.id(),
            self.ctx.name,
            self.ctx.work_root.display()
        );
        self.backend
            .configure(&self.ctx, fileset)
            .with_context(|| format!("{} phase failed for `{}`", Phase::Configure, self.backend.id()))
    }

    /// Run the compile-only step.
    pub fn build(&self) -> Result<PhaseOutcome> {
        self.ensure_configured()?;
        run_hooks(self.runner, &self.hooks, HookPoint::PreBuild, &self.ctx.work_root)?;
        let invocation = if self.backend.info().phases.build.is_supported() {
            self.backend.build_invocation(&self.ctx)?
        } else {
            None
        };
        let outcome = match invocation {
            Some(invocation) => self.invoke(Phase::Build.as_str(), &invocation)?,
            None => self.skipped(Phase::Build.as_str()),
        };
        run_hooks(self.runner, &self.hooks, HookPoint::PostBuild, &self.ctx.work_root)?;
        Ok(outcome)
    }

    /// Run the tool in full mode, passing `args` through.
    pub fn run(&self, args: &[String]) -> Result<PhaseOutcome> {
        self.ensure_configured()?;
        run_hooks(self.runner, &self.hooks, HookPoint::PreRun, &self.ctx.work_root)?;
        let invocation = if self.backend.info().phases.run.is_supported() {
            self.backend.run_invocation(&self.ctx, args)?
        } else {
            None
        };
        let outcome = match invocation {
            Some(invocation) => self.invoke(Phase::Run.as_str(), &invocation)?,
            None => self.skipped(Phase::Run.as_str()),
        };
        run_hooks(self.runner, &self.hooks, HookPoint::PostRun, &self.ctx.work_root)?;
        Ok(outcome)
    }

    /// Run a backend-declared extra operation such as `program`.
    pub fn extra(&self, op: &str) -> Result<PhaseOutcome> {
        let info = self.backend.info();
        if !info.phases.extra.iter().any(|declared| *declared == op) {
            return Err(unsupported(info, op).into());
        }
        self.ensure_configured()?;
        let invocation = self.backend.extra_invocation(op, &self.ctx)?;
        self.invoke(op, &invocation)
    }

    /// Check that every file configure produces is present.
    pub fn ensure_configured(&self) -> Result<()> {
        let missing: Vec<String> = self
            .backend
            .generated_files(&self.ctx)
            .into_iter()
            .filter(|f| !self.ctx.path(f).is_file())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(BackendError::NotConfigured {
                backend: self.backend.id(),
                work_root: self.ctx.work_root.clone(),
                missing,
            }
            .into())
        }
    }

    fn invoke(&self, phase: &str, invocation: &ToolInvocation) -> Result<PhaseOutcome> {
        let command = invocation.display_command();
        tracing::info!("{}: {}", phase, command);

        match self.runner.run(invocation)? {
            Some(0) => Ok(PhaseOutcome::Completed { command }),
            code => Err(BackendError::ToolFailed {
                program: invocation.program.clone(),
                code,
            }
            .into()),
        }
    }

    fn skipped(&self, phase: &str) -> PhaseOutcome {
        tracing::debug!("{} is a no-op for `{}`", phase, self.backend.id());
        PhaseOutcome::Skipped
    }
}
