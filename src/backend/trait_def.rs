//! EdaBackend trait definition and result types.
//!
//! A backend turns a file set into generated scripts (configure) and
//! describes the external tool invocations for the later phases. Backends
//! never spawn processes themselves; the phase controller hands their
//! invocations to a [`ToolRunner`](crate::util::process::ToolRunner).

use std::path::PathBuf;

use anyhow::Result;

use crate::backend::capabilities::{BackendId, PhaseCapabilities};
use crate::backend::context::BuildContext;
use crate::backend::error::BackendError;
use crate::backend::options::OptionSchema;
use crate::core::fileset::FileSet;
use crate::util::fs::write_string;
use crate::util::process::{find_executable, ToolInvocation};

/// Static description of a backend, available without instantiating it.
#[derive(Debug, Clone)]
pub struct BackendInfo {
    /// Backend identifier
    pub id: BackendId,

    /// One-line description
    pub description: &'static str,

    /// Declared tool options
    pub schema: OptionSchema,

    /// Declared phase support
    pub phases: PhaseCapabilities,

    /// Executables the backend may invoke
    pub tools: &'static [&'static str],
}

/// Tool availability status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendAvailability {
    /// Every tool was found
    Available {
        /// Resolved executables
        paths: Vec<PathBuf>,
    },

    /// At least one tool is missing from PATH
    NotInstalled {
        /// Names of the missing tools
        missing: Vec<String>,
    },
}

impl BackendAvailability {
    /// Look up each tool in PATH.
    pub fn detect(tools: &[&str]) -> Self {
        let mut paths = Vec::new();
        let mut missing = Vec::new();
        for tool in tools {
            match find_executable(tool) {
                Some(path) => paths.push(path),
                None => missing.push(tool.to_string()),
            }
        }

        if missing.is_empty() {
            BackendAvailability::Available { paths }
        } else {
            BackendAvailability::NotInstalled { missing }
        }
    }

    /// Check if the backend is available.
    pub fn is_available(&self) -> bool {
        matches!(self, BackendAvailability::Available { .. })
    }

    /// Get error message if not available.
    pub fn error_message(&self) -> Option<String> {
        match self {
            BackendAvailability::Available { .. } => None,
            BackendAvailability::NotInstalled { missing } => {
                Some(format!("{} not found in PATH", missing.join(", ")))
            }
        }
    }
}

/// Result of the configure phase.
#[derive(Debug, Clone, Default)]
pub struct ConfigureResult {
    /// Files written to the work root, in write order
    pub generated: Vec<PathBuf>,

    /// Warnings from dispatch
    pub warnings: Vec<String>,
}

/// The EdaBackend trait - interface for EDA tool backends.
///
/// Options are validated when the backend is created, so operations can
/// rely on them. Build and run return `None` when the phase is a no-op.
pub trait EdaBackend {
    /// Static description of this backend.
    fn info(&self) -> &'static BackendInfo;

    /// Backend identifier.
    fn id(&self) -> BackendId {
        self.info().id
    }

    /// Write the generated scripts into the work root.
    fn configure(&self, ctx: &BuildContext, fileset: &FileSet) -> Result<ConfigureResult>;

    /// Files a finished configure leaves in the work root.
    fn generated_files(&self, ctx: &BuildContext) -> Vec<String>;

    /// Compile-only tool invocation.
    fn build_invocation(&self, ctx: &BuildContext) -> Result<Option<ToolInvocation>>;

    /// Full tool invocation, with caller-supplied trailing arguments.
    fn run_invocation(&self, ctx: &BuildContext, args: &[String]) -> Result<Option<ToolInvocation>>;

    /// Backend-declared extra operation, see [`PhaseCapabilities::extra`].
    fn extra_invocation(&self, op: &str, _ctx: &BuildContext) -> Result<ToolInvocation> {
        Err(unsupported(self.info(), op).into())
    }
}

/// Write rendered outputs into the work root, in order.
///
/// Backends render everything first and call this last, so a failed render
/// leaves the work root untouched.
pub fn write_generated(ctx: &BuildContext, outputs: Vec<(String, String)>) -> Result<Vec<PathBuf>> {
    let mut generated = Vec::with_capacity(outputs.len());
    for (name, contents) in outputs {
        let path = ctx.path(&name);
        write_string(&path, &contents)?;
        tracing::info!("generated {}", path.display());
        generated.push(path);
    }
    Ok(generated)
}

/// Error for an operation the backend does not declare.
pub fn unsupported(info: &BackendInfo, op: &str) -> BackendError {
    BackendError::UnsupportedOperation {
        backend: info.id,
        operation: op.to_string(),
        available: info.phases.extra.iter().map(|s| s.to_string()).collect(),
    }
}
