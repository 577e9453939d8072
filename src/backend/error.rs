//! Backend error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::backend::capabilities::BackendId;

/// Errors raised by backends and the phase controller.
///
/// Unknown file types are not errors: they are warned about and dropped
/// during dispatch.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("unknown backend `{name}`, valid values: vivado, alintpro, vunit")]
    UnknownBackend { name: String },

    #[error("invalid tool options for `{backend}`: {message}")]
    InvalidOptions { backend: BackendId, message: String },

    #[error("{option} file not found in target filesets")]
    MissingFragment { option: String },

    #[error(
        "two fragments are both included as `{name}`: {} and {}",
        first.display(),
        second.display()
    )]
    AmbiguousFragment {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("option `{option}` is required by `{operation}` for `{backend}`")]
    MissingOption {
        backend: BackendId,
        option: String,
        operation: String,
    },

    #[error("`{backend}` is not configured in {}: missing {}", work_root.display(), missing.join(", "))]
    NotConfigured {
        backend: BackendId,
        work_root: PathBuf,
        missing: Vec<String>,
    },

    #[error("`{program}` failed with exit code {}", display_code(code))]
    ToolFailed { program: String, code: Option<i32> },

    #[error("`{backend}` does not support operation `{operation}`, available: {}", available.join(", "))]
    UnsupportedOperation {
        backend: BackendId,
        operation: String,
        available: Vec<String>,
    },

    #[error("failed to render template `{template}`: {message}")]
    Template { template: String, message: String },
}

fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "none (terminated by signal)".to_string(),
    }
}
