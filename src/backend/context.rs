//! Build identity and template rendering context.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::backend::dispatch::Dispatch;
use crate::backend::error::BackendError;

/// Identity of one build invocation, passed to every backend operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    /// Design name
    pub name: String,

    /// Toplevel module/entity
    pub toplevel: String,

    /// Directory that receives generated files and runs the tools
    pub work_root: PathBuf,
}

impl BuildContext {
    /// Create a new build context.
    pub fn new(
        name: impl Into<String>,
        toplevel: impl Into<String>,
        work_root: impl Into<PathBuf>,
    ) -> Self {
        BuildContext {
            name: name.into(),
            toplevel: toplevel.into(),
            work_root: work_root.into(),
        }
    }

    /// Path of a file inside the work root.
    pub fn path(&self, file_name: impl AsRef<Path>) -> PathBuf {
        self.work_root.join(file_name)
    }

    /// `<name><suffix>`, e.g. `blinky_run.tcl`.
    pub fn file_name(&self, suffix: &str) -> String {
        format!("{}{}", self.name, suffix)
    }
}

/// The single context handed to the template renderer.
///
/// `src_files` holds the directives produced by dispatch; they are taken as
/// computed and never re-derived here.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateContext {
    pub name: String,
    pub toplevel: String,
    pub src_files: Vec<String>,
    pub incdirs: Vec<String>,
    pub tool_options: serde_json::Value,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl TemplateContext {
    /// Start a context from the build identity.
    pub fn new(ctx: &BuildContext) -> Self {
        TemplateContext {
            name: ctx.name.clone(),
            toplevel: ctx.toplevel.clone(),
            src_files: Vec::new(),
            incdirs: Vec::new(),
            tool_options: serde_json::Value::Object(Default::default()),
            extra: BTreeMap::new(),
        }
    }

    /// Override the design name seen by templates.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Take the directives of a dispatch.
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.src_files = dispatch.directives;
        self
    }

    /// Set include directories.
    pub fn with_incdirs(mut self, incdirs: &[String]) -> Self {
        self.incdirs = incdirs.to_vec();
        self
    }

    /// Set the resolved tool options.
    pub fn with_tool_options<T: Serialize>(mut self, options: &T) -> Result<Self, BackendError> {
        self.tool_options = to_value("tool_options", options)?;
        Ok(self)
    }

    /// Add a flow-derived boolean such as `has_vhdl2008`.
    pub fn with_flag(mut self, key: &str, value: bool) -> Self {
        self.extra
            .insert(key.to_string(), serde_json::Value::Bool(value));
        self
    }

    /// Add any serializable backend value.
    pub fn with_value<T: Serialize>(mut self, key: &str, value: &T) -> Result<Self, BackendError> {
        self.extra.insert(key.to_string(), to_value(key, value)?);
        Ok(self)
    }
}

fn to_value<T: Serialize>(key: &str, value: &T) -> Result<serde_json::Value, BackendError> {
    serde_json::to_value(value).map_err(|e| BackendError::Template {
        template: key.to_string(),
        message: e.to_string(),
    })
}
