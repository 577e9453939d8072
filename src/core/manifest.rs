//! Design manifest parsing.
//!
//! The manifest is the tool-agnostic description of a design: its name,
//! toplevel, ordered files, parameters, per-tool options and hooks. It can be
//! written as TOML (`*.toml`) or JSON (`*.json`).
//!
//! ```toml
//! name = "blinky"
//! toplevel = "blinky"
//!
//! [[files]]
//! name = "../src/blinky.vhd"
//! file_type = "vhdlSource-2008"
//!
//! [tool_options.vivado]
//! part = "xc7a35tcsg324-1"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::fileset::{FileEntry, FileSet};
use crate::core::hooks::Hooks;
use crate::core::parameter::Parameters;

/// The parsed design manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Design name, used to name generated files
    pub name: String,

    /// Toplevel module/entity
    #[serde(default)]
    pub toplevel: String,

    /// Files in compilation order, paths relative to the work root
    #[serde(default)]
    pub files: Vec<FileEntry>,

    /// Design parameters
    #[serde(default)]
    pub parameters: Parameters,

    /// Raw per-tool options, validated by the backend that consumes them
    #[serde(default)]
    pub tool_options: BTreeMap<String, serde_json::Value>,

    /// Hook scripts
    #[serde(default)]
    pub hooks: Hooks,
}

impl Manifest {
    /// Load a manifest, choosing the format from the file extension.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest: {}", path.display()))?;

        let manifest = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&contents),
            Some("toml") | None => Self::from_toml_str(&contents),
            Some(other) => bail!(
                "unsupported manifest format `.{}` for {}, expected .toml or .json",
                other,
                path.display()
            ),
        };

        manifest.with_context(|| format!("failed to parse manifest: {}", path.display()))
    }

    /// Parse a TOML manifest.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let manifest: Manifest = toml::from_str(s)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Parse a JSON manifest.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let manifest: Manifest = serde_json::from_str(s)?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("manifest `name` must not be empty");
        }
        Ok(())
    }

    /// Collect the ordered file set.
    pub fn fileset(&self) -> FileSet {
        FileSet::collect(&self.files)
    }

    /// Raw options for one backend; an empty table when none are declared.
    pub fn tool_options(&self, backend: &str) -> serde_json::Value {
        self.tool_options
            .get(backend)
            .cloned()
            .unwrap_or_else(|| serde_json::Value::Object(Default::default()))
    }
}
