//! Configuration file support for edaforge.
//!
//! Two configuration file locations are merged:
//! - Global: `~/.edaforge/config.toml` - User-wide defaults
//! - Project: `.edaforge/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config.
//!
//! ```toml
//! [build]
//! manifest = "blinky.toml"
//! tool = "vivado"
//! work_root = "build"
//!
//! [tools]
//! vivado = "/opt/Xilinx/Vivado/2023.2/bin/vivado"
//! alintcon = "C:/Aldec/ALINT-PRO/bin/alintcon.exe"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::backend::BackendId;

/// edaforge configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build defaults
    pub build: BuildConfig,

    /// Executables for logical tool names (e.g. `vivado`, `python`)
    pub tools: BTreeMap<String, PathBuf>,
}

/// Build-related defaults, overridden by CLI flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Default manifest path
    pub manifest: Option<PathBuf>,

    /// Default backend (vivado, alintpro, vunit)
    pub tool: Option<String>,

    /// Default work root
    pub work_root: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.build.manifest.is_some() {
            self.build.manifest = other.build.manifest;
        }
        if other.build.tool.is_some() {
            self.build.tool = other.build.tool;
        }
        if other.build.work_root.is_some() {
            self.build.work_root = other.build.work_root;
        }

        // Tool paths merge per key
        self.tools.extend(other.tools);
    }

    /// Parse the default backend from config.
    pub fn tool(&self) -> Result<Option<BackendId>> {
        self.build
            .tool
            .as_deref()
            .map(|name| {
                name.parse::<BackendId>()
                    .with_context(|| format!("invalid `build.tool` in configuration: {}", name))
            })
            .transpose()
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.edaforge/config.toml)
/// 2. Global config (~/.edaforge/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        if global_path.exists() {
            config.merge(Config::load_or_default(global_path));
        }
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global config directory (~/.edaforge).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".edaforge"))
}

/// Get the global config path (~/.edaforge/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.edaforge/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".edaforge").join("config.toml")
}
