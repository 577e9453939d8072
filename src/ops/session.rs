//! Resolving a manifest, backend and work root for one invocation.
//!
//! Command-line values take precedence over `.edaforge/config.toml` in the
//! project, which takes precedence over `~/.edaforge/config.toml`.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::backend::capabilities::BackendId;
use crate::backend::context::BuildContext;
use crate::backend::registry::BackendRegistry;
use crate::backend::trait_def::EdaBackend;
use crate::core::manifest::Manifest;
use crate::ops::lifecycle::PhaseController;
use crate::util::config::{global_config_path, load_config, project_config_path, Config};
use crate::util::process::SystemRunner;

/// Default manifest file name.
pub const DEFAULT_MANIFEST: &str = "edaforge.toml";

/// Default work root, relative to the project root.
pub const DEFAULT_WORK_ROOT: &str = "build";

/// Overrides from the command line.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub manifest: Option<PathBuf>,
    pub tool: Option<BackendId>,
    pub work_root: Option<PathBuf>,
}

/// Everything needed to drive one backend.
pub struct Session {
    pub manifest: Manifest,
    pub backend: Box<dyn EdaBackend>,
    pub ctx: BuildContext,
    pub runner: SystemRunner,
}

impl Session {
    /// Open a session rooted at `project_root`, loading configuration from
    /// the usual locations.
    pub fn open(project_root: &Path, opts: &SessionOptions) -> Result<Self> {
        let config = load_config(
            global_config_path().as_deref(),
            &project_config_path(project_root),
        );
        Self::with_config(project_root, opts, config)
    }

    /// Open a session with an explicit configuration.
    pub fn with_config(project_root: &Path, opts: &SessionOptions, config: Config) -> Result<Self> {
        let manifest_path = project_root.join(
            opts.manifest
                .clone()
                .or_else(|| config.build.manifest.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MANIFEST)),
        );
        let manifest = Manifest::load(&manifest_path)?;

        let tool = match (opts.tool, config.tool()?) {
            (Some(tool), _) | (None, Some(tool)) => tool,
            (None, None) => bail!("no backend selected\nhelp: pass `--tool <TOOL>` or set `build.tool` in .edaforge/config.toml"),
        };

        let work_root = project_root.join(
            opts.work_root
                .clone()
                .or_else(|| config.build.work_root.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_WORK_ROOT)),
        );

        let backend = BackendRegistry::new().instantiate(tool, &manifest)?;
        let ctx = BuildContext::new(&manifest.name, &manifest.toplevel, work_root);
        tracing::debug!(
            "session: manifest {}, backend `{}`, work root {}",
            manifest_path.display(),
            tool,
            ctx.work_root.display()
        );

        Ok(Session {
            manifest,
            backend,
            ctx,
            runner: SystemRunner::with_tool_paths(config.tools),
        })
    }

    /// Phase controller over this session's backend, with manifest hooks.
    pub fn controller(&self) -> PhaseController<'_> {
        PhaseController::new(self.backend.as_ref(), self.ctx.clone(), &self.runner)
            .with_hooks(self.manifest.hooks.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::error::BackendError;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"
name = "blinky"
toplevel = "blinky_top"

[[files]]
name = "../rtl/blinky.v"
file_type = "verilogSource"

[tool_options.vivado]
part = "xc7a35tcsg324-1"
"#;

    fn project() -> TempDir {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("edaforge.toml"), MANIFEST).unwrap();
        tmp
    }

    #[test]
    fn test_cli_tool_wins() {
        let tmp = project();
        let mut config = Config::default();
        config.build.tool = Some("vunit".to_string());

        let opts = SessionOptions {
            tool: Some(BackendId::Vivado),
            ..Default::default()
        };
        let session = Session::with_config(tmp.path(), &opts, config).unwrap();
        assert_eq!(session.backend.id(), BackendId::Vivado);
        assert_eq!(session.ctx.name, "blinky");
        assert_eq!(session.ctx.toplevel, "blinky_top");
        assert_eq!(session.ctx.work_root, tmp.path().join("build"));
    }

    #[test]
    fn test_config_defaults() {
        let tmp = project();
        std::fs::rename(tmp.path().join("edaforge.toml"), tmp.path().join("design.toml")).unwrap();
        let mut config = Config::default();
        config.build.tool = Some("alint-pro".to_string());
        config.build.manifest = Some(PathBuf::from("design.toml"));
        config.build.work_root = Some(PathBuf::from("out/lint"));

        let session = Session::with_config(tmp.path(), &SessionOptions::default(), config).unwrap();
        assert_eq!(session.backend.id(), BackendId::AlintPro);
        assert_eq!(session.ctx.work_root, tmp.path().join("out/lint"));
    }

    #[test]
    fn test_no_tool_selected() {
        let tmp = project();
        let err = Session::with_config(tmp.path(), &SessionOptions::default(), Config::default())
            .err()
            .unwrap();
        assert!(err.to_string().contains("no backend selected"));
    }

    #[test]
    fn test_invalid_options_rejected_at_open() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("edaforge.toml"),
            "name = \"x\"\n[tool_options.vunit]\nvuargs = \"--list\"\n",
        )
        .unwrap();
        let opts = SessionOptions {
            tool: Some(BackendId::Vunit),
            ..Default::default()
        };

        let err = Session::with_config(tmp.path(), &opts, Config::default())
            .err()
            .unwrap();
        let err = err.downcast_ref::<BackendError>().unwrap();
        assert!(err.to_string().contains("must be a list of strings"));
    }

    #[test]
    fn test_invalid_configured_tool() {
        let tmp = project();
        let mut config = Config::default();
        config.build.tool = Some("quartus".to_string());

        let err = Session::with_config(tmp.path(), &SessionOptions::default(), config)
            .err()
            .unwrap();
        assert!(err.to_string().contains("invalid `build.tool` in configuration: quartus"));
    }
}
