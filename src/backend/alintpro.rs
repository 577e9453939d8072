//! Aldec ALINT-PRO static analysis backend.
//!
//! Configure writes `alintpro.do`. Files declared with the `waiver` type are
//! not added to the project; their contents are included into the script
//! instead. There is no build step. Run launches `alintcon` in batch mode, or
//! the `alint` GUI when `gui` is set.

use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::backend::capabilities::{BackendId, PhaseCapabilities, PhaseSupport};
use crate::backend::context::{BuildContext, TemplateContext};
use crate::backend::dispatch::{dispatch, DispatchResult, FileDispatcher};
use crate::backend::error::BackendError;
use crate::backend::fragments::{FragmentPicker, Selector};
use crate::backend::options::{parse_options, OptionDoc, OptionSchema};
use crate::backend::renderer::TemplateRenderer;
use crate::backend::trait_def::{write_generated, BackendInfo, ConfigureResult, EdaBackend};
use crate::core::file_type::FileKind;
use crate::core::fileset::{FileSet, SourceFile};
use crate::core::manifest::Manifest;
use crate::util::fs::resolve_path;
use crate::util::process::ToolInvocation;

const SCRIPT: &str = "alintpro.do";

const SCHEMA: OptionSchema = OptionSchema {
    flags: &[OptionDoc {
        name: "gui",
        kind: "Bool",
        desc: "Run tool in a GUI environment",
    }],
    members: &[OptionDoc {
        name: "linting_ruleset",
        kind: "String",
        desc: "Path to ruleset macro file",
    }],
    lists: &[],
};

static INFO: BackendInfo = BackendInfo {
    id: BackendId::AlintPro,
    description: "Aldec ALINT-PRO HDL design verification by static analysis",
    schema: SCHEMA,
    phases: PhaseCapabilities {
        configure: PhaseSupport::Required,
        build: PhaseSupport::NotSupported,
        run: PhaseSupport::Required,
        extra: &[],
    },
    tools: &["alintcon", "alint"],
};

/// ALINT-PRO tool options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlintProOptions {
    pub gui: bool,
    pub linting_ruleset: Option<String>,
}

/// The ALINT-PRO backend.
#[derive(Debug, Clone)]
pub struct AlintPro {
    options: AlintProOptions,
}

impl AlintPro {
    /// Static backend description.
    pub fn info() -> &'static BackendInfo {
        &INFO
    }

    pub fn new(options: AlintProOptions) -> Self {
        AlintPro { options }
    }

    /// Create a backend from the `alintpro` section of a manifest.
    pub fn from_manifest(manifest: &Manifest) -> Result<Self, BackendError> {
        let raw = manifest.tool_options(BackendId::AlintPro.as_str());
        Ok(Self::new(parse_options(BackendId::AlintPro, &SCHEMA, &raw)?))
    }

    pub fn options(&self) -> &AlintProOptions {
        &self.options
    }
}

impl FileDispatcher for AlintPro {
    type Flow = ();

    fn directive_for(&self, file: &SourceFile, _flow: &()) -> DispatchResult {
        let command = match file.kind() {
            FileKind::VerilogSource => "addfile -verilog".to_string(),
            FileKind::SystemVerilogSource => "addfile -sv".to_string(),
            FileKind::VhdlSource => {
                let mut command = "addfile -vhdl".to_string();
                if file.file_type.is_vhdl2008() {
                    command.push_str(" -2008");
                }
                if let Some(library) = &file.logical_name {
                    command.push_str(" -lib ");
                    command.push_str(library);
                }
                command
            }
            FileKind::TclSource => "source".to_string(),
            FileKind::User | FileKind::Waiver => return DispatchResult::Ignored,
            _ => return DispatchResult::Unrecognized,
        };

        DispatchResult::Directive(format!("{} {}", command, file.name))
    }
}

impl EdaBackend for AlintPro {
    fn info(&self) -> &'static BackendInfo {
        &INFO
    }

    fn configure(&self, ctx: &BuildContext, fileset: &FileSet) -> Result<ConfigureResult> {
        // Includes are looked up next to the design sources first.
        let src_root = resolve_path(&ctx.work_root, Path::new("../src"));
        let picked = FragmentPicker::new(&ctx.work_root)
            .pick(fileset, &[Selector::kind(FileKind::Waiver)])?;
        let renderer = TemplateRenderer::new()
            .with_root(src_root)
            .with_roots(picked.roots());

        let files = dispatch(self, picked.remaining.iter(), &());
        let warnings = files.warnings.clone();

        let template_ctx = TemplateContext::new(ctx)
            .with_name(ctx.name.replace('.', "_"))
            .with_dispatch(files)
            .with_incdirs(&picked.remaining.include_dirs)
            .with_tool_options(&self.options)?
            .with_value("waiver_files", &picked.fragments)?;

        let script = renderer.render_to_string("alintpro/alintpro.do.j2", &template_ctx)?;

        Ok(ConfigureResult {
            generated: write_generated(ctx, vec![(SCRIPT.to_string(), script)])?,
            warnings,
        })
    }

    fn generated_files(&self, _ctx: &BuildContext) -> Vec<String> {
        vec![SCRIPT.to_string()]
    }

    fn build_invocation(&self, _ctx: &BuildContext) -> Result<Option<ToolInvocation>> {
        Ok(None)
    }

    fn run_invocation(&self, ctx: &BuildContext, args: &[String]) -> Result<Option<ToolInvocation>> {
        let invocation = if self.options.gui {
            ToolInvocation::new("alint", &ctx.work_root)
        } else {
            ToolInvocation::new("alintcon", &ctx.work_root).arg("-batch")
        };

        Ok(Some(
            invocation
                .args(["-do", SCRIPT])
                .args(args.iter().cloned()),
        ))
    }
}
