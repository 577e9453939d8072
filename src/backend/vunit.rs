//! VUnit backend.
//!
//! Configure writes a `run.py` that registers every library and adds the
//! sources to them. Python fragments named by `pre_flow_fragment` and
//! `post_flow_fragment` are located among the declared files and spliced in
//! before and after the sources.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::backend::capabilities::{BackendId, PhaseCapabilities, PhaseSupport};
use crate::backend::context::{BuildContext, TemplateContext};
use crate::backend::dispatch::{dispatch, DispatchResult, FileDispatcher};
use crate::backend::error::BackendError;
use crate::backend::fragments::{FragmentPicker, Reclassified, Selector};
use crate::backend::options::{parse_options, OptionDoc, OptionSchema};
use crate::backend::renderer::TemplateRenderer;
use crate::backend::trait_def::{write_generated, BackendInfo, ConfigureResult, EdaBackend};
use crate::core::file_type::FileKind;
use crate::core::fileset::{FileSet, SourceFile};
use crate::core::manifest::Manifest;
use crate::util::process::ToolInvocation;

/// Library for files without a logical name.
pub const DEFAULT_LIBRARY: &str = "default_lib";

const SCRIPT: &str = "run.py";
const PRE_FLOW: &str = "pre_flow_fragment";
const POST_FLOW: &str = "post_flow_fragment";

const SCHEMA: OptionSchema = OptionSchema {
    flags: &[],
    members: &[
        OptionDoc {
            name: PRE_FLOW,
            kind: "String",
            desc: "Python script fragment, inserted into the run.py before the fileset files are added.",
        },
        OptionDoc {
            name: POST_FLOW,
            kind: "String",
            desc: "Python script fragment, inserted into the run.py after the fileset files are added.",
        },
    ],
    lists: &[OptionDoc {
        name: "vuargs",
        kind: "String",
        desc: "Options appended to the tool invocation \"python run.py\" on the command line",
    }],
};

static INFO: BackendInfo = BackendInfo {
    id: BackendId::Vunit,
    description: "VUnit unit testing framework for VHDL and SystemVerilog",
    schema: SCHEMA,
    phases: PhaseCapabilities {
        configure: PhaseSupport::Required,
        build: PhaseSupport::Required,
        run: PhaseSupport::Required,
        extra: &[],
    },
    tools: &["python"],
};

/// VUnit tool options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VunitOptions {
    pub pre_flow_fragment: Option<String>,
    pub post_flow_fragment: Option<String>,
    pub vuargs: Vec<String>,
}

/// The VUnit backend.
#[derive(Debug, Clone)]
pub struct Vunit {
    options: VunitOptions,
}

impl Vunit {
    /// Static backend description.
    pub fn info() -> &'static BackendInfo {
        &INFO
    }

    pub fn new(options: VunitOptions) -> Self {
        Vunit { options }
    }

    /// Create a backend from the `vunit` section of a manifest.
    pub fn from_manifest(manifest: &Manifest) -> Result<Self, BackendError> {
        let raw = manifest.tool_options(BackendId::Vunit.as_str());
        Ok(Self::new(parse_options(BackendId::Vunit, &SCHEMA, &raw)?))
    }

    pub fn options(&self) -> &VunitOptions {
        &self.options
    }

    fn selectors(&self) -> Vec<Selector> {
        [
            (PRE_FLOW, &self.options.pre_flow_fragment),
            (POST_FLOW, &self.options.post_flow_fragment),
        ]
        .into_iter()
        .filter_map(|(option, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| Selector::option(option, v))
        })
        .collect()
    }

    /// Options as the template sees them, with fragments renamed to their
    /// bare file names.
    fn template_options(&self, picked: &Reclassified) -> VunitOptions {
        let rename = |option: &str| picked.for_option(option).map(|f| f.name.clone());
        VunitOptions {
            pre_flow_fragment: rename(PRE_FLOW),
            post_flow_fragment: rename(POST_FLOW),
            vuargs: self.options.vuargs.clone(),
        }
    }
}

/// Libraries used by a file set, the default library always first.
pub fn libraries(fileset: &FileSet) -> Vec<String> {
    let mut libraries = vec![DEFAULT_LIBRARY.to_string()];
    for file in fileset.iter() {
        let library = file.library_or(DEFAULT_LIBRARY);
        if !libraries.iter().any(|l| l == library) {
            libraries.push(library.to_string());
        }
    }
    libraries
}

impl FileDispatcher for Vunit {
    type Flow = ();

    fn directive_for(&self, file: &SourceFile, _flow: &()) -> DispatchResult {
        let library = file.library_or(DEFAULT_LIBRARY);
        match file.kind() {
            FileKind::VhdlSource if file.file_type.is_vhdl2008() => DispatchResult::Directive(format!(
                "vu.library(\"{}\").add_source_file(\"{}\", vhdl_standard=\"2008\")",
                library, file.name
            )),
            FileKind::VhdlSource | FileKind::VerilogSource | FileKind::SystemVerilogSource => {
                DispatchResult::Directive(format!(
                    "vu.library(\"{}\").add_source_file(\"{}\")",
                    library, file.name
                ))
            }
            FileKind::User => DispatchResult::Ignored,
            _ => DispatchResult::Unrecognized,
        }
    }
}

impl EdaBackend for Vunit {
    fn info(&self) -> &'static BackendInfo {
        &INFO
    }

    fn configure(&self, ctx: &BuildContext, fileset: &FileSet) -> Result<ConfigureResult> {
        let picked = FragmentPicker::new(&ctx.work_root).pick(fileset, &self.selectors())?;
        let renderer = TemplateRenderer::new().with_roots(picked.roots());

        let files = dispatch(self, picked.remaining.iter(), &());
        let mut warnings = picked.warnings.clone();
        warnings.extend(files.warnings.iter().cloned());

        let template_ctx = TemplateContext::new(ctx)
            .with_dispatch(files)
            .with_incdirs(&picked.remaining.include_dirs)
            .with_tool_options(&self.template_options(&picked))?
            .with_value("libraries", &libraries(&picked.remaining))?;

        let script = renderer.render_to_string("vunit/run.py.j2", &template_ctx)?;

        Ok(ConfigureResult {
            generated: write_generated(ctx, vec![(SCRIPT.to_string(), script)])?,
            warnings,
        })
    }

    fn generated_files(&self, _ctx: &BuildContext) -> Vec<String> {
        vec![SCRIPT.to_string()]
    }

    fn build_invocation(&self, ctx: &BuildContext) -> Result<Option<ToolInvocation>> {
        Ok(Some(
            ToolInvocation::new("python", &ctx.work_root).args([SCRIPT, "--compile", "-k"]),
        ))
    }

    fn run_invocation(&self, ctx: &BuildContext, args: &[String]) -> Result<Option<ToolInvocation>> {
        Ok(Some(
            ToolInvocation::new("python", &ctx.work_root)
                .arg(SCRIPT)
                .args(self.options.vuargs.iter().cloned())
                .args(args.iter().cloned()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn vunit(options: serde_json::Value) -> Vunit {
        Vunit::new(parse_options(BackendId::Vunit, &SCHEMA, &options).unwrap())
    }

    fn workspace() -> (TempDir, BuildContext) {
        let tmp = TempDir::new().unwrap();
        let tb = tmp.path().join("src").join("tb");
        std::fs::create_dir_all(&tb).unwrap();
        std::fs::write(tb.join("pre_flow.py"), "vu.enable_check_preprocessing()\n").unwrap();
        std::fs::write(tb.join("post_flow.py"), "vu.set_sim_option(\"modelsim.vsim_flags\", [])\n").unwrap();
        let ctx = BuildContext::new("fifo", "fifo_tb", tmp.path().join("build"));
        (tmp, ctx)
    }

    fn fileset() -> FileSet {
        let mut fs = FileSet::new();
        fs.push(SourceFile::new("../src/rtl/fifo.vhd", "vhdlSource-2008").with_logical_name("fifo_lib"));
        fs.push(SourceFile::new("../src/tb/fifo_tb.vhd", "vhdlSource-2008"));
        fs.push(SourceFile::new("../src/tb/pre_flow.py", "user"));
        fs.push(SourceFile::new("../src/tb/post_flow.py", "user"));
        fs.push(SourceFile::new("../src/rtl/util.sv", "systemVerilogSource").with_logical_name("util"));
        fs
    }

    #[test]
    fn test_default_library_first() {
        let mut fs = FileSet::new();
        fs.push(SourceFile::new("a.vhd", "vhdlSource").with_logical_name("lib_a"));
        fs.push(SourceFile::new("b.vhd", "vhdlSource").with_logical_name("lib_b"));
        fs.push(SourceFile::new("c.vhd", "vhdlSource").with_logical_name("lib_a"));
        assert_eq!(libraries(&fs), vec!["default_lib", "lib_a", "lib_b"]);

        fs.push(SourceFile::new("d.vhd", "vhdlSource"));
        assert_eq!(libraries(&fs), vec!["default_lib", "lib_a", "lib_b"]);
    }

    #[test]
    fn test_dispatch_table() {
        let out = dispatch(&vunit(json!({})), fileset().files.iter(), &());
        assert_eq!(
            out.directives,
            vec![
                "vu.library(\"fifo_lib\").add_source_file(\"../src/rtl/fifo.vhd\", vhdl_standard=\"2008\")",
                "vu.library(\"default_lib\").add_source_file(\"../src/tb/fifo_tb.vhd\", vhdl_standard=\"2008\")",
                "vu.library(\"util\").add_source_file(\"../src/rtl/util.sv\")",
            ]
        );
        assert_eq!(out.ignored, 2);
    }

    #[test]
    fn test_configure_with_fragments() {
        let (_tmp, ctx) = workspace();
        let backend = vunit(json!({
            "pre_flow_fragment": "pre_flow.py",
            "post_flow_fragment": "tb/post_flow",
        }));

        backend.configure(&ctx, &fileset()).unwrap();
        let script = std::fs::read_to_string(ctx.path("run.py")).unwrap();

        let default_lib = script.find("vu.add_library(\"default_lib\")").unwrap();
        let fifo_lib = script.find("vu.add_library(\"fifo_lib\")").unwrap();
        let pre = script.find("vu.enable_check_preprocessing()").unwrap();
        let source = script.find("add_source_file(\"../src/rtl/fifo.vhd\"").unwrap();
        let post = script.find("modelsim.vsim_flags").unwrap();
        let main = script.find("vu.main()").unwrap();

        assert!(default_lib < fifo_lib);
        assert!(fifo_lib < pre && pre < source && source < post && post < main);
        assert!(!script.contains("pre_flow.py"));
    }

    #[test]
    fn test_missing_fragment_writes_nothing() {
        let (_tmp, ctx) = workspace();
        let backend = vunit(json!({"pre_flow_fragment": "missing.py"}));

        let err = backend.configure(&ctx, &fileset()).unwrap_err();
        let err = err.downcast_ref::<BackendError>().unwrap();
        assert_eq!(err.to_string(), "pre_flow_fragment file not found in target filesets");
        assert!(!ctx.path("run.py").exists());
        assert!(!ctx.work_root.exists());
    }

    #[test]
    fn test_fragment_value_matching_source_keeps_it_compiled() {
        let (_tmp, ctx) = workspace();
        let backend = vunit(json!({"pre_flow_fragment": "fifo"}));
        let mut fs = FileSet::new();
        fs.push(SourceFile::new("../src/rtl/fifo.vhd", "vhdlSource"));

        let err = backend.configure(&ctx, &fs).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BackendError>(),
            Some(BackendError::MissingFragment { .. })
        ));

        fs.push(SourceFile::new("../src/tb/pre_flow.py", "user"));
        let backend = vunit(json!({"pre_flow_fragment": "f"}));
        let result = backend.configure(&ctx, &fs).unwrap();
        let script = std::fs::read_to_string(ctx.path("run.py")).unwrap();

        assert!(script.contains("add_source_file(\"../src/rtl/fifo.vhd\")"));
        assert!(script.contains("vu.enable_check_preprocessing()"));
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("../src/rtl/fifo.vhd"));
    }

    #[test]
    fn test_configure_is_idempotent() {
        let (_tmp, ctx) = workspace();
        let backend = vunit(json!({"pre_flow_fragment": "pre_flow.py"}));

        backend.configure(&ctx, &fileset()).unwrap();
        let first = std::fs::read(ctx.path("run.py")).unwrap();
        backend.configure(&ctx, &fileset()).unwrap();
        let second = std::fs::read(ctx.path("run.py")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_invocations() {
        let ctx = BuildContext::new("fifo", "fifo_tb", "/work");
        let backend = vunit(json!({"vuargs": ["--list"]}));

        let build = backend.build_invocation(&ctx).unwrap().unwrap();
        assert_eq!(build.display_command(), "python run.py --compile -k");

        let run = backend
            .run_invocation(&ctx, &["-p".to_string(), "4".to_string()])
            .unwrap()
            .unwrap();
        assert_eq!(run.display_command(), "python run.py --list -p 4");
    }
}
