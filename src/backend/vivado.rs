//! Xilinx Vivado backend.
//!
//! Configure writes a project script, a run script and a Makefile that ties
//! them together. With `synth = "yosys"` the RTL is synthesized by Yosys into
//! an EDIF netlist that Vivado reads instead of the HDL sources. When
//! `hw_device` is set a programming script is written as well; it is only
//! consumed by the run phase.
//!
//! ```toml
//! [tool_options.vivado]
//! part = "xc7a35tcsg324-1"
//! hw_device = "xc7a35t_0"
//! synth = "yosys"
//! yosys_synth_options = ["-flatten"]
//! ```

use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::backend::capabilities::{BackendId, PhaseCapabilities, PhaseSupport};
use crate::backend::context::{BuildContext, TemplateContext};
use crate::backend::dispatch::{dispatch, DispatchResult, FileDispatcher};
use crate::backend::error::BackendError;
use crate::backend::options::{parse_options, OptionDoc, OptionSchema};
use crate::backend::renderer::TemplateRenderer;
use crate::backend::trait_def::{
    unsupported, write_generated, BackendInfo, ConfigureResult, EdaBackend,
};
use crate::core::file_type::FileKind;
use crate::core::fileset::{FileSet, SourceFile};
use crate::core::manifest::Manifest;
use crate::core::parameter::{select, ParamType, ParamValue, Parameters};
use crate::util::process::ToolInvocation;

const SCHEMA: OptionSchema = OptionSchema {
    flags: &[],
    members: &[
        OptionDoc {
            name: "part",
            kind: "String",
            desc: "FPGA part number (e.g. xc7a35tcsg324-1)",
        },
        OptionDoc {
            name: "synth",
            kind: "String",
            desc: "Synthesis tool. Allowed values are vivado (default) and yosys.",
        },
        OptionDoc {
            name: "hw_device",
            kind: "String",
            desc: "Board device name used when programming (e.g. xc7a35t_0)",
        },
    ],
    lists: &[OptionDoc {
        name: "yosys_synth_options",
        kind: "String",
        desc: "Additional options for the synth_xilinx command in the yosys flow",
    }],
};

static INFO: BackendInfo = BackendInfo {
    id: BackendId::Vivado,
    description: "Xilinx Vivado FPGA implementation, bitstream generation and programming",
    schema: SCHEMA,
    phases: PhaseCapabilities {
        configure: PhaseSupport::Required,
        build: PhaseSupport::Required,
        run: PhaseSupport::Optional,
        extra: &["program", "build-gui"],
    },
    tools: &["vivado", "make"],
};

/// Synthesis flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SynthFlow {
    /// Vivado synthesizes the HDL sources
    #[default]
    Vivado,
    /// Yosys produces an EDIF netlist that Vivado implements
    Yosys,
}

/// Vivado tool options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VivadoOptions {
    pub part: Option<String>,
    pub synth: SynthFlow,
    pub hw_device: Option<String>,
    pub yosys_synth_options: Vec<String>,
}

/// The Vivado backend.
#[derive(Debug, Clone)]
pub struct Vivado {
    options: VivadoOptions,
    vlogparam: BTreeMap<String, ParamValue>,
    vlogdefine: BTreeMap<String, ParamValue>,
}

impl Vivado {
    /// Static backend description.
    pub fn info() -> &'static BackendInfo {
        &INFO
    }

    /// Create a backend from validated options.
    pub fn new(options: VivadoOptions, parameters: &Parameters) -> Self {
        Vivado {
            options,
            vlogparam: select(parameters, ParamType::Vlogparam),
            vlogdefine: select(parameters, ParamType::Vlogdefine),
        }
    }

    /// Create a backend from the `vivado` section of a manifest.
    pub fn from_manifest(manifest: &Manifest) -> Result<Self, BackendError> {
        let raw = manifest.tool_options(BackendId::Vivado.as_str());
        let options = parse_options(BackendId::Vivado, &SCHEMA, &raw)?;
        Ok(Self::new(options, &manifest.parameters))
    }

    /// Resolved options.
    pub fn options(&self) -> &VivadoOptions {
        &self.options
    }

    fn program_script(&self, ctx: &BuildContext) -> String {
        ctx.file_name("_pgm.tcl")
    }

    fn program_invocation(&self, ctx: &BuildContext, operation: &str, args: &[String]) -> Result<ToolInvocation> {
        if self.options.hw_device.is_none() {
            return Err(BackendError::MissingOption {
                backend: BackendId::Vivado,
                option: "hw_device".to_string(),
                operation: operation.to_string(),
            }
            .into());
        }

        let mut invocation = ToolInvocation::new("vivado", &ctx.work_root).args([
            "-mode".to_string(),
            "batch".to_string(),
            "-source".to_string(),
            self.program_script(ctx),
        ]);
        if !args.is_empty() {
            invocation = invocation.arg("-tclargs").args(args.iter().cloned());
        }
        Ok(invocation)
    }

    /// Render every generated file without touching the disk.
    fn render_all(&self, ctx: &BuildContext, fileset: &FileSet) -> Result<(Vec<(String, String)>, Vec<String>)> {
        let flow = self.options.synth;
        let mut files = dispatch(self, fileset.iter(), &flow);
        if flow == SynthFlow::Yosys {
            files.push_synthetic(format!("read_edif {}.edif", ctx.toplevel));
            files.push_synthetic("set_property design_mode GateLvl [current_fileset]");
        }
        let warnings = files.warnings.clone();

        let render_params = |params: &BTreeMap<String, ParamValue>| -> BTreeMap<String, String> {
            params
                .iter()
                .map(|(k, v)| (k.clone(), v.to_script_string("")))
                .collect()
        };

        let project = TemplateContext::new(ctx)
            .with_dispatch(files)
            .with_incdirs(&fileset.include_dirs)
            .with_tool_options(&self.options)?
            .with_flag("has_vhdl2008", fileset.has_vhdl2008())
            .with_flag("has_xci", fileset.has_kind(&FileKind::Xci))
            .with_value("vlogparam", &render_params(&self.vlogparam))?
            .with_value("vlogdefine", &render_params(&self.vlogdefine))?;

        let renderer = TemplateRenderer::new();
        let mut outputs = vec![
            (
                ctx.file_name(".tcl"),
                renderer.render_to_string("vivado/vivado-project.tcl.j2", &project)?,
            ),
            (
                "Makefile".to_string(),
                makefile(&ctx.name, flow == SynthFlow::Yosys),
            ),
            (
                ctx.file_name("_run.tcl"),
                renderer.render_to_string("vivado/vivado-run.tcl.j2", &project)?,
            ),
        ];

        if flow == SynthFlow::Yosys {
            outputs.push((ctx.file_name(".ys"), self.yosys_script(ctx, fileset)));
        }

        if let Some(hw_device) = &self.options.hw_device {
            let program = TemplateContext::new(ctx)
                .with_value("bitstream_name", &ctx.file_name(".bit"))?
                .with_value("hw_device", hw_device)?;
            outputs.push((
                self.program_script(ctx),
                renderer.render_to_string("vivado/vivado-program.tcl.j2", &program)?,
            ));
        }

        Ok((outputs, warnings))
    }

    /// Yosys script producing `<toplevel>.edif` from the Verilog sources.
    fn yosys_script(&self, ctx: &BuildContext, fileset: &FileSet) -> String {
        let mut script = String::new();

        for (key, value) in &self.vlogdefine {
            script.push_str(&format!(
                "verilog_defines -D{}={}\n",
                key,
                value.to_script_string("")
            ));
        }

        script.push_str("verilog_defaults -push\n");
        script.push_str("verilog_defaults -add -defer\n");
        if !fileset.include_dirs.is_empty() {
            let incdirs: Vec<String> = fileset
                .include_dirs
                .iter()
                .map(|d| format!("-I{}", d))
                .collect();
            script.push_str(&format!("verilog_defaults -add {}\n", incdirs.join(" ")));
        }

        for file in fileset.iter() {
            if file.kind() == &FileKind::VerilogSource {
                script.push_str(&format!("read_verilog {}\n", file.name));
            }
        }

        for (key, value) in &self.vlogparam {
            script.push_str(&format!(
                "chparam -set {} {} $abstract\\{}\n",
                key,
                value.to_script_string("\""),
                ctx.toplevel
            ));
        }

        script.push_str("verilog_defaults -pop\n");
        script.push_str("synth_xilinx");
        for option in &self.options.yosys_synth_options {
            script.push(' ');
            script.push_str(option);
        }
        script.push_str(&format!(" -edif {}.edif", ctx.toplevel));
        if !ctx.toplevel.is_empty() {
            script.push_str(&format!(" -top {}", ctx.toplevel));
        }
        script.push('\n');
        script.push_str(&format!("write_json {}.json\n", ctx.name));

        script
    }
}

impl FileDispatcher for Vivado {
    type Flow = SynthFlow;

    fn directive_for(&self, file: &SourceFile, flow: &SynthFlow) -> DispatchResult {
        let command = match (file.kind(), flow) {
            (FileKind::Xci, _) => "read_ip".to_string(),
            (FileKind::Xdc, _) => "read_xdc".to_string(),
            (FileKind::TclSource, _) => "source".to_string(),
            (FileKind::User, _) => return DispatchResult::Ignored,
            (FileKind::VerilogSource, SynthFlow::Vivado) => "read_verilog".to_string(),
            (FileKind::SystemVerilogSource, SynthFlow::Vivado) => "read_verilog -sv".to_string(),
            (FileKind::VhdlSource, SynthFlow::Vivado) => {
                let mut command = "read_vhdl".to_string();
                if file.file_type.is_vhdl2008() {
                    command.push_str(" -vhdl2008");
                }
                if let Some(library) = &file.logical_name {
                    command.push_str(" -library ");
                    command.push_str(library);
                }
                command
            }
            (FileKind::VerilogSource | FileKind::SystemVerilogSource, SynthFlow::Yosys) => {
                return DispatchResult::Ignored
            }
            _ => return DispatchResult::Unrecognized,
        };

        DispatchResult::Directive(format!("{} {}", command, file.name))
    }
}

impl EdaBackend for Vivado {
    fn info(&self) -> &'static BackendInfo {
        &INFO
    }

    fn configure(&self, ctx: &BuildContext, fileset: &FileSet) -> Result<ConfigureResult> {
        let (outputs, warnings) = self.render_all(ctx, fileset)?;
        Ok(ConfigureResult {
            generated: write_generated(ctx, outputs)?,
            warnings,
        })
    }

    fn generated_files(&self, ctx: &BuildContext) -> Vec<String> {
        let mut files = vec![
            ctx.file_name(".tcl"),
            "Makefile".to_string(),
            ctx.file_name("_run.tcl"),
        ];
        if self.options.synth == SynthFlow::Yosys {
            files.push(ctx.file_name(".ys"));
        }
        if self.options.hw_device.is_some() {
            files.push(self.program_script(ctx));
        }
        files
    }

    fn build_invocation(&self, ctx: &BuildContext) -> Result<Option<ToolInvocation>> {
        Ok(Some(ToolInvocation::new("make", &ctx.work_root)))
    }

    fn run_invocation(&self, ctx: &BuildContext, args: &[String]) -> Result<Option<ToolInvocation>> {
        self.program_invocation(ctx, "run", args).map(Some)
    }

    fn extra_invocation(&self, op: &str, ctx: &BuildContext) -> Result<ToolInvocation> {
        match op {
            "program" => self.program_invocation(ctx, op, &[]),
            "build-gui" => Ok(ToolInvocation::new("make", &ctx.work_root).arg("build-gui")),
            _ => Err(unsupported(&INFO, op).into()),
        }
    }
}

/// Makefile sequencing project creation, implementation and, in the yosys
/// flow, netlist synthesis.
pub fn makefile(name: &str, yosys: bool) -> String {
    let edif = if yosys { " $(NAME).edif" } else { "" };
    [
        format!("NAME := {}", name),
        String::new(),
        "all: $(NAME).bit".to_string(),
        String::new(),
        "$(NAME).bit:  $(NAME)_run.tcl $(NAME).xpr".to_string(),
        "\tvivado -mode batch -source $^".to_string(),
        String::new(),
        format!("$(NAME).xpr: $(NAME).tcl{}", edif),
        "\tvivado -mode batch -source $<".to_string(),
        String::new(),
        "%.edif: %.ys".to_string(),
        "\tyosys -q -s $?".to_string(),
        String::new(),
        "build-gui: $(NAME).xpr".to_string(),
        "\tvivado $<".to_string(),
        String::new(),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::dispatch::Dispatch;
    use crate::core::parameter::{ParamDataType, Parameter};
    use serde_json::json;
    use tempfile::TempDir;

    fn vivado(options: serde_json::Value) -> Vivado {
        let options = parse_options(BackendId::Vivado, &SCHEMA, &options).unwrap();
        Vivado::new(options, &Parameters::new())
    }

    fn fileset() -> FileSet {
        let mut fs = FileSet::new();
        fs.push(SourceFile::new("rtl/core.v", "verilogSource"));
        fs.push(SourceFile::new("rtl/pkg.sv", "systemVerilogSource"));
        fs.push(SourceFile::new("rtl/top.vhd", "vhdlSource-2008").with_logical_name("top_lib"));
        fs.push(SourceFile::new("rtl/old.vhd", "vhdlSource"));
        fs.push(SourceFile::new("ip/clk.xci", "xci"));
        fs.push(SourceFile::new("pins.xdc", "xdc"));
        fs.push(SourceFile::new("setup.tcl", "tclSource"));
        fs.push(SourceFile::new("README", "user"));
        fs
    }

    fn run_dispatch(backend: &Vivado) -> Dispatch {
        dispatch(backend, &fileset().files, &backend.options.synth)
    }

    #[test]
    fn test_vivado_flow_directives() {
        let out = run_dispatch(&vivado(json!({})));
        assert_eq!(
            out.directives,
            vec![
                "read_verilog rtl/core.v",
                "read_verilog -sv rtl/pkg.sv",
                "read_vhdl -vhdl2008 -library top_lib rtl/top.vhd",
                "read_vhdl rtl/old.vhd",
                "read_ip ip/clk.xci",
                "read_xdc pins.xdc",
                "source setup.tcl",
            ]
        );
        assert_eq!(out.ignored, 1);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_yosys_flow_directives() {
        let out = run_dispatch(&vivado(json!({"synth": "yosys"})));
        assert_eq!(
            out.directives,
            vec!["read_ip ip/clk.xci", "read_xdc pins.xdc", "source setup.tcl"]
        );
        // verilog, systemverilog and user
        assert_eq!(out.ignored, 3);
        // vhdl has no meaning to yosys
        assert_eq!(out.warnings.len(), 2);
    }

    #[test]
    fn test_invalid_synth_value() {
        let err = parse_options::<VivadoOptions>(BackendId::Vivado, &SCHEMA, &json!({"synth": "quartus"}))
            .unwrap_err();
        assert!(matches!(err, BackendError::InvalidOptions { .. }));
    }

    #[test]
    fn test_configure_writes_files() {
        let tmp = TempDir::new().unwrap();
        let ctx = BuildContext::new("blinky", "blinky_top", tmp.path());
        let backend = vivado(json!({"part": "xc7a35tcsg324-1"}));

        let result = backend.configure(&ctx, &fileset()).unwrap();
        assert_eq!(result.generated.len(), 3);

        let project = std::fs::read_to_string(tmp.path().join("blinky.tcl")).unwrap();
        assert!(project.contains("create_project blinky -force"));
        assert!(project.contains("set_property part xc7a35tcsg324-1 [current_project]"));
        assert!(project.contains("set_param project.enableVHDL2008 1"));
        assert!(project.contains("read_vhdl -vhdl2008 -library top_lib rtl/top.vhd\n"));
        assert!(project.contains("set_property top blinky_top [current_fileset]"));
        assert!(project.contains("upgrade_ip [get_ips]"));

        let makefile = std::fs::read_to_string(tmp.path().join("Makefile")).unwrap();
        assert!(makefile.starts_with("NAME := blinky\n"));
        assert!(makefile.contains("$(NAME).xpr: $(NAME).tcl\n"));

        assert!(tmp.path().join("blinky_run.tcl").exists());
        assert!(!tmp.path().join("blinky_pgm.tcl").exists());
    }

    #[test]
    fn test_configure_directive_order_in_script() {
        let tmp = TempDir::new().unwrap();
        let ctx = BuildContext::new("blinky", "top", tmp.path());
        vivado(json!({})).configure(&ctx, &fileset()).unwrap();

        let project = std::fs::read_to_string(tmp.path().join("blinky.tcl")).unwrap();
        let core = project.find("read_verilog rtl/core.v").unwrap();
        let vhdl = project.find("read_vhdl rtl/old.vhd").unwrap();
        let xdc = project.find("read_xdc pins.xdc").unwrap();
        assert!(core < vhdl && vhdl < xdc);
    }

    #[test]
    fn test_configure_yosys_flow() {
        let tmp = TempDir::new().unwrap();
        let ctx = BuildContext::new("blinky", "top", tmp.path());
        let mut params = Parameters::new();
        params.insert(
            "WIDTH".to_string(),
            Parameter {
                datatype: ParamDataType::Int,
                default: Some(ParamValue::Int(8)),
                paramtype: ParamType::Vlogparam,
                description: String::new(),
            },
        );
        params.insert(
            "SIM".to_string(),
            Parameter {
                datatype: ParamDataType::Bool,
                default: Some(ParamValue::Bool(true)),
                paramtype: ParamType::Vlogdefine,
                description: String::new(),
            },
        );
        let options = parse_options(
            BackendId::Vivado,
            &SCHEMA,
            &json!({"synth": "yosys", "yosys_synth_options": ["-flatten"]}),
        )
        .unwrap();
        let backend = Vivado::new(options, &params);

        let mut fs = fileset();
        fs.add_include_dir("inc");
        backend.configure(&ctx, &fs).unwrap();

        let project = std::fs::read_to_string(tmp.path().join("blinky.tcl")).unwrap();
        assert_eq!(project.matches("read_edif").count(), 1);
        assert!(project.contains("read_edif top.edif\n"));
        assert!(project.contains("set_property design_mode GateLvl [current_fileset]"));
        assert!(!project.contains("read_verilog"));
        assert!(project.contains("set_property generic {WIDTH=8 } [get_filesets sources_1]"));

        let makefile = std::fs::read_to_string(tmp.path().join("Makefile")).unwrap();
        assert!(makefile.contains("$(NAME).xpr: $(NAME).tcl $(NAME).edif\n"));

        let ys = std::fs::read_to_string(tmp.path().join("blinky.ys")).unwrap();
        assert_eq!(
            ys,
            "verilog_defines -DSIM=1\n\
             verilog_defaults -push\n\
             verilog_defaults -add -defer\n\
             verilog_defaults -add -Iinc\n\
             read_verilog rtl/core.v\n\
             chparam -set WIDTH 8 $abstract\\top\n\
             verilog_defaults -pop\n\
             synth_xilinx -flatten -edif top.edif -top top\n\
             write_json blinky.json\n"
        );
    }

    #[test]
    fn test_configure_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let ctx = BuildContext::new("blinky", "top", tmp.path());
        let backend = vivado(json!({"hw_device": "xc7a35t_0", "synth": "yosys"}));

        backend.configure(&ctx, &fileset()).unwrap();
        let first: Vec<_> = backend
            .generated_files(&ctx)
            .iter()
            .map(|f| std::fs::read(ctx.path(f)).unwrap())
            .collect();

        backend.configure(&ctx, &fileset()).unwrap();
        let second: Vec<_> = backend
            .generated_files(&ctx)
            .iter()
            .map(|f| std::fs::read(ctx.path(f)).unwrap())
            .collect();

        assert_eq!(first.len(), 5);
        assert_eq!(first, second);
    }

    #[test]
    fn test_program_script() {
        let tmp = TempDir::new().unwrap();
        let ctx = BuildContext::new("blinky", "top", tmp.path());
        let backend = vivado(json!({"hw_device": "xc7a35t_0"}));
        backend.configure(&ctx, &fileset()).unwrap();

        let pgm = std::fs::read_to_string(tmp.path().join("blinky_pgm.tcl")).unwrap();
        assert!(pgm.contains("xc7a35t_0"));
        assert!(pgm.contains("set_property PROGRAM.FILE \"blinky.bit\""));

        let run = backend.run_invocation(&ctx, &[]).unwrap().unwrap();
        assert_eq!(run.display_command(), "vivado -mode batch -source blinky_pgm.tcl");
        assert_eq!(run.cwd, tmp.path());
    }

    #[test]
    fn test_run_requires_hw_device() {
        let ctx = BuildContext::new("blinky", "top", "/work");
        let err = vivado(json!({})).run_invocation(&ctx, &[]).unwrap_err();
        let err = err.downcast_ref::<BackendError>().unwrap();
        assert!(matches!(err, BackendError::MissingOption { option, .. } if option == "hw_device"));
    }

    #[test]
    fn test_build_and_extra_invocations() {
        let ctx = BuildContext::new("blinky", "top", "/work");
        let backend = vivado(json!({"hw_device": "xc7a35t_0"}));

        let build = backend.build_invocation(&ctx).unwrap().unwrap();
        assert_eq!(build.display_command(), "make");

        let gui = backend.extra_invocation("build-gui", &ctx).unwrap();
        assert_eq!(gui.display_command(), "make build-gui");

        let program = backend.extra_invocation("program", &ctx).unwrap();
        assert_eq!(program.program, "vivado");

        let err = backend.extra_invocation("erase", &ctx).unwrap_err();
        assert!(err.to_string().contains("program, build-gui"));
    }

    #[test]
    fn test_run_depends_on_hw_device() {
        let phases = &Vivado::info().phases;
        assert_eq!(phases.run, PhaseSupport::Optional);
        assert!(phases.run.is_supported());
    }
}
