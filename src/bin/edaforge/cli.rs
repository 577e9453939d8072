//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use edaforge::backend::BackendId;

/// edaforge - generate EDA tool scripts and drive the tools
#[derive(Parser)]
#[command(name = "edaforge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate the backend's scripts into the work root
    Configure(ConfigureArgs),

    /// Run the compile-only step
    Build(BuildArgs),

    /// Run the tool, passing extra arguments through
    Run(RunArgs),

    /// Run a backend-specific operation (e.g. `program`)
    Op(OpArgs),

    /// List backends, their options and tool availability
    Backends(BackendsArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Flags shared by every phase command.
#[derive(Args, Clone)]
pub struct SessionArgs {
    /// Path to the design manifest [default: edaforge.toml]
    #[arg(long, env = "EDAFORGE_MANIFEST")]
    pub manifest: Option<PathBuf>,

    /// Backend to use
    #[arg(long, short = 't')]
    pub tool: Option<BackendId>,

    /// Directory the generated scripts are written to [default: build]
    #[arg(long)]
    pub work_root: Option<PathBuf>,
}

#[derive(Args)]
pub struct ConfigureArgs {
    #[command(flatten)]
    pub session: SessionArgs,
}

#[derive(Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub session: SessionArgs,
}

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Arguments passed to the tool
    #[arg(last = true)]
    pub args: Vec<String>,
}

#[derive(Args)]
pub struct OpArgs {
    /// Operation name
    pub name: String,

    #[command(flatten)]
    pub session: SessionArgs,
}

#[derive(Args)]
pub struct BackendsArgs {
    /// Skip the PATH lookup for each backend's tools
    #[arg(long)]
    pub no_check: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
