//! edaforge CLI - script generation and tool invocation for EDA flows

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("edaforge=debug")
    } else {
        EnvFilter::new("edaforge=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        Commands::Configure(args) => commands::configure::execute(args),
        Commands::Build(args) => commands::build::execute(args),
        Commands::Run(args) => commands::run::execute(args),
        Commands::Op(args) => commands::op::execute(args),
        Commands::Backends(args) => commands::backends::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
