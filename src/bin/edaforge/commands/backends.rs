//! `edaforge backends` command
//!
//! List backends with their phases, options and tool availability.

use anyhow::Result;

use crate::cli::BackendsArgs;
use edaforge::backend::options::OptionDoc;
use edaforge::backend::registry::{get_backend_summaries, BackendRegistry};
use edaforge::backend::trait_def::{BackendAvailability, BackendInfo};

pub fn execute(args: BackendsArgs) -> Result<()> {
    let registry = BackendRegistry::new();

    println!("EDA Backends:");
    println!();

    if args.no_check {
        for id in registry.ids() {
            if let Some(info) = registry.info(id) {
                print_backend(info, None);
            }
        }
    } else {
        for summary in get_backend_summaries(&registry) {
            print_backend(summary.info, Some(&summary.availability));
        }
    }

    Ok(())
}

fn print_backend(info: &BackendInfo, availability: Option<&BackendAvailability>) {
    println!("  {} - {}", info.id, info.description);
    if let Some(availability) = availability {
        let status = match availability {
            BackendAvailability::Available { .. } => "available".to_string(),
            BackendAvailability::NotInstalled { missing } => {
                format!("not installed ({} not found)", missing.join(", "))
            }
        };
        println!("    Status:     {}", status);
    }
    println!("    Configure:  {}", info.phases.configure);
    println!("    Build:      {}", info.phases.build);
    println!("    Run:        {}", info.phases.run);
    if !info.phases.extra.is_empty() {
        println!("    Extra ops:  {}", info.phases.extra.join(", "));
    }

    let schema = &info.schema;
    if schema.flags.len() + schema.members.len() + schema.lists.len() > 0 {
        println!("    Options:");
        print_options("flag", schema.flags);
        print_options("member", schema.members);
        print_options("list", schema.lists);
    }
    println!();
}

fn print_options(category: &str, docs: &[OptionDoc]) {
    for doc in docs {
        println!("      {:<22} {:<7} {}  {}", doc.name, doc.kind, category, doc.desc);
    }
}
