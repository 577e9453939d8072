//! Manifest fixtures.

use crate::core::fileset::FileEntry;
use crate::core::manifest::Manifest;

/// A manifest named `fixture` with options for a single backend.
pub fn manifest_with_options(backend: &str, options: serde_json::Value) -> Manifest {
    let mut manifest = Manifest {
        name: "fixture".to_string(),
        toplevel: "fixture_top".to_string(),
        ..Default::default()
    };
    manifest.tool_options.insert(backend.to_string(), options);
    manifest
}

/// A small mixed-language design, paths relative to a `build` work root.
pub fn mixed_design() -> Manifest {
    Manifest {
        name: "mixed".to_string(),
        toplevel: "mixed_top".to_string(),
        files: vec![
            FileEntry::new("../rtl/defs.vh", "verilogSource").include_file(None),
            FileEntry::new("../rtl/core.v", "verilogSource"),
            FileEntry::new("../rtl/bus.sv", "systemVerilogSource"),
            FileEntry::new("../rtl/top.vhd", "vhdlSource-2008").with_logical_name("top_lib"),
            FileEntry::new("../rtl/pins.xdc", "xdc"),
            FileEntry::new("../doc/README.md", "user"),
        ],
        ..Default::default()
    }
}
