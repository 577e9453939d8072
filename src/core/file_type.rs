//! Declared file types.
//!
//! A manifest declares each file's type as a tag string such as
//! `verilogSource` or `vhdlSource-2008`. The part before the first `-` is the
//! primary component that backends dispatch on; anything after it is a
//! variant (usually a language revision).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Primary kind of a source file, independent of its revision suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Verilog source (`verilogSource`)
    VerilogSource,
    /// SystemVerilog source (`systemVerilogSource`)
    SystemVerilogSource,
    /// VHDL source (`vhdlSource`)
    VhdlSource,
    /// Tcl script sourced by the tool (`tclSource`)
    TclSource,
    /// Xilinx IP core description (`xci`)
    Xci,
    /// Xilinx design constraints (`xdc`)
    Xdc,
    /// User file carried along but never compiled (`user`)
    User,
    /// Static-analysis waiver file (`waiver`)
    Waiver,
    /// Any tag outside the known vocabulary
    Other(String),
}

impl FileKind {
    /// Get the canonical tag for this kind.
    pub fn as_str(&self) -> &str {
        match self {
            FileKind::VerilogSource => "verilogSource",
            FileKind::SystemVerilogSource => "systemVerilogSource",
            FileKind::VhdlSource => "vhdlSource",
            FileKind::TclSource => "tclSource",
            FileKind::Xci => "xci",
            FileKind::Xdc => "xdc",
            FileKind::User => "user",
            FileKind::Waiver => "waiver",
            FileKind::Other(tag) => tag,
        }
    }

    fn from_primary(primary: &str) -> Self {
        match primary {
            "verilogSource" => FileKind::VerilogSource,
            "systemVerilogSource" => FileKind::SystemVerilogSource,
            "vhdlSource" => FileKind::VhdlSource,
            "tclSource" => FileKind::TclSource,
            "xci" => FileKind::Xci,
            "xdc" => FileKind::Xdc,
            "user" => FileKind::User,
            "waiver" => FileKind::Waiver,
            other => FileKind::Other(other.to_string()),
        }
    }

    /// Check if this is an HDL source kind.
    pub fn is_hdl(&self) -> bool {
        matches!(
            self,
            FileKind::VerilogSource | FileKind::SystemVerilogSource | FileKind::VhdlSource
        )
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declared file type: the raw tag plus its parsed primary kind and variant.
///
/// Serializes back to the raw tag so generated scripts and templates see
/// exactly what the manifest declared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct FileType {
    raw: String,
    kind: FileKind,
    variant: Option<String>,
}

impl FileType {
    /// Parse a file type tag.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let (primary, variant) = match raw.split_once('-') {
            Some((primary, rest)) => (primary, Some(rest.to_string())),
            None => (raw.as_str(), None),
        };
        FileType {
            kind: FileKind::from_primary(primary),
            variant,
            raw,
        }
    }

    /// The tag exactly as declared.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The primary kind used as the dispatch key.
    pub fn kind(&self) -> &FileKind {
        &self.kind
    }

    /// The variant suffix, e.g. `2008` for `vhdlSource-2008`.
    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }

    /// Check for a VHDL-2008 source.
    pub fn is_vhdl2008(&self) -> bool {
        self.kind == FileKind::VhdlSource && self.variant() == Some("2008")
    }
}

impl From<String> for FileType {
    fn from(raw: String) -> Self {
        FileType::new(raw)
    }
}

impl From<&str> for FileType {
    fn from(raw: &str) -> Self {
        FileType::new(raw)
    }
}

impl From<FileType> for String {
    fn from(ft: FileType) -> Self {
        ft.raw
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
