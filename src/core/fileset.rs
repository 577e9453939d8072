//! Source file records and the ordered file set of a build.

use serde::{Deserialize, Serialize};

use crate::core::file_type::{FileKind, FileType};

/// A file entry as declared in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Path relative to the work root
    pub name: String,

    /// Declared file type tag
    pub file_type: String,

    /// Logical library/grouping (empty means unset)
    #[serde(default)]
    pub logical_name: String,

    /// The file is only included by other sources
    #[serde(default)]
    pub is_include_file: bool,

    /// Explicit include directory for include files
    #[serde(default)]
    pub include_path: Option<String>,
}

impl FileEntry {
    /// Create a plain source entry.
    pub fn new(name: impl Into<String>, file_type: impl Into<String>) -> Self {
        FileEntry {
            name: name.into(),
            file_type: file_type.into(),
            logical_name: String::new(),
            is_include_file: false,
            include_path: None,
        }
    }

    /// Set the logical name.
    pub fn with_logical_name(mut self, logical_name: impl Into<String>) -> Self {
        self.logical_name = logical_name.into();
        self
    }

    /// Mark as an include file.
    pub fn include_file(mut self, include_path: Option<String>) -> Self {
        self.is_include_file = true;
        self.include_path = include_path;
        self
    }
}

/// One input file of a build.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SourceFile {
    /// Path with forward-slash separators
    pub name: String,

    /// Declared type
    pub file_type: FileType,

    /// Logical library, `None` when the manifest left it empty
    pub logical_name: Option<String>,
}

impl SourceFile {
    /// Create a source file record.
    pub fn new(name: impl Into<String>, file_type: impl Into<FileType>) -> Self {
        SourceFile {
            name: force_slash(&name.into()),
            file_type: file_type.into(),
            logical_name: None,
        }
    }

    /// Set the logical name; empty strings count as unset.
    pub fn with_logical_name(mut self, logical_name: impl Into<String>) -> Self {
        let logical_name = logical_name.into();
        self.logical_name = if logical_name.is_empty() {
            None
        } else {
            Some(logical_name)
        };
        self
    }

    /// Primary kind of this file.
    pub fn kind(&self) -> &FileKind {
        self.file_type.kind()
    }

    /// Logical name, or the given default grouping.
    pub fn library_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.logical_name.as_deref().unwrap_or(default)
    }
}

/// Ordered source files plus include directories for one build.
///
/// Order is significant: tools compile in declaration order, which affects
/// library dependency resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileSet {
    /// Source files in declaration order
    pub files: Vec<SourceFile>,

    /// Include directories, first occurrence wins
    pub include_dirs: Vec<String>,
}

impl FileSet {
    /// Create an empty file set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect a file set from manifest entries.
    ///
    /// Include files contribute their directory to `include_dirs` instead of
    /// appearing as sources. All paths get forward-slash separators.
    pub fn collect(entries: &[FileEntry]) -> Self {
        let mut fileset = FileSet::new();

        for entry in entries {
            if entry.is_include_file {
                let dir = entry
                    .include_path
                    .clone()
                    .filter(|p| !p.is_empty())
                    .unwrap_or_else(|| parent_dir(&entry.name));
                fileset.add_include_dir(dir);
            } else {
                fileset.push(
                    SourceFile::new(&entry.name, entry.file_type.as_str())
                        .with_logical_name(&entry.logical_name),
                );
            }
        }

        fileset
    }

    /// Append a source file.
    pub fn push(&mut self, file: SourceFile) {
        self.files.push(file);
    }

    /// Add an include directory if not already present.
    pub fn add_include_dir(&mut self, dir: impl AsRef<str>) {
        let dir = force_slash(dir.as_ref());
        if !self.include_dirs.contains(&dir) {
            self.include_dirs.push(dir);
        }
    }

    /// Check if any file has the given primary kind.
    pub fn has_kind(&self, kind: &FileKind) -> bool {
        self.files.iter().any(|f| f.kind() == kind)
    }

    /// Check if any file is a VHDL-2008 source.
    pub fn has_vhdl2008(&self) -> bool {
        self.files.iter().any(|f| f.file_type.is_vhdl2008())
    }

    /// Number of source files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if the set has no source files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterate over source files in order.
    pub fn iter(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.iter()
    }
}

/// Replace backslash separators with forward slashes.
pub fn force_slash(path: &str) -> String {
    path.replace('\\', "/")
}

fn parent_dir(name: &str) -> String {
    let name = force_slash(name);
    match name.rfind('/') {
        Some(0) => "/".to_string(),
        Some(idx) => name[..idx].to_string(),
        None => ".".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_preserves_order() {
        let entries = vec![
            FileEntry::new("rtl/b.v", "verilogSource"),
            FileEntry::new("rtl/a.vhd", "vhdlSource").with_logical_name("lib1"),
            FileEntry::new("top.xdc", "xdc"),
        ];

        let fs = FileSet::collect(&entries);
        let names: Vec<_> = fs.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["rtl/b.v", "rtl/a.vhd", "top.xdc"]);
        assert_eq!(fs.files[1].logical_name.as_deref(), Some("lib1"));
        assert_eq!(fs.files[0].logical_name, None);
    }

    #[test]
    fn test_collect_forces_slashes() {
        let entries = vec![
            FileEntry::new("..\\src\\core.v", "verilogSource"),
            FileEntry::new("inc\\defs.vh", "verilogSource").include_file(None),
        ];

        let fs = FileSet::collect(&entries);
        assert_eq!(fs.files[0].name, "../src/core.v");
        assert_eq!(fs.include_dirs, vec!["inc"]);
    }

    #[test]
    fn test_include_dirs_deduplicated() {
        let entries = vec![
            FileEntry::new("inc/a.vh", "verilogSource").include_file(None),
            FileEntry::new("inc/b.vh", "verilogSource").include_file(None),
            FileEntry::new("c.vh", "verilogSource").include_file(None),
            FileEntry::new("x/d.vh", "verilogSource").include_file(Some("hdr".to_string())),
        ];

        let fs = FileSet::collect(&entries);
        assert!(fs.is_empty());
        assert_eq!(fs.include_dirs, vec!["inc", ".", "hdr"]);
    }

    #[test]
    fn test_has_vhdl2008() {
        let mut fs = FileSet::new();
        fs.push(SourceFile::new("a.vhd", "vhdlSource"));
        assert!(!fs.has_vhdl2008());
        fs.push(SourceFile::new("b.vhd", "vhdlSource-2008"));
        assert!(fs.has_vhdl2008());
        assert!(fs.has_kind(&FileKind::VhdlSource));
        assert!(!fs.has_kind(&FileKind::Xci));
    }

    #[test]
    fn test_library_or_default() {
        let f = SourceFile::new("a.vhd", "vhdlSource").with_logical_name("");
        assert_eq!(f.library_or("default_lib"), "default_lib");
        let f = f.with_logical_name("work2");
        assert_eq!(f.library_or("default_lib"), "work2");
    }
}
