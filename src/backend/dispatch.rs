//! File-type dispatch.
//!
//! Each backend maps a source file to one tool directive through its own
//! dispatch table. The active flow may change which kinds are recognized or
//! ignored. Unrecognized kinds are a soft failure: the file is dropped with a
//! warning and the build continues.

use crate::core::fileset::SourceFile;

/// Outcome of classifying one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchResult {
    /// Tool command fragment for the file
    Directive(String),
    /// Known kind that the active flow deliberately skips
    Ignored,
    /// Kind the backend does not know
    Unrecognized,
}

/// Per-backend file-type dispatch table.
pub trait FileDispatcher {
    /// Flow context the table depends on.
    type Flow;

    /// Classify one file under the given flow.
    fn directive_for(&self, file: &SourceFile, flow: &Self::Flow) -> DispatchResult;
}

/// Ordered directives produced for a file set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dispatch {
    /// Directives in file declaration order, then synthetic directives
    pub directives: Vec<String>,

    /// Number of files skipped on purpose
    pub ignored: usize,

    /// Number of directives not derived from any file
    pub synthetic: usize,

    /// One message per unrecognized file
    pub warnings: Vec<String>,
}

impl Dispatch {
    /// Append a directive not derived from any source file.
    pub fn push_synthetic(&mut self, directive: impl Into<String>) {
        self.directives.push(directive.into());
        self.synthetic += 1;
    }

    /// Number of directives derived from source files.
    pub fn file_directives(&self) -> usize {
        self.directives.len() - self.synthetic
    }
}

/// Run a dispatch table over files, preserving declaration order.
pub fn dispatch<'a, D, I>(dispatcher: &D, files: I, flow: &D::Flow) -> Dispatch
where
    D: FileDispatcher + ?Sized,
    I: IntoIterator<Item = &'a SourceFile>,
{
    let mut out = Dispatch::default();

    for file in files {
        match dispatcher.directive_for(file, flow) {
            DispatchResult::Directive(directive) => out.directives.push(directive),
            DispatchResult::Ignored => out.ignored += 1,
            DispatchResult::Unrecognized => {
                let message = format!("{} has unknown file type '{}'", file.name, file.file_type);
                tracing::warn!("{}", message);
                out.warnings.push(message);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::file_type::FileKind;

    struct Table;

    impl FileDispatcher for Table {
        type Flow = bool;

        fn directive_for(&self, file: &SourceFile, skip_verilog: &bool) -> DispatchResult {
            match file.kind() {
                FileKind::VerilogSource if *skip_verilog => DispatchResult::Ignored,
                FileKind::VerilogSource => DispatchResult::Directive(format!("read {}", file.name)),
                FileKind::User => DispatchResult::Ignored,
                _ => DispatchResult::Unrecognized,
            }
        }
    }

    fn files() -> Vec<SourceFile> {
        vec![
            SourceFile::new("a.v", "verilogSource"),
            SourceFile::new("notes.txt", "user"),
            SourceFile::new("b.v", "verilogSource-2005"),
            SourceFile::new("x.foo", "unknown_type"),
        ]
    }

    #[test]
    fn test_order_and_counts() {
        let files = files();
        let out = dispatch(&Table, &files, &false);
        assert_eq!(out.directives, vec!["read a.v", "read b.v"]);
        assert_eq!(out.ignored, 1);
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0], "x.foo has unknown file type 'unknown_type'");
    }

    #[test]
    fn test_flow_changes_ignored() {
        let files = files();
        let out = dispatch(&Table, &files, &true);
        assert!(out.directives.is_empty());
        assert_eq!(out.ignored, 3);
    }

    #[test]
    fn test_unknown_only() {
        let files = vec![SourceFile::new("x.foo", "unknown_type")];
        let out = dispatch(&Table, &files, &false);
        assert!(out.directives.is_empty());
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_synthetic_directives() {
        let files = files();
        let mut out = dispatch(&Table, &files, &false);
        out.push_synthetic("read_edif top.edif");
        assert_eq!(out.directives.len(), 3);
        assert_eq!(out.file_directives(), 2);
        assert_eq!(out.directives.last().unwrap(), "read_edif top.edif");
    }
}
