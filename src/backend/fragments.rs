//! Reclassification of non-compiled files out of the main file set.
//!
//! Waiver files and script fragments are declared alongside the sources but
//! are consumed by templates through an include, not compiled. The picker
//! selects them, resolves their location, and returns the remaining file set
//! separately. The selection is computed against the untouched input first
//! and the remainder is derived by set difference afterwards.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::backend::error::BackendError;
use crate::core::file_type::FileKind;
use crate::core::fileset::{FileSet, SourceFile};
use crate::util::fs::resolve_path;

/// How a fragment is selected from the file set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Every file of this kind (zero matches is fine)
    Kind(FileKind),

    /// First non-HDL file whose name contains `value`; the option is
    /// required to match
    Option { option: String, value: String },
}

impl Selector {
    /// Select by file kind.
    pub fn kind(kind: FileKind) -> Self {
        Selector::Kind(kind)
    }

    /// Select by the value of a declared option.
    pub fn option(option: impl Into<String>, value: impl Into<String>) -> Self {
        Selector::Option {
            option: option.into(),
            value: value.into(),
        }
    }
}

/// A file pulled out of the file set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fragment {
    /// Option that selected the file, if any
    pub option: Option<String>,

    /// Bare file name, valid relative to `root`
    pub name: String,

    /// Absolute location of the file
    #[serde(skip)]
    pub path: PathBuf,

    /// Directory registered as template lookup root
    #[serde(skip)]
    pub root: PathBuf,

    /// The record as it appeared in the file set
    #[serde(skip)]
    pub source: SourceFile,
}

/// Picked fragments plus the file set that remains for dispatch.
#[derive(Debug, Clone, Default)]
pub struct Reclassified {
    pub fragments: Vec<Fragment>,
    pub remaining: FileSet,
    /// HDL sources an option value matched but that stay compiled
    pub warnings: Vec<String>,
}

impl Reclassified {
    /// Lookup roots of all fragments, in pick order without duplicates.
    pub fn roots(&self) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = Vec::new();
        for fragment in &self.fragments {
            if !roots.contains(&fragment.root) {
                roots.push(fragment.root.clone());
            }
        }
        roots
    }

    /// Fragment selected by a given option.
    pub fn for_option(&self, option: &str) -> Option<&Fragment> {
        self.fragments
            .iter()
            .find(|f| f.option.as_deref() == Some(option))
    }
}

/// Picks fragment files relative to a work root.
#[derive(Debug, Clone, Copy)]
pub struct FragmentPicker<'a> {
    work_root: &'a Path,
}

impl<'a> FragmentPicker<'a> {
    pub fn new(work_root: &'a Path) -> Self {
        FragmentPicker { work_root }
    }

    /// Apply all selectors to `fileset`.
    ///
    /// Fails with [`BackendError::MissingFragment`] for the first option
    /// selector that matches no file, and with
    /// [`BackendError::AmbiguousFragment`] when two different files would be
    /// included under the same bare name. Nothing is resolved on disk beyond
    /// canonicalizing paths, so a failure leaves no trace.
    pub fn pick(&self, fileset: &FileSet, selectors: &[Selector]) -> Result<Reclassified, BackendError> {
        let mut picked: Vec<(usize, Option<String>)> = Vec::new();
        let mut warnings = Vec::new();

        for selector in selectors {
            match selector {
                Selector::Kind(kind) => {
                    picked.extend(
                        fileset
                            .iter()
                            .enumerate()
                            .filter(|(_, f)| f.kind() == kind)
                            .map(|(idx, _)| (idx, None)),
                    );
                }
                Selector::Option { option, value } => {
                    let named = |f: &SourceFile| f.name.contains(value.as_str());

                    // Sources stay compiled even when their name matches.
                    for file in fileset.iter().filter(|f| f.kind().is_hdl() && named(*f)) {
                        let message = format!(
                            "{} `{}` matches HDL source {}, which is not used as a fragment",
                            option, value, file.name
                        );
                        tracing::warn!("{}", message);
                        warnings.push(message);
                    }

                    let idx = fileset
                        .iter()
                        .position(|f| !f.kind().is_hdl() && named(f))
                        .ok_or_else(|| BackendError::MissingFragment {
                            option: option.clone(),
                        })?;
                    picked.push((idx, Some(option.clone())));
                }
            }
        }

        let fragments: Vec<Fragment> = picked
            .iter()
            .map(|(idx, option)| self.resolve(&fileset.files[*idx], option.clone()))
            .collect();
        check_unique_names(&fragments)?;

        let taken: BTreeSet<usize> = picked.iter().map(|(idx, _)| *idx).collect();
        let remaining = FileSet {
            files: fileset
                .iter()
                .enumerate()
                .filter(|(idx, _)| !taken.contains(idx))
                .map(|(_, f)| f.clone())
                .collect(),
            include_dirs: fileset.include_dirs.clone(),
        };

        Ok(Reclassified {
            fragments,
            remaining,
            warnings,
        })
    }

    fn resolve(&self, source: &SourceFile, option: Option<String>) -> Fragment {
        let path = resolve_path(self.work_root, Path::new(&source.name));
        let root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.work_root.to_path_buf());
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| source.name.clone());

        tracing::debug!("fragment {} found in {}", name, root.display());

        Fragment {
            option,
            name,
            path,
            root,
            source: source.clone(),
        }
    }
}

/// Fragments are included by bare name, so one name must map to one file.
fn check_unique_names(fragments: &[Fragment]) -> Result<(), BackendError> {
    for (i, fragment) in fragments.iter().enumerate() {
        if let Some(other) = fragments[..i]
            .iter()
            .find(|f| f.name == fragment.name && f.path != fragment.path)
        {
            return Err(BackendError::AmbiguousFragment {
                name: fragment.name.clone(),
                first: other.path.clone(),
                second: fragment.path.clone(),
            });
        }
    }
    Ok(())
}
