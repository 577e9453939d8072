//! Core data structures for edaforge.
//!
//! This module contains the tool-agnostic description of a design:
//! - Declared file types and source file records
//! - Ordered file sets with include directories
//! - Design parameters and hook scripts
//! - The manifest tying them together

pub mod file_type;
pub mod fileset;
pub mod hooks;
pub mod manifest;
pub mod parameter;

pub use file_type::{FileKind, FileType};
pub use fileset::{FileEntry, FileSet, SourceFile};
pub use hooks::{HookPoint, HookScript, Hooks};
pub use manifest::Manifest;
pub use parameter::{ParamType, ParamValue, Parameter, Parameters};
