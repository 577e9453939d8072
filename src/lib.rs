//! edaforge - drive EDA tools from a tool-agnostic design manifest
//!
//! This crate maps an ordered set of HDL sources, constraints and scripts onto
//! the project files of a specific EDA tool, then runs that tool through a
//! configure, build and run lifecycle.

pub mod backend;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities for edaforge unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests.
#[cfg(test)]
pub mod test_support;

pub use backend::{BackendError, BackendId, BackendRegistry, BuildContext, EdaBackend};
pub use core::{FileSet, Manifest, SourceFile};
pub use ops::{PhaseController, Session};
