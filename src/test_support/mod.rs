//! Test utilities for edaforge unit tests.
//!
//! Provides a [`RecordingRunner`] that stands in for real EDA tools and
//! manifest fixtures.
//!
//! # Example
//!
//! ```rust,ignore
//! use edaforge::test_support::RecordingRunner;
//!
//! #[test]
//! fn test_example() {
//!     let runner = RecordingRunner::new().fail_on("vivado", 1);
//!     // Drive a PhaseController with `&runner`...
//!     assert_eq!(runner.commands(), vec!["make"]);
//! }
//! ```

pub mod fixtures;

use std::collections::BTreeMap;
use std::sync::Mutex;

use anyhow::Result;

use crate::util::process::{ToolInvocation, ToolRunner};

pub use fixtures::*;

/// Tool runner that records invocations instead of spawning processes.
///
/// Every program exits with 0 unless registered with [`RecordingRunner::fail_on`].
#[derive(Debug, Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<ToolInvocation>>,
    exit_codes: BTreeMap<String, i32>,
}

impl RecordingRunner {
    /// Create a runner where every tool succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `program` exit with `code`.
    pub fn fail_on(mut self, program: &str, code: i32) -> Self {
        self.exit_codes.insert(program.to_string(), code);
        self
    }

    /// All invocations, in call order.
    pub fn invocations(&self) -> Vec<ToolInvocation> {
        self.calls.lock().unwrap().clone()
    }

    /// Command lines of all invocations, in call order.
    pub fn commands(&self) -> Vec<String> {
        self.invocations()
            .iter()
            .map(ToolInvocation::display_command)
            .collect()
    }
}

impl ToolRunner for RecordingRunner {
    fn run(&self, invocation: &ToolInvocation) -> Result<Option<i32>> {
        self.calls.lock().unwrap().push(invocation.clone());
        Ok(Some(
            self.exit_codes
                .get(&invocation.program)
                .copied()
                .unwrap_or(0),
        ))
    }
}
