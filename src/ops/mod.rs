//! High-level operations.
//!
//! This module contains the phase controller and the session setup used by
//! the edaforge commands.

pub mod hooks;
pub mod lifecycle;
pub mod session;

pub use hooks::run_hooks;
pub use lifecycle::{PhaseController, PhaseOutcome};
pub use session::{Session, SessionOptions};
