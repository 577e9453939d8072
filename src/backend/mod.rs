//! EDA tool backends.
//!
//! Each backend maps the tool-agnostic file set onto one tool:
//! - `dispatch` turns files into tool directives through a per-backend table
//! - `fragments` pulls waiver and script fragment files out of the file set
//! - `context` and `renderer` assemble and render the generated scripts
//! - `trait_def` describes the configure/build/run operations
//!
//! Built-in backends: Vivado, ALINT-PRO and VUnit.

pub mod alintpro;
pub mod capabilities;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod fragments;
pub mod options;
pub mod registry;
pub mod renderer;
pub mod trait_def;
pub mod vivado;
pub mod vunit;

pub use capabilities::{BackendId, Phase, PhaseCapabilities, PhaseSupport};
pub use context::{BuildContext, TemplateContext};
pub use dispatch::{dispatch, Dispatch, DispatchResult, FileDispatcher};
pub use error::BackendError;
pub use registry::BackendRegistry;
pub use trait_def::{BackendInfo, ConfigureResult, EdaBackend};
