//! Backend identifiers and declared phase support.

use serde::{Deserialize, Serialize};

/// Unique identifier for an EDA backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendId {
    /// Xilinx Vivado project flow
    Vivado,
    /// Aldec ALINT-PRO static analysis
    AlintPro,
    /// VUnit HDL test runner
    Vunit,
}

impl BackendId {
    /// All built-in backends.
    pub const ALL: [BackendId; 3] = [BackendId::Vivado, BackendId::AlintPro, BackendId::Vunit];

    /// Get the backend name as a string.
    ///
    /// This is also the key under `tool_options` in the manifest.
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendId::Vivado => "vivado",
            BackendId::AlintPro => "alintpro",
            BackendId::Vunit => "vunit",
        }
    }
}

impl std::fmt::Display for BackendId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BackendId {
    type Err = BackendIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "vivado" => Ok(BackendId::Vivado),
            "alintpro" | "alint-pro" | "alint" => Ok(BackendId::AlintPro),
            "vunit" => Ok(BackendId::Vunit),
            _ => Err(BackendIdParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid backend ID.
#[derive(Debug, Clone)]
pub struct BackendIdParseError(pub String);

impl std::fmt::Display for BackendIdParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid backend '{}', valid values: vivado, alintpro, vunit",
            self.0
        )
    }
}

impl std::error::Error for BackendIdParseError {}

/// How a backend supports a lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseSupport {
    /// Phase does real work
    Required,
    /// Phase may or may not do work depending on options
    Optional,
    /// Phase is a no-op for this backend
    NotSupported,
}

impl PhaseSupport {
    /// Check if this phase is supported at all.
    pub fn is_supported(&self) -> bool {
        !matches!(self, PhaseSupport::NotSupported)
    }
}

impl std::fmt::Display for PhaseSupport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PhaseSupport::Required => "yes",
            PhaseSupport::Optional => "optional",
            PhaseSupport::NotSupported => "no-op",
        };
        f.write_str(s)
    }
}

/// Phase support declared by a backend.
#[derive(Debug, Clone)]
pub struct PhaseCapabilities {
    /// Script generation
    pub configure: PhaseSupport,

    /// Compile-only tool invocation
    pub build: PhaseSupport,

    /// Full tool invocation
    pub run: PhaseSupport,

    /// Extra backend-declared operations (e.g. device programming)
    pub extra: &'static [&'static str],
}

impl Default for PhaseCapabilities {
    fn default() -> Self {
        PhaseCapabilities {
            configure: PhaseSupport::Required,
            build: PhaseSupport::Required,
            run: PhaseSupport::Required,
            extra: &[],
        }
    }
}

/// Lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Configure,
    Build,
    Run,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Configure => "configure",
            Phase::Build => "build",
            Phase::Run => "run",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
