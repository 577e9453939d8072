//! Backend registry - lookup and instantiation of EDA backends.
//!
//! Registry construction never fails and does no I/O. Backends are created
//! from a manifest on demand, which is where their options are validated.
//! Tool availability is only checked when asked for.

use std::collections::BTreeMap;

use crate::backend::alintpro::AlintPro;
use crate::backend::capabilities::BackendId;
use crate::backend::error::BackendError;
use crate::backend::trait_def::{BackendAvailability, BackendInfo, EdaBackend};
use crate::backend::vivado::Vivado;
use crate::backend::vunit::Vunit;
use crate::core::manifest::Manifest;

type Factory = fn(&Manifest) -> Result<Box<dyn EdaBackend>, BackendError>;

struct Entry {
    info: &'static BackendInfo,
    factory: Factory,
}

/// Registry of known backends.
pub struct BackendRegistry {
    backends: BTreeMap<BackendId, Entry>,
}

impl BackendRegistry {
    /// Create a registry with all built-in backends.
    pub fn new() -> Self {
        let mut registry = BackendRegistry {
            backends: BTreeMap::new(),
        };

        registry.register(Vivado::info(), |m| Ok(Box::new(Vivado::from_manifest(m)?)));
        registry.register(AlintPro::info(), |m| Ok(Box::new(AlintPro::from_manifest(m)?)));
        registry.register(Vunit::info(), |m| Ok(Box::new(Vunit::from_manifest(m)?)));

        registry
    }

    /// Register a backend.
    pub fn register(&mut self, info: &'static BackendInfo, factory: Factory) {
        self.backends.insert(info.id, Entry { info, factory });
    }

    /// Static description of a backend.
    pub fn info(&self, id: BackendId) -> Option<&'static BackendInfo> {
        self.backends.get(&id).map(|e| e.info)
    }

    /// Create a backend with options taken from the manifest.
    pub fn instantiate(&self, id: BackendId, manifest: &Manifest) -> Result<Box<dyn EdaBackend>, BackendError> {
        let entry = self
            .backends
            .get(&id)
            .ok_or_else(|| BackendError::UnknownBackend {
                name: id.to_string(),
            })?;
        tracing::debug!("instantiating backend `{}`", id);
        (entry.factory)(manifest)
    }

    /// Get all registered backend IDs, in stable order.
    pub fn ids(&self) -> impl Iterator<Item = BackendId> + '_ {
        self.backends.keys().copied()
    }

    /// Get the number of registered backends.
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Check if a backend is registered.
    pub fn contains(&self, id: BackendId) -> bool {
        self.backends.contains_key(&id)
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Summary of a backend for display purposes.
#[derive(Debug, Clone)]
pub struct BackendSummary {
    pub info: &'static BackendInfo,
    pub availability: BackendAvailability,
}

/// Get all backend summaries, checking tool availability.
///
/// This searches PATH for every tool and may be slow.
pub fn get_backend_summaries(registry: &BackendRegistry) -> Vec<BackendSummary> {
    registry
        .backends
        .values()
        .map(|entry| BackendSummary {
            info: entry.info,
            availability: BackendAvailability::detect(entry.info.tools),
        })
        .collect()
}
