//! Generic instance cache keyed by (component, name, host).
//!
//! Guarantees at most one in-memory `Instance` per triple. One map owned
//! by the orchestration layer replaces per-type caches; execution is
//! sequential, so the mutex only guards against accidental reentrancy.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::domain::{Component, Instance};

#[derive(Default)]
pub struct InstanceCache {
    map: Mutex<HashMap<(String, String, String), Arc<Instance>>>,
}

impl InstanceCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch or construct the unique instance for the triple.
    ///
    /// The host root only matters on first construction; the same triple
    /// always returns the same value afterwards.
    pub fn intern(
        &self,
        component: &Arc<Component>,
        name: &str,
        host: &str,
        root: &Path,
    ) -> Arc<Instance> {
        let key = (
            component.name.to_string(),
            name.to_string(),
            host.to_string(),
        );
        let mut map = self.map.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        map.entry(key)
            .or_insert_with(|| Arc::new(Instance::new(component.clone(), name, host, root)))
            .clone()
    }

    /// Drop every cached instance for `host`; used when a host is removed
    /// from the inventory.
    pub fn evict_host(&self, host: &str) {
        let mut map = self.map.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        map.retain(|(_, _, h), _| h != host);
    }
}
