// ── Coordinator registry ──
//
// Explicit label -> coordinator map, owned by the application and passed
// to whatever needs lookup (command dispatch, options editing). Mutated
// on device creation/reconfiguration, read on every lookup.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::coordinator::Coordinator;
use crate::error::CoreError;

/// Registry of live coordinators, keyed by device label.
#[derive(Default)]
pub struct CoordinatorRegistry {
    inner: DashMap<String, Arc<Coordinator>>,
}

impl CoordinatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a coordinator under its own id, replacing any prior
    /// entry under the same id (reconfiguration must not leave two
    /// objects for one device).
    pub fn register(&self, coordinator: Arc<Coordinator>) {
        let id = coordinator.id().to_owned();
        debug!(device = %id, "registering coordinator");
        self.inner.insert(id, coordinator);
    }

    /// The coordinator registered under `id`.
    pub fn lookup(&self, id: &str) -> Result<Arc<Coordinator>, CoreError> {
        self.inner
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| CoreError::CoordinatorNotFound { id: id.to_owned() })
    }

    /// Remove the coordinator registered under `id`, if any.
    pub fn remove(&self, id: &str) -> Option<Arc<Coordinator>> {
        self.inner.remove(id).map(|(_, coordinator)| coordinator)
    }

    /// All registered device labels, sorted.
    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.inner.iter().map(|e| e.key().clone()).collect();
        labels.sort();
        labels
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }
}
