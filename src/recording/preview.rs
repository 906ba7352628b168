//! Revocable handles for rendering an artifact before it is persisted.
//!
//! The registry plays the role object URLs play in a browser: `create`
//! registers bytes under an opaque handle, `revoke` frees them. A handle
//! must be revoked before its replacement is created and on session reset,
//! so no preview bytes outlive the session that produced them.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

/// Opaque handle to registered preview bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PreviewRef(Uuid);

/// Process-local store of preview payloads.
pub struct PreviewRegistry {
    entries: Mutex<HashMap<Uuid, Vec<u8>>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<Uuid, Vec<u8>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn create(&self, bytes: Vec<u8>) -> PreviewRef {
        let id = Uuid::new_v4();
        self.entries().insert(id, bytes);
        PreviewRef(id)
    }

    /// Returns the registered bytes, or `None` for a revoked handle.
    pub fn resolve(&self, preview: PreviewRef) -> Option<Vec<u8>> {
        self.entries().get(&preview.0).cloned()
    }

    /// Frees the payload behind the handle. Returns `false` when the handle
    /// was already revoked.
    pub fn revoke(&self, preview: PreviewRef) -> bool {
        self.entries().remove(&preview.0).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

impl Default for PreviewRegistry {
    fn default() -> Self {
        Self::new()
    }
}
