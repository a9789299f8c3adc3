//! In-Memory Store
//!
//! Keeps the blob in memory. For tests and ephemeral sessions.

use std::sync::{Arc, Mutex};

use super::{ModelStore, StoreError};

/// In-memory model store. Clones share the same blob, letting a test
/// simulate a restart against the same storage.
#[derive(Clone, Default)]
pub struct MemoryModelStore {
    blob: Arc<Mutex<Option<Vec<u8>>>>,
}

impl MemoryModelStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        MemoryModelStore::default()
    }
}

impl ModelStore for MemoryModelStore {
    fn load(&self) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.blob.lock().unwrap().clone())
    }

    fn save(&self, bytes: &[u8]) -> Result<(), StoreError> {
        *self.blob.lock().unwrap() = Some(bytes.to_vec());
        Ok(())
    }
}
