// SPDX-FileCopyrightText: 2026 ClubShift Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Model Persistence
//!
//! The persisted form is one JSON blob holding the whole device model.
//! The store contract is deliberately a blob store: `load` and `save`,
//! nothing else. No cross-version schema migration; an undecodable blob
//! is treated as absent and the device starts over empty.

pub mod file;
pub mod memory;

pub use file::FileModelStore;
pub use memory::MemoryModelStore;

use thiserror::Error;

use crate::model::DeviceModel;

/// Errors from the model store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Underlying I/O failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The model could not be encoded for saving.
    #[error("encode error: {0}")]
    Encode(String),
}

/// Blob store for the serialized device model.
pub trait ModelStore: Send {
    /// Returns the stored blob, or `None` if nothing was ever saved.
    fn load(&self) -> Result<Option<Vec<u8>>, StoreError>;

    /// Replaces the stored blob.
    fn save(&self, bytes: &[u8]) -> Result<(), StoreError>;
}

/// Loads the device model, falling back to a fresh empty model when the
/// store holds nothing or the blob no longer decodes.
pub fn load_model(store: &dyn ModelStore) -> Result<DeviceModel, StoreError> {
    match store.load()? {
        Some(bytes) => match serde_json::from_slice(&bytes) {
            Ok(model) => Ok(model),
            Err(e) => {
                tracing::warn!(error = %e, "stored model undecodable, starting empty");
                Ok(DeviceModel::new())
            }
        },
        None => Ok(DeviceModel::new()),
    }
}

/// Serializes and saves the device model.
pub fn save_model(store: &dyn ModelStore, model: &DeviceModel) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec(model).map_err(|e| StoreError::Encode(e.to_string()))?;
    store.save(&bytes)
}
