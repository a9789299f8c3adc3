//! File-Backed Store
//!
//! Stores the model blob in a single file. Writes go through a temp file
//! and an atomic rename so a crash mid-save never leaves a torn blob.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::{ModelStore, StoreError};

/// File-backed model store.
pub struct FileModelStore {
    path: PathBuf,
}

impl FileModelStore {
    /// Creates a store writing to the given path. Parent directories are
    /// created on first save.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        FileModelStore {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The path this store writes to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ModelStore for FileModelStore {
    fn load(&self) -> Result<Option<Vec<u8>>, StoreError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, bytes: &[u8]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(bytes)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
