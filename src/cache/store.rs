use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex as StdMutex, PoisonError};

use crate::cache::StoreError;

pub const DEFAULT_SNAPSHOT_KEY: &str = "orbital_data_cache.json";

/// Blob store holding the persisted snapshot under a single fixed key.
pub trait SnapshotStore: Send + Sync {
    fn key(&self) -> &str;

    /// `Ok(None)` when nothing has been written yet.
    fn read(&self) -> Result<Option<Vec<u8>>, StoreError>;

    fn write(&self, bytes: &[u8]) -> Result<(), StoreError>;
}

/// Stores the snapshot as a file named after the key.
pub struct FileSnapshotStore {
    base: PathBuf,
    key: String,
}

impl FileSnapshotStore {
    pub fn new(base: PathBuf, key: impl Into<String>) -> Self {
        FileSnapshotStore {
            base,
            key: key.into(),
        }
    }

    fn blob_path(&self) -> PathBuf {
        self.base.join(&self.key)
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn key(&self) -> &str {
        &self.key
    }

    fn read(&self) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.blob_path();
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read(path)?))
    }

    fn write(&self, bytes: &[u8]) -> Result<(), StoreError> {
        fs::create_dir_all(&self.base)?;

        // Readers only ever see a complete blob
        let tmp = self
            .base
            .join(format!(".{}.{}.tmp", self.key, uuid::Uuid::new_v4()));
        let written = fs::write(&tmp, bytes).and_then(|()| fs::rename(&tmp, self.blob_path()));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

/// Process-local store, used when no snapshot directory is configured.
#[derive(Default)]
pub struct MemorySnapshotStore {
    blob: StdMutex<Option<Vec<u8>>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn key(&self) -> &str {
        "memory"
    }

    fn read(&self) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self
            .blob
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn write(&self, bytes: &[u8]) -> Result<(), StoreError> {
        *self.blob.lock().unwrap_or_else(PoisonError::into_inner) = Some(bytes.to_vec());
        Ok(())
    }
}
