//! Local filesystem storage backend
//!
//! Each key is one file: `<base>/<collection>/<key>.ron`.
//! Writes go to a temporary sibling that is then renamed over the target, so
//! readers see either the old or the new value, never a mix.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::{Collection, KeyValueStore, StorageError};

/// Local filesystem storage backend
#[derive(Debug, Clone)]
pub struct LocalStorage {
    /// Root directory holding one subdirectory per collection
    base_dir: PathBuf,
}

impl LocalStorage {
    /// Create a local storage backend rooted at `base_dir`
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolve the file backing a key
    fn resolve(&self, collection: Collection, key: &str) -> PathBuf {
        self.base_dir.join(collection.name()).join(format!("{}.ron", key))
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, collection: Collection, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.resolve(collection, key);

        match fs::read(&path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::from(e)),
        }
    }

    fn set(&mut self, collection: Collection, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let path = self.resolve(collection, key);

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = path.with_extension("ron.tmp");
        {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(value)?;
            file.sync_all()?;
        }

        if let Err(e) = fs::rename(&temp_path, &path) {
            let _ = fs::remove_file(&temp_path);
            return Err(StorageError::from(e));
        }

        log::debug!("stored {}/{} ({} bytes)", collection, key, value.len());
        Ok(())
    }
}
