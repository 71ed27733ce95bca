//! In-memory storage backend
//!
//! Same contract as [`super::LocalStorage`] without touching the disk. Writes
//! to individual collections can be refused to exercise failure paths.

use std::collections::{HashMap, HashSet};

use super::{Collection, KeyValueStore, StorageError};

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: HashMap<(Collection, String), Vec<u8>>,
    rejected: HashSet<Collection>,
    writes: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `set` on `collection` fail
    pub fn reject_writes(&mut self, collection: Collection) {
        self.rejected.insert(collection);
    }

    /// Undo [`Self::reject_writes`]
    pub fn accept_writes(&mut self, collection: Collection) {
        self.rejected.remove(&collection);
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.writes
    }

    pub fn contains(&self, collection: Collection, key: &str) -> bool {
        self.values.contains_key(&(collection, key.to_string()))
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, collection: Collection, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.values.get(&(collection, key.to_string())).cloned())
    }

    fn set(&mut self, collection: Collection, key: &str, value: &[u8]) -> Result<(), StorageError> {
        if self.rejected.contains(&collection) {
            return Err(StorageError::Rejected(format!("{}/{}", collection, key)));
        }
        self.values.insert((collection, key.to_string()), value.to_vec());
        self.writes += 1;
        Ok(())
    }
}
