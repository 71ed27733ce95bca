//! Storage Abstraction Layer
//!
//! Durable key-value persistence behind a small trait:
//! - `get(collection, key)` → value or absent
//! - `set(collection, key, value)` → success or error
//!
//! Backends:
//! - [`LocalStorage`]: one file per key under a base directory
//! - [`MemoryStorage`]: in-process map, used by tests and previews
//!
//! Values are RON, Brotli-compressed (see [`codec`]).

pub mod codec;
pub mod local;
pub mod memory;

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

pub use local::LocalStorage;
pub use memory::MemoryStorage;

/// Storage error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StorageError {
    /// File or directory not found
    #[error("not found: {0}")]
    NotFound(String),
    /// Permission denied
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    /// I/O error
    #[error("I/O error: {0}")]
    Io(String),
    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serde(String),
    /// Brotli stream could not be produced or read
    #[error("compression error: {0}")]
    Compression(String),
    /// Backend refused the write
    #[error("write rejected: {0}")]
    Rejected(String),
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::NotFound => StorageError::NotFound(e.to_string()),
            std::io::ErrorKind::PermissionDenied => StorageError::PermissionDenied(e.to_string()),
            _ => StorageError::Io(e.to_string()),
        }
    }
}

/// Named groups of keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    /// Custom block records (key `blocks`)
    CustomBlocks,
    /// Custom environment model records (key `models`)
    CustomModels,
    /// Placed blocks (key `current`)
    Terrain,
    /// Placed environment objects (key `current`)
    Environment,
}

impl Collection {
    /// Directory / namespace name
    pub fn name(&self) -> &'static str {
        match self {
            Collection::CustomBlocks => "custom_blocks",
            Collection::CustomModels => "custom_models",
            Collection::Terrain => "terrain",
            Collection::Environment => "environment",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Durable key-value persistence
///
/// `set` must not return `Ok` before the value is durable; a caller observing
/// success may assume the value survives a restart.
pub trait KeyValueStore {
    /// Read a value, `Ok(None)` if the key was never written
    fn get(&self, collection: Collection, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Replace a value as a whole
    fn set(&mut self, collection: Collection, key: &str, value: &[u8]) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, collection: Collection, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        (**self).get(collection, key)
    }

    fn set(&mut self, collection: Collection, key: &str, value: &[u8]) -> Result<(), StorageError> {
        (**self).set(collection, key, value)
    }
}

/// Read and decode a typed value
pub fn load_value<T: DeserializeOwned>(
    store: &(impl KeyValueStore + ?Sized),
    collection: Collection,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match store.get(collection, key)? {
        Some(bytes) => codec::decode(&bytes).map(Some),
        None => Ok(None),
    }
}

/// Encode and write a typed value
pub fn save_value<T: Serialize>(
    store: &mut (impl KeyValueStore + ?Sized),
    collection: Collection,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let bytes = codec::encode(value)?;
    store.set(collection, key, &bytes)
}
