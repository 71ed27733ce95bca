//! Error types for asset lifecycle operations

use thiserror::Error;

use crate::asset::AssetId;
use crate::registry::{AssetKind, Category};
use crate::storage::StorageError;

/// Result alias used throughout the crate
pub type AssetResult<T> = Result<T, AssetError>;

/// Errors raised by the registry, store, import pipeline and deletion engine
#[derive(Debug, Error)]
pub enum AssetError {
    /// No id left in the category's range
    #[error("no free id left in {category} (range {range})")]
    RangeExhausted { category: Category, range: String },

    /// A record carries an id that does not belong to the category it was written to
    #[error("id {id} is outside the {category} range")]
    IdOutOfRange { category: Category, id: AssetId },

    /// Another record of the same category already uses this name
    #[error("duplicate name \"{name}\" in {category}")]
    DuplicateName { category: Category, name: String },

    /// No record with this id exists
    #[error("{category} has no asset with id {id}")]
    NotFound { category: Category, id: AssetId },

    /// Built-in catalogs cannot be written
    #[error("{0} is read-only")]
    ReadOnlyCategory(Category),

    /// The durable store rejected a read or write
    #[error("persistence failure during {operation}: {source}")]
    Persistence {
        operation: String,
        #[source]
        source: StorageError,
    },

    /// No asset of this kind carries the name
    #[error("no {} named \"{name}\"", .kind.label())]
    UnknownName { kind: AssetKind, name: String },

    /// A dropped file could not be read or decoded
    #[error("could not decode \"{file}\": {reason}")]
    Decode { file: String, reason: String },

    /// The placed-object list is at capacity
    #[error("environment already holds the maximum of {limit} objects")]
    EnvironmentFull { limit: usize },

    /// Raster editing session misuse (unknown face, bad geometry, closed session)
    #[error("texture session: {0}")]
    Session(String),
}

impl AssetError {
    /// Wrap a storage error with the operation that triggered it
    pub fn persistence(operation: impl Into<String>, source: StorageError) -> Self {
        AssetError::Persistence {
            operation: operation.into(),
            source,
        }
    }

    /// Build a decode error for the named file
    pub fn decode(file: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        AssetError::Decode {
            file: file.into(),
            reason: reason.to_string(),
        }
    }

    /// True for errors the user can fix by renaming or retrying a single file
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AssetError::DuplicateName { .. } | AssetError::Decode { .. } | AssetError::NotFound { .. }
        )
    }
}
