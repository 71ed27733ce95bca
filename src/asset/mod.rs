//! Asset records
//!
//! Two record types share one id space (see [`crate::registry`]):
//!
//! ```text
//! BlockAsset
//! ├── id, name
//! ├── texture_uri             // main texture, data URI or path
//! ├── side_textures           // sparse per-face overrides (+x .. -z)
//! └── is_custom
//!
//! EnvironmentAsset
//! ├── id, name                // placed objects reference the name
//! ├── model: ModelPayload     // opaque glTF bytes or a URI
//! ├── animation_tags
//! └── is_custom
//! ```
//!
//! Terrain cells whose block was deleted hold an [`ErrorPlaceholder`].

mod block;
mod defaults;
mod model;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::registry::AssetKind;
use crate::storage::Collection;

pub use block::{BlockAsset, ErrorPlaceholder, FaceKey};
pub use defaults::{default_blocks, default_models};
pub use model::{EnvironmentAsset, ModelPayload, DEFAULT_ANIMATION};

/// Integer identity of a block or environment asset
pub type AssetId = u32;

/// Common surface of records kept in a [`crate::store::Catalog`]
pub trait AssetRecord: Clone + Serialize + DeserializeOwned {
    const KIND: AssetKind;
    /// Where the custom records of this kind are persisted
    const COLLECTION: Collection;
    /// Key of the single value holding the whole custom list
    const KEY: &'static str;

    fn id(&self) -> AssetId;
    fn name(&self) -> &str;
    fn is_custom(&self) -> bool;
}

impl AssetRecord for BlockAsset {
    const KIND: AssetKind = AssetKind::Block;
    const COLLECTION: Collection = Collection::CustomBlocks;
    const KEY: &'static str = "blocks";

    fn id(&self) -> AssetId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_custom(&self) -> bool {
        self.is_custom
    }
}

impl AssetRecord for EnvironmentAsset {
    const KIND: AssetKind = AssetKind::Environment;
    const COLLECTION: Collection = Collection::CustomModels;
    const KEY: &'static str = "models";

    fn id(&self) -> AssetId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_custom(&self) -> bool {
        self.is_custom
    }
}
