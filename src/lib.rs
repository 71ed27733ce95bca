//! Blockyard: custom asset lifecycle for a voxel world editor
//!
//! Keeps user-created blocks and environment models consistent with the world
//! that uses them:
//! - partitioned id allocation ([`registry`])
//! - durable asset records with change notifications ([`store`])
//! - single-file and batch import of dropped files ([`import`])
//! - deletion that rewrites every placed reference ([`cascade`])
//! - multi-face texture editing with undo/redo ([`texture`])

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod asset;
pub mod cascade;
pub mod config;
pub mod error;
pub mod import;
pub mod manager;
pub mod registry;
pub mod scene;
pub mod storage;
pub mod store;
pub mod texture;
pub mod world;

pub use asset::{AssetId, BlockAsset, EnvironmentAsset, ErrorPlaceholder, FaceKey};
pub use cascade::DeleteOutcome;
pub use config::EditorConfig;
pub use error::{AssetError, AssetResult};
pub use manager::{AssetManager, Selection};
pub use registry::{AssetKind, Category, ERROR_PLACEHOLDER_ID};
pub use scene::{NullScene, SceneError, SceneHooks};
pub use storage::{KeyValueStore, LocalStorage, MemoryStorage};
pub use store::{AssetEvent, AssetStore};
