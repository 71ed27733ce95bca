//! Block asset definition

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::AssetId;
use crate::registry::ERROR_PLACEHOLDER_ID;

/// One of the six faces of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FaceKey {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl FaceKey {
    pub const ALL: [FaceKey; 6] = [
        FaceKey::PosX,
        FaceKey::NegX,
        FaceKey::PosY,
        FaceKey::NegY,
        FaceKey::PosZ,
        FaceKey::NegZ,
    ];

    /// Axis notation used in file names and the UI ("+x", "-y", ...)
    pub fn label(&self) -> &'static str {
        match self {
            FaceKey::PosX => "+x",
            FaceKey::NegX => "-x",
            FaceKey::PosY => "+y",
            FaceKey::NegY => "-y",
            FaceKey::PosZ => "+z",
            FaceKey::NegZ => "-z",
        }
    }

    pub fn from_label(label: &str) -> Option<FaceKey> {
        FaceKey::ALL.iter().copied().find(|f| f.label() == label)
    }
}

impl fmt::Display for FaceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A placeable block type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockAsset {
    pub id: AssetId,
    /// Unique within its category
    pub name: String,
    /// Main texture (data URI, path or URL)
    pub texture_uri: String,
    /// Per-face overrides; faces missing here use `texture_uri` when rendered
    #[serde(default)]
    pub side_textures: BTreeMap<FaceKey, String>,
    #[serde(default)]
    pub is_custom: bool,
}

impl BlockAsset {
    /// A custom block with a single texture on every face
    pub fn custom(id: AssetId, name: impl Into<String>, texture_uri: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            texture_uri: texture_uri.into(),
            side_textures: BTreeMap::new(),
            is_custom: true,
        }
    }

    /// Texture to draw on `face`, falling back to the main texture
    pub fn texture_for(&self, face: FaceKey) -> &str {
        self.side_textures
            .get(&face)
            .map(|s| s.as_str())
            .unwrap_or(&self.texture_uri)
    }

    pub fn has_side_textures(&self) -> bool {
        !self.side_textures.is_empty()
    }
}

/// Stand-in for a deleted block, kept in terrain so the position stays visible
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPlaceholder {
    /// Id of the block that used to be here
    pub original_id: AssetId,
    /// `missing_<deleted name>`
    pub name: String,
    pub texture_uri: String,
}

impl ErrorPlaceholder {
    pub fn new(original_id: AssetId, deleted_name: &str, texture_uri: impl Into<String>) -> Self {
        Self {
            original_id,
            name: format!("missing_{}", deleted_name),
            texture_uri: texture_uri.into(),
        }
    }

    /// Always [`ERROR_PLACEHOLDER_ID`]
    pub fn id(&self) -> AssetId {
        ERROR_PLACEHOLDER_ID
    }
}
