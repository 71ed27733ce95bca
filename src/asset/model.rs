//! Environment model asset definition

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::AssetId;

/// Animation every imported model is tagged with
pub const DEFAULT_ANIMATION: &str = "idle";

/// Model data; never parsed, only stored and handed to the scene
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelPayload {
    /// Raw `.gltf` file contents, stored as base64 text
    Binary(#[serde(with = "base64_bytes")] Vec<u8>),
    /// Location of a bundled model
    Uri(String),
}

impl ModelPayload {
    pub fn byte_len(&self) -> usize {
        match self {
            ModelPayload::Binary(bytes) => bytes.len(),
            ModelPayload::Uri(_) => 0,
        }
    }
}

mod base64_bytes {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD
            .decode(text.trim())
            .map_err(serde::de::Error::custom)
    }
}

/// A placeable environment object type (tree, robot, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentAsset {
    pub id: AssetId,
    /// Placed objects refer to the model by this name
    pub name: String,
    pub model: ModelPayload,
    #[serde(default)]
    pub is_custom: bool,
    #[serde(default)]
    pub animation_tags: BTreeSet<String>,
    /// Seconds since the Unix epoch at import time
    #[serde(default)]
    pub imported_at: u64,
}

impl EnvironmentAsset {
    /// A freshly imported custom model
    pub fn custom(id: AssetId, name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let imported_at = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Self {
            id,
            name: name.into(),
            model: ModelPayload::Binary(bytes),
            is_custom: true,
            animation_tags: BTreeSet::from([DEFAULT_ANIMATION.to_string()]),
            imported_at,
        }
    }

    /// A bundled model shipped with the editor
    pub fn builtin(id: AssetId, name: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            model: ModelPayload::Uri(uri.into()),
            is_custom: false,
            animation_tags: BTreeSet::new(),
            imported_at: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_model_defaults() {
        let model = EnvironmentAsset::custom(300, "robot", b"{\"asset\":{}}".to_vec());
        assert!(model.is_custom);
        assert!(model.animation_tags.contains(DEFAULT_ANIMATION));
        assert_eq!(model.model.byte_len(), 12);
    }

    #[test]
    fn test_binary_payload_stored_as_base64() {
        let model = EnvironmentAsset::custom(301, "crate", vec![0, 1, 2, 250, 251, 252]);
        let text = ron::to_string(&model).unwrap();
        assert!(text.contains("Binary(\"AAEC+vv8\")"), "{}", text);

        let back: EnvironmentAsset = ron::from_str(&text).unwrap();
        assert_eq!(back, model);
        assert!(ron::from_str::<ModelPayload>("Binary(\"not base64!\")").is_err());
    }
}
