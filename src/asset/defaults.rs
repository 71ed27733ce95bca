//! Built-in block and environment catalogs
//!
//! These ship with the editor and are never persisted or written.

use super::{BlockAsset, EnvironmentAsset};

const DEFAULT_BLOCKS: &[(u32, &str)] = &[
    (1, "bricks"),
    (2, "cobblestone"),
    (3, "dirt"),
    (4, "grass"),
    (5, "stone"),
    (6, "sand"),
    (7, "oak_planks"),
    (8, "oak_log"),
    (9, "glass"),
    (10, "water"),
];

const DEFAULT_MODELS: &[(u32, &str)] = &[
    (200, "oak_tree"),
    (201, "pine_tree"),
    (202, "bush"),
    (203, "rock"),
    (204, "fence"),
];

pub fn default_blocks() -> Vec<BlockAsset> {
    DEFAULT_BLOCKS
        .iter()
        .map(|&(id, name)| BlockAsset {
            id,
            name: name.to_string(),
            texture_uri: format!("./assets/blocks/{}.png", name),
            side_textures: Default::default(),
            is_custom: false,
        })
        .collect()
}

pub fn default_models() -> Vec<EnvironmentAsset> {
    DEFAULT_MODELS
        .iter()
        .map(|&(id, name)| EnvironmentAsset::builtin(id, name, format!("./assets/models/environment/{}.gltf", name)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Category;

    #[test]
    fn test_defaults_sit_in_default_ranges() {
        for block in default_blocks() {
            assert!(Category::DefaultBlock.range().contains(block.id), "{}", block.name);
            assert!(!block.is_custom);
        }
        for model in default_models() {
            assert!(Category::DefaultEnvironment.range().contains(model.id), "{}", model.name);
            assert!(!model.is_custom);
        }
    }
}
