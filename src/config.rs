//! Editor configuration
//!
//! Read from a RON file; every field is optional.
//!
//! ```ron
//! (
//!     data_dir: "/home/me/.local/share/blockyard",
//!     texture_grid_size: 24,
//!     history: (min_states: 30, threshold: 60),
//!     max_environment_objects: 5000,
//! )
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::storage::StorageError;
use crate::store::MAX_ENVIRONMENT_OBJECTS;
use crate::texture::{HistoryConfig, DEFAULT_GRID_SIZE};
use crate::world::PlacementSettings;

/// Config file name looked up inside the data directory
pub const CONFIG_FILE: &str = "blockyard.ron";

/// Texture of blocks that replace deleted blocks
pub const DEFAULT_ERROR_TEXTURE: &str = "./assets/blocks/error.png";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Root of persisted collections
    pub data_dir: PathBuf,
    /// Side length of texture canvases, in pixels
    pub texture_grid_size: usize,
    pub history: HistoryConfig,
    pub max_environment_objects: usize,
    pub error_texture_uri: String,
    pub placement: PlacementSettings,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            texture_grid_size: DEFAULT_GRID_SIZE,
            history: HistoryConfig::default(),
            max_environment_objects: MAX_ENVIRONMENT_OBJECTS,
            error_texture_uri: DEFAULT_ERROR_TEXTURE.to_string(),
            placement: PlacementSettings::default(),
        }
    }
}

impl EditorConfig {
    /// Parse a config file; placement values out of range are reset
    pub fn load(path: &Path) -> Result<Self, StorageError> {
        let text = fs::read_to_string(path)?;
        let mut config: EditorConfig = ron::from_str(&text).map_err(|e| StorageError::Serde(e.to_string()))?;
        config.sanitize();
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// `path` if given, else `<default data dir>/blockyard.ron` when present,
    /// else defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, StorageError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let candidate = default_data_dir().join(CONFIG_FILE);
                if candidate.is_file() {
                    Self::load(&candidate)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn to_ron(&self) -> Result<String, StorageError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::new()).map_err(|e| StorageError::Serde(e.to_string()))
    }

    fn sanitize(&mut self) {
        self.placement.validate();
        if self.texture_grid_size == 0 {
            log::warn!("texture_grid_size 0 is invalid, using {}", DEFAULT_GRID_SIZE);
            self.texture_grid_size = DEFAULT_GRID_SIZE;
        }
        if self.history.min_states > self.history.threshold {
            log::warn!(
                "history.min_states {} exceeds threshold {}, clamping",
                self.history.min_states,
                self.history.threshold
            );
            self.history.min_states = self.history.threshold;
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("blockyard"))
        .unwrap_or_else(|| PathBuf::from("./blockyard-data"))
}

#[cfg(target_arch = "wasm32")]
fn default_data_dir() -> PathBuf {
    PathBuf::from("./blockyard-data")
}
