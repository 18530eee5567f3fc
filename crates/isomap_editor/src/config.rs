//! Editor configuration
//!
//! One JSON file carries everything the editor core needs besides the map:
//! the theater tile catalog, the Auto-LAT grounds and the terrain generator
//! presets. There is no global state; the loaded value is passed to
//! [`MapEditor::new`](crate::MapEditor::new).

use std::path::Path;

use isomap_autotile::AutoLatGround;
use isomap_core::Theater;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::generator::TerrainGeneratorPreset;

/// Current configuration file version
pub const CONFIG_VERSION: u32 = 1;

/// Errors that can occur when loading or saving the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Auto-LAT ground '{name}' references missing tile set {tile_set}")]
    MissingTileSet { name: String, tile_set: usize },
}

/// Editor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Version for future migrations
    #[serde(default = "default_version")]
    pub version: u32,
    pub theater: Theater,
    #[serde(default)]
    pub auto_lat_grounds: Vec<AutoLatGround>,
    #[serde(default)]
    pub generator_presets: Vec<TerrainGeneratorPreset>,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

impl EditorConfig {
    /// Create a configuration for a theater with no grounds or presets
    pub fn new(theater: Theater) -> Self {
        Self {
            version: CONFIG_VERSION,
            theater,
            auto_lat_grounds: Vec::new(),
            generator_presets: Vec::new(),
        }
    }

    /// Load from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Parse from a JSON string and validate tile set references
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check that every Auto-LAT ground points at existing tile sets
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tile_set_count = self.theater.tile_sets().len();
        for ground in &self.auto_lat_grounds {
            let referenced = [ground.ground_tile_set, ground.transition_tile_set]
                .into_iter()
                .chain(ground.connect_to_tile_sets.iter().copied());
            for tile_set in referenced {
                if tile_set >= tile_set_count {
                    return Err(ConfigError::MissingTileSet {
                        name: ground.name.clone(),
                        tile_set,
                    });
                }
            }
        }
        Ok(())
    }

    /// Find a generator preset by id
    pub fn preset(&self, id: Uuid) -> Option<&TerrainGeneratorPreset> {
        self.generator_presets.iter().find(|p| p.id == id)
    }

    /// Find a generator preset by name
    pub fn preset_by_name(&self, name: &str) -> Option<&TerrainGeneratorPreset> {
        self.generator_presets.iter().find(|p| p.name == name)
    }
}
