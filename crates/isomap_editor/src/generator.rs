//! Terrain generator presets

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Scatters terrain objects (trees, rocks) over the target area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainObjectGroup {
    /// Terrain object type names to pick from, uniformly
    pub type_names: Vec<String>,
    /// Chance per cell not yet occupied by an earlier group
    pub open_chance: f64,
    /// Chance per cell already occupied by an earlier group
    pub overlap_chance: f64,
}

impl TerrainObjectGroup {
    pub fn new(type_names: Vec<String>, open_chance: f64, overlap_chance: f64) -> Self {
        Self {
            type_names,
            open_chance,
            overlap_chance,
        }
    }
}

/// Scatters tiles from one tile set over the target area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileGroup {
    pub tile_set: usize,
    /// Indices within the tile set to pick from; empty means the whole set
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tile_indices_in_set: Vec<u32>,
    pub open_chance: f64,
    pub overlap_chance: f64,
}

impl TileGroup {
    pub fn new(tile_set: usize, open_chance: f64, overlap_chance: f64) -> Self {
        Self {
            tile_set,
            tile_indices_in_set: Vec::new(),
            open_chance,
            overlap_chance,
        }
    }

    /// Builder: restrict to specific tiles of the set
    pub fn with_tiles(mut self, tile_indices_in_set: Vec<u32>) -> Self {
        self.tile_indices_in_set = tile_indices_in_set;
        self
    }
}

/// A named generator configuration.
///
/// Terrain object groups run first, then tile groups, each in declaration
/// order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainGeneratorPreset {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub terrain_object_groups: Vec<TerrainObjectGroup>,
    #[serde(default)]
    pub tile_groups: Vec<TileGroup>,
}

impl TerrainGeneratorPreset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            terrain_object_groups: Vec::new(),
            tile_groups: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.terrain_object_groups.is_empty() && self.tile_groups.is_empty()
    }
}
