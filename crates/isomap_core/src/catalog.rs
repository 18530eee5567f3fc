//! Theater tile catalog: tile sets, tile graphics and overlay types

use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::{debug, warn};

use crate::point::Point;

/// Terrain classification of a sub-tile, as authored in the tile art
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TerrainClass {
    #[default]
    Clear,
    Rough,
    Road,
    Water,
    Rock,
    Beach,
    Ice,
    Railroad,
    Tunnel,
    Tiberium,
    Cliff,
}

/// One cell of a tile graphic's footprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubTile {
    /// Offset from the tile's origin cell
    pub offset_x: i32,
    pub offset_y: i32,
    #[serde(default)]
    pub terrain: TerrainClass,
}

/// Footprint template of a multi-cell tile, as declared in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileTemplate {
    pub width: u32,
    pub height: u32,
    /// Row-major sub-tiles; `None` marks a hole in the footprint
    pub sub_tiles: Vec<Option<SubTile>>,
}

impl TileTemplate {
    /// Check that the sub-tile list covers exactly `width x height` slots
    pub fn is_well_formed(&self) -> bool {
        self.width > 0
            && self.height > 0
            && (self.width as usize).checked_mul(self.height as usize) == Some(self.sub_tiles.len())
    }

    /// A filled `width x height` rectangle of one terrain class
    pub fn rectangle(width: u32, height: u32, terrain: TerrainClass) -> Self {
        let mut sub_tiles = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                sub_tiles.push(Some(SubTile {
                    offset_x: x as i32,
                    offset_y: y as i32,
                    terrain,
                }));
            }
        }
        Self {
            width,
            height,
            sub_tiles,
        }
    }
}

/// Graphics description of a single catalog tile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGraphics {
    pub tile_index: u32,
    pub tile_set_index: usize,
    pub width: u32,
    pub height: u32,
    pub sub_tiles: Vec<Option<SubTile>>,
}

impl TileGraphics {
    pub fn sub_tile_count(&self) -> usize {
        self.sub_tiles.len()
    }

    /// Check if this tile covers exactly one cell
    pub fn is_single_cell(&self) -> bool {
        self.width == 1 && self.height == 1
    }

    /// Terrain class of a sub-tile
    pub fn terrain_class(&self, sub_tile_index: u8) -> Option<TerrainClass> {
        self.sub_tiles
            .get(sub_tile_index as usize)
            .copied()
            .flatten()
            .map(|s| s.terrain)
    }

    /// Cells covered when the tile is placed at `origin`, as `(sub_tile_index, cell)`
    pub fn footprint(&self, origin: Point) -> impl Iterator<Item = (u8, Point)> + '_ {
        self.sub_tiles.iter().enumerate().filter_map(move |(i, sub)| {
            sub.map(|s| (i as u8, origin.offset(s.offset_x, s.offset_y)))
        })
    }
}

/// A contiguous range of catalog tiles forming one terrain family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileSet {
    pub index: usize,
    pub name: String,
    pub start_tile_index: u32,
    pub tiles_in_set: u32,
}

impl TileSet {
    /// Check if a global tile index belongs to this set
    pub fn contains_tile(&self, tile_index: u32) -> bool {
        self.tile_range().contains(&tile_index)
    }

    pub fn tile_range(&self) -> Range<u32> {
        self.start_tile_index..self.start_tile_index + self.tiles_in_set
    }
}

/// An overlay type (ore, gems, walls...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayType {
    pub name: String,
    #[serde(default = "default_frame_count")]
    pub frame_count: u8,
}

fn default_frame_count() -> u8 {
    1
}

/// Tile catalog lookups the core needs from the theater/graphics subsystem
pub trait TileCatalog {
    /// Graphics of a catalog tile
    fn tile_graphics(&self, tile_index: u32) -> Option<&TileGraphics>;

    /// Tile set by its index
    fn tile_set(&self, index: usize) -> Option<&TileSet>;

    /// Total number of catalog tiles
    fn tile_count(&self) -> u32;

    /// Number of overlay types
    fn overlay_type_count(&self) -> usize;

    /// Tile set a tile belongs to
    fn tile_set_index_of(&self, tile_index: u32) -> Option<usize> {
        self.tile_graphics(tile_index).map(|g| g.tile_set_index)
    }

    /// Terrain class of a placed tile/sub-tile pair
    fn terrain_class(&self, tile_index: u32, sub_tile_index: u8) -> Option<TerrainClass> {
        self.tile_graphics(tile_index)
            .and_then(|g| g.terrain_class(sub_tile_index))
    }
}

/// Tile set as declared in configuration. Start indices are derived from
/// declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSetDefinition {
    pub name: String,
    pub tiles_in_set: u32,
    /// Terrain class of tiles without an explicit template
    #[serde(default)]
    pub terrain: TerrainClass,
    /// Per-tile footprints; empty means every tile is a single cell
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub templates: Vec<TileTemplate>,
}

impl TileSetDefinition {
    pub fn new(name: impl Into<String>, tiles_in_set: u32, terrain: TerrainClass) -> Self {
        Self {
            name: name.into(),
            tiles_in_set,
            terrain,
            templates: Vec::new(),
        }
    }

    /// Set explicit per-tile templates
    pub fn with_templates(mut self, templates: Vec<TileTemplate>) -> Self {
        self.templates = templates;
        self
    }
}

/// Serialized form of a [`Theater`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TheaterDefinition {
    pub name: String,
    pub tile_sets: Vec<TileSetDefinition>,
    #[serde(default)]
    pub overlay_types: Vec<OverlayType>,
    /// Terrain object (tree, rock...) type names
    #[serde(default)]
    pub terrain_object_types: Vec<String>,
}

/// The tile catalog of one theater (Temperate, Snow, Urban...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TheaterDefinition", into = "TheaterDefinition")]
pub struct Theater {
    definition: TheaterDefinition,
    tile_sets: Vec<TileSet>,
    tiles: Vec<TileGraphics>,
}

impl Theater {
    /// Build the catalog, assigning tile set start indices in declaration order
    pub fn new(definition: TheaterDefinition) -> Self {
        let mut tile_sets = Vec::with_capacity(definition.tile_sets.len());
        let mut tiles = Vec::new();
        let mut next_tile = 0u32;

        for (set_index, def) in definition.tile_sets.iter().enumerate() {
            tile_sets.push(TileSet {
                index: set_index,
                name: def.name.clone(),
                start_tile_index: next_tile,
                tiles_in_set: def.tiles_in_set,
            });

            if def.templates.len() > def.tiles_in_set as usize {
                warn!(
                    "Tile set '{}' declares {} templates for {} tiles, ignoring the rest",
                    def.name,
                    def.templates.len(),
                    def.tiles_in_set
                );
            }

            for i in 0..def.tiles_in_set {
                let template = match def.templates.get(i as usize) {
                    Some(template) if template.is_well_formed() => template.clone(),
                    Some(template) => {
                        warn!(
                            "Tile {} of set '{}' has {} sub-tiles for a {}x{} template, using a single cell",
                            i,
                            def.name,
                            template.sub_tiles.len(),
                            template.width,
                            template.height
                        );
                        TileTemplate::rectangle(1, 1, def.terrain)
                    }
                    None => TileTemplate::rectangle(1, 1, def.terrain),
                };
                tiles.push(TileGraphics {
                    tile_index: next_tile + i,
                    tile_set_index: set_index,
                    width: template.width,
                    height: template.height,
                    sub_tiles: template.sub_tiles,
                });
            }
            next_tile += def.tiles_in_set;
        }

        debug!(
            "Built theater '{}': {} tile sets, {} tiles, {} overlay types",
            definition.name,
            tile_sets.len(),
            tiles.len(),
            definition.overlay_types.len()
        );
        Self {
            definition,
            tile_sets,
            tiles,
        }
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn tile_sets(&self) -> &[TileSet] {
        &self.tile_sets
    }

    /// Find a tile set by name
    pub fn tile_set_by_name(&self, name: &str) -> Option<&TileSet> {
        self.tile_sets.iter().find(|ts| ts.name == name)
    }

    pub fn overlay_types(&self) -> &[OverlayType] {
        &self.definition.overlay_types
    }

    pub fn terrain_object_types(&self) -> &[String] {
        &self.definition.terrain_object_types
    }

    /// Parse a theater from JSON
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl From<TheaterDefinition> for Theater {
    fn from(definition: TheaterDefinition) -> Self {
        Self::new(definition)
    }
}

impl From<Theater> for TheaterDefinition {
    fn from(theater: Theater) -> Self {
        theater.definition
    }
}

impl TileCatalog for Theater {
    fn tile_graphics(&self, tile_index: u32) -> Option<&TileGraphics> {
        self.tiles.get(tile_index as usize)
    }

    fn tile_set(&self, index: usize) -> Option<&TileSet> {
        self.tile_sets.get(index)
    }

    fn tile_count(&self) -> u32 {
        self.tiles.len() as u32
    }

    fn overlay_type_count(&self) -> usize {
        self.definition.overlay_types.len()
    }
}
