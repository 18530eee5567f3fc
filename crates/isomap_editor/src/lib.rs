//! Map document and editing engine for isomap_editor
//!
//! This crate ties the codec and the cell grid into an editable map:
//! - `Map` - An open map file: grid, placed objects and untouched INI sections
//! - `EditorConfig` - Theater catalog, Auto-LAT grounds and generator presets
//! - `mutations` - Reversible edits (tiles, fill, overlays, height, objects, generation)
//! - `MutationHistory` - Undo/redo stacks
//! - `MapEditor` - A map plus everything needed to mutate it

pub mod config;
pub mod editor;
pub mod generator;
pub mod history;
pub mod map;
pub mod mutations;
pub mod refresh;

pub use config::{ConfigError, EditorConfig, CONFIG_VERSION};
pub use editor::MapEditor;
pub use generator::{TerrainGeneratorPreset, TerrainObjectGroup, TileGroup};
pub use history::MutationHistory;
pub use map::{Map, MapError, MapLoadReport, MapSize};
pub use mutations::{
    ChangeHeightMutation, FillAreaMutation, GenerateTerrainMutation, Mutation, MutationContext,
    MutationRejected, PlaceObjectMutation, PlaceOverlayMutation, PlaceTileMutation,
    RemoveObjectMutation,
};
pub use refresh::RefreshTracker;
