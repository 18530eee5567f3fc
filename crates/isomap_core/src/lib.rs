//! Core data structures for isomap_editor
//!
//! This crate provides the fundamental types for representing isometric maps:
//! - `CellGrid` - The bounds-checked grid of optional cells
//! - `Cell` - Terrain identity, height, overlay and object slots of one cell
//! - `Theater` - Tile set and tile graphics catalog (implements `TileCatalog`)
//! - `PlacedObject` - Units, structures, trees and infantry placed on the map
//! - `area` - Brush iteration and flood fill helpers

pub mod area;
mod catalog;
mod cell;
mod grid;
mod object;
mod point;

pub use area::{flood_fill, BrushSize, FloodFill, AUTO_LAT_NEIGHBORS, MOORE_NEIGHBORS};
pub use catalog::{
    OverlayType, SubTile, TerrainClass, Theater, TheaterDefinition, TileCatalog, TileGraphics,
    TileSet, TileSetDefinition, TileTemplate,
};
pub use cell::{Cell, ObjectSlot, Overlay, INFANTRY_SUB_CELLS, MAX_LEVEL};
pub use grid::CellGrid;
pub use object::{ObjectKind, PlacedObject};
pub use point::Point;
