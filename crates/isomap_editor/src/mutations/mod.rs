//! Reversible map edits
//!
//! Every edit is a [`Mutation`]: `perform` applies it and captures what it
//! overwrote, `undo` puts that back. A mutation whose preconditions fail
//! returns [`MutationRejected`] and leaves the map untouched.

mod change_height;
mod fill_area;
mod generate_terrain;
mod objects;
mod place_overlay;
mod place_tile;

pub use change_height::ChangeHeightMutation;
pub use fill_area::FillAreaMutation;
pub use generate_terrain::GenerateTerrainMutation;
pub use objects::{PlaceObjectMutation, RemoveObjectMutation};
pub use place_overlay::PlaceOverlayMutation;
pub use place_tile::PlaceTileMutation;

use std::collections::HashSet;

use isomap_autotile::{AutoLatResolver, LatChange};
use isomap_core::{CellGrid, ObjectSlot, Point, TileCatalog};
use thiserror::Error;
use uuid::Uuid;

use crate::map::Map;
use crate::refresh::RefreshTracker;

/// Why a mutation refused to apply
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationRejected {
    #[error("Tile {0} is not in the catalog")]
    UnknownTile(u32),
    #[error("Tile set {0} is not in the catalog")]
    UnknownTileSet(usize),
    #[error("Tile {0} covers more than one cell")]
    MultiCellTile(u32),
    #[error("Overlay type {0} is not in the catalog")]
    UnknownOverlay(u8),
    #[error("No cell at {0}")]
    MissingCell(Point),
    #[error("Cell {point} slot {slot:?} is already occupied")]
    SlotOccupied { point: Point, slot: ObjectSlot },
    #[error("Invalid infantry sub-cell {0}")]
    InvalidSubCell(u8),
    #[error("Object {0} is not on the map")]
    UnknownObject(Uuid),
    #[error("Nothing to change")]
    NothingToChange,
}

/// Everything a mutation may read or write
pub struct MutationContext<'a> {
    pub map: &'a mut Map,
    pub catalog: &'a dyn TileCatalog,
    pub auto_lat: &'a AutoLatResolver,
    pub refresh: &'a mut RefreshTracker,
}

impl<'a> MutationContext<'a> {
    pub fn new(
        map: &'a mut Map,
        catalog: &'a dyn TileCatalog,
        auto_lat: &'a AutoLatResolver,
        refresh: &'a mut RefreshTracker,
    ) -> Self {
        Self {
            map,
            catalog,
            auto_lat,
            refresh,
        }
    }

    pub(crate) fn grid(&self) -> &CellGrid {
        self.map.grid()
    }

    pub(crate) fn grid_mut(&mut self) -> &mut CellGrid {
        self.map.grid_mut()
    }

    /// Run Auto-LAT over `region`, returning the changed cells
    pub(crate) fn apply_auto_lat<I>(&mut self, region: I) -> Vec<LatChange>
    where
        I: IntoIterator<Item = Point>,
    {
        let catalog = self.catalog;
        let resolver = self.auto_lat;
        resolver.apply_auto_lat(self.map.grid_mut(), catalog, region)
    }
}

/// A reversible edit of the map
pub trait Mutation {
    /// Apply the edit, capturing the state needed to undo it
    fn perform(&mut self, ctx: &mut MutationContext<'_>) -> Result<(), MutationRejected>;
    /// Restore the state captured by the last `perform`
    fn undo(&mut self, ctx: &mut MutationContext<'_>);
    /// Human-readable label for the Edit menu
    fn description(&self) -> &str;
}

/// Original terrain identity of one cell, captured on first touch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TileUndo {
    pub point: Point,
    pub tile_index: u32,
    pub sub_tile_index: u8,
}

/// Records the pre-mutation terrain of cells, keeping only the first capture
#[derive(Debug, Clone, Default)]
pub(crate) struct TileUndoLog {
    entries: Vec<TileUndo>,
    seen: HashSet<Point>,
}

impl TileUndoLog {
    /// Remember the current terrain of `point` unless it is already recorded
    pub fn capture(&mut self, grid: &CellGrid, point: Point) {
        if self.seen.contains(&point) {
            return;
        }
        if let Some(cell) = grid.cell(point) {
            self.seen.insert(point);
            self.entries.push(TileUndo {
                point,
                tile_index: cell.tile_index,
                sub_tile_index: cell.sub_tile_index,
            });
        }
    }

    /// Record Auto-LAT changes for cells not captured yet
    pub fn capture_lat_changes(&mut self, changes: &[LatChange]) {
        for change in changes {
            if self.seen.insert(change.point) {
                self.entries.push(TileUndo {
                    point: change.point,
                    tile_index: change.old_tile_index,
                    sub_tile_index: change.old_sub_tile_index,
                });
            }
        }
    }

    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.entries.iter().map(|e| e.point)
    }

    /// Write the captured terrain back and forget it
    pub fn restore(&mut self, grid: &mut CellGrid) {
        for entry in self.entries.drain(..).rev() {
            grid.set_tile(entry.point, entry.tile_index, entry.sub_tile_index);
        }
        self.seen.clear();
    }
}

/// Bounding box of `points`, expanded by `margin`, as a row-major cell list
pub(crate) fn expanded_bounds<I>(points: I, margin: i32) -> Vec<Point>
where
    I: IntoIterator<Item = Point>,
{
    let mut iter = points.into_iter();
    let Some(first) = iter.next() else {
        return Vec::new();
    };
    let (mut min, mut max) = (first, first);
    for p in iter {
        min = Point::new(min.x.min(p.x), min.y.min(p.y));
        max = Point::new(max.x.max(p.x), max.y.max(p.y));
    }

    ((min.y - margin)..=(max.y + margin))
        .flat_map(|y| ((min.x - margin)..=(max.x + margin)).map(move |x| Point::new(x, y)))
        .collect()
}
