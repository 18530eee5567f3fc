//! Flood fill of a connected terrain area

use isomap_core::{flood_fill, Point};
use tracing::debug;

use super::{Mutation, MutationContext, MutationRejected, TileUndoLog};

/// Flood-fills a single-cell tile over the connected area around `start`.
///
/// The area is every cell reachable through the 8-cell neighborhood whose
/// tile has the same tile set and terrain class as the start cell.
pub struct FillAreaMutation {
    start: Point,
    tile_index: u32,
    undo: TileUndoLog,
    performed: bool,
}

impl FillAreaMutation {
    pub fn new(start: Point, tile_index: u32) -> Self {
        Self {
            start,
            tile_index,
            undo: TileUndoLog::default(),
            performed: false,
        }
    }
}

impl Mutation for FillAreaMutation {
    fn perform(&mut self, ctx: &mut MutationContext<'_>) -> Result<(), MutationRejected> {
        debug_assert!(!self.performed, "Fill Area performed twice without undo");
        let catalog = ctx.catalog;
        let graphics = catalog
            .tile_graphics(self.tile_index)
            .ok_or(MutationRejected::UnknownTile(self.tile_index))?;
        if !graphics.is_single_cell() {
            return Err(MutationRejected::MultiCellTile(self.tile_index));
        }

        let grid = ctx.grid();
        let start_cell = grid
            .cell(self.start)
            .ok_or(MutationRejected::MissingCell(self.start))?;
        if start_cell.tile_index == self.tile_index && start_cell.sub_tile_index == 0 {
            return Err(MutationRejected::NothingToChange);
        }

        let tile_set = catalog.tile_set_index_of(start_cell.tile_index);
        let terrain = catalog.terrain_class(start_cell.tile_index, start_cell.sub_tile_index);
        let fill = flood_fill(self.start, |point| {
            grid.cell(point).is_some_and(|cell| {
                catalog.tile_set_index_of(cell.tile_index) == tile_set
                    && catalog.terrain_class(cell.tile_index, cell.sub_tile_index) == terrain
            })
        });

        let mut undo = TileUndoLog::default();
        for &point in &fill.cells {
            undo.capture(ctx.grid(), point);
            ctx.grid_mut().set_tile(point, self.tile_index, 0);
        }

        debug!(
            "Filled {} cells from {} ({} enqueued)",
            fill.cells.len(),
            self.start,
            fill.enqueued
        );
        self.undo = undo;
        self.performed = true;
        ctx.refresh.invalidate_map();
        Ok(())
    }

    fn undo(&mut self, ctx: &mut MutationContext<'_>) {
        debug_assert!(self.performed, "Fill Area undone before perform");
        self.performed = false;
        self.undo.restore(ctx.grid_mut());
        ctx.refresh.invalidate_map();
    }

    fn description(&self) -> &str {
        "Fill Area"
    }
}
