//! Tile placement with brush repetition and optional Auto-LAT
//!
//! ```
//! use isomap_core::{TerrainClass, Theater, TheaterDefinition, TileSetDefinition};
//! use isomap_editor::{EditorConfig, Map, MapEditor, PlaceTileMutation};
//!
//! let theater = Theater::new(TheaterDefinition {
//!     name: "TEMPERATE".to_string(),
//!     tile_sets: vec![
//!         TileSetDefinition::new("Clear", 1, TerrainClass::Clear),
//!         TileSetDefinition::new("Rough", 4, TerrainClass::Rough),
//!     ],
//!     ..Default::default()
//! });
//! let config = EditorConfig::new(theater);
//! let mut editor = MapEditor::new(Map::new_blank("TEMPERATE", 4, 4), &config);
//! let cell = editor.map().size().diamond_cells().next().unwrap();
//!
//! editor.perform(PlaceTileMutation::new(cell, 2)).unwrap();
//! assert_eq!(editor.map().grid().cell(cell).unwrap().tile_index, 2);
//! assert!(editor.undo());
//! assert_eq!(editor.map().grid().cell(cell).unwrap().tile_index, 0);
//! ```

use isomap_core::{BrushSize, Point};
use tracing::debug;

use super::{expanded_bounds, Mutation, MutationContext, MutationRejected, TileUndoLog};

/// Places a tile graphic, optionally repeated over a brush and smoothed with
/// Auto-LAT afterwards.
///
/// Multi-cell graphics write one sub-tile per covered cell. Cells of the
/// footprint that do not exist on the map are skipped.
pub struct PlaceTileMutation {
    origin: Point,
    tile_index: u32,
    brush: BrushSize,
    auto_lat: bool,
    undo: TileUndoLog,
    performed: bool,
}

impl PlaceTileMutation {
    pub fn new(origin: Point, tile_index: u32) -> Self {
        Self {
            origin,
            tile_index,
            brush: BrushSize::ONE,
            auto_lat: false,
            undo: TileUndoLog::default(),
            performed: false,
        }
    }

    pub fn with_brush(mut self, brush: BrushSize) -> Self {
        self.brush = brush;
        self
    }

    /// Run Auto-LAT around the placed tiles
    pub fn with_auto_lat(mut self, enabled: bool) -> Self {
        self.auto_lat = enabled;
        self
    }

    fn refresh_radius(&self, tile_width: u32, tile_height: u32) -> u32 {
        let brush = self.brush.refresh_radius();
        brush * tile_width.max(tile_height).max(1)
    }
}

impl Mutation for PlaceTileMutation {
    fn perform(&mut self, ctx: &mut MutationContext<'_>) -> Result<(), MutationRejected> {
        debug_assert!(!self.performed, "Place Tile performed twice without undo");
        let catalog = ctx.catalog;
        let graphics = catalog
            .tile_graphics(self.tile_index)
            .ok_or(MutationRejected::UnknownTile(self.tile_index))?;

        let targets: Vec<(Point, u8)> = self
            .brush
            .tile_origins(self.origin, graphics.width, graphics.height)
            .flat_map(|origin| graphics.footprint(origin))
            .map(|(sub_tile, point)| (point, sub_tile))
            .filter(|(point, _)| ctx.grid().cell(*point).is_some())
            .collect();
        if targets.is_empty() {
            return Err(MutationRejected::MissingCell(self.origin));
        }

        let mut undo = TileUndoLog::default();
        for &(point, sub_tile) in &targets {
            undo.capture(ctx.grid(), point);
            ctx.grid_mut().set_tile(point, self.tile_index, sub_tile);
        }

        if self.auto_lat {
            let region = expanded_bounds(targets.iter().map(|(p, _)| *p), 1);
            let changes = ctx.apply_auto_lat(region);
            undo.capture_lat_changes(&changes);
        }

        debug!(
            "Placed tile {} on {} cells at {}",
            self.tile_index,
            targets.len(),
            self.origin
        );
        self.undo = undo;
        self.performed = true;
        ctx.refresh
            .add_refresh_point(self.origin, self.refresh_radius(graphics.width, graphics.height));
        Ok(())
    }

    fn undo(&mut self, ctx: &mut MutationContext<'_>) {
        debug_assert!(self.performed, "Place Tile undone before perform");
        self.performed = false;
        self.undo.restore(ctx.grid_mut());
        let (width, height) = ctx
            .catalog
            .tile_graphics(self.tile_index)
            .map_or((1, 1), |g| (g.width, g.height));
        ctx.refresh
            .add_refresh_point(self.origin, self.refresh_radius(width, height));
    }

    fn description(&self) -> &str {
        "Place Tile"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutations::test_support::*;

    fn tile_at(fixture: &Fixture, point: Point) -> (u32, u8) {
        let cell = fixture.map.grid().cell(point).unwrap();
        (cell.tile_index, cell.sub_tile_index)
    }

    #[test]
    fn test_multi_cell_undo_restores_every_sub_cell() {
        let mut fixture = Fixture::new();
        let footprint = [
            CENTER,
            CENTER.offset(1, 0),
            CENTER.offset(0, 1),
            CENTER.offset(1, 1),
        ];
        let originals = [(ROUGH, 0), (WATER, 0), (WATER + 1, 0), (ROUGH + 1, 0)];
        for (point, (tile, sub)) in footprint.iter().zip(originals) {
            fixture.map.grid_mut().set_tile(*point, tile, sub);
        }

        let mut mutation = PlaceTileMutation::new(CENTER, CLIFF);
        mutation.perform(&mut fixture.ctx()).unwrap();
        for (i, point) in footprint.iter().enumerate() {
            assert_eq!(tile_at(&fixture, *point), (CLIFF, i as u8));
        }

        mutation.undo(&mut fixture.ctx());
        for (point, original) in footprint.iter().zip(originals) {
            assert_eq!(tile_at(&fixture, *point), original);
        }
    }

    #[test]
    fn test_brush_repeats_tile() {
        let mut fixture = Fixture::new();
        let before = fixture.map.grid().clone();

        let mut mutation = PlaceTileMutation::new(CENTER, WATER).with_brush(BrushSize::new(2, 3));
        mutation.perform(&mut fixture.ctx()).unwrap();

        for point in BrushSize::new(2, 3).cells(CENTER) {
            assert_eq!(tile_at(&fixture, point).0, WATER);
        }
        assert_eq!(tile_at(&fixture, CENTER.offset(2, 0)).0, CLEAR);
        assert!(!fixture.refresh.is_empty());

        mutation.undo(&mut fixture.ctx());
        assert!(fixture.map.grid().same_cells(&before));
    }

    #[test]
    fn test_auto_lat_after_placement() {
        let mut fixture = Fixture::new();
        let before = fixture.map.grid().clone();

        let mut mutation = PlaceTileMutation::new(CENTER, ROUGH).with_auto_lat(true);
        mutation.perform(&mut fixture.ctx()).unwrap();
        // A lone rough cell becomes the isolated transition tile
        assert_eq!(tile_at(&fixture, CENTER), (ROUGH_LAT_START + 15, 0));

        mutation.undo(&mut fixture.ctx());
        assert!(fixture.map.grid().same_cells(&before));
    }

    #[test]
    fn test_perform_again_after_undo() {
        let mut fixture = Fixture::new();
        let before = fixture.map.grid().clone();
        let mut mutation = PlaceTileMutation::new(CENTER, WATER);
        for _ in 0..3 {
            mutation.perform(&mut fixture.ctx()).unwrap();
            assert_eq!(tile_at(&fixture, CENTER).0, WATER);
            mutation.undo(&mut fixture.ctx());
            assert!(fixture.map.grid().same_cells(&before));
        }
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "performed twice")]
    fn test_double_perform_panics() {
        let mut fixture = Fixture::new();
        let mut mutation = PlaceTileMutation::new(CENTER, WATER);
        mutation.perform(&mut fixture.ctx()).unwrap();
        let _ = mutation.perform(&mut fixture.ctx());
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "undone before perform")]
    fn test_undo_without_perform_panics() {
        let mut fixture = Fixture::new();
        PlaceTileMutation::new(CENTER, WATER).undo(&mut fixture.ctx());
    }

    #[test]
    fn test_unknown_tile_is_rejected() {
        let mut fixture = Fixture::new();
        let before = fixture.map.grid().clone();

        let result = PlaceTileMutation::new(CENTER, 999).perform(&mut fixture.ctx());
        assert_eq!(result, Err(MutationRejected::UnknownTile(999)));
        assert!(fixture.map.grid().same_cells(&before));
    }

    #[test]
    fn test_off_map_is_rejected() {
        let mut fixture = Fixture::new();
        let result = PlaceTileMutation::new(Point::new(-5, -5), ROUGH).perform(&mut fixture.ctx());
        assert_eq!(result, Err(MutationRejected::MissingCell(Point::new(-5, -5))));
        assert!(fixture.refresh.is_empty());
    }
}
