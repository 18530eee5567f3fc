//! Auto-LAT transition resolution
//!
//! A cell's pattern is found by testing its four diamond neighbors (plus the
//! center) against a fixed table of 16 masks, in order. The first mask that
//! matches wins.

use std::collections::HashSet;

use isomap_core::{Cell, CellGrid, Point, TileCatalog, AUTO_LAT_NEIGHBORS};
use tracing::{debug, warn};

use crate::ground::{ground_for_tile_set, AutoLatGround};
use crate::pattern::{sides, LatPattern};

const NORTH: usize = 0;
const WEST: usize = 1;
const CENTER: usize = 2;
const EAST: usize = 3;
const SOUTH: usize = 4;
const NEIGHBOR_COUNT: usize = 5;

type Mask = [bool; NEIGHBOR_COUNT];

/// Expected "neighbor matches ground" state per pattern, in neighbor order
const fn build_masks() -> [Mask; LatPattern::COUNT] {
    let mut masks = [[true; NEIGHBOR_COUNT]; LatPattern::COUNT];
    let mut i = 0;
    while i < LatPattern::COUNT {
        let bits = i as u8;
        masks[i][NORTH] = bits & sides::NE == 0;
        masks[i][WEST] = bits & sides::NW == 0;
        masks[i][CENTER] = true;
        masks[i][EAST] = bits & sides::SE == 0;
        masks[i][SOUTH] = bits & sides::SW == 0;
        i += 1;
    }
    masks
}

/// Outcome of resolving one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoLatResult {
    /// All four neighbors match: plain ground. Existing ground tiles are kept,
    /// transition tiles become `ground_tile`.
    Surrounded { ground_tile: u32 },
    /// Transition tile for a partially surrounded cell
    Transition { pattern: LatPattern, tile_index: u32 },
}

impl AutoLatResult {
    pub fn pattern(&self) -> LatPattern {
        match self {
            AutoLatResult::Surrounded { .. } => LatPattern::NONE,
            AutoLatResult::Transition { pattern, .. } => *pattern,
        }
    }
}

/// A tile change made by [`AutoLatResolver::apply_auto_lat`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatChange {
    pub point: Point,
    pub old_tile_index: u32,
    pub old_sub_tile_index: u8,
    pub new_tile_index: u32,
}

/// Picks transition tiles for the configured grounds
#[derive(Debug, Clone, Default)]
pub struct AutoLatResolver {
    grounds: Vec<AutoLatGround>,
}

impl AutoLatResolver {
    const MASKS: [Mask; LatPattern::COUNT] = build_masks();

    pub fn new(grounds: Vec<AutoLatGround>) -> Self {
        Self { grounds }
    }

    pub fn grounds(&self) -> &[AutoLatGround] {
        &self.grounds
    }

    /// Ground whose ground or transition set contains `tile_index`
    pub fn ground_for_tile<C>(&self, catalog: &C, tile_index: u32) -> Option<&AutoLatGround>
    where
        C: TileCatalog + ?Sized,
    {
        let tile_set = catalog.tile_set_index_of(tile_index)?;
        ground_for_tile_set(&self.grounds, tile_set)
    }

    /// Resolve the pattern of `point` for `ground`.
    ///
    /// A neighbor matches when its tile is in the ground, transition or a
    /// connected tile set. Missing and out-of-bounds neighbors never match.
    pub fn resolve<C>(
        &self,
        grid: &CellGrid,
        catalog: &C,
        point: Point,
        ground: &AutoLatGround,
    ) -> Option<AutoLatResult>
    where
        C: TileCatalog + ?Sized,
    {
        self.resolve_with(grid, catalog, point, ground, |_, cell| {
            cell.is_some_and(|c| ground.matches_tile(catalog, c.tile_index))
        })
    }

    /// Resolve with a caller-supplied "matches ground" predicate
    pub fn resolve_with<C, F>(
        &self,
        grid: &CellGrid,
        catalog: &C,
        point: Point,
        ground: &AutoLatGround,
        mut matches: F,
    ) -> Option<AutoLatResult>
    where
        C: TileCatalog + ?Sized,
        F: FnMut(Point, Option<&Cell>) -> bool,
    {
        let mut state: Mask = [false; NEIGHBOR_COUNT];
        for (slot, offset) in state.iter_mut().zip(AUTO_LAT_NEIGHBORS) {
            let neighbor = point + offset;
            *slot = matches(neighbor, grid.cell(neighbor));
        }

        let index = Self::MASKS.iter().position(|mask| *mask == state)?;
        let pattern = LatPattern::new(index as u8)?;

        if pattern == LatPattern::NONE {
            let Some(ground_set) = catalog.tile_set(ground.ground_tile_set) else {
                warn!(
                    "Auto-LAT ground '{}' has no tile set {}",
                    ground.name, ground.ground_tile_set
                );
                return None;
            };
            return Some(AutoLatResult::Surrounded {
                ground_tile: ground_set.start_tile_index,
            });
        }

        let Some(transition) = catalog.tile_set(ground.transition_tile_set) else {
            warn!(
                "Auto-LAT ground '{}' has no transition tile set {}",
                ground.name, ground.transition_tile_set
            );
            return None;
        };
        if pattern.index() as u32 >= transition.tiles_in_set {
            warn!(
                "Transition set '{}' has no tile for pattern {}",
                transition.name, pattern
            );
            return None;
        }

        Some(AutoLatResult::Transition {
            pattern,
            tile_index: transition.start_tile_index + pattern.index() as u32,
        })
    }

    /// Tile the cell at `point` should have, or `None` if it should stay as is.
    ///
    /// Only cells whose tile is in a configured ground or transition set are
    /// touched.
    pub fn desired_tile<C>(&self, grid: &CellGrid, catalog: &C, point: Point) -> Option<u32>
    where
        C: TileCatalog + ?Sized,
    {
        let cell = grid.cell(point)?;
        let tile_set = catalog.tile_set_index_of(cell.tile_index)?;
        let ground = ground_for_tile_set(&self.grounds, tile_set)?;

        match self.resolve(grid, catalog, point, ground)? {
            AutoLatResult::Surrounded { ground_tile } => {
                (tile_set == ground.transition_tile_set).then_some(ground_tile)
            }
            AutoLatResult::Transition { tile_index, .. } => {
                (tile_index != cell.tile_index || cell.sub_tile_index != 0).then_some(tile_index)
            }
        }
    }

    /// Re-resolve every cell of `region` and write the results.
    ///
    /// All cells are resolved against the grid as it was before the call, then
    /// written. Returns the changes in region order.
    pub fn apply_auto_lat<C, I>(
        &self,
        grid: &mut CellGrid,
        catalog: &C,
        region: I,
    ) -> Vec<LatChange>
    where
        C: TileCatalog + ?Sized,
        I: IntoIterator<Item = Point>,
    {
        let mut seen = HashSet::new();
        let mut changes = Vec::new();

        for point in region {
            if !seen.insert(point) {
                continue;
            }
            let Some(new_tile_index) = self.desired_tile(grid, catalog, point) else {
                continue;
            };
            let Some(cell) = grid.cell(point) else {
                continue;
            };
            changes.push(LatChange {
                point,
                old_tile_index: cell.tile_index,
                old_sub_tile_index: cell.sub_tile_index,
                new_tile_index,
            });
        }

        for change in &changes {
            grid.set_tile(change.point, change.new_tile_index, 0);
        }

        if !changes.is_empty() {
            debug!("Auto-LAT changed {} cells", changes.len());
        }
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use isomap_core::{TerrainClass, Theater, TheaterDefinition, TileSetDefinition};

    const CLEAR: u32 = 0;
    const ROUGH: u32 = 1;
    const ROUGH_LAT_START: u32 = 3;
    const PAVE: u32 = 19;

    /// Sets: 0 Clear (1), 1 Rough (2), 2 RoughLAT (16), 3 Pave (1)
    fn test_theater() -> Theater {
        Theater::new(TheaterDefinition {
            name: "Temperate".to_string(),
            tile_sets: vec![
                TileSetDefinition::new("Clear", 1, TerrainClass::Clear),
                TileSetDefinition::new("Rough", 2, TerrainClass::Rough),
                TileSetDefinition::new("RoughLAT", 16, TerrainClass::Rough),
                TileSetDefinition::new("Pave", 1, TerrainClass::Road),
            ],
            ..Default::default()
        })
    }

    fn resolver() -> AutoLatResolver {
        AutoLatResolver::new(vec![AutoLatGround::new("Rough", 1, 2).with_connections([3])])
    }

    fn clear_grid(size: u32) -> CellGrid {
        let mut grid = CellGrid::new(size, size);
        for y in 0..size as i32 {
            for x in 0..size as i32 {
                grid.place_cell(Point::new(x, y), Cell::new(CLEAR, 0, 0, 0)).unwrap();
            }
        }
        grid
    }

    fn paint(grid: &mut CellGrid, points: &[(i32, i32)], tile: u32) {
        for &(x, y) in points {
            grid.set_tile(Point::new(x, y), tile, 0);
        }
    }

    fn rough_ground() -> AutoLatGround {
        resolver().grounds()[0].clone()
    }

    #[test]
    fn test_mask_table() {
        let masks = AutoLatResolver::MASKS;
        assert_eq!(masks[0], [true; 5]);
        assert_eq!(masks[15], [false, false, true, false, false]);
        // NE: only the north neighbor differs
        assert_eq!(masks[1], [false, true, true, true, true]);
        // NW: only the west neighbor differs
        assert_eq!(masks[8], [true, false, true, true, true]);
        assert!(masks.iter().all(|m| m[CENTER]));
    }

    #[test]
    fn test_fully_surrounded_takes_first_pattern() {
        let theater = test_theater();
        let mut grid = clear_grid(5);
        paint(&mut grid, &[(2, 1), (1, 2), (2, 2), (3, 2), (2, 3)], ROUGH);

        let result = resolver().resolve(&grid, &theater, Point::new(2, 2), &rough_ground());
        assert_eq!(result, Some(AutoLatResult::Surrounded { ground_tile: ROUGH }));
        assert_eq!(result.unwrap().pattern(), LatPattern::NONE);
    }

    #[test]
    fn test_isolated_cell() {
        let theater = test_theater();
        let mut grid = clear_grid(5);
        paint(&mut grid, &[(2, 2)], ROUGH);

        let result = resolver().resolve(&grid, &theater, Point::new(2, 2), &rough_ground());
        assert_eq!(
            result,
            Some(AutoLatResult::Transition {
                pattern: LatPattern::ALL,
                tile_index: ROUGH_LAT_START + 15,
            })
        );
    }

    #[test]
    fn test_single_side_transition() {
        let theater = test_theater();
        let mut grid = clear_grid(5);
        paint(&mut grid, &[(1, 2), (2, 2), (3, 2), (2, 3)], ROUGH);

        let result = resolver()
            .resolve(&grid, &theater, Point::new(2, 2), &rough_ground())
            .unwrap();
        assert_eq!(result.pattern().name(), "NE");
        assert_eq!(
            result,
            AutoLatResult::Transition {
                pattern: LatPattern::new(1).unwrap(),
                tile_index: ROUGH_LAT_START + 1,
            }
        );
    }

    #[test]
    fn test_center_not_matching_has_no_pattern() {
        let theater = test_theater();
        let mut grid = clear_grid(5);
        paint(&mut grid, &[(2, 1), (1, 2), (3, 2), (2, 3)], ROUGH);

        assert_eq!(resolver().resolve(&grid, &theater, Point::new(2, 2), &rough_ground()), None);
        assert_eq!(resolver().desired_tile(&grid, &theater, Point::new(2, 2)), None);
    }

    #[test]
    fn test_map_edge_neighbors_do_not_match() {
        let theater = test_theater();
        let mut grid = clear_grid(3);
        paint(&mut grid, &[(0, 0), (1, 0), (0, 1)], ROUGH);

        let result = resolver()
            .resolve(&grid, &theater, Point::ZERO, &rough_ground())
            .unwrap();
        assert_eq!(result.pattern().name(), "NE_NW");
    }

    #[test]
    fn test_connected_tile_sets_match() {
        let theater = test_theater();
        let mut grid = clear_grid(5);
        paint(&mut grid, &[(2, 1), (1, 2), (2, 2), (3, 2)], ROUGH);
        paint(&mut grid, &[(2, 3)], PAVE);

        let result = resolver().resolve(&grid, &theater, Point::new(2, 2), &rough_ground());
        assert_eq!(result, Some(AutoLatResult::Surrounded { ground_tile: ROUGH }));
    }

    #[test]
    fn test_override_predicate() {
        let theater = test_theater();
        let grid = clear_grid(5);

        let result =
            resolver().resolve_with(&grid, &theater, Point::new(2, 2), &rough_ground(), |p, _| {
                p != Point::new(3, 2)
            });
        assert_eq!(result.unwrap().pattern().name(), "SE");
    }

    #[test]
    fn test_apply_to_blob() {
        let theater = test_theater();
        let mut grid = clear_grid(5);
        let blob: Vec<_> = (1..=3).flat_map(|y| (1..=3).map(move |x| (x, y))).collect();
        paint(&mut grid, &blob, ROUGH);

        let region: Vec<Point> = (0..5).flat_map(|y| (0..5).map(move |x| Point::new(x, y))).collect();
        let changes = resolver().apply_auto_lat(&mut grid, &theater, region.clone());

        assert_eq!(changes.len(), 8);
        // Top-left corner borders clear ground to the north and west
        assert_eq!(grid.cell(Point::new(1, 1)).unwrap().tile_index, ROUGH_LAT_START + 9);
        // Top edge borders clear ground to the north only
        assert_eq!(grid.cell(Point::new(2, 1)).unwrap().tile_index, ROUGH_LAT_START + 1);
        // Bottom-right corner: east and south
        assert_eq!(grid.cell(Point::new(3, 3)).unwrap().tile_index, ROUGH_LAT_START + 6);
        // Center stays plain ground
        assert_eq!(grid.cell(Point::new(2, 2)).unwrap().tile_index, ROUGH);
        assert_eq!(grid.cell(Point::ZERO).unwrap().tile_index, CLEAR);

        // Second pass is a no-op
        let again = resolver().apply_auto_lat(&mut grid, &theater, region);
        assert!(again.is_empty());
    }

    #[test]
    fn test_surrounded_transition_becomes_ground() {
        let theater = test_theater();
        let mut grid = clear_grid(5);
        paint(&mut grid, &[(2, 1), (1, 2), (3, 2), (2, 3)], ROUGH + 1);
        paint(&mut grid, &[(2, 2)], ROUGH_LAT_START + 4);

        let changes = resolver().apply_auto_lat(&mut grid, &theater, [Point::new(2, 2)]);
        assert_eq!(
            changes,
            vec![LatChange {
                point: Point::new(2, 2),
                old_tile_index: ROUGH_LAT_START + 4,
                old_sub_tile_index: 0,
                new_tile_index: ROUGH,
            }]
        );
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let theater = test_theater();
        let mut grid = clear_grid(8);
        paint(&mut grid, &[(2, 2), (3, 2), (3, 3), (5, 5), (6, 5), (1, 6)], ROUGH);

        let points: Vec<Point> = (0..8).flat_map(|y| (0..8).map(move |x| Point::new(x, y))).collect();
        let first: Vec<_> = points
            .iter()
            .map(|p| resolver().resolve(&grid, &theater, *p, &rough_ground()))
            .collect();
        let second: Vec<_> = points
            .iter()
            .map(|p| resolver().resolve(&grid, &theater, *p, &rough_ground()))
            .collect();
        assert_eq!(first, second);
    }
}
