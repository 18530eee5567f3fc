//! Seeded procedural terrain generation from a preset

use std::collections::HashSet;

use isomap_core::{ObjectKind, ObjectSlot, PlacedObject, Point};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::debug;
use uuid::{Builder, Uuid};

use super::{expanded_bounds, Mutation, MutationContext, MutationRejected, TileUndoLog};
use crate::generator::TerrainGeneratorPreset;

/// Seeded procedural decoration of a set of cells.
///
/// Terrain object groups run first, then tile groups. Every group walks all
/// target cells in order and rolls its open chance, or its overlap chance
/// when an earlier group already occupied the cell. Cells a group claims
/// only count as occupied for later groups. The touched area is smoothed
/// with Auto-LAT afterwards.
///
/// Trees are only planted on cells without any ground object. A run that
/// changes nothing is rejected so it never reaches the history.
///
/// The RNG is reseeded on every `perform`, so redo reproduces the same map.
pub struct GenerateTerrainMutation {
    preset: TerrainGeneratorPreset,
    cells: Vec<Point>,
    seed: u64,
    undo: TileUndoLog,
    placed_objects: Vec<Uuid>,
    performed: bool,
}

impl GenerateTerrainMutation {
    pub fn new(preset: TerrainGeneratorPreset, cells: Vec<Point>, seed: u64) -> Self {
        Self {
            preset,
            cells,
            seed,
            undo: TileUndoLog::default(),
            placed_objects: Vec::new(),
            performed: false,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

fn roll(rng: &mut SmallRng, occupied: bool, open_chance: f64, overlap_chance: f64) -> bool {
    let chance = if occupied { overlap_chance } else { open_chance };
    rng.gen::<f64>() < chance
}

impl Mutation for GenerateTerrainMutation {
    fn perform(&mut self, ctx: &mut MutationContext<'_>) -> Result<(), MutationRejected> {
        debug_assert!(!self.performed, "Generate Terrain performed twice without undo");
        if self.cells.is_empty() || self.preset.is_empty() {
            return Err(MutationRejected::NothingToChange);
        }
        let catalog = ctx.catalog;
        let mut tile_choices = Vec::with_capacity(self.preset.tile_groups.len());
        for group in &self.preset.tile_groups {
            let tile_set = catalog
                .tile_set(group.tile_set)
                .ok_or(MutationRejected::UnknownTileSet(group.tile_set))?;
            let choices: Vec<u32> = if group.tile_indices_in_set.is_empty() {
                tile_set.tile_range().collect()
            } else {
                group
                    .tile_indices_in_set
                    .iter()
                    .filter(|&&i| i < tile_set.tiles_in_set)
                    .map(|i| tile_set.start_tile_index + i)
                    .collect()
            };
            tile_choices.push(choices);
        }

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let targets: HashSet<Point> = self.cells.iter().copied().collect();
        let mut occupied: HashSet<Point> = self
            .cells
            .iter()
            .copied()
            .filter(|p| ctx.grid().cell(*p).is_some_and(|c| c.has_ground_object()))
            .collect();

        let mut placed_objects = Vec::new();
        for group in &self.preset.terrain_object_groups {
            if group.type_names.is_empty() {
                continue;
            }
            let mut claimed = HashSet::new();
            for &point in &self.cells {
                let Some(cell) = ctx.grid().cell(point) else {
                    continue;
                };
                let blocked = cell.has_ground_object();
                if !roll(
                    &mut rng,
                    occupied.contains(&point),
                    group.open_chance,
                    group.overlap_chance,
                ) {
                    continue;
                }
                let type_name = &group.type_names[rng.gen_range(0..group.type_names.len())];
                let id = Builder::from_random_bytes(rng.gen()).into_uuid();
                if blocked {
                    continue;
                }

                ctx.grid_mut()
                    .place_object(point, ObjectSlot::TerrainObject, id);
                ctx.map.insert_object(PlacedObject {
                    id,
                    kind: ObjectKind::TerrainObject,
                    type_name: type_name.clone(),
                    owner: None,
                    position: point,
                    sub_cell: 0,
                });
                placed_objects.push(id);
                claimed.insert(point);
            }
            occupied.extend(claimed);
        }

        let mut undo = TileUndoLog::default();
        for (group, choices) in self.preset.tile_groups.iter().zip(&tile_choices) {
            if choices.is_empty() {
                continue;
            }
            let mut claimed: HashSet<Point> = HashSet::new();
            for &point in &self.cells {
                if ctx.grid().cell(point).is_none() {
                    continue;
                }
                if !roll(
                    &mut rng,
                    occupied.contains(&point),
                    group.open_chance,
                    group.overlap_chance,
                ) {
                    continue;
                }
                let tile_index = choices[rng.gen_range(0..choices.len())];
                let Some(graphics) = catalog.tile_graphics(tile_index) else {
                    continue;
                };
                let footprint: Vec<(u8, Point)> = graphics.footprint(point).collect();
                let fits = footprint.iter().all(|(_, p)| {
                    targets.contains(p) && !claimed.contains(p) && ctx.grid().cell(*p).is_some()
                });
                if !fits {
                    continue;
                }

                for (sub_tile, p) in footprint {
                    undo.capture(ctx.grid(), p);
                    ctx.grid_mut().set_tile(p, tile_index, sub_tile);
                    claimed.insert(p);
                }
            }
            occupied.extend(claimed);
        }

        let changes = ctx.apply_auto_lat(expanded_bounds(self.cells.iter().copied(), 1));
        undo.capture_lat_changes(&changes);
        if placed_objects.is_empty() && undo.points().next().is_none() {
            debug!("Generating '{}' changed nothing", self.preset.name);
            return Err(MutationRejected::NothingToChange);
        }

        debug!(
            "Generated '{}' over {} cells: {} objects, {} tiles changed (seed {})",
            self.preset.name,
            self.cells.len(),
            placed_objects.len(),
            undo.points().count(),
            self.seed
        );
        self.undo = undo;
        self.placed_objects = placed_objects;
        self.performed = true;
        ctx.refresh.invalidate_map();
        Ok(())
    }

    fn undo(&mut self, ctx: &mut MutationContext<'_>) {
        debug_assert!(self.performed, "Generate Terrain undone before perform");
        self.performed = false;
        self.undo.restore(ctx.grid_mut());
        for id in self.placed_objects.drain(..).rev() {
            if let Some(object) = ctx.map.remove_object(id) {
                ctx.grid_mut()
                    .remove_object(object.position, ObjectSlot::TerrainObject);
            }
        }
        ctx.refresh.invalidate_map();
    }

    fn description(&self) -> &str {
        "Generate Terrain"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{TerrainObjectGroup, TileGroup};
    use crate::mutations::test_support::*;
    use isomap_core::BrushSize;

    fn area() -> Vec<Point> {
        BrushSize::new(5, 5).cells(CENTER.offset(-2, -2)).collect()
    }

    fn forest_preset() -> TerrainGeneratorPreset {
        let mut preset = TerrainGeneratorPreset::new("Forest");
        preset.terrain_object_groups.push(TerrainObjectGroup::new(
            vec!["TREE01".to_string(), "TREE02".to_string()],
            0.5,
            0.1,
        ));
        preset.tile_groups.push(TileGroup::new(1, 0.4, 0.2));
        preset
    }

    #[test]
    fn test_same_seed_same_result() {
        let mut first = Fixture::new();
        let mut second = Fixture::new();

        GenerateTerrainMutation::new(forest_preset(), area(), 42)
            .perform(&mut first.ctx())
            .unwrap();
        GenerateTerrainMutation::new(forest_preset(), area(), 42)
            .perform(&mut second.ctx())
            .unwrap();

        assert!(first.map.grid().same_cells(second.map.grid()));
        assert_eq!(first.map.object_count(), second.map.object_count());
        for object in first.map.objects() {
            assert_eq!(
                second.map.object(object.id).map(|o| o.position),
                Some(object.position)
            );
        }
    }

    #[test]
    fn test_undo_restores_tiles_and_objects() {
        let mut fixture = Fixture::new();
        let before = fixture.map.grid().clone();

        let mut mutation = GenerateTerrainMutation::new(forest_preset(), area(), 7);
        mutation.perform(&mut fixture.ctx()).unwrap();
        assert!(!fixture.map.grid().same_cells(&before));
        assert!(fixture.refresh.is_map_invalidated());

        mutation.undo(&mut fixture.ctx());
        assert!(fixture.map.grid().same_cells(&before));
        assert_eq!(fixture.map.object_count(), 0);
    }

    #[test]
    fn test_certain_chances_cover_every_free_cell() {
        let mut fixture = Fixture::new();
        let existing = PlacedObject::new(ObjectKind::TerrainObject, "TREE02", CENTER);
        let existing_id = existing.id;
        fixture
            .map
            .grid_mut()
            .place_object(CENTER, ObjectSlot::TerrainObject, existing_id);
        fixture.map.insert_object(existing);

        let mut preset = TerrainGeneratorPreset::new("Dense");
        preset.terrain_object_groups.push(TerrainObjectGroup::new(
            vec!["TREE01".to_string()],
            1.0,
            0.0,
        ));
        GenerateTerrainMutation::new(preset, area(), 1)
            .perform(&mut fixture.ctx())
            .unwrap();

        let grid = fixture.map.grid();
        for point in area() {
            assert!(grid.cell(point).unwrap().terrain_object.is_some());
        }
        assert_eq!(grid.cell(CENTER).unwrap().terrain_object, Some(existing_id));
        assert_eq!(fixture.map.object_count(), 25);
    }

    #[test]
    fn test_trees_skip_cells_with_units_and_buildings() {
        let mut fixture = Fixture::new();
        let tank = PlacedObject::new(ObjectKind::Vehicle, "MTNK", CENTER);
        let tank_id = tank.id;
        fixture.map.grid_mut().place_object(CENTER, ObjectSlot::Vehicle, tank_id);
        fixture.map.insert_object(tank);
        let soldier_at = CENTER.offset(1, 0);
        fixture
            .map
            .grid_mut()
            .place_object(soldier_at, ObjectSlot::Infantry(0), Uuid::new_v4());

        let mut preset = TerrainGeneratorPreset::new("Dense");
        preset.terrain_object_groups.push(TerrainObjectGroup::new(
            vec!["TREE01".to_string()],
            1.0,
            1.0,
        ));
        GenerateTerrainMutation::new(preset, area(), 4)
            .perform(&mut fixture.ctx())
            .unwrap();

        let grid = fixture.map.grid();
        assert_eq!(grid.cell(CENTER).unwrap().terrain_object, None);
        assert_eq!(grid.cell(CENTER).unwrap().vehicle, Some(tank_id));
        assert_eq!(grid.cell(soldier_at).unwrap().terrain_object, None);
        assert_eq!(fixture.map.object_count(), 1 + 23);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "undone before perform")]
    fn test_undo_without_perform_panics() {
        let mut fixture = Fixture::new();
        GenerateTerrainMutation::new(forest_preset(), area(), 0).undo(&mut fixture.ctx());
    }

    #[test]
    fn test_tile_group_then_auto_lat() {
        let mut fixture = Fixture::new();
        let cells: Vec<Point> = BrushSize::new(3, 3).cells(CENTER.offset(-1, -1)).collect();
        let mut preset = TerrainGeneratorPreset::new("Rough patch");
        preset
            .tile_groups
            .push(TileGroup::new(1, 1.0, 1.0).with_tiles(vec![0]));

        GenerateTerrainMutation::new(preset, cells.clone(), 3)
            .perform(&mut fixture.ctx())
            .unwrap();

        let grid = fixture.map.grid();
        // Surrounded center keeps its ground tile, the rim turns into transitions
        assert_eq!(grid.cell(CENTER).unwrap().tile_index, ROUGH);
        let corner = grid.cell(cells[0]).unwrap().tile_index;
        assert!((ROUGH_LAT_START..ROUGH_LAT_START + 16).contains(&corner));
        assert_eq!(grid.cell(CENTER.offset(3, 0)).unwrap().tile_index, CLEAR);
    }

    #[test]
    fn test_rejections() {
        let mut fixture = Fixture::new();
        assert_eq!(
            GenerateTerrainMutation::new(forest_preset(), Vec::new(), 0)
                .perform(&mut fixture.ctx()),
            Err(MutationRejected::NothingToChange)
        );
        assert_eq!(
            GenerateTerrainMutation::new(TerrainGeneratorPreset::new("Empty"), area(), 0)
                .perform(&mut fixture.ctx()),
            Err(MutationRejected::NothingToChange)
        );

        let mut never = TerrainGeneratorPreset::new("Never");
        never.tile_groups.push(TileGroup::new(1, 0.0, 0.0));
        never.terrain_object_groups.push(TerrainObjectGroup::new(
            vec!["TREE01".to_string()],
            0.0,
            0.0,
        ));
        let before = fixture.map.grid().clone();
        assert_eq!(
            GenerateTerrainMutation::new(never, area(), 0).perform(&mut fixture.ctx()),
            Err(MutationRejected::NothingToChange)
        );
        assert!(fixture.map.grid().same_cells(&before));

        let mut preset = TerrainGeneratorPreset::new("Broken");
        preset.tile_groups.push(TileGroup::new(42, 1.0, 1.0));
        assert_eq!(
            GenerateTerrainMutation::new(preset, area(), 0).perform(&mut fixture.ctx()),
            Err(MutationRejected::UnknownTileSet(42))
        );
        assert_eq!(fixture.map.object_count(), 0);
    }
}
