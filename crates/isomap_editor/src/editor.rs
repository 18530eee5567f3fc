//! The editing session: an open map plus everything mutations need

use std::path::Path;

use isomap_autotile::AutoLatResolver;
use isomap_core::{Point, Theater};
use tracing::{debug, info};

use crate::config::EditorConfig;
use crate::generator::TerrainGeneratorPreset;
use crate::history::MutationHistory;
use crate::map::{Map, MapError, MapLoadReport};
use crate::mutations::{Mutation, MutationContext, MutationRejected};
use crate::refresh::RefreshTracker;

/// An open map with its catalog, Auto-LAT grounds and undo history
pub struct MapEditor {
    map: Map,
    theater: Theater,
    auto_lat: AutoLatResolver,
    presets: Vec<TerrainGeneratorPreset>,
    refresh: RefreshTracker,
    history: MutationHistory,
}

impl MapEditor {
    pub fn new(map: Map, config: &EditorConfig) -> Self {
        Self {
            map,
            theater: config.theater.clone(),
            auto_lat: AutoLatResolver::new(config.auto_lat_grounds.clone()),
            presets: config.generator_presets.clone(),
            refresh: RefreshTracker::new(),
            history: MutationHistory::new(),
        }
    }

    /// Open a map file using the configured theater
    pub fn open(path: &Path, config: &EditorConfig) -> Result<(Self, MapLoadReport), MapError> {
        let (map, report) = Map::load(path, &config.theater)?;
        info!(
            "Opened {}: {} tiles placed, {} skipped",
            path.display(),
            report.tiles.placed,
            report.tiles.skipped()
        );
        Ok((Self::new(map, config), report))
    }

    /// Save the map. History is kept so editing can continue.
    pub fn save(&mut self, path: &Path) -> Result<(), MapError> {
        self.map.save(path)
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn theater(&self) -> &Theater {
        &self.theater
    }

    pub fn auto_lat(&self) -> &AutoLatResolver {
        &self.auto_lat
    }

    pub fn history(&self) -> &MutationHistory {
        &self.history
    }

    /// Find a terrain generator preset by name
    pub fn preset(&self, name: &str) -> Option<&TerrainGeneratorPreset> {
        self.presets.iter().find(|p| p.name == name)
    }

    /// Perform a mutation and record it for undo
    pub fn perform<M>(&mut self, mutation: M) -> Result<(), MutationRejected>
    where
        M: Mutation + 'static,
    {
        let description = mutation.description().to_string();
        let mut ctx = MutationContext::new(
            &mut self.map,
            &self.theater,
            &self.auto_lat,
            &mut self.refresh,
        );
        let result = self.history.perform(Box::new(mutation), &mut ctx);
        if let Err(rejected) = &result {
            debug!("{} rejected: {}", description, rejected);
        }
        result
    }

    pub fn undo(&mut self) -> bool {
        let mut ctx = MutationContext::new(
            &mut self.map,
            &self.theater,
            &self.auto_lat,
            &mut self.refresh,
        );
        self.history.undo(&mut ctx)
    }

    pub fn redo(&mut self) -> Result<bool, MutationRejected> {
        let mut ctx = MutationContext::new(
            &mut self.map,
            &self.theater,
            &self.auto_lat,
            &mut self.refresh,
        );
        self.history.redo(&mut ctx)
    }

    /// Drain pending redraw requests
    pub fn take_refresh(&mut self) -> RefreshTracker {
        self.refresh.take()
    }

    /// Drain the grid coordinates written since the last call
    pub fn take_changed_cells(&mut self) -> Vec<Point> {
        self.map.take_changed_cells()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::TileGroup;
    use crate::mutations::test_support::*;
    use crate::mutations::{FillAreaMutation, GenerateTerrainMutation, PlaceTileMutation};
    use isomap_core::BrushSize;

    fn config() -> EditorConfig {
        let mut config = EditorConfig::new(test_theater());
        config.auto_lat_grounds = test_resolver().grounds().to_vec();
        let mut preset = TerrainGeneratorPreset::new("Rough patches");
        preset.tile_groups.push(TileGroup::new(1, 0.6, 0.0));
        config.generator_presets.push(preset);
        config
    }

    #[test]
    fn test_edit_undo_redo() {
        let config = config();
        let mut editor = MapEditor::new(Map::new_blank("TEMPERATE", 10, 10), &config);
        let blank = editor.map().grid().clone();

        editor
            .perform(PlaceTileMutation::new(CENTER, ROUGH).with_auto_lat(true))
            .unwrap();
        assert!(editor.map().is_modified());
        assert!(!editor.take_refresh().is_empty());
        assert!(editor.take_refresh().is_empty());

        assert!(editor.undo());
        assert!(editor.map().grid().same_cells(&blank));
        assert_eq!(editor.redo(), Ok(true));
        assert_eq!(
            editor.map().grid().cell(CENTER).unwrap().tile_index,
            ROUGH_LAT_START + 15
        );

        let rejected = editor.perform(PlaceTileMutation::new(Point::ZERO, ROUGH));
        assert!(rejected.is_err());
        assert_eq!(editor.history().undo_len(), 1);
    }

    #[test]
    fn test_changed_cells_drain_between_edits() {
        let config = config();
        let mut editor = MapEditor::new(Map::new_blank("TEMPERATE", 10, 10), &config);
        assert!(editor.take_changed_cells().is_empty());

        for _ in 0..20 {
            editor.perform(FillAreaMutation::new(CENTER, WATER)).unwrap();
            assert!(editor.undo());
        }
        let changed = editor.take_changed_cells();
        assert!(changed.contains(&CENTER));
        assert!(!editor.map().grid().has_changes());
        assert!(editor.take_changed_cells().is_empty());

        editor.perform(PlaceTileMutation::new(CENTER, ROUGH)).unwrap();
        assert_eq!(editor.take_changed_cells(), vec![CENTER]);
        assert!(editor.take_changed_cells().is_empty());
    }

    #[test]
    fn test_generate_from_preset() {
        let config = config();
        let mut editor = MapEditor::new(Map::new_blank("TEMPERATE", 10, 10), &config);
        let preset = editor.preset("Rough patches").unwrap().clone();
        let cells: Vec<Point> = BrushSize::new(4, 4).cells(CENTER.offset(-2, -2)).collect();

        editor
            .perform(GenerateTerrainMutation::new(preset, cells, 99))
            .unwrap();
        assert_eq!(editor.history().undo_description(), Some("Generate Terrain"));
        assert!(editor.preset("Missing").is_none());
    }

    #[test]
    fn test_save_and_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("edited.map");
        let config = config();

        let mut editor = MapEditor::new(Map::new_blank("TEMPERATE", 10, 10), &config);
        editor
            .perform(PlaceTileMutation::new(CENTER, WATER).with_brush(BrushSize::new(2, 2)))
            .unwrap();
        editor.save(&path).unwrap();
        assert!(!editor.map().is_modified());
        assert!(editor.history().can_undo());

        let (reopened, report) = MapEditor::open(&path, &config).unwrap();
        assert_eq!(report.tiles.placed, 4);
        assert!(reopened.map().grid().same_cells(editor.map().grid()));
    }
}
