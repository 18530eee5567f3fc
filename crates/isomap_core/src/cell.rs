//! Per-cell map state

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Highest terrain height level a cell can have
pub const MAX_LEVEL: u8 = 14;

/// Number of infantry sub-cell positions in one cell
pub const INFANTRY_SUB_CELLS: usize = 4;

/// An overlay (ore, walls, rubble...) occupying a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Overlay {
    /// Index into the theater's overlay type list
    pub overlay_type_index: u8,
    /// Frame within the overlay's variant set
    pub frame_index: u8,
}

impl Overlay {
    pub fn new(overlay_type_index: u8, frame_index: u8) -> Self {
        Self {
            overlay_type_index,
            frame_index,
        }
    }
}

/// An object slot of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectSlot {
    TerrainObject,
    Structure,
    Vehicle,
    Aircraft,
    /// Infantry sub-cell position, 0..=3
    Infantry(u8),
}

/// A single cell of the map grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Global index into the theater tile catalog
    pub tile_index: u32,
    /// Sub-tile of a multi-cell tile graphic (0 for 1x1 tiles)
    pub sub_tile_index: u8,
    /// Height level, 0..=14
    pub level: u8,
    /// Stored verbatim, not interpreted
    pub ice_growth: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay: Option<Overlay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terrain_object: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aircraft: Option<Uuid>,
    #[serde(default)]
    pub infantry: [Option<Uuid>; INFANTRY_SUB_CELLS],
}

impl Cell {
    /// Create a cell with the given terrain and no overlay or objects
    pub fn new(tile_index: u32, sub_tile_index: u8, level: u8, ice_growth: u8) -> Self {
        Self {
            tile_index,
            sub_tile_index,
            level,
            ice_growth,
            overlay: None,
            terrain_object: None,
            structure: None,
            vehicle: None,
            aircraft: None,
            infantry: [None; INFANTRY_SUB_CELLS],
        }
    }

    /// Flat clear ground; such cells are implied and not written to the tile pack
    pub fn is_default_terrain(&self) -> bool {
        self.level == 0 && self.tile_index == 0
    }

    /// Get the occupant of an object slot
    pub fn object(&self, slot: ObjectSlot) -> Option<Uuid> {
        match slot {
            ObjectSlot::TerrainObject => self.terrain_object,
            ObjectSlot::Structure => self.structure,
            ObjectSlot::Vehicle => self.vehicle,
            ObjectSlot::Aircraft => self.aircraft,
            ObjectSlot::Infantry(sub_cell) => self
                .infantry
                .get(sub_cell as usize)
                .copied()
                .flatten(),
        }
    }

    /// Mutable access to an object slot, `None` for an invalid infantry sub-cell
    pub fn object_mut(&mut self, slot: ObjectSlot) -> Option<&mut Option<Uuid>> {
        match slot {
            ObjectSlot::TerrainObject => Some(&mut self.terrain_object),
            ObjectSlot::Structure => Some(&mut self.structure),
            ObjectSlot::Vehicle => Some(&mut self.vehicle),
            ObjectSlot::Aircraft => Some(&mut self.aircraft),
            ObjectSlot::Infantry(sub_cell) => self.infantry.get_mut(sub_cell as usize),
        }
    }

    /// Check whether any ground object blocks terrain decoration of this cell
    pub fn has_ground_object(&self) -> bool {
        self.terrain_object.is_some()
            || self.structure.is_some()
            || self.vehicle.is_some()
            || self.infantry.iter().any(|i| i.is_some())
    }

    /// Index of the first free infantry sub-cell
    pub fn free_infantry_sub_cell(&self) -> Option<u8> {
        self.infantry
            .iter()
            .position(|i| i.is_none())
            .map(|i| i as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_terrain() {
        assert!(Cell::new(0, 0, 0, 0).is_default_terrain());
        assert!(!Cell::new(0, 0, 1, 0).is_default_terrain());
        assert!(!Cell::new(5, 0, 0, 0).is_default_terrain());
    }

    #[test]
    fn test_object_slots() {
        let mut cell = Cell::new(0, 0, 0, 0);
        let id = Uuid::new_v4();

        *cell.object_mut(ObjectSlot::Infantry(2)).unwrap() = Some(id);
        assert_eq!(cell.object(ObjectSlot::Infantry(2)), Some(id));
        assert_eq!(cell.free_infantry_sub_cell(), Some(0));
        assert!(cell.has_ground_object());

        // Sub-cell 4 does not exist
        assert!(cell.object_mut(ObjectSlot::Infantry(4)).is_none());
        assert_eq!(cell.object(ObjectSlot::Infantry(4)), None);
    }
}
