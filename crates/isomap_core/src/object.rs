//! Objects placed on the map

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cell::ObjectSlot;
use crate::point::Point;

/// Category of a placed object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    TerrainObject,
    Structure,
    Vehicle,
    Aircraft,
    Infantry,
}

/// An object instance placed on a cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedObject {
    pub id: Uuid,
    pub kind: ObjectKind,
    /// INI type name, e.g. `TREE01` or `HTNK`
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    pub position: Point,
    /// Infantry sub-cell position, ignored for other kinds
    #[serde(default)]
    pub sub_cell: u8,
}

impl PlacedObject {
    pub fn new(kind: ObjectKind, type_name: impl Into<String>, position: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            type_name: type_name.into(),
            owner: None,
            position,
            sub_cell: 0,
        }
    }

    /// Set the owning house
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Set the infantry sub-cell
    pub fn with_sub_cell(mut self, sub_cell: u8) -> Self {
        self.sub_cell = sub_cell;
        self
    }

    /// The cell slot this object occupies
    pub fn slot(&self) -> ObjectSlot {
        match self.kind {
            ObjectKind::TerrainObject => ObjectSlot::TerrainObject,
            ObjectKind::Structure => ObjectSlot::Structure,
            ObjectKind::Vehicle => ObjectSlot::Vehicle,
            ObjectKind::Aircraft => ObjectSlot::Aircraft,
            ObjectKind::Infantry => ObjectSlot::Infantry(self.sub_cell),
        }
    }
}
