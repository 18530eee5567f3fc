//! Auto-LAT ground definitions

use isomap_core::TileCatalog;
use serde::{Deserialize, Serialize};

/// A ground type with automatic transition tiles.
///
/// The transition tile set holds 16 tiles ordered by pattern index, so the
/// tile for pattern `p` is `transition.start_tile_index + p`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoLatGround {
    /// Display name, e.g. "Rough"
    #[serde(default)]
    pub name: String,
    /// Tile set of the plain ground tiles
    pub ground_tile_set: usize,
    /// Tile set of the 16 transition tiles
    pub transition_tile_set: usize,
    /// Other tile sets that count as this ground when scanning neighbors
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub connect_to_tile_sets: Vec<usize>,
}

impl AutoLatGround {
    pub fn new(
        name: impl Into<String>,
        ground_tile_set: usize,
        transition_tile_set: usize,
    ) -> Self {
        Self {
            name: name.into(),
            ground_tile_set,
            transition_tile_set,
            connect_to_tile_sets: Vec::new(),
        }
    }

    /// Builder: add tile sets that connect to this ground
    pub fn with_connections(mut self, tile_sets: impl IntoIterator<Item = usize>) -> Self {
        self.connect_to_tile_sets.extend(tile_sets);
        self
    }

    /// Check whether a tile set is the ground or transition set
    pub fn owns_tile_set(&self, tile_set_index: usize) -> bool {
        tile_set_index == self.ground_tile_set || tile_set_index == self.transition_tile_set
    }

    /// Check whether a tile set counts as matching ground for neighbor scans
    pub fn matches_tile_set(&self, tile_set_index: usize) -> bool {
        self.owns_tile_set(tile_set_index) || self.connect_to_tile_sets.contains(&tile_set_index)
    }

    /// Check whether a tile belongs to this ground for neighbor scans
    pub fn matches_tile<C>(&self, catalog: &C, tile_index: u32) -> bool
    where
        C: TileCatalog + ?Sized,
    {
        catalog
            .tile_set_index_of(tile_index)
            .is_some_and(|ts| self.matches_tile_set(ts))
    }
}

/// Find the ground whose ground or transition set contains `tile_set_index`
pub fn ground_for_tile_set(
    grounds: &[AutoLatGround],
    tile_set_index: usize,
) -> Option<&AutoLatGround> {
    grounds.iter().find(|g| g.owns_tile_set(tile_set_index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_tile_sets() {
        let ground = AutoLatGround::new("Rough", 2, 3).with_connections([5]);
        assert!(ground.owns_tile_set(2));
        assert!(ground.owns_tile_set(3));
        assert!(!ground.owns_tile_set(5));
        assert!(ground.matches_tile_set(5));
        assert!(!ground.matches_tile_set(0));
    }

    #[test]
    fn test_ground_lookup() {
        let grounds = vec![AutoLatGround::new("Rough", 2, 3), AutoLatGround::new("Sand", 4, 5)];
        assert_eq!(ground_for_tile_set(&grounds, 5).unwrap().name, "Sand");
        assert_eq!(ground_for_tile_set(&grounds, 2).unwrap().name, "Rough");
        assert!(ground_for_tile_set(&grounds, 0).is_none());
    }

    #[test]
    fn test_deserialize_without_connections() {
        let json = r#"{"name":"Rough","ground_tile_set":2,"transition_tile_set":3}"#;
        let ground: AutoLatGround = serde_json::from_str(json).unwrap();
        assert!(ground.connect_to_tile_sets.is_empty());
        assert_eq!(ground, AutoLatGround::new("Rough", 2, 3));
    }
}
