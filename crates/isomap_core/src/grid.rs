//! Bounds-checked cell storage

use uuid::Uuid;

use crate::cell::{Cell, ObjectSlot, Overlay};
use crate::point::Point;

/// A rectangular grid of optional cells.
///
/// A slot can be empty (never placed), which is distinct from a clear-ground
/// cell. Every accessor is bounds-checked: out-of-range coordinates behave
/// like empty slots so neighbor scans near the map edge need no special
/// casing.
///
/// Terrain writes push the touched coordinate onto a change list that the
/// renderer drains with [`CellGrid::take_changed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellGrid {
    width: u32,
    height: u32,
    cells: Vec<Option<Cell>>,
    changed: Vec<Point>,
}

impl CellGrid {
    /// Create an empty grid
    ///
    /// # Panics
    ///
    /// Panics if `width * height` does not fit in a `u32`.
    pub fn new(width: u32, height: u32) -> Self {
        let Some(size) = width.checked_mul(height) else {
            panic!("grid {width}x{height} has more than u32::MAX cells");
        };
        let size = size as usize;
        Self {
            width,
            height,
            cells: vec![None; size],
            changed: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Check whether a coordinate lies inside the grid
    pub fn contains(&self, point: Point) -> bool {
        point.x >= 0 && point.y >= 0 && point.x < self.width as i32 && point.y < self.height as i32
    }

    fn index(&self, point: Point) -> Option<usize> {
        if self.contains(point) {
            Some(point.y as usize * self.width as usize + point.x as usize)
        } else {
            None
        }
    }

    fn point_at(&self, index: usize) -> Point {
        let width = self.width as usize;
        Point::new((index % width) as i32, (index / width) as i32)
    }

    /// Get the cell at a coordinate, `None` if out of bounds or never placed
    pub fn cell(&self, point: Point) -> Option<&Cell> {
        self.index(point).and_then(|i| self.cells[i].as_ref())
    }

    /// Mutable access to a placed cell. Marks the cell as changed.
    pub fn cell_mut(&mut self, point: Point) -> Option<&mut Cell> {
        let index = self.index(point)?;
        let cell = self.cells[index].as_mut()?;
        self.changed.push(point);
        Some(cell)
    }

    /// Place a cell, returning the cell that was there before.
    /// Out-of-bounds placements are ignored and hand the cell back as `Err`.
    pub fn place_cell(&mut self, point: Point, cell: Cell) -> Result<Option<Cell>, Cell> {
        let Some(index) = self.index(point) else {
            return Err(cell);
        };
        self.changed.push(point);
        Ok(self.cells[index].replace(cell))
    }

    /// Remove a cell entirely, leaving an empty slot
    pub fn remove_cell(&mut self, point: Point) -> Option<Cell> {
        let index = self.index(point)?;
        let removed = self.cells[index].take();
        if removed.is_some() {
            self.changed.push(point);
        }
        removed
    }

    /// Change the terrain identity of a placed cell
    pub fn set_tile(&mut self, point: Point, tile_index: u32, sub_tile_index: u8) -> bool {
        match self.cell_mut(point) {
            Some(cell) => {
                cell.tile_index = tile_index;
                cell.sub_tile_index = sub_tile_index;
                true
            }
            None => false,
        }
    }

    /// Change the height level of a placed cell
    pub fn set_level(&mut self, point: Point, level: u8) -> bool {
        match self.cell_mut(point) {
            Some(cell) => {
                cell.level = level;
                true
            }
            None => false,
        }
    }

    /// Replace the overlay of a placed cell, returning the previous overlay
    pub fn set_overlay(&mut self, point: Point, overlay: Option<Overlay>) -> Option<Overlay> {
        let cell = self.cell_mut(point)?;
        std::mem::replace(&mut cell.overlay, overlay)
    }

    /// Put an object into a cell slot.
    ///
    /// Returns `false` if the cell does not exist or the slot is invalid.
    ///
    /// # Panics
    ///
    /// Panics if the slot is already occupied. Callers check occupancy first.
    pub fn place_object(&mut self, point: Point, slot: ObjectSlot, id: Uuid) -> bool {
        let Some(index) = self.index(point) else {
            return false;
        };
        let Some(occupant) = self.cells[index].as_mut().and_then(|c| c.object_mut(slot)) else {
            return false;
        };
        assert!(
            occupant.is_none(),
            "cell {point} slot {slot:?} is already occupied"
        );
        *occupant = Some(id);
        true
    }

    /// Clear an object slot, returning its previous occupant
    pub fn remove_object(&mut self, point: Point, slot: ObjectSlot) -> Option<Uuid> {
        let index = self.index(point)?;
        self.cells[index]
            .as_mut()
            .and_then(|c| c.object_mut(slot))
            .and_then(|occupant| occupant.take())
    }

    /// Row-major traversal of every placed cell
    pub fn valid_cells(&self) -> impl Iterator<Item = (Point, &Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.as_ref().map(|cell| (self.point_at(i), cell)))
    }

    /// Invoke `action` once for every placed cell in row-major order
    pub fn do_for_all_valid_tiles<F>(&self, mut action: F)
    where
        F: FnMut(Point, &Cell),
    {
        for (point, cell) in self.valid_cells() {
            action(point, cell);
        }
    }

    /// Invoke `action` once for every placed cell, allowing in-place edits
    pub fn do_for_all_valid_tiles_mut<F>(&mut self, mut action: F)
    where
        F: FnMut(Point, &mut Cell),
    {
        let width = self.width as usize;
        for (i, slot) in self.cells.iter_mut().enumerate() {
            if let Some(cell) = slot {
                let point = Point::new((i % width) as i32, (i / width) as i32);
                action(point, cell);
                self.changed.push(point);
            }
        }
    }

    /// Number of placed cells
    pub fn cell_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Check if any cell changed since the last [`CellGrid::take_changed`]
    pub fn has_changes(&self) -> bool {
        !self.changed.is_empty()
    }

    /// Drain the list of changed coordinates (may contain duplicates)
    pub fn take_changed(&mut self) -> Vec<Point> {
        std::mem::take(&mut self.changed)
    }

    /// Compare placed cells only, ignoring the change list
    pub fn same_cells(&self, other: &CellGrid) -> bool {
        self.width == other.width && self.height == other.height && self.cells == other.cells
    }
}
