//! Brush and flood-fill area iteration
//!
//! Two neighborhoods are used by the editor and they are intentionally
//! different:
//! - [`AUTO_LAT_NEIGHBORS`] is the 5-cell diamond the transition tile art is
//!   authored against
//! - [`MOORE_NEIGHBORS`] is the 8-cell neighborhood used by terrain fills

use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

use crate::point::Point;

/// Auto-LAT neighbor offsets in mask order: North, West, Center, East, South
pub const AUTO_LAT_NEIGHBORS: [Point; 5] = [
    Point::new(0, -1),
    Point::new(-1, 0),
    Point::new(0, 0),
    Point::new(1, 0),
    Point::new(0, 1),
];

/// Orthogonal and diagonal neighbor offsets
pub const MOORE_NEIGHBORS: [Point; 8] = [
    Point::new(-1, -1),
    Point::new(0, -1),
    Point::new(1, -1),
    Point::new(-1, 0),
    Point::new(1, 0),
    Point::new(-1, 1),
    Point::new(0, 1),
    Point::new(1, 1),
];

/// A rectangular brush multiplying a single-cell edit over an area.
/// The clicked cell is the brush's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BrushSize {
    pub width: u32,
    pub height: u32,
}

impl Default for BrushSize {
    fn default() -> Self {
        Self::ONE
    }
}

impl BrushSize {
    pub const ONE: Self = Self::new(1, 1);

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Cells covered by the brush at `origin`, row-major
    pub fn cells(self, origin: Point) -> impl Iterator<Item = Point> {
        (0..self.height as i32)
            .flat_map(move |y| (0..self.width as i32).map(move |x| origin.offset(x, y)))
    }

    /// Origins for stamping a `tile_width x tile_height` graphic across the brush
    pub fn tile_origins(
        self,
        origin: Point,
        tile_width: u32,
        tile_height: u32,
    ) -> impl Iterator<Item = Point> {
        let step_x = tile_width.max(1) as i32;
        let step_y = tile_height.max(1) as i32;
        (0..self.height as i32).flat_map(move |y| {
            (0..self.width as i32).map(move |x| origin.offset(x * step_x, y * step_y))
        })
    }

    /// Radius of the area a brush edit at `origin` may change, for redraw
    pub fn refresh_radius(self) -> u32 {
        self.width.max(self.height) + 1
    }
}

/// Result of a flood fill
#[derive(Debug, Clone, Default)]
pub struct FloodFill {
    /// Cells belonging to the filled region, in visiting order
    pub cells: Vec<Point>,
    /// Checked cells that stopped the expansion
    pub boundary: HashSet<Point>,
    /// Total number of enqueued positions
    pub enqueued: usize,
}

/// Breadth-first 8-way flood fill from `start`.
///
/// `belongs` decides whether a cell is part of the region; it must answer
/// `false` for positions outside the grid. Each position is enqueued at most
/// once, so cost is linear in the region size plus its boundary.
pub fn flood_fill<F>(start: Point, mut belongs: F) -> FloodFill
where
    F: FnMut(Point) -> bool,
{
    let mut result = FloodFill::default();
    let mut queued: HashSet<Point> = HashSet::new();
    let mut pending: VecDeque<Point> = VecDeque::new();

    queued.insert(start);
    pending.push_back(start);

    while let Some(point) = pending.pop_front() {
        if !belongs(point) {
            result.boundary.insert(point);
            continue;
        }

        result.cells.push(point);

        for offset in MOORE_NEIGHBORS {
            let neighbor = point + offset;
            if queued.insert(neighbor) {
                pending.push_back(neighbor);
            }
        }
    }

    result.enqueued = queued.len();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brush_cells() {
        let cells: Vec<_> = BrushSize::new(2, 2).cells(Point::new(3, 4)).collect();
        assert_eq!(
            cells,
            vec![
                Point::new(3, 4),
                Point::new(4, 4),
                Point::new(3, 5),
                Point::new(4, 5)
            ]
        );
        assert_eq!(BrushSize::ONE.cells(Point::ZERO).count(), 1);
    }

    #[test]
    fn test_tile_origins_step_by_footprint() {
        let origins: Vec<_> = BrushSize::new(2, 1).tile_origins(Point::ZERO, 3, 2).collect();
        assert_eq!(origins, vec![Point::new(0, 0), Point::new(3, 0)]);
    }

    #[test]
    fn test_flood_fill_exact_region() {
        // 3x3 block of region cells at (2..5, 2..5) inside a 10x10 field
        let region: HashSet<Point> = (2..5)
            .flat_map(|y| (2..5).map(move |x| Point::new(x, y)))
            .collect();

        let fill = flood_fill(Point::new(3, 3), |p| region.contains(&p));

        assert_eq!(fill.cells.len(), 9);
        let visited: HashSet<Point> = fill.cells.iter().copied().collect();
        assert_eq!(visited, region);
        // Ring of 16 boundary cells around a 3x3 block
        assert_eq!(fill.boundary.len(), 16);
        assert_eq!(fill.enqueued, 25);
    }

    #[test]
    fn test_flood_fill_diagonal_connectivity() {
        let region: HashSet<Point> = [Point::new(0, 0), Point::new(1, 1), Point::new(2, 2)]
            .into_iter()
            .collect();
        let fill = flood_fill(Point::new(0, 0), |p| region.contains(&p));
        assert_eq!(fill.cells.len(), 3);
    }

    #[test]
    fn test_flood_fill_enqueues_linear() {
        // 20x20 open square; out of bounds stops the fill
        let fill = flood_fill(Point::new(10, 10), |p| {
            p.x >= 0 && p.y >= 0 && p.x < 20 && p.y < 20
        });
        assert_eq!(fill.cells.len(), 400);
        // Region plus its one-cell outer ring
        assert_eq!(fill.enqueued, 22 * 22);
    }

    #[test]
    fn test_flood_fill_start_outside_region() {
        let fill = flood_fill(Point::new(0, 0), |_| false);
        assert!(fill.cells.is_empty());
        assert_eq!(fill.enqueued, 1);
    }
}
