//! Redraw bookkeeping for the (external) renderer

use isomap_core::Point;

/// Regions that need redrawing after mutations.
///
/// Mutations report into this; the renderer drains it once per frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshTracker {
    points: Vec<(Point, u32)>,
    whole_map: bool,
}

impl RefreshTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a redraw of the cells within `radius` of `origin`
    pub fn add_refresh_point(&mut self, origin: Point, radius: u32) {
        if !self.whole_map {
            self.points.push((origin, radius));
        }
    }

    /// Request a redraw of the whole map
    pub fn invalidate_map(&mut self) {
        self.whole_map = true;
        self.points.clear();
    }

    pub fn is_map_invalidated(&self) -> bool {
        self.whole_map
    }

    pub fn points(&self) -> &[(Point, u32)] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        !self.whole_map && self.points.is_empty()
    }

    /// Take all pending requests, leaving the tracker empty
    pub fn take(&mut self) -> RefreshTracker {
        std::mem::take(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_and_invalidation() {
        let mut tracker = RefreshTracker::new();
        assert!(tracker.is_empty());

        tracker.add_refresh_point(Point::new(3, 4), 2);
        assert_eq!(tracker.points(), &[(Point::new(3, 4), 2)]);

        tracker.invalidate_map();
        tracker.add_refresh_point(Point::new(1, 1), 1);
        assert!(tracker.is_map_invalidated());
        assert!(tracker.points().is_empty());

        let taken = tracker.take();
        assert!(taken.is_map_invalidated());
        assert!(tracker.is_empty());
    }
}
