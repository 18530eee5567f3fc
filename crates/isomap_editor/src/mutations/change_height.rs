//! Terrain height raise and lower

use isomap_core::{BrushSize, Point, MAX_LEVEL};
use tracing::debug;

use super::{Mutation, MutationContext, MutationRejected};

/// Raises or lowers terrain height over a brush, clamped to `0..=MAX_LEVEL`
pub struct ChangeHeightMutation {
    origin: Point,
    brush: BrushSize,
    delta: i8,
    undo: Vec<(Point, u8)>,
    performed: bool,
}

impl ChangeHeightMutation {
    pub fn new(origin: Point, delta: i8) -> Self {
        Self {
            origin,
            brush: BrushSize::ONE,
            delta,
            undo: Vec::new(),
            performed: false,
        }
    }

    pub fn with_brush(mut self, brush: BrushSize) -> Self {
        self.brush = brush;
        self
    }

    fn adjusted(&self, level: u8) -> u8 {
        let raised = i16::from(level) + i16::from(self.delta);
        raised.clamp(0, i16::from(MAX_LEVEL)) as u8
    }
}

impl Mutation for ChangeHeightMutation {
    fn perform(&mut self, ctx: &mut MutationContext<'_>) -> Result<(), MutationRejected> {
        debug_assert!(!self.performed, "Height change performed twice without undo");
        let changes: Vec<(Point, u8, u8)> = self
            .brush
            .cells(self.origin)
            .filter_map(|point| {
                let level = ctx.grid().cell(point)?.level;
                let new_level = self.adjusted(level);
                (new_level != level).then_some((point, level, new_level))
            })
            .collect();
        if changes.is_empty() {
            return Err(MutationRejected::NothingToChange);
        }

        self.undo.clear();
        for (point, old_level, new_level) in changes {
            ctx.grid_mut().set_level(point, new_level);
            self.undo.push((point, old_level));
        }

        debug!(
            "Changed height of {} cells at {} by {}",
            self.undo.len(),
            self.origin,
            self.delta
        );
        self.performed = true;
        ctx.refresh
            .add_refresh_point(self.origin, self.brush.refresh_radius() + 1);
        Ok(())
    }

    fn undo(&mut self, ctx: &mut MutationContext<'_>) {
        debug_assert!(self.performed, "Height change undone before perform");
        self.performed = false;
        for (point, level) in self.undo.drain(..).rev() {
            ctx.grid_mut().set_level(point, level);
        }
        ctx.refresh
            .add_refresh_point(self.origin, self.brush.refresh_radius() + 1);
    }

    fn description(&self) -> &str {
        if self.delta >= 0 {
            "Raise Terrain"
        } else {
            "Lower Terrain"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutations::test_support::*;

    fn level_at(fixture: &Fixture, point: Point) -> u8 {
        fixture.map.grid().cell(point).unwrap().level
    }

    #[test]
    fn test_raise_clamps_and_undoes() {
        let mut fixture = Fixture::new();
        fixture.map.grid_mut().set_level(CENTER, MAX_LEVEL - 1);
        let before = fixture.map.grid().clone();

        let mut mutation = ChangeHeightMutation::new(CENTER, 3).with_brush(BrushSize::new(2, 1));
        mutation.perform(&mut fixture.ctx()).unwrap();
        assert_eq!(level_at(&fixture, CENTER), MAX_LEVEL);
        assert_eq!(level_at(&fixture, CENTER.offset(1, 0)), 3);

        mutation.undo(&mut fixture.ctx());
        assert!(fixture.map.grid().same_cells(&before));
    }

    #[test]
    fn test_lower_at_ground_level_is_rejected() {
        let mut fixture = Fixture::new();
        let mut mutation = ChangeHeightMutation::new(CENTER, -1);
        assert_eq!(mutation.description(), "Lower Terrain");
        assert_eq!(
            mutation.perform(&mut fixture.ctx()),
            Err(MutationRejected::NothingToChange)
        );
        assert!(fixture.refresh.is_empty());
    }
}
