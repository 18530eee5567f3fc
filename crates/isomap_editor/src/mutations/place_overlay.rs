//! Overlay placement and erasure over a brush

use isomap_core::{BrushSize, Overlay, Point};
use tracing::debug;

use super::{Mutation, MutationContext, MutationRejected};

/// Places an overlay over a brush, or erases overlays when `overlay` is `None`
pub struct PlaceOverlayMutation {
    origin: Point,
    brush: BrushSize,
    overlay: Option<Overlay>,
    undo: Vec<(Point, Option<Overlay>)>,
    performed: bool,
}

impl PlaceOverlayMutation {
    pub fn new(origin: Point, overlay: Option<Overlay>) -> Self {
        Self {
            origin,
            brush: BrushSize::ONE,
            overlay,
            undo: Vec::new(),
            performed: false,
        }
    }

    pub fn erase(origin: Point) -> Self {
        Self::new(origin, None)
    }

    pub fn with_brush(mut self, brush: BrushSize) -> Self {
        self.brush = brush;
        self
    }
}

impl Mutation for PlaceOverlayMutation {
    fn perform(&mut self, ctx: &mut MutationContext<'_>) -> Result<(), MutationRejected> {
        debug_assert!(!self.performed, "Overlay mutation performed twice without undo");
        if let Some(overlay) = self.overlay {
            if usize::from(overlay.overlay_type_index) >= ctx.catalog.overlay_type_count() {
                return Err(MutationRejected::UnknownOverlay(overlay.overlay_type_index));
            }
        }

        let targets: Vec<Point> = self
            .brush
            .cells(self.origin)
            .filter(|p| ctx.grid().cell(*p).is_some())
            .collect();
        if targets.is_empty() {
            return Err(MutationRejected::MissingCell(self.origin));
        }

        self.undo = targets
            .into_iter()
            .map(|point| (point, ctx.grid_mut().set_overlay(point, self.overlay)))
            .collect();

        debug!("Set overlay on {} cells at {}", self.undo.len(), self.origin);
        self.performed = true;
        ctx.refresh
            .add_refresh_point(self.origin, self.brush.refresh_radius());
        Ok(())
    }

    fn undo(&mut self, ctx: &mut MutationContext<'_>) {
        debug_assert!(self.performed, "Overlay mutation undone before perform");
        self.performed = false;
        for (point, previous) in self.undo.drain(..).rev() {
            ctx.grid_mut().set_overlay(point, previous);
        }
        ctx.refresh
            .add_refresh_point(self.origin, self.brush.refresh_radius());
    }

    fn description(&self) -> &str {
        if self.overlay.is_some() {
            "Place Overlay"
        } else {
            "Erase Overlay"
        }
    }
}
