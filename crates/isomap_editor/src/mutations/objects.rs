//! Object placement and removal

use isomap_core::{ObjectSlot, PlacedObject, Point, INFANTRY_SUB_CELLS};
use tracing::debug;
use uuid::Uuid;

use super::{Mutation, MutationContext, MutationRejected};

/// Places a terrain object, structure, vehicle, aircraft or infantry
pub struct PlaceObjectMutation {
    object: PlacedObject,
    performed: bool,
}

impl PlaceObjectMutation {
    pub fn new(object: PlacedObject) -> Self {
        Self {
            object,
            performed: false,
        }
    }

    pub fn object_id(&self) -> Uuid {
        self.object.id
    }
}

impl Mutation for PlaceObjectMutation {
    fn perform(&mut self, ctx: &mut MutationContext<'_>) -> Result<(), MutationRejected> {
        debug_assert!(!self.performed, "Place Object performed twice without undo");
        let point = self.object.position;
        let slot = self.object.slot();
        let cell = ctx
            .grid()
            .cell(point)
            .ok_or(MutationRejected::MissingCell(point))?;
        if let ObjectSlot::Infantry(sub_cell) = slot {
            if usize::from(sub_cell) >= INFANTRY_SUB_CELLS {
                return Err(MutationRejected::InvalidSubCell(sub_cell));
            }
        }
        if cell.object(slot).is_some() {
            return Err(MutationRejected::SlotOccupied { point, slot });
        }

        ctx.grid_mut().place_object(point, slot, self.object.id);
        ctx.map.insert_object(self.object.clone());
        debug!("Placed {} {} at {}", self.object.type_name, self.object.id, point);
        self.performed = true;
        ctx.refresh.add_refresh_point(point, 1);
        Ok(())
    }

    fn undo(&mut self, ctx: &mut MutationContext<'_>) {
        debug_assert!(self.performed, "Place Object undone before perform");
        self.performed = false;
        let point = self.object.position;
        ctx.grid_mut().remove_object(point, self.object.slot());
        ctx.map.remove_object(self.object.id);
        ctx.refresh.add_refresh_point(point, 1);
    }

    fn description(&self) -> &str {
        "Place Object"
    }
}

/// Removes a placed object by id
pub struct RemoveObjectMutation {
    id: Uuid,
    removed: Option<PlacedObject>,
}

impl RemoveObjectMutation {
    pub fn new(id: Uuid) -> Self {
        Self { id, removed: None }
    }
}

impl Mutation for RemoveObjectMutation {
    fn perform(&mut self, ctx: &mut MutationContext<'_>) -> Result<(), MutationRejected> {
        debug_assert!(
            self.removed.is_none(),
            "Remove Object performed twice without undo"
        );
        let object = ctx
            .map
            .remove_object(self.id)
            .ok_or(MutationRejected::UnknownObject(self.id))?;
        let point: Point = object.position;
        ctx.grid_mut().remove_object(point, object.slot());
        ctx.refresh.add_refresh_point(point, 1);
        self.removed = Some(object);
        Ok(())
    }

    fn undo(&mut self, ctx: &mut MutationContext<'_>) {
        debug_assert!(self.removed.is_some(), "Remove Object undone before perform");
        let Some(object) = self.removed.take() else {
            return;
        };
        let point = object.position;
        ctx.grid_mut().place_object(point, object.slot(), object.id);
        ctx.map.insert_object(object);
        ctx.refresh.add_refresh_point(point, 1);
    }

    fn description(&self) -> &str {
        "Remove Object"
    }
}
