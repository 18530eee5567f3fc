//! Undo/redo stacks of performed mutations

use crate::mutations::{Mutation, MutationContext, MutationRejected};

/// Unbounded undo/redo history
#[derive(Default)]
pub struct MutationHistory {
    /// Mutations that have been performed
    undo_stack: Vec<Box<dyn Mutation>>,
    /// Mutations that have been undone
    redo_stack: Vec<Box<dyn Mutation>>,
}

impl MutationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Perform a mutation and add it to history.
    ///
    /// A rejected mutation is dropped; neither stack changes.
    pub fn perform(
        &mut self,
        mut mutation: Box<dyn Mutation>,
        ctx: &mut MutationContext<'_>,
    ) -> Result<(), MutationRejected> {
        mutation.perform(ctx)?;
        self.undo_stack.push(mutation);
        self.redo_stack.clear();
        ctx.map.mark_modified();
        Ok(())
    }

    /// Undo the last mutation. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self, ctx: &mut MutationContext<'_>) -> bool {
        let Some(mut mutation) = self.undo_stack.pop() else {
            return false;
        };
        mutation.undo(ctx);
        self.redo_stack.push(mutation);
        ctx.map.mark_modified();
        true
    }

    /// Redo the last undone mutation. Returns `Ok(false)` when there is
    /// nothing to redo.
    ///
    /// If the map no longer accepts the mutation it stays on the redo stack.
    pub fn redo(&mut self, ctx: &mut MutationContext<'_>) -> Result<bool, MutationRejected> {
        let Some(mut mutation) = self.redo_stack.pop() else {
            return Ok(false);
        };
        if let Err(rejected) = mutation.perform(ctx) {
            self.redo_stack.push(mutation);
            return Err(rejected);
        }
        self.undo_stack.push(mutation);
        ctx.map.mark_modified();
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Description of the mutation `undo` would revert
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.last().map(|m| m.description())
    }

    /// Description of the mutation `redo` would reapply
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.last().map(|m| m.description())
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
