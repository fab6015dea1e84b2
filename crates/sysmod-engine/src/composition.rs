//! Parent/child trees

use crate::{AllocationEngine, Change, Outcome};
use sysmod_domain::{ModelContext, ModelError, ModelResult, ObjectId, ObjectKind};
use tracing::info;

impl AllocationEngine {
    /// Attach `child` under `parent`
    ///
    /// Both objects must be of the same composable kind. A child already under
    /// another parent has to be detached first.
    pub fn compose(
        &self,
        ctx: &mut ModelContext,
        parent: ObjectId,
        child: ObjectId,
    ) -> ModelResult<Outcome> {
        let parent_kind = ctx.expect_object(parent)?.kind();
        let child_kind = ctx.expect_object(child)?.kind();

        if parent_kind != child_kind || !parent_kind.is_composable() {
            return Err(ModelError::IllegalRelation(format!(
                "a {} cannot be composed of a {}",
                parent_kind, child_kind
            )));
        }
        if parent == child {
            return Err(ModelError::IllegalRelation(format!(
                "{} cannot contain itself",
                ctx.name_of(parent)
            )));
        }

        let mut outcome = Outcome::new();
        match ctx.parent(child) {
            Some(current) if current == parent => return Ok(outcome),
            Some(current) => {
                return Err(ModelError::IllegalRelation(format!(
                    "{} is already part of {}",
                    ctx.name_of(child),
                    ctx.name_of(current)
                )))
            }
            None => {}
        }
        if ctx.is_ancestor(child, parent) {
            return Err(ModelError::IllegalRelation(format!(
                "{} is already above {}",
                ctx.name_of(child),
                ctx.name_of(parent)
            )));
        }

        link(ctx, parent, child);
        outcome.push(Change::Composed { parent, child });

        if child_kind == ObjectKind::Function {
            self.settle_all(ctx, Some(parent), child, &mut outcome);
        }

        info!("{} is composed of {}", ctx.name_of(parent), ctx.name_of(child));
        Ok(outcome)
    }

    /// Detach `child` from `parent`
    pub fn decompose(
        &self,
        ctx: &mut ModelContext,
        parent: ObjectId,
        child: ObjectId,
    ) -> ModelResult<Outcome> {
        ctx.expect_object(parent)?;
        let child_kind = ctx.expect_object(child)?.kind();

        if ctx.parent(child) != Some(parent) {
            return Err(ModelError::IllegalRelation(format!(
                "{} is not part of {}",
                ctx.name_of(child),
                ctx.name_of(parent)
            )));
        }

        unlink(ctx, parent, child);
        let mut outcome = Outcome::new();
        outcome.push(Change::Decomposed { parent, child });

        if child_kind == ObjectKind::Function {
            self.settle_all(ctx, Some(parent), child, &mut outcome);
        }

        info!("{} is no longer part of {}", ctx.name_of(child), ctx.name_of(parent));
        Ok(outcome)
    }
}

fn link(ctx: &mut ModelContext, parent: ObjectId, child: ObjectId) {
    if let Some(c) = ctx.get_mut(parent).and_then(|o| o.composition_mut()) {
        c.children.insert(child);
    }
    if let Some(c) = ctx.get_mut(child).and_then(|o| o.composition_mut()) {
        c.parent = Some(parent);
    }
}

fn unlink(ctx: &mut ModelContext, parent: ObjectId, child: ObjectId) {
    if let Some(c) = ctx.get_mut(parent).and_then(|o| o.composition_mut()) {
        c.children.remove(&child);
    }
    if let Some(c) = ctx.get_mut(child).and_then(|o| o.composition_mut()) {
        c.parent = None;
    }
}
