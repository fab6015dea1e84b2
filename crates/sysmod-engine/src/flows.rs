//! Producer/consumer edges and their propagation up the function tree
//!
//! A parent function holds a `Propagated` edge on data `D` when its children
//! hold exactly one side of `D`'s exchange. When both sides are present among
//! the children, the exchange is internal to the parent and the parent holds
//! neither. The walk recomputes ancestors closest first and stops at the first
//! ancestor whose edges did not change.

use crate::{AllocationEngine, Change, Outcome};
use sysmod_domain::{FlowOrigin, FlowRole, ModelContext, ModelError, ModelResult, ObjectId, ObjectKind};
use tracing::{debug, info};

impl AllocationEngine {
    /// Declare that `function` holds `role` on `data`
    pub fn add_flow(
        &self,
        ctx: &mut ModelContext,
        role: FlowRole,
        data: ObjectId,
        function: ObjectId,
    ) -> ModelResult<Outcome> {
        check_flow_kinds(ctx, data, function)?;

        let mut outcome = Outcome::new();
        match ctx.flows().get(role, data, function).map(|f| f.origin) {
            Some(FlowOrigin::Direct) => return Ok(outcome),
            Some(_) => {
                // Promote a derived edge: it now survives changes below
                ctx.flows_mut().set_origin(role, data, function, FlowOrigin::Direct);
                untag_flow(ctx, role, data, function);
                outcome.push(Change::FlowAdded {
                    role,
                    data,
                    function,
                    origin: FlowOrigin::Direct,
                });
            }
            None => {
                ctx.flows_mut().insert(role, data, function, FlowOrigin::Direct);
                outcome.push(Change::FlowAdded {
                    role,
                    data,
                    function,
                    origin: FlowOrigin::Direct,
                });
            }
        }

        // A declared edge may cancel a propagated one on the same function
        let parent = ctx.parent(function);
        self.settle(ctx, Some(function), data, &mut outcome);
        self.settle(ctx, parent, data, &mut outcome);
        self.warn_unmatched(ctx, role, data, &mut outcome);

        info!(
            "{} is a {} of {}",
            ctx.name_of(function),
            role.as_str(),
            ctx.name_of(data)
        );
        Ok(outcome)
    }

    /// Retract a declared edge
    ///
    /// Edges derived from children cannot be removed directly.
    pub fn remove_flow(
        &self,
        ctx: &mut ModelContext,
        role: FlowRole,
        data: ObjectId,
        function: ObjectId,
    ) -> ModelResult<Outcome> {
        check_flow_kinds(ctx, data, function)?;

        let mut outcome = Outcome::new();
        match ctx.flows().get(role, data, function).map(|f| f.origin) {
            None => return Ok(outcome),
            Some(FlowOrigin::Propagated) => {
                return Err(ModelError::IllegalRelation(format!(
                    "{} is a {} of {} through its children",
                    ctx.name_of(function),
                    role.as_str(),
                    ctx.name_of(data)
                )))
            }
            Some(_) => {
                ctx.flows_mut().remove(role, data, function);
                untag_flow(ctx, role, data, function);
                outcome.push(Change::FlowRemoved { role, data, function });
            }
        }

        // The function itself may still be entitled to a propagated edge
        let parent = ctx.parent(function);
        self.settle(ctx, Some(function), data, &mut outcome);
        self.settle(ctx, parent, data, &mut outcome);

        info!(
            "{} is no longer a {} of {}",
            ctx.name_of(function),
            role.as_str(),
            ctx.name_of(data)
        );
        Ok(outcome)
    }

    /// Recompute propagated edges on `data` from `start` upwards
    pub(crate) fn settle(
        &self,
        ctx: &mut ModelContext,
        start: Option<ObjectId>,
        data: ObjectId,
        outcome: &mut Outcome,
    ) {
        let mut current = start;
        while let Some(ancestor) = current {
            if !self.recompute(ctx, ancestor, data, outcome) {
                break;
            }
            current = ctx.parent(ancestor);
        }
    }

    /// Recompute every data touched by `function` and its subtree from `start` upwards
    pub(crate) fn settle_all(
        &self,
        ctx: &mut ModelContext,
        start: Option<ObjectId>,
        function: ObjectId,
        outcome: &mut Outcome,
    ) {
        let mut data = Vec::new();
        for role in [FlowRole::Producer, FlowRole::Consumer] {
            for d in ctx.flows().data_for(role, function) {
                if !data.contains(&d) {
                    data.push(d);
                }
            }
        }
        for d in data {
            self.settle(ctx, start, d, outcome);
        }
    }

    /// Bring one function's propagated edges on `data` in line with its children
    ///
    /// Returns whether anything changed.
    fn recompute(
        &self,
        ctx: &mut ModelContext,
        function: ObjectId,
        data: ObjectId,
        outcome: &mut Outcome,
    ) -> bool {
        let children = ctx.children(function);
        let held_below =
            |role: FlowRole| children.iter().any(|c| ctx.flows().contains(role, data, *c));
        let below_producer = held_below(FlowRole::Producer);
        let below_consumer = held_below(FlowRole::Consumer);

        let mut changed = false;
        for role in [FlowRole::Producer, FlowRole::Consumer] {
            let (same, opposite) = match role {
                FlowRole::Producer => (below_producer, below_consumer),
                FlowRole::Consumer => (below_consumer, below_producer),
            };
            let declared_opposite = ctx
                .flows()
                .get(role.opposite(), data, function)
                .is_some_and(|f| f.origin != FlowOrigin::Propagated);
            let wanted = same && !opposite && !declared_opposite;

            match ctx.flows().get(role, data, function).map(|f| f.origin) {
                None if wanted => {
                    ctx.flows_mut()
                        .insert(role, data, function, FlowOrigin::Propagated);
                    outcome.push(Change::FlowAdded {
                        role,
                        data,
                        function,
                        origin: FlowOrigin::Propagated,
                    });
                    changed = true;
                }
                Some(FlowOrigin::Propagated) if !wanted => {
                    ctx.flows_mut().remove(role, data, function);
                    outcome.push(Change::FlowRemoved { role, data, function });
                    changed = true;
                }
                _ => {}
            }
        }

        if changed {
            debug!(
                "Recomputed {} edges of {}",
                ctx.name_of(data),
                ctx.name_of(function)
            );
        }
        changed
    }

    fn warn_unmatched(&self, ctx: &ModelContext, role: FlowRole, data: ObjectId, outcome: &mut Outcome) {
        if !self.config().warn_unmatched_flows {
            return;
        }
        if ctx.flows().functions_for(role.opposite(), data).is_empty() {
            outcome.warn(format!(
                "no matching {} found for {}",
                role.opposite().as_str(),
                ctx.name_of(data)
            ));
        }
    }
}

fn untag_flow(ctx: &mut ModelContext, role: FlowRole, data: ObjectId, function: ObjectId) {
    if ctx.overlay(function).is_some_and(|o| o.flows.contains(&(role, data))) {
        ctx.overlay_mut(function).remove_flow(role, data);
    }
}

fn check_flow_kinds(ctx: &ModelContext, data: ObjectId, function: ObjectId) -> ModelResult<()> {
    let data_kind = ctx.expect_object(data)?.kind();
    let function_kind = ctx.expect_object(function)?.kind();
    if data_kind != ObjectKind::Data || function_kind != ObjectKind::Function {
        return Err(ModelError::IllegalRelation(format!(
            "flows connect a function and a data, not a {} and a {}",
            function_kind, data_kind
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sysmod_domain::TypeRef;

    fn function(ctx: &mut ModelContext, name: &str) -> ObjectId {
        ctx.create(ObjectKind::Function, name, TypeRef::Base(ObjectKind::Function))
            .unwrap()
    }

    fn data(ctx: &mut ModelContext, name: &str) -> ObjectId {
        ctx.create(ObjectKind::Data, name, TypeRef::Base(ObjectKind::Data))
            .unwrap()
    }

    #[test]
    fn test_add_flow_warns_without_partner() {
        let mut ctx = ModelContext::new();
        let f = function(&mut ctx, "F1");
        let a = data(&mut ctx, "a");
        let engine = AllocationEngine::default();

        let outcome = engine.add_flow(&mut ctx, FlowRole::Producer, a, f).unwrap();
        assert_eq!(outcome.update_flag(), 1);
        assert_eq!(outcome.warnings, vec!["no matching consumer found for a".to_string()]);

        let again = engine.add_flow(&mut ctx, FlowRole::Producer, a, f).unwrap();
        assert_eq!(again.update_flag(), 0);
    }

    #[test]
    fn test_flow_needs_function_and_data() {
        let mut ctx = ModelContext::new();
        let f = function(&mut ctx, "F1");
        let g = function(&mut ctx, "F2");
        let engine = AllocationEngine::default();

        assert!(matches!(
            engine.add_flow(&mut ctx, FlowRole::Consumer, g, f),
            Err(ModelError::IllegalRelation(_))
        ));
    }

    #[test]
    fn test_propagated_edge_cannot_be_removed_directly() {
        let mut ctx = ModelContext::new();
        let parent = function(&mut ctx, "F1");
        let child = function(&mut ctx, "F1a");
        let a = data(&mut ctx, "a");
        ctx.get_mut(parent).unwrap().composition_mut().unwrap().children.insert(child);
        ctx.get_mut(child).unwrap().composition_mut().unwrap().parent = Some(parent);
        let engine = AllocationEngine::default();

        engine.add_flow(&mut ctx, FlowRole::Producer, a, child).unwrap();
        assert!(engine.remove_flow(&mut ctx, FlowRole::Producer, a, parent).is_err());

        let outcome = engine.remove_flow(&mut ctx, FlowRole::Producer, a, child).unwrap();
        assert_eq!(outcome.changes.len(), 2);
        assert!(ctx.flows().is_empty());
    }
}
