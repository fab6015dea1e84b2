//! Read-only questions about relations between two objects

use crate::AllocationEngine;
use sysmod_domain::{FlowRole, ModelContext, ModelObject, ObjectId};

impl AllocationEngine {
    /// Whether any edge connects `a` and `b`, in either direction
    ///
    /// Covers composition, allocation (views included), flows, exposure,
    /// attribute values, transition endpoints and data ordering.
    pub fn relationship_exists(&self, ctx: &ModelContext, a: ObjectId, b: ObjectId) -> bool {
        a != b && (directed(ctx, a, b) || directed(ctx, b, a))
    }
}

fn directed(ctx: &ModelContext, from: ObjectId, to: ObjectId) -> bool {
    let Some(obj) = ctx.get(from) else {
        return false;
    };

    if ctx.parent(to) == Some(from) {
        return true;
    }
    if obj.allocated().is_some_and(|set| set.contains(&to)) {
        return true;
    }
    if obj.exposed().is_some_and(|set| set.contains(&to)) {
        return true;
    }
    if [FlowRole::Producer, FlowRole::Consumer]
        .into_iter()
        .any(|role| ctx.flows().contains(role, to, from))
    {
        return true;
    }

    match obj {
        ModelObject::Attribute(attr) => attr.described.contains_key(&to),
        ModelObject::Transition(t) => t.source == Some(to) || t.destination == Some(to),
        ModelObject::Data(d) => d.predecessors.contains(&to),
        _ => false,
    }
}
