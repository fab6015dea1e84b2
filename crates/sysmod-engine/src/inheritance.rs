//! Derived objects and their inheritance overlays
//!
//! A derived object points at a base object of the same kind and sees the
//! base's allocations, flows, attribute values and view memberships as if they
//! were its own. Every relation added that way is recorded in the derived
//! object's [`Overlay`](sysmod_domain::Overlay) so it can later be retracted
//! without touching relations the object owns in its own right.

use crate::{AllocationEngine, Change, Outcome};
use std::collections::VecDeque;
use sysmod_domain::{
    FlowOrigin, FlowRole, ModelContext, ModelError, ModelObject, ModelResult, ObjectId, ObjectKind,
    Overlay,
};
use tracing::{debug, info};

/// Applies and retracts inheritance overlays
#[derive(Debug, Clone, Copy)]
pub struct InheritancePropagator<'e> {
    engine: &'e AllocationEngine,
}

impl AllocationEngine {
    /// Inheritance operations backed by this engine
    pub fn inheritance(&self) -> InheritancePropagator<'_> {
        InheritancePropagator { engine: self }
    }
}

impl<'e> InheritancePropagator<'e> {
    /// Point `object` at `base` and inherit everything the base holds
    pub fn derive(&self, ctx: &mut ModelContext, object: ObjectId, base: ObjectId) -> ModelResult<Outcome> {
        let object_kind = ctx.expect_object(object)?.kind();
        let base_kind = ctx.expect_object(base)?.kind();

        if object_kind != base_kind {
            return Err(ModelError::IllegalRelation(format!(
                "a {} cannot be derived from a {}",
                object_kind, base_kind
            )));
        }
        if matches!(object_kind, ObjectKind::Type | ObjectKind::Attribute) {
            return Err(ModelError::IllegalRelation(format!(
                "a {} cannot be derived",
                object_kind
            )));
        }
        if object == base {
            return Err(ModelError::IllegalRelation(format!(
                "{} cannot be derived from itself",
                ctx.name_of(object)
            )));
        }
        match ctx.get(object).and_then(|o| o.header().derived) {
            Some(current) if current == base => return Ok(Outcome::new()),
            Some(current) => {
                return Err(ModelError::IllegalRelation(format!(
                    "{} is already derived from {}",
                    ctx.name_of(object),
                    ctx.name_of(current)
                )))
            }
            None => {}
        }
        if let Some(grand) = ctx.get(base).and_then(|o| o.header().derived) {
            return Err(ModelError::IllegalRelation(format!(
                "{} is itself derived from {}",
                ctx.name_of(base),
                ctx.name_of(grand)
            )));
        }
        if !ctx.derived_from(object).is_empty() {
            return Err(ModelError::IllegalRelation(format!(
                "{} is the base of other objects",
                ctx.name_of(object)
            )));
        }

        if let Some(obj) = ctx.get_mut(object) {
            obj.header_mut().derived = Some(base);
        }
        *ctx.overlay_mut(object) = Overlay::for_base(base);

        let mut outcome = Outcome::new();
        outcome.push(Change::Derived { object, base });
        outcome.merge(self.add_inherited_object(ctx, object)?);

        info!(
            "{} is derived from {} ({} inherited relations)",
            ctx.name_of(object),
            ctx.name_of(base),
            outcome.changes.len() - 1
        );
        Ok(outcome)
    }

    /// Copy the base's relations onto a derived object, tagging each addition
    pub fn add_inherited_object(&self, ctx: &mut ModelContext, object: ObjectId) -> ModelResult<Outcome> {
        let base = ctx
            .expect_object(object)?
            .header()
            .derived
            .ok_or_else(|| {
                ModelError::IllegalRelation(format!("{} is not derived", ctx.name_of(object)))
            })?;

        let mut outcome = Outcome::new();

        let base_allocated: Vec<ObjectId> = ctx
            .get(base)
            .and_then(|b| b.allocated())
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        for item in base_allocated {
            self.inherit_allocation(ctx, object, item, &mut outcome);
        }

        if ctx.kind_of(object) == Some(ObjectKind::Function) {
            for role in [FlowRole::Producer, FlowRole::Consumer] {
                for data in ctx.flows().data_for(role, base) {
                    self.inherit_flow(ctx, object, role, data, &mut outcome);
                }
            }
        }

        let attributes: Vec<(ObjectId, String)> = ctx
            .objects_of(ObjectKind::Attribute)
            .filter_map(|o| match o {
                ModelObject::Attribute(a) => a.described.get(&base).map(|v| (a.header.id, v.clone())),
                _ => None,
            })
            .collect();
        for (attribute, value) in attributes {
            self.inherit_attribute(ctx, object, attribute, &value, &mut outcome);
        }

        for view in ctx.holders_of_kind(base, ObjectKind::View) {
            self.inherit_view(ctx, object, view, &mut outcome);
        }

        Ok(outcome)
    }

    /// Retract exactly the inherited relations of `object` and clear its pointer
    pub fn remove_inherited_object(&self, ctx: &mut ModelContext, object: ObjectId) -> ModelResult<Outcome> {
        let Some(base) = ctx.expect_object(object)?.header().derived else {
            return Ok(Outcome::new());
        };
        let overlay = ctx.take_overlay(object).unwrap_or_default();
        let mut outcome = Outcome::new();

        for item in &overlay.allocated {
            if let Some(set) = ctx.get_mut(object).and_then(|o| o.allocated_mut()) {
                if set.remove(item) {
                    outcome.push(Change::Deallocated { holder: object, object: *item });
                }
            }
        }

        for (role, data) in &overlay.flows {
            let inherited = ctx
                .flows()
                .get(*role, *data, object)
                .is_some_and(|f| f.origin == FlowOrigin::Inherited);
            if inherited {
                ctx.flows_mut().remove(*role, *data, object);
                outcome.push(Change::FlowRemoved {
                    role: *role,
                    data: *data,
                    function: object,
                });
                let parent = ctx.parent(object);
                self.engine.settle(ctx, Some(object), *data, &mut outcome);
                self.engine.settle(ctx, parent, *data, &mut outcome);
            }
        }

        for attribute in &overlay.attributes {
            if let Some(ModelObject::Attribute(a)) = ctx.get_mut(*attribute) {
                if a.described.remove(&object).is_some() {
                    outcome.push(Change::Undescribed {
                        attribute: *attribute,
                        object,
                    });
                }
            }
        }

        for view in &overlay.views {
            if let Some(set) = ctx.get_mut(*view).and_then(|v| v.allocated_mut()) {
                if set.remove(&object) {
                    outcome.push(Change::Deallocated { holder: *view, object });
                }
            }
        }

        if let Some(obj) = ctx.get_mut(object) {
            obj.header_mut().derived = None;
        }
        outcome.push(Change::Underived { object, base });

        info!("{} is no longer derived from {}", ctx.name_of(object), ctx.name_of(base));
        Ok(outcome)
    }

    /// Forward changes made on base objects to every object derived from them
    ///
    /// New changes produced here are forwarded as well, so ancestors reached by
    /// flow propagation stay consistent.
    pub fn mirror(&self, ctx: &mut ModelContext, changes: &[Change]) -> Outcome {
        let mut outcome = Outcome::new();
        let mut work: VecDeque<Change> = changes.iter().cloned().collect();

        while let Some(change) = work.pop_front() {
            let mut step = Outcome::new();
            self.mirror_one(ctx, &change, &mut step);
            work.extend(step.changes.iter().cloned());
            outcome.merge(step);
        }

        if outcome.is_changed() {
            debug!("Mirrored {} changes onto derived objects", outcome.changes.len());
        }
        outcome
    }

    fn mirror_one(&self, ctx: &mut ModelContext, change: &Change, outcome: &mut Outcome) {
        match change {
            Change::Allocated { holder, object } => {
                for derived in ctx.derived_from(*holder) {
                    self.inherit_allocation(ctx, derived, *object, outcome);
                }
                if ctx.kind_of(*holder) == Some(ObjectKind::View) {
                    for derived in ctx.derived_from(*object) {
                        self.inherit_view(ctx, derived, *holder, outcome);
                    }
                }
            }
            Change::Deallocated { holder, object } => {
                for derived in ctx.derived_from(*holder) {
                    if tagged(ctx, derived, |o| o.allocated.contains(object)) {
                        ctx.overlay_mut(derived).allocated.remove(object);
                        if let Some(set) = ctx.get_mut(derived).and_then(|d| d.allocated_mut()) {
                            set.remove(object);
                        }
                        outcome.push(Change::Deallocated { holder: derived, object: *object });
                    }
                }
                if ctx.kind_of(*holder) == Some(ObjectKind::View) {
                    for derived in ctx.derived_from(*object) {
                        if tagged(ctx, derived, |o| o.views.contains(holder)) {
                            ctx.overlay_mut(derived).views.remove(holder);
                            if let Some(set) = ctx.get_mut(*holder).and_then(|v| v.allocated_mut()) {
                                set.remove(&derived);
                            }
                            outcome.push(Change::Deallocated { holder: *holder, object: derived });
                        }
                    }
                }
            }
            Change::FlowAdded { role, data, function, .. } => {
                for derived in ctx.derived_from(*function) {
                    self.inherit_flow(ctx, derived, *role, *data, outcome);
                }
            }
            Change::FlowRemoved { role, data, function } => {
                for derived in ctx.derived_from(*function) {
                    if !tagged(ctx, derived, |o| o.flows.contains(&(*role, *data))) {
                        continue;
                    }
                    ctx.overlay_mut(derived).remove_flow(*role, *data);
                    let inherited = ctx
                        .flows()
                        .get(*role, *data, derived)
                        .is_some_and(|f| f.origin == FlowOrigin::Inherited);
                    if inherited {
                        ctx.flows_mut().remove(*role, *data, derived);
                        outcome.push(Change::FlowRemoved {
                            role: *role,
                            data: *data,
                            function: derived,
                        });
                        let parent = ctx.parent(derived);
                        self.engine.settle(ctx, Some(derived), *data, outcome);
                        self.engine.settle(ctx, parent, *data, outcome);
                    }
                }
            }
            Change::Described { attribute, object, value } => {
                for derived in ctx.derived_from(*object) {
                    self.inherit_attribute(ctx, derived, *attribute, value, outcome);
                }
            }
            Change::Undescribed { attribute, object } => {
                for derived in ctx.derived_from(*object) {
                    if tagged(ctx, derived, |o| o.attributes.contains(attribute)) {
                        ctx.overlay_mut(derived).attributes.remove(attribute);
                        if let Some(ModelObject::Attribute(a)) = ctx.get_mut(*attribute) {
                            a.described.remove(&derived);
                        }
                        outcome.push(Change::Undescribed {
                            attribute: *attribute,
                            object: derived,
                        });
                    }
                }
            }
            _ => {}
        }
    }

    fn inherit_allocation(&self, ctx: &mut ModelContext, derived: ObjectId, item: ObjectId, outcome: &mut Outcome) {
        let added = ctx
            .get_mut(derived)
            .and_then(|d| d.allocated_mut())
            .is_some_and(|set| set.insert(item));
        if added {
            ctx.overlay_mut(derived).allocated.insert(item);
            outcome.push(Change::Allocated { holder: derived, object: item });
        }
    }

    fn inherit_flow(
        &self,
        ctx: &mut ModelContext,
        derived: ObjectId,
        role: FlowRole,
        data: ObjectId,
        outcome: &mut Outcome,
    ) {
        if !ctx.flows_mut().insert(role, data, derived, FlowOrigin::Inherited) {
            return;
        }
        ctx.overlay_mut(derived).add_flow(role, data);
        outcome.push(Change::FlowAdded {
            role,
            data,
            function: derived,
            origin: FlowOrigin::Inherited,
        });
        let parent = ctx.parent(derived);
        self.engine.settle(ctx, parent, data, outcome);
    }

    fn inherit_attribute(
        &self,
        ctx: &mut ModelContext,
        derived: ObjectId,
        attribute: ObjectId,
        value: &str,
        outcome: &mut Outcome,
    ) {
        let owns = tagged(ctx, derived, |o| o.attributes.contains(&attribute));
        let Some(ModelObject::Attribute(a)) = ctx.get_mut(attribute) else {
            return;
        };
        let update = match a.described.get(&derived) {
            None => true,
            // Only values that came from the base follow it
            Some(current) => owns && current != value,
        };
        if !update {
            return;
        }
        a.described.insert(derived, value.to_string());
        ctx.overlay_mut(derived).attributes.insert(attribute);
        outcome.push(Change::Described {
            attribute,
            object: derived,
            value: value.to_string(),
        });
    }

    fn inherit_view(&self, ctx: &mut ModelContext, derived: ObjectId, view: ObjectId, outcome: &mut Outcome) {
        let added = ctx
            .get_mut(view)
            .and_then(|v| v.allocated_mut())
            .is_some_and(|set| set.insert(derived));
        if added {
            ctx.overlay_mut(derived).views.insert(view);
            outcome.push(Change::Allocated { holder: view, object: derived });
        }
    }
}

fn tagged(ctx: &ModelContext, derived: ObjectId, test: impl Fn(&Overlay) -> bool) -> bool {
    ctx.overlay(derived).is_some_and(test)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sysmod_domain::TypeRef;

    fn new(ctx: &mut ModelContext, kind: ObjectKind, name: &str) -> ObjectId {
        ctx.create(kind, name, TypeRef::Base(kind)).unwrap()
    }

    #[test]
    fn test_derive_requires_same_kind_single_level() {
        let mut ctx = ModelContext::new();
        let a = new(&mut ctx, ObjectKind::FunctionalElement, "A");
        let b = new(&mut ctx, ObjectKind::FunctionalElement, "B");
        let c = new(&mut ctx, ObjectKind::FunctionalElement, "C");
        let f = new(&mut ctx, ObjectKind::Function, "F");
        let engine = AllocationEngine::default();
        let inheritance = engine.inheritance();

        assert!(inheritance.derive(&mut ctx, a, f).is_err());
        assert!(inheritance.derive(&mut ctx, a, a).is_err());

        inheritance.derive(&mut ctx, a, b).unwrap();
        // B is a base, A is derived: neither may extend the chain
        assert!(inheritance.derive(&mut ctx, c, a).is_err());
        assert!(inheritance.derive(&mut ctx, b, c).is_err());
        assert_eq!(inheritance.derive(&mut ctx, a, b).unwrap().update_flag(), 0);
    }

    #[test]
    fn test_retract_only_inherited_allocations() {
        let mut ctx = ModelContext::new();
        let a = new(&mut ctx, ObjectKind::FunctionalElement, "A");
        let b = new(&mut ctx, ObjectKind::FunctionalElement, "B");
        let own = new(&mut ctx, ObjectKind::Function, "Own");
        let shared = new(&mut ctx, ObjectKind::Function, "Shared");
        let base_only = new(&mut ctx, ObjectKind::Function, "Base only");
        ctx.get_mut(a).unwrap().allocated_mut().unwrap().extend([own, shared]);
        ctx.get_mut(b).unwrap().allocated_mut().unwrap().extend([shared, base_only]);
        let engine = AllocationEngine::default();
        let inheritance = engine.inheritance();

        inheritance.derive(&mut ctx, a, b).unwrap();
        let allocated = ctx.get(a).unwrap().allocated().unwrap().clone();
        assert!(allocated.contains(&base_only));
        assert_eq!(ctx.overlay(a).unwrap().allocated.len(), 1);

        inheritance.remove_inherited_object(&mut ctx, a).unwrap();
        let allocated = ctx.get(a).unwrap().allocated().unwrap();
        assert!(allocated.contains(&own));
        assert!(allocated.contains(&shared));
        assert!(!allocated.contains(&base_only));
        assert_eq!(ctx.get(a).unwrap().header().derived, None);
        assert!(ctx.overlay(a).is_none());
        // Base untouched
        assert_eq!(ctx.get(b).unwrap().allocated().unwrap().len(), 2);
    }

    #[test]
    fn test_function_flows_inherited() {
        let mut ctx = ModelContext::new();
        let a = new(&mut ctx, ObjectKind::Function, "A");
        let b = new(&mut ctx, ObjectKind::Function, "B");
        let d = new(&mut ctx, ObjectKind::Data, "fuel");
        let engine = AllocationEngine::default();
        engine.add_flow(&mut ctx, FlowRole::Consumer, d, b).unwrap();

        engine.inheritance().derive(&mut ctx, a, b).unwrap();
        assert_eq!(
            ctx.flows().get(FlowRole::Consumer, d, a).map(|f| f.origin),
            Some(FlowOrigin::Inherited)
        );

        engine.inheritance().remove_inherited_object(&mut ctx, a).unwrap();
        assert!(!ctx.flows().contains(FlowRole::Consumer, d, a));
        assert!(ctx.flows().contains(FlowRole::Consumer, d, b));
    }

    #[test]
    fn test_mirror_later_changes() {
        let mut ctx = ModelContext::new();
        let a = new(&mut ctx, ObjectKind::FunctionalElement, "A");
        let b = new(&mut ctx, ObjectKind::FunctionalElement, "B");
        let f = new(&mut ctx, ObjectKind::Function, "F");
        let mass = new(&mut ctx, ObjectKind::Attribute, "mass");
        let view = new(&mut ctx, ObjectKind::View, "V");
        let engine = AllocationEngine::default();
        let inheritance = engine.inheritance();
        inheritance.derive(&mut ctx, a, b).unwrap();

        let mut changes = Vec::new();
        changes.extend(engine.set_attribute(&mut ctx, mass, b, "3 kg").unwrap().changes);
        changes.extend(engine.allocate_confirmed(&mut ctx, view, b).unwrap().changes);
        changes.extend(engine.allocate_confirmed(&mut ctx, b, f).unwrap().changes);

        let mirrored = inheritance.mirror(&mut ctx, &changes);
        assert_eq!(mirrored.changes.len(), 3);
        assert!(ctx.get(a).unwrap().allocated().unwrap().contains(&f));
        assert!(ctx.get(view).unwrap().allocated().unwrap().contains(&a));
        match ctx.get(mass).unwrap() {
            ModelObject::Attribute(attr) => assert_eq!(attr.described.get(&a).unwrap(), "3 kg"),
            _ => unreachable!(),
        }

        let removed = engine.deallocate(&mut ctx, b, f).unwrap();
        inheritance.mirror(&mut ctx, &removed.changes);
        assert!(!ctx.get(a).unwrap().allocated().unwrap().contains(&f));
    }

    fn described(ctx: &ModelContext, attribute: ObjectId, object: ObjectId) -> Option<String> {
        match ctx.get(attribute) {
            Some(ModelObject::Attribute(a)) => a.described.get(&object).cloned(),
            _ => None,
        }
    }

    #[test]
    fn test_direct_allocation_outlives_inheritance() {
        let mut ctx = ModelContext::new();
        let a = new(&mut ctx, ObjectKind::PhysicalElement, "A");
        let b = new(&mut ctx, ObjectKind::PhysicalElement, "B");
        let pump = new(&mut ctx, ObjectKind::FunctionalElement, "pump");
        let valve = new(&mut ctx, ObjectKind::FunctionalElement, "valve");
        let engine = AllocationEngine::default();
        let inheritance = engine.inheritance();
        engine.allocate_confirmed(&mut ctx, b, pump).unwrap();
        engine.allocate_confirmed(&mut ctx, b, valve).unwrap();
        inheritance.derive(&mut ctx, a, b).unwrap();

        // Already held through B, but now stated for A itself
        let outcome = match engine.allocate(&mut ctx, a, pump).unwrap() {
            crate::Applied::Done(outcome) => outcome,
            crate::Applied::NeedsConfirmation(p) => panic!("unexpected question: {}", p.question),
        };
        assert_eq!(outcome.update_flag(), 1);
        assert_eq!(outcome.changes, vec![Change::Claimed { holder: a, object: pump }]);
        assert!(!ctx.overlay(a).unwrap().allocated.contains(&pump));

        // The base dropping it no longer reaches A
        let removed = engine.deallocate(&mut ctx, b, pump).unwrap();
        inheritance.mirror(&mut ctx, &removed.changes);
        assert!(ctx.get(a).unwrap().allocated().unwrap().contains(&pump));

        inheritance.remove_inherited_object(&mut ctx, a).unwrap();
        let allocated = ctx.get(a).unwrap().allocated().unwrap();
        assert!(allocated.contains(&pump));
        assert!(!allocated.contains(&valve));
    }

    #[test]
    fn test_direct_view_membership_outlives_inheritance() {
        let mut ctx = ModelContext::new();
        let a = new(&mut ctx, ObjectKind::Function, "A");
        let b = new(&mut ctx, ObjectKind::Function, "B");
        let view = new(&mut ctx, ObjectKind::View, "V");
        let engine = AllocationEngine::default();
        let inheritance = engine.inheritance();
        engine.allocate_confirmed(&mut ctx, view, b).unwrap();
        inheritance.derive(&mut ctx, a, b).unwrap();
        assert!(ctx.overlay(a).unwrap().views.contains(&view));

        let outcome = engine.allocate_confirmed(&mut ctx, view, a).unwrap();
        assert_eq!(outcome.changes, vec![Change::Claimed { holder: view, object: a }]);

        inheritance.remove_inherited_object(&mut ctx, a).unwrap();
        assert!(ctx.get(view).unwrap().allocated().unwrap().contains(&a));
    }

    #[test]
    fn test_direct_attribute_value_outlives_inheritance() {
        let mut ctx = ModelContext::new();
        let a = new(&mut ctx, ObjectKind::FunctionalElement, "A");
        let b = new(&mut ctx, ObjectKind::FunctionalElement, "B");
        let mass = new(&mut ctx, ObjectKind::Attribute, "mass");
        let colour = new(&mut ctx, ObjectKind::Attribute, "colour");
        let engine = AllocationEngine::default();
        let inheritance = engine.inheritance();
        engine.set_attribute(&mut ctx, mass, b, "3 kg").unwrap();
        engine.set_attribute(&mut ctx, colour, b, "red").unwrap();
        inheritance.derive(&mut ctx, a, b).unwrap();
        assert_eq!(described(&ctx, mass, a).as_deref(), Some("3 kg"));

        // Same value as inherited: only ownership changes
        let outcome = engine.set_attribute(&mut ctx, mass, a, "3 kg").unwrap();
        assert_eq!(outcome.update_flag(), 1);
        assert_eq!(outcome.changes, vec![Change::Claimed { holder: mass, object: a }]);

        let changed = engine.set_attribute(&mut ctx, mass, b, "5 kg").unwrap();
        inheritance.mirror(&mut ctx, &changed.changes);
        assert_eq!(described(&ctx, mass, a).as_deref(), Some("3 kg"));

        // Inherited values still follow the base
        let changed = engine.set_attribute(&mut ctx, colour, b, "blue").unwrap();
        inheritance.mirror(&mut ctx, &changed.changes);
        assert_eq!(described(&ctx, colour, a).as_deref(), Some("blue"));

        inheritance.remove_inherited_object(&mut ctx, a).unwrap();
        assert_eq!(described(&ctx, mass, a).as_deref(), Some("3 kg"));
        assert_eq!(described(&ctx, colour, a), None);
        assert_eq!(described(&ctx, mass, b).as_deref(), Some("5 kg"));
    }

    #[test]
    fn test_user_flow_edits_on_inherited_edges() {
        let mut ctx = ModelContext::new();
        let a = new(&mut ctx, ObjectKind::Function, "A");
        let b = new(&mut ctx, ObjectKind::Function, "B");
        let fuel = new(&mut ctx, ObjectKind::Data, "fuel");
        let power = new(&mut ctx, ObjectKind::Data, "power");
        let heat = new(&mut ctx, ObjectKind::Data, "heat");
        let engine = AllocationEngine::default();
        let inheritance = engine.inheritance();
        engine.add_flow(&mut ctx, FlowRole::Consumer, fuel, b).unwrap();
        engine.add_flow(&mut ctx, FlowRole::Producer, power, b).unwrap();
        engine.add_flow(&mut ctx, FlowRole::Producer, heat, b).unwrap();
        inheritance.derive(&mut ctx, a, b).unwrap();
        assert_eq!(ctx.overlay(a).unwrap().flows.len(), 3);

        // Dropped by the user, kept by the user, left inherited
        engine.remove_flow(&mut ctx, FlowRole::Consumer, fuel, a).unwrap();
        engine.add_flow(&mut ctx, FlowRole::Producer, power, a).unwrap();
        assert_eq!(
            ctx.overlay(a).unwrap().flows,
            vec![(FlowRole::Producer, heat)]
        );

        let outcome = inheritance.remove_inherited_object(&mut ctx, a).unwrap();
        assert!(outcome.changes.contains(&Change::FlowRemoved {
            role: FlowRole::Producer,
            data: heat,
            function: a,
        }));
        assert!(!ctx.flows().contains(FlowRole::Consumer, fuel, a));
        assert!(!ctx.flows().contains(FlowRole::Producer, heat, a));
        assert_eq!(
            ctx.flows().get(FlowRole::Producer, power, a).map(|f| f.origin),
            Some(FlowOrigin::Direct)
        );
        assert!(ctx.flows().contains(FlowRole::Consumer, fuel, b));
        assert!(ctx.flows().contains(FlowRole::Producer, power, b));
        assert!(ctx.flows().contains(FlowRole::Producer, heat, b));
    }
}
