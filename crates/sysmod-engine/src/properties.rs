//! Plain property edits: attribute values, data ordering, transitions,
//! views, aliases and descriptions

use crate::{AllocationEngine, Change, Outcome};
use sysmod_domain::{ModelContext, ModelError, ModelObject, ModelResult, ObjectId, ObjectKind};
use tracing::info;

/// Which end of a transition to set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// The state the transition leaves
    Source,
    /// The state the transition enters
    Destination,
}

impl AllocationEngine {
    /// Set the value of `attribute` on `object`
    pub fn set_attribute(
        &self,
        ctx: &mut ModelContext,
        attribute: ObjectId,
        object: ObjectId,
        value: &str,
    ) -> ModelResult<Outcome> {
        let object_kind = ctx.expect_object(object)?.kind();
        expect_kind(ctx, attribute, ObjectKind::Attribute)?;
        if object_kind == ObjectKind::Attribute {
            return Err(ModelError::IllegalRelation(
                "an attribute cannot describe another attribute".to_string(),
            ));
        }
        let value = value.trim();
        if value.is_empty() {
            return Err(ModelError::InvalidInput("attribute value is empty".to_string()));
        }

        let mut outcome = Outcome::new();
        // A value stated here is no longer the base's to change or retract
        if ctx.overlay(object).is_some_and(|o| o.attributes.contains(&attribute)) {
            ctx.overlay_mut(object).attributes.remove(&attribute);
            outcome.push(Change::Claimed {
                holder: attribute,
                object,
            });
        }
        if let Some(ModelObject::Attribute(a)) = ctx.get_mut(attribute) {
            if a.described.get(&object).map(String::as_str) == Some(value) {
                return Ok(outcome);
            }
            a.described.insert(object, value.to_string());
        }
        outcome.push(Change::Described {
            attribute,
            object,
            value: value.to_string(),
        });
        info!(
            "{} of {} is {}",
            ctx.name_of(attribute),
            ctx.name_of(object),
            value
        );
        Ok(outcome)
    }

    /// Record that `predecessor` comes before `data`
    pub fn precede(
        &self,
        ctx: &mut ModelContext,
        predecessor: ObjectId,
        data: ObjectId,
    ) -> ModelResult<Outcome> {
        expect_kind(ctx, predecessor, ObjectKind::Data)?;
        expect_kind(ctx, data, ObjectKind::Data)?;
        if predecessor == data {
            return Err(ModelError::IllegalRelation(format!(
                "{} cannot precede itself",
                ctx.name_of(data)
            )));
        }

        let mut outcome = Outcome::new();
        if let Some(ModelObject::Data(d)) = ctx.get_mut(data) {
            if d.predecessors.insert(predecessor) {
                outcome.push(Change::Preceded { predecessor, data });
            }
        }
        Ok(outcome)
    }

    /// Set the source or destination state of a transition
    pub fn set_transition_endpoint(
        &self,
        ctx: &mut ModelContext,
        transition: ObjectId,
        endpoint: Endpoint,
        state: ObjectId,
    ) -> ModelResult<Outcome> {
        expect_kind(ctx, transition, ObjectKind::Transition)?;
        expect_kind(ctx, state, ObjectKind::State)?;

        let mut outcome = Outcome::new();
        if let Some(ModelObject::Transition(t)) = ctx.get_mut(transition) {
            let slot = match endpoint {
                Endpoint::Source => &mut t.source,
                Endpoint::Destination => &mut t.destination,
            };
            if *slot != Some(state) {
                *slot = Some(state);
                outcome.push(Change::Updated { id: transition });
            }
        }
        Ok(outcome)
    }

    /// Set the source state of a transition
    pub fn set_transition_source(
        &self,
        ctx: &mut ModelContext,
        transition: ObjectId,
        state: ObjectId,
    ) -> ModelResult<Outcome> {
        self.set_transition_endpoint(ctx, transition, Endpoint::Source, state)
    }

    /// Set the destination state of a transition
    pub fn set_transition_destination(
        &self,
        ctx: &mut ModelContext,
        transition: ObjectId,
        state: ObjectId,
    ) -> ModelResult<Outcome> {
        self.set_transition_endpoint(ctx, transition, Endpoint::Destination, state)
    }

    /// Add a free-text firing condition to a transition
    pub fn add_condition(
        &self,
        ctx: &mut ModelContext,
        transition: ObjectId,
        condition: &str,
    ) -> ModelResult<Outcome> {
        expect_kind(ctx, transition, ObjectKind::Transition)?;
        let condition = condition.trim();
        if condition.is_empty() {
            return Err(ModelError::InvalidInput("condition is empty".to_string()));
        }

        let mut outcome = Outcome::new();
        if let Some(ModelObject::Transition(t)) = ctx.get_mut(transition) {
            if !t.conditions.iter().any(|c| c == condition) {
                t.conditions.push(condition.to_string());
                outcome.push(Change::Updated { id: transition });
            }
        }
        Ok(outcome)
    }

    /// Make `view` the single activated view
    pub fn activate_view(&self, ctx: &mut ModelContext, view: ObjectId) -> ModelResult<Outcome> {
        expect_kind(ctx, view, ObjectKind::View)?;

        let views: Vec<ObjectId> = ctx.objects_of(ObjectKind::View).map(|v| v.id()).collect();
        let mut outcome = Outcome::new();
        for id in views {
            if let Some(ModelObject::View(v)) = ctx.get_mut(id) {
                let wanted = id == view;
                if v.activated != wanted {
                    v.activated = wanted;
                    outcome.push(Change::Updated { id });
                }
            }
        }
        if outcome.is_changed() {
            info!("Considering view {}", ctx.name_of(view));
        }
        Ok(outcome)
    }

    /// The activated view, if any
    pub fn active_view(&self, ctx: &ModelContext) -> Option<ObjectId> {
        ctx.objects_of(ObjectKind::View)
            .find(|o| matches!(o, ModelObject::View(v) if v.activated))
            .map(|o| o.id())
    }

    /// Give `object` an alternative name
    ///
    /// The alias may not equal any other object's name or alias.
    pub fn set_alias(&self, ctx: &mut ModelContext, object: ObjectId, alias: &str) -> ModelResult<Outcome> {
        ctx.expect_object(object)?;
        let alias = alias.trim();
        if alias.is_empty() {
            return Err(ModelError::InvalidInput("alias is empty".to_string()));
        }
        if let Some(other) = ctx
            .objects()
            .find(|o| o.id() != object && o.header().answers_to(alias))
        {
            return Err(ModelError::Duplicate(format!(
                "'{}' already designates {} {}",
                alias,
                other.kind(),
                other.name()
            )));
        }

        let mut outcome = Outcome::new();
        if let Some(obj) = ctx.get_mut(object) {
            let header = obj.header_mut();
            if header.alias.as_deref() != Some(alias) {
                header.alias = Some(alias.to_string());
                outcome.push(Change::Updated { id: object });
            }
        }
        Ok(outcome)
    }

    /// Replace the description of a requirement or goal
    pub fn set_description(
        &self,
        ctx: &mut ModelContext,
        statement: ObjectId,
        text: &str,
    ) -> ModelResult<Outcome> {
        let kind = ctx.expect_object(statement)?.kind();
        let text = text.trim();
        if text.is_empty() {
            return Err(ModelError::InvalidInput("description is empty".to_string()));
        }

        let mut outcome = Outcome::new();
        match ctx.get_mut(statement) {
            Some(ModelObject::Requirement(s) | ModelObject::Goal(s)) => {
                if s.description != text {
                    s.description = text.to_string();
                    outcome.push(Change::Updated { id: statement });
                }
            }
            _ => {
                return Err(ModelError::IllegalRelation(format!(
                    "a {} has no description",
                    kind
                )))
            }
        }
        Ok(outcome)
    }
}

pub(crate) fn expect_kind(ctx: &ModelContext, id: ObjectId, kind: ObjectKind) -> ModelResult<()> {
    let actual = ctx.expect_object(id)?.kind();
    if actual != kind {
        return Err(ModelError::IllegalRelation(format!(
            "{} is a {}, not a {}",
            ctx.name_of(id),
            actual,
            kind
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sysmod_domain::TypeRef;

    fn new(ctx: &mut ModelContext, kind: ObjectKind, name: &str) -> ObjectId {
        ctx.create(kind, name, TypeRef::Base(kind)).unwrap()
    }

    #[test]
    fn test_attribute_value_changes() {
        let mut ctx = ModelContext::new();
        let mass = new(&mut ctx, ObjectKind::Attribute, "mass");
        let e = new(&mut ctx, ObjectKind::PhysicalElement, "Pump");
        let engine = AllocationEngine::default();

        assert_eq!(engine.set_attribute(&mut ctx, mass, e, "3 kg").unwrap().update_flag(), 1);
        assert_eq!(engine.set_attribute(&mut ctx, mass, e, "3 kg").unwrap().update_flag(), 0);
        assert_eq!(engine.set_attribute(&mut ctx, mass, e, "4 kg").unwrap().update_flag(), 1);
        assert!(engine.set_attribute(&mut ctx, e, mass, "x").is_err());
    }

    #[test]
    fn test_precede() {
        let mut ctx = ModelContext::new();
        let a = new(&mut ctx, ObjectKind::Data, "a");
        let b = new(&mut ctx, ObjectKind::Data, "b");
        let engine = AllocationEngine::default();

        assert_eq!(engine.precede(&mut ctx, a, b).unwrap().update_flag(), 1);
        assert_eq!(engine.precede(&mut ctx, a, b).unwrap().update_flag(), 0);
        assert!(engine.precede(&mut ctx, a, a).is_err());
    }

    #[test]
    fn test_transition_endpoints_and_conditions() {
        let mut ctx = ModelContext::new();
        let t = new(&mut ctx, ObjectKind::Transition, "T1");
        let s1 = new(&mut ctx, ObjectKind::State, "Idle");
        let s2 = new(&mut ctx, ObjectKind::State, "Running");
        let engine = AllocationEngine::default();

        engine.set_transition_source(&mut ctx, t, s1).unwrap();
        engine.set_transition_destination(&mut ctx, t, s2).unwrap();
        engine.add_condition(&mut ctx, t, "start pressed").unwrap();
        assert_eq!(engine.add_condition(&mut ctx, t, "start pressed").unwrap().update_flag(), 0);

        match ctx.get(t).unwrap() {
            ModelObject::Transition(tr) => {
                assert_eq!(tr.source, Some(s1));
                assert_eq!(tr.destination, Some(s2));
                assert_eq!(tr.conditions, vec!["start pressed".to_string()]);
            }
            other => panic!("unexpected {:?}", other.kind()),
        }
        assert!(engine.set_transition_source(&mut ctx, t, t).is_err());
    }

    #[test]
    fn test_single_active_view() {
        let mut ctx = ModelContext::new();
        let v1 = new(&mut ctx, ObjectKind::View, "V1");
        let v2 = new(&mut ctx, ObjectKind::View, "V2");
        let engine = AllocationEngine::default();

        engine.activate_view(&mut ctx, v1).unwrap();
        assert_eq!(engine.active_view(&ctx), Some(v1));
        let outcome = engine.activate_view(&mut ctx, v2).unwrap();
        assert_eq!(outcome.changes.len(), 2);
        assert_eq!(engine.active_view(&ctx), Some(v2));
    }

    #[test]
    fn test_alias_must_be_unused() {
        let mut ctx = ModelContext::new();
        let f = new(&mut ctx, ObjectKind::Function, "F1");
        new(&mut ctx, ObjectKind::Data, "fuel");
        let engine = AllocationEngine::default();

        assert!(matches!(
            engine.set_alias(&mut ctx, f, "fuel"),
            Err(ModelError::Duplicate(_))
        ));
        assert_eq!(engine.set_alias(&mut ctx, f, "Pump fuel").unwrap().update_flag(), 1);
        assert_eq!(ctx.resolve("Pump fuel", &[]).unwrap(), Some(f));
    }

    #[test]
    fn test_description_only_on_statements() {
        let mut ctx = ModelContext::new();
        let r = new(&mut ctx, ObjectKind::Requirement, "R1");
        let f = new(&mut ctx, ObjectKind::Function, "F1");
        let engine = AllocationEngine::default();

        assert_eq!(engine.set_description(&mut ctx, r, "The pump shall run").unwrap().update_flag(), 1);
        assert_eq!(ctx.get(r).unwrap().description(), Some("The pump shall run"));
        assert!(engine.set_description(&mut ctx, f, "text").is_err());
    }
}
