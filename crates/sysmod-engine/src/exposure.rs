//! Elements presenting interfaces

use crate::{AllocationEngine, Change, Outcome};
use sysmod_domain::{ModelContext, ModelError, ModelResult, ObjectId, ObjectKind};
use tracing::info;

impl AllocationEngine {
    /// Record that `element` exposes `interface`
    pub fn expose(
        &self,
        ctx: &mut ModelContext,
        element: ObjectId,
        interface: ObjectId,
    ) -> ModelResult<Outcome> {
        check_exposure(ctx, element, interface)?;

        let mut outcome = Outcome::new();
        let added = ctx
            .get_mut(element)
            .and_then(|e| e.exposed_mut())
            .is_some_and(|set| set.insert(interface));
        if added {
            outcome.push(Change::Exposed { element, interface });
            info!("{} exposes {}", ctx.name_of(element), ctx.name_of(interface));
        }
        Ok(outcome)
    }

    /// Remove `interface` from `element`'s exposed set
    pub fn unexpose(
        &self,
        ctx: &mut ModelContext,
        element: ObjectId,
        interface: ObjectId,
    ) -> ModelResult<Outcome> {
        check_exposure(ctx, element, interface)?;

        let mut outcome = Outcome::new();
        let removed = ctx
            .get_mut(element)
            .and_then(|e| e.exposed_mut())
            .is_some_and(|set| set.remove(&interface));
        if removed {
            outcome.push(Change::Unexposed { element, interface });
            info!("{} no longer exposes {}", ctx.name_of(element), ctx.name_of(interface));
        }
        Ok(outcome)
    }
}

fn check_exposure(ctx: &ModelContext, element: ObjectId, interface: ObjectId) -> ModelResult<()> {
    let element_kind = ctx.expect_object(element)?.kind();
    let interface_kind = ctx.expect_object(interface)?.kind();
    match (element_kind, interface_kind) {
        (ObjectKind::FunctionalElement, ObjectKind::FunctionalInterface)
        | (ObjectKind::PhysicalElement, ObjectKind::PhysicalInterface) => Ok(()),
        _ => Err(ModelError::IllegalRelation(format!(
            "a {} cannot expose a {}",
            element_kind, interface_kind
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sysmod_domain::TypeRef;

    #[test]
    fn test_expose_matching_layers() {
        let mut ctx = ModelContext::new();
        let fe = ctx
            .create(ObjectKind::FunctionalElement, "E1", TypeRef::Base(ObjectKind::FunctionalElement))
            .unwrap();
        let fi = ctx
            .create(ObjectKind::FunctionalInterface, "I1", TypeRef::Base(ObjectKind::FunctionalInterface))
            .unwrap();
        let pi = ctx
            .create(ObjectKind::PhysicalInterface, "P1", TypeRef::Base(ObjectKind::PhysicalInterface))
            .unwrap();
        let engine = AllocationEngine::default();

        assert_eq!(engine.expose(&mut ctx, fe, fi).unwrap().update_flag(), 1);
        assert_eq!(engine.expose(&mut ctx, fe, fi).unwrap().update_flag(), 0);
        assert!(engine.expose(&mut ctx, fe, pi).is_err());

        assert_eq!(engine.unexpose(&mut ctx, fe, fi).unwrap().update_flag(), 1);
        assert!(ctx.exposers_of(fi).is_empty());
    }
}
