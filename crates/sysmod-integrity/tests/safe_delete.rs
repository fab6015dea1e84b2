//! Safe deletion over models built through the engine

use proptest::prelude::*;
use sysmod_domain::{FlowRole, ModelContext, ModelError, ModelObject, ObjectId, ObjectKind, TypeRef};
use sysmod_engine::AllocationEngine;
use sysmod_integrity::IntegrityChecker;

fn new(ctx: &mut ModelContext, kind: ObjectKind, name: &str) -> ObjectId {
    ctx.create(kind, name, TypeRef::Base(kind)).unwrap()
}

/// Whether any object, flow or overlay still mentions `id`
fn referenced(ctx: &ModelContext, id: ObjectId) -> bool {
    let in_objects = ctx.objects().any(|o| {
        o.composition()
            .is_some_and(|c| c.parent == Some(id) || c.children.contains(&id))
            || o.allocated().is_some_and(|s| s.contains(&id))
            || o.exposed().is_some_and(|s| s.contains(&id))
            || o.header().derived == Some(id)
            || o.header().type_ref == TypeRef::Custom(id)
            || match o {
                ModelObject::Attribute(a) => a.described.contains_key(&id),
                ModelObject::Data(d) => d.predecessors.contains(&id),
                ModelObject::Transition(t) => t.source == Some(id) || t.destination == Some(id),
                _ => false,
            }
    });
    in_objects || ctx.flows().involves(id) || ctx.overlay(id).is_some()
}

#[test]
fn test_delete_after_detaching_everything() {
    let mut ctx = ModelContext::new();
    let engine = AllocationEngine::default();
    let f1 = new(&mut ctx, ObjectKind::Function, "F1");
    let f1a = new(&mut ctx, ObjectKind::Function, "F1a");
    let e = new(&mut ctx, ObjectKind::FunctionalElement, "E1");
    let a = new(&mut ctx, ObjectKind::Data, "a");
    engine.compose(&mut ctx, f1, f1a).unwrap();
    engine.add_flow(&mut ctx, FlowRole::Producer, a, f1a).unwrap();
    engine.allocate_confirmed(&mut ctx, e, f1).unwrap();

    let mut checker = IntegrityChecker::default_config();
    let err = checker.delete(&mut ctx, &[f1a]).unwrap_err();
    assert!(matches!(err, ModelError::IntegrityBlocked { .. }));

    engine.deallocate(&mut ctx, e, f1a).unwrap();
    engine.deallocate(&mut ctx, e, f1).unwrap();
    engine.remove_flow(&mut ctx, FlowRole::Producer, a, f1a).unwrap();
    engine.decompose(&mut ctx, f1, f1a).unwrap();

    checker.delete(&mut ctx, &[f1a]).unwrap();
    assert!(!ctx.contains(f1a));
    assert!(!referenced(&ctx, f1a));
    assert_eq!(checker.metrics().deleted[&ObjectKind::Function], 1);
}

proptest! {
    #[test]
    fn prop_delete_is_total_or_nothing(
        ops in proptest::collection::vec((0usize..5, any::<prop::sample::Index>(), any::<prop::sample::Index>()), 0..16),
        target in any::<prop::sample::Index>(),
    ) {
        let mut ctx = ModelContext::new();
        let engine = AllocationEngine::default();
        let functions: Vec<ObjectId> = (0..3)
            .map(|i| new(&mut ctx, ObjectKind::Function, &format!("F{}", i)))
            .collect();
        let data: Vec<ObjectId> = (0..2)
            .map(|i| new(&mut ctx, ObjectKind::Data, &format!("d{}", i)))
            .collect();
        let elements: Vec<ObjectId> = (0..2)
            .map(|i| new(&mut ctx, ObjectKind::FunctionalElement, &format!("E{}", i)))
            .collect();
        let view = new(&mut ctx, ObjectKind::View, "V");

        for (op, x, y) in &ops {
            let f = functions[x.index(functions.len())];
            // Rejected edits are part of the exploration
            let _ = match op {
                0 => engine.compose(&mut ctx, f, functions[y.index(functions.len())]),
                1 => engine.add_flow(&mut ctx, FlowRole::Producer, data[y.index(data.len())], f),
                2 => engine.add_flow(&mut ctx, FlowRole::Consumer, data[y.index(data.len())], f),
                3 => engine.allocate_confirmed(&mut ctx, elements[y.index(elements.len())], f),
                _ => engine.allocate_confirmed(&mut ctx, view, f),
            };
        }

        let all: Vec<ObjectId> = ctx.objects().map(|o| o.id()).collect();
        let victim = all[target.index(all.len())];
        let before = ctx.clone();
        let mut checker = IntegrityChecker::default_config();

        match checker.delete(&mut ctx, &[victim]) {
            Ok(_) => {
                prop_assert!(!ctx.contains(victim));
                prop_assert!(!referenced(&ctx, victim));
            }
            Err(ModelError::IntegrityBlocked { reasons, .. }) => {
                prop_assert!(!reasons.is_empty());
                prop_assert_eq!(&ctx, &before);
            }
            Err(other) => prop_assert!(false, "unexpected error {:?}", other),
        }
    }
}
