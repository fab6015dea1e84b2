//! Safe deletion
//!
//! An object may only leave the model once nothing refers to it and it refers
//! to nothing. Each check below yields one human-readable reason; deletion of
//! a batch goes ahead only when every object in it has none.

use crate::{DeletionMetrics, IntegrityConfig};
use std::collections::BTreeSet;
use sysmod_domain::{FlowRole, ModelContext, ModelError, ModelObject, ModelResult, ObjectId, ObjectKind};
use sysmod_engine::{Change, Outcome};
use tracing::{debug, info, warn};

/// Checks relationships before deleting and counts what was deleted
///
/// # Examples
///
/// ```
/// use sysmod_domain::{ModelContext, ObjectKind, TypeRef};
/// use sysmod_integrity::IntegrityChecker;
///
/// let mut ctx = ModelContext::new();
/// let f = ctx.create(ObjectKind::Function, "F1", TypeRef::Base(ObjectKind::Function)).unwrap();
///
/// let mut checker = IntegrityChecker::default_config();
/// let outcome = checker.delete(&mut ctx, &[f]).unwrap();
/// assert_eq!(outcome.update_flag(), 1);
/// assert!(ctx.is_empty());
/// assert_eq!(checker.metrics().total_deleted(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct IntegrityChecker {
    config: IntegrityConfig,
    metrics: DeletionMetrics,
}

impl IntegrityChecker {
    /// Create a checker with the given configuration
    pub fn new(config: IntegrityConfig) -> Self {
        Self {
            config,
            metrics: DeletionMetrics::new(),
        }
    }

    /// Create a checker with default configuration
    pub fn default_config() -> Self {
        Self::new(IntegrityConfig::default())
    }

    /// Current configuration
    pub fn config(&self) -> &IntegrityConfig {
        &self.config
    }

    /// Counters since creation or the last reset
    pub fn metrics(&self) -> &DeletionMetrics {
        &self.metrics
    }

    /// Reset counters
    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }

    /// Every reason `id` cannot be deleted right now (empty when it can)
    pub fn blockers(&self, ctx: &ModelContext, id: ObjectId) -> ModelResult<Vec<String>> {
        let obj = ctx.expect_object(id)?;
        let names = |ids: &[ObjectId]| {
            ids.iter()
                .map(|i| ctx.name_of(*i))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let mut reasons = Vec::new();
        let mut check = |ids: Vec<ObjectId>, what: &str| {
            if !ids.is_empty() {
                reasons.push(format!("{} {}", what, names(&ids)));
            }
        };

        // composition
        check(ctx.parent(id).into_iter().collect(), "is part of");
        check(ctx.children(id), "is composed of");

        // allocation, both directions
        check(
            obj.allocated().map(|s| s.iter().copied().collect()).unwrap_or_default(),
            "allocates",
        );
        let (views, holders): (Vec<ObjectId>, Vec<ObjectId>) = ctx
            .holders_of(id)
            .into_iter()
            .partition(|h| ctx.kind_of(*h) == Some(ObjectKind::View));
        check(holders, "is allocated to");
        if !self.config.detach_view_membership {
            check(views, "is in view");
        }

        // exposure
        check(
            obj.exposed().map(|s| s.iter().copied().collect()).unwrap_or_default(),
            "exposes",
        );
        check(ctx.exposers_of(id), "is exposed by");

        // flows
        check(ctx.flows().data_for(FlowRole::Producer, id), "produces");
        check(ctx.flows().data_for(FlowRole::Consumer, id), "consumes");
        check(ctx.flows().functions_for(FlowRole::Producer, id), "is produced by");
        check(ctx.flows().functions_for(FlowRole::Consumer, id), "is consumed by");

        // attributes
        if let ModelObject::Attribute(attr) = obj {
            check(attr.described.keys().copied().collect(), "describes");
        }
        check(
            ctx.objects()
                .filter(|o| matches!(o, ModelObject::Attribute(a) if a.described.contains_key(&id)))
                .map(|o| o.id())
                .collect(),
            "is described by",
        );

        // derivation
        check(obj.header().derived.into_iter().collect(), "is derived from");
        check(ctx.derived_from(id), "is the base of");

        // kind-specific
        match obj {
            ModelObject::Type(_) => check(ctx.type_users(id), "is the type of"),
            ModelObject::State(_) => check(
                ctx.objects()
                    .filter(|o| {
                        matches!(o, ModelObject::Transition(t)
                            if t.source == Some(id) || t.destination == Some(id))
                    })
                    .map(|o| o.id())
                    .collect(),
                "is an endpoint of",
            ),
            ModelObject::Data(data) => {
                check(data.predecessors.iter().copied().collect(), "is preceded by");
                check(
                    ctx.objects()
                        .filter(|o| matches!(o, ModelObject::Data(d) if d.predecessors.contains(&id)))
                        .map(|o| o.id())
                        .collect(),
                    "precedes",
                );
            }
            _ => {}
        }

        Ok(reasons)
    }

    /// Fail with [`ModelError::IntegrityBlocked`] unless `id` can be deleted
    pub fn ensure_deletable(&self, ctx: &ModelContext, id: ObjectId) -> ModelResult<()> {
        let reasons = self.blockers(ctx, id)?;
        if reasons.is_empty() {
            Ok(())
        } else {
            Err(ModelError::IntegrityBlocked {
                name: ctx.name_of(id),
                reasons,
            })
        }
    }

    /// Delete every object in `ids`, or none of them
    ///
    /// All objects are checked before anything is removed. When several are
    /// blocked the error names all of them and prefixes each reason with the
    /// object it belongs to.
    pub fn delete(&mut self, ctx: &mut ModelContext, ids: &[ObjectId]) -> ModelResult<Outcome> {
        let mut seen = BTreeSet::new();
        let ids: Vec<ObjectId> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();

        let mut blocked: Vec<(ObjectId, Vec<String>)> = Vec::new();
        for &id in &ids {
            let reasons = self.blockers(ctx, id)?;
            if !reasons.is_empty() {
                blocked.push((id, reasons));
            }
        }

        if !blocked.is_empty() {
            for (id, reasons) in &blocked {
                if let Some(kind) = ctx.kind_of(*id) {
                    self.metrics.record_blocked(kind);
                }
                warn!("Cannot delete {}: {}", ctx.name_of(*id), reasons.join("; "));
            }
            return Err(blocked_error(ctx, blocked));
        }

        let mut outcome = Outcome::new();
        if self.config.dry_run {
            for &id in &ids {
                outcome.warn(format!("dry run: {} can be deleted", ctx.name_of(id)));
            }
            return Ok(outcome);
        }

        for id in ids {
            if self.config.detach_view_membership {
                for view in ctx.holders_of_kind(id, ObjectKind::View) {
                    if let Some(set) = ctx.get_mut(view).and_then(|v| v.allocated_mut()) {
                        set.remove(&id);
                        outcome.push(Change::Deallocated { holder: view, object: id });
                        debug!("Dropped {} from view {}", id, view);
                    }
                }
            }

            ctx.take_overlay(id);
            if let Some(obj) = ctx.remove(id) {
                info!("Deleted {} {}", obj.kind(), obj.name());
                self.metrics.record_deletion(obj.kind());
                outcome.push(Change::Deleted { id });
            }
        }

        Ok(outcome)
    }
}

fn blocked_error(ctx: &ModelContext, mut blocked: Vec<(ObjectId, Vec<String>)>) -> ModelError {
    if blocked.len() == 1 {
        let (id, reasons) = blocked.remove(0);
        return ModelError::IntegrityBlocked {
            name: ctx.name_of(id),
            reasons,
        };
    }

    let name = blocked
        .iter()
        .map(|(id, _)| ctx.name_of(*id))
        .collect::<Vec<_>>()
        .join(", ");
    let reasons = blocked
        .iter()
        .flat_map(|(id, reasons)| {
            let owner = ctx.name_of(*id);
            reasons.iter().map(move |r| format!("{} {}", owner, r))
        })
        .collect();
    ModelError::IntegrityBlocked { name, reasons }
}
