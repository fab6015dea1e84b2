//! The engine handle and the allocation rules
//!
//! Every relationship edit goes through [`AllocationEngine`]. The engine itself
//! is stateless apart from its configuration; the model is passed in by
//! reference so sessions can own it however they like.

use crate::{Applied, Change, EngineConfig, Outcome, PendingConfirmation};
use std::collections::VecDeque;
use sysmod_domain::{ModelContext, ModelError, ModelResult, ObjectId, ObjectKind};
use tracing::{debug, info};

/// Which extra rule an allowed (holder, object) pair is subject to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    /// No extra rule
    Plain,
    /// Object may live in one element family at a time
    ElementFamily,
    /// Object may live in one state family at a time
    StateFamily,
    /// Data must be exchanged by a function behind the interface
    InterfaceData,
    /// Requirement or goal satisfied by the object
    Satisfaction,
}

/// Applies relationship edits to a model, enforcing the consistency rules
#[derive(Debug, Clone, Default)]
pub struct AllocationEngine {
    config: EngineConfig,
}

impl AllocationEngine {
    /// Create an engine with the given configuration
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Current configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Check whether `holder` may allocate `object`, without changing anything
    pub fn check_allocation(
        &self,
        ctx: &ModelContext,
        holder: ObjectId,
        object: ObjectId,
    ) -> ModelResult<()> {
        self.rule_for(ctx, holder, object).map(|_| ())
    }

    /// Allocate `object` to `holder`
    ///
    /// Returns [`Applied::NeedsConfirmation`] when a function would be split
    /// away from the element family of its parent; call [`Self::resume`] with
    /// the user's answer.
    pub fn allocate(
        &self,
        ctx: &mut ModelContext,
        holder: ObjectId,
        object: ObjectId,
    ) -> ModelResult<Applied> {
        self.rule_for(ctx, holder, object)?;

        if self.is_allocated(ctx, holder, object) {
            debug!("{} already allocates {}", ctx.name_of(holder), ctx.name_of(object));
            let mut outcome = Outcome::new();
            self.claim_inherited(ctx, holder, object, &mut outcome);
            return Ok(Applied::Done(outcome));
        }

        if let Some(question) = self.split_question(ctx, holder, object) {
            debug!("Allocation needs confirmation: {}", question);
            return Ok(Applied::NeedsConfirmation(PendingConfirmation {
                question,
                holder,
                object,
            }));
        }

        self.allocate_confirmed(ctx, holder, object)
            .map(Applied::Done)
    }

    /// Allocate without asking, re-checking legality first
    pub fn allocate_confirmed(
        &self,
        ctx: &mut ModelContext,
        holder: ObjectId,
        object: ObjectId,
    ) -> ModelResult<Outcome> {
        self.rule_for(ctx, holder, object)?;

        let mut outcome = Outcome::new();
        self.claim_inherited(ctx, holder, object, &mut outcome);
        self.allocate_tree(ctx, holder, object, &mut outcome);
        if outcome.is_changed() {
            info!(
                "Allocated {} to {} ({} changes)",
                ctx.name_of(object),
                ctx.name_of(holder),
                outcome.changes.len()
            );
        }
        Ok(outcome)
    }

    /// Complete a suspended allocation with the user's answer
    ///
    /// A negative answer leaves the model untouched.
    pub fn resume(
        &self,
        ctx: &mut ModelContext,
        pending: &PendingConfirmation,
        accepted: bool,
    ) -> ModelResult<Outcome> {
        if !accepted {
            return Err(ModelError::AmbiguousParent(format!(
                "{} was not allocated to {}",
                ctx.name_of(pending.object),
                ctx.name_of(pending.holder)
            )));
        }
        self.allocate_confirmed(ctx, pending.holder, pending.object)
    }

    /// Remove `object` from `holder`'s allocated set
    pub fn deallocate(
        &self,
        ctx: &mut ModelContext,
        holder: ObjectId,
        object: ObjectId,
    ) -> ModelResult<Outcome> {
        ctx.expect_object(object)?;
        let holder_name = ctx.name_of(holder);
        let set = ctx
            .get_mut(holder)
            .ok_or_else(|| ModelError::Resolution(format!("object {}", holder)))?
            .allocated_mut()
            .ok_or_else(|| {
                ModelError::IllegalRelation(format!("{} cannot allocate anything", holder_name))
            })?;

        let mut outcome = Outcome::new();
        if set.remove(&object) {
            outcome.push(Change::Deallocated { holder, object });
            self.claim_inherited(ctx, holder, object, &mut Outcome::new());
            info!("Deallocated {} from {}", ctx.name_of(object), holder_name);
        }
        Ok(outcome)
    }

    // ----- rules -----

    fn rule_for(&self, ctx: &ModelContext, holder: ObjectId, object: ObjectId) -> ModelResult<Rule> {
        let holder_kind = ctx.expect_object(holder)?.kind();
        let object_kind = ctx.expect_object(object)?.kind();

        if holder == object {
            return Err(ModelError::IllegalRelation(format!(
                "{} cannot allocate itself",
                ctx.name_of(holder)
            )));
        }

        use ObjectKind::*;
        let rule = match (holder_kind, object_kind) {
            (FunctionalElement, Function | State) => Rule::ElementFamily,
            (State, Function) => Rule::StateFamily,
            (FunctionalInterface, Data) => Rule::InterfaceData,
            (PhysicalElement, FunctionalElement | Activity) => Rule::Plain,
            (PhysicalInterface, FunctionalInterface) => Rule::Plain,
            (View, k) if k != View => Rule::Plain,
            (Requirement | Goal, k) if k.can_satisfy() => Rule::Satisfaction,
            _ => {
                return Err(ModelError::IllegalRelation(format!(
                    "a {} cannot allocate a {}",
                    holder_kind, object_kind
                )))
            }
        };

        match rule {
            Rule::ElementFamily | Rule::StateFamily => {
                if let Some(other) = self.family_conflict(ctx, holder, object, holder_kind) {
                    return Err(ModelError::IllegalRelation(format!(
                        "{} is already allocated to {}, outside the family of {}",
                        ctx.name_of(object),
                        ctx.name_of(other),
                        ctx.name_of(holder)
                    )));
                }
            }
            Rule::InterfaceData if self.config.enforce_interface_data => {
                if !self.interface_carries(ctx, holder, object) {
                    return Err(ModelError::IllegalRelation(format!(
                        "no function behind {} produces or consumes {}",
                        ctx.name_of(holder),
                        ctx.name_of(object)
                    )));
                }
            }
            _ => {}
        }

        Ok(rule)
    }

    /// First holder of the same kind that owns `object` outside `holder`'s family
    ///
    /// Holdings that only exist through inheritance do not count.
    fn family_conflict(
        &self,
        ctx: &ModelContext,
        holder: ObjectId,
        object: ObjectId,
        kind: ObjectKind,
    ) -> Option<ObjectId> {
        ctx.holders_of_kind(object, kind).into_iter().find(|other| {
            let inherited = ctx
                .overlay(*other)
                .is_some_and(|o| o.allocated.contains(&object));
            !inherited && !ctx.same_family(*other, holder)
        })
    }

    /// Whether some producer or consumer of `data` is allocated to an element exposing `interface`
    fn interface_carries(&self, ctx: &ModelContext, interface: ObjectId, data: ObjectId) -> bool {
        use sysmod_domain::FlowRole;
        [FlowRole::Producer, FlowRole::Consumer]
            .into_iter()
            .flat_map(|role| ctx.flows().functions_for(role, data))
            .any(|function| {
                ctx.holders_of_kind(function, ObjectKind::FunctionalElement)
                    .into_iter()
                    .any(|element| ctx.effective_exposed(element).contains(&interface))
            })
    }

    /// Drop the inheritance tags on a (holder, object) pair the user stated
    /// directly, so later base changes and retraction leave it alone
    pub(crate) fn claim_inherited(
        &self,
        ctx: &mut ModelContext,
        holder: ObjectId,
        object: ObjectId,
        outcome: &mut Outcome,
    ) {
        let as_item = ctx.overlay(holder).is_some_and(|o| o.allocated.contains(&object));
        if as_item {
            ctx.overlay_mut(holder).allocated.remove(&object);
        }
        let as_member = ctx.kind_of(holder) == Some(ObjectKind::View)
            && ctx.overlay(object).is_some_and(|o| o.views.contains(&holder));
        if as_member {
            ctx.overlay_mut(object).views.remove(&holder);
        }
        if as_item || as_member {
            debug!("{} now allocates {} directly", ctx.name_of(holder), ctx.name_of(object));
            outcome.push(Change::Claimed { holder, object });
        }
    }

    fn is_allocated(&self, ctx: &ModelContext, holder: ObjectId, object: ObjectId) -> bool {
        ctx.get(holder)
            .and_then(|h| h.allocated())
            .is_some_and(|set| set.contains(&object))
    }

    /// Question to ask when a function would leave its parent's element family
    fn split_question(&self, ctx: &ModelContext, holder: ObjectId, object: ObjectId) -> Option<String> {
        if !self.config.confirm_split_allocation
            || ctx.kind_of(holder) != Some(ObjectKind::FunctionalElement)
            || ctx.kind_of(object) != Some(ObjectKind::Function)
        {
            return None;
        }
        let parent = ctx.parent(object)?;
        let elsewhere = ctx
            .holders_of_kind(parent, ObjectKind::FunctionalElement)
            .into_iter()
            .find(|e| !ctx.same_family(*e, holder))?;

        Some(format!(
            "{} belongs to {}, which is allocated to {}. Allocate {} to {} anyway?",
            ctx.name_of(object),
            ctx.name_of(parent),
            ctx.name_of(elsewhere),
            ctx.name_of(object),
            ctx.name_of(holder)
        ))
    }

    fn cascades(&self, holder_kind: ObjectKind, object_kind: ObjectKind) -> bool {
        use ObjectKind::*;
        self.config.allocate_children
            && matches!(
                (holder_kind, object_kind),
                (FunctionalElement, Function | State) | (State, Function)
            )
    }

    /// Allocate `object` and offer the allocation to its composition subtree
    ///
    /// The top-level pair has already been checked. Children that fail a rule
    /// are reported as warnings and skipped; children already allocated keep
    /// their allocation.
    fn allocate_tree(
        &self,
        ctx: &mut ModelContext,
        holder: ObjectId,
        object: ObjectId,
        outcome: &mut Outcome,
    ) {
        let mut work = VecDeque::from([(object, true)]);

        while let Some((item, top)) = work.pop_front() {
            if self.is_allocated(ctx, holder, item) {
                continue;
            }
            if !top {
                if let Err(e) = self.rule_for(ctx, holder, item) {
                    outcome.warn(format!(
                        "{} not allocated to {}: {}",
                        ctx.name_of(item),
                        ctx.name_of(holder),
                        e
                    ));
                    continue;
                }
            }

            if let Some(set) = ctx.get_mut(holder).and_then(|h| h.allocated_mut()) {
                set.insert(item);
                outcome.push(Change::Allocated { holder, object: item });
            }

            let (Some(holder_kind), Some(item_kind)) = (ctx.kind_of(holder), ctx.kind_of(item)) else {
                continue;
            };
            if self.cascades(holder_kind, item_kind) {
                work.extend(ctx.children(item).into_iter().map(|c| (c, false)));
            }
        }
    }
}
