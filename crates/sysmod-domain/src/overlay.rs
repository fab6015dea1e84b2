//! Inheritance overlays
//!
//! An overlay records exactly what a derived object received from its base, so
//! the inheritance can be retracted without touching what the derived object
//! owns on its own.

use crate::{FlowRole, ObjectId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What a derived object inherited from its base
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    /// Base object the overlay was computed from
    pub base: Option<ObjectId>,

    /// Ids added to the derived object's allocated set
    #[serde(default)]
    pub allocated: BTreeSet<ObjectId>,

    /// Flow edges mirrored onto the derived function: (role, data)
    #[serde(default)]
    pub flows: Vec<(FlowRole, ObjectId)>,

    /// Attributes that started describing the derived object
    #[serde(default)]
    pub attributes: BTreeSet<ObjectId>,

    /// Views that started containing the derived object
    #[serde(default)]
    pub views: BTreeSet<ObjectId>,
}

impl Overlay {
    /// Start an overlay for the given base
    pub fn for_base(base: ObjectId) -> Self {
        Self {
            base: Some(base),
            ..Self::default()
        }
    }

    /// Whether nothing is currently inherited
    pub fn is_empty(&self) -> bool {
        self.allocated.is_empty()
            && self.flows.is_empty()
            && self.attributes.is_empty()
            && self.views.is_empty()
    }

    /// Record an inherited flow edge
    pub fn add_flow(&mut self, role: FlowRole, data: ObjectId) {
        if !self.flows.contains(&(role, data)) {
            self.flows.push((role, data));
        }
    }

    /// Forget an inherited flow edge; returns whether it was tagged
    pub fn remove_flow(&mut self, role: FlowRole, data: ObjectId) -> bool {
        let before = self.flows.len();
        self.flows.retain(|f| *f != (role, data));
        before != self.flows.len()
    }
}
