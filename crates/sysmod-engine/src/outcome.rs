//! What an engine operation did

use sysmod_domain::{FlowOrigin, FlowRole, ObjectId};
use std::collections::BTreeSet;

/// A single relation created or removed by an operation
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    /// A new object entered the model
    Created {
        /// The object
        id: ObjectId,
    },
    /// An object left the model
    Deleted {
        /// The object
        id: ObjectId,
    },
    /// Child attached to parent
    Composed {
        /// Parent
        parent: ObjectId,
        /// Child
        child: ObjectId,
    },
    /// Child detached from parent
    Decomposed {
        /// Former parent
        parent: ObjectId,
        /// Former child
        child: ObjectId,
    },
    /// Object added to a holder's allocated set
    Allocated {
        /// Holder
        holder: ObjectId,
        /// Allocated object
        object: ObjectId,
    },
    /// Object removed from a holder's allocated set
    Deallocated {
        /// Holder
        holder: ObjectId,
        /// Removed object
        object: ObjectId,
    },
    /// Interface added to an element's exposed set
    Exposed {
        /// Element
        element: ObjectId,
        /// Interface
        interface: ObjectId,
    },
    /// Interface removed from an element's exposed set
    Unexposed {
        /// Element
        element: ObjectId,
        /// Interface
        interface: ObjectId,
    },
    /// Producer/consumer edge recorded
    FlowAdded {
        /// Side of the flow
        role: FlowRole,
        /// Data
        data: ObjectId,
        /// Function
        function: ObjectId,
        /// Why the edge exists
        origin: FlowOrigin,
    },
    /// Producer/consumer edge retracted
    FlowRemoved {
        /// Side of the flow
        role: FlowRole,
        /// Data
        data: ObjectId,
        /// Function
        function: ObjectId,
    },
    /// Attribute value set on an object
    Described {
        /// Attribute
        attribute: ObjectId,
        /// Described object
        object: ObjectId,
        /// New value
        value: String,
    },
    /// Attribute no longer describes an object
    Undescribed {
        /// Attribute
        attribute: ObjectId,
        /// Formerly described object
        object: ObjectId,
    },
    /// Ordering dependency between two data
    Preceded {
        /// Data that comes first
        predecessor: ObjectId,
        /// Data that comes after
        data: ObjectId,
    },
    /// Any plain property of one object changed (alias, description, endpoints...)
    Updated {
        /// The object
        id: ObjectId,
    },
    /// Inherited relation now owned by the derived object itself
    ///
    /// For attributes `holder` is the attribute and `object` the described object.
    Claimed {
        /// Holder (or attribute)
        holder: ObjectId,
        /// Held (or described) object
        object: ObjectId,
    },
    /// Derived pointer set
    Derived {
        /// Derived object
        object: ObjectId,
        /// Base object
        base: ObjectId,
    },
    /// Derived pointer cleared
    Underived {
        /// Formerly derived object
        object: ObjectId,
        /// Former base
        base: ObjectId,
    },
}

impl Change {
    /// Objects whose persisted form this change affects
    pub fn touched(&self) -> Vec<ObjectId> {
        match self {
            Change::Created { id } | Change::Deleted { id } | Change::Updated { id } => vec![*id],
            Change::Composed { parent, child } | Change::Decomposed { parent, child } => {
                vec![*parent, *child]
            }
            Change::Allocated { holder, object }
            | Change::Deallocated { holder, object }
            | Change::Claimed { holder, object } => {
                vec![*holder, *object]
            }
            Change::Exposed { element, interface } | Change::Unexposed { element, interface } => {
                vec![*element, *interface]
            }
            Change::FlowAdded { data, function, .. } | Change::FlowRemoved { data, function, .. } => {
                vec![*data, *function]
            }
            Change::Described { attribute, object, .. }
            | Change::Undescribed { attribute, object } => vec![*attribute, *object],
            Change::Preceded { predecessor, data } => vec![*predecessor, *data],
            Change::Derived { object, base } | Change::Underived { object, base } => {
                vec![*object, *base]
            }
        }
    }

    /// Whether the change alters the flow table
    pub fn is_flow(&self) -> bool {
        matches!(self, Change::FlowAdded { .. } | Change::FlowRemoved { .. })
    }
}

/// Changes and warnings produced by one operation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    /// Relations created or removed, first-order change first
    pub changes: Vec<Change>,
    /// Non-blocking traceability gaps
    pub warnings: Vec<String>,
}

impl Outcome {
    /// Create an empty outcome
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a change
    pub fn push(&mut self, change: Change) {
        self.changes.push(change);
    }

    /// Record a warning
    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Append another outcome
    pub fn merge(&mut self, other: Outcome) {
        self.changes.extend(other.changes);
        self.warnings.extend(other.warnings);
    }

    /// Whether anything changed
    pub fn is_changed(&self) -> bool {
        !self.changes.is_empty()
    }

    /// 1 when the model changed, 0 otherwise
    pub fn update_flag(&self) -> u8 {
        u8::from(self.is_changed())
    }

    /// Every object touched by the changes
    pub fn touched(&self) -> BTreeSet<ObjectId> {
        self.changes.iter().flat_map(Change::touched).collect()
    }
}

/// An allocation waiting for the user's answer
#[derive(Debug, Clone, PartialEq)]
pub struct PendingConfirmation {
    /// Question to show the user
    pub question: String,
    /// Holder of the offered allocation
    pub holder: ObjectId,
    /// Object of the offered allocation
    pub object: ObjectId,
}

/// Result of an operation that may need confirmation
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    /// The operation completed
    Done(Outcome),
    /// The operation is suspended until [`crate::AllocationEngine::resume`] is called
    NeedsConfirmation(PendingConfirmation),
}

impl Applied {
    /// The outcome, if the operation completed
    pub fn outcome(&self) -> Option<&Outcome> {
        match self {
            Applied::Done(outcome) => Some(outcome),
            Applied::NeedsConfirmation(_) => None,
        }
    }
}
