//! Sysmod Domain Layer
//!
//! This crate contains the systems-engineering model: object identifiers, the
//! closed set of object kinds, the entity structs, the session-scoped
//! [`ModelContext`] arena and the trait interfaces every other layer depends on.
//!
//! ## Key Concepts
//!
//! - **Object**: a function, data, state, element, interface, requirement... all
//!   identified by a permanent [`ObjectId`]
//! - **Composition**: parent/child trees per kind
//! - **Allocation**: id-set membership from a holder to the objects it realizes
//! - **Flow**: producer/consumer edges between functions and data
//! - **Overlay**: what a derived object inherited from its base
//!
//! ## Architecture
//!
//! - Relationships are stored as id sets, never as references
//! - No ambient state: every operation takes the model by reference
//! - Infrastructure (store, tagger, renderer) lives behind [`traits`]

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod entity;
pub mod error;
pub mod flow;
pub mod id;
pub mod kind;
pub mod model;
pub mod overlay;
pub mod subgraph;
pub mod tag;
pub mod traits;

// Re-exports for convenience
pub use entity::{
    Activity, Attribute, Composition, Data, Function, FunctionalElement, FunctionalInterface,
    Header, ModelObject, PhysicalElement, PhysicalInterface, State, Statement, Transition,
    TypeDef, View,
};
pub use error::{ModelError, ModelResult};
pub use flow::{Flow, FlowOrigin, FlowRole, FlowTable};
pub use id::ObjectId;
pub use kind::{ObjectKind, TypeRef};
pub use model::ModelContext;
pub use overlay::Overlay;
pub use subgraph::{EdgeRelation, Subgraph, SubgraphEdge, SubgraphNode};
pub use tag::{PosTag, TaggedToken};
