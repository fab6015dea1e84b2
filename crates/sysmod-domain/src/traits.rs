//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the model and its collaborators.
//! Implementations live in other crates.

use crate::{ModelContext, ModelObject, ObjectId, Subgraph, TaggedToken};

/// Trait for persisting a model
///
/// Implemented by the infrastructure layer (sysmod-store)
pub trait ModelStore {
    /// Error type for store operations
    type Error;

    /// Load every object, flow and overlay
    fn load(&self) -> Result<ModelContext, Self::Error>;

    /// Insert or update the given objects
    fn save(&mut self, objects: &[ModelObject]) -> Result<(), Self::Error>;

    /// Remove the given objects
    fn delete(&mut self, ids: &[ObjectId]) -> Result<(), Self::Error>;

    /// Replace the persisted flow table and overlays with the model's
    fn save_relations(&mut self, model: &ModelContext) -> Result<(), Self::Error>;
}

/// Trait for part-of-speech tagging of requirement and goal text
///
/// Implemented by the adapter layer (sysmod-tagger)
pub trait PosTagger {
    /// Error type for tagging operations
    type Error;

    /// Tokenize and tag `text`, preserving token order
    fn tag(&self, text: &str) -> Result<Vec<TaggedToken>, Self::Error>;
}

/// Trait for turning a subgraph into a diagram description
///
/// Implemented by the session layer (sysmod-session)
pub trait DiagramRenderer {
    /// Produce the diagram description; consumed opaquely by the host
    fn render(&self, graph: &Subgraph) -> String;
}
