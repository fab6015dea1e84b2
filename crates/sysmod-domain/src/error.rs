//! Model error taxonomy
//!
//! Every variant is local to the command being processed: none of them leaves
//! the model in a partially applied state.

use thiserror::Error;

/// Errors raised while resolving or changing the model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Referenced name or alias does not exist
    #[error("Unknown object: {0}")]
    Resolution(String),

    /// Name designates several objects of the candidate kinds
    #[error("Ambiguous name '{name}': {count} objects answer to it")]
    Ambiguous {
        /// The name that was looked up
        name: String,
        /// Number of matches
        count: usize,
    },

    /// Relation not permitted between the two objects
    #[error("Illegal relation: {0}")]
    IllegalRelation(String),

    /// Same identity or description already exists
    #[error("Already exists: {0}")]
    Duplicate(String),

    /// Deletion requested while relationships remain
    #[error("Cannot delete '{name}': {}", reasons.join("; "))]
    IntegrityBlocked {
        /// Name of the object
        name: String,
        /// One entry per failing check
        reasons: Vec<String>,
    },

    /// An ambiguous allocation was declined by the user
    #[error("Not applied: {0}")]
    AmbiguousParent(String),

    /// Malformed input value
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result alias for model operations
pub type ModelResult<T> = std::result::Result<T, ModelError>;
