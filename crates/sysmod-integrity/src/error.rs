//! Error types for safe deletion

use sysmod_domain::ModelError;
use thiserror::Error;

/// Errors that can occur while checking or deleting objects
#[derive(Error, Debug)]
pub enum IntegrityError {
    /// Deletion blocked or object unknown
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
