//! Error types for the Linker

use sysmod_domain::ModelError;
use thiserror::Error;

/// Errors that can occur while creating or linking requirements and goals
#[derive(Error, Debug)]
pub enum LinkerError {
    /// Tagger error
    #[error("Tagger error: {0}")]
    Tagger(String),

    /// Model rejected an edit
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Object is not a requirement or goal
    #[error("Not a requirement or goal: {0}")]
    NotAStatement(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
