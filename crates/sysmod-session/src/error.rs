//! Error types for the modeling session

use sysmod_domain::ModelError;
use sysmod_linker::LinkerError;
use thiserror::Error;

/// Session operation errors
#[derive(Debug, Error)]
pub enum SessionError {
    /// Model rejected the command
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Requirement or goal could not be created or linked
    #[error(transparent)]
    Linker(#[from] LinkerError),

    /// Persisting the model failed
    #[error("Store error: {0}")]
    Store(String),

    /// No pattern family matched the line
    #[error("Not understood: {0}")]
    Unrecognized(String),

    /// A question must be answered before more commands run
    #[error("Awaiting an answer to: {0}")]
    AwaitingAnswer(String),

    /// `resume` was called with nothing awaiting an answer
    #[error("No question is awaiting an answer")]
    NothingPending,

    /// Pattern table failed to compile
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result alias for session operations
pub type Result<T> = std::result::Result<T, SessionError>;
