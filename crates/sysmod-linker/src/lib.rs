//! Sysmod Requirement/Goal Linker
//!
//! Reads requirement and goal text and turns it into satisfaction links on the
//! model.
//!
//! # Architecture
//!
//! ```text
//! Text → clauses → PosTagger → candidates → resolution → AllocationEngine
//! ```
//!
//! - **Clause patterns**: `if … then`, `when …,`, `while …,` and the modal
//!   verbs `shall` / `must` / `should` split a sentence into subject, object,
//!   condition and temporal clauses
//! - **Candidate extraction**: noun runs and `X to Y` phrases in each tagged
//!   clause become candidate object references
//! - **Duplicate detection**: a Ratcliff/Obershelp ratio against every
//!   existing description of the same kind suppresses near-copies
//! - **Relationship inference**: the statement is allocated to its subject and
//!   to every mentioned object already related to the subject
//! - **Parent linking**: a new requirement is attached under the closest
//!   requirement held by the subject's composition parent
//!
//! # Example Usage
//!
//! ```
//! use sysmod_domain::{ModelContext, ObjectKind};
//! use sysmod_engine::AllocationEngine;
//! use sysmod_linker::{CreationPath, Linker, LinkerConfig};
//! use sysmod_tagger::LexiconTagger;
//!
//! let mut ctx = ModelContext::new();
//! let engine = AllocationEngine::default();
//! let linker = Linker::new(LexiconTagger::new(), LinkerConfig::default());
//!
//! let result = linker
//!     .create_statement(
//!         &mut ctx,
//!         &engine,
//!         ObjectKind::Requirement,
//!         None,
//!         "The system shall open the door",
//!         CreationPath::Command,
//!     )
//!     .unwrap();
//!
//! assert!(result.statement.is_some());
//! assert_eq!(result.outcome.warnings, vec!["subject unknown".to_string()]);
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod extract;
mod linker;
mod pattern;
mod similarity;
mod types;

#[cfg(test)]
mod tests;

pub use config::LinkerConfig;
pub use error::LinkerError;
pub use extract::candidates;
pub use linker::Linker;
pub use pattern::split_clauses;
pub use similarity::{normalize, ratio};
pub use types::{Candidates, Clauses, CreationPath, LinkResult};
