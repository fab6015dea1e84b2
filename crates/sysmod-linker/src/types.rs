//! Request and result types for linking

use sysmod_domain::ObjectId;
use sysmod_engine::Outcome;

/// Which command produced the text being linked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationPath {
    /// `requirement: <text>` / `goal: <text>`
    Command,
    /// `X describes "<text>"`
    Describe,
}

/// Clauses of a requirement or goal sentence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clauses {
    /// Who is required to act (before the modal verb)
    pub subject: String,
    /// What is required (after the modal verb)
    pub object: String,
    /// Text of an `if` clause
    pub condition: Option<String>,
    /// Text of a `when` / `while` clause
    pub temporal: Option<String>,
}

/// Candidate references found in each clause
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidates {
    /// Subject clause candidates, best first
    pub subject: Vec<String>,
    /// Object clause candidates
    pub object: Vec<String>,
    /// Condition clause candidates
    pub condition: Vec<String>,
    /// Temporal clause candidates
    pub temporal: Vec<String>,
}

/// Result of creating, describing or linking a statement
#[derive(Debug, Clone, Default)]
pub struct LinkResult {
    /// The statement created or updated (None when suppressed as duplicate)
    pub statement: Option<ObjectId>,
    /// Existing statement the text duplicates, with its similarity
    pub duplicate_of: Option<(ObjectId, f64)>,
    /// Resolved subject, if any
    pub subject: Option<ObjectId>,
    /// Changes and warnings
    pub outcome: Outcome,
}
