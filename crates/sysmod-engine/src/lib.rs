//! Sysmod Allocation Engine
//!
//! Validates and applies every relationship edit on a
//! [`ModelContext`](sysmod_domain::ModelContext): allocation, composition,
//! producer/consumer flows, exposure, attribute values, transitions, views and
//! derivation.
//!
//! ## Rules
//!
//! - **Legality**: each (holder kind, object kind) pair is either allowed or an
//!   `IllegalRelation`
//! - **Family consistency**: a function or state is allocated within one
//!   element (or state) family at a time
//! - **Flow propagation**: a parent function shows the exchanges its children
//!   make with the outside, and hides the ones they make among themselves
//! - **Inheritance**: derived objects see their base's relations through a
//!   retractable overlay
//!
//! Every operation validates before mutating and reports what it did as an
//! [`Outcome`]; an empty outcome means the model was already in the requested
//! state (update flag 0).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod composition;
pub mod config;
pub mod engine;
pub mod exposure;
pub mod flows;
pub mod inheritance;
pub mod outcome;
pub mod properties;
pub mod query;

pub use config::EngineConfig;
pub use engine::AllocationEngine;
pub use inheritance::InheritancePropagator;
pub use outcome::{Applied, Change, Outcome, PendingConfirmation};
pub use properties::Endpoint;
