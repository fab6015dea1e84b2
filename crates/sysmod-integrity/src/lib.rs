//! Sysmod Integrity
//!
//! Safe deletion of model objects.
//!
//! # Overview
//!
//! Objects are never removed while anything still refers to them. Before a
//! deletion the checker walks every relationship the object can take part in:
//!
//! - composition parent and children
//! - allocation, as holder and as allocated item
//! - view membership
//! - exposure, as element and as interface
//! - production and consumption
//! - attribute values
//! - derivation, as derived object and as base
//! - type usage (Types), transition endpoints (States), data ordering (Data)
//!
//! Each failing check is one reason in [`ModelError::IntegrityBlocked`]. A
//! batch is deleted in full or not at all.
//!
//! # Usage
//!
//! ```
//! use sysmod_domain::{ModelContext, ModelError, ObjectKind, TypeRef};
//! use sysmod_integrity::IntegrityChecker;
//!
//! let mut ctx = ModelContext::new();
//! let f = ctx.create(ObjectKind::Function, "F1", TypeRef::Base(ObjectKind::Function)).unwrap();
//! let g = ctx.create(ObjectKind::Function, "F1a", TypeRef::Base(ObjectKind::Function)).unwrap();
//! ctx.get_mut(f).unwrap().composition_mut().unwrap().children.insert(g);
//! ctx.get_mut(g).unwrap().composition_mut().unwrap().parent = Some(f);
//!
//! let mut checker = IntegrityChecker::default_config();
//! match checker.delete(&mut ctx, &[f]) {
//!     Err(ModelError::IntegrityBlocked { reasons, .. }) => {
//!         assert_eq!(reasons, vec!["is composed of F1a".to_string()]);
//!     }
//!     other => panic!("unexpected {:?}", other),
//! }
//! println!("{}", checker.metrics().summary());
//! ```
//!
//! [`ModelError::IntegrityBlocked`]: sysmod_domain::ModelError::IntegrityBlocked

#![warn(missing_docs)]

mod checker;
mod config;
mod error;
mod metrics;

pub use checker::IntegrityChecker;
pub use config::IntegrityConfig;
pub use error::IntegrityError;
pub use metrics::DeletionMetrics;
