//! Sysmod Modeling Session
//!
//! Puts the allocation engine, the requirement linker, the integrity checker and
//! a store behind one line-oriented command surface.
//!
//! # Architecture
//!
//! - [`Recognizer`]: ordered pattern families turning text into [`Command`]s
//! - [`Session`]: resolve, apply, mirror, persist, relink; one command at a time
//! - [`PlantUmlRenderer`]: diagrams for `show`
//!
//! # Examples
//!
//! ```
//! use sysmod_session::{Session, SessionConfig};
//! use sysmod_store::SqliteStore;
//! use sysmod_tagger::LexiconTagger;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! let mut session = Session::open(store, LexiconTagger::new(), SessionConfig::default()).unwrap();
//!
//! let report = session.execute("F1 is a function\na is a data\nF1 produces a").unwrap();
//! assert_eq!(report.flag, 1);
//! assert!(report.is_clean());
//! assert!(report.messages.contains(&"F1 produces a".to_string()));
//! ```

#![warn(missing_docs)]

mod config;
mod diagram;
mod error;
mod recognizer;
mod session;

pub use config::SessionConfig;
pub use diagram::PlantUmlRenderer;
pub use error::{Result, SessionError};
pub use recognizer::{Command, Family, Recognized, Recognizer};
pub use session::{Report, Session};
