//! Sysmod CLI library.
//!
//! This library provides the command-line front end of the modeling assistant:
//! configuration, the interactive REPL, batch commands and output formatting.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod repl;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;

use std::fs;
use std::path::Path;
use sysmod_session::Session;
use sysmod_store::SqliteStore;
use sysmod_tagger::LexiconTagger;

/// A session over a SQLite model file, tagged with the built-in lexicon.
pub type ModelSession = Session<SqliteStore, LexiconTagger>;

/// Open the model selected by `db` or the configuration.
pub fn open_session(config: &Config, db: Option<&Path>) -> Result<ModelSession> {
    let path = config.db_path(db)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    tracing::debug!("Opening model at {}", path.display());

    let store = SqliteStore::new(&path)?;
    Ok(Session::open(store, LexiconTagger::new(), config.model.clone())?)
}
