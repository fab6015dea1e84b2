//! Sysmod Storage Layer
//!
//! Implements the `ModelStore` trait on SQLite, plus CSV import and export.
//!
//! # Architecture
//!
//! - One `objects` row per model object, with the object serialized as JSON
//! - One `meta` row each for the flow table and the inheritance overlays
//! - [`tabular`] reads and writes a flat CSV view of the objects
//!
//! # Examples
//!
//! ```
//! use sysmod_domain::traits::ModelStore;
//! use sysmod_domain::{ModelContext, ObjectKind, TypeRef};
//! use sysmod_store::SqliteStore;
//!
//! let mut store = SqliteStore::new(":memory:").unwrap();
//! let mut ctx = ModelContext::new();
//! let f = ctx.create(ObjectKind::Function, "F1", TypeRef::Base(ObjectKind::Function)).unwrap();
//!
//! store.save(&[ctx.get(f).unwrap().clone()]).unwrap();
//! assert_eq!(store.load().unwrap().len(), 1);
//! ```

#![warn(missing_docs)]

pub mod tabular;

use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::path::Path;
use sysmod_domain::traits::ModelStore;
use sysmod_domain::{FlowTable, ModelContext, ModelError, ModelObject, ObjectId, Overlay};
use thiserror::Error;
use tracing::{debug, info};

pub use tabular::{export_csv, export_csv_file, import_csv, import_csv_file, ImportReport};

const FLOWS_KEY: &str = "flows";
const OVERLAYS_KEY: &str = "overlays";

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Body could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Imported rows violate model rules
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// SQLite-based implementation of ModelStore
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each thread should have its own
/// SqliteStore instance.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a store at the given path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Number of persisted objects
    pub fn object_count(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM objects", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Convert ObjectId to bytes for storage
    fn id_to_bytes(id: ObjectId) -> Vec<u8> {
        id.value().to_be_bytes().to_vec()
    }

    /// Convert bytes to ObjectId
    fn bytes_to_id(bytes: &[u8]) -> Result<ObjectId, StoreError> {
        if bytes.len() != 16 {
            return Err(StoreError::InvalidData(format!(
                "Expected 16 bytes for ObjectId, got {}",
                bytes.len()
            )));
        }
        let mut arr = [0u8; 16];
        arr.copy_from_slice(bytes);
        Ok(ObjectId::from_value(u128::from_be_bytes(arr)))
    }

    fn read_meta(&self, key: &str) -> Result<Option<String>, StoreError> {
        let body = self
            .conn
            .query_row("SELECT body FROM meta WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(body)
    }
}

impl ModelStore for SqliteStore {
    type Error = StoreError;

    fn load(&self) -> Result<ModelContext, Self::Error> {
        let mut stmt = self.conn.prepare("SELECT id, body FROM objects")?;
        let rows = stmt
            .query_map([], |row| {
                let id: Vec<u8> = row.get(0)?;
                let body: String = row.get(1)?;
                Ok((id, body))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut objects = Vec::with_capacity(rows.len());
        for (id_bytes, body) in rows {
            let id = Self::bytes_to_id(&id_bytes)?;
            let obj: ModelObject = serde_json::from_str(&body)?;
            if obj.id() != id {
                return Err(StoreError::InvalidData(format!(
                    "Row {} holds object {}",
                    id,
                    obj.id()
                )));
            }
            objects.push(obj);
        }

        let flows: FlowTable = match self.read_meta(FLOWS_KEY)? {
            Some(body) => serde_json::from_str(&body)?,
            None => FlowTable::new(),
        };
        let overlays: BTreeMap<ObjectId, Overlay> = match self.read_meta(OVERLAYS_KEY)? {
            Some(body) => serde_json::from_str(&body)?,
            None => BTreeMap::new(),
        };

        info!("Loaded {} objects, {} flows", objects.len(), flows.len());
        Ok(ModelContext::from_parts(objects, flows, overlays))
    }

    fn save(&mut self, objects: &[ModelObject]) -> Result<(), Self::Error> {
        let tx = self.conn.transaction()?;
        for obj in objects {
            let body = serde_json::to_string(obj)?;
            tx.execute(
                "INSERT INTO objects (id, kind, name, body) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET
                 kind = excluded.kind, name = excluded.name, body = excluded.body",
                params![
                    Self::id_to_bytes(obj.id()),
                    obj.kind().as_str(),
                    obj.name(),
                    body,
                ],
            )?;
        }
        tx.commit()?;
        debug!("Saved {} objects", objects.len());
        Ok(())
    }

    fn delete(&mut self, ids: &[ObjectId]) -> Result<(), Self::Error> {
        let tx = self.conn.transaction()?;
        for id in ids {
            tx.execute(
                "DELETE FROM objects WHERE id = ?1",
                params![Self::id_to_bytes(*id)],
            )?;
        }
        tx.commit()?;
        debug!("Deleted {} objects", ids.len());
        Ok(())
    }

    fn save_relations(&mut self, model: &ModelContext) -> Result<(), Self::Error> {
        let flows = serde_json::to_string(model.flows())?;
        let overlays = serde_json::to_string(model.overlays())?;

        let tx = self.conn.transaction()?;
        for (key, body) in [(FLOWS_KEY, flows), (OVERLAYS_KEY, overlays)] {
            tx.execute(
                "INSERT INTO meta (key, body) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET body = excluded.body",
                params![key, body],
            )?;
        }
        tx.commit()?;
        debug!("Saved relations ({} flows)", model.flows().len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_bytes_roundtrip() {
        let id = ObjectId::new();
        let bytes = SqliteStore::id_to_bytes(id);
        assert_eq!(bytes.len(), 16);
        assert_eq!(SqliteStore::bytes_to_id(&bytes).unwrap(), id);
    }

    #[test]
    fn test_bad_id_bytes() {
        let err = SqliteStore::bytes_to_id(&[1, 2, 3]).unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(_)));
    }

    #[test]
    fn test_empty_store_loads_empty_model() {
        let store = SqliteStore::new(":memory:").unwrap();
        let ctx = store.load().unwrap();
        assert!(ctx.is_empty());
        assert!(ctx.flows().is_empty());
        assert_eq!(store.object_count().unwrap(), 0);
    }
}
