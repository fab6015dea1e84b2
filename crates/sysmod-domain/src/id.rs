//! Object identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a model object, backed by a UUIDv7
///
/// UUIDv7 provides:
/// - Chronological sortability (objects iterate in creation order)
/// - 128-bit uniqueness, so an id is never handed out twice
/// - A canonical string form for the persistence and tabular adapters
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ObjectId(u128);

impl ObjectId {
    /// Generate a new UUIDv7-based ObjectId
    ///
    /// # Examples
    ///
    /// ```
    /// use sysmod_domain::ObjectId;
    ///
    /// let id = ObjectId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create an ObjectId from a raw u128 value
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse an ObjectId from its UUID string form
    ///
    /// # Examples
    ///
    /// ```
    /// use sysmod_domain::ObjectId;
    ///
    /// let id = ObjectId::new();
    /// let parsed = ObjectId::from_string(&id.to_string()).unwrap();
    /// assert_eq!(id, parsed);
    /// ```
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s.trim())
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid object id '{}': {}", s, e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }

    /// Short form used in tables
    ///
    /// Taken from the random tail, since the leading digits are a timestamp
    /// shared by objects created in the same millisecond.
    pub fn short(&self) -> String {
        format!("{:08x}", self.0 as u32)
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

impl From<ObjectId> for String {
    fn from(id: ObjectId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for ObjectId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_string(&value)
    }
}
