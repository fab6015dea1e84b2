//! Configuration for safe deletion

use serde::{Deserialize, Serialize};

/// Configuration for the integrity checker
///
/// # Examples
///
/// ```
/// use sysmod_integrity::IntegrityConfig;
///
/// // Every relationship blocks deletion
/// let config = IntegrityConfig::default();
/// assert!(!config.detach_view_membership);
///
/// // Views let go of deleted objects on their own
/// let config = IntegrityConfig::lenient();
/// assert!(config.detach_view_membership);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrityConfig {
    /// Report what would be deleted without deleting
    /// Default: false
    #[serde(default)]
    pub dry_run: bool,

    /// Drop the object from every view instead of blocking on view membership
    /// Default: false
    #[serde(default)]
    pub detach_view_membership: bool,
}

impl Default for IntegrityConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            detach_view_membership: false,
        }
    }
}

impl IntegrityConfig {
    /// Views are filters, not relationships: deleting an object removes it from them
    pub fn lenient() -> Self {
        Self {
            detach_view_membership: true,
            ..Self::default()
        }
    }

    /// Check everything, delete nothing
    pub fn dry_run() -> Self {
        Self {
            dry_run: true,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert!(!IntegrityConfig::default().dry_run);
        assert!(IntegrityConfig::dry_run().dry_run);
        assert!(!IntegrityConfig::dry_run().detach_view_membership);
        assert!(IntegrityConfig::lenient().detach_view_membership);
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = IntegrityConfig::lenient();
        let text = config.to_toml().unwrap();
        assert_eq!(IntegrityConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = IntegrityConfig::from_toml("dry_run = true").unwrap();
        assert!(config.dry_run);
        assert!(!config.detach_view_membership);
    }
}
