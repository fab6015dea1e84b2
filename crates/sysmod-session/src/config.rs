//! Session configuration

use serde::{Deserialize, Serialize};
use sysmod_engine::EngineConfig;
use sysmod_integrity::IntegrityConfig;
use sysmod_linker::LinkerConfig;

/// Settings for every component a session drives
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Allocation rules
    pub engine: EngineConfig,
    /// Requirement and goal linking
    pub linker: LinkerConfig,
    /// Safe delete
    pub integrity: IntegrityConfig,
}

impl SessionConfig {
    /// Check every part; the linker is the only one with invalid values
    pub fn validate(&self) -> Result<(), String> {
        self.linker.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SessionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_bad_threshold_is_rejected() {
        let mut config = SessionConfig::default();
        config.linker.goal_threshold = 1.5;
        assert!(config.validate().unwrap_err().contains("goal_threshold"));
    }
}
