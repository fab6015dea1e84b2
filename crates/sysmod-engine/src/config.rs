//! Engine configuration

use serde::{Deserialize, Serialize};

/// Configuration for the allocation rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Offer an accepted allocation to every composition child of the object
    pub allocate_children: bool,

    /// Ask before allocating a function whose parent lives in another element family
    pub confirm_split_allocation: bool,

    /// Warn when a flow has no opposite producer/consumer anywhere in the model
    pub warn_unmatched_flows: bool,

    /// Only let an interface carry data exchanged by functions behind it
    pub enforce_interface_data: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            allocate_children: true,
            confirm_split_allocation: true,
            warn_unmatched_flows: true,
            enforce_interface_data: true,
        }
    }
}

impl EngineConfig {
    /// Minimal checking, no prompts (batch imports and scripts)
    pub fn permissive() -> Self {
        Self {
            allocate_children: true,
            confirm_split_allocation: false,
            warn_unmatched_flows: false,
            enforce_interface_data: false,
        }
    }

    /// Every rule enabled
    pub fn strict() -> Self {
        Self::default()
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
