//! Configuration for the Linker

use serde::{Deserialize, Serialize};

/// Similarity thresholds and linking switches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkerConfig {
    /// Duplicate threshold for requirements created by a single command
    pub requirement_threshold: f64,

    /// Duplicate threshold when a description is attached to a named statement
    pub describe_threshold: f64,

    /// Duplicate threshold for goals
    pub goal_threshold: f64,

    /// Minimum object-clause similarity to attach a requirement under a parent one
    pub parent_link_threshold: f64,

    /// Attach new requirements under matching requirements of the subject's parent
    pub link_parents: bool,

    /// Longest noun run (in words) tried as a single object reference
    pub max_candidate_words: usize,
}

impl Default for LinkerConfig {
    fn default() -> Self {
        Self {
            requirement_threshold: 0.78,
            describe_threshold: 0.95,
            goal_threshold: 0.95,
            parent_link_threshold: 0.78,
            link_parents: true,
            max_candidate_words: 4,
        }
    }
}

impl LinkerConfig {
    /// Permissive preset: only near-identical text counts as a duplicate
    pub fn permissive() -> Self {
        Self {
            requirement_threshold: 0.9,
            describe_threshold: 0.98,
            goal_threshold: 0.98,
            parent_link_threshold: 0.7,
            link_parents: true,
            max_candidate_words: 6,
        }
    }

    /// Strict preset: flags loosely similar text, links parents conservatively
    pub fn strict() -> Self {
        Self {
            requirement_threshold: 0.7,
            describe_threshold: 0.9,
            goal_threshold: 0.9,
            parent_link_threshold: 0.85,
            link_parents: true,
            max_candidate_words: 3,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        let thresholds = [
            ("requirement_threshold", self.requirement_threshold),
            ("describe_threshold", self.describe_threshold),
            ("goal_threshold", self.goal_threshold),
            ("parent_link_threshold", self.parent_link_threshold),
        ];
        for (name, value) in thresholds {
            if !(value > 0.0 && value <= 1.0) {
                return Err(format!("{} must be in (0, 1], got {}", name, value));
            }
        }
        if self.max_candidate_words == 0 {
            return Err("max_candidate_words must be greater than 0".to_string());
        }
        Ok(())
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
