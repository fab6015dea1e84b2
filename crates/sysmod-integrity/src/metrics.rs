//! Deletion counters

use std::collections::BTreeMap;
use sysmod_domain::ObjectKind;

/// Counts of deleted and blocked objects per kind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeletionMetrics {
    /// Objects deleted per kind
    pub deleted: BTreeMap<ObjectKind, usize>,

    /// Deletion attempts refused per kind
    pub blocked: BTreeMap<ObjectKind, usize>,
}

impl DeletionMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a deletion
    pub fn record_deletion(&mut self, kind: ObjectKind) {
        *self.deleted.entry(kind).or_insert(0) += 1;
    }

    /// Record a refused deletion
    pub fn record_blocked(&mut self, kind: ObjectKind) {
        *self.blocked.entry(kind).or_insert(0) += 1;
    }

    /// Deletions across all kinds
    pub fn total_deleted(&self) -> usize {
        self.deleted.values().sum()
    }

    /// Refusals across all kinds
    pub fn total_blocked(&self) -> usize {
        self.blocked.values().sum()
    }

    /// Reset all counters
    pub fn reset(&mut self) {
        self.deleted.clear();
        self.blocked.clear();
    }

    /// Generate a summary report
    pub fn summary(&self) -> String {
        let mut lines = vec!["Deletion Metrics Summary".to_string()];

        if !self.deleted.is_empty() {
            lines.push("Deleted by kind:".to_string());
            for (kind, count) in &self.deleted {
                lines.push(format!("  {}: {}", kind, count));
            }
        }
        lines.push(format!("  Total deleted: {}", self.total_deleted()));

        if !self.blocked.is_empty() {
            lines.push("Blocked by kind:".to_string());
            for (kind, count) in &self.blocked {
                lines.push(format!("  {}: {}", kind, count));
            }
            lines.push(format!("  Total blocked: {}", self.total_blocked()));
        }

        lines.join("\n")
    }
}
