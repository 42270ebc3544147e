use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use telestar_catalog::Relationship;

/// Audit contract version.
pub const AUDIT_VERSION: &str = "0.1";

/// Row indices kept per violated relationship.
pub const ROW_SAMPLE_LIMIT: usize = 20;

/// Machine-readable audit of a store against a relationship list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    pub audit_version: String,
    pub relationships_checked: u64,
    pub total_invalid_rows: u64,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub violations: Vec<RelationshipViolation>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub skipped: Vec<SkippedRelationship>,
}

impl AuditReport {
    /// No relationship has a dangling reference.
    ///
    /// Skipped relationships do not count against a clean audit.
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Dangling references of one relationship.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipViolation {
    pub relationship: Relationship,
    pub path: String,
    pub invalid_rows: u64,
    /// Distinct dangling values, in first-appearance order.
    pub invalid_values: Vec<String>,
    /// First 1-based row numbers of the foreign table that dangle.
    pub row_indices: Vec<u64>,
}

/// A relationship the audit could not evaluate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedRelationship {
    pub relationship: Relationship,
    pub path: String,
    pub code: String,
    pub message: String,
}

/// Files written for an audit.
#[derive(Debug, Clone)]
pub struct AuditPaths {
    pub json_path: PathBuf,
    pub report_path: PathBuf,
}
