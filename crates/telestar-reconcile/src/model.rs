use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use telestar_catalog::Relationship;

/// Which foreign rows are rewritten after primary rows are synthesized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewritePolicy {
    /// Only rows still dangling against the updated primary table.
    #[default]
    Recheck,
    /// Every row that dangled before synthesis, plus any still dangling after.
    /// Rows are reassigned round-robin, so distinct values may collapse.
    Snapshot,
}

impl RewritePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RewritePolicy::Recheck => "recheck",
            RewritePolicy::Snapshot => "snapshot",
        }
    }
}

impl fmt::Display for RewritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RewritePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "recheck" => Ok(RewritePolicy::Recheck),
            "snapshot" => Ok(RewritePolicy::Snapshot),
            other => Err(format!("unknown rewrite policy '{other}'")),
        }
    }
}

/// Options for a reconciliation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileOptions {
    pub rewrite: RewritePolicy,
    /// Append the `dummy_<table>_ID` sentinel row to declared primary tables.
    pub pad_primary_tables: bool,
    /// Upper bound on passes over the relationship list. Extra passes only
    /// run while the previous pass still synthesized or rewrote rows.
    pub max_passes: usize,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            rewrite: RewritePolicy::Recheck,
            pad_primary_tables: true,
            max_passes: 16,
        }
    }
}

/// Outcome of one relationship in one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Applied,
    Unchanged,
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct RelationshipOutcome {
    pub relationship: Relationship,
    pub pass: usize,
    pub status: OutcomeStatus,
    pub missing_keys: u64,
    pub rows_synthesized: u64,
    pub rows_rewritten: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub synthesized_keys: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RelationshipOutcome {
    pub fn skipped(relationship: &Relationship, pass: usize, error: String) -> Self {
        Self {
            relationship: relationship.clone(),
            pass,
            status: OutcomeStatus::Skipped,
            missing_keys: 0,
            rows_synthesized: 0,
            rows_rewritten: 0,
            synthesized_keys: Vec::new(),
            error: Some(error),
        }
    }

    pub fn mutated(&self) -> bool {
        self.rows_synthesized > 0 || self.rows_rewritten > 0
    }
}

/// Sentinel row appended by the padding pass.
#[derive(Debug, Clone, Serialize)]
pub struct PaddingRecord {
    pub table: String,
    pub primary_key: String,
    pub sentinel: String,
}

/// Structured reconciliation issue.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileIssue {
    pub level: String,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
}

impl ReconcileIssue {
    pub fn warning(code: &str, message: impl Into<String>) -> Self {
        Self::new("warning", code, message)
    }

    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self::new("error", code, message)
    }

    fn new(level: &str, code: &str, message: impl Into<String>) -> Self {
        Self {
            level: level.to_string(),
            code: code.to_string(),
            message: message.into(),
            path: None,
            table: None,
            column: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }
}

/// Report for a reconciliation run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileReport {
    pub rewrite: RewritePolicy,
    pub passes: usize,
    pub padded: Vec<PaddingRecord>,
    pub relationships: Vec<RelationshipOutcome>,
    pub rows_synthesized_total: u64,
    pub rows_rewritten_total: u64,
    pub issues_by_code: BTreeMap<String, u64>,
    pub warnings: Vec<ReconcileIssue>,
    pub errors: Vec<ReconcileIssue>,
    #[serde(skip)]
    unresolved_columns: BTreeSet<String>,
}

impl ReconcileReport {
    pub fn new(rewrite: RewritePolicy) -> Self {
        Self {
            rewrite,
            ..Self::default()
        }
    }

    pub fn record_padding(&mut self, record: PaddingRecord) {
        self.padded.push(record);
    }

    pub fn record_outcome(&mut self, outcome: RelationshipOutcome) {
        self.rows_synthesized_total += outcome.rows_synthesized;
        self.rows_rewritten_total += outcome.rows_rewritten;
        self.relationships.push(outcome);
    }

    pub fn record_warning(&mut self, issue: ReconcileIssue) {
        *self.issues_by_code.entry(issue.code.clone()).or_insert(0) += 1;
        self.warnings.push(issue);
    }

    pub fn record_error(&mut self, issue: ReconcileIssue) {
        *self.issues_by_code.entry(issue.code.clone()).or_insert(0) += 1;
        self.errors.push(issue);
    }

    /// Warn once per column whose kind could not be inferred.
    pub fn record_unresolved_kind(&mut self, table: &str, column: &str) {
        if !self.unresolved_columns.insert(format!("{table}.{column}")) {
            return;
        }
        self.record_warning(
            ReconcileIssue::warning(
                "unresolved_placeholder_kind",
                format!("kind of {table}.{column} is unknown; placeholder is null"),
            )
            .with_table(table)
            .with_column(column),
        );
    }

    pub fn skipped(&self) -> impl Iterator<Item = &RelationshipOutcome> {
        self.relationships
            .iter()
            .filter(|outcome| outcome.status == OutcomeStatus::Skipped)
    }

    pub fn applied(&self) -> impl Iterator<Item = &RelationshipOutcome> {
        self.relationships
            .iter()
            .filter(|outcome| outcome.status == OutcomeStatus::Applied)
    }

    pub fn issue_count(&self, code: &str) -> u64 {
        self.issues_by_code.get(code).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrite_policy_parses_case_insensitively() {
        assert_eq!(
            "Snapshot".parse::<RewritePolicy>(),
            Ok(RewritePolicy::Snapshot)
        );
        assert_eq!(" recheck ".parse::<RewritePolicy>(), Ok(RewritePolicy::Recheck));
        assert!("legacy".parse::<RewritePolicy>().is_err());
    }

    #[test]
    fn unresolved_kind_is_reported_once() {
        let mut report = ReconcileReport::new(RewritePolicy::Recheck);
        report.record_unresolved_kind("Agents", "Notes");
        report.record_unresolved_kind("Agents", "Notes");
        report.record_unresolved_kind("Agents", "Region");
        assert_eq!(report.issue_count("unresolved_placeholder_kind"), 2);
        assert_eq!(report.warnings.len(), 2);
    }
}
