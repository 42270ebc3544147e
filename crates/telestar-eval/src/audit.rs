use std::collections::HashSet;
use std::path::Path;

use telestar_catalog::Relationship;
use telestar_core::{Table, TableStore};

use crate::errors::EvalError;
use crate::model::{
    AUDIT_VERSION, AuditPaths, AuditReport, ROW_SAMPLE_LIMIT, RelationshipViolation,
    SkippedRelationship,
};
use crate::report::render_report;

/// Check every relationship against the current store without mutating it.
pub fn audit(relationships: &[Relationship], store: &TableStore) -> AuditReport {
    let mut report = AuditReport {
        audit_version: AUDIT_VERSION.to_string(),
        relationships_checked: 0,
        total_invalid_rows: 0,
        violations: Vec::new(),
        skipped: Vec::new(),
    };

    for rel in relationships {
        let resolved = resolve(rel, store);
        let (primary, primary_column, foreign, foreign_column) = match resolved {
            Ok(resolved) => resolved,
            Err((code, message)) => {
                report.skipped.push(SkippedRelationship {
                    relationship: rel.clone(),
                    path: rel.path(),
                    code: code.to_string(),
                    message,
                });
                continue;
            }
        };

        report.relationships_checked += 1;
        let checked = check_relationship(rel, primary, primary_column, foreign, foreign_column);
        if let Some(violation) = checked {
            report.total_invalid_rows += violation.invalid_rows;
            report.violations.push(violation);
        }
    }

    report
}

/// Fail with the number of invalid rows when the audit is not clean.
pub fn ensure_clean(report: &AuditReport) -> Result<(), EvalError> {
    if report.is_clean() {
        Ok(())
    } else {
        Err(EvalError::Violations(report.total_invalid_rows))
    }
}

/// Write `audit.json` and `audit_report.md` into `dir`.
pub fn write_audit(
    dir: &Path,
    report: &AuditReport,
    max_examples: usize,
) -> Result<AuditPaths, EvalError> {
    std::fs::create_dir_all(dir)?;
    let json_path = dir.join("audit.json");
    let report_path = dir.join("audit_report.md");
    std::fs::write(&json_path, serde_json::to_vec_pretty(report)?)?;
    std::fs::write(&report_path, render_report(report, max_examples))?;
    Ok(AuditPaths {
        json_path,
        report_path,
    })
}

type Resolved<'a> = (&'a Table, usize, &'a Table, usize);

fn resolve<'a>(
    rel: &Relationship,
    store: &'a TableStore,
) -> Result<Resolved<'a>, (&'static str, String)> {
    let primary = store.get(&rel.primary_table).ok_or_else(|| {
        (
            "missing_table",
            format!("primary table '{}' not found in store", rel.primary_table),
        )
    })?;
    let foreign = store.get(&rel.foreign_table).ok_or_else(|| {
        (
            "missing_table",
            format!("foreign table '{}' not found in store", rel.foreign_table),
        )
    })?;
    let primary_column = primary.column_index(&rel.primary_key).ok_or_else(|| {
        (
            "missing_column",
            format!("column '{}.{}' not found", rel.primary_table, rel.primary_key),
        )
    })?;
    let foreign_column = foreign.column_index(&rel.foreign_key).ok_or_else(|| {
        (
            "missing_column",
            format!("column '{}.{}' not found", rel.foreign_table, rel.foreign_key),
        )
    })?;
    Ok((primary, primary_column, foreign, foreign_column))
}

fn check_relationship(
    rel: &Relationship,
    primary: &Table,
    primary_column: usize,
    foreign: &Table,
    foreign_column: usize,
) -> Option<RelationshipViolation> {
    let present = primary.key_set(primary_column);
    let mut seen = HashSet::new();
    let mut invalid_values = Vec::new();
    let mut row_indices = Vec::new();
    let mut invalid_rows = 0_u64;

    for (row_idx, value) in foreign.column_values(foreign_column).enumerate() {
        if value.is_null() {
            continue;
        }
        let key = value.key();
        if present.contains(&key) {
            continue;
        }
        invalid_rows += 1;
        if row_indices.len() < ROW_SAMPLE_LIMIT {
            row_indices.push(row_idx as u64 + 1);
        }
        if seen.insert(key.clone()) {
            invalid_values.push(key);
        }
    }

    if invalid_rows == 0 {
        return None;
    }

    Some(RelationshipViolation {
        relationship: rel.clone(),
        path: rel.path(),
        invalid_rows,
        invalid_values,
        row_indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use telestar_core::Value;

    fn store() -> TableStore {
        let mut store = TableStore::new();
        store
            .add(
                Table::from_rows(
                    "Accounts",
                    ["Account_ID"],
                    vec![vec![Value::from("A1")], vec![Value::Int(2)]],
                )
                .unwrap(),
            )
            .unwrap();
        store
            .add(
                Table::from_rows(
                    "Transactions",
                    ["Account_ID"],
                    vec![
                        vec![Value::from("A1")],
                        vec![Value::from("A3")],
                        vec![Value::Null],
                        vec![Value::from("2")],
                        vec![Value::from("A3")],
                    ],
                )
                .unwrap(),
            )
            .unwrap();
        store
    }

    #[test]
    fn audit_reports_dangling_rows() {
        let rels = vec![Relationship::new(
            "Accounts",
            "Account_ID",
            "Transactions",
            "Account_ID",
        )];
        let report = audit(&rels, &store());

        assert!(!report.is_clean());
        assert_eq!(report.relationships_checked, 1);
        assert_eq!(report.total_invalid_rows, 2);
        let violation = &report.violations[0];
        assert_eq!(violation.invalid_values, vec!["A3"]);
        assert_eq!(violation.row_indices, vec![2, 5]);
        assert!(matches!(ensure_clean(&report), Err(EvalError::Violations(2))));
    }

    #[test]
    fn missing_tables_and_columns_are_skipped() {
        let rels = vec![
            Relationship::new("Channels", "Channel_ID", "Transactions", "Channel_ID"),
            Relationship::new("Accounts", "Account_ID", "Transactions", "Channel_ID"),
        ];
        let report = audit(&rels, &store());

        assert!(report.is_clean());
        assert_eq!(report.relationships_checked, 0);
        let codes: Vec<&str> = report.skipped.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["missing_table", "missing_column"]);
        assert!(ensure_clean(&report).is_ok());
    }
}
