use crate::model::AuditReport;

/// Render a deterministic markdown report from an audit.
pub fn render_report(report: &AuditReport, max_examples: usize) -> String {
    let mut lines = Vec::new();

    lines.push("# Telestar Integrity Audit".to_string());
    lines.push(String::new());
    lines.push("## Summary".to_string());
    lines.push(format!("- audit_version: {}", report.audit_version));
    lines.push(format!(
        "- relationships_checked: {}",
        report.relationships_checked
    ));
    lines.push(format!(
        "- relationships_violated: {}",
        report.violations.len()
    ));
    lines.push(format!(
        "- relationships_skipped: {}",
        report.skipped.len()
    ));
    lines.push(format!("- invalid_rows: {}", report.total_invalid_rows));
    lines.push(String::new());

    if !report.violations.is_empty() {
        lines.push("## Violations".to_string());
        lines.push("| relationship | invalid_rows | distinct_values |".to_string());
        lines.push("| --- | --- | --- |".to_string());
        for violation in &report.violations {
            lines.push(format!(
                "| {} | {} | {} |",
                violation.path,
                violation.invalid_rows,
                violation.invalid_values.len()
            ));
        }
        lines.push(String::new());

        lines.push("## Examples".to_string());
        for violation in &report.violations {
            let rows = violation
                .row_indices
                .iter()
                .take(max_examples)
                .map(|row| row.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            let values = violation
                .invalid_values
                .iter()
                .take(max_examples)
                .cloned()
                .collect::<Vec<_>>()
                .join(", ");
            lines.push(format!(
                "- {}: rows [{}] values [{}]",
                violation.path, rows, values
            ));
        }
        lines.push(String::new());
    }

    if !report.skipped.is_empty() {
        lines.push("## Skipped".to_string());
        for skipped in &report.skipped {
            lines.push(format!(
                "- {} ({}): {}",
                skipped.path, skipped.code, skipped.message
            ));
        }
        lines.push(String::new());
    }

    lines.push("## Recommendations".to_string());
    lines.extend(recommendations(report));
    lines.join("\n")
}

fn recommendations(report: &AuditReport) -> Vec<String> {
    let mut lines = Vec::new();
    if !report.violations.is_empty() {
        lines.push(
            "- run `telestar reconcile` on this input to close dangling references.".to_string(),
        );
    }
    if report.skipped.iter().any(|skipped| skipped.code == "missing_table") {
        lines.push(
            "- provide the missing tables or drop their relationships from the catalog."
                .to_string(),
        );
    }
    if report.skipped.iter().any(|skipped| skipped.code == "missing_column") {
        lines.push("- check CSV headers against the catalog column names.".to_string());
    }
    if report.is_clean() && report.skipped.is_empty() {
        lines.push("- no violations detected; every relationship is closed.".to_string());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AUDIT_VERSION, RelationshipViolation, SkippedRelationship};
    use telestar_catalog::Relationship;

    #[test]
    fn report_lists_violations_and_skips() {
        let rel = Relationship::new("Accounts", "Account_ID", "Transactions", "Account_ID");
        let missing = Relationship::new("Channels", "Channel_ID", "SupportLogs", "Channel_ID");
        let report = AuditReport {
            audit_version: AUDIT_VERSION.to_string(),
            relationships_checked: 1,
            total_invalid_rows: 3,
            violations: vec![RelationshipViolation {
                path: rel.path(),
                relationship: rel,
                invalid_rows: 3,
                invalid_values: vec!["A3".to_string(), "A4".to_string()],
                row_indices: vec![2, 4, 7],
            }],
            skipped: vec![SkippedRelationship {
                path: missing.path(),
                relationship: missing,
                code: "missing_table".to_string(),
                message: "primary table 'Channels' not found in store".to_string(),
            }],
        };

        let rendered = render_report(&report, 2);
        assert!(rendered.contains("| Transactions.Account_ID -> Accounts.Account_ID | 3 | 2 |"));
        assert!(rendered.contains("rows [2, 4] values [A3, A4]"));
        assert!(rendered.contains("## Skipped"));
        assert!(rendered.contains("provide the missing tables"));
        assert_eq!(rendered, render_report(&report, 2));
    }

    #[test]
    fn clean_report_has_no_violation_sections() {
        let report = AuditReport {
            audit_version: AUDIT_VERSION.to_string(),
            relationships_checked: 4,
            total_invalid_rows: 0,
            violations: Vec::new(),
            skipped: Vec::new(),
        };
        let rendered = render_report(&report, 20);
        assert!(!rendered.contains("## Violations"));
        assert!(rendered.contains("every relationship is closed"));
    }
}
