use std::collections::{BTreeSet, HashSet};

use telestar_catalog::{Catalog, Relationship, build_fk_graph_report};
use telestar_core::{Row, Table, TableStore, Value};
use tracing::{debug, info, warn};

use crate::errors::{ReconcileError, TableRole};
use crate::model::{
    OutcomeStatus, ReconcileIssue, ReconcileOptions, ReconcileReport, RelationshipOutcome,
    RewritePolicy,
};
use crate::padding::pad_store;
use crate::placeholder::{placeholder_row, unresolved_columns};

/// Drives padding and relationship reconciliation over a table store.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    options: ReconcileOptions,
}

impl Reconciler {
    pub fn new(options: ReconcileOptions) -> Self {
        Self { options }
    }

    /// Pad declared primary tables, then reconcile every catalog relationship.
    pub fn run(&self, catalog: &Catalog, store: &mut TableStore) -> ReconcileReport {
        let mut report = ReconcileReport::new(self.options.rewrite);

        let graph = build_fk_graph_report(catalog);
        if let Some(cycle) = &graph.cycle {
            warn!(event = "fk_cycle_detected", tables = %cycle.join(","));
            report.record_warning(ReconcileIssue::warning(
                "fk_cycle",
                format!(
                    "relationships form a cycle through {}; later relationships may re-open earlier ones",
                    cycle.join(", ")
                ),
            ));
        }

        info!(
            event = "reconcile_started",
            tables = store.len(),
            relationships = catalog.relationships.len(),
            rewrite = %self.options.rewrite,
            padding = self.options.pad_primary_tables
        );

        if self.options.pad_primary_tables {
            pad_store(store, catalog, &mut report);
        }

        self.reconcile_into(&catalog.relationships, store, &mut report);

        info!(
            event = "reconcile_finished",
            passes = report.passes,
            rows_synthesized = report.rows_synthesized_total,
            rows_rewritten = report.rows_rewritten_total,
            skipped = report.skipped().count(),
            errors = report.errors.len()
        );

        report
    }

    /// Reconcile the given relationships without padding.
    pub fn reconcile(
        &self,
        relationships: &[Relationship],
        store: &mut TableStore,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::new(self.options.rewrite);
        self.reconcile_into(relationships, store, &mut report);
        report
    }

    fn reconcile_into(
        &self,
        relationships: &[Relationship],
        store: &mut TableStore,
        report: &mut ReconcileReport,
    ) {
        let max_passes = self.options.max_passes.max(1);
        let mut skipped: HashSet<usize> = HashSet::new();
        let mut pass = 1;

        loop {
            let mut mutated = false;

            for (idx, rel) in relationships.iter().enumerate() {
                if skipped.contains(&idx) {
                    continue;
                }

                match reconcile_relationship(rel, store, self.options.rewrite) {
                    Ok(mut outcome) => {
                        outcome.pass = pass;
                        if outcome.rows_synthesized > 0 {
                            record_unresolved_kinds(rel, store, report);
                        }
                        if outcome.mutated() {
                            mutated = true;
                            info!(
                                event = "relationship_reconciled",
                                relationship = %rel.path(),
                                pass,
                                missing = outcome.missing_keys,
                                synthesized = outcome.rows_synthesized,
                                rewritten = outcome.rows_rewritten
                            );
                        } else {
                            debug!(
                                event = "relationship_unchanged",
                                relationship = %rel.path(),
                                pass
                            );
                        }
                        if pass == 1 || outcome.mutated() {
                            report.record_outcome(outcome);
                        }
                    }
                    Err(err) => {
                        skipped.insert(idx);
                        warn!(
                            event = "relationship_skipped",
                            relationship = %rel.path(),
                            code = err.code(),
                            error = %err
                        );
                        let mut issue = ReconcileIssue::error(err.code(), err.to_string())
                            .with_path(rel.path());
                        if let ReconcileError::MissingColumn { table, column } = &err {
                            issue = issue.with_table(table.clone()).with_column(column.clone());
                        } else if let ReconcileError::MissingTable { table, .. } = &err {
                            issue = issue.with_table(table.clone());
                        }
                        report.record_error(issue);
                        report.record_outcome(RelationshipOutcome::skipped(
                            rel,
                            pass,
                            err.to_string(),
                        ));
                    }
                }
            }

            report.passes = pass;
            if !mutated {
                break;
            }

            if pass >= max_passes {
                let open = relationships
                    .iter()
                    .enumerate()
                    .filter(|(idx, _)| !skipped.contains(idx))
                    .filter(|(_, rel)| {
                        scan_relationship(rel, store)
                            .map(|scan| !scan.missing.is_empty())
                            .unwrap_or(false)
                    })
                    .count();
                if open > 0 {
                    warn!(event = "pass_limit_reached", passes = pass, open_relationships = open);
                    report.record_warning(ReconcileIssue::warning(
                        "pass_limit_reached",
                        format!(
                            "{open} relationship(s) still reference missing keys after {pass} pass(es)"
                        ),
                    ));
                }
                break;
            }

            pass += 1;
        }
    }
}

/// Reconcile relationships in order with the default pass limit and no padding.
pub fn reconcile(
    relationships: &[Relationship],
    store: &mut TableStore,
    policy: RewritePolicy,
) -> ReconcileReport {
    Reconciler::new(ReconcileOptions {
        rewrite: policy,
        pad_primary_tables: false,
        ..ReconcileOptions::default()
    })
    .reconcile(relationships, store)
}

/// Repair a single relationship in place.
///
/// Appends one placeholder row to the primary table per distinct missing key,
/// then rewrites the foreign rows selected by `policy` with the synthesized
/// keys in round-robin order.
pub fn reconcile_relationship(
    rel: &Relationship,
    store: &mut TableStore,
    policy: RewritePolicy,
) -> Result<RelationshipOutcome, ReconcileError> {
    let scan = scan_relationship(rel, store)?;

    let mut outcome = RelationshipOutcome {
        relationship: rel.clone(),
        pass: 1,
        status: OutcomeStatus::Unchanged,
        missing_keys: scan.missing.len() as u64,
        rows_synthesized: 0,
        rows_rewritten: 0,
        synthesized_keys: Vec::new(),
        error: None,
    };

    if scan.missing.is_empty() {
        return Ok(outcome);
    }

    let primary = table_mut(store, &rel.primary_table, TableRole::Primary)?;
    let rows: Vec<Row> = scan
        .missing
        .iter()
        .map(|key| placeholder_row(primary, scan.primary_column, key.clone()))
        .collect();
    let synthesized = primary.extend_rows(rows)?;
    let present = primary.key_set(scan.primary_column);

    let foreign = table_mut(store, &rel.foreign_table, TableRole::Foreign)?;
    let still_invalid = invalid_rows(foreign, scan.foreign_column, &present);
    let targets = match policy {
        RewritePolicy::Recheck => still_invalid,
        RewritePolicy::Snapshot => scan
            .invalid_rows
            .iter()
            .copied()
            .chain(still_invalid)
            .collect::<BTreeSet<usize>>()
            .into_iter()
            .collect(),
    };

    let assignments = assign_round_robin(&scan.missing, targets.len());
    for (row, key) in targets.iter().zip(assignments) {
        foreign.set_value(*row, scan.foreign_column, key)?;
    }

    outcome.status = OutcomeStatus::Applied;
    outcome.rows_synthesized = synthesized as u64;
    outcome.rows_rewritten = targets.len() as u64;
    outcome.synthesized_keys = scan.missing.iter().map(Value::key).collect();
    Ok(outcome)
}

/// Cycle `keys` until `count` values have been produced.
pub fn assign_round_robin(keys: &[Value], count: usize) -> Vec<Value> {
    keys.iter().cycle().take(count).cloned().collect()
}

/// Resolved columns plus the dangling state of one relationship.
struct RelationshipScan {
    primary_column: usize,
    foreign_column: usize,
    /// Distinct missing values, in first-appearance order.
    missing: Vec<Value>,
    invalid_rows: Vec<usize>,
}

fn scan_relationship(
    rel: &Relationship,
    store: &TableStore,
) -> Result<RelationshipScan, ReconcileError> {
    let primary = table_ref(store, &rel.primary_table, TableRole::Primary)?;
    let foreign = table_ref(store, &rel.foreign_table, TableRole::Foreign)?;
    let primary_column = column_index(primary, &rel.primary_key)?;
    let foreign_column = column_index(foreign, &rel.foreign_key)?;

    let present = primary.key_set(primary_column);
    let mut seen: HashSet<String> = HashSet::new();
    let mut missing = Vec::new();
    let mut invalid = Vec::new();

    for (row, value) in foreign.column_values(foreign_column).enumerate() {
        if value.is_null() {
            continue;
        }
        let key = value.key();
        if present.contains(&key) {
            continue;
        }
        invalid.push(row);
        if seen.insert(key) {
            missing.push(value.clone());
        }
    }

    Ok(RelationshipScan {
        primary_column,
        foreign_column,
        missing,
        invalid_rows: invalid,
    })
}

fn invalid_rows(table: &Table, column: usize, present: &HashSet<String>) -> Vec<usize> {
    table
        .column_values(column)
        .enumerate()
        .filter(|(_, value)| !value.is_null() && !present.contains(&value.key()))
        .map(|(row, _)| row)
        .collect()
}

fn record_unresolved_kinds(rel: &Relationship, store: &TableStore, report: &mut ReconcileReport) {
    let Some(primary) = store.get(&rel.primary_table) else {
        return;
    };
    let Some(key_column) = primary.column_index(&rel.primary_key) else {
        return;
    };
    for column in unresolved_columns(primary, key_column) {
        report.record_unresolved_kind(&rel.primary_table, &column);
    }
}

fn table_ref<'a>(
    store: &'a TableStore,
    name: &str,
    role: TableRole,
) -> Result<&'a Table, ReconcileError> {
    store.get(name).ok_or_else(|| ReconcileError::MissingTable {
        table: name.to_string(),
        role,
    })
}

fn table_mut<'a>(
    store: &'a mut TableStore,
    name: &str,
    role: TableRole,
) -> Result<&'a mut Table, ReconcileError> {
    store.get_mut(name).ok_or_else(|| ReconcileError::MissingTable {
        table: name.to_string(),
        role,
    })
}

fn column_index(table: &Table, column: &str) -> Result<usize, ReconcileError> {
    table
        .column_index(column)
        .ok_or_else(|| ReconcileError::MissingColumn {
            table: table.name().to_string(),
            column: column.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(name: &str, columns: &[&str], rows: Vec<Vec<Value>>) -> Table {
        Table::from_rows(name, columns.iter().copied(), rows).unwrap()
    }

    fn texts(values: &[&str]) -> Vec<Vec<Value>> {
        values.iter().map(|value| vec![Value::from(*value)]).collect()
    }

    #[test]
    fn round_robin_repeats_keys() {
        let keys = [Value::from("X"), Value::from("Y")];
        assert_eq!(
            assign_round_robin(&keys, 5),
            vec![
                Value::from("X"),
                Value::from("Y"),
                Value::from("X"),
                Value::from("Y"),
                Value::from("X")
            ]
        );
        assert!(assign_round_robin(&[], 3).is_empty());
    }

    #[test]
    fn missing_keys_keep_first_appearance_order() {
        let mut store = TableStore::new();
        store.add(table("Agents", &["Agent_ID"], Vec::new())).unwrap();
        store
            .add(table("SupportLogs", &["Agent_ID"], texts(&["Y", "X", "Y", "Z"])))
            .unwrap();

        let rel = Relationship::new("Agents", "Agent_ID", "SupportLogs", "Agent_ID");
        let outcome = reconcile_relationship(&rel, &mut store, RewritePolicy::Recheck).unwrap();
        assert_eq!(outcome.synthesized_keys, vec!["Y", "X", "Z"]);
        assert_eq!(outcome.rows_rewritten, 0);
        assert_eq!(outcome.status, OutcomeStatus::Applied);
    }

    #[test]
    fn numeric_and_text_keys_match_by_rendering() {
        let mut store = TableStore::new();
        store
            .add(table("Accounts", &["Account_ID"], vec![vec![Value::Int(7)]]))
            .unwrap();
        store
            .add(table("Transactions", &["Account_ID"], texts(&["7"])))
            .unwrap();

        let rel = Relationship::new("Accounts", "Account_ID", "Transactions", "Account_ID");
        let outcome = reconcile_relationship(&rel, &mut store, RewritePolicy::Recheck).unwrap();
        assert_eq!(outcome.status, OutcomeStatus::Unchanged);
        assert_eq!(store.get("Accounts").unwrap().row_count(), 1);
    }

    #[test]
    fn missing_column_is_reported() {
        let mut store = TableStore::new();
        store.add(table("Agents", &["Agent_ID"], Vec::new())).unwrap();
        store.add(table("SupportLogs", &["Log_ID"], texts(&["L1"]))).unwrap();

        let rel = Relationship::new("Agents", "Agent_ID", "SupportLogs", "Agent_ID");
        let err = reconcile_relationship(&rel, &mut store, RewritePolicy::Recheck).unwrap_err();
        assert_eq!(err.code(), "missing_column");
    }

    #[test]
    fn single_pass_limit_warns_when_relationships_stay_open() {
        // The second relationship synthesizes an account whose Agent_ID
        // placeholder dangles against the first.
        let mut store = TableStore::new();
        store.add(table("Agents", &["Agent_ID"], texts(&["AG1"]))).unwrap();
        store
            .add(table(
                "Accounts",
                &["Account_ID", "Agent_ID"],
                vec![vec![Value::from("A1"), Value::from("AG1")]],
            ))
            .unwrap();
        store
            .add(table("Customers", &["Account_ID"], texts(&["A2"])))
            .unwrap();

        let relationships = vec![
            Relationship::new("Agents", "Agent_ID", "Accounts", "Agent_ID"),
            Relationship::new("Accounts", "Account_ID", "Customers", "Account_ID"),
        ];

        let single = Reconciler::new(ReconcileOptions {
            max_passes: 1,
            pad_primary_tables: false,
            ..ReconcileOptions::default()
        });
        let mut first = store.clone();
        let report = single.reconcile(&relationships, &mut first);
        assert_eq!(report.passes, 1);
        assert_eq!(report.issue_count("pass_limit_reached"), 1);

        let mut second = store;
        let report = Reconciler::default().reconcile(&relationships, &mut second);
        assert_eq!(report.passes, 3);
        assert_eq!(report.issue_count("pass_limit_reached"), 0);
        let agents = second.get("Agents").unwrap();
        assert!(agents.key_set(0).contains("dummy_Agent_ID"));
    }
}
