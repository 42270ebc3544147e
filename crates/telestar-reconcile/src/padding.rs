use telestar_catalog::Catalog;
use telestar_core::{Table, TableStore, Value};
use tracing::{debug, info, warn};

use crate::errors::ReconcileError;
use crate::model::{PaddingRecord, ReconcileIssue, ReconcileReport};
use crate::placeholder::{placeholder_row, sentinel_key, unresolved_columns};

/// Append one sentinel row keyed `dummy_<table>_ID` to `table`.
///
/// Every other column receives its kind's placeholder. The pass does not look
/// for an existing sentinel; calling it twice appends two rows.
pub fn pad(table: &mut Table, primary_key: &str) -> Result<PaddingRecord, ReconcileError> {
    let key_column =
        table
            .column_index(primary_key)
            .ok_or_else(|| ReconcileError::MissingColumn {
                table: table.name().to_string(),
                column: primary_key.to_string(),
            })?;

    let sentinel = sentinel_key(table.name());
    let row = placeholder_row(table, key_column, Value::Text(sentinel.clone()));
    table.push_row(row)?;

    Ok(PaddingRecord {
        table: table.name().to_string(),
        primary_key: primary_key.to_string(),
        sentinel,
    })
}

/// Pad every table in the store that has a declared primary key.
///
/// Undeclared tables are skipped with a warning; a declared key column the
/// table lacks is reported as an error. Neither stops the pass.
pub fn pad_store(store: &mut TableStore, catalog: &Catalog, report: &mut ReconcileReport) {
    for table in store.tables_mut() {
        let name = table.name().to_string();
        let Some(primary_key) = catalog.primary_key(&name) else {
            warn!(event = "table_not_padded", table = %name, reason = "no declared primary key");
            report.record_warning(
                ReconcileIssue::warning(
                    "unpadded_table",
                    format!("no primary key declared for '{name}'; skipping padding"),
                )
                .with_table(name),
            );
            continue;
        };

        let key_column = table.column_index(primary_key);
        match pad(table, primary_key) {
            Ok(record) => {
                if let Some(key_column) = key_column {
                    for column in unresolved_columns(table, key_column) {
                        report.record_unresolved_kind(&name, &column);
                    }
                }
                info!(
                    event = "padding_applied",
                    table = %record.table,
                    sentinel = %record.sentinel
                );
                report.record_padding(record);
            }
            Err(err) => {
                warn!(event = "padding_failed", table = %name, error = %err);
                report.record_error(
                    ReconcileIssue::error(err.code(), err.to_string())
                        .with_table(name)
                        .with_column(primary_key),
                );
            }
        }
    }

    for table in catalog.primary_keys.keys() {
        if !store.contains(table) {
            debug!(event = "declared_table_absent", table = %table);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RewritePolicy;

    #[test]
    fn pad_appends_sentinel_row() {
        let mut table = Table::from_rows(
            "Agents",
            ["Agent_ID", "Region", "Calls"],
            vec![vec![Value::from("X"), Value::from("Centre"), Value::Int(4)]],
        )
        .unwrap();

        let record = pad(&mut table, "Agent_ID").unwrap();
        assert_eq!(record.sentinel, "dummy_Agents_ID");
        assert_eq!(table.row_count(), 2);
        assert_eq!(
            table.rows()[1],
            vec![
                Value::from("dummy_Agents_ID"),
                Value::from("dummy_Region"),
                Value::Int(0)
            ]
        );
    }

    #[test]
    fn pad_store_skips_undeclared_tables() {
        let mut store = TableStore::new();
        store
            .add(Table::from_rows("Agents", ["Agent_ID"], vec![vec![Value::from("X")]]).unwrap())
            .unwrap();
        store
            .add(
                Table::from_rows("Time_Dimension", ["Time_ID"], vec![vec![Value::Int(1)]])
                    .unwrap(),
            )
            .unwrap();
        store
            .add(Table::from_rows("Messages", ["Body"], vec![vec![Value::from("hi")]]).unwrap())
            .unwrap();

        let catalog = Catalog::default()
            .with_primary_key("Agents", "Agent_ID")
            .with_primary_key("Messages", "Message_ID");
        let mut report = ReconcileReport::new(RewritePolicy::Recheck);
        pad_store(&mut store, &catalog, &mut report);

        assert_eq!(report.padded.len(), 1);
        assert_eq!(store.get("Agents").unwrap().row_count(), 2);
        assert_eq!(store.get("Time_Dimension").unwrap().row_count(), 1);
        assert_eq!(store.get("Messages").unwrap().row_count(), 1);
        assert_eq!(report.issue_count("unpadded_table"), 1);
        assert_eq!(report.issue_count("missing_column"), 1);
    }
}
