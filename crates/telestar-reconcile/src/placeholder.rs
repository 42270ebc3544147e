//! Placeholder values for synthesized rows.
//!
//! | kind                  | placeholder            |
//! |-----------------------|------------------------|
//! | identifier, free text | `dummy_<column>`       |
//! | integer, float        | `0`                    |
//! | timestamp             | `1970-01-01 00:00:00`  |
//! | boolean, unknown      | null                   |

use telestar_core::{Column, ColumnKind, Row, Table, Value, epoch_timestamp};

/// Sentinel primary key appended by the padding pass.
pub fn sentinel_key(table: &str) -> String {
    format!("dummy_{table}_ID")
}

pub fn placeholder_for_kind(kind: ColumnKind, column: &str) -> Value {
    match kind {
        ColumnKind::Identifier | ColumnKind::FreeText => Value::Text(format!("dummy_{column}")),
        ColumnKind::Integer => Value::Int(0),
        ColumnKind::Float => Value::Float(0.0),
        ColumnKind::Timestamp => Value::Timestamp(epoch_timestamp()),
        ColumnKind::Boolean | ColumnKind::Unknown => Value::Null,
    }
}

pub fn placeholder_for(column: &Column) -> Value {
    placeholder_for_kind(column.kind, &column.name)
}

/// Placeholder for a column of `table`; unknown columns yield null.
pub fn synthesize(table: &Table, column: &str) -> Value {
    table.column(column).map(placeholder_for).unwrap_or(Value::Null)
}

/// A full row for `table` with `key` in the key column and placeholders elsewhere.
pub(crate) fn placeholder_row(table: &Table, key_column: usize, key: Value) -> Row {
    let mut key = Some(key);
    table
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            if idx == key_column {
                key.take().unwrap_or(Value::Null)
            } else {
                placeholder_for(column)
            }
        })
        .collect()
}

/// Non-key columns whose placeholder falls back to null because their kind is unknown.
pub(crate) fn unresolved_columns(table: &Table, key_column: usize) -> Vec<String> {
    table
        .columns()
        .iter()
        .enumerate()
        .filter(|(idx, column)| *idx != key_column && column.kind == ColumnKind::Unknown)
        .map(|(_, column)| column.name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accounts() -> Table {
        Table::from_rows(
            "Accounts",
            ["Account_ID", "Balance", "Rate", "Creation_Time", "Active", "Notes"],
            vec![vec![
                Value::from("A1"),
                Value::Int(100),
                Value::Float(0.5),
                Value::parse("2024-01-02 03:04:05"),
                Value::Bool(true),
                Value::Null,
            ]],
        )
        .unwrap()
    }

    #[test]
    fn placeholder_follows_kind() {
        let table = accounts();
        assert_eq!(synthesize(&table, "Account_ID"), Value::from("dummy_Account_ID"));
        assert_eq!(synthesize(&table, "Balance"), Value::Int(0));
        assert_eq!(synthesize(&table, "Rate"), Value::Float(0.0));
        assert_eq!(
            synthesize(&table, "Creation_Time"),
            Value::Timestamp(epoch_timestamp())
        );
        assert_eq!(synthesize(&table, "Active"), Value::Null);
        assert_eq!(synthesize(&table, "Notes"), Value::Null);
    }

    #[test]
    fn unseen_column_is_null() {
        assert_eq!(synthesize(&accounts(), "Branch"), Value::Null);
    }

    #[test]
    fn placeholder_row_keeps_key() {
        let table = accounts();
        let row = placeholder_row(&table, 0, Value::from("A9"));
        assert_eq!(row.len(), 6);
        assert_eq!(row[0], Value::from("A9"));
        assert_eq!(row[1], Value::Int(0));
        assert_eq!(unresolved_columns(&table, 0), vec!["Notes".to_string()]);
    }

    #[test]
    fn sentinel_key_uses_table_name() {
        assert_eq!(sentinel_key("Agents"), "dummy_Agents_ID");
    }
}
