use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::value::Value;

/// Positional row aligned with the owning table's columns.
pub type Row = Vec<Value>;

/// Semantic kind of a column, inferred once from its existing values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Identifier,
    Integer,
    Float,
    Timestamp,
    Boolean,
    FreeText,
    Unknown,
}

impl ColumnKind {
    /// Infer a kind from the non-null values of a column.
    pub fn infer<'a>(values: impl IntoIterator<Item = &'a Value>) -> ColumnKind {
        let mut seen_bool = false;
        let mut seen_int = false;
        let mut seen_float = false;
        let mut seen_time = false;
        let mut seen_text = false;
        let mut multi_word = false;

        for value in values {
            match value {
                Value::Null => {}
                Value::Bool(_) => seen_bool = true,
                Value::Int(_) => seen_int = true,
                Value::Float(_) => seen_float = true,
                Value::Date(_) | Value::Timestamp(_) => seen_time = true,
                Value::Text(text) => {
                    seen_text = true;
                    if text.split_whitespace().nth(1).is_some() {
                        multi_word = true;
                    }
                }
            }
        }

        if seen_text {
            return if multi_word {
                ColumnKind::FreeText
            } else {
                ColumnKind::Identifier
            };
        }

        match (seen_bool, seen_int || seen_float, seen_time) {
            (false, false, false) => ColumnKind::Unknown,
            (true, false, false) => ColumnKind::Boolean,
            (false, true, false) if seen_float => ColumnKind::Float,
            (false, true, false) => ColumnKind::Integer,
            (false, false, true) => ColumnKind::Timestamp,
            _ => ColumnKind::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Identifier => "identifier",
            ColumnKind::Integer => "integer",
            ColumnKind::Float => "float",
            ColumnKind::Timestamp => "timestamp",
            ColumnKind::Boolean => "boolean",
            ColumnKind::FreeText => "free_text",
            ColumnKind::Unknown => "unknown",
        }
    }
}

/// Column metadata: name and inferred kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// A named table with ordered columns and positional rows.
///
/// Every row holds exactly one value per column. Column kinds are fixed at
/// construction; later rows may hold values of any variant.
///
/// Rows loaded from text keep their source cells so untouched values render
/// exactly as they were read.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    column_lookup: HashMap<String, usize>,
    rows: Vec<Row>,
    source: Vec<Option<Vec<String>>>,
}

impl Table {
    /// Create an empty table with explicit column kinds.
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Result<Self> {
        let name = name.into();
        let mut column_lookup = HashMap::with_capacity(columns.len());
        for (idx, column) in columns.iter().enumerate() {
            if column_lookup.insert(column.name.clone(), idx).is_some() {
                return Err(Error::InvalidTable(format!(
                    "duplicate column name: {}.{}",
                    name, column.name
                )));
            }
        }

        Ok(Self {
            name,
            columns,
            column_lookup,
            rows: Vec::new(),
            source: Vec::new(),
        })
    }

    /// Build a table from raw rows, inferring each column's kind.
    pub fn from_rows<S: Into<String>>(
        name: impl Into<String>,
        column_names: impl IntoIterator<Item = S>,
        rows: Vec<Row>,
    ) -> Result<Self> {
        let name = name.into();
        let names: Vec<String> = column_names.into_iter().map(Into::into).collect();

        for (row_idx, row) in rows.iter().enumerate() {
            check_width(&name, names.len(), row, row_idx)?;
        }

        let columns = names
            .into_iter()
            .enumerate()
            .map(|(idx, column)| {
                let kind = ColumnKind::infer(rows.iter().map(|row| &row[idx]));
                Column::new(column, kind)
            })
            .collect();

        let mut table = Table::new(name, columns)?;
        table.source = vec![None; rows.len()];
        table.rows = rows;
        Ok(table)
    }

    /// Build a table from raw text cells, parsing each with [`Value::parse`]
    /// and keeping the text for rendering.
    pub fn from_text_rows<S: Into<String>>(
        name: impl Into<String>,
        column_names: impl IntoIterator<Item = S>,
        text_rows: Vec<Vec<String>>,
    ) -> Result<Self> {
        let rows = text_rows
            .iter()
            .map(|cells| cells.iter().map(|cell| Value::parse(cell)).collect())
            .collect();
        let mut table = Table::from_rows(name, column_names, rows)?;
        table.source = text_rows.into_iter().map(Some).collect();
        Ok(table)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.column_lookup.get(column).copied()
    }

    pub fn column(&self, column: &str) -> Option<&Column> {
        self.column_index(column).map(|idx| &self.columns[idx])
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_lookup.contains_key(column)
    }

    pub fn value(&self, row: usize, column: usize) -> Option<&Value> {
        self.rows.get(row).and_then(|values| values.get(column))
    }

    /// Text of a cell: the loaded source text when the cell is untouched,
    /// otherwise the value's key.
    pub fn cell_text(&self, row: usize, column: usize) -> Option<String> {
        if let Some(text) = self
            .source
            .get(row)
            .and_then(Option::as_ref)
            .and_then(|cells| cells.get(column))
        {
            return Some(text.clone());
        }
        self.value(row, column).map(Value::key)
    }

    /// Values of one column in row order.
    pub fn column_values(&self, column: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows.iter().filter_map(move |row| row.get(column))
    }

    /// Keys of the non-null values in a column.
    pub fn key_set(&self, column: usize) -> HashSet<String> {
        self.column_values(column)
            .filter(|value| !value.is_null())
            .map(Value::key)
            .collect()
    }

    pub fn push_row(&mut self, row: Row) -> Result<()> {
        check_width(&self.name, self.columns.len(), &row, self.rows.len())?;
        self.rows.push(row);
        self.source.push(None);
        Ok(())
    }

    /// Append rows as one batch; nothing is appended if any row is malformed.
    pub fn extend_rows(&mut self, rows: Vec<Row>) -> Result<usize> {
        for (offset, row) in rows.iter().enumerate() {
            check_width(&self.name, self.columns.len(), row, self.rows.len() + offset)?;
        }
        let added = rows.len();
        self.rows.extend(rows);
        self.source.resize(self.rows.len(), None);
        Ok(added)
    }

    /// Overwrite a single cell, returning the previous value.
    pub fn set_value(&mut self, row: usize, column: usize, value: Value) -> Result<Value> {
        let name = &self.name;
        let cell = self
            .rows
            .get_mut(row)
            .and_then(|values| values.get_mut(column))
            .ok_or_else(|| {
                Error::InvalidTable(format!("cell ({row}, {column}) out of range in {name}"))
            })?;
        if let Some(text) = self
            .source
            .get_mut(row)
            .and_then(Option::as_mut)
            .and_then(|cells| cells.get_mut(column))
        {
            *text = value.key();
        }
        Ok(std::mem::replace(cell, value))
    }
}

fn check_width(table: &str, expected: usize, row: &Row, row_idx: usize) -> Result<()> {
    if row.len() != expected {
        return Err(Error::InvalidTable(format!(
            "row {} of {} has {} value(s), expected {}",
            row_idx + 1,
            table,
            row.len(),
            expected
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::epoch_timestamp;

    #[test]
    fn infer_kind_from_values() {
        let ints = [Value::Int(1), Value::Null, Value::Int(2)];
        assert_eq!(ColumnKind::infer(&ints), ColumnKind::Integer);

        let mixed_numbers = [Value::Int(1), Value::Float(2.5)];
        assert_eq!(ColumnKind::infer(&mixed_numbers), ColumnKind::Float);

        let ids = [Value::from("A1"), Value::from("A2")];
        assert_eq!(ColumnKind::infer(&ids), ColumnKind::Identifier);

        let prose = [Value::from("A1"), Value::from("called about billing")];
        assert_eq!(ColumnKind::infer(&prose), ColumnKind::FreeText);

        let times = [Value::Timestamp(epoch_timestamp())];
        assert_eq!(ColumnKind::infer(&times), ColumnKind::Timestamp);

        let flags = [Value::Bool(true), Value::Bool(false)];
        assert_eq!(ColumnKind::infer(&flags), ColumnKind::Boolean);

        let nothing = [Value::Null, Value::Null];
        assert_eq!(ColumnKind::infer(&nothing), ColumnKind::Unknown);

        let odd = [Value::Bool(true), Value::Int(1)];
        assert_eq!(ColumnKind::infer(&odd), ColumnKind::Unknown);
    }

    #[test]
    fn mixed_text_and_numbers_is_textual() {
        let values = [Value::Int(10), Value::from("dummy_Accounts_ID")];
        assert_eq!(ColumnKind::infer(&values), ColumnKind::Identifier);
    }

    #[test]
    fn from_rows_rejects_ragged_rows() {
        let err = Table::from_rows(
            "Accounts",
            ["Account_ID", "Balance"],
            vec![vec![Value::from("A1")]],
        )
        .unwrap_err();
        assert!(err.to_string().contains("expected 2"));
    }

    #[test]
    fn duplicate_columns_are_rejected() {
        let result = Table::new(
            "Accounts",
            vec![
                Column::new("Account_ID", ColumnKind::Identifier),
                Column::new("Account_ID", ColumnKind::Identifier),
            ],
        );
        assert!(result.is_err());
    }

    #[test]
    fn key_set_skips_nulls() {
        let table = Table::from_rows(
            "Transactions",
            ["Account_ID"],
            vec![
                vec![Value::from("A1")],
                vec![Value::Null],
                vec![Value::from("A1")],
            ],
        )
        .unwrap();
        let keys = table.key_set(0);
        assert_eq!(keys.len(), 1);
        assert!(keys.contains("A1"));
    }

    #[test]
    fn set_value_returns_previous() {
        let mut table =
            Table::from_rows("Agents", ["Agent_ID"], vec![vec![Value::from("X")]]).unwrap();
        let previous = table.set_value(0, 0, Value::from("Y")).unwrap();
        assert_eq!(previous, Value::from("X"));
        assert_eq!(table.value(0, 0), Some(&Value::from("Y")));
        assert!(table.set_value(3, 0, Value::Null).is_err());
    }

    #[test]
    fn text_rows_render_as_loaded_until_rewritten() {
        let mut table = Table::from_text_rows(
            "Billing",
            ["Bill_ID", "Amount"],
            vec![vec!["B1".to_string(), "100.50".to_string()]],
        )
        .unwrap();
        assert_eq!(table.value(0, 1), Some(&Value::Float(100.5)));
        assert_eq!(table.cell_text(0, 1).as_deref(), Some("100.50"));

        table.set_value(0, 1, Value::Int(7)).unwrap();
        assert_eq!(table.cell_text(0, 1).as_deref(), Some("7"));

        table.push_row(vec![Value::from("B2"), Value::Float(2.0)]).unwrap();
        assert_eq!(table.cell_text(1, 1).as_deref(), Some("2"));
    }
}
