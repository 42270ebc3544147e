use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Which side of a relationship a table plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableRole {
    Primary,
    Foreign,
}

impl fmt::Display for TableRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableRole::Primary => f.write_str("primary"),
            TableRole::Foreign => f.write_str("foreign"),
        }
    }
}

/// Errors emitted by padding, reconciliation and table I/O.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("{role} table '{table}' not found in store")]
    MissingTable { table: String, role: TableRole },
    #[error("column '{table}.{column}' not found")]
    MissingColumn { table: String, column: String },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("table error: {0}")]
    Core(#[from] telestar_core::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl ReconcileError {
    /// Stable issue code used in reports.
    pub fn code(&self) -> &'static str {
        match self {
            ReconcileError::MissingTable { .. } => "missing_table",
            ReconcileError::MissingColumn { .. } => "missing_column",
            ReconcileError::InvalidInput(_) => "invalid_input",
            ReconcileError::Core(_) => "table_error",
            ReconcileError::Io(_) => "io_error",
            ReconcileError::Csv(_) => "csv_error",
        }
    }
}
