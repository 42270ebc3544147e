use std::path::{Path, PathBuf};

use telestar_core::{Table, TableStore};
use tracing::{debug, info};

use crate::errors::ReconcileError;

/// Load one CSV file as a table; the header row gives the column order.
pub fn load_table_csv(path: &Path, name: &str) -> Result<Table, ReconcileError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;

    let headers = reader
        .headers()?
        .iter()
        .map(|header| header.trim().to_string())
        .collect::<Vec<_>>();

    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    let table = Table::from_text_rows(name, headers, rows)?;
    debug!(
        event = "table_loaded",
        table = %name,
        rows = table.row_count(),
        columns = table.columns().len()
    );
    Ok(table)
}

/// Load every `*.csv` file of `dir`, naming each table by its file stem.
pub fn load_store_dir(dir: &Path) -> Result<TableStore, ReconcileError> {
    if !dir.is_dir() {
        return Err(ReconcileError::InvalidInput(format!(
            "input directory not found: {}",
            dir.display()
        )));
    }

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if path.is_file() && is_csv {
            paths.push(path);
        }
    }
    paths.sort();

    let mut store = TableStore::new();
    for path in &paths {
        let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
            return Err(ReconcileError::InvalidInput(format!(
                "file name is not valid UTF-8: {}",
                path.display()
            )));
        };
        store.add(load_table_csv(path, name)?)?;
    }

    info!(event = "store_loaded", dir = %dir.display(), tables = store.len());
    Ok(store)
}
