use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use telestar_core::{Table, TableStore};
use tracing::info;

use crate::errors::ReconcileError;

/// Write a table as CSV in column order, returning the bytes written.
///
/// Loaded cells keep their source text; appended or rewritten cells are
/// written in their key form, nulls as empty cells.
pub fn write_table_csv(path: &Path, table: &Table) -> Result<u64, csv::Error> {
    let writer = BufWriter::new(File::create(path).map_err(csv::Error::from)?);
    let counting = CountingWriter::new(writer);
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(counting);

    let header: Vec<&str> = table
        .columns()
        .iter()
        .map(|column| column.name.as_str())
        .collect();
    writer.write_record(&header)?;

    let width = table.columns().len();
    for row in 0..table.row_count() {
        writer.write_record(
            (0..width).map(|column| table.cell_text(row, column).unwrap_or_default()),
        )?;
    }

    writer.flush()?;
    let counting = writer.into_inner().map_err(|err| err.into_error())?;
    Ok(counting.bytes_written())
}

/// Write every table of the store as `<dir>/<table>.csv`.
pub fn write_store_dir(dir: &Path, store: &TableStore) -> Result<u64, ReconcileError> {
    std::fs::create_dir_all(dir)?;
    let mut bytes_written = 0_u64;
    for table in store.tables() {
        let path = dir.join(format!("{}.csv", table.name()));
        bytes_written += write_table_csv(&path, table)?;
    }
    info!(
        event = "tables_written",
        dir = %dir.display(),
        tables = store.len(),
        bytes = bytes_written
    );
    Ok(bytes_written)
}

struct CountingWriter<W: Write> {
    inner: W,
    bytes: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, bytes: 0 }
    }

    fn bytes_written(&self) -> u64 {
        self.bytes
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let size = self.inner.write(buf)?;
        self.bytes = self.bytes.saturating_add(size as u64);
        Ok(size)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
