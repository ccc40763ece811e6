// File I/O: loading replacement tables and exporting the current table

pub mod csv;
pub mod json;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use gridsel_core::Table;

pub use crate::csv::CsvExporter;
pub use crate::json::{load_table, load_table_from_reader, JsonExporter, LoadError};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] ::csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Writes a whole table (not just the selection) in some file format.
pub trait TableExporter {
    fn export(&self, table: &Table, out: &mut dyn Write) -> Result<(), ExportError>;

    /// Conventional file extension, without the dot.
    fn extension(&self) -> &'static str;
}

/// Export to a file, creating or truncating it.
pub fn export_to_path(
    exporter: &dyn TableExporter,
    table: &Table,
    path: &Path,
) -> Result<(), ExportError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    exporter.export(table, &mut writer)?;
    writer.flush()?;
    log::debug!(
        "exported {}x{} table to {}",
        table.row_count(),
        table.col_count(),
        path.display()
    );
    Ok(())
}
