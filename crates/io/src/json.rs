// JSON table payloads: `{"columns": [...], "data": [{...}, ...]}`

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use gridsel_core::Table;
use gridsel_protocol::TablePayload;

use crate::{ExportError, TableExporter};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid table payload: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Read a replacement table in backend payload form.
pub fn load_table(path: &Path) -> Result<Table, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let table = load_table_from_reader(BufReader::new(file))?;
    log::debug!(
        "loaded {}x{} table from {}",
        table.row_count(),
        table.col_count(),
        path.display()
    );
    Ok(table)
}

pub fn load_table_from_reader(reader: impl Read) -> Result<Table, LoadError> {
    let payload: TablePayload = serde_json::from_reader(reader)?;
    Ok(payload.into_table())
}

/// Writes the table in the same payload shape it is loaded from.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExporter {
    pub pretty: bool,
}

impl TableExporter for JsonExporter {
    fn export(&self, table: &Table, out: &mut dyn Write) -> Result<(), ExportError> {
        let payload = TablePayload::from_table(table);
        if self.pretty {
            serde_json::to_writer_pretty(&mut *out, &payload)?;
        } else {
            serde_json::to_writer(&mut *out, &payload)?;
        }
        out.write_all(b"\n")?;
        Ok(())
    }

    fn extension(&self) -> &'static str {
        "json"
    }
}
