// CSV export

use std::io::Write;

use gridsel_core::Table;

use crate::{ExportError, TableExporter};

#[derive(Debug, Clone, Copy)]
pub struct CsvExporter {
    pub delimiter: u8,
    /// Write column identifiers as the first record.
    pub headers: bool,
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self {
            delimiter: b',',
            headers: true,
        }
    }
}

impl CsvExporter {
    pub fn tsv() -> Self {
        Self {
            delimiter: b'\t',
            ..Self::default()
        }
    }
}

impl TableExporter for CsvExporter {
    fn export(&self, table: &Table, out: &mut dyn Write) -> Result<(), ExportError> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(out);

        if self.headers {
            writer.write_record(table.columns())?;
        }
        // Every row is written, including blank ones, so row numbers survive a round trip.
        for row in 0..table.row_count() {
            let record: Vec<String> = (0..table.col_count())
                .map(|col| table.get(row, col).display())
                .collect();
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }

    fn extension(&self) -> &'static str {
        if self.delimiter == b'\t' { "tsv" } else { "csv" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export_to_path;
    use gridsel_core::{CellValue, Row};
    use std::fs;
    use tempfile::tempdir;

    fn sample() -> Table {
        let mut rows = vec![Row::new(), Row::new()];
        rows[0].insert("A".into(), CellValue::text("10"));
        rows[0].insert("B".into(), CellValue::text("x, y"));
        rows[1].insert("B".into(), CellValue::Number(5.0));
        Table::new(["A", "B"], rows)
    }

    #[test]
    fn test_csv_export() {
        let mut out = Vec::new();
        CsvExporter::default().export(&sample(), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "A,B\n10,\"x, y\"\n,5\n");
    }

    #[test]
    fn test_blank_rows_kept() {
        let mut out = Vec::new();
        let exporter = CsvExporter { delimiter: b';', headers: false };
        exporter.export(&Table::blank(2, 3), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), ";\n;\n;\n");
    }

    #[test]
    fn test_export_to_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.tsv");
        let exporter = CsvExporter::tsv();
        assert_eq!(exporter.extension(), "tsv");
        export_to_path(&exporter, &sample(), &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "A\tB\n10\tx, y\n\t5\n");
    }
}
