// Tabular data: ordered column identifiers plus rows keyed by identifier

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::cell::CellValue;

/// One row of the table. Keys outside the column set are tolerated but never addressed.
pub type Row = HashMap<String, CellValue>;

static EMPTY: CellValue = CellValue::Empty;

/// The in-memory dataset behind a grid.
///
/// Rows are reference-counted so an edit clones only the rows it touches; every
/// other row keeps its identity (`Arc::ptr_eq`) across the edit.
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Arc<Row>>,
}

impl Table {
    /// Build a table from column identifiers and rows. Duplicate identifiers are
    /// dropped, keeping the first occurrence.
    pub fn new<I, S>(columns: I, rows: Vec<Row>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let columns: Vec<String> = columns
            .into_iter()
            .map(Into::into)
            .filter(|c| seen.insert(c.clone()))
            .collect();
        let mut table = Self {
            columns,
            index: HashMap::new(),
            rows: rows.into_iter().map(Arc::new).collect(),
        };
        table.reindex();
        table
    }

    /// Empty sheet with spreadsheet-letter headers (A, B, ... Z, AA, ...).
    pub fn blank(cols: usize, rows: usize) -> Self {
        let columns = (0..cols).map(col_to_letter);
        Self::new(columns, (0..rows).map(|_| Row::new()).collect())
    }

    fn reindex(&mut self) {
        self.index = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Arc<Row>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.columns.len()
    }

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.row_count(), self.col_count())
    }

    /// Same row count and same column list, in order.
    pub fn same_shape(&self, other: &Table) -> bool {
        self.row_count() == other.row_count() && self.columns == other.columns
    }

    pub fn column_index(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn column_id(&self, col: usize) -> Option<&str> {
        self.columns.get(col).map(String::as_str)
    }

    /// Value at a display position. Missing rows, columns and keys read as empty.
    pub fn get(&self, row: usize, col: usize) -> &CellValue {
        match (self.rows.get(row), self.columns.get(col)) {
            (Some(r), Some(id)) => r.get(id).unwrap_or(&EMPTY),
            _ => &EMPTY,
        }
    }

    pub fn get_by_id(&self, row: usize, id: &str) -> &CellValue {
        match self.column_index(id) {
            Some(col) => self.get(row, col),
            None => &EMPTY,
        }
    }

    /// Set one cell. Returns false if the position is outside the table.
    pub fn set(&mut self, row: usize, col: usize, value: CellValue) -> bool {
        let Some(id) = self.columns.get(col).cloned() else {
            return false;
        };
        let Some(r) = self.rows.get_mut(row) else {
            return false;
        };
        Arc::make_mut(r).insert(id, value);
        true
    }

    /// Mutable access to a row, cloning it first if it is shared.
    pub(crate) fn row_mut(&mut self, row: usize) -> Option<&mut Row> {
        self.rows.get_mut(row).map(Arc::make_mut)
    }

    /// Insert an empty row before `at` (clamped to the end).
    pub fn insert_row(&mut self, at: usize) {
        let at = at.min(self.rows.len());
        self.rows.insert(at, Arc::new(Row::new()));
    }

    pub fn remove_row(&mut self, at: usize) -> Option<Arc<Row>> {
        (at < self.rows.len()).then(|| self.rows.remove(at))
    }

    /// Insert a column before display index `at` (clamped to the end).
    /// Returns false if the identifier already exists.
    pub fn insert_column(&mut self, at: usize, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.index.contains_key(&id) {
            return false;
        }
        let at = at.min(self.columns.len());
        self.columns.insert(at, id);
        self.reindex();
        true
    }

    /// Remove the column at a display index, dropping its values from every row.
    pub fn remove_column(&mut self, at: usize) -> Option<String> {
        if at >= self.columns.len() {
            return None;
        }
        let id = self.columns.remove(at);
        for row in &mut self.rows {
            if row.contains_key(&id) {
                Arc::make_mut(row).remove(&id);
            }
        }
        self.reindex();
        Some(id)
    }

    /// Rename a column in place, moving its values. Returns false if `to` is taken
    /// or `from` does not exist.
    pub fn rename_column(&mut self, from: &str, to: impl Into<String>) -> bool {
        let to = to.into();
        if self.index.contains_key(&to) {
            return false;
        }
        let Some(col) = self.column_index(from) else {
            return false;
        };
        for row in &mut self.rows {
            if row.contains_key(from) {
                let row = Arc::make_mut(row);
                if let Some(v) = row.remove(from) {
                    row.insert(to.clone(), v);
                }
            }
        }
        self.columns[col] = to;
        self.reindex();
        true
    }
}

/// Convert a 0-based column index to spreadsheet letters.
pub fn col_to_letter(col: usize) -> String {
    let mut result = String::new();
    let mut n = col + 1;
    while n > 0 {
        n -= 1;
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        n /= 26;
    }
    result
}
