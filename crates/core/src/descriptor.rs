use serde::{Deserialize, Serialize};

use crate::selection::{Range, SelectionMode};
use crate::table::Table;

/// Inclusive, zero-based row span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowSpan {
    pub start: usize,
    pub end: usize,
}

/// Serializable summary of the current selection, sent to the AI backend as
/// context alongside a chat message.
///
/// Columns are reported by identifier, not display index, so the backend can
/// address them in its own dataframe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionDescriptor {
    pub mode: SelectionMode,
    pub rows: RowSpan,
    pub columns: Vec<String>,
}

impl SelectionDescriptor {
    /// Describe normalized `bounds` against `table`.
    pub fn from_bounds(table: &Table, bounds: Range, mode: SelectionMode) -> Self {
        let columns = bounds
            .cols()
            .filter_map(|c| table.column_id(c).map(str::to_string))
            .collect();
        Self {
            mode,
            rows: RowSpan {
                start: bounds.start_row,
                end: bounds.end_row,
            },
            columns,
        }
    }

    /// Rows as `start-end`, the form the chat backend logs.
    pub fn rows_label(&self) -> String {
        format!("{}-{}", self.rows.start, self.rows.end)
    }

    /// Inverted spans from an untrusted payload count as one row.
    pub fn row_count(&self) -> usize {
        self.rows.end.saturating_sub(self.rows.start) + 1
    }
}
