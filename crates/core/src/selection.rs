use serde::{Deserialize, Serialize};

/// A rectangular range of cells, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub start_row: usize,
    pub start_col: usize,
    pub end_row: usize,
    pub end_col: usize,
}

impl Range {
    /// Create a new range, automatically normalizing so start <= end.
    pub fn new(r1: usize, c1: usize, r2: usize, c2: usize) -> Self {
        Self {
            start_row: r1.min(r2),
            start_col: c1.min(c2),
            end_row: r1.max(r2),
            end_col: c1.max(c2),
        }
    }

    /// Create a single-cell range.
    pub fn single(row: usize, col: usize) -> Self {
        Self {
            start_row: row,
            start_col: col,
            end_row: row,
            end_col: col,
        }
    }

    /// Check if this range contains a cell.
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row >= self.start_row && row <= self.end_row &&
        col >= self.start_col && col <= self.end_col
    }

    /// Number of cells in this range.
    pub fn cell_count(&self) -> usize {
        self.row_span() * self.col_span()
    }

    /// Rows covered. A deserialized range with its corners swapped counts as one row.
    pub fn row_span(&self) -> usize {
        self.end_row.saturating_sub(self.start_row) + 1
    }

    pub fn col_span(&self) -> usize {
        self.end_col.saturating_sub(self.start_col) + 1
    }

    pub fn rows(&self) -> std::ops::RangeInclusive<usize> {
        self.start_row..=self.end_row
    }

    pub fn cols(&self) -> std::ops::RangeInclusive<usize> {
        self.start_col..=self.end_col
    }

    /// Iterate over all cells in this range (row-major order).
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> {
        let cols = self.cols();
        self.rows().flat_map(move |r| cols.clone().map(move |c| (r, c)))
    }

    /// Check if this is a single cell.
    pub fn is_single(&self) -> bool {
        self.start_row == self.end_row && self.start_col == self.end_col
    }
}

/// How the stored coordinates of a selection are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Rectangle between the two stored corners.
    #[default]
    Range,
    /// Whole rows; stored columns are ignored.
    Row,
    /// Whole columns; stored rows are ignored.
    Col,
    /// Every cell in the table.
    All,
}

impl SelectionMode {
    /// Wire name, as serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionMode::Range => "range",
            SelectionMode::Row => "row",
            SelectionMode::Col => "col",
            SelectionMode::All => "all",
        }
    }
}

/// Where a new selection starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    Cell { row: usize, col: usize },
    Row(usize),
    Col(usize),
    All,
}

impl Anchor {
    pub fn cell(row: usize, col: usize) -> Self {
        Anchor::Cell { row, col }
    }

    pub fn mode(&self) -> SelectionMode {
        match self {
            Anchor::Cell { .. } => SelectionMode::Range,
            Anchor::Row(_) => SelectionMode::Row,
            Anchor::Col(_) => SelectionMode::Col,
            Anchor::All => SelectionMode::All,
        }
    }
}

/// The highlighted region of a grid.
///
/// Start/end are stored exactly as the gesture produced them, in any order.
/// Consumers never read them directly; they go through [`Selection::bounds`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub(crate) start_row: usize,
    pub(crate) start_col: usize,
    pub(crate) end_row: usize,
    pub(crate) end_col: usize,
    pub(crate) active: bool,
    pub(crate) mode: SelectionMode,
}

impl Selection {
    /// A fresh active selection with start and end both at the anchor.
    pub fn begin(anchor: Anchor) -> Self {
        let (row, col) = match anchor {
            Anchor::Cell { row, col } => (row, col),
            Anchor::Row(r) => (r, 0),
            Anchor::Col(c) => (0, c),
            Anchor::All => (0, 0),
        };
        Self {
            start_row: row,
            start_col: col,
            end_row: row,
            end_col: col,
            active: true,
            mode: anchor.mode(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Raw anchor corner, as set by the gesture.
    pub fn start(&self) -> (usize, usize) {
        (self.start_row, self.start_col)
    }

    /// Raw moving corner, as set by the gesture.
    pub fn end(&self) -> (usize, usize) {
        (self.end_row, self.end_col)
    }

    /// Move the extent of a range selection. Other modes are not extendable.
    pub(crate) fn extend_to(&mut self, row: usize, col: usize) -> bool {
        if !self.active || self.mode != SelectionMode::Range {
            return false;
        }
        self.end_row = row;
        self.end_col = col;
        true
    }

    pub(crate) fn deactivate(&mut self) {
        self.active = false;
    }

    /// Normalized, mode-adjusted bounds inside a `rows` x `cols` table.
    ///
    /// This is the only place selection coordinates are interpreted; painting,
    /// aggregation, edits and the external descriptor all derive from it.
    /// Stale coordinates past the table edge are clamped rather than rejected.
    /// Returns None when inactive or when the table has no cells.
    pub fn bounds(&self, rows: usize, cols: usize) -> Option<Range> {
        if !self.active || rows == 0 || cols == 0 {
            return None;
        }
        let last_row = rows - 1;
        let last_col = cols - 1;
        let row_span = |a: usize, b: usize| (a.min(b).min(last_row), a.max(b).min(last_row));
        let col_span = |a: usize, b: usize| (a.min(b).min(last_col), a.max(b).min(last_col));

        let (r1, r2) = match self.mode {
            SelectionMode::Range | SelectionMode::Row => row_span(self.start_row, self.end_row),
            SelectionMode::Col | SelectionMode::All => (0, last_row),
        };
        let (c1, c2) = match self.mode {
            SelectionMode::Range | SelectionMode::Col => col_span(self.start_col, self.end_col),
            SelectionMode::Row | SelectionMode::All => (0, last_col),
        };
        Some(Range::new(r1, c1, r2, c2))
    }

    /// Whether a cell falls inside [`Selection::bounds`].
    pub fn contains(&self, row: usize, col: usize, rows: usize, cols: usize) -> bool {
        self.bounds(rows, cols)
            .is_some_and(|b| b.contains(row, col))
    }
}
