// Pointer-event adapter: translates what the rendering layer reports under the
// pointer into SelectionGrid operations.

use serde::{Deserialize, Serialize};

use crate::grid::SelectionGrid;
use crate::selection::{Anchor, SelectionMode};

/// What the pointer is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerTarget {
    Cell { row: usize, col: usize },
    RowHeader(usize),
    ColumnHeader(usize),
    /// Top-left header corner.
    Corner,
}

impl SelectionGrid {
    pub fn pointer_down(&mut self, target: PointerTarget) {
        let anchor = match target {
            PointerTarget::Cell { row, col } => Anchor::Cell { row, col },
            PointerTarget::RowHeader(r) => Anchor::Row(r),
            PointerTarget::ColumnHeader(c) => Anchor::Col(c),
            PointerTarget::Corner => Anchor::All,
        };
        self.begin_selection(anchor);
    }

    /// Pointer moved onto `target`. Only meaningful during a range drag.
    pub fn pointer_over(&mut self, target: PointerTarget) {
        if !self.is_dragging() || self.selection().mode() != SelectionMode::Range {
            return;
        }
        match target {
            PointerTarget::Cell { row, col } => self.extend_selection(row, col),
            // Sliding over the row-number gutter moves the row extent only.
            PointerTarget::RowHeader(r) => {
                let (_, end_col) = self.selection().end();
                self.extend_selection(r, end_col);
            }
            PointerTarget::ColumnHeader(_) | PointerTarget::Corner => {}
        }
    }

    pub fn pointer_up(&mut self) {
        self.end_selection();
    }
}
