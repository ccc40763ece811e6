//! Selection and aggregation model for a spreadsheet-style grid.
//!
//! [`SelectionGrid`] owns a [`Table`] and a [`Selection`], answers which cells
//! are selected, reduces the selection to an [`Aggregate`], applies edits to the
//! selected cells, and describes the selection for external consumers.

pub mod aggregate;
pub mod cell;
pub mod descriptor;
pub mod events;
pub mod gesture;
pub mod grid;
pub mod selection;
pub mod table;

pub use aggregate::{Aggregate, CountPolicy};
pub use cell::CellValue;
pub use descriptor::{RowSpan, SelectionDescriptor};
pub use events::{EventCallback, EventCollector, GridEvent};
pub use gesture::PointerTarget;
pub use grid::SelectionGrid;
pub use selection::{Anchor, Range, Selection, SelectionMode};
pub use table::{Row, Table};
