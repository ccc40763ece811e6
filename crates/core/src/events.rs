//! Event types for grid change notifications.
//!
//! A presentation layer subscribes to these instead of polling the grid.
//! Every mutating grid operation ends with exactly one `Redraw`.

use crate::aggregate::Aggregate;
use crate::selection::Selection;

/// Events emitted by `SelectionGrid`.
#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    /// The selection changed shape, extent or activity.
    SelectionChanged(SelectionChangedEvent),

    /// Cell contents changed in place.
    CellsChanged(CellsChangedEvent),

    /// The whole table was swapped for a new one.
    TableReplaced(TableReplacedEvent),

    /// Rows or columns were inserted or removed.
    ShapeChanged(ShapeChangedEvent),

    /// Fresh statistics for the status readout.
    AggregateChanged(Aggregate),

    /// Repaint selection highlight and status readout.
    Redraw,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionChangedEvent {
    pub selection: Selection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellsChangedEvent {
    /// Revision that produced these changes.
    pub revision: u64,
    /// (row, col) display positions that were written.
    pub cells: Vec<(usize, usize)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableReplacedEvent {
    pub revision: u64,
    /// Row count or column list differs from the previous table.
    pub shape_changed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeChangedEvent {
    pub revision: u64,
    pub rows: usize,
    pub cols: usize,
}

/// Callback type for receiving grid events.
pub type EventCallback = Box<dyn FnMut(GridEvent) + Send>;

/// Simple event collector for testing.
#[derive(Debug, Default)]
pub struct EventCollector {
    events: Vec<GridEvent>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: GridEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[GridEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn redraws(&self) -> usize {
        self.events.iter().filter(|e| matches!(e, GridEvent::Redraw)).count()
    }

    /// Filter to only SelectionChanged events.
    pub fn selection_changed(&self) -> Vec<&SelectionChangedEvent> {
        self.events
            .iter()
            .filter_map(|e| match e {
                GridEvent::SelectionChanged(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    /// Filter to only CellsChanged events.
    pub fn cells_changed(&self) -> Vec<&CellsChangedEvent> {
        self.events
            .iter()
            .filter_map(|e| match e {
                GridEvent::CellsChanged(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    /// Filter to only TableReplaced events.
    pub fn table_replaced(&self) -> Vec<&TableReplacedEvent> {
        self.events
            .iter()
            .filter_map(|e| match e {
                GridEvent::TableReplaced(t) => Some(t),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::Anchor;

    #[test]
    fn test_event_collector_filtering() {
        let mut collector = EventCollector::new();

        collector.push(GridEvent::SelectionChanged(SelectionChangedEvent {
            selection: Selection::begin(Anchor::cell(0, 0)),
        }));
        collector.push(GridEvent::CellsChanged(CellsChangedEvent {
            revision: 1,
            cells: vec![(0, 0)],
        }));
        collector.push(GridEvent::TableReplaced(TableReplacedEvent {
            revision: 2,
            shape_changed: true,
        }));
        collector.push(GridEvent::Redraw);

        assert_eq!(collector.len(), 4);
        assert_eq!(collector.selection_changed().len(), 1);
        assert_eq!(collector.cells_changed().len(), 1);
        assert_eq!(collector.table_replaced().len(), 1);
        assert_eq!(collector.redraws(), 1);

        collector.clear();
        assert!(collector.is_empty());
    }
}
