//! SelectionGrid: one table, one selection, and the operations that are
//! allowed to mutate them.
//!
//! Rendering code never writes selection fields directly. It calls the
//! operations below and repaints on [`GridEvent::Redraw`].

use std::fmt;

use crate::aggregate::{Aggregate, CountPolicy};
use crate::cell::CellValue;
use crate::descriptor::SelectionDescriptor;
use crate::events::{
    CellsChangedEvent, EventCallback, GridEvent, SelectionChangedEvent, ShapeChangedEvent,
    TableReplacedEvent,
};
use crate::selection::{Anchor, Range, Selection};
use crate::table::Table;

pub struct SelectionGrid {
    table: Table,
    selection: Selection,
    /// Pointer is held down over a cell. Gesture state, not part of the selection shape.
    dragging: bool,
    policy: CountPolicy,
    /// Bumped on every table write or replacement.
    revision: u64,
    listener: Option<EventCallback>,
}

impl fmt::Debug for SelectionGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionGrid")
            .field("shape", &self.table.shape())
            .field("selection", &self.selection)
            .field("dragging", &self.dragging)
            .field("policy", &self.policy)
            .field("revision", &self.revision)
            .finish()
    }
}

impl Default for SelectionGrid {
    fn default() -> Self {
        Self::new(Table::default())
    }
}

impl SelectionGrid {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            selection: Selection::default(),
            dragging: false,
            policy: CountPolicy::default(),
            revision: 0,
            listener: None,
        }
    }

    pub fn with_count_policy(mut self, policy: CountPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn set_count_policy(&mut self, policy: CountPolicy) {
        if self.policy != policy {
            self.policy = policy;
            self.notify_aggregate();
            self.emit(GridEvent::Redraw);
        }
    }

    /// Install the event sink. Replaces any previous listener.
    pub fn set_listener(&mut self, listener: EventCallback) {
        self.listener = Some(listener);
    }

    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn count_policy(&self) -> CountPolicy {
        self.policy
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Normalized bounds of the current selection against the current table.
    pub fn bounds(&self) -> Option<Range> {
        let (rows, cols) = self.table.shape();
        self.selection.bounds(rows, cols)
    }

    // ── Selection ───────────────────────────────────────────────────────

    /// Start a new selection at `anchor`, replacing any previous one.
    /// A cell anchor also starts a drag so the range can be extended.
    pub fn begin_selection(&mut self, anchor: Anchor) {
        self.selection = Selection::begin(anchor);
        self.dragging = matches!(anchor, Anchor::Cell { .. });
        log::debug!("begin selection at {:?} (dragging: {})", anchor, self.dragging);
        self.selection_changed();
    }

    /// Move the extent of a range selection while a drag is in progress.
    /// Ignored when not dragging, when inactive, or for row/col/all selections.
    pub fn extend_selection(&mut self, row: usize, col: usize) {
        if !self.dragging {
            log::trace!("extend to ({}, {}) ignored: not dragging", row, col);
            return;
        }
        if self.selection.end() == (row, col) && self.selection.is_active() {
            return;
        }
        if self.selection.extend_to(row, col) {
            log::trace!("extend selection to ({}, {})", row, col);
            self.selection_changed();
        }
    }

    /// Release the drag. The selection stays active.
    pub fn end_selection(&mut self) {
        self.dragging = false;
    }

    pub fn clear_selection(&mut self) {
        self.dragging = false;
        self.selection.deactivate();
        log::debug!("selection cleared");
        self.selection_changed();
    }

    pub fn is_selected(&self, row: usize, col: usize) -> bool {
        self.bounds().is_some_and(|b| b.contains(row, col))
    }

    pub fn compute_aggregate(&self) -> Aggregate {
        Aggregate::compute(&self.table, self.bounds(), self.policy)
    }

    /// Selection context for the AI backend.
    ///
    /// None when nothing is selected, and also when the table has no rows or no
    /// columns: an active selection over an empty table describes no cells.
    pub fn to_external_descriptor(&self) -> Option<SelectionDescriptor> {
        let bounds = self.bounds()?;
        Some(SelectionDescriptor::from_bounds(
            &self.table,
            bounds,
            self.selection.mode(),
        ))
    }

    // ── Edits ───────────────────────────────────────────────────────────

    /// Replace every selected cell with `f(old)`.
    ///
    /// Only rows inside the selection are cloned; all other rows keep their
    /// identity. No-op without an active selection.
    pub fn apply_to_selection<F>(&mut self, mut f: F)
    where
        F: FnMut(&CellValue) -> CellValue,
    {
        let Some(bounds) = self.bounds() else {
            return;
        };
        let ids: Vec<String> = self.table.columns()[bounds.start_col..=bounds.end_col].to_vec();

        for r in bounds.rows() {
            let Some(row) = self.table.row_mut(r) else {
                continue;
            };
            for id in &ids {
                let new = f(row.get(id).unwrap_or(&CellValue::Empty));
                row.insert(id.clone(), new);
            }
        }

        self.revision += 1;
        log::debug!(
            "applied edit to {} cells (revision {})",
            bounds.cell_count(),
            self.revision
        );
        let revision = self.revision;
        self.emit_with(|| {
            GridEvent::CellsChanged(CellsChangedEvent {
                revision,
                cells: bounds.cells().collect(),
            })
        });
        self.notify_aggregate();
        self.emit(GridEvent::Redraw);
    }

    /// Blank every selected cell.
    pub fn clear_selected_cells(&mut self) {
        self.apply_to_selection(|_| CellValue::Empty);
    }

    /// Single-cell edit. Keeps the selection. Returns false outside the table.
    pub fn set_cell(&mut self, row: usize, col: usize, value: CellValue) -> bool {
        if !self.table.set(row, col, value) {
            log::warn!("set_cell ({}, {}) outside {:?} table", row, col, self.table.shape());
            return false;
        }
        self.revision += 1;
        let revision = self.revision;
        self.emit_with(|| {
            GridEvent::CellsChanged(CellsChangedEvent {
                revision,
                cells: vec![(row, col)],
            })
        });
        self.notify_aggregate();
        self.emit(GridEvent::Redraw);
        true
    }

    /// Swap in a freshly loaded table (upload, sync, AI edit). Last write wins.
    ///
    /// If the row count or column list changed, stored selection coordinates may
    /// point at different logical cells, so the selection and any drag are dropped.
    pub fn replace_table(&mut self, table: Table) {
        let shape_changed = !self.table.same_shape(&table);
        self.table = table;
        self.revision += 1;
        log::debug!(
            "table replaced: {:?} (shape changed: {}, revision {})",
            self.table.shape(),
            shape_changed,
            self.revision
        );

        let revision = self.revision;
        self.emit_with(|| {
            GridEvent::TableReplaced(TableReplacedEvent {
                revision,
                shape_changed,
            })
        });
        if shape_changed {
            self.reset_selection();
        }
        self.notify_aggregate();
        self.emit(GridEvent::Redraw);
    }

    /// Insert an empty row before `at`.
    pub fn insert_row(&mut self, at: usize) {
        self.structural_edit(|t| {
            t.insert_row(at);
            true
        });
    }

    pub fn remove_row(&mut self, at: usize) -> bool {
        self.structural_edit(|t| t.remove_row(at).is_some())
    }

    /// Insert a column before display index `at`. False if `id` already exists.
    pub fn insert_column(&mut self, at: usize, id: impl Into<String>) -> bool {
        let id = id.into();
        self.structural_edit(|t| t.insert_column(at, id))
    }

    pub fn remove_column(&mut self, at: usize) -> bool {
        self.structural_edit(|t| t.remove_column(at).is_some())
    }

    fn structural_edit(&mut self, edit: impl FnOnce(&mut Table) -> bool) -> bool {
        if !edit(&mut self.table) {
            return false;
        }
        self.revision += 1;
        let (rows, cols) = self.table.shape();
        log::debug!("shape changed to {}x{} (revision {})", rows, cols, self.revision);
        let revision = self.revision;
        self.emit_with(|| {
            GridEvent::ShapeChanged(ShapeChangedEvent {
                revision,
                rows,
                cols,
            })
        });
        self.reset_selection();
        self.notify_aggregate();
        self.emit(GridEvent::Redraw);
        true
    }

    // ── Notification ────────────────────────────────────────────────────

    fn reset_selection(&mut self) {
        let was_live = self.selection.is_active() || self.dragging;
        self.dragging = false;
        self.selection.deactivate();
        if was_live {
            let selection = self.selection;
            self.emit_with(|| GridEvent::SelectionChanged(SelectionChangedEvent { selection }));
        }
    }

    fn selection_changed(&mut self) {
        let selection = self.selection;
        self.emit_with(|| GridEvent::SelectionChanged(SelectionChangedEvent { selection }));
        self.notify_aggregate();
        self.emit(GridEvent::Redraw);
    }

    /// Recompute the aggregate for the status readout.
    fn notify_aggregate(&mut self) {
        if self.listener.is_none() {
            return;
        }
        let aggregate = self.compute_aggregate();
        log::trace!("aggregate: {}", aggregate.readout());
        self.emit(GridEvent::AggregateChanged(aggregate));
    }

    fn emit(&mut self, event: GridEvent) {
        if let Some(listener) = self.listener.as_mut() {
            listener(event);
        }
    }

    /// Build the event only if someone is listening.
    fn emit_with(&mut self, build: impl FnOnce() -> GridEvent) {
        if let Some(listener) = self.listener.as_mut() {
            listener(build());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventCollector;
    use crate::table::Row;
    use std::sync::{Arc, Mutex};

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), CellValue::text(*v)))
            .collect()
    }

    fn numbered(rows: usize, cols: usize) -> Table {
        let mut table = Table::blank(cols, rows);
        for r in 0..rows {
            for c in 0..cols {
                table.set(r, c, CellValue::text(format!("{}", r * 10 + c)));
            }
        }
        table
    }

    fn listen(grid: &mut SelectionGrid) -> Arc<Mutex<EventCollector>> {
        let events = Arc::new(Mutex::new(EventCollector::new()));
        let sink = Arc::clone(&events);
        grid.set_listener(Box::new(move |e: GridEvent| sink.lock().unwrap().push(e)));
        events
    }

    #[test]
    fn test_single_click_selects_one_cell() {
        let mut grid = SelectionGrid::new(numbered(10, 10));
        grid.begin_selection(Anchor::cell(2, 3));
        assert!(grid.is_selected(2, 3));
        assert!(!grid.is_selected(2, 4));
        assert_eq!(grid.bounds(), Some(Range::single(2, 3)));
    }

    #[test]
    fn test_drag_extends_range() {
        let mut grid = SelectionGrid::new(numbered(10, 10));
        grid.begin_selection(Anchor::cell(2, 1));
        grid.extend_selection(4, 3);
        assert!(grid.is_selected(3, 2));
        assert!(!grid.is_selected(1, 2));
        assert!(!grid.is_selected(5, 2));
        assert_eq!(grid.bounds(), Some(Range::new(2, 1, 4, 3)));
    }

    #[test]
    fn test_extend_requires_drag() {
        let mut grid = SelectionGrid::new(numbered(10, 10));
        grid.begin_selection(Anchor::cell(2, 1));
        grid.end_selection();
        grid.extend_selection(4, 3);
        assert_eq!(grid.bounds(), Some(Range::single(2, 1)));
        assert!(grid.selection().is_active());

        // End is idempotent
        grid.end_selection();
        assert!(!grid.is_dragging());
    }

    #[test]
    fn test_extend_ignored_for_row_mode() {
        let mut grid = SelectionGrid::new(numbered(10, 10));
        grid.begin_selection(Anchor::Row(5));
        assert!(!grid.is_dragging());
        grid.extend_selection(7, 7);
        assert_eq!(grid.bounds(), Some(Range::new(5, 0, 5, 9)));
    }

    #[test]
    fn test_row_mode_selects_entire_row() {
        let mut grid = SelectionGrid::new(numbered(10, 10));
        grid.begin_selection(Anchor::Row(5));
        for c in 0..10 {
            assert!(grid.is_selected(5, c));
            assert!(!grid.is_selected(4, c));
            assert!(!grid.is_selected(6, c));
        }
    }

    #[test]
    fn test_clear_zeroes_aggregate() {
        let mut grid = SelectionGrid::new(numbered(4, 4));
        grid.begin_selection(Anchor::All);
        assert!(grid.compute_aggregate().sum > 0.0);
        grid.clear_selection();
        assert_eq!(grid.compute_aggregate(), Aggregate::default());
        assert!(!grid.is_selected(0, 0));
        assert_eq!(grid.to_external_descriptor(), None);
    }

    #[test]
    fn test_aggregate_scenario() {
        let table = Table::new(
            ["A", "B"],
            vec![row(&[("A", "10"), ("B", "x")]), row(&[("A", ""), ("B", "5")])],
        );
        let mut grid = SelectionGrid::new(table);
        grid.begin_selection(Anchor::cell(0, 0));
        grid.extend_selection(1, 1);
        let agg = grid.compute_aggregate();
        assert_eq!(agg.count, 3);
        assert_eq!(agg.sum, 15.0);
        assert_eq!(agg.average, 7.5);

        grid.set_count_policy(CountPolicy::NumericOnly);
        assert_eq!(grid.compute_aggregate().count, 2);
    }

    #[test]
    fn test_clear_cells_leaves_other_rows_untouched() {
        let mut grid = SelectionGrid::new(numbered(4, 3));
        let before = grid.table().clone();

        grid.begin_selection(Anchor::cell(1, 0));
        grid.extend_selection(2, 1);
        grid.end_selection();
        grid.clear_selected_cells();

        for r in 1..=2 {
            for c in 0..=1 {
                assert!(grid.table().get(r, c).is_blank());
            }
        }
        for r in 0..4 {
            for c in 0..3 {
                if (1..=2).contains(&r) && c <= 1 {
                    continue;
                }
                assert_eq!(grid.table().get(r, c), before.get(r, c));
            }
        }
        assert!(Arc::ptr_eq(&grid.table().rows()[0], &before.rows()[0]));
        assert!(Arc::ptr_eq(&grid.table().rows()[3], &before.rows()[3]));
        assert!(!Arc::ptr_eq(&grid.table().rows()[1], &before.rows()[1]));
        assert_eq!(grid.revision(), 1);
    }

    #[test]
    fn test_apply_without_selection_is_noop() {
        let mut grid = SelectionGrid::new(numbered(2, 2));
        grid.apply_to_selection(|_| CellValue::text("z"));
        assert_eq!(grid.table().get(0, 0), &CellValue::text("0"));
        assert_eq!(grid.revision(), 0);
    }

    #[test]
    fn test_apply_transforms_values() {
        let mut grid = SelectionGrid::new(numbered(3, 3));
        grid.begin_selection(Anchor::Col(1));
        grid.apply_to_selection(|v| match v.as_number() {
            Some(n) => CellValue::Number(n * 2.0),
            None => v.clone(),
        });
        assert_eq!(grid.table().get(2, 1), &CellValue::Number(42.0));
        assert_eq!(grid.table().get(2, 2), &CellValue::text("22"));
    }

    #[test]
    fn test_replace_with_new_shape_clears_selection_mid_drag() {
        let mut grid = SelectionGrid::new(numbered(4, 4));
        grid.begin_selection(Anchor::cell(0, 0));
        grid.extend_selection(2, 2);
        assert!(grid.is_dragging());

        grid.replace_table(Table::new(["X", "Y", "Z"], vec![Row::new(); 4]));
        assert!(!grid.selection().is_active());
        assert!(!grid.is_dragging());
        assert_eq!(grid.compute_aggregate(), Aggregate::default());

        // Further drag movement must not resurrect it
        grid.extend_selection(3, 1);
        assert!(!grid.selection().is_active());
    }

    #[test]
    fn test_replace_with_same_shape_keeps_selection() {
        let mut grid = SelectionGrid::new(numbered(3, 3));
        grid.begin_selection(Anchor::cell(1, 1));
        grid.end_selection();
        grid.replace_table(Table::blank(3, 3));
        assert!(grid.is_selected(1, 1));
        assert_eq!(grid.compute_aggregate().count, 0);
        assert_eq!(grid.revision(), 1);
    }

    #[test]
    fn test_structural_edits_clear_selection() {
        let mut grid = SelectionGrid::new(numbered(3, 3));
        grid.begin_selection(Anchor::Row(1));
        assert!(grid.insert_column(1, "NEW"));
        assert!(!grid.selection().is_active());
        assert_eq!(grid.table().column_index("NEW"), Some(1));

        grid.begin_selection(Anchor::Row(1));
        assert!(!grid.remove_row(9));
        assert!(grid.selection().is_active());
        assert!(grid.remove_row(0));
        assert!(!grid.selection().is_active());
        assert_eq!(grid.table().row_count(), 2);
    }

    #[test]
    fn test_descriptor_reports_identifiers() {
        let table = Table::new(["id", "name", "amount"], vec![Row::new(); 5]);
        let mut grid = SelectionGrid::new(table);
        grid.begin_selection(Anchor::cell(4, 2));
        grid.extend_selection(1, 1);
        let d = grid.to_external_descriptor().unwrap();
        assert_eq!((d.rows.start, d.rows.end), (1, 4));
        assert_eq!(d.columns, vec!["name", "amount"]);
    }

    #[test]
    fn test_descriptor_none_for_empty_table() {
        let mut grid = SelectionGrid::new(Table::new(["A", "B"], vec![]));
        grid.begin_selection(Anchor::All);
        assert!(grid.selection().is_active());
        assert_eq!(grid.to_external_descriptor(), None);
        assert_eq!(grid.compute_aggregate(), Aggregate::default());

        let mut grid = SelectionGrid::new(Table::blank(0, 3));
        grid.begin_selection(Anchor::Row(1));
        assert!(grid.selection().is_active());
        assert_eq!(grid.to_external_descriptor(), None);
        assert!(!grid.is_selected(1, 0));
    }

    #[test]
    fn test_events_end_with_redraw() {
        let mut grid = SelectionGrid::new(numbered(3, 3));
        let events = listen(&mut grid);

        grid.begin_selection(Anchor::cell(0, 0));
        {
            let events = events.lock().unwrap();
            assert_eq!(events.selection_changed().len(), 1);
            assert_eq!(events.events().last(), Some(&GridEvent::Redraw));
            let aggregate = events.events().iter().find_map(|e| match e {
                GridEvent::AggregateChanged(a) => Some(*a),
                _ => None,
            });
            assert_eq!(aggregate.map(|a| a.sum), Some(0.0));
        }

        events.lock().unwrap().clear();
        grid.extend_selection(1, 1);
        grid.end_selection();
        grid.clear_selected_cells();
        let events = events.lock().unwrap();
        assert_eq!(events.redraws(), 2);
        assert_eq!(events.cells_changed().len(), 1);
        assert_eq!(events.cells_changed()[0].cells.len(), 4);
    }

    #[test]
    fn test_replace_emits_selection_change_only_when_cleared() {
        let mut grid = SelectionGrid::new(numbered(2, 2));
        let events = listen(&mut grid);

        grid.replace_table(Table::blank(5, 5));
        {
            let events = events.lock().unwrap();
            assert_eq!(events.table_replaced().len(), 1);
            assert!(events.table_replaced()[0].shape_changed);
            assert!(events.selection_changed().is_empty());
        }

        grid.begin_selection(Anchor::All);
        events.lock().unwrap().clear();
        grid.replace_table(Table::blank(2, 2));
        let events = events.lock().unwrap();
        assert_eq!(events.selection_changed().len(), 1);
        assert!(!events.selection_changed()[0].selection.is_active());
    }
}
