//! Gesture replay: drive a grid headlessly from a JSONL event stream.
//!
//! One event per line, tagged by `event`:
//!
//! ```text
//! {"event": "pointer_down", "target": {"cell": {"row": 0, "col": 0}}}
//! {"event": "pointer_over", "target": {"row_header": 2}}
//! {"event": "pointer_up"}
//! {"event": "set_cell", "row": 1, "col": 0, "value": "42"}
//! {"event": "replace", "grid_update": {"columns": ["A"], "data": [{"A": 1}]}}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use std::io::BufRead;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use gridsel_core::{CellValue, EventCollector, GridEvent, PointerTarget, SelectionGrid};
use gridsel_protocol::TablePayload;

use crate::CliError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ReplayEvent {
    PointerDown { target: PointerTarget },
    PointerOver { target: PointerTarget },
    PointerUp,
    /// Drop the selection.
    Clear,
    /// Blank every selected cell.
    ClearCells,
    SetCell { row: usize, col: usize, value: Value },
    /// A backend table update arriving mid-gesture.
    Replace { grid_update: TablePayload },
}

/// An event with the line it came from.
#[derive(Debug, Clone)]
pub struct Step {
    pub line: usize,
    pub event: ReplayEvent,
}

pub fn parse_events(reader: impl BufRead) -> Result<Vec<Step>, CliError> {
    let mut steps = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line_no = i + 1;
        let line = line.map_err(|e| CliError::io(format!("line {}: {}", line_no, e)))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let event = serde_json::from_str(trimmed).map_err(|e| {
            CliError::parse(format!("line {}: {}", line_no, e))
                .with_hint("each line must be one JSON event object with an \"event\" tag")
        })?;
        steps.push(Step {
            line: line_no,
            event,
        });
    }
    Ok(steps)
}

pub fn apply_event(grid: &mut SelectionGrid, event: ReplayEvent) {
    match event {
        ReplayEvent::PointerDown { target } => grid.pointer_down(target),
        ReplayEvent::PointerOver { target } => grid.pointer_over(target),
        ReplayEvent::PointerUp => grid.pointer_up(),
        ReplayEvent::Clear => grid.clear_selection(),
        ReplayEvent::ClearCells => grid.clear_selected_cells(),
        ReplayEvent::SetCell { row, col, value } => {
            grid.set_cell(row, col, CellValue::from(value));
        }
        ReplayEvent::Replace { grid_update } => grid.replace_table(grid_update.into_table()),
    }
}

/// Run `steps` in order. With `trace`, each step's readout and the grid
/// events it produced are written to stderr.
pub fn run(grid: &mut SelectionGrid, steps: Vec<Step>, trace: bool) -> usize {
    let collector = Arc::new(Mutex::new(EventCollector::new()));
    if trace {
        let sink = Arc::clone(&collector);
        grid.set_listener(Box::new(move |event: GridEvent| {
            if let Ok(mut events) = sink.lock() {
                events.push(event);
            }
        }));
    }

    let count = steps.len();
    for Step { line, event } in steps {
        log::debug!("line {}: {:?}", line, event);
        let label = event_label(&event);
        apply_event(grid, event);
        if trace {
            let emitted = collector
                .lock()
                .map(|mut events| {
                    let names: Vec<&str> = events.events().iter().map(grid_event_label).collect();
                    events.clear();
                    names.join(",")
                })
                .unwrap_or_default();
            eprintln!(
                "{:>4} {:<12} {} [{}]",
                line,
                label,
                grid.compute_aggregate().readout(),
                emitted
            );
        }
    }
    grid.clear_listener();
    count
}

fn event_label(event: &ReplayEvent) -> &'static str {
    match event {
        ReplayEvent::PointerDown { .. } => "pointer_down",
        ReplayEvent::PointerOver { .. } => "pointer_over",
        ReplayEvent::PointerUp => "pointer_up",
        ReplayEvent::Clear => "clear",
        ReplayEvent::ClearCells => "clear_cells",
        ReplayEvent::SetCell { .. } => "set_cell",
        ReplayEvent::Replace { .. } => "replace",
    }
}

fn grid_event_label(event: &GridEvent) -> &'static str {
    match event {
        GridEvent::SelectionChanged(_) => "selection",
        GridEvent::CellsChanged(_) => "cells",
        GridEvent::TableReplaced(_) => "table",
        GridEvent::ShapeChanged(_) => "shape",
        GridEvent::AggregateChanged(_) => "aggregate",
        GridEvent::Redraw => "redraw",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridsel_core::{Range, Table};

    fn steps(src: &str) -> Vec<Step> {
        parse_events(src.as_bytes()).unwrap()
    }

    #[test]
    fn test_parse_skips_blank_and_comments() {
        let parsed = steps(
            "# drag\n\n{\"event\": \"pointer_down\", \"target\": {\"cell\": {\"row\": 0, \"col\": 1}}}\n{\"event\": \"pointer_up\"}\n",
        );
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].line, 3);
        assert_eq!(
            parsed[0].event,
            ReplayEvent::PointerDown {
                target: PointerTarget::Cell { row: 0, col: 1 }
            }
        );
    }

    #[test]
    fn test_parse_error_reports_line() {
        let err = parse_events("{\"event\": \"pointer_up\"}\n{\"event\": \"jump\"}\n".as_bytes())
            .unwrap_err();
        assert!(err.message.starts_with("line 2:"), "{}", err.message);
    }

    #[test]
    fn test_drag_then_replace_with_new_shape() {
        let mut grid = SelectionGrid::new(Table::blank(3, 3));
        let script = steps(concat!(
            "{\"event\": \"pointer_down\", \"target\": {\"cell\": {\"row\": 2, \"col\": 2}}}\n",
            "{\"event\": \"pointer_over\", \"target\": {\"cell\": {\"row\": 1, \"col\": 0}}}\n",
        ));
        run(&mut grid, script, false);
        assert_eq!(grid.bounds(), Some(Range::new(1, 0, 2, 2)));
        assert!(grid.is_dragging());

        let script = steps(
            "{\"event\": \"replace\", \"grid_update\": {\"columns\": [\"A\"], \"data\": [{\"A\": 1}]}}\n",
        );
        run(&mut grid, script, true);
        assert!(!grid.selection().is_active());
        assert!(!grid.is_dragging());
    }

    #[test]
    fn test_set_cell_and_clear_cells() {
        let mut grid = SelectionGrid::new(Table::blank(2, 2));
        let script = steps(concat!(
            "{\"event\": \"set_cell\", \"row\": 0, \"col\": 0, \"value\": \"4\"}\n",
            "{\"event\": \"set_cell\", \"row\": 1, \"col\": 0, \"value\": 6}\n",
            "{\"event\": \"pointer_down\", \"target\": {\"column_header\": 0}}\n",
        ));
        assert_eq!(run(&mut grid, script, true), 3);
        assert_eq!(grid.compute_aggregate().sum, 10.0);

        run(&mut grid, steps("{\"event\": \"clear_cells\"}\n"), false);
        assert_eq!(grid.compute_aggregate().count, 0);
        assert!(grid.selection().is_active());
    }
}
