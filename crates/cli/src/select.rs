// Selection flags shared by every command that reads a selection.

use clap::Args;

use gridsel_core::{Anchor, SelectionGrid, Table};

use crate::CliError;

#[derive(Args, Debug, Default, Clone)]
#[group(multiple = false)]
pub struct SelectionArgs {
    /// Cell range as ROW,COL:ROW,COL (zero-based, either corner first), or a single ROW,COL
    #[arg(long, value_name = "R1,C1:R2,C2")]
    pub range: Option<String>,

    /// Select a whole row (zero-based)
    #[arg(long, value_name = "N")]
    pub row: Option<usize>,

    /// Select a whole column by identifier or zero-based index
    #[arg(long, value_name = "ID_OR_INDEX")]
    pub col: Option<String>,

    /// Select every cell
    #[arg(long)]
    pub all: bool,
}

impl SelectionArgs {
    /// Apply the requested selection to `grid`. No flags leaves nothing selected.
    pub fn apply(&self, grid: &mut SelectionGrid) -> Result<(), CliError> {
        let table = grid.table();
        if let Some(spec) = &self.range {
            let ((r1, c1), (r2, c2)) = parse_range(spec)?;
            for (r, c) in [(r1, c1), (r2, c2)] {
                check_row(table, r)?;
                check_col(table, c)?;
            }
            grid.begin_selection(Anchor::cell(r1, c1));
            grid.extend_selection(r2, c2);
            grid.end_selection();
        } else if let Some(row) = self.row {
            check_row(table, row)?;
            grid.begin_selection(Anchor::Row(row));
        } else if let Some(col) = &self.col {
            let col = resolve_column(table, col)?;
            grid.begin_selection(Anchor::Col(col));
        } else if self.all {
            grid.begin_selection(Anchor::All);
        }
        Ok(())
    }
}

/// Parse `R1,C1:R2,C2` or `R,C`.
pub fn parse_range(spec: &str) -> Result<((usize, usize), (usize, usize)), CliError> {
    let bad = || {
        CliError::args(format!("invalid range '{}'", spec))
            .with_hint("use ROW,COL:ROW,COL with zero-based indices, e.g. 0,0:2,1")
    };
    let point = |s: &str| -> Result<(usize, usize), CliError> {
        let (r, c) = s.split_once(',').ok_or_else(bad)?;
        let r = r.trim().parse().map_err(|_| bad())?;
        let c = c.trim().parse().map_err(|_| bad())?;
        Ok((r, c))
    };
    match spec.split_once(':') {
        Some((a, b)) => Ok((point(a)?, point(b)?)),
        None => {
            let p = point(spec)?;
            Ok((p, p))
        }
    }
}

/// Column identifier first, then zero-based index.
pub fn resolve_column(table: &Table, col: &str) -> Result<usize, CliError> {
    if let Some(index) = table.column_index(col) {
        return Ok(index);
    }
    match col.parse::<usize>() {
        Ok(index) => check_col(table, index).map(|_| index),
        Err(_) => Err(CliError::args(format!("no column '{}'", col))
            .with_hint(format!("columns: {}", table.columns().join(", ")))),
    }
}

fn check_row(table: &Table, row: usize) -> Result<(), CliError> {
    if row < table.row_count() {
        Ok(())
    } else {
        Err(CliError::args(format!(
            "row {} outside table with {} rows",
            row,
            table.row_count()
        )))
    }
}

fn check_col(table: &Table, col: usize) -> Result<(), CliError> {
    if col < table.col_count() {
        Ok(())
    } else {
        Err(CliError::args(format!(
            "column {} outside table with {} columns",
            col,
            table.col_count()
        )))
    }
}
