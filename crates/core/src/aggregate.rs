//! Running statistics over a selected region.

use serde::{Deserialize, Serialize};

use crate::selection::Range;
use crate::table::Table;

/// Which selected cells contribute to `count`.
///
/// Numeric cells always feed `sum`/`average`; the policies only differ on
/// non-numeric text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountPolicy {
    /// Every non-blank cell counts.
    #[default]
    NonEmpty,
    /// Only cells that parse as numbers count.
    NumericOnly,
}

/// Count/sum/average over a selection. Derived on demand, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Aggregate {
    pub count: usize,
    pub numeric_count: usize,
    pub sum: f64,
    pub average: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Aggregate {
    /// Reduce the cells of `bounds`. `None` bounds (no selection) yields zeros.
    pub fn compute(table: &Table, bounds: Option<Range>, policy: CountPolicy) -> Self {
        let Some(bounds) = bounds else {
            return Self::default();
        };

        let mut agg = Self::default();
        for (row, col) in bounds.cells() {
            let value = table.get(row, col);
            if value.is_blank() {
                continue;
            }
            match value.as_number() {
                Some(n) => {
                    agg.count += 1;
                    agg.numeric_count += 1;
                    agg.sum += n;
                    agg.min = Some(agg.min.map_or(n, |m| m.min(n)));
                    agg.max = Some(agg.max.map_or(n, |m| m.max(n)));
                }
                None => {
                    if policy == CountPolicy::NonEmpty {
                        agg.count += 1;
                    }
                }
            }
        }
        if agg.numeric_count > 0 {
            agg.average = agg.sum / agg.numeric_count as f64;
        }
        agg
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Status-bar text, e.g. `Sum: 15 | Count: 3 | Average: 7.50`.
    pub fn readout(&self) -> String {
        format!(
            "Sum: {} | Count: {} | Average: {}",
            format_number(self.sum),
            self.count,
            format_number(self.average)
        )
    }
}

/// Compact number formatting for readouts.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e10 {
        format!("{:.0}", n)
    } else if n.abs() < 0.0001 || n.abs() >= 1e10 {
        format!("{:.2e}", n)
    } else {
        format!("{:.2}", n)
    }
}
