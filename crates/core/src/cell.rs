use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single cell value as received from the data source.
///
/// Numeric-ness is decided by parsing, not by the stored variant: a `Text("10")`
/// sums the same as a `Number(10.0)`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    /// True for empty cells and whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Number(_) => false,
            CellValue::Text(s) => s.trim().is_empty(),
        }
    }

    /// Locale-invariant numeric reading of the cell.
    ///
    /// Text must parse in full (`.` as decimal separator); `NaN` and infinities
    /// never count as numbers.
    pub fn as_number(&self) -> Option<f64> {
        let n = match self {
            CellValue::Empty => return None,
            CellValue::Number(n) => *n,
            CellValue::Text(s) => parse_decimal(s)?,
        };
        n.is_finite().then_some(n)
    }

    pub fn is_numeric(&self) -> bool {
        self.as_number().is_some()
    }

    /// Text shown in a cell or written by an exporter.
    pub fn display(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{:.0}", n)
                } else {
                    n.to_string()
                }
            }
            CellValue::Text(s) => s.clone(),
        }
    }
}

fn parse_decimal(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    // Rust's float grammar accepts "inf"/"nan" spellings; spreadsheets treat those as text.
    let has_digit = trimmed.bytes().any(|b| b.is_ascii_digit());
    if !has_digit {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

impl From<Value> for CellValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => CellValue::Empty,
            Value::Bool(b) => CellValue::Text(b.to_string()),
            Value::Number(n) => match n.as_f64() {
                Some(f) => CellValue::Number(f),
                None => CellValue::Text(n.to_string()),
            },
            Value::String(s) => CellValue::Text(s),
            other => CellValue::Text(other.to_string()),
        }
    }
}

impl From<CellValue> for Value {
    fn from(cell: CellValue) -> Self {
        match cell {
            CellValue::Empty => Value::String(String::new()),
            CellValue::Number(n) => serde_json::Number::from_f64(n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            CellValue::Text(s) => Value::String(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}
