//! gridsel backend protocol: JSON shapes exchanged with the AI chat backend.
//!
//! Inbound: every backend endpoint (chat, upload, sync, wipe) may carry a
//! `grid_update` holding a full replacement table as `{columns, data}`.
//! Outbound: a chat message plus the current selection descriptor, or `null`.
//!
//! ```ignore
//! use gridsel_protocol::{ChatRequest, BackendResponse};
//!
//! let request = ChatRequest::new("sum column B", &grid);
//! let body = serde_json::to_string(&request)?;
//!
//! let response: BackendResponse = serde_json::from_str(&reply)?;
//! let status = response.apply(&mut grid)?;
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use gridsel_core::{Aggregate, CellValue, Row, SelectionDescriptor, SelectionGrid, Table};

// =============================================================================
// Table payload
// =============================================================================

/// A whole table in row-record form: `{"columns": [...], "data": [{col: value}, ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TablePayload {
    /// Column identifiers in display order. Non-string identifiers (numeric
    /// dataframe headers) are stringified.
    #[serde(deserialize_with = "columns_as_strings")]
    pub columns: Vec<String>,
    #[serde(default)]
    pub data: Vec<Map<String, Value>>,
}

fn columns_as_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|v| match v {
            Value::String(s) => s,
            other => other.to_string(),
        })
        .collect())
}

impl TablePayload {
    /// Convert to a table. Keys without a matching column are kept but never
    /// addressed; columns missing from a record read as empty.
    pub fn into_table(self) -> Table {
        let rows: Vec<Row> = self
            .data
            .into_iter()
            .map(|record| {
                record
                    .into_iter()
                    .map(|(k, v)| (k, CellValue::from(v)))
                    .collect()
            })
            .collect();
        Table::new(self.columns, rows)
    }

    /// Snapshot a table in payload form. Only addressed columns are written;
    /// empty cells are written as `""`.
    pub fn from_table(table: &Table) -> Self {
        let columns = table.columns().to_vec();
        let data = (0..table.row_count())
            .map(|r| {
                columns
                    .iter()
                    .enumerate()
                    .map(|(c, id)| (id.clone(), Value::from(table.get(r, c).clone())))
                    .collect()
            })
            .collect();
        Self { columns, data }
    }
}

// =============================================================================
// Client → Backend
// =============================================================================

/// Natural-language request with the current selection as context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Serialized as `null` when nothing is selected.
    pub selection: Option<SelectionDescriptor>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>, grid: &SelectionGrid) -> Self {
        Self {
            message: message.into(),
            selection: grid.to_external_descriptor(),
        }
    }
}

// =============================================================================
// Backend → Client
// =============================================================================

/// Reply from any backend endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendResponse {
    /// Chat/sync reply text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    /// Upload acknowledgement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_update: Option<TablePayload>,
}

impl BackendResponse {
    /// Replace the grid's table if the response carries one.
    ///
    /// Returns the status text to show, or the backend's error. An error
    /// response never touches the grid.
    pub fn apply(self, grid: &mut SelectionGrid) -> Result<Option<String>, String> {
        if let Some(error) = self.error {
            log::warn!("backend reported error: {}", error);
            return Err(error);
        }
        if let Some(update) = self.grid_update {
            log::debug!(
                "applying grid update: {} columns, {} rows",
                update.columns.len(),
                update.data.len()
            );
            grid.replace_table(update.into_table());
        }
        Ok(self.response.or(self.message))
    }
}

// =============================================================================
// Status report
// =============================================================================

/// What a status bar or headless consumer reads after a selection change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionReport {
    pub revision: u64,
    pub readout: String,
    pub aggregate: Aggregate,
    pub selection: Option<SelectionDescriptor>,
}

impl SelectionReport {
    pub fn from_grid(grid: &SelectionGrid) -> Self {
        let aggregate = grid.compute_aggregate();
        Self {
            revision: grid.revision(),
            readout: aggregate.readout(),
            aggregate,
            selection: grid.to_external_descriptor(),
        }
    }
}
