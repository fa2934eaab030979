//! GridMind AI Command Payload
//!
//! This crate defines the JSON shapes exchanged with the AI command backend.
//! Only the selection side of the contract lives here: which cells the user
//! selected going out, and where results should be written coming back. What
//! the backend does with a command is not modelled.
//!
//! Field names are camelCase on the wire.
//!
//! # Usage
//!
//! ```ignore
//! use gridmind_protocol::{CommandRequest, CommandResponse};
//!
//! let req = CommandRequest::new("sum these", cells);
//! let body = serde_json::to_string(&req)?;
//!
//! let resp: CommandResponse = serde_json::from_str(&reply)?;
//! ```

use gridmind_core::{format_ranges, Cell};
use serde::{Deserialize, Serialize};

/// Path the backend serves command execution on.
pub const EXECUTE_PATH: &str = "/api/excel/execute";

// =============================================================================
// Client → Backend
// =============================================================================

/// A command issued against the current selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRequest {
    pub command: String,
    pub selected_cells: Vec<Cell>,
    /// Extra non-empty cells around the selection, when enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_context: Option<Vec<ContextCell>>,
    /// Compressed A1 labels of `selected_cells`, e.g. `["A1:C5", "E2"]`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selected_ranges: Vec<String>,
}

impl CommandRequest {
    /// Build a request and annotate it with the compressed range labels.
    pub fn new(command: impl Into<String>, selected_cells: Vec<Cell>) -> Self {
        let selected_ranges = format_ranges(&selected_cells);
        Self {
            command: command.into(),
            selected_cells,
            sheet_context: None,
            selected_ranges,
        }
    }

    pub fn with_sheet_context(mut self, context: Vec<ContextCell>) -> Self {
        self.sheet_context = Some(context);
        self
    }
}

/// A cell of surrounding sheet content sent for context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextCell {
    pub row: usize,
    pub col: usize,
    pub value: String,
}

// =============================================================================
// Backend → Client
// =============================================================================

/// Backend reply to a [`CommandRequest`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_results: Option<Vec<ColumnResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Where the backend wants the result written. When absent the client
    /// picks an empty cell next to the selection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_cell: Option<CellTarget>,
}

impl CommandResponse {
    /// Successful reply carrying a single result value.
    pub fn ok(result: impl Into<String>) -> Self {
        Self {
            success: true,
            result: Some(result.into()),
            ..Self::default()
        }
    }

    /// Failed reply with an error message.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// The value to write at the target cell: the result, else the formula.
    pub fn primary_value(&self) -> Option<&str> {
        self.result.as_deref().or(self.formula.as_deref())
    }
}

/// A formula to apply to one column of the selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnResult {
    pub col: usize,
    pub formula: String,
}

/// 0-indexed cell position chosen by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellTarget {
    pub row: usize,
    pub col: usize,
}
