// Sheet context capture
//
// Collects non-empty cells from the grid to send alongside a command.
// Caps the window to keep request size (and token usage) bounded.

use gridmind_config::AISettings;
use gridmind_protocol::ContextCell;

use crate::handle::GridHandle;

/// Maximum window of sheet context, anchored at A1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextLimits {
    pub max_rows: usize,
    pub max_cols: usize,
}

impl Default for ContextLimits {
    fn default() -> Self {
        Self::from(&AISettings::default())
    }
}

impl From<&AISettings> for ContextLimits {
    fn from(ai: &AISettings) -> Self {
        Self {
            max_rows: ai.max_context_rows,
            max_cols: ai.max_context_cols,
        }
    }
}

/// Non-empty cells captured from the grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetContext {
    pub cells: Vec<ContextCell>,
    /// Content existed outside the captured window.
    pub truncated: bool,
}

impl SheetContext {
    /// Capture the top-left `max_rows × max_cols` window of the grid.
    ///
    /// Uses the grid snapshot when available, otherwise reads cell by cell
    /// within the grid's dimensions. A grid offering neither yields nothing.
    pub fn capture(grid: &dyn GridHandle, limits: ContextLimits) -> Self {
        let mut context = SheetContext::default();

        if let Some(data) = grid.get_data() {
            for (row, values) in data.iter().enumerate() {
                for (col, value) in values.iter().enumerate() {
                    if value.is_empty() {
                        continue;
                    }
                    if row >= limits.max_rows || col >= limits.max_cols {
                        context.truncated = true;
                        continue;
                    }
                    context.cells.push(ContextCell { row, col, value: value.clone() });
                }
            }
        } else if let Some((rows, cols)) = grid.dimensions() {
            context.truncated = rows > limits.max_rows || cols > limits.max_cols;
            for row in 0..rows.min(limits.max_rows) {
                for col in 0..cols.min(limits.max_cols) {
                    if let Some(value) = grid.get_data_at_cell(row, col).filter(|v| !v.is_empty()) {
                        context.cells.push(ContextCell { row, col, value });
                    }
                }
            }
        }

        if context.truncated {
            log::debug!(
                "sheet context truncated to {}x{} ({} cells kept)",
                limits.max_rows, limits.max_cols, context.cells.len()
            );
        }
        context
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
