//! AI command round trip, selection side.
//!
//! `begin_command` turns the current selection into a request and marks the
//! store as processing. The host sends the request however it likes; when the
//! reply arrives (as its own event) it hands it to `finish_command`, which
//! writes results back through the store and resets the session state.
//!
//! Result placement, in order:
//! 1. `targetCell` from the reply
//! 2. the cell right of the selection's bottom-right corner, if empty
//! 3. the cell below that corner, if empty
//! 4. the corner itself
//!
//! `columnResults` formulas go one row below the selection, in their column.

use std::fmt;

use gridmind_core::Range;
use gridmind_protocol::{CommandRequest, CommandResponse};

use crate::clock::Clock;
use crate::context::{ContextLimits, SheetContext};
use crate::handle::GridHandle;
use crate::store::SelectionStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// A command is already in flight.
    Busy,
    /// Command text is blank.
    EmptyCommand,
    /// Nothing is selected.
    EmptySelection,
    /// The grid went away before results could be written.
    NoGrid,
    /// The backend failed or reported failure.
    Backend(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy => write!(f, "a command is already running"),
            Self::EmptyCommand => write!(f, "command is empty"),
            Self::EmptySelection => write!(f, "no cells selected"),
            Self::NoGrid => write!(f, "grid is not available"),
            Self::Backend(msg) => write!(f, "command failed: {msg}"),
        }
    }
}

impl std::error::Error for CommandError {}

/// Cells written back by a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Where the primary result went (and the grid's new selection).
    pub target: Option<(usize, usize)>,
    /// Every cell written, primary result first.
    pub written: Vec<(usize, usize)>,
}

/// Something that can execute a command request synchronously.
pub trait CommandBackend {
    fn execute(&mut self, request: &CommandRequest) -> Result<CommandResponse, String>;
}

/// Build a request from the current selection and mark the store busy.
///
/// With `context` set and a live grid, non-empty sheet cells inside the
/// limits are attached as `sheetContext`.
pub fn begin_command<C: Clock>(
    store: &mut SelectionStore<C>,
    command: &str,
    context: Option<ContextLimits>,
) -> Result<CommandRequest, CommandError> {
    if store.is_processing() {
        return Err(CommandError::Busy);
    }
    let command = command.trim();
    if command.is_empty() {
        return Err(CommandError::EmptyCommand);
    }
    if store.is_empty() {
        return Err(CommandError::EmptySelection);
    }

    let mut request = CommandRequest::new(command, store.selected_cells().to_vec());

    if let (Some(limits), Some(grid)) = (context, store.grid()) {
        let captured = grid.try_borrow().ok().map(|g| SheetContext::capture(&*g, limits));
        match captured {
            Some(ctx) => request = request.with_sheet_context(ctx.cells),
            None => log::warn!("grid busy, sending command without sheet context"),
        }
    }

    store.set_processing(true);
    log::info!(
        "command submitted for {} ({} cells)",
        request.selected_ranges.join(", "),
        request.selected_cells.len()
    );
    Ok(request)
}

/// Apply a backend reply (or transport error) and end the round trip.
///
/// Processing is reset and the selection cleared whatever the outcome.
pub fn finish_command<C: Clock>(
    store: &mut SelectionStore<C>,
    reply: Result<CommandResponse, String>,
) -> Result<CommandOutcome, CommandError> {
    let selection = store.bounding_range();
    let result = match reply {
        Ok(response) if response.success => write_back(store, selection, &response),
        Ok(response) => Err(CommandError::Backend(
            response.error.unwrap_or_else(|| "backend reported failure".to_string()),
        )),
        Err(e) => Err(CommandError::Backend(e)),
    };

    store.clear();
    store.set_processing(false);

    match &result {
        Ok(outcome) => {
            if let Some((row, col)) = outcome.target {
                store.select_cell(row, col);
            }
            log::info!("command finished, {} cell(s) written", outcome.written.len());
        }
        Err(e) => log::warn!("{}", e),
    }
    result
}

/// Begin, execute and finish in one call, for synchronous backends.
pub fn run_command<C: Clock, B: CommandBackend>(
    store: &mut SelectionStore<C>,
    backend: &mut B,
    command: &str,
    context: Option<ContextLimits>,
) -> Result<CommandOutcome, CommandError> {
    let request = begin_command(store, command, context)?;
    let reply = backend.execute(&request);
    finish_command(store, reply)
}

fn write_back<C: Clock>(
    store: &SelectionStore<C>,
    selection: Option<Range>,
    response: &CommandResponse,
) -> Result<CommandOutcome, CommandError> {
    let mut outcome = CommandOutcome::default();
    let has_columns = response.column_results.as_ref().is_some_and(|c| !c.is_empty());
    if response.primary_value().is_none() && !has_columns {
        return Ok(outcome);
    }

    let grid = store.grid().ok_or(CommandError::NoGrid)?;
    let (target, dims) = {
        let g = grid.try_borrow().map_err(|_| CommandError::NoGrid)?;
        let target = match (response.target_cell, selection) {
            (Some(t), _) => Some((t.row, t.col)),
            (None, Some(sel)) => Some(find_result_cell(&*g, sel)),
            (None, None) => None,
        };
        (target, g.dimensions())
    };

    if let (Some(value), Some((row, col))) = (response.primary_value(), target) {
        if store.set_cell_value(row, col, value) {
            outcome.target = Some((row, col));
            outcome.written.push((row, col));
        }
    }

    if let (Some(columns), Some(sel)) = (&response.column_results, selection) {
        let row = sel.end_row + 1;
        for column in columns {
            if dims.is_some_and(|(rows, cols)| row >= rows || column.col >= cols) {
                log::warn!("column result for column {} is off the grid, skipped", column.col);
                continue;
            }
            if store.set_cell_value(row, column.col, &column.formula) {
                outcome.written.push((row, column.col));
            }
        }
    }

    Ok(outcome)
}

/// First empty cell right of, then below, the selection's bottom-right corner.
fn find_result_cell(grid: &dyn GridHandle, selection: Range) -> (usize, usize) {
    let (row, col) = (selection.end_row, selection.end_col);
    let dims = grid.dimensions();
    let is_free = |r: usize, c: usize| {
        let in_bounds = dims.map_or(true, |(rows, cols)| r < rows && c < cols);
        in_bounds && grid.get_data_at_cell(r, c).map_or(true, |v| v.is_empty())
    };

    if is_free(row, col + 1) {
        (row, col + 1)
    } else if is_free(row + 1, col) {
        (row + 1, col)
    } else {
        (row, col)
    }
}
