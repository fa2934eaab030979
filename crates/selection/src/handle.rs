//! Grid widget capability.
//!
//! The grid is owned by the host UI. The selection store only ever sees it
//! through this trait, so any widget (or a test double) can sit behind it.

use std::cell::RefCell;
use std::rc::Rc;

use gridmind_core::Range;

/// Operations the store needs from a grid widget.
///
/// Coordinates reported by the widget are signed: widgets use `-1` for
/// header selections and similar, which the store rejects.
pub trait GridHandle {
    /// Current selection as `[start_row, start_col, end_row, end_col]`
    /// quads, primary selection first. `None` or empty means nothing selected.
    fn get_selected(&self) -> Option<Vec<[i64; 4]>>;

    /// Display content of a cell, `None` if empty or out of bounds.
    fn get_data_at_cell(&self, row: usize, col: usize) -> Option<String>;

    /// Full snapshot of the grid, row-major. Optional fast path for large reads.
    fn get_data(&self) -> Option<Vec<Vec<String>>> {
        None
    }

    fn set_data_at_cell(&mut self, row: usize, col: usize, value: &str);

    fn select_cells(&mut self, ranges: &[Range], scroll_to_selection: bool, fire_events: bool);

    fn select_cell(
        &mut self,
        row: usize,
        col: usize,
        end: Option<(usize, usize)>,
        scroll_to_selection: bool,
        fire_events: bool,
    );

    /// Grid size as `(rows, cols)` when the widget has a fixed extent.
    fn dimensions(&self) -> Option<(usize, usize)> {
        None
    }
}

/// Shared handle to the host's grid widget.
///
/// The host keeps the strong reference; the store holds a `Weak` and never
/// keeps the widget alive.
pub type GridRef = Rc<RefCell<dyn GridHandle>>;

/// Grid hooks, forwarded by the host to `SelectionSync`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridEvent {
    /// Selection changed; coordinates as delivered by the widget.
    SelectionChanged { r1: i64, c1: i64, r2: i64, c2: i64 },
    /// Widget cleared its selection (focus loss, programmatic reselect, ...).
    Deselected,
}
