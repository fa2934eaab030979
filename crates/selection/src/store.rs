//! Authoritative selection state.
//!
//! One store per editing session. It holds the selected cells, a non-owning
//! reference to the grid widget, the command processing flag and the restore
//! guard. Every write onto the shared grid goes through here.
//!
//! The selected cells are an `Rc<[Cell]>` that is swapped out only when an
//! update actually changes something. Consumers can hold on to the `Rc` and
//! use `Rc::ptr_eq` (or `revision()`) to skip recomputing range labels.

use std::rc::{Rc, Weak};
use std::cell::RefCell;
use std::time::Duration;

use gridmind_core::{compress_cells, format_ranges, format_ranges_display, Cell, Range};

use crate::clock::{Clock, RealClock};
use crate::guard::RestoreGuard;
use crate::handle::{GridHandle, GridRef};

/// Selections at least this large are read from one `get_data()` snapshot
/// instead of cell by cell, when the grid offers one.
const SNAPSHOT_MIN_CELLS: usize = 64;

/// Largest selection adopted from a grid that does not report its dimensions.
const MAX_UNBOUNDED_CELLS: usize = 1 << 20;

pub struct SelectionStore<C: Clock = RealClock> {
    cells: Rc<[Cell]>,
    grid: Option<Weak<RefCell<dyn GridHandle>>>,
    processing: bool,
    guard: RestoreGuard,
    revision: u64,
    clock: C,
}

impl SelectionStore<RealClock> {
    /// Create an empty store; `settle` is how long the restore guard stays held.
    pub fn new(settle: Duration) -> Self {
        Self::with_clock(settle, RealClock)
    }
}

impl<C: Clock> SelectionStore<C> {
    /// Create an empty store with a custom clock.
    pub fn with_clock(settle: Duration, clock: C) -> Self {
        Self {
            cells: Rc::from(Vec::new()),
            grid: None,
            processing: false,
            guard: RestoreGuard::new(settle),
            revision: 0,
            clock,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Current selection, in traversal order of the last update.
    pub fn selected_cells(&self) -> Rc<[Cell]> {
        Rc::clone(&self.cells)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Bumped every time the selection is replaced.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn restore_guard(&self) -> &RestoreGuard {
        &self.guard
    }

    /// Whether the restore guard is held right now.
    pub fn is_restoring(&self) -> bool {
        self.guard.is_set(self.clock.now())
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// The held grid, if one is set and the host still has it alive.
    pub fn grid(&self) -> Option<GridRef> {
        self.grid.as_ref().and_then(Weak::upgrade)
    }

    /// Bounding rectangle of the selection.
    pub fn bounding_range(&self) -> Option<Range> {
        Range::bounding(self.cells.iter().map(Cell::pos))
    }

    /// Selection compressed into disjoint ranges.
    pub fn ranges(&self) -> Vec<Range> {
        compress_cells(&self.cells)
    }

    /// A1 labels of the compressed selection, e.g. `["A1:C5", "E2"]`.
    pub fn range_labels(&self) -> Vec<String> {
        format_ranges(&self.cells)
    }

    /// Labels joined for a status display, e.g. `"A1:C5, E2"`.
    pub fn range_display(&self) -> String {
        format_ranges_display(&self.cells)
    }

    // ------------------------------------------------------------------
    // State updates
    // ------------------------------------------------------------------

    /// Hold a (weak) reference to the grid. Selection state is untouched.
    pub fn set_grid_handle(&mut self, grid: &GridRef) {
        self.grid = Some(Rc::downgrade(grid));
    }

    pub fn clear_grid_handle(&mut self) {
        self.grid = None;
    }

    /// The processing flag is advisory: callers must not mutate the
    /// selection or resubmit commands while it is set.
    pub fn set_processing(&mut self, processing: bool) {
        if self.processing != processing {
            log::debug!("selection processing: {}", processing);
        }
        self.processing = processing;
    }

    /// Empty the selection.
    pub fn clear(&mut self) {
        if !self.cells.is_empty() {
            self.replace(Vec::new());
        }
    }

    /// Read the grid's primary selection and adopt it.
    ///
    /// Only the first reported range is used. No grid or no selection clears
    /// the store. Returns true if the stored selection changed.
    pub fn update_from_query(&mut self, grid: Option<&GridRef>) -> bool {
        let Some(grid) = grid else {
            return self.clear_if_changed();
        };

        let selected = match grid.try_borrow() {
            Ok(g) => g.get_selected(),
            Err(_) => {
                log::warn!("grid busy, skipping selection query");
                return false;
            }
        };

        match selected.and_then(|ranges| ranges.into_iter().next()) {
            Some([r1, c1, r2, c2]) => self.update_from_coordinates(Some(grid), r1, c1, r2, c2),
            None => self.clear_if_changed(),
        }
    }

    /// Adopt a selection whose bounds came with a selection event.
    ///
    /// Corners may arrive in any order. Negative coordinates are rejected and
    /// leave the store untouched. Bounds past the grid's reported dimensions
    /// are clipped to it; a range entirely outside the grid, or one larger
    /// than `MAX_UNBOUNDED_CELLS` on a grid without dimensions, is rejected.
    /// Returns true if the stored selection changed.
    pub fn update_from_coordinates(
        &mut self,
        grid: Option<&GridRef>,
        r1: i64,
        c1: i64,
        r2: i64,
        c2: i64,
    ) -> bool {
        let Some(grid) = grid else {
            return self.clear_if_changed();
        };

        let Some(range) = Range::from_raw(r1, c1, r2, c2) else {
            log::debug!("ignoring selection with negative bounds ({}, {}) - ({}, {})", r1, c1, r2, c2);
            return false;
        };

        let candidate = match grid.try_borrow() {
            Ok(g) => {
                let Some(range) = fit_to_grid(&*g, range) else {
                    log::debug!("ignoring selection {} outside the grid", range);
                    return false;
                };
                read_cells(&*g, range)
            }
            Err(_) => {
                log::warn!("grid busy, skipping selection update for {}", range);
                return false;
            }
        };

        self.replace_if_changed(candidate)
    }

    /// Re-select the bounding rectangle of the stored selection on the grid.
    ///
    /// No-op (false) without a live grid, with an empty selection, or while
    /// the restore guard is held. Otherwise takes the guard for one settle
    /// window, so the grid's own deselect/select echo is ignored.
    pub fn restore_selection(&mut self) -> bool {
        let Some(grid) = self.grid() else {
            return false;
        };
        let Some(rect) = self.bounding_range() else {
            return false;
        };

        let Some(token) = self.guard.try_acquire(self.clock.now()) else {
            log::debug!("restore skipped, guard held");
            return false;
        };

        let restored = match grid.try_borrow_mut() {
            Ok(mut g) => {
                g.select_cells(&[rect], false, true);
                log::debug!("restored selection {} (guard generation {})", rect, token.generation());
                true
            }
            Err(_) => {
                // Nothing was sent to the grid, so there is no echo to absorb
                self.guard.release(token);
                log::warn!("grid busy, restore of {} dropped", rect);
                false
            }
        };
        restored
    }

    // ------------------------------------------------------------------
    // Writes onto the grid
    // ------------------------------------------------------------------

    /// Write a value into the held grid. False if there is no live grid.
    pub fn set_cell_value(&self, row: usize, col: usize, value: &str) -> bool {
        self.with_grid_mut(|g| g.set_data_at_cell(row, col, value))
    }

    /// Move the grid's selection to one cell. False if there is no live grid.
    pub fn select_cell(&self, row: usize, col: usize) -> bool {
        self.with_grid_mut(|g| g.select_cell(row, col, None, true, true))
    }

    fn with_grid_mut(&self, f: impl FnOnce(&mut dyn GridHandle)) -> bool {
        let Some(grid) = self.grid() else {
            return false;
        };
        let Ok(mut g) = grid.try_borrow_mut() else {
            log::warn!("grid busy, write dropped");
            return false;
        };
        f(&mut *g);
        true
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn clear_if_changed(&mut self) -> bool {
        if self.cells.is_empty() {
            return false;
        }
        self.replace(Vec::new());
        true
    }

    fn replace_if_changed(&mut self, candidate: Vec<Cell>) -> bool {
        // Slice equality: same length and same (row, col, value) at every index
        if *self.cells == *candidate {
            return false;
        }
        self.replace(candidate);
        true
    }

    fn replace(&mut self, cells: Vec<Cell>) {
        self.cells = Rc::from(cells);
        self.revision += 1;
        log::trace!("selection r{}: {} cell(s)", self.revision, self.cells.len());
    }
}

/// Clip `range` to the grid's extent. Without an extent, only ranges of
/// readable size are accepted.
fn fit_to_grid(grid: &dyn GridHandle, range: Range) -> Option<Range> {
    match grid.dimensions() {
        Some((rows, cols)) => range.clip_to(rows, cols),
        None if range.cell_count() > MAX_UNBOUNDED_CELLS => None,
        None => Some(range),
    }
}

/// Enumerate a rectangle row-major with the grid's current values.
fn read_cells(grid: &dyn GridHandle, range: Range) -> Vec<Cell> {
    let snapshot = if range.cell_count() >= SNAPSHOT_MIN_CELLS {
        grid.get_data()
    } else {
        None
    };

    range
        .cells()
        .map(|(row, col)| {
            let value = match &snapshot {
                Some(data) => data.get(row).and_then(|r| r.get(col)).cloned(),
                None => grid.get_data_at_cell(row, col),
            };
            Cell::new(row, col, value.unwrap_or_default())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeGrid, ManualClock};

    const SETTLE: Duration = Duration::from_millis(100);

    fn store() -> (SelectionStore<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        (SelectionStore::with_clock(SETTLE, clock.clone()), clock)
    }

    fn grid_ref(fake: &Rc<RefCell<FakeGrid>>) -> GridRef {
        fake.clone()
    }

    #[test]
    fn test_update_from_coordinates_enumerates_row_major() {
        let (mut store, _) = store();
        let fake = FakeGrid::new(10, 5).shared();
        fake.borrow_mut().set_value(1, 1, "x");
        let grid = grid_ref(&fake);

        // Corners reversed on purpose
        assert!(store.update_from_coordinates(Some(&grid), 2, 1, 1, 0));
        let cells = store.selected_cells();
        let positions: Vec<_> = cells.iter().map(Cell::pos).collect();
        assert_eq!(positions, vec![(1, 0), (1, 1), (2, 0), (2, 1)]);
        assert_eq!(cells[1].value, "x");
        assert_eq!(store.range_labels(), vec!["A2:B3"]);
    }

    #[test]
    fn test_identical_update_keeps_same_state() {
        let (mut store, _) = store();
        let fake = FakeGrid::new(10, 5).shared();
        let grid = grid_ref(&fake);

        assert!(store.update_from_coordinates(Some(&grid), 0, 0, 1, 1));
        let before = store.selected_cells();
        let rev = store.revision();

        assert!(!store.update_from_coordinates(Some(&grid), 1, 1, 0, 0));
        assert!(Rc::ptr_eq(&before, &store.selected_cells()));
        assert_eq!(store.revision(), rev);
    }

    #[test]
    fn test_value_change_replaces_state() {
        let (mut store, _) = store();
        let fake = FakeGrid::new(10, 5).shared();
        let grid = grid_ref(&fake);

        store.update_from_coordinates(Some(&grid), 0, 0, 0, 1);
        let before = store.selected_cells();
        fake.borrow_mut().set_value(0, 1, "changed");

        assert!(store.update_from_coordinates(Some(&grid), 0, 0, 0, 1));
        assert!(!Rc::ptr_eq(&before, &store.selected_cells()));
        assert_eq!(store.selected_cells()[1].value, "changed");
    }

    #[test]
    fn test_negative_coordinates_ignored() {
        let (mut store, _) = store();
        let fake = FakeGrid::new(10, 5).shared();
        let grid = grid_ref(&fake);

        store.update_from_coordinates(Some(&grid), 0, 0, 0, 0);
        let rev = store.revision();
        assert!(!store.update_from_coordinates(Some(&grid), -1, 0, 3, 3));
        assert_eq!(store.revision(), rev);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_bounds_past_grid_are_clipped() {
        let (mut store, _) = store();
        let fake = FakeGrid::new(20, 10).shared();
        let grid = grid_ref(&fake);

        assert!(store.update_from_coordinates(Some(&grid), 0, 0, 999, 99));
        assert_eq!(store.len(), 200);
        assert_eq!(store.range_labels(), vec!["A1:J20"]);

        // Same clipped rectangle: no new state
        let rev = store.revision();
        assert!(!store.update_from_coordinates(Some(&grid), 0, 0, i64::MAX, i64::MAX));
        assert_eq!(store.revision(), rev);
    }

    #[test]
    fn test_selection_outside_grid_ignored() {
        let (mut store, _) = store();
        let fake = FakeGrid::new(20, 10).shared();
        let grid = grid_ref(&fake);
        store.update_from_coordinates(Some(&grid), 0, 0, 0, 0);

        assert!(!store.update_from_coordinates(Some(&grid), 20, 0, 25, 3));
        assert!(!store.update_from_coordinates(Some(&grid), i64::MAX, i64::MAX, i64::MAX, i64::MAX));
        assert_eq!(store.range_labels(), vec!["A1"]);
    }

    #[test]
    fn test_huge_selection_on_grid_without_dimensions_ignored() {
        let (mut store, _) = store();
        let fake = FakeGrid::new(20, 10).without_dimensions().shared();
        let grid = grid_ref(&fake);

        assert!(!store.update_from_coordinates(Some(&grid), 0, 0, i64::MAX, i64::MAX));
        assert!(store.is_empty());
        assert_eq!(fake.borrow().cell_reads(), 0);

        // Reasonable bounds are still read, blanks past the data included
        assert!(store.update_from_coordinates(Some(&grid), 0, 0, 29, 0));
        assert_eq!(store.len(), 30);
    }

    #[test]
    fn test_absent_grid_clears() {
        let (mut store, _) = store();
        let fake = FakeGrid::new(10, 5).shared();
        let grid = grid_ref(&fake);
        store.update_from_coordinates(Some(&grid), 0, 0, 0, 0);

        assert!(store.update_from_query(None));
        assert!(store.is_empty());
        let rev = store.revision();

        // Already empty: no new state
        assert!(!store.update_from_query(None));
        assert!(!store.update_from_coordinates(None, 0, 0, 1, 1));
        assert_eq!(store.revision(), rev);
    }

    #[test]
    fn test_query_uses_first_range_only() {
        let (mut store, _) = store();
        let fake = FakeGrid::new(10, 10).shared();
        fake.borrow_mut().set_raw_selection(Some(vec![[0, 0, 0, 1], [5, 5, 6, 6]]));
        let grid = grid_ref(&fake);

        assert!(store.update_from_query(Some(&grid)));
        assert_eq!(store.range_labels(), vec!["A1:B1"]);

        fake.borrow_mut().set_raw_selection(None);
        assert!(store.update_from_query(Some(&grid)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_large_selection_uses_snapshot() {
        let (mut store, _) = store();
        let fake = FakeGrid::new(20, 20).with_snapshot(true).shared();
        fake.borrow_mut().set_value(9, 9, "v");
        let grid = grid_ref(&fake);

        store.update_from_coordinates(Some(&grid), 0, 0, 9, 9);
        assert_eq!(store.len(), 100);
        assert_eq!(store.selected_cells()[99].value, "v");
        assert_eq!(fake.borrow().cell_reads(), 0);
        assert_eq!(fake.borrow().snapshot_reads(), 1);
    }

    #[test]
    fn test_restore_selects_bounding_rect() {
        let (mut store, clock) = store();
        let fake = FakeGrid::new(10, 10).shared();
        let grid = grid_ref(&fake);
        store.set_grid_handle(&grid);
        store.update_from_coordinates(Some(&grid), 2, 3, 4, 5);

        assert!(store.restore_selection());
        assert_eq!(fake.borrow().select_calls(), vec![vec![Range::new(2, 3, 4, 5)]]);
        assert!(store.is_restoring());

        // Guard held: second restore is refused
        assert!(!store.restore_selection());
        assert_eq!(fake.borrow().select_calls().len(), 1);

        clock.advance(SETTLE);
        assert!(!store.is_restoring());
        assert!(store.restore_selection());
    }

    #[test]
    fn test_restore_noops() {
        let (mut store, _) = store();
        // No grid
        assert!(!store.restore_selection());

        // Grid but empty selection
        let fake = FakeGrid::new(10, 10).shared();
        let grid = grid_ref(&fake);
        store.set_grid_handle(&grid);
        assert!(!store.restore_selection());
        assert!(fake.borrow().select_calls().is_empty());
        assert_eq!(store.restore_guard().generation(), 0);
    }

    #[test]
    fn test_store_does_not_keep_grid_alive() {
        let (mut store, _) = store();
        let fake = FakeGrid::new(10, 10).shared();
        let grid = grid_ref(&fake);
        store.set_grid_handle(&grid);
        store.update_from_coordinates(Some(&grid), 0, 0, 0, 0);

        drop(grid);
        drop(fake);
        assert!(store.grid().is_none());
        assert!(!store.restore_selection());
        assert!(!store.set_cell_value(0, 0, "x"));
    }

    #[test]
    fn test_clear_and_processing() {
        let (mut store, _) = store();
        let fake = FakeGrid::new(10, 10).shared();
        let grid = grid_ref(&fake);
        store.update_from_coordinates(Some(&grid), 0, 0, 1, 1);

        store.set_processing(true);
        assert!(store.is_processing());
        store.clear();
        assert!(store.is_empty());
        assert!(store.bounding_range().is_none());
        store.set_processing(false);
        assert!(!store.is_processing());
    }

    #[test]
    fn test_writes_go_through_grid() {
        let (mut store, _) = store();
        let fake = FakeGrid::new(10, 10).shared();
        let grid = grid_ref(&fake);
        store.set_grid_handle(&grid);

        assert!(store.set_cell_value(3, 2, "42"));
        assert!(store.select_cell(3, 2));
        assert_eq!(fake.borrow().value(3, 2), "42");
        assert_eq!(fake.borrow().get_selected(), Some(vec![[3, 2, 3, 2]]));
    }
}
