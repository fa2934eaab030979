//! Grid event handling and deselect recovery.
//!
//! Grid widgets drop their selection when focus moves elsewhere, and
//! programmatic selection calls often emit deselect-then-select. Restoring
//! on every deselect would loop forever:
//! deselect → restore → (widget) deselect → restore → ...
//!
//! Protocol:
//! 1. `Deselected` while the restore guard is held: ignored, we caused it.
//! 2. Otherwise a check is scheduled for the next `tick()`, tagged with the
//!    guard generation at that moment.
//! 3. On `tick()`: if no restore happened in between and the grid still
//!    reports no selection, restore. The restore takes the guard for the
//!    settle window, which absorbs the widget's echo events.
//!
//! The host calls `tick()` once per turn of its event loop (the equivalent of
//! a microtask), after delivering that turn's grid events.

use std::time::Duration;

use gridmind_config::Settings;

use crate::clock::{Clock, RealClock};
use crate::handle::{GridEvent, GridRef};
use crate::store::SelectionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Re-select the last selection when the grid drops it.
    pub restore_on_deselect: bool,
    /// How long the restore guard stays held after a restore.
    pub settle: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for SyncOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            restore_on_deselect: settings.restore_on_deselect,
            settle: settings.restore_settle(),
        }
    }
}

pub struct SelectionSync<C: Clock = RealClock> {
    store: SelectionStore<C>,
    options: SyncOptions,
    /// Guard generation when a post-deselect check was scheduled.
    pending_check: Option<u64>,
}

impl SelectionSync<RealClock> {
    pub fn new(options: SyncOptions) -> Self {
        Self::with_clock(options, RealClock)
    }
}

impl<C: Clock> SelectionSync<C> {
    pub fn with_clock(options: SyncOptions, clock: C) -> Self {
        Self {
            store: SelectionStore::with_clock(options.settle, clock),
            options,
            pending_check: None,
        }
    }

    pub fn store(&self) -> &SelectionStore<C> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SelectionStore<C> {
        &mut self.store
    }

    pub fn options(&self) -> SyncOptions {
        self.options
    }

    /// Hold `grid` and adopt whatever it currently has selected.
    pub fn attach(&mut self, grid: &GridRef) {
        self.store.set_grid_handle(grid);
        self.pending_check = None;
        self.store.update_from_query(Some(grid));
    }

    /// Forget the grid and the selection that came from it.
    pub fn detach(&mut self) {
        self.store.clear_grid_handle();
        self.store.clear();
        self.pending_check = None;
    }

    pub fn has_pending_check(&self) -> bool {
        self.pending_check.is_some()
    }

    /// Dispatch one grid hook. Returns true if the stored selection changed.
    pub fn handle_event(&mut self, event: GridEvent) -> bool {
        match event {
            GridEvent::SelectionChanged { r1, c1, r2, c2 } => self.on_selection_changed(r1, c1, r2, c2),
            GridEvent::Deselected => {
                self.on_deselected();
                false
            }
        }
    }

    /// Selection-changed hook. Dropped while a command is processing.
    pub fn on_selection_changed(&mut self, r1: i64, c1: i64, r2: i64, c2: i64) -> bool {
        if self.store.is_processing() {
            log::debug!("selection change ignored while processing");
            return false;
        }
        // A fresh selection supersedes any pending recovery
        self.pending_check = None;
        let grid = self.store.grid();
        self.store.update_from_coordinates(grid.as_ref(), r1, c1, r2, c2)
    }

    /// Deselected hook. Schedules a recovery check unless we caused it.
    pub fn on_deselected(&mut self) {
        if !self.options.restore_on_deselect {
            return;
        }
        if self.store.is_restoring() {
            log::trace!("deselect ignored, restore in progress");
            return;
        }
        self.pending_check = Some(self.store.restore_guard().generation());
    }

    /// Run the check scheduled by a deselect, if any.
    /// Returns true if the selection was restored onto the grid.
    pub fn tick(&mut self) -> bool {
        let Some(generation) = self.pending_check.take() else {
            return false;
        };
        if generation != self.store.restore_guard().generation() || self.store.is_restoring() {
            log::trace!("stale deselect check dropped");
            return false;
        }

        let Some(grid) = self.store.grid() else {
            return false;
        };
        let still_selected = match grid.try_borrow() {
            Ok(g) => g.get_selected().is_some_and(|ranges| !ranges.is_empty()),
            // Someone is mid-call on the grid; treat as not our business
            Err(_) => true,
        };
        if still_selected {
            return false;
        }

        self.store.restore_selection()
    }
}
