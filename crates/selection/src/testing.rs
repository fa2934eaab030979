//! Test doubles for selection sync.
//!
//! `FakeGrid` behaves like a typical grid widget: user actions and
//! programmatic selects queue hook events instead of calling back into the
//! store, and the test decides when to deliver them (see [`pump`]).
//! `ManualClock` only moves when told to.

use std::cell::{Cell as StdCell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use gridmind_core::Range;

use crate::clock::Clock;
use crate::handle::{GridEvent, GridHandle};
use crate::sync::SelectionSync;

/// Mock clock for deterministic testing.
/// Clones share the same offset, so a test can keep one and hand one out.
#[derive(Debug, Clone)]
pub struct ManualClock {
    base: Instant,
    offset_nanos: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset_nanos: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn advance(&self, duration: Duration) {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.offset_nanos.fetch_add(nanos, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let offset = Duration::from_nanos(self.offset_nanos.load(Ordering::SeqCst));
        self.base + offset
    }
}

/// In-memory grid widget.
#[derive(Debug)]
pub struct FakeGrid {
    rows: usize,
    cols: usize,
    data: Vec<Vec<String>>,
    selection: Option<Vec<[i64; 4]>>,
    events: VecDeque<GridEvent>,
    select_calls: Vec<Vec<Range>>,
    snapshot: bool,
    report_dimensions: bool,
    cell_reads: StdCell<usize>,
    snapshot_reads: StdCell<usize>,
}

impl FakeGrid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![vec![String::new(); cols]; rows],
            selection: None,
            events: VecDeque::new(),
            select_calls: Vec::new(),
            snapshot: false,
            report_dimensions: true,
            cell_reads: StdCell::new(0),
            snapshot_reads: StdCell::new(0),
        }
    }

    /// Offer (or not) the `get_data()` snapshot fast path.
    pub fn with_snapshot(mut self, enabled: bool) -> Self {
        self.snapshot = enabled;
        self
    }

    /// Stop reporting `dimensions()`, like a widget with virtual rows.
    pub fn without_dimensions(mut self) -> Self {
        self.report_dimensions = false;
        self
    }

    pub fn shared(self) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(self))
    }

    /// Set content directly, without events.
    pub fn set_value(&mut self, row: usize, col: usize, value: &str) {
        if let Some(cell) = self.data.get_mut(row).and_then(|r| r.get_mut(col)) {
            *cell = value.to_string();
        }
    }

    pub fn value(&self, row: usize, col: usize) -> &str {
        self.data
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Replace the reported selection without events.
    pub fn set_raw_selection(&mut self, selection: Option<Vec<[i64; 4]>>) {
        self.selection = selection;
    }

    /// User drags or clicks: selection changes and a hook event is queued.
    pub fn user_select(&mut self, r1: i64, c1: i64, r2: i64, c2: i64) {
        self.selection = Some(vec![[r1, c1, r2, c2]]);
        self.events.push_back(GridEvent::SelectionChanged { r1, c1, r2, c2 });
    }

    /// Focus leaves the grid: selection is dropped and a hook event is queued.
    pub fn user_deselect(&mut self) {
        self.selection = None;
        self.events.push_back(GridEvent::Deselected);
    }

    pub fn drain_events(&mut self) -> Vec<GridEvent> {
        self.events.drain(..).collect()
    }

    /// Ranges passed to each `select_cells` call, in order.
    pub fn select_calls(&self) -> Vec<Vec<Range>> {
        self.select_calls.clone()
    }

    pub fn cell_reads(&self) -> usize {
        self.cell_reads.get()
    }

    pub fn snapshot_reads(&self) -> usize {
        self.snapshot_reads.get()
    }

    fn programmatic_select(&mut self, range: Range, fire_events: bool) {
        let quad = [
            range.start_row as i64,
            range.start_col as i64,
            range.end_row as i64,
            range.end_col as i64,
        ];
        self.selection = Some(vec![quad]);
        if fire_events {
            // Widgets clear the old selection before applying the new one
            self.events.push_back(GridEvent::Deselected);
            self.events.push_back(GridEvent::SelectionChanged {
                r1: quad[0],
                c1: quad[1],
                r2: quad[2],
                c2: quad[3],
            });
        }
    }
}

impl GridHandle for FakeGrid {
    fn get_selected(&self) -> Option<Vec<[i64; 4]>> {
        self.selection.clone()
    }

    fn get_data_at_cell(&self, row: usize, col: usize) -> Option<String> {
        self.cell_reads.set(self.cell_reads.get() + 1);
        let value = self.data.get(row)?.get(col)?;
        (!value.is_empty()).then(|| value.clone())
    }

    fn get_data(&self) -> Option<Vec<Vec<String>>> {
        if !self.snapshot {
            return None;
        }
        self.snapshot_reads.set(self.snapshot_reads.get() + 1);
        Some(self.data.clone())
    }

    fn set_data_at_cell(&mut self, row: usize, col: usize, value: &str) {
        self.set_value(row, col, value);
    }

    fn select_cells(&mut self, ranges: &[Range], _scroll_to_selection: bool, fire_events: bool) {
        self.select_calls.push(ranges.to_vec());
        if let Some(first) = ranges.first() {
            self.programmatic_select(*first, fire_events);
        }
    }

    fn select_cell(
        &mut self,
        row: usize,
        col: usize,
        end: Option<(usize, usize)>,
        _scroll_to_selection: bool,
        fire_events: bool,
    ) {
        let (end_row, end_col) = end.unwrap_or((row, col));
        self.programmatic_select(Range::new(row, col, end_row, end_col), fire_events);
    }

    fn dimensions(&self) -> Option<(usize, usize)> {
        self.report_dimensions.then_some((self.rows, self.cols))
    }
}

/// Deliver every queued grid event to `sync`. Returns how many were delivered.
pub fn pump<C: Clock>(sync: &mut SelectionSync<C>, grid: &Rc<RefCell<FakeGrid>>) -> usize {
    let events = grid.borrow_mut().drain_events();
    let count = events.len();
    for event in events {
        sync.handle_event(event);
    }
    count
}
