use serde::{Deserialize, Serialize};

/// A selected cell with a snapshot of its content.
///
/// Identity is `(row, col)`. `value` is whatever the grid showed when the
/// selection was taken; the grid stays the source of truth for content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
    #[serde(default)]
    pub value: String,
}

impl Cell {
    pub fn new(row: usize, col: usize, value: impl Into<String>) -> Self {
        Self { row, col, value: value.into() }
    }

    /// Build a cell from signed widget coordinates.
    ///
    /// Grid widgets report `-1` for header clicks and similar; those never
    /// name a real cell, so they are rejected here.
    pub fn from_raw(row: i64, col: i64, value: impl Into<String>) -> Option<Self> {
        let row = usize::try_from(row).ok()?;
        let col = usize::try_from(col).ok()?;
        Some(Self::new(row, col, value))
    }

    pub fn pos(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    /// A1 label of this cell.
    pub fn a1(&self) -> String {
        crate::a1::cell_ref(self.row, self.col)
    }
}
