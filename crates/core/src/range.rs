use serde::{Deserialize, Serialize};

/// A rectangular range of cells, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Range {
    pub start_row: usize,
    pub start_col: usize,
    pub end_row: usize,
    pub end_col: usize,
}

impl Range {
    /// Create a new range, automatically normalizing so start <= end.
    pub fn new(r1: usize, c1: usize, r2: usize, c2: usize) -> Self {
        Self {
            start_row: r1.min(r2),
            start_col: c1.min(c2),
            end_row: r1.max(r2),
            end_col: c1.max(c2),
        }
    }

    /// Create a single-cell range.
    pub fn single(row: usize, col: usize) -> Self {
        Self {
            start_row: row,
            start_col: col,
            end_row: row,
            end_col: col,
        }
    }

    /// Create a range from signed widget coordinates, in any corner order.
    /// Returns `None` if any coordinate is negative.
    pub fn from_raw(r1: i64, c1: i64, r2: i64, c2: i64) -> Option<Self> {
        let r1 = usize::try_from(r1).ok()?;
        let c1 = usize::try_from(c1).ok()?;
        let r2 = usize::try_from(r2).ok()?;
        let c2 = usize::try_from(c2).ok()?;
        Some(Self::new(r1, c1, r2, c2))
    }

    /// Smallest range covering every position, or `None` if there are none.
    pub fn bounding<I>(positions: I) -> Option<Self>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut iter = positions.into_iter();
        let (row, col) = iter.next()?;
        let mut range = Self::single(row, col);
        for (r, c) in iter {
            range.start_row = range.start_row.min(r);
            range.start_col = range.start_col.min(c);
            range.end_row = range.end_row.max(r);
            range.end_col = range.end_col.max(c);
        }
        Some(range)
    }

    /// Check if this range contains a cell.
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row >= self.start_row && row <= self.end_row &&
        col >= self.start_col && col <= self.end_col
    }

    /// Check if two ranges share at least one cell.
    pub fn intersects(&self, other: &Range) -> bool {
        self.start_row <= other.end_row && other.start_row <= self.end_row &&
        self.start_col <= other.end_col && other.start_col <= self.end_col
    }

    /// Saturates at `usize::MAX` for a range spanning every row.
    pub fn rows(&self) -> usize {
        (self.end_row - self.start_row).saturating_add(1)
    }

    /// Saturates at `usize::MAX` for a range spanning every column.
    pub fn cols(&self) -> usize {
        (self.end_col - self.start_col).saturating_add(1)
    }

    /// Number of cells in this range, saturating at `usize::MAX`.
    pub fn cell_count(&self) -> usize {
        self.rows().saturating_mul(self.cols())
    }

    /// The part of this range inside a `rows × cols` grid, or `None` if the
    /// two do not overlap.
    pub fn clip_to(&self, rows: usize, cols: usize) -> Option<Self> {
        if self.start_row >= rows || self.start_col >= cols {
            return None;
        }
        Some(Self {
            start_row: self.start_row,
            start_col: self.start_col,
            end_row: self.end_row.min(rows - 1),
            end_col: self.end_col.min(cols - 1),
        })
    }

    /// Iterate over all cells in this range (row-major order).
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> {
        let start_col = self.start_col;
        let end_col = self.end_col;

        (self.start_row..=self.end_row).flat_map(move |r| {
            (start_col..=end_col).map(move |c| (r, c))
        })
    }

    /// Check if this is a single cell.
    pub fn is_single(&self) -> bool {
        self.start_row == self.end_row && self.start_col == self.end_col
    }

    /// A1 label (`C5` or `A1:B3`).
    pub fn a1(&self) -> String {
        crate::a1::range_ref(self)
    }
}

impl std::fmt::Display for Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.a1())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_single() {
        let r = Range::single(5, 3);
        assert!(r.contains(5, 3));
        assert!(!r.contains(5, 4));
        assert!(r.is_single());
        assert_eq!(r.cell_count(), 1);
    }

    #[test]
    fn test_range_multi() {
        let r = Range::new(1, 1, 3, 2);
        assert!(r.contains(1, 1));
        assert!(r.contains(2, 2));
        assert!(r.contains(3, 1));
        assert!(!r.contains(0, 0));
        assert!(!r.is_single());
        assert_eq!(r.cell_count(), 6); // 3 rows x 2 cols
        assert_eq!(r.cells().collect::<Vec<_>>(), vec![
            (1, 1), (1, 2), (2, 1), (2, 2), (3, 1), (3, 2),
        ]);
    }

    #[test]
    fn test_range_normalizes() {
        let r = Range::new(5, 5, 1, 1);
        assert_eq!(r.start_row, 1);
        assert_eq!(r.start_col, 1);
        assert_eq!(r.end_row, 5);
        assert_eq!(r.end_col, 5);
    }

    #[test]
    fn test_from_raw() {
        assert_eq!(Range::from_raw(3, 2, 0, 0), Some(Range::new(0, 0, 3, 2)));
        assert_eq!(Range::from_raw(-1, 0, 3, 3), None);
        assert_eq!(Range::from_raw(0, 0, 3, -1), None);
    }

    #[test]
    fn test_bounding() {
        assert_eq!(Range::bounding(std::iter::empty()), None);
        let r = Range::bounding(vec![(4, 1), (0, 3), (2, 2)]).unwrap();
        assert_eq!(r, Range::new(0, 1, 4, 3));
    }

    #[test]
    fn test_intersects() {
        let a = Range::new(0, 0, 2, 2);
        assert!(a.intersects(&Range::new(2, 2, 4, 4)));
        assert!(!a.intersects(&Range::new(3, 0, 4, 4)));
    }

    #[test]
    fn test_cell_count_saturates() {
        let all = Range::new(0, 0, usize::MAX, usize::MAX);
        assert_eq!(all.rows(), usize::MAX);
        assert_eq!(all.cell_count(), usize::MAX);
        assert_eq!(Range::new(0, 0, usize::MAX, 0).cell_count(), usize::MAX);
    }

    #[test]
    fn test_clip_to() {
        let r = Range::new(2, 1, 999, 99);
        assert_eq!(r.clip_to(20, 10), Some(Range::new(2, 1, 19, 9)));
        assert_eq!(Range::new(1, 1, 2, 2).clip_to(20, 10), Some(Range::new(1, 1, 2, 2)));
        assert_eq!(Range::new(20, 0, 25, 3).clip_to(20, 10), None);
        assert_eq!(Range::new(0, 10, 0, 12).clip_to(20, 10), None);
        assert_eq!(Range::single(0, 0).clip_to(0, 0), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Range::new(0, 0, 2, 1).to_string(), "A1:B3");
        assert_eq!(Range::single(4, 2).to_string(), "C5");
    }
}
