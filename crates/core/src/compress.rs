//! Selection compression: cells to rectangular A1 ranges.
//!
//! Converts an arbitrary set of selected cells into an ordered list of
//! disjoint rectangles that covers the set exactly.
//!
//! Algorithm (greedy maximal rectangle, row-major):
//! 1. Sort positions by (row, col) and dedup
//! 2. For each position not yet covered, grow a horizontal run to the right
//! 3. Grow the run downward while the whole column span is selected
//! 4. Emit the rectangle and mark its cells covered
//!
//! Growth only ever consumes cells that are selected *and* not yet covered
//! by an earlier rectangle. Without that, a staircase selection such as
//! `A1:B2 + C2:C3 + B3` lets the run starting at `B3` grow into `C3`.
//!
//! Guarantees:
//! - Coverage: the union of the output is exactly the input set
//! - Disjoint: every cell lands in exactly one range
//! - Determinism: same set (any order, any duplicates) gives the same output
//!
//! Not guaranteed: minimality. An L-shape or checkerboard can split into
//! more ranges than an exact minimum rectangle cover, which is an NP-hard
//! set-cover variant. The output is for display and AI context annotation,
//! where a few extra ranges are harmless, so the O(n·k) greedy pass is kept.

use rustc_hash::FxHashSet;

use crate::a1::range_ref;
use crate::cell::Cell;
use crate::range::Range;

/// Compress selected positions into disjoint rectangles, row-major by top-left corner.
///
/// # Performance
/// - Time: O(n log n) for the sort plus O(n·k) for growth, where k is the
///   width of the widest run
/// - Space: O(n) for the lookup and covered sets
pub fn compress<I>(positions: I) -> Vec<Range>
where
    I: IntoIterator<Item = (usize, usize)>,
{
    let mut sorted: Vec<(usize, usize)> = positions.into_iter().collect();
    if sorted.is_empty() {
        return Vec::new();
    }

    sorted.sort_unstable();
    sorted.dedup();

    let selected: FxHashSet<(usize, usize)> = sorted.iter().copied().collect();
    let mut covered: FxHashSet<(usize, usize)> =
        FxHashSet::with_capacity_and_hasher(sorted.len(), Default::default());

    let available = |covered: &FxHashSet<(usize, usize)>, pos: (usize, usize)| {
        selected.contains(&pos) && !covered.contains(&pos)
    };

    let mut ranges = Vec::new();

    for &(row, col) in &sorted {
        if covered.contains(&(row, col)) {
            continue;
        }

        // Horizontal run; a run cannot grow past the last addressable column
        let mut end_col = col;
        while let Some(next) = end_col.checked_add(1) {
            if !available(&covered, (row, next)) {
                break;
            }
            end_col = next;
        }

        // Vertical growth: the next row must be available across the whole span
        let mut end_row = row;
        while let Some(next) = end_row.checked_add(1) {
            if !(col..=end_col).all(|c| available(&covered, (next, c))) {
                break;
            }
            end_row = next;
        }

        let range = Range::new(row, col, end_row, end_col);
        covered.extend(range.cells());
        ranges.push(range);
    }

    ranges
}

/// Compress a list of selected cells (values are ignored).
pub fn compress_cells(cells: &[Cell]) -> Vec<Range> {
    compress(cells.iter().map(Cell::pos))
}

/// A1 labels for the compressed selection, e.g. `["A1:C5", "E2"]`.
pub fn format_ranges(cells: &[Cell]) -> Vec<String> {
    compress_cells(cells).iter().map(range_ref).collect()
}

/// Human-readable form of [`format_ranges`]: labels joined with `", "`.
pub fn format_ranges_display(cells: &[Cell]) -> String {
    format_ranges(cells).join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(positions: &[(usize, usize)]) -> Vec<Cell> {
        positions.iter().map(|&(r, c)| Cell::new(r, c, "")).collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(compress(Vec::new()).is_empty());
        assert!(format_ranges(&[]).is_empty());
        assert_eq!(format_ranges_display(&[]), "");
    }

    #[test]
    fn test_single_cell() {
        assert_eq!(format_ranges(&cells(&[(4, 2)])), vec!["C5"]);
    }

    #[test]
    fn test_full_rectangle() {
        let input = cells(&[(0, 0), (0, 1), (1, 0), (1, 1), (2, 0), (2, 1)]);
        assert_eq!(format_ranges(&input), vec!["A1:B3"]);
    }

    #[test]
    fn test_disjoint_pair_row_major() {
        // Input order must not matter
        let input = cells(&[(5, 5), (0, 0)]);
        assert_eq!(format_ranges(&input), vec!["A1", "F6"]);
    }

    #[test]
    fn test_horizontal_and_vertical_runs() {
        assert_eq!(compress(vec![(0, 0), (0, 1), (0, 2), (0, 3)]), vec![Range::new(0, 0, 0, 3)]);
        assert_eq!(compress(vec![(0, 0), (1, 0), (2, 0), (3, 0)]), vec![Range::new(0, 0, 3, 0)]);
    }

    #[test]
    fn test_two_blocks() {
        // A1:B2 and D4:E5
        let input = cells(&[
            (0, 0), (0, 1), (1, 0), (1, 1),
            (3, 3), (3, 4), (4, 3), (4, 4),
        ]);
        assert_eq!(format_ranges(&input), vec!["A1:B2", "D4:E5"]);
        assert_eq!(format_ranges_display(&input), "A1:B2, D4:E5");
    }

    #[test]
    fn test_l_shape_is_not_minimal() {
        // Vertical arm A1:A3, horizontal arm A3:C3. Greedy takes the column
        // first and leaves the rest of the arm as a second range.
        let input = cells(&[(0, 0), (1, 0), (2, 0), (2, 1), (2, 2)]);
        assert_eq!(format_ranges(&input), vec!["A1:A3", "B3:C3"]);
    }

    #[test]
    fn test_staircase_stays_disjoint() {
        // Row 0: A B, row 1: A B C, row 2: B C
        let input = cells(&[(0, 0), (0, 1), (1, 0), (1, 1), (1, 2), (2, 1), (2, 2)]);
        let ranges = compress_cells(&input);
        assert_eq!(format_ranges(&input), vec!["A1:B2", "C2:C3", "B3"]);

        for (i, a) in ranges.iter().enumerate() {
            for b in &ranges[i + 1..] {
                assert!(!a.intersects(b), "{} overlaps {}", a, b);
            }
        }
    }

    #[test]
    fn test_checkerboard_splits_into_singles() {
        let mut positions = Vec::new();
        for r in 0..4 {
            for c in 0..4 {
                if (r + c) % 2 == 0 {
                    positions.push((r, c));
                }
            }
        }
        let ranges = compress(positions);
        assert_eq!(ranges.len(), 8);
        assert!(ranges.iter().all(Range::is_single));
    }

    #[test]
    fn test_duplicate_cells_handled() {
        let input = cells(&[(0, 0), (0, 0), (0, 1)]);
        assert_eq!(format_ranges(&input), vec!["A1:B1"]);
    }

    #[test]
    fn test_values_do_not_affect_output() {
        let a = vec![Cell::new(0, 0, "x"), Cell::new(0, 1, "y")];
        let b = vec![Cell::new(0, 1, ""), Cell::new(0, 0, "")];
        assert_eq!(format_ranges(&a), format_ranges(&b));
    }

    #[test]
    fn test_wide_columns() {
        let input = cells(&[(0, 25), (0, 26), (1, 25), (1, 26)]);
        assert_eq!(format_ranges(&input), vec!["Z1:AA2"]);
    }

    #[test]
    fn test_cells_at_coordinate_limit() {
        assert_eq!(compress(vec![(usize::MAX, 0)]), vec![Range::single(usize::MAX, 0)]);
        assert_eq!(compress(vec![(0, usize::MAX)]), vec![Range::single(0, usize::MAX)]);

        let corner = vec![
            (usize::MAX - 1, usize::MAX - 1), (usize::MAX - 1, usize::MAX),
            (usize::MAX, usize::MAX - 1), (usize::MAX, usize::MAX),
        ];
        assert_eq!(compress(corner), vec![Range::new(usize::MAX - 1, usize::MAX - 1, usize::MAX, usize::MAX)]);

        let labels = format_ranges(&cells(&[(usize::MAX, 0)]));
        assert_eq!(labels, vec![format!("A{}", usize::MAX as u128 + 1)]);
    }
}
