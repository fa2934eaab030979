// Core selection types
//
// Cells, rectangular ranges, A1 labels and the range compressor.
// No grid or UI dependencies: everything here is a pure function of its input.

pub mod a1;
pub mod cell;
pub mod compress;
pub mod range;

pub use a1::{cell_ref, col_to_letter, letter_to_col, parse_cell_ref, parse_range_ref, range_ref};
pub use cell::Cell;
pub use compress::{compress, compress_cells, format_ranges, format_ranges_display};
pub use range::Range;
