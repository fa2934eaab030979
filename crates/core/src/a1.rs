//! A1 notation: column letters, cell references and range references.
//!
//! Column letters use bijective base-26: there is no zero digit, so after
//! `Z` comes `AA`, after `ZZ` comes `AAA`. Rows are 1-based on display and
//! 0-based everywhere else.

use crate::range::Range;

/// Convert 0-indexed column to letter (0 = A, 25 = Z, 26 = AA, etc.)
pub fn col_to_letter(col: usize) -> String {
    let mut result = String::new();
    let mut n = col;
    loop {
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        // The -1 is what makes this bijective: "A" after a carry means 0, not 1.
        n = n / 26 - 1;
    }
    result
}

/// Convert column letters back to a 0-indexed column.
///
/// Case-insensitive. Returns `None` for an empty string, any non-letter, or a
/// label too long to fit in `usize`.
pub fn letter_to_col(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    let mut n: usize = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let digit = (ch.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        n = n.checked_mul(26)?.checked_add(digit)?;
    }
    Some(n - 1)
}

/// Format cell reference in A1 notation
pub fn cell_ref(row: usize, col: usize) -> String {
    // Widened so the last addressable row still has a 1-based label
    format!("{}{}", col_to_letter(col), row as u128 + 1)
}

/// Format range in A1 notation (`C5` for a single cell, `A1:B3` otherwise)
pub fn range_ref(range: &Range) -> String {
    if range.is_single() {
        cell_ref(range.start_row, range.start_col)
    } else {
        format!(
            "{}:{}",
            cell_ref(range.start_row, range.start_col),
            cell_ref(range.end_row, range.end_col)
        )
    }
}

/// Parse a cell reference like `C5` into 0-indexed `(row, col)`.
///
/// `$` anchors are accepted and ignored. Row `0` is rejected.
pub fn parse_cell_ref(s: &str) -> Option<(usize, usize)> {
    let s = s.trim();
    let s = s.strip_prefix('$').unwrap_or(s);
    let split = s.find(|c: char| !c.is_ascii_alphabetic())?;
    let (letters, rest) = s.split_at(split);
    let rest = rest.strip_prefix('$').unwrap_or(rest);
    if rest.is_empty() || !rest.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let col = letter_to_col(letters)?;
    let row: usize = rest.parse().ok()?;
    if row == 0 {
        return None;
    }
    Some((row - 1, col))
}

/// Parse `A1:B3` or a single cell `C5` into a normalized range.
pub fn parse_range_ref(s: &str) -> Option<Range> {
    match s.split_once(':') {
        Some((start, end)) => {
            let (r1, c1) = parse_cell_ref(start)?;
            let (r2, c2) = parse_cell_ref(end)?;
            Some(Range::new(r1, c1, r2, c2))
        }
        None => {
            let (row, col) = parse_cell_ref(s)?;
            Some(Range::single(row, col))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_col_to_letter_boundaries() {
        assert_eq!(col_to_letter(0), "A");
        assert_eq!(col_to_letter(25), "Z");
        assert_eq!(col_to_letter(26), "AA");
        assert_eq!(col_to_letter(51), "AZ");
        assert_eq!(col_to_letter(52), "BA");
        assert_eq!(col_to_letter(701), "ZZ");
        assert_eq!(col_to_letter(702), "AAA");
        assert_eq!(col_to_letter(16383), "XFD"); // Excel's last column
    }

    #[test]
    fn test_letter_to_col() {
        assert_eq!(letter_to_col("A"), Some(0));
        assert_eq!(letter_to_col("z"), Some(25));
        assert_eq!(letter_to_col("AA"), Some(26));
        assert_eq!(letter_to_col("ZZ"), Some(701));
        assert_eq!(letter_to_col("AAA"), Some(702));
        assert_eq!(letter_to_col(""), None);
        assert_eq!(letter_to_col("A1"), None);
        assert_eq!(letter_to_col(&"Z".repeat(40)), None);
    }

    #[test]
    fn test_letters_round_trip_first_columns() {
        for n in 0..20_000 {
            assert_eq!(letter_to_col(&col_to_letter(n)), Some(n), "column {}", n);
        }
    }

    #[test]
    fn test_cell_ref() {
        assert_eq!(cell_ref(0, 0), "A1");
        assert_eq!(cell_ref(4, 2), "C5");
        assert_eq!(cell_ref(99, 26), "AA100");
        assert_eq!(cell_ref(usize::MAX, 0), format!("A{}", usize::MAX as u128 + 1));
    }

    #[test]
    fn test_range_ref() {
        assert_eq!(range_ref(&Range::single(4, 2)), "C5");
        assert_eq!(range_ref(&Range::new(0, 0, 2, 1)), "A1:B3");
        assert_eq!(range_ref(&Range::new(0, 0, 0, 25)), "A1:Z1");
    }

    #[test]
    fn test_parse_cell_ref() {
        assert_eq!(parse_cell_ref("C5"), Some((4, 2)));
        assert_eq!(parse_cell_ref("aa10"), Some((9, 26)));
        assert_eq!(parse_cell_ref("$B$2"), Some((1, 1)));
        assert_eq!(parse_cell_ref("A0"), None);
        assert_eq!(parse_cell_ref("5C"), None);
        assert_eq!(parse_cell_ref("C"), None);
        assert_eq!(parse_cell_ref("C5x"), None);
    }

    #[test]
    fn test_parse_range_ref() {
        assert_eq!(parse_range_ref("A1:B3"), Some(Range::new(0, 0, 2, 1)));
        assert_eq!(parse_range_ref("B3:A1"), Some(Range::new(0, 0, 2, 1)));
        assert_eq!(parse_range_ref("C5"), Some(Range::single(4, 2)));
        assert_eq!(parse_range_ref("A1:"), None);
    }
}
