#![forbid(unsafe_code)]

//! Width-aware slicing at grapheme granularity.
//!
//! Slicing never splits a grapheme cluster. The interesting case is a wide
//! cluster straddling the column limit: strict mode excludes it (the result
//! never exceeds the budget), non-strict mode includes it (the result may
//! overshoot by one column). Escape sequences pass through unconsumed —
//! they cost no columns and are preserved verbatim in the output.

use unicode_segmentation::UnicodeSegmentation;

use crate::escape::extract_escape_code;
use crate::width::cluster_width;

/// Take the leading portion of `text` that fits in `max_cols` columns.
///
/// With `strict`, a cluster that would cross the limit is dropped; without
/// it, a cluster that starts inside the budget is kept even if it ends past
/// it. Returns an owned prefix; use [`split_columns`] when the remainder is
/// needed too.
#[must_use]
pub fn slice_columns(text: &str, max_cols: usize, strict: bool) -> String {
    split_columns(text, max_cols, strict).0.to_string()
}

/// Split `text` at a column boundary, returning `(prefix, rest)`.
///
/// The concatenation of the two halves is always byte-identical to the
/// input. Style carried across the cut is the caller's concern (the style
/// tracker layers that on top of this primitive).
#[must_use]
pub fn split_columns(text: &str, max_cols: usize, strict: bool) -> (&str, &str) {
    let mut used = 0usize;
    let mut pos = 0usize;

    while pos < text.len() {
        if let Some(seq) = extract_escape_code(text, pos) {
            pos += seq.len();
            continue;
        }
        let Some(cluster) = text[pos..].graphemes(true).next() else {
            break;
        };
        let width = cluster_width(cluster);
        if used + width > max_cols {
            if strict || used >= max_cols {
                break;
            }
            // Non-strict: the straddling cluster is kept, then we stop.
            pos += cluster.len();
            break;
        }
        used += width;
        pos += cluster.len();
        if used == max_cols {
            break;
        }
    }

    text.split_at(pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::width::str_width;

    #[test]
    fn ascii_slice() {
        assert_eq!(slice_columns("hello", 3, true), "hel");
        assert_eq!(slice_columns("hello", 3, false), "hel");
    }

    #[test]
    fn slice_wider_than_text_is_identity() {
        assert_eq!(slice_columns("hi", 10, true), "hi");
        assert_eq!(split_columns("hi", 10, false), ("hi", ""));
    }

    #[test]
    fn wide_cluster_straddling_the_limit() {
        // "A中B" has widths 1, 2, 1.
        assert_eq!(slice_columns("A中B", 2, true), "A");
        assert_eq!(slice_columns("A中B", 2, false), "A中");
    }

    #[test]
    fn exact_fit_stops_in_both_modes() {
        assert_eq!(slice_columns("A中B", 3, true), "A中");
        assert_eq!(slice_columns("A中B", 3, false), "A中");
    }

    #[test]
    fn zero_columns_is_empty() {
        assert_eq!(slice_columns("hello", 0, true), "");
        assert_eq!(slice_columns("中", 0, false), "");
    }

    #[test]
    fn combining_mark_travels_with_its_base() {
        let (prefix, rest) = split_columns("e\u{301}x", 1, true);
        assert_eq!(prefix, "e\u{301}");
        assert_eq!(rest, "x");
    }

    #[test]
    fn emoji_cluster_is_never_split() {
        let family = "👨\u{200d}👩\u{200d}👧";
        let text = format!("a{family}b");
        assert_eq!(slice_columns(&text, 2, true), "a");
        assert_eq!(slice_columns(&text, 2, false), format!("a{family}"));
        assert_eq!(slice_columns(&text, 3, true), format!("a{family}"));
    }

    #[test]
    fn escape_sequences_cost_nothing_and_survive() {
        let text = "\x1b[31mAB\x1b[0mCD";
        assert_eq!(slice_columns(text, 2, true), "\x1b[31mAB");
        let (prefix, rest) = split_columns(text, 3, true);
        assert_eq!(prefix, "\x1b[31mAB\x1b[0mC");
        assert_eq!(rest, "D");
    }

    #[test]
    fn halves_reassemble_exactly() {
        let text = "\x1b[1m你好, world\x1b[0m!";
        for cols in 0..12 {
            for strict in [true, false] {
                let (prefix, rest) = split_columns(text, cols, strict);
                assert_eq!(format!("{prefix}{rest}"), text);
                if strict {
                    assert!(str_width(prefix) <= cols);
                }
            }
        }
    }
}
