#![forbid(unsafe_code)]

//! Escape-sequence recognition.
//!
//! One pure scanner shared by everything that has to look through terminal
//! escape codes: width measurement, style tracking, and width-aware slicing.
//! Three sequence families are recognized:
//!
//! - CSI: `ESC [ params final` with a final byte in `m G K H J`
//! - OSC: `ESC ] payload (BEL | ESC \)`
//! - APC: `ESC _ payload (BEL | ESC \)`
//!
//! An unterminated sequence at the end of the input is NOT a sequence: the
//! scanner returns `None` and the bytes stay literal text. Nothing is ever
//! dropped here; callers decide what literal means for them.

use memchr::memchr;

/// ESC byte.
pub const ESC: u8 = 0x1b;

/// BEL terminator for OSC/APC sequences.
const BEL: u8 = 0x07;

/// CSI final bytes recognized inside line content.
///
/// Lines legitimately carry styling (`m`), column motion (`G`), and
/// clear/home codes (`K`, `H`, `J`). Anything else is not expected inside a
/// rendered line and stays literal.
const CSI_FINALS: &[u8] = b"mGKHJ";

/// Extract the escape sequence starting at byte offset `pos`, if `pos`
/// points at a complete, recognized sequence.
///
/// Returns the full sequence (introducer through terminator) as a subslice
/// of `text`. Returns `None` when `pos` is not an ESC byte, the introducer
/// is unknown, or the sequence is unterminated.
#[must_use]
pub fn extract_escape_code(text: &str, pos: usize) -> Option<&str> {
    let bytes = text.as_bytes();
    if bytes.get(pos) != Some(&ESC) {
        return None;
    }
    match bytes.get(pos + 1)? {
        b'[' => extract_csi(text, pos),
        b']' | b'_' => extract_string_sequence(text, pos),
        _ => None,
    }
}

/// CSI: parameter/intermediate bytes (0x20..=0x3F) then a recognized final.
fn extract_csi(text: &str, pos: usize) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut i = pos + 2;
    while let Some(&b) = bytes.get(i) {
        if (0x20..=0x3f).contains(&b) {
            i += 1;
        } else if CSI_FINALS.contains(&b) {
            return Some(&text[pos..=i]);
        } else {
            return None;
        }
    }
    None
}

/// OSC/APC: arbitrary payload until BEL or ST (`ESC \`).
fn extract_string_sequence(text: &str, pos: usize) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut i = pos + 2;
    while let Some(&b) = bytes.get(i) {
        if b == BEL {
            return Some(&text[pos..=i]);
        }
        if b == ESC {
            if bytes.get(i + 1) == Some(&b'\\') {
                return Some(&text[pos..=i + 1]);
            }
            // A stray ESC inside the payload stays part of it.
        }
        i += 1;
    }
    None
}

/// Remove every recognized escape sequence from `text`.
///
/// Unterminated trailers stay in place as literal text, so this is exactly
/// the "what the terminal would show" view the width engine measures.
#[must_use]
pub fn strip_escape_codes(text: &str) -> String {
    let bytes = text.as_bytes();
    if memchr(ESC, bytes).is_none() {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    for run in VisibleRuns::new(text) {
        out.push_str(run);
    }
    out
}

/// Iterator over the visible (non-escape) runs of a string.
///
/// Escape sequences are skipped wholesale; literal ESC bytes that do not
/// introduce a recognized sequence are yielded as part of a visible run.
pub struct VisibleRuns<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> VisibleRuns<'a> {
    /// Start iterating the visible runs of `text`.
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }
}

impl<'a> Iterator for VisibleRuns<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let bytes = self.text.as_bytes();
        loop {
            if self.pos >= bytes.len() {
                return None;
            }
            // Skip any run of escape sequences.
            while let Some(seq) = extract_escape_code(self.text, self.pos) {
                self.pos += seq.len();
            }
            if self.pos >= bytes.len() {
                return None;
            }
            let start = self.pos;
            let mut end = start;
            loop {
                match memchr(ESC, &bytes[end..]) {
                    None => {
                        end = bytes.len();
                        break;
                    }
                    Some(off) => {
                        let esc_at = end + off;
                        if extract_escape_code(self.text, esc_at).is_some() {
                            end = esc_at;
                            break;
                        }
                        // Literal ESC; keep scanning past it.
                        end = esc_at + 1;
                    }
                }
            }
            self.pos = end;
            if end > start {
                return Some(&self.text[start..end]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_sgr_sequence() {
        let text = "\x1b[1;31mred";
        assert_eq!(extract_escape_code(text, 0), Some("\x1b[1;31m"));
    }

    #[test]
    fn extract_at_offset() {
        let text = "ab\x1b[0mcd";
        assert_eq!(extract_escape_code(text, 2), Some("\x1b[0m"));
        assert_eq!(extract_escape_code(text, 0), None);
    }

    #[test]
    fn extract_cursor_column_and_erase() {
        assert_eq!(extract_escape_code("\x1b[5G", 0), Some("\x1b[5G"));
        assert_eq!(extract_escape_code("\x1b[2K", 0), Some("\x1b[2K"));
        assert_eq!(extract_escape_code("\x1b[H", 0), Some("\x1b[H"));
        assert_eq!(extract_escape_code("\x1b[0J", 0), Some("\x1b[0J"));
    }

    #[test]
    fn unknown_final_byte_is_not_extracted() {
        // Cursor-up is not part of the in-line vocabulary.
        assert_eq!(extract_escape_code("\x1b[2A", 0), None);
    }

    #[test]
    fn osc_with_bel_terminator() {
        let text = "\x1b]0;title\x07rest";
        assert_eq!(extract_escape_code(text, 0), Some("\x1b]0;title\x07"));
    }

    #[test]
    fn osc_with_st_terminator() {
        let text = "\x1b]8;;http://x\x1b\\link";
        assert_eq!(extract_escape_code(text, 0), Some("\x1b]8;;http://x\x1b\\"));
    }

    #[test]
    fn apc_sequence() {
        let text = "\x1b_Gf=100,a=T\x1b\\tail";
        assert_eq!(extract_escape_code(text, 0), Some("\x1b_Gf=100,a=T\x1b\\"));
    }

    #[test]
    fn unterminated_sequence_is_literal() {
        assert_eq!(extract_escape_code("\x1b[1;3", 0), None);
        assert_eq!(extract_escape_code("\x1b]0;title", 0), None);
        assert_eq!(extract_escape_code("\x1b", 0), None);
    }

    #[test]
    fn strip_removes_all_sequences() {
        let text = "\x1b[1mbold\x1b[0m and \x1b]8;;u\x1b\\plain";
        assert_eq!(strip_escape_codes(text), "bold and plain");
    }

    #[test]
    fn strip_keeps_unterminated_trailer() {
        let text = "abc\x1b[1;3";
        assert_eq!(strip_escape_codes(text), "abc\x1b[1;3");
    }

    #[test]
    fn strip_plain_text_is_identity() {
        assert_eq!(strip_escape_codes("hello"), "hello");
        assert_eq!(strip_escape_codes(""), "");
    }

    #[test]
    fn visible_runs_split_around_sequences() {
        let runs: Vec<&str> = VisibleRuns::new("a\x1b[1mb\x1b[0mc").collect();
        assert_eq!(runs, vec!["a", "b", "c"]);
    }

    #[test]
    fn visible_runs_all_escape_input() {
        let runs: Vec<&str> = VisibleRuns::new("\x1b[1m\x1b[0m").collect();
        assert!(runs.is_empty());
    }

    #[test]
    fn adjacent_sequences_are_each_recognized() {
        let text = "\x1b[1m\x1b[4m";
        let first = extract_escape_code(text, 0).unwrap();
        assert_eq!(first, "\x1b[1m");
        assert_eq!(extract_escape_code(text, first.len()), Some("\x1b[4m"));
    }
}
