#![forbid(unsafe_code)]

//! SGR style tracking.
//!
//! A [`StyleTracker`] replays the SGR escapes of a line left to right and
//! can answer two questions at any point: "which escape string reproduces
//! the current state?" ([`StyleTracker::active_codes`]) and "what must be
//! reset at end of line?" ([`StyleTracker::line_end_reset`]).
//!
//! Trackers are cheap but stateful; the renderer pools one and calls
//! [`StyleTracker::clear`] before each reuse. Slicing helpers take the
//! tracker by `&mut` — style state is always owned and explicit, never
//! ambient.
//!
//! Unknown SGR codes are ignored, never an error.

use smallvec::SmallVec;

use weft_text::{extract_escape_code, split_columns};

/// Foreground or background color state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorState {
    /// Terminal default.
    #[default]
    Default,
    /// 8/16-color palette; holds the raw SGR code
    /// (30-37/90-97 for fg, 40-47/100-107 for bg).
    Basic(u16),
    /// 256-color palette (`38;5;N` / `48;5;N`).
    Indexed(u8),
    /// True color (`38;2;R;G;B` / `48;2;R;G;B`).
    Rgb(u8, u8, u8),
}

/// SGR state at a cursor position.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StyleTracker {
    bold: bool,
    dim: bool,
    italic: bool,
    underline: bool,
    blink: bool,
    inverse: bool,
    hidden: bool,
    strikethrough: bool,
    fg: ColorState,
    bg: ColorState,
}

impl StyleTracker {
    /// A tracker in the default (reset) state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one escape code to the state.
    ///
    /// Accepts either a full SGR sequence (`ESC [ … m`) or a bare parameter
    /// string (`"1;31"`). Anything else — other CSI families, OSC/APC,
    /// malformed input — is ignored.
    pub fn process(&mut self, code: &str) {
        if let Some(rest) = code.strip_prefix("\x1b[") {
            if let Some(params) = rest.strip_suffix('m') {
                self.process_params(params);
            }
        } else if !code.contains('\x1b') {
            self.process_params(code);
        }
    }

    /// Replay every SGR escape embedded in `text`.
    pub fn process_line(&mut self, text: &str) {
        let mut pos = 0;
        let bytes = text.as_bytes();
        while pos < bytes.len() {
            if bytes[pos] == 0x1b {
                if let Some(seq) = extract_escape_code(text, pos) {
                    self.process(seq);
                    pos += seq.len();
                    continue;
                }
            }
            pos += 1;
        }
    }

    fn process_params(&mut self, params: &str) {
        // Empty parameter string means reset, per SGR convention.
        if params.is_empty() {
            self.clear();
            return;
        }
        let codes: SmallVec<[Option<u16>; 8]> =
            params.split(';').map(|p| parse_param(p)).collect();
        let mut i = 0;
        while i < codes.len() {
            let Some(code) = codes[i] else {
                i += 1;
                continue;
            };
            match code {
                0 => self.clear(),
                1 => self.bold = true,
                2 => self.dim = true,
                22 => {
                    self.bold = false;
                    self.dim = false;
                }
                3 => self.italic = true,
                23 => self.italic = false,
                4 => self.underline = true,
                24 => self.underline = false,
                5 => self.blink = true,
                25 => self.blink = false,
                7 => self.inverse = true,
                27 => self.inverse = false,
                8 => self.hidden = true,
                28 => self.hidden = false,
                9 => self.strikethrough = true,
                29 => self.strikethrough = false,
                30..=37 | 90..=97 => self.fg = ColorState::Basic(code),
                39 => self.fg = ColorState::Default,
                40..=47 | 100..=107 => self.bg = ColorState::Basic(code),
                49 => self.bg = ColorState::Default,
                38 | 48 => {
                    let Some(consumed) = self.process_extended_color(code, &codes[i + 1..])
                    else {
                        // Malformed extended color: drop the rest of the
                        // parameter list without touching state.
                        return;
                    };
                    i += consumed;
                }
                // Unknown code: ignore.
                _ => {}
            }
            i += 1;
        }
    }

    /// `38;5;N`, `48;5;N`, `38;2;R;G;B`, `48;2;R;G;B`. Returns how many
    /// extra parameters were consumed, or `None` when malformed.
    fn process_extended_color(&mut self, kind: u16, rest: &[Option<u16>]) -> Option<usize> {
        let color = match *rest.first()? {
            Some(5) => {
                let index = (*rest.get(1)?)?;
                ColorState::Indexed(u8::try_from(index).ok()?)
            }
            Some(2) => {
                let r = u8::try_from((*rest.get(1)?)?).ok()?;
                let g = u8::try_from((*rest.get(2)?)?).ok()?;
                let b = u8::try_from((*rest.get(3)?)?).ok()?;
                ColorState::Rgb(r, g, b)
            }
            _ => return None,
        };
        if kind == 38 {
            self.fg = color;
        } else {
            self.bg = color;
        }
        Some(if matches!(color, ColorState::Indexed(_)) { 2 } else { 4 })
    }

    /// The escape string that reproduces the current state from a reset
    /// terminal. Empty when the state is default.
    #[must_use]
    pub fn active_codes(&self) -> String {
        if self.is_default() {
            return String::new();
        }
        let mut parts: SmallVec<[String; 8]> = SmallVec::new();
        for (on, code) in [
            (self.bold, 1),
            (self.dim, 2),
            (self.italic, 3),
            (self.underline, 4),
            (self.blink, 5),
            (self.inverse, 7),
            (self.hidden, 8),
            (self.strikethrough, 9),
        ] {
            if on {
                parts.push(code.to_string());
            }
        }
        push_color(&mut parts, self.fg, 38);
        push_color(&mut parts, self.bg, 48);
        format!("\x1b[{}m", parts.join(";"))
    }

    /// The minimal escape preventing cross-line bleed.
    ///
    /// Only underline is reset: it is the one attribute observed to bleed
    /// into padding. Background deliberately survives so padded rows keep
    /// their fill.
    #[must_use]
    pub fn line_end_reset(&self) -> &'static str {
        if self.underline {
            crate::ansi::UNDERLINE_OFF
        } else {
            ""
        }
    }

    /// Reset to the default state (same as processing SGR 0).
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Whether the state equals a freshly reset terminal.
    #[must_use]
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

fn parse_param(p: &str) -> Option<u16> {
    // An empty slot is an implicit 0, per SGR convention.
    if p.is_empty() {
        return Some(0);
    }
    p.parse().ok()
}

fn push_color(parts: &mut SmallVec<[String; 8]>, color: ColorState, extended_kind: u16) {
    match color {
        ColorState::Default => {}
        ColorState::Basic(code) => parts.push(code.to_string()),
        ColorState::Indexed(n) => parts.push(format!("{extended_kind};5;{n}")),
        ColorState::Rgb(r, g, b) => parts.push(format!("{extended_kind};2;{r};{g};{b}")),
    }
}

/// Split styled text at a column boundary, carrying style across the cut.
///
/// The prefix is a verbatim slice of the input. The remainder is prefixed
/// with the escape string reproducing the style active at the cut, so a
/// continuation renders identically to the uncut original. The tracker is
/// taken by `&mut` and left holding the cut-point state; callers reusing a
/// pooled tracker clear it first.
#[must_use]
pub fn split_styled<'a>(
    text: &'a str,
    max_cols: usize,
    strict: bool,
    tracker: &mut StyleTracker,
) -> (&'a str, String) {
    let (prefix, rest) = split_columns(text, max_cols, strict);
    tracker.process_line(prefix);
    let mut continuation = tracker.active_codes();
    continuation.push_str(rest);
    (prefix, continuation)
}
