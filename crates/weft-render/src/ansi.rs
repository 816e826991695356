#![forbid(unsafe_code)]

//! ANSI escape vocabulary of the renderer.
//!
//! Fixed sequences, no configuration surface. Everything here is emitted
//! unconditionally; terminals that lack a capability (synchronized output
//! in particular) ignore the markers harmlessly, so no capability
//! branching is needed.
//!
//! # Sequence Reference
//!
//! | Category | Sequence | Description |
//! |----------|----------|-------------|
//! | CSI | `ESC [ ? 2026 h/l` | Synchronized output (DEC 2026) |
//! | CSI | `ESC [ ? 25 h/l` | Cursor show/hide |
//! | CSI | `ESC [ n A/B` | Cursor up/down |
//! | CSI | `ESC [ n G` | Cursor to column (CHA, 1-indexed) |
//! | CSI | `ESC [ 2 K` | Erase entire line |
//! | CSI | `ESC [ 0 J` | Erase from cursor to end of screen |
//! | CSI | `ESC [ 2 J / 3 J / H` | Erase display, scrollback, home |

use std::fmt::Write as _;

/// Synchronized output begin (DEC 2026).
pub const SYNC_BEGIN: &str = "\x1b[?2026h";

/// Synchronized output end (DEC 2026).
pub const SYNC_END: &str = "\x1b[?2026l";

/// Hide the cursor.
pub const CURSOR_HIDE: &str = "\x1b[?25l";

/// Show the cursor.
pub const CURSOR_SHOW: &str = "\x1b[?25h";

/// Erase the entire current line.
pub const ERASE_LINE: &str = "\x1b[2K";

/// Erase from the cursor to the end of the screen.
pub const ERASE_DOWN: &str = "\x1b[0J";

/// Clear the screen and the scrollback, cursor to home.
pub const CLEAR_ALL: &str = "\x1b[2J\x1b[3J\x1b[H";

/// SGR full reset.
pub const SGR_RESET: &str = "\x1b[0m";

/// Reset underline only.
pub const UNDERLINE_OFF: &str = "\x1b[24m";

/// Move the cursor up `n` rows (no-op for 0).
pub fn cursor_up(buf: &mut String, n: u16) {
    if n > 0 {
        let _ = write!(buf, "\x1b[{n}A");
    }
}

/// Move the cursor down `n` rows (no-op for 0).
pub fn cursor_down(buf: &mut String, n: u16) {
    if n > 0 {
        let _ = write!(buf, "\x1b[{n}B");
    }
}

/// Move the cursor to a 0-indexed column (CHA is 1-indexed on the wire).
pub fn cursor_column(buf: &mut String, col: u16) {
    let _ = write!(buf, "\x1b[{}G", col.saturating_add(1));
}
