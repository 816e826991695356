#![forbid(unsafe_code)]

//! Session start/stop sequences and capability queries.
//!
//! The host emits these once when it takes over the terminal and once when
//! it hands it back. The replies to the queries arrive through the normal
//! input stream and are recognized by the [`crate::input_parser`] as
//! [`crate::event::CapabilityResponse`] events — there is no side channel.
//!
//! Everything is emitted unconditionally: terminals that do not implement
//! a mode or query simply ignore it (and send no reply), so the parser's
//! legacy fallback must stay correct either way.

/// Enable bracketed paste mode.
pub const BRACKETED_PASTE_ENABLE: &str = "\x1b[?2004h";

/// Disable bracketed paste mode.
pub const BRACKETED_PASTE_DISABLE: &str = "\x1b[?2004l";

/// Push the extended-keyboard flags (disambiguate escape codes + report
/// event types).
pub const KEYBOARD_ENHANCE_PUSH: &str = "\x1b[>3u";

/// Pop the extended-keyboard flags.
pub const KEYBOARD_ENHANCE_POP: &str = "\x1b[<u";

/// Query the active extended-keyboard flags. Reply: `CSI ? flags u`.
pub const KEYBOARD_QUERY: &str = "\x1b[?u";

/// Query the cell size in pixels. Reply: `CSI 6 ; height ; width t`.
pub const CELL_SIZE_QUERY: &str = "\x1b[16t";

/// Query primary device attributes. Reply: `CSI ? … c`. Useful as a fence:
/// every terminal answers it, so it marks the end of the reply burst even
/// when the other queries go unanswered.
pub const DEVICE_ATTRIBUTES_QUERY: &str = "\x1b[c";
