#![forbid(unsafe_code)]

//! Canonical input event types.
//!
//! Everything the input parser can produce lives here. All types derive
//! `Clone` and `PartialEq` so tests can pattern-match and compare whole
//! event streams.
//!
//! # Design Notes
//!
//! - Mouse coordinates are 0-indexed (the wire protocol is 1-indexed).
//! - [`KeyEventKind`] defaults to `Press`; only the extended keyboard
//!   protocol reports `Repeat` and `Release`.
//! - The `shifted`/`base` alternates on [`KeyEvent`] are populated only by
//!   the extended protocol and stay `None` for legacy sequences.
//! - Modifier lock bits (caps/num lock) are masked out during decoding, so
//!   comparing against a [`Modifiers`] value never has to care about them.

use bitflags::bitflags;

/// Canonical input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A keyboard event.
    Key(KeyEvent),

    /// A mouse event.
    Mouse(MouseEvent),

    /// Pasted text (bracketed paste mode), delivered as one event.
    Paste(String),

    /// Terminal focus gained (`true`) or lost (`false`).
    Focus(bool),

    /// A startup query response recognized in the input stream.
    Capability(CapabilityResponse),

    /// A complete but unrecognized escape sequence, surfaced verbatim.
    Raw(Vec<u8>),
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The decoded key.
    pub code: KeyCode,

    /// Shifted-layout alternate, when the extended protocol reports one.
    pub shifted: Option<char>,

    /// Base-layout alternate, when the extended protocol reports one.
    pub base: Option<char>,

    /// Modifier keys held during the event (lock bits already masked out).
    pub modifiers: Modifiers,

    /// Press, repeat, or release.
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// A plain press of `code` with no modifiers.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            shifted: None,
            base: None,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
        }
    }

    /// Attach modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Set the event kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Attach layout alternates from the extended protocol.
    #[must_use]
    pub const fn with_alternates(mut self, shifted: Option<char>, base: Option<char>) -> Self {
        self.shifted = shifted;
        self.base = base;
        self
    }

    /// Whether this is the character `c` (any modifiers).
    #[must_use]
    pub fn is_char(&self, c: char) -> bool {
        matches!(self.code, KeyCode::Char(ch) if ch == c)
    }

    /// Whether Ctrl is held.
    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    /// Whether Alt is held.
    #[must_use]
    pub const fn alt(&self) -> bool {
        self.modifiers.contains(Modifiers::ALT)
    }

    /// Whether Shift is held.
    #[must_use]
    pub const fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }
}

/// Key codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A character key (the codepoint, lowercase for letter keys).
    Char(char),
    /// Enter / Return.
    Enter,
    /// Escape.
    Escape,
    /// Backspace.
    Backspace,
    /// Tab.
    Tab,
    /// Delete.
    Delete,
    /// Insert.
    Insert,
    /// Home.
    Home,
    /// End.
    End,
    /// Page Up.
    PageUp,
    /// Page Down.
    PageDown,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Function key (F1-F24).
    F(u8),
}

/// Press, repeat, or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    /// Key went down (the default when the terminal cannot distinguish).
    #[default]
    Press,
    /// Key held, auto-repeating.
    Repeat,
    /// Key came up.
    Release,
}

bitflags! {
    /// Modifier keys held during an event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift.
        const SHIFT = 0b0001;
        /// Alt / Option.
        const ALT   = 0b0010;
        /// Control.
        const CTRL  = 0b0100;
        /// Super / Meta / Command.
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// A mouse event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    /// What happened.
    pub kind: MouseEventKind,
    /// Column, 0-indexed.
    pub x: u16,
    /// Row, 0-indexed.
    pub y: u16,
    /// Modifiers held.
    pub modifiers: Modifiers,
}

/// Mouse event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEventKind {
    /// Button pressed.
    Down(MouseButton),
    /// Button released.
    Up(MouseButton),
    /// Pointer moved (with or without a button held).
    Moved,
    /// Wheel scrolled up.
    ScrollUp,
    /// Wheel scrolled down.
    ScrollDown,
}

/// Mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    /// Left button.
    Left,
    /// Middle button.
    Middle,
    /// Right button.
    Right,
}

/// Responses to the one-shot startup capability queries.
///
/// The host issues the queries; the replies come back interleaved with
/// ordinary input and are recognized here by pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityResponse {
    /// Extended-keyboard protocol flags (`CSI ? flags u`).
    KeyboardFlags(u8),
    /// Cell size in pixels (`CSI 6 ; height ; width t`).
    CellPixelSize {
        /// Cell width in pixels.
        width: u16,
        /// Cell height in pixels.
        height: u16,
    },
    /// Primary device attributes (`CSI ? … c`), parameters verbatim.
    DeviceAttributes(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_event_builder_chain() {
        let key = KeyEvent::new(KeyCode::Char('a'))
            .with_modifiers(Modifiers::CTRL | Modifiers::SHIFT)
            .with_kind(KeyEventKind::Repeat);
        assert!(key.ctrl());
        assert!(key.shift());
        assert!(!key.alt());
        assert_eq!(key.kind, KeyEventKind::Repeat);
    }

    #[test]
    fn default_kind_is_press() {
        assert_eq!(KeyEvent::new(KeyCode::Enter).kind, KeyEventKind::Press);
    }

    #[test]
    fn alternates_default_to_none() {
        let key = KeyEvent::new(KeyCode::Char('a'));
        assert_eq!(key.shifted, None);
        assert_eq!(key.base, None);

        let key = key.with_alternates(Some('A'), Some('a'));
        assert_eq!(key.shifted, Some('A'));
        assert_eq!(key.base, Some('a'));
    }

    #[test]
    fn is_char_matches_code_only() {
        let key = KeyEvent::new(KeyCode::Char('x')).with_modifiers(Modifiers::ALT);
        assert!(key.is_char('x'));
        assert!(!key.is_char('y'));
        assert!(!KeyEvent::new(KeyCode::Enter).is_char('\n'));
    }

    #[test]
    fn modifiers_combine() {
        let mods = Modifiers::SHIFT | Modifiers::CTRL;
        assert!(mods.contains(Modifiers::SHIFT));
        assert!(mods.contains(Modifiers::CTRL));
        assert!(!mods.contains(Modifiers::ALT));
        assert_eq!(Modifiers::default(), Modifiers::NONE);
    }

    #[test]
    fn events_compare_structurally() {
        let a = Event::Key(KeyEvent::new(KeyCode::Up));
        let b = Event::Key(KeyEvent::new(KeyCode::Up));
        assert_eq!(a, b);
        assert_ne!(a, Event::Paste(String::new()));
    }
}
