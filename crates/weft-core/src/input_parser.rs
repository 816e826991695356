#![forbid(unsafe_code)]

//! Input parser state machine.
//!
//! Classifies raw terminal bytes into [`Event`] values. Input arrives in
//! chunks of arbitrary size and split point, so the parser accumulates a
//! buffer and repeatedly resolves its head:
//!
//! - a non-escape prefix becomes plain key events immediately;
//! - `ESC [` (CSI) completes at a final byte in 0x40..=0x7E, with
//!   sub-grammars for legacy mouse (`ESC [ M` + 3 bytes) and SGR mouse
//!   (`ESC [ < … M|m`);
//! - `ESC ]` / `ESC _` / `ESC P` complete at BEL or `ESC \`;
//! - `ESC O` (SS3) completes after one more byte;
//! - a bracketed-paste start switches to verbatim accumulation until the
//!   end marker; trailing bytes are re-fed through the normal grammar.
//!
//! A head that cannot complete yet is left in place: the host arms a short
//! timer ([`ESCAPE_TIMEOUT`]) whenever [`InputParser::pending`] reports
//! unresolved bytes, cancels it on new input, and calls
//! [`InputParser::flush_pending`] on expiry. The flush resolves the buffer
//! as literal text (a lone ESC is the Escape key), so no byte is ever
//! silently dropped.
//!
//! # Decoding priority
//!
//! Extended keyboard-protocol sequences
//! (`CSI cp[:shifted[:base]][;mods[:event]] u` and the augmented
//! arrow/function forms) are decoded first, then the fixed legacy table.
//! Complete sequences the parser does not understand surface as
//! [`Event::Raw`], never as an error.
//!
//! # DoS protection
//!
//! Length limits bound every accumulation: CSI 256 bytes, string sequences
//! (OSC/DCS/APC) 4 KiB, paste content 1 MiB. A runaway sequence resolves
//! as literal text; excess paste content is dropped.

use std::time::Duration;

use crate::event::{
    CapabilityResponse, Event, KeyCode, KeyEvent, KeyEventKind, Modifiers, MouseButton,
    MouseEvent, MouseEventKind,
};

/// How long an ambiguous escape prefix may sit unresolved before the host
/// flushes it. Long enough to absorb serial fragmentation of one sequence,
/// short enough that a bare Escape keypress feels instantaneous.
pub const ESCAPE_TIMEOUT: Duration = Duration::from_millis(10);

/// DoS protection: maximum CSI sequence length.
const MAX_CSI_LEN: usize = 256;

/// DoS protection: maximum OSC/DCS/APC sequence length.
const MAX_STRING_LEN: usize = 4096;

/// DoS protection: maximum paste content length.
const MAX_PASTE_LEN: usize = 1024 * 1024;

/// Bracketed-paste end marker.
const PASTE_END: &[u8] = b"\x1b[201~";

const ESC: u8 = 0x1b;

/// What to do with the head of the buffer.
enum Step {
    /// Not enough bytes to decide.
    NeedMore,
    /// Consume `len` bytes, optionally emitting an event.
    Consume { len: usize, event: Option<Event> },
    /// Consume `len` bytes and switch to verbatim paste accumulation.
    EnterPaste { len: usize },
    /// Length bound exceeded: resolve the whole buffer as literal text.
    Overflow,
}

/// Terminal input parser.
///
/// ```
/// use weft_core::input_parser::InputParser;
/// use weft_core::event::{Event, KeyCode};
///
/// let mut parser = InputParser::new();
/// let events = parser.feed(b"\x1b[A");
/// assert!(matches!(events[0], Event::Key(k) if k.code == KeyCode::Up));
/// ```
#[derive(Debug, Default)]
pub struct InputParser {
    /// Unconsumed bytes awaiting classification.
    buffer: Vec<u8>,
    /// Paste accumulator; `Some` while inside a bracketed paste.
    paste: Option<Vec<u8>>,
}

impl InputParser {
    /// Create a new parser in the ground state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(64),
            paste: None,
        }
    }

    /// Feed a chunk of raw bytes, returning every event it completes.
    ///
    /// May return nothing: an ambiguous prefix stays buffered until more
    /// bytes arrive or the host flushes after [`ESCAPE_TIMEOUT`].
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Event> {
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();
        self.drain(&mut events);
        events
    }

    /// Whether unresolved bytes are waiting on the completion timer.
    ///
    /// False during paste accumulation: a paste in flight waits for its end
    /// marker, not for a timer.
    #[must_use]
    pub fn pending(&self) -> bool {
        self.paste.is_none() && !self.buffer.is_empty()
    }

    /// Resolve the buffered bytes now (completion timer expired).
    ///
    /// A lone ESC becomes exactly one Escape key event; anything else is
    /// decoded as literal text.
    pub fn flush_pending(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        if self.paste.is_none() {
            self.flush_literal(&mut events);
        }
        events
    }

    /// Resolve as much of the buffer as possible.
    fn drain(&mut self, events: &mut Vec<Event>) {
        loop {
            if self.paste.is_some() {
                if !self.drain_paste(events) {
                    return;
                }
                continue;
            }
            let Some(&head) = self.buffer.first() else {
                return;
            };
            if head != ESC {
                if !self.drain_plain(events, false) {
                    return;
                }
                continue;
            }
            match self.classify_escape() {
                Step::NeedMore => return,
                Step::Consume { len, event } => {
                    self.buffer.drain(..len);
                    if let Some(event) = event {
                        events.push(event);
                    }
                }
                Step::EnterPaste { len } => {
                    self.buffer.drain(..len);
                    self.paste = Some(Vec::new());
                }
                Step::Overflow => {
                    crate::trace!("sequence length bound exceeded, flushing as literal");
                    self.flush_literal(events);
                }
            }
        }
    }

    /// Paste accumulation. Returns true when the paste completed and the
    /// outer loop should continue on the remaining bytes.
    fn drain_paste(&mut self, events: &mut Vec<Event>) -> bool {
        if let Some(end) = find(&self.buffer, PASTE_END) {
            let mut content = self.paste.take().unwrap_or_default();
            append_capped(&mut content, &self.buffer[..end]);
            self.buffer.drain(..end + PASTE_END.len());
            events.push(Event::Paste(
                String::from_utf8_lossy(&content).into_owned(),
            ));
            return true;
        }
        // Keep any tail that could still grow into the end marker; move the
        // rest into the accumulator.
        let keep = marker_overlap(&self.buffer);
        let take = self.buffer.len() - keep;
        if take > 0
            && let Some(content) = self.paste.as_mut()
        {
            append_capped(content, &self.buffer[..take]);
            self.buffer.drain(..take);
        }
        false
    }

    /// Consume the non-escape prefix as plain key events.
    ///
    /// Returns false when no progress is possible (an incomplete UTF-8
    /// scalar at the end of the buffer, waiting on continuation bytes).
    fn drain_plain(&mut self, events: &mut Vec<Event>, flush: bool) -> bool {
        let end = self
            .buffer
            .iter()
            .position(|&b| b == ESC)
            .unwrap_or(self.buffer.len());
        let chunk = &self.buffer[..end];
        let at_buffer_end = end == self.buffer.len();

        let mut consumed = 0;
        while consumed < chunk.len() {
            match std::str::from_utf8(&chunk[consumed..]) {
                Ok(s) => {
                    for c in s.chars() {
                        events.push(plain_char_event(c));
                    }
                    consumed = chunk.len();
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    // Safe: from_utf8 just validated this prefix.
                    if let Ok(s) = std::str::from_utf8(&chunk[consumed..consumed + valid]) {
                        for c in s.chars() {
                            events.push(plain_char_event(c));
                        }
                    }
                    consumed += valid;
                    match e.error_len() {
                        Some(bad) => {
                            events.push(plain_char_event('\u{fffd}'));
                            consumed += bad;
                        }
                        None => {
                            // Truncated scalar at chunk end. If an ESC
                            // follows it can never complete; same on flush.
                            if at_buffer_end && !flush {
                                break;
                            }
                            events.push(plain_char_event('\u{fffd}'));
                            consumed = chunk.len();
                        }
                    }
                }
            }
        }

        self.buffer.drain(..consumed);
        consumed > 0
    }

    /// Deterministic literal resolution of everything buffered.
    fn flush_literal(&mut self, events: &mut Vec<Event>) {
        while let Some(&head) = self.buffer.first() {
            if head == ESC {
                self.buffer.drain(..1);
                events.push(Event::Key(KeyEvent::new(KeyCode::Escape)));
            } else {
                self.drain_plain(events, true);
            }
        }
    }

    /// Classify an escape-initiated head. `self.buffer[0]` is ESC.
    fn classify_escape(&self) -> Step {
        let buf = &self.buffer;
        let Some(&intro) = buf.get(1) else {
            return Step::NeedMore;
        };
        match intro {
            b'[' => self.classify_csi(),
            b']' | b'_' | b'P' => self.classify_string_sequence(),
            b'O' => match buf.get(2) {
                None => Step::NeedMore,
                Some(&b) => Step::Consume {
                    len: 3,
                    event: Some(decode_ss3(b, &buf[..3])),
                },
            },
            // ESC ESC: the first escape resolves now, the second stays the
            // head of a fresh sequence.
            ESC => Step::Consume {
                len: 1,
                event: Some(Event::Key(
                    KeyEvent::new(KeyCode::Escape).with_modifiers(Modifiers::ALT),
                )),
            },
            // Alt chords.
            0x20..=0x7e => Step::Consume {
                len: 2,
                event: Some(Event::Key(
                    KeyEvent::new(KeyCode::Char(intro as char)).with_modifiers(Modifiers::ALT),
                )),
            },
            0x7f => Step::Consume {
                len: 2,
                event: Some(Event::Key(
                    KeyEvent::new(KeyCode::Backspace).with_modifiers(Modifiers::ALT),
                )),
            },
            // ESC before a control byte: resolve the escape, reprocess the
            // control byte as plain input.
            _ => Step::Consume {
                len: 1,
                event: Some(Event::Key(KeyEvent::new(KeyCode::Escape))),
            },
        }
    }

    /// CSI grammar: `ESC [ params final`, plus the legacy mouse sub-grammar.
    fn classify_csi(&self) -> Step {
        let buf = &self.buffer;

        // Legacy X10 mouse report: ESC [ M cb cx cy.
        if buf.get(2) == Some(&b'M') {
            return match (buf.get(3), buf.get(4), buf.get(5)) {
                (Some(&cb), Some(&cx), Some(&cy)) => Step::Consume {
                    len: 6,
                    event: Some(decode_x10_mouse(cb, cx, cy)),
                },
                _ => Step::NeedMore,
            };
        }

        let mut i = 2;
        while let Some(&b) = buf.get(i) {
            match b {
                // Parameter and intermediate bytes.
                0x20..=0x3f => i += 1,
                // Final byte: the sequence is complete.
                0x40..=0x7e => {
                    let params = &buf[2..i];
                    return self.dispatch_csi(params, b, i + 1);
                }
                // Anything else aborts the sequence; surface what we
                // collected as opaque and reprocess the offending byte.
                _ => {
                    return Step::Consume {
                        len: i,
                        event: Some(Event::Raw(buf[..i].to_vec())),
                    };
                }
            }
        }
        if buf.len() > MAX_CSI_LEN {
            return Step::Overflow;
        }
        Step::NeedMore
    }

    /// OSC / DCS / APC: complete at BEL or ST (`ESC \`).
    fn classify_string_sequence(&self) -> Step {
        let buf = &self.buffer;
        let mut i = 2;
        while let Some(&b) = buf.get(i) {
            match b {
                0x07 => {
                    return Step::Consume {
                        len: i + 1,
                        event: Some(Event::Raw(buf[..=i].to_vec())),
                    };
                }
                ESC => match buf.get(i + 1) {
                    Some(&b'\\') => {
                        return Step::Consume {
                            len: i + 2,
                            event: Some(Event::Raw(buf[..i + 2].to_vec())),
                        };
                    }
                    Some(_) => i += 1,
                    None => break,
                },
                _ => i += 1,
            }
        }
        if buf.len() > MAX_STRING_LEN {
            return Step::Overflow;
        }
        Step::NeedMore
    }

    /// Dispatch a complete CSI sequence.
    fn dispatch_csi(&self, params: &[u8], final_byte: u8, len: usize) -> Step {
        let consume = |event| Step::Consume {
            len,
            event: Some(event),
        };
        let raw = || {
            Step::Consume {
                len,
                event: Some(Event::Raw(self.buffer[..len].to_vec())),
            }
        };

        match (params, final_byte) {
            (b"200", b'~') => return Step::EnterPaste { len },
            // A stray end marker outside paste mode is just opaque.
            (b"201", b'~') => return raw(),
            ([], b'I') => return consume(Event::Focus(true)),
            ([], b'O') => return consume(Event::Focus(false)),
            _ if params.first() == Some(&b'<') && matches!(final_byte, b'M' | b'm') => {
                return match decode_sgr_mouse(&params[1..], final_byte) {
                    Some(event) => consume(event),
                    None => raw(),
                };
            }
            _ => {}
        }

        let Ok(params) = std::str::from_utf8(params) else {
            return raw();
        };

        let decoded = match final_byte {
            b'u' => {
                if let Some(flags) = params.strip_prefix('?') {
                    flags
                        .parse()
                        .ok()
                        .map(|f| Event::Capability(CapabilityResponse::KeyboardFlags(f)))
                } else {
                    decode_extended_key(params)
                }
            }
            b'A' => decode_augmented_named(KeyCode::Up, params),
            b'B' => decode_augmented_named(KeyCode::Down, params),
            b'C' => decode_augmented_named(KeyCode::Right, params),
            b'D' => decode_augmented_named(KeyCode::Left, params),
            b'H' => decode_augmented_named(KeyCode::Home, params),
            b'F' => decode_augmented_named(KeyCode::End, params),
            b'Z' => Some(Event::Key(
                KeyEvent::new(KeyCode::Tab).with_modifiers(Modifiers::SHIFT),
            )),
            b'~' => decode_tilde_key(params),
            b't' => decode_cell_size(params),
            b'c' => params.strip_prefix('?').map(|rest| {
                Event::Capability(CapabilityResponse::DeviceAttributes(rest.to_string()))
            }),
            _ => None,
        };

        match decoded {
            Some(event) => consume(event),
            None => raw(),
        }
    }
}

// ============================================================================
// Decoding helpers
// ============================================================================

/// Map a plain character to its key event, with C0 controls decoded as
/// Ctrl chords.
fn plain_char_event(c: char) -> Event {
    let key = match c {
        '\0' => KeyEvent::new(KeyCode::Char(' ')).with_modifiers(Modifiers::CTRL),
        '\t' => KeyEvent::new(KeyCode::Tab),
        '\r' => KeyEvent::new(KeyCode::Enter),
        '\x7f' => KeyEvent::new(KeyCode::Backspace),
        '\x01'..='\x1a' => {
            let letter = (b'a' + (c as u8) - 1) as char;
            KeyEvent::new(KeyCode::Char(letter)).with_modifiers(Modifiers::CTRL)
        }
        // FS/GS/RS/US: Ctrl with the corresponding punctuation key.
        '\x1c'..='\x1f' => {
            let ch = ((c as u8) + 0x40) as char;
            KeyEvent::new(KeyCode::Char(ch)).with_modifiers(Modifiers::CTRL)
        }
        c => KeyEvent::new(KeyCode::Char(c)),
    };
    Event::Key(key)
}

/// SS3 (`ESC O x`) legacy table.
fn decode_ss3(byte: u8, raw: &[u8]) -> Event {
    let code = match byte {
        b'P' => KeyCode::F(1),
        b'Q' => KeyCode::F(2),
        b'R' => KeyCode::F(3),
        b'S' => KeyCode::F(4),
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        _ => return Event::Raw(raw.to_vec()),
    };
    Event::Key(KeyEvent::new(code))
}

/// Extended keyboard protocol:
/// `CSI cp[:shifted[:base]][;mods[:event]][;text] u`.
fn decode_extended_key(params: &str) -> Option<Event> {
    let mut sections = params.split(';');

    let mut codepoints = sections.next()?.split(':');
    let cp: u32 = codepoints.next()?.parse().ok()?;
    let shifted = codepoints.next().and_then(parse_codepoint);
    let base = codepoints.next().and_then(parse_codepoint);

    let (modifiers, kind) = parse_mods_and_kind(sections.next());

    let code = keycode_from_codepoint(cp)?;
    Some(Event::Key(
        KeyEvent::new(code)
            .with_alternates(shifted, base)
            .with_modifiers(modifiers)
            .with_kind(kind),
    ))
}

/// Augmented named-key form: `CSI 1;mods[:event] X` (legacy form has no
/// parameters at all).
fn decode_augmented_named(code: KeyCode, params: &str) -> Option<Event> {
    let (modifiers, kind) = parse_mods_and_kind(params.split(';').nth(1));
    Some(Event::Key(
        KeyEvent::new(code).with_modifiers(modifiers).with_kind(kind),
    ))
}

/// Tilde-terminated legacy keys: `CSI num[;mods[:event]] ~`.
fn decode_tilde_key(params: &str) -> Option<Event> {
    let mut sections = params.split(';');
    let num: u32 = sections.next()?.parse().ok()?;
    let (modifiers, kind) = parse_mods_and_kind(sections.next());

    let code = match num {
        1 | 7 => KeyCode::Home,
        2 => KeyCode::Insert,
        3 => KeyCode::Delete,
        4 | 8 => KeyCode::End,
        5 => KeyCode::PageUp,
        6 => KeyCode::PageDown,
        11..=15 => KeyCode::F((num - 10) as u8),
        17..=21 => KeyCode::F((num - 11) as u8),
        23 | 24 => KeyCode::F((num - 12) as u8),
        _ => return None,
    };

    Some(Event::Key(
        KeyEvent::new(code).with_modifiers(modifiers).with_kind(kind),
    ))
}

/// Cell-pixel-size report: `CSI 6 ; height ; width t`.
fn decode_cell_size(params: &str) -> Option<Event> {
    let mut sections = params.split(';');
    if sections.next()? != "6" {
        return None;
    }
    let height: u16 = sections.next()?.parse().ok()?;
    let width: u16 = sections.next()?.parse().ok()?;
    Some(Event::Capability(CapabilityResponse::CellPixelSize {
        width,
        height,
    }))
}

/// Parse a `mods[:event]` section. Absent or malformed pieces fall back to
/// no modifiers / Press.
fn parse_mods_and_kind(section: Option<&str>) -> (Modifiers, KeyEventKind) {
    let Some(section) = section else {
        return (Modifiers::NONE, KeyEventKind::Press);
    };
    let mut parts = section.split(':');
    let raw: u32 = parts.next().and_then(|v| v.parse().ok()).unwrap_or(1);
    let kind = match parts.next().and_then(|v| v.parse::<u32>().ok()) {
        Some(2) => KeyEventKind::Repeat,
        Some(3) => KeyEventKind::Release,
        _ => KeyEventKind::Press,
    };
    (modifiers_from_encoding(raw), kind)
}

/// Decode the wire modifier value: `value = 1 + bits`, with
/// shift=1, alt=2, ctrl=4, super=8. Lock bits (caps=64, num=128) are
/// masked out here so downstream comparisons never see them.
fn modifiers_from_encoding(value: u32) -> Modifiers {
    let bits = value.saturating_sub(1) & !(64 | 128);
    let mut mods = Modifiers::NONE;
    if bits & 1 != 0 {
        mods |= Modifiers::SHIFT;
    }
    if bits & 2 != 0 {
        mods |= Modifiers::ALT;
    }
    if bits & 4 != 0 {
        mods |= Modifiers::CTRL;
    }
    if bits & 8 != 0 {
        mods |= Modifiers::SUPER;
    }
    mods
}

fn parse_codepoint(s: &str) -> Option<char> {
    s.parse::<u32>().ok().and_then(char::from_u32)
}

/// Map an extended-protocol codepoint to a key code.
fn keycode_from_codepoint(cp: u32) -> Option<KeyCode> {
    match cp {
        9 => Some(KeyCode::Tab),
        13 => Some(KeyCode::Enter),
        27 => Some(KeyCode::Escape),
        8 | 127 => Some(KeyCode::Backspace),
        // Functional keys in the Unicode private use area.
        57_344 => Some(KeyCode::Escape),
        57_345 => Some(KeyCode::Enter),
        57_346 => Some(KeyCode::Tab),
        57_347 => Some(KeyCode::Backspace),
        57_348 => Some(KeyCode::Insert),
        57_349 => Some(KeyCode::Delete),
        57_350 => Some(KeyCode::Left),
        57_351 => Some(KeyCode::Right),
        57_352 => Some(KeyCode::Up),
        57_353 => Some(KeyCode::Down),
        57_354 => Some(KeyCode::PageUp),
        57_355 => Some(KeyCode::PageDown),
        57_356 => Some(KeyCode::Home),
        57_357 => Some(KeyCode::End),
        57_364..=57_387 => Some(KeyCode::F((cp - 57_364 + 1) as u8)),
        // Other functional codepoints surface as opaque raw sequences.
        57_358..=57_363 | 57_388..=63_743 => None,
        _ => char::from_u32(cp).map(KeyCode::Char),
    }
}

/// SGR mouse report: `CSI < button ; x ; y M|m`.
fn decode_sgr_mouse(params: &[u8], final_byte: u8) -> Option<Event> {
    let s = std::str::from_utf8(params).ok()?;
    let mut parts = s.split(';');
    let button_code: u16 = parts.next()?.parse().ok()?;
    let x: u16 = parts.next()?.parse().ok()?;
    let y: u16 = parts.next()?.parse().ok()?;

    let (button, modifiers) = decode_mouse_button(button_code);
    let kind = if button_code & 64 != 0 {
        if button_code & 1 == 0 {
            MouseEventKind::ScrollUp
        } else {
            MouseEventKind::ScrollDown
        }
    } else if button_code & 32 != 0 {
        MouseEventKind::Moved
    } else if final_byte == b'M' {
        MouseEventKind::Down(button)
    } else {
        MouseEventKind::Up(button)
    };

    Some(Event::Mouse(MouseEvent {
        kind,
        x: x.saturating_sub(1),
        y: y.saturating_sub(1),
        modifiers,
    }))
}

/// Legacy X10 mouse report: three bytes, each offset by 32.
fn decode_x10_mouse(cb: u8, cx: u8, cy: u8) -> Event {
    let code = u16::from(cb.saturating_sub(32));
    let (button, modifiers) = decode_mouse_button(code);
    let kind = if code & 64 != 0 {
        if code & 1 == 0 {
            MouseEventKind::ScrollUp
        } else {
            MouseEventKind::ScrollDown
        }
    } else if code & 32 != 0 {
        MouseEventKind::Moved
    } else if code & 0b11 == 0b11 {
        MouseEventKind::Up(MouseButton::Left)
    } else {
        MouseEventKind::Down(button)
    };

    Event::Mouse(MouseEvent {
        kind,
        x: u16::from(cx.saturating_sub(32).saturating_sub(1)),
        y: u16::from(cy.saturating_sub(32).saturating_sub(1)),
        modifiers,
    })
}

fn decode_mouse_button(code: u16) -> (MouseButton, Modifiers) {
    let button = match code & 0b11 {
        1 => MouseButton::Middle,
        2 => MouseButton::Right,
        _ => MouseButton::Left,
    };
    let mut mods = Modifiers::NONE;
    if code & 4 != 0 {
        mods |= Modifiers::SHIFT;
    }
    if code & 8 != 0 {
        mods |= Modifiers::ALT;
    }
    if code & 16 != 0 {
        mods |= Modifiers::CTRL;
    }
    (button, mods)
}

/// First occurrence of `needle` in `haystack`.
fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Longest buffer suffix that is a proper prefix of the paste end marker.
fn marker_overlap(buf: &[u8]) -> usize {
    let max = (PASTE_END.len() - 1).min(buf.len());
    (1..=max)
        .rev()
        .find(|&k| buf[buf.len() - k..] == PASTE_END[..k])
        .unwrap_or(0)
}

/// Append with the paste length cap; excess is dropped.
fn append_capped(content: &mut Vec<u8>, bytes: &[u8]) {
    let room = MAX_PASTE_LEN.saturating_sub(content.len());
    content.extend_from_slice(&bytes[..bytes.len().min(room)]);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(events: &[Event], i: usize) -> KeyEvent {
        match &events[i] {
            Event::Key(k) => *k,
            other => panic!("expected key event, got {other:?}"),
        }
    }

    #[test]
    fn ascii_characters_parsed() {
        let mut parser = InputParser::new();
        let events = parser.feed(b"abc");
        assert_eq!(events.len(), 3);
        assert!(key(&events, 0).is_char('a'));
        assert!(key(&events, 1).is_char('b'));
        assert!(key(&events, 2).is_char('c'));
        assert!(!parser.pending());
    }

    #[test]
    fn control_characters() {
        let mut parser = InputParser::new();
        let events = parser.feed(&[0x01]);
        assert!(key(&events, 0).is_char('a'));
        assert!(key(&events, 0).ctrl());

        let events = parser.feed(&[0x7f]);
        assert_eq!(key(&events, 0).code, KeyCode::Backspace);

        let events = parser.feed(b"\r\t");
        assert_eq!(key(&events, 0).code, KeyCode::Enter);
        assert_eq!(key(&events, 1).code, KeyCode::Tab);
    }

    #[test]
    fn utf8_characters() {
        let mut parser = InputParser::new();
        let events = parser.feed("é中".as_bytes());
        assert!(key(&events, 0).is_char('é'));
        assert!(key(&events, 1).is_char('中'));
    }

    #[test]
    fn utf8_split_across_chunks() {
        let mut parser = InputParser::new();
        let bytes = "中".as_bytes();
        assert!(parser.feed(&bytes[..1]).is_empty());
        assert!(parser.pending());
        let events = parser.feed(&bytes[1..]);
        assert!(key(&events, 0).is_char('中'));
    }

    #[test]
    fn arrow_keys() {
        let mut parser = InputParser::new();
        assert_eq!(key(&parser.feed(b"\x1b[A"), 0).code, KeyCode::Up);
        assert_eq!(key(&parser.feed(b"\x1b[B"), 0).code, KeyCode::Down);
        assert_eq!(key(&parser.feed(b"\x1b[C"), 0).code, KeyCode::Right);
        assert_eq!(key(&parser.feed(b"\x1b[D"), 0).code, KeyCode::Left);
    }

    #[test]
    fn csi_split_across_chunks() {
        let mut parser = InputParser::new();
        assert!(parser.feed(b"\x1b").is_empty());
        assert!(parser.feed(b"[").is_empty());
        assert!(parser.pending());
        let events = parser.feed(b"A");
        assert_eq!(key(&events, 0).code, KeyCode::Up);
        assert!(!parser.pending());
    }

    #[test]
    fn function_keys_ss3() {
        let mut parser = InputParser::new();
        assert_eq!(key(&parser.feed(b"\x1bOP"), 0).code, KeyCode::F(1));
        assert_eq!(key(&parser.feed(b"\x1bOS"), 0).code, KeyCode::F(4));
    }

    #[test]
    fn function_keys_tilde() {
        let mut parser = InputParser::new();
        assert_eq!(key(&parser.feed(b"\x1b[15~"), 0).code, KeyCode::F(5));
        assert_eq!(key(&parser.feed(b"\x1b[24~"), 0).code, KeyCode::F(12));
        assert_eq!(key(&parser.feed(b"\x1b[3~"), 0).code, KeyCode::Delete);
    }

    #[test]
    fn modifiers_in_csi() {
        let mut parser = InputParser::new();
        let up = key(&parser.feed(b"\x1b[1;2A"), 0);
        assert_eq!(up.code, KeyCode::Up);
        assert!(up.shift());

        let up = key(&parser.feed(b"\x1b[1;5A"), 0);
        assert!(up.ctrl());

        let del = key(&parser.feed(b"\x1b[3;3~"), 0);
        assert_eq!(del.code, KeyCode::Delete);
        assert!(del.alt());
    }

    #[test]
    fn extended_key_basic() {
        let mut parser = InputParser::new();
        let k = key(&parser.feed(b"\x1b[97u"), 0);
        assert!(k.is_char('a'));
        assert_eq!(k.modifiers, Modifiers::NONE);
        assert_eq!(k.kind, KeyEventKind::Press);
    }

    #[test]
    fn extended_key_with_modifiers_and_kind() {
        let mut parser = InputParser::new();
        let k = key(&parser.feed(b"\x1b[97;5:2u"), 0);
        assert!(k.is_char('a'));
        assert!(k.ctrl());
        assert_eq!(k.kind, KeyEventKind::Repeat);

        let k = key(&parser.feed(b"\x1b[13;1:3u"), 0);
        assert_eq!(k.code, KeyCode::Enter);
        assert_eq!(k.kind, KeyEventKind::Release);
    }

    #[test]
    fn extended_key_alternates() {
        let mut parser = InputParser::new();
        // 'a' with shifted 'A' and base 'a'.
        let k = key(&parser.feed(b"\x1b[97:65:97;2u"), 0);
        assert!(k.is_char('a'));
        assert_eq!(k.shifted, Some('A'));
        assert_eq!(k.base, Some('a'));
        assert!(k.shift());
    }

    #[test]
    fn extended_key_lock_bits_masked() {
        let mut parser = InputParser::new();
        // mods = 1 + (ctrl=4 | caps=64 | num=128) = 197.
        let k = key(&parser.feed(b"\x1b[97;197u"), 0);
        assert_eq!(k.modifiers, Modifiers::CTRL);
    }

    #[test]
    fn extended_key_functional() {
        let mut parser = InputParser::new();
        assert_eq!(key(&parser.feed(b"\x1b[57364;1u"), 0).code, KeyCode::F(1));
        assert_eq!(key(&parser.feed(b"\x1b[57352u"), 0).code, KeyCode::Up);
        assert_eq!(key(&parser.feed(b"\x1b[27u"), 0).code, KeyCode::Escape);
    }

    #[test]
    fn augmented_arrow_with_event_type() {
        let mut parser = InputParser::new();
        let k = key(&parser.feed(b"\x1b[1;2:3A"), 0);
        assert_eq!(k.code, KeyCode::Up);
        assert!(k.shift());
        assert_eq!(k.kind, KeyEventKind::Release);
    }

    #[test]
    fn alt_chords() {
        let mut parser = InputParser::new();
        let k = key(&parser.feed(b"\x1bx"), 0);
        assert!(k.is_char('x'));
        assert!(k.alt());

        let k = key(&parser.feed(b"\x1b\x7f"), 0);
        assert_eq!(k.code, KeyCode::Backspace);
        assert!(k.alt());
    }

    #[test]
    fn shift_tab() {
        let mut parser = InputParser::new();
        let k = key(&parser.feed(b"\x1b[Z"), 0);
        assert_eq!(k.code, KeyCode::Tab);
        assert!(k.shift());
    }

    #[test]
    fn focus_events() {
        let mut parser = InputParser::new();
        assert_eq!(parser.feed(b"\x1b[I"), vec![Event::Focus(true)]);
        assert_eq!(parser.feed(b"\x1b[O"), vec![Event::Focus(false)]);
    }

    #[test]
    fn bare_escape_resolves_on_flush() {
        let mut parser = InputParser::new();
        assert!(parser.feed(b"\x1b").is_empty());
        assert!(parser.pending());
        let events = parser.flush_pending();
        assert_eq!(events.len(), 1);
        assert_eq!(key(&events, 0).code, KeyCode::Escape);
        assert!(!parser.pending());
    }

    #[test]
    fn unterminated_sequence_flushes_as_literal() {
        let mut parser = InputParser::new();
        assert!(parser.feed(b"\x1b[1;2").is_empty());
        let events = parser.flush_pending();
        assert_eq!(events.len(), 5);
        assert_eq!(key(&events, 0).code, KeyCode::Escape);
        assert!(key(&events, 1).is_char('['));
        assert!(key(&events, 2).is_char('1'));
        assert!(key(&events, 3).is_char(';'));
        assert!(key(&events, 4).is_char('2'));
    }

    #[test]
    fn flush_with_empty_buffer_is_empty() {
        let mut parser = InputParser::new();
        assert!(parser.flush_pending().is_empty());
    }

    #[test]
    fn paste_single_chunk() {
        let mut parser = InputParser::new();
        let events = parser.feed(b"\x1b[200~hello world\x1b[201~");
        assert_eq!(events, vec![Event::Paste("hello world".into())]);
    }

    #[test]
    fn paste_split_across_chunks() {
        let mut parser = InputParser::new();
        assert!(parser.feed(b"\x1b[200~Hello ").is_empty());
        assert!(!parser.pending());
        let events = parser.feed(b"World\x1b[201~");
        assert_eq!(events, vec![Event::Paste("Hello World".into())]);
    }

    #[test]
    fn paste_end_marker_split_mid_marker() {
        let mut parser = InputParser::new();
        assert!(parser.feed(b"\x1b[200~abc\x1b[20").is_empty());
        let events = parser.feed(b"1~");
        assert_eq!(events, vec![Event::Paste("abc".into())]);
    }

    #[test]
    fn paste_preserves_inner_escapes() {
        let mut parser = InputParser::new();
        let events = parser.feed(b"\x1b[200~a\x1b[Ab\x1b[201~");
        assert_eq!(events, vec![Event::Paste("a\x1b[Ab".into())]);
    }

    #[test]
    fn bytes_around_paste_parse_normally() {
        let mut parser = InputParser::new();
        let events = parser.feed(b"x\x1b[200~paste\x1b[201~\x1b[A");
        assert_eq!(events.len(), 3);
        assert!(key(&events, 0).is_char('x'));
        assert_eq!(events[1], Event::Paste("paste".into()));
        assert_eq!(key(&events, 2).code, KeyCode::Up);
    }

    #[test]
    fn mouse_sgr_press_and_release() {
        let mut parser = InputParser::new();
        let events = parser.feed(b"\x1b[<0;10;20M");
        assert_eq!(
            events[0],
            Event::Mouse(MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                x: 9,
                y: 19,
                modifiers: Modifiers::NONE,
            })
        );

        let events = parser.feed(b"\x1b[<2;1;1m");
        assert!(matches!(
            events[0],
            Event::Mouse(m) if m.kind == MouseEventKind::Up(MouseButton::Right)
        ));
    }

    #[test]
    fn mouse_sgr_scroll() {
        let mut parser = InputParser::new();
        let events = parser.feed(b"\x1b[<64;5;5M");
        assert!(matches!(
            events[0],
            Event::Mouse(m) if m.kind == MouseEventKind::ScrollUp
        ));
        let events = parser.feed(b"\x1b[<65;5;5M");
        assert!(matches!(
            events[0],
            Event::Mouse(m) if m.kind == MouseEventKind::ScrollDown
        ));
    }

    #[test]
    fn mouse_x10_legacy() {
        let mut parser = InputParser::new();
        // button 0 at (1, 1): cb=32, cx=33, cy=33.
        let events = parser.feed(&[0x1b, b'[', b'M', 32, 33, 33]);
        assert_eq!(
            events[0],
            Event::Mouse(MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                x: 0,
                y: 0,
                modifiers: Modifiers::NONE,
            })
        );
    }

    #[test]
    fn mouse_x10_split_waits_for_payload() {
        let mut parser = InputParser::new();
        assert!(parser.feed(&[0x1b, b'[', b'M', 32]).is_empty());
        let events = parser.feed(&[33, 33]);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn capability_keyboard_flags() {
        let mut parser = InputParser::new();
        let events = parser.feed(b"\x1b[?1u");
        assert_eq!(
            events[0],
            Event::Capability(CapabilityResponse::KeyboardFlags(1))
        );
    }

    #[test]
    fn capability_cell_pixel_size() {
        let mut parser = InputParser::new();
        let events = parser.feed(b"\x1b[6;20;10t");
        assert_eq!(
            events[0],
            Event::Capability(CapabilityResponse::CellPixelSize {
                width: 10,
                height: 20
            })
        );
    }

    #[test]
    fn capability_device_attributes() {
        let mut parser = InputParser::new();
        let events = parser.feed(b"\x1b[?62;4c");
        assert_eq!(
            events[0],
            Event::Capability(CapabilityResponse::DeviceAttributes("62;4".into()))
        );
    }

    #[test]
    fn unknown_csi_surfaces_as_raw() {
        let mut parser = InputParser::new();
        let events = parser.feed(b"\x1b[>1;2;3p");
        assert_eq!(events[0], Event::Raw(b"\x1b[>1;2;3p".to_vec()));
    }

    #[test]
    fn osc_dcs_apc_surface_as_raw() {
        let mut parser = InputParser::new();
        let events = parser.feed(b"\x1b]0;title\x07");
        assert_eq!(events[0], Event::Raw(b"\x1b]0;title\x07".to_vec()));

        let events = parser.feed(b"\x1b_Gi=1\x1b\\");
        assert_eq!(events[0], Event::Raw(b"\x1b_Gi=1\x1b\\".to_vec()));

        let events = parser.feed(b"\x1bP+q544e\x1b\\");
        assert_eq!(events[0], Event::Raw(b"\x1bP+q544e\x1b\\".to_vec()));
    }

    #[test]
    fn double_escape() {
        let mut parser = InputParser::new();
        let events = parser.feed(b"\x1b\x1b");
        assert_eq!(events.len(), 1);
        let k = key(&events, 0);
        assert_eq!(k.code, KeyCode::Escape);
        assert!(k.alt());
        // The second escape is still pending.
        assert!(parser.pending());
        let events = parser.flush_pending();
        assert_eq!(key(&events, 0).code, KeyCode::Escape);
    }

    #[test]
    fn dos_protection_csi() {
        let mut parser = InputParser::new();
        let mut seq = vec![0x1b, b'['];
        seq.extend(std::iter::repeat_n(b'0', MAX_CSI_LEN + 100));
        let events = parser.feed(&seq);
        // Resolved as literal text, nothing dropped.
        assert!(events.len() > MAX_CSI_LEN);
        assert!(!parser.pending());
        // Parser is functional afterwards.
        let events = parser.feed(b"\x1b[A");
        assert_eq!(key(&events, 0).code, KeyCode::Up);
    }

    #[test]
    fn dos_protection_paste_caps_content() {
        let mut parser = InputParser::new();
        parser.feed(b"\x1b[200~");
        parser.feed(&vec![b'x'; MAX_PASTE_LEN + 1000]);
        let events = parser.feed(b"\x1b[201~");
        assert!(matches!(
            &events[0],
            Event::Paste(p) if p.len() == MAX_PASTE_LEN
        ));
    }

    #[test]
    fn no_panic_on_garbage() {
        let mut parser = InputParser::new();
        let garbage = [0xff, 0xfe, 0x00, 0x1b, 0x1b, 0x1b, b'[', 0xff, b']', 0x00];
        let _ = parser.feed(&garbage);
        let _ = parser.flush_pending();
        // Still functional.
        let events = parser.feed(b"z");
        assert!(key(&events, 0).is_char('z'));
    }

    #[test]
    fn events_preserve_arrival_order() {
        let mut parser = InputParser::new();
        let events = parser.feed(b"a\x1b[Ab");
        assert_eq!(events.len(), 3);
        assert!(key(&events, 0).is_char('a'));
        assert_eq!(key(&events, 1).code, KeyCode::Up);
        assert!(key(&events, 2).is_char('b'));
    }
}
