//! End-to-end input flows: fragmented arrival, paste interleaving, and
//! timeout resolution, driven the way a host event loop would.

use weft_core::event::{Event, KeyCode, KeyEventKind, Modifiers};
use weft_core::input_parser::InputParser;

fn codes(events: &[Event]) -> Vec<KeyCode> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Key(k) => Some(k.code),
            _ => None,
        })
        .collect()
}

#[test]
fn typing_burst_with_navigation() {
    let mut parser = InputParser::new();
    let events = parser.feed(b"ls\x1b[D\x1b[D -la\r");
    assert_eq!(
        codes(&events),
        vec![
            KeyCode::Char('l'),
            KeyCode::Char('s'),
            KeyCode::Left,
            KeyCode::Left,
            KeyCode::Char(' '),
            KeyCode::Char('-'),
            KeyCode::Char('l'),
            KeyCode::Char('a'),
            KeyCode::Enter,
        ]
    );
}

#[test]
fn byte_at_a_time_arrival_produces_the_same_events() {
    let wire = b"a\x1b[1;5Cb\x1b[200~p\x1b[201~c";

    let mut whole = InputParser::new();
    let expected = whole.feed(wire);

    let mut fragmented = InputParser::new();
    let mut events = Vec::new();
    for byte in wire {
        events.extend(fragmented.feed(std::slice::from_ref(byte)));
    }

    assert_eq!(events, expected);
    assert_eq!(events.len(), 5); // a, Ctrl+Right, b, the paste, c
}

#[test]
fn escape_then_key_after_timeout_window() {
    let mut parser = InputParser::new();

    // ESC arrives alone; the host would arm the timer.
    assert!(parser.feed(b"\x1b").is_empty());
    assert!(parser.pending());

    // Timer fires: the escape resolves.
    let events = parser.flush_pending();
    assert_eq!(codes(&events), vec![KeyCode::Escape]);

    // A full sequence arriving later is unaffected.
    let events = parser.feed(b"\x1b[A");
    assert_eq!(codes(&events), vec![KeyCode::Up]);
}

#[test]
fn escape_completed_before_timeout_is_one_sequence() {
    let mut parser = InputParser::new();
    assert!(parser.feed(b"\x1b").is_empty());
    // More bytes arrive before the timer fires; the host cancels it.
    let events = parser.feed(b"[1;2B");
    assert_eq!(events.len(), 1);
    match &events[0] {
        Event::Key(k) => {
            assert_eq!(k.code, KeyCode::Down);
            assert_eq!(k.modifiers, Modifiers::SHIFT);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn paste_never_interleaves_with_surrounding_keys() {
    let mut parser = InputParser::new();
    let mut events = Vec::new();
    events.extend(parser.feed(b"x\x1b[200~line one\nline "));
    events.extend(parser.feed(b"two\x1b[201~y"));

    assert_eq!(events.len(), 3);
    assert!(matches!(events[0], Event::Key(k) if k.code == KeyCode::Char('x')));
    assert_eq!(events[1], Event::Paste("line one\nline two".into()));
    assert!(matches!(events[2], Event::Key(k) if k.code == KeyCode::Char('y')));
}

#[test]
fn release_events_from_extended_protocol() {
    let mut parser = InputParser::new();
    let events = parser.feed(b"\x1b[97;1:1u\x1b[97;1:3u");
    assert_eq!(events.len(), 2);
    match (&events[0], &events[1]) {
        (Event::Key(press), Event::Key(release)) => {
            assert_eq!(press.kind, KeyEventKind::Press);
            assert_eq!(release.kind, KeyEventKind::Release);
            assert_eq!(press.code, release.code);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn legacy_and_extended_forms_decode_to_the_same_key() {
    let mut legacy = InputParser::new();
    let mut extended = InputParser::new();

    let legacy_events = legacy.feed(b"\x1b[A");
    let extended_events = extended.feed(b"\x1b[57352u");

    match (&legacy_events[0], &extended_events[0]) {
        (Event::Key(a), Event::Key(b)) => {
            assert_eq!(a.code, b.code);
            assert_eq!(a.modifiers, b.modifiers);
        }
        other => panic!("unexpected {other:?}"),
    }
}
