#![forbid(unsafe_code)]

//! Core: canonical event types and terminal input parsing.
//!
//! `weft-core` is the leaf crate of the weft workspace. It owns the event
//! vocabulary ([`event`]) and the byte-level input parser
//! ([`input_parser`]) that turns raw, arbitrarily fragmented terminal input
//! into well-defined key, paste, mouse, focus, and capability events.
//!
//! The host owns the terminal and the event loop: it reads bytes, calls
//! [`input_parser::InputParser::feed`], arms the
//! [`input_parser::ESCAPE_TIMEOUT`] completion timer while
//! [`input_parser::InputParser::pending`] reports unresolved bytes, and
//! routes the resulting events to whatever holds focus.

pub mod event;
pub mod handshake;
pub mod input_parser;
pub mod logging;

pub use event::{
    CapabilityResponse, Event, KeyCode, KeyEvent, KeyEventKind, Modifiers, MouseButton,
    MouseEvent, MouseEventKind,
};
pub use input_parser::{ESCAPE_TIMEOUT, InputParser};

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, error, info, trace, warn};
