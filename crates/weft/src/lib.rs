#![forbid(unsafe_code)]

//! weft public facade crate.
//!
//! Re-exports the stable surface of the workspace: width measurement from
//! [`weft_text`], event types and input parsing from [`weft_core`], and the
//! differential renderer from [`weft_render`].
//!
//! # Example
//!
//! ```
//! use weft::{InputParser, Renderer, Scheduler, TermSize, str_width};
//!
//! // Measure.
//! assert_eq!(str_width("A中B"), 4);
//!
//! // Render.
//! let mut renderer = Renderer::new(Vec::new(), TermSize { cols: 80, rows: 24 });
//! let mut scheduler = Scheduler::new();
//! assert!(scheduler.request(false));
//! scheduler.begin().unwrap();
//! renderer
//!     .render(&mut |_w: u16| vec!["hello".to_string()])
//!     .unwrap();
//! scheduler.finish();
//!
//! // Parse input.
//! let mut parser = InputParser::new();
//! let events = parser.feed(b"\x1b[A");
//! assert_eq!(events.len(), 1);
//! ```

// --- Text re-exports -------------------------------------------------------

pub use weft_text::{
    CacheStats, WidthCache, extract_escape_code, slice_columns, split_columns,
    str_width, strip_escape_codes,
};

// --- Core re-exports -------------------------------------------------------

pub use weft_core::event::{
    CapabilityResponse, Event, KeyCode, KeyEvent, KeyEventKind, Modifiers, MouseButton,
    MouseEvent, MouseEventKind,
};
pub use weft_core::input_parser::{ESCAPE_TIMEOUT, InputParser};

// --- Render re-exports -----------------------------------------------------

pub use weft_render::{
    CURSOR_MARKER, PassKind, RenderError, RenderSource, Renderer, Scheduler, SchedulerState,
    StyleTracker, TermSize, Viewport, split_styled,
};

/// Common imports for applications built on weft.
pub mod prelude {
    pub use crate::{
        Event, InputParser, KeyCode, KeyEvent, Modifiers, RenderSource, Renderer, Scheduler,
        TermSize, str_width,
    };
}
