#![forbid(unsafe_code)]

//! Differential rendering for weft.
//!
//! This crate turns a host-supplied render tree (`(width) -> lines`) into
//! the minimal terminal writes that keep the screen current:
//!
//! - [`style`]: SGR state tracking ([`StyleTracker`]) and style-carrying
//!   slicing ([`split_styled`])
//! - [`renderer`]: the differential [`Renderer`], the tick-coalescing
//!   [`Scheduler`], and the viewport model
//! - [`ansi`]: the fixed escape vocabulary
//! - [`error`]: the fail-loud [`RenderError`]
//!
//! # Wiring
//!
//! ```
//! use weft_render::{Renderer, Scheduler, TermSize};
//!
//! let mut renderer = Renderer::new(Vec::new(), TermSize { cols: 80, rows: 24 });
//! let mut scheduler = Scheduler::new();
//!
//! // State changed somewhere; coalesce requests onto the next tick.
//! if scheduler.request(false) {
//!     // host: defer one iteration, then on the next tick:
//! }
//! if scheduler.begin().is_some() {
//!     renderer
//!         .render(&mut |_width: u16| vec!["hello".to_string()])
//!         .unwrap();
//!     scheduler.finish();
//! }
//! ```
//!
//! A forced redraw (theme change, explicit refresh) is
//! [`Renderer::invalidate`] followed by `scheduler.request(true)`.

pub mod ansi;
pub mod error;
pub mod renderer;
pub mod style;

pub use error::{OverflowDiagnostics, RenderError};
pub use renderer::{
    CURSOR_MARKER, PassKind, RenderSource, Renderer, Scheduler, SchedulerState, TermSize,
    Viewport,
};
pub use style::{ColorState, StyleTracker, split_styled};
