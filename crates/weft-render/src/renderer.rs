#![forbid(unsafe_code)]

//! Differential frame renderer.
//!
//! The renderer owns the previous frame and the viewport state, asks the
//! host's render tree for lines at the current width, and emits the
//! smallest terminal write that makes the screen match, inside a
//! synchronized-output envelope, as one buffered write per pass.
//!
//! # Pass algorithm
//!
//! 1. Obtain lines from the [`RenderSource`] at the current width.
//! 2. Strip the zero-width [`CURSOR_MARKER`], recording its (row, column).
//! 3. Append line-end resets (skipping image-protocol lines).
//! 4. First render or width change: repaint everything (width change also
//!    clears screen and scrollback).
//! 5. Identical frame: reposition the cursor, write no content.
//! 6. First change above the addressable region: full repaint.
//! 7. Content only shrank: clear the excess trailing rows.
//! 8. Otherwise: rewrite rows `firstChanged..=lastChanged` via relative
//!    cursor motion.
//! 9. Park the cursor at the marker (or hide it) and atomically replace
//!    the retained frame.
//!
//! A line wider than the terminal is fatal ([`RenderError::LineOverflow`]):
//! silently truncating would desync the diff on the next pass, so the
//! renderer stops loudly instead.
//!
//! # Scheduling
//!
//! Passes are coalesced per tick by the [`Scheduler`], an explicit
//! idle/scheduled/rendering state machine. The host owns the "defer one
//! iteration" primitive: when [`Scheduler::request`] returns true it arms
//! one deferral, and on the next tick calls [`Scheduler::begin`], runs the
//! pass, then [`Scheduler::finish`]. A forced request is preceded by
//! [`Renderer::invalidate`], which drops all retained state.

use std::io::Write;

use weft_text::{WidthCache, str_width};

use crate::ansi;
use crate::error::{OverflowDiagnostics, RenderError};
use crate::style::StyleTracker;

/// Reserved zero-width sequence components embed to mark the hardware
/// cursor position. Stripped by the renderer, never forwarded.
pub const CURSOR_MARKER: &str = "\x1b_weft:cursor\x1b\\";

/// Prefix identifying a line that carries a binary image-protocol payload.
/// Such lines get no line-end reset (it would corrupt the payload) and are
/// exempt from width validation.
const IMAGE_PREFIX: &str = "\x1b_G";

/// The host's render tree: pure with respect to `width`, and every line it
/// returns must fit in `width` columns once escapes are stripped.
pub trait RenderSource {
    /// Produce the frame's lines at the given width.
    fn lines(&mut self, width: u16) -> Vec<String>;
}

impl<F: FnMut(u16) -> Vec<String>> RenderSource for F {
    fn lines(&mut self, width: u16) -> Vec<String> {
        self(width)
    }
}

/// Terminal dimensions in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermSize {
    /// Columns.
    pub cols: u16,
    /// Rows.
    pub rows: u16,
}

/// Renderer-owned view of where things are on the real terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    /// Most rows the frame has ever occupied. Monotonic, except reset by a
    /// full clear: rows beyond the terminal height have scrolled into
    /// unaddressable history.
    pub max_rows_rendered: u16,
    /// Current hardware cursor row, relative to the frame origin.
    pub cursor_row: u16,
    /// Width the previous frame was rendered at.
    pub prev_width: u16,
}

/// What kind of pass the scheduler granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Ordinary differential pass.
    Normal,
    /// Pass following a forced invalidation.
    Forced,
}

/// Scheduler states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerState {
    /// No pass requested.
    #[default]
    Idle,
    /// A pass will run on the next tick.
    Scheduled,
    /// A pass is running.
    Rendering,
}

/// Tick-coalescing scheduler.
///
/// Exactly one pass runs per tick no matter how many requests arrive in
/// the window; forced-ness is sticky across coalesced requests. Requests
/// made during a running pass schedule one follow-up pass.
#[derive(Debug, Default)]
pub struct Scheduler {
    state: SchedulerState,
    forced: bool,
    queued: Option<bool>,
}

impl Scheduler {
    /// A scheduler in the idle state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a pass. Returns true when the caller must arm one deferral
    /// (the request moved the scheduler out of idle); coalesced requests
    /// return false.
    pub fn request(&mut self, forced: bool) -> bool {
        match self.state {
            SchedulerState::Idle => {
                self.state = SchedulerState::Scheduled;
                self.forced = forced;
                true
            }
            SchedulerState::Scheduled => {
                self.forced |= forced;
                false
            }
            SchedulerState::Rendering => {
                let queued = self.queued.get_or_insert(false);
                *queued |= forced;
                false
            }
        }
    }

    /// Start the scheduled pass, if any.
    pub fn begin(&mut self) -> Option<PassKind> {
        if self.state != SchedulerState::Scheduled {
            return None;
        }
        self.state = SchedulerState::Rendering;
        let kind = if self.forced {
            PassKind::Forced
        } else {
            PassKind::Normal
        };
        self.forced = false;
        Some(kind)
    }

    /// End the running pass. Returns true when a request arrived mid-pass
    /// and the caller must arm another deferral.
    pub fn finish(&mut self) -> bool {
        if self.state != SchedulerState::Rendering {
            return false;
        }
        match self.queued.take() {
            Some(forced) => {
                self.state = SchedulerState::Scheduled;
                self.forced = forced;
                true
            }
            None => {
                self.state = SchedulerState::Idle;
                false
            }
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SchedulerState {
        self.state
    }
}

/// One rendered frame: the lines and the width they were produced for.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Frame {
    lines: Vec<String>,
    width: u16,
}

/// Differential renderer over a terminal write sink.
pub struct Renderer<W: Write> {
    sink: W,
    size: TermSize,
    prev: Option<Frame>,
    viewport: Viewport,
    /// Pooled style tracker, cleared before each reuse.
    tracker: StyleTracker,
    /// Width cache for the non-ASCII measurement path.
    cache: WidthCache,
    /// Next pass must clear screen and scrollback (set by invalidate).
    needs_clear: bool,
    /// A fatal error stopped the render loop.
    poisoned: bool,
    /// Reused output buffer; one `write_all` per pass.
    buf: String,
}

impl<W: Write> Renderer<W> {
    /// Create a renderer over `sink` for a terminal of `size`.
    pub fn new(sink: W, size: TermSize) -> Self {
        Self {
            sink,
            size,
            prev: None,
            viewport: Viewport::default(),
            tracker: StyleTracker::new(),
            cache: WidthCache::default(),
            needs_clear: false,
            poisoned: false,
            buf: String::new(),
        }
    }

    /// Update the terminal size. The next pass detects the width change
    /// and takes the clear-and-repaint path.
    pub fn set_size(&mut self, size: TermSize) {
        self.size = size;
    }

    /// Current terminal size.
    #[must_use]
    pub fn size(&self) -> TermSize {
        self.size
    }

    /// Current viewport state.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Access the sink (tests inspect in-memory sinks through this).
    pub fn sink_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    /// Consume the renderer, returning the sink.
    pub fn into_inner(self) -> W {
        self.sink
    }

    /// Drop all retained frame and viewport state (forced redraw).
    ///
    /// The next pass repaints from scratch, clearing screen and
    /// scrollback. Also the recovery path after a fatal error. Idempotent:
    /// calling this twice is the same as calling it once.
    pub fn invalidate(&mut self) {
        self.prev = None;
        self.viewport = Viewport::default();
        self.needs_clear = true;
        self.poisoned = false;
    }

    /// Run one render pass.
    pub fn render<S: RenderSource>(&mut self, source: &mut S) -> Result<(), RenderError> {
        if self.poisoned {
            return Err(RenderError::Poisoned);
        }

        let mut lines = source.lines(self.size.cols);
        let cursor = extract_cursor_marker(&mut lines);
        self.append_line_end_resets(&mut lines);
        self.validate_widths(&lines)?;

        self.buf.clear();
        let mut buf = std::mem::take(&mut self.buf);

        let width_changed = self
            .prev
            .as_ref()
            .is_some_and(|prev| prev.width != self.size.cols);

        if self.prev.is_none() || width_changed {
            let clear = self.needs_clear || width_changed;
            self.emit_full(&mut buf, &lines, clear, cursor);
        } else {
            self.emit_diff(&mut buf, &lines, cursor);
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(
            rows = lines.len(),
            bytes = buf.len(),
            "frame presented"
        );

        self.sink.write_all(buf.as_bytes())?;
        self.sink.flush()?;
        buf.clear();
        self.buf = buf;

        // Atomic swap: the new frame becomes the diff base only after the
        // write succeeded.
        self.prev = Some(Frame {
            lines,
            width: self.size.cols,
        });
        self.viewport.prev_width = self.size.cols;
        self.needs_clear = false;
        Ok(())
    }

    /// Append per-line style resets; image-payload lines are left alone.
    fn append_line_end_resets(&mut self, lines: &mut [String]) {
        for line in lines.iter_mut() {
            if is_image_line(line) || !line.contains('\x1b') {
                continue;
            }
            self.tracker.clear();
            self.tracker.process_line(line);
            line.push_str(self.tracker.line_end_reset());
        }
    }

    /// Enforce the line-width invariant. Fatal on violation.
    fn validate_widths(&mut self, lines: &[String]) -> Result<(), RenderError> {
        let widths: Vec<usize> = lines
            .iter()
            .map(|line| {
                if is_image_line(line) {
                    0
                } else {
                    self.cache.width(line)
                }
            })
            .collect();

        let limit = self.size.cols as usize;
        for (row, &width) in widths.iter().enumerate() {
            if width > limit {
                self.poisoned = true;
                let diagnostics = Box::new(OverflowDiagnostics {
                    row,
                    width,
                    terminal: self.size,
                    viewport: self.viewport,
                    lines: widths
                        .iter()
                        .zip(lines)
                        .map(|(&w, l)| (w, l.clone()))
                        .collect(),
                });
                #[cfg(feature = "tracing")]
                tracing::error!(
                    row,
                    width,
                    cols = self.size.cols,
                    "line exceeds terminal width, stopping render loop"
                );
                return Err(RenderError::LineOverflow(diagnostics));
            }
        }
        Ok(())
    }

    /// Repaint the whole frame.
    fn emit_full(
        &mut self,
        buf: &mut String,
        lines: &[String],
        clear: bool,
        cursor: Option<(usize, usize)>,
    ) {
        buf.push_str(ansi::SYNC_BEGIN);
        if clear {
            buf.push_str(ansi::CLEAR_ALL);
        }
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                buf.push_str("\r\n");
            }
            buf.push_str(ansi::ERASE_LINE);
            buf.push_str(line);
        }
        self.viewport.cursor_row = last_row(lines.len());
        self.viewport.max_rows_rendered = if clear {
            lines.len() as u16
        } else {
            self.viewport.max_rows_rendered.max(lines.len() as u16)
        };
        buf.push_str(ansi::SYNC_END);
        self.park_cursor(buf, lines.len(), cursor);
    }

    /// Differential pass against the retained frame.
    fn emit_diff(
        &mut self,
        buf: &mut String,
        lines: &[String],
        cursor: Option<(usize, usize)>,
    ) {
        let (old_len, span) = {
            let prev = self.prev.as_ref().expect("diff requires a previous frame");
            let old = &prev.lines;
            let total = lines.len().max(old.len());
            let changed = |i: usize| {
                lines.get(i).map_or("", String::as_str) != old.get(i).map_or("", String::as_str)
            };
            let span = (0..total).find(|&i| changed(i)).map(|first| {
                let last = (0..total).rfind(|&i| changed(i)).unwrap_or(first);
                (first, last)
            });
            (old.len(), span)
        };
        let Some((first, last)) = span else {
            // Identical frame: no I/O beyond cursor repositioning.
            self.park_cursor(buf, lines.len(), cursor);
            return;
        };

        // Rows that scrolled above the addressable screen cannot be
        // repainted in place.
        let unaddressable = self
            .viewport
            .max_rows_rendered
            .saturating_sub(self.size.rows);
        if (first as u16) < unaddressable {
            self.emit_full(buf, lines, true, cursor);
            return;
        }

        // Content only shrank: clear the excess without rewriting the
        // unchanged rows above.
        if lines.len() < old_len && first >= lines.len() {
            let excess = (old_len - lines.len()) as u16;
            if excess > self.size.rows {
                self.emit_full(buf, lines, true, cursor);
            } else {
                buf.push_str(ansi::SYNC_BEGIN);
                self.move_to_row(buf, lines.len() as u16);
                buf.push_str(ansi::ERASE_DOWN);
                buf.push_str(ansi::SYNC_END);
                self.viewport.max_rows_rendered =
                    self.viewport.max_rows_rendered.max(old_len as u16);
                self.park_cursor(buf, lines.len(), cursor);
            }
            return;
        }

        // Incremental: rewrite only firstChanged..=lastChanged.
        buf.push_str(ansi::SYNC_BEGIN);
        self.move_to_row(buf, first as u16);
        let last_content = last.min(last_row(lines.len()) as usize);
        for (i, line) in lines
            .iter()
            .enumerate()
            .take(last_content + 1)
            .skip(first)
        {
            if i > first {
                buf.push_str("\r\n");
                self.viewport.cursor_row += 1;
            }
            buf.push_str(ansi::ERASE_LINE);
            buf.push_str(line);
        }
        if old_len > lines.len() {
            self.move_to_row(buf, lines.len() as u16);
            buf.push_str(ansi::ERASE_DOWN);
        }
        self.viewport.max_rows_rendered = self
            .viewport
            .max_rows_rendered
            .max(lines.len() as u16);
        buf.push_str(ansi::SYNC_END);
        self.park_cursor(buf, lines.len(), cursor);
    }

    /// Relative vertical motion from the tracked cursor row.
    ///
    /// Upward motion uses CUU; downward motion uses line feeds so that
    /// extending past the bottom row scrolls instead of overwriting.
    fn move_to_row(&mut self, buf: &mut String, target: u16) {
        let current = self.viewport.cursor_row;
        buf.push('\r');
        if target < current {
            ansi::cursor_up(buf, current - target);
        } else {
            for _ in current..target {
                buf.push('\n');
            }
        }
        self.viewport.cursor_row = target;
    }

    /// Park the hardware cursor at the recorded marker, or hide it.
    fn park_cursor(&mut self, buf: &mut String, rows: usize, cursor: Option<(usize, usize)>) {
        match cursor {
            Some((row, col)) => {
                let row = (row as u16).min(last_row(rows));
                let col = (col as u16).min(self.size.cols.saturating_sub(1));
                self.move_to_row(buf, row);
                ansi::cursor_column(buf, col);
                buf.push_str(ansi::CURSOR_SHOW);
            }
            None => buf.push_str(ansi::CURSOR_HIDE),
        }
    }
}

/// Find and strip the cursor marker, returning its (row, visual column).
fn extract_cursor_marker(lines: &mut [String]) -> Option<(usize, usize)> {
    for (row, line) in lines.iter_mut().enumerate() {
        if let Some(idx) = line.find(CURSOR_MARKER) {
            let col = str_width(&line[..idx]);
            line.replace_range(idx..idx + CURSOR_MARKER.len(), "");
            return Some((row, col));
        }
    }
    None
}

fn is_image_line(line: &str) -> bool {
    line.contains(IMAGE_PREFIX)
}

/// Index of the bottom row of a frame of `len` lines.
fn last_row(len: usize) -> u16 {
    (len.saturating_sub(1)) as u16
}

#[cfg(test)]
mod scheduler_tests {
    use super::*;

    #[test]
    fn request_from_idle_arms_a_deferral() {
        let mut sched = Scheduler::new();
        assert!(sched.request(false));
        assert_eq!(sched.state(), SchedulerState::Scheduled);
    }

    #[test]
    fn requests_coalesce_while_scheduled() {
        let mut sched = Scheduler::new();
        assert!(sched.request(false));
        assert!(!sched.request(false));
        assert!(!sched.request(false));
        // One pass serves them all.
        assert_eq!(sched.begin(), Some(PassKind::Normal));
        assert!(!sched.finish());
        assert_eq!(sched.state(), SchedulerState::Idle);
    }

    #[test]
    fn forced_is_sticky_across_coalesced_requests() {
        let mut sched = Scheduler::new();
        sched.request(false);
        sched.request(true);
        sched.request(false);
        assert_eq!(sched.begin(), Some(PassKind::Forced));
    }

    #[test]
    fn begin_without_request_is_none() {
        let mut sched = Scheduler::new();
        assert_eq!(sched.begin(), None);
        assert!(!sched.finish());
    }

    #[test]
    fn request_during_pass_schedules_followup() {
        let mut sched = Scheduler::new();
        sched.request(false);
        sched.begin();
        assert!(!sched.request(true));
        // finish reports that another deferral must be armed.
        assert!(sched.finish());
        assert_eq!(sched.begin(), Some(PassKind::Forced));
        assert!(!sched.finish());
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Two frames differing only at row k: the incremental pass emits
        /// row k's new content and none of the unchanged rows.
        #[test]
        fn single_row_change_touches_only_that_row(
            words in prop::collection::vec("[a-z]{1,8}", 2..6),
            pick in 0usize..8,
        ) {
            let rows: Vec<String> = words
                .iter()
                .enumerate()
                .map(|(i, w)| format!("{i}{w}"))
                .collect();
            let k = pick % rows.len();

            let mut r = Renderer::new(Vec::new(), TermSize { cols: 20, rows: 24 });
            r.render(&mut |_: u16| rows.clone()).unwrap();
            r.sink.clear();

            let mut changed = rows.clone();
            changed[k] = "#####".to_string();
            r.render(&mut |_: u16| changed.clone()).unwrap();
            let out = String::from_utf8_lossy(&r.sink).into_owned();

            prop_assert!(out.contains("#####"));
            for (i, row) in rows.iter().enumerate() {
                if i != k {
                    prop_assert!(!out.contains(row.as_str()), "row {i} leaked into {out:?}");
                }
            }
        }

        /// A pass over arbitrary in-budget content never panics and leaves
        /// the renderer reusable.
        #[test]
        fn arbitrary_frames_render_cleanly(
            frames in prop::collection::vec(
                prop::collection::vec("[ -~]{0,12}", 0..6),
                1..4,
            ),
        ) {
            let mut r = Renderer::new(Vec::new(), TermSize { cols: 12, rows: 8 });
            for frame in &frames {
                r.render(&mut |_: u16| frame.clone()).unwrap();
            }
        }
    }
}
