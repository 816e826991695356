#![forbid(unsafe_code)]

//! Renderer errors.
//!
//! Almost everything in the pipeline degrades instead of failing; the one
//! loud exception is a line wider than the terminal. Truncating it would
//! desync the diff from what is actually on screen, so the renderer
//! captures full diagnostics and stops.

use std::fmt;
use std::io;

use crate::renderer::{TermSize, Viewport};

/// A render pass failure.
#[derive(Debug)]
pub enum RenderError {
    /// A non-image line exceeded the terminal width at write time.
    ///
    /// This is an upstream bug in the render tree, not a terminal
    /// condition; the renderer refuses further passes until a forced
    /// invalidate.
    LineOverflow(Box<OverflowDiagnostics>),

    /// A previous pass failed fatally and the renderer is stopped.
    Poisoned,

    /// The sink failed.
    Io(io::Error),
}

/// Everything needed to debug a line-width violation offline.
#[derive(Debug, Clone)]
pub struct OverflowDiagnostics {
    /// Index of the offending row.
    pub row: usize,
    /// Measured width of the offending line.
    pub width: usize,
    /// Terminal size at the time of the pass.
    pub terminal: TermSize,
    /// Viewport state at the time of the pass.
    pub viewport: Viewport,
    /// Every line of the frame with its measured width.
    pub lines: Vec<(usize, String)>,
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LineOverflow(diag) => {
                writeln!(
                    f,
                    "line {} is {} columns wide but the terminal has {} \
                     (rows={}, viewport={:?})",
                    diag.row, diag.width, diag.terminal.cols, diag.terminal.rows, diag.viewport,
                )?;
                for (width, line) in &diag.lines {
                    writeln!(f, "  [{width:>3}] {line:?}")?;
                }
                Ok(())
            }
            Self::Poisoned => {
                write!(f, "renderer stopped by a previous fatal error; invalidate to recover")
            }
            Self::Io(err) => write!(f, "terminal write failed: {err}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for RenderError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}
