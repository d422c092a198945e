//! Error types for the render crate.

use thiserror::Error;

use crate::surface::{PixmapId, WindowHandle};

/// Errors that can occur during drawing-surface operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// An off-screen pixmap could not be created.
    #[error("invalid pixmap dimensions: {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    /// The pixmap handle is unknown to the surface.
    #[error("unknown pixmap {0:?}")]
    UnknownPixmap(PixmapId),

    /// The window handle is unknown to the surface.
    #[error("unknown window {0:?}")]
    UnknownWindow(WindowHandle),

    /// No font glyph exists for a cursor request.
    #[error("no cursor glyph {0}")]
    UnknownCursorGlyph(u32),
}

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;
