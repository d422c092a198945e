//! Drawing-surface abstraction for forma.
//!
//! This crate defines what forma needs from a graphics backend and nothing
//! more:
//!
//! - [`DrawSurface`]: shapes, text, pixmaps, cursors and popup windows
//! - [`ClipState`]: the permanent/transient clip discipline
//! - [`DamageRegion`]: accumulation of exposed or uncovered areas
//! - [`paint`]: box bevels and aligned labels shared by the widget set
//! - [`RecordingSurface`]: a headless surface recording every command
//!
//! # Example
//!
//! ```
//! use forma_render::{ClipState, Color, DrawSurface, RecordingSurface, Rect};
//!
//! let mut surface = RecordingSurface::new();
//! let mut clip = ClipState::new();
//!
//! clip.set_perm(Rect::new(0, 0, 100, 100));
//! clip.set_clip(&mut surface, Rect::new(10, 10, 20, 20));
//! surface.fill_rect(Rect::new(0, 0, 50, 50), Color::RED);
//! clip.unset_clip(&mut surface);
//!
//! // Unsetting the transient clip falls back to the permanent one.
//! assert_eq!(surface.clip(), Some(Rect::new(0, 0, 100, 100)));
//! ```

pub mod clip;
pub mod color;
pub mod damage;
mod error;
pub mod paint;
pub mod recording;
pub mod surface;

pub use clip::ClipState;
pub use color::Color;
pub use damage::DamageRegion;
pub use error::{RenderError, RenderResult};
pub use paint::{BoxType, LABEL_MARGIN, draw_box, draw_text_aligned};
pub use recording::{DrawCommand, DrawOp, RecordingSurface};
pub use surface::{CursorHandle, DrawSurface, Drawable, FontSpec, FontStyle, PixmapId, WindowHandle};

// Re-export geometry so backends need only this crate.
pub use forma_core::{Point, Rect, Size};
