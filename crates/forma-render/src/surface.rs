//! The drawing-surface contract.
//!
//! forma never talks to a window system directly. Everything it draws goes
//! through a [`DrawSurface`], which offers a small set of primitives: filled
//! and stroked shapes, text, off-screen pixmaps and the copy between them,
//! a clip rectangle for shapes and one for text, cursors and popup windows.
//!
//! All coordinates handed to a surface are form coordinates. The surface
//! subtracts the current *origin* before drawing into the current target,
//! which is how a widget can draw "at its own position" into a pixmap that
//! only covers the widget.

use std::any::Any;

use forma_core::{Point, Rect, Size};

use crate::color::Color;
use crate::error::RenderResult;

/// A window created and owned by the windowing layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowHandle(pub u64);

/// An off-screen pixmap created by a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PixmapId(pub u32);

/// A cursor created by a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CursorHandle(pub u32);

/// Where drawing goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Drawable {
    Window(WindowHandle),
    Pixmap(PixmapId),
}

/// Font style of a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontStyle {
    #[default]
    Normal,
    Bold,
    Italic,
    BoldItalic,
    Fixed,
}

/// A font request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontSpec {
    pub style: FontStyle,
    pub size: i32,
}

impl FontSpec {
    pub const DEFAULT_SIZE: i32 = 10;

    pub const fn new(style: FontStyle, size: i32) -> Self {
        Self { style, size }
    }
}

impl Default for FontSpec {
    fn default() -> Self {
        Self::new(FontStyle::Normal, Self::DEFAULT_SIZE)
    }
}

/// The drawing primitives forma needs from a backend.
///
/// Angles are in tenths of a degree, counterclockwise from three o'clock.
/// Surfaces are `Any` so the owner of a type-erased surface can get the
/// concrete backend back.
pub trait DrawSurface: Any {
    /// Select the drawable subsequent commands go to.
    fn set_target(&mut self, target: Drawable);

    /// The current drawable.
    fn target(&self) -> Drawable;

    /// Set the form coordinate that maps to the top-left of the target.
    fn set_origin(&mut self, origin: Point);

    fn origin(&self) -> Point;

    /// Restrict shape drawing. `None` removes the restriction.
    fn set_clip(&mut self, clip: Option<Rect>);

    /// Restrict text drawing. `None` removes the restriction.
    fn set_text_clip(&mut self, clip: Option<Rect>);

    fn fill_rect(&mut self, rect: Rect, color: Color);

    fn stroke_rect(&mut self, rect: Rect, color: Color);

    fn draw_line(&mut self, from: Point, to: Point, color: Color);

    fn draw_polygon(&mut self, points: &[Point], color: Color, fill: bool);

    fn draw_arc(&mut self, bounds: Rect, start: i32, extent: i32, color: Color, fill: bool);

    /// Draw a single line of text with its top-left corner at `at`.
    fn draw_text(&mut self, at: Point, text: &str, font: FontSpec, color: Color);

    /// Size of (possibly multi-line) text.
    fn text_extent(&self, text: &str, font: FontSpec) -> Size;

    /// Height of one line of text in `font`, including descent.
    fn line_height(&self, font: FontSpec) -> i32;

    fn create_pixmap(&mut self, size: Size) -> RenderResult<PixmapId>;

    fn free_pixmap(&mut self, pixmap: PixmapId);

    /// Copy `src_rect` (pixmap coordinates) of `src` to `to` in `dst`.
    fn copy_area(&mut self, src: PixmapId, src_rect: Rect, dst: Drawable, to: Point) -> RenderResult<()>;

    /// Create a cursor from a glyph of the cursor font.
    fn create_cursor(&mut self, glyph: u32) -> RenderResult<CursorHandle>;

    /// A cursor that shows nothing.
    fn create_blank_cursor(&mut self) -> RenderResult<CursorHandle>;

    /// Set the cursor of a window. `None` restores the window default.
    fn define_cursor(&mut self, window: WindowHandle, cursor: Option<CursorHandle>);

    /// Create an undecorated, unmapped popup window.
    fn create_popup(&mut self, area: Rect) -> RenderResult<WindowHandle>;

    fn move_resize_window(&mut self, window: WindowHandle, area: Rect);

    fn map_window(&mut self, window: WindowHandle);

    fn unmap_window(&mut self, window: WindowHandle);
}
