//! A headless surface that records every command.
//!
//! [`RecordingSurface`] implements [`DrawSurface`] without drawing anything.
//! It keeps the commands it received, in order, together with the drawable
//! they went to and the shape clip in effect. Coordinates are recorded in
//! target space (after the origin was applied). Text metrics are a fixed
//! function of the font size, so layouts computed against it are stable.

use std::collections::HashMap;

use forma_core::{Point, Rect, Size};

use crate::color::Color;
use crate::error::{RenderError, RenderResult};
use crate::surface::{CursorHandle, DrawSurface, Drawable, FontSpec, PixmapId, WindowHandle};

/// Highest glyph number of the cursor font.
pub const MAX_CURSOR_GLYPH: u32 = 152;

/// One recorded drawing operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOp {
    FillRect { rect: Rect, color: Color },
    StrokeRect { rect: Rect, color: Color },
    Line { from: Point, to: Point, color: Color },
    Polygon { points: Vec<Point>, color: Color, fill: bool },
    Arc { bounds: Rect, start: i32, extent: i32, color: Color, fill: bool },
    Text { at: Point, text: String, color: Color },
    Copy { src: PixmapId, src_rect: Rect, to: Point },
    DefineCursor { window: WindowHandle, cursor: Option<CursorHandle> },
    MapWindow(WindowHandle),
    UnmapWindow(WindowHandle),
    MoveResizeWindow { window: WindowHandle, area: Rect },
}

/// A recorded operation with the drawing state it ran under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawCommand {
    pub target: Drawable,
    pub clip: Option<Rect>,
    pub op: DrawOp,
}

/// Headless [`DrawSurface`].
#[derive(Debug)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
    target: Drawable,
    origin: Point,
    clip: Option<Rect>,
    text_clip: Option<Rect>,
    pixmaps: HashMap<PixmapId, Size>,
    next_pixmap: u32,
    pixmaps_created: u32,
    next_cursor: u32,
    popups: HashMap<WindowHandle, (Rect, bool)>,
    next_window: u64,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSurface {
    /// Popup windows are numbered from here so they never collide with the
    /// handles the application uses for its forms.
    pub const FIRST_POPUP: u64 = 1 << 32;

    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            target: Drawable::Window(WindowHandle(0)),
            origin: Point::ZERO,
            clip: None,
            text_clip: None,
            pixmaps: HashMap::new(),
            next_pixmap: 1,
            pixmaps_created: 0,
            next_cursor: 1,
            popups: HashMap::new(),
            next_window: Self::FIRST_POPUP,
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Forget the recorded commands. Pixmaps and windows are kept.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn clip(&self) -> Option<Rect> {
        self.clip
    }

    pub fn text_clip(&self) -> Option<Rect> {
        self.text_clip
    }

    /// Number of pixmaps currently alive.
    pub fn live_pixmaps(&self) -> usize {
        self.pixmaps.len()
    }

    /// Number of pixmaps ever created.
    pub fn pixmaps_created(&self) -> u32 {
        self.pixmaps_created
    }

    /// Texts drawn, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match &c.op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Whether a popup window exists and is mapped.
    pub fn is_mapped(&self, window: WindowHandle) -> bool {
        self.popups.get(&window).is_some_and(|(_, mapped)| *mapped)
    }

    /// Area of a popup window.
    pub fn window_area(&self, window: WindowHandle) -> Option<Rect> {
        self.popups.get(&window).map(|(area, _)| *area)
    }

    fn to_target(&self, p: Point) -> Point {
        p.offset(-self.origin.x, -self.origin.y)
    }

    fn rect_to_target(&self, r: Rect) -> Rect {
        r.offset(-self.origin.x, -self.origin.y)
    }

    fn record(&mut self, op: DrawOp) {
        self.commands.push(DrawCommand {
            target: self.target,
            clip: self.clip,
            op,
        });
    }

    fn glyph_width(font: FontSpec) -> i32 {
        ((font.size + 1) / 2).max(1)
    }
}

impl DrawSurface for RecordingSurface {
    fn set_target(&mut self, target: Drawable) {
        self.target = target;
    }

    fn target(&self) -> Drawable {
        self.target
    }

    fn set_origin(&mut self, origin: Point) {
        self.origin = origin;
    }

    fn origin(&self) -> Point {
        self.origin
    }

    fn set_clip(&mut self, clip: Option<Rect>) {
        self.clip = clip;
    }

    fn set_text_clip(&mut self, clip: Option<Rect>) {
        self.text_clip = clip;
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let rect = self.rect_to_target(rect);
        self.record(DrawOp::FillRect { rect, color });
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color) {
        let rect = self.rect_to_target(rect);
        self.record(DrawOp::StrokeRect { rect, color });
    }

    fn draw_line(&mut self, from: Point, to: Point, color: Color) {
        let (from, to) = (self.to_target(from), self.to_target(to));
        self.record(DrawOp::Line { from, to, color });
    }

    fn draw_polygon(&mut self, points: &[Point], color: Color, fill: bool) {
        let points = points.iter().map(|p| self.to_target(*p)).collect();
        self.record(DrawOp::Polygon { points, color, fill });
    }

    fn draw_arc(&mut self, bounds: Rect, start: i32, extent: i32, color: Color, fill: bool) {
        let bounds = self.rect_to_target(bounds);
        self.record(DrawOp::Arc {
            bounds,
            start,
            extent,
            color,
            fill,
        });
    }

    fn draw_text(&mut self, at: Point, text: &str, _font: FontSpec, color: Color) {
        let at = self.to_target(at);
        self.record(DrawOp::Text {
            at,
            text: text.to_owned(),
            color,
        });
    }

    fn text_extent(&self, text: &str, font: FontSpec) -> Size {
        if text.is_empty() {
            return Size::ZERO;
        }
        let lines = text.split('\n');
        let (mut width, mut count) = (0, 0);
        for line in lines {
            width = width.max(line.chars().count() as i32 * Self::glyph_width(font));
            count += 1;
        }
        Size::new(width, count * self.line_height(font))
    }

    fn line_height(&self, font: FontSpec) -> i32 {
        font.size + 3
    }

    fn create_pixmap(&mut self, size: Size) -> RenderResult<PixmapId> {
        if size.is_empty() {
            return Err(RenderError::InvalidDimensions {
                width: size.width,
                height: size.height,
            });
        }
        let id = PixmapId(self.next_pixmap);
        self.next_pixmap += 1;
        self.pixmaps_created += 1;
        self.pixmaps.insert(id, size);
        Ok(id)
    }

    fn free_pixmap(&mut self, pixmap: PixmapId) {
        self.pixmaps.remove(&pixmap);
    }

    fn copy_area(&mut self, src: PixmapId, src_rect: Rect, dst: Drawable, to: Point) -> RenderResult<()> {
        if !self.pixmaps.contains_key(&src) {
            return Err(RenderError::UnknownPixmap(src));
        }
        self.commands.push(DrawCommand {
            target: dst,
            clip: self.clip,
            op: DrawOp::Copy { src, src_rect, to },
        });
        Ok(())
    }

    fn create_cursor(&mut self, glyph: u32) -> RenderResult<CursorHandle> {
        if glyph > MAX_CURSOR_GLYPH {
            return Err(RenderError::UnknownCursorGlyph(glyph));
        }
        let id = CursorHandle(self.next_cursor);
        self.next_cursor += 1;
        Ok(id)
    }

    fn create_blank_cursor(&mut self) -> RenderResult<CursorHandle> {
        let id = CursorHandle(self.next_cursor);
        self.next_cursor += 1;
        Ok(id)
    }

    fn define_cursor(&mut self, window: WindowHandle, cursor: Option<CursorHandle>) {
        self.record(DrawOp::DefineCursor { window, cursor });
    }

    fn create_popup(&mut self, area: Rect) -> RenderResult<WindowHandle> {
        if area.is_empty() {
            return Err(RenderError::InvalidDimensions {
                width: area.width(),
                height: area.height(),
            });
        }
        let win = WindowHandle(self.next_window);
        self.next_window += 1;
        self.popups.insert(win, (area, false));
        Ok(win)
    }

    fn move_resize_window(&mut self, window: WindowHandle, area: Rect) {
        if let Some(entry) = self.popups.get_mut(&window) {
            entry.0 = area;
        }
        self.record(DrawOp::MoveResizeWindow { window, area });
    }

    fn map_window(&mut self, window: WindowHandle) {
        if let Some(entry) = self.popups.get_mut(&window) {
            entry.1 = true;
        }
        self.record(DrawOp::MapWindow(window));
    }

    fn unmap_window(&mut self, window: WindowHandle) {
        if let Some(entry) = self.popups.get_mut(&window) {
            entry.1 = false;
        }
        self.record(DrawOp::UnmapWindow(window));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_translates_into_target_space() {
        let mut s = RecordingSurface::new();
        let pm = s.create_pixmap(Size::new(20, 10)).unwrap();
        s.set_target(Drawable::Pixmap(pm));
        s.set_origin(Point::new(100, 50));
        s.fill_rect(Rect::new(100, 50, 20, 10), Color::RED);

        let cmd = &s.commands()[0];
        assert_eq!(cmd.target, Drawable::Pixmap(pm));
        assert_eq!(
            cmd.op,
            DrawOp::FillRect {
                rect: Rect::new(0, 0, 20, 10),
                color: Color::RED
            }
        );
    }

    #[test]
    fn test_text_metrics() {
        let s = RecordingSurface::new();
        let font = FontSpec::default();
        assert_eq!(s.text_extent("abcd", font), Size::new(20, 13));
        assert_eq!(s.text_extent("ab\nabcd", font), Size::new(20, 26));
        assert_eq!(s.text_extent("", font), Size::ZERO);
    }

    #[test]
    fn test_pixmap_lifecycle() {
        let mut s = RecordingSurface::new();
        assert!(s.create_pixmap(Size::new(0, 5)).is_err());
        let pm = s.create_pixmap(Size::new(5, 5)).unwrap();
        assert_eq!(s.live_pixmaps(), 1);
        s.free_pixmap(pm);
        assert_eq!(s.live_pixmaps(), 0);
        assert_eq!(
            s.copy_area(pm, Rect::new(0, 0, 5, 5), Drawable::Window(WindowHandle(1)), Point::ZERO),
            Err(RenderError::UnknownPixmap(pm))
        );
    }

    #[test]
    fn test_popup_mapping() {
        let mut s = RecordingSurface::new();
        let win = s.create_popup(Rect::new(0, 0, 10, 10)).unwrap();
        assert!(!s.is_mapped(win));
        s.map_window(win);
        assert!(s.is_mapped(win));
        s.unmap_window(win);
        assert!(!s.is_mapped(win));
    }
}
