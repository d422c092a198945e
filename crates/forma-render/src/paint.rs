//! Box and label painting shared by the widget set.

use forma_core::{Align, Point, Rect, Size};

use crate::color::Color;
use crate::surface::{DrawSurface, FontSpec};

/// How a widget's box is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BoxType {
    /// Nothing is drawn.
    #[default]
    NoBox,
    /// Raised bevel.
    UpBox,
    /// Sunken bevel.
    DownBox,
    /// Flat fill with a black outline.
    BorderBox,
    /// Flat fill with a drop shadow.
    ShadowBox,
    /// Engraved outline, no fill.
    FrameBox,
    /// Flat fill.
    FlatBox,
    /// Embossed outline with fill.
    EmbossedBox,
}

/// Draw a box of `kind` covering `rect`.
///
/// A positive border width draws the border outside of the face, a negative
/// one inside; either way the bevel is `|bw|` pixels wide.
pub fn draw_box(surface: &mut dyn DrawSurface, kind: BoxType, rect: Rect, color: Color, bw: i32) {
    let b = bw.abs();
    match kind {
        BoxType::NoBox => {}
        BoxType::FlatBox => surface.fill_rect(rect, color),
        BoxType::BorderBox => {
            surface.fill_rect(rect, color);
            surface.stroke_rect(rect, Color::BLACK);
        }
        BoxType::ShadowBox => {
            surface.fill_rect(rect.offset(b, b), Color::BOTTOM_BCOL);
            surface.fill_rect(rect, color);
            surface.stroke_rect(rect, Color::BLACK);
        }
        BoxType::UpBox => {
            surface.fill_rect(rect, color);
            draw_bevel(surface, rect, b, Color::TOP_BCOL, Color::BOTTOM_BCOL);
        }
        BoxType::DownBox => {
            surface.fill_rect(rect, color);
            draw_bevel(surface, rect, b, Color::BOTTOM_BCOL, Color::TOP_BCOL);
        }
        BoxType::FrameBox => draw_frame(surface, rect, b),
        BoxType::EmbossedBox => {
            surface.fill_rect(rect, color);
            draw_frame(surface, rect, b);
        }
    }
}

fn draw_bevel(surface: &mut dyn DrawSurface, rect: Rect, b: i32, light: Color, dark: Color) {
    if b == 0 {
        return;
    }
    let (x, y, w, h) = (rect.x(), rect.y(), rect.width(), rect.height());
    // top, left
    surface.fill_rect(Rect::new(x, y, w, b), light);
    surface.fill_rect(Rect::new(x, y, b, h), light);
    // bottom, right
    surface.fill_rect(Rect::new(x, y + h - b, w, b), dark);
    surface.fill_rect(Rect::new(x + w - b, y, b, h), dark);
}

fn draw_frame(surface: &mut dyn DrawSurface, rect: Rect, b: i32) {
    let inner = Rect::new(rect.x() + 1, rect.y() + 1, rect.width() - 1, rect.height() - 1);
    surface.stroke_rect(inner, Color::TOP_BCOL);
    surface.stroke_rect(
        Rect::new(rect.x(), rect.y(), rect.width() - 1, rect.height() - 1),
        Color::BOTTOM_BCOL,
    );
    if b > 1 {
        surface.stroke_rect(rect.inflate(-(b - 1)), Color::BOTTOM_BCOL);
    }
}

/// Margin kept between a label and the edge of its box.
pub const LABEL_MARGIN: Size = Size::new(5, 4);

/// Draw (possibly multi-line) text aligned in or around `area`.
///
/// Each line is aligned separately in the horizontal direction; the block
/// as a whole is aligned vertically. Returns the bounding box of the text.
pub fn draw_text_aligned(
    surface: &mut dyn DrawSurface,
    align: Align,
    area: Rect,
    margin: Size,
    text: &str,
    font: FontSpec,
    color: Color,
) -> Rect {
    let block = surface.text_extent(text, font);
    let origin = align.place(area, block, margin);
    if text.is_empty() {
        return Rect::new(origin.x, origin.y, 0, 0);
    }

    let line_h = surface.line_height(font);
    for (i, line) in text.split('\n').enumerate() {
        let line_w = surface.text_extent(line, font).width;
        let (hor, _) = align.hv();
        let x = match hor {
            forma_core::HAlign::Left => origin.x,
            forma_core::HAlign::Right => origin.x + block.width - line_w,
            forma_core::HAlign::Center => origin.x + (block.width - line_w) / 2,
        };
        surface.draw_text(Point::new(x, origin.y + i as i32 * line_h), line, font, color);
    }
    Rect::new(origin.x, origin.y, block.width, block.height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{DrawOp, RecordingSurface};
    use forma_core::Placement;

    #[test]
    fn test_no_box_draws_nothing() {
        let mut s = RecordingSurface::new();
        draw_box(&mut s, BoxType::NoBox, Rect::new(0, 0, 10, 10), Color::COL1, 1);
        assert!(s.commands().is_empty());
    }

    #[test]
    fn test_up_box_fills_then_bevels() {
        let mut s = RecordingSurface::new();
        draw_box(&mut s, BoxType::UpBox, Rect::new(0, 0, 10, 10), Color::COL1, -2);
        assert_eq!(s.commands().len(), 5);
        assert_eq!(
            s.commands()[0].op,
            DrawOp::FillRect {
                rect: Rect::new(0, 0, 10, 10),
                color: Color::COL1
            }
        );
    }

    #[test]
    fn test_text_lines_are_aligned_individually() {
        let mut s = RecordingSurface::new();
        let area = Rect::new(0, 0, 100, 100);
        let font = FontSpec::default();
        let bbox = draw_text_aligned(
            &mut s,
            Align::inside(Placement::Right),
            area,
            Size::ZERO,
            "ab\nabcd",
            font,
            Color::BLACK,
        );
        assert_eq!(bbox, Rect::new(80, 37, 20, 26));
        let xs: Vec<i32> = s
            .commands()
            .iter()
            .filter_map(|c| match &c.op {
                DrawOp::Text { at, .. } => Some(at.x),
                _ => None,
            })
            .collect();
        assert_eq!(xs, vec![90, 80]);
    }
}
