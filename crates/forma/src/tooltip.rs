//! The tooltip popup.
//!
//! There is one tooltip for the whole engine. Resting the pointer on a
//! widget with a tooltip string arms a delay timer on the widget's
//! outermost composite; when it fires the text is shown in a popup window
//! just below that composite. Leaving the composite's bounding box, pushing
//! a button or pressing a key hides it again.

use forma_core::logging::targets;
use forma_core::{Align, Point, Rect, Size};
use forma_render::{Color, DrawSurface, Drawable, FontSpec, WindowHandle, draw_text_aligned};

use crate::form::{Forms, TimerOwner};
use crate::widget::WidgetId;

/// Space between the tooltip's border and its text.
const PADDING: Size = Size::new(4, 3);

/// Looks and state of the tooltip popup.
#[derive(Debug)]
pub struct Tooltip {
    window: Option<WindowHandle>,
    shown: bool,
    text: String,
    area: Rect,
    max_size: i32,
    background: Color,
    text_color: Color,
    font: FontSpec,
    align: Align,
    owner: Option<WidgetId>,
}

impl Tooltip {
    /// A hidden tooltip whose popup never exceeds `max_size` in either
    /// direction.
    pub fn new(max_size: i32) -> Self {
        Self {
            window: None,
            shown: false,
            text: String::new(),
            area: Rect::ZERO,
            max_size: max_size.max(1),
            background: Color::TOOLTIP_BG,
            text_color: Color::BLACK,
            font: FontSpec::default(),
            align: Align::inside(forma_core::Placement::Left),
            owner: None,
        }
    }

    #[inline]
    pub fn is_shown(&self) -> bool {
        self.shown
    }

    /// The text currently (or last) shown.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Screen area of the popup.
    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn window(&self) -> Option<WindowHandle> {
        self.window
    }

    pub fn set_colors(&mut self, background: Color, text: Color) {
        self.background = background;
        self.text_color = text;
    }

    pub fn set_font(&mut self, font: FontSpec) {
        self.font = font;
    }

    /// Alignment of the text inside the popup. Outside alignments are
    /// turned into inside ones.
    pub fn set_align(&mut self, align: Align) {
        self.align = align.to_inside();
    }

    /// Show `text` with the popup's top-left corner at (`x`, `y`) in screen
    /// coordinates. An already visible tooltip is moved and redrawn.
    pub fn show(&mut self, surface: &mut dyn DrawSurface, text: &str, x: i32, y: i32) {
        if text.is_empty() {
            self.hide(surface);
            return;
        }
        let extent = surface.text_extent(text, self.font);
        let width = (extent.width + 2 * PADDING.width).min(self.max_size);
        let height = (extent.height + 2 * PADDING.height).min(self.max_size);
        let area = Rect::new(x, y, width, height);

        let window = match self.window {
            Some(window) => {
                surface.move_resize_window(window, area);
                window
            }
            None => match surface.create_popup(area) {
                Ok(window) => {
                    self.window = Some(window);
                    window
                }
                Err(err) => {
                    tracing::error!(target: targets::TOOLTIP, %err, "can't create tooltip window");
                    return;
                }
            },
        };
        surface.map_window(window);

        let previous = (surface.target(), surface.origin());
        surface.set_target(Drawable::Window(window));
        surface.set_origin(Point::ZERO);
        let local = Rect::new(0, 0, width, height);
        surface.fill_rect(local, self.background);
        surface.stroke_rect(local, Color::BLACK);
        draw_text_aligned(surface, self.align, local, PADDING, text, self.font, self.text_color);
        surface.set_target(previous.0);
        surface.set_origin(previous.1);

        self.text = text.to_owned();
        self.area = area;
        self.shown = true;
        tracing::trace!(target: targets::TOOLTIP, text, ?area, "tooltip shown");
    }

    pub fn hide(&mut self, surface: &mut dyn DrawSurface) {
        if !self.shown {
            return;
        }
        if let Some(window) = self.window {
            surface.unmap_window(window);
        }
        self.shown = false;
        self.owner = None;
        tracing::trace!(target: targets::TOOLTIP, "tooltip hidden");
    }
}

impl Forms {
    pub fn tooltip(&self) -> &Tooltip {
        &self.tooltip
    }

    /// Change the tooltip's looks.
    pub fn tooltip_mut(&mut self) -> &mut Tooltip {
        &mut self.tooltip
    }

    /// Show the tooltip with any text, independent of widgets.
    pub fn show_tooltip(&mut self, text: &str, x: i32, y: i32) {
        self.tooltip.owner = None;
        self.tooltip.show(self.surface.as_mut(), text, x, y);
    }

    pub fn hide_tooltip(&mut self) {
        self.tooltip.hide(self.surface.as_mut());
    }

    /// The pointer entered `id`: start the delay of the outermost
    /// composite's tooltip.
    pub(crate) fn arm_tooltip(&mut self, id: WidgetId) {
        let top = self.top_parent(id);
        let Some(w) = self.widgets.get(top) else {
            return;
        };
        if w.tooltip.is_none() || w.tip_timer.is_some() {
            return;
        }
        let Some(form) = w.form else {
            return;
        };
        if self.forms[form].no_tooltip {
            return;
        }
        let timer = self.timers.start_one_shot_at(self.now, self.config.tooltip_delay());
        self.timer_owners.insert(timer, TimerOwner::Tooltip(top));
        self.widgets[top].tip_timer = Some(timer);
        tracing::trace!(target: targets::TOOLTIP, widget = ?top, "tooltip armed");
    }

    /// The pointer left `id` at (`x`, `y`). The tooltip stays as long as the
    /// pointer is still inside the outermost composite.
    pub(crate) fn leave_tooltip(&mut self, id: WidgetId, x: i32, y: i32) {
        let top = self.top_parent(id);
        if self.bbox(top).contains_inclusive(Point::new(x, y)) && top != id {
            return;
        }
        self.hide_tooltip_of(top);
    }

    /// Cancel a pending tooltip of `id`'s composite and hide it if shown.
    pub(crate) fn hide_tooltip_of(&mut self, id: WidgetId) {
        let top = self.top_parent(id);
        if let Some(timer) = self.widgets.get_mut(top).and_then(|w| w.tip_timer.take()) {
            self.timer_owners.remove(&timer);
            let _ = self.timers.stop(timer);
        }
        if self.tooltip.owner == Some(top) {
            self.tooltip.hide(self.surface.as_mut());
        }
    }

    /// The delay of `top`'s tooltip ran out.
    pub(crate) fn fire_tooltip(&mut self, top: WidgetId) {
        let Some(w) = self.widgets.get_mut(top) else {
            return;
        };
        w.tip_timer = None;
        let (Some(text), Some(form)) = (w.tooltip.clone(), w.form) else {
            return;
        };
        if !w.visible || !self.forms[form].visible {
            return;
        }
        let origin = self.forms[form].area.origin;
        let bbox = self.bbox(top);
        self.tooltip.show(self.surface.as_mut(), &text, origin.x + bbox.x(), origin.y + bbox.bottom() + 1);
        if self.tooltip.is_shown() {
            self.tooltip.owner = Some(top);
        }
    }
}

#[cfg(test)]
mod tests {
    use forma_render::{DrawOp, RecordingSurface};

    use super::*;

    #[test]
    fn test_size_is_text_plus_padding_capped() {
        let mut surface = RecordingSurface::new();
        let mut tip = Tooltip::new(30);
        tip.show(&mut surface, "abc", 5, 6);
        // Three glyphs of width 5, one line of height 13.
        assert_eq!(tip.area(), Rect::new(5, 6, 23, 19));
        assert!(tip.is_shown());
        let window = tip.window().unwrap();
        assert!(surface.is_mapped(window));

        tip.show(&mut surface, "a much longer tooltip text", 0, 0);
        assert_eq!(tip.area().width(), 30);
        assert_eq!(tip.window(), Some(window));

        tip.hide(&mut surface);
        assert!(!tip.is_shown());
        assert!(!surface.is_mapped(window));
    }

    #[test]
    fn test_drawing_restores_target() {
        let mut surface = RecordingSurface::new();
        surface.set_target(Drawable::Window(WindowHandle(9)));
        let mut tip = Tooltip::new(800);
        tip.show(&mut surface, "x", 0, 0);
        assert_eq!(surface.target(), Drawable::Window(WindowHandle(9)));
        assert!(surface.commands().iter().any(|c| matches!(&c.op, DrawOp::Text { text, .. } if text == "x")));
    }

    #[test]
    fn test_empty_text_hides() {
        let mut surface = RecordingSurface::new();
        let mut tip = Tooltip::new(800);
        tip.show(&mut surface, "x", 0, 0);
        tip.show(&mut surface, "", 0, 0);
        assert!(!tip.is_shown());
    }
}
