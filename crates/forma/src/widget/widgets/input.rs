//! Single line text entry.
//!
//! Number inputs only accept characters that can be part of a number and
//! check the whole text when they lose the focus: an input holding
//! something that does not parse keeps the focus until it is fixed.

use forma_core::keys::code;
use forma_core::logging::targets;
use forma_core::{Align, Event, EventKind, Placement, Point, Result, ReturnFlags};
use forma_render::{BoxType, Color, LABEL_MARGIN};

use crate::form::{FormId, Forms};
use crate::widget::{HandlerContext, WidgetClass, WidgetHandler, WidgetId};

/// What an input accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InputType {
    #[default]
    Normal,
    /// A signed integer.
    Int,
    /// A floating point number.
    Float,
    /// Any text, shown as asterisks.
    Secret,
}

impl InputType {
    /// Whether `c` may be typed at char position `at` of `text`.
    fn accepts(self, text: &str, at: usize, c: char) -> bool {
        match self {
            InputType::Normal | InputType::Secret => !c.is_control(),
            InputType::Int => c.is_ascii_digit() || (at == 0 && matches!(c, '+' | '-')),
            InputType::Float => {
                if c.is_ascii_digit() {
                    return true;
                }
                let prev = text.chars().nth(at.wrapping_sub(1));
                match c {
                    '+' | '-' => at == 0 || matches!(prev, Some('e' | 'E')),
                    '.' => !text.contains('.') && !text.contains(['e', 'E']),
                    'e' | 'E' => at > 0 && !text.contains(['e', 'E']),
                    _ => false,
                }
            }
        }
    }

    /// Whether the complete text is acceptable. Empty text always is.
    fn validates(self, text: &str) -> bool {
        if text.is_empty() {
            return true;
        }
        match self {
            InputType::Normal | InputType::Secret => true,
            InputType::Int => text.parse::<i64>().is_ok(),
            InputType::Float => text.parse::<f64>().is_ok_and(f64::is_finite),
        }
    }
}

/// State of an input widget.
#[derive(Debug)]
pub struct Input {
    kind: InputType,
    text: String,
    /// Cursor position in chars.
    cursor: usize,
    /// Zero for no limit.
    max_chars: usize,
    /// Edited since the last report.
    changed: bool,
}

impl Input {
    pub fn new(kind: InputType) -> Self {
        Self {
            kind,
            text: String::new(),
            cursor: 0,
            max_chars: 0,
            changed: false,
        }
    }

    pub fn kind(&self) -> InputType {
        self.kind
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_valid(&self) -> bool {
        self.kind.validates(&self.text)
    }

    fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_at(&self, pos: usize) -> usize {
        self.text.char_indices().nth(pos).map_or(self.text.len(), |(i, _)| i)
    }

    /// Replace the text without reporting it.
    pub(crate) fn set_text(&mut self, text: &str) {
        self.text = if self.max_chars > 0 {
            text.chars().take(self.max_chars).collect()
        } else {
            text.to_owned()
        };
        self.cursor = self.char_count();
        self.changed = false;
    }

    /// What is drawn in place of the text.
    fn shown(&self) -> String {
        match self.kind {
            InputType::Secret => "*".repeat(self.char_count()),
            _ => self.text.clone(),
        }
    }

    fn insert(&mut self, c: char) -> bool {
        if self.max_chars > 0 && self.char_count() >= self.max_chars {
            return false;
        }
        if !self.kind.accepts(&self.text, self.cursor, c) {
            return false;
        }
        let at = self.byte_at(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
        true
    }

    fn remove(&mut self, pos: usize) -> bool {
        if pos >= self.char_count() {
            return false;
        }
        let at = self.byte_at(pos);
        self.text.remove(at);
        true
    }

    /// The result of finishing an edit, or `None` if the text does not
    /// validate.
    fn finish(&mut self) -> Option<ReturnFlags> {
        if !self.is_valid() {
            return None;
        }
        let mut ret = ReturnFlags::END;
        if std::mem::take(&mut self.changed) {
            ret |= ReturnFlags::CHANGED;
        }
        Some(ret)
    }

    fn key(&mut self, ctx: &mut HandlerContext<'_>, key: i32) -> ReturnFlags {
        let edited = match key {
            code::RETURN => {
                return match self.finish() {
                    Some(ret) => ret,
                    None => {
                        tracing::debug!(target: targets::OBJECT, id = ?ctx.id(), "input does not validate");
                        ReturnFlags::NONE
                    }
                };
            }
            code::BACKSPACE => {
                if self.cursor == 0 {
                    false
                } else {
                    self.cursor -= 1;
                    self.remove(self.cursor)
                }
            }
            code::DELETE => self.remove(self.cursor),
            code::LEFT | code::RIGHT | code::HOME | code::END => {
                self.cursor = match key {
                    code::LEFT => self.cursor.saturating_sub(1),
                    code::RIGHT => (self.cursor + 1).min(self.char_count()),
                    code::HOME => 0,
                    _ => self.char_count(),
                };
                ctx.request_redraw();
                return ReturnFlags::NONE;
            }
            _ => match u32::try_from(key).ok().filter(|k| *k < 0xff00).and_then(char::from_u32) {
                Some(c) => self.insert(c),
                None => false,
            },
        };
        if !edited {
            return ReturnFlags::NONE;
        }
        self.changed = true;
        ctx.request_redraw();
        ReturnFlags::CHANGED
    }

    /// Where the text starts.
    fn text_x(&self, ctx: &mut HandlerContext<'_>) -> i32 {
        let (w, surface) = ctx.painter();
        let extent = surface.text_extent(&self.shown(), w.label_font());
        Align::inside(Placement::Left).place(w.area, extent, LABEL_MARGIN).x
    }

    /// The char position closest to `x`.
    fn position_at(&self, ctx: &mut HandlerContext<'_>, x: i32) -> usize {
        let start = self.text_x(ctx);
        let shown = self.shown();
        let (w, surface) = ctx.painter();
        let font = w.label_font();
        let mut best = (0, (x - start).abs());
        for (n, (i, c)) in shown.char_indices().enumerate() {
            let edge = start + surface.text_extent(&shown[..i + c.len_utf8()], font).width;
            let dist = (x - edge).abs();
            if dist < best.1 {
                best = (n + 1, dist);
            }
        }
        best.0
    }

    fn draw(&self, ctx: &mut HandlerContext<'_>) {
        let w = ctx.widget();
        let (area, bw, focus) = (w.area, w.bw, w.focus);
        let color = if focus { w.col2 } else { w.col1 };
        let lcol = w.lcol;
        ctx.draw_box_with(BoxType::DownBox, area, color, bw);

        let shown = self.shown();
        let bbox = ctx.draw_text(Align::inside(Placement::Left), area, &shown, lcol);
        if focus {
            let prefix: String = shown.chars().take(self.cursor).collect();
            let (w, surface) = ctx.painter();
            let font = w.label_font();
            let x = bbox.x() + surface.text_extent(&prefix, font).width;
            let h = surface.line_height(font);
            let y = area.y() + (area.height() - h) / 2;
            surface.draw_line(Point::new(x, y), Point::new(x, y + h), Color::RED);
        }
    }
}

impl WidgetHandler for Input {
    fn handle(&mut self, ctx: &mut HandlerContext<'_>, event: &Event) -> ReturnFlags {
        match event.kind {
            EventKind::Draw => {
                self.draw(ctx);
                ReturnFlags::NONE
            }
            EventKind::DrawLabel => {
                ctx.draw_label_outside();
                ReturnFlags::NONE
            }
            EventKind::Focus => {
                self.cursor = self.char_count();
                ctx.request_redraw();
                ReturnFlags::NONE
            }
            EventKind::Unfocus => {
                ctx.request_redraw();
                match self.finish() {
                    Some(ret) => ret,
                    None => {
                        tracing::debug!(target: targets::OBJECT, id = ?ctx.id(), "refocusing invalid input");
                        ctx.refocus();
                        ReturnFlags::NONE
                    }
                }
            }
            EventKind::Push => {
                self.cursor = self.position_at(ctx, event.x);
                ctx.request_redraw();
                ReturnFlags::NONE
            }
            EventKind::KeyPress => self.key(ctx, event.key),
            _ => ReturnFlags::NONE,
        }
    }
}

impl Forms {
    /// Create a detached input.
    pub fn create_input(&mut self, kind: InputType, x: i32, y: i32, w: i32, h: i32, label: &str) -> WidgetId {
        let id = self.create_widget(WidgetClass::Input, Some(Box::new(Input::new(kind))), x, y, w, h, label);
        let widget = &mut self.widgets[id];
        widget.boxtype = BoxType::DownBox;
        widget.col1 = Color::COL1;
        widget.col2 = Color::MCOL;
        widget.align = Align::LEFT;
        widget.input = true;
        widget.how_return = ReturnFlags::END_CHANGED;
        id
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_input(
        &mut self,
        form: FormId,
        kind: InputType,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        label: &str,
    ) -> Result<WidgetId> {
        self.form_ref(form)?;
        let id = self.create_input(kind, x, y, w, h, label);
        self.place(Some(form), id)
    }

    pub fn input_text(&self, id: WidgetId) -> Result<&str> {
        Ok(self.class_handler::<Input>(id, "input")?.text())
    }

    /// Replace an input's text without reporting it. The text is cut to the
    /// input's maximum length.
    pub fn set_input_text(&mut self, id: WidgetId, text: &str) -> Result<()> {
        self.class_handler_mut::<Input>(id, "input")?.set_text(text);
        self.mark_for_redraw(id);
        self.flush_pending_redraws();
        Ok(())
    }

    /// Limit the number of chars an input holds. Zero removes the limit.
    pub fn set_input_max_chars(&mut self, id: WidgetId, max: usize) -> Result<()> {
        let input = self.class_handler_mut::<Input>(id, "input")?;
        input.max_chars = max;
        if max > 0 && input.char_count() > max {
            let text = input.text.clone();
            input.set_text(&text);
        }
        Ok(())
    }

    pub fn input_cursor(&self, id: WidgetId) -> Result<usize> {
        Ok(self.class_handler::<Input>(id, "input")?.cursor())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use forma_core::keys::LEFT_MOUSE;
    use forma_core::{FormsConfig, FormsError};
    use forma_render::{RecordingSurface, WindowHandle};

    use super::*;
    use crate::input::InputEvent;

    const WIN: WindowHandle = WindowHandle(9);

    fn shown() -> (Forms, FormId, Instant) {
        let mut forms = Forms::with_config(RecordingSurface::new(), FormsConfig::default());
        let form = forms.create_form(300, 200, "");
        forms.show_form(form, WIN).unwrap();
        let now = forms.now();
        (forms, form, now)
    }

    fn type_str(forms: &mut Forms, text: &str, t: Instant) {
        for c in text.chars() {
            forms.handle_input(InputEvent::key(WIN, c as i32, t));
        }
    }

    #[test]
    fn test_typing_and_return() {
        let (mut forms, form, t0) = shown();
        let i = forms.add_input(form, InputType::Normal, 50, 10, 100, 25, "Name").unwrap();
        forms.set_focus(form, Some(i)).unwrap();
        type_str(&mut forms, "ab", t0);
        assert_eq!(forms.input_text(i).unwrap(), "ab");
        assert_eq!(forms.queued(), 0);

        forms.handle_input(InputEvent::key(WIN, code::RETURN, t0));
        assert_eq!(forms.check_forms(), Some(i));
        assert_eq!(forms.widget(i).unwrap().returned(), ReturnFlags::END | ReturnFlags::CHANGED);
    }

    #[test]
    fn test_int_input_rejects_letters() {
        let (mut forms, form, t0) = shown();
        let i = forms.add_input(form, InputType::Int, 50, 10, 100, 25, "").unwrap();
        forms.set_focus(form, Some(i)).unwrap();
        type_str(&mut forms, "-1x2", t0);
        assert_eq!(forms.input_text(i).unwrap(), "-12");
    }

    #[test]
    fn test_float_input_accepts_exponent() {
        let (mut forms, form, t0) = shown();
        let i = forms.add_input(form, InputType::Float, 50, 10, 100, 25, "").unwrap();
        forms.set_focus(form, Some(i)).unwrap();
        type_str(&mut forms, "1.5.e-3e", t0);
        assert_eq!(forms.input_text(i).unwrap(), "1.5e-3");
    }

    #[test]
    fn test_invalid_input_keeps_focus() {
        let (mut forms, form, t0) = shown();
        let a = forms.add_input(form, InputType::Float, 50, 10, 100, 25, "").unwrap();
        let b = forms.add_input(form, InputType::Normal, 50, 50, 100, 25, "").unwrap();
        forms.set_focus(form, Some(a)).unwrap();
        type_str(&mut forms, "1e", t0);

        forms.handle_input(InputEvent::key(WIN, code::TAB, t0));
        assert_eq!(forms.focus(form), Some(a));
        assert!(!forms.widget(b).unwrap().has_focus());

        forms.handle_input(InputEvent::key(WIN, code::BACKSPACE, t0));
        forms.handle_input(InputEvent::key(WIN, code::TAB, t0));
        assert_eq!(forms.focus(form), Some(b));
        assert_eq!(forms.check_forms(), Some(a));
    }

    #[test]
    fn test_cursor_editing() {
        let (mut forms, form, t0) = shown();
        let i = forms.add_input(form, InputType::Normal, 50, 10, 100, 25, "").unwrap();
        forms.set_input_text(i, "hello").unwrap();
        forms.set_focus(form, Some(i)).unwrap();
        forms.handle_input(InputEvent::key(WIN, code::LEFT, t0));
        forms.handle_input(InputEvent::key(WIN, code::LEFT, t0));
        forms.handle_input(InputEvent::key(WIN, code::BACKSPACE, t0));
        assert_eq!(forms.input_text(i).unwrap(), "helo");
        forms.handle_input(InputEvent::key(WIN, code::HOME, t0));
        forms.handle_input(InputEvent::key(WIN, code::DELETE, t0));
        assert_eq!(forms.input_text(i).unwrap(), "elo");
        assert_eq!(forms.input_cursor(i).unwrap(), 0);
    }

    #[test]
    fn test_max_chars() {
        let (mut forms, form, t0) = shown();
        let i = forms.add_input(form, InputType::Normal, 50, 10, 100, 25, "").unwrap();
        forms.set_input_max_chars(i, 3).unwrap();
        forms.set_focus(form, Some(i)).unwrap();
        type_str(&mut forms, "abcdef", t0);
        assert_eq!(forms.input_text(i).unwrap(), "abc");
    }

    #[test]
    fn test_click_places_cursor() {
        let (mut forms, form, t0) = shown();
        let i = forms.add_input(form, InputType::Normal, 50, 10, 100, 25, "").unwrap();
        forms.set_input_text(i, "abcd").unwrap();
        // Text starts at the left margin; default glyphs are 5 pixels wide.
        let x = 50 + LABEL_MARGIN.width + 10;
        forms.handle_input(InputEvent::press(WIN, LEFT_MOUSE, x, 20, t0));
        forms.handle_input(InputEvent::release(WIN, LEFT_MOUSE, x, 20, t0));
        assert_eq!(forms.focus(form), Some(i));
        assert_eq!(forms.input_cursor(i).unwrap(), 2);
    }

    #[test]
    fn test_secret_input_draws_asterisks() {
        let (mut forms, form, _) = shown();
        let i = forms.add_input(form, InputType::Secret, 50, 10, 100, 25, "").unwrap();
        forms.set_input_text(i, "pw").unwrap();
        let surface = forms.surface_as::<RecordingSurface>().unwrap();
        assert!(surface.texts().contains(&"**"));
        assert!(!surface.texts().contains(&"pw"));
    }

    #[test]
    fn test_wrong_class() {
        let (mut forms, form, _) = shown();
        let b = forms.add_box(form, crate::widget::widgets::BoxKind::Up, 0, 0, 10, 10, "").unwrap();
        assert!(matches!(
            forms.input_text(b),
            Err(FormsError::WrongClass { expected: "input" })
        ));
    }
}
