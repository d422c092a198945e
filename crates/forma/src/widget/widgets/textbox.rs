//! Textboxes: scrollable lists of lines.
//!
//! All lines are one text line high, so scrolling works in whole lines and
//! the scroll offset is the index of the first visible line.

use forma_core::keys::{LEFT_MOUSE, SCROLL_DOWN, SCROLL_UP, code};
use forma_core::logging::targets;
use forma_core::{Align, Event, EventKind, FormsError, Point, Rect, Result, ReturnFlags};
use forma_render::{BoxType, Color, DrawSurface};

use crate::form::{FormId, Forms, misuse};
use crate::widget::{HandlerContext, Widget, WidgetClass, WidgetHandler, WidgetId};

/// Called with the textbox and the line under the pointer on a double or
/// triple click.
pub type LineCallback = Box<dyn FnMut(WidgetId, usize)>;

/// How a textbox reacts to the mouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextboxKind {
    /// Scrolls only.
    #[default]
    Normal,
    /// A line is selected while the button is held.
    Select,
    /// A clicked line stays selected.
    Hold,
    /// Like `Hold`, but clicking the selected line deselects it.
    DeselectHold,
    /// Any number of lines; dragging extends the selection.
    Multi,
}

impl TextboxKind {
    fn holds(self) -> bool {
        matches!(self, TextboxKind::Hold | TextboxKind::DeselectHold)
    }
}

#[derive(Debug, Clone, Default)]
struct Line {
    text: String,
    selected: bool,
}

/// Where the lines go.
#[derive(Debug, Clone, Copy)]
struct View {
    text: Rect,
    line_h: i32,
}

impl View {
    fn of(w: &Widget, surface: &dyn DrawSurface) -> Self {
        Self {
            text: w.area.inflate(-(w.bw.abs() + 1)),
            line_h: surface.line_height(w.label_font()).max(1),
        }
    }

    /// Number of lines that fit.
    fn rows(&self) -> usize {
        (self.text.height() / self.line_h).max(1) as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Push,
    Drag,
    Release,
}

/// State of a textbox, owned by its widget.
pub struct Textbox {
    kind: TextboxKind,
    lines: Vec<Line>,
    topline: usize,
    /// Last line selected, for the single selection kinds.
    selected: Option<usize>,
    tracking: bool,
    push_top: usize,
    last_y: i32,
    drag_selects: bool,
    last_multi: Option<usize>,
    dblclick: Option<LineCallback>,
}

impl Textbox {
    pub fn new(kind: TextboxKind) -> Self {
        Self {
            kind,
            lines: Vec::new(),
            topline: 0,
            selected: None,
            tracking: false,
            push_top: 0,
            last_y: 0,
            drag_selects: true,
            last_multi: None,
            dblclick: None,
        }
    }

    pub fn kind(&self) -> TextboxKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, n: usize) -> Option<&str> {
        self.lines.get(n).map(|l| l.text.as_str())
    }

    pub fn topline(&self) -> usize {
        self.topline
    }

    pub fn is_selected(&self, n: usize) -> bool {
        self.lines.get(n).is_some_and(|l| l.selected)
    }

    /// The last line selected, for kinds with a single selection, or the
    /// first selected line of a multi textbox.
    pub fn selection(&self) -> Option<usize> {
        match self.kind {
            TextboxKind::Multi => self.lines.iter().position(|l| l.selected),
            _ => self.selected,
        }
    }

    fn check(&self, n: usize) -> Result<()> {
        if n < self.lines.len() {
            Ok(())
        } else {
            Err(misuse(FormsError::LineOutOfRange {
                index: n,
                len: self.lines.len(),
            }))
        }
    }

    fn set_top(&mut self, top: usize, rows: usize) -> bool {
        let top = top.min(self.lines.len().saturating_sub(rows));
        let moved = top != self.topline;
        self.topline = top;
        moved
    }

    fn bring_into_view(&mut self, n: usize, rows: usize) {
        if n < self.topline {
            self.topline = n;
        } else if n >= self.topline + rows {
            self.topline = n + 1 - rows;
        }
    }

    fn select(&mut self, n: usize) {
        if self.kind != TextboxKind::Multi
            && let Some(old) = self.selected
            && let Some(line) = self.lines.get_mut(old)
        {
            line.selected = false;
        }
        self.lines[n].selected = true;
        self.selected = Some(n);
    }

    fn deselect(&mut self, n: usize) {
        self.lines[n].selected = false;
        if self.selected == Some(n) {
            self.selected = None;
        }
    }

    fn line_at(&self, view: &View, y: i32) -> Option<usize> {
        if y < view.text.y() || y >= view.text.bottom() {
            return None;
        }
        let n = self.topline + ((y - view.text.y()) / view.line_h) as usize;
        (n < self.lines.len()).then_some(n)
    }

    fn view(ctx: &mut HandlerContext<'_>) -> View {
        let (w, surface) = ctx.painter();
        View::of(w, surface)
    }

    fn keyboard(&mut self, ctx: &mut HandlerContext<'_>, key: i32) -> ReturnFlags {
        let rows = Self::view(ctx).rows();
        let (old_sel, old_top) = (self.selected, self.topline);
        let len = self.lines.len();
        match key {
            code::HOME => {
                self.set_top(0, rows);
            }
            code::END => {
                self.set_top(len, rows);
            }
            code::PAGE_UP => {
                self.set_top(self.topline.saturating_sub(rows), rows);
            }
            code::PAGE_DOWN | 0x20 => {
                self.set_top(self.topline + rows, rows);
            }
            code::UP if self.kind.holds() => {
                if let Some(s) = self.selected.filter(|s| *s > 0) {
                    self.select(s - 1);
                    self.bring_into_view(s - 1, rows);
                }
            }
            code::DOWN if self.kind.holds() => {
                let next = self.selected.map_or(0, |s| s + 1);
                if next < len {
                    self.select(next);
                    self.bring_into_view(next, rows);
                }
            }
            code::UP => {
                self.set_top(self.topline.saturating_sub(1), rows);
            }
            code::DOWN => {
                self.set_top(self.topline + 1, rows);
            }
            _ => return ReturnFlags::NONE,
        }

        let mut ret = ReturnFlags::NONE;
        if self.selected != old_sel {
            ret |= ReturnFlags::SELECTION;
        }
        if self.topline != old_top {
            ret |= ReturnFlags::CHANGED | ReturnFlags::END;
        }
        if !ret.is_none() {
            ctx.request_redraw();
        }
        ret
    }

    fn wheel(&mut self, ctx: &mut HandlerContext<'_>, key: i32) -> ReturnFlags {
        let rows = Self::view(ctx).rows();
        let by = (rows / 2).max(1);
        let top = if key == SCROLL_UP {
            self.topline.saturating_sub(by)
        } else {
            self.topline + by
        };
        if self.set_top(top, rows) {
            ctx.request_redraw();
            ReturnFlags::CHANGED | ReturnFlags::END
        } else {
            ReturnFlags::NONE
        }
    }

    fn apply_multi(&mut self, n: usize) -> ReturnFlags {
        match (self.drag_selects, self.lines[n].selected) {
            (true, false) => {
                self.select(n);
                ReturnFlags::SELECTION
            }
            (false, true) => {
                self.deselect(n);
                ReturnFlags::DESELECTION
            }
            _ => ReturnFlags::NONE,
        }
    }

    fn mouse(&mut self, ctx: &mut HandlerContext<'_>, y: i32, phase: Phase) -> ReturnFlags {
        if self.lines.is_empty() {
            return ReturnFlags::NONE;
        }
        let view = Self::view(ctx);
        let line = self.line_at(&view, y);
        let ret = match self.kind {
            TextboxKind::Normal => ReturnFlags::NONE,
            TextboxKind::Select if phase == Phase::Release => {
                if let Some(s) = self.selected {
                    self.deselect(s);
                    ctx.request_redraw();
                }
                ReturnFlags::NONE
            }
            TextboxKind::Select | TextboxKind::Hold | TextboxKind::DeselectHold => match (phase, line) {
                (Phase::Push, Some(n)) if self.kind == TextboxKind::DeselectHold && self.selected == Some(n) => {
                    self.deselect(n);
                    ReturnFlags::DESELECTION
                }
                (Phase::Push, Some(n)) => {
                    self.select(n);
                    ReturnFlags::SELECTION
                }
                _ => ReturnFlags::NONE,
            },
            TextboxKind::Multi => {
                let mut ret = ReturnFlags::NONE;
                match (phase, line, self.last_multi) {
                    (Phase::Push, Some(n), _) => {
                        self.drag_selects = !self.lines[n].selected;
                        self.last_multi = Some(n);
                        ret = self.apply_multi(n);
                    }
                    (Phase::Drag | Phase::Release, Some(n), Some(last)) if n != last => {
                        // Lines skipped by a fast drag are included.
                        let (from, to) = if n > last { (last + 1, n) } else { (n, last - 1) };
                        for i in from..=to {
                            ret |= self.apply_multi(i);
                        }
                        self.last_multi = Some(n);
                    }
                    _ => {}
                }
                if phase == Phase::Release {
                    self.last_multi = None;
                }
                ret
            }
        };
        if !ret.is_none() {
            ctx.request_redraw();
        }
        ret
    }

    /// Scroll by a line while the pointer is held above or below the text.
    fn autoscroll(&mut self, ctx: &mut HandlerContext<'_>) -> ReturnFlags {
        let view = Self::view(ctx);
        let rows = view.rows();
        let moved = if self.last_y < view.text.y() {
            self.topline > 0 && self.set_top(self.topline - 1, rows)
        } else if self.last_y >= view.text.bottom() {
            self.set_top(self.topline + 1, rows)
        } else {
            false
        };
        if moved {
            ctx.request_redraw();
            ReturnFlags::CHANGED
        } else {
            ReturnFlags::NONE
        }
    }

    fn draw(&self, ctx: &mut HandlerContext<'_>) {
        ctx.draw_box();
        let (w, surface) = ctx.painter();
        let view = View::of(w, surface);
        let font = w.label_font();
        let (sel_col, lcol) = (w.col2, w.lcol);
        let x = view.text.x() + 2;
        for (row, line) in self.lines.iter().skip(self.topline).take(view.rows()).enumerate() {
            let y = view.text.y() + row as i32 * view.line_h;
            if line.selected {
                surface.fill_rect(Rect::new(view.text.x(), y, view.text.width(), view.line_h), sel_col);
            }
            if !line.text.is_empty() {
                surface.draw_text(Point::new(x, y), &line.text, font, lcol);
            }
        }
    }
}

impl WidgetHandler for Textbox {
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
            EventKind::Attrib | EventKind::Resized => {
                let rows = Self::view(ctx).rows();
                self.set_top(self.topline, rows);
                ReturnFlags::NONE
            }
            EventKind::KeyPress => self.keyboard(ctx, event.key),
            EventKind::Push if event.key == LEFT_MOUSE => {
                if self.kind == TextboxKind::Normal
                    && let Some(s) = self.selected
                {
                    self.deselect(s);
                    ctx.request_redraw();
                }
                self.tracking = true;
                self.push_top = self.topline;
                self.last_y = event.y;
                ctx.set_want_update(true);
                self.mouse(ctx, event.y, Phase::Push)
            }
            EventKind::Motion if self.tracking => {
                self.last_y = event.y;
                self.mouse(ctx, event.y, Phase::Drag)
            }
            EventKind::Update if self.tracking => self.autoscroll(ctx),
            EventKind::Release if event.key == SCROLL_UP || event.key == SCROLL_DOWN => self.wheel(ctx, event.key),
            EventKind::Release if event.key == LEFT_MOUSE && self.tracking => {
                self.tracking = false;
                ctx.set_want_update(false);
                let mut ret = self.mouse(ctx, event.y, Phase::Release) | ReturnFlags::END;
                if self.topline != self.push_top {
                    ret |= ReturnFlags::CHANGED;
                }
                ret
            }
            EventKind::DblClick | EventKind::TrplClick => {
                let view = Self::view(ctx);
                if let Some(n) = self.line_at(&view, event.y)
                    && let Some(cb) = self.dblclick.as_mut()
                {
                    tracing::trace!(target: targets::OBJECT, id = ?ctx.id(), line = n, "textbox multi-click");
                    cb(ctx.id(), n);
                }
                ReturnFlags::NONE
            }
            _ => ReturnFlags::NONE,
        }
    }
}

impl Forms {
    /// Create a detached textbox.
    pub fn create_textbox(&mut self, kind: TextboxKind, x: i32, y: i32, w: i32, h: i32, label: &str) -> WidgetId {
        let id = self.create_widget(WidgetClass::Textbox, Some(Box::new(Textbox::new(kind))), x, y, w, h, label);
        let click_timeout = self.config.click_timeout();
        let widget = &mut self.widgets[id];
        widget.boxtype = BoxType::DownBox;
        widget.col1 = Color::COL1;
        widget.col2 = Color::YELLOW;
        widget.align = Align::BOTTOM;
        widget.wants_special_keys = true;
        widget.click_timeout = click_timeout;
        widget.how_return = ReturnFlags::SELECTION | ReturnFlags::DESELECTION;
        id
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_textbox(
        &mut self,
        form: FormId,
        kind: TextboxKind,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        label: &str,
    ) -> Result<WidgetId> {
        self.form_ref(form)?;
        let id = self.create_textbox(kind, x, y, w, h, label);
        self.place(Some(form), id)
    }

    pub fn textbox(&self, id: WidgetId) -> Result<&Textbox> {
        self.class_handler::<Textbox>(id, "textbox")
    }

    /// Change a textbox and repaint it.
    fn edit_textbox<R>(&mut self, id: WidgetId, f: impl FnOnce(&mut Textbox, usize) -> Result<R>) -> Result<R> {
        let rows = {
            let w = self.widget_ref(id)?;
            View::of(w, self.surface.as_ref()).rows()
        };
        let tb = self.class_handler_mut::<Textbox>(id, "textbox")?;
        let out = f(tb, rows)?;
        self.mark_for_redraw(id);
        self.flush_pending_redraws();
        Ok(out)
    }

    /// Append text. Each line of `text` becomes a line of the textbox.
    pub fn add_textbox_line(&mut self, id: WidgetId, text: &str) -> Result<()> {
        self.edit_textbox(id, |tb, _| {
            tb.lines.extend(text.split('\n').map(|t| Line {
                text: t.to_owned(),
                selected: false,
            }));
            Ok(())
        })
    }

    /// Insert a line before line `n`. `n` may be the line count.
    pub fn insert_textbox_line(&mut self, id: WidgetId, n: usize, text: &str) -> Result<()> {
        self.edit_textbox(id, |tb, _| {
            if n != tb.lines.len() {
                tb.check(n)?;
            }
            tb.lines.insert(n, Line {
                text: text.to_owned(),
                selected: false,
            });
            if let Some(s) = tb.selected.filter(|s| *s >= n) {
                tb.selected = Some(s + 1);
            }
            Ok(())
        })
    }

    pub fn delete_textbox_line(&mut self, id: WidgetId, n: usize) -> Result<()> {
        self.edit_textbox(id, |tb, rows| {
            tb.check(n)?;
            tb.lines.remove(n);
            tb.selected = match tb.selected {
                Some(s) if s == n => None,
                Some(s) if s > n => Some(s - 1),
                other => other,
            };
            tb.set_top(tb.topline, rows);
            Ok(())
        })
    }

    pub fn replace_textbox_line(&mut self, id: WidgetId, n: usize, text: &str) -> Result<()> {
        self.edit_textbox(id, |tb, _| {
            tb.check(n)?;
            tb.lines[n].text = text.to_owned();
            Ok(())
        })
    }

    pub fn clear_textbox(&mut self, id: WidgetId) -> Result<()> {
        self.edit_textbox(id, |tb, _| {
            tb.lines.clear();
            tb.selected = None;
            tb.topline = 0;
            tb.last_multi = None;
            Ok(())
        })
    }

    pub fn textbox_line(&self, id: WidgetId, n: usize) -> Result<&str> {
        let tb = self.textbox(id)?;
        tb.check(n)?;
        Ok(&tb.lines[n].text)
    }

    pub fn select_textbox_line(&mut self, id: WidgetId, n: usize) -> Result<()> {
        self.edit_textbox(id, |tb, _| {
            tb.check(n)?;
            tb.select(n);
            Ok(())
        })
    }

    pub fn deselect_textbox_line(&mut self, id: WidgetId, n: usize) -> Result<()> {
        self.edit_textbox(id, |tb, _| {
            tb.check(n)?;
            tb.deselect(n);
            Ok(())
        })
    }

    /// Scroll so line `n` is the first visible one, as far as the lines
    /// below it allow.
    pub fn set_textbox_topline(&mut self, id: WidgetId, n: usize) -> Result<()> {
        self.edit_textbox(id, |tb, rows| {
            tb.set_top(n, rows);
            Ok(())
        })
    }

    pub fn textbox_topline(&self, id: WidgetId) -> Result<usize> {
        Ok(self.textbox(id)?.topline())
    }

    pub fn set_textbox_dblclick_callback(
        &mut self,
        id: WidgetId,
        callback: impl FnMut(WidgetId, usize) + 'static,
    ) -> Result<()> {
        self.class_handler_mut::<Textbox>(id, "textbox")?.dblclick = Some(Box::new(callback));
        Ok(())
    }
}
