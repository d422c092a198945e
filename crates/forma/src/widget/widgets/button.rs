//! Buttons.
//!
//! A normal button reports when it is released with the pointer still on
//! it. Push buttons toggle, radio buttons turn the other radio buttons of
//! their group off, and touch buttons report CHANGED as long as they are
//! held, repeating on a timer.

use std::time::Duration;

use forma_core::keys::{LEFT_MOUSE, MIDDLE_MOUSE, RIGHT_MOUSE, code};
use forma_core::logging::targets;
use forma_core::{Event, EventKind, Point, Result, ReturnFlags, TimerId};
use forma_render::{BoxType, Color};

use crate::form::{FormId, Forms};
use crate::input::is_click_button;
use crate::widget::{HandlerContext, WidgetClass, WidgetHandler, WidgetId};

/// A completed click.
const CLICKED: ReturnFlags = ReturnFlags::END.union(ReturnFlags::CHANGED);

/// Behaviour of a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ButtonKind {
    /// Reports on release.
    #[default]
    Normal,
    /// Toggles its value on every click.
    Push,
    /// Turned on by a click, off by another radio button of its group.
    Radio,
    /// Reports repeatedly while held.
    Touch,
    /// A normal button that also fires on the Return key.
    Return,
}

/// State of a button, owned by its widget.
#[derive(Debug)]
pub struct Button {
    kind: ButtonKind,
    value: bool,
    /// Drawn pressed.
    lit: bool,
    /// Pushed by a button it reacts to and not yet released.
    held: bool,
    inside: bool,
    react_to: [bool; 3],
    repeat: Option<Duration>,
    timer: Option<TimerId>,
}

impl Button {
    pub fn new(kind: ButtonKind) -> Self {
        Self {
            kind,
            value: false,
            lit: false,
            held: false,
            inside: false,
            react_to: [true, true, true],
            repeat: None,
            timer: None,
        }
    }

    pub fn kind(&self) -> ButtonKind {
        self.kind
    }

    #[inline]
    pub fn value(&self) -> bool {
        self.value
    }

    fn reacts_to(&self, button: i32) -> bool {
        match button {
            LEFT_MOUSE => self.react_to[0],
            MIDDLE_MOUSE => self.react_to[1],
            RIGHT_MOUSE => self.react_to[2],
            _ => false,
        }
    }

    fn toggles(&self) -> bool {
        matches!(self.kind, ButtonKind::Push | ButtonKind::Radio)
    }

    fn set_lit(&mut self, ctx: &mut HandlerContext<'_>, lit: bool) {
        if self.lit != lit {
            self.lit = lit;
            ctx.request_redraw();
        }
    }

    fn stop_repeat(&mut self, ctx: &mut HandlerContext<'_>) {
        if let Some(timer) = self.timer.take() {
            ctx.stop_timer(timer);
        }
    }

    fn repeat_delay(&self, ctx: &HandlerContext<'_>) -> Duration {
        self.repeat.unwrap_or_else(|| ctx.config().slider_repeat())
    }

    /// Turn a radio button on. Returns whether it was off.
    fn select_radio(&mut self, ctx: &mut HandlerContext<'_>) -> bool {
        if self.value {
            return false;
        }
        self.value = true;
        ctx.widget_mut().pushed = true;
        let id = ctx.id();
        ctx.forms_mut().clear_other_radios(id);
        true
    }

    fn push(&mut self, ctx: &mut HandlerContext<'_>, event: &Event) -> ReturnFlags {
        if !is_click_button(event.key) || !self.reacts_to(event.key) {
            return ReturnFlags::NONE;
        }
        self.held = true;
        self.inside = true;
        match self.kind {
            ButtonKind::Touch => {
                self.value = true;
                self.set_lit(ctx, true);
                self.stop_repeat(ctx);
                let delay = self.repeat_delay(ctx) * 2;
                self.timer = Some(ctx.start_timer(delay));
                ReturnFlags::CHANGED
            }
            ButtonKind::Push => {
                let lit = !self.value;
                self.set_lit(ctx, lit);
                ReturnFlags::NONE
            }
            _ => {
                self.set_lit(ctx, true);
                ReturnFlags::NONE
            }
        }
    }

    fn motion(&mut self, ctx: &mut HandlerContext<'_>, event: &Event) -> ReturnFlags {
        if !self.held {
            return ReturnFlags::NONE;
        }
        let inside = ctx.widget().area.contains_inclusive(Point::new(event.x, event.y));
        if inside == self.inside {
            return ReturnFlags::NONE;
        }
        self.inside = inside;
        let lit = match self.kind {
            ButtonKind::Push => inside != self.value,
            ButtonKind::Radio => inside || self.value,
            _ => inside,
        };
        self.set_lit(ctx, lit);
        ReturnFlags::NONE
    }

    fn release(&mut self, ctx: &mut HandlerContext<'_>, event: &Event) -> ReturnFlags {
        self.stop_repeat(ctx);
        let inside = ctx.widget().area.contains_inclusive(Point::new(event.x, event.y));
        self.inside = false;
        if !std::mem::take(&mut self.held) {
            return ReturnFlags::NONE;
        }
        let ret = match self.kind {
            ButtonKind::Touch => {
                self.value = false;
                ReturnFlags::END
            }
            ButtonKind::Normal | ButtonKind::Return if inside => CLICKED,
            ButtonKind::Push if inside => {
                self.value = !self.value;
                CLICKED
            }
            ButtonKind::Radio if inside => {
                if self.select_radio(ctx) {
                    CLICKED
                } else {
                    ReturnFlags::END
                }
            }
            _ => ReturnFlags::NONE,
        };
        let lit = self.toggles() && self.value;
        self.set_lit(ctx, lit);
        ret
    }

    fn shortcut(&mut self, ctx: &mut HandlerContext<'_>) -> ReturnFlags {
        match self.kind {
            ButtonKind::Push => {
                self.value = !self.value;
                let lit = self.value;
                self.set_lit(ctx, lit);
                CLICKED
            }
            ButtonKind::Radio => {
                if self.select_radio(ctx) {
                    self.set_lit(ctx, true);
                    CLICKED
                } else {
                    ReturnFlags::NONE
                }
            }
            _ => CLICKED,
        }
    }
}

impl WidgetHandler for Button {
    fn handle(&mut self, ctx: &mut HandlerContext<'_>, event: &Event) -> ReturnFlags {
        match event.kind {
            EventKind::Draw => {
                let w = ctx.widget();
                let (kind, color) = if self.lit {
                    (BoxType::DownBox, w.col2)
                } else {
                    (w.boxtype, w.col1)
                };
                let (area, bw) = (w.area, w.bw);
                ctx.draw_box_with(kind, area, color, bw);
                if ctx.widget().label_inside() {
                    ctx.draw_label();
                }
                ReturnFlags::NONE
            }
            EventKind::DrawLabel => {
                ctx.draw_label_outside();
                ReturnFlags::NONE
            }
            EventKind::Push => self.push(ctx, event),
            EventKind::Motion => self.motion(ctx, event),
            EventKind::Release => self.release(ctx, event),
            EventKind::Shortcut => self.shortcut(ctx),
            EventKind::Timeout(timer) if self.timer == Some(timer) => {
                let delay = self.repeat_delay(ctx);
                self.timer = Some(ctx.start_timer(delay));
                if self.inside {
                    ReturnFlags::CHANGED
                } else {
                    ReturnFlags::NONE
                }
            }
            EventKind::Free => {
                self.stop_repeat(ctx);
                ReturnFlags::NONE
            }
            _ => ReturnFlags::NONE,
        }
    }
}

impl Forms {
    /// Create a detached button.
    pub fn create_button(&mut self, kind: ButtonKind, x: i32, y: i32, w: i32, h: i32, label: &str) -> WidgetId {
        let id = self.create_widget(WidgetClass::Button, Some(Box::new(Button::new(kind))), x, y, w, h, label);
        let widget = &mut self.widgets[id];
        widget.boxtype = BoxType::UpBox;
        widget.col1 = Color::COL1;
        widget.col2 = Color::MCOL;
        widget.how_return = match kind {
            ButtonKind::Touch => ReturnFlags::CHANGED,
            _ => ReturnFlags::END_CHANGED,
        };
        match kind {
            ButtonKind::Radio => widget.radio = true,
            ButtonKind::Return => widget.shortcuts = vec![i64::from(code::RETURN)],
            _ => {}
        }
        id
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_button(
        &mut self,
        form: FormId,
        kind: ButtonKind,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        label: &str,
    ) -> Result<WidgetId> {
        self.form_ref(form)?;
        let id = self.create_button(kind, x, y, w, h, label);
        self.place(Some(form), id)
    }

    pub fn button_value(&self, id: WidgetId) -> Result<bool> {
        Ok(self.class_handler::<Button>(id, "button")?.value())
    }

    /// Set a button's value without reporting it. Turning a radio button on
    /// turns the rest of its group off.
    pub fn set_button_value(&mut self, id: WidgetId, value: bool) -> Result<()> {
        let button = self.class_handler_mut::<Button>(id, "button")?;
        if button.value == value {
            return Ok(());
        }
        button.value = value;
        button.lit = value && button.toggles();
        let radio = button.kind == ButtonKind::Radio;
        if radio {
            self.widgets[id].pushed = value;
            if value {
                self.clear_other_radios(id);
            }
        }
        self.mark_for_redraw(id);
        self.flush_pending_redraws();
        Ok(())
    }

    /// Which of the left, middle and right buttons operate the button.
    pub fn set_button_mouse_buttons(&mut self, id: WidgetId, buttons: [bool; 3]) -> Result<()> {
        self.class_handler_mut::<Button>(id, "button")?.react_to = buttons;
        Ok(())
    }

    /// Delay between the reports of a held touch button.
    pub fn set_button_repeat(&mut self, id: WidgetId, repeat: Duration) -> Result<()> {
        self.class_handler_mut::<Button>(id, "button")?.repeat = Some(repeat);
        Ok(())
    }

    /// Radio buttons sharing a group (or, outside groups, a parent) with
    /// `id` on its form.
    fn radio_siblings(&self, id: WidgetId) -> Vec<WidgetId> {
        let w = &self.widgets[id];
        let Some(form) = w.form else {
            return Vec::new();
        };
        let (group, parent) = (w.group_id, w.parent);
        self.forms[form]
            .widgets
            .iter()
            .copied()
            .filter(|other| *other != id)
            .filter(|other| {
                let o = &self.widgets[*other];
                o.radio && o.group_id == group && o.parent == parent
            })
            .collect()
    }

    pub(crate) fn clear_other_radios(&mut self, id: WidgetId) {
        for other in self.radio_siblings(id) {
            let Some(button) = self.handler_mut::<Button>(other) else {
                continue;
            };
            if !button.value {
                continue;
            }
            button.value = false;
            button.lit = false;
            self.widgets[other].pushed = false;
            self.mark_for_redraw(other);
            tracing::trace!(target: targets::OBJECT, ?other, "radio button cleared");
        }
    }
}
