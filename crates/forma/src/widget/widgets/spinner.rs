//! Spinners: an input with an up and a down button.
//!
//! The spinner is a composite. Its children report to it and it answers
//! for them: the buttons step the value while held, the input sets it when
//! editing ends.

use forma_core::logging::targets;
use forma_core::{Align, Event, EventKind, Rect, Result, ReturnFlags};
use forma_render::{BoxType, Color};

use super::button::ButtonKind;
use super::input::{Input, InputType};
use crate::form::{FormId, Forms};
use crate::widget::{HandlerContext, WidgetClass, WidgetHandler, WidgetId};

const DEFAULT_BOUND: f64 = 10000.0;
const DEFAULT_PRECISION: usize = 6;
const MAX_PRECISION: usize = f64::DIGITS as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SpinnerType {
    #[default]
    Int,
    Float,
}

/// State of a spinner, owned by its widget.
#[derive(Debug)]
pub struct Spinner {
    kind: SpinnerType,
    value: f64,
    /// The value when the last interaction ended.
    reported: f64,
    min: f64,
    max: f64,
    step: f64,
    precision: usize,
    input: WidgetId,
    up: WidgetId,
    down: WidgetId,
}

impl Spinner {
    pub fn kind(&self) -> SpinnerType {
        self.kind
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn precision(&self) -> usize {
        self.precision
    }

    /// The input child.
    pub fn input(&self) -> WidgetId {
        self.input
    }

    /// The up and down buttons.
    pub fn buttons(&self) -> (WidgetId, WidgetId) {
        (self.up, self.down)
    }

    fn clamp(&self, value: f64) -> f64 {
        let value = value.clamp(self.min, self.max);
        match self.kind {
            SpinnerType::Int => value.round(),
            SpinnerType::Float => value,
        }
    }

    fn format(&self) -> String {
        match self.kind {
            SpinnerType::Int => format!("{}", self.value as i64),
            SpinnerType::Float => format!("{:.*}", self.precision, self.value),
        }
    }

    fn parse(&self, text: &str) -> Option<f64> {
        let text = text.trim();
        match self.kind {
            SpinnerType::Int => text.parse::<i64>().ok().map(|v| v as f64),
            SpinnerType::Float => text.parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }

    fn show_value(&self, ctx: &mut HandlerContext<'_>) {
        let text = self.format();
        if let Some(input) = ctx.child_handler_mut::<Input>(self.input) {
            input.set_text(&text);
        }
        ctx.forms_mut().mark_for_redraw(self.input);
    }

    /// Child boxes: the input on the left, the buttons stacked on the right.
    fn layout(area: Rect) -> [Rect; 3] {
        let side = (area.height() / 2).max(1);
        let bx = area.x() + area.width() - side - 1;
        [
            Rect::new(area.x(), area.y(), area.width() - side - 1, 2 * side),
            Rect::new(bx, area.y(), side, side),
            Rect::new(bx, area.y() + side, side, side),
        ]
    }

    fn relayout(&self, ctx: &mut HandlerContext<'_>) {
        let area = ctx.widget().area;
        let children = [self.input, self.up, self.down];
        for (child, rect) in children.into_iter().zip(Self::layout(area)) {
            if let Err(err) = ctx.forms_mut().set_geometry(child, rect) {
                tracing::debug!(target: targets::OBJECT, ?child, %err, "spinner child not laid out");
            }
        }
    }

    /// Result of the input finishing an edit.
    fn input_done(&mut self, ctx: &mut HandlerContext<'_>) -> ReturnFlags {
        let text = ctx
            .forms()
            .handler::<Input>(self.input)
            .map(|i| i.text().to_owned())
            .unwrap_or_default();
        if let Some(value) = self.parse(&text) {
            self.value = self.clamp(value);
        }
        self.show_value(ctx);
        self.finish()
    }

    fn finish(&mut self) -> ReturnFlags {
        let mut ret = ReturnFlags::END;
        if self.value != self.reported {
            ret |= ReturnFlags::CHANGED;
        }
        self.reported = self.value;
        ret
    }

    fn nudge(&mut self, ctx: &mut HandlerContext<'_>, up: bool) -> ReturnFlags {
        let old = self.value;
        let delta = if up { self.step } else { -self.step };
        self.value = self.clamp(self.value + delta);
        self.show_value(ctx);
        if self.value != old {
            ReturnFlags::CHANGED
        } else {
            ReturnFlags::NONE
        }
    }
}

impl WidgetHandler for Spinner {
    fn handle(&mut self, ctx: &mut HandlerContext<'_>, event: &Event) -> ReturnFlags {
        match event.kind {
            EventKind::DrawLabel => ctx.draw_label_outside(),
            EventKind::Attrib => {
                let align = ctx.widget().align;
                ctx.widget_mut().align = align.to_outside();
            }
            EventKind::Resized => self.relayout(ctx),
            _ => {}
        }
        ReturnFlags::NONE
    }

    fn child_returned(&mut self, ctx: &mut HandlerContext<'_>, child: WidgetId, flags: ReturnFlags) -> ReturnFlags {
        if child == self.input {
            if !flags.is_end() {
                return ReturnFlags::NONE;
            }
            return self.input_done(ctx);
        }
        let up = child == self.up;
        if !up && child != self.down {
            return ReturnFlags::NONE;
        }
        let mut ret = ReturnFlags::NONE;
        if flags.is_changed() {
            ret |= self.nudge(ctx, up);
        }
        if flags.is_end() {
            ret |= self.finish();
        }
        ret
    }
}

impl Forms {
    /// Create a detached spinner together with its children.
    pub fn create_spinner(&mut self, kind: SpinnerType, x: i32, y: i32, w: i32, h: i32, label: &str) -> WidgetId {
        let area = Rect::new(x, y, w, h);
        let [ia, ua, da] = Spinner::layout(area);
        let input_kind = match kind {
            SpinnerType::Int => InputType::Int,
            SpinnerType::Float => InputType::Float,
        };
        let input = self.create_input(input_kind, ia.x(), ia.y(), ia.width(), ia.height(), "");
        let up = self.create_button(ButtonKind::Touch, ua.x(), ua.y(), ua.width(), ua.height(), "+");
        let down = self.create_button(ButtonKind::Touch, da.x(), da.y(), da.width(), da.height(), "-");
        self.widgets[input].how_return = ReturnFlags::ALWAYS;
        for button in [up, down] {
            let b = &mut self.widgets[button];
            b.how_return = ReturnFlags::CHANGED | ReturnFlags::END;
            b.lcol = Color::BLUE;
        }

        let spinner = Spinner {
            kind,
            value: 0.0,
            reported: 0.0,
            min: -DEFAULT_BOUND,
            max: DEFAULT_BOUND,
            step: 1.0,
            precision: DEFAULT_PRECISION,
            input,
            up,
            down,
        };
        let text = spinner.format();
        if let Some(i) = self.handler_mut::<Input>(input) {
            i.set_text(&text);
        }

        let id = self.create_widget(WidgetClass::Spinner, Some(Box::new(spinner)), x, y, w, h, label);
        let widget = &mut self.widgets[id];
        widget.boxtype = BoxType::NoBox;
        widget.align = Align::LEFT;
        widget.how_return = ReturnFlags::CHANGED;
        for child in [input, up, down] {
            self.widgets[child].parent = Some(id);
            self.widgets[id].children.push(child);
        }
        id
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_spinner(
        &mut self,
        form: FormId,
        kind: SpinnerType,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        label: &str,
    ) -> Result<WidgetId> {
        self.form_ref(form)?;
        let id = self.create_spinner(kind, x, y, w, h, label);
        self.place(Some(form), id)
    }

    pub fn spinner(&self, id: WidgetId) -> Result<&Spinner> {
        self.class_handler::<Spinner>(id, "spinner")
    }

    pub fn spinner_value(&self, id: WidgetId) -> Result<f64> {
        Ok(self.spinner(id)?.value())
    }

    /// Set the value, clamped to the bounds, without reporting it.
    pub fn set_spinner_value(&mut self, id: WidgetId, value: f64) -> Result<()> {
        let sp = self.class_handler_mut::<Spinner>(id, "spinner")?;
        sp.value = sp.clamp(value);
        sp.reported = sp.value;
        self.sync_spinner(id);
        Ok(())
    }

    /// Set the bounds. Reversed bounds are swapped.
    pub fn set_spinner_bounds(&mut self, id: WidgetId, min: f64, max: f64) -> Result<()> {
        let sp = self.class_handler_mut::<Spinner>(id, "spinner")?;
        let (min, max) = if min > max { (max, min) } else { (min, max) };
        sp.min = min;
        sp.max = max;
        sp.step = sp.step.min(max - min);
        sp.value = sp.clamp(sp.value);
        sp.reported = sp.value;
        self.sync_spinner(id);
        Ok(())
    }

    pub fn spinner_bounds(&self, id: WidgetId) -> Result<(f64, f64)> {
        Ok(self.spinner(id)?.bounds())
    }

    /// Set the amount a button click changes the value. Non-positive steps
    /// are ignored; int spinners round the step and never go below one.
    pub fn set_spinner_step(&mut self, id: WidgetId, step: f64) -> Result<()> {
        let sp = self.class_handler_mut::<Spinner>(id, "spinner")?;
        if step <= 0.0 {
            return Ok(());
        }
        let step = match sp.kind {
            SpinnerType::Int => step.round().max(1.0),
            SpinnerType::Float => step,
        };
        sp.step = step.min(sp.max - sp.min);
        Ok(())
    }

    /// Digits shown after the decimal point by float spinners.
    pub fn set_spinner_precision(&mut self, id: WidgetId, precision: usize) -> Result<()> {
        let sp = self.class_handler_mut::<Spinner>(id, "spinner")?;
        sp.precision = precision.min(MAX_PRECISION);
        self.sync_spinner(id);
        Ok(())
    }

    fn sync_spinner(&mut self, id: WidgetId) {
        let Some(sp) = self.handler::<Spinner>(id) else {
            return;
        };
        let (input, text) = (sp.input, sp.format());
        if let Some(i) = self.handler_mut::<Input>(input) {
            i.set_text(&text);
        }
        self.mark_for_redraw(input);
        self.flush_pending_redraws();
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use forma_core::FormsConfig;
    use forma_core::keys::{LEFT_MOUSE, code};
    use forma_render::{RecordingSurface, WindowHandle};

    use super::*;
    use crate::input::InputEvent;

    const WIN: WindowHandle = WindowHandle(10);

    fn shown() -> (Forms, FormId, Instant) {
        let mut forms = Forms::with_config(RecordingSurface::new(), FormsConfig::default());
        let form = forms.create_form(300, 200, "");
        forms.show_form(form, WIN).unwrap();
        let now = forms.now();
        (forms, form, now)
    }

    fn center(forms: &Forms, id: WidgetId) -> (i32, i32) {
        let r = forms.widget(id).unwrap().geometry();
        (r.x() + r.width() / 2, r.y() + r.height() / 2)
    }

    #[test]
    fn test_defaults_and_children() {
        let (mut forms, form, _) = shown();
        let s = forms.add_spinner(form, SpinnerType::Int, 50, 10, 100, 30, "n").unwrap();
        assert_eq!(forms.spinner_bounds(s).unwrap(), (-10000.0, 10000.0));
        assert_eq!(forms.spinner(s).unwrap().step(), 1.0);
        let input = forms.spinner(s).unwrap().input();
        assert_eq!(forms.input_text(input).unwrap(), "0");
        assert_eq!(forms.widget(s).unwrap().children().len(), 3);
        assert_eq!(forms.widget(input).unwrap().form(), Some(form));
        // Children follow the spinner in the z-order.
        let list = forms.form(form).unwrap().widgets();
        assert_eq!(list.first(), Some(&s));
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn test_up_button_steps_and_reports_spinner() {
        let (mut forms, form, t0) = shown();
        let s = forms.add_spinner(form, SpinnerType::Int, 50, 10, 100, 30, "").unwrap();
        let (up, _) = forms.spinner(s).unwrap().buttons();
        let (x, y) = center(&forms, up);
        forms.handle_input(InputEvent::press(WIN, LEFT_MOUSE, x, y, t0));
        forms.handle_input(InputEvent::release(WIN, LEFT_MOUSE, x, y, t0));
        assert_eq!(forms.spinner_value(s).unwrap(), 1.0);
        let input = forms.spinner(s).unwrap().input();
        assert_eq!(forms.input_text(input).unwrap(), "1");
        assert_eq!(forms.check_forms(), Some(s));
    }

    #[test]
    fn test_held_button_repeats_until_bound() {
        let (mut forms, form, t0) = shown();
        let s = forms.add_spinner(form, SpinnerType::Int, 50, 10, 100, 30, "").unwrap();
        forms.set_spinner_bounds(s, 0.0, 2.0).unwrap();
        let (up, _) = forms.spinner(s).unwrap().buttons();
        let (x, y) = center(&forms, up);
        forms.handle_input(InputEvent::press(WIN, LEFT_MOUSE, x, y, t0));
        forms.step(t0 + Duration::from_millis(200));
        forms.step(t0 + Duration::from_millis(300));
        forms.step(t0 + Duration::from_millis(400));
        assert_eq!(forms.spinner_value(s).unwrap(), 2.0);
    }

    #[test]
    fn test_typed_value_is_clamped() {
        let (mut forms, form, t0) = shown();
        let s = forms.add_spinner(form, SpinnerType::Int, 50, 10, 100, 30, "").unwrap();
        forms.set_spinner_bounds(s, -5.0, 50.0).unwrap();
        let input = forms.spinner(s).unwrap().input();
        forms.set_focus(form, Some(input)).unwrap();
        assert_eq!(forms.focus(form), Some(s));
        forms.handle_input(InputEvent::key(WIN, code::BACKSPACE, t0));
        for c in "99".chars() {
            forms.handle_input(InputEvent::key(WIN, c as i32, t0));
        }
        forms.handle_input(InputEvent::key(WIN, code::RETURN, t0));
        assert_eq!(forms.spinner_value(s).unwrap(), 50.0);
        assert_eq!(forms.input_text(input).unwrap(), "50");
        assert_eq!(forms.check_forms(), Some(s));
    }

    #[test]
    fn test_float_spinner_precision() {
        let (mut forms, form, _) = shown();
        let s = forms.add_spinner(form, SpinnerType::Float, 50, 10, 100, 30, "").unwrap();
        forms.set_spinner_precision(s, 2).unwrap();
        forms.set_spinner_value(s, 1.234).unwrap();
        let input = forms.spinner(s).unwrap().input();
        assert_eq!(forms.input_text(input).unwrap(), "1.23");
        forms.set_spinner_precision(s, 99).unwrap();
        assert_eq!(forms.spinner(s).unwrap().precision(), f64::DIGITS as usize);
    }

    #[test]
    fn test_step_rules() {
        let (mut forms, form, _) = shown();
        let s = forms.add_spinner(form, SpinnerType::Int, 50, 10, 100, 30, "").unwrap();
        forms.set_spinner_step(s, 0.2).unwrap();
        assert_eq!(forms.spinner(s).unwrap().step(), 1.0);
        forms.set_spinner_step(s, -3.0).unwrap();
        assert_eq!(forms.spinner(s).unwrap().step(), 1.0);
        forms.set_spinner_step(s, 1e9).unwrap();
        assert_eq!(forms.spinner(s).unwrap().step(), 20000.0);
    }

    #[test]
    fn test_resize_relays_children() {
        let (mut forms, form, _) = shown();
        let s = forms.add_spinner(form, SpinnerType::Int, 50, 10, 100, 30, "").unwrap();
        forms.set_size(s, 120, 40).unwrap();
        let (up, down) = forms.spinner(s).unwrap().buttons();
        assert_eq!(forms.widget(up).unwrap().geometry(), Rect::new(149, 10, 20, 20));
        assert_eq!(forms.widget(down).unwrap().geometry(), Rect::new(149, 30, 20, 20));
    }
}
