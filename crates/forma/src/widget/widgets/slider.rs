//! Slider widget implementation.
//!
//! A [`Slider`] picks a value between two bounds by dragging a knob along a
//! track. The bounds may be given in either order; the value is always
//! clamped to the range they span.
//!
//! Pushing the track grabs the knob: on the knob it is dragged from where
//! it was grabbed, anywhere else it jumps to the pointer first. Holding
//! Shift while dragging moves the knob at a quarter of the pointer's speed.
//! Scrollbar style sliders instead step by the increment when pushed off
//! the knob and keep stepping while the button is held.
//!
//! # Example
//!
//! ```ignore
//! let slider = forms.add_slider(form, SliderStyle::Normal, Orientation::Horizontal, 10, 10, 200, 20, "volume")?;
//! forms.set_slider_bounds(slider, 0.0, 10.0)?;
//! forms.set_slider_value(slider, 5.0)?;
//! forms.set_return_policy(slider, ReturnFlags::END_CHANGED)?;
//! ```

use std::time::Duration;

use forma_core::keys::{LEFT_MOUSE, MIDDLE_MOUSE, RIGHT_MOUSE, SCROLL_DOWN, SCROLL_UP};
use forma_core::{Align, Event, EventKind, Modifiers, Point, Rect, Result, ReturnFlags, Size, TimerId, crnd};
use forma_render::{BoxType, Color};

use crate::form::{FormId, Forms};
use crate::input::is_click_button;
use crate::widget::{HandlerContext, WidgetClass, WidgetHandler, WidgetId};

/// Pointer movement is scaled by this while Shift is held.
const FINE_FACTOR: f64 = 0.25;

/// Smallest width of a value box beside a horizontal slider.
const VALUE_BOX_MIN_W: i32 = 35;

/// Height of a value box above a vertical slider.
const VALUE_BOX_H: i32 = 25;

/// Direction of a slider's track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    /// Minimum on the left.
    #[default]
    Horizontal,
    /// Minimum at the top.
    Vertical,
}

/// How the value is shown on the track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SliderStyle {
    /// A knob at the value.
    #[default]
    Normal,
    /// The track filled up to the value.
    Fill,
    /// A knob that steps by the increment when the track beside it is pushed.
    Scrollbar,
}

/// Formats the value shown in a value box.
pub type ValueFilter = Box<dyn Fn(f64, usize) -> String>;

/// State of a slider, owned by its widget.
pub struct Slider {
    orientation: Orientation,
    style: SliderStyle,
    min: f64,
    max: f64,
    val: f64,
    start_val: f64,
    step: f64,
    ldelta: f64,
    rdelta: f64,
    size: f64,
    precision: usize,
    repeat: Option<Duration>,
    react_to: [bool; 3],
    value_box: bool,
    filter: Option<ValueFilter>,

    // Interaction state, only meaningful between PUSH and RELEASE.
    grab_offset: f64,
    off_knob: i32,
    button: i32,
    last_pos: i32,
    timer: Option<TimerId>,
    fine_base: Option<i32>,
}

impl Slider {
    pub fn new(orientation: Orientation, style: SliderStyle) -> Self {
        Self {
            orientation,
            style,
            min: 0.0,
            max: 1.0,
            val: 0.5,
            start_val: 0.5,
            step: 0.0,
            ldelta: 0.1,
            rdelta: 0.05,
            size: if style == SliderStyle::Scrollbar { 0.15 } else { 0.1 },
            precision: 2,
            repeat: None,
            react_to: [true, false, false],
            value_box: false,
            filter: None,
            grab_offset: 0.0,
            off_knob: 0,
            button: 0,
            last_pos: 0,
            timer: None,
            fine_base: None,
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn style(&self) -> SliderStyle {
        self.style
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.val
    }

    /// The bounds as given, not necessarily in ascending order.
    pub fn bounds(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Increments for the left and right mouse button.
    pub fn increment(&self) -> (f64, f64) {
        (self.ldelta, self.rdelta)
    }

    /// Knob size as a fraction of the track.
    pub fn knob_size(&self) -> f64 {
        self.size
    }

    pub fn precision(&self) -> usize {
        self.precision
    }

    pub fn has_value_box(&self) -> bool {
        self.value_box
    }

    /// Set the value, clamped to the bounds. Returns whether it changed.
    pub fn set_value(&mut self, value: f64) -> bool {
        let value = self.clamp(value);
        self.start_val = value;
        if value == self.val {
            return false;
        }
        self.val = value;
        true
    }

    /// Set the bounds, in either order, and clamp the value into them.
    pub fn set_bounds(&mut self, min: f64, max: f64) -> bool {
        if self.min == min && self.max == max {
            return false;
        }
        self.min = min;
        self.max = max;
        self.val = self.clamp(self.val);
        self.start_val = self.val;
        true
    }

    /// Values picked with the mouse are rounded to multiples of `step`.
    /// Zero turns rounding off.
    pub fn set_step(&mut self, step: f64) {
        self.step = step.abs();
    }

    pub fn set_increment(&mut self, left: f64, right: f64) {
        self.ldelta = left;
        self.rdelta = right;
    }

    pub fn set_knob_size(&mut self, size: f64) -> bool {
        let size = size.clamp(0.0, 1.0);
        let changed = size != self.size;
        self.size = size;
        changed
    }

    pub fn set_precision(&mut self, precision: usize) -> bool {
        let precision = precision.min(10);
        let changed = precision != self.precision;
        self.precision = precision;
        changed
    }

    pub fn set_repeat(&mut self, repeat: Duration) {
        self.repeat = Some(repeat);
    }

    /// Which of the left, middle and right buttons operate the slider.
    pub fn set_mouse_buttons(&mut self, buttons: [bool; 3]) {
        self.react_to = buttons;
    }

    pub fn set_filter(&mut self, filter: Option<ValueFilter>) {
        self.filter = filter;
    }

    /// Text of the value box.
    pub fn value_text(&self) -> String {
        match &self.filter {
            Some(filter) => filter(self.val, self.precision),
            None => format!("{:.*}", self.precision, self.val),
        }
    }

    fn sorted_bounds(&self) -> (f64, f64) {
        if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        }
    }

    fn clamp(&self, value: f64) -> f64 {
        let (lo, hi) = self.sorted_bounds();
        value.clamp(lo, hi)
    }

    fn round_and_clamp(&self, value: f64) -> f64 {
        let value = if self.step > 0.0 {
            (value / self.step).round() * self.step
        } else {
            value
        };
        self.clamp(value)
    }

    fn reacts_to(&self, button: i32) -> bool {
        match button {
            LEFT_MOUSE => self.react_to[0],
            MIDDLE_MOUSE => self.react_to[1],
            RIGHT_MOUSE => self.react_to[2],
            _ => false,
        }
    }

    /// Position of the value between the bounds, 0 at `min`, 1 at `max`.
    fn fraction(&self) -> f64 {
        if self.max == self.min {
            0.0
        } else {
            ((self.val - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
        }
    }

    /// The track and the value box inside the widget's box.
    fn split(&self, area: Rect) -> (Rect, Option<Rect>) {
        if !self.value_box {
            return (area, None);
        }
        match self.orientation {
            Orientation::Horizontal => {
                let w = VALUE_BOX_MIN_W.max(crnd(0.18 * f64::from(area.width()))).min(area.width());
                (
                    Rect::new(area.x() + w, area.y(), area.width() - w, area.height()),
                    Some(Rect::new(area.x(), area.y(), w, area.height())),
                )
            }
            Orientation::Vertical => {
                let h = VALUE_BOX_H.min(area.height());
                (
                    Rect::new(area.x(), area.y() + h, area.width(), area.height() - h),
                    Some(Rect::new(area.x(), area.y(), area.width(), h)),
                )
            }
        }
    }

    /// Start and length of the track along its axis.
    fn axis(&self, track: Rect) -> (i32, i32) {
        match self.orientation {
            Orientation::Horizontal => (track.x(), track.width()),
            Orientation::Vertical => (track.y(), track.height()),
        }
    }

    /// Length of the knob along the axis. Fill sliders have none.
    fn knob_len(&self, len: i32, bw: i32) -> f64 {
        match self.style {
            SliderStyle::Fill => 0.0,
            _ => self.size * f64::from((len - 2 * bw).max(0)),
        }
    }

    /// Distance of the knob's center from the track's start.
    fn knob_center(&self, len: i32, bw: i32) -> f64 {
        let mw = self.knob_len(len, bw);
        let usable = f64::from((len - 2 * bw).max(0));
        f64::from(bw) + (usable - mw) * self.fraction() + mw / 2.0
    }

    /// The knob (or the filled part) in form coordinates.
    fn knob_rect(&self, track: Rect, bw: i32) -> Rect {
        let (_, len) = self.axis(track);
        let usable = f64::from((len - 2 * bw).max(0));
        let (start, extent) = match self.style {
            SliderStyle::Fill => (bw, crnd(usable * self.fraction())),
            _ => {
                let mw = self.knob_len(len, bw);
                (bw + crnd((usable - mw) * self.fraction()), crnd(mw).max(1))
            }
        };
        match self.orientation {
            Orientation::Horizontal => {
                Rect::new(track.x() + start, track.y() + bw, extent, track.height() - 2 * bw)
            }
            Orientation::Vertical => Rect::new(track.x() + bw, track.y() + start, track.width() - 2 * bw, extent),
        }
    }

    /// The value under a pointer at `pos` along the axis, relative to the
    /// track's start.
    fn value_at(&self, pos: f64, len: i32, bw: i32) -> f64 {
        let mw = self.knob_len(len, bw);
        let b = f64::from(bw);
        let len = f64::from(len);
        let span = len - mw - 2.0 * b;
        // A knob filling the whole track leaves nothing to move along.
        if span <= 0.0 {
            self.val
        } else if pos < 0.5 * mw + b {
            self.min
        } else if pos > len - 0.5 * mw - b {
            self.max
        } else {
            self.min + (self.max - self.min) * (pos - 0.5 * mw - b) / span
        }
    }

    fn track_pos(&self, track: Rect, event: &Event) -> i32 {
        match self.orientation {
            Orientation::Horizontal => event.x - track.x(),
            Orientation::Vertical => event.y - track.y(),
        }
    }

    fn repeat_delay(&self, ctx: &HandlerContext<'_>) -> Duration {
        self.repeat.unwrap_or_else(|| ctx.config().slider_repeat())
    }

    /// Move the value for the pointer at `pos`. Returns CHANGED if it moved.
    fn track_mouse(&mut self, ctx: &mut HandlerContext<'_>, pos: i32, fine: bool) -> ReturnFlags {
        let area = ctx.widget().area;
        let bw = ctx.widget().bw.abs();
        let (track, _) = self.split(area);
        let (_, len) = self.axis(track);

        let target = if self.off_knob != 0 {
            if self.timer.is_some() {
                return ReturnFlags::NONE;
            }
            let delta = if self.button == LEFT_MOUSE { self.ldelta } else { self.rdelta };
            let first = !ctx.widget().want_update;
            let delay = self.repeat_delay(ctx) * if first { 2 } else { 1 };
            self.timer = Some(ctx.start_timer(delay));
            ctx.set_want_update(true);
            let toward_max = if self.max >= self.min { 1.0 } else { -1.0 };
            self.val + f64::from(self.off_knob) * delta * toward_max
        } else {
            let pos = match (fine, self.fine_base) {
                (true, Some(base)) => f64::from(base) + FINE_FACTOR * f64::from(pos - base),
                (true, None) => {
                    self.fine_base = Some(pos);
                    f64::from(pos)
                }
                (false, _) => {
                    self.fine_base = None;
                    f64::from(pos)
                }
            };
            self.value_at(pos + self.grab_offset, len, bw)
        };

        let value = self.round_and_clamp(target);
        if value == self.val {
            return ReturnFlags::NONE;
        }
        self.val = value;
        ctx.request_redraw();
        ReturnFlags::CHANGED
    }

    fn push(&mut self, ctx: &mut HandlerContext<'_>, event: &Event) -> ReturnFlags {
        if !is_click_button(event.key) || !self.reacts_to(event.key) {
            return ReturnFlags::NONE;
        }
        let area = ctx.widget().area;
        let bw = ctx.widget().bw.abs();
        let (track, _) = self.split(area);
        if !track.contains_inclusive(Point::new(event.x, event.y)) {
            return ReturnFlags::NONE;
        }

        self.start_val = self.val;
        self.button = event.key;
        self.fine_base = None;
        ctx.set_want_update(false);

        let (_, len) = self.axis(track);
        let pos = self.track_pos(track, event);
        self.last_pos = pos;
        let center = self.knob_center(len, bw);
        let half = self.knob_len(len, bw) / 2.0;
        let on_knob = (f64::from(pos) - center).abs() <= half;

        self.off_knob = 0;
        self.grab_offset = 0.0;
        if on_knob && self.style != SliderStyle::Fill {
            // Grabbed where it is: nothing moves until the pointer does.
            self.grab_offset = center - f64::from(pos);
            return ReturnFlags::NONE;
        } else if self.style == SliderStyle::Scrollbar {
            self.off_knob = if f64::from(pos) < center { -1 } else { 1 };
        }

        let fine = event.modifiers.contains(Modifiers::SHIFT);
        let ret = self.track_mouse(ctx, pos, fine);
        if !ret.is_none() && !ctx.widget().how_return.contains(ReturnFlags::END_CHANGED) {
            self.start_val = self.val;
        }
        ret
    }

    fn release(&mut self, ctx: &mut HandlerContext<'_>, event: &Event) -> ReturnFlags {
        if let Some(timer) = self.timer.take() {
            ctx.stop_timer(timer);
        }
        ctx.set_want_update(false);
        self.off_knob = 0;
        self.fine_base = None;

        if event.key == SCROLL_UP || event.key == SCROLL_DOWN {
            if self.style != SliderStyle::Scrollbar {
                return ReturnFlags::NONE;
            }
            let shift = event.modifiers.contains(Modifiers::SHIFT);
            let delta = if shift { self.rdelta } else { self.ldelta / 2.0 };
            let toward_max = if self.max >= self.min { 1.0 } else { -1.0 };
            let sign = if event.key == SCROLL_UP { -1.0 } else { 1.0 };
            let value = self.round_and_clamp(self.val + sign * delta * toward_max);
            if value == self.val {
                return ReturnFlags::NONE;
            }
            self.val = value;
            self.start_val = value;
            ctx.request_redraw();
            return ReturnFlags::CHANGED | ReturnFlags::END;
        }

        if !self.reacts_to(event.key) {
            return ReturnFlags::NONE;
        }
        let mut ret = ReturnFlags::END;
        if self.start_val != self.val {
            ret |= ReturnFlags::CHANGED;
        }
        ret
    }

    fn draw(&self, ctx: &mut HandlerContext<'_>) {
        let (w, surface) = ctx.painter();
        let bw = w.bw;
        let (track, value_box) = self.split(w.area);
        forma_render::draw_box(surface, w.boxtype, track, w.col1, bw);

        let knob = self.knob_rect(track, bw.abs());
        match self.style {
            SliderStyle::Fill => forma_render::draw_box(surface, BoxType::FlatBox, knob, w.col2, bw),
            _ => forma_render::draw_box(surface, BoxType::UpBox, knob, w.col2, bw),
        }

        if let Some(vb) = value_box {
            let text = self.value_text();
            forma_render::draw_box(surface, BoxType::FlatBox, vb, w.col1, bw);
            forma_render::draw_text_aligned(
                surface,
                Align::CENTER,
                vb,
                Size::ZERO,
                &text,
                w.label_font(),
                w.lcol,
            );
        }
    }
}

impl WidgetHandler for Slider {
    fn handle(&mut self, ctx: &mut HandlerContext<'_>, event: &Event) -> ReturnFlags {
        match event.kind {
            EventKind::Draw => {
                self.draw(ctx);
                if ctx.widget().label_inside() && !ctx.widget().align.is_center() {
                    ctx.draw_label();
                }
                ReturnFlags::NONE
            }
            EventKind::DrawLabel => {
                ctx.draw_label_outside();
                ReturnFlags::NONE
            }
            EventKind::Push => self.push(ctx, event),
            EventKind::Motion => {
                if !ctx.widget().pushed || self.button == 0 {
                    return ReturnFlags::NONE;
                }
                let (track, _) = self.split(ctx.widget().area);
                let pos = self.track_pos(track, event);
                self.last_pos = pos;
                let fine = event.modifiers.contains(Modifiers::SHIFT);
                let ret = self.track_mouse(ctx, pos, fine);
                if !ret.is_none() && !ctx.widget().how_return.contains(ReturnFlags::END_CHANGED) {
                    self.start_val = self.val;
                }
                ret
            }
            EventKind::Update => {
                if self.off_knob == 0 {
                    return ReturnFlags::NONE;
                }
                self.track_mouse(ctx, self.last_pos, false)
            }
            EventKind::Timeout(timer) => {
                if self.timer == Some(timer) {
                    self.timer = None;
                }
                ReturnFlags::NONE
            }
            EventKind::Release => {
                let ret = self.release(ctx, event);
                self.button = 0;
                ret
            }
            EventKind::Attrib => {
                // A label centered on the knob would be unreadable.
                let align = ctx.widget().align;
                if align.is_inside() && !align.is_center() {
                    ctx.widget_mut().align = align.to_outside();
                }
                ReturnFlags::NONE
            }
            EventKind::Free => {
                if let Some(timer) = self.timer.take() {
                    ctx.stop_timer(timer);
                }
                ReturnFlags::NONE
            }
            _ => ReturnFlags::NONE,
        }
    }
}

impl Forms {
    #[allow(clippy::too_many_arguments)]
    fn new_slider(
        &mut self,
        class: WidgetClass,
        style: SliderStyle,
        orientation: Orientation,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        label: &str,
    ) -> WidgetId {
        let mut slider = Slider::new(orientation, style);
        slider.value_box = class == WidgetClass::ValSlider;
        let id = self.create_widget(class, Some(Box::new(slider)), x, y, w, h, label);
        let widget = &mut self.widgets[id];
        widget.boxtype = BoxType::DownBox;
        widget.col1 = Color::COL1;
        widget.col2 = if style == SliderStyle::Fill { Color::MCOL } else { Color::COL1 };
        widget.align = Align::BOTTOM;
        widget.how_return = ReturnFlags::CHANGED;
        widget.dbl_buffer = true;
        widget.dbl_background = widget.col1;
        id
    }

    /// Create a detached slider.
    #[allow(clippy::too_many_arguments)]
    pub fn create_slider(
        &mut self,
        style: SliderStyle,
        orientation: Orientation,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        label: &str,
    ) -> WidgetId {
        self.new_slider(WidgetClass::Slider, style, orientation, x, y, w, h, label)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_slider(
        &mut self,
        form: FormId,
        style: SliderStyle,
        orientation: Orientation,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        label: &str,
    ) -> Result<WidgetId> {
        self.form_ref(form)?;
        let id = self.create_slider(style, orientation, x, y, w, h, label);
        self.place(Some(form), id)
    }

    /// Create a detached slider with a box showing its value.
    #[allow(clippy::too_many_arguments)]
    pub fn create_valslider(
        &mut self,
        style: SliderStyle,
        orientation: Orientation,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        label: &str,
    ) -> WidgetId {
        self.new_slider(WidgetClass::ValSlider, style, orientation, x, y, w, h, label)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_valslider(
        &mut self,
        form: FormId,
        style: SliderStyle,
        orientation: Orientation,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        label: &str,
    ) -> Result<WidgetId> {
        self.form_ref(form)?;
        let id = self.create_valslider(style, orientation, x, y, w, h, label);
        self.place(Some(form), id)
    }

    pub fn slider(&self, id: WidgetId) -> Result<&Slider> {
        self.class_handler::<Slider>(id, "slider")
    }

    /// Change a slider and repaint it if `update` says it changed.
    fn update_slider(&mut self, id: WidgetId, update: impl FnOnce(&mut Slider) -> bool) -> Result<()> {
        if update(self.class_handler_mut::<Slider>(id, "slider")?) {
            self.mark_for_redraw(id);
            self.flush_pending_redraws();
        }
        Ok(())
    }

    /// Set the value, clamped to the bounds.
    pub fn set_slider_value(&mut self, id: WidgetId, value: f64) -> Result<()> {
        self.update_slider(id, |s| s.set_value(value))
    }

    pub fn slider_value(&self, id: WidgetId) -> Result<f64> {
        Ok(self.slider(id)?.value())
    }

    /// Set the bounds in either order. The value is clamped into them.
    pub fn set_slider_bounds(&mut self, id: WidgetId, min: f64, max: f64) -> Result<()> {
        self.update_slider(id, |s| s.set_bounds(min, max))
    }

    pub fn slider_bounds(&self, id: WidgetId) -> Result<(f64, f64)> {
        Ok(self.slider(id)?.bounds())
    }

    pub fn set_slider_step(&mut self, id: WidgetId, step: f64) -> Result<()> {
        self.update_slider(id, |s| {
            s.set_step(step);
            false
        })
    }

    pub fn set_slider_increment(&mut self, id: WidgetId, left: f64, right: f64) -> Result<()> {
        self.update_slider(id, |s| {
            s.set_increment(left, right);
            false
        })
    }

    /// Knob size as a fraction of the track, between 0 and 1.
    pub fn set_slider_size(&mut self, id: WidgetId, size: f64) -> Result<()> {
        self.update_slider(id, |s| s.set_knob_size(size))
    }

    /// Decimals shown in a value box.
    pub fn set_slider_precision(&mut self, id: WidgetId, precision: usize) -> Result<()> {
        self.update_slider(id, |s| s.set_precision(precision))
    }

    /// Delay between the steps of a held scrollbar.
    pub fn set_slider_repeat(&mut self, id: WidgetId, repeat: Duration) -> Result<()> {
        self.update_slider(id, |s| {
            s.set_repeat(repeat);
            false
        })
    }

    pub fn set_slider_mouse_buttons(&mut self, id: WidgetId, buttons: [bool; 3]) -> Result<()> {
        self.update_slider(id, |s| {
            s.set_mouse_buttons(buttons);
            false
        })
    }

    /// Format the value box text with `filter` instead of the precision.
    pub fn set_slider_filter(
        &mut self,
        id: WidgetId,
        filter: impl Fn(f64, usize) -> String + 'static,
    ) -> Result<()> {
        self.update_slider(id, |s| {
            s.set_filter(Some(Box::new(filter)));
            s.value_box
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use forma_core::{FormsConfig, FormsError};
    use forma_render::{RecordingSurface, WindowHandle};

    use super::*;
    use crate::input::InputEvent;
    use crate::widget::widgets::BoxKind;

    const WIN: WindowHandle = WindowHandle(5);

    fn slider_form() -> (Forms, WidgetId, Instant) {
        let mut forms = Forms::with_config(RecordingSurface::new(), FormsConfig::default());
        let form = forms.create_form(500, 300, "");
        let s = forms
            .add_slider(form, SliderStyle::Normal, Orientation::Horizontal, 10, 10, 200, 20, "")
            .unwrap();
        forms.show_form(form, WIN).unwrap();
        let t0 = forms.now();
        (forms, s, t0)
    }

    #[test]
    fn test_defaults() {
        let s = Slider::new(Orientation::Horizontal, SliderStyle::Normal);
        assert_eq!(s.value(), 0.5);
        assert_eq!(s.bounds(), (0.0, 1.0));
        assert_eq!(s.increment(), (0.1, 0.05));
        assert_eq!(s.precision(), 2);
    }

    #[test]
    fn test_value_clamped_to_reversed_bounds() {
        let (mut forms, s, _) = slider_form();
        forms.set_slider_bounds(s, 10.0, 0.0).unwrap();
        forms.set_slider_value(s, 12.0).unwrap();
        assert_eq!(forms.slider_value(s).unwrap(), 10.0);
        forms.set_slider_value(s, -3.0).unwrap();
        assert_eq!(forms.slider_value(s).unwrap(), 0.0);
    }

    #[test]
    fn test_bounds_clamp_value() {
        let (mut forms, s, _) = slider_form();
        forms.set_slider_bounds(s, 0.0, 10.0).unwrap();
        forms.set_slider_value(s, 8.0).unwrap();
        forms.set_slider_bounds(s, 0.0, 5.0).unwrap();
        assert_eq!(forms.slider_value(s).unwrap(), 5.0);
    }

    #[test]
    fn test_push_past_end_jumps_to_max() {
        let (mut forms, s, t0) = slider_form();
        forms.set_slider_bounds(s, 0.0, 10.0).unwrap();
        forms.set_slider_value(s, 5.0).unwrap();
        forms.set_return_policy(s, ReturnFlags::END_CHANGED).unwrap();

        forms.handle_input(InputEvent::press(WIN, LEFT_MOUSE, 210, 20, t0));
        assert_eq!(forms.slider_value(s).unwrap(), 10.0);
        assert_eq!(forms.queued(), 0);

        forms.handle_input(InputEvent::release(WIN, LEFT_MOUSE, 210, 20, t0));
        let returned = forms.widget(s).unwrap().returned();
        assert!(returned.contains(ReturnFlags::CHANGED | ReturnFlags::END));
        assert_eq!(forms.check_forms(), Some(s));
    }

    #[test]
    fn test_full_size_knob_never_moves_value() {
        let (mut forms, s, t0) = slider_form();
        forms.set_slider_bounds(s, 0.0, 10.0).unwrap();
        forms.set_slider_value(s, 5.0).unwrap();
        forms.set_slider_size(s, 1.0).unwrap();

        forms.handle_input(InputEvent::press(WIN, LEFT_MOUSE, 15, 20, t0));
        for x in (0..=240).step_by(20) {
            forms.handle_input(InputEvent::motion(WIN, x, 20, t0));
            let value = forms.slider_value(s).unwrap();
            assert!(value.is_finite());
            assert_eq!(value, 5.0);
        }
        forms.handle_input(InputEvent::release(WIN, LEFT_MOUSE, 240, 20, t0));
        assert_eq!(forms.slider_value(s).unwrap(), 5.0);
    }

    #[test]
    fn test_track_thinner_than_borders_keeps_value() {
        let mut slider = Slider::new(Orientation::Horizontal, SliderStyle::Normal);
        slider.set_bounds(0.0, 10.0);
        slider.set_value(3.0);
        for pos in -2..=6 {
            let value = slider.value_at(f64::from(pos), 3, 2);
            assert!(value.is_finite());
            assert_eq!(value, 3.0);
        }
        slider.set_knob_size(0.0);
        assert_eq!(slider.value_at(1.0, 4, 2), 3.0);
    }

    #[test]
    fn test_grabbing_the_knob_keeps_value() {
        let (mut forms, s, t0) = slider_form();
        forms.set_slider_bounds(s, 0.0, 100.0).unwrap();
        forms.set_slider_value(s, 50.0).unwrap();
        // The knob is centered at x = 110.
        forms.handle_input(InputEvent::press(WIN, LEFT_MOUSE, 110, 20, t0));
        assert_eq!(forms.slider_value(s).unwrap(), 50.0);
        assert!(forms.widget(s).unwrap().returned().is_none());
        forms.handle_input(InputEvent::release(WIN, LEFT_MOUSE, 110, 20, t0));
        assert!(forms.widget(s).unwrap().returned().is_none());
    }

    #[test]
    fn test_fine_mode_quarters_motion() {
        let (mut forms, s, t0) = slider_form();
        forms.set_slider_bounds(s, 0.0, 100.0).unwrap();
        forms.set_slider_value(s, 50.0).unwrap();
        forms.handle_input(InputEvent::press(WIN, LEFT_MOUSE, 110, 20, t0));
        forms.handle_input(InputEvent::motion(WIN, 110, 20, t0).with_modifiers(Modifiers::SHIFT));
        forms.handle_input(InputEvent::motion(WIN, 150, 20, t0).with_modifiers(Modifiers::SHIFT));
        // 40 pixels of pointer travel move the knob by 10.
        let expected = 100.0 * (110.0 - 10.9) / 178.2;
        assert!((forms.slider_value(s).unwrap() - expected).abs() < 1e-9);

        forms.handle_input(InputEvent::motion(WIN, 150, 20, t0));
        let coarse = 100.0 * (140.0 - 10.9) / 178.2;
        assert!((forms.slider_value(s).unwrap() - coarse).abs() < 1e-9);
    }

    #[test]
    fn test_step_rounds_dragged_value() {
        let (mut forms, s, t0) = slider_form();
        forms.set_slider_bounds(s, 0.0, 100.0).unwrap();
        forms.set_slider_value(s, 50.0).unwrap();
        forms.set_slider_step(s, 5.0).unwrap();
        forms.handle_input(InputEvent::press(WIN, LEFT_MOUSE, 110, 20, t0));
        forms.handle_input(InputEvent::motion(WIN, 150, 20, t0));
        assert_eq!(forms.slider_value(s).unwrap(), 70.0);
    }

    #[test]
    fn test_right_button_ignored_by_default() {
        let (mut forms, s, t0) = slider_form();
        forms.handle_input(InputEvent::press(WIN, RIGHT_MOUSE, 200, 20, t0));
        assert_eq!(forms.slider_value(s).unwrap(), 0.5);
        forms.set_slider_mouse_buttons(s, [true, true, true]).unwrap();
        forms.handle_input(InputEvent::release(WIN, RIGHT_MOUSE, 200, 20, t0));
        forms.handle_input(InputEvent::press(WIN, RIGHT_MOUSE, 209, 20, t0));
        assert_eq!(forms.slider_value(s).unwrap(), 1.0);
    }

    #[test]
    fn test_scrollbar_repeats_while_held() {
        let mut forms = Forms::with_config(RecordingSurface::new(), FormsConfig::default());
        let form = forms.create_form(300, 100, "");
        let s = forms
            .add_slider(form, SliderStyle::Scrollbar, Orientation::Horizontal, 0, 0, 200, 20, "")
            .unwrap();
        forms.set_slider_bounds(s, 0.0, 1.0).unwrap();
        forms.set_slider_value(s, 0.0).unwrap();
        forms.show_form(form, WIN).unwrap();
        let t0 = forms.now();

        // Far right of the knob: step up by the left increment.
        forms.handle_input(InputEvent::press(WIN, LEFT_MOUSE, 190, 10, t0));
        assert!((forms.slider_value(s).unwrap() - 0.1).abs() < 1e-9);

        // The first repeat waits twice the repeat delay.
        forms.step(t0 + Duration::from_millis(150));
        assert!((forms.slider_value(s).unwrap() - 0.1).abs() < 1e-9);
        forms.step(t0 + Duration::from_millis(200));
        assert!((forms.slider_value(s).unwrap() - 0.2).abs() < 1e-9);
        forms.step(t0 + Duration::from_millis(300));
        assert!((forms.slider_value(s).unwrap() - 0.3).abs() < 1e-9);

        forms.handle_input(InputEvent::release(WIN, LEFT_MOUSE, 190, 10, t0 + Duration::from_millis(310)));
        forms.step(t0 + Duration::from_millis(600));
        assert!((forms.slider_value(s).unwrap() - 0.3).abs() < 1e-9);
        assert!(!forms.widget(s).unwrap().wants_update());
    }

    #[test]
    fn test_valslider_shows_value() {
        let mut forms = Forms::with_config(RecordingSurface::new(), FormsConfig::default());
        let form = forms.create_form(300, 100, "");
        let s = forms
            .add_valslider(form, SliderStyle::Normal, Orientation::Horizontal, 0, 0, 200, 20, "")
            .unwrap();
        forms.set_slider_bounds(s, 0.0, 10.0).unwrap();
        forms.set_slider_value(s, 5.0).unwrap();
        forms.show_form(form, WIN).unwrap();
        let surface = forms.surface_as::<RecordingSurface>().unwrap();
        assert!(surface.texts().contains(&"5.00"));

        forms.set_slider_filter(s, |v, _| format!("{v:.0}%")).unwrap();
        let surface = forms.surface_as::<RecordingSurface>().unwrap();
        assert!(surface.texts().contains(&"5%"));
    }

    #[test]
    fn test_inside_label_moved_outside() {
        let (mut forms, s, _) = slider_form();
        forms.set_label_align(s, Align::inside(forma_core::Placement::Left)).unwrap();
        assert_eq!(forms.widget(s).unwrap().label_align(), Align::LEFT);
    }

    #[test]
    fn test_accessor_on_other_class() {
        let (mut forms, _, _) = slider_form();
        let b = forms.create_box(BoxKind::Up, 0, 0, 10, 10, "");
        assert!(matches!(
            forms.slider_value(b),
            Err(FormsError::WrongClass { expected: "slider" })
        ));
    }
}
