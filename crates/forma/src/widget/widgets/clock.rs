//! Clocks.
//!
//! A clock is an automatic widget: it looks at its time source on every
//! STEP and repaints only when the second it shows has changed.

use std::f64::consts::TAU;

use chrono::{Local, NaiveTime, TimeDelta, Timelike};
use forma_core::{Align, Event, EventKind, Point, Rect, Result, ReturnFlags};
use forma_render::{BoxType, Color};

use crate::form::{FormId, Forms};
use crate::widget::{HandlerContext, WidgetClass, WidgetHandler, WidgetId};

/// Where a clock gets the time from.
pub type TimeSource = Box<dyn FnMut() -> NaiveTime>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ClockKind {
    #[default]
    Analog,
    Digital,
}

/// State of a clock, owned by its widget.
pub struct Clock {
    kind: ClockKind,
    source: TimeSource,
    adjustment: TimeDelta,
    /// The time on display, to the second.
    shown: Option<NaiveTime>,
    ampm: bool,
    hide_seconds: bool,
}

impl Clock {
    pub fn new(kind: ClockKind) -> Self {
        Self {
            kind,
            source: Box::new(|| Local::now().time()),
            adjustment: TimeDelta::zero(),
            shown: None,
            ampm: false,
            hide_seconds: false,
        }
    }

    pub fn kind(&self) -> ClockKind {
        self.kind
    }

    /// The time to show, adjusted and cut to whole seconds.
    fn read(&mut self) -> NaiveTime {
        let t = (self.source)() + self.adjustment;
        t.with_nanosecond(0).unwrap_or(t)
    }

    fn current(&mut self) -> NaiveTime {
        match self.shown {
            Some(t) => t,
            None => {
                let t = self.read();
                self.shown = Some(t);
                t
            }
        }
    }

    fn digital_text(&self, t: NaiveTime) -> String {
        let fmt = match (self.ampm, self.hide_seconds) {
            (false, false) => "%H:%M:%S",
            (false, true) => "%H:%M",
            (true, false) => "%-I:%M:%S %p",
            (true, true) => "%-I:%M %p",
        };
        t.format(fmt).to_string()
    }

    fn draw_analog(&self, ctx: &mut HandlerContext<'_>, t: NaiveTime) {
        let (w, surface) = ctx.painter();
        let area = w.area;
        let (hand_col, sec_col) = (w.lcol, w.col2);
        let side = area.width().min(area.height()) - 2 * (w.bw.abs() + 2);
        if side <= 4 {
            return;
        }
        let face = Rect::new(
            area.x() + (area.width() - side) / 2,
            area.y() + (area.height() - side) / 2,
            side,
            side,
        );
        let center = Point::new(face.x() + side / 2, face.y() + side / 2);
        let r = f64::from(side) / 2.0;

        surface.draw_arc(face, 0, 3600, Color::WHITE, true);
        surface.draw_arc(face, 0, 3600, Color::BLACK, false);
        for hour in 0..12 {
            let a = f64::from(hour) / 12.0;
            surface.draw_line(hand_end(center, a, r * 0.85), hand_end(center, a, r), Color::BLACK);
        }

        let (h, m, s) = (f64::from(t.hour() % 12), f64::from(t.minute()), f64::from(t.second()));
        surface.draw_line(center, hand_end(center, (h + m / 60.0) / 12.0, r * 0.5), hand_col);
        surface.draw_line(center, hand_end(center, (m + s / 60.0) / 60.0, r * 0.8), hand_col);
        if !self.hide_seconds {
            surface.draw_line(center, hand_end(center, s / 60.0, r * 0.9), sec_col);
        }
    }
}

/// End of a hand `turns` of a full turn clockwise from twelve o'clock.
fn hand_end(center: Point, turns: f64, length: f64) -> Point {
    let a = turns * TAU;
    Point::new(
        center.x + (length * a.sin()).round() as i32,
        center.y - (length * a.cos()).round() as i32,
    )
}

impl WidgetHandler for Clock {
    fn handle(&mut self, ctx: &mut HandlerContext<'_>, event: &Event) -> ReturnFlags {
        match event.kind {
            EventKind::Draw => {
                ctx.draw_box();
                let t = self.current();
                match self.kind {
                    ClockKind::Digital => {
                        let text = self.digital_text(t);
                        let (area, lcol) = (ctx.widget().area, ctx.widget().lcol);
                        ctx.draw_text(Align::CENTER, area, &text, lcol);
                    }
                    ClockKind::Analog => self.draw_analog(ctx, t),
                }
            }
            EventKind::DrawLabel => ctx.draw_label_outside(),
            EventKind::Step => {
                let t = self.read();
                if self.shown != Some(t) {
                    self.shown = Some(t);
                    ctx.request_redraw();
                }
            }
            _ => {}
        }
        ReturnFlags::NONE
    }
}

impl Forms {
    /// Create a detached clock.
    pub fn create_clock(&mut self, kind: ClockKind, x: i32, y: i32, w: i32, h: i32, label: &str) -> WidgetId {
        let id = self.create_widget(WidgetClass::Clock, Some(Box::new(Clock::new(kind))), x, y, w, h, label);
        let widget = &mut self.widgets[id];
        widget.boxtype = BoxType::UpBox;
        widget.col1 = Color::INACTIVE;
        widget.col2 = Color::BOTTOM_BCOL;
        widget.align = Align::BOTTOM;
        widget.automatic = true;
        id
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_clock(
        &mut self,
        form: FormId,
        kind: ClockKind,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        label: &str,
    ) -> Result<WidgetId> {
        self.form_ref(form)?;
        let id = self.create_clock(kind, x, y, w, h, label);
        self.place(Some(form), id)
    }

    /// Replace where a clock reads the time. The clock shows the new
    /// source's time on its next STEP.
    pub fn set_clock_time_source(
        &mut self,
        id: WidgetId,
        source: impl FnMut() -> NaiveTime + 'static,
    ) -> Result<()> {
        self.class_handler_mut::<Clock>(id, "clock")?.source = Box::new(source);
        Ok(())
    }

    /// The time the clock shows, reading its source if nothing was shown
    /// yet.
    pub fn clock_time(&mut self, id: WidgetId) -> Result<NaiveTime> {
        Ok(self.class_handler_mut::<Clock>(id, "clock")?.current())
    }

    /// Shift the clock by `seconds`, e.g. to show another time zone.
    pub fn set_clock_adjustment(&mut self, id: WidgetId, seconds: i64) -> Result<()> {
        let clock = self.class_handler_mut::<Clock>(id, "clock")?;
        clock.adjustment = TimeDelta::seconds(seconds);
        clock.shown = None;
        self.mark_for_redraw(id);
        self.flush_pending_redraws();
        Ok(())
    }

    /// Show a digital clock in 12 hour format.
    pub fn set_clock_ampm(&mut self, id: WidgetId, on: bool) -> Result<()> {
        self.class_handler_mut::<Clock>(id, "clock")?.ampm = on;
        self.mark_for_redraw(id);
        self.flush_pending_redraws();
        Ok(())
    }

    pub fn set_clock_hide_seconds(&mut self, id: WidgetId, hide: bool) -> Result<()> {
        self.class_handler_mut::<Clock>(id, "clock")?.hide_seconds = hide;
        self.mark_for_redraw(id);
        self.flush_pending_redraws();
        Ok(())
    }
}
