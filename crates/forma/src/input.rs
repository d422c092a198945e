//! Turning window-system input into widget events.
//!
//! The windowing layer normalizes what it receives into [`InputEvent`]s and
//! hands them to [`Forms::handle_input`]. Between events the event loop
//! calls [`Forms::step`] with the current time, which fires timers, sends
//! STEP to automatic widgets and UPDATE to a pushed widget asking for it.
//!
//! ```ignore
//! loop {
//!     let timeout = forms.time_until_next();
//!     match backend.wait(timeout) {
//!         Some(event) => { forms.handle_input(event); }
//!         None => forms.step(Instant::now()),
//!     }
//!     while let Some(id) = forms.check_forms() {
//!         // react to `id`
//!     }
//! }
//! ```

use std::time::{Duration, Instant};

use forma_core::keys::{self, code, shortcut_code};
use forma_core::logging::{span_names, targets};
use forma_core::{Event, EventKind, Modifiers, Point, Rect};
use forma_render::WindowHandle;

use crate::form::{FindKind, FormId, Forms, TimerOwner};
use crate::widget::WidgetId;

/// Kind of a window-system event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    Motion,
    /// The pointer entered the window.
    Enter,
    /// The pointer left the window.
    Leave,
    ButtonPress,
    ButtonRelease,
    KeyPress,
    Expose,
}

/// A normalized window-system event. Coordinates are relative to the
/// window.
#[derive(Debug, Clone, PartialEq)]
pub struct InputEvent {
    pub window: WindowHandle,
    pub kind: InputKind,
    pub x: i32,
    pub y: i32,
    /// Mouse button for button events, key code for key presses.
    pub button: i32,
    pub modifiers: Modifiers,
    pub time: Option<Instant>,
    /// Exposed area for [`InputKind::Expose`]; empty means everything.
    pub area: Rect,
}

impl InputEvent {
    pub fn new(window: WindowHandle, kind: InputKind) -> Self {
        Self {
            window,
            kind,
            x: 0,
            y: 0,
            button: 0,
            modifiers: Modifiers::empty(),
            time: None,
            area: Rect::ZERO,
        }
    }

    pub fn motion(window: WindowHandle, x: i32, y: i32, time: Instant) -> Self {
        Self {
            x,
            y,
            time: Some(time),
            ..Self::new(window, InputKind::Motion)
        }
    }

    pub fn press(window: WindowHandle, button: i32, x: i32, y: i32, time: Instant) -> Self {
        Self {
            x,
            y,
            button,
            time: Some(time),
            ..Self::new(window, InputKind::ButtonPress)
        }
    }

    pub fn release(window: WindowHandle, button: i32, x: i32, y: i32, time: Instant) -> Self {
        Self {
            kind: InputKind::ButtonRelease,
            ..Self::press(window, button, x, y, time)
        }
    }

    pub fn key(window: WindowHandle, key: i32, time: Instant) -> Self {
        Self {
            button: key,
            time: Some(time),
            ..Self::new(window, InputKind::KeyPress)
        }
    }

    pub fn expose(window: WindowHandle, area: Rect) -> Self {
        Self {
            area,
            ..Self::new(window, InputKind::Expose)
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    fn widget_event(&self, kind: EventKind) -> Event {
        let mut event = Event::new(kind).at(self.x, self.y).with_key(self.button).with_modifiers(self.modifiers);
        event.time = self.time;
        event
    }
}

impl Forms {
    /// Process one window-system event. Returns `false` if nothing wanted it.
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        let _span = tracing::trace_span!(target: targets::DISPATCH, span_names::INPUT, kind = ?event.kind).entered();
        if let Some(time) = event.time
            && time > self.now
        {
            self.now = time;
        }
        let Some(form) = self.form_by_window(event.window).filter(|f| self.forms[*f].visible) else {
            return self.app_windows.dispatch(&event);
        };

        match event.kind {
            InputKind::Motion | InputKind::Enter => self.pointer_moved(form, &event),
            InputKind::Leave => self.set_mouse_widget(None, &event),
            InputKind::ButtonPress => self.button_pressed(form, &event),
            InputKind::ButtonRelease => self.button_released(form, &event),
            InputKind::KeyPress => self.key_pressed(form, &event),
            InputKind::Expose => {
                if event.area.is_empty() {
                    self.redraw_form(form);
                } else {
                    self.redraw_region(form, event.area);
                }
            }
        }
        self.flush_pending_redraws();
        true
    }

    fn pointer_moved(&mut self, form: FormId, event: &InputEvent) {
        if let Some(pushed) = self.interaction.pushed {
            self.handle_object(pushed, &event.widget_event(EventKind::Motion), false);
            return;
        }
        let hit = self.find_last(form, FindKind::Mouse(Point::new(event.x, event.y)));
        if hit != self.interaction.mouse {
            self.set_mouse_widget(hit, event);
        } else if let Some(id) = hit
            && self.widgets[id].active
        {
            self.handle_object(id, &event.widget_event(EventKind::Motion), false);
        }
    }

    /// Move the mouse-over widget, sending LEAVE and ENTER.
    fn set_mouse_widget(&mut self, hit: Option<WidgetId>, event: &InputEvent) {
        if let Some(old) = self.interaction.mouse.take()
            && let Some(w) = self.widgets.get_mut(old)
        {
            w.belowmouse = false;
            self.handle_object(old, &event.widget_event(EventKind::Leave), false);
        }
        if let Some(new) = hit {
            self.interaction.mouse = Some(new);
            self.widgets[new].belowmouse = true;
            self.handle_object(new, &event.widget_event(EventKind::Enter), false);
        }
    }

    fn button_pressed(&mut self, form: FormId, event: &InputEvent) {
        let hit = self
            .find_last(form, FindKind::Mouse(Point::new(event.x, event.y)))
            .filter(|id| self.widgets[*id].active);
        let Some(id) = hit else {
            return;
        };
        if self.widgets[id].input && self.forms[form].focus != Some(id) {
            let _ = self.set_focus(form, Some(id));
        }
        if !self.widgets.contains_key(id) {
            return;
        }
        self.interaction.pushed = Some(id);
        self.widgets[id].pushed = true;
        self.handle_object(id, &event.widget_event(EventKind::Push), false);
    }

    fn button_released(&mut self, form: FormId, event: &InputEvent) {
        let Some(id) = self.interaction.pushed.take() else {
            return;
        };
        if self.widgets.contains_key(id) {
            self.handle_object(id, &event.widget_event(EventKind::Release), false);
        }
        // The pointer may have moved off the widget while it was pushed.
        self.pointer_moved(form, event);
    }

    /// Shortcuts first, then Tab cycling, then the focused widget, then a
    /// widget taking keys nobody else took.
    fn key_pressed(&mut self, form: FormId, event: &InputEvent) {
        let ctrl = event.modifiers.contains(Modifiers::CONTROL);
        let alt = event.modifiers.contains(Modifiers::ALT);
        let sc = shortcut_code(event.button, ctrl, alt);

        let shortcut = self.forms[form].widgets.iter().copied().find(|id| {
            let w = &self.widgets[*id];
            w.visible && w.active && !w.class.is_group_marker() && w.shortcuts.contains(&sc)
        });
        if let Some(id) = shortcut {
            tracing::trace!(target: targets::SHORTCUT, ?id, sc, "shortcut");
            if self.widgets[id].input {
                let _ = self.set_focus(form, Some(id));
            } else {
                self.handle_object(id, &event.widget_event(EventKind::Shortcut), false);
            }
            return;
        }

        if event.button == code::TAB {
            let _ = self.cycle_focus(form, event.modifiers.contains(Modifiers::SHIFT));
            return;
        }

        if let Some(focus) = self.forms[form].focus {
            self.handle_object(focus, &event.widget_event(EventKind::KeyPress), false);
            return;
        }

        if let Some(id) = self.find_first(form, FindKind::KeySpecial) {
            self.handle_object(id, &event.widget_event(EventKind::KeyPress), false);
        }
    }

    /// Advance the engine's clock to `now`: fire due timers, send STEP to
    /// automatic widgets and UPDATE to a pushed widget that wants it, then
    /// paint what changed.
    #[tracing::instrument(skip(self), target = "forma::timer", level = "trace")]
    pub fn step(&mut self, now: Instant) {
        if now > self.now {
            self.now = now;
        }
        let now = self.now;

        for timer in self.timers.process_expired_at(now) {
            match self.timer_owners.get(&timer).copied() {
                Some(TimerOwner::Widget(id)) => {
                    self.timer_owners.remove(&timer);
                    if self.widgets.contains_key(id) {
                        let event = Event::new(EventKind::Timeout(timer)).with_time(now);
                        self.handle_object(id, &event, false);
                    }
                }
                Some(TimerOwner::Tooltip(id)) => {
                    self.timer_owners.remove(&timer);
                    self.fire_tooltip(id);
                }
                Some(TimerOwner::CursorAnimation(window)) => self.advance_cursor_animation(window),
                None => {}
            }
        }

        let interval = self.config.step_interval();
        if self.last_step.is_none_or(|last| now.saturating_duration_since(last) >= interval) {
            self.last_step = Some(now);
            self.send_steps(now);
        }

        if let Some(pushed) = self.interaction.pushed
            && self.widgets.get(pushed).is_some_and(|w| w.want_update)
        {
            self.handle_object(pushed, &Event::new(EventKind::Update).with_time(now), false);
        }
        self.flush_pending_redraws();
    }

    fn send_steps(&mut self, now: Instant) {
        let automatic: Vec<WidgetId> = self
            .forms
            .values()
            .filter(|f| f.visible && f.num_auto > 0)
            .flat_map(|f| f.widgets.iter().copied())
            .filter(|id| self.widgets[*id].automatic && self.widgets[*id].visible)
            .collect();
        for id in automatic {
            if self.widgets.contains_key(id) {
                self.handle_object(id, &Event::new(EventKind::Step).with_time(now), false);
            }
        }
    }

    /// How long the event loop may wait before [`step`](Self::step) has
    /// work to do.
    pub fn time_until_next(&mut self) -> Option<Duration> {
        let timer = self.timers.time_until_next_at(self.now);
        let stepping = self.forms.values().any(|f| f.visible && f.num_auto > 0);
        let step = stepping.then(|| {
            let interval = self.config.step_interval();
            self.last_step
                .map_or(Duration::ZERO, |last| interval.saturating_sub(self.now.saturating_duration_since(last)))
        });
        match (timer, step) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

/// Whether `button` is one that starts an interaction (not a wheel).
pub fn is_click_button(button: i32) -> bool {
    button >= keys::LEFT_MOUSE && !keys::is_wheel(button)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use forma_core::{FormsConfig, ReturnFlags};
    use forma_render::RecordingSurface;

    use super::*;
    use crate::widget::{HandlerContext, WidgetClass, WidgetHandler};

    const WIN: WindowHandle = WindowHandle(1);

    struct Recorder(Rc<RefCell<Vec<EventKind>>>);

    impl WidgetHandler for Recorder {
        fn handle(&mut self, _ctx: &mut HandlerContext<'_>, event: &Event) -> ReturnFlags {
            if !matches!(event.kind, EventKind::Draw | EventKind::DrawLabel | EventKind::Attrib) {
                self.0.borrow_mut().push(event.kind);
            }
            ReturnFlags::NONE
        }
    }

    fn setup() -> (Forms, FormId) {
        let mut forms = Forms::with_config(RecordingSurface::new(), FormsConfig::default());
        let form = forms.create_form(200, 200, "");
        forms.show_form(form, WIN).unwrap();
        (forms, form)
    }

    fn recorded(forms: &mut Forms, form: FormId, x: i32, y: i32) -> (WidgetId, Rc<RefCell<Vec<EventKind>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let handler = Box::new(Recorder(Rc::clone(&log)));
        let id = forms
            .add_widget(form, WidgetClass::Button, Some(handler), x, y, 20, 20, "")
            .unwrap();
        (id, log)
    }

    #[test]
    fn test_enter_leave_tracking() {
        let (mut forms, form) = setup();
        let (a, log_a) = recorded(&mut forms, form, 0, 0);
        let (b, log_b) = recorded(&mut forms, form, 50, 0);
        let now = Instant::now();

        forms.handle_input(InputEvent::motion(WIN, 5, 5, now));
        forms.handle_input(InputEvent::motion(WIN, 6, 6, now));
        assert_eq!(forms.mouse_widget(), Some(a));
        forms.handle_input(InputEvent::motion(WIN, 55, 5, now));
        assert_eq!(forms.mouse_widget(), Some(b));
        assert!(!forms.widget(a).unwrap().is_below_mouse());

        assert_eq!(*log_a.borrow(), [EventKind::Enter, EventKind::Motion, EventKind::Leave]);
        assert_eq!(*log_b.borrow(), [EventKind::Enter]);
    }

    #[test]
    fn test_motion_goes_to_pushed_widget() {
        let (mut forms, form) = setup();
        let (a, log) = recorded(&mut forms, form, 0, 0);
        let now = Instant::now();
        forms.handle_input(InputEvent::press(WIN, keys::LEFT_MOUSE, 5, 5, now));
        assert_eq!(forms.pushed_widget(), Some(a));
        forms.handle_input(InputEvent::motion(WIN, 150, 150, now));
        forms.handle_input(InputEvent::release(WIN, keys::LEFT_MOUSE, 150, 150, now));
        assert_eq!(forms.pushed_widget(), None);
        assert_eq!(*log.borrow(), [EventKind::Push, EventKind::Motion, EventKind::Release]);
    }

    #[test]
    fn test_shortcut_before_focus() {
        let (mut forms, form) = setup();
        let (a, log_a) = recorded(&mut forms, form, 0, 0);
        let (b, log_b) = recorded(&mut forms, form, 50, 0);
        forms.set_input(b, true).unwrap();
        forms.set_focus(form, Some(b)).unwrap();
        forms.set_shortcut(a, "^S").unwrap();
        log_b.borrow_mut().clear();

        let now = Instant::now();
        forms.handle_input(InputEvent::key(WIN, 's' as i32, now).with_modifiers(Modifiers::CONTROL));
        forms.handle_input(InputEvent::key(WIN, 'x' as i32, now));
        assert_eq!(*log_a.borrow(), [EventKind::Shortcut]);
        assert_eq!(*log_b.borrow(), [EventKind::KeyPress]);
    }

    #[test]
    fn test_tab_cycles_focus() {
        let (mut forms, form) = setup();
        let (a, _) = recorded(&mut forms, form, 0, 0);
        let (b, _) = recorded(&mut forms, form, 50, 0);
        forms.set_input(a, true).unwrap();
        forms.set_input(b, true).unwrap();
        let now = Instant::now();
        forms.handle_input(InputEvent::key(WIN, code::TAB, now));
        assert_eq!(forms.focus(form), Some(a));
        forms.handle_input(InputEvent::key(WIN, code::TAB, now));
        assert_eq!(forms.focus(form), Some(b));
        forms.handle_input(InputEvent::key(WIN, code::TAB, now).with_modifiers(Modifiers::SHIFT));
        assert_eq!(forms.focus(form), Some(a));
    }

    #[test]
    fn test_step_sends_step_and_timeouts() {
        let (mut forms, form) = setup();
        let (a, log) = recorded(&mut forms, form, 0, 0);
        forms.set_automatic(a, true).unwrap();
        let t0 = forms.now();
        let timer = forms.start_widget_timer(a, Duration::from_millis(10));

        forms.step(t0 + Duration::from_millis(20));
        forms.step(t0 + Duration::from_millis(30));
        forms.step(t0 + Duration::from_millis(80));
        assert_eq!(*log.borrow(), [EventKind::Timeout(timer), EventKind::Step, EventKind::Step]);
    }

    #[test]
    fn test_tooltip_shows_after_delay() {
        let (mut forms, form) = setup();
        let (a, _) = recorded(&mut forms, form, 10, 10);
        forms.set_tooltip(a, Some("help")).unwrap();
        let t0 = forms.now();
        forms.handle_input(InputEvent::motion(WIN, 15, 15, t0));
        forms.step(t0 + Duration::from_millis(100));
        assert!(!forms.tooltip().is_shown());
        forms.step(t0 + Duration::from_millis(700));
        assert!(forms.tooltip().is_shown());
        assert_eq!(forms.tooltip().area().y(), 31);

        forms.handle_input(InputEvent::motion(WIN, 150, 150, t0 + Duration::from_millis(800)));
        assert!(!forms.tooltip().is_shown());
    }

    #[test]
    fn test_unknown_window_goes_to_app_windows() {
        let (mut forms, _) = setup();
        let other = WindowHandle(99);
        assert!(!forms.handle_input(InputEvent::motion(other, 0, 0, Instant::now())));
        forms.add_event_callback(other, None, |_| true);
        assert!(forms.handle_input(InputEvent::motion(other, 0, 0, Instant::now())));
    }
}
