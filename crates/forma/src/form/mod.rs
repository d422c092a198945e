//! Forms and the widget arena.
//!
//! [`Forms`] owns every widget and every form. Widgets are addressed by
//! [`WidgetId`], forms by [`FormId`]; both are generational handles, so a
//! handle to something that was freed is detected instead of dangling.
//!
//! A [`Form`] keeps its widgets as an ordered list. The order is the
//! z-order: later widgets are painted after, and hit-tested before, earlier
//! ones.
//!
//! The engine's operations are spread over submodules by concern:
//!
//! - `topology`: attach, insert, delete, free, groups, intersections
//! - `geometry`: position, size, scaling, bounding boxes
//! - `attributes`: looks, policies, visibility, activation
//! - `focus`: keyboard focus and widget searches
//! - `dispatch`: the handler contract, return policies, the event queue
//! - `redraw`: dirty tracking, the redraw passes, freezing

mod attributes;
mod dispatch;
mod focus;
mod geometry;
mod redraw;
mod topology;

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use forma_core::logging::targets;
use forma_core::{FormsConfig, FormsError, Rect, Result, TimerId, TimerManager, global_config};
use forma_render::{ClipState, DamageRegion, DrawSurface, PixmapId, WindowHandle};
use slotmap::{SlotMap, new_key_type};

use crate::appwin::AppWindows;
use crate::cursor::CursorCache;
use crate::interaction::InteractionContext;
use crate::tooltip::Tooltip;
use crate::widget::{Widget, WidgetHandler, WidgetId};

pub use focus::FindKind;
pub use redraw::RedrawStats;

new_key_type! {
    /// Handle of a form.
    pub struct FormId;
}

/// A group that is currently accepting new widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct OpenGroup {
    pub(crate) id: u32,
    pub(crate) begin: WidgetId,
    /// Set when an existing, closed group was reopened.
    pub(crate) end: Option<WidgetId>,
}

/// A top-level container of widgets.
#[derive(Debug)]
pub struct Form {
    pub(crate) label: String,
    pub(crate) area: Rect,
    pub(crate) w_hr: f64,
    pub(crate) h_hr: f64,
    pub(crate) window: Option<WindowHandle>,
    pub(crate) visible: bool,
    pub(crate) frozen: u32,
    pub(crate) widgets: Vec<WidgetId>,
    pub(crate) focus: Option<WidgetId>,
    pub(crate) num_auto: usize,
    pub(crate) open_group: Option<OpenGroup>,
    pub(crate) no_tooltip: bool,
    pub(crate) dbl_buffer: bool,
    pub(crate) backing: Option<PixmapId>,
    pub(crate) damage: DamageRegion,
}

impl Form {
    fn new(width: i32, height: i32, label: &str) -> Self {
        let area = Rect::new(0, 0, width, height);
        Self {
            label: label.to_owned(),
            area,
            w_hr: f64::from(width),
            h_hr: f64::from(height),
            window: None,
            visible: false,
            frozen: 0,
            widgets: Vec::new(),
            focus: None,
            num_auto: 0,
            open_group: None,
            no_tooltip: false,
            dbl_buffer: false,
            backing: None,
            damage: DamageRegion::with_viewport(Rect::new(0, 0, width, height)),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Screen position and size.
    pub fn geometry(&self) -> Rect {
        self.area
    }

    pub fn window(&self) -> Option<WindowHandle> {
        self.window
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Nesting depth of [`Forms::freeze`].
    #[inline]
    pub fn frozen_depth(&self) -> u32 {
        self.frozen
    }

    /// The widgets in z-order.
    pub fn widgets(&self) -> &[WidgetId] {
        &self.widgets
    }

    pub fn first(&self) -> Option<WidgetId> {
        self.widgets.first().copied()
    }

    pub fn last(&self) -> Option<WidgetId> {
        self.widgets.last().copied()
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub(crate) fn position(&self, id: WidgetId) -> Option<usize> {
        self.widgets.iter().position(|w| *w == id)
    }

    /// The widget after `id` in z-order.
    pub fn next_of(&self, id: WidgetId) -> Option<WidgetId> {
        self.position(id).and_then(|i| self.widgets.get(i + 1).copied())
    }

    /// The widget before `id` in z-order.
    pub fn prev_of(&self, id: WidgetId) -> Option<WidgetId> {
        self.position(id)
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| self.widgets.get(i).copied())
    }

    /// Number of attached widgets receiving STEP events.
    pub fn automatic_count(&self) -> usize {
        self.num_auto
    }

    pub fn tooltips_enabled(&self) -> bool {
        !self.no_tooltip
    }
}

/// Who a running timer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimerOwner {
    /// Started by a widget handler; expiry is delivered as a TIMEOUT event.
    Widget(WidgetId),
    /// Tooltip delay of a (top-level) widget.
    Tooltip(WidgetId),
    /// Frame advance of an animated cursor.
    CursorAnimation(WindowHandle),
}

/// The widget engine: every form, every widget and the shared interaction
/// state.
///
/// All operations run on the caller's thread. Drawing goes to the
/// [`DrawSurface`] given at construction.
pub struct Forms {
    pub(crate) widgets: SlotMap<WidgetId, Widget>,
    pub(crate) forms: SlotMap<FormId, Form>,
    pub(crate) config: FormsConfig,
    pub(crate) surface: Box<dyn DrawSurface>,
    pub(crate) clip: ClipState,
    pub(crate) timers: TimerManager,
    pub(crate) timer_owners: HashMap<TimerId, TimerOwner>,
    pub(crate) interaction: InteractionContext,
    pub(crate) queue: VecDeque<WidgetId>,
    pub(crate) tooltip: Tooltip,
    pub(crate) cursors: CursorCache,
    pub(crate) app_windows: AppWindows,
    pub(crate) stats: RedrawStats,
    pub(crate) now: Instant,
    pub(crate) last_step: Option<Instant>,
    next_group_id: u32,
}

impl Forms {
    /// An engine drawing to `surface`, configured from the process-wide
    /// default configuration.
    pub fn new(surface: impl DrawSurface) -> Self {
        Self::with_config(surface, global_config())
    }

    pub fn with_config(surface: impl DrawSurface, config: FormsConfig) -> Self {
        let tooltip = Tooltip::new(config.tooltip_max_size);
        Self {
            widgets: SlotMap::with_key(),
            forms: SlotMap::with_key(),
            config,
            surface: Box::new(surface),
            clip: ClipState::new(),
            timers: TimerManager::new(),
            timer_owners: HashMap::new(),
            interaction: InteractionContext::default(),
            queue: VecDeque::new(),
            tooltip,
            cursors: CursorCache::new(),
            app_windows: AppWindows::default(),
            stats: RedrawStats::default(),
            now: Instant::now(),
            last_step: None,
            next_group_id: 1,
        }
    }

    pub fn config(&self) -> &FormsConfig {
        &self.config
    }

    /// The drawing surface as its concrete type.
    pub fn surface_as<T: DrawSurface>(&self) -> Option<&T> {
        let any: &dyn std::any::Any = self.surface.as_ref();
        any.downcast_ref()
    }

    pub fn surface_as_mut<T: DrawSurface>(&mut self) -> Option<&mut T> {
        let any: &mut dyn std::any::Any = self.surface.as_mut();
        any.downcast_mut()
    }

    /// The engine's notion of the current time, advanced by input events
    /// and [`step`](Self::step).
    pub fn now(&self) -> Instant {
        self.now
    }

    pub fn widget(&self, id: WidgetId) -> Option<&Widget> {
        self.widgets.get(id)
    }

    pub fn form(&self, id: FormId) -> Option<&Form> {
        self.forms.get(id)
    }

    pub fn contains_widget(&self, id: WidgetId) -> bool {
        self.widgets.contains_key(id)
    }

    pub fn widget_count(&self) -> usize {
        self.widgets.len()
    }

    /// The class handler of a widget, if it is a `T`.
    pub fn handler<T: WidgetHandler>(&self, id: WidgetId) -> Option<&T> {
        self.widgets.get(id)?.handler.as_ref()?.downcast_ref::<T>()
    }

    pub fn handler_mut<T: WidgetHandler>(&mut self, id: WidgetId) -> Option<&mut T> {
        self.widgets.get_mut(id)?.handler.as_mut()?.downcast_mut::<T>()
    }

    /// The form a widget is attached to.
    pub fn form_of(&self, id: WidgetId) -> Option<FormId> {
        self.widgets.get(id).and_then(|w| w.form)
    }

    /// The focused widget's top-level composite, if any.
    pub fn focus(&self, form: FormId) -> Option<WidgetId> {
        let mut id = self.forms.get(form)?.focus?;
        while let Some(parent) = self.widgets.get(id).and_then(|w| w.parent) {
            id = parent;
        }
        Some(id)
    }

    /// The widget that holds the focus itself, which may be a composite's
    /// child.
    pub fn focus_widget(&self, form: FormId) -> Option<WidgetId> {
        self.forms.get(form)?.focus
    }

    pub fn pushed_widget(&self) -> Option<WidgetId> {
        self.interaction.pushed
    }

    pub fn mouse_widget(&self) -> Option<WidgetId> {
        self.interaction.mouse
    }

    // =========================================================================
    // Forms
    // =========================================================================

    /// Create an empty, hidden form.
    pub fn create_form(&mut self, width: i32, height: i32, label: &str) -> FormId {
        let id = self.forms.insert(Form::new(width, height, label));
        tracing::debug!(target: targets::FORM, ?id, width, height, label, "form created");
        id
    }

    /// Show a form in `window`, a window the windowing layer created for
    /// it, and paint it completely.
    pub fn show_form(&mut self, form: FormId, window: WindowHandle) -> Result<()> {
        let f = self.form_entry(form)?;
        f.window = Some(window);
        f.visible = true;
        tracing::debug!(target: targets::FORM, ?form, ?window, "form shown");

        // Give the focus to the first input widget if nobody has it yet.
        if f.focus.is_none()
            && let Some(first) = self.find_first(form, FindKind::Input)
        {
            self.set_focus(form, Some(first))?;
        }
        self.redraw_form(form);
        Ok(())
    }

    /// Hide a form. Its widgets keep their state.
    pub fn hide_form(&mut self, form: FormId) -> Result<()> {
        let widgets = self.form_ref(form)?.widgets.clone();
        for id in widgets {
            self.hide_tooltip_of(id);
            if self.interaction.pushed == Some(id) {
                self.interaction.pushed = None;
            }
            if self.interaction.mouse == Some(id) {
                self.interaction.mouse = None;
            }
        }
        let f = self.form_entry(form)?;
        f.visible = false;
        if let Some(pixmap) = f.backing.take() {
            self.surface.free_pixmap(pixmap);
        }
        tracing::debug!(target: targets::FORM, ?form, "form hidden");
        Ok(())
    }

    /// Forget a form's window, e.g. after the window system destroyed it.
    /// Widgets are no longer queued until the form is shown again.
    pub fn close_form_window(&mut self, form: FormId) -> Result<()> {
        self.hide_form(form)?;
        if let Some(f) = self.forms.get_mut(form) {
            f.window = None;
        }
        Ok(())
    }

    /// Free a form and every widget on it.
    pub fn free_form(&mut self, form: FormId) -> Result<()> {
        if self.form_ref(form)?.visible {
            self.hide_form(form)?;
        }
        let widgets: Vec<WidgetId> = self.form_ref(form)?.widgets.clone();
        for id in widgets.into_iter().rev() {
            if self.widgets.get(id).is_some_and(|w| w.parent.is_none()) {
                let _ = self.free(id);
            }
        }
        self.forms.remove(form);
        tracing::debug!(target: targets::FORM, ?form, "form freed");
        Ok(())
    }

    /// Suppress tooltips for all widgets of a form.
    pub fn set_form_tooltips(&mut self, form: FormId, enabled: bool) -> Result<()> {
        self.form_entry(form)?.no_tooltip = !enabled;
        Ok(())
    }

    /// Paint full redraws into an off-screen form buffer first.
    pub fn set_form_dblbuffer(&mut self, form: FormId, on: bool) -> Result<()> {
        self.form_entry(form)?.dbl_buffer = on;
        Ok(())
    }

    /// Find the form shown in `window`.
    pub fn form_by_window(&self, window: WindowHandle) -> Option<FormId> {
        self.forms
            .iter()
            .find(|(_, f)| f.window == Some(window))
            .map(|(id, _)| id)
    }

    // =========================================================================
    // Timers owned by widgets
    // =========================================================================

    pub(crate) fn start_widget_timer(&mut self, id: WidgetId, duration: Duration) -> TimerId {
        let timer = self.timers.start_one_shot_at(self.now, duration);
        self.timer_owners.insert(timer, TimerOwner::Widget(id));
        timer
    }

    pub(crate) fn stop_widget_timer(&mut self, timer: TimerId) {
        self.timer_owners.remove(&timer);
        let _ = self.timers.stop(timer);
    }

    /// Cancel every timer bound to a widget.
    pub(crate) fn cancel_timers_of(&mut self, id: WidgetId) {
        let owned: Vec<TimerId> = self
            .timer_owners
            .iter()
            .filter(|(_, owner)| matches!(owner, TimerOwner::Widget(w) | TimerOwner::Tooltip(w) if *w == id))
            .map(|(t, _)| *t)
            .collect();
        for timer in owned {
            self.stop_widget_timer(timer);
        }
        if let Some(w) = self.widgets.get_mut(id) {
            w.tip_timer = None;
        }
    }

    // =========================================================================
    // Lookup helpers that log misuse
    // =========================================================================

    pub(crate) fn widget_ref(&self, id: WidgetId) -> Result<&Widget> {
        self.widgets.get(id).ok_or_else(|| misuse(FormsError::WidgetNotFound))
    }

    pub(crate) fn widget_entry(&mut self, id: WidgetId) -> Result<&mut Widget> {
        self.widgets.get_mut(id).ok_or_else(|| misuse(FormsError::WidgetNotFound))
    }

    pub(crate) fn form_ref(&self, id: FormId) -> Result<&Form> {
        self.forms.get(id).ok_or_else(|| misuse(FormsError::FormNotFound))
    }

    pub(crate) fn form_entry(&mut self, id: FormId) -> Result<&mut Form> {
        self.forms.get_mut(id).ok_or_else(|| misuse(FormsError::FormNotFound))
    }

    /// The form of an attached widget.
    pub(crate) fn attached_form(&self, id: WidgetId) -> Result<FormId> {
        self.widget_ref(id)?.form.ok_or_else(|| misuse(FormsError::NotAttached))
    }

    pub(crate) fn alloc_group_id(&mut self) -> u32 {
        let id = self.next_group_id;
        self.next_group_id += 1;
        id
    }
}

/// Log a misuse error at the point of detection.
pub(crate) fn misuse(err: FormsError) -> FormsError {
    tracing::error!(target: targets::OBJECT, "{err}");
    err
}

static_assertions::assert_impl_all!(FormId: Send, Sync, Copy);
