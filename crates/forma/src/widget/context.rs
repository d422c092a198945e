//! What a handler can reach while it processes an event.

use std::time::{Duration, Instant};

use forma_core::{Align, EventKind, FormsConfig, Rect, TimerId};
use forma_render::{BoxType, Color, DrawSurface, LABEL_MARGIN, draw_box, draw_text_aligned};

use super::record::Widget;
use super::traits::WidgetHandler;
use super::WidgetId;
use crate::form::Forms;

/// Access to the engine for the duration of one handler call.
///
/// The handler being called is detached from its widget while it runs, so
/// the widget record itself can be borrowed freely through the context.
/// Redraw requests made here are deferred until the dispatch that caused
/// them has finished.
pub struct HandlerContext<'a> {
    pub(crate) forms: &'a mut Forms,
    pub(crate) id: WidgetId,
    pub(crate) kind: EventKind,
}

impl<'a> HandlerContext<'a> {
    pub(crate) fn new(forms: &'a mut Forms, id: WidgetId, kind: EventKind) -> Self {
        Self { forms, id, kind }
    }

    /// The widget being handled.
    #[inline]
    pub fn id(&self) -> WidgetId {
        self.id
    }

    pub fn widget(&self) -> &Widget {
        &self.forms.widgets[self.id]
    }

    pub(crate) fn widget_mut(&mut self) -> &mut Widget {
        &mut self.forms.widgets[self.id]
    }

    /// Read access to the whole engine.
    pub fn forms(&self) -> &Forms {
        self.forms
    }

    pub(crate) fn forms_mut(&mut self) -> &mut Forms {
        self.forms
    }

    pub fn config(&self) -> &FormsConfig {
        &self.forms.config
    }

    /// The engine's notion of the current time.
    pub fn now(&self) -> Instant {
        self.forms.now
    }

    pub fn surface(&mut self) -> &mut dyn DrawSurface {
        self.forms.surface.as_mut()
    }

    /// The widget record together with the surface, for drawing code that
    /// needs both.
    pub fn painter(&mut self) -> (&Widget, &mut dyn DrawSurface) {
        (&self.forms.widgets[self.id], self.forms.surface.as_mut())
    }

    /// Draw the widget's own box.
    pub fn draw_box(&mut self) {
        let (w, surface) = self.painter();
        draw_box(surface, w.boxtype, w.area, w.col1, w.bw);
    }

    pub fn draw_box_with(&mut self, kind: BoxType, rect: Rect, color: Color, bw: i32) {
        draw_box(self.surface(), kind, rect, color, bw);
    }

    /// Draw the label where its alignment puts it, inside or beside the box.
    pub fn draw_label(&mut self) {
        let (w, surface) = self.painter();
        if w.label.is_empty() {
            return;
        }
        draw_text_aligned(surface, w.align, w.area, LABEL_MARGIN, &w.label, w.label_font(), w.lcol);
    }

    /// Draw the label only if it sits outside the box.
    pub fn draw_label_outside(&mut self) {
        if self.widget().align.is_outside() {
            self.draw_label();
        }
    }

    /// Draw text in the widget's label font. Returns the text's bounding box.
    pub fn draw_text(&mut self, align: Align, area: Rect, text: &str, color: Color) -> Rect {
        let (w, surface) = self.painter();
        draw_text_aligned(surface, align, area, LABEL_MARGIN, text, w.label_font(), color)
    }

    /// Start a one-shot timer. When it expires the widget receives a
    /// [`EventKind::Timeout`] event carrying the returned id.
    pub fn start_timer(&mut self, duration: Duration) -> TimerId {
        self.forms.start_widget_timer(self.id, duration)
    }

    /// Cancel a timer started with [`start_timer`](Self::start_timer).
    /// Cancelling a timer that already fired is harmless.
    pub fn stop_timer(&mut self, timer: TimerId) {
        self.forms.stop_widget_timer(timer);
    }

    /// Ask for the widget (and its children) to be repainted once the
    /// current dispatch is done. Ignored while the widget is being drawn.
    pub fn request_redraw(&mut self) {
        if matches!(self.kind, EventKind::Draw | EventKind::DrawLabel) {
            return;
        }
        self.forms.mark_for_redraw(self.id);
    }

    /// Ask for UPDATE events while the widget is pushed.
    pub fn set_want_update(&mut self, want: bool) {
        self.widget_mut().want_update = want;
    }

    /// Ask for the focus to come back to this widget the next time another
    /// widget would receive it. Used when leaving the widget failed, e.g.
    /// because its content did not validate.
    pub fn refocus(&mut self) {
        self.forms.interaction.refocus = Some(self.id);
    }

    /// The handler of one of this widget's children, if it is a `T`.
    pub fn child_handler_mut<T: WidgetHandler>(&mut self, child: WidgetId) -> Option<&mut T> {
        let w = self.forms.widgets.get_mut(child)?;
        if w.parent != Some(self.id) {
            return None;
        }
        w.handler.as_mut()?.downcast_mut::<T>()
    }
}
