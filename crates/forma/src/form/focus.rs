//! Keyboard focus and widget searches.

use forma_core::logging::targets;
use forma_core::{Event, EventKind, FormsError, Point, Result};

use super::{FormId, Forms, misuse};
use crate::widget::{Widget, WidgetId};

/// What [`Forms::find_first`] and [`Forms::find_last`] look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindKind {
    /// Any widget that can be interacted with.
    Any,
    /// An active widget taking keyboard input.
    Input,
    /// A widget receiving STEP events.
    Automatic,
    /// A widget whose box contains the point (edges included).
    Mouse(Point),
    /// A widget asking for keys nobody else handled.
    KeySpecial,
}

impl FindKind {
    pub(crate) fn matches(self, w: &Widget) -> bool {
        if w.class.is_group_marker() || !w.visible {
            return false;
        }
        // Inactive widgets still show tooltips and run post-handlers.
        if !(w.active || w.posthandler.is_some() || w.tooltip.is_some()) {
            return false;
        }
        match self {
            FindKind::Any => true,
            FindKind::Input => w.input && w.active,
            FindKind::Automatic => w.automatic,
            FindKind::Mouse(p) => w.area.contains_inclusive(p),
            FindKind::KeySpecial => w.wants_special_keys && w.active,
        }
    }
}

impl Forms {
    /// The first widget of a form, in z-order, matching `kind`.
    pub fn find_first(&self, form: FormId, kind: FindKind) -> Option<WidgetId> {
        let f = self.forms.get(form)?;
        f.widgets.iter().copied().find(|id| kind.matches(&self.widgets[*id]))
    }

    /// The last widget matching `kind`. For mouse searches this is the
    /// topmost widget under the pointer.
    pub fn find_last(&self, form: FormId, kind: FindKind) -> Option<WidgetId> {
        let f = self.forms.get(form)?;
        f.widgets.iter().rev().copied().find(|id| kind.matches(&self.widgets[*id]))
    }

    /// Move the keyboard focus of a form to `target`, or nowhere.
    ///
    /// The old focus widget gets UNFOCUS, the new one FOCUS. If the old one
    /// asked to be refocused (e.g. because its content didn't validate), it
    /// keeps the focus.
    pub fn set_focus(&mut self, form: FormId, target: Option<WidgetId>) -> Result<()> {
        let old = self.form_ref(form)?.focus;
        if let Some(t) = target {
            let w = self.widget_ref(t)?;
            if w.form != Some(form) {
                return Err(misuse(FormsError::NotAttached));
            }
            if w.class.is_group_marker() {
                return Err(misuse(FormsError::GroupMarker));
            }
        }
        if old == target {
            return Ok(());
        }

        if let Some(old) = old {
            self.forms[form].focus = None;
            if let Some(w) = self.widgets.get_mut(old) {
                w.focus = false;
            }
            self.handle_object(old, &Event::new(EventKind::Unfocus), false);
        }

        if let Some(t) = target {
            self.forms[form].focus = Some(t);
            self.widgets[t].focus = true;
            tracing::trace!(target: targets::DISPATCH, ?form, widget = ?t, "focus set");
            self.handle_object(t, &Event::new(EventKind::Focus), false);
        }
        Ok(())
    }

    /// Pass the focus on because `id` is going away.
    ///
    /// Does nothing unless `id` has the focus. The next holder is the first
    /// other input widget of the form. A refocus request left by `id` on its
    /// way out moves to that holder, so the focus event it receives consumes
    /// the request instead of bouncing back to a hidden widget.
    pub(crate) fn lose_focus(&mut self, id: WidgetId) {
        let Some(form) = self.form_of(id) else {
            return;
        };
        if self.forms[form].focus != Some(id) {
            return;
        }

        self.forms[form].focus = None;
        self.widgets[id].focus = false;
        self.handle_object(id, &Event::new(EventKind::Unfocus), true);

        let next = self.forms[form]
            .widgets
            .iter()
            .copied()
            .find(|w| *w != id && FindKind::Input.matches(&self.widgets[*w]));
        if self.interaction.refocus == Some(id) {
            self.interaction.refocus = next;
        }
        if let Some(next) = next {
            self.forms[form].focus = Some(next);
            self.widgets[next].focus = true;
            self.handle_object(next, &Event::new(EventKind::Focus), false);
        }
    }

    /// Move the focus to the next (or previous) input widget, wrapping
    /// around.
    pub fn cycle_focus(&mut self, form: FormId, backwards: bool) -> Result<()> {
        let f = self.form_ref(form)?;
        let inputs: Vec<WidgetId> = f
            .widgets
            .iter()
            .copied()
            .filter(|w| FindKind::Input.matches(&self.widgets[*w]))
            .collect();
        if inputs.is_empty() {
            return Ok(());
        }
        let current = f.focus.and_then(|c| inputs.iter().position(|w| *w == c));
        let next = match (current, backwards) {
            (None, false) => 0,
            (None, true) => inputs.len() - 1,
            (Some(i), false) => (i + 1) % inputs.len(),
            (Some(i), true) => (i + inputs.len() - 1) % inputs.len(),
        };
        self.set_focus(form, Some(inputs[next]))
    }
}

#[cfg(test)]
mod tests {
    use forma_core::FormsConfig;
    use forma_render::RecordingSurface;

    use super::*;
    use crate::widget::WidgetClass;

    #[test]
    fn test_mouse_search_prefers_topmost() {
        let mut forms = Forms::with_config(RecordingSurface::new(), FormsConfig::default());
        let form = forms.create_form(100, 100, "");
        let a = forms.add_widget(form, WidgetClass::Box, None, 0, 0, 50, 50, "").unwrap();
        let b = forms.add_widget(form, WidgetClass::Box, None, 25, 25, 50, 50, "").unwrap();
        assert_eq!(forms.find_last(form, FindKind::Mouse(Point::new(30, 30))), Some(b));
        assert_eq!(forms.find_last(form, FindKind::Mouse(Point::new(10, 10))), Some(a));
        // Edges count.
        assert_eq!(forms.find_last(form, FindKind::Mouse(Point::new(75, 75))), Some(b));
        assert_eq!(forms.find_last(form, FindKind::Mouse(Point::new(90, 90))), None);

        forms.deactivate(b).unwrap();
        assert_eq!(forms.find_last(form, FindKind::Mouse(Point::new(30, 30))), Some(a));
        forms.set_tooltip(b, Some("tip")).unwrap();
        assert_eq!(forms.find_last(form, FindKind::Mouse(Point::new(30, 30))), Some(b));
    }
}
