//! Looks, policies, visibility and activation.
//!
//! Every setter applied to a group's begin marker applies to each member
//! of the group instead.

use std::time::Duration;

use forma_core::keys::{MAX_SHORTCUTS, parse_shortcut};
use forma_core::logging::targets;
use forma_core::{Align, Event, EventKind, Result, clamp_border_width};
use forma_render::{BoxType, Color, FontStyle};

use super::{FindKind, FormId, Forms};
use crate::widget::{Gravity, ResizePolicy, Widget, WidgetClass, WidgetId};

impl Forms {
    /// Apply `change` to every cascade target of `id`, tell each target's
    /// handler, then repaint what changed.
    fn change_attribute(&mut self, id: WidgetId, change: impl Fn(&mut Widget)) -> Result<()> {
        self.widget_ref(id)?;
        for t in self.cascade_targets(id) {
            let before = self.bbox(t);
            change(&mut self.widgets[t]);
            self.handle_object(t, &Event::new(EventKind::Attrib), true);

            let w = &self.widgets[t];
            let shown = w.visible && w.form.is_some_and(|f| self.forms[f].visible);
            let form = w.form;
            let after = self.bbox(t);
            match form {
                // The label may have moved outside the box: clear the old area too.
                Some(form) if shown && before != after => {
                    self.invalidate_tree(t);
                    self.redraw_region(form, before.union(&after));
                }
                _ => self.mark_for_redraw(t),
            }
        }
        self.flush_pending_redraws();
        Ok(())
    }

    /// Set a flag that has no effect on looks.
    fn change_policy(&mut self, id: WidgetId, change: impl Fn(&mut Widget)) -> Result<()> {
        self.widget_ref(id)?;
        for t in self.cascade_targets(id) {
            change(&mut self.widgets[t]);
        }
        Ok(())
    }

    pub fn set_label(&mut self, id: WidgetId, label: &str) -> Result<()> {
        self.change_attribute(id, |w| {
            if w.label != label {
                w.label = label.to_owned();
            }
        })
    }

    pub fn set_label_color(&mut self, id: WidgetId, color: Color) -> Result<()> {
        self.change_attribute(id, |w| w.lcol = color)
    }

    pub fn set_label_size(&mut self, id: WidgetId, size: i32) -> Result<()> {
        self.change_attribute(id, |w| w.lsize = size.max(1))
    }

    pub fn set_label_style(&mut self, id: WidgetId, style: FontStyle) -> Result<()> {
        self.change_attribute(id, |w| w.lstyle = style)
    }

    /// Where the label goes relative to the box.
    pub fn set_label_align(&mut self, id: WidgetId, align: Align) -> Result<()> {
        self.change_attribute(id, |w| w.align = align)
    }

    pub fn set_boxtype(&mut self, id: WidgetId, boxtype: BoxType) -> Result<()> {
        self.change_attribute(id, |w| w.boxtype = boxtype)
    }

    /// Set the box color and the class specific second color.
    pub fn set_color(&mut self, id: WidgetId, col1: Color, col2: Color) -> Result<()> {
        self.change_attribute(id, |w| {
            w.col1 = col1;
            w.col2 = col2;
        })
    }

    /// Set the border width, clamped to the supported range. Negative
    /// widths draw the border inside the box.
    pub fn set_border_width(&mut self, id: WidgetId, bw: i32) -> Result<()> {
        let bw = clamp_border_width(bw);
        self.change_attribute(id, |w| w.bw = bw)
    }

    pub fn set_resize_policy(&mut self, id: WidgetId, policy: ResizePolicy) -> Result<()> {
        self.change_policy(id, |w| w.resize = policy)
    }

    /// Which edges stay glued to the form's edges on resize.
    pub fn set_gravity(&mut self, id: WidgetId, nw: Gravity, se: Gravity) -> Result<()> {
        self.change_policy(id, |w| {
            w.nwgravity = nw;
            w.segravity = se;
        })
    }

    /// Bind keyboard shortcuts, e.g. `"^S#s"` or `"&1"`. An empty string
    /// removes them.
    pub fn set_shortcut(&mut self, id: WidgetId, spec: &str) -> Result<()> {
        let mut keys = parse_shortcut(spec);
        keys.truncate(MAX_SHORTCUTS);
        tracing::trace!(target: targets::SHORTCUT, ?id, spec, ?keys, "shortcut set");
        self.change_policy(id, |w| w.shortcuts = keys.clone())
    }

    /// Set or remove the tooltip shown when the pointer rests on the widget.
    pub fn set_tooltip(&mut self, id: WidgetId, text: Option<&str>) -> Result<()> {
        self.widget_ref(id)?;
        for t in self.cascade_targets(id) {
            self.hide_tooltip_of(t);
        }
        self.change_policy(id, |w| w.tooltip = text.filter(|t| !t.is_empty()).map(str::to_owned))
    }

    /// Paint the widget into an off-screen pixmap first. The pixmap is
    /// filled with the parent's box color, or the widget's own.
    pub fn set_dblbuffer(&mut self, id: WidgetId, on: bool) -> Result<()> {
        self.widget_ref(id)?;
        for t in self.cascade_targets(id) {
            let background = self.widgets[t]
                .parent
                .and_then(|p| self.widgets.get(p))
                .map_or(self.widgets[t].col1, |p| p.col1);
            let w = &mut self.widgets[t];
            w.dbl_buffer = on;
            w.dbl_background = background;
        }
        Ok(())
    }

    /// Clip the widget's drawing to its box.
    pub fn set_clip(&mut self, id: WidgetId, on: bool) -> Result<()> {
        self.change_policy(id, |w| w.clip = on)
    }

    /// Take part in keyboard focus handling.
    pub fn set_input(&mut self, id: WidgetId, on: bool) -> Result<()> {
        self.change_policy(id, |w| w.input = on)?;
        if !on {
            for t in self.cascade_targets(id) {
                self.lose_focus(t);
            }
        }
        Ok(())
    }

    /// Receive keys no shortcut and no focused widget consumed.
    pub fn set_wants_special_keys(&mut self, id: WidgetId, on: bool) -> Result<()> {
        self.change_policy(id, |w| w.wants_special_keys = on)
    }

    /// Receive STEP events on every [`step`](Self::step).
    pub fn set_automatic(&mut self, id: WidgetId, on: bool) -> Result<()> {
        self.widget_ref(id)?;
        for t in self.cascade_targets(id) {
            let w = &mut self.widgets[t];
            if w.automatic == on {
                continue;
            }
            w.automatic = on;
            if let Some(form) = w.form {
                let f = &mut self.forms[form];
                if on {
                    f.num_auto += 1;
                } else {
                    f.num_auto = f.num_auto.saturating_sub(1);
                }
            }
        }
        Ok(())
    }

    /// Maximum delay between the clicks of a double or triple click.
    /// Zero disables multi-click detection for the widget.
    pub fn set_click_timeout(&mut self, id: WidgetId, timeout: Duration) -> Result<()> {
        self.change_policy(id, |w| w.click_timeout = timeout)
    }

    // =========================================================================
    // Visibility and activation
    // =========================================================================

    /// Hide a widget and its children. The area they covered is repainted.
    pub fn hide(&mut self, id: WidgetId) -> Result<()> {
        let group_form = self.group_form(id)?;
        if let Some(form) = group_form {
            self.freeze(form)?;
        }
        for t in self.cascade_targets(id) {
            self.hide_one(t);
        }
        if let Some(form) = group_form {
            self.unfreeze(form)?;
        }
        Ok(())
    }

    fn hide_one(&mut self, id: WidgetId) {
        let w = &self.widgets[id];
        if !w.visible {
            return;
        }
        let form = w.form;
        let bbox = self.bbox(id);
        self.hide_tooltip_of(id);

        let subtree = self.subtree(id);
        for t in &subtree {
            self.widgets[*t].visible = false;
        }
        for t in subtree {
            self.lose_focus(t);
            if self.interaction.pushed == Some(t) {
                self.interaction.pushed = None;
            }
            if self.interaction.mouse == Some(t) {
                self.interaction.mouse = None;
            }
            let w = &mut self.widgets[t];
            w.pushed = false;
            w.belowmouse = false;
            w.redraw = false;
        }
        tracing::trace!(target: targets::OBJECT, ?id, "hidden");

        if let Some(form) = form
            && self.forms[form].visible
        {
            self.redraw_region(form, bbox);
        }
    }

    /// Show a hidden widget and its children.
    pub fn show(&mut self, id: WidgetId) -> Result<()> {
        let group_form = self.group_form(id)?;
        if let Some(form) = group_form {
            self.freeze(form)?;
        }
        for t in self.cascade_targets(id) {
            if self.widgets[t].visible {
                continue;
            }
            for s in self.subtree(t) {
                self.widgets[s].visible = true;
            }
            self.take_focus_if_unfocused(t);
            self.mark_for_redraw(t);
        }
        if let Some(form) = group_form {
            self.unfreeze(form)?;
        }
        Ok(())
    }

    /// Stop a widget (and its children) from reacting to input. It keeps
    /// its tooltip.
    pub fn deactivate(&mut self, id: WidgetId) -> Result<()> {
        self.widget_ref(id)?;
        for t in self.cascade_targets(id) {
            if !self.widgets[t].active {
                continue;
            }
            let subtree = self.subtree(t);
            for s in &subtree {
                self.widgets[*s].active = false;
            }
            for s in subtree {
                self.lose_focus(s);
                if self.interaction.pushed == Some(s) {
                    self.interaction.pushed = None;
                    self.widgets[s].pushed = false;
                }
            }
            self.mark_for_redraw(t);
        }
        self.flush_pending_redraws();
        Ok(())
    }

    pub fn activate(&mut self, id: WidgetId) -> Result<()> {
        self.widget_ref(id)?;
        for t in self.cascade_targets(id) {
            if self.widgets[t].active {
                continue;
            }
            for s in self.subtree(t) {
                self.widgets[s].active = true;
            }
            self.take_focus_if_unfocused(t);
            self.mark_for_redraw(t);
        }
        self.flush_pending_redraws();
        Ok(())
    }

    fn take_focus_if_unfocused(&mut self, id: WidgetId) {
        let Some(form) = self.widgets[id].form else {
            return;
        };
        if self.forms[form].focus.is_none() && FindKind::Input.matches(&self.widgets[id]) {
            let _ = self.set_focus(form, Some(id));
        }
    }

    /// The form to freeze while a group cascade runs.
    fn group_form(&self, id: WidgetId) -> Result<Option<FormId>> {
        let w = self.widget_ref(id)?;
        Ok((w.class == WidgetClass::BeginGroup).then_some(w.form).flatten())
    }
}
