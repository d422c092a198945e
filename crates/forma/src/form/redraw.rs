//! Dirty tracking, the redraw passes and freezing.
//!
//! Mutations never draw directly. They mark widgets dirty, and a redraw
//! pass paints every dirty widget of a form in z-order:
//!
//! 1. Nothing happens while the form is hidden or frozen.
//! 2. A dirty widget that lies under later widgets makes the overlapping
//!    later widgets dirty too, so they are painted over it again.
//! 3. Each dirty widget is painted: into its own pixmap if it is double
//!    buffered, clipped to its box if it asks for that, body first and
//!    label second.
//!
//! A full redraw paints all visible widgets. It runs when a form is shown,
//! unfrozen or exposed, and is the only pass using the form's backing
//! pixmap.

use forma_core::logging::targets;
use forma_core::{Event, EventKind, FormsError, Point, Rect, Result, Size};
use forma_render::Drawable;

use super::{FormId, Forms, misuse};
use crate::widget::{WidgetClass, WidgetId};

/// Counters describing the work the redraw engine did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedrawStats {
    /// Passes over dirty widgets.
    pub partial_passes: u64,
    /// Passes over all widgets.
    pub full_redraws: u64,
    /// Widgets painted.
    pub painted: u64,
    /// Widgets skipped because they were outside the permanent clip.
    pub clipped_out: u64,
    /// Widgets painted by the most recent pass, in paint order.
    pub last_pass: Vec<WidgetId>,
}

impl Forms {
    pub fn redraw_stats(&self) -> &RedrawStats {
        &self.stats
    }

    pub fn reset_redraw_stats(&mut self) {
        self.stats = RedrawStats::default();
    }

    /// Mark a widget and its children as needing a redraw, without drawing.
    pub fn invalidate(&mut self, id: WidgetId) -> Result<()> {
        self.widget_ref(id)?;
        self.invalidate_tree(id);
        Ok(())
    }

    /// Paint the dirty widgets of the form `id` is on.
    ///
    /// A widget that is not marked is not drawn, so asking twice in a row
    /// paints once.
    pub fn redraw(&mut self, id: WidgetId) -> Result<()> {
        let form = self.attached_form(id)?;
        self.redraw_marked(form);
        Ok(())
    }

    /// Paint every visible widget of a form.
    pub fn redraw_all(&mut self, form: FormId) -> Result<()> {
        self.form_ref(form)?;
        self.redraw_form(form);
        Ok(())
    }

    /// Suspend drawing of a form. Calls nest.
    pub fn freeze(&mut self, form: FormId) -> Result<()> {
        let f = self.form_entry(form)?;
        f.frozen += 1;
        tracing::trace!(target: targets::REDRAW, ?form, depth = f.frozen, "freeze");
        Ok(())
    }

    /// Undo one [`freeze`](Self::freeze). The last one repaints the form
    /// completely if it is shown.
    pub fn unfreeze(&mut self, form: FormId) -> Result<()> {
        let f = self.form_entry(form)?;
        if f.frozen == 0 {
            return Err(misuse(FormsError::NotFrozen));
        }
        f.frozen -= 1;
        tracing::trace!(target: targets::REDRAW, ?form, depth = f.frozen, "unfreeze");
        if f.frozen == 0 && f.visible {
            f.damage.clear();
            self.redraw_form(form);
        }
        Ok(())
    }

    pub(crate) fn invalidate_tree(&mut self, id: WidgetId) {
        for w in self.subtree(id) {
            if let Some(w) = self.widgets.get_mut(w) {
                w.redraw = true;
            }
        }
    }

    /// Mark `id` dirty and get it painted: right away, or once the running
    /// dispatch is done.
    pub(crate) fn mark_for_redraw(&mut self, id: WidgetId) {
        self.invalidate_tree(id);
        let Some(form) = self.form_of(id) else {
            return;
        };
        if self.interaction.dispatch_depth > 0 {
            self.interaction.pending.insert(form);
        } else {
            self.redraw_marked(form);
        }
    }

    /// Run the passes requested while handlers were running.
    pub(crate) fn flush_pending_redraws(&mut self) {
        if self.interaction.dispatch_depth > 0 {
            return;
        }
        let pending: Vec<FormId> = self.interaction.pending.drain().collect();
        for form in pending {
            self.redraw_marked(form);
        }
    }

    /// Add `area` to the damage of a form and repaint what it covers.
    pub(crate) fn redraw_region(&mut self, form: FormId, area: Rect) {
        if let Some(f) = self.forms.get_mut(form) {
            f.damage.add(area);
        }
        self.redraw_damaged(form);
    }

    /// Repaint the damaged part of a form with the permanent clip set to it.
    pub(crate) fn redraw_damaged(&mut self, form: FormId) {
        let Some(f) = self.forms.get_mut(form) else {
            return;
        };
        if !f.visible || f.frozen > 0 || !f.damage.has_damage() {
            return;
        }
        let rects = f.damage.count();
        let Some(region) = f.damage.take() else {
            return;
        };
        tracing::trace!(target: targets::REDRAW, ?form, ?region, rects, "damaged redraw");
        self.clip.set_all(self.surface.as_mut(), region);
        self.redraw_form(form);
        self.clip.unset_all(self.surface.as_mut());
    }

    /// The partial pass: paint dirty widgets and the widgets on top of them.
    #[tracing::instrument(skip(self), target = "forma::redraw", level = "trace")]
    pub(crate) fn redraw_marked(&mut self, form: FormId) {
        let Some(f) = self.forms.get(form) else {
            return;
        };
        let Some(window) = f.window else {
            return;
        };
        if !f.visible || f.frozen > 0 {
            return;
        }
        let list = f.widgets.clone();

        for (i, a) in list.iter().enumerate() {
            let w = &self.widgets[*a];
            if !(w.redraw && w.visible && w.is_under) || w.class.is_group_marker() {
                continue;
            }
            let above: Vec<WidgetId> = list[i + 1..]
                .iter()
                .copied()
                .filter(|b| !self.widgets[*b].class.is_group_marker() && self.objects_intersect(*a, *b))
                .collect();
            for b in above {
                self.widgets[b].redraw = true;
            }
        }

        if !list.iter().any(|id| self.widgets[*id].redraw) {
            return;
        }

        self.stats.partial_passes += 1;
        self.stats.last_pass.clear();
        let target = Drawable::Window(window);
        self.surface.set_target(target);
        self.surface.set_origin(Point::ZERO);

        self.interaction.dispatch_depth += 1;
        for id in list {
            let Some(w) = self.widgets.get_mut(id) else {
                continue;
            };
            if !w.redraw {
                continue;
            }
            w.redraw = false;
            if !w.visible || w.class.is_group_marker() {
                continue;
            }
            if self.clip.is_clipped_out(self.bbox(id)) {
                self.stats.clipped_out += 1;
                continue;
            }
            self.paint_widget(id, target);
        }
        self.interaction.dispatch_depth -= 1;
        // Requests made while painting were for widgets this pass reached.
        self.interaction.pending.remove(&form);
    }

    /// The full pass over every visible widget.
    #[tracing::instrument(skip(self), target = "forma::redraw", level = "debug")]
    pub(crate) fn redraw_form(&mut self, form: FormId) {
        let Some(f) = self.forms.get_mut(form) else {
            return;
        };
        let Some(window) = f.window else {
            return;
        };
        if !f.visible || f.frozen > 0 {
            return;
        }
        let list = f.widgets.clone();
        let size = Size::new(f.area.width(), f.area.height());

        if let Some(old) = f.backing.take() {
            self.surface.free_pixmap(old);
        }
        let backing = if self.forms[form].dbl_buffer {
            match self.surface.create_pixmap(size) {
                Ok(p) => Some(p),
                Err(err) => {
                    tracing::warn!(target: targets::REDRAW, ?form, %err, "no form backing store");
                    None
                }
            }
        } else {
            None
        };
        self.forms[form].backing = backing;

        self.stats.full_redraws += 1;
        self.stats.last_pass.clear();
        let target = backing.map_or(Drawable::Window(window), Drawable::Pixmap);
        self.surface.set_target(target);
        self.surface.set_origin(Point::ZERO);

        self.interaction.dispatch_depth += 1;
        for id in list {
            let Some(w) = self.widgets.get_mut(id) else {
                continue;
            };
            w.redraw = false;
            if !w.visible || w.class.is_group_marker() {
                continue;
            }
            if self.clip.is_clipped_out(self.bbox(id)) {
                self.stats.clipped_out += 1;
                continue;
            }
            self.paint_widget(id, target);
        }
        self.interaction.dispatch_depth -= 1;
        self.interaction.pending.remove(&form);

        if let Some(pixmap) = backing {
            let window = Drawable::Window(window);
            if let Err(err) = self.surface.copy_area(pixmap, Rect::new(0, 0, size.width, size.height), window, Point::ZERO) {
                tracing::warn!(target: targets::REDRAW, ?form, %err, "backing store copy failed");
            }
            self.surface.set_target(window);
        }
    }

    /// Body and label of one widget, drawn to `target`.
    fn paint_widget(&mut self, id: WidgetId, target: Drawable) {
        let w = &self.widgets[id];
        let area = w.area;
        let background = w.dbl_background;
        let clip = (w.class == WidgetClass::Free || w.clip) && !self.clip.has_perm();

        let pixmap = if w.dbl_buffer {
            match self.surface.create_pixmap(Size::new(area.width(), area.height())) {
                Ok(p) => Some(p),
                Err(err) => {
                    tracing::warn!(target: targets::REDRAW, ?id, %err, "drawing unbuffered");
                    None
                }
            }
        } else {
            None
        };
        if let Some(p) = pixmap {
            self.surface.set_target(Drawable::Pixmap(p));
            self.surface.set_origin(area.origin);
            self.surface.fill_rect(area, background);
        }

        if clip {
            self.clip.set_clip(self.surface.as_mut(), area);
        }
        self.handle_object(id, &Event::new(EventKind::Draw), true);
        if clip {
            self.clip.unset_clip(self.surface.as_mut());
        }

        if let Some(p) = pixmap {
            self.surface.set_target(target);
            self.surface.set_origin(Point::ZERO);
            let src = Rect::new(0, 0, area.width(), area.height());
            if let Err(err) = self.surface.copy_area(p, src, target, area.origin) {
                tracing::warn!(target: targets::REDRAW, ?id, %err, "pixmap copy failed");
            }
            self.surface.free_pixmap(p);
        }

        self.handle_object(id, &Event::new(EventKind::DrawLabel), true);

        self.stats.painted += 1;
        self.stats.last_pass.push(id);
        tracing::trace!(target: targets::REDRAW, ?id, "painted");
    }
}

#[cfg(test)]
mod tests {
    use forma_core::FormsConfig;
    use forma_render::{DrawOp, RecordingSurface, WindowHandle};

    use super::*;
    use crate::widget::widgets::BoxKind;

    fn shown() -> (Forms, FormId) {
        let mut forms = Forms::with_config(RecordingSurface::new(), FormsConfig::default());
        let form = forms.create_form(200, 200, "");
        forms.show_form(form, WindowHandle(7)).unwrap();
        (forms, form)
    }

    #[test]
    fn test_attach_to_shown_form_paints() {
        let (mut forms, form) = shown();
        forms.reset_redraw_stats();
        let a = forms.add_box(form, BoxKind::Up, 10, 10, 20, 20, "").unwrap();
        assert_eq!(forms.redraw_stats().last_pass, vec![a]);
        assert!(!forms.widget(a).unwrap().needs_redraw());
    }

    #[test]
    fn test_hidden_form_keeps_marks() {
        let mut forms = Forms::with_config(RecordingSurface::new(), FormsConfig::default());
        let form = forms.create_form(200, 200, "");
        let a = forms.add_box(form, BoxKind::Up, 10, 10, 20, 20, "").unwrap();
        assert!(forms.widget(a).unwrap().needs_redraw());
        forms.show_form(form, WindowHandle(7)).unwrap();
        assert!(!forms.widget(a).unwrap().needs_redraw());
        assert_eq!(forms.redraw_stats().full_redraws, 1);
    }

    #[test]
    fn test_double_buffered_widget_is_copied() {
        let (mut forms, form) = shown();
        let a = forms.create_box(BoxKind::Flat, 10, 10, 20, 20, "");
        forms.set_dblbuffer(a, true).unwrap();
        forms.attach(form, a).unwrap();
        let surface = forms.surface_as::<RecordingSurface>().unwrap();
        let copy = surface.commands().iter().find_map(|c| match c.op {
            DrawOp::Copy { src_rect, to, .. } => Some((src_rect, to)),
            _ => None,
        });
        assert_eq!(copy, Some((Rect::new(0, 0, 20, 20), Point::new(10, 10))));
        assert_eq!(surface.live_pixmaps(), 0);
    }

    #[test]
    fn test_form_backing_store_only_in_full_redraw() {
        let mut forms = Forms::with_config(RecordingSurface::new(), FormsConfig::default());
        let form = forms.create_form(50, 40, "");
        forms.add_box(form, BoxKind::Flat, 0, 0, 10, 10, "").unwrap();
        forms.set_form_dblbuffer(form, true).unwrap();
        forms.show_form(form, WindowHandle(3)).unwrap();
        let surface = forms.surface_as::<RecordingSurface>().unwrap();
        assert_eq!(surface.pixmaps_created(), 1);
        assert_eq!(surface.live_pixmaps(), 1);
        let last = surface.commands().last().map(|c| (c.target, c.op.clone()));
        assert!(matches!(
            last,
            Some((Drawable::Window(WindowHandle(3)), DrawOp::Copy { to: Point { x: 0, y: 0 }, .. }))
        ));
    }

    #[test]
    fn test_damage_outside_the_form_paints_nothing() {
        let (mut forms, form) = shown();
        let a = forms.add_box(form, BoxKind::Up, 10, 10, 20, 20, "").unwrap();
        forms.reset_redraw_stats();

        forms.redraw_region(form, Rect::new(300, 300, 10, 10));
        assert_eq!(forms.redraw_stats().full_redraws, 0);

        forms.redraw_region(form, Rect::new(5, 5, 10, 10));
        forms.redraw_region(form, Rect::new(0, 0, 0, 0));
        assert_eq!(forms.redraw_stats().full_redraws, 1);
        assert_eq!(forms.redraw_stats().last_pass, vec![a]);
        assert!(!forms.form_ref(form).unwrap().damage.has_damage());
    }

    #[test]
    fn test_unfreeze_without_freeze() {
        let (mut forms, form) = shown();
        assert!(matches!(forms.unfreeze(form), Err(FormsError::NotFrozen)));
    }

    #[test]
    fn test_frozen_form_does_not_draw() {
        let (mut forms, form) = shown();
        forms.freeze(form).unwrap();
        forms.reset_redraw_stats();
        let a = forms.add_box(form, BoxKind::Up, 10, 10, 20, 20, "").unwrap();
        assert_eq!(forms.redraw_stats().painted, 0);
        forms.unfreeze(form).unwrap();
        assert_eq!(forms.redraw_stats().full_redraws, 1);
        assert_eq!(forms.redraw_stats().last_pass, vec![a]);
    }
}
