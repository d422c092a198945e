//! Attaching, detaching and freeing widgets; groups; overlap bookkeeping.

use forma_core::logging::targets;
use forma_core::{Event, EventKind, FormsError, Rect, Result};

use super::{FormId, Forms, OpenGroup, misuse};
use crate::widget::{HrOffsets, Widget, WidgetClass, WidgetId};

/// Box used for overlap tests. Canvases get a fixed margin, frames their
/// border.
fn padded_box(w: &Widget) -> Rect {
    let a = w.area;
    match w.class {
        WidgetClass::Canvas => Rect::new(a.x() - 3, a.y() - 3, a.width() + 7, a.height() + 7),
        WidgetClass::Frame | WidgetClass::LabelFrame => {
            let r = a.inflate(w.bw.abs());
            Rect::new(r.x(), r.y(), r.width() + 1, r.height() + 1)
        }
        _ => a,
    }
}

/// Widgets taking part in overlap tracking. Composite children move with
/// their parent and are left out.
fn tracks_overlap(w: &Widget) -> bool {
    !w.class.is_group_marker() && w.parent.is_none()
}

impl Forms {
    /// Append a detached widget (and its children) to a form.
    ///
    /// The widget goes to the end of the z-order, or to the end of the group
    /// that is currently open. Earlier widgets it overlaps are flagged as
    /// being under it, and it is drawn if the form is shown.
    pub fn attach(&mut self, form: FormId, id: WidgetId) -> Result<()> {
        self.form_ref(form)?;
        let w = self.widget_ref(id)?;
        if w.form.is_some() {
            return Err(misuse(FormsError::AlreadyAttached));
        }
        if w.class.is_group_marker() {
            return Err(misuse(FormsError::GroupMarker));
        }

        let f = &self.forms[form];
        let (index, group_id) = match f.open_group {
            Some(OpenGroup { id: gid, end: Some(end), .. }) => {
                (f.position(end).unwrap_or(f.widgets.len()), gid)
            }
            Some(OpenGroup { id: gid, .. }) => (f.widgets.len(), gid),
            None => (f.widgets.len(), 0),
        };
        let appended = index == f.widgets.len();

        self.link(form, id, index, group_id);
        tracing::debug!(target: targets::FORM, ?form, ?id, index, group_id, "widget attached");

        if appended {
            self.mark_earlier_under(form, id);
        } else {
            self.recalc_intersections(form);
        }
        self.settle_attached(form, id);
        Ok(())
    }

    /// Attach a detached widget to the form of `before`, right in front of
    /// it in the z-order. The widget joins the group of `before`.
    pub fn insert_before(&mut self, id: WidgetId, before: WidgetId) -> Result<()> {
        let w = self.widget_ref(id)?;
        if w.form.is_some() {
            return Err(misuse(FormsError::AlreadyAttached));
        }
        if w.class.is_group_marker() {
            return Err(misuse(FormsError::GroupMarker));
        }
        let form = self.attached_form(before)?;
        let group_id = self.widgets[before].group_id;
        let index = self.forms[form].position(before).unwrap_or(0);

        self.link(form, id, index, group_id);
        tracing::debug!(target: targets::FORM, ?form, ?id, ?before, "widget inserted");
        self.recalc_intersections(form);
        self.settle_attached(form, id);
        Ok(())
    }

    /// Make `child` a component of the composite `parent`.
    ///
    /// Children always follow their parent (and the parent's earlier
    /// children) in the z-order. If the parent is attached the child is
    /// attached right away, otherwise it comes along when the parent is.
    pub fn attach_child(&mut self, parent: WidgetId, child: WidgetId) -> Result<()> {
        let p = self.widget_ref(parent)?;
        let parent_form = p.form;
        let parent_group = p.group_id;
        let c = self.widget_ref(child)?;
        if c.form.is_some() || c.parent.is_some() {
            return Err(misuse(FormsError::AlreadyAttached));
        }
        if c.class.is_group_marker() || p.class.is_group_marker() {
            return Err(misuse(FormsError::GroupMarker));
        }
        let mut ancestor = Some(parent);
        while let Some(a) = ancestor {
            if a == child {
                return Err(misuse(FormsError::CircularParent));
            }
            ancestor = self.widgets.get(a).and_then(|w| w.parent);
        }

        self.widgets[child].parent = Some(parent);
        self.widgets[parent].children.push(child);

        if let Some(form) = parent_form {
            let f = &self.forms[form];
            let index = self
                .subtree(parent)
                .iter()
                .filter(|w| **w != child)
                .filter_map(|w| f.position(*w))
                .max()
                .map_or(f.widgets.len(), |i| i + 1);
            self.link(form, child, index, parent_group);
            self.settle_attached(form, child);
        }
        Ok(())
    }

    /// Remove a widget (and its children) from its form. The widget stays
    /// alive and can be attached again.
    ///
    /// The widget loses the focus, stops being pushed or under the mouse,
    /// its timers are cancelled and pending queue entries dropped. Deleting
    /// a group's begin marker deletes the whole group.
    pub fn delete(&mut self, id: WidgetId) -> Result<()> {
        let form = self.attached_form(id)?;
        let w = &self.widgets[id];
        match w.class {
            WidgetClass::EndGroup => {
                let gid = w.group_id;
                let has_members = self.forms[form]
                    .widgets
                    .iter()
                    .any(|m| self.widgets[*m].group_id == gid && !self.widgets[*m].class.is_group_marker());
                if has_members {
                    return Err(misuse(FormsError::GroupNotEmpty));
                }
            }
            WidgetClass::BeginGroup => {
                let (members, markers): (Vec<_>, Vec<_>) = self
                    .group_span(form, id)
                    .into_iter()
                    .partition(|m| !self.widgets[*m].class.is_group_marker());
                self.freeze(form)?;
                for m in members {
                    if self.widgets[m].form.is_some() {
                        self.unlink(form, m);
                    }
                }
                for m in markers {
                    self.unlink(form, m);
                }
                let f = &mut self.forms[form];
                if f.open_group.is_some_and(|g| g.begin == id) {
                    f.open_group = None;
                }
                self.unfreeze(form)?;
            }
            _ => {}
        }

        self.unlink(form, id);
        tracing::debug!(target: targets::FORM, ?form, ?id, "widget deleted");
        Ok(())
    }

    /// Destroy a widget: delete it from its form, free its children (or the
    /// members of the group it begins), send it FREE and release the handle.
    pub fn free(&mut self, id: WidgetId) -> Result<()> {
        let w = self.widget_ref(id)?;
        let members = match (w.class, w.form) {
            (WidgetClass::BeginGroup, Some(form)) => self.group_span(form, id),
            _ => Vec::new(),
        };
        if w.form.is_some() {
            self.delete(id)?;
        }

        for m in members {
            if self.widgets.get(m).is_some_and(|w| w.parent.is_none()) {
                let _ = self.free(m);
            }
        }

        let children = std::mem::take(&mut self.widgets[id].children);
        for child in children {
            if let Some(c) = self.widgets.get_mut(child) {
                c.parent = None;
            }
            let _ = self.free(child);
        }
        if let Some(parent) = self.widgets[id].parent.take()
            && let Some(p) = self.widgets.get_mut(parent)
        {
            p.children.retain(|c| *c != id);
        }

        self.handle_object(id, &Event::new(EventKind::Free), true);

        self.cancel_timers_of(id);
        self.interaction.forget(id);
        self.queue.retain(|q| *q != id);
        self.widgets.remove(id);
        tracing::trace!(target: targets::OBJECT, ?id, "widget freed");
        Ok(())
    }

    // =========================================================================
    // Groups
    // =========================================================================

    /// Open a group on `form`. Widgets attached until [`end_group`] are its
    /// members. Returns the begin marker, which stands for the group in
    /// cascading operations.
    ///
    /// [`end_group`]: Self::end_group
    pub fn begin_group(&mut self, form: FormId) -> Result<WidgetId> {
        if self.form_ref(form)?.open_group.is_some() {
            return Err(misuse(FormsError::NestedGroup));
        }
        let gid = self.alloc_group_id();
        let marker = self.group_marker(WidgetClass::BeginGroup);
        let index = self.forms[form].widgets.len();
        self.link(form, marker, index, gid);
        self.forms[form].open_group = Some(OpenGroup {
            id: gid,
            begin: marker,
            end: None,
        });
        tracing::debug!(target: targets::FORM, ?form, group = gid, "group opened");
        Ok(marker)
    }

    /// Close the open group of `form`. Returns the end marker.
    pub fn end_group(&mut self, form: FormId) -> Result<WidgetId> {
        let Some(group) = self.form_entry(form)?.open_group.take() else {
            return Err(misuse(FormsError::NoOpenGroup));
        };
        if let Some(end) = group.end {
            return Ok(end);
        }
        let marker = self.group_marker(WidgetClass::EndGroup);
        let index = self.forms[form].widgets.len();
        self.link(form, marker, index, group.id);
        tracing::debug!(target: targets::FORM, ?form, group = group.id, "group closed");
        Ok(marker)
    }

    /// Reopen the group started by `begin`. Widgets attached until the next
    /// [`end_group`](Self::end_group) are added at the group's end.
    pub fn add_to_group(&mut self, begin: WidgetId) -> Result<()> {
        let w = self.widget_ref(begin)?;
        if w.class != WidgetClass::BeginGroup {
            return Err(misuse(FormsError::WrongClass { expected: "group" }));
        }
        let gid = w.group_id;
        let form = self.attached_form(begin)?;
        if self.forms[form].open_group.is_some() {
            return Err(misuse(FormsError::NestedGroup));
        }
        let end = self.forms[form]
            .widgets
            .iter()
            .copied()
            .find(|m| self.widgets[*m].class == WidgetClass::EndGroup && self.widgets[*m].group_id == gid);
        self.forms[form].open_group = Some(OpenGroup { id: gid, begin, end });
        Ok(())
    }

    /// The members of the group started by `begin`, in z-order, markers
    /// excluded.
    pub fn group_members(&self, begin: WidgetId) -> Result<Vec<WidgetId>> {
        let w = self.widget_ref(begin)?;
        if w.class != WidgetClass::BeginGroup {
            return Err(misuse(FormsError::WrongClass { expected: "group" }));
        }
        let form = self.attached_form(begin)?;
        Ok(self
            .group_span(form, begin)
            .into_iter()
            .filter(|m| !self.widgets[*m].class.is_group_marker())
            .collect())
    }

    /// Everything after `begin` up to and including its end marker.
    pub(crate) fn group_span(&self, form: FormId, begin: WidgetId) -> Vec<WidgetId> {
        let f = &self.forms[form];
        let gid = self.widgets[begin].group_id;
        let Some(start) = f.position(begin) else {
            return Vec::new();
        };
        let mut span = Vec::new();
        for id in &f.widgets[start + 1..] {
            let w = &self.widgets[*id];
            span.push(*id);
            if w.class == WidgetClass::EndGroup && w.group_id == gid {
                break;
            }
        }
        span
    }

    /// The widgets a cascading operation on `id` applies to: the members of
    /// the group if `id` begins one, else `id` itself.
    pub(crate) fn cascade_targets(&self, id: WidgetId) -> Vec<WidgetId> {
        match self.widgets.get(id) {
            Some(w) if w.class == WidgetClass::BeginGroup => self.group_members(id).unwrap_or_default(),
            Some(_) => vec![id],
            None => Vec::new(),
        }
    }

    fn group_marker(&mut self, class: WidgetClass) -> WidgetId {
        let mut marker = Widget::new(class, Rect::ZERO, "", 0);
        marker.visible = false;
        self.widgets.insert(marker)
    }

    // =========================================================================
    // Overlaps
    // =========================================================================

    /// Whether two widgets' padded boxes overlap with a positive area.
    pub fn objects_intersect(&self, a: WidgetId, b: WidgetId) -> bool {
        match (self.widgets.get(a), self.widgets.get(b)) {
            (Some(wa), Some(wb)) => padded_box(wa).intersect(&padded_box(wb)).is_some(),
            _ => false,
        }
    }

    /// Recompute the "under a later widget" flag of every widget of a form.
    pub(crate) fn recalc_intersections(&mut self, form: FormId) {
        let list = self.forms[form].widgets.clone();
        for (i, a) in list.iter().enumerate() {
            let under = tracks_overlap(&self.widgets[*a])
                && list[i + 1..]
                    .iter()
                    .any(|b| tracks_overlap(&self.widgets[*b]) && self.objects_intersect(*a, *b));
            self.widgets[*a].is_under = under;
        }
    }

    /// Flag the widgets before a newly appended one that it overlaps.
    fn mark_earlier_under(&mut self, form: FormId, id: WidgetId) {
        if !tracks_overlap(&self.widgets[id]) {
            return;
        }
        let f = &self.forms[form];
        let Some(i) = f.position(id) else {
            return;
        };
        let earlier: Vec<WidgetId> = f.widgets[..i]
            .iter()
            .copied()
            .filter(|a| tracks_overlap(&self.widgets[*a]) && self.objects_intersect(*a, id))
            .collect();
        for a in earlier {
            self.widgets[a].is_under = true;
        }
    }

    // =========================================================================
    // Linking
    // =========================================================================

    /// Insert `id` at `index` of the form's list, followed by its not yet
    /// attached children. Returns the index after the last inserted widget.
    fn link(&mut self, form: FormId, id: WidgetId, index: usize, group_id: u32) -> usize {
        let f = &mut self.forms[form];
        let (fw, fh) = (f.w_hr, f.h_hr);
        f.widgets.insert(index, id);

        let w = &mut self.widgets[id];
        w.form = Some(form);
        w.group_id = group_id;
        w.hr = HrOffsets::from_area(w.area, fw, fh);
        if w.automatic {
            self.forms[form].num_auto += 1;
        }

        let mut next = index + 1;
        let children = self.widgets[id].children.clone();
        for child in children {
            if self.widgets.get(child).is_some_and(|c| c.form.is_none()) {
                next = self.link(form, child, next, group_id);
            }
        }
        next
    }

    /// Focus and draw a widget that was just linked.
    fn settle_attached(&mut self, form: FormId, id: WidgetId) {
        let w = &self.widgets[id];
        if w.input && w.active && self.forms[form].focus.is_none() {
            let _ = self.set_focus(form, Some(id));
        }
        self.mark_for_redraw(id);
    }

    /// Take `id` and its attached children out of the form's list.
    fn unlink(&mut self, form: FormId, id: WidgetId) {
        self.hide_tooltip_of(id);

        let children = self.widgets[id].children.clone();
        for child in children {
            if self.widgets.get(child).is_some_and(|c| c.form == Some(form)) {
                self.unlink(form, child);
            }
        }

        let was_shown = self.forms[form].visible
            && self.widgets[id].visible
            && !self.widgets[id].class.is_group_marker();
        let bbox = self.bbox(id);

        self.lose_focus(id);
        self.interaction.forget(id);
        self.cancel_timers_of(id);
        self.queue.retain(|q| *q != id);

        let automatic = self.widgets[id].automatic;
        let f = &mut self.forms[form];
        f.widgets.retain(|w| *w != id);
        if automatic {
            f.num_auto = f.num_auto.saturating_sub(1);
        }
        if f.focus == Some(id) {
            f.focus = None;
        }

        let w = &mut self.widgets[id];
        w.form = None;
        w.group_id = 0;
        w.focus = false;
        w.pushed = false;
        w.belowmouse = false;
        w.is_under = false;
        w.redraw = false;

        self.recalc_intersections(form);
        if was_shown {
            self.redraw_region(form, bbox);
        }
    }

    /// `id` and all its descendants, parents before children.
    pub(crate) fn subtree(&self, id: WidgetId) -> Vec<WidgetId> {
        let mut out = vec![id];
        let mut i = 0;
        while i < out.len() {
            if let Some(w) = self.widgets.get(out[i]) {
                out.extend(w.children.iter().copied());
            }
            i += 1;
        }
        out
    }

    /// The outermost composite containing `id`.
    pub(crate) fn top_parent(&self, mut id: WidgetId) -> WidgetId {
        while let Some(parent) = self.widgets.get(id).and_then(|w| w.parent) {
            id = parent;
        }
        id
    }
}

#[cfg(test)]
mod tests {
    use forma_core::FormsConfig;
    use forma_render::RecordingSurface;

    use super::*;

    fn forms() -> (Forms, FormId) {
        let mut forms = Forms::with_config(RecordingSurface::new(), FormsConfig::default());
        let form = forms.create_form(300, 200, "test");
        (forms, form)
    }

    fn boxed(forms: &mut Forms, form: FormId, x: i32, y: i32, w: i32, h: i32) -> WidgetId {
        forms.add_widget(form, WidgetClass::Box, None, x, y, w, h, "").unwrap()
    }

    #[test]
    fn test_attach_appends_in_order() {
        let (mut forms, form) = forms();
        let a = boxed(&mut forms, form, 0, 0, 10, 10);
        let b = boxed(&mut forms, form, 50, 0, 10, 10);
        let f = forms.form(form).unwrap();
        assert_eq!(f.widgets(), &[a, b]);
        assert_eq!(f.next_of(a), Some(b));
        assert_eq!(f.prev_of(b), Some(a));
        assert_eq!(forms.widget(a).unwrap().form(), Some(form));
    }

    #[test]
    fn test_attach_twice_is_rejected() {
        let (mut forms, form) = forms();
        let a = boxed(&mut forms, form, 0, 0, 10, 10);
        assert!(matches!(forms.attach(form, a), Err(FormsError::AlreadyAttached)));
        assert_eq!(forms.form(form).unwrap().len(), 1);
    }

    #[test]
    fn test_overlap_flags_earlier_widget() {
        let (mut forms, form) = forms();
        let a = boxed(&mut forms, form, 0, 0, 20, 20);
        let b = boxed(&mut forms, form, 10, 10, 20, 20);
        let c = boxed(&mut forms, form, 100, 100, 5, 5);
        assert!(forms.widget(a).unwrap().is_under());
        assert!(!forms.widget(b).unwrap().is_under());
        assert!(!forms.widget(c).unwrap().is_under());

        forms.delete(b).unwrap();
        assert!(!forms.widget(a).unwrap().is_under());
    }

    #[test]
    fn test_touching_boxes_do_not_intersect() {
        let (mut forms, form) = forms();
        let a = boxed(&mut forms, form, 0, 0, 10, 10);
        let b = boxed(&mut forms, form, 10, 0, 10, 10);
        assert!(!forms.objects_intersect(a, b));
        let canvas = forms.create_widget(WidgetClass::Canvas, None, 12, 0, 10, 10, "");
        assert!(forms.objects_intersect(b, canvas));
    }

    #[test]
    fn test_groups() {
        let (mut forms, form) = forms();
        let before = boxed(&mut forms, form, 0, 0, 10, 10);
        let begin = forms.begin_group(form).unwrap();
        assert!(matches!(forms.begin_group(form), Err(FormsError::NestedGroup)));
        let m1 = boxed(&mut forms, form, 20, 0, 10, 10);
        let m2 = boxed(&mut forms, form, 40, 0, 10, 10);
        let end = forms.end_group(form).unwrap();
        let after = boxed(&mut forms, form, 60, 0, 10, 10);

        assert_eq!(forms.group_members(begin).unwrap(), vec![m1, m2]);
        assert_eq!(forms.widget(before).unwrap().group_id(), 0);
        assert_eq!(forms.widget(after).unwrap().group_id(), 0);
        assert_ne!(forms.widget(m1).unwrap().group_id(), 0);
        assert!(matches!(forms.end_group(form), Err(FormsError::NoOpenGroup)));
        assert!(matches!(forms.delete(end), Err(FormsError::GroupNotEmpty)));

        // Reopened groups grow at their end, not at the end of the form.
        forms.add_to_group(begin).unwrap();
        let m3 = boxed(&mut forms, form, 80, 0, 10, 10);
        assert_eq!(forms.end_group(form).unwrap(), end);
        assert_eq!(forms.group_members(begin).unwrap(), vec![m1, m2, m3]);
        assert_eq!(forms.form(form).unwrap().last(), Some(after));
    }

    #[test]
    fn test_deleting_begin_marker_deletes_group() {
        let (mut forms, form) = forms();
        let begin = forms.begin_group(form).unwrap();
        let m = boxed(&mut forms, form, 20, 0, 10, 10);
        forms.end_group(form).unwrap();
        forms.delete(begin).unwrap();
        assert!(forms.form(form).unwrap().is_empty());
        assert_eq!(forms.widget(m).unwrap().form(), None);
        assert_eq!(forms.form(form).unwrap().frozen_depth(), 0);
    }

    #[test]
    fn test_markers_cannot_be_attached() {
        let (mut forms, form) = forms();
        let begin = forms.begin_group(form).unwrap();
        forms.end_group(form).unwrap();
        let other = forms.create_form(10, 10, "other");
        assert!(matches!(forms.attach(other, begin), Err(FormsError::AlreadyAttached)));
        let marker = forms.create_widget(WidgetClass::EndGroup, None, 0, 0, 0, 0, "");
        assert!(matches!(forms.attach(other, marker), Err(FormsError::GroupMarker)));
    }

    #[test]
    fn test_children_follow_parent() {
        let (mut forms, form) = forms();
        let parent = forms.create_widget(WidgetClass::Box, None, 0, 0, 50, 50, "");
        let c1 = forms.create_widget(WidgetClass::Box, None, 0, 0, 10, 10, "");
        forms.attach_child(parent, c1).unwrap();
        let other = boxed(&mut forms, form, 100, 100, 10, 10);
        forms.attach(form, parent).unwrap();
        assert_eq!(forms.form(form).unwrap().widgets(), &[other, parent, c1]);

        let c2 = forms.create_widget(WidgetClass::Box, None, 10, 0, 10, 10, "");
        forms.attach_child(parent, c2).unwrap();
        assert_eq!(forms.form(form).unwrap().widgets(), &[other, parent, c1, c2]);
        // Children don't make their parent "under".
        assert!(!forms.widget(parent).unwrap().is_under());

        assert!(matches!(forms.attach_child(c1, parent), Err(FormsError::AlreadyAttached)));
        let lone = forms.create_widget(WidgetClass::Box, None, 0, 0, 1, 1, "");
        assert!(matches!(forms.attach_child(lone, lone), Err(FormsError::CircularParent)));

        forms.free(parent).unwrap();
        assert!(!forms.contains_widget(c1));
        assert!(!forms.contains_widget(c2));
        assert_eq!(forms.form(form).unwrap().widgets(), &[other]);
    }

    #[test]
    fn test_insert_before_takes_group() {
        let (mut forms, form) = forms();
        forms.begin_group(form).unwrap();
        let m = boxed(&mut forms, form, 0, 0, 10, 10);
        forms.end_group(form).unwrap();
        let x = forms.create_widget(WidgetClass::Box, None, 50, 50, 10, 10, "");
        forms.insert_before(x, m).unwrap();
        let f = forms.form(form).unwrap();
        assert_eq!(f.next_of(x), Some(m));
        assert_eq!(forms.widget(x).unwrap().group_id(), forms.widget(m).unwrap().group_id());
    }
}
