//! Position, size and scaling of widgets and forms.
//!
//! Integer geometry is always derived from a widget's [`HrOffsets`], so
//! scaling a form up and back down restores every widget exactly.

use forma_core::logging::targets;
use forma_core::{Event, EventKind, Rect, Result, Size, crnd};

use super::{FormId, Forms};
use crate::widget::{HrOffsets, Widget, WidgetClass, WidgetId};

/// Margin between a box and a label placed outside it.
const OUTSIDE_LABEL_MARGIN: Size = Size::new(3, 3);

fn area_from(hr: &HrOffsets) -> Rect {
    let x = crnd(hr.fl1);
    let y = crnd(hr.ft1);
    Rect::new(x, y, crnd(hr.fl2) - x, crnd(hr.ft2) - y)
}

/// New start and end of a widget along one axis after the form's extent
/// changed from `old` to `new`. `dist_r` is the end's distance from the
/// form's far side.
fn scale_axis(
    (l, r): (f64, f64),
    dist_r: f64,
    glue_start: bool,
    glue_end: bool,
    resizes: bool,
    old: f64,
    new: f64,
) -> (f64, f64) {
    let factor = new / old;
    let size = r - l;
    let new_size = if resizes { size * factor } else { size };
    if glue_start && glue_end {
        (l, new - dist_r)
    } else if glue_start {
        (l, l + new_size)
    } else if glue_end {
        let right = new - dist_r;
        (right - new_size, right)
    } else {
        // Keep the center where it proportionally belongs.
        let center = (l + size / 2.0) * factor;
        (center - new_size / 2.0, center + new_size / 2.0)
    }
}

impl Forms {
    /// The area a widget covers on screen: its box, a frame's border, an
    /// outside label and its children.
    pub fn bbox(&self, id: WidgetId) -> Rect {
        let Some(w) = self.widgets.get(id) else {
            return Rect::ZERO;
        };
        let mut bbox = match w.class {
            WidgetClass::Frame | WidgetClass::LabelFrame => w.area.inflate(w.bw.abs()),
            WidgetClass::Custom(_) => w.area.inflate(w.bw.abs() + w.lsize),
            _ => w.area,
        };
        if let Some(label) = self.outside_label_rect(w) {
            bbox = bbox.union(&label);
        }
        for child in &w.children {
            if self.widgets.get(*child).is_some_and(|c| c.visible) {
                bbox = bbox.union(&self.bbox(*child));
            }
        }
        bbox
    }

    fn outside_label_rect(&self, w: &Widget) -> Option<Rect> {
        if w.label.is_empty() || w.label_inside() {
            return None;
        }
        let size = self.surface.text_extent(&w.label, w.label_font());
        let at = w.align.place(w.area, size, OUTSIDE_LABEL_MARGIN);
        Some(Rect::new(at.x - 1, at.y, size.width + 1, size.height))
    }

    /// Move a widget (and its children) so its box starts at (`x`, `y`).
    pub fn set_position(&mut self, id: WidgetId, x: i32, y: i32) -> Result<()> {
        let w = self.widget_ref(id)?;
        let (dx, dy) = (x - w.area.x(), y - w.area.y());
        if dx == 0 && dy == 0 {
            return Ok(());
        }
        let shown = w.visible && w.form.is_some();
        let form = w.form;
        if shown {
            self.hide(id)?;
        }

        for t in self.subtree(id) {
            let w = &mut self.widgets[t];
            w.area = w.area.offset(dx, dy);
            if w.form.is_some() {
                let (fx, fy) = (f64::from(dx), f64::from(dy));
                w.hr.fl1 += fx;
                w.hr.fl2 += fx;
                w.hr.fr1 -= fx;
                w.hr.fr2 -= fx;
                w.hr.ft1 += fy;
                w.hr.ft2 += fy;
                w.hr.fb1 -= fy;
                w.hr.fb2 -= fy;
            }
        }
        if let Some(form) = form {
            self.recalc_intersections(form);
        }
        tracing::trace!(target: targets::OBJECT, ?id, x, y, "moved");
        self.handle_object(id, &Event::new(EventKind::MoveOrigin), true);

        if shown {
            self.show(id)?;
        }
        Ok(())
    }

    /// Change a widget's size. Its gravity decides which edges stay put.
    pub fn set_size(&mut self, id: WidgetId, width: i32, height: i32) -> Result<()> {
        let w = self.widget_ref(id)?;
        if w.area.width() == width && w.area.height() == height {
            return Ok(());
        }
        let shown = w.visible && w.form.is_some();
        let form = w.form;
        if shown {
            self.hide(id)?;
        }

        let w = &mut self.widgets[id];
        match form {
            None => {
                w.area = Rect::new(w.area.x(), w.area.y(), width, height);
            }
            Some(form) => {
                let (fw, fh) = (self.forms[form].w_hr, self.forms[form].h_hr);
                let (nw, se) = (w.nwgravity, w.segravity);
                let hr = &mut w.hr;
                if se.pins_right() && !nw.pins_left() {
                    hr.fl1 = hr.fl2 - f64::from(width);
                } else {
                    hr.fl2 = hr.fl1 + f64::from(width);
                }
                if se.pins_bottom() && !nw.pins_top() {
                    hr.ft1 = hr.ft2 - f64::from(height);
                } else {
                    hr.ft2 = hr.ft1 + f64::from(height);
                }
                hr.fr1 = fw - hr.fl1;
                hr.fr2 = fw - hr.fl2;
                hr.fb1 = fh - hr.ft1;
                hr.fb2 = fh - hr.ft2;
                w.area = area_from(hr);
                self.recalc_intersections(form);
            }
        }
        tracing::trace!(target: targets::OBJECT, ?id, width, height, "resized");
        self.handle_object(id, &Event::new(EventKind::Resized), true);

        if shown {
            self.show(id)?;
        }
        Ok(())
    }

    /// Size first, then position.
    pub fn set_geometry(&mut self, id: WidgetId, area: Rect) -> Result<()> {
        self.set_size(id, area.width(), area.height())?;
        self.set_position(id, area.x(), area.y())
    }

    /// Shift a widget, or every member of the group it begins, by
    /// (`dx`, `dy`).
    pub fn move_by(&mut self, id: WidgetId, dx: i32, dy: i32) -> Result<()> {
        let w = self.widget_ref(id)?;
        let group_form = (w.class == WidgetClass::BeginGroup).then_some(w.form).flatten();
        if let Some(form) = group_form {
            self.freeze(form)?;
        }
        let targets: Vec<WidgetId> = self
            .cascade_targets(id)
            .into_iter()
            .filter(|t| self.widgets[*t].parent.is_none())
            .collect();
        for t in targets {
            let a = self.widgets[t].area;
            self.set_position(t, a.x() + dx, a.y() + dy)?;
        }
        if let Some(form) = group_form {
            self.unfreeze(form)?;
        }
        Ok(())
    }

    /// Scale one widget (and its children) by `sx` x `sy`.
    ///
    /// Attached widgets scale their high-precision offsets, detached ones
    /// their box.
    pub fn scale_widget(&mut self, id: WidgetId, sx: f64, sy: f64) -> Result<()> {
        self.widget_ref(id)?;
        for t in self.subtree(id) {
            let w = &mut self.widgets[t];
            if w.form.is_some() {
                let hr = &mut w.hr;
                hr.fl1 *= sx;
                hr.fr1 *= sx;
                hr.fl2 *= sx;
                hr.fr2 *= sx;
                hr.ft1 *= sy;
                hr.fb1 *= sy;
                hr.ft2 *= sy;
                hr.fb2 *= sy;
                w.area = area_from(hr);
            } else {
                let a = w.area;
                let scaled = |v: i32, s: f64| crnd(f64::from(v) * s);
                w.area = Rect::new(
                    scaled(a.x(), sx),
                    scaled(a.y(), sy),
                    scaled(a.width(), sx),
                    scaled(a.height(), sy),
                );
            }
            self.handle_object(t, &Event::new(EventKind::Resized), true);
        }
        if let Some(form) = self.form_of(id) {
            self.recalc_intersections(form);
            self.mark_for_redraw(id);
        }
        Ok(())
    }

    /// Scale a form and lay its widgets out again following their resize
    /// policies and gravities.
    pub fn scale_form(&mut self, form: FormId, sx: f64, sy: f64) -> Result<()> {
        let f = self.form_entry(form)?;
        let (old_w, old_h) = (f.w_hr, f.h_hr);
        let (new_w, new_h) = (old_w * sx, old_h * sy);
        f.w_hr = new_w;
        f.h_hr = new_h;
        f.area = Rect::new(f.area.x(), f.area.y(), crnd(new_w), crnd(new_h));
        let viewport = Rect::new(0, 0, f.area.width(), f.area.height());
        f.damage.set_viewport(viewport);
        let list = f.widgets.clone();

        for id in &list {
            let w = &mut self.widgets[*id];
            if w.class.is_group_marker() {
                continue;
            }
            let (nw, se, resize) = (w.nwgravity, w.segravity, w.resize);
            let hr = &mut w.hr;
            let (l, r) = scale_axis(
                (hr.fl1, hr.fl2),
                hr.fr2,
                nw.pins_left() || se.pins_left(),
                nw.pins_right() || se.pins_right(),
                resize.resizes_x(),
                old_w,
                new_w,
            );
            let (t, b) = scale_axis(
                (hr.ft1, hr.ft2),
                hr.fb2,
                nw.pins_top() || se.pins_top(),
                nw.pins_bottom() || se.pins_bottom(),
                resize.resizes_y(),
                old_h,
                new_h,
            );
            *hr = HrOffsets {
                fl1: l,
                fr1: new_w - l,
                ft1: t,
                fb1: new_h - t,
                fl2: r,
                fr2: new_w - r,
                ft2: b,
                fb2: new_h - b,
            };
            w.area = area_from(hr);
        }
        for id in &list {
            if !self.widgets[*id].class.is_group_marker() {
                self.handle_object(*id, &Event::new(EventKind::Resized), true);
            }
        }
        self.recalc_intersections(form);
        tracing::debug!(target: targets::FORM, ?form, sx, sy, "form scaled");
        self.redraw_form(form);
        Ok(())
    }

    /// Resize a form to `width` x `height`.
    pub fn set_form_size(&mut self, form: FormId, width: i32, height: i32) -> Result<()> {
        let f = self.form_ref(form)?;
        let (w, h) = (f.w_hr, f.h_hr);
        if w <= 0.0 || h <= 0.0 {
            return Ok(());
        }
        self.scale_form(form, f64::from(width) / w, f64::from(height) / h)
    }

    /// Place a form on the screen. Tooltips are positioned relative to it.
    pub fn set_form_position(&mut self, form: FormId, x: i32, y: i32) -> Result<()> {
        let f = self.form_entry(form)?;
        f.area = Rect::new(x, y, f.area.width(), f.area.height());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use forma_core::{Align, FormsConfig};
    use forma_render::RecordingSurface;

    use super::*;
    use crate::widget::{Gravity, ResizePolicy};

    fn setup() -> (Forms, FormId) {
        let mut forms = Forms::with_config(RecordingSurface::new(), FormsConfig::default());
        let form = forms.create_form(100, 100, "");
        (forms, form)
    }

    #[test]
    fn test_scaling_round_trips_without_drift() {
        let (mut forms, form) = setup();
        let a = forms.add_widget(form, WidgetClass::Box, None, 13, 7, 31, 17, "").unwrap();
        for _ in 0..5 {
            forms.scale_form(form, 1.37, 0.71).unwrap();
            forms.scale_form(form, 1.0 / 1.37, 1.0 / 0.71).unwrap();
        }
        assert_eq!(forms.widget(a).unwrap().geometry(), Rect::new(13, 7, 31, 17));
    }

    #[test]
    fn test_gravity_keeps_glued_edges() {
        let (mut forms, form) = setup();
        let a = forms.add_widget(form, WidgetClass::Box, None, 80, 10, 10, 10, "").unwrap();
        forms.set_gravity(a, Gravity::NorthEast, Gravity::NorthEast).unwrap();
        forms.set_resize_policy(a, ResizePolicy::None).unwrap();
        forms.set_form_size(form, 200, 100).unwrap();
        assert_eq!(forms.widget(a).unwrap().geometry(), Rect::new(180, 10, 10, 10));
    }

    #[test]
    fn test_set_size_honours_gravity() {
        let (mut forms, form) = setup();
        let a = forms.add_widget(form, WidgetClass::Box, None, 50, 50, 20, 20, "").unwrap();
        forms.set_gravity(a, Gravity::NoGravity, Gravity::SouthEast).unwrap();
        forms.set_size(a, 10, 10).unwrap();
        assert_eq!(forms.widget(a).unwrap().geometry(), Rect::new(60, 60, 10, 10));

        let b = forms.add_widget(form, WidgetClass::Box, None, 50, 50, 20, 20, "").unwrap();
        forms.set_size(b, 10, 10).unwrap();
        assert_eq!(forms.widget(b).unwrap().geometry(), Rect::new(50, 50, 10, 10));
    }

    #[test]
    fn test_position_moves_children_and_offsets() {
        let (mut forms, form) = setup();
        let parent = forms.add_widget(form, WidgetClass::Box, None, 10, 10, 40, 40, "").unwrap();
        let child = forms.create_widget(WidgetClass::Box, None, 15, 15, 5, 5, "");
        forms.attach_child(parent, child).unwrap();
        forms.set_position(parent, 20, 30).unwrap();
        assert_eq!(forms.widget(child).unwrap().geometry(), Rect::new(25, 35, 5, 5));
        let hr = forms.widget(parent).unwrap().hr_offsets();
        assert_eq!((hr.fl1, hr.fr2), (20.0, 40.0));
        assert_eq!((hr.ft1, hr.fb2), (30.0, 30.0));
    }

    #[test]
    fn test_detached_scaling_rounds() {
        let (mut forms, _) = setup();
        let a = forms.create_widget(WidgetClass::Box, None, 10, 10, 15, 15, "");
        forms.scale_widget(a, 1.5, 0.5).unwrap();
        assert_eq!(forms.widget(a).unwrap().geometry(), Rect::new(15, 5, 23, 8));
    }

    #[test]
    fn test_bbox_includes_outside_label_and_frame() {
        let (mut forms, form) = setup();
        let frame = forms.add_widget(form, WidgetClass::Frame, None, 10, 10, 20, 20, "").unwrap();
        forms.set_border_width(frame, 3).unwrap();
        assert_eq!(forms.bbox(frame), Rect::new(7, 7, 26, 26));

        let a = forms.add_widget(form, WidgetClass::Box, None, 50, 50, 20, 20, "ab").unwrap();
        forms.set_label_align(a, Align::BOTTOM).unwrap();
        let bbox = forms.bbox(a);
        assert_eq!(bbox.y(), 50);
        assert!(bbox.bottom() > 70);
    }
}
