//! Property tests for form topology, overlap tracking and slider values.

use std::collections::HashSet;

use forma::{
    BoxKind, FormId, Forms, FormsConfig, FormsError, Orientation, RecordingSurface, SliderStyle, WidgetId,
};
use proptest::prelude::*;

fn empty_form() -> (Forms, FormId) {
    let mut forms = Forms::with_config(RecordingSurface::new(), FormsConfig::default());
    let form = forms.create_form(400, 400, "props");
    (forms, form)
}

fn rect() -> impl Strategy<Value = (i32, i32, i32, i32)> {
    (0..120i32, 0..120i32, 1..40i32, 1..40i32)
}

/// The form's list and every widget's view of it agree.
fn assert_consistent(forms: &Forms, form: FormId, pool: &[WidgetId]) -> Result<(), TestCaseError> {
    let f = forms.form(form).unwrap();
    let list = f.widgets();
    let unique: HashSet<_> = list.iter().collect();
    prop_assert_eq!(unique.len(), list.len());
    prop_assert_eq!(f.first(), list.first().copied());
    prop_assert_eq!(f.last(), list.last().copied());
    for (i, id) in list.iter().enumerate() {
        prop_assert_eq!(f.prev_of(*id), i.checked_sub(1).map(|p| list[p]));
        prop_assert_eq!(f.next_of(*id), list.get(i + 1).copied());
    }
    for id in pool {
        let attached = forms.widget(*id).unwrap().form() == Some(form);
        prop_assert_eq!(attached, list.contains(id));
    }
    Ok(())
}

proptest! {
    #[test]
    fn list_stays_consistent(ops in prop::collection::vec((0..6usize, any::<bool>()), 1..40)) {
        let (mut forms, form) = empty_form();
        let pool: Vec<WidgetId> = (0..6)
            .map(|i| forms.create_box(BoxKind::Flat, i * 10, 0, 8, 8, ""))
            .collect();

        for (i, attach) in ops {
            let id = pool[i];
            let was_attached = forms.widget(id).unwrap().form().is_some();
            let before = forms.form(form).unwrap().len();
            if attach {
                let result = forms.attach(form, id);
                if was_attached {
                    prop_assert!(matches!(result, Err(FormsError::AlreadyAttached)));
                    prop_assert_eq!(forms.form(form).unwrap().len(), before);
                } else {
                    prop_assert!(result.is_ok());
                    prop_assert_eq!(forms.form(form).unwrap().last(), Some(id));
                }
            } else {
                let result = forms.delete(id);
                if was_attached {
                    prop_assert!(result.is_ok());
                    prop_assert_eq!(forms.form(form).unwrap().len(), before - 1);
                } else {
                    prop_assert!(matches!(result, Err(FormsError::NotAttached)));
                }
            }
            assert_consistent(&forms, form, &pool)?;
        }
    }

    #[test]
    fn under_only_when_a_later_widget_overlaps(
        rects in prop::collection::vec(rect(), 1..12),
        remove in any::<prop::sample::Index>(),
    ) {
        let (mut forms, form) = empty_form();
        let mut ids = Vec::new();
        for (x, y, w, h) in rects {
            ids.push(forms.add_box(form, BoxKind::Up, x, y, w, h, "").unwrap());
        }

        let check = |forms: &Forms, ids: &[WidgetId]| -> Result<(), TestCaseError> {
            for (i, a) in ids.iter().enumerate() {
                let overlapped = ids[i + 1..].iter().any(|b| forms.objects_intersect(*a, *b));
                prop_assert_eq!(forms.widget(*a).unwrap().is_under(), overlapped);
            }
            Ok(())
        };
        check(&forms, &ids)?;

        let gone = ids.remove(remove.index(ids.len()));
        forms.delete(gone).unwrap();
        prop_assert!(!forms.widget(gone).unwrap().is_under());
        check(&forms, &ids)?;
    }

    #[test]
    fn slider_value_is_clamped_to_bounds(
        a in -1000.0..1000.0f64,
        b in -1000.0..1000.0f64,
        v in -2000.0..2000.0f64,
    ) {
        let (mut forms, form) = empty_form();
        let s = forms
            .add_slider(form, SliderStyle::Normal, Orientation::Vertical, 10, 10, 20, 200, "")
            .unwrap();
        forms.set_slider_bounds(s, a, b).unwrap();
        forms.set_slider_value(s, v).unwrap();
        prop_assert_eq!(forms.slider_value(s).unwrap(), v.clamp(a.min(b), a.max(b)));
        prop_assert_eq!(forms.slider_bounds(s).unwrap(), (a, b));
    }
}
