//! Widget creation.

use forma_core::logging::targets;
use forma_core::{Rect, Result};

use super::record::{Widget, WidgetClass};
use super::traits::WidgetHandler;
use super::WidgetId;
use crate::form::{FormId, Forms};

impl Forms {
    /// Create a detached widget.
    ///
    /// Coordinates are in the configured [`CoordUnit`](forma_core::CoordUnit)
    /// and converted to pixels here, once. The border width comes from the
    /// configuration. The handler is fixed for the life of the widget.
    #[allow(clippy::too_many_arguments)]
    pub fn create_widget(
        &mut self,
        class: WidgetClass,
        handler: Option<Box<dyn WidgetHandler>>,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        label: &str,
    ) -> WidgetId {
        let unit = self.config.coord_unit;
        let dpi = self.config.dpi;
        let area = Rect::new(
            unit.to_pixels(x, dpi),
            unit.to_pixels(y, dpi),
            unit.to_pixels(w, dpi),
            unit.to_pixels(h, dpi),
        );

        let mut widget = Widget::new(class, area, label, self.config.effective_border_width());
        widget.handler = handler;
        let id = self.widgets.insert(widget);
        tracing::trace!(target: targets::OBJECT, ?id, class = class.name(), ?area, "widget created");
        id
    }

    /// Create a widget and attach it to `form`.
    #[allow(clippy::too_many_arguments)]
    pub fn add_widget(
        &mut self,
        form: FormId,
        class: WidgetClass,
        handler: Option<Box<dyn WidgetHandler>>,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        label: &str,
    ) -> Result<WidgetId> {
        self.form_ref(form)?;
        let id = self.create_widget(class, handler, x, y, w, h, label);
        self.attach(form, id)?;
        Ok(id)
    }

    /// Attach a freshly created widget to `form` or, with `None`, leave it
    /// detached. Used by the widget set's `add_*` constructors.
    pub(crate) fn place(&mut self, form: Option<FormId>, id: WidgetId) -> Result<WidgetId> {
        if let Some(form) = form {
            self.attach(form, id)?;
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use forma_core::{CoordUnit, FormsConfig};
    use forma_render::RecordingSurface;

    use super::*;

    #[test]
    fn test_created_widget_is_detached() {
        let mut forms = Forms::with_config(RecordingSurface::new(), FormsConfig::default());
        let id = forms.create_widget(WidgetClass::Box, None, 1, 2, 3, 4, "b");
        let w = forms.widget(id).unwrap();
        assert_eq!(w.form(), None);
        assert_eq!(w.geometry(), Rect::new(1, 2, 3, 4));
        assert_eq!(w.border_width(), 1);
        assert!(w.shortcuts().is_empty());
        assert!(!w.has_handler());
    }

    #[test]
    fn test_units_are_scaled() {
        let config = FormsConfig {
            coord_unit: CoordUnit::Point,
            dpi: 144.0,
            border_width: 30,
            ..FormsConfig::default()
        };
        let mut forms = Forms::with_config(RecordingSurface::new(), config);
        let id = forms.create_widget(WidgetClass::Box, None, 10, 10, 50, 5, "");
        let w = forms.widget(id).unwrap();
        assert_eq!(w.geometry(), Rect::new(20, 20, 100, 10));
        assert_eq!(w.border_width(), 10);
    }
}
