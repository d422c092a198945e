//! Free widgets, drawn and driven by an application closure.
//!
//! The engine clips a free widget's drawing to its box.

use forma_core::{Event, Result, ReturnFlags};

use crate::form::{FormId, Forms};
use crate::widget::{HandlerContext, WidgetClass, WidgetHandler, WidgetId};

/// The application's handler for a free widget.
pub type FreeFn = Box<dyn FnMut(&mut HandlerContext<'_>, &Event) -> ReturnFlags>;

/// Which engine services a free widget gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FreeKind {
    #[default]
    Normal,
    /// Never receives input.
    Inactive,
    /// Takes the keyboard focus.
    Input,
    /// Receives STEP events.
    Continuous,
    /// Both `Input` and `Continuous`.
    All,
}

pub struct FreeHandler {
    kind: FreeKind,
    handle: FreeFn,
}

impl FreeHandler {
    pub fn kind(&self) -> FreeKind {
        self.kind
    }
}

impl WidgetHandler for FreeHandler {
    fn handle(&mut self, ctx: &mut HandlerContext<'_>, event: &Event) -> ReturnFlags {
        (self.handle)(ctx, event)
    }
}

impl Forms {
    /// Create a detached free widget.
    pub fn create_free(
        &mut self,
        kind: FreeKind,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        label: &str,
        handle: impl FnMut(&mut HandlerContext<'_>, &Event) -> ReturnFlags + 'static,
    ) -> WidgetId {
        let handler = FreeHandler {
            kind,
            handle: Box::new(handle),
        };
        let id = self.create_widget(WidgetClass::Free, Some(Box::new(handler)), x, y, w, h, label);
        let widget = &mut self.widgets[id];
        widget.active = kind != FreeKind::Inactive;
        widget.input = matches!(kind, FreeKind::Input | FreeKind::All);
        widget.automatic = matches!(kind, FreeKind::Continuous | FreeKind::All);
        widget.wants_special_keys = widget.input;
        id
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_free(
        &mut self,
        form: FormId,
        kind: FreeKind,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        label: &str,
        handle: impl FnMut(&mut HandlerContext<'_>, &Event) -> ReturnFlags + 'static,
    ) -> Result<WidgetId> {
        self.form_ref(form)?;
        let id = self.create_free(kind, x, y, w, h, label, handle);
        self.place(Some(form), id)
    }
}
