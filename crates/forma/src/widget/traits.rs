//! The handler contract every widget class implements.
//!
//! A widget's behaviour is a single [`WidgetHandler`] fixed at creation.
//! The engine calls [`WidgetHandler::handle`] for every event tag, input
//! and pseudo-event alike, and the handler answers with [`ReturnFlags`].
//!
//! Applications can decorate any widget with a [`PreHandler`], which sees
//! events first and may swallow them, and a [`PostHandler`], which sees
//! them after the class handler ran but cannot change the result.

use std::any::Any;

use forma_core::{Event, ReturnFlags};

use super::context::HandlerContext;
use super::record::Widget;
use super::WidgetId;
use crate::form::Forms;

/// Behaviour of one widget class.
pub trait WidgetHandler: Any {
    /// Process one event.
    fn handle(&mut self, ctx: &mut HandlerContext<'_>, event: &Event) -> ReturnFlags;

    /// A child of this composite widget produced a result.
    ///
    /// The returned flags become the composite's own result; they are
    /// filtered with the composite's return policy and queued in place of
    /// the child's. The default passes the child's result through.
    fn child_returned(
        &mut self,
        _ctx: &mut HandlerContext<'_>,
        _child: WidgetId,
        flags: ReturnFlags,
    ) -> ReturnFlags {
        flags
    }

    /// The widget's return policy changed.
    ///
    /// Composites use this to give their children the policies they need
    /// to keep reporting to the parent.
    fn return_policy_changed(&mut self, _ctx: &mut HandlerContext<'_>, _policy: ReturnFlags) {}
}

impl dyn WidgetHandler {
    pub fn downcast_ref<T: WidgetHandler>(&self) -> Option<&T> {
        let any: &dyn Any = self;
        any.downcast_ref()
    }

    pub fn downcast_mut<T: WidgetHandler>(&mut self) -> Option<&mut T> {
        let any: &mut dyn Any = self;
        any.downcast_mut()
    }
}

/// Verdict of a [`PreHandler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookResult {
    /// Hand the event on to the class handler.
    Continue,
    /// The event was fully handled; nothing else runs and nothing is queued.
    Preempt,
}

/// Runs before the class handler.
pub trait PreHandler {
    fn pre_handle(&mut self, widget: &Widget, event: &Event) -> HookResult;
}

impl<F> PreHandler for F
where
    F: FnMut(&Widget, &Event) -> HookResult,
{
    fn pre_handle(&mut self, widget: &Widget, event: &Event) -> HookResult {
        self(widget, event)
    }
}

/// Runs after the class handler.
pub trait PostHandler {
    fn post_handle(&mut self, widget: &Widget, event: &Event);
}

impl<F> PostHandler for F
where
    F: FnMut(&Widget, &Event),
{
    fn post_handle(&mut self, widget: &Widget, event: &Event) {
        self(widget, event)
    }
}

/// Application callback run by [`Forms::check_forms`] for a queued widget.
pub type Callback = Box<dyn FnMut(&mut Forms, WidgetId)>;
