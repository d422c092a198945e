//! Widget records, the handler contract and the widget set.
//!
//! A widget is a [`Widget`] record stored in the [`Forms`](crate::Forms)
//! arena plus a boxed [`WidgetHandler`] implementing its class behaviour.
//! The record holds what the engine needs to know (geometry, looks, state
//! flags, list and tree links); the handler holds everything class
//! specific, e.g. a slider's bounds and value.
//!
//! # Handler contract
//!
//! Every event tag, input and pseudo-event alike, goes through
//! [`WidgetHandler::handle`]. The handler answers with
//! [`ReturnFlags`](forma_core::ReturnFlags) which the engine filters with
//! the widget's return policy before queuing the widget for the
//! application.
//!
//! ```ignore
//! struct Blink { on: bool }
//!
//! impl WidgetHandler for Blink {
//!     fn handle(&mut self, ctx: &mut HandlerContext<'_>, event: &Event) -> ReturnFlags {
//!         match event.kind {
//!             EventKind::Draw => { ctx.draw_box(); ReturnFlags::NONE }
//!             EventKind::Push => { self.on = !self.on; ctx.request_redraw(); ReturnFlags::CHANGED }
//!             _ => ReturnFlags::NONE,
//!         }
//!     }
//! }
//! ```

mod context;
mod factory;
mod record;
mod traits;
pub mod widgets;

pub use context::HandlerContext;
pub use record::{Gravity, HrOffsets, ResizePolicy, Widget, WidgetClass};
pub use traits::{Callback, HookResult, PostHandler, PreHandler, WidgetHandler};

slotmap::new_key_type! {
    /// Handle of a widget in the [`Forms`](crate::Forms) arena.
    pub struct WidgetId;
}

static_assertions::assert_impl_all!(WidgetId: Send, Sync, Copy);
