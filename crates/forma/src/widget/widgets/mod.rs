//! The standard widget set.
//!
//! - [`BoxKind`] boxes, frames, text and canvases: passive drawers
//! - [`ButtonKind`] buttons, including touch buttons that repeat while held
//! - [`Input`]: single line text entry with optional number validation
//! - [`Slider`]: a value picked along a track, with or without a value box
//! - [`Spinner`]: an input with up and down buttons
//! - [`Textbox`]: a scrollable list of lines with selection modes
//! - [`Clock`]: analog or digital clock
//! - [`FreeHandler`]: a widget drawn by an application closure
//!
//! Each widget comes with `create_*` (detached) and `add_*` (attached to a
//! form) constructors on [`Forms`], and class specific accessors that fail
//! with [`FormsError::WrongClass`] when handed a widget of another class.

mod boxes;
mod button;
mod clock;
mod free;
mod input;
mod slider;
mod spinner;
mod textbox;

pub use boxes::{BoxKind, CanvasPainter, FrameKind, PassiveHandler};
pub use button::{Button, ButtonKind};
pub use clock::{Clock, ClockKind, TimeSource};
pub use free::{FreeFn, FreeHandler, FreeKind};
pub use input::{Input, InputType};
pub use slider::{Orientation, Slider, SliderStyle, ValueFilter};
pub use spinner::{Spinner, SpinnerType};
pub use textbox::{LineCallback, Textbox, TextboxKind};

use forma_core::{FormsError, Result};

use super::{WidgetHandler, WidgetId};
use crate::form::{Forms, misuse};

impl Forms {
    /// The handler of `id` as a `T`, or `WrongClass` naming `expected`.
    pub(crate) fn class_handler<T: WidgetHandler>(&self, id: WidgetId, expected: &'static str) -> Result<&T> {
        self.widget_ref(id)?;
        self.handler::<T>(id)
            .ok_or_else(|| misuse(FormsError::WrongClass { expected }))
    }

    pub(crate) fn class_handler_mut<T: WidgetHandler>(
        &mut self,
        id: WidgetId,
        expected: &'static str,
    ) -> Result<&mut T> {
        self.widget_ref(id)?;
        self.handler_mut::<T>(id)
            .ok_or_else(|| misuse(FormsError::WrongClass { expected }))
    }
}
