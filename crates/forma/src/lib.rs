//! forma - a forms toolkit.
//!
//! A form is an ordered list of widgets shown in a window. This crate owns
//! the engine that keeps forms on screen and interactive:
//!
//! - **Widget model**: an arena of [`Widget`] records with list (z-order),
//!   group and composite (parent/child) structure
//! - **Event dispatch**: hit testing, focus, push/release tracking,
//!   multi-click detection, pre/post handlers and return policies
//! - **Redraw engine**: dirty tracking, overlap propagation, per-widget
//!   double buffering, clipping and freezing
//! - **Widget set**: boxes, buttons, inputs, sliders, spinners, textboxes,
//!   clocks, canvases and free widgets
//! - **Extras**: tooltips, named and animated cursors, and callbacks for
//!   windows that aren't forms
//!
//! Drawing goes through a [`DrawSurface`]; [`RecordingSurface`] records the
//! commands instead of drawing them, which is what the tests use.
//!
//! # Example
//!
//! ```
//! use forma::{ButtonKind, Forms, InputEvent, RecordingSurface, WindowHandle};
//! use forma::keys::LEFT_MOUSE;
//!
//! let mut forms = Forms::new(RecordingSurface::new());
//! let form = forms.create_form(200, 100, "Hello");
//! let ok = forms.add_button(form, ButtonKind::Normal, 60, 40, 80, 25, "OK")?;
//! let window = WindowHandle(1);
//! forms.show_form(form, window)?;
//!
//! let now = forms.now();
//! forms.handle_input(InputEvent::press(window, LEFT_MOUSE, 100, 50, now));
//! forms.handle_input(InputEvent::release(window, LEFT_MOUSE, 100, 50, now));
//! assert_eq!(forms.check_forms(), Some(ok));
//! # Ok::<(), forma::FormsError>(())
//! ```

pub mod appwin;
pub mod cursor;
mod form;
pub mod input;
mod interaction;
pub mod tooltip;
pub mod widget;

pub use appwin::{AppCallback, AppWindows};
pub use cursor::{AnimatedCursor, CursorName};
pub use form::{FindKind, Form, FormId, Forms, RedrawStats};
pub use input::{InputEvent, InputKind};
pub use tooltip::Tooltip;
pub use widget::widgets::*;
pub use widget::{
    Callback, Gravity, HandlerContext, HookResult, HrOffsets, PostHandler, PreHandler, ResizePolicy, Widget,
    WidgetClass, WidgetHandler, WidgetId,
};

pub use forma_core::{
    Align, CoordUnit, Event, EventKind, FormsConfig, FormsError, Modifiers, Placement, Point, Rect, Result,
    ReturnFlags, Size, TimerId, keys, logging,
};
pub use forma_render::{
    BoxType, Color, DrawCommand, DrawOp, DrawSurface, Drawable, FontSpec, FontStyle, RecordingSurface, WindowHandle,
};
