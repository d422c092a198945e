//! Logging facilities for forma.
//!
//! forma uses the `tracing` crate for instrumentation. Nothing is printed
//! unless the application installs a subscriber:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("forma::dispatch=trace,forma::redraw=debug")
//!     .init();
//! ```
//!
//! Misuse of the API (operating on a detached widget, unbalanced unfreeze,
//! nested groups, ...) is reported at `error` level under the target of the
//! subsystem that detected it. Values that were silently corrected (an
//! unknown alignment, an out of range border width) are reported at `warn`.

/// Span names used throughout forma for tracing.
pub mod span_names {
    /// A partial redraw pass over a form.
    pub const REDRAW_PASS: &str = "forma::redraw_pass";
    /// A full form redraw.
    pub const FULL_REDRAW: &str = "forma::full_redraw";
    /// Timer processing.
    pub const TIMER: &str = "forma::timer";
    /// Dispatch of one normalized input event.
    pub const INPUT: &str = "forma::input";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core framework target.
    pub const CORE: &str = "forma_core";
    /// Widget records and the factory.
    pub const OBJECT: &str = "forma::object";
    /// Form container and topology.
    pub const FORM: &str = "forma::form";
    /// Event dispatch and focus.
    pub const DISPATCH: &str = "forma::dispatch";
    /// Redraw passes.
    pub const REDRAW: &str = "forma::redraw";
    /// Clip changes pushed to the surface.
    pub const CLIP: &str = "forma::clip";
    /// Timer service.
    pub const TIMER: &str = "forma::timer";
    /// Configuration loading.
    pub const CONFIG: &str = "forma::config";
    /// Alignment geometry.
    pub const ALIGN: &str = "forma::align";
    /// Cursor cache.
    pub const CURSOR: &str = "forma::cursor";
    /// Tooltips.
    pub const TOOLTIP: &str = "forma::tooltip";
    /// Application-window callbacks.
    pub const APPWIN: &str = "forma::appwin";
    /// Shortcut parsing.
    pub const SHORTCUT: &str = "forma::shortcut";
}
