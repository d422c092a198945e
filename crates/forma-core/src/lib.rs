//! Core systems for forma.
//!
//! This crate holds the drawing-free foundations of the forma toolkit:
//!
//! - **Geometry**: integer points, sizes and rectangles in form coordinates
//! - **Alignment**: inside/outside label placement relative to a box
//! - **Return flags**: what a widget handler reports, and return policies
//! - **Events**: the tags delivered through the widget handler contract
//! - **Keys**: mouse buttons, key codes and shortcut strings
//! - **Configuration**: policy values with a process-wide default
//! - **Timers**: a cooperative, explicitly clocked timer service
//!
//! # Alignment Example
//!
//! ```
//! use forma_core::{Align, Point, Rect, Size};
//!
//! let slider = Rect::new(10, 10, 200, 20);
//! // A 30x12 label placed just left of the slider, vertically centered.
//! let at = Align::LEFT.place(slider, Size::new(30, 12), Size::ZERO);
//! assert_eq!(at, Point::new(-20, 14));
//! ```
//!
//! # Return Policy Example
//!
//! ```
//! use forma_core::ReturnFlags;
//!
//! let policy = ReturnFlags::END_CHANGED;
//! assert!(ReturnFlags::END.filter(policy).is_none());
//! assert!((ReturnFlags::END | ReturnFlags::CHANGED).filter(policy).is_end());
//! ```

pub mod align;
pub mod config;
mod error;
pub mod event;
pub mod flags;
pub mod geometry;
pub mod keys;
pub mod logging;
mod timer;
pub mod units;

pub use align::{Align, HAlign, Placement, VAlign, ALIGN_INSIDE};
pub use config::{FormsConfig, MAX_BORDER_WIDTH, clamp_border_width, global_config, set_global_config};
pub use error::{ConfigError, FormsError, Result, TimerError};
pub use event::{Event, EventKind};
pub use flags::{Modifiers, ReturnFlags};
pub use geometry::{Point, Rect, Size};
pub use timer::{TimerId, TimerKind, TimerManager};
pub use units::{CoordUnit, crnd};
