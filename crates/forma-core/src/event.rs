//! Event tags delivered to widget handlers.

use std::time::Instant;

use crate::flags::Modifiers;
use crate::timer::TimerId;

/// The kind of event a handler is asked to process.
///
/// Input kinds originate from the windowing layer; the rest are
/// pseudo-events injected by the toolkit itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Draw the widget body.
    Draw,
    /// Draw the widget label.
    DrawLabel,
    /// An attribute changed.
    Attrib,
    /// The widget was resized.
    Resized,
    /// The widget's origin moved.
    MoveOrigin,
    /// The mouse entered the widget.
    Enter,
    /// The mouse left the widget.
    Leave,
    /// A mouse button was pressed over the widget.
    Push,
    /// A mouse button was released after a push on the widget.
    Release,
    /// The mouse moved while a button is held.
    Motion,
    /// Periodic update for a pushed widget that asked for it.
    Update,
    /// A key was pressed while the widget has focus.
    KeyPress,
    /// One of the widget's shortcut keys was pressed.
    Shortcut,
    /// The widget received keyboard focus.
    Focus,
    /// The widget lost keyboard focus.
    Unfocus,
    /// Periodic step for automatic widgets.
    Step,
    /// The widget is being destroyed and must release its resources.
    Free,
    /// A synthesized double click.
    DblClick,
    /// A synthesized triple click.
    TrplClick,
    /// A timer owned by the widget expired.
    Timeout(TimerId),
}

impl EventKind {
    /// Events that may be sent to a widget not attached to any form.
    pub fn allowed_detached(self) -> bool {
        matches!(
            self,
            EventKind::Free | EventKind::Attrib | EventKind::Resized | EventKind::MoveOrigin
        )
    }

    pub fn is_multi_click(self) -> bool {
        matches!(self, EventKind::DblClick | EventKind::TrplClick)
    }
}

/// A normalized event handed to a widget handler.
///
/// `x`/`y` are form coordinates of the pointer. For button events `key`
/// holds the mouse button number, for key events the key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub x: i32,
    pub y: i32,
    pub key: i32,
    pub modifiers: Modifiers,
    /// When the event happened. Used for multi-click detection.
    pub time: Option<Instant>,
}

impl Event {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            x: 0,
            y: 0,
            key: 0,
            modifiers: Modifiers::empty(),
            time: None,
        }
    }

    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn with_key(mut self, key: i32) -> Self {
        self.key = key;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_time(mut self, time: Instant) -> Self {
        self.time = Some(time);
        self
    }

    /// The same event with a different kind.
    pub fn retagged(mut self, kind: EventKind) -> Self {
        self.kind = kind;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let ev = Event::new(EventKind::Push).at(10, 20).with_key(1);
        assert_eq!(ev.kind, EventKind::Push);
        assert_eq!((ev.x, ev.y, ev.key), (10, 20, 1));
        assert_eq!(ev.retagged(EventKind::Release).kind, EventKind::Release);
    }

    #[test]
    fn test_detached_events() {
        assert!(EventKind::Free.allowed_detached());
        assert!(!EventKind::Push.allowed_detached());
        assert!(EventKind::DblClick.is_multi_click());
    }
}
