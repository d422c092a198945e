//! Event callbacks for windows that don't show a form.
//!
//! Applications drawing into their own windows register callbacks per
//! window and per input kind. A window's preemptive callback sees every
//! event first and can consume it.

use std::collections::HashMap;
use std::fmt;

use forma_core::logging::targets;
use forma_render::WindowHandle;

use crate::form::Forms;
use crate::input::{InputEvent, InputKind};

/// Callback for an application window. Returns `true` when it consumed
/// the event.
pub type AppCallback = Box<dyn FnMut(&InputEvent) -> bool>;

#[derive(Default)]
struct AppWindow {
    preemptive: Option<AppCallback>,
    by_kind: HashMap<InputKind, AppCallback>,
    /// Registered for every kind without a callback of its own.
    fallback: Option<AppCallback>,
}

/// The callback tables of all application windows.
#[derive(Default)]
pub struct AppWindows {
    windows: HashMap<WindowHandle, AppWindow>,
}

impl AppWindows {
    /// Register `callback` for events of `kind` in `window`, or for all kinds
    /// if `kind` is `None`. Returns the callback it replaces.
    pub fn add_event_callback(
        &mut self,
        window: WindowHandle,
        kind: Option<InputKind>,
        callback: AppCallback,
    ) -> Option<AppCallback> {
        let entry = self.windows.entry(window).or_default();
        tracing::debug!(target: targets::APPWIN, ?window, ?kind, "event callback added");
        match kind {
            Some(kind) => entry.by_kind.insert(kind, callback),
            None => entry.fallback.replace(callback),
        }
    }

    /// Remove the callback for `kind`. `None` forgets the window entirely.
    pub fn remove_event_callback(&mut self, window: WindowHandle, kind: Option<InputKind>) {
        match kind {
            None => {
                self.windows.remove(&window);
            }
            Some(kind) => {
                if let Some(entry) = self.windows.get_mut(&window) {
                    entry.by_kind.remove(&kind);
                }
            }
        }
        tracing::debug!(target: targets::APPWIN, ?window, ?kind, "event callback removed");
    }

    pub fn set_preemptive_callback(&mut self, window: WindowHandle, callback: Option<AppCallback>) {
        self.windows.entry(window).or_default().preemptive = callback;
    }

    pub fn contains(&self, window: WindowHandle) -> bool {
        self.windows.contains_key(&window)
    }

    /// Route an event to its window's callbacks. Returns whether anything
    /// consumed it.
    pub fn dispatch(&mut self, event: &InputEvent) -> bool {
        let Some(entry) = self.windows.get_mut(&event.window) else {
            tracing::trace!(target: targets::APPWIN, window = ?event.window, "event for an unknown window");
            return false;
        };
        if let Some(pre) = entry.preemptive.as_mut()
            && pre(event)
        {
            return true;
        }
        match entry.by_kind.get_mut(&event.kind) {
            Some(callback) => callback(event),
            None => entry.fallback.as_mut().is_some_and(|callback| callback(event)),
        }
    }
}

impl fmt::Debug for AppWindows {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppWindows")
            .field("windows", &self.windows.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Forms {
    pub fn app_windows(&mut self) -> &mut AppWindows {
        &mut self.app_windows
    }

    /// See [`AppWindows::add_event_callback`].
    pub fn add_event_callback(
        &mut self,
        window: WindowHandle,
        kind: Option<InputKind>,
        callback: impl FnMut(&InputEvent) -> bool + 'static,
    ) -> Option<AppCallback> {
        self.app_windows.add_event_callback(window, kind, Box::new(callback))
    }

    pub fn remove_event_callback(&mut self, window: WindowHandle, kind: Option<InputKind>) {
        self.app_windows.remove_event_callback(window, kind);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Instant;

    use super::*;

    const WIN: WindowHandle = WindowHandle(42);

    #[test]
    fn test_kind_callback_wins_over_fallback() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut table = AppWindows::default();
        let s = Rc::clone(&seen);
        table.add_event_callback(WIN, None, Box::new(move |_| {
            s.borrow_mut().push("any");
            true
        }));
        let s = Rc::clone(&seen);
        table.add_event_callback(WIN, Some(InputKind::KeyPress), Box::new(move |_| {
            s.borrow_mut().push("key");
            true
        }));

        let now = Instant::now();
        assert!(table.dispatch(&InputEvent::key(WIN, 'a' as i32, now)));
        assert!(table.dispatch(&InputEvent::motion(WIN, 1, 1, now)));
        assert_eq!(*seen.borrow(), ["key", "any"]);
    }

    #[test]
    fn test_preemptive_consumes() {
        let mut table = AppWindows::default();
        let hits = Rc::new(RefCell::new(0));
        let h = Rc::clone(&hits);
        table.add_event_callback(WIN, None, Box::new(move |_| {
            *h.borrow_mut() += 1;
            true
        }));
        table.set_preemptive_callback(WIN, Some(Box::new(|e| e.kind == InputKind::Motion)));

        let now = Instant::now();
        assert!(table.dispatch(&InputEvent::motion(WIN, 0, 0, now)));
        assert_eq!(*hits.borrow(), 0);
        assert!(table.dispatch(&InputEvent::press(WIN, 1, 0, 0, now)));
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn test_remove_all_drops_window() {
        let mut table = AppWindows::default();
        table.add_event_callback(WIN, Some(InputKind::Expose), Box::new(|_| true));
        table.remove_event_callback(WIN, Some(InputKind::Expose));
        assert!(table.contains(WIN));
        table.remove_event_callback(WIN, None);
        assert!(!table.contains(WIN));
        assert!(!table.dispatch(&InputEvent::motion(WIN, 0, 0, Instant::now())));
    }
}
