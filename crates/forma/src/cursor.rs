//! Cursor management.
//!
//! Cursors are created lazily through the [`DrawSurface`] and cached by
//! name, so asking for the same cursor twice reuses one handle. Besides the
//! built-in names, any glyph of the cursor font can be requested.
//!
//! An animated cursor is a sequence of cursors defined on a window in turn,
//! advanced by a repeating timer. Setting a static cursor on the window
//! stops its animation.
//!
//! ```ignore
//! forms.set_cursor(window, CursorName::Watch);
//!
//! let busy = forms.create_animated_cursor(&[CursorName::Glyph(150), CursorName::Glyph(152)]);
//! forms.set_animated_cursor(window, busy)?;
//! ```

use std::collections::HashMap;

use forma_core::logging::targets;
use forma_core::{FormsError, Result, TimerId};
use forma_render::{CursorHandle, DrawSurface, WindowHandle};

use crate::form::{Forms, TimerOwner};

/// A cursor shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CursorName {
    /// The regular arrow.
    #[default]
    Default,
    /// No visible cursor.
    Invisible,
    Watch,
    RightArrow,
    Hand,
    TopLeftArrow,
    Crosshair,
    Pirate,
    /// A glyph of the cursor font.
    Glyph(u32),
}

impl CursorName {
    /// The cursor font glyph of a named cursor.
    fn glyph(self) -> Option<u32> {
        match self {
            CursorName::Default => Some(68),
            CursorName::Invisible => None,
            CursorName::Watch => Some(150),
            CursorName::RightArrow => Some(94),
            CursorName::Hand => Some(60),
            CursorName::TopLeftArrow => Some(132),
            CursorName::Crosshair => Some(34),
            CursorName::Pirate => Some(88),
            CursorName::Glyph(g) => Some(g),
        }
    }

    /// Parse a cursor name such as `"watch"` or `"top-left-arrow"`.
    /// Unknown names give the default cursor and log an error.
    pub fn parse(name: &str) -> Self {
        match name {
            "default" => CursorName::Default,
            "invisible" => CursorName::Invisible,
            "watch" => CursorName::Watch,
            "right-arrow" => CursorName::RightArrow,
            "hand" => CursorName::Hand,
            "top-left-arrow" => CursorName::TopLeftArrow,
            "crosshair" => CursorName::Crosshair,
            "pirate" => CursorName::Pirate,
            _ => {
                tracing::error!(target: targets::CURSOR, name, "unknown cursor, using the default");
                CursorName::Default
            }
        }
    }
}

/// Handle of an animated cursor made by [`Forms::create_animated_cursor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimatedCursor(usize);

#[derive(Debug, Clone, Copy)]
struct Running {
    animation: AnimatedCursor,
    frame: usize,
    timer: TimerId,
}

/// Created cursors, animations and the windows animating them.
#[derive(Debug, Default)]
pub struct CursorCache {
    cursors: HashMap<CursorName, CursorHandle>,
    animations: Vec<Vec<CursorHandle>>,
    running: HashMap<WindowHandle, Running>,
    current: HashMap<WindowHandle, CursorHandle>,
}

impl CursorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cursor for `name`, created on first use. A glyph the surface
    /// can't make falls back to the default cursor.
    pub fn get(&mut self, surface: &mut dyn DrawSurface, name: CursorName) -> Option<CursorHandle> {
        if let Some(handle) = self.cursors.get(&name) {
            return Some(*handle);
        }
        let created = match name.glyph() {
            Some(glyph) => surface.create_cursor(glyph),
            None => surface.create_blank_cursor(),
        };
        match created {
            Ok(handle) => {
                tracing::trace!(target: targets::CURSOR, ?name, ?handle, "cursor created");
                self.cursors.insert(name, handle);
                Some(handle)
            }
            Err(err) => {
                tracing::error!(target: targets::CURSOR, ?name, %err, "can't create cursor, using the default");
                if name == CursorName::Default {
                    None
                } else {
                    self.get(surface, CursorName::Default)
                }
            }
        }
    }

    /// Number of distinct cursors created so far.
    pub fn len(&self) -> usize {
        self.cursors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cursors.is_empty()
    }

    /// The cursor last defined on `window` by forma.
    pub fn current(&self, window: WindowHandle) -> Option<CursorHandle> {
        self.current.get(&window).copied()
    }

    pub fn is_animating(&self, window: WindowHandle) -> bool {
        self.running.contains_key(&window)
    }
}

impl Forms {
    /// Show the cursor `name` in `window`, stopping any animation there.
    pub fn set_cursor(&mut self, window: WindowHandle, name: CursorName) {
        self.stop_cursor_animation(window);
        let handle = self.cursors.get(self.surface.as_mut(), name);
        self.define_cursor(window, handle);
    }

    /// Build an animated cursor from a sequence of shapes.
    pub fn create_animated_cursor(&mut self, frames: &[CursorName]) -> AnimatedCursor {
        let handles: Vec<CursorHandle> = frames
            .iter()
            .filter_map(|name| self.cursors.get(self.surface.as_mut(), *name))
            .collect();
        self.cursors.animations.push(handles);
        AnimatedCursor(self.cursors.animations.len() - 1)
    }

    /// Start animating `window`'s cursor. Frames advance every
    /// `cursor_animation_ms`.
    pub fn set_animated_cursor(&mut self, window: WindowHandle, animation: AnimatedCursor) -> Result<()> {
        let Some(first) = self.cursors.animations.get(animation.0).and_then(|f| f.first().copied()) else {
            tracing::error!(target: targets::CURSOR, ?animation, "animated cursor without frames");
            return Err(FormsError::EmptyCursorAnimation);
        };
        self.stop_cursor_animation(window);
        self.define_cursor(window, Some(first));

        let timer = self.timers.start_repeating_at(self.now, self.config.cursor_animation());
        self.timer_owners.insert(timer, TimerOwner::CursorAnimation(window));
        self.cursors.running.insert(
            window,
            Running {
                animation,
                frame: 0,
                timer,
            },
        );
        Ok(())
    }

    pub fn cursors(&self) -> &CursorCache {
        &self.cursors
    }

    /// Show the next frame of `window`'s animation.
    pub(crate) fn advance_cursor_animation(&mut self, window: WindowHandle) {
        let Some(running) = self.cursors.running.get_mut(&window) else {
            return;
        };
        let frames = &self.cursors.animations[running.animation.0];
        running.frame = (running.frame + 1) % frames.len();
        let handle = frames[running.frame];
        self.define_cursor(window, Some(handle));
    }

    fn stop_cursor_animation(&mut self, window: WindowHandle) {
        if let Some(running) = self.cursors.running.remove(&window) {
            self.timer_owners.remove(&running.timer);
            let _ = self.timers.stop(running.timer);
            tracing::trace!(target: targets::CURSOR, ?window, "cursor animation stopped");
        }
    }

    fn define_cursor(&mut self, window: WindowHandle, handle: Option<CursorHandle>) {
        self.surface.define_cursor(window, handle);
        match handle {
            Some(handle) => self.cursors.current.insert(window, handle),
            None => self.cursors.current.remove(&window),
        };
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use forma_core::FormsConfig;
    use forma_render::RecordingSurface;

    use super::*;

    #[test]
    fn test_cache_reuses_handles() {
        let mut surface = RecordingSurface::new();
        let mut cache = CursorCache::new();
        let a = cache.get(&mut surface, CursorName::Watch);
        let b = cache.get(&mut surface, CursorName::Watch);
        assert_eq!(a, b);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&mut surface, CursorName::Invisible).is_some());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_bad_glyph_falls_back_to_default() {
        let mut surface = RecordingSurface::new();
        let mut cache = CursorCache::new();
        let bad = cache.get(&mut surface, CursorName::Glyph(10_000));
        let default = cache.get(&mut surface, CursorName::Default);
        assert_eq!(bad, default);
    }

    #[test]
    fn test_unknown_name_is_default() {
        assert_eq!(CursorName::parse("pirate"), CursorName::Pirate);
        assert_eq!(CursorName::parse("nonsense"), CursorName::Default);
    }

    #[test]
    fn test_animation_advances_until_a_static_cursor_is_set() {
        let mut forms = Forms::with_config(RecordingSurface::new(), FormsConfig::default());
        let win = WindowHandle(3);
        let busy = forms.create_animated_cursor(&[CursorName::Glyph(150), CursorName::Glyph(152)]);
        forms.set_animated_cursor(win, busy).unwrap();
        let first = forms.cursors().current(win);
        assert!(first.is_some());

        let t0 = forms.now();
        forms.step(t0 + Duration::from_millis(25));
        assert_ne!(forms.cursors().current(win), first);

        forms.set_cursor(win, CursorName::Hand);
        assert!(!forms.cursors().is_animating(win));
        let empty = forms.create_animated_cursor(&[]);
        assert!(matches!(
            forms.set_animated_cursor(win, empty),
            Err(FormsError::EmptyCursorAnimation)
        ));
    }
}
