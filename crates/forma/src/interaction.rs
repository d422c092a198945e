//! Pointer, push and focus bookkeeping shared by all forms.
//!
//! There is one pointer and one keyboard, so the widget under the mouse,
//! the pushed widget and the multi-click state are held once per
//! [`Forms`](crate::Forms), not per form.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use forma_core::keys::is_wheel;

use crate::form::FormId;
use crate::widget::WidgetId;

/// The release that may start a double or triple click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LastClick {
    pub(crate) key: i32,
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) time: Instant,
    /// This release completed a double click.
    pub(crate) was_double: bool,
}

/// Classification of a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ClickKind {
    Single,
    Double,
    Triple,
}

#[derive(Debug, Default)]
pub(crate) struct InteractionContext {
    pub(crate) pushed: Option<WidgetId>,
    pub(crate) mouse: Option<WidgetId>,
    /// Widget that refused to lose the focus and wants it back.
    pub(crate) refocus: Option<WidgetId>,
    pub(crate) last_click: Option<LastClick>,
    /// Forms with redraw requests made while handlers were running.
    pub(crate) pending: HashSet<FormId>,
    pub(crate) dispatch_depth: u32,
}

impl InteractionContext {
    /// Classify a release of `key` at (`x`, `y`) and remember it as the
    /// last click.
    ///
    /// A release is a multi-click when the previous release, on any widget,
    /// used the same button within `timeout` and within `tolerance` pixels on
    /// each axis. It is a triple click when the previous release was a
    /// double click and a double click otherwise, so a fast fourth click is
    /// a double again. Wheel buttons never make multi-clicks, and neither do
    /// releases without a timestamp.
    pub(crate) fn classify_release(
        &mut self,
        key: i32,
        x: i32,
        y: i32,
        time: Option<Instant>,
        timeout: Duration,
        tolerance: i32,
    ) -> ClickKind {
        let Some(time) = time else {
            self.last_click = None;
            return ClickKind::Single;
        };

        let kind = match self.last_click {
            Some(last)
                if !timeout.is_zero()
                    && last.key == key
                    && !is_wheel(key)
                    && (x - last.x).abs() <= tolerance
                    && (y - last.y).abs() <= tolerance
                    && time.saturating_duration_since(last.time) < timeout =>
            {
                if last.was_double { ClickKind::Triple } else { ClickKind::Double }
            }
            _ => ClickKind::Single,
        };

        self.last_click = Some(LastClick {
            key,
            x,
            y,
            time,
            was_double: kind == ClickKind::Double,
        });
        kind
    }

    /// Drop every reference to a widget that is going away.
    pub(crate) fn forget(&mut self, id: WidgetId) {
        if self.pushed == Some(id) {
            self.pushed = None;
        }
        if self.mouse == Some(id) {
            self.mouse = None;
        }
        if self.refocus == Some(id) {
            self.refocus = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_millis(400);

    #[test]
    fn test_double_then_triple_then_double() {
        let mut ctx = InteractionContext::default();
        let t0 = Instant::now();
        let ms = Duration::from_millis;
        let mut classify = |t| ctx.classify_release(1, 10, 10, Some(t), TIMEOUT, 4);
        assert_eq!(classify(t0), ClickKind::Single);
        assert_eq!(classify(t0 + ms(100)), ClickKind::Double);
        assert_eq!(classify(t0 + ms(200)), ClickKind::Triple);
        assert_eq!(classify(t0 + ms(300)), ClickKind::Double);
        assert_eq!(classify(t0 + ms(400)), ClickKind::Triple);
        assert_eq!(classify(t0 + ms(900)), ClickKind::Single);
    }

    #[test]
    fn test_too_slow_or_too_far() {
        let mut ctx = InteractionContext::default();
        let t0 = Instant::now();
        ctx.classify_release(1, 10, 10, Some(t0), TIMEOUT, 4);
        let late = t0 + Duration::from_millis(500);
        assert_eq!(ctx.classify_release(1, 10, 10, Some(late), TIMEOUT, 4), ClickKind::Single);
        let soon = late + Duration::from_millis(10);
        assert_eq!(ctx.classify_release(1, 15, 10, Some(soon), TIMEOUT, 4), ClickKind::Single);
    }

    #[test]
    fn test_wheel_and_other_button() {
        let mut ctx = InteractionContext::default();
        let t0 = Instant::now();
        let soon = t0 + Duration::from_millis(10);
        ctx.classify_release(4, 0, 0, Some(t0), TIMEOUT, 4);
        assert_eq!(ctx.classify_release(4, 0, 0, Some(soon), TIMEOUT, 4), ClickKind::Single);
        ctx.classify_release(1, 0, 0, Some(t0), TIMEOUT, 4);
        assert_eq!(ctx.classify_release(3, 0, 0, Some(soon), TIMEOUT, 4), ClickKind::Single);
    }

    #[test]
    fn test_zero_timeout_disables() {
        let mut ctx = InteractionContext::default();
        let t0 = Instant::now();
        ctx.classify_release(1, 0, 0, Some(t0), Duration::ZERO, 4);
        let soon = t0 + Duration::from_millis(1);
        assert_eq!(ctx.classify_release(1, 0, 0, Some(soon), Duration::ZERO, 4), ClickKind::Single);
    }
}
