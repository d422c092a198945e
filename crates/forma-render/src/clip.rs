//! Clip bookkeeping.
//!
//! Two layers of clipping exist. The *permanent* clip is set around a whole
//! redraw of part of a form (an expose, or the area uncovered by hiding a
//! widget). The *transient* clip is set by individual drawing code, e.g. to
//! keep a free-form widget inside its box. Unsetting the transient clip
//! restores the permanent one instead of clearing clipping altogether.
//!
//! Setting or removing the permanent clip itself does not touch the surface;
//! only the transient setters push state to it.

use forma_core::Rect;
use forma_core::logging::targets;
use tracing::trace;

use crate::surface::DrawSurface;

/// Clip state shared by all drawing of one `Forms` instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipState {
    perm: Option<Rect>,
    current: Option<Rect>,
    text: Option<Rect>,
}

impl ClipState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_perm(&mut self, rect: Rect) {
        trace!(target: targets::CLIP, ?rect, "set permanent clip");
        self.perm = Some(rect);
    }

    pub fn unset_perm(&mut self) {
        trace!(target: targets::CLIP, "unset permanent clip");
        self.perm = None;
    }

    pub fn perm(&self) -> Option<Rect> {
        self.perm
    }

    pub fn has_perm(&self) -> bool {
        self.perm.is_some()
    }

    /// The transient clip last pushed to the surface.
    pub fn current(&self) -> Option<Rect> {
        self.current
    }

    pub fn text(&self) -> Option<Rect> {
        self.text
    }

    /// Set the transient clip. Empty rectangles remove clipping.
    pub fn set_clip(&mut self, surface: &mut dyn DrawSurface, rect: Rect) {
        self.current = (!rect.is_empty()).then_some(rect);
        trace!(target: targets::CLIP, clip = ?self.current, "set clip");
        surface.set_clip(self.current);
    }

    /// Remove the transient clip, falling back to the permanent one.
    pub fn unset_clip(&mut self, surface: &mut dyn DrawSurface) {
        self.current = self.perm;
        trace!(target: targets::CLIP, clip = ?self.current, "unset clip");
        surface.set_clip(self.current);
    }

    /// Restrict the transient clip further to its intersection with `rect`.
    ///
    /// Without a transient clip this is the same as [`set_clip`](Self::set_clip).
    /// Disjoint rectangles leave the clip unchanged.
    pub fn set_additional_clip(&mut self, surface: &mut dyn DrawSurface, rect: Rect) {
        let combined = match self.current {
            Some(cur) => cur.intersect(&rect),
            None => Some(rect),
        };
        match combined {
            Some(r) => {
                trace!(target: targets::CLIP, clip = ?r, "narrow clip");
                self.current = Some(r);
                surface.set_clip(self.current);
            }
            None => trace!(target: targets::CLIP, ?rect, "additional clip misses current clip"),
        }
    }

    pub fn set_text_clip(&mut self, surface: &mut dyn DrawSurface, rect: Rect) {
        self.text = Some(rect);
        trace!(target: targets::CLIP, ?rect, "set text clip");
        surface.set_text_clip(self.text);
    }

    pub fn unset_text_clip(&mut self, surface: &mut dyn DrawSurface) {
        self.text = self.perm;
        trace!(target: targets::CLIP, clip = ?self.text, "unset text clip");
        surface.set_text_clip(self.text);
    }

    /// Set the permanent, shape and text clip to the same rectangle.
    pub fn set_all(&mut self, surface: &mut dyn DrawSurface, rect: Rect) {
        self.set_perm(rect);
        self.set_clip(surface, rect);
        self.set_text_clip(surface, rect);
    }

    /// Undo [`set_all`](Self::set_all). The permanent clip goes first so the
    /// others really clear.
    pub fn unset_all(&mut self, surface: &mut dyn DrawSurface) {
        self.unset_perm();
        self.unset_clip(surface);
        self.unset_text_clip(surface);
    }

    /// Is a box (grown by one pixel) entirely outside the permanent clip?
    ///
    /// Without a permanent clip nothing is clipped out.
    pub fn is_clipped_out(&self, bbox: Rect) -> bool {
        match self.perm {
            Some(perm) => bbox.inflate(1).intersect(&perm).is_none(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::RecordingSurface;

    #[test]
    fn test_unset_restores_perm() {
        let mut s = RecordingSurface::new();
        let mut clip = ClipState::new();
        let perm = Rect::new(0, 0, 100, 100);
        clip.set_perm(perm);

        clip.set_clip(&mut s, Rect::new(10, 10, 5, 5));
        assert_eq!(s.clip(), Some(Rect::new(10, 10, 5, 5)));

        clip.unset_clip(&mut s);
        assert_eq!(s.clip(), Some(perm));
        assert_eq!(clip.current(), Some(perm));
    }

    #[test]
    fn test_unset_without_perm_clears() {
        let mut s = RecordingSurface::new();
        let mut clip = ClipState::new();
        clip.set_clip(&mut s, Rect::new(10, 10, 5, 5));
        clip.unset_clip(&mut s);
        assert_eq!(s.clip(), None);
    }

    #[test]
    fn test_empty_clip_means_none() {
        let mut s = RecordingSurface::new();
        let mut clip = ClipState::new();
        clip.set_clip(&mut s, Rect::new(10, 10, 0, 5));
        assert_eq!(s.clip(), None);
    }

    #[test]
    fn test_set_all_unset_all() {
        let mut s = RecordingSurface::new();
        let mut clip = ClipState::new();
        let r = Rect::new(5, 5, 50, 50);
        clip.set_all(&mut s, r);
        assert_eq!((s.clip(), s.text_clip()), (Some(r), Some(r)));

        clip.unset_all(&mut s);
        assert!(!clip.has_perm());
        assert_eq!((s.clip(), s.text_clip()), (None, None));
    }

    #[test]
    fn test_additional_clip_intersects() {
        let mut s = RecordingSurface::new();
        let mut clip = ClipState::new();
        clip.set_clip(&mut s, Rect::new(0, 0, 20, 20));
        clip.set_additional_clip(&mut s, Rect::new(10, 10, 20, 20));
        assert_eq!(s.clip(), Some(Rect::new(10, 10, 10, 10)));
    }

    #[test]
    fn test_is_clipped_out() {
        let mut clip = ClipState::new();
        let bbox = Rect::new(0, 0, 10, 10);
        assert!(!clip.is_clipped_out(bbox));

        clip.set_perm(Rect::new(10, 0, 10, 10));
        assert!(!clip.is_clipped_out(bbox), "one pixel of slack");
        clip.set_perm(Rect::new(11, 0, 10, 10));
        assert!(clip.is_clipped_out(bbox));
    }
}
