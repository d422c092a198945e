//! Damage accumulation for clipped repaints.
//!
//! Exposes from the window system and widgets being hidden leave areas of a
//! form that must be repainted. [`DamageRegion`] collects those areas into a
//! single bounding rectangle which the redraw engine then installs as the
//! permanent clip for one full pass over the form.

use forma_core::Rect;

/// Accumulated damaged area of one form.
///
/// # Example
///
/// ```
/// use forma_render::damage::DamageRegion;
/// use forma_core::Rect;
///
/// let mut damage = DamageRegion::with_viewport(Rect::new(0, 0, 500, 300));
/// damage.add(Rect::new(10, 10, 50, 30));
/// damage.add(Rect::new(100, 100, 20, 20));
/// assert_eq!(damage.region(), Some(Rect::new(10, 10, 110, 110)));
///
/// damage.clear();
/// assert!(!damage.has_damage());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DamageRegion {
    damage: Option<Rect>,
    count: u32,
    viewport: Option<Rect>,
}

impl DamageRegion {
    pub fn new() -> Self {
        Self::default()
    }

    /// A region whose damage is clipped to `viewport`.
    pub fn with_viewport(viewport: Rect) -> Self {
        Self {
            damage: None,
            count: 0,
            viewport: Some(viewport),
        }
    }

    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = Some(viewport);
        self.damage = self.damage.and_then(|d| d.intersect(&viewport));
    }

    /// Add a damaged rectangle. Empty rectangles and rectangles outside the
    /// viewport are ignored.
    pub fn add(&mut self, rect: Rect) {
        if rect.is_empty() {
            return;
        }
        let rect = match &self.viewport {
            Some(viewport) => match rect.intersect(viewport) {
                Some(clipped) => clipped,
                None => return,
            },
            None => rect,
        };

        self.count += 1;
        self.damage = Some(match self.damage {
            Some(existing) => existing.union(&rect),
            None => rect,
        });
    }

    /// The bounding rectangle of all damage so far.
    pub fn region(&self) -> Option<Rect> {
        self.damage
    }

    #[inline]
    pub fn has_damage(&self) -> bool {
        self.damage.is_some()
    }

    /// Number of rectangles added since the last [`clear`](Self::clear).
    #[inline]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Take the accumulated damage, leaving the region empty.
    pub fn take(&mut self) -> Option<Rect> {
        self.count = 0;
        self.damage.take()
    }

    pub fn clear(&mut self) {
        self.damage = None;
        self.count = 0;
    }
}
