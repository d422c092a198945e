//! Integer geometry shared by the whole toolkit.
//!
//! Widget coordinates are whole pixels with the origin in the top-left
//! corner of the form. Rectangles are half-open in their area computations
//! (`x..x + width`) but hit-testing of widgets is inclusive of the right and
//! bottom edge, see [`Rect::contains_inclusive`].

/// A point in form coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The origin point (0, 0).
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Offset the point by the given amount.
    #[inline]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// A size (width and height).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    /// Create a new size.
    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Zero size.
    pub const ZERO: Self = Self {
        width: 0,
        height: 0,
    };

    /// Check if the size has zero area.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

/// A rectangle defined by origin and size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    /// Create a new rectangle from origin and size.
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            origin: Point { x, y },
            size: Size { width, height },
        }
    }

    /// Empty rectangle at origin.
    pub const ZERO: Self = Self {
        origin: Point::ZERO,
        size: Size::ZERO,
    };

    #[inline]
    pub const fn x(&self) -> i32 {
        self.origin.x
    }

    #[inline]
    pub const fn y(&self) -> i32 {
        self.origin.y
    }

    #[inline]
    pub const fn width(&self) -> i32 {
        self.size.width
    }

    #[inline]
    pub const fn height(&self) -> i32 {
        self.size.height
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> i32 {
        self.origin.x + self.size.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.origin.y + self.size.height
    }

    /// Check if the rectangle is empty (zero or negative size).
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.size.is_empty()
    }

    /// Check if a point lies inside the half-open area of the rectangle.
    #[inline]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x() && point.x < self.right() && point.y >= self.y() && point.y < self.bottom()
    }

    /// Widget hit-test: the right and bottom edge count as inside.
    #[inline]
    pub fn contains_inclusive(&self, point: Point) -> bool {
        point.x >= self.x()
            && point.x <= self.right()
            && point.y >= self.y()
            && point.y <= self.bottom()
    }

    /// Compute the intersection of two rectangles.
    ///
    /// Returns `None` unless the overlap has a positive area.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let left = self.x().max(other.x());
        let top = self.y().max(other.y());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if left < right && top < bottom {
            Some(Rect::new(left, top, right - left, bottom - top))
        } else {
            None
        }
    }

    /// Compute the bounding box of two rectangles.
    pub fn union(&self, other: &Rect) -> Rect {
        let left = self.x().min(other.x());
        let top = self.y().min(other.y());
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(left, top, right - left, bottom - top)
    }

    /// Expand the rectangle by the given amount on all sides.
    #[inline]
    pub const fn inflate(&self, amount: i32) -> Rect {
        Rect::new(
            self.origin.x - amount,
            self.origin.y - amount,
            self.size.width + amount * 2,
            self.size.height + amount * 2,
        )
    }

    /// Offset the rectangle by the given amount.
    #[inline]
    pub const fn offset(&self, dx: i32, dy: i32) -> Rect {
        Rect {
            origin: self.origin.offset(dx, dy),
            size: self.size,
        }
    }
}
