//! Label and child placement relative to a box.
//!
//! An [`Align`] names one of nine positions (the eight compass points plus
//! the center) and whether the item goes inside the box or just outside of
//! it. Outside placement is computed by mirroring: "outside left" of a box is
//! "inside right" of a phantom box of the same size shifted left by its own
//! width, and so on for the other directions.

use crate::geometry::{Point, Rect, Size};
use crate::logging::targets;

/// Bit marking an alignment as "inside" in the packed representation.
pub const ALIGN_INSIDE: u32 = 1 << 13;

/// One of the nine placement positions.
///
/// The discriminants match the packed representation accepted by
/// [`Align::from_bits`]: vertical bits (top = 1, bottom = 2) combined with
/// horizontal bits (left = 4, right = 8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum Placement {
    #[default]
    Center = 0,
    Top = 1,
    Bottom = 2,
    Left = 4,
    LeftTop = 5,
    LeftBottom = 6,
    Right = 8,
    RightTop = 9,
    RightBottom = 10,
}

impl Placement {
    /// All placements, in packed order.
    pub const ALL: [Placement; 9] = [
        Placement::Center,
        Placement::Top,
        Placement::Bottom,
        Placement::Left,
        Placement::LeftTop,
        Placement::LeftBottom,
        Placement::Right,
        Placement::RightTop,
        Placement::RightBottom,
    ];

    fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|p| *p as u32 == code)
    }
}

/// Horizontal component of a placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

/// Vertical component of a placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Center,
    Bottom,
}

/// A placement plus the inside/outside flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Align {
    placement: Placement,
    inside: bool,
}

impl Align {
    pub const CENTER: Align = Align::outside(Placement::Center);
    pub const TOP: Align = Align::outside(Placement::Top);
    pub const BOTTOM: Align = Align::outside(Placement::Bottom);
    pub const LEFT: Align = Align::outside(Placement::Left);
    pub const RIGHT: Align = Align::outside(Placement::Right);
    pub const LEFT_TOP: Align = Align::outside(Placement::LeftTop);
    pub const RIGHT_TOP: Align = Align::outside(Placement::RightTop);
    pub const LEFT_BOTTOM: Align = Align::outside(Placement::LeftBottom);
    pub const RIGHT_BOTTOM: Align = Align::outside(Placement::RightBottom);

    /// An alignment placing the item inside the box.
    pub const fn inside(placement: Placement) -> Self {
        Self {
            placement,
            inside: true,
        }
    }

    /// An alignment placing the item outside the box.
    pub const fn outside(placement: Placement) -> Self {
        Self {
            placement,
            inside: false,
        }
    }

    /// Decode the packed representation.
    ///
    /// Unknown values fall back to [`Align::CENTER`] and are logged.
    pub fn from_bits(bits: u32) -> Self {
        let inside = bits & ALIGN_INSIDE != 0;
        match Placement::from_code(bits & !ALIGN_INSIDE) {
            Some(placement) => Self { placement, inside },
            None => {
                tracing::error!(target: targets::ALIGN, bits, "invalid alignment value, using center");
                Self::CENTER
            }
        }
    }

    /// Encode into the packed representation.
    pub const fn bits(self) -> u32 {
        let code = self.placement as u32;
        if self.inside { code | ALIGN_INSIDE } else { code }
    }

    pub const fn placement(self) -> Placement {
        self.placement
    }

    /// Centered items are always inside.
    pub fn is_inside(self) -> bool {
        self.inside || self.is_center()
    }

    pub fn is_outside(self) -> bool {
        !self.is_inside()
    }

    pub fn is_center(self) -> bool {
        self.placement == Placement::Center
    }

    /// The same placement, inside the box. Center stays plain center.
    pub fn to_inside(self) -> Self {
        if self.is_center() {
            Self::CENTER
        } else {
            Self::inside(self.placement)
        }
    }

    /// The same placement, outside the box.
    pub fn to_outside(self) -> Self {
        Self::outside(self.placement)
    }

    /// Split into horizontal and vertical components.
    pub fn hv(self) -> (HAlign, VAlign) {
        match self.placement {
            Placement::Center => (HAlign::Center, VAlign::Center),
            Placement::Top => (HAlign::Center, VAlign::Top),
            Placement::Bottom => (HAlign::Center, VAlign::Bottom),
            Placement::Left => (HAlign::Left, VAlign::Center),
            Placement::LeftTop => (HAlign::Left, VAlign::Top),
            Placement::LeftBottom => (HAlign::Left, VAlign::Bottom),
            Placement::Right => (HAlign::Right, VAlign::Center),
            Placement::RightTop => (HAlign::Right, VAlign::Top),
            Placement::RightBottom => (HAlign::Right, VAlign::Bottom),
        }
    }

    /// Map an outside placement to the inside placement used on the phantom
    /// box, together with that phantom box.
    ///
    /// Left/right placements mirror horizontally, the rest mirror vertically
    /// (so "outside left-top" sits above the box, flush with its left edge).
    /// Center maps to itself on the unchanged box.
    pub fn outside_mapping(self, area: Rect) -> (Align, Rect) {
        let w = area.width();
        let h = area.height();
        let (placement, dx, dy) = match self.placement {
            Placement::Center => (Placement::Center, 0, 0),
            Placement::Left => (Placement::Right, -w, 0),
            Placement::Right => (Placement::Left, w, 0),
            Placement::Top => (Placement::Bottom, 0, -h),
            Placement::Bottom => (Placement::Top, 0, h),
            Placement::LeftTop => (Placement::LeftBottom, 0, -h),
            Placement::RightTop => (Placement::RightBottom, 0, -h),
            Placement::LeftBottom => (Placement::LeftTop, 0, h),
            Placement::RightBottom => (Placement::RightTop, 0, h),
        };
        let mapped = if placement == Placement::Center {
            Align::CENTER
        } else {
            Align::inside(placement)
        };
        (mapped, area.offset(dx, dy))
    }

    /// Position of an item of `size` placed inside `area` after shrinking the
    /// area by `margin` on each side.
    pub fn place_inside(self, area: Rect, size: Size, margin: Size) -> Point {
        let x = area.x() + margin.width;
        let y = area.y() + margin.height;
        let w = area.width() - 2 * margin.width;
        let h = area.height() - 2 * margin.height;
        let (hor, vert) = self.hv();

        let px = match hor {
            HAlign::Left => x,
            HAlign::Right => x + w - size.width,
            HAlign::Center => x + (w - size.width) / 2,
        };
        let py = match vert {
            VAlign::Top => y,
            VAlign::Bottom => y + h - size.height,
            VAlign::Center => y + (h - size.height) / 2,
        };
        Point::new(px, py)
    }

    /// Position of an item of `size` relative to `area`, honouring the
    /// inside/outside flag.
    pub fn place(self, area: Rect, size: Size, margin: Size) -> Point {
        if self.is_inside() {
            self.place_inside(area, size, margin)
        } else {
            let (mapped, phantom) = self.outside_mapping(area);
            mapped.place_inside(phantom, size, margin)
        }
    }
}

static_assertions::assert_impl_all!(Align: Send, Sync, Copy);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits_roundtrip_known_values() {
        assert_eq!(Align::from_bits(4), Align::LEFT);
        assert_eq!(Align::from_bits(4 | ALIGN_INSIDE), Align::inside(Placement::Left));
        assert_eq!(Align::RIGHT_BOTTOM.bits(), 10);
    }

    #[test]
    fn test_invalid_bits_fall_back_to_center() {
        assert_eq!(Align::from_bits(3), Align::CENTER);
        assert_eq!(Align::from_bits(11), Align::CENTER);
        assert_eq!(Align::from_bits(0xffff), Align::CENTER);
    }

    #[test]
    fn test_center_is_inside_and_stays_center() {
        assert!(Align::CENTER.is_inside());
        assert_eq!(Align::CENTER.to_inside(), Align::CENTER);
        assert_eq!(Align::CENTER.to_outside(), Align::CENTER);
        assert_eq!(Align::CENTER.to_inside().bits(), 0);
    }

    #[test]
    fn test_outside_left_places_left_of_box() {
        let area = Rect::new(100, 50, 40, 20);
        let p = Align::LEFT.place(area, Size::new(10, 8), Size::ZERO);
        // Flush against the left edge, vertically centered.
        assert_eq!(p, Point::new(90, 56));
    }

    #[test]
    fn test_outside_top_places_above_box() {
        let area = Rect::new(100, 50, 40, 20);
        let p = Align::TOP.place(area, Size::new(10, 8), Size::ZERO);
        assert_eq!(p, Point::new(115, 42));
    }

    #[test]
    fn test_outside_left_top_sits_above_left_edge() {
        let area = Rect::new(100, 50, 40, 20);
        let (mapped, phantom) = Align::LEFT_TOP.outside_mapping(area);
        assert_eq!(mapped, Align::inside(Placement::LeftBottom));
        assert_eq!(phantom, Rect::new(100, 30, 40, 20));
    }

    #[test]
    fn test_inside_margins() {
        let area = Rect::new(0, 0, 100, 40);
        let p = Align::inside(Placement::RightBottom).place(area, Size::new(20, 10), Size::new(3, 3));
        assert_eq!(p, Point::new(77, 27));
    }
}
