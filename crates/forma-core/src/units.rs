//! Coordinate units.
//!
//! Widgets can be created with coordinates given in physical units. They are
//! converted to pixels once, at creation time, by a uniform scale factor
//! derived from the screen resolution.

use serde::{Deserialize, Serialize};

/// The unit in which widget coordinates are specified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordUnit {
    /// Screen pixels (no conversion).
    #[default]
    Pixel,
    /// Millimeters.
    Mm,
    /// Typographic points (1/72 inch).
    Point,
    /// Hundredths of a millimeter.
    CentiMm,
    /// Hundredths of a point.
    CentiPoint,
}

impl CoordUnit {
    /// Pixels per unit at the given resolution.
    pub fn scale(self, dpi: f64) -> f64 {
        match self {
            CoordUnit::Pixel => 1.0,
            CoordUnit::Mm => dpi / 25.4,
            CoordUnit::Point => dpi / 72.0,
            CoordUnit::CentiMm => dpi / 2540.0,
            CoordUnit::CentiPoint => dpi / 7200.0,
        }
    }

    /// Convert a coordinate to pixels, rounding to the nearest pixel.
    pub fn to_pixels(self, value: i32, dpi: f64) -> i32 {
        if self == CoordUnit::Pixel {
            return value;
        }
        crnd(f64::from(value) * self.scale(dpi))
    }
}

/// Round half away from zero and convert to `i32`.
#[inline]
pub fn crnd(v: f64) -> i32 {
    v.round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixels_are_unchanged() {
        assert_eq!(CoordUnit::Pixel.to_pixels(123, 96.0), 123);
    }

    #[test]
    fn test_points_at_72_dpi_are_pixels() {
        assert_eq!(CoordUnit::Point.to_pixels(50, 72.0), 50);
        assert_eq!(CoordUnit::CentiPoint.to_pixels(5000, 72.0), 50);
    }

    #[test]
    fn test_millimeters() {
        assert_eq!(CoordUnit::Mm.to_pixels(254, 96.0), 960);
        assert_eq!(CoordUnit::CentiMm.to_pixels(2540, 96.0), 96);
    }

    #[test]
    fn test_crnd_rounds_half_away_from_zero() {
        assert_eq!(crnd(2.5), 3);
        assert_eq!(crnd(-2.5), -3);
        assert_eq!(crnd(2.49), 2);
    }
}
