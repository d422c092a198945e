//! Colors.

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Create a color from 8-bit components.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create a color from a packed `0xRRGGBB` value.
    #[inline]
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }

    /// Scale each component by `factor` / 100, saturating.
    pub fn shade(self, factor: u32) -> Self {
        let f = |c: u8| (u32::from(c) * factor / 100).min(255) as u8;
        Self::rgb(f(self.r), f(self.g), f(self.b))
    }

    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const INDIANRED: Color = Color::rgb(198, 113, 113);

    /// Default widget face.
    pub const COL1: Color = Color::rgb(161, 161, 161);
    /// Default secondary color (pressed buttons, selections).
    pub const MCOL: Color = Color::rgb(191, 191, 191);
    /// Top/left bevel.
    pub const TOP_BCOL: Color = Color::rgb(204, 204, 204);
    /// Bottom/right bevel.
    pub const BOTTOM_BCOL: Color = Color::rgb(89, 89, 89);
    /// Inactive label text.
    pub const INACTIVE: Color = Color::rgb(110, 110, 110);
    /// Tooltip background.
    pub const TOOLTIP_BG: Color = Color::rgb(255, 255, 224);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        assert_eq!(Color::from_hex(0xff8000), Color::rgb(255, 128, 0));
    }

    #[test]
    fn test_shade_saturates() {
        assert_eq!(Color::rgb(200, 100, 0).shade(150), Color::rgb(255, 150, 0));
        assert_eq!(Color::rgb(200, 100, 0).shade(50), Color::rgb(100, 50, 0));
    }
}
