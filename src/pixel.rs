//! RGB565 pixel format
//!
//! The single colour format this crate targets: 16 bits per pixel with
//! 5 bits red at offset 11, 6 bits green at offset 5 and 5 bits blue at
//! offset 0. Callers rendering for other formats convert before handing
//! frames over; the crate itself never converts.

/// RGB565 color (16-bit: 5 red, 6 green, 5 blue)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb565(pub u16);

impl Rgb565 {
    pub const BLACK: Self = Self(0x0000);
    pub const WHITE: Self = Self(0xFFFF);
    pub const RED: Self = Self(0xF800);
    pub const GREEN: Self = Self(0x07E0);
    pub const BLUE: Self = Self(0x001F);

    /// Create RGB565 from RGB888 components
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        let r5 = (r >> 3) as u16;
        let g6 = (g >> 2) as u16;
        let b5 = (b >> 3) as u16;
        Self((r5 << 11) | (g6 << 5) | b5)
    }
}

/// One colour channel of the pixel format, as the device reports it
///
/// `offset` is the bit position of the channel inside a pixel, `length`
/// its width in bits. A non-zero `msb_right` means the channel is stored
/// with its most significant bit on the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelLayout {
    pub offset: u32,
    pub length: u32,
    pub msb_right: u32,
}

impl ChannelLayout {
    /// Check the channel against an expected left-to-right bitfield
    pub const fn matches(&self, offset: u32, length: u32) -> bool {
        self.offset == offset && self.length == length && self.msb_right == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgb_extremes() {
        assert_eq!(Rgb565::from_rgb(0, 0, 0), Rgb565::BLACK);
        assert_eq!(Rgb565::from_rgb(255, 255, 255), Rgb565::WHITE);
        assert_eq!(Rgb565::from_rgb(255, 0, 0), Rgb565::RED);
        assert_eq!(Rgb565::from_rgb(0, 255, 0), Rgb565::GREEN);
        assert_eq!(Rgb565::from_rgb(0, 0, 255), Rgb565::BLUE);
    }

    #[test]
    fn test_from_rgb_drops_low_bits() {
        // 5-bit red keeps the top five bits of the 8-bit component
        assert_eq!(Rgb565::from_rgb(0b0000_0111, 0, 0), Rgb565::BLACK);
        assert_eq!(Rgb565::from_rgb(0b0000_1000, 0, 0), Rgb565(1 << 11));
    }

    #[test]
    fn test_channel_matches() {
        let red = ChannelLayout { offset: 11, length: 5, msb_right: 0 };
        assert!(red.matches(11, 5));
        assert!(!red.matches(5, 6));

        let swapped = ChannelLayout { offset: 11, length: 5, msb_right: 1 };
        assert!(!swapped.matches(11, 5));
    }
}
