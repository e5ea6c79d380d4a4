//! Linear RGB color values and packing into the display's pixel format.

use std::ops::{Add, AddAssign, Div, Mul};

/// RGB color in linear float space. Channels are nominally in `[0, 1]` but
/// may exceed 1 while lighting terms are being accumulated.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ColorRgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

pub const WHITE: ColorRgb = ColorRgb::new(1.0, 1.0, 1.0);
pub const BLACK: ColorRgb = ColorRgb::new(0.0, 0.0, 0.0);
pub const BACKGROUND: ColorRgb = ColorRgb::new(100.0 / 255.0, 100.0 / 255.0, 100.0 / 255.0);

impl ColorRgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub const fn gray(value: f32) -> Self {
        Self::new(value, value, value)
    }

    pub fn max_channel(&self) -> f32 {
        self.r.max(self.g).max(self.b)
    }

    /// Rescales all channels so the brightest one is exactly 1.0 when any
    /// channel exceeds 1.0. Hue is preserved; colors already in range are
    /// returned unchanged.
    pub fn max_to_one(self) -> Self {
        let max = self.max_channel();
        if max > 1.0 {
            self / max
        } else {
            self
        }
    }

    pub fn is_finite(&self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite()
    }
}

impl Add for ColorRgb {
    type Output = ColorRgb;

    fn add(self, rhs: ColorRgb) -> Self::Output {
        Self::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b)
    }
}

impl AddAssign for ColorRgb {
    fn add_assign(&mut self, rhs: ColorRgb) {
        *self = *self + rhs;
    }
}

/// Per-channel product.
impl Mul<ColorRgb> for ColorRgb {
    type Output = ColorRgb;

    fn mul(self, rhs: ColorRgb) -> Self::Output {
        Self::new(self.r * rhs.r, self.g * rhs.g, self.b * rhs.b)
    }
}

impl Mul<f32> for ColorRgb {
    type Output = ColorRgb;

    fn mul(self, rhs: f32) -> Self::Output {
        Self::new(self.r * rhs, self.g * rhs, self.b * rhs)
    }
}

impl Mul<ColorRgb> for f32 {
    type Output = ColorRgb;

    fn mul(self, rhs: ColorRgb) -> Self::Output {
        rhs * self
    }
}

impl Div<f32> for ColorRgb {
    type Output = ColorRgb;

    fn div(self, rhs: f32) -> Self::Output {
        Self::new(self.r / rhs, self.g / rhs, self.b / rhs)
    }
}

/// Channel layout of a packed 32-bit pixel.
///
/// Built from the display surface's channel masks at start-up so the renderer
/// never assumes a byte order of its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelFormat {
    r_shift: u32,
    g_shift: u32,
    b_shift: u32,
    alpha: u32,
}

impl PixelFormat {
    /// `0xAARRGGBB` as a native `u32`, the layout of SDL's `ARGB8888`.
    pub const ARGB8888: PixelFormat = PixelFormat {
        r_shift: 16,
        g_shift: 8,
        b_shift: 0,
        alpha: 0xFF00_0000,
    };

    /// Derives the layout from 8-bit channel masks. A zero alpha mask means
    /// the format has no alpha channel.
    pub fn from_masks(r_mask: u32, g_mask: u32, b_mask: u32, a_mask: u32) -> Self {
        Self {
            r_shift: r_mask.trailing_zeros().min(24),
            g_shift: g_mask.trailing_zeros().min(24),
            b_shift: b_mask.trailing_zeros().min(24),
            alpha: a_mask,
        }
    }

    /// Packs 8-bit channels into a pixel.
    #[inline]
    pub fn map_rgb(&self, r: u8, g: u8, b: u8) -> u32 {
        self.alpha
            | ((r as u32) << self.r_shift)
            | ((g as u32) << self.g_shift)
            | ((b as u32) << self.b_shift)
    }

    /// Packs a float color, truncating each channel to 8 bits. Channels are
    /// expected in `[0, 1]`; out-of-range values saturate at the `u8` bounds.
    #[inline]
    pub fn pack(&self, color: ColorRgb) -> u32 {
        self.map_rgb(
            (color.r * 255.0) as u8,
            (color.g * 255.0) as u8,
            (color.b * 255.0) as u8,
        )
    }

    /// Splits a pixel back into its 8-bit channels.
    #[inline]
    pub fn get_rgb(&self, pixel: u32) -> (u8, u8, u8) {
        (
            (pixel >> self.r_shift) as u8,
            (pixel >> self.g_shift) as u8,
            (pixel >> self.b_shift) as u8,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn max_to_one_preserves_ratios() {
        let color = ColorRgb::new(4.0, 2.0, 1.0).max_to_one();
        assert_eq!(color.max_channel(), 1.0);
        assert_relative_eq!(color.g / color.r, 0.5);
        assert_relative_eq!(color.b / color.r, 0.25);
    }

    #[test]
    fn max_to_one_leaves_in_range_colors_alone() {
        let color = ColorRgb::new(0.2, 0.9, 1.0);
        assert_eq!(color.max_to_one(), color);
    }

    #[test]
    fn argb_layout_matches_masks() {
        let derived = PixelFormat::from_masks(0x00FF_0000, 0x0000_FF00, 0x0000_00FF, 0xFF00_0000);
        assert_eq!(derived, PixelFormat::ARGB8888);
        assert_eq!(derived.map_rgb(0x12, 0x34, 0x56), 0xFF12_3456);
    }

    #[test]
    fn abgr_layout_swaps_channels() {
        let format = PixelFormat::from_masks(0x0000_00FF, 0x0000_FF00, 0x00FF_0000, 0);
        let pixel = format.map_rgb(0x12, 0x34, 0x56);
        assert_eq!(pixel, 0x0056_3412);
        assert_eq!(format.get_rgb(pixel), (0x12, 0x34, 0x56));
    }

    #[test]
    fn pack_truncates_to_bytes() {
        let pixel = PixelFormat::ARGB8888.pack(ColorRgb::new(1.0, 0.5, 0.0));
        assert_eq!(PixelFormat::ARGB8888.get_rgb(pixel), (255, 127, 0));
    }
}
