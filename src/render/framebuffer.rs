//! Color and depth buffers for one frame.
//!
//! The color buffer holds packed pixels in the display's [`PixelFormat`].
//! The depth buffer stores the interpolated device depth (post-divide z in
//! `[0, 1]`) of the closest surface seen so far. It is cleared to
//! `f32::INFINITY`, meaning "nothing drawn yet".

use std::path::Path;

use image::{ImageFormat, Rgb, RgbImage};
use log::{error, info};

use crate::colors::{ColorRgb, PixelFormat};

pub struct FrameBuffer {
    color_buffer: Vec<u32>,
    depth_buffer: Vec<f32>,
    width: u32,
    height: u32,
    format: PixelFormat,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        let size = (width * height) as usize;
        Self {
            color_buffer: vec![0; size],
            depth_buffer: vec![f32::INFINITY; size],
            width,
            height,
            format,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        let size = (width * height) as usize;
        self.color_buffer = vec![0; size];
        self.depth_buffer = vec![f32::INFINITY; size];
        self.width = width;
        self.height = height;
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn clear(&mut self, color: ColorRgb) {
        let packed = self.format.pack(color);
        self.color_buffer.fill(packed);
    }

    /// Clear the depth buffer to prepare for a new frame.
    #[inline]
    pub fn clear_depth(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y * self.width + x) as usize
    }

    /// Less-than depth test. Writes `depth` and returns `true` only when it is
    /// strictly closer than the stored value; ties keep the existing surface.
    /// Out-of-bounds coordinates always fail.
    #[inline]
    pub fn depth_test_and_set(&mut self, x: u32, y: u32, depth: f32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let idx = self.index(x, y);
        if depth < self.depth_buffer[idx] {
            self.depth_buffer[idx] = depth;
            true
        } else {
            false
        }
    }

    /// Set a pixel without depth testing. The color is expected to be
    /// saturated already. Silently ignores out-of-bounds coordinates.
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, color: ColorRgb) {
        if x < self.width && y < self.height {
            let idx = self.index(x, y);
            self.color_buffer[idx] = self.format.pack(color);
        }
    }

    /// Get the packed color at (x, y), or None if out of bounds.
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.color_buffer[self.index(x, y)])
    }

    /// Get the stored depth at (x, y), or None if out of bounds.
    #[inline]
    pub fn depth_at(&self, x: u32, y: u32) -> Option<f32> {
        (x < self.width && y < self.height).then(|| self.depth_buffer[self.index(x, y)])
    }

    pub fn pixels(&self) -> &[u32] {
        &self.color_buffer
    }

    pub fn depth(&self) -> &[f32] {
        &self.depth_buffer
    }

    /// Returns the color buffer as raw bytes, ready for a streaming texture.
    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: u32 has no padding and a stricter alignment than u8; the
        // byte slice covers exactly the same allocation and borrows `self`.
        unsafe {
            std::slice::from_raw_parts(
                self.color_buffer.as_ptr() as *const u8,
                self.color_buffer.len() * 4,
            )
        }
    }

    /// Writes the color buffer to an uncompressed BMP file.
    ///
    /// Failures are logged and reported as `false`; they never abort rendering.
    pub fn save_bmp<P: AsRef<Path>>(&self, path: P) -> bool {
        let path = path.as_ref();
        let img = RgbImage::from_fn(self.width, self.height, |x, y| {
            let (r, g, b) = self.format.get_rgb(self.color_buffer[self.index(x, y)]);
            Rgb([r, g, b])
        });

        match img.save_with_format(path, ImageFormat::Bmp) {
            Ok(()) => {
                info!("Saved color buffer to '{}'", path.display());
                true
            }
            Err(e) => {
                error!("Failed to save image to '{}': {}", path.display(), e);
                false
            }
        }
    }
}
