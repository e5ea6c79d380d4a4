use std::path::Path;

use image::DynamicImage;
use log::info;

use crate::colors::ColorRgb;
use crate::error::LoadError;
use crate::math::vec2::Vec2;

/// Represents a decoded 2D texture for material lookups.
#[derive(Debug)]
pub struct Texture {
    data: Vec<[u8; 3]>, // RGB texels, row-major, top row first.
    width: u32,
    height: u32,
}

impl Texture {
    /// Load a texture from an image file (PNG, JPG, BMP, ...).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| LoadError::Texture {
            path: path.to_path_buf(),
            source,
        })?;
        let texture = Self::from_image(img);
        info!(
            "Loaded texture: {} ({}x{})",
            path.display(),
            texture.width,
            texture.height
        );
        Ok(texture)
    }

    /// Wrap an already decoded image. Alpha is discarded.
    pub fn from_image(img: DynamicImage) -> Self {
        let img = img.to_rgb8();
        let (width, height) = img.dimensions();
        let data = img.pixels().map(|p| p.0).collect();

        Self {
            data,
            width,
            height,
        }
    }

    /// Sample the texture at UV coordinates using nearest-neighbor filtering.
    ///
    /// UVs are clamped to `[0, 1]`; `(0, 0)` is the top-left texel. Returns
    /// channels normalized to `[0, 1]`.
    #[inline]
    pub fn sample(&self, uv: Vec2) -> ColorRgb {
        if self.data.is_empty() {
            return ColorRgb::default();
        }

        // NaN clamps to NaN and then casts to 0, so bad UVs land on texel 0
        let u = uv.x.clamp(0.0, 1.0);
        let v = uv.y.clamp(0.0, 1.0);

        // u == 1.0 would address one past the last column
        let x = ((u * self.width as f32) as u32).min(self.width - 1);
        let y = ((v * self.height as f32) as u32).min(self.height - 1);

        let [r, g, b] = self.data[(y * self.width + x) as usize];
        ColorRgb::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}
