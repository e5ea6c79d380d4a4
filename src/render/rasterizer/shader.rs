//! Pixel shaders for triangle rasterization.
//!
//! The rasterizer owns coverage, depth testing and attribute interpolation;
//! a [`PixelShader`] turns one interpolated fragment into a linear color.
//! The rasterizer saturates the result with [`ColorRgb::max_to_one`] before
//! it is packed.
//!
//! - [`BrdfShader`]: Lambert + Phong with optional normal mapping
//! - [`DepthShader`]: grayscale visualization of the depth buffer value

use std::fmt;

use crate::brdf;
use crate::colors::ColorRgb;
use crate::light::SceneLighting;
use crate::math::mat4::Mat4;
use crate::math::vec3::Vec3;
use crate::mesh::{Material, VertexOut};

/// Trait for per-pixel shading computations.
///
/// `fragment` carries perspective-correct attributes. Its `position` is
/// `(pixel x, pixel y, depth, interpolated w)`.
pub trait PixelShader {
    fn shade(&self, fragment: &VertexOut) -> ColorRgb;
}

/// Which lighting terms the BRDF shader outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadingMode {
    /// Cosine term only, as grayscale.
    ObservedArea,
    /// Lambert diffuse times the cosine term.
    Diffuse,
    /// Phong specular times the cosine term.
    Specular,
    /// Diffuse times the cosine term, plus the unscaled specular lobe.
    #[default]
    Combined,
}

impl ShadingMode {
    /// Next mode in the cycle `ObservedArea -> Diffuse -> Specular -> Combined`.
    pub fn next(self) -> Self {
        match self {
            ShadingMode::ObservedArea => ShadingMode::Diffuse,
            ShadingMode::Diffuse => ShadingMode::Specular,
            ShadingMode::Specular => ShadingMode::Combined,
            ShadingMode::Combined => ShadingMode::ObservedArea,
        }
    }
}

impl fmt::Display for ShadingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShadingMode::ObservedArea => write!(f, "ObservedArea"),
            ShadingMode::Diffuse => write!(f, "Diffuse"),
            ShadingMode::Specular => write!(f, "Specular"),
            ShadingMode::Combined => write!(f, "Combined"),
        }
    }
}

/// Physically-inspired shader driven by the mesh material.
///
/// Missing textures fall back as follows:
/// - no diffuse map: the interpolated vertex color is the albedo
/// - no normal map: the geometric normal is used
/// - no specular or gloss map: the specular term is black
pub struct BrdfShader<'a> {
    material: &'a Material,
    lighting: &'a SceneLighting,
    mode: ShadingMode,
    use_normal_map: bool,
}

impl<'a> BrdfShader<'a> {
    pub fn new(
        material: &'a Material,
        lighting: &'a SceneLighting,
        mode: ShadingMode,
        use_normal_map: bool,
    ) -> Self {
        Self {
            material,
            lighting,
            mode,
            use_normal_map,
        }
    }

    /// Normal used for both lighting terms.
    fn surface_normal(&self, fragment: &VertexOut) -> Vec3 {
        let normal_map = match (&self.material.normal, self.use_normal_map) {
            (Some(map), true) => map,
            _ => return fragment.normal,
        };

        let normal = fragment.normal;
        let tangent = fragment.tangent;
        let binormal = normal.cross(tangent);
        let tangent_space = Mat4::from_axes(tangent, binormal, normal, Vec3::ZERO);

        // [0, 1] texel to [-1, 1] tangent-space direction
        let texel = normal_map.sample(fragment.uv);
        let sampled = Vec3::new(
            2.0 * texel.r - 1.0,
            2.0 * texel.g - 1.0,
            2.0 * texel.b - 1.0,
        );

        let mapped = tangent_space.transform_vector(sampled).normalize_or_zero();
        if mapped == Vec3::ZERO {
            normal
        } else {
            mapped
        }
    }

    fn diffuse(&self, fragment: &VertexOut) -> ColorRgb {
        let albedo = match &self.material.diffuse {
            Some(texture) => texture.sample(fragment.uv),
            None => fragment.color,
        };
        brdf::lambert(self.material.diffuse_reflectance, albedo)
    }

    fn specular(&self, fragment: &VertexOut, normal: Vec3) -> ColorRgb {
        let (specular, gloss) = match (&self.material.specular, &self.material.gloss) {
            (Some(specular), Some(gloss)) => (specular, gloss),
            _ => return ColorRgb::default(),
        };

        let exponent = gloss.sample(fragment.uv).r * self.material.shininess;
        let lobe = brdf::phong(
            self.material.specular_reflectance,
            exponent,
            self.lighting.direction,
            fragment.view_direction,
            normal,
        );
        lobe * specular.sample(fragment.uv)
    }
}

impl PixelShader for BrdfShader<'_> {
    fn shade(&self, fragment: &VertexOut) -> ColorRgb {
        let normal = self.surface_normal(fragment);
        let observed_area = self.lighting.observed_area(normal);

        let lit = match self.mode {
            ShadingMode::ObservedArea => ColorRgb::gray(observed_area),
            ShadingMode::Diffuse => self.diffuse(fragment) * observed_area,
            ShadingMode::Specular => self.specular(fragment, normal) * observed_area,
            ShadingMode::Combined => {
                self.diffuse(fragment) * observed_area + self.specular(fragment, normal)
            }
        };

        lit + self.lighting.ambient
    }
}

/// Remaps the fragment depth from `[min, max]` to a gray level.
///
/// Device depth crowds towards 1.0, so the default window is narrow.
#[derive(Debug, Clone, Copy)]
pub struct DepthShader {
    min: f32,
    max: f32,
}

impl Default for DepthShader {
    fn default() -> Self {
        Self::new(0.997, 1.0)
    }
}

impl DepthShader {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    #[inline]
    fn remap(&self, depth: f32) -> f32 {
        ((depth - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }
}

impl PixelShader for DepthShader {
    #[inline]
    fn shade(&self, fragment: &VertexOut) -> ColorRgb {
        ColorRgb::gray(self.remap(fragment.position.z))
    }
}
