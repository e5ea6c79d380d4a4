//! Scene lighting passed explicitly to the pixel shader.

use crate::brdf;
use crate::colors::ColorRgb;
use crate::math::vec3::Vec3;

/// A single directional light plus a constant ambient term.
///
/// Directional lights are ideal for simulating distant light sources like the
/// sun, where all rays are effectively parallel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneLighting {
    /// The normalized direction the light is pointing (not where it comes from).
    pub direction: Vec3,
    /// Added to every shaded pixel regardless of shading mode.
    pub ambient: ColorRgb,
}

impl Default for SceneLighting {
    fn default() -> Self {
        Self {
            direction: Vec3::new(0.577, -0.577, 0.577),
            ambient: ColorRgb::gray(0.03),
        }
    }
}

impl SceneLighting {
    /// Create a light pointing in the given direction.
    /// The direction will be normalized automatically.
    pub fn new(direction: Vec3, ambient: ColorRgb) -> Self {
        Self {
            direction: direction.normalize_or_zero(),
            ambient,
        }
    }

    /// Cosine term for a surface normal, in `[0, 1]`.
    pub fn observed_area(&self, normal: Vec3) -> f32 {
        brdf::observed_area(normal, self.direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_illumination() {
        // Light pointing toward -Z, normal facing +Z (toward the light)
        let light = SceneLighting::new(Vec3::new(0.0, 0.0, -1.0), ColorRgb::default());
        assert!((light.observed_area(Vec3::UNIT_Z) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_no_illumination() {
        let light = SceneLighting::new(Vec3::new(0.0, 0.0, -1.0), ColorRgb::default());
        assert_eq!(light.observed_area(Vec3::new(0.0, 0.0, -1.0)), 0.0);
    }

    #[test]
    fn test_angled_illumination() {
        // Light pointing straight down (-Y), normal at 45 degrees
        let light = SceneLighting::new(Vec3::new(0.0, -10.0, 0.0), ColorRgb::default());
        let normal = Vec3::new(0.0, 1.0, 1.0).normalize();
        assert!((light.observed_area(normal) - 0.707).abs() < 0.01);
    }
}
