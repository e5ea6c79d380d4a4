//! Reflectance terms used by the pixel shader.
//!
//! All functions are pure; light and view directions follow the same
//! convention everywhere: `light` points from the light towards the surface,
//! `view` points from the camera towards the surface.

use std::f32::consts::PI;

use crate::colors::ColorRgb;
use crate::math::vec3::Vec3;

/// Lambert diffuse with a scalar reflectance `kd` and albedo `cd`.
#[inline]
pub fn lambert(kd: f32, cd: ColorRgb) -> ColorRgb {
    (cd * kd) / PI
}

/// Phong specular lobe.
///
/// Reflects the incident `light` direction about `normal` and compares it to
/// the reversed `view` direction. Returns black when the reflection points
/// away from the camera.
pub fn phong(ks: f32, exponent: f32, light: Vec3, view: Vec3, normal: Vec3) -> ColorRgb {
    let reflected = light.reflect(normal).normalize_or_zero();
    let cos_angle = (-reflected).dot(view);
    if cos_angle < 0.0 {
        return ColorRgb::default();
    }
    ColorRgb::gray(ks * cos_angle.powf(exponent))
}

/// Cosine between the surface normal and the direction towards the light,
/// clamped at zero for surfaces facing away.
#[inline]
pub fn observed_area(normal: Vec3, light: Vec3) -> f32 {
    normal.dot(-light).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn lambert_divides_by_pi() {
        let c = lambert(1.0, ColorRgb::new(1.0, 1.0, 1.0));
        assert_relative_eq!(c.r, 1.0 / PI, epsilon = 1e-6);
        assert_relative_eq!(c.g, 1.0 / PI, epsilon = 1e-6);
        assert_relative_eq!(c.b, 1.0 / PI, epsilon = 1e-6);
    }

    #[test]
    fn phong_peaks_on_mirror_direction() {
        // Light comes straight down, camera looks straight down: mirror hit
        let light = Vec3::new(0.0, -1.0, 0.0);
        let view = Vec3::new(0.0, -1.0, 0.0);
        let c = phong(0.5, 10.0, light, view, Vec3::UNIT_Y);
        assert_relative_eq!(c.r, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn phong_is_black_when_reflection_points_away() {
        let light = Vec3::new(0.0, -1.0, 0.0);
        let view = Vec3::new(0.0, 1.0, 0.0);
        assert_eq!(phong(1.0, 2.0, light, view, Vec3::UNIT_Y), ColorRgb::default());
    }

    #[test]
    fn observed_area_clamps_backfaces() {
        let light = Vec3::new(0.0, 0.0, 1.0);
        assert_relative_eq!(observed_area(Vec3::new(0.0, 0.0, -1.0), light), 1.0);
        assert_eq!(observed_area(Vec3::new(0.0, 0.0, 1.0), light), 0.0);
    }
}
