//! Edge function-based triangle rasterization.
//!
//! # Algorithm Overview
//!
//! 1. Compute a bounding box around the triangle
//! 2. For each pixel center in the box, evaluate three edge functions
//! 3. The pixel is covered if all three are non-negative
//!
//! # Edge Function
//!
//! For the edge `A -> B` and a point `P`:
//!
//! ```text
//! E(A, B, P) = (P - A) × (A - B)
//! ```
//!
//! Weight `i` uses the edge opposite to vertex `i`. Dividing each weight by
//! the signed area `E(v0, v1, v2)` yields barycentric coordinates summing to
//! one. In screen space (y down) triangles wound clockwise on screen have a
//! positive area; the opposite winding never passes the sign test, which is
//! the only culling performed.
//!
//! # Interpolation
//!
//! Depth and attributes are interpolated perspective-correctly:
//!
//! ```text
//! depth = 1 / Σ(λᵢ / zᵢ)           zᵢ = NDC depth
//! w     = 1 / Σ(λᵢ / wᵢ)           wᵢ = clip w (view depth)
//! attr  = w · Σ(λᵢ · attrᵢ / wᵢ)
//! ```
//!
//! # References
//!
//! - Juan Pineda, "A Parallel Algorithm for Polygon Rasterization" (1988)
//! - Scratchapixel: <https://www.scratchapixel.com/lessons/3d-basic-rendering/rasterization-practical-implementation>

use super::shader::PixelShader;
use super::BoundingBox;
use crate::colors::ColorRgb;
use crate::math::vec2::Vec2;
use crate::math::vec4::Vec4;
use crate::mesh::VertexOut;
use crate::render::framebuffer::FrameBuffer;

/// Computes the edge function value for point P relative to edge (A -> B).
///
/// # Returns
///
/// - Positive: P is on the inner side of AB for a clockwise screen triangle
/// - Negative: P is on the outer side
/// - Zero: P lies exactly on the edge AB
#[inline]
pub fn edge_function(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (p - a).cross(a - b)
}

/// Barycentric coordinates of `p`, or `None` if the triangle is degenerate or
/// `p` is not covered.
#[inline]
pub fn barycentric(points: [Vec2; 3], p: Vec2) -> Option<[f32; 3]> {
    let [v0, v1, v2] = points;
    let area = edge_function(v0, v1, v2);
    if area.abs() < f32::EPSILON {
        return None;
    }
    covered_weights(points, 1.0 / area, p)
}

/// Coverage test and normalized weights for a triangle whose inverse signed
/// area is already known.
#[inline]
fn covered_weights(points: [Vec2; 3], inv_area: f32, p: Vec2) -> Option<[f32; 3]> {
    let [v0, v1, v2] = points;
    let w0 = edge_function(v1, v2, p);
    let w1 = edge_function(v2, v0, p);
    let w2 = edge_function(v0, v1, p);
    if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
        return None;
    }
    Some([w0 * inv_area, w1 * inv_area, w2 * inv_area])
}

/// Perspective-correct depth from the vertices' NDC depth.
///
/// Returns `None` outside `[0, 1]`, including NaN.
#[inline]
pub fn interpolate_depth(vertices: [&VertexOut; 3], lambda: [f32; 3]) -> Option<f32> {
    let inv_depth = lambda[0] / vertices[0].position.z
        + lambda[1] / vertices[1].position.z
        + lambda[2] / vertices[2].position.z;
    let depth = 1.0 / inv_depth;
    (0.0..=1.0).contains(&depth).then_some(depth)
}

/// Builds the fragment handed to the pixel shader.
///
/// `position` becomes `(pixel.x, pixel.y, depth, w)`. Normal, tangent and
/// view direction are renormalized. Returns `None` when the interpolated w
/// is not a positive finite number.
pub fn interpolate_fragment(
    vertices: [&VertexOut; 3],
    lambda: [f32; 3],
    pixel: Vec2,
    depth: f32,
) -> Option<VertexOut> {
    // Barycentrics pre-divided by each vertex's w
    let weights = [
        lambda[0] / vertices[0].position.w,
        lambda[1] / vertices[1].position.w,
        lambda[2] / vertices[2].position.w,
    ];
    let w = 1.0 / (weights[0] + weights[1] + weights[2]);
    if !w.is_finite() || w <= 0.0 {
        return None;
    }
    let weights = [weights[0] * w, weights[1] * w, weights[2] * w];
    let [a, b, c] = vertices;

    Some(VertexOut {
        position: Vec4::new(pixel.x, pixel.y, depth, w),
        color: a.color * weights[0] + b.color * weights[1] + c.color * weights[2],
        uv: a.uv * weights[0] + b.uv * weights[1] + c.uv * weights[2],
        normal: (a.normal * weights[0] + b.normal * weights[1] + c.normal * weights[2])
            .normalize_or_zero(),
        tangent: (a.tangent * weights[0] + b.tangent * weights[1] + c.tangent * weights[2])
            .normalize_or_zero(),
        view_direction: (a.view_direction * weights[0]
            + b.view_direction * weights[1]
            + c.view_direction * weights[2])
            .normalize_or_zero(),
    })
}

/// Paints the padded bounding box of a triangle. Debug visualization only:
/// no coverage, depth or shading.
pub fn fill_bounding_box(points: [Vec2; 3], buffer: &mut FrameBuffer, color: ColorRgb) {
    let bb = BoundingBox::from_triangle(points, buffer.width(), buffer.height());
    for y in bb.min_y..bb.max_y {
        for x in bb.min_x..bb.max_x {
            buffer.set_pixel(x, y, color);
        }
    }
}

/// Triangle rasterizer using the edge function algorithm.
///
/// Iterates all pixels in the triangle's bounding box, tests coverage, runs
/// the depth test and hands surviving fragments to a [`PixelShader`].
/// Depth is written before shading; a fragment whose color turns out
/// non-finite is discarded but keeps its depth.
#[derive(Debug, Default, Clone, Copy)]
pub struct EdgeFunctionRasterizer;

impl EdgeFunctionRasterizer {
    /// Creates a new edge function rasterizer instance.
    pub fn new() -> Self {
        EdgeFunctionRasterizer {}
    }

    /// Rasterize one triangle.
    ///
    /// `points` are the screen positions of `vertices`, in the same order.
    pub fn rasterize_with_shader<S: PixelShader>(
        &self,
        vertices: [&VertexOut; 3],
        points: [Vec2; 3],
        buffer: &mut FrameBuffer,
        shader: &S,
    ) {
        let [v0, v1, v2] = points;

        // ─────────────────────────────────────────────────────────────────────
        // Step 1: Signed area (2x triangle area)
        // ─────────────────────────────────────────────────────────────────────
        let area = edge_function(v0, v1, v2);
        if area.abs() < f32::EPSILON {
            return; // Degenerate triangle
        }
        let inv_area = 1.0 / area;

        // ─────────────────────────────────────────────────────────────────────
        // Step 2: Bounding box
        // ─────────────────────────────────────────────────────────────────────
        let bb = BoundingBox::from_triangle(points, buffer.width(), buffer.height());

        // ─────────────────────────────────────────────────────────────────────
        // Step 3: Iterate over all pixels in bounding box
        // ─────────────────────────────────────────────────────────────────────
        for y in bb.min_y..bb.max_y {
            for x in bb.min_x..bb.max_x {
                // Sample at pixel center
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);

                let Some(lambda) = covered_weights(points, inv_area, p) else {
                    continue;
                };

                let Some(depth) = interpolate_depth(vertices, lambda) else {
                    continue;
                };
                if !buffer.depth_test_and_set(x, y, depth) {
                    continue;
                }

                let Some(fragment) = interpolate_fragment(vertices, lambda, p, depth) else {
                    continue;
                };
                let color = shader.shade(&fragment);
                if color.is_finite() {
                    buffer.set_pixel(x, y, color.max_to_one());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::{self, PixelFormat};
    use crate::math::vec3::Vec3;
    use approx::assert_relative_eq;

    /// Clockwise on screen (y down), so the area is positive.
    fn screen_triangle() -> [Vec2; 3] {
        [
            Vec2::new(10.0, 0.0),
            Vec2::new(20.0, 20.0),
            Vec2::new(0.0, 20.0),
        ]
    }

    fn vertex(z: f32, w: f32, uv: Vec2, color: ColorRgb) -> VertexOut {
        VertexOut {
            position: Vec4::new(0.0, 0.0, z, w),
            color,
            uv,
            normal: Vec3::new(0.0, 0.0, -1.0),
            tangent: Vec3::UNIT_X,
            view_direction: Vec3::UNIT_Z,
        }
    }

    /// Paints every covered pixel white.
    struct Solid;

    impl PixelShader for Solid {
        fn shade(&self, _fragment: &VertexOut) -> ColorRgb {
            colors::WHITE
        }
    }

    #[test]
    fn barycentrics_sum_to_one_inside() {
        let lambda = barycentric(screen_triangle(), Vec2::new(10.0, 12.0)).unwrap();
        assert_relative_eq!(lambda.iter().sum::<f32>(), 1.0, epsilon = 1e-6);
        assert!(lambda.iter().all(|l| *l >= 0.0));
    }

    #[test]
    fn barycentric_is_one_at_its_vertex() {
        let points = screen_triangle();
        for (i, p) in points.iter().enumerate() {
            let lambda = barycentric(points, *p).unwrap();
            assert_relative_eq!(lambda[i], 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn outside_and_degenerate_are_not_covered() {
        assert_eq!(barycentric(screen_triangle(), Vec2::new(0.0, 0.0)), None);
        let line = [Vec2::new(0.0, 0.0), Vec2::new(5.0, 5.0), Vec2::new(10.0, 10.0)];
        assert_eq!(barycentric(line, Vec2::new(5.0, 5.0)), None);
    }

    #[test]
    fn opposite_winding_is_not_covered() {
        let [a, b, c] = screen_triangle();
        assert_eq!(barycentric([a, c, b], Vec2::new(10.0, 12.0)), None);
    }

    #[test]
    fn fragment_at_vertex_reproduces_its_attributes() {
        let a = vertex(0.5, 2.0, Vec2::new(0.0, 0.0), ColorRgb::new(1.0, 0.0, 0.0));
        let b = vertex(0.9, 8.0, Vec2::new(1.0, 0.0), ColorRgb::new(0.0, 1.0, 0.0));
        let c = vertex(0.7, 4.0, Vec2::new(0.0, 1.0), ColorRgb::new(0.0, 0.0, 1.0));

        let lambda = [0.0, 1.0, 0.0];
        let depth = interpolate_depth([&a, &b, &c], lambda).unwrap();
        assert_relative_eq!(depth, 0.9, epsilon = 1e-6);

        let fragment =
            interpolate_fragment([&a, &b, &c], lambda, Vec2::new(3.5, 4.5), depth).unwrap();
        assert_relative_eq!(fragment.position.w, 8.0, epsilon = 1e-5);
        assert_relative_eq!(fragment.uv.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(fragment.color.g, 1.0, epsilon = 1e-6);
        assert_relative_eq!(fragment.normal.z, -1.0, epsilon = 1e-6);
        assert_eq!(fragment.position.x, 3.5);
    }

    #[test]
    fn attributes_favor_the_nearer_vertex() {
        let near = vertex(0.2, 1.0, Vec2::new(0.0, 0.0), colors::WHITE);
        let far = vertex(0.9, 9.0, Vec2::new(1.0, 0.0), colors::WHITE);
        let other = vertex(0.9, 9.0, Vec2::new(1.0, 0.0), colors::WHITE);

        // Screen-space midpoint between the near vertex and the far edge
        let lambda = [0.5, 0.25, 0.25];
        let fragment =
            interpolate_fragment([&near, &far, &other], lambda, Vec2::ZERO, 0.5).unwrap();
        // Linear would give 0.5; perspective-correct leans towards the near uv
        assert_relative_eq!(fragment.uv.x, 0.1, epsilon = 1e-5);
    }

    #[test]
    fn depth_outside_unit_range_is_rejected() {
        let a = vertex(-0.5, 1.0, Vec2::ZERO, colors::WHITE);
        let b = vertex(-0.5, 1.0, Vec2::ZERO, colors::WHITE);
        let c = vertex(-0.5, 1.0, Vec2::ZERO, colors::WHITE);
        assert_eq!(interpolate_depth([&a, &b, &c], [0.2, 0.3, 0.5]), None);
    }

    #[test]
    fn vertices_on_both_sides_of_the_eye_give_no_fragment() {
        let front = vertex(0.5, 1.0, Vec2::ZERO, colors::WHITE);
        let behind = vertex(0.5, -1.0, Vec2::ZERO, colors::WHITE);
        let triangle = [&front, &behind, &front];

        // Σ λ/w < 0
        let lambda = [0.2, 0.6, 0.2];
        assert!(interpolate_fragment(triangle, lambda, Vec2::ZERO, 0.5).is_none());
        // Σ λ/w = 0, w would be infinite
        let lambda = [0.25, 0.5, 0.25];
        assert!(interpolate_fragment(triangle, lambda, Vec2::ZERO, 0.5).is_none());
    }

    #[test]
    fn non_finite_color_is_dropped_but_depth_is_kept() {
        struct Poisoned;

        impl PixelShader for Poisoned {
            fn shade(&self, _fragment: &VertexOut) -> ColorRgb {
                ColorRgb::new(f32::NAN, 0.0, 0.0)
            }
        }

        let mut buffer = FrameBuffer::new(32, 32, PixelFormat::ARGB8888);
        buffer.clear(colors::BLACK);
        let v = vertex(0.5, 1.0, Vec2::ZERO, colors::WHITE);

        EdgeFunctionRasterizer::new().rasterize_with_shader(
            [&v, &v, &v],
            screen_triangle(),
            &mut buffer,
            &Poisoned,
        );

        let black = PixelFormat::ARGB8888.pack(colors::BLACK);
        assert_eq!(buffer.get_pixel(10, 12), Some(black));
        assert_relative_eq!(buffer.depth_at(10, 12).unwrap(), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn rasterizer_fills_covered_pixels_only() {
        let mut buffer = FrameBuffer::new(32, 32, PixelFormat::ARGB8888);
        buffer.clear(colors::BLACK);
        let v = vertex(0.5, 1.0, Vec2::ZERO, colors::WHITE);

        EdgeFunctionRasterizer::new().rasterize_with_shader(
            [&v, &v, &v],
            screen_triangle(),
            &mut buffer,
            &Solid,
        );

        let white = PixelFormat::ARGB8888.pack(colors::WHITE);
        let black = PixelFormat::ARGB8888.pack(colors::BLACK);
        assert_eq!(buffer.get_pixel(10, 12), Some(white));
        assert_eq!(buffer.get_pixel(1, 1), Some(black));
        assert_eq!(buffer.get_pixel(25, 10), Some(black));
        assert_relative_eq!(buffer.depth_at(10, 12).unwrap(), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn bounding_box_fill_ignores_coverage() {
        let mut buffer = FrameBuffer::new(32, 32, PixelFormat::ARGB8888);
        buffer.clear(colors::BLACK);
        fill_bounding_box(screen_triangle(), &mut buffer, colors::WHITE);

        let white = PixelFormat::ARGB8888.pack(colors::WHITE);
        // Corner outside the triangle, inside its box
        assert_eq!(buffer.get_pixel(1, 1), Some(white));
        assert_eq!(buffer.get_pixel(20, 20), Some(white));
        assert_eq!(buffer.get_pixel(22, 22), Some(PixelFormat::ARGB8888.pack(colors::BLACK)));
        // Depth untouched
        assert_eq!(buffer.depth_at(1, 1), Some(f32::INFINITY));
    }
}
