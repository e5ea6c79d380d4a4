//! Triangle setup for the rasterizer.
//!
//! Turns a mesh's index buffer into triangles, rejects the ones that must not
//! be drawn, and maps NDC positions to pixel coordinates. Coverage, depth and
//! interpolation live in [`edgefunction`].

mod edgefunction;
mod shader;

pub use edgefunction::{
    barycentric, edge_function, fill_bounding_box, interpolate_depth, interpolate_fragment,
    EdgeFunctionRasterizer,
};
pub use shader::{BrdfShader, DepthShader, PixelShader, ShadingMode};

use crate::math::vec2::Vec2;
use crate::mesh::{PrimitiveTopology, VertexOut};

/// Maps an NDC position to pixel coordinates. `y` is flipped so that +1 is
/// the top row.
#[inline]
pub fn ndc_to_screen(ndc_x: f32, ndc_y: f32, width: u32, height: u32) -> Vec2 {
    Vec2::new(
        (ndc_x + 1.0) * 0.5 * width as f32,
        (1.0 - ndc_y) * 0.5 * height as f32,
    )
}

/// Maps every transformed vertex to pixel coordinates, reusing `out`.
pub fn to_screen_space(vertices: &[VertexOut], width: u32, height: u32, out: &mut Vec<Vec2>) {
    out.clear();
    out.extend(
        vertices
            .iter()
            .map(|v| ndc_to_screen(v.position.x, v.position.y, width, height)),
    );
}

/// Iterator over the vertex indices of each triangle in an index buffer.
///
/// Strips alternate their winding: for every odd triangle the first and
/// last index are swapped so all triangles keep the same orientation.
/// Indices are yielded as stored; [`is_renderable`] checks them.
pub struct Triangles<'a> {
    indices: &'a [u32],
    topology: PrimitiveTopology,
    next: usize,
}

impl<'a> Triangles<'a> {
    pub fn new(topology: PrimitiveTopology, indices: &'a [u32]) -> Self {
        Self {
            indices,
            topology,
            next: 0,
        }
    }
}

impl Iterator for Triangles<'_> {
    type Item = [usize; 3];

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.next;
        if start + 3 > self.indices.len() {
            return None;
        }

        let indices = self.indices;
        let idx = |i: usize| indices[i] as usize;
        let triangle = match self.topology {
            PrimitiveTopology::TriangleList => {
                self.next += 3;
                [idx(start), idx(start + 1), idx(start + 2)]
            }
            PrimitiveTopology::TriangleStrip => {
                self.next += 1;
                if start % 2 == 1 {
                    [idx(start + 2), idx(start + 1), idx(start)]
                } else {
                    [idx(start), idx(start + 1), idx(start + 2)]
                }
            }
        };
        Some(triangle)
    }
}

/// Whether a triangle may be rasterized at all.
///
/// Rejects out-of-range and repeated indices (strip restarts use repeated
/// indices) and triangles with any vertex outside the NDC square. Triangles
/// crossing the screen edge are dropped whole, not clipped.
pub fn is_renderable(vertices: &[VertexOut], triangle: [usize; 3]) -> bool {
    let [a, b, c] = triangle;
    if a == b || b == c || a == c {
        return false;
    }

    triangle.iter().all(|&i| {
        vertices
            .get(i)
            .map(VertexOut::is_in_ndc_bounds)
            .unwrap_or(false)
    })
}

/// Pixel rectangle `[min, max)` covering a screen-space triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl BoundingBox {
    /// Vertex extents grown by one pixel on every side, clamped to the
    /// framebuffer.
    pub fn from_triangle(points: [Vec2; 3], width: u32, height: u32) -> Self {
        let min = points[0].min(points[1]).min(points[2]);
        let max = points[0].max(points[1]).max(points[2]);

        let clamp_x = |v: f32| v.clamp(0.0, width as f32) as u32;
        let clamp_y = |v: f32| v.clamp(0.0, height as f32) as u32;

        Self {
            min_x: clamp_x(min.x - 1.0),
            min_y: clamp_y(min.y - 1.0),
            max_x: clamp_x(max.x + 1.0),
            max_y: clamp_y(max.y + 1.0),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min_x >= self.max_x || self.min_y >= self.max_y
    }
}
