//! Mesh geometry, per-frame transformed vertices and material bindings.

use std::path::Path;
use std::rc::Rc;

use log::{info, warn};

use crate::colors::{self, ColorRgb};
use crate::error::LoadError;
use crate::math::mat4::Mat4;
use crate::math::vec2::Vec2;
use crate::math::vec3::Vec3;
use crate::math::vec4::Vec4;
use crate::texture::Texture;

/// Object-space vertex as authored or parsed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub color: ColorRgb,
    pub uv: Vec2,
    pub normal: Vec3,
    pub tangent: Vec3,
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            color: colors::WHITE,
            uv: Vec2::ZERO,
            normal: Vec3::ZERO,
            tangent: Vec3::ZERO,
        }
    }
}

impl Vertex {
    pub fn new(position: Vec3, color: ColorRgb) -> Self {
        Self {
            position,
            color,
            ..Default::default()
        }
    }
}

/// Vertex after the transform pass.
///
/// `position` holds NDC x/y/z after the perspective divide while `w` keeps
/// the clip-space w (view depth) for perspective-correct interpolation.
/// Normal and tangent are in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VertexOut {
    pub position: Vec4,
    pub color: ColorRgb,
    pub uv: Vec2,
    pub normal: Vec3,
    pub tangent: Vec3,
    pub view_direction: Vec3,
}

impl Default for VertexOut {
    fn default() -> Self {
        Self {
            position: Vec4::ZERO,
            color: colors::WHITE,
            uv: Vec2::ZERO,
            normal: Vec3::ZERO,
            tangent: Vec3::ZERO,
            view_direction: Vec3::ZERO,
        }
    }
}

impl VertexOut {
    /// True when the vertex lies inside the `[-1, 1]` NDC square.
    ///
    /// NaN coordinates (from a degenerate w) never pass.
    #[inline]
    pub fn is_in_ndc_bounds(&self) -> bool {
        (-1.0..=1.0).contains(&self.position.x) && (-1.0..=1.0).contains(&self.position.y)
    }
}

/// How the index list is assembled into triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrimitiveTopology {
    /// Every three indices form one triangle.
    #[default]
    TriangleList,
    /// Each index after the second forms a triangle with the previous two.
    TriangleStrip,
}

/// Textures and reflectance constants of a mesh.
///
/// Every texture is optional; the shader documents the fallback used when one
/// is missing. Textures are shared, so several meshes can reference the same
/// decoded image.
#[derive(Debug, Clone)]
pub struct Material {
    pub diffuse: Option<Rc<Texture>>,
    pub normal: Option<Rc<Texture>>,
    pub specular: Option<Rc<Texture>>,
    pub gloss: Option<Rc<Texture>>,
    /// Lambert reflectance coefficient.
    pub diffuse_reflectance: f32,
    /// Phong reflectance coefficient.
    pub specular_reflectance: f32,
    /// Phong exponent is `gloss.r * shininess`.
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            diffuse: None,
            normal: None,
            specular: None,
            gloss: None,
            diffuse_reflectance: 7.0,
            specular_reflectance: 1.0,
            shininess: 25.0,
        }
    }
}

/// Options for [`Mesh::from_obj`].
#[derive(Debug, Clone, Copy)]
pub struct ObjOptions {
    /// Convert right-handed OBJ data to left-handed space: negate z, flip v
    /// and reverse triangle winding.
    pub flip_axis_and_winding: bool,
}

impl Default for ObjOptions {
    fn default() -> Self {
        Self {
            flip_axis_and_winding: true,
        }
    }
}

pub struct Mesh {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    topology: PrimitiveTopology,
    world_matrix: Mat4,
    pub(crate) vertices_out: Vec<VertexOut>,
    pub material: Material,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>, topology: PrimitiveTopology) -> Self {
        Self {
            vertices,
            indices,
            topology,
            world_matrix: Mat4::IDENTITY,
            vertices_out: Vec::new(),
            material: Material::default(),
        }
    }

    /// Load every object of an OBJ file into a single triangle list.
    ///
    /// Tangents are generated from the UV layout.
    pub fn from_obj<P: AsRef<Path>>(path: P, options: ObjOptions) -> Result<Self, LoadError> {
        let path = path.as_ref();
        info!("Loading OBJ file: {}", path.display());

        let load_options = tobj::LoadOptions {
            triangulate: true,
            single_index: true, // Unifies indices for position/normal/UV
            ..Default::default()
        };
        let (models, _materials) =
            tobj::load_obj(path, &load_options).map_err(|source| LoadError::Obj {
                path: path.to_path_buf(),
                source,
            })?;

        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        for model in models {
            let mesh = &model.mesh;
            let base = vertices.len() as u32;
            let num_vertices = mesh.positions.len() / 3;

            let has_normals = mesh.normals.len() == mesh.positions.len();
            let has_texcoords = mesh.texcoords.len() / 2 == num_vertices;
            if !has_normals {
                warn!("Mesh '{}' is missing normals. Using default (0, 1, 0).", model.name);
            }
            if !has_texcoords {
                warn!("Mesh '{}' is missing texture coordinates.", model.name);
            }

            for i in 0..num_vertices {
                let mut position = Vec3::new(
                    mesh.positions[i * 3],
                    mesh.positions[i * 3 + 1],
                    mesh.positions[i * 3 + 2],
                );
                let mut normal = if has_normals {
                    Vec3::new(
                        mesh.normals[i * 3],
                        mesh.normals[i * 3 + 1],
                        mesh.normals[i * 3 + 2],
                    )
                } else {
                    Vec3::UNIT_Y
                };
                let mut uv = if has_texcoords {
                    Vec2::new(mesh.texcoords[i * 2], mesh.texcoords[i * 2 + 1])
                } else {
                    Vec2::ZERO
                };

                if options.flip_axis_and_winding {
                    position.z = -position.z;
                    normal.z = -normal.z;
                    uv.y = 1.0 - uv.y;
                }

                vertices.push(Vertex {
                    position,
                    uv,
                    normal: normal.normalize_or_zero(),
                    ..Default::default()
                });
            }

            for triangle in mesh.indices.chunks_exact(3) {
                let [a, b, c] = [triangle[0] + base, triangle[1] + base, triangle[2] + base];
                if options.flip_axis_and_winding {
                    indices.extend_from_slice(&[a, c, b]);
                } else {
                    indices.extend_from_slice(&[a, b, c]);
                }
            }
        }

        if indices.is_empty() {
            return Err(LoadError::EmptyMesh {
                path: path.to_path_buf(),
            });
        }

        generate_tangents(&mut vertices, &indices);

        info!(
            "OBJ loaded successfully. Total vertices: {}, Total indices: {}",
            vertices.len(),
            indices.len()
        );

        Ok(Self::new(vertices, indices, PrimitiveTopology::TriangleList))
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn topology(&self) -> PrimitiveTopology {
        self.topology
    }

    pub fn world_matrix(&self) -> &Mat4 {
        &self.world_matrix
    }

    /// Vertices produced by the most recent transform pass.
    pub fn vertices_out(&self) -> &[VertexOut] {
        &self.vertices_out
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    /// Moves the mesh in world space, after any accumulated rotation.
    pub fn translate(&mut self, t: Vec3) {
        self.world_matrix = self.world_matrix * Mat4::translation(t.x, t.y, t.z);
    }

    /// Spins the mesh around its own Y axis. The world position is kept.
    pub fn rotate_y(&mut self, angle: f32) {
        self.world_matrix = Mat4::rotation_y(angle) * self.world_matrix;
    }

    /// Transforms every vertex into clip space and applies the perspective
    /// divide to x/y/z, keeping clip w.
    ///
    /// The previous frame's output is discarded.
    pub fn transform_vertices(&mut self, view: &Mat4, projection: &Mat4, camera_origin: Vec3) {
        let world = self.world_matrix;
        let world_view_projection = world * *view * *projection;
        let camera_point = Vec4::from_vec3(camera_origin, 1.0);

        self.vertices_out.clear();
        self.vertices_out.reserve(self.vertices.len());

        for vertex in &self.vertices {
            let clip = world_view_projection.transform_point(Vec4::from(vertex.position));
            let view_direction = (clip - camera_point).to_vec3();

            // Degenerate w poisons the vertex with NaN so it fails the NDC test
            let inv_w = if clip.w.abs() > f32::EPSILON {
                1.0 / clip.w
            } else {
                f32::NAN
            };

            self.vertices_out.push(VertexOut {
                position: Vec4::new(clip.x * inv_w, clip.y * inv_w, clip.z * inv_w, clip.w),
                color: vertex.color,
                uv: vertex.uv,
                normal: world.transform_vector(vertex.normal),
                tangent: world.transform_vector(vertex.tangent),
                view_direction,
            });
        }
    }
}

/// Computes per-vertex tangents for a triangle list from UV gradients.
///
/// Contributions of all adjacent triangles are summed, then made orthogonal
/// to the vertex normal.
pub fn generate_tangents(vertices: &mut [Vertex], indices: &[u32]) {
    let mut accumulated = vec![Vec3::ZERO; vertices.len()];

    for triangle in indices.chunks_exact(3) {
        let [i0, i1, i2] = [
            triangle[0] as usize,
            triangle[1] as usize,
            triangle[2] as usize,
        ];
        if i0 >= vertices.len() || i1 >= vertices.len() || i2 >= vertices.len() {
            continue;
        }

        let (v0, v1, v2) = (&vertices[i0], &vertices[i1], &vertices[i2]);
        let edge0 = v1.position - v0.position;
        let edge1 = v2.position - v0.position;
        let diff_x = Vec2::new(v1.uv.x - v0.uv.x, v2.uv.x - v0.uv.x);
        let diff_y = Vec2::new(v1.uv.y - v0.uv.y, v2.uv.y - v0.uv.y);

        let det = diff_x.cross(diff_y);
        if det.abs() < f32::EPSILON {
            continue;
        }
        let tangent = (edge0 * diff_y.y - edge1 * diff_y.x) / det;

        accumulated[i0] += tangent;
        accumulated[i1] += tangent;
        accumulated[i2] += tangent;
    }

    for (vertex, tangent) in vertices.iter_mut().zip(accumulated) {
        let n = vertex.normal;
        let orthogonal = (tangent - n * n.dot(tangent)).normalize_or_zero();
        vertex.tangent = if orthogonal == Vec3::ZERO {
            any_perpendicular(n)
        } else {
            orthogonal
        };
    }
}

fn any_perpendicular(n: Vec3) -> Vec3 {
    let helper = if n.x.abs() < 0.9 { Vec3::UNIT_X } else { Vec3::UNIT_Y };
    helper.cross(n).normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;

    fn quad_vertex(x: f32, y: f32, u: f32, v: f32) -> Vertex {
        Vertex {
            position: Vec3::new(x, y, 0.0),
            uv: Vec2::new(u, v),
            normal: Vec3::new(0.0, 0.0, -1.0),
            ..Default::default()
        }
    }

    #[test]
    fn tangents_follow_u_direction() {
        let mut vertices = vec![
            quad_vertex(0.0, 0.0, 0.0, 1.0),
            quad_vertex(1.0, 0.0, 1.0, 1.0),
            quad_vertex(0.0, 1.0, 0.0, 0.0),
        ];
        generate_tangents(&mut vertices, &[0, 1, 2]);
        for v in &vertices {
            assert_relative_eq!(v.tangent.x, 1.0, epsilon = 1e-5);
            assert_relative_eq!(v.tangent.dot(v.normal), 0.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn degenerate_uvs_still_get_a_perpendicular_tangent() {
        let mut vertices = vec![
            quad_vertex(0.0, 0.0, 0.0, 0.0),
            quad_vertex(1.0, 0.0, 0.0, 0.0),
            quad_vertex(0.0, 1.0, 0.0, 0.0),
        ];
        generate_tangents(&mut vertices, &[0, 1, 2]);
        for v in &vertices {
            assert_relative_eq!(v.tangent.magnitude(), 1.0, epsilon = 1e-5);
            assert_relative_eq!(v.tangent.dot(v.normal), 0.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn rotation_keeps_world_position() {
        let mut mesh = Mesh::new(vec![], vec![], PrimitiveTopology::TriangleList);
        mesh.rotate_y(std::f32::consts::FRAC_PI_2);
        mesh.translate(Vec3::new(0.0, 0.0, 10.0));
        mesh.rotate_y(0.3);
        assert_eq!(mesh.world_matrix().translation_part(), Vec3::new(0.0, 0.0, 10.0));
    }

    #[test]
    fn transform_keeps_w_and_divides_xyz() {
        let mut mesh = Mesh::new(
            vec![Vertex::new(Vec3::new(1.0, 2.0, 4.0), colors::WHITE)],
            vec![],
            PrimitiveTopology::TriangleList,
        );
        let projection = Mat4::perspective_fov_lh(1.0, 1.0, 0.1, 100.0);
        mesh.transform_vertices(&Mat4::IDENTITY, &projection, Vec3::ZERO);

        let out = mesh.vertices_out()[0];
        assert_relative_eq!(out.position.w, 4.0, epsilon = 1e-6);
        assert_relative_eq!(out.position.x, 0.25, epsilon = 1e-6);
        assert_relative_eq!(out.position.y, 0.5, epsilon = 1e-6);
        assert!(out.is_in_ndc_bounds());
    }

    #[test]
    fn zero_w_vertex_never_passes_bounds() {
        let mut mesh = Mesh::new(
            vec![Vertex::new(Vec3::new(0.0, 0.0, 0.0), colors::WHITE)],
            vec![],
            PrimitiveTopology::TriangleList,
        );
        let projection = Mat4::perspective_fov_lh(1.0, 1.0, 0.1, 100.0);
        mesh.transform_vertices(&Mat4::IDENTITY, &projection, Vec3::ZERO);
        assert!(!mesh.vertices_out()[0].is_in_ndc_bounds());
    }

    #[test]
    fn normals_use_world_matrix_only() {
        let mut mesh = Mesh::new(
            vec![Vertex {
                position: Vec3::new(0.0, 0.0, 5.0),
                normal: Vec3::UNIT_Z,
                ..Default::default()
            }],
            vec![],
            PrimitiveTopology::TriangleList,
        );
        mesh.rotate_y(std::f32::consts::FRAC_PI_2);
        let projection = Mat4::perspective_fov_lh(1.0, 1.0, 0.1, 100.0);
        mesh.transform_vertices(&Mat4::translation(0.0, 0.0, 3.0), &projection, Vec3::ZERO);

        let normal = mesh.vertices_out()[0].normal;
        assert_relative_eq!(normal.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(normal.z, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn loads_obj_and_flips_handedness() {
        let path = std::env::temp_dir().join("rustshade_mesh_test.obj");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "v 0 0 1\nv 1 0 1\nv 0 1 1\nvt 0 0\nvt 1 0\nvt 0 1\nvn 0 0 1\nf 1/1/1 2/2/1 3/3/1"
        )
        .unwrap();
        drop(file);

        let mesh = Mesh::from_obj(&path, ObjOptions::default()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(mesh.indices(), &[0, 2, 1]);
        assert_eq!(mesh.vertices()[0].position.z, -1.0);
        assert_eq!(mesh.vertices()[0].normal.z, -1.0);
        assert_eq!(mesh.vertices()[2].uv.y, 0.0);
        assert_eq!(mesh.topology(), PrimitiveTopology::TriangleList);
    }

    #[test]
    fn missing_obj_is_an_error() {
        let err = Mesh::from_obj("does/not/exist.obj", ObjOptions::default());
        assert!(matches!(err, Err(LoadError::Obj { .. })));
    }
}
