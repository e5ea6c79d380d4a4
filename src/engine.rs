//! Core rendering engine.
//!
//! The [`Engine`] owns the camera, the meshes, the scene lighting and the
//! frame buffer, and runs the per-frame pipeline:
//!
//! ```text
//! transform vertices -> map to screen -> assemble triangles -> reject
//!   -> rasterize (coverage, depth, interpolation) -> shade -> saturate
//! ```
//!
//! Render toggles are plain state flips read by the next [`Engine::render`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::info;

use crate::camera::{Camera, CameraInput};
use crate::colors::{self, ColorRgb, PixelFormat};
use crate::error::LoadError;
use crate::light::SceneLighting;
use crate::math::vec2::Vec2;
use crate::mesh::{Material, Mesh, ObjOptions};
use crate::render::rasterizer::{self, fill_bounding_box};
use crate::render::{BrdfShader, DepthShader, EdgeFunctionRasterizer, FrameBuffer, Triangles};
use crate::texture::Texture;

pub use crate::render::ShadingMode;

pub const DEFAULT_OUTPUT_PATH: &str = "Rasterizer_ColorBuffer.bmp";

/// Per-frame render switches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSettings {
    /// Paint triangle bounding boxes instead of shading.
    pub show_bounding_boxes: bool,
    /// Show remapped depth instead of the BRDF.
    pub show_depth_buffer: bool,
    pub is_rotating: bool,
    pub use_normal_mapping: bool,
    pub shading_mode: ShadingMode,
    pub depth_remap_min: f32,
    pub depth_remap_max: f32,
    /// Mesh spin in radians per second.
    pub rotation_speed: f32,
    pub background: ColorRgb,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            show_bounding_boxes: false,
            show_depth_buffer: false,
            is_rotating: true,
            use_normal_mapping: true,
            shading_mode: ShadingMode::default(),
            depth_remap_min: 0.997,
            depth_remap_max: 1.0,
            rotation_speed: 1.0,
            background: colors::BACKGROUND,
        }
    }
}

/// What to load for one textured mesh.
#[derive(Debug, Clone, Default)]
pub struct SceneDescription {
    pub mesh_path: PathBuf,
    pub diffuse_map: Option<PathBuf>,
    pub normal_map: Option<PathBuf>,
    pub specular_map: Option<PathBuf>,
    pub gloss_map: Option<PathBuf>,
    pub obj_options: ObjOptions,
}

pub struct Engine {
    framebuffer: FrameBuffer,
    rasterizer: EdgeFunctionRasterizer,
    screen_vertices: Vec<Vec2>,
    camera: Camera,
    meshes: Vec<Mesh>,
    lighting: SceneLighting,
    settings: RenderSettings,
    output_path: PathBuf,
}

impl Engine {
    pub fn new(width: u32, height: u32, format: PixelFormat, camera: Camera) -> Self {
        Self {
            framebuffer: FrameBuffer::new(width, height, format),
            rasterizer: EdgeFunctionRasterizer::new(),
            screen_vertices: Vec::new(),
            camera,
            meshes: Vec::new(),
            lighting: SceneLighting::default(),
            settings: RenderSettings::default(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
        }
    }

    /// Loads the mesh and its textures and adds it to the scene.
    ///
    /// Any missing or undecodable file aborts the load; nothing is added.
    /// A path used for several maps is decoded once and shared.
    pub fn load_scene(&mut self, scene: &SceneDescription) -> Result<(), LoadError> {
        let mut cache: HashMap<PathBuf, Rc<Texture>> = HashMap::new();
        let mut load = |path: &Option<PathBuf>| -> Result<Option<Rc<Texture>>, LoadError> {
            let Some(path) = path else {
                return Ok(None);
            };
            if let Some(texture) = cache.get(path) {
                return Ok(Some(Rc::clone(texture)));
            }
            let texture = Rc::new(Texture::from_file(path)?);
            cache.insert(path.clone(), Rc::clone(&texture));
            Ok(Some(texture))
        };

        let material = Material {
            diffuse: load(&scene.diffuse_map)?,
            normal: load(&scene.normal_map)?,
            specular: load(&scene.specular_map)?,
            gloss: load(&scene.gloss_map)?,
            ..Default::default()
        };
        let mesh = Mesh::from_obj(&scene.mesh_path, scene.obj_options)?.with_material(material);

        self.add_mesh(mesh);
        Ok(())
    }

    pub fn add_mesh(&mut self, mesh: Mesh) {
        self.meshes.push(mesh);
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn meshes_mut(&mut self) -> &mut [Mesh] {
        &mut self.meshes
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    pub fn lighting(&self) -> &SceneLighting {
        &self.lighting
    }

    pub fn set_lighting(&mut self, lighting: SceneLighting) {
        self.lighting = lighting;
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut RenderSettings {
        &mut self.settings
    }

    pub fn set_output_path<P: Into<PathBuf>>(&mut self, path: P) {
        self.output_path = path.into();
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.framebuffer
    }

    /// Returns the rendered frame as bytes in the display's pixel format.
    pub fn frame_buffer(&self) -> &[u8] {
        self.framebuffer.as_bytes()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.framebuffer.resize(width, height);
        self.camera.set_aspect_ratio(width as f32 / height.max(1) as f32);
    }

    // =========================================================================
    // Toggles
    // =========================================================================

    pub fn toggle_bounding_boxes(&mut self) {
        self.settings.show_bounding_boxes = !self.settings.show_bounding_boxes;
        info!("Bounding box view: {}", on_off(self.settings.show_bounding_boxes));
    }

    pub fn toggle_depth_buffer(&mut self) {
        self.settings.show_depth_buffer = !self.settings.show_depth_buffer;
        info!("Depth buffer view: {}", on_off(self.settings.show_depth_buffer));
    }

    pub fn toggle_rotation(&mut self) {
        self.settings.is_rotating = !self.settings.is_rotating;
        info!("Rotation: {}", on_off(self.settings.is_rotating));
    }

    pub fn toggle_normal_mapping(&mut self) {
        self.settings.use_normal_mapping = !self.settings.use_normal_mapping;
        info!("Normal mapping: {}", on_off(self.settings.use_normal_mapping));
    }

    pub fn cycle_shading_mode(&mut self) {
        self.settings.shading_mode = self.settings.shading_mode.next();
        info!("Shading mode: {}", self.settings.shading_mode);
    }

    // =========================================================================
    // Frame
    // =========================================================================

    /// Advance camera and animation by `delta_time` seconds.
    pub fn update(&mut self, input: &CameraInput, delta_time: f32) {
        self.camera = self.camera.clone().update(input, delta_time);

        if self.settings.is_rotating {
            let angle = self.settings.rotation_speed * delta_time;
            for mesh in &mut self.meshes {
                mesh.rotate_y(angle);
            }
        }
    }

    /// Render the current frame into the frame buffer.
    pub fn render(&mut self) {
        let settings = self.settings;
        self.framebuffer.clear(settings.background);
        self.framebuffer.clear_depth();

        let view = *self.camera.view_matrix();
        let projection = *self.camera.projection_matrix();
        let camera_origin = self.camera.origin();
        let (width, height) = (self.framebuffer.width(), self.framebuffer.height());
        let depth_shader = DepthShader::new(settings.depth_remap_min, settings.depth_remap_max);

        for mesh in &mut self.meshes {
            mesh.transform_vertices(&view, &projection, camera_origin);
            rasterizer::to_screen_space(
                mesh.vertices_out(),
                width,
                height,
                &mut self.screen_vertices,
            );

            let shader = BrdfShader::new(
                &mesh.material,
                &self.lighting,
                settings.shading_mode,
                settings.use_normal_mapping,
            );
            let vertices = mesh.vertices_out();

            for triangle in Triangles::new(mesh.topology(), mesh.indices()) {
                if !rasterizer::is_renderable(vertices, triangle) {
                    continue;
                }
                let [a, b, c] = triangle;
                let points = [
                    self.screen_vertices[a],
                    self.screen_vertices[b],
                    self.screen_vertices[c],
                ];

                if settings.show_bounding_boxes {
                    fill_bounding_box(points, &mut self.framebuffer, colors::WHITE);
                    continue;
                }

                let corners = [&vertices[a], &vertices[b], &vertices[c]];
                if settings.show_depth_buffer {
                    self.rasterizer.rasterize_with_shader(
                        corners,
                        points,
                        &mut self.framebuffer,
                        &depth_shader,
                    );
                } else {
                    self.rasterizer.rasterize_with_shader(
                        corners,
                        points,
                        &mut self.framebuffer,
                        &shader,
                    );
                }
            }
        }
    }

    /// Writes the current color buffer to the output path as BMP.
    pub fn save_buffer_to_image(&self) -> bool {
        self.framebuffer.save_bmp(&self.output_path)
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "ON"
    } else {
        "OFF"
    }
}
