//! Command-line configuration.

use std::path::PathBuf;

use clap::Parser;

use crate::camera::Camera;
use crate::engine::{SceneDescription, DEFAULT_OUTPUT_PATH};
use crate::math::vec3::Vec3;
use crate::mesh::ObjOptions;

/// CPU triangle rasterizer with textured BRDF shading.
#[derive(Parser, Debug, Clone)]
#[command(name = "rustshade", version)]
pub struct Config {
    /// Window width in pixels
    #[arg(long, default_value_t = 640)]
    pub width: u32,

    /// Window height in pixels
    #[arg(long, default_value_t = 480)]
    pub height: u32,

    /// Vertical field of view in degrees
    #[arg(long, default_value_t = 45.0)]
    pub fov: f32,

    /// Camera start position as x,y,z
    #[arg(
        long,
        value_name = "X,Y,Z",
        value_delimiter = ',',
        num_args = 3,
        allow_negative_numbers = true,
        default_values_t = [0.0, 5.0, -64.0]
    )]
    pub camera_origin: Vec<f32>,

    /// OBJ mesh to render
    #[arg(long, value_name = "FILE", default_value = "resources/vehicle.obj")]
    pub mesh: PathBuf,

    #[arg(long, value_name = "FILE", default_value = "resources/vehicle_diffuse.png")]
    pub diffuse_map: PathBuf,

    #[arg(long, value_name = "FILE", default_value = "resources/vehicle_normal.png")]
    pub normal_map: PathBuf,

    #[arg(long, value_name = "FILE", default_value = "resources/vehicle_specular.png")]
    pub specular_map: PathBuf,

    #[arg(long, value_name = "FILE", default_value = "resources/vehicle_gloss.png")]
    pub gloss_map: PathBuf,

    /// Skip all texture maps and shade with vertex colors
    #[arg(long)]
    pub untextured: bool,

    /// Screenshot path
    #[arg(long, value_name = "FILE", default_value = DEFAULT_OUTPUT_PATH)]
    pub output: PathBuf,

    /// Keep OBJ data right-handed (no z negation, v flip or winding swap)
    #[arg(long)]
    pub no_flip: bool,
}

impl Config {
    pub fn camera_origin(&self) -> Vec3 {
        match self.camera_origin.as_slice() {
            [x, y, z] => Vec3::new(*x, *y, *z),
            _ => Vec3::new(0.0, 5.0, -64.0),
        }
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    pub fn camera(&self) -> Camera {
        Camera::new(self.fov, self.camera_origin(), self.aspect_ratio())
    }

    pub fn scene(&self) -> SceneDescription {
        let map = |path: &PathBuf| (!self.untextured).then(|| path.clone());
        SceneDescription {
            mesh_path: self.mesh.clone(),
            diffuse_map: map(&self.diffuse_map),
            normal_map: map(&self.normal_map),
            specular_map: map(&self.specular_map),
            gloss_map: map(&self.gloss_map),
            obj_options: ObjOptions {
                flip_axis_and_winding: !self.no_flip,
            },
        }
    }
}
