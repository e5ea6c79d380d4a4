//! A CPU-based software rasterizer with textured BRDF shading.
//!
//! This crate transforms meshes through a first-person camera, rasterizes
//! them with edge functions and perspective-correct interpolation, and shades
//! each pixel with Lambert diffuse, Phong specular and optional normal
//! mapping. SDL2 is used only for window management and display.
//!
//! # Quick Start
//!
//! ```ignore
//! use rustshade::prelude::*;
//!
//! let camera = Camera::new(45.0, Vec3::new(0.0, 5.0, -64.0), 4.0 / 3.0);
//! let mut engine = Engine::new(640, 480, PixelFormat::ARGB8888, camera);
//! engine.load_scene(&SceneDescription {
//!     mesh_path: "resources/vehicle.obj".into(),
//!     ..Default::default()
//! })?;
//! engine.render();
//! ```

// Public API - exposed to library consumers
pub mod brdf;
pub mod camera;
pub mod colors;
pub mod config;
pub mod engine;
pub mod error;
pub mod light;
pub mod math;
pub mod mesh;
pub mod projection;
pub mod texture;
pub mod window;

// Internal modules - used within the crate only
pub(crate) mod render;

// Re-export commonly needed types at crate root for convenience
pub use engine::{Engine, RenderSettings, SceneDescription, ShadingMode};
pub use error::LoadError;
pub use mesh::{Mesh, PrimitiveTopology};
pub use projection::Projection;

/// Prelude module for convenient imports.
///
/// # Example
/// ```ignore
/// use rustshade::prelude::*;
/// ```
pub mod prelude {
    // Camera
    pub use crate::camera::{Camera, CameraInput};

    // Engine
    pub use crate::engine::{Engine, RenderSettings, SceneDescription, ShadingMode};

    // Scene
    pub use crate::colors::{ColorRgb, PixelFormat};
    pub use crate::light::SceneLighting;
    pub use crate::mesh::{Material, Mesh, ObjOptions, PrimitiveTopology, Vertex};
    pub use crate::texture::Texture;

    // Projection
    pub use crate::projection::Projection;

    // Math
    pub use crate::math::mat4::Mat4;
    pub use crate::math::vec2::Vec2;
    pub use crate::math::vec3::Vec3;
    pub use crate::math::vec4::Vec4;

    // Window & Input
    pub use crate::window::{FrameTimer, InputState, Window, WindowEvent};
}

/// Module exposing internals for benchmarking. Not part of the stable API.
pub mod bench {
    pub use crate::render::rasterizer::{is_renderable, to_screen_space};
    pub use crate::render::{
        BrdfShader, DepthShader, EdgeFunctionRasterizer, FrameBuffer, PixelShader, Triangles,
    };
}
