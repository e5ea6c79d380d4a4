//! Rendering subsystem.
//!
//! - [`framebuffer`]: color and depth storage for one frame
//! - [`rasterizer`]: triangle setup, coverage, interpolation and pixel shaders

pub mod framebuffer;
pub mod rasterizer;

pub use framebuffer::FrameBuffer;
pub use rasterizer::{
    BoundingBox, BrdfShader, DepthShader, EdgeFunctionRasterizer, PixelShader, ShadingMode,
    Triangles,
};
