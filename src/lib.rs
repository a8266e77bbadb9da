//! texture-mix - render one quad blending two textures
//!
//! The [`QuadRenderer`] owns a vertex buffer, an index buffer, a shader
//! program and two textures. It draws them every frame with a mix ratio that
//! the up and down arrow keys move in steps of 0.02.
//!
//! Rendering goes through the [`backend::GraphicsBackend`] trait:
//! - **wgpu**: the real GPU path, driven by a winit window (see [`window`])
//! - **recording**: a headless backend that logs every call, used for dry runs
//!   and tests

pub mod backend;
pub mod error;
pub mod host;
pub mod mix;
pub mod renderer;
pub mod resources;
pub mod window;

use std::path::PathBuf;

pub use error::{QuadError, QuadResult};
pub use host::{HeadlessHost, RenderCallbacks, RenderHost};
pub use mix::{BlendDirection, BlendRatio};
pub use renderer::{QuadAssets, QuadRenderer, Viewport};
pub use window::Window;

// Re-export wgpu backend for direct access
pub use backend::wgpu_backend::WgpuBackend;

/// Files the renderer reads during initialization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPaths {
    pub vertex_shader: PathBuf,
    pub fragment_shader: PathBuf,
    /// Sampled through texture unit 0
    pub texture1: PathBuf,
    /// Sampled through texture unit 1
    pub texture2: PathBuf,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            vertex_shader: PathBuf::from("shaders/quad.vert.wgsl"),
            fragment_shader: PathBuf::from("shaders/quad.frag.wgsl"),
            texture1: PathBuf::from("assets/container.jpg"),
            texture2: PathBuf::from("assets/awesomeface.png"),
        }
    }
}

/// Configuration for the quad window and renderer
#[derive(Debug, Clone)]
pub struct QuadConfig {
    /// Window title
    pub title: String,
    /// Initial window width (logical pixels)
    pub width: u32,
    /// Initial window height (logical pixels)
    pub height: u32,
    /// Enable vsync
    pub vsync: bool,
    /// Color the frame is cleared to before the quad is drawn
    pub clear_color: [f32; 4],
    /// Starting mix ratio, snapped to the nearest 0.02 step
    pub initial_mix_ratio: f32,
    pub assets: AssetPaths,
}

impl Default for QuadConfig {
    fn default() -> Self {
        Self {
            title: "Texture Mix".to_string(),
            width: 800,
            height: 600,
            vsync: true,
            clear_color: [0.2, 0.3, 0.3, 1.0],
            initial_mix_ratio: 0.2,
            assets: AssetPaths::default(),
        }
    }
}
