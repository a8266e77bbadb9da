//! Shared fixtures for the renderer integration tests.

#![allow(dead_code)]

use std::path::Path;

use texture_mix::backend::recording::{Command, RecordingBackend};
use texture_mix::backend::{GraphicsBackend, Vertex};
use texture_mix::resources::{ShaderProgram, TextureData};
use texture_mix::{AssetPaths, QuadAssets, QuadConfig, QuadRenderer, RenderCallbacks};

pub const VERTEX_SHADER: &str = include_str!("../../shaders/quad.vert.wgsl");
pub const FRAGMENT_SHADER: &str = include_str!("../../shaders/quad.frag.wgsl");

/// In-memory assets: a 64x64 checkerboard on unit 0 and a 1x1 texel on unit 1.
pub fn test_assets() -> QuadAssets {
    let program = ShaderProgram::from_sources(VERTEX_SHADER, FRAGMENT_SHADER, &Vertex::layout())
        .expect("bundled shaders should link");
    QuadAssets {
        program,
        textures: [
            TextureData::checkerboard(64, [255, 255, 255, 255], [0, 0, 0, 255]),
            TextureData::solid_color([255, 0, 0, 255], "red"),
        ],
    }
}

/// A renderer initialized against a fresh 800x600 recording backend.
pub fn ready_renderer(config: &QuadConfig) -> (QuadRenderer, RecordingBackend) {
    let mut backend = RecordingBackend::new(config.width, config.height);
    let mut renderer = QuadRenderer::new(config);
    renderer
        .initialize_with_assets(&mut backend, &test_assets())
        .expect("initialize");
    (renderer, backend)
}

/// Record one whole frame and return only the commands it produced.
pub fn record_frame(renderer: &mut QuadRenderer, backend: &mut RecordingBackend) -> Vec<Command> {
    backend.clear();
    let frame = backend.begin_frame().expect("begin frame");
    renderer.draw(backend, &frame).expect("draw");
    backend.end_frame().expect("end frame");
    backend.commands().to_vec()
}

/// Write both shaders and two small images into `dir`.
pub fn write_asset_dir(dir: &Path) -> AssetPaths {
    let paths = AssetPaths {
        vertex_shader: dir.join("quad.vert.wgsl"),
        fragment_shader: dir.join("quad.frag.wgsl"),
        texture1: dir.join("container.png"),
        texture2: dir.join("face.png"),
    };
    std::fs::write(&paths.vertex_shader, VERTEX_SHADER).unwrap();
    std::fs::write(&paths.fragment_shader, FRAGMENT_SHADER).unwrap();

    image::RgbaImage::from_pixel(16, 8, image::Rgba([200, 120, 40, 255]))
        .save(&paths.texture1)
        .unwrap();
    image::RgbaImage::from_fn(32, 32, |x, _| {
        image::Rgba(if x < 16 { [0, 0, 0, 0] } else { [255, 255, 0, 255] })
    })
    .save(&paths.texture2)
    .unwrap();

    paths
}
