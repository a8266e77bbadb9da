//! Renderer behavior observed through the recording backend.

mod common;

use common::*;
use texture_mix::backend::recording::{Command, RecordingBackend};
use texture_mix::backend::{BackendError, FilterMode, GraphicsBackend, IndexFormat, LoadOp};
use texture_mix::{
    BlendDirection, HeadlessHost, QuadConfig, QuadError, QuadRenderer, RenderCallbacks, Viewport,
};

// ---------------------------------------------------------------------------
// Initialization
// ---------------------------------------------------------------------------

#[test]
fn initialize_uploads_quad_geometry() {
    let (renderer, backend) = ready_renderer(&QuadConfig::default());

    assert!(renderer.is_ready());
    // 4 vertices of position + color + uv, 6 u32 indices
    assert_eq!(backend.buffer_size("quad vertices"), Some(128));
    assert_eq!(backend.buffer_size("quad indices"), Some(24));
    assert_eq!(backend.buffer_size("Mix Uniform"), Some(16));
}

#[test]
fn initialize_creates_one_pipeline_with_the_quad_layout() {
    let (_, backend) = ready_renderer(&QuadConfig::default());

    let pipelines: Vec<_> = backend
        .commands()
        .iter()
        .filter_map(|c| match c {
            Command::CreateRenderPipeline { vertex_layouts, .. } => Some(vertex_layouts.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(pipelines.len(), 1);
    assert_eq!(pipelines[0].len(), 1);
    assert_eq!(pipelines[0][0].array_stride, 32);
    assert_eq!(pipelines[0][0].attributes.len(), 3);
}

#[test]
fn textures_get_trilinear_repeat_sampling_and_full_mip_chains() {
    let (renderer, backend) = ready_renderer(&QuadConfig::default());

    let sampler = backend.commands().iter().find_map(|c| match c {
        Command::CreateSampler { min_filter, mag_filter, mipmap_filter, .. } => {
            Some((*min_filter, *mag_filter, *mipmap_filter))
        }
        _ => None,
    });
    assert_eq!(
        sampler,
        Some((FilterMode::Linear, FilterMode::Linear, FilterMode::Linear))
    );

    let mip_counts: Vec<u32> = backend
        .commands()
        .iter()
        .filter_map(|c| match c {
            Command::CreateTexture { mip_levels, .. } => Some(*mip_levels),
            _ => None,
        })
        .collect();
    assert_eq!(mip_counts, vec![7, 1]);

    let uploads = backend
        .commands()
        .iter()
        .filter(|c| matches!(c, Command::WriteTexture { .. }))
        .count();
    assert_eq!(uploads, 8);

    assert_eq!(renderer.texture_sizes(), Some([(64, 64), (1, 1)]));
}

#[test]
fn second_initialize_allocates_nothing() {
    let (mut renderer, mut backend) = ready_renderer(&QuadConfig::default());
    let before = backend.allocation_count();

    renderer
        .initialize_with_assets(&mut backend, &test_assets())
        .unwrap();

    assert_eq!(backend.allocation_count(), before);
    assert!(renderer.is_ready());
}

#[test]
fn initialize_loads_assets_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let config = QuadConfig {
        assets: write_asset_dir(dir.path()),
        ..QuadConfig::default()
    };
    let mut backend = RecordingBackend::new(config.width, config.height);
    let mut renderer = QuadRenderer::new(&config);

    renderer.initialize(&mut backend).unwrap();

    assert!(renderer.is_ready());
    assert_eq!(renderer.texture_sizes(), Some([(16, 8), (32, 32)]));
}

#[test]
fn missing_texture_fails_initialize() {
    let dir = tempfile::tempdir().unwrap();
    let mut assets = write_asset_dir(dir.path());
    assets.texture2 = dir.path().join("nope.png");
    let config = QuadConfig { assets, ..QuadConfig::default() };
    let mut backend = RecordingBackend::new(800, 600);
    let mut renderer = QuadRenderer::new(&config);

    let err = renderer.initialize(&mut backend).unwrap_err();

    assert!(matches!(err, QuadError::Io { .. }), "got {err:?}");
    assert!(!renderer.is_ready());
    assert_eq!(backend.allocation_count(), 0);
}

#[test]
fn undecodable_texture_fails_initialize() {
    let dir = tempfile::tempdir().unwrap();
    let assets = write_asset_dir(dir.path());
    std::fs::write(&assets.texture1, b"not an image").unwrap();
    let config = QuadConfig { assets, ..QuadConfig::default() };
    let mut backend = RecordingBackend::new(800, 600);
    let mut renderer = QuadRenderer::new(&config);

    let err = renderer.initialize(&mut backend).unwrap_err();

    assert!(matches!(err, QuadError::Image { .. }), "got {err:?}");
}

#[test]
fn broken_fragment_shader_fails_initialize() {
    let dir = tempfile::tempdir().unwrap();
    let assets = write_asset_dir(dir.path());
    std::fs::write(&assets.fragment_shader, "@fragment fn fs_main( {").unwrap();
    let config = QuadConfig { assets, ..QuadConfig::default() };
    let mut backend = RecordingBackend::new(800, 600);
    let mut renderer = QuadRenderer::new(&config);

    let err = renderer.initialize(&mut backend).unwrap_err();

    assert!(matches!(err, QuadError::ShaderCompilation { .. }), "got {err:?}");
    assert!(!renderer.is_ready());
}

#[test]
fn texture_above_device_limit_fails_initialize() {
    let mut backend = RecordingBackend::new(800, 600).with_max_texture_dimension(32);
    let mut renderer = QuadRenderer::new(&QuadConfig::default());

    // the 64x64 checkerboard does not fit
    let err = renderer
        .initialize_with_assets(&mut backend, &test_assets())
        .unwrap_err();

    assert!(
        matches!(err, QuadError::Backend(BackendError::TextureCreationFailed(_))),
        "got {err:?}"
    );
    assert!(!renderer.is_ready());
}

#[test]
fn second_initialize_does_not_reload_assets() {
    let dir = tempfile::tempdir().unwrap();
    let config = QuadConfig {
        assets: write_asset_dir(dir.path()),
        ..QuadConfig::default()
    };
    let mut backend = RecordingBackend::new(config.width, config.height);
    let mut renderer = QuadRenderer::new(&config);
    renderer.initialize(&mut backend).unwrap();
    let before = backend.allocation_count();

    std::fs::remove_file(&config.assets.texture1).unwrap();
    renderer.initialize(&mut backend).unwrap();

    assert_eq!(backend.allocation_count(), before);
}

// ---------------------------------------------------------------------------
// Drawing
// ---------------------------------------------------------------------------

#[test]
fn draw_before_initialize_is_an_error() {
    let mut backend = RecordingBackend::new(800, 600);
    let mut renderer = QuadRenderer::new(&QuadConfig::default());

    let frame = backend.begin_frame().unwrap();
    let err = renderer.draw(&mut backend, &frame).unwrap_err();

    assert!(matches!(err, QuadError::NotInitialized));
    assert!(!backend.commands().iter().any(Command::is_pass_command));
}

#[test]
fn frame_commands_follow_draw_order() {
    let (mut renderer, mut backend) = ready_renderer(&QuadConfig::default());
    let commands = record_frame(&mut renderer, &mut backend);

    let names: Vec<&str> = commands
        .iter()
        .map(|c| match c {
            Command::BeginFrame => "begin frame",
            Command::BeginRenderPass(_) => "clear",
            Command::SetViewport { .. } => "viewport",
            Command::SetPipeline(_) => "program",
            Command::WriteBuffer { .. } => "mix uniform",
            Command::SetBindGroup { index: 0, .. } => "uniforms",
            Command::SetVertexBuffer { .. } => "vertices",
            Command::SetIndexBuffer { .. } => "indices",
            Command::SetBindGroup { index: 1, .. } => "texture unit 0",
            Command::SetBindGroup { index: 2, .. } => "texture unit 1",
            Command::DrawIndexed { .. } => "draw",
            Command::EndRenderPass => "unbind",
            Command::EndFrame => "end frame",
            other => panic!("unexpected command {other:?}"),
        })
        .collect();

    assert_eq!(
        names,
        vec![
            "begin frame",
            "clear",
            "viewport",
            "program",
            "mix uniform",
            "uniforms",
            "vertices",
            "indices",
            "texture unit 0",
            "texture unit 1",
            "draw",
            "unbind",
            "end frame",
        ]
    );
}

#[test]
fn each_frame_draws_six_indices_once() {
    let (mut renderer, mut backend) = ready_renderer(&QuadConfig::default());

    for _ in 0..3 {
        let commands = record_frame(&mut renderer, &mut backend);
        let draws: Vec<_> = commands
            .iter()
            .filter_map(|c| match c {
                Command::DrawIndexed { indices, base_vertex, instances } => {
                    Some((indices.clone(), *base_vertex, instances.clone()))
                }
                _ => None,
            })
            .collect();
        assert_eq!(draws, vec![(0..6, 0, 0..1)]);

        assert!(commands.iter().any(|c| matches!(
            c,
            Command::SetIndexBuffer { format: IndexFormat::Uint32, .. }
        )));
    }
}

#[test]
fn frame_clears_to_configured_color() {
    let config = QuadConfig {
        clear_color: [0.1, 0.2, 0.3, 1.0],
        ..QuadConfig::default()
    };
    let (mut renderer, mut backend) = ready_renderer(&config);
    let commands = record_frame(&mut renderer, &mut backend);

    let load_op = commands.iter().find_map(|c| match c {
        Command::BeginRenderPass(desc) => Some(desc.color_attachments[0].load_op),
        _ => None,
    });
    assert_eq!(load_op, Some(LoadOp::Clear([0.1, 0.2, 0.3, 1.0])));
}

#[test]
fn default_clear_color_is_dark_teal() {
    let (mut renderer, mut backend) = ready_renderer(&QuadConfig::default());
    let commands = record_frame(&mut renderer, &mut backend);

    assert!(commands.iter().any(|c| matches!(
        c,
        Command::BeginRenderPass(desc)
            if desc.color_attachments[0].load_op == LoadOp::Clear([0.2, 0.3, 0.3, 1.0])
    )));
}

fn uploaded_ratio(commands: &[Command]) -> f32 {
    let data = commands
        .iter()
        .find_map(|c| match c {
            Command::WriteBuffer { data, .. } => Some(data.clone()),
            _ => None,
        })
        .expect("mix uniform write");
    assert_eq!(data.len(), 16);
    f32::from_ne_bytes([data[0], data[1], data[2], data[3]])
}

#[test]
fn frame_uploads_current_ratio() {
    let (mut renderer, mut backend) = ready_renderer(&QuadConfig::default());
    let host = HeadlessHost::default();

    let first = record_frame(&mut renderer, &mut backend);
    assert!((uploaded_ratio(&first) - 0.2).abs() < 1e-6);

    renderer.adjust_blend_ratio(BlendDirection::Increase, &host);
    let second = record_frame(&mut renderer, &mut backend);
    assert!((uploaded_ratio(&second) - 0.22).abs() < 1e-6);
}

// ---------------------------------------------------------------------------
// Resize
// ---------------------------------------------------------------------------

#[test]
fn resize_scales_viewport_and_surface() {
    let (mut renderer, mut backend) = ready_renderer(&QuadConfig::default());
    backend.clear();

    renderer.resize(&mut backend, 400.0, 300.0, 2.0);

    assert_eq!(
        renderer.viewport(),
        Some(Viewport { x: 0, y: 0, width: 800, height: 600 })
    );
    assert_eq!(backend.commands(), &[Command::Resize { width: 800, height: 600 }]);

    let commands = record_frame(&mut renderer, &mut backend);
    assert!(commands.contains(&Command::SetViewport {
        x: 0.0,
        y: 0.0,
        width: 800.0,
        height: 600.0,
    }));
}

#[test]
fn fractional_logical_size_maps_back_to_physical_pixels() {
    let (mut renderer, mut backend) = ready_renderer(&QuadConfig::default());
    backend.clear();

    // 1000 physical pixels at 150%
    renderer.resize(&mut backend, 1000.0 / 1.5, 500.0 / 1.5, 1.5);

    assert_eq!(backend.commands(), &[Command::Resize { width: 1000, height: 500 }]);
}

#[test]
fn resize_before_initialize_is_kept() {
    let mut backend = RecordingBackend::new(800, 600);
    let mut renderer = QuadRenderer::new(&QuadConfig::default());

    renderer.resize(&mut backend, 101.0, 99.0, 1.5);
    renderer
        .initialize_with_assets(&mut backend, &test_assets())
        .unwrap();

    let commands = record_frame(&mut renderer, &mut backend);
    assert!(commands.contains(&Command::SetViewport {
        x: 0.0,
        y: 0.0,
        width: 152.0,
        height: 149.0,
    }));
}

// ---------------------------------------------------------------------------
// Blend ratio
// ---------------------------------------------------------------------------

#[test]
fn every_adjustment_requests_a_redraw() {
    let mut renderer = QuadRenderer::new(&QuadConfig::default());
    let host = HeadlessHost::default();

    for _ in 0..60 {
        renderer.adjust_blend_ratio(BlendDirection::Increase, &host);
    }
    assert_eq!(renderer.blend_ratio(), 1.0);
    assert_eq!(host.redraw_requests(), 60);

    renderer.adjust_blend_ratio(BlendDirection::Decrease, &host);
    assert!((renderer.blend_ratio() - 0.98).abs() < 1e-6);
    assert_eq!(host.redraw_requests(), 61);
}

#[test]
fn ratio_never_leaves_unit_range() {
    let mut renderer = QuadRenderer::new(&QuadConfig::default());
    let host = HeadlessHost::default();

    for _ in 0..30 {
        renderer.adjust_blend_ratio(BlendDirection::Decrease, &host);
        assert!(renderer.blend_ratio() >= 0.0);
    }
    assert_eq!(renderer.blend_ratio(), 0.0);

    for i in 0..120 {
        let direction = if i % 3 == 0 {
            BlendDirection::Decrease
        } else {
            BlendDirection::Increase
        };
        renderer.adjust_blend_ratio(direction, &host);
        assert!((0.0..=1.0).contains(&renderer.blend_ratio()));
    }
}
