//! Texture mix viewer
//!
//! Run with:
//!   cargo run
//!   cargo run -- --texture1 a.png --texture2 b.png --mix 0.5
//!   cargo run -- --dry-run
//!
//! Controls:
//!   Up/Down  - Change mix ratio
//!   Escape   - Exit

use clap::Parser;
use std::path::PathBuf;
use texture_mix::backend::recording::RecordingBackend;
use texture_mix::backend::GraphicsBackend;
use texture_mix::{HeadlessHost, QuadConfig, QuadRenderer, QuadResult, RenderCallbacks, RenderHost};

/// Draw one quad that blends two textures.
#[derive(Parser, Debug)]
#[command(name = "texture-mix", version)]
struct Args {
    /// Window title.
    #[arg(long)]
    title: Option<String>,

    /// Initial window width in logical pixels.
    #[arg(long, default_value = "800")]
    width: u32,

    /// Initial window height in logical pixels.
    #[arg(long, default_value = "600")]
    height: u32,

    /// Disable vertical sync (may cause tearing).
    #[arg(long)]
    no_vsync: bool,

    /// Starting mix ratio in [0, 1].
    #[arg(long)]
    mix: Option<f32>,

    /// WGSL vertex shader.
    #[arg(long)]
    vertex_shader: Option<PathBuf>,

    /// WGSL fragment shader.
    #[arg(long)]
    fragment_shader: Option<PathBuf>,

    /// Image sampled through texture unit 0.
    #[arg(long)]
    texture1: Option<PathBuf>,

    /// Image sampled through texture unit 1.
    #[arg(long)]
    texture2: Option<PathBuf>,

    /// Load assets and record one frame without opening a window.
    #[arg(long)]
    dry_run: bool,
}

impl Args {
    fn into_config(self) -> QuadConfig {
        let mut config = QuadConfig {
            width: self.width,
            height: self.height,
            vsync: !self.no_vsync,
            ..QuadConfig::default()
        };
        if let Some(title) = self.title {
            config.title = title;
        }
        if let Some(mix) = self.mix {
            config.initial_mix_ratio = mix;
        }
        if let Some(path) = self.vertex_shader {
            config.assets.vertex_shader = path;
        }
        if let Some(path) = self.fragment_shader {
            config.assets.fragment_shader = path;
        }
        if let Some(path) = self.texture1 {
            config.assets.texture1 = path;
        }
        if let Some(path) = self.texture2 {
            config.assets.texture2 = path;
        }
        config
    }
}

fn dry_run(config: &QuadConfig) -> QuadResult<()> {
    let host = HeadlessHost::default();
    let mut backend = RecordingBackend::new(config.width, config.height);
    let mut renderer = QuadRenderer::new(config);

    renderer.initialize(&mut backend)?;
    renderer.resize(
        &mut backend,
        f64::from(config.width),
        f64::from(config.height),
        host.device_pixel_ratio(),
    );

    let frame = backend.begin_frame()?;
    renderer.draw(&mut backend, &frame)?;
    backend.end_frame()?;

    log::info!(
        "Dry run recorded {} commands ({} allocations), mix ratio {:.2}",
        backend.commands().len(),
        backend.allocation_count(),
        renderer.blend_ratio()
    );
    Ok(())
}

fn main() {
    env_logger::init();

    let args = Args::parse();
    let dry = args.dry_run;
    let config = args.into_config();

    let result = if dry {
        dry_run(&config)
    } else {
        texture_mix::window::run(config)
    };

    if let Err(e) = result {
        log::error!("{e}");
        std::process::exit(1);
    }
}
