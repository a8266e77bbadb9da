//! Quad renderer
//!
//! Geometry, the shader program and both textures are created once in
//! `initialize`; afterwards only the blend ratio changes between frames.

use crate::backend::traits::*;
use crate::backend::types::*;
use crate::error::{QuadError, QuadResult};
use crate::host::{RenderCallbacks, RenderHost};
use crate::mix::{BlendDirection, BlendRatio};
use crate::resources::{GpuMesh, GpuTexture, Mesh, ShaderProgram, TextureData};
use crate::{AssetPaths, QuadConfig};

/// Bind group holding the mix uniform block
pub const UNIFORM_GROUP: u32 = 0;
/// Bind group of texture unit 0; unit N lives at this index + N
pub const TEXTURE_UNIT_GROUP_BASE: u32 = 1;
pub const TEXTURE_UNITS: usize = 2;

/// Everything read from disk before touching the GPU
#[derive(Debug, Clone)]
pub struct QuadAssets {
    pub program: ShaderProgram,
    pub textures: [TextureData; TEXTURE_UNITS],
}

impl QuadAssets {
    pub fn load(paths: &AssetPaths) -> QuadResult<Self> {
        let program = ShaderProgram::from_files(
            &paths.vertex_shader,
            &paths.fragment_shader,
            &Vertex::layout(),
        )?;
        let texture1 = TextureData::from_file(&paths.texture1)?;
        let texture2 = TextureData::from_file(&paths.texture2)?;

        Ok(Self {
            program,
            textures: [texture1, texture2],
        })
    }
}

/// Viewport rectangle in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Scale a logical size by the device pixel ratio.
    ///
    /// Each side is rounded half away from zero and kept at least 1.
    pub fn scaled(width: f64, height: f64, device_pixel_ratio: f64) -> Self {
        let scale = |side: f64| ((side * device_pixel_ratio).round() as u32).max(1);
        Self {
            x: 0,
            y: 0,
            width: scale(width),
            height: scale(height),
        }
    }
}

/// GPU objects owned by a ready renderer
#[derive(Debug)]
struct RenderState {
    pipeline: RenderPipelineHandle,
    mesh: GpuMesh,
    uniform_buffer: BufferHandle,
    uniform_bind_group: BindGroupHandle,
    textures: [GpuTexture; TEXTURE_UNITS],
    texture_bind_groups: [BindGroupHandle; TEXTURE_UNITS],
}

/// Draws a textured quad blending two images
#[derive(Debug)]
pub struct QuadRenderer {
    assets: AssetPaths,
    clear_color: [f32; 4],
    ratio: BlendRatio,
    viewport: Option<Viewport>,
    state: Option<RenderState>,
}

impl QuadRenderer {
    pub fn new(config: &QuadConfig) -> Self {
        Self {
            assets: config.assets.clone(),
            clear_color: config.clear_color,
            ratio: BlendRatio::new(config.initial_mix_ratio),
            viewport: None,
            state: None,
        }
    }

    /// Whether `initialize` has completed
    pub fn is_ready(&self) -> bool {
        self.state.is_some()
    }

    pub fn blend_ratio(&self) -> f32 {
        self.ratio.value()
    }

    /// Last viewport computed by `resize`
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn clear_color(&self) -> [f32; 4] {
        self.clear_color
    }

    /// Base-level sizes of the bound textures, in texture unit order
    pub fn texture_sizes(&self) -> Option<[(u32, u32); TEXTURE_UNITS]> {
        self.state.as_ref().map(|state| {
            let [a, b] = &state.textures;
            [(a.width, a.height), (b.width, b.height)]
        })
    }

    /// Step the blend ratio and ask the host to redraw.
    ///
    /// The redraw is requested even when the ratio was already at the bound.
    pub fn adjust_blend_ratio(&mut self, direction: BlendDirection, host: &dyn RenderHost) {
        if self.ratio.adjust(direction) {
            log::debug!("Mix ratio {:.2}", self.ratio.value());
        }
        host.request_redraw();
    }

    fn warn_if_ready(&self) -> bool {
        if self.state.is_some() {
            log::warn!("Quad renderer already initialized; ignoring");
        }
        self.state.is_some()
    }

    /// Create every GPU object from already loaded assets
    pub fn initialize_with_assets<B: GraphicsBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        assets: &QuadAssets,
    ) -> QuadResult<()> {
        if self.warn_if_ready() {
            return Ok(());
        }

        let uniform_layout = backend.create_bind_group_layout(&[BindGroupLayoutEntry {
            binding: 0,
            visibility: ShaderStageFlags::FRAGMENT,
            ty: BindingType::UniformBuffer,
        }])?;

        let texture_layout = backend.create_bind_group_layout(&[
            BindGroupLayoutEntry {
                binding: 0,
                visibility: ShaderStageFlags::FRAGMENT,
                ty: BindingType::Texture {
                    sample_type: TextureSampleType::Float { filterable: true },
                },
            },
            BindGroupLayoutEntry {
                binding: 1,
                visibility: ShaderStageFlags::FRAGMENT,
                ty: BindingType::Sampler { comparison: false },
            },
        ])?;

        let pipeline = backend.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("Quad Pipeline".into()),
            vertex_shader: assets.program.vertex.source.clone(),
            fragment_shader: assets.program.fragment.source.clone(),
            vertex_layouts: vec![Vertex::layout()],
            bind_group_layouts: vec![uniform_layout, texture_layout, texture_layout],
            primitive_topology: PrimitiveTopology::TriangleList,
            front_face: FrontFace::Ccw,
            cull_mode: CullMode::None,
            color_format: backend.swapchain_format(),
        })?;

        let mesh = GpuMesh::create(backend, &Mesh::quad())?;

        let uniform_buffer = backend.create_buffer(&BufferDescriptor {
            label: Some("Mix Uniform".into()),
            size: std::mem::size_of::<MixUniform>() as u64,
            usage: BufferUsage::UNIFORM | BufferUsage::COPY_DST,
        })?;
        let uniform_bind_group = backend.create_bind_group(
            uniform_layout,
            &[(
                0,
                BindGroupEntry::Buffer {
                    buffer: uniform_buffer,
                    offset: 0,
                    size: None,
                },
            )],
        )?;

        let sampler = backend.create_sampler(&SamplerDescriptor::trilinear("Quad Sampler"))?;

        let [data1, data2] = &assets.textures;
        let textures = [
            GpuTexture::create(backend, data1)?,
            GpuTexture::create(backend, data2)?,
        ];

        let mut texture_bind_group = |texture: &GpuTexture| {
            backend.create_bind_group(
                texture_layout,
                &[
                    (0, BindGroupEntry::Texture(texture.view)),
                    (1, BindGroupEntry::Sampler(sampler)),
                ],
            )
        };
        let texture_bind_groups = [
            texture_bind_group(&textures[0])?,
            texture_bind_group(&textures[1])?,
        ];

        log::info!(
            "Quad renderer ready: textures '{}' and '{}', mix ratio {:.2}",
            textures[0].name,
            textures[1].name,
            self.ratio.value()
        );

        self.state = Some(RenderState {
            pipeline,
            mesh,
            uniform_buffer,
            uniform_bind_group,
            textures,
            texture_bind_groups,
        });

        Ok(())
    }
}

impl<B: GraphicsBackend + ?Sized> RenderCallbacks<B> for QuadRenderer {
    fn initialize(&mut self, backend: &mut B) -> QuadResult<()> {
        // Skip reading assets again
        if self.warn_if_ready() {
            return Ok(());
        }
        let assets = QuadAssets::load(&self.assets)?;
        self.initialize_with_assets(backend, &assets)
    }

    fn resize(&mut self, backend: &mut B, width: f64, height: f64, device_pixel_ratio: f64) {
        let viewport = Viewport::scaled(width, height, device_pixel_ratio);
        log::debug!(
            "Resize {}x{} @ {:.2} -> viewport {}x{}",
            width,
            height,
            device_pixel_ratio,
            viewport.width,
            viewport.height
        );
        backend.resize(viewport.width, viewport.height);
        self.viewport = Some(viewport);
    }

    fn draw(&mut self, backend: &mut B, frame: &FrameContext) -> QuadResult<()> {
        let state = self.state.as_ref().ok_or(QuadError::NotInitialized)?;

        let viewport = self.viewport.unwrap_or(Viewport {
            x: 0,
            y: 0,
            width: frame.width,
            height: frame.height,
        });

        // Clear
        backend.begin_render_pass(&RenderPassDescriptor {
            label: Some("Quad Pass".into()),
            color_attachments: vec![ColorAttachment {
                view: frame.swapchain_view,
                load_op: LoadOp::Clear(self.clear_color),
                store_op: StoreOp::Store,
            }],
        });
        backend.set_viewport(
            viewport.x as f32,
            viewport.y as f32,
            viewport.width.min(frame.width) as f32,
            viewport.height.min(frame.height) as f32,
            0.0,
            1.0,
        );

        // Program, then its uniforms
        backend.set_render_pipeline(state.pipeline);
        let uniform = MixUniform::new(self.ratio.value());
        backend.write_buffer(state.uniform_buffer, 0, bytemuck::bytes_of(&uniform));
        backend.set_bind_group(UNIFORM_GROUP, state.uniform_bind_group);

        // Vertex layout
        backend.set_vertex_buffer(0, state.mesh.vertex_buffer, 0);
        backend.set_index_buffer(state.mesh.index_buffer, 0, state.mesh.index_format);

        // Texture units 0 and 1
        for (unit, bind_group) in state.texture_bind_groups.iter().enumerate() {
            backend.set_bind_group(TEXTURE_UNIT_GROUP_BASE + unit as u32, *bind_group);
        }

        backend.draw_indexed(0..state.mesh.index_count, 0, 0..1);

        // Ending the pass releases the textures and the program
        backend.end_render_pass();

        Ok(())
    }
}
