//! Headless backend that records every call
//!
//! Nothing touches a GPU. Resource creation hands out fresh handles and keeps
//! a copy of the descriptor and uploaded bytes; pass commands are appended to
//! a flat log in call order. Used by the `--dry-run` mode and by tests.

use crate::backend::traits::*;
use crate::backend::types::*;

/// One recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    BeginFrame,
    EndFrame,
    Resize { width: u32, height: u32 },
    CreateBuffer { handle: BufferHandle, label: Option<String>, size: u64 },
    WriteBuffer { buffer: BufferHandle, offset: u64, data: Vec<u8> },
    CreateTexture { handle: TextureHandle, label: Option<String>, width: u32, height: u32, mip_levels: u32 },
    WriteTexture { texture: TextureHandle, mip_level: u32, width: u32, height: u32, len: usize },
    CreateSampler { handle: SamplerHandle, min_filter: FilterMode, mag_filter: FilterMode, mipmap_filter: FilterMode },
    CreateRenderPipeline { handle: RenderPipelineHandle, vertex_layouts: Vec<VertexBufferLayout> },
    BeginRenderPass(RenderPassDescriptor),
    EndRenderPass,
    SetPipeline(RenderPipelineHandle),
    SetBindGroup { index: u32, bind_group: BindGroupHandle },
    SetVertexBuffer { slot: u32, buffer: BufferHandle, offset: u64 },
    SetIndexBuffer { buffer: BufferHandle, offset: u64, format: IndexFormat },
    SetViewport { x: f32, y: f32, width: f32, height: f32 },
    DrawIndexed { indices: std::ops::Range<u32>, base_vertex: i32, instances: std::ops::Range<u32> },
}

impl Command {
    /// Whether this command belongs inside a render pass
    pub fn is_pass_command(&self) -> bool {
        matches!(
            self,
            Command::SetPipeline(_)
                | Command::SetBindGroup { .. }
                | Command::SetVertexBuffer { .. }
                | Command::SetIndexBuffer { .. }
                | Command::SetViewport { .. }
                | Command::DrawIndexed { .. }
        )
    }
}

/// Backend that records calls instead of executing them
#[derive(Debug)]
pub struct RecordingBackend {
    commands: Vec<Command>,
    width: u32,
    height: u32,
    format: TextureFormat,
    next_id: u64,
    in_frame: bool,
    max_texture_dimension: u32,
}

impl RecordingBackend {
    /// Largest 2D texture side accepted by default, matching wgpu's default limits
    pub const DEFAULT_MAX_TEXTURE_DIMENSION: u32 = 8192;

    pub fn new(width: u32, height: u32) -> Self {
        Self {
            commands: Vec::new(),
            width: width.max(1),
            height: height.max(1),
            format: TextureFormat::Bgra8UnormSrgb,
            next_id: 1,
            in_frame: false,
            max_texture_dimension: Self::DEFAULT_MAX_TEXTURE_DIMENSION,
        }
    }

    /// Pretend the device supports textures up to `max` pixels per side
    pub fn with_max_texture_dimension(mut self, max: u32) -> Self {
        self.max_texture_dimension = max;
        self
    }

    /// All commands recorded so far
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Drop the recorded log, keeping handle numbering
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Number of resource allocations (buffers, textures, samplers, pipelines)
    pub fn allocation_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| {
                matches!(
                    c,
                    Command::CreateBuffer { .. }
                        | Command::CreateTexture { .. }
                        | Command::CreateSampler { .. }
                        | Command::CreateRenderPipeline { .. }
                )
            })
            .count()
    }

    /// Size of the buffer created with the given label
    pub fn buffer_size(&self, label: &str) -> Option<u64> {
        self.commands.iter().find_map(|c| match c {
            Command::CreateBuffer { label: Some(l), size, .. } if l == label => Some(*size),
            _ => None,
        })
    }

    fn next_handle(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl GraphicsBackend for RecordingBackend {
    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.width = width;
            self.height = height;
            self.commands.push(Command::Resize { width, height });
        }
    }

    fn surface_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn begin_frame(&mut self) -> BackendResult<FrameContext> {
        if self.in_frame {
            return Err(BackendError::AcquireImageFailed("Frame already in progress".into()));
        }
        self.in_frame = true;
        let view = TextureViewHandle(self.next_handle());
        self.commands.push(Command::BeginFrame);
        Ok(FrameContext {
            swapchain_view: view,
            width: self.width,
            height: self.height,
        })
    }

    fn end_frame(&mut self) -> BackendResult<()> {
        self.in_frame = false;
        self.commands.push(Command::EndFrame);
        Ok(())
    }

    fn swapchain_format(&self) -> TextureFormat {
        self.format
    }

    fn create_buffer(&mut self, desc: &BufferDescriptor) -> BackendResult<BufferHandle> {
        let handle = BufferHandle(self.next_handle());
        self.commands.push(Command::CreateBuffer {
            handle,
            label: desc.label.clone(),
            size: desc.size,
        });
        Ok(handle)
    }

    fn create_buffer_init(
        &mut self,
        desc: &BufferDescriptor,
        data: &[u8],
    ) -> BackendResult<BufferHandle> {
        if data.len() as u64 != desc.size {
            return Err(BackendError::BufferCreationFailed(format!(
                "{}: expected {} bytes, got {}",
                desc.label.as_deref().unwrap_or("buffer"),
                desc.size,
                data.len()
            )));
        }
        let handle = self.create_buffer(desc)?;
        self.commands.push(Command::WriteBuffer {
            buffer: handle,
            offset: 0,
            data: data.to_vec(),
        });
        Ok(handle)
    }

    fn write_buffer(&mut self, buffer: BufferHandle, offset: u64, data: &[u8]) {
        self.commands.push(Command::WriteBuffer {
            buffer,
            offset,
            data: data.to_vec(),
        });
    }

    fn create_texture(&mut self, desc: &TextureDescriptor) -> BackendResult<TextureHandle> {
        desc.check_size(self.max_texture_dimension)?;
        let handle = TextureHandle(self.next_handle());
        self.commands.push(Command::CreateTexture {
            handle,
            label: desc.label.clone(),
            width: desc.width,
            height: desc.height,
            mip_levels: desc.mip_levels,
        });
        Ok(handle)
    }

    fn create_texture_view(&mut self, _texture: TextureHandle) -> BackendResult<TextureViewHandle> {
        Ok(TextureViewHandle(self.next_handle()))
    }

    fn write_texture(
        &mut self,
        texture: TextureHandle,
        mip_level: u32,
        data: &[u8],
        width: u32,
        height: u32,
    ) {
        self.commands.push(Command::WriteTexture {
            texture,
            mip_level,
            width,
            height,
            len: data.len(),
        });
    }

    fn create_sampler(&mut self, desc: &SamplerDescriptor) -> BackendResult<SamplerHandle> {
        let handle = SamplerHandle(self.next_handle());
        self.commands.push(Command::CreateSampler {
            handle,
            min_filter: desc.min_filter,
            mag_filter: desc.mag_filter,
            mipmap_filter: desc.mipmap_filter,
        });
        Ok(handle)
    }

    fn create_bind_group_layout(
        &mut self,
        _entries: &[BindGroupLayoutEntry],
    ) -> BackendResult<BindGroupLayoutHandle> {
        Ok(BindGroupLayoutHandle(self.next_handle()))
    }

    fn create_bind_group(
        &mut self,
        _layout: BindGroupLayoutHandle,
        _entries: &[(u32, BindGroupEntry)],
    ) -> BackendResult<BindGroupHandle> {
        Ok(BindGroupHandle(self.next_handle()))
    }

    fn create_render_pipeline(
        &mut self,
        desc: &RenderPipelineDescriptor,
    ) -> BackendResult<RenderPipelineHandle> {
        let handle = RenderPipelineHandle(self.next_handle());
        self.commands.push(Command::CreateRenderPipeline {
            handle,
            vertex_layouts: desc.vertex_layouts.clone(),
        });
        Ok(handle)
    }

    fn begin_render_pass(&mut self, desc: &RenderPassDescriptor) {
        self.commands.push(Command::BeginRenderPass(desc.clone()));
    }

    fn end_render_pass(&mut self) {
        self.commands.push(Command::EndRenderPass);
    }

    fn set_render_pipeline(&mut self, pipeline: RenderPipelineHandle) {
        self.commands.push(Command::SetPipeline(pipeline));
    }

    fn set_bind_group(&mut self, index: u32, bind_group: BindGroupHandle) {
        self.commands.push(Command::SetBindGroup { index, bind_group });
    }

    fn set_vertex_buffer(&mut self, slot: u32, buffer: BufferHandle, offset: u64) {
        self.commands.push(Command::SetVertexBuffer { slot, buffer, offset });
    }

    fn set_index_buffer(&mut self, buffer: BufferHandle, offset: u64, format: IndexFormat) {
        self.commands.push(Command::SetIndexBuffer { buffer, offset, format });
    }

    fn set_viewport(&mut self, x: f32, y: f32, width: f32, height: f32, _min_depth: f32, _max_depth: f32) {
        self.commands.push(Command::SetViewport { x, y, width, height });
    }

    fn draw_indexed(
        &mut self,
        indices: std::ops::Range<u32>,
        base_vertex: i32,
        instances: std::ops::Range<u32>,
    ) {
        self.commands.push(Command::DrawIndexed { indices, base_vertex, instances });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_unique() {
        let mut backend = RecordingBackend::new(64, 64);
        let desc = BufferDescriptor {
            label: Some("a".into()),
            size: 4,
            usage: BufferUsage::VERTEX,
        };
        let a = backend.create_buffer(&desc).unwrap();
        let b = backend.create_buffer(&desc).unwrap();
        assert_ne!(a, b);
        assert_eq!(backend.allocation_count(), 2);
    }

    #[test]
    fn buffer_init_rejects_size_mismatch() {
        let mut backend = RecordingBackend::new(64, 64);
        let desc = BufferDescriptor {
            label: Some("bad".into()),
            size: 8,
            usage: BufferUsage::VERTEX,
        };
        assert!(backend.create_buffer_init(&desc, &[0u8; 4]).is_err());
    }

    #[test]
    fn nested_frames_are_rejected() {
        let mut backend = RecordingBackend::new(64, 64);
        backend.begin_frame().unwrap();
        assert!(backend.begin_frame().is_err());
        backend.end_frame().unwrap();
        assert!(backend.begin_frame().is_ok());
    }

    #[test]
    fn oversized_texture_is_an_error() {
        let mut backend = RecordingBackend::new(64, 64).with_max_texture_dimension(16);
        let desc = TextureDescriptor {
            label: Some("wide".into()),
            width: 17,
            height: 1,
            mip_levels: 1,
            format: TextureFormat::Rgba8UnormSrgb,
            usage: TextureUsage::TEXTURE_BINDING | TextureUsage::COPY_DST,
        };
        let err = backend.create_texture(&desc).unwrap_err();
        assert!(matches!(err, BackendError::TextureCreationFailed(_)));
        assert_eq!(backend.allocation_count(), 0);
    }

    #[test]
    fn zero_resize_is_ignored() {
        let mut backend = RecordingBackend::new(64, 32);
        backend.resize(0, 100);
        assert_eq!(backend.surface_size(), (64, 32));
        assert!(backend.commands().is_empty());
    }
}
