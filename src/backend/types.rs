//! Common types shared between backends

use crate::backend::traits::{BackendError, BackendResult};
use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

/// Texture format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    Rgba8Unorm,
    Rgba8UnormSrgb,
    Bgra8Unorm,
    Bgra8UnormSrgb,
}

/// Texture usage flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureUsage(u32);

impl TextureUsage {
    pub const COPY_DST: Self = Self(1 << 1);
    pub const TEXTURE_BINDING: Self = Self(1 << 2);

    pub fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl std::ops::BitOr for TextureUsage {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

/// Buffer usage flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferUsage(u32);

impl BufferUsage {
    pub const COPY_DST: Self = Self(1 << 3);
    pub const INDEX: Self = Self(1 << 4);
    pub const VERTEX: Self = Self(1 << 5);
    pub const UNIFORM: Self = Self(1 << 6);

    pub fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl std::ops::BitOr for BufferUsage {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

/// Texture descriptor
#[derive(Debug, Clone)]
pub struct TextureDescriptor {
    pub label: Option<String>,
    pub width: u32,
    pub height: u32,
    pub mip_levels: u32,
    pub format: TextureFormat,
    pub usage: TextureUsage,
}

impl TextureDescriptor {
    /// Reject textures with a zero side or a side above `max_dimension`
    pub fn check_size(&self, max_dimension: u32) -> BackendResult<()> {
        let label = self.label.as_deref().unwrap_or("texture");
        if self.width == 0 || self.height == 0 {
            return Err(BackendError::TextureCreationFailed(format!(
                "{label}: zero-sized texture"
            )));
        }
        if self.width > max_dimension || self.height > max_dimension {
            return Err(BackendError::TextureCreationFailed(format!(
                "{label}: {}x{} exceeds the device limit of {max_dimension}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Buffer descriptor
#[derive(Debug, Clone)]
pub struct BufferDescriptor {
    pub label: Option<String>,
    pub size: u64,
    pub usage: BufferUsage,
}

/// Vertex attribute format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexFormat {
    Float32x2,
    Float32x3,
}

/// Vertex attribute description
#[derive(Debug, Clone, PartialEq)]
pub struct VertexAttribute {
    pub location: u32,
    pub format: VertexFormat,
    pub offset: u64,
}

/// Vertex buffer layout
#[derive(Debug, Clone, PartialEq)]
pub struct VertexBufferLayout {
    pub array_stride: u64,
    pub attributes: Vec<VertexAttribute>,
}

impl VertexBufferLayout {
    /// Whether some attribute feeds the given shader location
    pub fn provides(&self, location: u32) -> bool {
        self.attributes.iter().any(|a| a.location == location)
    }
}

/// Interleaved quad vertex: position, color, texture coordinate
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub color: Vec3,
    pub uv: Vec2,
}

impl Vertex {
    pub const POSITION_LOCATION: u32 = 0;
    pub const COLOR_LOCATION: u32 = 1;
    pub const UV_LOCATION: u32 = 2;

    pub const fn new(position: [f32; 3], color: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position: Vec3::new(position[0], position[1], position[2]),
            color: Vec3::new(color[0], color[1], color[2]),
            uv: Vec2::new(uv[0], uv[1]),
        }
    }

    /// Stride 8 floats; attributes at 0, 3 and 6 floats
    pub fn layout() -> VertexBufferLayout {
        VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as u64,
            attributes: vec![
                VertexAttribute {
                    location: Self::POSITION_LOCATION,
                    format: VertexFormat::Float32x3,
                    offset: 0,
                },
                VertexAttribute {
                    location: Self::COLOR_LOCATION,
                    format: VertexFormat::Float32x3,
                    offset: 12,
                },
                VertexAttribute {
                    location: Self::UV_LOCATION,
                    format: VertexFormat::Float32x2,
                    offset: 24,
                },
            ],
        }
    }
}

/// Mix uniform block (group 0, binding 0)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MixUniform {
    pub mix_ratio: f32,
    pub _padding: [f32; 3],
}

impl MixUniform {
    pub fn new(mix_ratio: f32) -> Self {
        Self {
            mix_ratio,
            _padding: [0.0; 3],
        }
    }
}

/// Primitive topology
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveTopology {
    TriangleList,
}

/// Front face winding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontFace {
    Ccw,
}

/// Cull mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullMode {
    None,
}

/// Filter mode for samplers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Linear,
}

/// Address mode for samplers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressMode {
    Repeat,
}

/// Sampler descriptor
#[derive(Debug, Clone)]
pub struct SamplerDescriptor {
    pub label: Option<String>,
    pub mag_filter: FilterMode,
    pub min_filter: FilterMode,
    pub mipmap_filter: FilterMode,
    pub address_mode_u: AddressMode,
    pub address_mode_v: AddressMode,
}

impl SamplerDescriptor {
    /// Linear-mipmap-linear minification with linear magnification
    pub fn trilinear(label: &str) -> Self {
        Self {
            label: Some(label.to_string()),
            mag_filter: FilterMode::Linear,
            min_filter: FilterMode::Linear,
            mipmap_filter: FilterMode::Linear,
            address_mode_u: AddressMode::Repeat,
            address_mode_v: AddressMode::Repeat,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_eight_floats() {
        assert_eq!(std::mem::size_of::<Vertex>(), 8 * 4);
    }

    #[test]
    fn layout_matches_interleaved_offsets() {
        let layout = Vertex::layout();
        assert_eq!(layout.array_stride, 32);
        let offsets: Vec<u64> = layout.attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 12, 24]);
        let locations: Vec<u32> = layout.attributes.iter().map(|a| a.location).collect();
        assert_eq!(locations, vec![0, 1, 2]);
        assert!(layout.provides(2));
        assert!(!layout.provides(3));
    }

    #[test]
    fn mix_uniform_is_one_vec4() {
        assert_eq!(std::mem::size_of::<MixUniform>(), 16);
        assert_eq!(MixUniform::new(0.4).mix_ratio, 0.4);
    }

    fn texture(width: u32, height: u32) -> TextureDescriptor {
        TextureDescriptor {
            label: Some("photo".into()),
            width,
            height,
            mip_levels: 1,
            format: TextureFormat::Rgba8UnormSrgb,
            usage: TextureUsage::TEXTURE_BINDING | TextureUsage::COPY_DST,
        }
    }

    #[test]
    fn texture_size_within_limit_is_accepted() {
        assert!(texture(2048, 1).check_size(2048).is_ok());
        assert!(texture(1, 1).check_size(2048).is_ok());
    }

    #[test]
    fn texture_size_above_limit_is_rejected() {
        let err = texture(20000, 10).check_size(8192).unwrap_err();
        assert!(matches!(err, BackendError::TextureCreationFailed(_)));
        assert!(err.to_string().contains("20000x10"));
        assert!(texture(10, 8193).check_size(8192).is_err());
    }

    #[test]
    fn zero_sized_texture_is_rejected() {
        assert!(texture(0, 4).check_size(8192).is_err());
        assert!(texture(4, 0).check_size(8192).is_err());
    }
}
