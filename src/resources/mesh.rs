//! Quad geometry and its GPU upload

use crate::backend::traits::*;
use crate::backend::types::*;

/// A mesh with vertex and index data
#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub name: String,
}

impl Mesh {
    /// Unit quad centered at the origin, two triangles sharing the diagonal
    pub fn quad() -> Self {
        let vertices = vec![
            // top right
            Vertex::new([0.5, 0.5, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0]),
            // bottom right
            Vertex::new([0.5, -0.5, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0]),
            // bottom left
            Vertex::new([-0.5, -0.5, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
            // top left
            Vertex::new([-0.5, 0.5, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0]),
        ];

        Self {
            vertices,
            indices: vec![0, 1, 3, 1, 2, 3],
            name: "quad".to_string(),
        }
    }

    /// Calculate vertex count
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Calculate index count
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Get vertex data as bytes
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Get index data as bytes
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// GPU resources for a mesh
#[derive(Debug, Clone, Copy)]
pub struct GpuMesh {
    pub vertex_buffer: BufferHandle,
    pub index_buffer: BufferHandle,
    pub index_count: u32,
    pub index_format: IndexFormat,
}

impl GpuMesh {
    pub fn create<B: GraphicsBackend + ?Sized>(backend: &mut B, mesh: &Mesh) -> BackendResult<Self> {
        let vertex_bytes = mesh.vertex_bytes();
        let vertex_buffer = backend.create_buffer_init(
            &BufferDescriptor {
                label: Some(format!("{} vertices", mesh.name)),
                size: vertex_bytes.len() as u64,
                usage: BufferUsage::VERTEX,
            },
            vertex_bytes,
        )?;

        let index_bytes = mesh.index_bytes();
        let index_buffer = backend.create_buffer_init(
            &BufferDescriptor {
                label: Some(format!("{} indices", mesh.name)),
                size: index_bytes.len() as u64,
                usage: BufferUsage::INDEX,
            },
            index_bytes,
        )?;

        log::debug!(
            "Uploaded mesh '{}': {} vertices ({} bytes), {} indices ({} bytes)",
            mesh.name,
            mesh.vertex_count(),
            vertex_bytes.len(),
            mesh.index_count(),
            index_bytes.len()
        );

        Ok(Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.index_count() as u32,
            index_format: IndexFormat::Uint32,
        })
    }
}
