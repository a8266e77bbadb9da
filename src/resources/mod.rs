//! Resource management
//!
//! Handles loading of the quad mesh, its textures and its shader program.

mod mesh;
mod shader;
mod texture;

pub use mesh::*;
pub use shader::*;
pub use texture::*;
