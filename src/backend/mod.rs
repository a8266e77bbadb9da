//! Backend abstraction layer
//!
//! Provides the common trait and types that the wgpu backend and the
//! headless recording backend implement.

pub mod recording;
pub mod traits;
pub mod types;
pub mod wgpu_backend;

pub use traits::*;
pub use types::*;
