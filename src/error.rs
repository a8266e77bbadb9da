//! Error type for renderer setup and asset loading

use crate::backend::BackendError;
use crate::resources::ShaderStage;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuadError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to decode image {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Failed to compile {stage:?} shader {}: {message}", path.display())]
    ShaderCompilation {
        stage: ShaderStage,
        path: PathBuf,
        message: String,
    },
    #[error("Failed to link shader program: {0}")]
    ShaderLink(String),
    #[error("Window system error: {0}")]
    Window(String),
    #[error("Renderer used before initialize()")]
    NotInitialized,
}

pub type QuadResult<T> = Result<T, QuadError>;
