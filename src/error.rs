use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::quadric::QuadricError;
use crate::raw_image::RawImageError;
use crate::world::WorldError;

/// Errors surfaced by the lesson framework.
#[derive(Debug, Error)]
pub enum NeHeError {
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable GPU adapter: {0}")]
    RequestAdapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to create device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("failed to acquire surface texture: {0}")]
    Surface(#[from] wgpu::SurfaceError),
    #[error("surface reports no supported formats")]
    NoSurfaceFormat,
    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("failed to read {}: {source}", path.display())]
    Resource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    World(#[from] WorldError),
    #[error(transparent)]
    RawImage(#[from] RawImageError),
    #[error(transparent)]
    Quadric(#[from] QuadricError),
    #[error("failed to load font: {0}")]
    Font(String),
}

impl NeHeError {
    pub(crate) fn resource(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Resource {
            path: path.into(),
            source,
        }
    }
}
