//! Error type shared by the whole crate.

use crate::geometry::GeometryError;

/// Errors surfaced by the crossfade renderer.
///
/// Most runtime problems (an unreadable model, unsupported multisampling, a lost
/// surface) are handled by degrading instead of failing, so the variants here are
/// mostly startup and caller errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A selection referenced a catalog position that does not exist.
    #[error("invalid model index {index} (catalog holds {len} models)")]
    InvalidModelIndex { index: usize, len: usize },

    /// The model catalog has no entries at all.
    #[error("model catalog is empty")]
    EmptyCatalog,

    #[error("geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to create GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    /// The adapter reports no usable configuration for the window surface.
    #[error("surface unsupported by the adapter: {0}")]
    SurfaceUnsupported(&'static str),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
