//! Error types shared across the crate.
//!
//! Only [`InitError`] is fatal. Shader, uniform, and texture errors are
//! reported through the log and the program keeps running with whatever
//! degraded resource it ended up with.

use std::path::PathBuf;

use thiserror::Error;

/// Failures while bringing up the window and GPU. These end the program.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("surface reports no supported formats")]
    NoSurfaceFormat,
    #[error("failed to read shader source {path:?}: {source}")]
    ShaderSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A shader stage failed to compile or a program failed to link.
#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("error compiling {stage} shader `{label}`:\n{log}")]
    Compile {
        stage: &'static str,
        label: String,
        log: String,
    },
    #[error("error linking shader program `{label}`:\n{log}")]
    Link { label: String, log: String },
    #[error("shader program `{label}` has {expected} texture slots, got {actual} textures")]
    TextureCount {
        label: String,
        expected: usize,
        actual: usize,
    },
}

/// Rejected uniform writes.
#[derive(Debug, Error, PartialEq)]
pub enum UniformError {
    #[error("no uniform named `{0}`")]
    UnknownName(String),
    #[error("uniform `{name}` is {expected:?}, got {actual:?}")]
    TypeMismatch {
        name: String,
        expected: crate::uniform::UniformType,
        actual: crate::uniform::UniformType,
    },
}

/// Geometry that cannot be uploaded as an indexed triangle list.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeometryError {
    #[error("index {index} at position {position} is out of bounds for {vertex_count} vertices")]
    IndexOutOfBounds {
        position: usize,
        index: u32,
        vertex_count: usize,
    },
    #[error("index count {0} is not a multiple of 3")]
    NotTriangles(usize),
    #[error("a polygon needs at least 3 sides, got {0}")]
    TooFewSides(u32),
}

/// An image could not be turned into a texture.
#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to load texture {path:?}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Errors returned from [`run_with_config`](crate::run_with_config).
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Init(#[from] InitError),
    #[error("setup failed: {0}")]
    Setup(#[source] anyhow::Error),
    #[error("surface ran out of memory")]
    SurfaceOutOfMemory,
}
