use std::path::PathBuf;

use thiserror::Error;

/// A required asset could not be read or decoded
#[derive(Debug, Error)]
pub enum AssetLoadError {
    #[error("failed to read `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image `{path}`: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("malformed asset `{path}`: {reason}")]
    Malformed { path: PathBuf, reason: String },
}

/// A shader program failed to compile or link on the GPU
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("failed to compile shader `{label}`: {message}")]
    Compile { label: String, message: String },
    #[error("failed to link program `{label}`: {message}")]
    Link { label: String, message: String },
}

/// Invalid input for a procedurally built mesh
#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("radius must be greater than 0, got {0}")]
    InvalidRadius(f32),
    #[error("a polygon needs at least 3 segments, got {0}")]
    TooFewSegments(usize),
    #[error("a polyline needs at least 2 points, got {0}")]
    TooFewPoints(usize),
}

/// Failures while creating or driving the `wgpu` backend
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible GPU adapter: {0}")]
    RequestAdapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to open GPU device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("surface is not supported by the adapter")]
    UnsupportedSurface,
    #[error("failed to acquire frame: {0}")]
    Surface(#[from] wgpu::SurfaceError),
    #[error("a {width}x{height} RGBA texture does not fit in memory")]
    TextureTooLarge { width: u32, height: u32 },
}
