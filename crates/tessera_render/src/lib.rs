pub mod cached;
pub mod camera;
pub mod color;
pub mod context;
pub mod device;
pub mod error;
pub mod math;
pub mod primitives;
pub mod renderer;
pub mod shader;
pub mod texture;

pub use camera::Camera2D;
pub use color::Color;
pub use context::{Context, DrawItem, Drawable};
pub use device::{
    DrawMode, GraphicsDevice, MeshId, MeshVertex, ProgramId, ShaderSource, TextureId,
    UniformValue,
};
pub use error::{AssetLoadError, CompileError, GeometryError, RenderError};
pub use primitives::Primitive2D;
pub use renderer::Renderer;
pub use shader::ShaderProgram;
pub use texture::{Texture, TextureHandle, TextureStorage};

pub use glam;
