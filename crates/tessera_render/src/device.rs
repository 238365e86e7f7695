//! The small set of GPU verbs the toolkit is written against
//!
//! [`crate::Renderer`] implements them over `wgpu`; tests use [`mock::MockDevice`].

use std::borrow::Cow;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};

use crate::error::CompileError;

/// Handle of an uploaded mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(pub u32);

/// Handle of an uploaded texture; [`TextureId::NONE`] binds a plain white texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TextureId(pub u32);

impl TextureId {
    pub const NONE: TextureId = TextureId(0);
}

/// Handle of a compiled shader program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub u32);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Mat4(Mat4),
    Vec4(Vec4),
}

impl From<Mat4> for UniformValue {
    fn from(value: Mat4) -> Self {
        Self::Mat4(value)
    }
}

impl From<Vec4> for UniformValue {
    fn from(value: Vec4) -> Self {
        Self::Vec4(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawMode {
    TriangleFan,
    Triangles,
    LineStrip,
}

/// A mesh vertex: local position & texture coordinates
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
}

impl MeshVertex {
    pub fn new(position: [f32; 2], uv: [f32; 2]) -> Self {
        Self { position, uv }
    }
}

/// Vertex & fragment stages of a program, in WGSL
///
/// Both stages are appended to a shared prelude declaring the uniforms
/// (`projection`, `model`, `color`), the texture bindings & the vertex layout
#[derive(Debug, Clone)]
pub struct ShaderSource {
    pub label: Cow<'static, str>,
    pub vertex: Cow<'static, str>,
    pub fragment: Cow<'static, str>,
}

/// Uniform names every program can set, in slot order
pub const UNIFORM_NAMES: [&str; 3] = ["projection", "model", "color"];

/// Resolves a uniform name against the shared uniform block
pub fn builtin_uniform(name: &str) -> Option<UniformLocation> {
    UNIFORM_NAMES
        .iter()
        .position(|n| *n == name)
        .map(|slot| UniformLocation(slot as u32))
}

/// Graphics verbs, issued in order from a single thread
///
/// Binds & uniforms are sticky: a draw uses whatever was bound last.
/// Handles are released exactly once by their owner.
pub trait GraphicsDevice {
    fn create_mesh(&mut self, vertices: &[MeshVertex]) -> MeshId;
    fn update_mesh(&mut self, mesh: MeshId, vertices: &[MeshVertex]);
    fn release_mesh(&mut self, mesh: MeshId);

    /// Uploads tightly packed RGBA8 pixels
    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> TextureId;
    fn release_texture(&mut self, texture: TextureId);

    fn compile_program(&mut self, source: &ShaderSource) -> Result<ProgramId, CompileError>;
    fn release_program(&mut self, program: ProgramId);
    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation>;

    fn bind_program(&mut self, program: ProgramId);
    fn bind_texture(&mut self, texture: TextureId);
    /// Sets a uniform of the bound program
    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue);

    /// Draws the first `count` vertices of `mesh`
    fn draw(&mut self, mesh: MeshId, mode: DrawMode, count: u32);
}

#[cfg(any(test, feature = "testing"))]
pub mod mock {
    use std::collections::HashMap;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        CreateMesh(MeshId, usize),
        UpdateMesh(MeshId, usize),
        ReleaseMesh(MeshId),
        CreateTexture(TextureId, u32, u32),
        ReleaseTexture(TextureId),
        CompileProgram(ProgramId),
        ReleaseProgram(ProgramId),
        UniformLookup(ProgramId, String),
        BindProgram(ProgramId),
        BindTexture(TextureId),
        SetUniform(UniformLocation, UniformValue),
        Draw(MeshId, DrawMode, u32),
    }

    /// Records every verb instead of touching a GPU
    #[derive(Default)]
    pub struct MockDevice {
        pub calls: Vec<Call>,
        pub meshes: HashMap<MeshId, Vec<MeshVertex>>,
        /// Makes the next `compile_program` fail
        pub fail_compile: bool,
        next_id: u32,
    }

    impl MockDevice {
        pub fn new() -> Self {
            Self::default()
        }

        fn next(&mut self) -> u32 {
            self.next_id += 1;
            self.next_id
        }

        pub fn texture_binds(&self) -> Vec<TextureId> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    Call::BindTexture(id) => Some(*id),
                    _ => None,
                })
                .collect()
        }

        pub fn program_binds(&self) -> usize {
            self.count(|c| matches!(c, Call::BindProgram(_)))
        }

        /// Mesh creations plus re-uploads
        pub fn uploads(&self) -> usize {
            self.count(|c| matches!(c, Call::CreateMesh(..) | Call::UpdateMesh(..)))
        }

        pub fn draws(&self) -> usize {
            self.count(|c| matches!(c, Call::Draw(..)))
        }

        pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
            self.calls.iter().filter(|c| pred(c)).count()
        }

        pub fn mesh(&self, id: MeshId) -> &[MeshVertex] {
            self.meshes.get(&id).map(Vec::as_slice).unwrap_or_default()
        }

        pub fn clear(&mut self) {
            self.calls.clear();
        }
    }

    impl GraphicsDevice for MockDevice {
        fn create_mesh(&mut self, vertices: &[MeshVertex]) -> MeshId {
            let id = MeshId(self.next());
            self.meshes.insert(id, vertices.to_vec());
            self.calls.push(Call::CreateMesh(id, vertices.len()));
            id
        }

        fn update_mesh(&mut self, mesh: MeshId, vertices: &[MeshVertex]) {
            self.meshes.insert(mesh, vertices.to_vec());
            self.calls.push(Call::UpdateMesh(mesh, vertices.len()));
        }

        fn release_mesh(&mut self, mesh: MeshId) {
            self.meshes.remove(&mesh);
            self.calls.push(Call::ReleaseMesh(mesh));
        }

        fn create_texture(&mut self, width: u32, height: u32, _rgba: &[u8]) -> TextureId {
            let id = TextureId(self.next());
            self.calls.push(Call::CreateTexture(id, width, height));
            id
        }

        fn release_texture(&mut self, texture: TextureId) {
            self.calls.push(Call::ReleaseTexture(texture));
        }

        fn compile_program(&mut self, source: &ShaderSource) -> Result<ProgramId, CompileError> {
            if std::mem::take(&mut self.fail_compile) {
                return Err(CompileError::Compile {
                    label: source.label.to_string(),
                    message: "rejected by mock".into(),
                });
            }
            let id = ProgramId(self.next());
            self.calls.push(Call::CompileProgram(id));
            Ok(id)
        }

        fn release_program(&mut self, program: ProgramId) {
            self.calls.push(Call::ReleaseProgram(program));
        }

        fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation> {
            self.calls.push(Call::UniformLookup(program, name.to_string()));
            builtin_uniform(name)
        }

        fn bind_program(&mut self, program: ProgramId) {
            self.calls.push(Call::BindProgram(program));
        }

        fn bind_texture(&mut self, texture: TextureId) {
            self.calls.push(Call::BindTexture(texture));
        }

        fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
            self.calls.push(Call::SetUniform(location, value));
        }

        fn draw(&mut self, mesh: MeshId, mode: DrawMode, count: u32) {
            self.calls.push(Call::Draw(mesh, mode, count));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_uniform_slots() {
        // only the shared uniform block resolves
        assert_eq!(builtin_uniform("projection"), Some(UniformLocation(0)));
        assert_eq!(builtin_uniform("model"), Some(UniformLocation(1)));
        assert_eq!(builtin_uniform("color"), Some(UniformLocation(2)));
        assert_eq!(builtin_uniform("time"), None);
    }

    #[test]
    fn vertex_layout_is_packed() {
        // the pipeline uses a 16 byte stride
        assert_eq!(std::mem::size_of::<MeshVertex>(), 16);
    }
}
