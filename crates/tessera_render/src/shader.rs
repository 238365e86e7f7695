use std::{borrow::Cow, cell::RefCell, collections::HashMap};

use crate::{
    device::{GraphicsDevice, ProgramId, ShaderSource, UniformLocation, UniformValue},
    error::CompileError,
};

/// Declarations shared by every program: uniforms, texture bindings & vertex layout
pub const PRELUDE: &str = include_str!("../shaders/prelude.wgsl");
/// Vertex stage applying `projection * model`
pub const VERTEX: &str = include_str!("../shaders/vertex.wgsl");
const SOLID: &str = include_str!("../shaders/solid.wgsl");
const TEXTURED: &str = include_str!("../shaders/textured.wgsl");

/// A compiled program plus a cache of its uniform locations
///
/// Programs are shared between primitives through `Rc` & released once by
/// whoever created them.
#[derive(Debug)]
pub struct ShaderProgram {
    id: ProgramId,
    label: String,
    locations: RefCell<HashMap<String, Option<UniformLocation>>>,
}

impl ShaderProgram {
    pub fn new(gpu: &mut impl GraphicsDevice, source: ShaderSource) -> Result<Self, CompileError> {
        let id = gpu.compile_program(&source)?;
        log::debug!("compiled shader program `{}`", source.label);
        Ok(Self {
            id,
            label: source.label.into_owned(),
            locations: RefCell::default(),
        })
    }

    /// A program with the stock vertex stage & a custom fragment stage
    pub fn with_fragment(
        gpu: &mut impl GraphicsDevice,
        label: &'static str,
        fragment: impl Into<Cow<'static, str>>,
    ) -> Result<Self, CompileError> {
        Self::new(
            gpu,
            ShaderSource {
                label: label.into(),
                vertex: VERTEX.into(),
                fragment: fragment.into(),
            },
        )
    }

    /// Flat `color` uniform, ignores the bound texture
    pub fn solid_color(gpu: &mut impl GraphicsDevice) -> Result<Self, CompileError> {
        Self::with_fragment(gpu, "solid color", SOLID)
    }

    /// Bound texture tinted by `color`
    pub fn textured(gpu: &mut impl GraphicsDevice) -> Result<Self, CompileError> {
        Self::with_fragment(gpu, "textured", TEXTURED)
    }

    /// The program primitives use unless told otherwise
    ///
    /// Untextured primitives sample the white fallback texture, so this draws
    /// plain `color` for them
    pub fn default_program(gpu: &mut impl GraphicsDevice) -> Result<Self, CompileError> {
        Self::textured(gpu)
    }

    pub fn id(&self) -> ProgramId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Looks up a uniform, asking the device only the first time per name
    pub fn uniform(&self, gpu: &mut impl GraphicsDevice, name: &str) -> Option<UniformLocation> {
        if let Some(location) = self.locations.borrow().get(name) {
            return *location;
        }
        let location = gpu.uniform_location(self.id, name);
        if location.is_none() {
            log::debug!("program `{}` has no uniform `{name}`", self.label);
        }
        self.locations.borrow_mut().insert(name.to_string(), location);
        location
    }

    /// Sets a uniform on this program, which must be the bound one
    ///
    /// Unknown names are ignored
    pub fn set_uniform(
        &self,
        gpu: &mut impl GraphicsDevice,
        name: &str,
        value: impl Into<UniformValue>,
    ) {
        if let Some(location) = self.uniform(gpu, name) {
            gpu.set_uniform(location, value.into());
        }
    }

    pub fn release(&self, gpu: &mut impl GraphicsDevice) {
        gpu.release_program(self.id);
    }
}

#[cfg(test)]
mod tests {
    use glam::Mat4;

    use super::*;
    use crate::device::mock::{Call, MockDevice};

    #[test]
    fn uniform_lookups_are_cached() {
        // the device is asked once per name, misses included
        let mut gpu = MockDevice::new();
        let program = ShaderProgram::default_program(&mut gpu).unwrap();
        program.set_uniform(&mut gpu, "model", Mat4::IDENTITY);
        program.set_uniform(&mut gpu, "model", Mat4::IDENTITY);
        program.set_uniform(&mut gpu, "missing", Mat4::IDENTITY);
        program.set_uniform(&mut gpu, "missing", Mat4::IDENTITY);

        assert_eq!(gpu.count(|c| matches!(c, Call::UniformLookup(..))), 2);
        assert_eq!(gpu.count(|c| matches!(c, Call::SetUniform(..))), 2);
    }

    #[test]
    fn compile_failure_is_reported() {
        // a rejected program surfaces as an error, not a panic
        let mut gpu = MockDevice::new();
        gpu.fail_compile = true;
        let err = ShaderProgram::solid_color(&mut gpu).unwrap_err();
        assert!(matches!(err, CompileError::Compile { .. }));
    }

    #[test]
    fn stages_share_the_prelude_entry_points() {
        // every stock stage relies on the prelude's declarations
        assert!(PRELUDE.contains("struct Uniforms"));
        assert!(VERTEX.contains("fn vs_main"));
        assert!(SOLID.contains("fn fs_main") && TEXTURED.contains("fn fs_main"));
    }
}
