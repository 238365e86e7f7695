use std::{collections::HashMap, rc::Rc};

use glam::Mat4;

use crate::{
    camera::Camera2D,
    color::Color,
    device::{DrawMode, GraphicsDevice, MeshId, ProgramId, TextureId},
    shader::ShaderProgram,
};

/// Everything needed to replay one drawable inside a batch
///
/// Captured at enqueue time, so the drawable may change or move afterwards
#[derive(Debug, Clone)]
pub struct DrawItem {
    pub mesh: MeshId,
    pub mode: DrawMode,
    pub vertex_count: u32,
    pub program: Rc<ShaderProgram>,
    pub model: Mat4,
    pub color: Color,
}

impl DrawItem {
    /// Uploads model & color then draws; texture & program must already be bound
    pub fn draw_in_batch(&self, gpu: &mut impl GraphicsDevice) {
        self.program.set_uniform(gpu, "model", self.model);
        self.program.set_uniform(gpu, "color", glam::Vec4::from(self.color));
        gpu.draw(self.mesh, self.mode, self.vertex_count);
    }
}

/// Anything the [`Context`] can batch
pub trait Drawable {
    /// Batching key; [`TextureId::NONE`] for untextured drawables
    fn texture_id(&self) -> TextureId;
    fn draw_item(&mut self) -> DrawItem;
}

/// Groups drawables by texture so each texture is bound once per frame
///
/// Within a texture, items draw in enqueue order. The order between textures
/// is unspecified: overlapping translucent drawables on different textures
/// should share an atlas or go through the immediate path.
pub struct Context {
    camera: Camera2D,
    buckets: HashMap<TextureId, Vec<DrawItem>>,
    bound_texture: Option<TextureId>,
    bound_program: Option<ProgramId>,
}

impl Context {
    pub fn new(camera: Camera2D) -> Self {
        Self {
            camera,
            buckets: HashMap::new(),
            bound_texture: None,
            bound_program: None,
        }
    }

    pub fn camera(&self) -> &Camera2D {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera2D {
        &mut self.camera
    }

    /// Binds a texture unless it is the one bound last
    pub fn bind_texture(&mut self, gpu: &mut impl GraphicsDevice, texture: TextureId) {
        if self.bound_texture != Some(texture) {
            gpu.bind_texture(texture);
            self.bound_texture = Some(texture);
        }
    }

    /// Binds a program unless it is the one bound last
    pub fn bind_shader(&mut self, gpu: &mut impl GraphicsDevice, program: &ShaderProgram) {
        if self.bound_program != Some(program.id()) {
            gpu.bind_program(program.id());
            self.bound_program = Some(program.id());
        }
    }

    /// Forget what is bound, e.g. after another context used the same device
    pub fn reset_bindings(&mut self) {
        self.bound_texture = None;
        self.bound_program = None;
    }

    /// Queues a drawable for the next [`Context::render`]
    pub fn enqueue(&mut self, drawable: &mut impl Drawable) {
        let texture = drawable.texture_id();
        self.buckets
            .entry(texture)
            .or_default()
            .push(drawable.draw_item());
    }

    /// Draws every queued item, one texture bind per bucket
    pub fn render(&mut self, gpu: &mut impl GraphicsDevice) {
        self.reset_bindings();
        let projection = self.camera.projection_matrix();

        let buckets = std::mem::take(&mut self.buckets);
        for (texture, items) in &buckets {
            self.bind_texture(gpu, *texture);
            for item in items {
                self.bind_shader(gpu, &item.program);
                item.program.set_uniform(gpu, "projection", projection);
                item.draw_in_batch(gpu);
            }
        }
        self.buckets = buckets;
    }

    /// Drops all queued items; call once per frame after rendering
    pub fn erase(&mut self) {
        self.buckets.clear();
    }

    /// Number of queued items
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(Vec::is_empty)
    }
}
