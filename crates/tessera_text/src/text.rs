use std::rc::Rc;

use glam::{Vec2, Vec3};
use tessera_render::{Color, Context, DrawItem, Drawable, GraphicsDevice, Primitive2D, TextureId};

use crate::{
    bmfont::BmFont,
    font::{Font, layout},
};

/// A string rendered as one triangle list with a distance field font
///
/// `size` is the height of one line in world units (width scales the same way)
pub struct Text {
    primitive: Primitive2D,
    text: String,
    font: Rc<BmFont>,
}

impl Text {
    pub fn new(
        gpu: &mut impl GraphicsDevice,
        font: &Font,
        text: &str,
        position: Vec3,
        size: Vec2,
        color: Color,
    ) -> Self {
        let mesh = layout(font.bm(), text);
        let mut primitive = Primitive2D::triangles(
            gpu,
            font.program().clone(),
            mesh.vertices,
            mesh.uvs,
            Some(font.texture()),
            position,
            size,
        );
        primitive.set_color(color);
        Self {
            primitive,
            text: text.to_string(),
            font: Rc::clone(font.bm()),
        }
    }

    /// Lays out & uploads new glyphs, only if the string changed
    pub fn set_text(&mut self, gpu: &mut impl GraphicsDevice, text: &str) {
        if self.text == text {
            return;
        }
        self.text = text.to_string();
        let mesh = layout(&self.font, text);
        self.primitive.set_mesh(gpu, mesh.vertices, mesh.uvs);
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_color(&mut self, color: Color) {
        self.primitive.set_color(color);
    }

    pub fn color(&self) -> Color {
        self.primitive.color()
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.primitive.set_position(position);
    }

    pub fn position(&self) -> Vec3 {
        self.primitive.position()
    }

    pub fn set_size(&mut self, size: Vec2) {
        self.primitive.set_size(size);
    }

    /// The underlying primitive, for anchoring, rotation & scale
    pub fn primitive_mut(&mut self) -> &mut Primitive2D {
        &mut self.primitive
    }

    /// Binds the font texture & program, then draws right away
    pub fn draw(&mut self, gpu: &mut impl GraphicsDevice, context: &mut Context) {
        self.primitive.draw(gpu, context);
    }

    pub fn draw_in_batch(&mut self, gpu: &mut impl GraphicsDevice) {
        self.primitive.draw_in_batch(gpu);
    }

    pub fn release(self, gpu: &mut impl GraphicsDevice) {
        self.primitive.release(gpu);
    }
}

impl Drawable for Text {
    fn texture_id(&self) -> TextureId {
        self.primitive.texture_id()
    }

    fn draw_item(&mut self) -> DrawItem {
        self.primitive.draw_item()
    }
}
