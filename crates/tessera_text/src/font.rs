use std::{path::Path, rc::Rc};

use glam::{Vec2, vec2};
use tessera_render::{GraphicsDevice, ShaderProgram, Texture, TextureHandle};

use crate::{FontError, bmfont::BmFont};

const DISTANCE_FIELD: &str = include_str!("../shaders/distance_field.wgsl");

/// Glyph quads for a whole string, six vertices per glyph
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextMesh {
    pub vertices: Vec<Vec2>,
    pub uvs: Vec<Vec2>,
}

/// A parsed bitmap font, its page texture & the distance field program
pub struct Font {
    bm: Rc<BmFont>,
    texture: Texture,
    program: Rc<ShaderProgram>,
}

impl Font {
    pub fn new(
        gpu: &mut impl GraphicsDevice,
        bm: BmFont,
        texture: Texture,
    ) -> Result<Self, FontError> {
        let program = ShaderProgram::with_fragment(gpu, "distance field text", DISTANCE_FIELD)?;
        Ok(Self {
            bm: Rc::new(bm),
            texture,
            program: Rc::new(program),
        })
    }

    /// Loads a `.fnt` description & its page image
    pub fn from_files(
        gpu: &mut impl GraphicsDevice,
        fnt: impl AsRef<Path>,
        page: impl AsRef<Path>,
    ) -> Result<Self, FontError> {
        let bm = BmFont::from_file(fnt)?;
        let texture = Texture::from_file(gpu, page)?;
        Self::new(gpu, bm, texture)
    }

    /// Loads a `.fnt` description & the page 0 image it names, from the same directory
    pub fn from_file(gpu: &mut impl GraphicsDevice, fnt: impl AsRef<Path>) -> Result<Self, FontError> {
        let fnt = fnt.as_ref();
        let bm = BmFont::from_file(fnt)?;
        let page = bm
            .page_files
            .get(&0)
            .ok_or_else(|| FontError::MissingPage(fnt.to_path_buf()))?;
        let page = fnt.with_file_name(page);
        let texture = Texture::from_file(gpu, page)?;
        Self::new(gpu, bm, texture)
    }

    pub fn bm(&self) -> &Rc<BmFont> {
        &self.bm
    }

    pub fn texture(&self) -> TextureHandle {
        self.texture.handle()
    }

    pub fn program(&self) -> &Rc<ShaderProgram> {
        &self.program
    }

    /// Frees the page texture & program; texts using this font must be gone
    pub fn release(self, gpu: &mut impl GraphicsDevice) {
        self.texture.release(gpu);
        self.program.release(gpu);
    }
}

/// Lays `text` out in units of one line height, y growing downwards
///
/// `\n` returns to x = 0 on the next line; characters missing from the font
/// are skipped with a warning.
pub fn layout(font: &BmFont, text: &str) -> TextMesh {
    let scale = 1.0 / font.line_height as f32;
    let page = vec2(font.page_width as f32, font.page_height as f32);
    let [pad_up, pad_right, pad_down, _] = font.padding.map(|p| p as f32);

    let mut mesh = TextMesh::default();
    let mut cursor = Vec2::ZERO;
    let mut previous = None;

    for c in text.chars() {
        if c == '\n' {
            cursor = vec2(0.0, cursor.y + 1.0);
            previous = None;
            continue;
        }
        let Some(glyph) = font.char(c) else {
            log::warn!("char {c:?} ({}) not found in font map", c as u32);
            continue;
        };

        let kerning = glyph.kerning(previous) as f32;
        let delta = vec2(
            (glyph.offset_x as f32 + kerning + pad_down) * scale,
            (glyph.offset_y as f32 + pad_up) * scale,
        );
        let size = vec2(glyph.width as f32, glyph.height as f32);

        mesh.vertices.extend(char_quad(cursor + delta, size * scale));
        mesh.uvs.extend(char_quad(
            vec2(glyph.x as f32, glyph.y as f32) / page,
            size / page,
        ));

        cursor.x += (glyph.advance_x as f32 + pad_right) * scale;
        previous = Some(c);
    }
    mesh
}

/// Two triangles: bl, br, tl & tl, br, tr
fn char_quad(origin: Vec2, size: Vec2) -> [Vec2; 6] {
    let tl = origin;
    let tr = origin + vec2(size.x, 0.0);
    let bl = origin + vec2(0.0, size.y);
    let br = origin + size;
    [bl, br, tl, tl, br, tr]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bmfont::tests::SAMPLE;

    fn assert_vec(actual: Vec2, expected: Vec2) {
        assert!((actual - expected).length() < 0.0001, "{actual} != {expected}");
    }

    #[test]
    fn single_glyph_quad() {
        // offsets & padding shift the quad, uv is in page units
        let font = BmFont::parse(SAMPLE).unwrap();
        let mesh = layout(&font, "A");
        assert_eq!(mesh.vertices.len(), 6);

        // x: (1 + 0 + 2) / 40, y: (2 + 4) / 40
        let tl = vec2(3.0 / 40.0, 6.0 / 40.0);
        let size = vec2(16.0 / 40.0, 24.0 / 40.0);
        assert_vec(mesh.vertices[2], tl);
        assert_vec(mesh.vertices[0], tl + vec2(0.0, size.y));
        assert_vec(mesh.vertices[5], tl + vec2(size.x, 0.0));
        assert_vec(mesh.vertices[4], tl + size);

        assert_vec(mesh.uvs[2], vec2(10.0 / 256.0, 20.0 / 128.0));
        assert_vec(mesh.uvs[4], vec2(26.0 / 256.0, 44.0 / 128.0));
    }

    #[test]
    fn advance_and_kerning() {
        // V follows A by A's advance plus right padding, pulled back by the kerning
        let font = BmFont::parse(SAMPLE).unwrap();
        let mesh = layout(&font, "AV");
        assert_eq!(mesh.vertices.len(), 12);

        let advance = (18.0 + 3.0) / 40.0;
        let v_left = advance + (0.0 - 2.0 + 2.0) / 40.0;
        assert_vec(mesh.vertices[8], vec2(v_left, 6.0 / 40.0));

        let plain = layout(&font, "VV");
        let second_left = (15.0 + 3.0) / 40.0 + 2.0 / 40.0;
        assert_vec(plain.vertices[8], vec2(second_left, 6.0 / 40.0));
    }

    #[test]
    fn newline_resets_cursor() {
        // the second line starts at x = 0, one line lower, without kerning
        let font = BmFont::parse(SAMPLE).unwrap();
        let mesh = layout(&font, "A\nV");
        assert_eq!(mesh.vertices.len(), 12);
        assert_vec(mesh.vertices[8], vec2(2.0 / 40.0, 1.0 + 6.0 / 40.0));
    }

    #[test]
    fn unknown_chars_are_skipped() {
        // Z has no glyph, so only A & V produce quads
        let font = BmFont::parse(SAMPLE).unwrap();
        assert_eq!(layout(&font, "AZV").vertices.len(), 12);
        assert!(layout(&font, "").vertices.is_empty());
    }
}
