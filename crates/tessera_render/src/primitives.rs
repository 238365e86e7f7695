use std::rc::Rc;

use glam::{Mat4, Quat, Vec2, Vec3, Vec4, vec2};

use crate::{
    cached::Cached,
    color::Color,
    context::{Context, DrawItem, Drawable},
    device::{DrawMode, GraphicsDevice, MeshId, MeshVertex, TextureId},
    error::GeometryError,
    math::{bounding_box, circle_to_polygon},
    shader::ShaderProgram,
    texture::TextureHandle,
};

const UNIT_SQUARE: [Vec2; 4] = [
    vec2(0.0, 0.0),
    vec2(0.0, 1.0),
    vec2(1.0, 1.0),
    vec2(1.0, 0.0),
];

/// A GPU mesh with its own 2D transform, color & optional texture
///
/// Mesh vertices live in local units that get stretched by `size`; the
/// `anchor` (in the same units as `size`) is the pivot placed at `position`.
/// The z of `position` only decides which primitive ends up on top.
pub struct Primitive2D {
    position: Vec3,
    size: Vec2,
    anchor: Vec2,
    angle: f32,
    scale: Vec2,
    flip_x: bool,
    flip_y: bool,
    color: Color,
    model: Cached<Mat4>,

    mesh: MeshId,
    mode: DrawMode,
    positions: Vec<Vec2>,
    uvs: Vec<Vec2>,
    program: Rc<ShaderProgram>,
    texture: Option<TextureHandle>,
}

impl Primitive2D {
    /// Uploads a mesh; `uvs` shorter than `positions` are padded with zeros
    pub fn new(
        gpu: &mut impl GraphicsDevice,
        program: Rc<ShaderProgram>,
        mode: DrawMode,
        positions: Vec<Vec2>,
        uvs: Vec<Vec2>,
    ) -> Self {
        let mesh = gpu.create_mesh(&interleave(&positions, &uvs));
        Self {
            position: Vec3::ZERO,
            size: Vec2::ONE,
            anchor: Vec2::ZERO,
            angle: 0.0,
            scale: Vec2::ONE,
            flip_x: false,
            flip_y: false,
            color: Color::WHITE,
            model: Cached::new(Mat4::IDENTITY),
            mesh,
            mode,
            positions,
            uvs,
            program,
            texture: None,
        }
    }

    /// A unit square stretched to `size`, anchored at its top-left corner
    pub fn quad(
        gpu: &mut impl GraphicsDevice,
        program: Rc<ShaderProgram>,
        position: Vec3,
        size: Vec2,
    ) -> Self {
        let mut quad = Self::new(
            gpu,
            program,
            DrawMode::TriangleFan,
            UNIT_SQUARE.to_vec(),
            UNIT_SQUARE.to_vec(),
        );
        quad.set_position(position);
        quad.set_size(size);
        quad
    }

    /// A regular polygon approximating a circle around `center`
    ///
    /// Filled polygons are fans, outlines are closed line strips
    pub fn regular_polygon(
        gpu: &mut impl GraphicsDevice,
        program: Rc<ShaderProgram>,
        center: Vec3,
        radius: f32,
        segments: usize,
        filled: bool,
    ) -> Result<Self, GeometryError> {
        let mut points = circle_to_polygon(Vec2::ZERO, radius, segments, 0.0)?;
        points.push(points[0]);

        let mode = if filled {
            DrawMode::TriangleFan
        } else {
            DrawMode::LineStrip
        };
        let mut polygon = Self::new(gpu, program, mode, points, Vec::new());
        polygon.set_position(center);
        Ok(polygon)
    }

    /// A line strip through `points`, given relative to `position`
    ///
    /// The mesh is stored normalized to the points' bounding box, with `size`
    /// set to the box size & the anchor compensating for the box offset.
    pub fn polyline(
        gpu: &mut impl GraphicsDevice,
        program: Rc<ShaderProgram>,
        position: Vec3,
        points: &[Vec2],
        closed: bool,
    ) -> Result<Self, GeometryError> {
        if points.len() < 2 {
            return Err(GeometryError::TooFewPoints(points.len()));
        }

        let (min, max) = bounding_box(points);
        // degenerate axes keep a unit extent
        let extent = max - min;
        let size = vec2(
            if extent.x > 0.0 { extent.x } else { 1.0 },
            if extent.y > 0.0 { extent.y } else { 1.0 },
        );

        let mut vertices: Vec<_> = points.iter().map(|p| (*p - min) / size).collect();
        if closed {
            vertices.push(vertices[0]);
        }

        let mut line = Self::new(gpu, program, DrawMode::LineStrip, vertices, Vec::new());
        line.set_position(position);
        line.set_size(size);
        line.set_anchor(-min);
        Ok(line)
    }

    /// A raw triangle list, as used for text
    pub fn triangles(
        gpu: &mut impl GraphicsDevice,
        program: Rc<ShaderProgram>,
        vertices: Vec<Vec2>,
        uvs: Vec<Vec2>,
        texture: Option<TextureHandle>,
        position: Vec3,
        size: Vec2,
    ) -> Self {
        let mut mesh = Self::new(gpu, program, DrawMode::Triangles, vertices, uvs);
        mesh.texture = texture;
        mesh.set_position(position);
        mesh.set_size(size);
        mesh
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.model.invalidate();
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_anchor(&mut self, anchor: Vec2) {
        self.anchor = anchor;
        self.model.invalidate();
    }

    /// Pivot around the middle of `size`
    pub fn set_anchor_to_center(&mut self) {
        self.set_anchor(self.size / 2.0);
    }

    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    /// Rotation in radians around the anchor
    pub fn set_angle(&mut self, radians: f32) {
        self.angle = radians;
        self.model.invalidate();
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn set_scale(&mut self, scale: Vec2) {
        self.scale = scale;
        self.model.invalidate();
    }

    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    pub fn set_size(&mut self, size: Vec2) {
        self.size = size;
        self.model.invalidate();
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Match the texture's pixel size; no-op without a texture
    pub fn set_size_from_texture(&mut self) {
        if let Some(texture) = self.texture {
            self.set_size(texture.size());
        }
    }

    pub fn set_flip_x(&mut self, flip: bool) {
        self.flip_x = flip;
        self.model.invalidate();
    }

    pub fn flip_x(&self) -> bool {
        self.flip_x
    }

    pub fn set_flip_y(&mut self, flip: bool) {
        self.flip_y = flip;
        self.model.invalidate();
    }

    pub fn flip_y(&self) -> bool {
        self.flip_y
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// The texture must stay alive for as long as this primitive draws with it
    pub fn set_texture(&mut self, texture: Option<TextureHandle>) {
        self.texture = texture;
    }

    pub fn texture(&self) -> Option<TextureHandle> {
        self.texture
    }

    pub fn set_program(&mut self, program: Rc<ShaderProgram>) {
        self.program = program;
    }

    pub fn program(&self) -> &Rc<ShaderProgram> {
        &self.program
    }

    pub fn mesh_id(&self) -> MeshId {
        self.mesh
    }

    pub fn draw_mode(&self) -> DrawMode {
        self.mode
    }

    pub fn vertex_count(&self) -> u32 {
        self.positions.len() as u32
    }

    /// Replaces the local vertices & re-uploads the mesh
    pub fn set_vertices(&mut self, gpu: &mut impl GraphicsDevice, positions: Vec<Vec2>) {
        self.positions = positions;
        self.upload(gpu);
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.positions
    }

    /// Replaces the texture coordinates & re-uploads the mesh
    pub fn set_uv_coords(&mut self, gpu: &mut impl GraphicsDevice, uvs: Vec<Vec2>) {
        self.uvs = uvs;
        self.upload(gpu);
    }

    pub fn uv_coords(&self) -> &[Vec2] {
        &self.uvs
    }

    /// Replaces both vertices & texture coordinates with a single upload
    pub fn set_mesh(&mut self, gpu: &mut impl GraphicsDevice, positions: Vec<Vec2>, uvs: Vec<Vec2>) {
        self.positions = positions;
        self.uvs = uvs;
        self.upload(gpu);
    }

    fn upload(&self, gpu: &mut impl GraphicsDevice) {
        gpu.update_mesh(self.mesh, &interleave(&self.positions, &self.uvs));
    }

    /// `T(position) · R(angle) · S(scale · flip) · T(-anchor) · S(size)`, rebuilt on change
    pub fn model_matrix(&mut self) -> Mat4 {
        let flip = vec2(
            if self.flip_x { -1.0 } else { 1.0 },
            if self.flip_y { -1.0 } else { 1.0 },
        );
        let (position, angle, scale, anchor, size) = (
            self.position,
            self.angle,
            self.scale * flip,
            self.anchor,
            self.size,
        );
        *self.model.get_or_update(|| {
            Mat4::from_scale_rotation_translation(
                scale.extend(1.0),
                Quat::from_rotation_z(angle),
                position,
            ) * Mat4::from_translation((-anchor).extend(0.0))
                * Mat4::from_scale(size.extend(1.0))
        })
    }

    /// Binds this primitive's texture & program, then draws right away
    pub fn draw(&mut self, gpu: &mut impl GraphicsDevice, context: &mut Context) {
        context.bind_texture(gpu, self.texture_id());
        context.bind_shader(gpu, &self.program);
        let projection = context.camera_mut().projection_matrix();
        self.program.set_uniform(gpu, "projection", projection);
        self.draw_in_batch(gpu);
    }

    /// Uploads model & color then draws; texture & program must already be bound
    pub fn draw_in_batch(&mut self, gpu: &mut impl GraphicsDevice) {
        let model = self.model_matrix();
        self.program.set_uniform(gpu, "model", model);
        self.program.set_uniform(gpu, "color", Vec4::from(self.color));
        gpu.draw(self.mesh, self.mode, self.vertex_count());
    }

    /// Frees the mesh; the program & texture belong to their creators
    pub fn release(self, gpu: &mut impl GraphicsDevice) {
        gpu.release_mesh(self.mesh);
    }
}

impl Drawable for Primitive2D {
    fn texture_id(&self) -> TextureId {
        self.texture.map_or(TextureId::NONE, |t| t.id)
    }

    fn draw_item(&mut self) -> DrawItem {
        DrawItem {
            mesh: self.mesh,
            mode: self.mode,
            vertex_count: self.vertex_count(),
            program: Rc::clone(&self.program),
            model: self.model_matrix(),
            color: self.color,
        }
    }
}

fn interleave(positions: &[Vec2], uvs: &[Vec2]) -> Vec<MeshVertex> {
    positions
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let uv = uvs.get(i).copied().unwrap_or(Vec2::ZERO);
            MeshVertex::new(p.to_array(), uv.to_array())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_4;

    use glam::vec3;

    use super::*;
    use crate::{
        camera::Camera2D,
        device::mock::{Call, MockDevice},
        texture::Texture,
    };

    fn setup() -> (MockDevice, Rc<ShaderProgram>) {
        let mut gpu = MockDevice::new();
        let program = Rc::new(ShaderProgram::default_program(&mut gpu).unwrap());
        (gpu, program)
    }

    fn assert_rows(m: Mat4, rows: [[f32; 4]; 2]) {
        for (i, row) in rows.iter().enumerate() {
            let actual = m.row(i);
            let expected = Vec4::from_array(*row);
            assert!((actual - expected).length() < 0.001, "row {i}: {actual} != {expected}");
        }
    }

    #[test]
    fn anchor_applies_before_size() {
        // the unit square lands between (8, 8) & (18, 18)
        let (mut gpu, program) = setup();
        let mut quad = Primitive2D::quad(&mut gpu, program, vec3(10.0, 10.0, -1.0), vec2(10.0, 10.0));
        quad.set_anchor(vec2(2.0, 2.0));
        let model = quad.model_matrix();

        let corners: Vec<_> = UNIT_SQUARE
            .iter()
            .map(|c| model.transform_point3(c.extend(0.0)))
            .collect();
        let expected = [
            vec3(8.0, 8.0, -1.0),
            vec3(8.0, 18.0, -1.0),
            vec3(18.0, 18.0, -1.0),
            vec3(18.0, 8.0, -1.0),
        ];
        for (c, e) in corners.iter().zip(expected) {
            assert!((*c - e).length() < 0.001, "{c} != {e}");
        }
    }

    #[test]
    fn model_matrix_tracks_every_setter() {
        // each setter invalidates the cached matrix
        let (mut gpu, program) = setup();
        let mut quad = Primitive2D::quad(&mut gpu, program, Vec3::ZERO, vec2(5.0, 5.0));
        assert_rows(quad.model_matrix(), [[5.0, 0.0, 0.0, 0.0], [0.0, 5.0, 0.0, 0.0]]);

        quad.set_scale(vec2(2.0, 3.0));
        assert_rows(quad.model_matrix(), [[10.0, 0.0, 0.0, 0.0], [0.0, 15.0, 0.0, 0.0]]);

        quad.set_size(vec2(10.0, 10.0));
        assert_rows(quad.model_matrix(), [[20.0, 0.0, 0.0, 0.0], [0.0, 30.0, 0.0, 0.0]]);

        quad.set_position(vec3(10.0, 10.0, -1.0));
        let m = quad.model_matrix();
        assert_eq!(m.w_axis, Vec4::new(10.0, 10.0, -1.0, 1.0));

        quad.set_anchor(vec2(2.0, 2.0));
        assert_rows(quad.model_matrix(), [[20.0, 0.0, 0.0, 6.0], [0.0, 30.0, 0.0, 4.0]]);

        quad.set_anchor_to_center();
        assert_eq!(quad.anchor(), vec2(5.0, 5.0));
        assert_rows(quad.model_matrix(), [[20.0, 0.0, 0.0, 0.0], [0.0, 30.0, 0.0, -5.0]]);

        quad.set_flip_x(true);
        quad.set_flip_y(true);
        assert_rows(quad.model_matrix(), [[-20.0, 0.0, 0.0, 20.0], [0.0, -30.0, 0.0, 25.0]]);

        quad.set_angle(FRAC_PI_4);
        assert_rows(
            quad.model_matrix(),
            [[-14.142, 21.213, 0.0, 6.464], [-14.142, -21.213, 0.0, 27.677]],
        );
    }

    #[test]
    fn size_from_texture() {
        // without a texture the size is left alone
        let (mut gpu, program) = setup();
        let mut quad = Primitive2D::quad(&mut gpu, program, Vec3::ZERO, vec2(10.0, 10.0));
        quad.set_scale(vec2(2.0, 3.0));
        quad.set_size_from_texture();
        assert_eq!(quad.size(), vec2(10.0, 10.0));

        let texture = Texture::empty(&mut gpu, 20, 20).unwrap();
        quad.set_texture(Some(texture.handle()));
        quad.set_size_from_texture();
        assert_rows(quad.model_matrix(), [[40.0, 0.0, 0.0, 0.0], [0.0, 60.0, 0.0, 0.0]]);
    }

    #[test]
    fn invalid_polygons_upload_nothing() {
        // errors are reported before any mesh is created
        let (mut gpu, program) = setup();
        gpu.clear();
        assert!(matches!(
            Primitive2D::regular_polygon(&mut gpu, program.clone(), Vec3::ZERO, 0.0, 6, true),
            Err(GeometryError::InvalidRadius(_))
        ));
        assert!(matches!(
            Primitive2D::regular_polygon(&mut gpu, program.clone(), Vec3::ZERO, 5.0, 2, false),
            Err(GeometryError::TooFewSegments(2))
        ));
        assert!(matches!(
            Primitive2D::polyline(&mut gpu, program, Vec3::ZERO, &[], false),
            Err(GeometryError::TooFewPoints(0))
        ));
        assert_eq!(gpu.uploads(), 0);
    }

    #[test]
    fn polygon_outline_closes_the_loop() {
        // segments + 1 vertices, the last repeating the first
        let (mut gpu, program) = setup();
        let outline =
            Primitive2D::regular_polygon(&mut gpu, program, vec3(3.0, 4.0, 0.0), 2.0, 6, false)
                .unwrap();
        assert_eq!(outline.draw_mode(), DrawMode::LineStrip);
        assert_eq!(outline.vertex_count(), 7);
        let mesh = gpu.mesh(outline.mesh_id());
        assert_eq!(mesh[0], mesh[6]);
        assert_eq!(mesh[0].position, [2.0, 0.0]);
    }

    #[test]
    fn polyline_is_normalized_to_its_bounds() {
        // vertices live in [0, 1] while the model puts them back in place
        let (mut gpu, program) = setup();
        let points = [vec2(20.0, -20.0), vec2(-20.0, -20.0), vec2(-20.0, 40.0)];
        let mut line =
            Primitive2D::polyline(&mut gpu, program, vec3(100.0, 100.0, 0.0), &points, true)
                .unwrap();
        assert_eq!(line.size(), vec2(40.0, 60.0));
        assert_eq!(line.vertex_count(), 4);
        assert_eq!(line.vertices()[0], vec2(1.0, 0.0));
        assert_eq!(line.vertices()[3], line.vertices()[0]);

        let model = line.model_matrix();
        for (v, p) in line.vertices().iter().zip(points) {
            let world = model.transform_point3(v.extend(0.0)).truncate();
            assert!((world - (p + vec2(100.0, 100.0))).length() < 0.001);
        }
    }

    #[test]
    fn immediate_draw_binds_then_draws() {
        // texture, program, projection, model, color & one draw call
        let (mut gpu, program) = setup();
        let texture = Texture::empty(&mut gpu, 2, 2).unwrap();
        let mut quad = Primitive2D::quad(&mut gpu, program.clone(), Vec3::ZERO, Vec2::ONE);
        quad.set_texture(Some(texture.handle()));
        let mut ctx = Context::new(Camera2D::new(100.0, 100.0, 1.0, false, false));

        gpu.clear();
        quad.draw(&mut gpu, &mut ctx);
        assert_eq!(gpu.calls[0], Call::BindTexture(texture.id()));
        assert_eq!(gpu.calls[1], Call::BindProgram(program.id()));
        assert_eq!(gpu.draws(), 1);
        assert_eq!(gpu.count(|c| matches!(c, Call::SetUniform(..))), 3);

        // a second draw reuses the bindings
        gpu.clear();
        quad.draw(&mut gpu, &mut ctx);
        assert_eq!(gpu.texture_binds().len(), 0);
        assert_eq!(gpu.program_binds(), 0);
    }

    #[test]
    fn release_frees_the_mesh_once() {
        // only the mesh is released, the shared program stays alive
        let (mut gpu, program) = setup();
        let quad = Primitive2D::quad(&mut gpu, program, Vec3::ZERO, Vec2::ONE);
        let id = quad.mesh_id();
        gpu.clear();
        quad.release(&mut gpu);
        assert_eq!(gpu.calls, vec![Call::ReleaseMesh(id)]);
    }
}
