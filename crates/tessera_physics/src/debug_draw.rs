use std::rc::Rc;

use glam::{Vec2, Vec3};
use tessera_render::{
    Color, Context, GeometryError, GraphicsDevice, Primitive2D, ShaderProgram,
    math::circle_to_polygon,
};

use crate::scene::{BodyState, FixtureShape, PhysicsScene};

const CIRCLE_SEGMENTS: usize = 12;

/// Outline colors by what a fixture's body is doing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugColors {
    pub normal: Color,
    pub inactive: Color,
    pub fixed: Color,
    pub kinematic: Color,
    pub asleep: Color,
    pub sensor: Color,
}

impl Default for DebugColors {
    fn default() -> Self {
        Self {
            normal: Color::rgb(0.9, 0.7, 0.7),
            inactive: Color::rgb(0.5, 0.5, 0.3),
            fixed: Color::rgb(0.5, 0.9, 0.5),
            kinematic: Color::rgb(0.5, 0.5, 0.9),
            asleep: Color::rgb(0.6, 0.6, 0.6),
            sensor: Color::rgb(0.6, 0.3, 0.6),
        }
    }
}

impl DebugColors {
    /// Sensors win over any body state
    pub fn pick(&self, sensor: bool, state: BodyState) -> Color {
        if sensor {
            return self.sensor;
        }
        match state {
            BodyState::Inactive => self.inactive,
            BodyState::Static => self.fixed,
            BodyState::Kinematic => self.kinematic,
            BodyState::Asleep => self.asleep,
            BodyState::Awake => self.normal,
        }
    }
}

/// Line outlines of every fixture in a [`PhysicsScene`]
///
/// Physics units are scaled by `pixels_per_meter` (PTM) into world units.
/// Primitives follow the order of [`PhysicsScene::fixtures`].
pub struct DebugDraw {
    primitives: Vec<Primitive2D>,
    pixels_per_meter: f32,
    depth: f32,
    colors: DebugColors,
}

impl DebugDraw {
    pub fn new(
        gpu: &mut impl GraphicsDevice,
        program: Rc<ShaderProgram>,
        scene: &PhysicsScene,
        pixels_per_meter: f32,
    ) -> Result<Self, GeometryError> {
        let mut primitives = Vec::with_capacity(scene.fixtures().len());
        for fixture in scene.fixtures() {
            let (points, closed) = match &fixture.shape {
                FixtureShape::Circle { center, radius } => (
                    circle_to_polygon(*center, *radius, CIRCLE_SEGMENTS, 0.0)?,
                    true,
                ),
                FixtureShape::Polygon(points) => (points.clone(), true),
                FixtureShape::Segment(a, b) => (vec![*a, *b], false),
                // loops already repeat their first vertex
                FixtureShape::Chain { vertices, .. } => (vertices.clone(), false),
            };
            let position = scene.body_position(fixture.body).unwrap_or_default() * pixels_per_meter;
            let mut outline =
                Primitive2D::polyline(gpu, program.clone(), position.extend(0.0), &points, closed)?;
            outline.set_scale(Vec2::splat(pixels_per_meter));
            primitives.push(outline);
        }

        let mut debug = Self {
            primitives,
            pixels_per_meter,
            depth: 0.0,
            colors: DebugColors::default(),
        };
        debug.update(scene);
        Ok(debug)
    }

    pub fn set_colors(&mut self, colors: DebugColors) {
        self.colors = colors;
    }

    pub fn pixels_per_meter(&self) -> f32 {
        self.pixels_per_meter
    }

    pub fn primitives(&self) -> &[Primitive2D] {
        &self.primitives
    }

    /// Moves every outline onto its body & recolors it by body state
    pub fn update(&mut self, scene: &PhysicsScene) {
        for (fixture, outline) in scene.fixtures().iter().zip(&mut self.primitives) {
            let Some(position) = scene.body_position(fixture.body) else {
                continue;
            };
            outline.set_position((position * self.pixels_per_meter).extend(self.depth));
            outline.set_angle(scene.body_angle(fixture.body).unwrap_or_default());
            let state = scene.body_state(fixture.body).unwrap_or(BodyState::Inactive);
            outline.set_color(self.colors.pick(fixture.sensor, state));
        }
    }

    /// Draws each outline right away
    pub fn draw(&mut self, gpu: &mut impl GraphicsDevice, context: &mut Context) {
        for outline in &mut self.primitives {
            outline.draw(gpu, context);
        }
    }

    /// Queues each outline into the context's untextured batch
    pub fn enqueue(&mut self, context: &mut Context) {
        for outline in &mut self.primitives {
            context.enqueue(outline);
        }
    }

    /// Moves every outline along z, e.g. to keep them above sprites
    pub fn set_depth(&mut self, z: f32) {
        self.depth = z;
        for outline in &mut self.primitives {
            let p = outline.position();
            outline.set_position(Vec3::new(p.x, p.y, z));
        }
    }

    pub fn release(self, gpu: &mut impl GraphicsDevice) {
        for outline in self.primitives {
            outline.release(gpu);
        }
    }
}
