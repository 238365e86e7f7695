use std::{collections::HashMap, path::Path};

use rapier2d::prelude::*;
use tessera_render::AssetLoadError;

use crate::{
    SceneError,
    data::{
        BodyData, BodyType, ChainData, FixtureData, JointData, PropertyValue, Vector, WorldData,
    },
};

/// Box2D's polygon vertex limit; bigger polygons are skipped
pub const MAX_POLYGON_VERTICES: usize = 8;

/// Longest frame time fed to [`PhysicsScene::update`], in seconds
const MAX_FRAME_TIME: f32 = 0.25;

/// Shape of a loaded fixture, in body-local physics units
#[derive(Debug, Clone, PartialEq)]
pub enum FixtureShape {
    Circle { center: glam::Vec2, radius: f32 },
    Polygon(Vec<glam::Vec2>),
    Segment(glam::Vec2, glam::Vec2),
    /// `closed` when the last vertex repeats the first; ghosts are kept but not simulated
    Chain {
        vertices: Vec<glam::Vec2>,
        closed: bool,
        prev_ghost: Option<glam::Vec2>,
        next_ghost: Option<glam::Vec2>,
    },
}

/// One collider built from the file, with the index of the body it is attached to
#[derive(Debug, Clone)]
pub struct Fixture {
    pub body: usize,
    pub name: String,
    pub shape: FixtureShape,
    pub sensor: bool,
    pub collider: ColliderHandle,
}

/// What a body is doing, as far as debug drawing cares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyState {
    Inactive,
    Static,
    Kinematic,
    Asleep,
    Awake,
}

/// A R.U.B.E. world built into rapier
///
/// Bodies keep the index they had in the file; names & custom properties are
/// looked up by that index.
pub struct PhysicsScene {
    gravity: Vec2,
    params: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    accumulator: f32,

    body_handles: Vec<RigidBodyHandle>,
    body_names: Vec<String>,
    body_properties: Vec<HashMap<String, PropertyValue>>,
    fixtures: Vec<Fixture>,
    joints: Vec<(String, ImpulseJointHandle)>,
    data: WorldData,
}

impl std::fmt::Debug for PhysicsScene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhysicsScene")
            .field("bodies", &self.bodies.len())
            .field("colliders", &self.colliders.len())
            .field("joints", &self.joints.len())
            .finish()
    }
}

impl PhysicsScene {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| AssetLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let scene = Self::from_json(&json)?;
        log::info!(
            "loaded scene {} ({} bodies, {} joints)",
            path.display(),
            scene.body_count(),
            scene.joint_count()
        );
        Ok(scene)
    }

    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        let data: WorldData = serde_json::from_str(json)?;
        Ok(Self::from_data(data))
    }

    /// Builds every body, fixture & joint; malformed pieces are skipped with a warning
    pub fn from_data(data: WorldData) -> Self {
        let mut params = IntegrationParameters::default();
        if data.steps_per_second > 0.0 {
            params.dt = 1.0 / data.steps_per_second;
        }

        let mut scene = Self {
            gravity: Vec2::new(data.gravity.x, data.gravity.y),
            params,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            accumulator: 0.0,
            body_handles: Vec::new(),
            body_names: Vec::new(),
            body_properties: Vec::new(),
            fixtures: Vec::new(),
            joints: Vec::new(),
            data: WorldData::default(),
        };

        for (index, body) in data.body.iter().enumerate() {
            scene.build_body(index, body, data.allow_sleep);
        }
        for joint in &data.joint {
            scene.build_joint(joint);
        }

        scene.data = data;
        scene
    }

    fn build_body(&mut self, index: usize, data: &BodyData, allow_sleep: bool) {
        let body_type = match data.body_type {
            BodyType::Static => RigidBodyType::Fixed,
            BodyType::Kinematic => RigidBodyType::KinematicVelocityBased,
            BodyType::Dynamic => RigidBodyType::Dynamic,
        };
        let explicit_mass = data.body_type == BodyType::Dynamic && data.mass_data_mass > 0.0;

        let mut builder = RigidBodyBuilder::new(body_type)
            .translation(Vec2::new(data.position.x, data.position.y))
            .rotation(data.angle)
            .linvel(Vec2::new(data.linear_velocity.x, data.linear_velocity.y))
            .angvel(data.angular_velocity)
            .linear_damping(data.linear_damping)
            .angular_damping(data.angular_damping)
            .ccd_enabled(data.bullet)
            .can_sleep(allow_sleep)
            .sleeping(!data.awake);
        if data.fixed_rotation {
            builder = builder.lock_rotations();
        }
        if explicit_mass {
            let center = Vec2::new(data.mass_data_center.x, data.mass_data_center.y);
            builder = builder.additional_mass_properties(MassProperties::new(
                center,
                data.mass_data_mass,
                data.mass_data_inertia,
            ));
        }
        let handle = self.bodies.insert(builder.build());

        for fixture in &data.fixture {
            self.build_fixture(index, handle, fixture, explicit_mass);
        }

        let properties = data
            .custom_properties
            .iter()
            .filter_map(|p| p.value().map(|v| (p.name.clone(), v)))
            .collect();
        self.body_handles.push(handle);
        self.body_names.push(data.name.clone());
        self.body_properties.push(properties);
    }

    fn build_fixture(
        &mut self,
        body_index: usize,
        body: RigidBodyHandle,
        data: &FixtureData,
        explicit_mass: bool,
    ) {
        let Some((builder, shape)) = fixture_shape(data) else {
            return;
        };

        if data.filter_group_index != 0 {
            log::debug!(
                "fixture {:?}: filter group {} is not supported, using category & mask only",
                data.name,
                data.filter_group_index
            );
        }
        let groups = InteractionGroups::new(
            Group::from_bits_truncate(u32::from(data.filter_category_bits)),
            Group::from_bits_truncate(u32::from(data.filter_mask_bits)),
            InteractionTestMode::And,
        );
        // explicit mass data replaces what the fixtures would add
        let density = if explicit_mass { 0.0 } else { data.density };
        let collider = builder
            .density(density)
            .friction(data.friction)
            .restitution(data.restitution)
            .sensor(data.sensor)
            .collision_groups(groups)
            .build();
        let handle = self
            .colliders
            .insert_with_parent(collider, body, &mut self.bodies);

        self.fixtures.push(Fixture {
            body: body_index,
            name: data.name.clone(),
            shape,
            sensor: data.sensor,
            collider: handle,
        });
    }

    fn build_joint(&mut self, data: &JointData) {
        let (Some(&body_a), Some(&body_b)) = (
            self.body_handles.get(data.body_a),
            self.body_handles.get(data.body_b),
        ) else {
            log::warn!(
                "joint {:?} references missing body {} or {}, skipping",
                data.name,
                data.body_a,
                data.body_b
            );
            return;
        };
        let Some(joint) = joint_from_data(data) else {
            return;
        };
        let handle = self.impulse_joints.insert(body_a, body_b, joint, true);
        self.joints.push((data.name.clone(), handle));
    }

    /// Advances the world by one fixed step of `1 / stepsPerSecond`
    pub fn step(&mut self) {
        self.pipeline.step(
            self.gravity,
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            &(),
            &(),
        );
    }

    /// Runs as many fixed steps as `frame_dt` seconds cover, returns how many ran
    pub fn update(&mut self, frame_dt: f32) -> u32 {
        if frame_dt <= 0.0 {
            return 0;
        }
        self.accumulator += frame_dt.min(MAX_FRAME_TIME);

        let mut steps = 0;
        while self.accumulator >= self.params.dt {
            self.step();
            self.accumulator -= self.params.dt;
            steps += 1;
        }
        steps
    }

    pub fn time_step(&self) -> f32 {
        self.params.dt
    }

    pub fn gravity(&self) -> glam::Vec2 {
        glam::vec2(self.gravity.x, self.gravity.y)
    }

    pub fn set_gravity(&mut self, gravity: glam::Vec2) {
        self.gravity = Vec2::new(gravity.x, gravity.y);
    }

    pub fn body_count(&self) -> usize {
        self.body_handles.len()
    }

    pub fn body_handle(&self, index: usize) -> Option<RigidBodyHandle> {
        self.body_handles.get(index).copied()
    }

    pub fn body(&self, index: usize) -> Option<&RigidBody> {
        self.body_handle(index).and_then(|h| self.bodies.get(h))
    }

    pub fn body_mut(&mut self, index: usize) -> Option<&mut RigidBody> {
        let handle = self.body_handle(index)?;
        self.bodies.get_mut(handle)
    }

    /// Index of the first body with this name
    pub fn body_by_name(&self, name: &str) -> Option<usize> {
        self.body_names.iter().position(|n| n == name)
    }

    /// Empty for bodies the editor left unnamed
    pub fn body_name(&self, index: usize) -> Option<&str> {
        self.body_names.get(index).map(String::as_str)
    }

    pub fn body_position(&self, index: usize) -> Option<glam::Vec2> {
        self.body(index).map(|b| {
            let t = b.translation();
            glam::vec2(t.x, t.y)
        })
    }

    /// Radians
    pub fn body_angle(&self, index: usize) -> Option<f32> {
        self.body(index).map(|b| b.rotation().angle())
    }

    pub fn body_state(&self, index: usize) -> Option<BodyState> {
        self.body(index).map(|b| {
            if !b.is_enabled() {
                BodyState::Inactive
            } else if b.is_fixed() {
                BodyState::Static
            } else if b.is_kinematic() {
                BodyState::Kinematic
            } else if b.is_sleeping() {
                BodyState::Asleep
            } else {
                BodyState::Awake
            }
        })
    }

    pub fn custom_properties(&self, index: usize) -> Option<&HashMap<String, PropertyValue>> {
        self.body_properties.get(index)
    }

    pub fn custom_property(&self, index: usize, name: &str) -> Option<&PropertyValue> {
        self.custom_properties(index)?.get(name)
    }

    pub fn fixtures(&self) -> &[Fixture] {
        &self.fixtures
    }

    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    pub fn joint_by_name(&self, name: &str) -> Option<ImpulseJointHandle> {
        self.joints
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, handle)| *handle)
    }

    /// The parsed file, including images & the solver settings rapier doesn't take
    pub fn data(&self) -> &WorldData {
        &self.data
    }

    pub fn bodies(&self) -> &RigidBodySet {
        &self.bodies
    }

    pub fn colliders(&self) -> &ColliderSet {
        &self.colliders
    }
}

fn to_glam(v: Vector) -> glam::Vec2 {
    glam::vec2(v.x, v.y)
}

fn to_rapier(v: glam::Vec2) -> Vec2 {
    Vec2::new(v.x, v.y)
}

/// Collider builder & recorded shape for a fixture, or `None` if it can't be built
fn fixture_shape(data: &FixtureData) -> Option<(ColliderBuilder, FixtureShape)> {
    if let Some(circle) = &data.circle {
        if circle.radius <= 0.0 {
            log::warn!("ignoring circle fixture {:?} with radius {}", data.name, circle.radius);
            return None;
        }
        let center = to_glam(circle.center);
        let builder = ColliderBuilder::ball(circle.radius).translation(to_rapier(center));
        return Some((
            builder,
            FixtureShape::Circle {
                center,
                radius: circle.radius,
            },
        ));
    }

    if let Some(polygon) = &data.polygon {
        let points: Vec<_> = polygon.vertices.points().into_iter().map(to_glam).collect();
        return match points.len() {
            n if n > MAX_POLYGON_VERTICES => {
                log::warn!("ignoring fixture {:?} with too many vertices ({n})", data.name);
                None
            }
            n if n < 2 => {
                log::warn!("ignoring fixture {:?} with less than two vertices", data.name);
                None
            }
            2 => {
                log::warn!(
                    "creating a segment instead of a polygon with two vertices for fixture {:?}",
                    data.name
                );
                let builder = ColliderBuilder::segment(to_rapier(points[0]), to_rapier(points[1]));
                Some((builder, FixtureShape::Segment(points[0], points[1])))
            }
            _ => {
                let hull = points.iter().copied().map(to_rapier).collect();
                let Some(builder) = ColliderBuilder::convex_polyline(hull) else {
                    log::warn!("ignoring degenerate polygon fixture {:?}", data.name);
                    return None;
                };
                Some((builder, FixtureShape::Polygon(points)))
            }
        };
    }

    if let Some(chain) = &data.chain {
        return chain_shape(&data.name, chain);
    }

    log::warn!("ignoring fixture {:?} without a circle, polygon or chain", data.name);
    None
}

fn chain_shape(name: &str, chain: &ChainData) -> Option<(ColliderBuilder, FixtureShape)> {
    let vertices: Vec<_> = chain.vertices.points().into_iter().map(to_glam).collect();
    if vertices.len() < 2 {
        log::warn!("ignoring chain fixture {name:?} with less than two vertices");
        return None;
    }
    let closed = vertices.len() > 2 && vertices.first() == vertices.last();
    let (prev_ghost, next_ghost) = chain.ghosts();

    let last = vertices.len() as u32 - 1;
    let indices: Vec<[u32; 2]> = (0..last).map(|i| [i, i + 1]).collect();
    let points = vertices.iter().copied().map(to_rapier).collect();
    let builder = ColliderBuilder::polyline(points, Some(indices));
    Some((
        builder,
        FixtureShape::Chain {
            vertices,
            closed,
            prev_ghost: prev_ghost.map(to_glam),
            next_ghost: next_ghost.map(to_glam),
        },
    ))
}

/// Maps a file joint onto the closest rapier joint; unsupported types give `None`
fn joint_from_data(data: &JointData) -> Option<GenericJoint> {
    let anchor_a = Vec2::new(data.anchor_a.x, data.anchor_a.y);
    let anchor_b = Vec2::new(data.anchor_b.x, data.anchor_b.y);
    let contacts = data.collide_connected;

    let joint: GenericJoint = match data.joint_type.as_str() {
        "revolute" => {
            let mut joint = RevoluteJointBuilder::new()
                .local_anchor1(anchor_a)
                .local_anchor2(anchor_b)
                .contacts_enabled(contacts);
            if data.enable_limit {
                joint = joint.limits([data.lower_limit, data.upper_limit]);
            }
            if data.enable_motor {
                joint = joint
                    .motor_velocity(data.motor_speed, 1.0)
                    .motor_max_force(data.max_motor_torque);
            }
            joint.build().into()
        }
        "prismatic" => {
            let axis = Vec2::new(data.local_axis_a.x, data.local_axis_a.y).normalize_or(Vec2::X);
            let mut joint = PrismaticJointBuilder::new(axis)
                .local_anchor1(anchor_a)
                .local_anchor2(anchor_b)
                .contacts_enabled(contacts);
            if data.enable_limit {
                joint = joint.limits([data.lower_limit, data.upper_limit]);
            }
            if data.enable_motor {
                joint = joint
                    .motor_velocity(data.motor_speed, 1.0)
                    .motor_max_force(data.max_motor_force);
            }
            joint.build().into()
        }
        // a soft distance joint is a spring, a rigid one a rope at its rest length
        "distance" if data.frequency > 0.0 => {
            let omega = 2.0 * std::f32::consts::PI * data.frequency;
            SpringJointBuilder::new(data.length, omega * omega, 2.0 * data.damping_ratio * omega)
                .local_anchor1(anchor_a)
                .local_anchor2(anchor_b)
                .contacts_enabled(contacts)
                .build()
                .into()
        }
        "distance" => RopeJointBuilder::new(data.length)
            .local_anchor1(anchor_a)
            .local_anchor2(anchor_b)
            .contacts_enabled(contacts)
            .build()
            .into(),
        // no suspension: the wheel spins freely around its anchor
        "wheel" => {
            let mut joint = RevoluteJointBuilder::new()
                .local_anchor1(anchor_a)
                .local_anchor2(anchor_b)
                .contacts_enabled(contacts);
            if data.enable_motor {
                joint = joint
                    .motor_velocity(data.motor_speed, 1.0)
                    .motor_max_force(data.max_motor_torque);
            }
            joint.build().into()
        }
        "weld" => FixedJointBuilder::new()
            .local_anchor1(anchor_a)
            .local_anchor2(anchor_b)
            .contacts_enabled(contacts)
            .build()
            .into(),
        "rope" => RopeJointBuilder::new(data.max_length)
            .local_anchor1(anchor_a)
            .local_anchor2(anchor_b)
            .contacts_enabled(contacts)
            .build()
            .into(),
        "motor" | "friction" => {
            log::warn!(
                "{} joint {:?} has no rapier counterpart, skipping",
                data.joint_type,
                data.name
            );
            return None;
        }
        other => {
            log::warn!("unknown joint type {other:?} for joint {:?}, skipping", data.name);
            return None;
        }
    };
    Some(joint)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = r#"{
        "gravity": { "x": 0, "y": -10 },
        "allowSleep": true,
        "stepsPerSecond": 60,
        "body": [
            {
                "name": "ground",
                "type": 0,
                "position": 0,
                "fixture": [
                    { "name": "floor", "polygon": { "vertices": { "x": [-10, 10], "y": [0, 0] } } },
                    { "name": "huge", "polygon": { "vertices": {
                        "x": [0, 1, 2, 3, 4, 5, 6, 7, 8],
                        "y": [0, 1, 0, 1, 0, 1, 0, 1, 0]
                    } } },
                    { "name": "dot", "polygon": { "vertices": { "x": [1], "y": [1] } } },
                    { "name": "rim", "chain": {
                        "vertices": { "x": [-10, -10, 10, 10], "y": [10, 0, 0, 10] }
                    } }
                ],
                "customProperties": [
                    { "name": "level", "int": 2 },
                    { "name": "theme", "string": "night" }
                ]
            },
            {
                "name": "ball",
                "type": 2,
                "position": { "x": 0, "y": 5 },
                "awake": true,
                "fixture": [
                    { "name": "skin", "density": 1, "circle": { "center": 0, "radius": 0.5 } }
                ]
            },
            {
                "name": "crate",
                "type": 2,
                "position": { "x": 2, "y": 5 },
                "fixture": [
                    { "density": 1, "sensor": true, "polygon": { "vertices": {
                        "x": [-0.5, 0.5, 0.5, -0.5],
                        "y": [-0.5, -0.5, 0.5, 0.5]
                    } } }
                ]
            }
        ],
        "joint": [
            { "type": "revolute", "name": "hinge", "bodyA": 0, "bodyB": 2, "anchorA": { "x": 2, "y": 5 }, "anchorB": 0 },
            { "type": "gear", "name": "gears", "bodyA": 1, "bodyB": 2 },
            { "type": "motor", "name": "push", "bodyA": 0, "bodyB": 1 },
            { "type": "weld", "name": "stray", "bodyA": 0, "bodyB": 9 }
        ]
    }"#;

    #[test]
    fn bodies_keep_file_order_and_names() {
        // body indices, names & properties match the file
        let scene = PhysicsScene::from_json(SCENE).unwrap();
        assert_eq!(scene.body_count(), 3);
        assert_eq!(scene.body_by_name("ball"), Some(1));
        assert_eq!(scene.body_name(2), Some("crate"));
        assert_eq!(scene.body_by_name("missing"), None);
        assert_eq!(scene.custom_property(0, "level"), Some(&PropertyValue::Int(2)));
        assert_eq!(
            scene.custom_property(0, "theme"),
            Some(&PropertyValue::String("night".into()))
        );
        assert!(scene.custom_property(1, "level").is_none());

        let ball = scene.body_position(1).unwrap();
        assert!((ball - glam::vec2(0.0, 5.0)).length() < 1e-5);
    }

    #[test]
    fn fixture_rules() {
        // 2 vertices make a segment, >8 or <2 are skipped, chains stay open
        let scene = PhysicsScene::from_json(SCENE).unwrap();
        let shapes: Vec<_> = scene.fixtures().iter().map(|f| &f.shape).collect();
        assert_eq!(shapes.len(), 4);
        assert_eq!(scene.collider_count(), 4);

        assert_eq!(
            shapes[0],
            &FixtureShape::Segment(glam::vec2(-10.0, 0.0), glam::vec2(10.0, 0.0))
        );
        assert!(matches!(shapes[1], FixtureShape::Chain { vertices, closed: false, .. } if vertices.len() == 4));
        assert!(matches!(shapes[2], FixtureShape::Circle { radius, .. } if (*radius - 0.5).abs() < 1e-6));
        assert!(matches!(shapes[3], FixtureShape::Polygon(points) if points.len() == 4));

        assert_eq!(scene.fixtures()[3].body, 2);
        assert!(scene.fixtures()[3].sensor);
    }

    fn chain_scene(chain: &str) -> PhysicsScene {
        let json = format!(r#"{{ "body": [ {{ "fixture": [ {{ "chain": {chain} }} ] }} ] }}"#);
        PhysicsScene::from_json(&json).unwrap()
    }

    fn segments(scene: &PhysicsScene) -> usize {
        let collider = &scene.colliders()[scene.fixtures()[0].collider];
        collider.shape().as_polyline().map_or(0, |p| p.num_segments())
    }

    #[test]
    fn ghost_vertices_leave_chains_open() {
        // ghosts are kept for reference but add no closing edge
        let scene = chain_scene(
            r#"{
                "vertices": { "x": [0, 5, 10], "y": [0, 0, 0] },
                "hasPrevVertex": true, "prevVertex": { "x": -5, "y": 0 },
                "hasNextVertex": true, "nextVertex": { "x": 15, "y": 0 }
            }"#,
        );
        assert_eq!(segments(&scene), 2);
        assert_eq!(
            scene.fixtures()[0].shape,
            FixtureShape::Chain {
                vertices: vec![glam::vec2(0.0, 0.0), glam::vec2(5.0, 0.0), glam::vec2(10.0, 0.0)],
                closed: false,
                prev_ghost: Some(glam::vec2(-5.0, 0.0)),
                next_ghost: Some(glam::vec2(15.0, 0.0)),
            }
        );
    }

    #[test]
    fn repeated_first_vertex_is_a_loop() {
        // a loop is exported with its first vertex again at the end
        let scene = chain_scene(r#"{ "vertices": { "x": [0, 4, 4, 0], "y": [0, 0, 4, 0] } }"#);
        assert_eq!(segments(&scene), 3);
        assert!(matches!(
            &scene.fixtures()[0].shape,
            FixtureShape::Chain { closed: true, prev_ghost: None, next_ghost: None, .. }
        ));

        let open = chain_scene(r#"{ "vertices": { "x": [0, 4, 4, 0], "y": [0, 0, 4, 4] } }"#);
        assert_eq!(segments(&open), 3);
        assert!(matches!(&open.fixtures()[0].shape, FixtureShape::Chain { closed: false, .. }));
    }

    #[test]
    fn unsupported_joints_are_omitted() {
        // gear, motor & a joint to a missing body are skipped
        let scene = PhysicsScene::from_json(SCENE).unwrap();
        assert_eq!(scene.joint_count(), 1);
        assert!(scene.joint_by_name("hinge").is_some());
        assert!(scene.joint_by_name("gears").is_none());
        assert!(scene.joint_by_name("stray").is_none());
    }

    #[test]
    fn dynamic_bodies_fall() {
        // gravity points down the y axis, the static ground stays put
        let mut scene = PhysicsScene::from_json(SCENE).unwrap();
        assert!((scene.time_step() - 1.0 / 60.0).abs() < 1e-6);
        for _ in 0..10 {
            scene.step();
        }
        assert!(scene.body_position(1).unwrap().y < 5.0);
        assert!(scene.body_position(0).unwrap().length() < 1e-6);
        assert_eq!(scene.body_state(0), Some(BodyState::Static));
        assert_eq!(scene.body_state(1), Some(BodyState::Awake));
    }

    #[test]
    fn update_runs_whole_steps() {
        // the leftover time carries into the next frame
        let mut scene = PhysicsScene::from_json("{}").unwrap();
        let dt = scene.time_step();
        assert_eq!(scene.update(dt * 2.5), 2);
        assert_eq!(scene.update(dt * 0.6), 1);
        assert_eq!(scene.update(0.0), 0);
        // a long stall is capped at a quarter second
        let capped = scene.update(10.0);
        assert!((14..=16).contains(&capped), "{capped} steps");
    }

    #[test]
    fn malformed_json_is_an_error() {
        // a broken file is reported, not half loaded
        assert!(matches!(
            PhysicsScene::from_json("{ \"body\": [ }"),
            Err(SceneError::Json(_))
        ));
        assert!(matches!(
            PhysicsScene::from_file("does/not/exist.json"),
            Err(SceneError::Asset(_))
        ));
    }
}
