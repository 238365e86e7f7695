//! Serde model of a scene exported by the R.U.B.E. editor
//!
//! Every field is optional in the file; missing values take Box2D's defaults.
//! See <https://www.iforce2d.net/rube/json-structure>.

use serde::Deserialize;

/// A 2D vector that may also be written as a bare number `n`, meaning `(n, n)`
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(from = "VectorRepr")]
pub struct Vector {
    pub x: f32,
    pub y: f32,
}

impl Vector {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum VectorRepr {
    Scalar(f32),
    Pair {
        #[serde(default)]
        x: f32,
        #[serde(default)]
        y: f32,
    },
}

impl From<VectorRepr> for Vector {
    fn from(repr: VectorRepr) -> Self {
        match repr {
            VectorRepr::Scalar(n) => Self::new(n, n),
            VectorRepr::Pair { x, y } => Self::new(x, y),
        }
    }
}

/// Parallel coordinate arrays
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Vertices {
    pub x: Vec<f32>,
    pub y: Vec<f32>,
}

impl Vertices {
    /// Points paired up by index; a longer axis is truncated
    pub fn points(&self) -> Vec<Vector> {
        self.x
            .iter()
            .zip(&self.y)
            .map(|(x, y)| Vector::new(*x, *y))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.x.len().min(self.y.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorldData {
    pub gravity: Vector,
    pub allow_sleep: bool,
    pub auto_clear_forces: bool,
    pub position_iterations: u32,
    pub velocity_iterations: u32,
    pub steps_per_second: f32,
    pub sub_stepping: bool,
    pub warm_starting: bool,
    pub continuous_physics: bool,
    #[serde(rename = "collisionbitplanes")]
    pub collision_bitplanes: CollisionBitplanes,
    pub body: Vec<BodyData>,
    pub image: Vec<ImageData>,
    pub joint: Vec<JointData>,
}

impl Default for WorldData {
    fn default() -> Self {
        Self {
            gravity: Vector::new(0.0, -10.0),
            allow_sleep: true,
            auto_clear_forces: true,
            position_iterations: 3,
            velocity_iterations: 8,
            steps_per_second: 60.0,
            sub_stepping: false,
            warm_starting: true,
            continuous_physics: true,
            collision_bitplanes: CollisionBitplanes::default(),
            body: Vec::new(),
            image: Vec::new(),
            joint: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CollisionBitplanes {
    pub names: Vec<String>,
}

/// `type` in the file: 0 static, 1 kinematic, 2 dynamic
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BodyType {
    #[default]
    Static,
    Kinematic,
    Dynamic,
}

impl<'de> Deserialize<'de> for BodyType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match u8::deserialize(deserializer)? {
            0 => Ok(Self::Static),
            1 => Ok(Self::Kinematic),
            2 => Ok(Self::Dynamic),
            other => Err(serde::de::Error::custom(format!(
                "unknown body type {other}, expected 0, 1 or 2"
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BodyData {
    pub name: String,
    #[serde(rename = "type")]
    pub body_type: BodyType,
    /// Radians
    pub angle: f32,
    pub angular_damping: f32,
    pub angular_velocity: f32,
    pub awake: bool,
    pub bullet: bool,
    pub fixed_rotation: bool,
    pub linear_velocity: Vector,
    pub linear_damping: f32,
    #[serde(rename = "massData-I")]
    pub mass_data_inertia: f32,
    #[serde(rename = "massData-mass")]
    pub mass_data_mass: f32,
    #[serde(rename = "massData-center")]
    pub mass_data_center: Vector,
    pub position: Vector,
    pub fixture: Vec<FixtureData>,
    pub custom_properties: Vec<CustomPropertyData>,
}

impl Default for BodyData {
    fn default() -> Self {
        Self {
            name: String::new(),
            body_type: BodyType::Static,
            angle: 0.0,
            angular_damping: 0.0,
            angular_velocity: 0.0,
            awake: true,
            bullet: false,
            fixed_rotation: false,
            linear_velocity: Vector::default(),
            linear_damping: 0.0,
            mass_data_inertia: 0.0,
            mass_data_mass: 0.0,
            mass_data_center: Vector::default(),
            position: Vector::default(),
            fixture: Vec::new(),
            custom_properties: Vec::new(),
        }
    }
}

fn default_category_bits() -> u16 {
    1
}

fn default_mask_bits() -> u16 {
    u16::MAX
}

/// A fixture carries exactly one of `circle`, `polygon` or `chain`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FixtureData {
    pub name: String,
    pub density: f32,
    #[serde(rename = "filter-categoryBits", default = "default_category_bits")]
    pub filter_category_bits: u16,
    #[serde(rename = "filter-maskBits", default = "default_mask_bits")]
    pub filter_mask_bits: u16,
    #[serde(rename = "filter-groupIndex")]
    pub filter_group_index: i16,
    pub friction: f32,
    pub restitution: f32,
    pub sensor: bool,
    pub circle: Option<CircleData>,
    pub polygon: Option<PolygonData>,
    pub chain: Option<ChainData>,
    #[serde(rename = "customProperties")]
    pub custom_properties: Vec<CustomPropertyData>,
}

impl Default for FixtureData {
    fn default() -> Self {
        Self {
            name: String::new(),
            density: 0.0,
            filter_category_bits: default_category_bits(),
            filter_mask_bits: default_mask_bits(),
            filter_group_index: 0,
            friction: 0.2,
            restitution: 0.0,
            sensor: false,
            circle: None,
            polygon: None,
            chain: None,
            custom_properties: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CircleData {
    pub center: Vector,
    pub radius: f32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PolygonData {
    pub vertices: Vertices,
}

/// A chain of segments with optional Box2D ghost vertices at either end
///
/// Ghosts only smooth collisions at the ends; a loop repeats its first vertex last.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChainData {
    pub vertices: Vertices,
    pub has_next_vertex: bool,
    pub has_prev_vertex: bool,
    pub next_vertex: Vector,
    pub prev_vertex: Vector,
}

impl ChainData {
    /// Ghost vertices before the first & after the last vertex
    pub fn ghosts(&self) -> (Option<Vector>, Option<Vector>) {
        (
            self.has_prev_vertex.then_some(self.prev_vertex),
            self.has_next_vertex.then_some(self.next_vertex),
        )
    }
}

/// Joint record; `type` selects which of the optional fields apply
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JointData {
    #[serde(rename = "type")]
    pub joint_type: String,
    pub name: String,
    pub anchor_a: Vector,
    pub anchor_b: Vector,
    /// Index into the body array
    pub body_a: usize,
    pub body_b: usize,
    pub collide_connected: bool,

    pub damping_ratio: f32,
    pub correction_factor: f32,
    pub enable_limit: bool,
    pub enable_motor: bool,
    pub frequency: f32,
    pub joint_speed: f32,
    pub length: f32,
    pub local_axis_a: Vector,
    pub lower_limit: f32,
    pub max_force: f32,
    pub max_length: f32,
    pub max_motor_force: f32,
    pub max_motor_torque: f32,
    pub max_torque: f32,
    pub motor_speed: f32,
    pub ref_angle: f32,
    pub spring_damping_ratio: f32,
    pub spring_frequency: f32,
    pub upper_limit: f32,

    pub custom_properties: Vec<CustomPropertyData>,
}

/// Image placed on a body by the editor; loaded but not rendered
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageData {
    pub name: String,
    pub opacity: f32,
    pub render_order: f32,
    /// Height of the image in physics units
    pub scale: f32,
    pub aspect_scale: f32,
    pub angle: f32,
    pub body: i32,
    pub center: Vector,
    pub corners: Vertices,
    pub file: String,
    /// 0 linear, 1 nearest
    pub filter: i32,
    pub flip: bool,
    pub color_tint: Vec<u8>,
    pub custom_properties: Vec<CustomPropertyData>,
}

/// `{"name": "hp", "int": 3}`: one typed value next to the name
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CustomPropertyData {
    pub name: String,
    pub int: Option<i64>,
    pub float: Option<f64>,
    pub string: Option<String>,
    pub bool: Option<bool>,
    pub vec2: Option<Vector>,
    pub color: Option<[u8; 4]>,
}

/// A typed custom property value
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
    Vec2(Vector),
    Color([u8; 4]),
}

impl CustomPropertyData {
    pub fn value(&self) -> Option<PropertyValue> {
        if let Some(v) = self.int {
            Some(PropertyValue::Int(v))
        } else if let Some(v) = self.float {
            Some(PropertyValue::Float(v))
        } else if let Some(v) = &self.string {
            Some(PropertyValue::String(v.clone()))
        } else if let Some(v) = self.bool {
            Some(PropertyValue::Bool(v))
        } else if let Some(v) = self.vec2 {
            Some(PropertyValue::Vec2(v))
        } else {
            self.color.map(PropertyValue::Color)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn scalar_expands_to_both_components() {
        // "gravity": 9.8 means (9.8, 9.8)
        let world: WorldData = serde_json::from_str(r#"{ "gravity": 9.8 }"#).unwrap();
        assert!(close(world.gravity.x, 9.8) && close(world.gravity.y, 9.8));

        let world: WorldData =
            serde_json::from_str(r#"{ "gravity": { "x": 0, "y": -10 } }"#).unwrap();
        assert_eq!(world.gravity, Vector::new(0.0, -10.0));

        let body: BodyData = serde_json::from_str(r#"{ "position": 0 }"#).unwrap();
        assert_eq!(body.position, Vector::default());
    }

    #[test]
    fn missing_fields_take_defaults() {
        // an empty object is a valid, empty world
        let world: WorldData = serde_json::from_str("{}").unwrap();
        assert_eq!(world.steps_per_second, 60.0);
        assert!(world.body.is_empty() && world.joint.is_empty());

        let fixture: FixtureData = serde_json::from_str("{}").unwrap();
        assert_eq!(fixture.filter_category_bits, 1);
        assert_eq!(fixture.filter_mask_bits, 65535);
        assert!(fixture.circle.is_none() && fixture.polygon.is_none() && fixture.chain.is_none());
    }

    #[test]
    fn body_types_and_hyphenated_keys() {
        // type is numeric & mass data uses dashed names
        let body: BodyData = serde_json::from_str(
            r#"{ "type": 2, "massData-mass": 3.5, "massData-center": { "x": 1, "y": 2 }, "massData-I": 0.5 }"#,
        )
        .unwrap();
        assert_eq!(body.body_type, BodyType::Dynamic);
        assert!(close(body.mass_data_mass, 3.5));
        assert_eq!(body.mass_data_center, Vector::new(1.0, 2.0));
        assert!(close(body.mass_data_inertia, 0.5));

        assert!(serde_json::from_str::<BodyData>(r#"{ "type": 7 }"#).is_err());
    }

    #[test]
    fn custom_property_values() {
        // the first present typed field wins
        let props: Vec<CustomPropertyData> = serde_json::from_str(
            r#"[
                { "name": "hp", "int": 3 },
                { "name": "tag", "string": "enemy" },
                { "name": "spawn", "vec2": 0 },
                { "name": "tint", "color": [255, 0, 0, 255] },
                { "name": "empty" }
            ]"#,
        )
        .unwrap();
        let values: Vec<_> = props.iter().map(CustomPropertyData::value).collect();
        assert_eq!(
            values,
            vec![
                Some(PropertyValue::Int(3)),
                Some(PropertyValue::String("enemy".into())),
                Some(PropertyValue::Vec2(Vector::default())),
                Some(PropertyValue::Color([255, 0, 0, 255])),
                None,
            ]
        );
    }

    #[test]
    fn vertices_pair_by_index() {
        // x & y arrays zip into points
        let v = Vertices {
            x: vec![0.0, 1.0, 2.0],
            y: vec![5.0, 6.0],
        };
        assert_eq!(v.len(), 2);
        assert_eq!(v.points(), vec![Vector::new(0.0, 5.0), Vector::new(1.0, 6.0)]);
    }
}
