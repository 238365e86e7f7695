pub use glam::{Mat4, Vec2, Vec3, Vec4, vec2, vec3};

use crate::error::GeometryError;

/// Axis-aligned rectangle defined by position (top-left corner) & size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub position: Vec2,
    pub size: Vec2,
}

impl Rect {
    /// Create a new rectangle from position (top-left) & size
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self { position, size }
    }

    /// Builds the rectangle spanning two corners given in any order
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        let min = a.min(b);
        Self::new(min, a.max(b) - min)
    }

    /// Returns the top-left corner (min coords)
    pub fn min(&self) -> Vec2 {
        self.position
    }

    /// Returns the bottom-right corner (max coords)
    pub fn max(&self) -> Vec2 {
        self.position + self.size
    }

    /// Returns the center point of the rectangle
    pub fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }

    /// Returns true if the point is inside of the rectangle
    pub fn contains(&self, point: Vec2) -> bool {
        point.cmpge(self.position).all() && point.cmple(self.max()).all()
    }

    /// Returns the four corners in this order: top-left, top-right, bottom-right, bottom-left
    pub fn corners(&self) -> [Vec2; 4] {
        let tl = self.position;
        let tr = vec2(tl.x + self.size.x, tl.y);
        let br = self.max();
        let bl = vec2(tl.x, tl.y + self.size.y);
        [tl, tr, br, bl]
    }
}

/// Approximates a circle with a regular polygon of `segments` vertices
///
/// The first vertex sits at `start_angle` (radians); every next one is the
/// previous rotated by `2π / segments` around `center`
pub fn circle_to_polygon(
    center: Vec2,
    radius: f32,
    segments: usize,
    start_angle: f32,
) -> Result<Vec<Vec2>, GeometryError> {
    if radius.is_nan() || radius <= 0.0 {
        return Err(GeometryError::InvalidRadius(radius));
    }
    if segments < 3 {
        return Err(GeometryError::TooFewSegments(segments));
    }

    let step = Vec2::from_angle(std::f32::consts::TAU / segments as f32);
    let mut point = Vec2::from_angle(start_angle).rotate(vec2(radius, 0.0));

    let mut vertices = Vec::with_capacity(segments + 1);
    for _ in 0..segments {
        vertices.push(center + point);
        point = step.rotate(point);
    }
    Ok(vertices)
}

/// Returns the min (top-left) & max (bottom-right) corners bounding all points
///
/// An empty slice yields an inverted box (`min > max`)
pub fn bounding_box(points: &[Vec2]) -> (Vec2, Vec2) {
    points.iter().fold(
        (Vec2::splat(f32::MAX), Vec2::splat(-f32::MAX)),
        |(min, max), p| (min.min(*p), max.max(*p)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_points(points: &[Vec2], expected: &[Vec2]) {
        assert_eq!(points.len(), expected.len());
        for (p, e) in points.iter().zip(expected) {
            assert!((*p - *e).length() < 0.001, "{p} != {e}");
        }
    }

    #[test]
    fn square_from_circle() {
        // four segments starting at angle 0 walk counter-clockwise from +x
        let points = circle_to_polygon(vec2(100.0, 100.0), 50.0, 4, 0.0).unwrap();
        assert_points(
            &points,
            &[
                vec2(150.0, 100.0),
                vec2(100.0, 150.0),
                vec2(50.0, 100.0),
                vec2(100.0, 50.0),
            ],
        );
    }

    #[test]
    fn nan_radius_is_invalid() {
        // NaN is rejected like zero or a negative radius
        assert!(matches!(
            circle_to_polygon(Vec2::ZERO, f32::NAN, 8, 0.0),
            Err(GeometryError::InvalidRadius(r)) if r.is_nan()
        ));
    }

    #[test]
    fn start_angle_rotates_first_vertex() {
        // a quarter turn start moves the first vertex onto +y
        let points =
            circle_to_polygon(Vec2::ZERO, 2.0, 4, std::f32::consts::FRAC_PI_2).unwrap();
        assert_points(
            &points,
            &[
                vec2(0.0, 2.0),
                vec2(-2.0, 0.0),
                vec2(0.0, -2.0),
                vec2(2.0, 0.0),
            ],
        );
    }

    #[test]
    fn invalid_polygons_are_rejected() {
        // zero/negative radius & fewer than 3 segments are errors, not clamps
        assert_eq!(
            circle_to_polygon(vec2(1.0, 1.0), 5.0, 2, 0.0),
            Err(GeometryError::TooFewSegments(2))
        );
        assert_eq!(
            circle_to_polygon(vec2(1.0, 1.0), -5.0, 10, 0.0),
            Err(GeometryError::InvalidRadius(-5.0))
        );
        assert_eq!(
            circle_to_polygon(Vec2::ZERO, 0.0, 6, 0.0),
            Err(GeometryError::InvalidRadius(0.0))
        );
    }

    #[test]
    fn bounding_box_of_points() {
        // min/max are taken per axis
        let (min, max) = bounding_box(&[vec2(20.0, -20.0), vec2(-20.0, -20.0), vec2(-20.0, 40.0)]);
        assert_eq!(min, vec2(-20.0, -20.0));
        assert_eq!(max, vec2(20.0, 40.0));
    }

    #[test]
    fn rect_from_swapped_corners() {
        // corner order must not matter
        let a = Rect::from_corners(vec2(150.0, 100.0), vec2(50.0, 50.0));
        let b = Rect::from_corners(vec2(50.0, 50.0), vec2(150.0, 100.0));
        assert_eq!(a, b);
        assert_eq!(a.size, vec2(100.0, 50.0));
        assert_eq!(a.center(), vec2(100.0, 75.0));
        assert!(a.contains(vec2(60.0, 60.0)));
    }
}
