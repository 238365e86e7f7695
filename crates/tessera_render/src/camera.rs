use glam::{Mat4, Vec2, Vec4, vec2};

use crate::{cached::Cached, math::Rect};

pub const MIN_ZOOM: f32 = 0.01;
pub const MAX_ZOOM: f32 = 20.0;

// Depth range for z ordering primitives on the same plane
const NEAR: f32 = 2.0;
const FAR: f32 = -2.0;

/// An orthographic 2D camera for a single viewport
///
/// Without `flip_vertical` world y grows downwards like screen pixels.
/// Screen coordinates are always window pixels, origin top-left, y down.
pub struct Camera2D {
    position: Vec2,
    zoom: f32,
    centered: bool,
    flip_vertical: bool,
    viewport: Vec2,
    // projection & its inverse
    matrices: Cached<(Mat4, Mat4)>,
}

impl Camera2D {
    pub fn new(width: f32, height: f32, zoom: f32, centered: bool, flip_vertical: bool) -> Self {
        Self {
            position: Vec2::ZERO,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            centered,
            flip_vertical,
            viewport: vec2(width, height),
            matrices: Cached::new((Mat4::IDENTITY, Mat4::IDENTITY)),
        }
    }

    /// Set the camera position; the view center if centered, otherwise its top-left corner
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.matrices.invalidate();
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Move the camera; `dy` is mirrored when the view is flipped
    pub fn translate(&mut self, dx: f32, dy: f32) {
        let dy = if self.flip_vertical { -dy } else { dy };
        self.set_position(self.position + vec2(dx, dy));
    }

    /// Set zoom level, clamped between 0.01 & 20.0
    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.matrices.invalidate();
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn set_centered(&mut self, centered: bool) {
        self.centered = centered;
        self.matrices.invalidate();
    }

    pub fn is_centered(&self) -> bool {
        self.centered
    }

    pub fn set_flip_vertical(&mut self, flip: bool) {
        self.flip_vertical = flip;
        self.matrices.invalidate();
    }

    pub fn is_flip_vertical(&self) -> bool {
        self.flip_vertical
    }

    /// Resize the viewport, usually in response to a window resize
    pub fn set_viewport_size(&mut self, width: f32, height: f32) {
        self.viewport = vec2(width, height);
        self.matrices.invalidate();
    }

    pub fn viewport_size(&self) -> Vec2 {
        self.viewport
    }

    /// Zoom & move so the rectangle between two corners is fully visible
    ///
    /// The area is fitted, not filled: the axis with the larger ratio gets extra room
    pub fn set_visible_area(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        let area = Rect::from_corners(vec2(x1, y1), vec2(x2, y2));
        let fit = self.viewport / area.size;
        self.set_zoom(fit.x.min(fit.y));

        if self.centered {
            self.set_position(area.center());
        } else {
            self.set_position(area.min());
        }
    }

    /// Returns the world rectangle currently in view
    pub fn visible_area(&self) -> Rect {
        let size = self.viewport / self.zoom;
        let min = if self.centered {
            self.position - size * 0.5
        } else {
            self.position
        };
        Rect::new(min, size)
    }

    /// Orthographic projection for the current state, rebuilt only after a change
    pub fn projection_matrix(&mut self) -> Mat4 {
        self.matrices().0
    }

    pub fn inverse_projection(&mut self) -> Mat4 {
        self.matrices().1
    }

    /// Converts window pixels to world coordinates
    pub fn screen_to_world(&mut self, screen: Vec2) -> Vec2 {
        let half = self.viewport * 0.5;
        let ndc = vec2((screen.x - half.x) / half.x, (half.y - screen.y) / half.y);
        let world = self.inverse_projection() * Vec4::new(ndc.x, ndc.y, 0.0, 1.0);
        world.truncate().truncate()
    }

    /// Converts world coordinates to window pixels
    pub fn world_to_screen(&mut self, world: Vec2) -> Vec2 {
        let half = self.viewport * 0.5;
        let clip = self.projection_matrix() * Vec4::new(world.x, world.y, 0.0, 1.0);
        vec2(half.x + clip.x * half.x, half.y - clip.y * half.y)
    }

    fn matrices(&mut self) -> (Mat4, Mat4) {
        let area = self.visible_area();
        let flip = self.flip_vertical;
        *self.matrices.get_or_update(|| {
            let (min, max) = (area.min(), area.max());
            // y grows downwards unless flipped
            let (bottom, top) = if flip { (min.y, max.y) } else { (max.y, min.y) };
            let projection = Mat4::orthographic_rh_gl(min.x, max.x, bottom, top, NEAR, FAR);
            (projection, projection.inverse())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_rows(mut camera: Camera2D, x: [f32; 4], y: [f32; 4]) {
        let m = camera.projection_matrix();
        let rows = [m.row(0), m.row(1), m.row(2), m.row(3)];
        let expected = [
            Vec4::from_array(x),
            Vec4::from_array(y),
            Vec4::new(0.0, 0.0, 0.5, 0.0),
            Vec4::W,
        ];
        for (row, e) in rows.iter().zip(expected) {
            assert!((*row - e).length() < 0.001, "{row} != {e}");
        }
    }

    fn camera() -> Camera2D {
        Camera2D::new(100.0, 100.0, 10.0, false, false)
    }

    #[test]
    fn projection_follows_position_and_zoom() {
        // each setter must be observed by the next matrix read
        let mut cam = camera();
        cam.set_position(vec2(10.0, 10.0));
        let m = cam.projection_matrix();
        assert!((m.row(0) - Vec4::new(0.2, 0.0, 0.0, -3.0)).length() < 0.001);
        assert!((m.row(1) - Vec4::new(0.0, -0.2, 0.0, 3.0)).length() < 0.001);

        cam.set_zoom(5.0);
        assert_rows(cam, [0.1, 0.0, 0.0, -2.0], [0.0, -0.1, 0.0, 2.0]);
    }

    #[test]
    fn centered_and_flipped_projections() {
        // centering shifts the view by half of it & flipping mirrors y
        let mut cam = camera();
        cam.set_position(vec2(10.0, 10.0));
        cam.set_zoom(5.0);
        cam.set_centered(true);
        let m = cam.projection_matrix();
        assert!((m.row(0) - Vec4::new(0.1, 0.0, 0.0, -1.0)).length() < 0.001);
        assert!((m.row(1) - Vec4::new(0.0, -0.1, 0.0, 1.0)).length() < 0.001);

        cam.set_flip_vertical(true);
        let m = cam.projection_matrix();
        assert!((m.row(1) - Vec4::new(0.0, 0.1, 0.0, -1.0)).length() < 0.001);

        cam.set_centered(false);
        assert_rows(cam, [0.1, 0.0, 0.0, -2.0], [0.0, 0.1, 0.0, -2.0]);
    }

    #[test]
    fn visible_area_fits_and_ignores_corner_order() {
        // zoom fits the wider ratio & the min corner becomes the position
        let mut a = camera();
        a.set_visible_area(50.0, 50.0, 150.0, 100.0);
        let mut b = camera();
        b.set_visible_area(150.0, 100.0, 50.0, 50.0);
        assert_eq!(a.projection_matrix(), b.projection_matrix());
        assert_eq!(a.zoom(), 1.0);
        assert_rows(a, [0.02, 0.0, 0.0, -2.0], [0.0, -0.02, 0.0, 2.0]);
    }

    #[test]
    fn translate_respects_flip() {
        // a flipped camera moves the other way along y
        let mut cam = camera();
        cam.set_centered(true);
        cam.set_visible_area(50.0, 50.0, 150.0, 100.0);
        let m = cam.projection_matrix();
        assert!((m.row(1) - Vec4::new(0.0, -0.02, 0.0, 1.5)).length() < 0.001);

        cam.translate(50.0, 50.0);
        let m = cam.projection_matrix();
        assert!((m.row(0) - Vec4::new(0.02, 0.0, 0.0, -3.0)).length() < 0.001);
        assert!((m.row(1) - Vec4::new(0.0, -0.02, 0.0, 2.5)).length() < 0.001);

        cam.set_flip_vertical(true);
        cam.translate(50.0, 50.0);
        assert_eq!(cam.position(), vec2(200.0, 75.0));
        assert_rows(cam, [0.02, 0.0, 0.0, -4.0], [0.0, 0.02, 0.0, -1.5]);
    }

    #[test]
    fn zoom_is_clamped() {
        // out of range zoom snaps to the nearest bound
        let mut cam = camera();
        cam.set_zoom(15.0);
        assert_eq!(cam.zoom(), 15.0);
        cam.set_zoom(0.001);
        assert_eq!(cam.zoom(), MIN_ZOOM);
        cam.set_zoom(100.0);
        assert_eq!(cam.zoom(), MAX_ZOOM);
    }

    #[test]
    fn screen_to_world_uses_window_pixels() {
        // top-left origin in both orientations
        let mut cam = camera();
        let world = cam.screen_to_world(vec2(37.0, 25.0));
        assert!((world - vec2(3.7, 2.5)).length() < 0.001);

        cam.set_flip_vertical(true);
        let world = cam.screen_to_world(vec2(137.0, 85.0));
        assert!((world - vec2(13.7, 1.5)).length() < 0.001);
    }

    #[test]
    fn world_screen_round_trip() {
        // converting screen -> world -> screen should come back to where we started
        for centered in [false, true] {
            for flip in [false, true] {
                for zoom in [MIN_ZOOM, 0.5, 3.0, MAX_ZOOM] {
                    let mut cam = Camera2D::new(640.0, 480.0, zoom, centered, flip);
                    cam.set_position(vec2(-123.0, 45.5));
                    for screen in [vec2(0.0, 0.0), vec2(320.0, 240.0), vec2(17.0, 463.0)] {
                        let world = cam.screen_to_world(screen);
                        let back = cam.world_to_screen(world);
                        assert!((back - screen).length() < 0.01, "{back} != {screen}");
                    }
                }
            }
        }
    }
}
