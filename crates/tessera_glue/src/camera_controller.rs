use glam::{Vec2, vec2};
use tessera_app::input::{Input, MouseButton};
use tessera_render::Camera2D;

/// Pans a camera by dragging & zooms it with the wheel
pub struct CameraMouseController {
    /// Button that has to be held to drag
    pub drag_button: MouseButton,
    /// Zoom added per wheel line
    pub zoom_step: f32,
}

impl Default for CameraMouseController {
    fn default() -> Self {
        Self {
            drag_button: MouseButton::Right,
            zoom_step: 0.1,
        }
    }
}

impl CameraMouseController {
    /// Moves the view opposite to the cursor so the world follows the drag
    pub fn update(&self, camera: &mut Camera2D, delta: Vec2, dragging: bool, wheel: f32) {
        if dragging {
            let t = -delta / camera.zoom();
            camera.translate(t.x, t.y);
        }
        if wheel != 0.0 {
            camera.set_zoom(camera.zoom() + wheel * self.zoom_step);
        }
    }

    pub fn update_from_input(&self, camera: &mut Camera2D, input: &Input) {
        let (dx, dy) = input.mouse_delta();
        let (_, wheel) = input.mouse_wheel();
        self.update(
            camera,
            vec2(dx, dy),
            input.mouse_held(self.drag_button),
            wheel,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_scales_with_zoom() {
        // at zoom 2 a 10px drag moves the camera 5 world units back
        let mut cam = Camera2D::new(800.0, 600.0, 2.0, false, false);
        CameraMouseController::default().update(&mut cam, vec2(10.0, -4.0), true, 0.0);
        assert!((cam.position() - vec2(-5.0, 2.0)).length() < 0.001);
    }

    #[test]
    fn no_drag_without_button() {
        // moving the cursor alone leaves the camera in place
        let mut cam = Camera2D::new(800.0, 600.0, 1.0, false, false);
        CameraMouseController::default().update(&mut cam, vec2(10.0, 10.0), false, 0.0);
        assert_eq!(cam.position(), Vec2::ZERO);
    }

    #[test]
    fn wheel_zooms_in_steps() {
        // one line adds a tenth, the camera still clamps
        let mut cam = Camera2D::new(800.0, 600.0, 1.0, true, false);
        let controller = CameraMouseController::default();
        controller.update(&mut cam, Vec2::ZERO, false, 1.0);
        assert!((cam.zoom() - 1.1).abs() < 0.001);

        controller.update(&mut cam, Vec2::ZERO, false, -1000.0);
        assert!((cam.zoom() - 0.01).abs() < 0.0001);
    }

    #[test]
    fn idle_input_changes_nothing() {
        // no movement, no buttons, no wheel
        let mut cam = Camera2D::new(800.0, 600.0, 1.5, false, false);
        CameraMouseController::default().update_from_input(&mut cam, &Input::default());
        assert_eq!(cam.position(), Vec2::ZERO);
        assert!((cam.zoom() - 1.5).abs() < 0.0001);
    }
}
