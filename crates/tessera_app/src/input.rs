pub use winit::{event::MouseButton, keyboard::KeyCode};

use std::{collections::HashMap, hash::Hash};
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, KeyEvent, MouseScrollDelta},
    keyboard::PhysicalKey,
};

/// Pixels per wheel "line" for touchpads & precise wheels
const PIXELS_PER_LINE: f32 = 20.0;

/// Current & previous frame state of every button seen this frame
struct Edges<K> {
    states: HashMap<K, (ElementState, ElementState)>,
}

impl<K> Default for Edges<K> {
    fn default() -> Self {
        Self {
            states: HashMap::new(),
        }
    }
}

impl<K: Copy + Eq + Hash> Edges<K> {
    fn set(&mut self, key: K, state: ElementState) {
        let prev = self
            .states
            .get(&key)
            .map_or(ElementState::Released, |(curr, _)| *curr);
        self.states.insert(key, (state, prev));
    }

    fn end_frame(&mut self) {
        self.states.retain(|_, (curr, prev)| {
            *prev = *curr;
            curr.is_pressed()
        });
    }

    fn pressed(&self, key: K) -> bool {
        self.states
            .get(&key)
            .is_some_and(|(curr, prev)| curr.is_pressed() && !prev.is_pressed())
    }

    fn held(&self, key: K) -> bool {
        self.states.get(&key).is_some_and(|(curr, _)| curr.is_pressed())
    }

    fn released(&self, key: K) -> bool {
        self.states.get(&key).is_some_and(|(curr, _)| !curr.is_pressed())
    }
}

/// Keyboard & mouse state for the current frame, fed by window events
#[derive(Default)]
pub struct Input {
    keys: Edges<KeyCode>,
    buttons: Edges<MouseButton>,
    mouse_position: (f32, f32),
    mouse_delta: (f32, f32),
    mouse_wheel: (f32, f32),
}

impl Input {
    pub(crate) fn keyboard(&mut self, event: KeyEvent) {
        if let PhysicalKey::Code(key_code) = event.physical_key {
            self.keys.set(key_code, event.state);
        }
    }

    pub(crate) fn mouse(&mut self, button: MouseButton, state: ElementState) {
        self.buttons.set(button, state);
    }

    pub(crate) fn cursor(&mut self, position: PhysicalPosition<f64>) {
        let (x, y): (f32, f32) = position.into();
        self.move_cursor(x, y);
    }

    pub(crate) fn wheel(&mut self, delta: MouseScrollDelta) {
        let (x, y) = match delta {
            MouseScrollDelta::LineDelta(x, y) => (x, y),
            MouseScrollDelta::PixelDelta(p) => (
                p.x as f32 / PIXELS_PER_LINE,
                p.y as f32 / PIXELS_PER_LINE,
            ),
        };
        self.mouse_wheel.0 += x;
        self.mouse_wheel.1 += y;
    }

    fn move_cursor(&mut self, x: f32, y: f32) {
        let (px, py) = self.mouse_position;
        // accumulate, several moves can land in one frame
        self.mouse_delta.0 += x - px;
        self.mouse_delta.1 += y - py;
        self.mouse_position = (x, y);
    }

    /// Rolls current states into previous & drops released keys/buttons
    pub(crate) fn end_frame(&mut self) {
        self.keys.end_frame();
        self.buttons.end_frame();
        self.mouse_delta = (0.0, 0.0);
        self.mouse_wheel = (0.0, 0.0);
    }

    /// True only on the frame the key went down
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys.pressed(key)
    }

    /// True while the key is down
    pub fn key_held(&self, key: KeyCode) -> bool {
        self.keys.held(key)
    }

    /// True only on the frame the key came up
    pub fn key_released(&self, key: KeyCode) -> bool {
        self.keys.released(key)
    }

    /// True if any of `keys` is down
    pub fn keys_held(&self, keys: &[KeyCode]) -> bool {
        keys.iter().any(|&key| self.key_held(key))
    }

    pub fn mouse_pressed(&self, button: MouseButton) -> bool {
        self.buttons.pressed(button)
    }

    pub fn mouse_held(&self, button: MouseButton) -> bool {
        self.buttons.held(button)
    }

    pub fn mouse_released(&self, button: MouseButton) -> bool {
        self.buttons.released(button)
    }

    /// Cursor position in window pixels, origin top-left
    pub fn mouse_position(&self) -> (f32, f32) {
        self.mouse_position
    }

    /// Cursor movement since last frame
    pub fn mouse_delta(&self) -> (f32, f32) {
        self.mouse_delta
    }

    /// Wheel movement since last frame in lines, positive y scrolls up
    pub fn mouse_wheel(&self) -> (f32, f32) {
        self.mouse_wheel
    }
}

#[cfg(test)]
impl Input {
    pub fn inject_key(&mut self, key: KeyCode, state: ElementState) {
        self.keys.set(key, state);
    }

    pub fn inject_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        self.mouse(button, state);
    }

    pub fn inject_cursor(&mut self, x: f32, y: f32) {
        self.move_cursor(x, y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::{
        dpi::PhysicalPosition,
        event::ElementState::{Pressed, Released},
    };

    #[test]
    fn key_press_hold_release() {
        // pressed only on the first frame, released only on the last
        let mut input = Input::default();
        input.inject_key(KeyCode::Space, Pressed);
        assert!(input.key_pressed(KeyCode::Space));
        assert!(input.key_held(KeyCode::Space));

        input.end_frame();
        assert!(!input.key_pressed(KeyCode::Space));
        assert!(input.key_held(KeyCode::Space));

        input.inject_key(KeyCode::Space, Released);
        assert!(input.key_released(KeyCode::Space));
        assert!(!input.key_held(KeyCode::Space));

        input.end_frame();
        assert!(!input.key_released(KeyCode::Space));
    }

    #[test]
    fn cursor_delta_accumulates_within_a_frame() {
        // two moves in one frame add up, end_frame resets
        let mut input = Input::default();
        input.inject_cursor(100.0, 200.0);
        input.inject_cursor(110.0, 190.0);
        assert_eq!(input.mouse_position(), (110.0, 190.0));
        assert_eq!(input.mouse_delta(), (110.0, 190.0));

        input.end_frame();
        assert_eq!(input.mouse_delta(), (0.0, 0.0));
        input.inject_cursor(100.0, 200.0);
        assert_eq!(input.mouse_delta(), (-10.0, 10.0));
    }

    #[test]
    fn wheel_lines_and_pixels() {
        // pixel deltas are converted to lines & cleared each frame
        let mut input = Input::default();
        input.wheel(MouseScrollDelta::LineDelta(0.0, 1.0));
        input.wheel(MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 40.0)));
        assert_eq!(input.mouse_wheel(), (0.0, 3.0));

        input.end_frame();
        assert_eq!(input.mouse_wheel(), (0.0, 0.0));
    }

    #[test]
    fn mouse_buttons() {
        // same edge rules as keys
        let mut input = Input::default();
        input.inject_mouse_button(MouseButton::Left, Pressed);
        assert!(input.mouse_pressed(MouseButton::Left));
        assert!(input.mouse_held(MouseButton::Left));
        assert!(!input.mouse_held(MouseButton::Right));

        input.end_frame();
        input.inject_mouse_button(MouseButton::Left, Released);
        assert!(input.mouse_released(MouseButton::Left));
        assert!(!input.mouse_pressed(MouseButton::Left));
    }
}
