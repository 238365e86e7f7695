use crate::{
    controller::{Axis, Button, ButtonStates, GameController},
    input::{Input, KeyCode},
};

/// Keys standing in for [`Button::ALL`], in the same order
pub const DEFAULT_KEYS: [KeyCode; 15] = [
    KeyCode::KeyA,
    KeyCode::KeyS,
    KeyCode::KeyD,
    KeyCode::KeyF,
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::KeyQ,
    KeyCode::KeyR,
    KeyCode::KeyW,
    KeyCode::KeyE,
    KeyCode::ArrowUp,
    KeyCode::ArrowDown,
    KeyCode::ArrowLeft,
    KeyCode::ArrowRight,
];

/// The keyboard as a pad: 15 buttons, & the D-pad as the left stick
pub struct KeyboardController {
    keys: [KeyCode; 15],
    states: ButtonStates,
    axes: [f32; 2],
}

impl Default for KeyboardController {
    fn default() -> Self {
        Self::new(DEFAULT_KEYS)
    }
}

impl KeyboardController {
    pub fn new(keys: [KeyCode; 15]) -> Self {
        Self {
            keys,
            states: ButtonStates::new(keys.len()),
            axes: [0.0; 2],
        }
    }

    pub fn set_keys(&mut self, keys: [KeyCode; 15]) {
        self.keys = keys;
        self.states.reset();
    }

    /// Feeds a raw snapshot in [`Button::ALL`] order
    pub fn update_raw(&mut self, raw: &[bool; 15]) {
        self.states.update(raw);
        let down = |b: Button| self.states.down(b.index());

        self.axes[0] = if down(Button::DirPadLeft) {
            -1.0
        } else if down(Button::DirPadRight) {
            1.0
        } else {
            0.0
        };
        self.axes[1] = if down(Button::DirPadUp) {
            -1.0
        } else if down(Button::DirPadDown) {
            1.0
        } else {
            0.0
        };
    }
}

impl GameController for KeyboardController {
    fn update(&mut self, input: &Input) {
        let raw = self.keys.map(|key| input.key_held(key));
        self.update_raw(&raw);
    }

    fn connected(&self) -> bool {
        true
    }

    fn num_buttons(&self) -> usize {
        self.states.len()
    }

    fn num_axes(&self) -> usize {
        self.axes.len()
    }

    fn button_pressed(&self, button: Button) -> bool {
        self.states.pressed(button.index())
    }

    fn button_released(&self, button: Button) -> bool {
        self.states.released(button.index())
    }

    fn button_down(&self, button: Button) -> bool {
        self.states.down(button.index())
    }

    fn axis_value(&self, axis: Axis) -> f32 {
        self.axes.get(axis.index()).copied().unwrap_or(0.0)
    }

    fn description(&self) -> String {
        format!("keyboard buttons:{} axes:{}", self.num_buttons(), self.num_axes())
    }
}
