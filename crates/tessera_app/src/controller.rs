//! Game controllers: buttons & axes polled once per frame

use crate::input::Input;

/// Buttons of an Xbox 360 style pad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    A,
    B,
    X,
    Y,
    Back,
    Guide,
    Start,
    LeftStick,
    RightStick,
    LeftShoulder,
    RightShoulder,
    DirPadUp,
    DirPadDown,
    DirPadLeft,
    DirPadRight,
}

impl Button {
    pub const ALL: [Button; 15] = [
        Button::A,
        Button::B,
        Button::X,
        Button::Y,
        Button::Back,
        Button::Guide,
        Button::Start,
        Button::LeftStick,
        Button::RightStick,
        Button::LeftShoulder,
        Button::RightShoulder,
        Button::DirPadUp,
        Button::DirPadDown,
        Button::DirPadLeft,
        Button::DirPadRight,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    LeftX,
    LeftY,
    RightX,
    RightY,
    TriggerLeft,
    TriggerRight,
}

impl Axis {
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Edge detection over a snapshot of button-down flags
///
/// Indices past the tracked count read as not pressed.
#[derive(Debug, Clone, Default)]
pub struct ButtonStates {
    down: Vec<bool>,
    pressed: Vec<bool>,
    released: Vec<bool>,
}

impl ButtonStates {
    pub fn new(count: usize) -> Self {
        Self {
            down: vec![false; count],
            pressed: vec![false; count],
            released: vec![false; count],
        }
    }

    /// Compares `raw` with the previous snapshot; a size change starts over
    pub fn update(&mut self, raw: &[bool]) {
        if raw.len() != self.down.len() {
            *self = Self::new(raw.len());
        }
        for (i, &is_down) in raw.iter().enumerate() {
            self.pressed[i] = is_down && !self.down[i];
            self.released[i] = !is_down && self.down[i];
            self.down[i] = is_down;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.down.len());
    }

    pub fn len(&self) -> usize {
        self.down.len()
    }

    pub fn is_empty(&self) -> bool {
        self.down.is_empty()
    }

    pub fn pressed(&self, index: usize) -> bool {
        self.pressed.get(index).copied().unwrap_or(false)
    }

    pub fn released(&self, index: usize) -> bool {
        self.released.get(index).copied().unwrap_or(false)
    }

    pub fn down(&self, index: usize) -> bool {
        self.down.get(index).copied().unwrap_or(false)
    }
}

/// A physical or emulated pad
///
/// Call [`GameController::update`] once per frame before reading buttons.
/// Buttons & axes the device doesn't have read as released & 0.0.
pub trait GameController {
    fn update(&mut self, input: &Input);
    fn connected(&self) -> bool;
    fn num_buttons(&self) -> usize;
    fn num_axes(&self) -> usize;
    fn button_pressed(&self, button: Button) -> bool;
    fn button_released(&self, button: Button) -> bool;
    fn button_down(&self, button: Button) -> bool;
    /// From -1 to 1
    fn axis_value(&self, axis: Axis) -> f32;
    fn description(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_last_one_frame() {
        // pressed & released are only true on the frame of the change
        let mut states = ButtonStates::new(2);
        states.update(&[true, false]);
        assert!(states.pressed(0) && states.down(0));
        assert!(!states.pressed(1));

        states.update(&[true, false]);
        assert!(!states.pressed(0) && states.down(0));

        states.update(&[false, false]);
        assert!(states.released(0) && !states.down(0));

        states.update(&[false, false]);
        assert!(!states.released(0));
    }

    #[test]
    fn out_of_range_is_neutral() {
        // no panic past the end
        let mut states = ButtonStates::new(1);
        states.update(&[true]);
        assert!(!states.down(5) && !states.pressed(5) && !states.released(5));
    }

    #[test]
    fn resized_snapshot_restarts() {
        // a device with a new button count starts from all-released
        let mut states = ButtonStates::new(1);
        states.update(&[true]);
        states.update(&[true, true, false]);
        assert_eq!(states.len(), 3);
        assert!(states.pressed(0) && states.pressed(1));
    }

    #[test]
    fn button_indices_follow_declaration() {
        // mapping tables are indexed by these
        assert_eq!(Button::A.index(), 0);
        assert_eq!(Button::DirPadRight.index(), 14);
        assert_eq!(Button::ALL.len(), 15);
        assert_eq!(Axis::TriggerRight.index(), 5);
    }
}
