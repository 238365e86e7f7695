use crate::{
    controller::{Axis, Button, ButtonStates, GameController},
    input::Input,
    mappings::{ControllerMapping, find_mapping},
};

/// Raw state of a joystick device
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoystickSnapshot {
    pub name: String,
    pub buttons: Vec<bool>,
    pub axes: Vec<f32>,
}

/// Backend reporting joystick state
///
/// `poll` returns `None` while nothing is plugged into the slot.
pub trait JoystickSource {
    fn poll(&mut self, slot: usize) -> Option<JoystickSnapshot>;
}

/// A physical pad, remapped to the [`Button`] & [`Axis`] layout
pub struct JoystickController<S: JoystickSource> {
    source: S,
    slot: usize,
    mappings: Vec<ControllerMapping>,
    mapping: Option<ControllerMapping>,
    name: String,
    device_buttons: usize,
    states: ButtonStates,
    axes: Vec<f32>,
}

impl<S: JoystickSource> JoystickController<S> {
    pub fn new(source: S, slot: usize) -> Self {
        Self::with_mappings(source, slot, ControllerMapping::builtin())
    }

    pub fn with_mappings(source: S, slot: usize, mappings: Vec<ControllerMapping>) -> Self {
        Self {
            source,
            slot,
            mappings,
            mapping: None,
            name: String::new(),
            device_buttons: 0,
            states: ButtonStates::default(),
            axes: Vec::new(),
        }
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn mapping(&self) -> Option<&ControllerMapping> {
        self.mapping.as_ref()
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Polls the source; picks a mapping on connect & clears state on unplug
    pub fn poll(&mut self) {
        let Some(snapshot) = self.source.poll(self.slot) else {
            if self.mapping.take().is_some() {
                log::info!("joystick {:?} disconnected", self.name);
                self.name.clear();
                self.device_buttons = 0;
                self.states = ButtonStates::default();
                self.axes.clear();
            }
            return;
        };

        let replugged = self.name != snapshot.name || self.device_buttons != snapshot.buttons.len();
        if self.mapping.is_none() || replugged {
            self.mapping = Some(find_mapping(
                &self.mappings,
                &snapshot.name,
                snapshot.buttons.len(),
                snapshot.axes.len(),
            ));
            self.name = snapshot.name.clone();
            self.device_buttons = snapshot.buttons.len();
        }
        let Some(mapping) = &self.mapping else {
            return;
        };

        let raw: Vec<bool> = Button::ALL
            .iter()
            .map(|b| {
                mapping
                    .button(b.index())
                    .and_then(|i| snapshot.buttons.get(i))
                    .copied()
                    .unwrap_or(false)
            })
            .collect();
        self.states.update(&raw);

        self.axes = (0..mapping.axes.len())
            .map(|slot| {
                mapping
                    .axis(slot)
                    .and_then(|i| snapshot.axes.get(i))
                    .copied()
                    .unwrap_or(0.0)
            })
            .collect();
    }
}

impl<S: JoystickSource> GameController for JoystickController<S> {
    fn update(&mut self, _input: &Input) {
        self.poll();
    }

    fn connected(&self) -> bool {
        self.mapping.is_some()
    }

    fn num_buttons(&self) -> usize {
        self.device_buttons
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
        format!(
            "{} buttons:{} axes:{}",
            self.name,
            self.num_buttons(),
            self.num_axes()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One scripted slot
    #[derive(Default)]
    struct Scripted {
        current: Option<JoystickSnapshot>,
    }

    impl JoystickSource for Scripted {
        fn poll(&mut self, slot: usize) -> Option<JoystickSnapshot> {
            if slot == 0 { self.current.clone() } else { None }
        }
    }

    fn xbox(pressed: &[usize]) -> JoystickSnapshot {
        let mut buttons = vec![false; 15];
        for &i in pressed {
            buttons[i] = true;
        }
        JoystickSnapshot {
            name: "Xbox 360 Wired Controller".into(),
            buttons,
            axes: vec![0.5, -0.25, 0.0, 0.0, 1.0, 0.0],
        }
    }

    #[test]
    fn remaps_device_buttons() {
        // device button 11 is A on an Xbox 360 pad
        let mut pad = JoystickController::new(Scripted { current: Some(xbox(&[11])) }, 0);
        pad.poll();
        assert!(pad.connected());
        assert!(pad.button_pressed(Button::A));
        assert!(!pad.button_down(Button::B));
        assert_eq!(pad.num_buttons(), 15);
        assert_eq!(pad.axis_value(Axis::LeftX), 0.5);
        assert_eq!(pad.axis_value(Axis::TriggerLeft), 1.0);
    }

    #[test]
    fn unplug_resets() {
        // a held button doesn't survive a disconnect
        let mut pad = JoystickController::new(Scripted { current: Some(xbox(&[0])) }, 0);
        pad.poll();
        assert!(pad.button_down(Button::DirPadUp));

        pad.source_mut().current = None;
        pad.poll();
        assert!(!pad.connected());
        assert!(!pad.button_down(Button::DirPadUp));
        assert_eq!(pad.axis_value(Axis::LeftX), 0.0);
        assert_eq!(pad.num_buttons(), 0);

        pad.source_mut().current = Some(xbox(&[0]));
        pad.poll();
        assert!(pad.button_pressed(Button::DirPadUp));
    }

    #[test]
    fn empty_slot_stays_disconnected() {
        // polling another slot finds nothing
        let mut pad = JoystickController::new(Scripted { current: Some(xbox(&[])) }, 1);
        pad.poll();
        assert!(!pad.connected());
        assert!(pad.mapping().is_none());
    }

    #[test]
    fn ps4_layout_picked_by_name() {
        // device button 1 is A on a PS4 pad
        let mut buttons = vec![false; 18];
        buttons[1] = true;
        let source = Scripted {
            current: Some(JoystickSnapshot {
                name: "Sony Wireless Controller".into(),
                buttons,
                axes: vec![0.0; 6],
            }),
        };
        let mut pad = JoystickController::new(source, 0);
        pad.poll();
        assert_eq!(pad.mapping(), Some(&ControllerMapping::ps4()));
        assert!(pad.button_down(Button::A));
        assert!(pad.description().starts_with("Sony Wireless Controller"));
    }
}
