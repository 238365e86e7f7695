//! Button & axis layouts of known joysticks

/// Maps each [`crate::controller::Button`] & [`crate::controller::Axis`] to a device index
///
/// A mapping applies to a device whose name contains `name_pattern` and
/// whose button & axis counts match the table lengths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerMapping {
    pub name_pattern: String,
    pub buttons: Vec<usize>,
    pub axes: Vec<usize>,
}

impl ControllerMapping {
    pub fn new(name_pattern: &str, buttons: &[usize], axes: &[usize]) -> Self {
        Self {
            name_pattern: name_pattern.to_string(),
            buttons: buttons.to_vec(),
            axes: axes.to_vec(),
        }
    }

    /// PS4 pad over USB
    pub fn ps4() -> Self {
        Self::new(
            "Wireless Controller",
            &[1, 2, 0, 3, 8, 12, 9, 10, 11, 4, 5, 14, 16, 17, 15, 13, 6, 7],
            &[0, 1, 2, 3, 4, 5],
        )
    }

    /// Wired Xbox 360 pad, also the fallback layout
    pub fn xbox_360() -> Self {
        Self::new(
            "Xbox 360",
            &[11, 12, 13, 14, 5, 10, 4, 6, 7, 8, 9, 0, 1, 2, 3],
            &[0, 1, 2, 3, 4, 5],
        )
    }

    pub fn builtin() -> Vec<Self> {
        vec![Self::ps4(), Self::xbox_360()]
    }

    pub fn matches(&self, name: &str, num_buttons: usize, num_axes: usize) -> bool {
        name.contains(&self.name_pattern)
            && self.buttons.len() == num_buttons
            && self.axes.len() == num_axes
    }

    /// Device index for a button slot, `None` past the table
    pub fn button(&self, slot: usize) -> Option<usize> {
        self.buttons.get(slot).copied()
    }

    pub fn axis(&self, slot: usize) -> Option<usize> {
        self.axes.get(slot).copied()
    }
}

/// First of `mappings` matching the device, or the Xbox 360 layout
pub fn find_mapping(
    mappings: &[ControllerMapping],
    name: &str,
    num_buttons: usize,
    num_axes: usize,
) -> ControllerMapping {
    match mappings
        .iter()
        .find(|m| m.matches(name, num_buttons, num_axes))
    {
        Some(mapping) => {
            log::info!("joystick {name:?}: using the {:?} mapping", mapping.name_pattern);
            mapping.clone()
        }
        None => {
            log::warn!(
                "joystick {name:?} ({num_buttons} buttons, {num_axes} axes): no mapping found, using Xbox 360"
            );
            ControllerMapping::xbox_360()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_by_name_and_counts() {
        // name alone isn't enough, the layout sizes must match
        let builtin = ControllerMapping::builtin();
        let ps4 = find_mapping(&builtin, "Sony Wireless Controller", 18, 6);
        assert_eq!(ps4, ControllerMapping::ps4());

        let wrong_count = find_mapping(&builtin, "Sony Wireless Controller", 14, 6);
        assert_eq!(wrong_count, ControllerMapping::xbox_360());

        let xbox = find_mapping(&builtin, "Microsoft Xbox 360 Wired Controller", 15, 6);
        assert_eq!(xbox, ControllerMapping::xbox_360());
    }

    #[test]
    fn unknown_devices_fall_back() {
        // anything unrecognised gets the Xbox 360 layout
        let mapping = find_mapping(&ControllerMapping::builtin(), "Generic USB Pad", 12, 4);
        assert_eq!(mapping, ControllerMapping::xbox_360());
        assert_eq!(find_mapping(&[], "", 0, 0), ControllerMapping::xbox_360());
    }

    #[test]
    fn slots_past_the_table() {
        // lookups never index out of bounds
        let xbox = ControllerMapping::xbox_360();
        assert_eq!(xbox.button(0), Some(11));
        assert_eq!(xbox.button(15), None);
        assert_eq!(xbox.axis(6), None);
    }
}
