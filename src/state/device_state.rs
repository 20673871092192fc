// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state tracking.

use crate::types::{FanDirection, PowerState};

use super::StateChange;

/// Assumed state of an IR/RF device.
///
/// IR and RF are one-way: nothing confirms that a transmission was received.
/// This record is therefore what the library *believes*, kept in line with
/// reality by committing changes only after complete transmissions and by
/// reconciling against an optional power sensor.
///
/// Category attributes are optional because not every device has them.
///
/// # Examples
///
/// ```
/// use irdrive_lib::state::DeviceState;
/// use irdrive_lib::types::PowerState;
///
/// let state = DeviceState::new();
/// assert_eq!(state.power(), PowerState::Off);
/// assert!(!state.on_by_remote());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DeviceState {
    /// Assumed power state.
    power: PowerState,
    /// Set when a power sensor saw the device switch on without us.
    on_by_remote: bool,
    /// Fan speed label.
    speed: Option<String>,
    /// Fan direction.
    direction: Option<FanDirection>,
    /// Fan oscillation.
    oscillating: Option<bool>,
    /// Light brightness level.
    brightness: Option<u32>,
    /// Light color temperature in Kelvin.
    color_temp: Option<u32>,
    /// Media player source name.
    source: Option<String>,
}

impl DeviceState {
    /// Creates a state with power off and no attributes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Power ==========

    /// Returns the assumed power state.
    #[must_use]
    pub fn power(&self) -> PowerState {
        self.power
    }

    /// Returns `true` if the device is assumed to be on.
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.power.is_on()
    }

    /// Returns `true` if the device was switched on by something other than
    /// this library, as inferred from the power sensor.
    #[must_use]
    pub fn on_by_remote(&self) -> bool {
        self.on_by_remote
    }

    // ========== Attributes ==========

    /// Returns the fan speed label.
    #[must_use]
    pub fn speed(&self) -> Option<&str> {
        self.speed.as_deref()
    }

    /// Returns the fan direction.
    #[must_use]
    pub fn direction(&self) -> Option<FanDirection> {
        self.direction
    }

    /// Returns the fan oscillation.
    #[must_use]
    pub fn oscillating(&self) -> Option<bool> {
        self.oscillating
    }

    /// Returns the light brightness level.
    #[must_use]
    pub fn brightness(&self) -> Option<u32> {
        self.brightness
    }

    /// Returns the light color temperature in Kelvin.
    #[must_use]
    pub fn color_temp(&self) -> Option<u32> {
        self.color_temp
    }

    /// Returns the media player source.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    // ========== State Changes ==========

    /// Applies a state change and returns whether the state actually changed.
    pub fn apply(&mut self, change: &StateChange) -> bool {
        fn replace<T: PartialEq>(slot: &mut Option<T>, value: T) -> bool {
            if slot.as_ref() == Some(&value) {
                false
            } else {
                *slot = Some(value);
                true
            }
        }

        match change {
            StateChange::Power {
                state,
                on_by_remote,
            } => {
                let changed = self.power != *state || self.on_by_remote != *on_by_remote;
                self.power = *state;
                self.on_by_remote = *on_by_remote;
                changed
            }
            StateChange::Speed(speed) => replace(&mut self.speed, speed.clone()),
            StateChange::Direction(direction) => replace(&mut self.direction, *direction),
            StateChange::Oscillating(oscillating) => {
                replace(&mut self.oscillating, *oscillating)
            }
            StateChange::Brightness(level) => replace(&mut self.brightness, *level),
            StateChange::ColorTemp(kelvin) => replace(&mut self.color_temp, *kelvin),
            StateChange::Source(source) => replace(&mut self.source, source.clone()),
            StateChange::Batch(changes) => changes
                .iter()
                .fold(false, |changed, nested| self.apply(nested) || changed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_off() {
        let state = DeviceState::new();
        assert_eq!(state.power(), PowerState::Off);
        assert!(!state.is_on());
        assert!(state.speed().is_none());
        assert!(state.source().is_none());
    }

    #[test]
    fn apply_power_reports_change() {
        let mut state = DeviceState::new();
        assert!(state.apply(&StateChange::commanded_power(PowerState::On)));
        assert!(!state.apply(&StateChange::commanded_power(PowerState::On)));
        assert!(state.is_on());
    }

    #[test]
    fn apply_power_tracks_remote_flag() {
        let mut state = DeviceState::new();
        assert!(state.apply(&StateChange::Power {
            state: PowerState::On,
            on_by_remote: true,
        }));
        assert!(state.on_by_remote());

        // Same power, flag cleared: still a change
        assert!(state.apply(&StateChange::commanded_power(PowerState::On)));
        assert!(!state.on_by_remote());
    }

    #[test]
    fn apply_attributes() {
        let mut state = DeviceState::new();
        assert!(state.apply(&StateChange::Speed("low".to_string())));
        assert!(state.apply(&StateChange::Direction(FanDirection::Reverse)));
        assert!(state.apply(&StateChange::Oscillating(true)));
        assert!(state.apply(&StateChange::Brightness(128)));
        assert!(state.apply(&StateChange::ColorTemp(4000)));
        assert!(state.apply(&StateChange::Source("HDMI 1".to_string())));

        assert_eq!(state.speed(), Some("low"));
        assert_eq!(state.direction(), Some(FanDirection::Reverse));
        assert_eq!(state.oscillating(), Some(true));
        assert_eq!(state.brightness(), Some(128));
        assert_eq!(state.color_temp(), Some(4000));
        assert_eq!(state.source(), Some("HDMI 1"));

        assert!(!state.apply(&StateChange::Brightness(128)));
    }

    #[test]
    fn apply_batch_applies_every_change() {
        let mut state = DeviceState::new();
        let batch = StateChange::batch(vec![
            StateChange::commanded_power(PowerState::On),
            StateChange::Speed("high".to_string()),
        ]);

        assert!(state.apply(&batch));
        assert!(state.is_on());
        assert_eq!(state.speed(), Some("high"));
        assert!(!state.apply(&batch));
    }

    #[test]
    fn deserializes_partial_snapshot() {
        let state: DeviceState = serde_json::from_str(r#"{"power":"on","speed":"low"}"#).unwrap();
        assert!(state.is_on());
        assert_eq!(state.speed(), Some("low"));
        assert!(state.brightness().is_none());
    }
}
