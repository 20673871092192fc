// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State change representation.
//!
//! State changes are the only way a [`DeviceState`](super::DeviceState) is
//! mutated. A command plan carries the changes it implies and they are
//! applied only once every code of the plan was transmitted; the power
//! reconciler produces changes from sensor readings.
//!
//! # Examples
//!
//! ```
//! use irdrive_lib::state::{DeviceState, StateChange};
//! use irdrive_lib::types::PowerState;
//!
//! let mut state = DeviceState::new();
//!
//! // Apply returns true if state actually changed
//! assert!(state.apply(&StateChange::commanded_power(PowerState::On)));
//!
//! // Applying the same change again returns false
//! assert!(!state.apply(&StateChange::commanded_power(PowerState::On)));
//! ```

use crate::types::{FanDirection, PowerState};

/// A discrete change of device state.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum StateChange {
    /// Power state changed.
    Power {
        /// The new power state.
        state: PowerState,
        /// Whether the device was switched by something other than us.
        on_by_remote: bool,
    },

    /// Fan speed label changed.
    Speed(String),

    /// Fan direction changed.
    Direction(FanDirection),

    /// Fan oscillation changed.
    Oscillating(bool),

    /// Light brightness level changed.
    Brightness(u32),

    /// Light color temperature changed, in Kelvin.
    ColorTemp(u32),

    /// Media player source changed.
    Source(String),

    /// Multiple changes committed together.
    Batch(Vec<StateChange>),
}

impl StateChange {
    /// Power change caused by one of our own transmissions.
    #[must_use]
    pub fn commanded_power(state: PowerState) -> Self {
        Self::Power {
            state,
            on_by_remote: false,
        }
    }

    /// Creates a batch of changes.
    #[must_use]
    pub fn batch(changes: Vec<StateChange>) -> Self {
        Self::Batch(changes)
    }

    /// Returns the power state this change sets, if any.
    ///
    /// For a batch, the last power change wins.
    #[must_use]
    pub fn power_target(&self) -> Option<PowerState> {
        match self {
            Self::Power { state, .. } => Some(*state),
            Self::Batch(changes) => changes.iter().rev().find_map(Self::power_target),
            _ => None,
        }
    }

    /// Returns `true` if this is an empty batch.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Batch(changes) if changes.iter().all(Self::is_empty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commanded_power_clears_remote_flag() {
        assert_eq!(
            StateChange::commanded_power(PowerState::On),
            StateChange::Power {
                state: PowerState::On,
                on_by_remote: false
            }
        );
    }

    #[test]
    fn power_target_of_batch() {
        let batch = StateChange::batch(vec![
            StateChange::commanded_power(PowerState::On),
            StateChange::Brightness(50),
        ]);
        assert_eq!(batch.power_target(), Some(PowerState::On));
        assert_eq!(StateChange::Oscillating(true).power_target(), None);
    }

    #[test]
    fn empty_batches() {
        assert!(StateChange::batch(Vec::new()).is_empty());
        assert!(StateChange::batch(vec![StateChange::batch(Vec::new())]).is_empty());
        assert!(!StateChange::batch(vec![StateChange::Oscillating(false)]).is_empty());
        assert!(!StateChange::Brightness(1).is_empty());
    }

    #[test]
    fn serializes_for_persistence() {
        let change = StateChange::Speed("high".to_string());
        let json = serde_json::to_string(&change).unwrap();
        let back: StateChange = serde_json::from_str(&json).unwrap();
        assert_eq!(back, change);
    }
}
