// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state management types.
//!
//! The [`DeviceState`] struct holds the assumed state of a device, while
//! [`StateChange`] represents individual changes that can be applied.
//!
//! # Examples
//!
//! ```
//! use irdrive_lib::state::{DeviceState, StateChange};
//! use irdrive_lib::types::PowerState;
//!
//! let mut state = DeviceState::new();
//! state.apply(&StateChange::batch(vec![
//!     StateChange::commanded_power(PowerState::On),
//!     StateChange::Brightness(100),
//! ]));
//!
//! assert!(state.is_on());
//! assert_eq!(state.brightness(), Some(100));
//! ```

mod device_state;
mod state_change;
mod store;

pub use device_state::DeviceState;
pub use state_change::StateChange;
pub(crate) use store::StateStore;
