// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscription system for device state changes.
//!
//! IR/RF devices never report their state, so every notification comes from
//! inside the library: a committed transmission, a power sensor event or a
//! verification correction.
//!
//! # Overview
//!
//! - [`SubscriptionId`] - A unique identifier for a subscription, used to unsubscribe
//! - [`CallbackRegistry`] - Registry that manages callbacks and dispatches events
//! - [`Subscribable`] - Trait for types that support event subscriptions
//!
//! # Usage
//!
//! ```
//! use irdrive_lib::state::{DeviceState, StateChange};
//! use irdrive_lib::subscription::CallbackRegistry;
//! use irdrive_lib::types::PowerState;
//!
//! let registry = CallbackRegistry::new();
//! let sub_id = registry.on_power_changed(|state| {
//!     println!("Power changed to {state}");
//! });
//!
//! let mut state = DeviceState::new();
//! let change = StateChange::commanded_power(PowerState::On);
//! state.apply(&change);
//! registry.dispatch(&change, &state, PowerState::Off);
//!
//! registry.unsubscribe(sub_id);
//! ```

mod callback;
mod subscribable;

pub use callback::{CallbackRegistry, SubscriptionId};
pub use subscribable::Subscribable;
