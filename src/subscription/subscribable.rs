// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscribable trait for devices that publish state changes.

use crate::state::{DeviceState, StateChange};
use crate::subscription::SubscriptionId;
use crate::types::PowerState;

/// Trait for types that support state change subscriptions.
///
/// Implemented by the generic device core and by every category adapter,
/// which forward to the core's [`CallbackRegistry`](super::CallbackRegistry).
///
/// # Examples
///
/// ```ignore
/// use irdrive_lib::subscription::Subscribable;
///
/// let sub_id = fan.on_power_changed(|state| {
///     println!("Fan is now {state}");
/// });
///
/// fan.on_state_changed(|change, state| {
///     println!("{change:?} -> speed {:?}", state.speed());
/// });
///
/// fan.unsubscribe(sub_id);
/// ```
pub trait Subscribable {
    /// Subscribes to power state changes.
    ///
    /// The callback is called whenever the assumed power state flips, be it
    /// through a transmission, a sensor event or a verification correction.
    fn on_power_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(PowerState) + Send + Sync + 'static;

    /// Subscribes to all state changes.
    ///
    /// The callback receives every committed change and the resulting state.
    fn on_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&StateChange, &DeviceState) + Send + Sync + 'static;

    /// Unsubscribes a callback by its subscription ID.
    ///
    /// Returns `true` if the subscription was found and removed.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}
