// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared, observable device state.

use parking_lot::RwLock;

use crate::subscription::CallbackRegistry;

use super::{DeviceState, StateChange};

/// Device state plus the callbacks observing it.
///
/// Every mutation happens under the write lock, so commits and sensor
/// events never interleave. Callbacks run after the lock is released.
#[derive(Debug, Default)]
pub(crate) struct StateStore {
    state: RwLock<DeviceState>,
    callbacks: CallbackRegistry,
}

impl StateStore {
    pub(crate) fn new(initial: DeviceState) -> Self {
        Self {
            state: RwLock::new(initial),
            callbacks: CallbackRegistry::new(),
        }
    }

    /// Returns a copy of the current state.
    pub(crate) fn snapshot(&self) -> DeviceState {
        self.state.read().clone()
    }

    pub(crate) fn callbacks(&self) -> &CallbackRegistry {
        &self.callbacks
    }

    /// Applies `change` and notifies observers if anything changed.
    pub(crate) fn commit(&self, change: &StateChange) -> bool {
        self.commit_with(|_| Some(change.clone())).is_some()
    }

    /// Derives a change from the current state and applies it atomically.
    ///
    /// Returns the change if it modified the state.
    pub(crate) fn commit_with<F>(&self, derive: F) -> Option<StateChange>
    where
        F: FnOnce(&DeviceState) -> Option<StateChange>,
    {
        let (change, snapshot, previous_power) = {
            let mut state = self.state.write();
            let change = derive(&state)?;
            let previous_power = state.power();
            if !state.apply(&change) {
                return None;
            }
            (change, state.clone(), previous_power)
        };

        self.callbacks.dispatch(&change, &snapshot, previous_power);
        Some(change)
    }

    /// Applies `change` without notifying anyone.
    pub(crate) fn seed(&self, change: &StateChange) {
        self.state.write().apply(change);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PowerState;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn commit_notifies_only_on_change() {
        let store = StateStore::default();
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();
        store.callbacks().on_state_changed(move |_, _| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert!(store.commit(&StateChange::commanded_power(PowerState::On)));
        assert!(!store.commit(&StateChange::commanded_power(PowerState::On)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn commit_with_sees_current_state() {
        let store = StateStore::default();
        let change = store.commit_with(|state| {
            (!state.is_on()).then(|| StateChange::commanded_power(PowerState::On))
        });
        assert!(change.is_some());
        assert!(store.commit_with(|state| {
            (!state.is_on()).then(|| StateChange::commanded_power(PowerState::On))
        })
        .is_none());
    }

    #[test]
    fn callbacks_can_read_state() {
        let store = Arc::new(StateStore::default());
        let store_clone = Arc::clone(&store);
        let seen = Arc::new(RwLock::new(None));
        let seen_clone = seen.clone();
        store.callbacks().on_power_changed(move |_| {
            // Lock is released before dispatch
            *seen_clone.write() = Some(store_clone.snapshot().power());
        });

        store.commit(&StateChange::commanded_power(PowerState::On));
        assert_eq!(*seen.read(), Some(PowerState::On));
    }

    #[test]
    fn seed_is_silent() {
        let store = StateStore::default();
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();
        store.callbacks().on_state_changed(move |_, _| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });

        store.seed(&StateChange::Speed("low".to_string()));
        assert_eq!(store.snapshot().speed(), Some("low"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
