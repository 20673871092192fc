// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power sensor reconciliation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;

use crate::state::{StateChange, StateStore};
use crate::types::{PowerState, SensorEvent, SensorReading};

use super::VerificationHandle;

/// The scheduled check and the generation it was scheduled under.
#[derive(Debug)]
struct Pending {
    generation: u64,
    handle: VerificationHandle,
}

#[derive(Debug)]
struct Shared {
    device: String,
    store: Arc<StateStore>,
    last_reading: Mutex<Option<SensorReading>>,
    pending: Mutex<Option<Pending>>,
    generation: AtomicU64,
}

/// Keeps the assumed power state in line with an external power sensor.
///
/// Sensor events may override the state at any time. Each transmission
/// that changes power schedules a verification after the sensor delay; a
/// newer schedule replaces an older one. When the check fires and the last
/// reading contradicts the expectation, the reading wins.
#[derive(Debug)]
pub struct PowerReconciler {
    shared: Arc<Shared>,
    sensor_delay: Option<Duration>,
    feed: Mutex<Option<AbortHandle>>,
}

impl PowerReconciler {
    /// Creates a reconciler; `sensor_delay` is `None` without a sensor.
    pub(crate) fn new(
        device: impl Into<String>,
        store: Arc<StateStore>,
        sensor_delay: Option<Duration>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                device: device.into(),
                store,
                last_reading: Mutex::new(None),
                pending: Mutex::new(None),
                generation: AtomicU64::new(0),
            }),
            sensor_delay,
            feed: Mutex::new(None),
        }
    }

    /// Returns `true` if a power sensor is configured.
    #[must_use]
    pub fn has_sensor(&self) -> bool {
        self.sensor_delay.is_some()
    }

    /// Returns the last reading received from the sensor.
    #[must_use]
    pub fn last_reading(&self) -> Option<SensorReading> {
        *self.shared.last_reading.lock()
    }

    /// Returns the power state the pending check expects, if one is pending.
    #[must_use]
    pub fn pending_expectation(&self) -> Option<PowerState> {
        self.shared
            .pending
            .lock()
            .as_ref()
            .filter(|pending| pending.handle.is_pending())
            .map(|pending| pending.handle.expected())
    }

    // ========== Verification ==========

    /// Schedules a check that the device reaches `expected`.
    ///
    /// Replaces any pending check. Does nothing without a sensor.
    pub fn schedule(&self, expected: PowerState) {
        let Some(delay) = self.sensor_delay else {
            return;
        };

        let mut pending = self.shared.pending.lock();
        if let Some(previous) = pending.take() {
            previous.handle.cancel();
        }

        let generation = self.shared.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let weak = Arc::downgrade(&self.shared);
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(shared) = weak.upgrade() {
                shared.verify(generation);
            }
        });

        *pending = Some(Pending {
            generation,
            handle: VerificationHandle::new(expected, task.abort_handle()),
        });

        tracing::debug!(
            device = %self.shared.device,
            expected = %expected,
            delay_secs = delay.as_secs(),
            "Scheduled power sensor check"
        );
    }

    /// Cancels the pending check, if any.
    pub fn cancel_pending(&self) {
        if let Some(pending) = self.shared.pending.lock().take() {
            pending.handle.cancel();
        }
    }

    // ========== Sensor events ==========

    /// Handles a sensor event and returns whether the state changed.
    pub fn handle_sensor_event(&self, event: SensorEvent) -> bool {
        if !self.has_sensor() {
            tracing::debug!(device = %self.shared.device, "Ignoring sensor event, no power sensor configured");
            return false;
        }
        self.shared.handle_event(event)
    }

    /// Spawns a task feeding sensor events from `rx` into this reconciler.
    ///
    /// Replaces a previously attached feed. The task ends when the sender
    /// side is dropped, or on [`shutdown`](Self::shutdown).
    pub fn attach_feed(&self, mut rx: mpsc::Receiver<SensorEvent>) {
        let weak: Weak<Shared> = Arc::downgrade(&self.shared);
        let has_sensor = self.has_sensor();
        let task = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let Some(shared) = weak.upgrade() else {
                    break;
                };
                if has_sensor {
                    shared.handle_event(event);
                }
            }
        });

        if let Some(previous) = self.feed.lock().replace(task.abort_handle()) {
            previous.abort();
        }
    }

    /// Cancels the pending check and stops the sensor feed.
    pub fn shutdown(&self) {
        self.cancel_pending();
        if let Some(feed) = self.feed.lock().take() {
            feed.abort();
        }
    }
}

impl Drop for PowerReconciler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl Shared {
    fn handle_event(&self, event: SensorEvent) -> bool {
        let Some(current) = event.current else {
            // Sensor removed
            *self.last_reading.lock() = None;
            return false;
        };
        *self.last_reading.lock() = Some(current);

        if !event.is_transition() {
            return false;
        }

        let change = self.store.commit_with(|state| match current {
            SensorReading::On if state.power() != PowerState::On => Some(StateChange::Power {
                state: PowerState::On,
                on_by_remote: true,
            }),
            SensorReading::Off => Some(StateChange::Power {
                state: PowerState::Off,
                on_by_remote: false,
            }),
            SensorReading::On | SensorReading::Unknown => None,
        });

        if change.is_some() {
            tracing::debug!(device = %self.device, reading = %current, "Power sensor changed device state");
        }
        change.is_some()
    }

    fn verify(&self, generation: u64) {
        let expected = {
            let mut pending = self.pending.lock();
            match pending.as_ref() {
                Some(current) if current.generation == generation => {}
                _ => return,
            }
            pending.take().map(|p| p.handle.expected())
        };
        let Some(expected) = expected else {
            return;
        };

        let observed = *self.last_reading.lock();
        tracing::debug!(
            device = %self.device,
            expected = %expected,
            observed = ?observed,
            "Executing power sensor check"
        );

        let Some(observed) = observed.and_then(|reading| reading.power_state()) else {
            return;
        };
        if observed == expected {
            return;
        }

        let forced = self.store.commit_with(|state| {
            let on_by_remote = observed.is_on() && state.on_by_remote();
            Some(StateChange::Power {
                state: observed,
                on_by_remote,
            })
        });

        if forced.is_some() {
            tracing::info!(
                device = %self.device,
                expected = %expected,
                observed = %observed,
                "Power sensor check failed, reverted device state"
            );
        }
    }
}
