// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IR/RF device abstraction.
//!
//! Every device is a [`DeviceCore`] that owns its command vocabulary, its
//! assumed state, a transmission serializer, a power reconciler and the
//! injected [`Controller`]. The category adapters ([`Fan`], [`Light`],
//! [`MediaPlayer`]) translate their vocabulary into [`CommandPlan`]s and hand
//! them to the core.
//!
//! # Examples
//!
//! ```no_run
//! use irdrive_lib::{DeviceConfig, DeviceProfile};
//! use irdrive_lib::device::Fan;
//! use irdrive_lib::protocol::HttpController;
//! use irdrive_lib::subscription::Subscribable;
//!
//! # async fn example(profile_json: &str) -> irdrive_lib::Result<()> {
//! let profile = DeviceProfile::from_json(profile_json)?;
//! let controller = HttpController::new("192.168.1.120")?;
//! let fan = Fan::new(DeviceConfig::new("Bedroom Fan"), profile, controller)?;
//!
//! fan.on_power_changed(|state| println!("Fan is now {state}"));
//!
//! fan.set_percentage(66).await?;
//! fan.turn_off().await?;
//! # Ok(())
//! # }
//! ```

mod fan;
mod light;
mod media_player;
mod plan;
mod serializer;

pub use fan::Fan;
pub use light::Light;
pub use media_player::MediaPlayer;
pub use plan::CommandPlan;
pub use serializer::{TransmissionGuard, TransmissionSerializer};

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::command::{Code, CommandTree};
use crate::config::DeviceConfig;
use crate::error::{DeviceError, Error, ResolveError};
use crate::power::PowerReconciler;
use crate::profile::ProfileInfo;
use crate::protocol::Controller;
use crate::state::{DeviceState, StateChange, StateStore};
use crate::subscription::{Subscribable, SubscriptionId};
use crate::types::{DeviceId, PowerState, SensorEvent};

/// Kind of appliance a device controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceCategory {
    /// Ceiling and standing fans.
    Fan,
    /// Lamps and ceiling lights.
    Light,
    /// TVs, receivers, speakers.
    MediaPlayer,
}

impl DeviceCategory {
    /// Returns the category name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fan => "fan",
            Self::Light => "light",
            Self::MediaPlayer => "media_player",
        }
    }
}

impl fmt::Display for DeviceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generic IR/RF device.
///
/// The core knows nothing about fans or lights: it resolves command paths,
/// executes plans exclusively, and keeps the assumed state in line with the
/// optional power sensor.
///
/// # Type Parameter
///
/// `C` is the controller emitting the codes, e.g.
/// [`HttpController`](crate::protocol::HttpController) or
/// [`MqttController`](crate::protocol::MqttController).
#[derive(Debug)]
pub struct DeviceCore<C: Controller> {
    id: DeviceId,
    category: DeviceCategory,
    config: DeviceConfig,
    info: ProfileInfo,
    commands: CommandTree,
    controller: C,
    serializer: TransmissionSerializer,
    store: Arc<StateStore>,
    reconciler: PowerReconciler,
}

impl<C: Controller> DeviceCore<C> {
    /// Creates a device core.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`](crate::ConfigError) if the configuration is
    /// invalid.
    pub fn new(
        category: DeviceCategory,
        config: DeviceConfig,
        info: ProfileInfo,
        commands: CommandTree,
        controller: C,
    ) -> Result<Self, Error> {
        config.validate()?;

        let store = Arc::new(StateStore::new(DeviceState::new()));
        let sensor_delay = config
            .has_power_sensor()
            .then(|| config.power_sensor_check_delay());
        let reconciler = PowerReconciler::new(config.name.clone(), Arc::clone(&store), sensor_delay);

        tracing::debug!(
            device = %config.name,
            category = %category,
            manufacturer = %info.manufacturer,
            models = ?info.supported_models,
            "Created IR device"
        );

        Ok(Self {
            id: DeviceId::new(),
            category,
            serializer: TransmissionSerializer::new(config.inter_command_delay()),
            config,
            info,
            commands,
            controller,
            store,
            reconciler,
        })
    }

    // ========== Accessors ==========

    /// Returns the unique identifier of this instance.
    #[must_use]
    pub fn id(&self) -> DeviceId {
        self.id
    }

    /// Returns the device name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Returns the device category.
    #[must_use]
    pub fn category(&self) -> DeviceCategory {
        self.category
    }

    /// Returns the device configuration.
    #[must_use]
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Returns the profile metadata.
    #[must_use]
    pub fn info(&self) -> &ProfileInfo {
        &self.info
    }

    /// Returns the command vocabulary.
    #[must_use]
    pub fn commands(&self) -> &CommandTree {
        &self.commands
    }

    /// Returns the controller.
    #[must_use]
    pub fn controller(&self) -> &C {
        &self.controller
    }

    /// Returns the power reconciler.
    #[must_use]
    pub fn reconciler(&self) -> &PowerReconciler {
        &self.reconciler
    }

    /// Returns a snapshot of the assumed device state.
    #[must_use]
    pub fn state(&self) -> DeviceState {
        self.store.snapshot()
    }

    // ========== Commands ==========

    /// Resolves a command path to a code.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] naming the key where resolution failed.
    pub fn resolve<K: AsRef<str>>(&self, path: &[K]) -> Result<Code, ResolveError> {
        self.commands.resolve(path).cloned()
    }

    /// Transmits a plan and commits its state change.
    ///
    /// When the plan changes power and a sensor is configured, a
    /// verification is scheduled before the first code is sent. Returns
    /// whether the state changed.
    ///
    /// # Errors
    ///
    /// Returns [`TransmissionError`](crate::TransmissionError) if a code
    /// could not be sent; the state is then left untouched.
    pub async fn execute(&self, plan: &CommandPlan) -> Result<bool, Error> {
        let guard = self.serializer.acquire().await;
        self.run(&guard, plan).await
    }

    /// Builds a plan from the latest state and executes it.
    ///
    /// `build` runs with exclusive access to the transmitter, so it sees the
    /// state committed by every earlier plan.
    ///
    /// # Errors
    ///
    /// Returns the error of `build` without transmitting anything, or a
    /// [`TransmissionError`](crate::TransmissionError) as [`execute`](Self::execute).
    pub async fn execute_with<F>(&self, build: F) -> Result<bool, Error>
    where
        F: FnOnce(&DeviceState) -> Result<CommandPlan, Error>,
    {
        let guard = self.serializer.acquire().await;
        let plan = build(&self.store.snapshot()).inspect_err(|err| {
            tracing::warn!(device = %self.config.name, error = %err, "Command rejected");
        })?;
        self.run(&guard, &plan).await
    }

    async fn run(&self, guard: &TransmissionGuard<'_>, plan: &CommandPlan) -> Result<bool, Error> {
        if let Some(target) = plan.power_target()
            && target != self.store.snapshot().power()
        {
            self.reconciler.schedule(target);
        }

        tracing::debug!(
            device = %self.config.name,
            codes = plan.codes().len(),
            power = ?plan.power_target(),
            "Executing command plan"
        );

        if let Err(err) = guard.send_all(&self.controller, plan.codes()).await {
            tracing::warn!(device = %self.config.name, error = %err, "Command plan aborted");
            return Err(err.into());
        }

        Ok(self.store.commit(&plan.state_change()))
    }

    // ========== Power sensor ==========

    /// Handles a power sensor event and returns whether the state changed.
    pub fn handle_sensor_event(&self, event: SensorEvent) -> bool {
        self.reconciler.handle_sensor_event(event)
    }

    /// Feeds sensor events from `rx` into the reconciler in the background.
    pub fn attach_sensor_feed(&self, rx: mpsc::Receiver<SensorEvent>) {
        self.reconciler.attach_feed(rx);
    }

    // ========== Restore ==========

    /// Returns the power part of restoring `snapshot`.
    ///
    /// Power comes back as off only if it was off; `on_by_remote` is kept
    /// only with a power sensor.
    #[must_use]
    pub fn restored_power(&self, snapshot: &DeviceState) -> StateChange {
        let state = if snapshot.power() == PowerState::Off {
            PowerState::Off
        } else {
            PowerState::On
        };
        StateChange::Power {
            state,
            on_by_remote: self.config.has_power_sensor() && snapshot.on_by_remote(),
        }
    }

    /// Restores the power part of a persisted snapshot.
    pub fn restore_state(&self, snapshot: &DeviceState) -> bool {
        self.commit_restored(vec![self.restored_power(snapshot)])
    }

    pub(crate) fn commit_restored(&self, changes: Vec<StateChange>) -> bool {
        tracing::debug!(device = %self.config.name, "Restoring device state");
        self.store.commit(&StateChange::batch(changes))
    }

    /// Applies a change without notifying observers.
    pub(crate) fn seed(&self, change: &StateChange) {
        self.store.seed(change);
    }

    /// Returns `true` if attributes should be hidden because the device was
    /// switched on by remote and restoring is disabled.
    pub(crate) fn attributes_hidden(&self) -> bool {
        !self.config.power_sensor_restore_state && self.store.snapshot().on_by_remote()
    }

    // ========== Lifecycle ==========

    /// Cancels the pending verification and stops the sensor feed.
    pub fn shutdown(&self) {
        tracing::debug!(device = %self.config.name, "Shutting down IR device");
        self.reconciler.shutdown();
    }

    // ========== Helpers ==========

    /// Checks if a capability is supported.
    // Uses &self for method call syntax consistency, even though it only needs the parameters.
    #[allow(clippy::unused_self)]
    pub(crate) fn check_capability(&self, name: &str, supported: bool) -> Result<(), Error> {
        if supported {
            Ok(())
        } else {
            Err(Error::Device(DeviceError::UnsupportedCapability {
                capability: name.to_string(),
            }))
        }
    }
}

impl<C: Controller> Subscribable for DeviceCore<C> {
    fn on_power_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(PowerState) + Send + Sync + 'static,
    {
        self.store.callbacks().on_power_changed(callback)
    }

    fn on_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&StateChange, &DeviceState) + Send + Sync + 'static,
    {
        self.store.callbacks().on_state_changed(callback)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.store.callbacks().unsubscribe(id)
    }
}

/// Forwards [`Subscribable`] to the adapter's core.
macro_rules! forward_subscribable {
    ($adapter:ident) => {
        impl<C: $crate::protocol::Controller> $crate::subscription::Subscribable for $adapter<C> {
            fn on_power_changed<F>(&self, callback: F) -> $crate::subscription::SubscriptionId
            where
                F: Fn($crate::types::PowerState) + Send + Sync + 'static,
            {
                $crate::subscription::Subscribable::on_power_changed(&self.core, callback)
            }

            fn on_state_changed<F>(&self, callback: F) -> $crate::subscription::SubscriptionId
            where
                F: Fn(&$crate::state::StateChange, &$crate::state::DeviceState)
                    + Send
                    + Sync
                    + 'static,
            {
                $crate::subscription::Subscribable::on_state_changed(&self.core, callback)
            }

            fn unsubscribe(&self, id: $crate::subscription::SubscriptionId) -> bool {
                $crate::subscription::Subscribable::unsubscribe(&self.core, id)
            }
        }
    };
}

pub(crate) use forward_subscribable;
