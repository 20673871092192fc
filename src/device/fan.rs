// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IR fan adapter.

use crate::capabilities::FanCapabilities;
use crate::config::DeviceConfig;
use crate::error::{DeviceError, Error, ValueError};
use crate::profile::DeviceProfile;
use crate::protocol::Controller;
use crate::scale::OrderedScale;
use crate::state::{DeviceState, StateChange};
use crate::types::{FanDirection, PowerState};

use super::{CommandPlan, DeviceCategory, DeviceCore, forward_subscribable};

/// An IR/RF controlled fan.
///
/// Speed codes live under a direction group (`forward`/`reverse`, or
/// `default` for single-direction fans) keyed by the labels of the profile's
/// `speed` list. A fan either sends `off`, `oscillate`, or the code for its
/// current direction and speed.
///
/// # Examples
///
/// ```no_run
/// use irdrive_lib::{DeviceConfig, DeviceProfile};
/// use irdrive_lib::device::Fan;
/// use irdrive_lib::protocol::HttpController;
///
/// # async fn example() -> irdrive_lib::Result<()> {
/// let profile = DeviceProfile::from_json(r#"{
///     "speed": ["low", "medium", "high"],
///     "commands": {
///         "off": "OFF",
///         "default": { "low": "L", "medium": "M", "high": "H" }
///     }
/// }"#)?;
///
/// let fan = Fan::new(
///     DeviceConfig::new("Bedroom Fan"),
///     profile,
///     HttpController::new("192.168.1.120")?,
/// )?;
///
/// fan.set_percentage(66).await?;
/// assert_eq!(fan.speed().as_deref(), Some("medium"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Fan<C: Controller> {
    core: DeviceCore<C>,
    capabilities: FanCapabilities,
    speeds: Option<OrderedScale<String>>,
}

impl<C: Controller> Fan<C> {
    /// Creates a fan from its profile.
    ///
    /// A profile without speed labels yields a fan that can only be switched
    /// off and oscillated; the problem is logged.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`](crate::ConfigError) if the configuration is
    /// invalid.
    pub fn new(config: DeviceConfig, profile: DeviceProfile, controller: C) -> Result<Self, Error> {
        let (info, commands, scales) = profile.into_parts();

        let speeds = match OrderedScale::new("speed", scales.speed) {
            Ok(speeds) => Some(speeds),
            Err(err) => {
                tracing::error!(device = %config.name, error = %err, "Fan speed control disabled");
                None
            }
        };

        let capabilities = FanCapabilities::detect(
            &commands,
            speeds.as_ref().map(OrderedScale::as_slice).unwrap_or_default(),
        );
        let core = DeviceCore::new(DeviceCategory::Fan, config, info, commands, controller)?;

        let mut initial = vec![StateChange::Direction(if capabilities.direction {
            FanDirection::Forward
        } else {
            FanDirection::Default
        })];
        if let Some(speeds) = &speeds {
            initial.push(StateChange::Speed(speeds.first().clone()));
        }
        if capabilities.oscillate {
            initial.push(StateChange::Oscillating(false));
        }
        core.seed(&StateChange::batch(initial));

        Ok(Self {
            core,
            capabilities,
            speeds,
        })
    }

    // ========== Accessors ==========

    /// Returns the generic device core.
    #[must_use]
    pub fn core(&self) -> &DeviceCore<C> {
        &self.core
    }

    /// Returns the detected features.
    #[must_use]
    pub fn capabilities(&self) -> FanCapabilities {
        self.capabilities
    }

    /// Returns the speed labels, slowest first.
    #[must_use]
    pub fn speed_list(&self) -> &[String] {
        self.speeds.as_ref().map(OrderedScale::as_slice).unwrap_or_default()
    }

    /// Returns the number of speeds.
    #[must_use]
    pub fn speed_count(&self) -> usize {
        self.speed_list().len()
    }

    /// Returns a snapshot of the assumed state.
    #[must_use]
    pub fn state(&self) -> DeviceState {
        self.core.state()
    }

    /// Returns `true` if the fan is assumed to be on.
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.core.state().is_on()
    }

    /// Returns the current speed as a percentage.
    ///
    /// `0` while off. `None` while the fan was switched on by remote and
    /// restoring the previous attributes is disabled.
    #[must_use]
    pub fn percentage(&self) -> Option<u8> {
        if self.core.attributes_hidden() {
            return None;
        }
        let state = self.core.state();
        if !state.is_on() {
            return Some(0);
        }
        let speeds = self.speeds.as_ref()?;
        speeds.item_to_percentage(&state.speed()?.to_string())
    }

    /// Returns the speed label, kept while the fan is off.
    #[must_use]
    pub fn speed(&self) -> Option<String> {
        self.core.state().speed().map(str::to_string)
    }

    /// Returns whether the fan oscillates.
    #[must_use]
    pub fn oscillating(&self) -> Option<bool> {
        if self.core.attributes_hidden() {
            return None;
        }
        self.core.state().oscillating()
    }

    /// Returns the airflow direction.
    #[must_use]
    pub fn direction(&self) -> Option<FanDirection> {
        if self.core.attributes_hidden() {
            return None;
        }
        self.core.state().direction()
    }

    // ========== Commands ==========

    /// Sets the speed from a percentage; `0` switches the fan off.
    ///
    /// The speed is kept when switching off so the next [`turn_on`](Self::turn_on)
    /// resumes it.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::OutOfRange`] above 100,
    /// [`DeviceError::UnsupportedCapability`](crate::DeviceError::UnsupportedCapability)
    /// without speed levels, or a resolution or transmission error.
    pub async fn set_percentage(&self, percentage: u8) -> Result<bool, Error> {
        if percentage > 100 {
            return Err(ValueError::OutOfRange {
                min: 0,
                max: 100,
                actual: u32::from(percentage),
            }
            .into());
        }
        if percentage == 0 {
            return self.turn_off().await;
        }

        let speeds = self.require_speeds()?;
        let speed = speeds.percentage_to_item(percentage).clone();
        self.core
            .execute_with(|state| {
                self.plan(
                    PowerState::On,
                    Some(speed),
                    state.direction(),
                    state.oscillating(),
                )
            })
            .await
    }

    /// Turns the fan on, at `percentage` or at the current speed.
    ///
    /// # Errors
    ///
    /// See [`set_percentage`](Self::set_percentage).
    pub async fn turn_on(&self, percentage: Option<u8>) -> Result<bool, Error> {
        if let Some(percentage) = percentage {
            return self.set_percentage(percentage).await;
        }

        let speeds = self.require_speeds()?;
        self.core
            .execute_with(|state| {
                let speed = state
                    .speed()
                    .map_or_else(|| speeds.first().clone(), str::to_string);
                self.plan(
                    PowerState::On,
                    Some(speed),
                    state.direction(),
                    state.oscillating(),
                )
            })
            .await
    }

    /// Turns the fan off, keeping the speed.
    ///
    /// # Errors
    ///
    /// Returns a resolution or transmission error.
    pub async fn turn_off(&self) -> Result<bool, Error> {
        self.core
            .execute_with(|state| {
                self.plan(
                    PowerState::Off,
                    state.speed().map(str::to_string),
                    state.direction(),
                    state.oscillating(),
                )
            })
            .await
    }

    /// Starts or stops oscillation, keeping the power state.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::UnsupportedCapability`](crate::DeviceError::UnsupportedCapability)
    /// without an `oscillate` code, or a resolution or transmission error.
    pub async fn oscillate(&self, oscillating: bool) -> Result<bool, Error> {
        self.core
            .check_capability("oscillate", self.capabilities.oscillate)?;
        self.core
            .execute_with(|state| {
                self.plan(
                    state.power(),
                    state.speed().map(str::to_string),
                    state.direction(),
                    Some(oscillating),
                )
            })
            .await
    }

    /// Sets the airflow direction, keeping the power state.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::UnsupportedCapability`](crate::DeviceError::UnsupportedCapability)
    /// for single-direction fans, [`ValueError::InvalidDirection`] for
    /// [`FanDirection::Default`], or a resolution or transmission error.
    pub async fn set_direction(&self, direction: FanDirection) -> Result<bool, Error> {
        self.core
            .check_capability("direction", self.capabilities.direction)?;
        if direction == FanDirection::Default {
            return Err(ValueError::InvalidDirection(direction.to_string()).into());
        }
        self.core
            .execute_with(|state| {
                self.plan(
                    state.power(),
                    state.speed().map(str::to_string),
                    Some(direction),
                    state.oscillating(),
                )
            })
            .await
    }

    // ========== Restore ==========

    /// Restores a persisted snapshot.
    ///
    /// Speed is restored only if it is one of the profile's labels,
    /// direction and oscillation only if the fan supports them.
    pub fn restore_state(&self, snapshot: &DeviceState) -> bool {
        let mut changes = vec![self.core.restored_power(snapshot)];

        if let Some(speed) = snapshot.speed()
            && self.speed_list().iter().any(|s| s == speed)
        {
            changes.push(StateChange::Speed(speed.to_string()));
        }
        if self.capabilities.direction
            && let Some(direction) = snapshot.direction()
            && direction != FanDirection::Default
        {
            changes.push(StateChange::Direction(direction));
        }
        if self.capabilities.oscillate
            && let Some(oscillating) = snapshot.oscillating()
        {
            changes.push(StateChange::Oscillating(oscillating));
        }

        self.core.commit_restored(changes)
    }

    // ========== Helpers ==========

    fn require_speeds(&self) -> Result<&OrderedScale<String>, Error> {
        self.speeds.as_ref().ok_or_else(|| {
            DeviceError::UnsupportedCapability {
                capability: "speed".to_string(),
            }
            .into()
        })
    }

    fn plan(
        &self,
        power: PowerState,
        speed: Option<String>,
        direction: Option<FanDirection>,
        oscillating: Option<bool>,
    ) -> Result<CommandPlan, Error> {
        let direction = direction.unwrap_or(FanDirection::Default);

        let code = if power == PowerState::Off {
            self.core.resolve(&["off"])?
        } else if oscillating == Some(true) {
            self.core.resolve(&["oscillate"])?
        } else {
            let speed = speed.as_deref().unwrap_or_default();
            self.core.resolve(&[direction.as_key(), speed])?
        };

        let mut plan = CommandPlan::new();
        plan.push(code);
        plan.change(StateChange::commanded_power(power));
        if let Some(speed) = speed {
            plan.change(StateChange::Speed(speed));
        }
        plan.change(StateChange::Direction(direction));
        if let Some(oscillating) = oscillating {
            plan.change(StateChange::Oscillating(oscillating));
        }
        Ok(plan)
    }
}

forward_subscribable!(Fan);
