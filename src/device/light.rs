// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IR light adapter.
//!
//! Lights reach a target level either through an absolute code stored under
//! the `brightness`/`colorTemperature` group keyed by the level, or through
//! repeated relative presses (`brighten`/`dim`, `colder`/`warmer`) planned on
//! the profile's level scale.

use crate::capabilities::{ColorMode, LightCapabilities};
use crate::command::Code;
use crate::config::DeviceConfig;
use crate::error::Error;
use crate::profile::DeviceProfile;
use crate::protocol::Controller;
use crate::scale::{OrderedScale, StepDirection};
use crate::state::{DeviceState, StateChange};
use crate::types::PowerState;

use super::{CommandPlan, DeviceCategory, DeviceCore, forward_subscribable};

/// Brightness reported before the first command.
const INITIAL_BRIGHTNESS: u32 = 100;

/// Brightness that selects the nightlight code, when the profile has one.
const NIGHTLIGHT_BRIGHTNESS: u32 = 1;

/// Command keys of one adjustable light attribute.
struct Adjustment {
    absolute: &'static str,
    increase: &'static str,
    decrease: &'static str,
}

const COLOR_TEMPERATURE: Adjustment = Adjustment {
    absolute: "colorTemperature",
    increase: "colder",
    decrease: "warmer",
};

const BRIGHTNESS: Adjustment = Adjustment {
    absolute: "brightness",
    increase: "brighten",
    decrease: "dim",
};

/// An IR/RF controlled light.
///
/// # Examples
///
/// ```no_run
/// use irdrive_lib::{DeviceConfig, DeviceProfile};
/// use irdrive_lib::device::Light;
/// use irdrive_lib::protocol::HttpController;
///
/// # async fn example() -> irdrive_lib::Result<()> {
/// let profile = DeviceProfile::from_json(r#"{
///     "brightness": [25, 50, 75, 100],
///     "commands": { "on": "ON", "off": "OFF", "brighten": "UP", "dim": "DOWN" }
/// }"#)?;
///
/// let light = Light::new(
///     DeviceConfig::new("Desk Lamp"),
///     profile,
///     HttpController::new("192.168.1.121")?,
/// )?;
///
/// // Sends ON, then DOWN four times to resync at the lowest level
/// light.turn_on(Some(25), None).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Light<C: Controller> {
    core: DeviceCore<C>,
    capabilities: LightCapabilities,
    brightness_levels: Option<OrderedScale<u32>>,
    color_temperatures: Option<OrderedScale<u32>>,
}

impl<C: Controller> Light<C> {
    /// Creates a light from its profile.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`](crate::ConfigError) if the configuration is
    /// invalid. A level scale that is not strictly increasing only disables
    /// the matching control.
    pub fn new(config: DeviceConfig, profile: DeviceProfile, controller: C) -> Result<Self, Error> {
        let (info, commands, scales) = profile.into_parts();

        let brightness_levels = numeric_scale(&config.name, "brightness", scales.brightness);
        let color_temperatures =
            numeric_scale(&config.name, "colorTemperature", scales.color_temperature);
        let capabilities = LightCapabilities::detect(
            &commands,
            color_temperatures
                .as_ref()
                .map(OrderedScale::as_slice)
                .unwrap_or_default(),
        );

        let core = DeviceCore::new(DeviceCategory::Light, config, info, commands, controller)?;

        let mut initial = Vec::new();
        if capabilities.brightness {
            initial.push(StateChange::Brightness(INITIAL_BRIGHTNESS));
        }
        if capabilities.color_temp
            && let Some(temperatures) = &color_temperatures
        {
            initial.push(StateChange::ColorTemp(*temperatures.last()));
        }
        core.seed(&StateChange::batch(initial));

        Ok(Self {
            core,
            capabilities,
            brightness_levels,
            color_temperatures,
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
    pub fn capabilities(&self) -> LightCapabilities {
        self.capabilities
    }

    /// Returns the single supported color mode.
    #[must_use]
    pub fn color_mode(&self) -> Option<ColorMode> {
        self.capabilities.color_mode
    }

    /// Returns a snapshot of the assumed state.
    #[must_use]
    pub fn state(&self) -> DeviceState {
        self.core.state()
    }

    /// Returns `true` if the light is assumed to be on.
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.core.state().is_on()
    }

    /// Returns the brightness level.
    #[must_use]
    pub fn brightness(&self) -> Option<u32> {
        self.core.state().brightness()
    }

    /// Returns the color temperature in Kelvin.
    #[must_use]
    pub fn color_temp_kelvin(&self) -> Option<u32> {
        self.core.state().color_temp()
    }

    /// Returns the warmest supported color temperature.
    #[must_use]
    pub fn min_color_temp_kelvin(&self) -> Option<u32> {
        self.color_temperatures.as_ref().map(|scale| *scale.first())
    }

    /// Returns the coldest supported color temperature.
    #[must_use]
    pub fn max_color_temp_kelvin(&self) -> Option<u32> {
        self.color_temperatures.as_ref().map(|scale| *scale.last())
    }

    // ========== Commands ==========

    /// Turns the light on and moves it to the requested levels in one
    /// sequence.
    ///
    /// When the light is off, the `on` code is sent first. Lights without an
    /// `on` code are switched on by sending their last levels instead. If
    /// nothing was sent for power or levels and the light was not switched
    /// on by remote, `on` is sent anyway to bring a drifted light back.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolveError`](crate::ResolveError) if a needed code is
    /// missing, or a transmission error.
    pub async fn turn_on(
        &self,
        brightness: Option<u32>,
        color_temp_kelvin: Option<u32>,
    ) -> Result<bool, Error> {
        self.core
            .execute_with(|state| self.plan_turn_on(state, brightness, color_temp_kelvin))
            .await
    }

    /// Turns the light off; nothing is sent if it is already off.
    ///
    /// # Errors
    ///
    /// Returns a resolution or transmission error.
    pub async fn turn_off(&self) -> Result<bool, Error> {
        self.core
            .execute_with(|state| {
                let mut plan = CommandPlan::new();
                if state.power() != PowerState::Off {
                    plan.push(self.core.resolve(&["off"])?);
                    plan.change(StateChange::commanded_power(PowerState::Off));
                }
                Ok(plan)
            })
            .await
    }

    /// Turns the light off if it is on, on otherwise.
    ///
    /// # Errors
    ///
    /// See [`turn_on`](Self::turn_on) and [`turn_off`](Self::turn_off).
    pub async fn toggle(&self) -> Result<bool, Error> {
        if self.is_on() {
            self.turn_off().await
        } else {
            self.turn_on(None, None).await
        }
    }

    // ========== Restore ==========

    /// Restores a persisted snapshot, including levels the light supports.
    pub fn restore_state(&self, snapshot: &DeviceState) -> bool {
        let mut changes = vec![self.core.restored_power(snapshot)];
        if self.capabilities.brightness
            && let Some(brightness) = snapshot.brightness()
        {
            changes.push(StateChange::Brightness(brightness));
        }
        if self.capabilities.color_temp
            && let Some(kelvin) = snapshot.color_temp()
        {
            changes.push(StateChange::ColorTemp(kelvin));
        }
        self.core.commit_restored(changes)
    }

    // ========== Planning ==========

    fn plan_turn_on(
        &self,
        state: &DeviceState,
        mut brightness: Option<u32>,
        mut color_temp: Option<u32>,
    ) -> Result<CommandPlan, Error> {
        let mut plan = CommandPlan::new();
        let mut planned = false;

        if !state.is_on() && !state.on_by_remote() {
            plan.change(StateChange::commanded_power(PowerState::On));
            if self.core.commands().contains("on") {
                plan.push(self.core.resolve(&["on"])?);
                planned = true;
            } else {
                color_temp = color_temp.or(state.color_temp());
                brightness = brightness.or(state.brightness());
                tracing::debug!(
                    device = %self.core.name(),
                    ?brightness,
                    ?color_temp,
                    "No power on code, sending last levels"
                );
            }
        }

        if self.capabilities.color_temp
            && let (Some(target), Some(scale)) = (color_temp, &self.color_temperatures)
        {
            planned = true;
            if let Some(kelvin) =
                self.plan_level(&mut plan, &COLOR_TEMPERATURE, scale, state.color_temp(), target)?
            {
                plan.change(StateChange::ColorTemp(kelvin));
            }
        }

        if self.capabilities.brightness
            && let Some(target) = brightness
        {
            if target == NIGHTLIGHT_BRIGHTNESS && self.capabilities.nightlight {
                planned = true;
                plan.push(self.core.resolve(&["night"])?);
                plan.change(StateChange::Brightness(NIGHTLIGHT_BRIGHTNESS));
                plan.change(StateChange::commanded_power(PowerState::On));
            } else if let Some(scale) = &self.brightness_levels {
                planned = true;
                if let Some(level) =
                    self.plan_level(&mut plan, &BRIGHTNESS, scale, state.brightness(), target)?
                {
                    plan.change(StateChange::Brightness(level));
                }
            }
        }

        if !planned && !state.on_by_remote() {
            plan.push(self.core.resolve(&["on"])?);
            plan.change(StateChange::commanded_power(PowerState::On));
        }

        if !plan.is_empty() && plan.power_target().is_none() {
            plan.change(StateChange::commanded_power(state.power()));
        }

        Ok(plan)
    }

    /// Plans the codes moving one attribute to the level closest to
    /// `target` and returns that level, or `None` if nothing is sent.
    fn plan_level(
        &self,
        plan: &mut CommandPlan,
        adjustment: &Adjustment,
        scale: &OrderedScale<u32>,
        current: Option<u32>,
        target: u32,
    ) -> Result<Option<u32>, Error> {
        let steps = scale.step_plan(current, target);
        let level = scale.as_slice()[steps.target_index()];

        if let Some(code) = self.absolute_code(adjustment.absolute, level) {
            tracing::debug!(
                device = %self.core.name(),
                attribute = adjustment.absolute,
                ?current,
                target,
                level,
                "Using absolute code"
            );
            plan.push(code.clone());
            return Ok(Some(level));
        }

        if steps.is_empty() {
            return Ok(None);
        }

        let key = match steps.direction() {
            StepDirection::Increase => adjustment.increase,
            StepDirection::Decrease => adjustment.decrease,
        };
        tracing::debug!(
            device = %self.core.name(),
            attribute = adjustment.absolute,
            ?current,
            target,
            level,
            presses = steps.steps(),
            key,
            "Stepping to level"
        );
        plan.push_repeated(&self.core.resolve(&[key])?, steps.steps());
        Ok(Some(level))
    }

    fn absolute_code(&self, group: &str, level: u32) -> Option<&Code> {
        self.core
            .commands()
            .get(group)
            .and_then(|codes| codes.leaf(&level.to_string()))
    }
}

forward_subscribable!(Light);

fn numeric_scale(device: &str, name: &str, values: Vec<u32>) -> Option<OrderedScale<u32>> {
    if values.is_empty() {
        return None;
    }
    match OrderedScale::numeric(name, values) {
        Ok(scale) => Some(scale),
        Err(err) => {
            tracing::error!(device, scale = name, error = %err, "Level control disabled");
            None
        }
    }
}
