// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device configuration types.

use std::collections::HashMap;
use std::time::Duration;

use crate::error::ConfigError;

/// Configuration for an IR/RF device.
///
/// Deserializes from the host's configuration with every field optional;
/// missing fields take the defaults below.
///
/// # Examples
///
/// ```
/// use irdrive_lib::DeviceConfig;
/// use std::time::Duration;
///
/// let config = DeviceConfig::new("Bedroom Fan")
///     .with_device_code(1020)
///     .with_delay(0.8)
///     .with_power_sensor("binary_sensor.fan_power")
///     .with_power_sensor_delay(5);
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.inter_command_delay(), Duration::from_millis(800));
/// assert_eq!(config.power_sensor_check_delay(), Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Display name, used in log events.
    pub name: String,
    /// Optional stable identifier assigned by the host.
    pub unique_id: Option<String>,
    /// Numeric code of the device profile.
    pub device_code: Option<u32>,
    /// Pause after each transmitted code, in seconds.
    pub delay: f64,
    /// Identifier of the power sensor, if any.
    pub power_sensor: Option<String>,
    /// Time before a power change is verified against the sensor, in seconds.
    pub power_sensor_delay: u64,
    /// Keep reporting attributes while the device is on by remote.
    pub power_sensor_restore_state: bool,
}

impl DeviceConfig {
    /// Default name.
    pub const DEFAULT_NAME: &'static str = "IR Device";
    /// Default inter-command delay in seconds.
    pub const DEFAULT_DELAY: f64 = 0.5;
    /// Default power sensor verification delay in seconds.
    pub const DEFAULT_POWER_SENSOR_DELAY: u64 = 10;

    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the unique identifier.
    #[must_use]
    pub fn with_unique_id(mut self, unique_id: impl Into<String>) -> Self {
        self.unique_id = Some(unique_id.into());
        self
    }

    /// Sets the profile code.
    #[must_use]
    pub fn with_device_code(mut self, code: u32) -> Self {
        self.device_code = Some(code);
        self
    }

    /// Sets the inter-command delay in seconds.
    #[must_use]
    pub fn with_delay(mut self, seconds: f64) -> Self {
        self.delay = seconds;
        self
    }

    /// Sets the power sensor identifier.
    #[must_use]
    pub fn with_power_sensor(mut self, sensor: impl Into<String>) -> Self {
        self.power_sensor = Some(sensor.into());
        self
    }

    /// Sets the power sensor verification delay in seconds.
    #[must_use]
    pub fn with_power_sensor_delay(mut self, seconds: u64) -> Self {
        self.power_sensor_delay = seconds;
        self
    }

    /// Sets whether attributes are reported while on by remote.
    #[must_use]
    pub fn with_power_sensor_restore_state(mut self, restore: bool) -> Self {
        self.power_sensor_restore_state = restore;
        self
    }

    /// Returns `true` if a power sensor is configured.
    #[must_use]
    pub fn has_power_sensor(&self) -> bool {
        self.power_sensor.is_some()
    }

    /// Returns the inter-command delay.
    ///
    /// Invalid values (rejected by [`validate`](Self::validate)) map to zero.
    #[must_use]
    pub fn inter_command_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.delay).unwrap_or(Duration::ZERO)
    }

    /// Returns the power sensor verification delay.
    #[must_use]
    pub fn power_sensor_check_delay(&self) -> Duration {
        Duration::from_secs(self.power_sensor_delay)
    }

    /// Checks that both delays are positive.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDelay`] naming the offending setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.delay.is_finite() || self.delay <= 0.0 {
            return Err(ConfigError::InvalidDelay { name: "delay" });
        }
        if self.power_sensor_delay == 0 {
            return Err(ConfigError::InvalidDelay {
                name: "power_sensor_delay",
            });
        }
        Ok(())
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: Self::DEFAULT_NAME.to_string(),
            unique_id: None,
            device_code: None,
            delay: Self::DEFAULT_DELAY,
            power_sensor: None,
            power_sensor_delay: Self::DEFAULT_POWER_SENSOR_DELAY,
            power_sensor_restore_state: true,
        }
    }
}

/// Extra configuration for media players.
///
/// # Examples
///
/// ```
/// use irdrive_lib::MediaPlayerConfig;
///
/// let config = MediaPlayerConfig::new()
///     .with_device_class("receiver")
///     .rename_source("HDMI1", "Console")
///     .hide_source("AV");
///
/// assert_eq!(config.device_class, "receiver");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MediaPlayerConfig {
    /// Device class reported to the host (`tv`, `speaker`, `receiver`).
    pub device_class: String,
    /// Source renames; a `None` value hides the source.
    pub source_names: HashMap<String, Option<String>>,
}

impl MediaPlayerConfig {
    /// Default device class.
    pub const DEFAULT_DEVICE_CLASS: &'static str = "tv";

    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the device class.
    #[must_use]
    pub fn with_device_class(mut self, class: impl Into<String>) -> Self {
        self.device_class = class.into();
        self
    }

    /// Shows the profile source `source` as `name`.
    #[must_use]
    pub fn rename_source(mut self, source: impl Into<String>, name: impl Into<String>) -> Self {
        self.source_names.insert(source.into(), Some(name.into()));
        self
    }

    /// Hides the profile source `source`.
    #[must_use]
    pub fn hide_source(mut self, source: impl Into<String>) -> Self {
        self.source_names.insert(source.into(), None);
        self
    }
}

impl Default for MediaPlayerConfig {
    fn default() -> Self {
        Self {
            device_class: Self::DEFAULT_DEVICE_CLASS.to_string(),
            source_names: HashMap::new(),
        }
    }
}
