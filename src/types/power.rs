// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power-related types.
//!
//! [`PowerState`] is the state this library assumes a device is in.
//! [`SensorReading`] is what an external power sensor reports, which may be
//! unknown.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// Assumed power state of a device.
///
/// # Examples
///
/// ```
/// use irdrive_lib::types::PowerState;
///
/// assert_eq!(PowerState::On.as_str(), "on");
/// assert_eq!("OFF".parse::<PowerState>().unwrap(), PowerState::Off);
/// assert_eq!(PowerState::from(true), PowerState::On);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PowerState {
    /// Power is off.
    #[default]
    Off,
    /// Power is on.
    On,
}

impl PowerState {
    /// Returns the lowercase string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::On => "on",
        }
    }

    /// Returns `true` for [`PowerState::On`].
    #[must_use]
    pub const fn is_on(&self) -> bool {
        matches!(self, Self::On)
    }

    /// Returns the opposite state.
    #[must_use]
    pub const fn toggled(&self) -> Self {
        match self {
            Self::Off => Self::On,
            Self::On => Self::Off,
        }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PowerState {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "off" | "0" | "false" => Ok(Self::Off),
            "on" | "1" | "true" => Ok(Self::On),
            _ => Err(ValueError::InvalidPowerState(s.to_string())),
        }
    }
}

impl From<bool> for PowerState {
    fn from(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}

/// A reading reported by an external power sensor.
///
/// Anything that is not clearly on or off (unknown, unavailable, garbage)
/// is [`SensorReading::Unknown`] and never overrides the assumed state.
///
/// # Examples
///
/// ```
/// use irdrive_lib::types::{PowerState, SensorReading};
///
/// assert_eq!(SensorReading::parse("on"), SensorReading::On);
/// assert_eq!(SensorReading::parse("unavailable"), SensorReading::Unknown);
/// assert_eq!(SensorReading::Off.power_state(), Some(PowerState::Off));
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SensorReading {
    /// The sensor reports the device is off.
    Off,
    /// The sensor reports the device is on.
    On,
    /// The sensor state is unknown or unavailable.
    #[default]
    Unknown,
}

impl SensorReading {
    /// Parses a host-provided sensor state string.
    ///
    /// Never fails: unrecognised strings are [`SensorReading::Unknown`].
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.parse::<PowerState>() {
            Ok(PowerState::On) => Self::On,
            Ok(PowerState::Off) => Self::Off,
            Err(_) => Self::Unknown,
        }
    }

    /// Returns the power state this reading confirms, if any.
    #[must_use]
    pub const fn power_state(&self) -> Option<PowerState> {
        match self {
            Self::On => Some(PowerState::On),
            Self::Off => Some(PowerState::Off),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for SensorReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::On => f.write_str("on"),
            Self::Off => f.write_str("off"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

impl From<PowerState> for SensorReading {
    fn from(state: PowerState) -> Self {
        match state {
            PowerState::On => Self::On,
            PowerState::Off => Self::Off,
        }
    }
}

/// A power sensor state transition delivered by the host.
///
/// Either side may be missing: `previous` is `None` for the first event
/// after start-up and `current` is `None` when the sensor was removed.
///
/// # Examples
///
/// ```
/// use irdrive_lib::types::{SensorEvent, SensorReading};
///
/// let event = SensorEvent::from_strings(Some("off"), Some("on"));
/// assert_eq!(event.current, Some(SensorReading::On));
/// assert!(event.is_transition());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct SensorEvent {
    /// Reading before the change.
    pub previous: Option<SensorReading>,
    /// Reading after the change.
    pub current: Option<SensorReading>,
}

impl SensorEvent {
    /// Creates an event from two readings.
    #[must_use]
    pub const fn new(previous: Option<SensorReading>, current: Option<SensorReading>) -> Self {
        Self { previous, current }
    }

    /// Creates an event from raw host state strings.
    #[must_use]
    pub fn from_strings(previous: Option<&str>, current: Option<&str>) -> Self {
        Self {
            previous: previous.map(SensorReading::parse),
            current: current.map(SensorReading::parse),
        }
    }

    /// Returns `true` if the event carries a new reading that differs from
    /// the previous one.
    #[must_use]
    pub fn is_transition(&self) -> bool {
        match (self.previous, self.current) {
            (_, None) => false,
            (Some(previous), Some(current)) => previous != current,
            (None, Some(_)) => true,
        }
    }
}
