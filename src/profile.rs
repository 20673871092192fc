// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device profiles.
//!
//! A profile is the JSON document describing one appliance model: who makes
//! it, which controller family and code encoding it targets, its command
//! vocabulary and the value scales its commands cover. Reading the document
//! from storage is left to the caller.

use serde_json::Value;

use crate::command::CommandTree;
use crate::error::{Error, ParseError};

/// Descriptive profile metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInfo {
    /// Appliance manufacturer.
    #[serde(default)]
    pub manufacturer: String,
    /// Model names the profile was written for.
    #[serde(default)]
    pub supported_models: Vec<String>,
    /// Controller family the codes target (e.g. `Broadlink`, `MQTT`).
    #[serde(default)]
    pub supported_controller: String,
    /// Code encoding (e.g. `Base64`, `Pronto`, `Raw`).
    #[serde(default)]
    pub commands_encoding: String,
}

/// Raw document shape, before the command tree is validated.
#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProfile {
    #[serde(flatten)]
    info: ProfileInfo,
    #[serde(default)]
    commands: Value,
    #[serde(default)]
    speed: Vec<String>,
    #[serde(default)]
    brightness: Vec<u32>,
    #[serde(default)]
    color_temperature: Vec<u32>,
}

/// A parsed and validated device profile.
///
/// # Examples
///
/// ```
/// use irdrive_lib::DeviceProfile;
///
/// let profile = DeviceProfile::from_json(r#"{
///     "manufacturer": "Acme",
///     "supportedModels": ["F-100"],
///     "supportedController": "Broadlink",
///     "commandsEncoding": "Base64",
///     "speed": ["low", "high"],
///     "commands": {
///         "off": "JgAaAB0fHx8",
///         "default": { "low": "JgAaAB0eHx4", "high": "JgAaAB0dHx0" }
///     }
/// }"#)?;
///
/// assert_eq!(profile.info().manufacturer, "Acme");
/// assert_eq!(profile.speed(), ["low", "high"]);
/// assert!(profile.commands().contains("off"));
/// # Ok::<(), irdrive_lib::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceProfile {
    info: ProfileInfo,
    commands: CommandTree,
    speed: Vec<String>,
    brightness: Vec<u32>,
    color_temperature: Vec<u32>,
}

impl DeviceProfile {
    /// Parses a profile document.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Json`] if the document is not valid profile
    /// JSON, or a [`ConfigError`](crate::ConfigError) listing every malformed
    /// command path.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let raw: RawProfile = serde_json::from_str(json).map_err(ParseError::Json)?;
        Self::from_raw(raw)
    }

    /// Builds a profile from an already parsed document.
    ///
    /// # Errors
    ///
    /// Same as [`from_json`](Self::from_json).
    pub fn from_value(value: Value) -> Result<Self, Error> {
        let raw: RawProfile = serde_json::from_value(value).map_err(ParseError::Json)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawProfile) -> Result<Self, Error> {
        let commands = CommandTree::from_value(&raw.commands)?;
        tracing::debug!(
            manufacturer = %raw.info.manufacturer,
            models = ?raw.info.supported_models,
            "Loaded device profile"
        );
        Ok(Self {
            info: raw.info,
            commands,
            speed: raw.speed,
            brightness: raw.brightness,
            color_temperature: raw.color_temperature,
        })
    }

    /// Returns the descriptive metadata.
    #[must_use]
    pub fn info(&self) -> &ProfileInfo {
        &self.info
    }

    /// Returns the command vocabulary.
    #[must_use]
    pub fn commands(&self) -> &CommandTree {
        &self.commands
    }

    /// Returns the fan speed labels, slowest first.
    #[must_use]
    pub fn speed(&self) -> &[String] {
        &self.speed
    }

    /// Returns the brightness levels.
    #[must_use]
    pub fn brightness(&self) -> &[u32] {
        &self.brightness
    }

    /// Returns the color temperature levels in Kelvin.
    #[must_use]
    pub fn color_temperature(&self) -> &[u32] {
        &self.color_temperature
    }

    pub(crate) fn into_parts(self) -> (ProfileInfo, CommandTree, ProfileScales) {
        (
            self.info,
            self.commands,
            ProfileScales {
                speed: self.speed,
                brightness: self.brightness,
                color_temperature: self.color_temperature,
            },
        )
    }
}

/// Raw scale lists handed to the category adapters.
#[derive(Debug, Clone, Default)]
pub(crate) struct ProfileScales {
    pub(crate) speed: Vec<String>,
    pub(crate) brightness: Vec<u32>,
    pub(crate) color_temperature: Vec<u32>,
}
