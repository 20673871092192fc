// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device capability detection.
//!
//! An IR device can do exactly what its profile has codes for. Each category
//! adapter detects its feature set once from the command vocabulary and the
//! profile's value scales; operations on a missing feature fail with
//! [`DeviceError::UnsupportedCapability`](crate::DeviceError::UnsupportedCapability).

use crate::command::CommandTree;

// ========== Fan ==========

/// Features of an IR fan.
///
/// # Examples
///
/// ```
/// use irdrive_lib::command::CommandTree;
/// use irdrive_lib::capabilities::FanCapabilities;
///
/// let commands = CommandTree::from_value(&serde_json::json!({
///     "off": "A",
///     "oscillate": "B",
///     "forward": { "low": "C" },
///     "reverse": { "low": "D" },
/// }))
/// .unwrap();
///
/// let caps = FanCapabilities::detect(&commands, &["low".to_string()]);
/// assert!(caps.set_speed && caps.direction && caps.oscillate);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanCapabilities {
    /// Speed levels are defined.
    pub set_speed: bool,
    /// Separate `forward` and `reverse` code groups exist.
    pub direction: bool,
    /// An `oscillate` code exists.
    pub oscillate: bool,
}

impl FanCapabilities {
    /// Detects fan features from a profile.
    #[must_use]
    pub fn detect(commands: &CommandTree, speeds: &[String]) -> Self {
        Self {
            set_speed: !speeds.is_empty(),
            direction: commands.contains("forward") && commands.contains("reverse"),
            oscillate: commands.contains("oscillate"),
        }
    }
}

// ========== Light ==========

/// How a light's output can be adjusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorMode {
    /// Color temperature (and brightness, if available).
    ColorTemp,
    /// Brightness only.
    Brightness,
    /// Power only.
    OnOff,
}

/// Features of an IR light.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LightCapabilities {
    /// Color temperature can be set.
    pub color_temp: bool,
    /// Brightness can be set.
    pub brightness: bool,
    /// A dedicated nightlight code exists.
    pub nightlight: bool,
    /// Single supported color mode, if the profile supports any.
    pub color_mode: Option<ColorMode>,
}

impl LightCapabilities {
    /// Detects light features from a profile.
    ///
    /// Color temperature needs a `colorTemperature` code group or both
    /// `colder` and `warmer`, plus a non-empty temperature scale. Brightness
    /// needs `night`, a `brightness` group, or both `brighten` and `dim`.
    #[must_use]
    pub fn detect(commands: &CommandTree, color_temperatures: &[u32]) -> Self {
        let color_temp = !color_temperatures.is_empty()
            && (commands.contains("colorTemperature")
                || (commands.contains("colder") && commands.contains("warmer")));
        let nightlight = commands.contains("night");
        let brightness = nightlight
            || commands.contains("brightness")
            || (commands.contains("brighten") && commands.contains("dim"));

        let color_mode = if color_temp {
            Some(ColorMode::ColorTemp)
        } else if brightness {
            Some(ColorMode::Brightness)
        } else if commands.contains("on") && commands.contains("off") {
            Some(ColorMode::OnOff)
        } else {
            None
        };

        Self {
            color_temp,
            brightness,
            nightlight,
            color_mode,
        }
    }
}

// ========== Media player ==========

/// Features of an IR media player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
// Each boolean represents an independent device feature flag that cannot be
// meaningfully combined into an enum or state machine.
#[allow(clippy::struct_excessive_bools)]
pub struct MediaPlayerCapabilities {
    /// An `on` code exists.
    pub turn_on: bool,
    /// An `off` code exists.
    pub turn_off: bool,
    /// A `previousChannel` code exists.
    pub previous_channel: bool,
    /// A `nextChannel` code exists.
    pub next_channel: bool,
    /// A `volumeUp` or `volumeDown` code exists.
    pub volume_step: bool,
    /// A `mute` code exists.
    pub mute: bool,
    /// A `sources` group exists; also enables channel selection.
    pub select_source: bool,
}

impl MediaPlayerCapabilities {
    /// Detects media player features from a command vocabulary.
    #[must_use]
    pub fn detect(commands: &CommandTree) -> Self {
        Self {
            turn_on: commands.contains("on"),
            turn_off: commands.contains("off"),
            previous_channel: commands.contains("previousChannel"),
            next_channel: commands.contains("nextChannel"),
            volume_step: commands.contains("volumeUp") || commands.contains("volumeDown"),
            mute: commands.contains("mute"),
            select_source: commands.contains_branch("sources"),
        }
    }

    /// Returns whether channels can be tuned by number.
    #[must_use]
    pub const fn play_media(&self) -> bool {
        self.select_source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(value: serde_json::Value) -> CommandTree {
        CommandTree::from_value(&value).unwrap()
    }

    #[test]
    fn fan_without_direction_groups() {
        let commands = tree(json!({ "off": "A", "default": { "low": "B" } }));
        let caps = FanCapabilities::detect(&commands, &["low".to_string()]);
        assert!(caps.set_speed);
        assert!(!caps.direction);
        assert!(!caps.oscillate);
    }

    #[test]
    fn fan_needs_both_directions() {
        let commands = tree(json!({ "off": "A", "forward": { "low": "B" } }));
        assert!(!FanCapabilities::detect(&commands, &[]).direction);
        assert!(!FanCapabilities::detect(&commands, &[]).set_speed);
    }

    #[test]
    fn light_color_temp_mode() {
        let commands = tree(json!({ "on": "A", "off": "B", "colder": "C", "warmer": "D" }));
        let caps = LightCapabilities::detect(&commands, &[2700, 6500]);
        assert!(caps.color_temp);
        assert!(!caps.brightness);
        assert_eq!(caps.color_mode, Some(ColorMode::ColorTemp));
    }

    #[test]
    fn light_color_temp_needs_scale() {
        let commands = tree(json!({ "on": "A", "off": "B", "colder": "C", "warmer": "D" }));
        let caps = LightCapabilities::detect(&commands, &[]);
        assert!(!caps.color_temp);
        assert_eq!(caps.color_mode, Some(ColorMode::OnOff));
    }

    #[test]
    fn light_brightness_mode_from_nightlight() {
        let commands = tree(json!({ "on": "A", "off": "B", "night": "C" }));
        let caps = LightCapabilities::detect(&commands, &[]);
        assert!(caps.brightness);
        assert!(caps.nightlight);
        assert_eq!(caps.color_mode, Some(ColorMode::Brightness));
    }

    #[test]
    fn light_without_modes() {
        let commands = tree(json!({ "on": "A" }));
        assert_eq!(LightCapabilities::detect(&commands, &[]).color_mode, None);
    }

    #[test]
    fn media_player_features() {
        let commands = tree(json!({
            "on": "A",
            "off": "B",
            "volumeDown": "C",
            "sources": { "HDMI1": "D" },
        }));
        let caps = MediaPlayerCapabilities::detect(&commands);
        assert!(caps.turn_on && caps.turn_off);
        assert!(caps.volume_step);
        assert!(!caps.mute);
        assert!(!caps.next_channel);
        assert!(caps.select_source);
        assert!(caps.play_media());
    }

    #[test]
    fn media_player_sources_must_be_a_group() {
        let commands = tree(json!({ "sources": "A" }));
        assert!(!MediaPlayerCapabilities::detect(&commands).select_source);
    }
}
