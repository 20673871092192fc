// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IR media player adapter.

use crate::capabilities::MediaPlayerCapabilities;
use crate::command::{Code, CommandTree};
use crate::config::{DeviceConfig, MediaPlayerConfig};
use crate::error::{Error, ResolveError, ValueError};
use crate::profile::DeviceProfile;
use crate::protocol::Controller;
use crate::state::{DeviceState, StateChange};
use crate::types::{MediaType, PowerState};

use super::{CommandPlan, DeviceCategory, DeviceCore, forward_subscribable};

/// Prefix of the source entries used to tune channels digit by digit.
const CHANNEL_PREFIX: &str = "Channel ";

/// An IR/RF controlled TV, receiver or speaker.
///
/// Sources come from the profile's `sources` group; the configuration can
/// rename or hide them. Channels are tuned by sending the `Channel <digit>`
/// source for each digit.
///
/// # Examples
///
/// ```no_run
/// use irdrive_lib::{DeviceConfig, DeviceProfile, MediaPlayerConfig};
/// use irdrive_lib::device::MediaPlayer;
/// use irdrive_lib::protocol::HttpController;
/// use irdrive_lib::types::MediaType;
///
/// # async fn example(profile_json: &str) -> irdrive_lib::Result<()> {
/// let tv = MediaPlayer::new(
///     DeviceConfig::new("Living Room TV"),
///     MediaPlayerConfig::new().rename_source("HDMI1", "Console"),
///     DeviceProfile::from_json(profile_json)?,
///     HttpController::new("192.168.1.122")?,
/// )?;
///
/// tv.turn_on().await?;
/// tv.select_source("Console").await?;
/// tv.play_media(&MediaType::Channel, "105").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MediaPlayer<C: Controller> {
    core: DeviceCore<C>,
    capabilities: MediaPlayerCapabilities,
    device_class: String,
    sources: Vec<(String, Code)>,
    shared_power_code: bool,
}

impl<C: Controller> MediaPlayer<C> {
    /// Creates a media player from its profile.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`](crate::ConfigError) if the configuration is
    /// invalid.
    pub fn new(
        config: DeviceConfig,
        player: MediaPlayerConfig,
        profile: DeviceProfile,
        controller: C,
    ) -> Result<Self, Error> {
        let (info, commands, _) = profile.into_parts();

        let capabilities = MediaPlayerCapabilities::detect(&commands);
        let sources = source_table(&config.name, &commands, &player);
        let shared_power_code = matches!(
            (commands.leaf("on"), commands.leaf("off")),
            (Some(on), Some(off)) if on == off
        );

        let core =
            DeviceCore::new(DeviceCategory::MediaPlayer, config, info, commands, controller)?;

        Ok(Self {
            core,
            capabilities,
            device_class: player.device_class,
            sources,
            shared_power_code,
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
    pub fn capabilities(&self) -> MediaPlayerCapabilities {
        self.capabilities
    }

    /// Returns the device class reported to the host.
    #[must_use]
    pub fn device_class(&self) -> &str {
        &self.device_class
    }

    /// Returns the selectable source names in profile order.
    pub fn source_list(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(|(name, _)| name.as_str())
    }

    /// Returns a snapshot of the assumed state.
    #[must_use]
    pub fn state(&self) -> DeviceState {
        self.core.state()
    }

    /// Returns `true` if the player is assumed to be on.
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.core.state().is_on()
    }

    /// Returns the current source.
    ///
    /// `None` while the player was switched on by remote and restoring the
    /// previous attributes is disabled.
    #[must_use]
    pub fn source(&self) -> Option<String> {
        if self.core.attributes_hidden() {
            return None;
        }
        self.core.state().source().map(str::to_string)
    }

    /// Returns the kind of media being played; always channels.
    #[must_use]
    pub fn media_content_type(&self) -> MediaType {
        MediaType::Channel
    }

    // ========== Commands ==========

    /// Turns the player on.
    ///
    /// # Errors
    ///
    /// Returns a resolution or transmission error.
    pub async fn turn_on(&self) -> Result<bool, Error> {
        self.send(Some(PowerState::On), Vec::new(), None).await
    }

    /// Turns the player off.
    ///
    /// # Errors
    ///
    /// Returns a resolution or transmission error.
    pub async fn turn_off(&self) -> Result<bool, Error> {
        self.send(Some(PowerState::Off), Vec::new(), None).await
    }

    /// Switches to the previous channel.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::UnsupportedCapability`](crate::DeviceError::UnsupportedCapability)
    /// without a `previousChannel` code, or a transmission error.
    pub async fn previous_channel(&self) -> Result<bool, Error> {
        self.core
            .check_capability("previous channel", self.capabilities.previous_channel)?;
        self.send_command("previousChannel").await
    }

    /// Switches to the next channel.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::UnsupportedCapability`](crate::DeviceError::UnsupportedCapability)
    /// without a `nextChannel` code, or a transmission error.
    pub async fn next_channel(&self) -> Result<bool, Error> {
        self.core
            .check_capability("next channel", self.capabilities.next_channel)?;
        self.send_command("nextChannel").await
    }

    /// Steps the volume up.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::UnsupportedCapability`](crate::DeviceError::UnsupportedCapability)
    /// without volume codes, or a resolution or transmission error.
    pub async fn volume_up(&self) -> Result<bool, Error> {
        self.core
            .check_capability("volume step", self.capabilities.volume_step)?;
        self.send_command("volumeUp").await
    }

    /// Steps the volume down.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::UnsupportedCapability`](crate::DeviceError::UnsupportedCapability)
    /// without volume codes, or a resolution or transmission error.
    pub async fn volume_down(&self) -> Result<bool, Error> {
        self.core
            .check_capability("volume step", self.capabilities.volume_step)?;
        self.send_command("volumeDown").await
    }

    /// Toggles mute. IR remotes have a single mute key, so the requested
    /// state is not tracked.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::UnsupportedCapability`](crate::DeviceError::UnsupportedCapability)
    /// without a `mute` code, or a transmission error.
    pub async fn mute(&self) -> Result<bool, Error> {
        self.core.check_capability("mute", self.capabilities.mute)?;
        self.send_command("mute").await
    }

    /// Selects a source by its displayed name.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::UnknownSource`] for a name not in
    /// [`source_list`](Self::source_list),
    /// [`DeviceError::UnsupportedCapability`](crate::DeviceError::UnsupportedCapability)
    /// without sources, or a transmission error.
    pub async fn select_source(&self, source: &str) -> Result<bool, Error> {
        self.core
            .check_capability("select source", self.capabilities.select_source)?;
        let code = self
            .source_code(source)
            .ok_or_else(|| ValueError::UnknownSource(source.to_string()))?;
        self.send(None, vec![code.clone()], Some(source.to_string()))
            .await
    }

    /// Tunes a channel by sending one source code per digit and turns the
    /// player on.
    ///
    /// # Errors
    ///
    /// - [`ValueError::UnsupportedMediaType`] unless `media_type` is a channel.
    /// - [`ValueError::InvalidChannel`] unless `media_id` is all digits.
    /// - [`ResolveError::NotFound`] if a digit has no `Channel <digit>` source;
    ///   nothing is sent then.
    pub async fn play_media(&self, media_type: &MediaType, media_id: &str) -> Result<bool, Error> {
        self.core
            .check_capability("play media", self.capabilities.play_media())?;
        if *media_type != MediaType::Channel {
            tracing::error!(device = %self.core.name(), media_type = %media_type, "Invalid media type");
            return Err(ValueError::UnsupportedMediaType(media_type.to_string()).into());
        }
        if media_id.is_empty() || !media_id.chars().all(|c| c.is_ascii_digit()) {
            tracing::error!(device = %self.core.name(), media_id, "Media id must be a channel number");
            return Err(ValueError::InvalidChannel(media_id.to_string()).into());
        }

        let codes = media_id
            .chars()
            .map(|digit| {
                let name = format!("{CHANNEL_PREFIX}{digit}");
                self.source_code(&name)
                    .cloned()
                    .ok_or(ResolveError::NotFound { key: name })
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.send(
            Some(PowerState::On),
            codes,
            Some(format!("{CHANNEL_PREFIX}{media_id}")),
        )
        .await
    }

    // ========== Restore ==========

    /// Restores a persisted snapshot, including a known source.
    pub fn restore_state(&self, snapshot: &DeviceState) -> bool {
        let mut changes = vec![self.core.restored_power(snapshot)];
        if let Some(source) = snapshot.source()
            && (self.source_code(source).is_some() || is_channel_label(source))
        {
            changes.push(StateChange::Source(source.to_string()));
        }
        self.core.commit_restored(changes)
    }

    // ========== Helpers ==========

    fn source_code(&self, name: &str) -> Option<&Code> {
        self.sources
            .iter()
            .find(|(source, _)| source == name)
            .map(|(_, code)| code)
    }

    async fn send_command(&self, key: &str) -> Result<bool, Error> {
        let code = self.core.resolve(&[key])?;
        self.send(None, vec![code], None).await
    }

    /// Sends a power transition followed by `codes`.
    ///
    /// `target` defaults to the current power. Towards off only the `off`
    /// code is sent; towards on the `on` code precedes `codes`. A power code
    /// shared by `on` and `off` is not resent when the player is already in
    /// the target state.
    async fn send(
        &self,
        target: Option<PowerState>,
        codes: Vec<Code>,
        source: Option<String>,
    ) -> Result<bool, Error> {
        self.core
            .execute_with(|state| {
                let target = target.unwrap_or(state.power());
                let already = state.power() == target;
                let mut plan = CommandPlan::new();

                match target {
                    PowerState::Off => {
                        if self.shared_power_code && already {
                            tracing::debug!(device = %self.core.name(), "Already off, skipping shared power code");
                        } else {
                            plan.push(self.core.resolve(&["off"])?);
                        }
                    }
                    PowerState::On => {
                        if self.shared_power_code && already {
                            tracing::debug!(device = %self.core.name(), "Already on, skipping shared power code");
                        } else if let Some(on) = self.core.commands().leaf("on") {
                            plan.push(on.clone());
                        }
                        for code in codes {
                            plan.push(code);
                        }
                        if let Some(source) = source {
                            plan.change(StateChange::Source(source));
                        }
                    }
                }

                plan.change(StateChange::commanded_power(target));
                Ok(plan)
            })
            .await
    }
}

forward_subscribable!(MediaPlayer);

/// Builds the displayed source table from the profile's `sources` group.
fn source_table(
    device: &str,
    commands: &CommandTree,
    player: &MediaPlayerConfig,
) -> Vec<(String, Code)> {
    let Some(group) = commands.get("sources") else {
        return Vec::new();
    };

    group
        .keys()
        .filter_map(|key| {
            let Some(code) = group.leaf(key) else {
                tracing::warn!(device, source = key, "Source has no direct code, ignoring");
                return None;
            };
            match player.source_names.get(key) {
                Some(Some(name)) => Some((name.clone(), code.clone())),
                Some(None) => None,
                None => Some((key.to_string(), code.clone())),
            }
        })
        .collect()
}

fn is_channel_label(source: &str) -> bool {
    source
        .strip_prefix(CHANNEL_PREFIX)
        .is_some_and(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
}
