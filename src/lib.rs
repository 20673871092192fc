// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `irdrive` Lib - A Rust library to drive IR/RF-controlled appliances.
//!
//! Infrared and RF remotes are one-way: nothing tells you whether the fan
//! heard the "faster" button. This library keeps an *assumed* state for each
//! appliance, turns high-level requests into code sequences from a device
//! profile, and sends them through an injected controller (an HTTP IR
//! bridge, an MQTT blaster, or your own [`protocol::Controller`]).
//!
//! # Supported Features
//!
//! - **Profiles**: JSON command vocabularies with nested code groups
//! - **Fans**: speed by percentage, direction, oscillation
//! - **Lights**: brightness and color temperature through absolute codes or
//!   relative presses, nightlight
//! - **Media players**: power, volume, mute, sources, channel tuning
//! - **Power sensor**: optional reconciliation of the assumed power state
//!
//! # Guarantees
//!
//! - Code sequences for one device never interleave and are sent with the
//!   configured delay between codes.
//! - The assumed state changes only after a whole sequence was sent.
//! - A sensor reading always wins over the assumed power state.
//!
//! # Quick Start
//!
//! ## Light behind an HTTP IR bridge
//!
//! ```no_run
//! use irdrive_lib::{DeviceConfig, DeviceProfile, Light};
//! use irdrive_lib::protocol::HttpController;
//!
//! #[tokio::main]
//! async fn main() -> irdrive_lib::Result<()> {
//!     let profile = DeviceProfile::from_json(r#"{
//!         "manufacturer": "Lumen",
//!         "brightness": [25, 50, 75, 100],
//!         "commands": { "on": "ON", "off": "OFF", "brighten": "UP", "dim": "DOWN" }
//!     }"#)?;
//!
//!     let light = Light::new(
//!         DeviceConfig::new("Desk Lamp"),
//!         profile,
//!         HttpController::new("192.168.1.120")?,
//!     )?;
//!
//!     light.turn_on(Some(50), None).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Fan behind an MQTT blaster, with a power sensor
//!
//! ```no_run
//! use irdrive_lib::{DeviceConfig, DeviceProfile, Fan};
//! use irdrive_lib::protocol::MqttController;
//! use irdrive_lib::subscription::Subscribable;
//! use irdrive_lib::types::SensorEvent;
//!
//! #[tokio::main]
//! async fn main() -> irdrive_lib::Result<()> {
//!     let controller =
//!         MqttController::connect("mqtt://192.168.1.50:1883", "blaster/living/send").await?;
//!     let profile = DeviceProfile::from_json(r#"{
//!         "speed": ["low", "high"],
//!         "commands": { "off": "OFF", "default": { "low": "L", "high": "H" } }
//!     }"#)?;
//!
//!     let fan = Fan::new(
//!         DeviceConfig::new("Living Room Fan").with_power_sensor("sensor.fan_plug"),
//!         profile,
//!         controller,
//!     )?;
//!
//!     fan.on_power_changed(|state| println!("Fan is now {state}"));
//!
//!     // Feed sensor transitions from the host
//!     let (tx, rx) = tokio::sync::mpsc::channel(16);
//!     fan.core().attach_sensor_feed(rx);
//!     tx.send(SensorEvent::from_strings(Some("off"), Some("on"))).await.ok();
//!
//!     fan.set_percentage(100).await?;
//!     Ok(())
//! }
//! ```

pub mod capabilities;
pub mod command;
pub mod config;
pub mod device;
pub mod error;
pub mod power;
pub mod profile;
pub mod protocol;
pub mod scale;
pub mod state;
pub mod subscription;
pub mod types;

pub use capabilities::{ColorMode, FanCapabilities, LightCapabilities, MediaPlayerCapabilities};
pub use command::{Code, CommandTree};
pub use config::{DeviceConfig, MediaPlayerConfig};
pub use device::{CommandPlan, DeviceCategory, DeviceCore, Fan, Light, MediaPlayer};
pub use error::{
    ConfigError, DeviceError, Error, ParseError, ProtocolError, ResolveError, Result,
    TransmissionError, ValueError,
};
pub use power::PowerReconciler;
pub use profile::{DeviceProfile, ProfileInfo};
pub use state::{DeviceState, StateChange};
pub use subscription::{CallbackRegistry, Subscribable, SubscriptionId};
pub use types::{FanDirection, MediaType, PowerState, SensorEvent, SensorReading};
