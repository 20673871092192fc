// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for IR/RF device control.
//!
//! # Types
//!
//! - [`PowerState`] - Assumed on/off state of a device
//! - [`SensorReading`] - On/off/unknown reading of an external power sensor
//! - [`SensorEvent`] - A change of sensor reading
//! - [`FanDirection`] - Forward/reverse/default airflow
//! - [`MediaType`] - Kind of media for play-media requests
//! - [`DeviceId`] - Unique identifier of a device instance

mod device_id;
mod fan;
mod media;
mod power;

pub use device_id::DeviceId;
pub use fan::FanDirection;
pub use media::MediaType;
pub use power::{PowerState, SensorEvent, SensorReading};
