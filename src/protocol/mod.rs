// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Controllers that emit IR/RF codes.
//!
//! A controller is the only thing a device talks to. It receives one opaque
//! [`Code`] at a time and reports whether it was handed over; it never knows
//! what the code means and nothing confirms the appliance received it.
//!
//! # Controllers
//!
//! - [`HttpController`]: blaster with an HTTP endpoint (feature `http`)
//! - [`MqttController`]: blaster listening on an MQTT topic (feature `mqtt`)
//!
//! Any other transport can be plugged in by implementing [`Controller`].

#[cfg(feature = "http")]
mod http;
#[cfg(feature = "mqtt")]
mod mqtt;

#[cfg(feature = "http")]
pub use http::{HttpConfig, HttpController};
#[cfg(feature = "mqtt")]
pub use mqtt::{MqttController, MqttControllerBuilder};

use std::sync::Arc;

use crate::command::Code;
use crate::error::ProtocolError;

/// Trait for controllers that can transmit codes to an appliance.
#[allow(async_fn_in_trait)]
pub trait Controller {
    /// Transmits a single code.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the code could not be handed to the
    /// emitter.
    async fn send(&self, code: &Code) -> Result<(), ProtocolError>;
}

impl<C: Controller> Controller for Arc<C> {
    async fn send(&self, code: &Code) -> Result<(), ProtocolError> {
        self.as_ref().send(code).await
    }
}
