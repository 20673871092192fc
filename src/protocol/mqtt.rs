// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MQTT controller implementation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use rumqttc::{AsyncClient, EventLoop, MqttOptions, QoS};

use crate::command::Code;
use crate::error::ProtocolError;
use crate::protocol::Controller;

/// Global counter for generating unique client IDs.
static CLIENT_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Controller for IR blasters that listen on an MQTT topic.
///
/// Each code is published as the raw payload of one message on the
/// configured topic with QoS 1. A background task drives the connection and
/// logs its events.
///
/// # Examples
///
/// ```no_run
/// use irdrive_lib::command::Code;
/// use irdrive_lib::protocol::{Controller, MqttController};
///
/// # async fn example() -> irdrive_lib::Result<()> {
/// let controller = MqttController::connect("mqtt://192.168.1.50:1883", "home/livingroom/ir").await?;
/// controller.send(&Code::new("JgBQAAABKZIUEhQ3")).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MqttController {
    client: AsyncClient,
    topic: String,
}

impl MqttController {
    /// Connects to an MQTT broker and publishes codes to `topic`.
    ///
    /// # Arguments
    ///
    /// * `broker_url` - The MQTT broker URL (e.g., `mqtt://192.168.1.50:1883`)
    /// * `topic` - The topic the blaster listens on
    ///
    /// # Errors
    ///
    /// Returns error if the broker URL or topic is invalid.
    pub async fn connect(
        broker_url: impl Into<String>,
        topic: impl Into<String>,
    ) -> Result<Self, ProtocolError> {
        MqttControllerBuilder::new()
            .broker(broker_url)
            .topic(topic)
            .build()
            .await
    }

    /// Returns the command topic.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Disconnects from the broker.
    ///
    /// # Errors
    ///
    /// Returns error if the disconnect request cannot be queued.
    pub async fn disconnect(&self) -> Result<(), ProtocolError> {
        self.client.disconnect().await.map_err(ProtocolError::Mqtt)
    }
}

impl Controller for MqttController {
    async fn send(&self, code: &Code) -> Result<(), ProtocolError> {
        tracing::debug!(topic = %self.topic, code = %code, "Publishing code over MQTT");

        self.client
            .publish(&self.topic, QoS::AtLeastOnce, false, code.as_str().as_bytes().to_vec())
            .await
            .map_err(ProtocolError::Mqtt)
    }
}

/// Parses an MQTT URL into host and port.
fn parse_mqtt_url(url: &str) -> Result<(String, u16), ProtocolError> {
    let url = url
        .strip_prefix("mqtt://")
        .or_else(|| url.strip_prefix("tcp://"))
        .unwrap_or(url);

    let (host, port) = if let Some((h, p)) = url.rsplit_once(':') {
        let port = p
            .parse()
            .map_err(|_| ProtocolError::InvalidAddress(format!("Invalid port: {p}")))?;
        (h.to_string(), port)
    } else {
        (url.to_string(), 1883)
    };

    if host.is_empty() {
        return Err(ProtocolError::InvalidAddress("empty broker host".to_string()));
    }

    Ok((host, port))
}

/// Drives the MQTT connection in the background.
async fn handle_mqtt_events(mut event_loop: EventLoop, topic: String) {
    use rumqttc::{Event, Packet};

    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(connack))) => {
                tracing::debug!(topic = %topic, ?connack, "MQTT connected");
            }
            Ok(Event::Incoming(Packet::PubAck(puback))) => {
                tracing::trace!(topic = %topic, pkid = puback.pkid, "MQTT publish acknowledged");
            }
            Ok(Event::Incoming(Packet::Disconnect)) => {
                tracing::debug!(topic = %topic, "MQTT broker closed the session");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!(topic = %topic, error = %e, "MQTT event loop error");
                break;
            }
        }
    }
}

/// Builder for creating an MQTT controller with custom configuration.
#[derive(Debug, Default)]
pub struct MqttControllerBuilder {
    broker: Option<String>,
    topic: Option<String>,
    username: Option<String>,
    password: Option<String>,
    client_id: Option<String>,
    keep_alive: Option<Duration>,
}

impl MqttControllerBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the MQTT broker URL.
    #[must_use]
    pub fn broker(mut self, broker: impl Into<String>) -> Self {
        self.broker = Some(broker.into());
        self
    }

    /// Sets the topic codes are published to.
    #[must_use]
    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Sets authentication credentials for the MQTT broker.
    #[must_use]
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Sets a custom client ID.
    #[must_use]
    pub fn client_id(mut self, id: impl Into<String>) -> Self {
        self.client_id = Some(id.into());
        self
    }

    /// Sets the keep-alive interval.
    #[must_use]
    pub fn keep_alive(mut self, duration: Duration) -> Self {
        self.keep_alive = Some(duration);
        self
    }

    /// Builds the controller and starts its connection task.
    ///
    /// # Errors
    ///
    /// Returns error if the broker or topic is missing or invalid.
    pub async fn build(self) -> Result<MqttController, ProtocolError> {
        let broker = self
            .broker
            .ok_or_else(|| ProtocolError::InvalidAddress("broker is required".to_string()))?;

        let topic = self
            .topic
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ProtocolError::InvalidAddress("topic is required".to_string()))?;

        let (host, port) = parse_mqtt_url(&broker)?;

        // PID + counter to avoid client ID conflicts
        let client_id = self.client_id.unwrap_or_else(|| {
            let counter = CLIENT_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
            format!("irdrive_{}_{}", std::process::id(), counter)
        });

        let mut mqtt_options = MqttOptions::new(&client_id, host, port);
        mqtt_options.set_keep_alive(self.keep_alive.unwrap_or(Duration::from_secs(30)));
        mqtt_options.set_clean_session(true);

        if let (Some(username), Some(password)) = (self.username, self.password) {
            mqtt_options.set_credentials(username, password);
        }

        let (client, event_loop) = AsyncClient::new(mqtt_options, 10);

        let topic_clone = topic.clone();
        tokio::spawn(async move {
            handle_mqtt_events(event_loop, topic_clone).await;
        });

        // Publishes are queued by the client until the connection is up
        tokio::task::yield_now().await;

        Ok(MqttController { client, topic })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_mqtt_url_with_port() {
        let (host, port) = parse_mqtt_url("mqtt://192.168.1.50:1883").unwrap();
        assert_eq!(host, "192.168.1.50");
        assert_eq!(port, 1883);
    }

    #[test]
    fn parse_mqtt_url_default_port() {
        let (host, port) = parse_mqtt_url("192.168.1.50").unwrap();
        assert_eq!(host, "192.168.1.50");
        assert_eq!(port, 1883);
    }

    #[test]
    fn parse_mqtt_url_tcp_scheme() {
        let (host, port) = parse_mqtt_url("tcp://broker.local:8883").unwrap();
        assert_eq!(host, "broker.local");
        assert_eq!(port, 8883);
    }

    #[test]
    fn parse_mqtt_url_rejects_bad_input() {
        assert!(parse_mqtt_url("mqtt://broker:notaport").is_err());
        assert!(parse_mqtt_url("mqtt://:1883").is_err());
    }

    #[tokio::test]
    async fn builder_requires_topic() {
        let result = MqttControllerBuilder::new()
            .broker("mqtt://localhost:1883")
            .build()
            .await;
        assert!(matches!(result, Err(ProtocolError::InvalidAddress(_))));
    }

    #[test]
    fn builder_collects_options() {
        let builder = MqttControllerBuilder::new()
            .broker("mqtt://broker:1883")
            .topic("home/ir")
            .credentials("user", "pass")
            .client_id("my_client")
            .keep_alive(Duration::from_secs(60));

        assert_eq!(builder.broker.as_deref(), Some("mqtt://broker:1883"));
        assert_eq!(builder.topic.as_deref(), Some("home/ir"));
        assert_eq!(builder.username.as_deref(), Some("user"));
        assert_eq!(builder.client_id.as_deref(), Some("my_client"));
        assert_eq!(builder.keep_alive, Some(Duration::from_secs(60)));
    }
}
