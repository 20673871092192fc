// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for device behaviour using a scripted controller.
//!
//! All tests run with paused time, so inter-command delays and sensor
//! verification delays elapse instantly and deterministically.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use irdrive_lib::command::Code;
use irdrive_lib::protocol::Controller;
use irdrive_lib::subscription::Subscribable;
use irdrive_lib::types::{MediaType, PowerState, SensorEvent};
use irdrive_lib::{
    DeviceConfig, DeviceProfile, Error, Fan, Light, MediaPlayer, MediaPlayerConfig,
    ProtocolError, TransmissionError,
};
use parking_lot::Mutex;
use tokio::time::Instant;

/// Records every code it accepts and fails the call at `fail_at`.
#[derive(Clone, Default)]
struct ScriptedController {
    sent: Arc<Mutex<Vec<(String, Instant)>>>,
    calls: Arc<AtomicUsize>,
    fail_at: Option<usize>,
}

impl ScriptedController {
    fn failing_at(call: usize) -> Self {
        Self {
            fail_at: Some(call),
            ..Self::default()
        }
    }

    fn codes(&self) -> Vec<String> {
        self.sent.lock().iter().map(|(code, _)| code.clone()).collect()
    }

    fn clear(&self) {
        self.sent.lock().clear();
    }
}

impl Controller for ScriptedController {
    async fn send(&self, code: &Code) -> Result<(), ProtocolError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_at == Some(call) {
            return Err(ProtocolError::ConnectionFailed("blaster offline".to_string()));
        }
        self.sent
            .lock()
            .push((code.as_str().to_string(), Instant::now()));
        Ok(())
    }
}

const FAN_PROFILE: &str = r#"{
    "manufacturer": "Breeze",
    "supportedModels": ["CF-42"],
    "supportedController": "Broadlink",
    "commandsEncoding": "Base64",
    "speed": ["low", "medium", "high"],
    "commands": {
        "off": "OFF",
        "default": { "low": "L", "medium": "M", "high": "H" }
    }
}"#;

const LIGHT_PROFILE: &str = r#"{
    "brightness": [25, 50, 75, 100, 150],
    "commands": { "on": "ON", "off": "OFF", "brighten": "UP", "dim": "DOWN" }
}"#;

const TV_PROFILE: &str = r#"{
    "commands": {
        "off": "OFF",
        "sources": {
            "Channel 0": "C0",
            "Channel 1": "C1",
            "Channel 5": "C5"
        }
    }
}"#;

fn fan_with_sensor(controller: ScriptedController) -> Fan<ScriptedController> {
    Fan::new(
        DeviceConfig::new("Sensor Fan")
            .with_power_sensor("sensor.fan_plug")
            .with_power_sensor_delay(10),
        DeviceProfile::from_json(FAN_PROFILE).unwrap(),
        controller,
    )
    .unwrap()
}

// ============================================================================
// Transmission
// ============================================================================

mod transmission {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn codes_are_spaced_by_the_delay() {
        let controller = ScriptedController::default();
        let light = Light::new(
            DeviceConfig::new("Lamp").with_delay(0.5),
            DeviceProfile::from_json(LIGHT_PROFILE).unwrap(),
            controller.clone(),
        )
        .unwrap();

        let start = Instant::now();
        light.turn_on(Some(50), None).await.unwrap();

        let sent = controller.sent.lock().clone();
        assert_eq!(
            sent.iter().map(|(code, _)| code.as_str()).collect::<Vec<_>>(),
            ["ON", "DOWN", "DOWN"]
        );
        for pair in sent.windows(2) {
            assert_eq!(pair[1].1 - pair[0].1, Duration::from_millis(500));
        }
        assert_eq!(start.elapsed(), Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_sequences_never_interleave() {
        let controller = ScriptedController::default();
        let tv = Arc::new(
            MediaPlayer::new(
                DeviceConfig::new("TV"),
                MediaPlayerConfig::new(),
                DeviceProfile::from_json(TV_PROFILE).unwrap(),
                controller.clone(),
            )
            .unwrap(),
        );

        let (first, second) = tokio::join!(
            tv.play_media(&MediaType::Channel, "105"),
            tv.play_media(&MediaType::Channel, "510"),
        );
        first.unwrap();
        second.unwrap();

        assert_eq!(controller.codes(), ["C1", "C0", "C5", "C5", "C1", "C0"]);
        assert_eq!(tv.source().as_deref(), Some("Channel 510"));
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_tasks_are_served_in_order() {
        let controller = ScriptedController::default();
        let light = Arc::new(
            Light::new(
                DeviceConfig::new("Lamp"),
                DeviceProfile::from_json(LIGHT_PROFILE).unwrap(),
                controller.clone(),
            )
            .unwrap(),
        );

        let first = tokio::spawn({
            let light = Arc::clone(&light);
            async move { light.turn_on(Some(150), None).await }
        });
        tokio::task::yield_now().await;
        let second = tokio::spawn({
            let light = Arc::clone(&light);
            async move { light.turn_off().await }
        });

        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();

        assert_eq!(
            controller.codes(),
            ["ON", "UP", "UP", "UP", "UP", "UP", "OFF"]
        );
        assert!(!light.is_on());
        assert_eq!(light.brightness(), Some(150));
    }
}

// ============================================================================
// Partial failure
// ============================================================================

mod partial_failure {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn failed_sequence_leaves_state_untouched() {
        let controller = ScriptedController::failing_at(1);
        let tv = MediaPlayer::new(
            DeviceConfig::new("TV"),
            MediaPlayerConfig::new(),
            DeviceProfile::from_json(TV_PROFILE).unwrap(),
            controller.clone(),
        )
        .unwrap();

        let notified = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&notified);
        tv.on_state_changed(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let err = tv
            .play_media(&MediaType::Channel, "105")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Transmission(TransmissionError {
                index: 1,
                total: 3,
                ..
            })
        ));
        assert_eq!(controller.codes(), ["C1"]);
        assert!(!tv.is_on());
        assert_eq!(tv.source(), None);
        assert_eq!(notified.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn device_stays_usable_after_failure() {
        let controller = ScriptedController::failing_at(0);
        let fan = Fan::new(
            DeviceConfig::new("Fan"),
            DeviceProfile::from_json(FAN_PROFILE).unwrap(),
            controller.clone(),
        )
        .unwrap();

        assert!(fan.set_percentage(100).await.is_err());
        assert!(!fan.is_on());

        fan.set_percentage(100).await.unwrap();
        assert!(fan.is_on());
        assert_eq!(fan.speed().as_deref(), Some("high"));
        assert_eq!(controller.codes(), ["H"]);
    }

    #[tokio::test(start_paused = true)]
    async fn unresolved_code_sends_nothing() {
        let controller = ScriptedController::default();
        let fan = Fan::new(
            DeviceConfig::new("Fan"),
            DeviceProfile::from_json(
                r#"{ "speed": ["low", "high"], "commands": { "off": "OFF", "default": { "low": "L" } } }"#,
            )
            .unwrap(),
            controller.clone(),
        )
        .unwrap();

        let err = fan.set_percentage(100).await.unwrap_err();
        assert!(matches!(err, Error::Unresolved(ref e) if e.key() == Some("high")));
        assert!(controller.codes().is_empty());
        assert!(!fan.is_on());
    }
}

// ============================================================================
// Power sensor reconciliation
// ============================================================================

mod reconciliation {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn confirmed_expectation_is_left_alone() {
        let fan = fan_with_sensor(ScriptedController::default());

        fan.turn_on(None).await.unwrap();
        assert_eq!(
            fan.core().reconciler().pending_expectation(),
            Some(PowerState::On)
        );

        fan.core()
            .handle_sensor_event(SensorEvent::from_strings(Some("off"), Some("on")));

        let notified = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&notified);
        fan.on_state_changed(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_secs(11)).await;

        assert!(fan.is_on());
        assert!(!fan.state().on_by_remote());
        assert_eq!(notified.load(Ordering::SeqCst), 0);
        assert_eq!(fan.core().reconciler().pending_expectation(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn unconfirmed_expectation_is_corrected() {
        let fan = fan_with_sensor(ScriptedController::default());
        fan.core()
            .handle_sensor_event(SensorEvent::from_strings(None, Some("off")));

        let powers = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&powers);
        fan.on_power_changed(move |state| seen.lock().push(state));

        fan.turn_on(None).await.unwrap();
        assert!(fan.is_on());

        tokio::time::sleep(Duration::from_secs(9)).await;
        assert!(fan.is_on());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!fan.is_on());
        assert_eq!(*powers.lock(), [PowerState::On, PowerState::Off]);
    }

    #[tokio::test(start_paused = true)]
    async fn rescheduling_replaces_pending_check() {
        let fan = fan_with_sensor(ScriptedController::default());
        fan.core()
            .handle_sensor_event(SensorEvent::from_strings(None, Some("off")));

        // Each power change restarts the 10 s window
        fan.turn_on(None).await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        fan.turn_off().await.unwrap();
        fan.turn_on(None).await.unwrap();

        tokio::time::sleep(Duration::from_millis(5500)).await;
        assert!(fan.is_on());
        assert_eq!(
            fan.core().reconciler().pending_expectation(),
            Some(PowerState::On)
        );

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(!fan.is_on());
        assert_eq!(fan.core().reconciler().pending_expectation(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn remote_power_on_is_flagged() {
        let fan = fan_with_sensor(ScriptedController::default());

        assert!(
            fan.core()
                .handle_sensor_event(SensorEvent::from_strings(Some("off"), Some("on")))
        );
        assert!(fan.is_on());
        assert!(fan.state().on_by_remote());

        // Repeated reading is ignored
        assert!(
            !fan.core()
                .handle_sensor_event(SensorEvent::from_strings(Some("on"), Some("on")))
        );

        // Our own transmission clears the flag
        fan.set_percentage(100).await.unwrap();
        assert!(!fan.state().on_by_remote());

        assert!(
            fan.core()
                .handle_sensor_event(SensorEvent::from_strings(Some("on"), Some("off")))
        );
        assert!(!fan.is_on());
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_readings_change_nothing() {
        let fan = fan_with_sensor(ScriptedController::default());
        fan.set_percentage(50).await.unwrap();

        assert!(
            !fan.core()
                .handle_sensor_event(SensorEvent::from_strings(Some("on"), Some("unavailable")))
        );
        tokio::time::sleep(Duration::from_secs(11)).await;
        assert!(fan.is_on());
    }

    #[tokio::test(start_paused = true)]
    async fn sensor_feed_is_consumed_in_background() {
        let fan = fan_with_sensor(ScriptedController::default());
        let (tx, rx) = tokio::sync::mpsc::channel(4);
        fan.core().attach_sensor_feed(rx);

        tx.send(SensorEvent::from_strings(Some("off"), Some("on")))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(fan.is_on());
        assert!(fan.state().on_by_remote());

        fan.core().shutdown();
        tx.send(SensorEvent::from_strings(Some("on"), Some("off")))
            .await
            .ok();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(fan.is_on());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_device_cancels_pending_check() {
        let fan = fan_with_sensor(ScriptedController::default());
        fan.core()
            .handle_sensor_event(SensorEvent::from_strings(None, Some("off")));
        fan.turn_on(None).await.unwrap();
        assert_eq!(
            fan.core().reconciler().pending_expectation(),
            Some(PowerState::On)
        );

        let notified = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&notified);
        fan.on_power_changed(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        drop(fan);
        tokio::time::sleep(Duration::from_secs(20)).await;

        assert_eq!(notified.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn events_without_sensor_are_ignored() {
        let fan = Fan::new(
            DeviceConfig::new("Plain Fan"),
            DeviceProfile::from_json(FAN_PROFILE).unwrap(),
            ScriptedController::default(),
        )
        .unwrap();

        assert!(
            !fan.core()
                .handle_sensor_event(SensorEvent::from_strings(Some("off"), Some("on")))
        );
        assert!(!fan.is_on());

        fan.turn_on(None).await.unwrap();
        assert_eq!(fan.core().reconciler().pending_expectation(), None);
    }
}

// ============================================================================
// Restore
// ============================================================================

mod restore {
    use super::*;
    use irdrive_lib::DeviceState;

    #[tokio::test(start_paused = true)]
    async fn restored_state_drives_next_plan() {
        let controller = ScriptedController::default();
        let light = Light::new(
            DeviceConfig::new("Lamp"),
            DeviceProfile::from_json(LIGHT_PROFILE).unwrap(),
            controller.clone(),
        )
        .unwrap();

        let snapshot: DeviceState =
            serde_json::from_str(r#"{"power": "on", "brightness": 25}"#).unwrap();

        let notified = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&notified);
        light.on_state_changed(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(light.restore_state(&snapshot));
        assert_eq!(notified.load(Ordering::SeqCst), 1);

        light.turn_on(Some(50), None).await.unwrap();
        assert_eq!(controller.codes(), ["UP"]);
        controller.clear();

        light.turn_off().await.unwrap();
        assert_eq!(controller.codes(), ["OFF"]);
    }
}
