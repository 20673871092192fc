// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the HTTP controller using wiremock.

use std::time::Duration;

use irdrive_lib::command::Code;
use irdrive_lib::protocol::{Controller, HttpConfig, HttpController};
use irdrive_lib::{DeviceConfig, DeviceProfile, Error, Fan, ProtocolError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// HttpController Tests
// ============================================================================

mod http_controller {
    use super::*;

    #[tokio::test]
    async fn sends_code_as_path_segment() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/commands/ir/raw/JgBQAAAB"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let controller = HttpController::new(mock_server.uri()).unwrap();
        controller.send(&Code::new("JgBQAAAB")).await.unwrap();
    }

    #[tokio::test]
    async fn encoding_is_configurable() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/commands/ir/pronto/0000%200067"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        let controller = HttpConfig::new(mock_server.uri())
            .with_encoding("Pronto")
            .into_controller()
            .unwrap();
        controller.send(&Code::new("0000 0067")).await.unwrap();
    }

    #[tokio::test]
    async fn client_error_is_rejection() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let controller = HttpController::new(mock_server.uri()).unwrap();
        let err = controller.send(&Code::new("AAAA")).await.unwrap_err();

        assert!(matches!(err, ProtocolError::Rejected(ref msg) if msg.contains("404")));
    }

    #[tokio::test]
    async fn server_error_is_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let controller = HttpController::new(mock_server.uri()).unwrap();
        let err = controller.send(&Code::new("AAAA")).await.unwrap_err();

        assert!(matches!(err, ProtocolError::ConnectionFailed(_)));
    }

    #[tokio::test]
    async fn slow_bridge_times_out() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&mock_server)
            .await;

        let controller = HttpConfig::new(mock_server.uri())
            .with_timeout(Duration::from_millis(100))
            .into_controller()
            .unwrap();

        let err = controller.send(&Code::new("AAAA")).await.unwrap_err();
        assert!(matches!(err, ProtocolError::Timeout(100)));
    }

    #[test]
    fn empty_host_is_invalid() {
        let result = HttpConfig::new("  ").into_controller();
        assert!(matches!(result, Err(ProtocolError::InvalidAddress(_))));
    }
}

// ============================================================================
// Device over HTTP
// ============================================================================

mod fan_over_http {
    use super::*;

    const PROFILE: &str = r#"{
        "manufacturer": "Breeze",
        "commandsEncoding": "Raw",
        "speed": ["low", "high"],
        "commands": {
            "off": "OFF",
            "default": { "low": "LOW", "high": "HIGH" }
        }
    }"#;

    fn fan(uri: String) -> Fan<HttpController> {
        let profile = DeviceProfile::from_json(PROFILE).unwrap();
        let controller = HttpConfig::new(uri)
            .with_encoding(&profile.info().commands_encoding)
            .into_controller()
            .unwrap();
        Fan::new(
            DeviceConfig::new("HTTP Fan").with_delay(0.01),
            profile,
            controller,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn set_percentage_hits_bridge() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/commands/ir/raw/HIGH"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let fan = fan(mock_server.uri());
        fan.set_percentage(100).await.unwrap();

        assert!(fan.is_on());
        assert_eq!(fan.percentage(), Some(100));
    }

    #[tokio::test]
    async fn bridge_failure_keeps_state() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let fan = fan(mock_server.uri());
        let err = fan.set_percentage(100).await.unwrap_err();

        assert!(matches!(err, Error::Transmission(ref e) if e.index == 0 && e.total == 1));
        assert!(!fan.is_on());
        assert_eq!(fan.speed().as_deref(), Some("low"));
    }
}
