// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the MQTT session using mockforge-mqtt.

use std::time::Duration;

use mockforge_mqtt::broker::MqttConfig;
use mockforge_mqtt::start_mqtt_server;
use tokio::time::sleep;
use vacbot_lib::command::QueryCommand;
use vacbot_lib::fragment::Fragment;
use vacbot_lib::protocol::{DeviceRoute, EnvelopeCodec, Jid, MqttSession, Transport};
use vacbot_lib::{Error, ProtocolError, VacBot, VacBotConfig};

/// Helper to find an available port for testing.
fn get_test_port() -> u16 {
    use std::sync::atomic::{AtomicU16, Ordering};
    static PORT_COUNTER: AtomicU16 = AtomicU16::new(18850);
    PORT_COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Starts a mock MQTT broker on the given port.
async fn start_mock_broker(port: u16) {
    let config = MqttConfig {
        port,
        host: "127.0.0.1".to_string(),
        ..Default::default()
    };

    tokio::spawn(async move {
        let _ = start_mqtt_server(config).await;
    });

    // Give the broker time to start, bind to port, and be ready to accept connections
    sleep(Duration::from_millis(500)).await;
}

fn account() -> Jid {
    Jid::new("me", "ecouser.net", "r1")
}

fn route() -> DeviceRoute {
    DeviceRoute {
        did: "E0001".to_string(),
        class: "ls1ok3".to_string(),
        resource: "atom".to_string(),
    }
}

fn config(port: u16) -> VacBotConfig {
    VacBotConfig::new("me", "ecouser.net", "token", "E0001", "ls1ok3")
        .with_company("eco-ng")
        .with_resource("r1")
        .with_mqtt_broker(format!("mqtt://127.0.0.1:{port}"))
}

// ============================================================================
// MqttSession Connection Tests
// ============================================================================

mod session_connection {
    use super::*;

    #[tokio::test]
    async fn connect_to_broker() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let broker_url = format!("mqtt://127.0.0.1:{port}");
        let result = MqttSession::connect(&broker_url, account(), "token", route()).await;

        assert!(result.is_ok(), "Failed to connect: {:?}", result.err());

        let (session, _inbound) = result.unwrap();
        assert_eq!(session.route().did, "E0001");
    }

    #[tokio::test]
    async fn connect_with_tcp_scheme() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let broker_url = format!("tcp://127.0.0.1:{port}");
        let result = MqttSession::connect(&broker_url, account(), "token", route()).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn connect_without_scheme() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let broker_url = format!("127.0.0.1:{port}");
        let result = MqttSession::connect(&broker_url, account(), "token", route()).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn invalid_port_fails() {
        let result =
            MqttSession::connect("mqtt://127.0.0.1:notaport", account(), "token", route()).await;

        assert!(matches!(result, Err(ProtocolError::InvalidAddress(_))));
    }
}

// ============================================================================
// MqttSession Transport Tests
// ============================================================================

mod session_transport {
    use super::*;

    #[tokio::test]
    async fn publish_query() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let broker_url = format!("mqtt://127.0.0.1:{port}");
        let (session, _inbound) = MqttSession::connect(&broker_url, account(), "token", route())
            .await
            .unwrap();

        let codec = EnvelopeCodec::new(account());
        let envelope = codec.wrap(
            Fragment::named("ctl").with_attr("td", "GetBatteryInfo"),
            "E0001",
        );

        let reply = session.send(&envelope).await.unwrap();
        assert!(reply.is_none(), "push transports never reply inline");
    }

    #[tokio::test]
    async fn liveness_is_not_published() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let broker_url = format!("mqtt://127.0.0.1:{port}");
        let (session, _inbound) = MqttSession::connect(&broker_url, account(), "token", route())
            .await
            .unwrap();

        let envelope = EnvelopeCodec::new(account()).liveness("E0001");
        assert!(session.send(&envelope).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn payload_without_command_is_rejected() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let broker_url = format!("mqtt://127.0.0.1:{port}");
        let (session, _inbound) = MqttSession::connect(&broker_url, account(), "token", route())
            .await
            .unwrap();

        let envelope = EnvelopeCodec::new(account()).wrap(Fragment::named("ctl"), "E0001");
        assert!(matches!(
            session.send(&envelope).await,
            Err(ProtocolError::InvalidAddress(_))
        ));
    }
}

// ============================================================================
// VacBot over MQTT Tests
// ============================================================================
//
// The mockforge-mqtt broker doesn't forward publishes between clients, so
// report handling is covered by tests/scenarios.rs and the unit tests of
// the session's topic decoding.

mod vacbot_mqtt {
    use super::*;

    #[tokio::test]
    async fn create_adapter() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let (bot, _inbound) = VacBot::mqtt(config(port)).await.unwrap();

        assert!(bot.is_connected());
        assert_eq!(bot.config().vacuum_address(), "E0001");
    }

    #[tokio::test]
    async fn send_query_and_ping() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let (bot, _inbound) = VacBot::mqtt(config(port)).await.unwrap();

        let events = bot.send_command(&QueryCommand::GetCleanState).await.unwrap();
        assert!(events.is_empty());
        bot.send_ping().await.unwrap();
    }

    #[tokio::test]
    async fn close_disconnects() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let (bot, _inbound) = VacBot::mqtt(config(port)).await.unwrap();
        bot.close().await.unwrap();

        assert!(!bot.is_connected());
        assert!(matches!(
            bot.send_command(&QueryCommand::GetPos).await,
            Err(Error::NotConnected)
        ));
    }

    #[tokio::test]
    async fn invalid_config_fails_before_connecting() {
        let config = VacBotConfig::new("me", "ecouser.net", "token", "", "ls1ok3");
        assert!(matches!(VacBot::mqtt(config).await, Err(Error::Config(_))));
    }
}
