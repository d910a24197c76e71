// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the MQTT transport using mockforge-mqtt.
//!
//! The mock broker accepts connections, subscriptions and publishes but does
//! not route messages between clients, so these tests cover the client side
//! only.

#![cfg(feature = "mqtt")]

use std::time::Duration;

use cleaner_sim::protocol::{MqttTransport, Transport, topic};
use cleaner_sim::simulation::{SequenceRandom, SimulationParams};
use cleaner_sim::types::CleanerStatus;
use cleaner_sim::{BrokerConfig, Simulator, SimulatorConfig};
use mockforge_mqtt::broker::MqttConfig;
use mockforge_mqtt::start_mqtt_server;
use tokio::sync::oneshot;
use tokio::time::sleep;

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

    // Give the broker time to bind and accept connections
    sleep(Duration::from_millis(500)).await;
}

fn broker(url: String, client_id: &str) -> BrokerConfig {
    SimulatorConfig::builder()
        .device_id(client_id)
        .broker_url(url)
        .build()
        .unwrap()
        .broker
}

// ============================================================================
// Connection
// ============================================================================

mod connection {
    use super::*;

    #[tokio::test]
    async fn connect_with_mqtt_scheme() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let result = MqttTransport::connect(&broker(
            format!("mqtt://127.0.0.1:{port}"),
            "cleaner-conn1",
        ))
        .await;

        assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
        let (transport, _commands) = result.unwrap();
        transport.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn connect_with_tcp_scheme() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let result =
            MqttTransport::connect(&broker(format!("tcp://127.0.0.1:{port}"), "cleaner-conn2"))
                .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn connect_without_scheme() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let result =
            MqttTransport::connect(&broker(format!("127.0.0.1:{port}"), "cleaner-conn3")).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn connect_without_broker_fails() {
        let port = get_test_port();

        let result =
            MqttTransport::connect(&broker(format!("mqtt://127.0.0.1:{port}"), "cleaner-conn4"))
                .await;

        assert!(result.is_err());
    }
}

// ============================================================================
// Publishing
// ============================================================================

mod publishing {
    use super::*;

    #[tokio::test]
    async fn publish_to_every_topic() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let (transport, _commands) =
            MqttTransport::connect(&broker(format!("mqtt://127.0.0.1:{port}"), "cleaner-pub1"))
                .await
                .unwrap();

        for topic in [
            topic::TELEMETRY,
            topic::REGISTER,
            topic::STATUS,
            topic::ALERTS,
            topic::ERRORS,
            topic::SCHEDULE_STATUS,
            topic::MAINTENANCE_STATUS,
        ] {
            let result = transport.publish(topic, br#"{"ok":true}"#.to_vec());
            assert!(result.is_ok(), "publish to {topic} failed: {:?}", result.err());
        }

        sleep(Duration::from_millis(100)).await;
        transport.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn clones_share_one_connection() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let (transport, _commands) =
            MqttTransport::connect(&broker(format!("mqtt://127.0.0.1:{port}"), "cleaner-pub2"))
                .await
                .unwrap();
        let clone = transport.clone();

        assert!(clone.publish(topic::ALERTS, b"{}".to_vec()).is_ok());
        assert!(transport.publish(topic::ALERTS, b"{}".to_vec()).is_ok());
    }
}

// ============================================================================
// Simulator over MQTT
// ============================================================================

mod simulator {
    use super::*;

    #[tokio::test]
    async fn runs_against_broker_until_shutdown() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let config = SimulatorConfig::builder()
            .device_id("cleaner-sim1")
            .broker_url(format!("mqtt://127.0.0.1:{port}"))
            .params(SimulationParams::default().with_tick_interval(Duration::from_millis(100)))
            .build()
            .unwrap();

        let (transport, commands) = MqttTransport::connect(&config.broker).await.unwrap();
        let simulator = Simulator::new(config, transport.clone())
            .with_random(SequenceRandom::constant(0.5));
        let state = simulator.state();

        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(simulator.run(commands, async {
            let _ = stop_rx.await;
        }));

        sleep(Duration::from_millis(450)).await;
        assert_eq!(state.borrow().status, CleanerStatus::Docked);

        stop_tx.send(()).unwrap();
        let final_state = task.await.unwrap();

        assert_eq!(final_state.device_id.as_str(), "cleaner-sim1");
        assert!((final_state.battery - 100.0).abs() < f64::EPSILON);
        // the event loop may already be gone with the control receiver
        let _ = transport.disconnect().await;
    }
}
