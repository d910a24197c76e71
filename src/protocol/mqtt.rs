// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MQTT transport backed by `rumqttc`.

use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS, TlsConfiguration};
use tokio::sync::{mpsc, oneshot};

use super::{Transport, topic};
use crate::config::{BrokerConfig, TlsFiles};
use crate::error::ProtocolError;

/// Time allowed for the broker to acknowledge the connection.
const CONNECTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Delay before polling again after a connection error.
const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Capacity of the client request queue and of the inbound channel.
const CHANNEL_CAPACITY: usize = 64;

/// MQTT connection of the simulated device.
///
/// Publishes with QoS 1 without retain and subscribes to `cleaner/control`
/// on every (re)connection. Inbound control payloads are forwarded to the
/// receiver returned by [`connect`](Self::connect).
///
/// # Examples
///
/// ```no_run
/// use cleaner_sim::SimulatorConfig;
/// use cleaner_sim::protocol::MqttTransport;
///
/// # async fn example() -> cleaner_sim::Result<()> {
/// let config = SimulatorConfig::from_env()?;
/// let (transport, mut commands) = MqttTransport::connect(&config.broker).await?;
///
/// while let Some(payload) = commands.recv().await {
///     println!("{} bytes on cleaner/control", payload.len());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MqttTransport {
    client: AsyncClient,
}

impl MqttTransport {
    /// Connects to the broker and waits for it to accept the session.
    ///
    /// TLS is used when the configuration carries [`TlsFiles`]; the URL
    /// scheme only selects the default port (1883 for `mqtt://`/`tcp://`,
    /// 8883 for `mqtts://`/`ssl://`).
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidAddress`] for a malformed URL,
    /// [`ProtocolError::Tls`] if the PEM files cannot be read and
    /// [`ProtocolError::ConnectionFailed`] if the broker does not accept the
    /// connection in time.
    pub async fn connect(
        config: &BrokerConfig,
    ) -> Result<(Self, mpsc::Receiver<Vec<u8>>), ProtocolError> {
        let (host, port) = parse_mqtt_url(&config.url)?;

        let mut mqtt_options = MqttOptions::new(&config.client_id, &host, port);
        mqtt_options.set_keep_alive(config.keep_alive);
        mqtt_options.set_clean_session(true);
        if let Some(files) = &config.tls {
            mqtt_options.set_transport(rumqttc::Transport::tls_with_config(load_tls(files)?));
        }

        let (client, event_loop) = AsyncClient::new(mqtt_options, CHANNEL_CAPACITY);
        let (inbound_tx, inbound_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (connack_tx, connack_rx) = oneshot::channel();

        let loop_client = client.clone();
        tokio::spawn(async move {
            handle_mqtt_events(event_loop, loop_client, inbound_tx, connack_tx).await;
        });

        match tokio::time::timeout(CONNECTION_TIMEOUT, connack_rx).await {
            Ok(Ok(())) => {
                tracing::info!(
                    host = %host,
                    port,
                    client_id = %config.client_id,
                    tls = config.tls.is_some(),
                    "Connected to MQTT broker"
                );
                Ok((Self { client }, inbound_rx))
            }
            Ok(Err(_)) => Err(ProtocolError::ConnectionFailed(format!(
                "could not reach {host}:{port}"
            ))),
            Err(_) => Err(ProtocolError::ConnectionFailed(format!(
                "no answer from {host}:{port} after {}s",
                CONNECTION_TIMEOUT.as_secs()
            ))),
        }
    }

    /// Sends a clean disconnect to the broker.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Mqtt`] if the request cannot be queued.
    pub async fn disconnect(&self) -> Result<(), ProtocolError> {
        tracing::info!("Disconnecting from MQTT broker");
        self.client.disconnect().await.map_err(ProtocolError::Mqtt)
    }
}

impl Transport for MqttTransport {
    fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), ProtocolError> {
        tracing::debug!(topic, bytes = payload.len(), "Publishing MQTT message");
        self.client
            .try_publish(topic, QoS::AtLeastOnce, false, payload)
            .map_err(ProtocolError::Mqtt)
    }
}

/// Parses an MQTT URL into host and port.
fn parse_mqtt_url(url: &str) -> Result<(String, u16), ProtocolError> {
    let (rest, default_port) = if let Some(rest) = url
        .strip_prefix("mqtts://")
        .or_else(|| url.strip_prefix("ssl://"))
    {
        (rest, 8883)
    } else {
        let rest = url
            .strip_prefix("mqtt://")
            .or_else(|| url.strip_prefix("tcp://"))
            .unwrap_or(url);
        (rest, 1883)
    };
    let rest = rest.trim_end_matches('/');

    let (host, port) = if let Some((h, p)) = rest.rsplit_once(':') {
        let port = p
            .parse()
            .map_err(|_| ProtocolError::InvalidAddress(format!("Invalid port: {p}")))?;
        (h, port)
    } else {
        (rest, default_port)
    };

    if host.is_empty() {
        return Err(ProtocolError::InvalidAddress(format!("No host in {url}")));
    }
    Ok((host.to_string(), port))
}

fn load_tls(files: &TlsFiles) -> Result<TlsConfiguration, ProtocolError> {
    let read = |path: &std::path::Path| {
        std::fs::read(path)
            .map_err(|e| ProtocolError::Tls(format!("cannot read {}: {e}", path.display())))
    };
    Ok(TlsConfiguration::Simple {
        ca: read(files.ca.as_path())?,
        alpn: None,
        client_auth: Some((read(files.cert.as_path())?, read(files.key.as_path())?)),
    })
}

/// Drives the connection and forwards control payloads.
///
/// Runs until the inbound receiver is dropped, or until the first
/// connection attempt fails.
async fn handle_mqtt_events(
    mut event_loop: EventLoop,
    client: AsyncClient,
    inbound_tx: mpsc::Sender<Vec<u8>>,
    connack_tx: oneshot::Sender<()>,
) {
    let mut connack_tx = Some(connack_tx);

    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(connack))) => {
                tracing::debug!(?connack, "MQTT connected");
                if let Err(e) = client.try_subscribe(topic::CONTROL, QoS::AtLeastOnce) {
                    tracing::warn!(error = %e, "Failed to subscribe to control topic");
                }
                if let Some(tx) = connack_tx.take() {
                    let _ = tx.send(());
                }
            }
            Ok(Event::Incoming(Packet::SubAck(suback))) => {
                tracing::debug!(?suback, "MQTT subscription acknowledged");
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                if publish.topic != topic::CONTROL {
                    continue;
                }
                tracing::debug!(
                    topic = %publish.topic,
                    bytes = publish.payload.len(),
                    "Received control message"
                );
                if inbound_tx.send(publish.payload.to_vec()).await.is_err() {
                    break;
                }
            }
            Ok(Event::Outgoing(rumqttc::Outgoing::Disconnect)) => {
                tracing::debug!("MQTT disconnect sent");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                if connack_tx.is_some() {
                    tracing::error!(error = %e, "MQTT connection failed");
                    break;
                }
                if inbound_tx.is_closed() {
                    break;
                }
                tracing::warn!(error = %e, "MQTT connection lost, reconnecting");
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        }
    }
}
