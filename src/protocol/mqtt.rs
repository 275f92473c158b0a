// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Push session over the vendor MQTT broker.
//!
//! Topic layout:
//! - Robot reports: `iot/atr/<event>/<did>/<class>/<resource>/<fmt>`
//! - Requests: `iot/p2p/<cmd>/<user>/<host>/<resource>/<did>/<class>/<resource>/q/<id>/x`
//! - Replies: `iot/p2p/<cmd>/<did>/<class>/<resource>/<user>/<host>/<resource>/p/<id>/<fmt>`

use std::time::Duration;

use rumqttc::{AsyncClient, EventLoop, MqttOptions, QoS};
use tokio::sync::mpsc;

use crate::error::ProtocolError;
use crate::fragment::Fragment;
use crate::protocol::{DeviceRoute, Envelope, Inbound, Jid, Transport};

/// Capacity of the inbound message channel.
const INBOUND_CAPACITY: usize = 64;

/// MQTT session for one robot.
///
/// Reports and replies are decoded in a background task and delivered on the
/// receiver returned by [`MqttSession::connect`]; [`Transport::send`] only
/// publishes.
///
/// # Examples
///
/// ```no_run
/// use vacbot_lib::protocol::{DeviceRoute, Jid, MqttSession};
///
/// # async fn example() -> vacbot_lib::Result<()> {
/// let route = DeviceRoute {
///     did: "E0001".into(),
///     class: "ls1ok3".into(),
///     resource: "atom".into(),
/// };
/// let (session, mut inbound) = MqttSession::connect(
///     "mqtts://mq-eu.ecouser.net:8883",
///     Jid::new("me", "ecouser.net", "r1"),
///     "token",
///     route,
/// )
/// .await?;
///
/// while let Some(message) = inbound.recv().await {
///     println!("{message:?}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MqttSession {
    client: AsyncClient,
    account: Jid,
    route: DeviceRoute,
}

impl MqttSession {
    /// Connects to the broker and subscribes to the robot's topics.
    ///
    /// # Arguments
    ///
    /// * `broker_url` - The broker URL (e.g., `mqtts://mq-eu.ecouser.net:8883`)
    /// * `account` - The account address; also used as client id
    /// * `secret` - The account secret or session token
    /// * `route` - The robot to follow
    ///
    /// # Errors
    ///
    /// Returns error if the URL is invalid or subscribing fails.
    pub async fn connect(
        broker_url: &str,
        account: Jid,
        secret: &str,
        route: DeviceRoute,
    ) -> Result<(Self, mpsc::Receiver<Inbound>), ProtocolError> {
        let broker = parse_mqtt_url(broker_url)?;

        let mut mqtt_options = MqttOptions::new(account.to_string(), broker.host, broker.port);
        mqtt_options.set_keep_alive(Duration::from_secs(30));
        mqtt_options.set_clean_session(true);
        mqtt_options.set_credentials(account.bare(), secret);
        if broker.tls {
            mqtt_options.set_transport(rumqttc::Transport::tls_with_default_config());
        }

        let (client, event_loop) = AsyncClient::new(mqtt_options, 10);
        let (inbound_tx, inbound_rx) = mpsc::channel::<Inbound>(INBOUND_CAPACITY);

        for topic in [report_filter(&route), reply_filter(&account, &route)] {
            client
                .subscribe(&topic, QoS::AtLeastOnce)
                .await
                .map_err(ProtocolError::Mqtt)?;
        }

        tokio::spawn(async move {
            handle_mqtt_events(event_loop, inbound_tx).await;
        });

        // Let the broker process CONNECT and SUBSCRIBE before the first request.
        tokio::time::sleep(Duration::from_millis(500)).await;

        Ok((
            Self {
                client,
                account,
                route,
            },
            inbound_rx,
        ))
    }

    /// Returns the robot route.
    #[must_use]
    pub fn route(&self) -> &DeviceRoute {
        &self.route
    }

    /// Disconnects from the broker.
    ///
    /// # Errors
    ///
    /// Returns error if the disconnect request cannot be queued.
    pub async fn disconnect(&self) -> Result<(), ProtocolError> {
        self.client
            .disconnect()
            .await
            .map_err(ProtocolError::Mqtt)
    }
}

impl Transport for MqttSession {
    async fn send(&self, envelope: &Envelope) -> Result<Option<Inbound>, ProtocolError> {
        if envelope.is_liveness() {
            tracing::trace!(id = envelope.id(), "Broker keep-alive covers liveness");
            return Ok(None);
        }

        let command = envelope.command_name().ok_or_else(|| {
            ProtocolError::InvalidAddress("envelope payload has no command name".to_string())
        })?;
        let topic = request_topic(command, &self.account, &self.route, envelope.id());
        let payload = envelope.to_xml();

        tracing::debug!(topic = %topic, payload = %payload, "Publishing MQTT request");

        self.client
            .publish(&topic, QoS::AtLeastOnce, false, payload)
            .await
            .map_err(ProtocolError::Mqtt)?;
        Ok(None)
    }
}

/// Parsed broker address.
#[derive(Debug, PartialEq, Eq)]
struct BrokerAddress {
    host: String,
    port: u16,
    tls: bool,
}

/// Parses an MQTT URL into host, port and TLS flag.
fn parse_mqtt_url(url: &str) -> Result<BrokerAddress, ProtocolError> {
    let (rest, tls) = if let Some(rest) = url
        .strip_prefix("mqtts://")
        .or_else(|| url.strip_prefix("ssl://"))
    {
        (rest, true)
    } else {
        let rest = url
            .strip_prefix("mqtt://")
            .or_else(|| url.strip_prefix("tcp://"))
            .unwrap_or(url);
        (rest, false)
    };
    let rest = rest.trim_end_matches('/');

    let (host, port) = if let Some((h, p)) = rest.rsplit_once(':') {
        let port = p
            .parse()
            .map_err(|_| ProtocolError::InvalidAddress(format!("Invalid port: {p}")))?;
        (h.to_string(), port)
    } else {
        (rest.to_string(), if tls { 8883 } else { 1883 })
    };

    if host.is_empty() {
        return Err(ProtocolError::InvalidAddress(format!(
            "Missing broker host: {url}"
        )));
    }

    Ok(BrokerAddress { host, port, tls })
}

fn report_filter(route: &DeviceRoute) -> String {
    format!(
        "iot/atr/+/{}/{}/{}/+",
        route.did, route.class, route.resource
    )
}

fn reply_filter(account: &Jid, route: &DeviceRoute) -> String {
    format!(
        "iot/p2p/+/{}/{}/{}/{}/{}/{}/+/+/+",
        route.did, route.class, route.resource, account.user, account.host, account.resource
    )
}

fn request_topic(command: &str, account: &Jid, route: &DeviceRoute, id: u64) -> String {
    format!(
        "iot/p2p/{command}/{}/{}/{}/{}/{}/{}/q/{id}/x",
        account.user, account.host, account.resource, route.did, route.class, route.resource
    )
}

/// Decodes a published report or reply.
///
/// The third topic segment names the event and becomes the fragment's type
/// token unless the payload carries one.
fn decode_publish(topic: &str, payload: &[u8]) -> Option<Inbound> {
    let segments: Vec<&str> = topic.split('/').collect();
    let [first, "atr" | "p2p", event, ..] = segments.as_slice() else {
        tracing::debug!(topic = %topic, "Ignoring MQTT message on foreign topic");
        return None;
    };
    if *first != "iot" || event.is_empty() {
        return None;
    }
    if segments.get(9) == Some(&"q") {
        return None;
    }

    let text = match std::str::from_utf8(payload) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(topic = %topic, error = %e, "Dropping non-UTF-8 MQTT payload");
            return None;
        }
    };

    match Fragment::decode(text) {
        Ok(fragment) => Some(Inbound::Message(fragment.with_type_token(*event))),
        Err(e) => {
            tracing::warn!(topic = %topic, error = %e, "Dropping undecodable MQTT payload");
            None
        }
    }
}

/// Handles MQTT events in the background.
async fn handle_mqtt_events(mut event_loop: EventLoop, inbound_tx: mpsc::Sender<Inbound>) {
    use rumqttc::{Event, Packet};

    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(connack))) => {
                tracing::debug!(?connack, "MQTT connected");
            }
            Ok(Event::Incoming(Packet::SubAck(suback))) => {
                tracing::debug!(?suback, "MQTT subscription acknowledged");
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                tracing::debug!(topic = %publish.topic, "Received MQTT message");
                if let Some(inbound) = decode_publish(&publish.topic, &publish.payload)
                    && inbound_tx.send(inbound).await.is_err()
                {
                    tracing::debug!("Inbound receiver dropped, stopping MQTT event loop");
                    break;
                }
            }
            Ok(Event::Outgoing(rumqttc::Outgoing::Disconnect)) => {
                tracing::debug!("MQTT disconnect sent");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!(error = %e, "MQTT event loop error");
                break;
            }
        }
    }
}
