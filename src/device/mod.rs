// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! High-level robot adapter.
//!
//! [`VacBot`] owns the canonical state of one robot and wires every inbound
//! message through classification, projection and event emission, whatever
//! transport delivered it.
//!
//! # Transports
//!
//! ## HTTP
//!
//! Request/response only: replies to queries are processed as soon as
//! [`VacBot::send_command`] returns.
//!
//! ```no_run
//! use vacbot_lib::command::QueryCommand;
//! use vacbot_lib::{VacBot, VacBotConfig};
//!
//! # async fn example() -> vacbot_lib::Result<()> {
//! let config = VacBotConfig::new("user", "ecouser.net", "token", "E0001", "ls1ok3")
//!     .with_company("eco-ng")
//!     .with_continent("eu");
//! let bot = VacBot::http(config)?;
//!
//! bot.send_command(&QueryCommand::GetBatteryInfo).await?;
//! println!("battery: {:?}", bot.state().battery_level());
//! # Ok(())
//! # }
//! ```
//!
//! ## MQTT
//!
//! Reports are pushed by the robot and arrive on the receiver returned by
//! [`VacBot::mqtt`]; [`VacBot::pump`] drains it.
//!
//! ```no_run
//! use std::sync::Arc;
//! use vacbot_lib::subscription::Subscribable;
//! use vacbot_lib::{VacBot, VacBotConfig};
//!
//! # async fn example() -> vacbot_lib::Result<()> {
//! let config = VacBotConfig::new("user", "ecouser.net", "token", "E0001", "ls1ok3")
//!     .with_company("eco-ng");
//! let (bot, inbound) = VacBot::mqtt(config).await?;
//! let bot = Arc::new(bot);
//!
//! bot.on_event("CleanReport", |event| println!("{event:?}"));
//!
//! let pump = Arc::clone(&bot);
//! tokio::spawn(async move { pump.pump(inbound).await });
//! # Ok(())
//! # }
//! ```

mod connect;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use tokio::sync::{broadcast, mpsc};

use crate::classify::{self, MessageKind};
use crate::command::Command;
use crate::config::VacBotConfig;
use crate::error::{Error, Result};
use crate::event::{DeviceEvent, EventBus, emit};
use crate::fragment::Fragment;
use crate::protocol::{EnvelopeCodec, Inbound, Transport, stanza};
use crate::state::{DeviceState, StateChange, project};
use crate::subscription::{CallbackRegistry, Subscribable, SubscriptionId};

/// Adapter for one robot over one transport.
#[derive(Debug)]
pub struct VacBot<T: Transport> {
    config: VacBotConfig,
    transport: T,
    codec: EnvelopeCodec,
    recipient: String,
    state: Arc<RwLock<DeviceState>>,
    events: EventBus,
    callbacks: Arc<CallbackRegistry>,
    connected: AtomicBool,
}

impl<T: Transport> VacBot<T> {
    /// Creates an adapter over an already connected transport.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid.
    pub fn new(config: VacBotConfig, transport: T) -> Result<Self> {
        config.validate()?;
        let codec = EnvelopeCodec::new(config.account());
        let recipient = config.vacuum_address();
        let events = EventBus::with_capacity(config.event_capacity());

        tracing::debug!(
            sender = %codec.sender(),
            recipient = %recipient,
            "Created robot adapter"
        );

        Ok(Self {
            config,
            transport,
            codec,
            recipient,
            state: Arc::new(RwLock::new(DeviceState::new())),
            events,
            callbacks: Arc::new(CallbackRegistry::new()),
            connected: AtomicBool::new(true),
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &VacBotConfig {
        &self.config
    }

    /// Returns the transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns a snapshot of the current device state.
    #[must_use]
    pub fn state(&self) -> DeviceState {
        self.state.read().clone()
    }

    /// Returns `true` until [`disconnect`](Self::disconnect) is called.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Subscribes to the event broadcast channel.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
        self.events.subscribe()
    }

    // ========== Inbound ==========

    /// Processes an inbound transport message.
    ///
    /// Returns the events it fired, in emission order.
    pub fn handle_inbound(&self, inbound: &Inbound) -> Vec<DeviceEvent> {
        let kind = classify::classify_inbound(inbound);
        self.process(kind, inbound.fragment())
    }

    /// Processes a robot message.
    ///
    /// Returns the events it fired, in emission order.
    pub fn handle_fragment(&self, fragment: &Fragment) -> Vec<DeviceEvent> {
        self.process(classify::classify(fragment), fragment)
    }

    /// Decodes and processes an `iq` stanza of a push session.
    ///
    /// # Errors
    ///
    /// Returns error if the stanza is not well-formed XML.
    pub fn handle_stanza(&self, xml: &str) -> Result<Vec<DeviceEvent>> {
        Ok(stanza::decode(xml)?
            .map(|inbound| self.handle_inbound(&inbound))
            .unwrap_or_default())
    }

    /// Processes inbound messages until the channel closes.
    ///
    /// A closed channel while connected means the transport is gone and
    /// disconnects the adapter.
    pub async fn pump(&self, mut inbound: mpsc::Receiver<Inbound>) {
        while let Some(message) = inbound.recv().await {
            if !self.is_connected() {
                break;
            }
            self.handle_inbound(&message);
        }
        if self.is_connected() {
            tracing::warn!("Inbound channel closed");
            self.disconnect();
        }
    }

    fn process(&self, kind: MessageKind, fragment: &Fragment) -> Vec<DeviceEvent> {
        if !self.is_connected() {
            tracing::debug!(kind = %kind, "Ignoring message after disconnect");
            return Vec::new();
        }
        if !kind.is_known() {
            tracing::debug!(fragment = %fragment, "Unknown message");
            return Vec::new();
        }

        let (changes, events) = {
            let mut state = self.state.write();
            let projection = project(kind, fragment, &state);
            if projection.is_empty() {
                tracing::trace!(kind = %kind, "Message changed nothing");
                return Vec::new();
            }
            let events = emit(kind, &projection.changes, &projection.state);
            *state = projection.state;
            (projection.changes, events)
        };

        tracing::debug!(kind = %kind, changes = changes.len(), events = events.len(), "Message projected");

        for change in &changes {
            self.callbacks.dispatch_state_change(change);
        }
        for event in &events {
            self.events.publish(event.clone());
            self.callbacks.dispatch(event);
        }
        events
    }

    // ========== Outbound ==========

    /// Sends a control payload and processes the reply, if the transport
    /// returns one.
    ///
    /// # Errors
    ///
    /// Returns error if the adapter is disconnected or the transport fails.
    pub async fn send(&self, payload: Fragment) -> Result<Vec<DeviceEvent>> {
        self.ensure_connected()?;
        let envelope = self.codec.wrap(payload, &self.recipient);
        tracing::debug!(id = envelope.id(), command = ?envelope.command_name(), "Sending request");

        let reply = self.transport.send(&envelope).await?;
        Ok(reply
            .map(|inbound| self.handle_inbound(&inbound))
            .unwrap_or_default())
    }

    /// Sends a command and processes the reply, if the transport returns one.
    ///
    /// # Errors
    ///
    /// Returns error if the adapter is disconnected or the transport fails.
    pub async fn send_command<C: Command>(&self, command: &C) -> Result<Vec<DeviceEvent>> {
        self.send(command.to_fragment()).await
    }

    /// Sends one liveness ping.
    ///
    /// # Errors
    ///
    /// Returns error if the adapter is disconnected or the transport fails.
    pub async fn send_ping(&self) -> Result<()> {
        self.ensure_connected()?;
        let envelope = self.codec.liveness(&self.recipient);
        tracing::trace!(id = envelope.id(), "Sending liveness ping");
        if let Some(reply) = self.transport.send(&envelope).await? {
            self.handle_inbound(&reply);
        }
        Ok(())
    }

    /// Sends a liveness ping every configured period until disconnected.
    ///
    /// Failed pings are logged; the loop keeps running.
    pub async fn keep_alive(&self) {
        let mut interval = tokio::time::interval(self.config.liveness_period());
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately.
        interval.tick().await;

        loop {
            interval.tick().await;
            match self.send_ping().await {
                Ok(()) => {}
                Err(Error::NotConnected) => break,
                Err(e) => tracing::warn!(error = %e, "Liveness ping failed"),
            }
        }
        tracing::debug!("Liveness loop stopped");
    }

    /// Disconnects the adapter.
    ///
    /// Discards the device state and notifies disconnection callbacks.
    /// Subsequent sends fail with [`Error::NotConnected`]. Calling it again
    /// has no effect.
    pub fn disconnect(&self) {
        if !self.connected.swap(false, Ordering::AcqRel) {
            return;
        }
        self.state.write().clear();
        tracing::info!(recipient = %self.recipient, "Robot adapter disconnected");
        self.callbacks.dispatch_disconnected();
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(Error::NotConnected)
        }
    }
}

impl<T: Transport> Subscribable for VacBot<T> {
    fn on_event<F>(&self, name: &str, callback: F) -> SubscriptionId
    where
        F: Fn(&DeviceEvent) + Send + Sync + 'static,
    {
        self.callbacks.on_event(name, callback)
    }

    fn on_any_event<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&DeviceEvent) + Send + Sync + 'static,
    {
        self.callbacks.on_any_event(callback)
    }

    fn on_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&StateChange) + Send + Sync + 'static,
    {
        self.callbacks.on_state_changed(callback)
    }

    fn on_disconnected<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.callbacks.on_disconnected(callback)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.callbacks.unsubscribe(id)
    }
}
