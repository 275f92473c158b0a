// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Constructors for the bundled transports.

#[cfg(feature = "mqtt")]
use tokio::sync::mpsc;

use crate::config::VacBotConfig;
use crate::device::VacBot;
use crate::error::Result;
#[cfg(feature = "http")]
use crate::protocol::{HttpChannel, RestAuth};
#[cfg(feature = "mqtt")]
use crate::protocol::{Inbound, MqttSession};

#[cfg(feature = "http")]
impl VacBot<HttpChannel> {
    /// Creates an adapter over the portal REST API.
    ///
    /// The configured secret is sent as the session token.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid or the HTTP client
    /// cannot be created.
    pub fn http(config: VacBotConfig) -> Result<Self> {
        config.validate()?;
        let auth = RestAuth::new(&config.account(), config.secret());
        let channel = HttpChannel::new(config.portal_url(), auth, config.route())?;
        tracing::debug!(endpoint = %channel.endpoint(), "Using HTTP channel");
        Self::new(config, channel)
    }
}

#[cfg(feature = "mqtt")]
impl VacBot<MqttSession> {
    /// Connects to the MQTT broker and creates an adapter over the session.
    ///
    /// Pass the returned receiver to [`VacBot::pump`] to process pushed
    /// reports.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid or the connection fails.
    pub async fn mqtt(config: VacBotConfig) -> Result<(Self, mpsc::Receiver<Inbound>)> {
        config.validate()?;
        let broker = config.mqtt_broker();
        let (session, inbound) =
            MqttSession::connect(&broker, config.account(), config.secret(), config.route())
                .await?;
        tracing::debug!(broker = %broker, "Using MQTT session");
        Ok((Self::new(config, session)?, inbound))
    }

    /// Disconnects the adapter and closes the broker session.
    ///
    /// # Errors
    ///
    /// Returns error if the broker disconnect cannot be queued.
    pub async fn close(&self) -> Result<()> {
        self.disconnect();
        self.transport().disconnect().await?;
        Ok(())
    }
}
