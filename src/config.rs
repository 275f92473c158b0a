// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Adapter configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::protocol::{DeviceRoute, Jid};

/// Company of robots reached over the MQTT broker and the portal REST API.
pub const MQTT_COMPANY: &str = "eco-ng";

/// Configuration for one robot and the account that controls it.
///
/// Server addresses default to the vendor endpoints of the configured
/// continent; every default can be overridden.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use vacbot_lib::VacBotConfig;
///
/// let config = VacBotConfig::new("user", "ecouser.net", "secret", "E0001", "126")
///     .with_continent("eu")
///     .with_liveness_period(Duration::from_secs(60));
///
/// assert_eq!(config.server_address(), "msg-eu.ecouser.net");
/// assert_eq!(config.server_port(), 5223);
/// assert_eq!(config.vacuum_address(), "E0001@126.ecorobot.net/atom");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacBotConfig {
    user: String,
    host: String,
    secret: String,
    #[serde(default = "random_resource")]
    resource: String,
    #[serde(default = "default_continent")]
    continent: String,
    did: String,
    class: String,
    #[serde(default)]
    company: Option<String>,
    #[serde(default = "default_device_resource")]
    device_resource: String,
    #[serde(default)]
    server_address: Option<String>,
    #[serde(default)]
    server_port: Option<u16>,
    #[serde(default)]
    portal_url: Option<String>,
    #[serde(default)]
    mqtt_broker: Option<String>,
    #[serde(default = "default_liveness_secs")]
    liveness_period_secs: u64,
    #[serde(default = "default_event_capacity")]
    event_capacity: usize,
}

impl VacBotConfig {
    /// Default push-session port.
    pub const DEFAULT_SERVER_PORT: u16 = 5223;
    /// Default continent code.
    pub const DEFAULT_CONTINENT: &'static str = "ww";
    /// Default device resource.
    pub const DEFAULT_DEVICE_RESOURCE: &'static str = "atom";
    /// Default liveness period.
    pub const DEFAULT_LIVENESS_PERIOD: Duration = Duration::from_secs(30);

    /// Creates a configuration for the robot `did` of model `class`.
    ///
    /// # Arguments
    ///
    /// * `user` - Account user id
    /// * `host` - Account realm (e.g. `ecouser.net`)
    /// * `secret` - Account secret or session token
    /// * `did` - Device id
    /// * `class` - Device class (model code)
    #[must_use]
    pub fn new(
        user: impl Into<String>,
        host: impl Into<String>,
        secret: impl Into<String>,
        did: impl Into<String>,
        class: impl Into<String>,
    ) -> Self {
        Self {
            user: user.into(),
            host: host.into(),
            secret: secret.into(),
            resource: random_resource(),
            continent: default_continent(),
            did: did.into(),
            class: class.into(),
            company: None,
            device_resource: default_device_resource(),
            server_address: None,
            server_port: None,
            portal_url: None,
            mqtt_broker: None,
            liveness_period_secs: default_liveness_secs(),
            event_capacity: default_event_capacity(),
        }
    }

    /// Sets the continent code used to derive server addresses.
    #[must_use]
    pub fn with_continent(mut self, continent: impl Into<String>) -> Self {
        self.continent = continent.into().to_ascii_lowercase();
        self
    }

    /// Sets the session resource.
    #[must_use]
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = resource.into();
        self
    }

    /// Sets the device company.
    ///
    /// `eco-ng` devices are reached over MQTT and the portal REST API.
    #[must_use]
    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    /// Sets the device resource.
    #[must_use]
    pub fn with_device_resource(mut self, resource: impl Into<String>) -> Self {
        self.device_resource = resource.into();
        self
    }

    /// Overrides the push-session server address and port.
    #[must_use]
    pub fn with_server(mut self, address: impl Into<String>, port: u16) -> Self {
        self.server_address = Some(address.into());
        self.server_port = Some(port);
        self
    }

    /// Overrides the portal base URL.
    #[must_use]
    pub fn with_portal_url(mut self, url: impl Into<String>) -> Self {
        self.portal_url = Some(url.into());
        self
    }

    /// Overrides the MQTT broker URL.
    #[must_use]
    pub fn with_mqtt_broker(mut self, url: impl Into<String>) -> Self {
        self.mqtt_broker = Some(url.into());
        self
    }

    /// Sets the liveness ping period.
    #[must_use]
    pub fn with_liveness_period(mut self, period: Duration) -> Self {
        self.liveness_period_secs = period.as_secs();
        self
    }

    /// Sets the capacity of the event broadcast channel.
    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Returns the account user id.
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Returns the account realm.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the account secret.
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Returns the session resource.
    #[must_use]
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Returns the continent code.
    #[must_use]
    pub fn continent(&self) -> &str {
        &self.continent
    }

    /// Returns the device id.
    #[must_use]
    pub fn did(&self) -> &str {
        &self.did
    }

    /// Returns the device class.
    #[must_use]
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Returns the device company, if set.
    #[must_use]
    pub fn company(&self) -> Option<&str> {
        self.company.as_deref()
    }

    /// Returns the push-session server address.
    #[must_use]
    pub fn server_address(&self) -> String {
        self.server_address
            .clone()
            .unwrap_or_else(|| format!("msg-{}.ecouser.net", self.continent))
    }

    /// Returns the push-session server port.
    #[must_use]
    pub fn server_port(&self) -> u16 {
        self.server_port.unwrap_or(Self::DEFAULT_SERVER_PORT)
    }

    /// Returns the portal base URL.
    #[must_use]
    pub fn portal_url(&self) -> String {
        self.portal_url
            .clone()
            .unwrap_or_else(|| format!("https://portal-{}.ecouser.net", self.continent))
    }

    /// Returns the MQTT broker URL.
    #[must_use]
    pub fn mqtt_broker(&self) -> String {
        self.mqtt_broker
            .clone()
            .unwrap_or_else(|| format!("mqtts://mq-{}.ecouser.net:8883", self.continent))
    }

    /// Returns the liveness ping period.
    #[must_use]
    pub fn liveness_period(&self) -> Duration {
        Duration::from_secs(self.liveness_period_secs)
    }

    /// Returns the capacity of the event broadcast channel.
    #[must_use]
    pub fn event_capacity(&self) -> usize {
        self.event_capacity
    }

    /// Returns the account address.
    #[must_use]
    pub fn account(&self) -> Jid {
        Jid::new(&self.user, &self.host, &self.resource)
    }

    /// Returns the robot route.
    #[must_use]
    pub fn route(&self) -> DeviceRoute {
        DeviceRoute {
            did: self.did.clone(),
            class: self.class.clone(),
            resource: self.device_resource.clone(),
        }
    }

    /// Returns `true` for devices reached over MQTT and the portal REST API.
    #[must_use]
    pub fn uses_mqtt(&self) -> bool {
        self.company.as_deref() == Some(MQTT_COMPANY)
    }

    /// Returns the recipient address of outbound envelopes.
    #[must_use]
    pub fn vacuum_address(&self) -> String {
        if self.uses_mqtt() {
            self.did.clone()
        } else {
            self.route().push_address()
        }
    }

    /// Checks that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for empty required fields, a non-alphanumeric
    /// continent, a zero liveness period or a zero event capacity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("user", &self.user),
            ("host", &self.host),
            ("secret", &self.secret),
            ("resource", &self.resource),
            ("did", &self.did),
            ("class", &self.class),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ConfigError::MissingField(*field));
        }

        if self.continent.is_empty() || !self.continent.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(ConfigError::InvalidValue {
                field: "continent",
                message: format!("expected a continent code, got {:?}", self.continent),
            });
        }

        if self.liveness_period_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "liveness_period",
                message: "must be at least one second".to_string(),
            });
        }

        if self.event_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "event_capacity",
                message: "must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}

fn random_resource() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

fn default_continent() -> String {
    VacBotConfig::DEFAULT_CONTINENT.to_string()
}

fn default_device_resource() -> String {
    VacBotConfig::DEFAULT_DEVICE_RESOURCE.to_string()
}

fn default_liveness_secs() -> u64 {
    VacBotConfig::DEFAULT_LIVENESS_PERIOD.as_secs()
}

fn default_event_capacity() -> usize {
    crate::event::DEFAULT_CHANNEL_CAPACITY
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> VacBotConfig {
        VacBotConfig::new("user", "ecouser.net", "secret", "E0001", "126")
    }

    #[test]
    fn defaults() {
        let config = config();
        assert_eq!(config.continent(), "ww");
        assert_eq!(config.resource().len(), 8);
        assert_eq!(config.server_address(), "msg-ww.ecouser.net");
        assert_eq!(config.server_port(), 5223);
        assert_eq!(config.portal_url(), "https://portal-ww.ecouser.net");
        assert_eq!(config.mqtt_broker(), "mqtts://mq-ww.ecouser.net:8883");
        assert_eq!(config.liveness_period(), Duration::from_secs(30));
        assert_eq!(config.event_capacity(), 256);
        assert!(!config.uses_mqtt());
    }

    #[test]
    fn resources_are_random() {
        assert_ne!(config().resource(), config().resource());
    }

    #[test]
    fn continent_derives_addresses() {
        let config = config().with_continent("EU");
        assert_eq!(config.continent(), "eu");
        assert_eq!(config.portal_url(), "https://portal-eu.ecouser.net");
        assert_eq!(config.mqtt_broker(), "mqtts://mq-eu.ecouser.net:8883");
    }

    #[test]
    fn overrides_win() {
        let config = config()
            .with_server("127.0.0.1", 15223)
            .with_portal_url("http://127.0.0.1:8080")
            .with_mqtt_broker("mqtt://127.0.0.1:1883");
        assert_eq!(config.server_address(), "127.0.0.1");
        assert_eq!(config.server_port(), 15223);
        assert_eq!(config.portal_url(), "http://127.0.0.1:8080");
        assert_eq!(config.mqtt_broker(), "mqtt://127.0.0.1:1883");
    }

    #[test]
    fn addressing() {
        let config = config().with_resource("r1");
        assert_eq!(config.account().to_string(), "user@ecouser.net/r1");
        assert_eq!(config.vacuum_address(), "E0001@126.ecorobot.net/atom");

        let config = config.with_company(MQTT_COMPANY).with_device_resource("Gy2C");
        assert!(config.uses_mqtt());
        assert_eq!(config.vacuum_address(), "E0001");
        assert_eq!(config.route().resource, "Gy2C");
    }

    #[test]
    fn validate_reports_missing_fields() {
        let config = VacBotConfig::new("user", "ecouser.net", "secret", "", "126");
        assert_eq!(config.validate(), Err(ConfigError::MissingField("did")));

        let config = VacBotConfig::new("user", "ecouser.net", " ", "E0001", "126");
        assert_eq!(config.validate(), Err(ConfigError::MissingField("secret")));
    }

    #[test]
    fn validate_rejects_bad_values() {
        assert!(matches!(
            config().with_continent("e/u").validate(),
            Err(ConfigError::InvalidValue { field: "continent", .. })
        ));
        assert!(matches!(
            config().with_event_capacity(0).validate(),
            Err(ConfigError::InvalidValue { field: "event_capacity", .. })
        ));
        assert!(matches!(
            config().with_liveness_period(Duration::from_millis(500)).validate(),
            Err(ConfigError::InvalidValue { field: "liveness_period", .. })
        ));
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: VacBotConfig = serde_json::from_str(
            r#"{"user":"u","host":"ecouser.net","secret":"s","did":"E1","class":"126","continent":"na"}"#,
        )
        .unwrap();
        assert_eq!(config.portal_url(), "https://portal-na.ecouser.net");
        assert_eq!(config.resource().len(), 8);
        assert_eq!(config.event_capacity(), 256);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn serde_round_trip_keeps_overrides() {
        let config = config().with_company(MQTT_COMPANY).with_server("h", 1);
        let json = serde_json::to_string(&config).unwrap();
        let back: VacBotConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
