// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Request/response channel over the vendor portal REST API.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{ParseError, ProtocolError};
use crate::fragment::Fragment;
use crate::protocol::{DeviceRoute, Envelope, Inbound, RestAuth, Transport};

/// Path of the device manager endpoint below the portal base URL.
pub const DEVMANAGER_PATH: &str = "/api/iot/devmanager.do";

/// HTTP channel delivering envelopes to one robot through the portal.
///
/// Every request is an independent POST; the reply to a query is returned
/// directly from [`Transport::send`].
///
/// # Examples
///
/// ```no_run
/// use vacbot_lib::fragment::Fragment;
/// use vacbot_lib::protocol::{
///     DeviceRoute, EnvelopeCodec, HttpChannel, Jid, RestAuth, Transport,
/// };
///
/// # async fn example() -> vacbot_lib::Result<()> {
/// let account = Jid::new("me", "ecouser.net", "r1");
/// let route = DeviceRoute {
///     did: "E0001".into(),
///     class: "ls1ok3".into(),
///     resource: "atom".into(),
/// };
/// let channel = HttpChannel::new(
///     "https://portal-eu.ecouser.net",
///     RestAuth::new(&account, "token"),
///     route,
/// )?;
///
/// let codec = EnvelopeCodec::new(account);
/// let envelope = codec.wrap(
///     Fragment::named("ctl").with_attr("td", "GetBatteryInfo"),
///     "E0001",
/// );
/// let reply = channel.send(&envelope).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpChannel {
    endpoint: String,
    client: Client,
    auth: RestAuth,
    route: DeviceRoute,
}

impl HttpChannel {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a channel for the portal at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is empty or the HTTP client cannot be
    /// created.
    pub fn new(
        base_url: impl Into<String>,
        auth: RestAuth,
        route: DeviceRoute,
    ) -> Result<Self, ProtocolError> {
        Self::with_timeout(base_url, auth, route, Self::DEFAULT_TIMEOUT)
    }

    /// Creates a channel with a custom request timeout.
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is empty or the HTTP client cannot be
    /// created.
    pub fn with_timeout(
        base_url: impl Into<String>,
        auth: RestAuth,
        route: DeviceRoute,
        timeout: Duration,
    ) -> Result<Self, ProtocolError> {
        let base_url = base_url.into();
        let base_url = base_url.trim_end_matches('/');
        if base_url.is_empty() {
            return Err(ProtocolError::InvalidAddress(
                "portal base URL is empty".to_string(),
            ));
        }
        let base_url = if base_url.starts_with("http://") || base_url.starts_with("https://") {
            base_url.to_string()
        } else {
            format!("https://{base_url}")
        };

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ProtocolError::Http)?;

        Ok(Self {
            endpoint: format!("{base_url}{DEVMANAGER_PATH}"),
            client,
            auth,
            route,
        })
    }

    /// Returns the full endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns the robot route.
    #[must_use]
    pub fn route(&self) -> &DeviceRoute {
        &self.route
    }
}

impl Transport for HttpChannel {
    async fn send(&self, envelope: &Envelope) -> Result<Option<Inbound>, ProtocolError> {
        if envelope.is_liveness() {
            tracing::trace!(id = envelope.id(), "Skipping liveness ping on HTTP channel");
            return Ok(None);
        }

        let body = envelope.to_rest_request(&self.route, &self.auth);
        let command = envelope.command_name().unwrap_or_default();

        tracing::debug!(url = %self.endpoint, command = %command, id = envelope.id(), "Sending HTTP request");

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("mid", self.route.class.as_str()), ("did", self.route.did.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(ProtocolError::Http)?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ProtocolError::AuthenticationFailed);
        }

        if !response.status().is_success() {
            return Err(ProtocolError::ConnectionFailed(format!(
                "HTTP {} - {}",
                response.status().as_u16(),
                response.status().canonical_reason().unwrap_or("Unknown")
            )));
        }

        let text = response.text().await.map_err(ProtocolError::Http)?;

        tracing::debug!(body = %text, "Received HTTP response");

        let reply: RestReply = serde_json::from_str(&text).map_err(ParseError::Json)?;
        reply.into_inbound(command)
    }
}

/// JSON body of a portal reply.
#[derive(Debug, Deserialize)]
struct RestReply {
    ret: String,
    #[serde(default)]
    resp: Option<Value>,
    #[serde(default)]
    errno: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

impl RestReply {
    fn into_inbound(self, command: &str) -> Result<Option<Inbound>, ProtocolError> {
        match self.ret.as_str() {
            "ok" => {
                let fragment = match self.resp {
                    Some(Value::String(text)) if !text.trim().is_empty() => {
                        Fragment::decode(&text)?
                    }
                    Some(value @ Value::Object(_)) => Fragment::from_value(&value)?,
                    Some(Value::Null | Value::String(_)) | None => return Ok(None),
                    Some(other) => {
                        return Err(ParseError::UnexpectedFormat(format!(
                            "unsupported resp value: {other}"
                        ))
                        .into());
                    }
                };
                let fragment = if command.is_empty() {
                    fragment
                } else {
                    fragment.with_type_token(command)
                };
                Ok(Some(Inbound::Message(fragment)))
            }
            "fail" => {
                let mut fragment = Fragment::named("error");
                if let Some(errno) = self.errno.as_ref().and_then(scalar_text) {
                    fragment = fragment.with_attr("errno", errno);
                }
                if let Some(error) = self.error {
                    fragment = fragment.with_attr("error", error);
                }
                tracing::warn!(command = %command, error = %fragment, "Portal reported a delivery failure");
                Ok(Some(Inbound::DeliveryError(fragment)))
            }
            other => Err(ParseError::UnexpectedFormat(format!("unknown ret value: {other}")).into()),
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
