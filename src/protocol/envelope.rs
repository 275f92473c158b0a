// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Outbound request envelopes.
//!
//! Every request to the robot is an `iq` envelope carrying a per-session
//! request id, the sender and recipient addresses, and either a `com:ctl`
//! payload or a ping. The push session sends the envelope as XML; the
//! request/response channel sends a JSON body built from the same envelope.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::fragment::{Fragment, xml_escape};

/// Namespace of control payloads.
pub const CONTROL_NAMESPACE: &str = "com:ctl";

/// Namespace of liveness pings.
pub const PING_NAMESPACE: &str = "urn:xmpp:ping";

/// Domain suffix of push-session robot addresses.
const ROBOT_DOMAIN: &str = "ecorobot.net";

/// An account address (`user@host/resource`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Jid {
    /// Account user id.
    pub user: String,
    /// Account realm (e.g. `ecouser.net`).
    pub host: String,
    /// Session resource.
    pub resource: String,
}

impl Jid {
    /// Creates an account address.
    #[must_use]
    pub fn new(
        user: impl Into<String>,
        host: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            user: user.into(),
            host: host.into(),
            resource: resource.into(),
        }
    }

    /// Returns the address without the resource (`user@host`).
    #[must_use]
    pub fn bare(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }
}

impl fmt::Display for Jid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}/{}", self.user, self.host, self.resource)
    }
}

/// Routing information of one robot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct DeviceRoute {
    /// Device id.
    pub did: String,
    /// Device class (model code).
    pub class: String,
    /// Device resource.
    pub resource: String,
}

impl DeviceRoute {
    /// Returns the push-session address (`did@class.ecorobot.net/resource`).
    #[must_use]
    pub fn push_address(&self) -> String {
        format!(
            "{}@{}.{ROBOT_DOMAIN}/{}",
            self.did, self.class, self.resource
        )
    }
}

/// Kind of `iq` envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvelopeKind {
    /// A control request carrying a payload.
    Set,
    /// A liveness ping.
    Get,
}

impl EnvelopeKind {
    /// Returns the `iq` type attribute.
    #[must_use]
    pub const fn iq_type(&self) -> &'static str {
        match self {
            Self::Set => "set",
            Self::Get => "get",
        }
    }

    /// Returns the namespace of the `query` element.
    #[must_use]
    pub const fn namespace(&self) -> &'static str {
        match self {
            Self::Set => CONTROL_NAMESPACE,
            Self::Get => PING_NAMESPACE,
        }
    }
}

/// A single outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    id: u64,
    kind: EnvelopeKind,
    from: String,
    to: String,
    payload: Option<Fragment>,
}

impl Envelope {
    /// Returns the request id.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns the envelope kind.
    #[must_use]
    pub fn kind(&self) -> EnvelopeKind {
        self.kind
    }

    /// Returns `true` for liveness pings.
    #[must_use]
    pub fn is_liveness(&self) -> bool {
        self.kind == EnvelopeKind::Get
    }

    /// Returns the sender address.
    #[must_use]
    pub fn from(&self) -> &str {
        &self.from
    }

    /// Returns the recipient address.
    #[must_use]
    pub fn to(&self) -> &str {
        &self.to
    }

    /// Returns the wrapped payload.
    #[must_use]
    pub fn payload(&self) -> Option<&Fragment> {
        self.payload.as_ref()
    }

    /// Returns the command name carried by the payload's type token.
    #[must_use]
    pub fn command_name(&self) -> Option<&str> {
        self.payload.as_ref().and_then(Fragment::type_token)
    }

    /// Serializes the envelope as an `iq` stanza.
    ///
    /// # Examples
    ///
    /// ```
    /// use vacbot_lib::fragment::Fragment;
    /// use vacbot_lib::protocol::{EnvelopeCodec, Jid};
    ///
    /// let codec = EnvelopeCodec::new(Jid::new("me", "ecouser.net", "abc"));
    /// let envelope = codec.wrap(
    ///     Fragment::named("ctl").with_attr("td", "GetBatteryInfo"),
    ///     "E0001@126.ecorobot.net/atom",
    /// );
    ///
    /// assert_eq!(
    ///     envelope.to_xml(),
    ///     "<iq id=\"1\" to=\"E0001@126.ecorobot.net/atom\" from=\"me@ecouser.net/abc\" \
    ///      type=\"set\"><query xmlns=\"com:ctl\"><ctl td=\"GetBatteryInfo\"/></query></iq>"
    /// );
    /// ```
    #[must_use]
    pub fn to_xml(&self) -> String {
        let mut out = format!(
            "<iq id=\"{}\" to=\"{}\" from=\"{}\" type=\"{}\"><query xmlns=\"{}\"",
            self.id,
            xml_escape(&self.to),
            xml_escape(&self.from),
            self.kind.iq_type(),
            self.kind.namespace(),
        );
        match &self.payload {
            Some(payload) => {
                out.push('>');
                payload.write_xml(&mut out);
                out.push_str("</query>");
            }
            None => out.push_str("/>"),
        }
        out.push_str("</iq>");
        out
    }

    /// Builds the JSON body of the request/response channel.
    #[must_use]
    pub fn to_rest_request<'a>(
        &'a self,
        route: &'a DeviceRoute,
        auth: &'a RestAuth,
    ) -> RestRequest<'a> {
        RestRequest {
            auth,
            cmd_name: self.command_name().unwrap_or_default(),
            payload: self
                .payload
                .as_ref()
                .map(Fragment::to_xml)
                .unwrap_or_default(),
            payload_type: "x",
            td: "q",
            to_id: &route.did,
            to_res: &route.resource,
            to_type: &route.class,
        }
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_xml())
    }
}

/// Account credentials sent with each request/response call.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RestAuth {
    /// Account realm.
    pub realm: String,
    /// Session resource.
    pub resource: String,
    /// Session token.
    pub token: String,
    /// Account user id.
    pub userid: String,
    /// Principal type, always `users`.
    pub with: String,
}

impl RestAuth {
    /// Builds the credentials of an account session.
    #[must_use]
    pub fn new(account: &Jid, token: impl Into<String>) -> Self {
        Self {
            realm: account.host.clone(),
            resource: account.resource.clone(),
            token: token.into(),
            userid: account.user.clone(),
            with: "users".to_string(),
        }
    }
}

/// JSON body of a request/response call.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestRequest<'a> {
    auth: &'a RestAuth,
    cmd_name: &'a str,
    payload: String,
    payload_type: &'static str,
    td: &'static str,
    to_id: &'a str,
    to_res: &'a str,
    to_type: &'a str,
}

/// Builds envelopes for one account session.
///
/// Request ids start at 1 and increase by one for every envelope, pings
/// included.
#[derive(Debug)]
pub struct EnvelopeCodec {
    sender: Jid,
    next_id: AtomicU64,
}

impl EnvelopeCodec {
    /// Creates a codec sending as `sender`.
    #[must_use]
    pub fn new(sender: Jid) -> Self {
        Self {
            sender,
            next_id: AtomicU64::new(1),
        }
    }

    /// Returns the sender address.
    #[must_use]
    pub fn sender(&self) -> &Jid {
        &self.sender
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Wraps a control payload for `recipient`.
    #[must_use]
    pub fn wrap(&self, payload: Fragment, recipient: &str) -> Envelope {
        Envelope {
            id: self.next_id(),
            kind: EnvelopeKind::Set,
            from: self.sender.to_string(),
            to: recipient.to_string(),
            payload: Some(payload),
        }
    }

    /// Builds a liveness ping for `recipient`.
    #[must_use]
    pub fn liveness(&self, recipient: &str) -> Envelope {
        Envelope {
            id: self.next_id(),
            kind: EnvelopeKind::Get,
            from: self.sender.to_string(),
            to: recipient.to_string(),
            payload: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> EnvelopeCodec {
        EnvelopeCodec::new(Jid::new("me", "ecouser.net", "r1"))
    }

    fn route() -> DeviceRoute {
        DeviceRoute {
            did: "E0001".to_string(),
            class: "126".to_string(),
            resource: "atom".to_string(),
        }
    }

    #[test]
    fn ids_are_monotonic_across_kinds() {
        let codec = codec();
        let first = codec.wrap(Fragment::named("ctl"), "bot");
        let ping = codec.liveness("bot");
        let second = codec.wrap(Fragment::named("ctl"), "bot");
        assert_eq!((first.id(), ping.id(), second.id()), (1, 2, 3));
    }

    #[test]
    fn liveness_xml() {
        let envelope = codec().liveness("E0001@126.ecorobot.net/atom");
        assert!(envelope.is_liveness());
        assert_eq!(
            envelope.to_xml(),
            "<iq id=\"1\" to=\"E0001@126.ecorobot.net/atom\" from=\"me@ecouser.net/r1\" \
             type=\"get\"><query xmlns=\"urn:xmpp:ping\"/></iq>"
        );
    }

    #[test]
    fn addresses_are_escaped() {
        let envelope = codec().wrap(Fragment::named("ctl"), "a\"b");
        assert!(envelope.to_xml().contains("to=\"a&quot;b\""));
    }

    #[test]
    fn push_address() {
        assert_eq!(route().push_address(), "E0001@126.ecorobot.net/atom");
    }

    #[test]
    fn jid_forms() {
        let jid = Jid::new("me", "ecouser.net", "r1");
        assert_eq!(jid.to_string(), "me@ecouser.net/r1");
        assert_eq!(jid.bare(), "me@ecouser.net");
    }

    #[test]
    fn rest_request_body() {
        let codec = codec();
        let envelope = codec.wrap(
            Fragment::named("ctl").with_attr("td", "GetCleanSum"),
            "E0001",
        );
        let route = route();
        let auth = RestAuth::new(codec.sender(), "token");

        let body = serde_json::to_value(envelope.to_rest_request(&route, &auth)).unwrap();
        assert_eq!(body["cmdName"], "GetCleanSum");
        assert_eq!(body["payload"], "<ctl td=\"GetCleanSum\"/>");
        assert_eq!(body["payloadType"], "x");
        assert_eq!(body["td"], "q");
        assert_eq!(body["toId"], "E0001");
        assert_eq!(body["toType"], "126");
        assert_eq!(body["toRes"], "atom");
        assert_eq!(body["auth"]["userid"], "me");
        assert_eq!(body["auth"]["realm"], "ecouser.net");
        assert_eq!(body["auth"]["resource"], "r1");
        assert_eq!(body["auth"]["token"], "token");
        assert_eq!(body["auth"]["with"], "users");
    }
}
