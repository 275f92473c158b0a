// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transports and wire formats.
//!
//! Both transports speak the same envelope and deliver the same
//! [`Inbound`] messages; classification and projection never see which one
//! was used.
//!
//! # Transports
//!
//! - [`HttpChannel`]: request/response calls to the vendor portal
//! - [`MqttSession`]: push session over the vendor MQTT broker
//!
//! [`stanza::decode`] turns `iq` stanzas of an XMPP push session into
//! [`Inbound`] messages for callers that run such a session themselves.

mod envelope;
#[cfg(feature = "http")]
mod http;
#[cfg(feature = "mqtt")]
mod mqtt;
pub mod stanza;

pub use envelope::{
    CONTROL_NAMESPACE, DeviceRoute, Envelope, EnvelopeCodec, EnvelopeKind, Jid, PING_NAMESPACE,
    RestAuth, RestRequest,
};
#[cfg(feature = "http")]
pub use http::HttpChannel;
#[cfg(feature = "mqtt")]
pub use mqtt::MqttSession;

use crate::error::ProtocolError;
use crate::fragment::Fragment;

/// A message delivered by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A robot message.
    Message(Fragment),
    /// The transport reported that a request could not be delivered.
    DeliveryError(Fragment),
}

impl Inbound {
    /// Returns the carried fragment.
    #[must_use]
    pub fn fragment(&self) -> &Fragment {
        match self {
            Self::Message(fragment) | Self::DeliveryError(fragment) => fragment,
        }
    }
}

/// Trait for transports that deliver envelopes to the robot.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Sends an envelope.
    ///
    /// Push transports return `Ok(None)`; replies arrive on their inbound
    /// channel. Request/response transports return the reply.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the envelope cannot be delivered or the
    /// reply cannot be decoded.
    async fn send(&self, envelope: &Envelope) -> Result<Option<Inbound>, ProtocolError>;
}
