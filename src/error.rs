// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `vacbot_lib` library.
//!
//! Only the outer surfaces of the library can fail: transports, payload
//! decoding and configuration. Classification, projection and event emission
//! never return errors; malformed vendor data is logged and dropped there.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during transport communication.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while decoding a vendor payload.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The adapter configuration is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The adapter has been disconnected.
    #[error("vacuum is not connected")]
    NotConnected,
}

/// Errors related to transport communication (HTTP/MQTT).
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// HTTP request failed.
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// MQTT connection or communication failed.
    #[cfg(feature = "mqtt")]
    #[error("MQTT error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    /// Connection to the vendor cloud failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Invalid URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Authentication was rejected by the vendor cloud.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Internal channel was closed.
    #[error("channel closed: {0}")]
    ChannelClosed(String),

    /// The reply could not be decoded.
    #[error("malformed reply: {0}")]
    MalformedReply(#[from] ParseError),
}

/// Errors related to decoding vendor payloads into fragments.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// XML parsing failed.
    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),

    /// Payload had neither XML nor JSON shape, or no usable root element.
    #[error("unexpected payload format: {0}")]
    UnexpectedFormat(String),
}

/// Errors related to adapter configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required field was left empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A field value is not usable.
    #[error("invalid value for {field}: {message}")]
    InvalidValue {
        /// The offending field.
        field: &'static str,
        /// Why the value was rejected.
        message: String,
    },
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
