// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decoding of push-session `iq` stanzas.
//!
//! Robot messages arrive as `<iq type="set|result"><query><ctl .../></query></iq>`;
//! failed deliveries as `<iq type="error"><error code=".."><...></error></iq>`.

use crate::error::ParseError;
use crate::fragment::Fragment;

use super::Inbound;

/// Decodes an `iq` stanza.
///
/// Returns `Ok(None)` for well-formed stanzas that carry no robot message
/// (pings, empty results, other element types).
///
/// # Errors
///
/// Returns `ParseError` if the stanza is not well-formed XML.
///
/// # Examples
///
/// ```
/// use vacbot_lib::protocol::{Inbound, stanza};
///
/// let xml = r#"<iq type="set" id="4"><query xmlns="com:ctl"><ctl td="BatteryInfo"><battery power="080"/></ctl></query></iq>"#;
/// let Some(Inbound::Message(fragment)) = stanza::decode(xml).unwrap() else {
///     panic!("expected a message");
/// };
/// assert_eq!(fragment.type_token(), Some("BatteryInfo"));
/// ```
pub fn decode(xml: &str) -> Result<Option<Inbound>, ParseError> {
    let iq = Fragment::from_xml(xml)?;
    if iq.name() != Some("iq") {
        tracing::debug!(name = ?iq.name(), "Ignoring non-iq stanza");
        return Ok(None);
    }

    let first = iq.child();
    let inbound = match (iq.attr("type"), first.and_then(Fragment::name)) {
        (Some("set" | "result"), Some("query")) => first
            .and_then(Fragment::child)
            .map(|message| Inbound::Message(message.clone())),
        (Some("error"), Some("error")) => {
            let error = first.filter(|e| e.child().is_some()).cloned();
            if let Some(error) = &error {
                tracing::debug!(id = ?iq.attr("id"), error = %error, "Delivery error");
            }
            error.map(Inbound::DeliveryError)
        }
        _ => None,
    };
    Ok(inbound)
}
