// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transport-agnostic vendor message fragments.
//!
//! Both transports deliver attribute bags in different encodings: the push
//! session speaks XML, the request/response channel and MQTT pushes usually
//! speak JSON. Everything is reduced to a [`Fragment`] before classification:
//! an optional element name, an ordered list of string attributes and at most
//! one nested child.
//!
//! # Examples
//!
//! ```
//! use vacbot_lib::fragment::Fragment;
//!
//! let fragment = Fragment::from_xml(r#"<ctl td="BatteryInfo"><battery power="080"/></ctl>"#)
//!     .unwrap();
//!
//! assert_eq!(fragment.type_token(), Some("BatteryInfo"));
//! assert_eq!(fragment.body().attr("power"), Some("080"));
//! ```

mod json;
pub mod value;
mod xml;

use std::fmt;

use crate::error::ParseError;

pub(crate) use xml::escape as xml_escape;

/// Attribute carrying the explicit vendor type token.
pub const TYPE_TOKEN_ATTR: &str = "td";

/// A single inbound vendor payload reduced to an attribute bag.
///
/// Fragments are built once by a decoder (or the builder methods) and only
/// read afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fragment {
    name: Option<String>,
    attrs: Vec<(String, String)>,
    child: Option<Box<Fragment>>,
}

impl Fragment {
    /// Creates an empty, unnamed fragment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty fragment with an element name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Adds an attribute, replacing the value if the key already exists.
    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.attrs.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.attrs.push((key, value));
        }
        self
    }

    /// Sets the nested child fragment.
    #[must_use]
    pub fn with_child(mut self, child: Fragment) -> Self {
        self.child = Some(Box::new(child));
        self
    }

    /// Sets the type token unless the fragment already carries one.
    ///
    /// Transports that learn the message type out of band (a topic segment,
    /// the command that was sent) use this to stamp it onto the fragment.
    #[must_use]
    pub fn with_type_token(self, token: impl Into<String>) -> Self {
        if self.has(TYPE_TOKEN_ATTR) {
            self
        } else {
            self.with_attr(TYPE_TOKEN_ATTR, token)
        }
    }

    /// Returns the element name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the value of an attribute.
    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns `true` if the attribute is present (even when empty).
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.attrs.iter().any(|(k, _)| k == key)
    }

    /// Iterates over attributes in their original order.
    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the number of attributes.
    #[must_use]
    pub fn attr_count(&self) -> usize {
        self.attrs.len()
    }

    /// Returns the nested child fragment.
    #[must_use]
    pub fn child(&self) -> Option<&Fragment> {
        self.child.as_deref()
    }

    /// Returns the payload body: the child when present, otherwise `self`.
    ///
    /// Push messages wrap the interesting element (`<ctl td=".."><battery/></ctl>`)
    /// while poll replies carry the attributes flat on the root.
    #[must_use]
    pub fn body(&self) -> &Fragment {
        self.child().unwrap_or(self)
    }

    /// Follows the child chain, matching each element name in `path`.
    #[must_use]
    pub fn descend(&self, path: &[&str]) -> Option<&Fragment> {
        let mut current = self;
        for name in path {
            let child = current.child()?;
            if child.name() != Some(*name) {
                return None;
            }
            current = child;
        }
        Some(current)
    }

    /// Returns the explicit vendor type token (`td` attribute).
    #[must_use]
    pub fn type_token(&self) -> Option<&str> {
        self.attr(TYPE_TOKEN_ATTR)
    }

    /// Decodes a payload, picking XML or JSON from its first character.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the payload is empty, has neither shape, or
    /// fails to parse.
    pub fn decode(payload: &str) -> Result<Self, ParseError> {
        let trimmed = payload.trim_start();
        match trimmed.chars().next() {
            Some('<') => Self::from_xml(trimmed),
            Some('{') => Self::from_json(trimmed),
            Some(_) => Err(ParseError::UnexpectedFormat(format!(
                "payload is neither XML nor JSON: {}",
                truncate(trimmed, 40)
            ))),
            None => Err(ParseError::UnexpectedFormat("empty payload".to_string())),
        }
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_xml())
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
