// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON decoding of fragments.

use serde_json::{Map, Value};

use crate::error::ParseError;

use super::Fragment;

impl Fragment {
    /// Parses a JSON object into a fragment.
    ///
    /// Scalar members become attributes (numbers keep their JSON text,
    /// booleans become `"true"`/`"false"`, `null` is skipped). The first
    /// object-valued member becomes the child, named after its key. Arrays
    /// are skipped.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the text is not JSON or the root is not an
    /// object.
    pub fn from_json(json: &str) -> Result<Self, ParseError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    /// Builds a fragment from an already parsed JSON value.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::UnexpectedFormat` if the value is not an object.
    pub fn from_value(value: &Value) -> Result<Self, ParseError> {
        match value {
            Value::Object(map) => Ok(from_map(Fragment::new(), map)),
            other => Err(ParseError::UnexpectedFormat(format!(
                "expected a JSON object, got {}",
                kind_of(other)
            ))),
        }
    }
}

fn from_map(mut fragment: Fragment, map: &Map<String, Value>) -> Fragment {
    let mut child = None;
    for (key, value) in map {
        match value {
            Value::String(s) => fragment = fragment.with_attr(key, s.as_str()),
            Value::Number(n) => fragment = fragment.with_attr(key, n.to_string()),
            Value::Bool(b) => fragment = fragment.with_attr(key, b.to_string()),
            Value::Object(nested) if child.is_none() => {
                child = Some(from_map(Fragment::named(key), nested));
            }
            Value::Object(_) | Value::Array(_) | Value::Null => {}
        }
    }
    match child {
        Some(child) => fragment.with_child(child),
        None => fragment,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_become_attributes() {
        let fragment =
            Fragment::from_json(r#"{"a":"12.5","l":3600,"c":4,"on":true,"x":null}"#).unwrap();
        assert_eq!(fragment.attr("a"), Some("12.5"));
        assert_eq!(fragment.attr("l"), Some("3600"));
        assert_eq!(fragment.attr("c"), Some("4"));
        assert_eq!(fragment.attr("on"), Some("true"));
        assert!(!fragment.has("x"));
    }

    #[test]
    fn attributes_keep_document_order() {
        let fragment = Fragment::from_json(r#"{"z":"1","a":"2","m":"3"}"#).unwrap();
        let keys: Vec<&str> = fragment.attrs().map(|(k, _)| k).collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn nested_object_becomes_child_chain() {
        let fragment = Fragment::from_json(r#"{"ctl":{"battery":{"power":80}}}"#).unwrap();
        let battery = fragment.descend(&["ctl", "battery"]).unwrap();
        assert_eq!(battery.attr("power"), Some("80"));
    }

    #[test]
    fn only_first_object_member_is_kept() {
        let fragment = Fragment::from_json(r#"{"first":{"k":1},"second":{"k":2}}"#).unwrap();
        assert_eq!(fragment.child().unwrap().name(), Some("first"));
    }

    #[test]
    fn arrays_are_skipped() {
        let fragment = Fragment::from_json(r#"{"list":[1,2],"v":"2"}"#).unwrap();
        assert_eq!(fragment.attr_count(), 1);
        assert!(fragment.child().is_none());
    }

    #[test]
    fn non_object_root_is_rejected() {
        assert!(matches!(
            Fragment::from_json("[1,2]"),
            Err(ParseError::UnexpectedFormat(_))
        ));
        assert!(matches!(Fragment::from_json("{"), Err(ParseError::Json(_))));
    }
}
