// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! XML encoding of fragments.

use crate::error::ParseError;

use super::Fragment;

impl Fragment {
    /// Parses an XML element into a fragment.
    ///
    /// Only the first child element is kept; text nodes are ignored.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Xml` if the document is not well-formed.
    pub fn from_xml(xml: &str) -> Result<Self, ParseError> {
        let doc = roxmltree::Document::parse(xml)?;
        Ok(Self::from_node(doc.root_element()))
    }

    /// Builds a fragment from an already parsed element node.
    #[must_use]
    pub fn from_node(node: roxmltree::Node<'_, '_>) -> Self {
        let mut fragment = Fragment::named(node.tag_name().name());
        for attr in node.attributes() {
            fragment = fragment.with_attr(attr.name(), attr.value());
        }
        if let Some(child) = node.children().find(roxmltree::Node::is_element) {
            fragment = fragment.with_child(Self::from_node(child));
        }
        fragment
    }

    /// Serializes the fragment as a single XML element.
    ///
    /// Unnamed fragments are written as `<ctl>`, the vendor's payload root.
    #[must_use]
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write_xml(&mut out);
        out
    }

    pub(crate) fn write_xml(&self, out: &mut String) {
        let name = self.name().unwrap_or("ctl");
        out.push('<');
        out.push_str(name);
        for (key, value) in self.attrs() {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape(value));
            out.push('"');
        }
        match self.child() {
            Some(child) => {
                out.push('>');
                child.write_xml(out);
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
            None => out.push_str("/>"),
        }
    }
}

/// Escapes a string for use inside a double-quoted XML attribute.
pub(crate) fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
