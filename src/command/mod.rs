// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Robot query commands.
//!
//! Each command serializes to a `ctl` payload whose `td` attribute names the
//! vendor command. The reply re-enters the inbound path and is classified
//! like any pushed report.
//!
//! # Examples
//!
//! ```
//! use vacbot_lib::command::{Command, QueryCommand};
//!
//! let cmd = QueryCommand::GetLifeSpan("side_brush".to_string());
//! assert_eq!(cmd.name(), "GetLifeSpan");
//! assert_eq!(
//!     cmd.to_fragment().to_xml(),
//!     r#"<ctl td="GetLifeSpan" type="SideBrush"/>"#
//! );
//! ```

mod query;

pub use query::QueryCommand;

use crate::fragment::{Fragment, TYPE_TOKEN_ATTR};

/// Element name of control payloads.
pub const PAYLOAD_ELEMENT: &str = "ctl";

/// A command that can be sent to a robot.
pub trait Command {
    /// Returns the vendor command name (the `td` token).
    fn name(&self) -> String;

    /// Returns extra payload attributes in wire order.
    fn attributes(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Builds the `ctl` payload.
    fn to_fragment(&self) -> Fragment {
        self.attributes().into_iter().fold(
            Fragment::named(PAYLOAD_ELEMENT).with_attr(TYPE_TOKEN_ATTR, self.name()),
            |fragment, (key, value)| fragment.with_attr(key, value),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Custom;

    impl Command for Custom {
        fn name(&self) -> String {
            "PlaySound".to_string()
        }

        fn attributes(&self) -> Vec<(&'static str, String)> {
            vec![("sid", "0".to_string())]
        }
    }

    #[test]
    fn default_fragment_carries_token_then_attributes() {
        let fragment = Custom.to_fragment();
        assert_eq!(fragment.name(), Some("ctl"));
        let attrs: Vec<_> = fragment.attrs().collect();
        assert_eq!(attrs, vec![("td", "PlaySound"), ("sid", "0")]);
    }
}
