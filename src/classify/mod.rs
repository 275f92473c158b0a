// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Attribute-bag classification.
//!
//! The vendor rarely says what a message is. An explicit `td` token wins when
//! present; otherwise the kind is inferred from which attributes the fragment
//! carries, trying an ordered list of rules and taking the first match.
//!
//! # Examples
//!
//! ```
//! use vacbot_lib::classify::{MessageKind, classify};
//! use vacbot_lib::fragment::Fragment;
//!
//! let pose = Fragment::new().with_attr("p", "10,20").with_attr("a", "90");
//! assert_eq!(classify(&pose), MessageKind::DeebotPosition);
//!
//! let charger = pose.clone().with_attr("id", "999999999");
//! assert_eq!(classify(&charger), MessageKind::ChargePosition);
//! ```

use std::fmt;

use crate::fragment::Fragment;
use crate::fragment::value::{is_truthy, parse_int};
use crate::protocol::Inbound;
use crate::types::{WATER_LEVEL_MAX, WATER_LEVEL_MIN};
use crate::vendor;

/// Sentinel id the vendor uses for charger-pose reports.
pub const CHARGER_POSITION_ID: &str = "999999999";

/// Sentinel id the vendor uses for sleep-status reports.
pub const SLEEP_STATUS_ID: &str = "999999997";

/// The canonical category of an inbound fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum MessageKind {
    ChargeState,
    BatteryInfo,
    CleanReport,
    Error,
    LifeSpan,
    WaterLevel,
    WaterBoxInfo,
    DustCaseInfo,
    DeebotPosition,
    ChargePosition,
    NetInfo,
    SleepStatus,
    CleanSum,
    Unknown,
}

impl MessageKind {
    /// Returns the kind's name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ChargeState => "ChargeState",
            Self::BatteryInfo => "BatteryInfo",
            Self::CleanReport => "CleanReport",
            Self::Error => "Error",
            Self::LifeSpan => "LifeSpan",
            Self::WaterLevel => "WaterLevel",
            Self::WaterBoxInfo => "WaterBoxInfo",
            Self::DustCaseInfo => "DustCaseInfo",
            Self::DeebotPosition => "DeebotPosition",
            Self::ChargePosition => "ChargePosition",
            Self::NetInfo => "NetInfo",
            Self::SleepStatus => "SleepStatus",
            Self::CleanSum => "CleanSum",
            Self::Unknown => "Unknown",
        }
    }

    /// Returns `true` unless the kind is [`MessageKind::Unknown`].
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single classification rule.
struct Rule {
    name: &'static str,
    matches: fn(&Fragment) -> Option<MessageKind>,
}

/// Classification rules in priority order.
const RULES: &[Rule] = &[
    Rule {
        name: "type_token",
        matches: by_type_token,
    },
    Rule {
        name: "child_name",
        matches: by_child_name,
    },
    Rule {
        name: "component_type",
        matches: by_component_type,
    },
    Rule {
        name: "water_level",
        matches: by_water_level,
    },
    Rule {
        name: "water_box",
        matches: by_water_box,
    },
    Rule {
        name: "position",
        matches: by_position,
    },
    Rule {
        name: "sleep_status",
        matches: by_sleep_status,
    },
    Rule {
        name: "clean_sum",
        matches: by_clean_sum,
    },
];

/// Determines the kind of a fragment.
///
/// Never fails; fragments no rule recognizes are [`MessageKind::Unknown`].
#[must_use]
pub fn classify(fragment: &Fragment) -> MessageKind {
    for rule in RULES {
        if let Some(kind) = (rule.matches)(fragment) {
            tracing::trace!(rule = rule.name, kind = %kind, "Fragment classified");
            return kind;
        }
    }
    MessageKind::Unknown
}

/// Determines the kind of an inbound transport message.
///
/// Delivery failures reported by the transport are always errors.
#[must_use]
pub fn classify_inbound(inbound: &Inbound) -> MessageKind {
    match inbound {
        Inbound::Message(fragment) => classify(fragment),
        Inbound::DeliveryError(_) => MessageKind::Error,
    }
}

fn by_type_token(fragment: &Fragment) -> Option<MessageKind> {
    fragment.type_token().and_then(vendor::kind_for_token)
}

fn by_child_name(fragment: &Fragment) -> Option<MessageKind> {
    fragment
        .child()
        .and_then(Fragment::name)
        .and_then(vendor::kind_for_token)
}

fn by_component_type(fragment: &Fragment) -> Option<MessageKind> {
    let code = fragment.attr("type")?.trim();
    vendor::component_name(code).map(|_| MessageKind::LifeSpan)
}

fn by_water_level(fragment: &Fragment) -> Option<MessageKind> {
    let level = parse_int(fragment.attr("v")?)?;
    (i64::from(WATER_LEVEL_MIN)..=i64::from(WATER_LEVEL_MAX))
        .contains(&level)
        .then_some(MessageKind::WaterLevel)
}

fn by_water_box(fragment: &Fragment) -> Option<MessageKind> {
    fragment
        .attr("on")
        .filter(|on| is_truthy(on))
        .map(|_| MessageKind::WaterBoxInfo)
}

fn by_position(fragment: &Fragment) -> Option<MessageKind> {
    if !(fragment.has("p") && fragment.has("a")) {
        return None;
    }
    if fragment.attr("id") == Some(CHARGER_POSITION_ID) {
        Some(MessageKind::ChargePosition)
    } else {
        Some(MessageKind::DeebotPosition)
    }
}

fn by_sleep_status(fragment: &Fragment) -> Option<MessageKind> {
    (fragment.has("st") && fragment.attr("id") == Some(SLEEP_STATUS_ID))
        .then_some(MessageKind::SleepStatus)
}

fn by_clean_sum(fragment: &Fragment) -> Option<MessageKind> {
    ["a", "l", "c"]
        .iter()
        .all(|key| fragment.has(key))
        .then_some(MessageKind::CleanSum)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bag(attrs: &[(&str, &str)]) -> Fragment {
        attrs
            .iter()
            .fold(Fragment::new(), |f, (k, v)| f.with_attr(*k, *v))
    }

    #[test]
    fn explicit_token_has_absolute_priority() {
        // Matches the position, water-level and clean-sum heuristics too.
        let fragment = bag(&[
            ("td", "BatteryInfo"),
            ("p", "1,2"),
            ("a", "0"),
            ("v", "2"),
            ("l", "3"),
            ("c", "4"),
        ]);
        assert_eq!(classify(&fragment), MessageKind::BatteryInfo);
    }

    #[test]
    fn query_command_names_resolve() {
        assert_eq!(
            classify(&bag(&[("td", "GetCleanState")])),
            MessageKind::CleanReport
        );
        assert_eq!(
            classify(&bag(&[("td", "_GetLifeSpan_")])),
            MessageKind::LifeSpan
        );
    }

    #[test]
    fn unknown_token_falls_through_to_heuristics() {
        let fragment = bag(&[("td", "Mystery"), ("v", "3")]);
        assert_eq!(classify(&fragment), MessageKind::WaterLevel);
    }

    #[test]
    fn child_name_is_used_when_token_is_missing() {
        let fragment = Fragment::named("ctl").with_child(Fragment::named("charge"));
        assert_eq!(classify(&fragment), MessageKind::ChargeState);

        let unnamed = Fragment::named("ctl").with_child(Fragment::named("widget"));
        assert_eq!(classify(&unnamed), MessageKind::Unknown);
    }

    #[test]
    fn component_type_wins_over_later_rules() {
        let fragment = bag(&[("type", " SideBrush "), ("v", "2")]);
        assert_eq!(classify(&fragment), MessageKind::LifeSpan);

        let other = bag(&[("type", "auto")]);
        assert_eq!(classify(&other), MessageKind::Unknown);
    }

    #[test]
    fn water_level_bounds() {
        assert_eq!(classify(&bag(&[("v", "1")])), MessageKind::WaterLevel);
        assert_eq!(classify(&bag(&[("v", "4")])), MessageKind::WaterLevel);
        assert_eq!(classify(&bag(&[("v", "0")])), MessageKind::Unknown);
        assert_eq!(classify(&bag(&[("v", "5")])), MessageKind::Unknown);
    }

    #[test]
    fn water_box_requires_truthy_on() {
        assert_eq!(classify(&bag(&[("on", "1")])), MessageKind::WaterBoxInfo);
        assert_eq!(classify(&bag(&[("on", "false")])), MessageKind::Unknown);
        assert_eq!(classify(&bag(&[("on", "")])), MessageKind::Unknown);
    }

    #[test]
    fn position_sentinel_selects_charger() {
        let robot = bag(&[("p", "1,2"), ("a", "90"), ("id", "123")]);
        assert_eq!(classify(&robot), MessageKind::DeebotPosition);

        let charger = bag(&[("p", "1,2"), ("a", "90"), ("id", CHARGER_POSITION_ID)]);
        assert_eq!(classify(&charger), MessageKind::ChargePosition);
    }

    #[test]
    fn position_wins_over_clean_sum() {
        let fragment = bag(&[("p", "1,2"), ("a", "90"), ("l", "3"), ("c", "4")]);
        assert_eq!(classify(&fragment), MessageKind::DeebotPosition);
    }

    #[test]
    fn sleep_status_requires_sentinel() {
        let sleep = bag(&[("st", "1"), ("id", SLEEP_STATUS_ID)]);
        assert_eq!(classify(&sleep), MessageKind::SleepStatus);

        let other = bag(&[("st", "1"), ("id", "5")]);
        assert_eq!(classify(&other), MessageKind::Unknown);
    }

    #[test]
    fn clean_sum_needs_all_three() {
        assert_eq!(
            classify(&bag(&[("a", "12"), ("l", "3600"), ("c", "4")])),
            MessageKind::CleanSum
        );
        assert_eq!(
            classify(&bag(&[("a", "12"), ("l", "3600")])),
            MessageKind::Unknown
        );
    }

    #[test]
    fn delivery_errors_are_errors() {
        let inbound = Inbound::DeliveryError(bag(&[("errno", "4200")]));
        assert_eq!(classify_inbound(&inbound), MessageKind::Error);

        let message = Inbound::Message(bag(&[("td", "NetInfo")]));
        assert_eq!(classify_inbound(&message), MessageKind::NetInfo);
    }
}
