// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Projection of classified fragments onto device state.
//!
//! Each message kind has one normalization function that reads the vendor
//! encoding (scaled integers, comma-joined coordinates, vendor enumerations)
//! and proposes canonical [`StateChange`]s. [`project`] applies the proposals
//! to a copy of the prior state and keeps only the ones that changed it.
//!
//! Missing or malformed attributes never fail: they are logged and the
//! affected field keeps its prior value.

use crate::classify::MessageKind;
use crate::fragment::Fragment;
use crate::fragment::value::{parse_flag, parse_float, parse_int};
use crate::types::{Area, CleanAction, CleaningTotals, Position, WATER_LEVEL_MAX, WATER_LEVEL_MIN};
use crate::vendor;

use super::{DeviceState, StateChange};

/// Result of projecting one fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    /// State after the fragment was applied.
    pub state: DeviceState,
    /// Changes that actually modified the state, in application order.
    pub changes: Vec<StateChange>,
}

impl Projection {
    /// Returns `true` if the fragment changed nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Projects a classified fragment onto the prior state.
///
/// Re-projecting the same fragment onto the resulting state yields no
/// changes.
///
/// # Examples
///
/// ```
/// use vacbot_lib::classify::MessageKind;
/// use vacbot_lib::fragment::Fragment;
/// use vacbot_lib::state::{DeviceState, project};
///
/// let fragment = Fragment::new()
///     .with_attr("td", "BatteryInfo")
///     .with_child(Fragment::named("battery").with_attr("power", "080"));
///
/// let projection = project(MessageKind::BatteryInfo, &fragment, &DeviceState::new());
/// assert_eq!(projection.state.battery_level(), Some(80));
///
/// let again = project(MessageKind::BatteryInfo, &fragment, &projection.state);
/// assert!(again.is_empty());
/// ```
#[must_use]
pub fn project(kind: MessageKind, fragment: &Fragment, prior: &DeviceState) -> Projection {
    let proposed = match kind {
        MessageKind::ChargeState => charge_state(fragment),
        MessageKind::BatteryInfo => battery_info(fragment),
        MessageKind::CleanReport => clean_report(fragment),
        MessageKind::Error => error(fragment),
        MessageKind::LifeSpan => life_span(fragment),
        MessageKind::WaterLevel => water_level(fragment),
        MessageKind::WaterBoxInfo => flag(fragment, "on", StateChange::WaterBoxPresent),
        MessageKind::DustCaseInfo => flag(fragment, "st", StateChange::DustCasePresent),
        MessageKind::SleepStatus => flag(fragment, "st", StateChange::SleepStatus),
        MessageKind::DeebotPosition => position(fragment, StateChange::Pose),
        MessageKind::ChargePosition => position(fragment, StateChange::ChargerPose),
        MessageKind::NetInfo => net_info(fragment),
        MessageKind::CleanSum => clean_sum(fragment),
        MessageKind::Unknown => Vec::new(),
    };

    let mut state = prior.clone();
    let changes = proposed
        .into_iter()
        .filter(|change| state.apply(change))
        .collect();
    Projection { state, changes }
}

fn charge_state(fragment: &Fragment) -> Vec<StateChange> {
    let Some(code) = fragment.body().attr("type") else {
        tracing::warn!(fragment = %fragment, "Charge state without type");
        return Vec::new();
    };
    match vendor::charge_mode(code) {
        Some(status) => vec![StateChange::ChargeStatus(status)],
        None => {
            tracing::warn!(code = %code, "Unknown charging status");
            Vec::new()
        }
    }
}

fn battery_info(fragment: &Fragment) -> Vec<StateChange> {
    let raw = fragment
        .descend(&["ctl", "battery"])
        .and_then(|battery| battery.attr("power"))
        .or_else(|| fragment.body().attr("power"));
    let Some(raw) = raw else {
        tracing::warn!(fragment = %fragment, "Battery info without power");
        return Vec::new();
    };
    let Some(power) = parse_float(raw) else {
        tracing::warn!(power = %raw, "Couldn't parse battery level");
        return Vec::new();
    };
    // Clamped to 0..=100 first, so the cast cannot truncate.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let level = power.clamp(0.0, 100.0).round() as u8;
    vec![StateChange::BatteryLevel(level)]
}

fn clean_report(fragment: &Fragment) -> Vec<StateChange> {
    let body = fragment.body();
    let mut changes = Vec::new();

    let mode = body.attr("type").and_then(vendor::clean_mode);
    let action = non_empty(body, "st")
        .or_else(|| non_empty(body, "act"))
        .and_then(vendor::clean_action);
    match action.and_then(CleanAction::forced_status).or(mode) {
        Some(status) => changes.push(StateChange::CleanStatus(status)),
        None => tracing::debug!(
            mode = ?body.attr("type"),
            "Clean report without a recognized mode"
        ),
    }

    if let Some(p) = body.attr("p") {
        match Area::parse(p) {
            Some(area) => changes.push(StateChange::LastCleanedArea(area)),
            None => tracing::warn!(p = %p, "Invalid last area values"),
        }
    }

    match body.attr("speed") {
        Some(code) => match vendor::fan_speed(code) {
            Some(speed) => changes.push(StateChange::FanSpeed(speed)),
            None => tracing::debug!(speed = %code, "Unknown fan speed"),
        },
        None => tracing::debug!("Clean report without fan speed"),
    }

    changes
}

fn error(fragment: &Fragment) -> Vec<StateChange> {
    match error_message(fragment) {
        Some(message) => vec![StateChange::LastError(message)],
        None => {
            tracing::debug!(fragment = %fragment, "Error report without code");
            Vec::new()
        }
    }
}

/// Resolves the error message from the first non-empty code attribute.
fn error_message(fragment: &Fragment) -> Option<String> {
    let code = match non_empty(fragment, "code").or_else(|| non_empty(fragment, "errno")) {
        Some(code) => code,
        None => {
            // An emptied `new` next to the previous code means it was cleared.
            if fragment.attr("new") == Some("")
                && fragment.attr("old").is_some_and(|old| !old.is_empty())
            {
                return Some(String::new());
            }
            non_empty(fragment, "new")
                .or_else(|| non_empty(fragment, "error"))
                .or_else(|| non_empty(fragment, "errs"))?
        }
    };
    Some(describe_error(code.trim()))
}

fn describe_error(code: &str) -> String {
    if code == vendor::NO_ERROR_CODE {
        return String::new();
    }
    match vendor::error_description(code) {
        Some(description) => description.to_string(),
        None => format!("unknown error code: {code}"),
    }
}

fn life_span(fragment: &Fragment) -> Vec<StateChange> {
    let Some(code) = fragment.attr("type").map(str::trim) else {
        tracing::warn!(fragment = %fragment, "Lifespan report without component type");
        return Vec::new();
    };
    let component = vendor::component_name(code).unwrap_or(code);

    let Some(percent) = lifespan_percent(fragment) else {
        tracing::warn!(component = %component, "Couldn't compute lifespan");
        return Vec::new();
    };
    tracing::debug!(component = %component, percent, "Lifespan");
    vec![StateChange::lifespan(component, percent)]
}

#[allow(clippy::cast_precision_loss)]
fn lifespan_percent(fragment: &Fragment) -> Option<f64> {
    let int = |key: &str| fragment.attr(key).and_then(parse_int).map(|v| v as f64);
    let percent = match (fragment.has("val"), fragment.has("left"), fragment.has("total")) {
        (true, _, true) => int("val")? / int("total")? * 100.0,
        (true, _, false) => int("val")? / 100.0,
        (false, true, true) => int("left")? / int("total")? * 100.0,
        (false, true, false) => int("left")? / 60.0,
        (false, false, _) => return None,
    };
    percent.is_finite().then_some(percent)
}

fn water_level(fragment: &Fragment) -> Vec<StateChange> {
    let level = fragment
        .attr("v")
        .and_then(parse_int)
        .and_then(|v| u8::try_from(v).ok())
        .filter(|v| (WATER_LEVEL_MIN..=WATER_LEVEL_MAX).contains(v));
    match level {
        Some(level) => vec![StateChange::WaterLevel(level)],
        None => {
            tracing::warn!(v = ?fragment.attr("v"), "Invalid water level");
            Vec::new()
        }
    }
}

fn flag(fragment: &Fragment, key: &str, change: fn(bool) -> StateChange) -> Vec<StateChange> {
    match fragment.attr(key).map(|raw| (raw, parse_flag(raw))) {
        Some((_, Some(value))) => vec![change(value)],
        Some((raw, None)) => {
            tracing::warn!(key, value = %raw, "Invalid flag value");
            Vec::new()
        }
        None => {
            tracing::debug!(key, "Flag attribute missing");
            Vec::new()
        }
    }
}

fn position(fragment: &Fragment, change: fn(Position) -> StateChange) -> Vec<StateChange> {
    let (Some(p), Some(a)) = (fragment.attr("p"), fragment.attr("a")) else {
        tracing::debug!(fragment = %fragment, "Position without p and a");
        return Vec::new();
    };
    match Position::from_report(p, a) {
        Some(pos) => vec![change(pos)],
        None => {
            tracing::warn!(p = %p, "Invalid position");
            Vec::new()
        }
    }
}

fn net_info(fragment: &Fragment) -> Vec<StateChange> {
    let mut changes = Vec::new();
    if let Some(ip) = fragment.attr("wi") {
        changes.push(StateChange::NetworkIp(ip.to_string()));
    }
    if let Some(ssid) = fragment.attr("s") {
        changes.push(StateChange::NetworkSsid(ssid.to_string()));
    }
    changes
}

fn clean_sum(fragment: &Fragment) -> Vec<StateChange> {
    let int = |key: &str| fragment.attr(key).and_then(parse_int);
    match (int("a"), int("l"), int("c")) {
        (Some(area), Some(seconds), Some(count)) => {
            vec![StateChange::CleaningTotals(CleaningTotals {
                area_square_meters: area,
                seconds,
                session_count: count,
            })]
        }
        _ => {
            tracing::warn!(fragment = %fragment, "Incomplete clean summary");
            Vec::new()
        }
    }
}

fn non_empty<'a>(fragment: &'a Fragment, key: &str) -> Option<&'a str> {
    fragment.attr(key).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChargeStatus, CleanStatus, FanSpeed};

    fn bag(attrs: &[(&str, &str)]) -> Fragment {
        attrs
            .iter()
            .fold(Fragment::new(), |f, (k, v)| f.with_attr(*k, *v))
    }

    fn fresh(kind: MessageKind, fragment: &Fragment) -> Projection {
        project(kind, fragment, &DeviceState::new())
    }

    #[test]
    fn battery_from_wrapped_body() {
        let fragment = Fragment::new()
            .with_attr("td", "BatteryInfo")
            .with_child(Fragment::new().with_attr("power", "80"));
        let projection = fresh(MessageKind::BatteryInfo, &fragment);
        assert_eq!(projection.changes, [StateChange::BatteryLevel(80)]);
    }

    #[test]
    fn battery_from_nested_ctl() {
        let fragment = Fragment::new().with_child(
            Fragment::named("ctl").with_child(Fragment::named("battery").with_attr("power", "42")),
        );
        let projection = fresh(MessageKind::BatteryInfo, &fragment);
        assert_eq!(projection.state.battery_level(), Some(42));
    }

    #[test]
    fn battery_is_clamped_and_rounded() {
        let over = fresh(MessageKind::BatteryInfo, &bag(&[("power", "104.6")]));
        assert_eq!(over.state.battery_level(), Some(100));

        let frac = fresh(MessageKind::BatteryInfo, &bag(&[("power", "49.5")]));
        assert_eq!(frac.state.battery_level(), Some(50));

        let junk = fresh(MessageKind::BatteryInfo, &bag(&[("power", "full")]));
        assert!(junk.is_empty());
    }

    #[test]
    fn lifespan_formulas() {
        let cases = [
            (&[("type", "Brush"), ("val", "50"), ("total", "100")][..], 50.0),
            (&[("type", "Brush"), ("val", "75")][..], 0.75),
            (&[("type", "Brush"), ("left", "30"), ("total", "60")][..], 50.0),
            (&[("type", "Brush"), ("left", "45")][..], 0.75),
        ];
        for (attrs, expected) in cases {
            let projection = fresh(MessageKind::LifeSpan, &bag(attrs));
            assert_eq!(projection.state.lifespan("main_brush"), Some(expected));
        }
    }

    #[test]
    fn lifespan_component_is_trimmed() {
        let fragment = bag(&[("type", "DustCaseHeap "), ("val", "20"), ("total", "40")]);
        let projection = fresh(MessageKind::LifeSpan, &fragment);
        assert_eq!(projection.state.lifespan("filter"), Some(50.0));
    }

    #[test]
    fn lifespan_unmapped_component_is_kept_verbatim() {
        let fragment = bag(&[("type", "Mop"), ("val", "30")]);
        let projection = fresh(MessageKind::LifeSpan, &fragment);
        assert_eq!(projection.state.lifespan("Mop"), Some(0.3));
    }

    #[test]
    fn lifespan_zero_total_is_ignored() {
        let fragment = bag(&[("type", "Brush"), ("val", "10"), ("total", "0")]);
        assert!(fresh(MessageKind::LifeSpan, &fragment).is_empty());
    }

    #[test]
    fn no_error_code_from_every_source() {
        for key in ["code", "errno", "new", "error", "errs"] {
            let projection = fresh(MessageKind::Error, &bag(&[(key, "100")]));
            assert_eq!(projection.state.last_error(), Some(""), "source {key}");
        }
    }

    #[test]
    fn cleared_new_with_old_means_no_error() {
        // 102 would resolve to a description if the table were consulted.
        let fragment = bag(&[("new", ""), ("old", "102"), ("error", "102")]);
        let projection = fresh(MessageKind::Error, &fragment);
        assert_eq!(projection.state.last_error(), Some(""));
    }

    #[test]
    fn error_code_lookup() {
        let known = fresh(MessageKind::Error, &bag(&[("errs", "102")]));
        assert_eq!(
            known.state.last_error(),
            Some("HostHang: Robot is off the floor")
        );

        let unknown = fresh(MessageKind::Error, &bag(&[("code", "31337")]));
        assert_eq!(
            unknown.state.last_error(),
            Some("unknown error code: 31337")
        );

        let empty_code = fresh(MessageKind::Error, &bag(&[("code", ""), ("errno", "105")]));
        assert_eq!(empty_code.state.last_error(), Some("Stuck: Robot is stuck"));
    }

    #[test]
    fn stop_action_overrides_mode() {
        let fragment = Fragment::new()
            .with_attr("td", "CleanReport")
            .with_child(
                Fragment::named("clean")
                    .with_attr("type", "auto")
                    .with_attr("st", "h"),
            );
        let projection = fresh(MessageKind::CleanReport, &fragment);
        assert_eq!(projection.state.clean_status(), Some(CleanStatus::Stop));
    }

    #[test]
    fn pause_act_overrides_mode() {
        let fragment = bag(&[("type", "border"), ("act", "p")]);
        let projection = fresh(MessageKind::CleanReport, &fragment);
        assert_eq!(projection.state.clean_status(), Some(CleanStatus::Pause));
    }

    #[test]
    fn start_action_keeps_mode() {
        let fragment = bag(&[("type", "spot"), ("st", "s"), ("speed", "strong")]);
        let projection = fresh(MessageKind::CleanReport, &fragment);
        assert_eq!(projection.state.clean_status(), Some(CleanStatus::Spot));
        assert_eq!(projection.state.fan_speed(), Some(FanSpeed::High));
    }

    #[test]
    fn unknown_mode_leaves_status_unchanged() {
        let mut prior = DeviceState::new();
        prior.apply(&StateChange::CleanStatus(CleanStatus::Auto));

        let projection = project(MessageKind::CleanReport, &bag(&[("type", "zigzag")]), &prior);
        assert!(projection.is_empty());
        assert_eq!(projection.state.clean_status(), Some(CleanStatus::Auto));
    }

    #[test]
    fn strict_area_pattern() {
        let valid = fresh(MessageKind::CleanReport, &bag(&[("p", "1.25,-2.04,300.96,4")]));
        let area = valid.state.last_cleaned_area().unwrap();
        assert_eq!(area.to_string(), "1.3,-2.0,301.0,4.0");

        let mut prior = DeviceState::new();
        prior.apply(&StateChange::LastCleanedArea(area));
        for p in ["1,2,3", "1,2,3,4,5", "a,b,c,d", "1, 2,3,4"] {
            let projection = project(MessageKind::CleanReport, &bag(&[("p", p)]), &prior);
            assert_eq!(projection.state.last_cleaned_area(), Some(area), "p={p}");
        }
    }

    #[test]
    fn charge_state_uses_body() {
        let fragment = Fragment::new()
            .with_attr("td", "ChargeState")
            .with_child(Fragment::named("charge").with_attr("type", "SlotCharging"));
        let projection = fresh(MessageKind::ChargeState, &fragment);
        assert_eq!(projection.state.charge_status(), Some(ChargeStatus::Charging));

        assert!(fresh(MessageKind::ChargeState, &bag(&[("type", "Docked")])).is_empty());
    }

    #[test]
    fn water_level_range() {
        let ok = fresh(MessageKind::WaterLevel, &bag(&[("v", "3")]));
        assert_eq!(ok.state.water_level(), Some(3));
        assert!(fresh(MessageKind::WaterLevel, &bag(&[("v", "9")])).is_empty());
    }

    #[test]
    fn presence_flags() {
        let water = fresh(MessageKind::WaterBoxInfo, &bag(&[("on", "1")]));
        assert_eq!(water.state.water_box_present(), Some(true));

        let dust = fresh(MessageKind::DustCaseInfo, &bag(&[("st", "0")]));
        assert_eq!(dust.state.dust_case_present(), Some(false));

        let sleep = fresh(MessageKind::SleepStatus, &bag(&[("st", "true")]));
        assert_eq!(sleep.state.sleep_status(), Some(true));
    }

    #[test]
    fn positions_keep_vendor_text() {
        let fragment = bag(&[("p", "-120,45,7"), ("a", "90")]);
        let robot = fresh(MessageKind::DeebotPosition, &fragment);
        let pose = robot.state.pose().unwrap();
        assert_eq!((pose.x.as_str(), pose.y.as_str(), pose.angle.as_str()), ("-120", "45", "90"));
        assert!(robot.state.charger_pose().is_none());

        let charger = fresh(MessageKind::ChargePosition, &fragment);
        assert!(charger.state.charger_pose().is_some());
    }

    #[test]
    fn net_info_sub_fields_are_independent() {
        let projection = fresh(MessageKind::NetInfo, &bag(&[("s", "home")]));
        assert_eq!(projection.changes, [StateChange::NetworkSsid("home".to_string())]);
        assert!(projection.state.network_info().ip.is_none());
    }

    #[test]
    fn clean_sum_truncates_integers() {
        let fragment = bag(&[("a", "12.5"), ("l", "3600"), ("c", "4")]);
        let projection = fresh(MessageKind::CleanSum, &fragment);
        assert_eq!(
            projection.state.cleaning_totals(),
            Some(CleaningTotals {
                area_square_meters: 12,
                seconds: 3600,
                session_count: 4,
            })
        );

        let partial = bag(&[("a", "12"), ("l", "x"), ("c", "4")]);
        assert!(fresh(MessageKind::CleanSum, &partial).is_empty());
    }

    #[test]
    fn identical_fragments_are_idempotent() {
        let fragments = [
            (
                MessageKind::CleanReport,
                bag(&[("type", "auto"), ("speed", "standard"), ("p", "1,2,3,4")]),
            ),
            (MessageKind::NetInfo, bag(&[("wi", "10.0.0.2"), ("s", "home")])),
            (MessageKind::LifeSpan, bag(&[("type", "SideBrush"), ("val", "50")])),
            (MessageKind::Error, bag(&[("errs", "105")])),
            (MessageKind::CleanSum, bag(&[("a", "1"), ("l", "2"), ("c", "3")])),
        ];
        for (kind, fragment) in fragments {
            let first = fresh(kind, &fragment);
            assert!(!first.is_empty(), "{kind}");
            let second = project(kind, &fragment, &first.state);
            assert!(second.is_empty(), "{kind}");
            assert_eq!(second.state, first.state);
        }
    }

    #[test]
    fn unknown_kind_changes_nothing() {
        let projection = fresh(MessageKind::Unknown, &bag(&[("x", "1")]));
        assert!(projection.is_empty());
        assert_eq!(projection.state, DeviceState::new());
    }
}
