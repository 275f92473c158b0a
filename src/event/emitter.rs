// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mapping of state changes to public events.

use crate::classify::MessageKind;
use crate::state::{DeviceState, StateChange};

use super::DeviceEvent;

/// Builds the events for a projected fragment.
///
/// Nothing is emitted when `changes` is empty. Otherwise the kind fires and
/// most kinds emit one event per change. A few kinds fan out from the
/// current state instead:
///
/// - `CleanReport` emits the clean status plus fan speed and last cleaned
///   area whenever those are known, even if this fragment did not touch them.
/// - `NetInfo` emits every known network sub-field.
/// - `CleanSum` emits all three totals.
///
/// # Examples
///
/// ```
/// use vacbot_lib::classify::MessageKind;
/// use vacbot_lib::event::{DeviceEvent, emit};
/// use vacbot_lib::state::{DeviceState, StateChange};
///
/// let mut state = DeviceState::new();
/// let change = StateChange::BatteryLevel(80);
/// state.apply(&change);
///
/// let events = emit(MessageKind::BatteryInfo, &[change], &state);
/// assert_eq!(events, [DeviceEvent::BatteryInfo(80)]);
/// ```
#[must_use]
pub fn emit(kind: MessageKind, changes: &[StateChange], state: &DeviceState) -> Vec<DeviceEvent> {
    if changes.is_empty() {
        return Vec::new();
    }

    match kind {
        MessageKind::CleanReport => clean_report(state),
        MessageKind::NetInfo => net_info(state),
        MessageKind::CleanSum => clean_sum(state),
        _ => changes.iter().filter_map(DeviceEvent::for_change).collect(),
    }
}

fn clean_report(state: &DeviceState) -> Vec<DeviceEvent> {
    let mut events = Vec::with_capacity(3);
    if let Some(status) = state.clean_status() {
        events.push(DeviceEvent::CleanReport(status));
    }
    if let Some(speed) = state.fan_speed() {
        events.push(DeviceEvent::FanSpeed(speed));
    }
    if let Some(area) = state.last_cleaned_area() {
        events.push(DeviceEvent::LastAreaValues(area));
    }
    events
}

fn net_info(state: &DeviceState) -> Vec<DeviceEvent> {
    let info = state.network_info();
    let mut events = Vec::with_capacity(2);
    if let Some(ip) = &info.ip {
        events.push(DeviceEvent::NetInfoIp(ip.clone()));
    }
    if let Some(ssid) = &info.ssid {
        events.push(DeviceEvent::NetInfoWifiSsid(ssid.clone()));
    }
    events
}

fn clean_sum(state: &DeviceState) -> Vec<DeviceEvent> {
    state
        .cleaning_totals()
        .map(|totals| {
            vec![
                DeviceEvent::CleanSumTotalSquareMeters(totals.area_square_meters),
                DeviceEvent::CleanSumTotalSeconds(totals.seconds),
                DeviceEvent::CleanSumTotalNumber(totals.session_count),
            ]
        })
        .unwrap_or_default()
}
