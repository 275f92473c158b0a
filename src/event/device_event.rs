// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device event types.

use std::borrow::Cow;

use crate::state::StateChange;
use crate::types::{Area, ChargeStatus, CleanStatus, FanSpeed, Position};
use crate::vendor;

/// Events emitted when the robot's canonical state changes.
///
/// Each event carries the new canonical value, never the raw vendor
/// fragment. [`DeviceEvent::name`] returns the public event name that
/// applications subscribe to.
///
/// # Examples
///
/// ```
/// use vacbot_lib::event::DeviceEvent;
///
/// let event = DeviceEvent::BatteryInfo(80);
/// assert_eq!(event.name(), "BatteryInfo");
///
/// let lifespan = DeviceEvent::LifeSpan {
///     component: "side_brush".to_string(),
///     percent: 42.0,
/// };
/// assert_eq!(lifespan.name(), "LifeSpan_side_brush");
/// ```
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum DeviceEvent {
    /// Charging status.
    ChargeState(ChargeStatus),

    /// Battery level (0-100).
    BatteryInfo(u8),

    /// Cleaning mode or activity.
    CleanReport(CleanStatus),

    /// Suction power.
    FanSpeed(FanSpeed),

    /// Area of the last custom clean.
    LastAreaValues(Area),

    /// Error description. Empty means no error.
    Error(String),

    /// Remaining life of a known consumable.
    LifeSpan {
        /// Canonical component name.
        component: String,
        /// Percent remaining.
        percent: f64,
    },

    /// Water flow level (1-4).
    WaterLevel(u8),

    /// Whether the water box is installed.
    WaterBoxInfo(bool),

    /// Whether the dust case is installed.
    DustCaseInfo(bool),

    /// Robot pose.
    DeebotPosition(Position),

    /// Charger pose.
    ChargePosition(Position),

    /// IP address.
    NetInfoIp(String),

    /// Wi-Fi SSID.
    NetInfoWifiSsid(String),

    /// Sleep status.
    SleepStatus(bool),

    /// Total cleaned area in square meters.
    CleanSumTotalSquareMeters(i64),

    /// Total cleaning time in seconds.
    CleanSumTotalSeconds(i64),

    /// Number of cleaning sessions.
    CleanSumTotalNumber(i64),
}

impl DeviceEvent {
    /// Returns the public event name.
    #[must_use]
    pub fn name(&self) -> Cow<'static, str> {
        let name = match self {
            Self::ChargeState(_) => "ChargeState",
            Self::BatteryInfo(_) => "BatteryInfo",
            Self::CleanReport(_) => "CleanReport",
            Self::FanSpeed(_) => "FanSpeed",
            Self::LastAreaValues(_) => "LastAreaValues",
            Self::Error(_) => "Error",
            Self::LifeSpan { component, .. } => {
                return Cow::Owned(format!("LifeSpan_{component}"));
            }
            Self::WaterLevel(_) => "WaterLevel",
            Self::WaterBoxInfo(_) => "WaterBoxInfo",
            Self::DustCaseInfo(_) => "DustCaseInfo",
            Self::DeebotPosition(_) => "DeebotPosition",
            Self::ChargePosition(_) => "ChargePosition",
            Self::NetInfoIp(_) => "NetInfoIP",
            Self::NetInfoWifiSsid(_) => "NetInfoWifiSSID",
            Self::SleepStatus(_) => "SleepStatus",
            Self::CleanSumTotalSquareMeters(_) => "CleanSum_totalSquareMeters",
            Self::CleanSumTotalSeconds(_) => "CleanSum_totalSeconds",
            Self::CleanSumTotalNumber(_) => "CleanSum_totalNumber",
        };
        Cow::Borrowed(name)
    }

    /// Returns `true` if this event reports a device error.
    ///
    /// An empty description means the robot reported that it is
    /// operational, so it is not counted.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(message) if !message.is_empty())
    }

    /// Maps a single state change to its event.
    ///
    /// Returns `None` for lifespans of components without public events.
    /// Cleaning totals map to the square-meter event only; the emitter
    /// fans them out.
    #[must_use]
    pub fn for_change(change: &StateChange) -> Option<Self> {
        let event = match change {
            StateChange::CleanStatus(status) => Self::CleanReport(*status),
            StateChange::FanSpeed(speed) => Self::FanSpeed(*speed),
            StateChange::LastCleanedArea(area) => Self::LastAreaValues(*area),
            StateChange::ChargeStatus(status) => Self::ChargeState(*status),
            StateChange::BatteryLevel(level) => Self::BatteryInfo(*level),
            StateChange::WaterLevel(level) => Self::WaterLevel(*level),
            StateChange::WaterBoxPresent(present) => Self::WaterBoxInfo(*present),
            StateChange::DustCasePresent(present) => Self::DustCaseInfo(*present),
            StateChange::SleepStatus(asleep) => Self::SleepStatus(*asleep),
            StateChange::Pose(pose) => Self::DeebotPosition(pose.clone()),
            StateChange::ChargerPose(pose) => Self::ChargePosition(pose.clone()),
            StateChange::Lifespan { component, percent } => {
                if !vendor::is_known_component(component) {
                    return None;
                }
                Self::LifeSpan {
                    component: component.clone(),
                    percent: *percent,
                }
            }
            StateChange::NetworkIp(ip) => Self::NetInfoIp(ip.clone()),
            StateChange::NetworkSsid(ssid) => Self::NetInfoWifiSsid(ssid.clone()),
            StateChange::CleaningTotals(totals) => {
                Self::CleanSumTotalSquareMeters(totals.area_square_meters)
            }
            StateChange::LastError(message) => Self::Error(message.clone()),
        };
        Some(event)
    }
}
