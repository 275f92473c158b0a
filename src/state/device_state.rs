// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state tracking.

use std::collections::BTreeMap;

use crate::types::{
    Area, ChargeStatus, CleanStatus, CleaningTotals, FanSpeed, NetworkInfo, Position,
};

use super::StateChange;

/// Tracked state of a robot vacuum.
///
/// Every field is optional because nothing is known until the robot reports
/// it. State is only modified through [`DeviceState::apply`].
///
/// # Examples
///
/// ```
/// use vacbot_lib::state::{DeviceState, StateChange};
/// use vacbot_lib::types::ChargeStatus;
///
/// let mut state = DeviceState::new();
/// state.apply(&StateChange::ChargeStatus(ChargeStatus::Charging));
/// assert_eq!(state.charge_status(), Some(ChargeStatus::Charging));
/// assert!(state.battery_level().is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DeviceState {
    clean_status: Option<CleanStatus>,
    fan_speed: Option<FanSpeed>,
    last_cleaned_area: Option<Area>,
    charge_status: Option<ChargeStatus>,
    /// Battery level (0-100).
    battery_level: Option<u8>,
    /// Water flow level (1-4).
    water_level: Option<u8>,
    water_box_present: Option<bool>,
    dust_case_present: Option<bool>,
    sleep_status: Option<bool>,
    pose: Option<Position>,
    charger_pose: Option<Position>,
    /// Percent remaining by component name.
    component_lifespans: BTreeMap<String, f64>,
    network_info: NetworkInfo,
    cleaning_totals: Option<CleaningTotals>,
    /// Empty string means no error.
    last_error: Option<String>,
}

impl DeviceState {
    /// Creates a new empty device state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Cleaning ==========

    /// Gets the cleaning mode or activity.
    #[must_use]
    pub fn clean_status(&self) -> Option<CleanStatus> {
        self.clean_status
    }

    /// Gets the suction power.
    #[must_use]
    pub fn fan_speed(&self) -> Option<FanSpeed> {
        self.fan_speed
    }

    /// Gets the area of the last custom clean.
    #[must_use]
    pub fn last_cleaned_area(&self) -> Option<Area> {
        self.last_cleaned_area
    }

    /// Gets the lifetime cleaning statistics.
    #[must_use]
    pub fn cleaning_totals(&self) -> Option<CleaningTotals> {
        self.cleaning_totals
    }

    // ========== Power ==========

    /// Gets the charging status.
    #[must_use]
    pub fn charge_status(&self) -> Option<ChargeStatus> {
        self.charge_status
    }

    /// Gets the battery level (0-100).
    #[must_use]
    pub fn battery_level(&self) -> Option<u8> {
        self.battery_level
    }

    /// Gets the sleep status.
    #[must_use]
    pub fn sleep_status(&self) -> Option<bool> {
        self.sleep_status
    }

    // ========== Accessories ==========

    /// Gets the water flow level (1-4).
    #[must_use]
    pub fn water_level(&self) -> Option<u8> {
        self.water_level
    }

    /// Returns whether the water box is installed.
    #[must_use]
    pub fn water_box_present(&self) -> Option<bool> {
        self.water_box_present
    }

    /// Returns whether the dust case is installed.
    #[must_use]
    pub fn dust_case_present(&self) -> Option<bool> {
        self.dust_case_present
    }

    /// Gets the remaining life of a component in percent.
    #[must_use]
    pub fn lifespan(&self, component: &str) -> Option<f64> {
        self.component_lifespans.get(component).copied()
    }

    /// Returns all known component lifespans, ordered by component name.
    pub fn lifespans(&self) -> impl Iterator<Item = (&str, f64)> {
        self.component_lifespans
            .iter()
            .map(|(name, percent)| (name.as_str(), *percent))
    }

    // ========== Location ==========

    /// Gets the robot pose.
    #[must_use]
    pub fn pose(&self) -> Option<&Position> {
        self.pose.as_ref()
    }

    /// Gets the charger pose.
    #[must_use]
    pub fn charger_pose(&self) -> Option<&Position> {
        self.charger_pose.as_ref()
    }

    // ========== Network & Errors ==========

    /// Gets the network information.
    #[must_use]
    pub fn network_info(&self) -> &NetworkInfo {
        &self.network_info
    }

    /// Gets the last reported error.
    ///
    /// `Some("")` means the robot reported that it has no error.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // ========== State Changes ==========

    /// Applies a state change and returns whether the state actually changed.
    ///
    /// # Returns
    ///
    /// Returns `true` if the state was modified, `false` if it was already
    /// at the target value.
    pub fn apply(&mut self, change: &StateChange) -> bool {
        match change {
            StateChange::CleanStatus(status) => replace(&mut self.clean_status, *status),
            StateChange::FanSpeed(speed) => replace(&mut self.fan_speed, *speed),
            StateChange::LastCleanedArea(area) => replace(&mut self.last_cleaned_area, *area),
            StateChange::ChargeStatus(status) => replace(&mut self.charge_status, *status),
            StateChange::BatteryLevel(level) => replace(&mut self.battery_level, *level),
            StateChange::WaterLevel(level) => replace(&mut self.water_level, *level),
            StateChange::WaterBoxPresent(present) => {
                replace(&mut self.water_box_present, *present)
            }
            StateChange::DustCasePresent(present) => {
                replace(&mut self.dust_case_present, *present)
            }
            StateChange::SleepStatus(asleep) => replace(&mut self.sleep_status, *asleep),
            StateChange::Pose(pose) => replace_ref(&mut self.pose, pose),
            StateChange::ChargerPose(pose) => replace_ref(&mut self.charger_pose, pose),
            StateChange::Lifespan { component, percent } => {
                if self.component_lifespans.get(component) == Some(percent) {
                    false
                } else {
                    self.component_lifespans.insert(component.clone(), *percent);
                    true
                }
            }
            StateChange::NetworkIp(ip) => replace_ref(&mut self.network_info.ip, ip),
            StateChange::NetworkSsid(ssid) => replace_ref(&mut self.network_info.ssid, ssid),
            StateChange::CleaningTotals(totals) => replace(&mut self.cleaning_totals, *totals),
            StateChange::LastError(message) => replace_ref(&mut self.last_error, message),
        }
    }

    /// Clears all state, resetting to unknown.
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

fn replace<T: PartialEq>(slot: &mut Option<T>, value: T) -> bool {
    if slot.as_ref() == Some(&value) {
        false
    } else {
        *slot = Some(value);
        true
    }
}

fn replace_ref<T: PartialEq + Clone>(slot: &mut Option<T>, value: &T) -> bool {
    if slot.as_ref() == Some(value) {
        false
    } else {
        *slot = Some(value.clone());
        true
    }
}
