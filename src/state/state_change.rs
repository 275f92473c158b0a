// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State change representation.
//!
//! State changes are the only way to update a [`DeviceState`](super::DeviceState).
//! Projectors produce them from vendor fragments; the emitter turns them into
//! public events.
//!
//! # Examples
//!
//! ```
//! use vacbot_lib::state::{DeviceState, StateChange};
//!
//! let mut state = DeviceState::new();
//!
//! // Apply returns true if state actually changed
//! assert!(state.apply(&StateChange::BatteryLevel(80)));
//!
//! // Applying the same change again returns false
//! assert!(!state.apply(&StateChange::BatteryLevel(80)));
//! ```

use crate::types::{Area, ChargeStatus, CleanStatus, CleaningTotals, FanSpeed, Position};

/// A single change to the canonical device state.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum StateChange {
    /// Cleaning mode or activity changed.
    CleanStatus(CleanStatus),

    /// Suction power changed.
    FanSpeed(FanSpeed),

    /// Area of the last custom clean changed.
    LastCleanedArea(Area),

    /// Charging status changed.
    ChargeStatus(ChargeStatus),

    /// Battery level changed (0-100).
    BatteryLevel(u8),

    /// Water flow level changed (1-4).
    WaterLevel(u8),

    /// Water box was installed or removed.
    WaterBoxPresent(bool),

    /// Dust case was installed or removed.
    DustCasePresent(bool),

    /// Sleep status changed.
    SleepStatus(bool),

    /// Robot pose changed.
    Pose(Position),

    /// Charger pose changed.
    ChargerPose(Position),

    /// Remaining life of a consumable changed.
    Lifespan {
        /// Canonical component name (`main_brush`, `side_brush`, `filter`)
        /// or the vendor code for components without a canonical name.
        component: String,
        /// Percent remaining.
        percent: f64,
    },

    /// IP address changed.
    NetworkIp(String),

    /// Wi-Fi SSID changed.
    NetworkSsid(String),

    /// Lifetime cleaning statistics changed.
    CleaningTotals(CleaningTotals),

    /// Last reported error changed. Empty means no error.
    LastError(String),
}

impl StateChange {
    /// Creates a lifespan change.
    #[must_use]
    pub fn lifespan(component: impl Into<String>, percent: f64) -> Self {
        Self::Lifespan {
            component: component.into(),
            percent,
        }
    }

    /// Creates an error change.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::LastError(message.into())
    }

    /// Creates a change clearing the last error.
    #[must_use]
    pub fn no_error() -> Self {
        Self::LastError(String::new())
    }

    /// Returns the name of the state field this change targets.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::CleanStatus(_) => "clean_status",
            Self::FanSpeed(_) => "fan_speed",
            Self::LastCleanedArea(_) => "last_cleaned_area",
            Self::ChargeStatus(_) => "charge_status",
            Self::BatteryLevel(_) => "battery_level",
            Self::WaterLevel(_) => "water_level",
            Self::WaterBoxPresent(_) => "water_box_present",
            Self::DustCasePresent(_) => "dust_case_present",
            Self::SleepStatus(_) => "sleep_status",
            Self::Pose(_) => "pose",
            Self::ChargerPose(_) => "charger_pose",
            Self::Lifespan { .. } => "component_lifespans",
            Self::NetworkIp(_) => "network_ip",
            Self::NetworkSsid(_) => "network_ssid",
            Self::CleaningTotals(_) => "cleaning_totals",
            Self::LastError(_) => "last_error",
        }
    }
}
