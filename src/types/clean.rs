// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cleaning and charging status enumerations.

use std::fmt;

/// What the robot is currently doing.
///
/// # Examples
///
/// ```
/// use vacbot_lib::types::CleanStatus;
///
/// assert_eq!(CleanStatus::SpotArea.as_str(), "spot_area");
/// assert!(CleanStatus::Pause.is_terminal());
/// assert!(!CleanStatus::Auto.is_terminal());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanStatus {
    /// Automatic whole-floor cleaning.
    Auto,
    /// Edge/border cleaning.
    Edge,
    /// Spot cleaning around the current position.
    Spot,
    /// Cleaning of one or more mapped spot areas.
    SpotArea,
    /// Cleaning of a user-drawn rectangle.
    CustomArea,
    /// Cleaning of a single room.
    SingleRoom,
    /// Driving back to the dock.
    Returning,
    /// Not cleaning.
    Idle,
    /// Cleaning was stopped.
    Stop,
    /// Cleaning was paused.
    Pause,
}

impl CleanStatus {
    /// Returns the canonical string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Edge => "edge",
            Self::Spot => "spot",
            Self::SpotArea => "spot_area",
            Self::CustomArea => "custom_area",
            Self::SingleRoom => "single_room",
            Self::Returning => "returning",
            Self::Idle => "idle",
            Self::Stop => "stop",
            Self::Pause => "pause",
        }
    }

    /// Returns `true` for the two states an action code may force.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Stop | Self::Pause)
    }
}

impl fmt::Display for CleanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action code carried by a clean report (`st` or `act` attribute).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CleanAction {
    /// Cleaning started.
    Start,
    /// Cleaning paused.
    Pause,
    /// Cleaning resumed.
    Resume,
    /// Cleaning stopped.
    Stop,
}

impl CleanAction {
    /// Returns the clean status this action forces, if any.
    ///
    /// Only stop and pause override the reported mode.
    #[must_use]
    pub const fn forced_status(self) -> Option<CleanStatus> {
        match self {
            Self::Pause => Some(CleanStatus::Pause),
            Self::Stop => Some(CleanStatus::Stop),
            Self::Start | Self::Resume => None,
        }
    }
}

/// Suction power level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FanSpeed {
    /// Standard suction.
    Normal,
    /// Strong suction.
    High,
}

impl FanSpeed {
    /// Returns the canonical string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::High => "high",
        }
    }
}

impl fmt::Display for FanSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dock/charging state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeStatus {
    /// Driving back to the dock.
    Returning,
    /// Charging on the dock or by wire.
    Charging,
    /// Not charging.
    Idle,
}

impl ChargeStatus {
    /// Returns the canonical string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Returning => "returning",
            Self::Charging => "charging",
            Self::Idle => "idle",
        }
    }
}

impl fmt::Display for ChargeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
