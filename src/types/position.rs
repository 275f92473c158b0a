// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pose, statistics and network value types.

use std::fmt;

/// Robot or charger pose, kept as the vendor's text.
///
/// The vendor reports `p="x,y"` and `a="angle"`; no unit conversion or
/// rounding is applied.
///
/// # Examples
///
/// ```
/// use vacbot_lib::types::Position;
///
/// let pos = Position::from_report("-120,45", "90").unwrap();
/// assert_eq!(pos.x, "-120");
/// assert_eq!(pos.y, "45");
/// assert_eq!(pos.to_string(), "-120,45,90");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Position {
    /// X coordinate.
    pub x: String,
    /// Y coordinate.
    pub y: String,
    /// Heading, passed through unchanged.
    pub angle: String,
}

impl Position {
    /// Builds a pose from the `p` and `a` attributes.
    ///
    /// Returns `None` when `p` has no comma.
    #[must_use]
    pub fn from_report(p: &str, a: &str) -> Option<Self> {
        let (x, rest) = p.split_once(',')?;
        let y = rest.split(',').next().unwrap_or(rest);
        Some(Self {
            x: x.to_string(),
            y: y.to_string(),
            angle: a.to_string(),
        })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.x, self.y, self.angle)
    }
}

/// Lifetime cleaning statistics. The vendor always reports all three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct CleaningTotals {
    /// Total cleaned area in square meters (truncated to an integer).
    pub area_square_meters: i64,
    /// Total cleaning time in seconds.
    pub seconds: i64,
    /// Number of cleaning sessions.
    pub session_count: i64,
}

/// Network information reported by the robot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct NetworkInfo {
    /// IP address on the local network.
    pub ip: Option<String>,
    /// SSID of the Wi-Fi network.
    pub ssid: Option<String>,
}
