// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Canonical value types for vacuum state.
//!
//! Vendor encodings (mode codes, scaled integers, comma-joined coordinates)
//! are translated into these types by the state projector. Everything here is
//! transport-agnostic.
//!
//! # Types
//!
//! - [`CleanStatus`] - What the robot is currently doing
//! - [`CleanAction`] - Action code carried by clean reports
//! - [`FanSpeed`] - Suction power level
//! - [`ChargeStatus`] - Dock/charging state
//! - [`Area`] - Rectangle of the last cleaned area
//! - [`Position`] - Robot or charger pose as reported by the vendor
//! - [`CleaningTotals`] - Lifetime cleaning statistics
//! - [`NetworkInfo`] - IP address and Wi-Fi SSID

mod area;
mod clean;
mod position;

pub use area::Area;
pub use clean::{ChargeStatus, CleanAction, CleanStatus, FanSpeed};
pub use position::{CleaningTotals, NetworkInfo, Position};

/// Lowest water level accepted by the mopping module.
pub const WATER_LEVEL_MIN: u8 = 1;

/// Highest water level accepted by the mopping module.
pub const WATER_LEVEL_MAX: u8 = 4;
