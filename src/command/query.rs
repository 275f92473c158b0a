// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Query commands, one per pollable message kind.

use crate::classify::MessageKind;
use crate::command::Command;
use crate::vendor;

/// A read-only query whose reply updates the device state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryCommand {
    /// Charging state.
    GetChargeState,
    /// Battery level.
    GetBatteryInfo,
    /// Cleaning status.
    GetCleanState,
    /// Fan speed.
    GetCleanSpeed,
    /// Remaining life of a consumable, by canonical component name.
    ///
    /// Names without a vendor code are sent verbatim.
    GetLifeSpan(String),
    /// Mopping water level.
    GetWaterLevel,
    /// Water box presence.
    GetWaterBoxInfo,
    /// Dust case presence.
    GetDustCaseState,
    /// Network information.
    GetNetInfo,
    /// Robot pose.
    GetPos,
    /// Charger pose.
    GetChargerPos,
    /// Sleep status.
    GetSleepStatus,
    /// Cleaning totals.
    GetCleanSum,
    /// Last device error.
    GetError,
}

impl QueryCommand {
    /// Returns one query per known consumable component.
    #[must_use]
    pub fn all_lifespans() -> Vec<Self> {
        vendor::KNOWN_COMPONENTS
            .iter()
            .map(|component| Self::GetLifeSpan((*component).to_string()))
            .collect()
    }

    /// Returns the message kind the reply is expected to classify as.
    #[must_use]
    pub const fn reply_kind(&self) -> MessageKind {
        match self {
            Self::GetChargeState => MessageKind::ChargeState,
            Self::GetBatteryInfo => MessageKind::BatteryInfo,
            Self::GetCleanState | Self::GetCleanSpeed => MessageKind::CleanReport,
            Self::GetLifeSpan(_) => MessageKind::LifeSpan,
            Self::GetWaterLevel => MessageKind::WaterLevel,
            Self::GetWaterBoxInfo => MessageKind::WaterBoxInfo,
            Self::GetDustCaseState => MessageKind::DustCaseInfo,
            Self::GetNetInfo => MessageKind::NetInfo,
            Self::GetPos => MessageKind::DeebotPosition,
            Self::GetChargerPos => MessageKind::ChargePosition,
            Self::GetSleepStatus => MessageKind::SleepStatus,
            Self::GetCleanSum => MessageKind::CleanSum,
            Self::GetError => MessageKind::Error,
        }
    }

    const fn token(&self) -> &'static str {
        match self {
            Self::GetChargeState => "GetChargeState",
            Self::GetBatteryInfo => "GetBatteryInfo",
            Self::GetCleanState => "GetCleanState",
            Self::GetCleanSpeed => "GetCleanSpeed",
            Self::GetLifeSpan(_) => "GetLifeSpan",
            Self::GetWaterLevel => "GetWaterLevel",
            Self::GetWaterBoxInfo => "GetWaterBoxInfo",
            Self::GetDustCaseState => "GetDustCaseST",
            Self::GetNetInfo => "GetNetInfo",
            Self::GetPos => "GetPos",
            Self::GetChargerPos => "GetChargerPos",
            Self::GetSleepStatus => "GetSleepStatus",
            Self::GetCleanSum => "GetCleanSum",
            Self::GetError => "GetError",
        }
    }
}

impl Command for QueryCommand {
    fn name(&self) -> String {
        self.token().to_string()
    }

    fn attributes(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::GetLifeSpan(component) => {
                let code = vendor::component_code(component).unwrap_or(component.as_str());
                vec![("type", code.to_string())]
            }
            _ => Vec::new(),
        }
    }
}
