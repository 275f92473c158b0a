// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `VacBot` Lib - A Rust library to track cloud-relayed robot vacuums.
//!
//! The vendor protocol has no reliable message-type field: inbound payloads
//! are attribute bags whose kind is inferred from the keys they carry. This
//! library classifies those bags, normalizes the vendor encodings into a
//! typed device state and publishes named events for every change, the same
//! way for every transport.
//!
//! # Pipeline
//!
//! 1. A transport delivers a [`Fragment`] (decoded from XML or JSON)
//! 2. [`classify::classify`] labels it with a [`MessageKind`]
//! 3. [`state::project`] updates the [`DeviceState`] and returns the changes
//! 4. [`event::emit`] turns the changes into [`DeviceEvent`]s
//!
//! # Transports
//!
//! - **HTTP** (feature `http`): request/response calls to the vendor portal
//! - **MQTT** (feature `mqtt`): push session over the vendor broker
//!
//! Both are enabled by default. Any type implementing
//! [`protocol::Transport`] can be used instead.
//!
//! # Quick Start
//!
//! ```no_run
//! use vacbot_lib::command::QueryCommand;
//! use vacbot_lib::subscription::Subscribable;
//! use vacbot_lib::{VacBot, VacBotConfig};
//!
//! #[tokio::main]
//! async fn main() -> vacbot_lib::Result<()> {
//!     let config = VacBotConfig::new("user", "ecouser.net", "token", "E0001", "ls1ok3")
//!         .with_company("eco-ng")
//!         .with_continent("eu");
//!     let bot = VacBot::http(config)?;
//!
//!     bot.on_event("BatteryInfo", |event| println!("{event:?}"));
//!
//!     bot.send_command(&QueryCommand::GetBatteryInfo).await?;
//!     bot.send_command(&QueryCommand::GetCleanState).await?;
//!
//!     println!("{:?}", bot.state().clean_status());
//!     Ok(())
//! }
//! ```
//!
//! # Without a transport
//!
//! The pipeline is synchronous and can be driven directly:
//!
//! ```
//! use vacbot_lib::classify::{MessageKind, classify};
//! use vacbot_lib::event::emit;
//! use vacbot_lib::fragment::Fragment;
//! use vacbot_lib::state::{DeviceState, project};
//!
//! let fragment = Fragment::from_xml(r#"<ctl td="ChargeState"><charge type="SlotCharging"/></ctl>"#)?;
//! let kind = classify(&fragment);
//! assert_eq!(kind, MessageKind::ChargeState);
//!
//! let projection = project(kind, &fragment, &DeviceState::new());
//! let events = emit(kind, &projection.changes, &projection.state);
//! assert_eq!(events[0].name(), "ChargeState");
//! # Ok::<(), vacbot_lib::ParseError>(())
//! ```

pub mod classify;
pub mod command;
mod config;
mod device;
pub mod error;
pub mod event;
pub mod fragment;
pub mod protocol;
pub mod state;
pub mod subscription;
pub mod types;
pub mod vendor;

pub use classify::MessageKind;
pub use command::{Command, QueryCommand};
pub use config::{MQTT_COMPANY, VacBotConfig};
pub use device::VacBot;
pub use error::{ConfigError, Error, ParseError, ProtocolError, Result};
pub use event::{DeviceEvent, EventBus};
pub use fragment::Fragment;
pub use protocol::{Inbound, Transport};
pub use state::{DeviceState, StateChange};
pub use subscription::{CallbackRegistry, Subscribable, SubscriptionId};
pub use types::{Area, ChargeStatus, CleanStatus, CleaningTotals, FanSpeed, NetworkInfo, Position};
