// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event system for device state changes.
//!
//! [`emit`] turns projected state changes into named [`DeviceEvent`]s, and
//! the [`EventBus`] uses tokio's broadcast channel to deliver them to any
//! number of subscribers.
//!
//! # Examples
//!
//! ```
//! use vacbot_lib::event::{DeviceEvent, EventBus};
//!
//! let bus = EventBus::new();
//!
//! // Subscribe to events
//! let mut rx = bus.subscribe();
//!
//! // Publish an event
//! bus.publish(DeviceEvent::BatteryInfo(80));
//! ```

mod device_event;
mod emitter;
mod event_bus;

pub use device_event::DeviceEvent;
pub use emitter::emit;
pub use event_bus::{DEFAULT_CHANNEL_CAPACITY, EventBus};
