// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Canonical device state.
//!
//! The [`DeviceState`] struct holds the latest known value of every tracked
//! attribute, while [`StateChange`] represents individual changes that can be
//! applied. [`project`] turns a classified vendor fragment into those changes.
//!
//! # Examples
//!
//! ```
//! use vacbot_lib::state::{DeviceState, StateChange};
//! use vacbot_lib::types::CleanStatus;
//!
//! let mut state = DeviceState::new();
//!
//! let change = StateChange::CleanStatus(CleanStatus::Auto);
//! state.apply(&change);
//!
//! assert_eq!(state.clean_status(), Some(CleanStatus::Auto));
//! ```

mod device_state;
mod projector;
mod state_change;

pub use device_state::DeviceState;
pub use projector::{Projection, project};
pub use state_change::StateChange;
