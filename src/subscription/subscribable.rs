// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscribable trait for types that deliver device events to callbacks.

use crate::event::DeviceEvent;
use crate::state::StateChange;
use crate::subscription::SubscriptionId;

/// Trait for types that support event subscriptions.
///
/// # Examples
///
/// ```no_run
/// use vacbot_lib::subscription::Subscribable;
/// use vacbot_lib::{VacBot, VacBotConfig};
///
/// # async fn example() -> vacbot_lib::Result<()> {
/// let config = VacBotConfig::new("user", "ecouser.net", "secret", "E0001", "126")
///     .with_continent("eu");
/// let bot = VacBot::http(config)?;
///
/// let sub_id = bot.on_event("BatteryInfo", |event| {
///     println!("{}: {event:?}", event.name());
/// });
///
/// bot.unsubscribe(sub_id);
/// # Ok(())
/// # }
/// ```
pub trait Subscribable {
    /// Subscribes to one public event name.
    fn on_event<F>(&self, name: &str, callback: F) -> SubscriptionId
    where
        F: Fn(&DeviceEvent) + Send + Sync + 'static;

    /// Subscribes to every event.
    fn on_any_event<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&DeviceEvent) + Send + Sync + 'static;

    /// Subscribes to all state changes, including ones without events.
    fn on_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&StateChange) + Send + Sync + 'static;

    /// Subscribes to disconnection.
    fn on_disconnected<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static;

    /// Unsubscribes a callback by its subscription ID.
    ///
    /// Returns `true` if the subscription was found and removed.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}
