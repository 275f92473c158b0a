// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback management for device event subscriptions.
//!
//! - [`SubscriptionId`] - Unique identifier for unsubscribing
//! - [`CallbackRegistry`] - Registry for storing and dispatching callbacks

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::event::DeviceEvent;
use crate::state::StateChange;

/// Unique identifier for a subscription.
///
/// IDs are unique within a registry's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    #[must_use]
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

type EventCallback = Arc<dyn Fn(&DeviceEvent) + Send + Sync>;

type StateChangedCallback = Arc<dyn Fn(&StateChange) + Send + Sync>;

type DisconnectedCallback = Arc<dyn Fn() + Send + Sync>;

/// A callback bound to one public event name.
struct NamedCallback {
    name: String,
    callback: EventCallback,
}

/// Registry for managing device subscription callbacks.
///
/// Uses `parking_lot::RwLock` for interior mutability so callbacks can be
/// registered and dispatched from several tasks. Callbacks are cloned out of
/// the lock before they run, so a callback may itself subscribe or
/// unsubscribe.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicU8, Ordering};
///
/// use vacbot_lib::event::DeviceEvent;
/// use vacbot_lib::subscription::CallbackRegistry;
///
/// let registry = CallbackRegistry::new();
/// let level = Arc::new(AtomicU8::new(0));
/// let seen = level.clone();
///
/// registry.on_event("BatteryInfo", move |event| {
///     if let DeviceEvent::BatteryInfo(value) = event {
///         seen.store(*value, Ordering::SeqCst);
///     }
/// });
///
/// registry.dispatch(&DeviceEvent::BatteryInfo(80));
/// assert_eq!(level.load(Ordering::SeqCst), 80);
/// ```
pub struct CallbackRegistry {
    next_id: AtomicU64,
    /// Callbacks for a single event name.
    named_callbacks: RwLock<HashMap<SubscriptionId, NamedCallback>>,
    /// Callbacks receiving every event.
    any_callbacks: RwLock<HashMap<SubscriptionId, EventCallback>>,
    /// Callbacks receiving every state change, including silent ones.
    state_changed_callbacks: RwLock<HashMap<SubscriptionId, StateChangedCallback>>,
    disconnected_callbacks: RwLock<HashMap<SubscriptionId, DisconnectedCallback>>,
}

impl CallbackRegistry {
    /// Creates a new empty callback registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            named_callbacks: RwLock::new(HashMap::new()),
            any_callbacks: RwLock::new(HashMap::new()),
            state_changed_callbacks: RwLock::new(HashMap::new()),
            disconnected_callbacks: RwLock::new(HashMap::new()),
        }
    }

    fn next_id(&self) -> SubscriptionId {
        SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    // =========================================================================
    // Registration methods
    // =========================================================================

    /// Registers a callback for one public event name (e.g. `"BatteryInfo"`,
    /// `"LifeSpan_filter"`).
    pub fn on_event<F>(&self, name: impl Into<String>, callback: F) -> SubscriptionId
    where
        F: Fn(&DeviceEvent) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.named_callbacks.write().insert(
            id,
            NamedCallback {
                name: name.into(),
                callback: Arc::new(callback),
            },
        );
        id
    }

    /// Registers a callback for every event.
    pub fn on_any_event<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&DeviceEvent) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.any_callbacks.write().insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback for all state changes.
    ///
    /// Unlike events, this also sees changes that update state silently
    /// (lifespans of components without public events).
    pub fn on_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&StateChange) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.state_changed_callbacks
            .write()
            .insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback for when the device is disconnected.
    pub fn on_disconnected<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.disconnected_callbacks
            .write()
            .insert(id, Arc::new(callback));
        id
    }

    // =========================================================================
    // Unsubscription
    // =========================================================================

    /// Unregisters a callback by its subscription ID.
    ///
    /// Returns `true` if a callback was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.named_callbacks.write().remove(&id).is_some()
            || self.any_callbacks.write().remove(&id).is_some()
            || self.state_changed_callbacks.write().remove(&id).is_some()
            || self.disconnected_callbacks.write().remove(&id).is_some()
    }

    /// Clears all callbacks.
    pub fn clear(&self) {
        self.named_callbacks.write().clear();
        self.any_callbacks.write().clear();
        self.state_changed_callbacks.write().clear();
        self.disconnected_callbacks.write().clear();
    }

    // =========================================================================
    // Dispatch methods
    // =========================================================================

    /// Dispatches an event to catch-all callbacks and to callbacks registered
    /// for its name.
    ///
    /// Callbacks are called synchronously in an arbitrary order.
    pub fn dispatch(&self, event: &DeviceEvent) {
        let name = event.name();
        let callbacks: Vec<EventCallback> = {
            let any = self.any_callbacks.read();
            let named = self.named_callbacks.read();
            any.values()
                .cloned()
                .chain(
                    named
                        .values()
                        .filter(|entry| entry.name == name)
                        .map(|entry| entry.callback.clone()),
                )
                .collect()
        };
        for callback in callbacks {
            callback(event);
        }
    }

    /// Dispatches a state change to generic state-change callbacks.
    pub fn dispatch_state_change(&self, change: &StateChange) {
        let callbacks: Vec<StateChangedCallback> =
            self.state_changed_callbacks.read().values().cloned().collect();
        for callback in callbacks {
            callback(change);
        }
    }

    /// Dispatches the disconnected event.
    pub fn dispatch_disconnected(&self) {
        let callbacks: Vec<DisconnectedCallback> =
            self.disconnected_callbacks.read().values().cloned().collect();
        for callback in callbacks {
            callback();
        }
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    /// Returns the total number of registered callbacks.
    #[must_use]
    pub fn callback_count(&self) -> usize {
        self.named_callbacks.read().len()
            + self.any_callbacks.read().len()
            + self.state_changed_callbacks.read().len()
            + self.disconnected_callbacks.read().len()
    }

    /// Returns `true` if there are no registered callbacks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callback_count() == 0
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("callback_count", &self.callback_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    fn counter() -> (Arc<AtomicU32>, Arc<AtomicU32>) {
        let counter = Arc::new(AtomicU32::new(0));
        (counter.clone(), counter)
    }

    #[test]
    fn subscription_id_display() {
        let id = SubscriptionId::new(42);
        assert_eq!(id.to_string(), "Sub(42)");
        assert_eq!(id.value(), 42);
    }

    #[test]
    fn registry_new_is_empty() {
        let registry = CallbackRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.callback_count(), 0);
    }

    #[test]
    fn named_callback_filters_by_name() {
        let registry = CallbackRegistry::new();
        let (count, seen) = counter();

        let id = registry.on_event("WaterLevel", move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        registry.dispatch(&DeviceEvent::WaterLevel(2));
        registry.dispatch(&DeviceEvent::BatteryInfo(50));
        assert_eq!(count.load(Ordering::SeqCst), 1);

        assert!(registry.unsubscribe(id));
        registry.dispatch(&DeviceEvent::WaterLevel(3));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn lifespan_callbacks_are_component_scoped() {
        let registry = CallbackRegistry::new();
        let (count, seen) = counter();

        registry.on_event("LifeSpan_filter", move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        registry.dispatch(&DeviceEvent::LifeSpan {
            component: "main_brush".to_string(),
            percent: 10.0,
        });
        registry.dispatch(&DeviceEvent::LifeSpan {
            component: "filter".to_string(),
            percent: 10.0,
        });
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn any_callback_sees_every_event() {
        let registry = CallbackRegistry::new();
        let (count, seen) = counter();

        registry.on_any_event(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        registry.dispatch(&DeviceEvent::WaterLevel(2));
        registry.dispatch(&DeviceEvent::Error(String::new()));
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn state_change_and_disconnect_callbacks() {
        let registry = CallbackRegistry::new();
        let (changes, seen_changes) = counter();
        let (disconnects, seen_disconnects) = counter();

        registry.on_state_changed(move |_| {
            seen_changes.fetch_add(1, Ordering::SeqCst);
        });
        registry.on_disconnected(move || {
            seen_disconnects.fetch_add(1, Ordering::SeqCst);
        });

        registry.dispatch_state_change(&StateChange::lifespan("Mop", 1.0));
        registry.dispatch_disconnected();

        assert_eq!(changes.load(Ordering::SeqCst), 1);
        assert_eq!(disconnects.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn callback_may_unsubscribe_itself() {
        let registry = Arc::new(CallbackRegistry::new());
        let inner = registry.clone();
        let id = Arc::new(RwLock::new(None::<SubscriptionId>));
        let slot = id.clone();

        let sub = registry.on_any_event(move |_| {
            if let Some(id) = *slot.read() {
                inner.unsubscribe(id);
            }
        });
        *id.write() = Some(sub);

        registry.dispatch(&DeviceEvent::SleepStatus(true));
        assert!(registry.is_empty());
    }

    #[test]
    fn unsubscribe_nonexistent() {
        let registry = CallbackRegistry::new();
        assert!(!registry.unsubscribe(SubscriptionId::new(999)));
    }

    #[test]
    fn clear_and_unique_ids() {
        let registry = CallbackRegistry::new();

        let id1 = registry.on_event("BatteryInfo", |_| {});
        let id2 = registry.on_any_event(|_| {});
        let id3 = registry.on_disconnected(|| {});
        assert_ne!(id1, id2);
        assert_ne!(id2, id3);
        assert_eq!(registry.callback_count(), 3);

        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn registry_debug() {
        let registry = CallbackRegistry::new();
        registry.on_any_event(|_| {});

        let debug = format!("{registry:?}");
        assert!(debug.contains("callback_count"));
    }
}
