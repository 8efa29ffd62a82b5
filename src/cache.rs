// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Latest observed state per fan.
//!
//! The [`StateCache`] holds one [`CachedState`] per broadcasting IP. Only the
//! telemetry listener writes to it; any number of readers can query it or
//! subscribe to its updates. Each entry is replaced as a whole under a single
//! lock, so a reader never sees fields from two different broadcasts.
//!
//! There is no sequencing information in the wire protocol: the most recently
//! received broadcast always wins, even if UDP delivered it out of order.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::event::{DeviceEvent, EventBus, StateUpdate, Subscription};
use crate::state::DeviceState;

/// A cached state and when it was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct CachedState {
    /// The last broadcast state.
    pub state: DeviceState,
    /// When that broadcast was received.
    pub updated_at: DateTime<Utc>,
}

/// Thread-safe store of the latest state per device IP.
///
/// Cloning is cheap and every clone shares the same entries and event bus.
#[derive(Debug, Clone)]
pub struct StateCache {
    inner: Arc<CacheInner>,
}

#[derive(Debug)]
struct CacheInner {
    entries: RwLock<HashMap<IpAddr, CachedState>>,
    events: EventBus,
}

impl StateCache {
    /// Creates an empty cache that publishes updates on `events`.
    #[must_use]
    pub fn new(events: EventBus) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                entries: RwLock::new(HashMap::new()),
                events,
            }),
        }
    }

    /// Stores a newly received state and notifies subscribers.
    ///
    /// The previous entry is overwritten unconditionally. The published
    /// event lists the fields that changed relative to it.
    pub(crate) fn update(
        &self,
        ip: IpAddr,
        name: Option<&str>,
        device_id: Option<&str>,
        state: DeviceState,
        received_at: DateTime<Utc>,
    ) -> StateUpdate {
        let mut entries = self.inner.entries.write();
        let previous = entries.insert(
            ip,
            CachedState {
                state,
                updated_at: received_at,
            },
        );

        let changes = match previous {
            Some(prev) => prev.state.diff(&state),
            None => state.as_changes(),
        };
        let update = StateUpdate {
            ip,
            name: name.map(str::to_string),
            device_id: device_id.map(str::to_string),
            state,
            changes,
            received_at,
        };

        // Publish while still holding the lock so event order matches cache order
        self.inner
            .events
            .publish(DeviceEvent::StateChanged(update.clone()));
        drop(entries);

        tracing::trace!(%ip, name = ?name, %state, "Cached device state");
        update
    }

    /// Returns the last state received from `ip`.
    #[must_use]
    pub fn get(&self, ip: IpAddr) -> Option<DeviceState> {
        self.inner.entries.read().get(&ip).map(|entry| entry.state)
    }

    /// Returns the last state received from `ip` with its timestamp.
    #[must_use]
    pub fn entry(&self, ip: IpAddr) -> Option<CachedState> {
        self.inner.entries.read().get(&ip).copied()
    }

    /// Returns every cached entry.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<IpAddr, CachedState> {
        self.inner.entries.read().clone()
    }

    /// Returns the number of IPs with a cached state.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.entries.read().len()
    }

    /// Returns `true` if nothing has been cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.entries.read().is_empty()
    }

    /// Subscribes to updates published from now on.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        self.inner.events.subscribe()
    }

    pub(crate) fn events(&self) -> &EventBus {
        &self.inner.events
    }
}

impl Default for StateCache {
    fn default() -> Self {
        Self::new(EventBus::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateChange;
    use crate::types::FanSpeed;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn get_on_empty_cache() {
        let cache = StateCache::default();
        assert!(cache.is_empty());
        assert_eq!(cache.get(ip("10.0.0.1")), None);
    }

    #[test]
    fn update_then_get() {
        let cache = StateCache::default();
        let now = Utc::now();
        let state = DeviceState::from_packed(0x13);

        cache.update(ip("10.0.0.1"), Some("Fan"), None, state, now);

        assert_eq!(cache.get(ip("10.0.0.1")), Some(state));
        assert_eq!(
            cache.entry(ip("10.0.0.1")),
            Some(CachedState {
                state,
                updated_at: now
            })
        );
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn newest_update_wins_regardless_of_timestamp() {
        let cache = StateCache::default();
        let later = Utc::now();
        let earlier = later - chrono::Duration::seconds(10);

        cache.update(ip("10.0.0.1"), None, None, DeviceState::from_packed(0x11), later);
        cache.update(ip("10.0.0.1"), None, None, DeviceState::from_packed(0x12), earlier);

        let entry = cache.entry(ip("10.0.0.1")).unwrap();
        assert_eq!(entry.state.speed().value(), 2);
        assert_eq!(entry.updated_at, earlier);
    }

    #[test]
    fn first_update_lists_every_field() {
        let cache = StateCache::default();
        let update = cache.update(ip("10.0.0.1"), None, None, DeviceState::new(), Utc::now());
        assert_eq!(update.changes.len(), 6);
    }

    #[test]
    fn later_update_lists_only_differences() {
        let cache = StateCache::default();
        let base = DeviceState::new().with_power(true);
        cache.update(ip("10.0.0.1"), None, None, base, Utc::now());

        let next = base.with_speed(FanSpeed::new(2).unwrap());
        let update = cache.update(ip("10.0.0.1"), None, None, next, Utc::now());
        assert_eq!(
            update.changes,
            vec![StateChange::Speed(FanSpeed::new(2).unwrap())]
        );
    }

    #[tokio::test]
    async fn subscribers_each_see_every_update_in_order() {
        let cache = StateCache::default();
        let mut subs: Vec<_> = (0..3).map(|_| cache.subscribe()).collect();

        for speed in 0..=6 {
            cache.update(
                ip("10.0.0.1"),
                Some("Fan"),
                Some("a1b2c3"),
                DeviceState::new().with_speed(FanSpeed::new(speed).unwrap()),
                Utc::now(),
            );
        }

        for sub in &mut subs {
            for expected in 0..=6 {
                let update = sub.next_state().await.unwrap();
                assert_eq!(update.state.speed().value(), expected);
                assert_eq!(update.name.as_deref(), Some("Fan"));
                assert_eq!(update.device_id.as_deref(), Some("a1b2c3"));
            }
        }
    }

    #[test]
    fn burst_of_updates_is_not_dropped_for_an_idle_subscriber() {
        let cache = StateCache::default();
        let mut sub = cache.subscribe();

        for packed in 0..300u32 {
            cache.update(
                ip("10.0.0.1"),
                None,
                None,
                DeviceState::from_packed(0x10 | (packed % 7)),
                Utc::now(),
            );
        }

        let mut seen = 0u32;
        while let Some(event) = sub.try_recv() {
            let update = event.state_update().unwrap();
            assert_eq!(u32::from(update.state.speed().value()), seen % 7);
            seen += 1;
        }
        assert_eq!(seen, 300);
    }

    #[test]
    fn cached_entry_serializes_with_timestamp() {
        let cache = StateCache::default();
        let now = Utc::now();
        cache.update(ip("10.0.0.1"), None, None, DeviceState::from_packed(0x13), now);

        let json = serde_json::to_value(cache.entry(ip("10.0.0.1")).unwrap()).unwrap();
        let stamp: DateTime<Utc> = serde_json::from_value(json["updated_at"].clone()).unwrap();
        assert_eq!(stamp, now);
        assert!(json["state"].is_object());
    }

    #[test]
    fn clones_share_entries() {
        let cache = StateCache::default();
        let reader = cache.clone();
        cache.update(ip("10.0.0.2"), None, None, DeviceState::new(), Utc::now());
        assert!(reader.get(ip("10.0.0.2")).is_some());
        assert_eq!(reader.snapshot().len(), 1);
    }
}
