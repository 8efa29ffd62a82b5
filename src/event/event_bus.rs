// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Multicast channel behind every [`Subscription`].

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc::{self, UnboundedSender};

use super::{DeviceEvent, Subscription};

/// Fan-out of [`DeviceEvent`]s to any number of subscribers.
///
/// Each subscription owns an unbounded queue, so every subscriber observes
/// every event published while it exists, in publication order, however far
/// behind it is. Publishing never blocks and never fails: with no subscriber
/// the event is dropped. Dropped subscriptions are pruned on the next
/// publish. Clones publish into the same set of subscribers.
///
/// # Examples
///
/// ```
/// use atomberg_lib::event::{DeviceEvent, EventBus};
///
/// let bus = EventBus::new();
/// let mut ui = bus.subscribe();
/// let mut logger = bus.subscribe();
///
/// bus.publish(DeviceEvent::ListenerStopped);
///
/// assert_eq!(ui.try_recv(), Some(DeviceEvent::ListenerStopped));
/// assert_eq!(logger.try_recv(), Some(DeviceEvent::ListenerStopped));
/// ```
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<UnboundedSender<DeviceEvent>>>>,
}

impl EventBus {
    /// Creates a bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.lock().push(tx);
        Subscription::new(rx)
    }

    /// Returns the number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|tx| !tx.is_closed());
        subscribers.len()
    }

    /// Publishes an event to every live subscription.
    pub fn publish(&self, event: DeviceEvent) {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        if subscribers.is_empty() {
            tracing::trace!("Event published with no subscribers");
        }
    }
}
