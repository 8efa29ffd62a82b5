// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscriber handle for the event bus.

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::error::TryRecvError;

use super::{DeviceEvent, StateUpdate};

/// A subscriber's view of the event feed.
///
/// Every subscription has its own unbounded queue, so a slow consumer never
/// loses events and never slows down the listener or other subscribers.
/// Subscriptions are independent: dropping one does not affect others, and a
/// new one can be taken at any time to restart observation.
#[derive(Debug)]
pub struct Subscription {
    rx: UnboundedReceiver<DeviceEvent>,
}

impl Subscription {
    pub(crate) fn new(rx: UnboundedReceiver<DeviceEvent>) -> Self {
        Self { rx }
    }

    /// Waits for the next event.
    ///
    /// Returns `None` once the bus is gone and every queued event has been
    /// read.
    pub async fn recv(&mut self) -> Option<DeviceEvent> {
        self.rx.recv().await
    }

    /// Returns the next event if one is queued, without waiting.
    pub fn try_recv(&mut self) -> Option<DeviceEvent> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Waits for the next state update, discarding other events.
    ///
    /// Returns `None` once the bus is gone.
    pub async fn next_state(&mut self) -> Option<StateUpdate> {
        while let Some(event) = self.recv().await {
            if let DeviceEvent::StateChanged(update) = event {
                return Some(update);
            }
        }
        None
    }

    /// Returns the number of events queued and not yet read.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::event::EventBus;
    use crate::state::DeviceState;

    fn update(packed: u32) -> DeviceEvent {
        DeviceEvent::StateChanged(StateUpdate {
            ip: "10.0.0.9".parse().unwrap(),
            name: None,
            device_id: None,
            state: DeviceState::from_packed(packed),
            changes: Vec::new(),
            received_at: Utc::now(),
        })
    }

    #[tokio::test]
    async fn next_state_skips_other_events() {
        let bus = EventBus::new();
        let mut sub = bus.subscribe();

        bus.publish(DeviceEvent::ListenerStarted {
            local_addr: "127.0.0.1:5625".parse().unwrap(),
        });
        bus.publish(update(0x11));

        let state = sub.next_state().await.unwrap();
        assert!(state.state.power());
    }

    #[tokio::test]
    async fn recv_drains_queue_then_ends_when_bus_dropped() {
        let bus = EventBus::new();
        let mut sub = bus.subscribe();
        bus.publish(DeviceEvent::ListenerStopped);
        drop(bus);

        assert_eq!(sub.recv().await, Some(DeviceEvent::ListenerStopped));
        assert_eq!(sub.recv().await, None);
    }

    #[test]
    fn slow_subscriber_keeps_every_event() {
        let bus = EventBus::new();
        let mut sub = bus.subscribe();

        // Far more than any bounded buffer would hold
        for packed in 0..1000u32 {
            bus.publish(update(packed & 0x7));
        }
        assert_eq!(sub.pending(), 1000);

        let mut seen = 0u32;
        while let Some(event) = sub.try_recv() {
            let speed = event.state_update().unwrap().state.speed().value();
            assert_eq!(u32::from(speed), (seen & 0x7).min(6));
            seen += 1;
        }
        assert_eq!(seen, 1000);
    }

    #[test]
    fn try_recv_on_empty() {
        let bus = EventBus::new();
        let mut sub = bus.subscribe();
        assert!(sub.try_recv().is_none());
        assert_eq!(sub.pending(), 0);
    }
}
