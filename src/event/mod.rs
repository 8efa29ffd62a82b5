// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event system for fan state changes.
//!
//! This module provides a multicast event feed. The [`EventBus`] gives each
//! [`Subscription`] its own unbounded queue so that every subscriber observes
//! every event published while it exists, in publication order. Front ends can await
//! events with [`Subscription::recv`] or poll with [`Subscription::try_recv`].
//!
//! # Examples
//!
//! ```
//! use atomberg_lib::event::{DeviceEvent, EventBus};
//!
//! let bus = EventBus::new();
//!
//! // Subscribe to events
//! let mut sub = bus.subscribe();
//!
//! // Publish an event
//! bus.publish(DeviceEvent::ListenerStopped);
//!
//! assert!(matches!(sub.try_recv(), Some(DeviceEvent::ListenerStopped)));
//! ```

mod device_event;
mod event_bus;
mod subscription;

pub use device_event::{DeviceEvent, StateUpdate};
pub use event_bus::EventBus;
pub use subscription::Subscription;
