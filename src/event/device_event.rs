// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device event types.

use std::net::{IpAddr, SocketAddr};

use chrono::{DateTime, Utc};

use crate::state::{DeviceState, StateChange};
use crate::telemetry::Diagnostic;

/// A newly observed fan state.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StateUpdate {
    /// IP the broadcast came from.
    pub ip: IpAddr,
    /// Registered name for that IP, if any.
    pub name: Option<String>,
    /// `device_id` reported in the broadcast, if present.
    pub device_id: Option<String>,
    /// The broadcast state.
    pub state: DeviceState,
    /// Fields that differ from the previously cached state. Every field is
    /// listed for the first broadcast from a device.
    pub changes: Vec<StateChange>,
    /// When the broadcast was received.
    pub received_at: DateTime<Utc>,
}

impl StateUpdate {
    /// Returns the registered name, or the IP for unregistered senders.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.ip.to_string())
    }
}

/// Events published to subscribers.
///
/// Listener lifecycle events let a consumer tell a silent fan apart from a
/// listener that is not running.
///
/// # Examples
///
/// ```
/// use atomberg_lib::event::DeviceEvent;
///
/// let event = DeviceEvent::ListenerStopped;
/// assert!(event.state_update().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    /// A broadcast was received and cached.
    ///
    /// Published for every accepted broadcast, including ones whose state
    /// equals the cached state (`changes` is then empty).
    StateChanged(StateUpdate),

    /// The telemetry listener bound its socket.
    ListenerStarted {
        /// The bound local address.
        local_addr: SocketAddr,
    },

    /// The telemetry listener released its socket.
    ListenerStopped,

    /// A telemetry anomaly was observed.
    Diagnostic(Diagnostic),
}

impl DeviceEvent {
    /// Returns the state update carried by this event, if any.
    #[must_use]
    pub fn state_update(&self) -> Option<&StateUpdate> {
        match self {
            Self::StateChanged(update) => Some(update),
            _ => None,
        }
    }

    /// Returns `true` for listener start and stop events.
    #[must_use]
    pub fn is_lifecycle(&self) -> bool {
        matches!(self, Self::ListenerStarted { .. } | Self::ListenerStopped)
    }
}
