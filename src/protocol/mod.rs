// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! UDP transport for fan commands and telemetry.
//!
//! Fans speak two independent, unauthenticated UDP flows:
//!
//! - **Commands** go to the fan's command port (5600) as one JSON object per
//!   datagram. Fans never answer; [`CommandSender`] is fire-and-forget.
//! - **Telemetry** is broadcast by every fan to the telemetry port (5625)
//!   whenever its state changes and periodically otherwise.
//!   [`BroadcastListener`] owns that socket and feeds the
//!   [`StateCache`](crate::cache::StateCache).
//!
//! The only link between the two flows is the device itself: a command's
//! effect becomes visible when, and if, the fan broadcasts its new state.

mod listener;
mod sender;

pub use listener::{BroadcastListener, ListenerConfig, ListenerState};
pub use sender::CommandSender;

/// UDP port fans broadcast their state to.
pub const DEFAULT_TELEMETRY_PORT: u16 = 5625;

/// Largest telemetry datagram read in full. Longer datagrams are truncated
/// and will fail to parse.
pub const DEFAULT_MAX_DATAGRAM_SIZE: usize = 1024;
