// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fan state types and the packed state codec.
//!
//! Fans report their full operating state as a single 32-bit integer. The
//! [`DeviceState`] struct is a lossless projection of that integer, and
//! [`decode_packed`] is the decoder used by the telemetry listener: it never
//! fails, clamping out-of-range fields and reporting each one as a
//! [`DecodeAnomaly`]. [`StateChange`] describes a single field difference
//! between two observed states.
//!
//! # Bit layout
//!
//! | Bits  | Field                   |
//! |-------|-------------------------|
//! | 0-2   | speed level (0-6)       |
//! | 4     | power                   |
//! | 5     | LED                     |
//! | 7     | sleep mode              |
//! | 16-19 | timer hours (0-4)       |
//! | 24-31 | timer elapsed minutes   |
//!
//! All other bits are reserved: ignored on decode, zero on encode.
//!
//! # Examples
//!
//! ```
//! use atomberg_lib::state::DeviceState;
//!
//! let state = DeviceState::from_packed(0x0000_0011);
//! assert!(state.power());
//! assert_eq!(state.speed().value(), 1);
//! assert!(!state.led());
//! ```

mod device_state;
mod packed;
mod state_change;

pub use device_state::DeviceState;
pub use packed::{DecodeAnomaly, DecodedState, RESERVED_MASK, decode_packed};
pub use state_change::StateChange;
