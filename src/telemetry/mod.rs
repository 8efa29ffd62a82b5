// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Telemetry broadcast parsing and diagnostics.
//!
//! Fans periodically broadcast their full state as a small JSON object on the
//! telemetry port. The packed state integer is carried in one field, either
//! as a number or as a decimal string:
//!
//! ```text
//! {"device_id":"a1b2c3d4e5f6","state_string":"65553"}
//! ```
//!
//! Parsing is strict ([`TelemetryMessage::parse`] rejects anything it cannot
//! read) while decoding is permissive ([`decode_packed`](crate::state::decode_packed)
//! accepts every integer). Both kinds of trouble end up as [`Diagnostic`]s and
//! in [`DiagnosticCounters`]; neither ever stops the listener.
//!
//! # Examples
//!
//! ```
//! use atomberg_lib::telemetry::{TelemetryMessage, DEFAULT_STATE_FIELD};
//!
//! let payload = br#"{"device_id":"a1b2c3d4e5f6","state_string":"65553"}"#;
//! let msg = TelemetryMessage::parse(payload, DEFAULT_STATE_FIELD).unwrap();
//! let state = msg.decode().state;
//!
//! assert!(state.power());
//! assert_eq!(state.timer().value(), 1);
//! ```

mod diagnostics;
mod message;

pub use diagnostics::{Diagnostic, DiagnosticCounters, DiagnosticSnapshot};
pub use message::{FALLBACK_STATE_FIELD, TelemetryMessage};

/// Field holding the packed state in telemetry broadcasts.
pub const DEFAULT_STATE_FIELD: &str = "state_string";
