// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fan command definitions and encoding.
//!
//! A command is a sparse set of field assignments, a [`CommandDelta`]. Only
//! the fields present in the delta are sent; the fan leaves every other
//! setting untouched. On the wire a command is a single UTF-8 JSON object.
//!
//! # Wire keys
//!
//! | Key          | Type    | Range            |
//! |--------------|---------|------------------|
//! | `power`      | boolean |                  |
//! | `speed`      | number  | 0-6              |
//! | `led`        | boolean |                  |
//! | `sleep`      | boolean |                  |
//! | `timer`      | number  | 0-4 hours        |
//! | `speedDelta` | number  | -1, 1-5          |
//!
//! # Examples
//!
//! ```
//! use atomberg_lib::command::{CommandDelta, encode_command};
//!
//! let payload = encode_command(&CommandDelta::new().with_speed(4)).unwrap();
//! assert_eq!(payload, br#"{"speed":4}"#);
//!
//! // Out-of-range values are rejected before anything is serialized
//! assert!(encode_command(&CommandDelta::new().with_speed(9)).is_err());
//! ```

mod delta;

pub use delta::CommandDelta;

use crate::error::Error;

/// Validates a command and encodes it as a JSON datagram payload.
///
/// Keys appear in a fixed order (`power`, `speed`, `led`, `sleep`, `timer`,
/// `speedDelta`) and absent fields are omitted, so equal deltas always encode
/// to identical bytes.
///
/// # Errors
///
/// Returns `Error::Value` if a field is out of range. No bytes are produced
/// in that case. Returns `Error::Encode` if serialization fails.
pub fn encode_command(delta: &CommandDelta) -> Result<Vec<u8>, Error> {
    delta.validate()?;
    Ok(serde_json::to_vec(delta)?)
}
