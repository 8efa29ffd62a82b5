// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parser for telemetry broadcast datagrams.

use serde_json::{Map, Value};

use crate::error::ParseError;
use crate::state::{DecodedState, decode_packed};

/// Field consulted when the configured state field is absent.
pub const FALLBACK_STATE_FIELD: &str = "state";

/// A parsed telemetry broadcast.
///
/// # Examples
///
/// ```
/// use atomberg_lib::telemetry::TelemetryMessage;
///
/// let msg = TelemetryMessage::parse(br#"{"state_string":"17"}"#, "state_string").unwrap();
/// assert_eq!(msg.packed(), 17);
/// assert!(msg.decode().state.power());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryMessage {
    packed: u32,
    device_id: Option<String>,
}

impl TelemetryMessage {
    /// Parses a datagram payload.
    ///
    /// The packed state is read from `state_field`, or from `"state"` when
    /// that field is absent. It may be a JSON number or a decimal string; a
    /// comma-separated string contributes its first element.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the payload is not UTF-8 JSON, is not an
    /// object, has no state field, or the state is not a 32-bit unsigned
    /// number.
    pub fn parse(payload: &[u8], state_field: &str) -> Result<Self, ParseError> {
        let text = std::str::from_utf8(payload).map_err(|_| ParseError::InvalidUtf8)?;
        let value: Value = serde_json::from_str(text)?;
        let Value::Object(object) = value else {
            return Err(ParseError::MissingField(state_field.to_string()));
        };

        let (field, raw) = lookup_state(&object, state_field)
            .ok_or_else(|| ParseError::MissingField(state_field.to_string()))?;
        let packed = packed_from_value(field, raw)?;

        let device_id = object
            .get("device_id")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(Self { packed, device_id })
    }

    /// Returns the packed state integer.
    #[must_use]
    pub fn packed(&self) -> u32 {
        self.packed
    }

    /// Returns the device identifier, if the broadcast carried one.
    #[must_use]
    pub fn device_id(&self) -> Option<&str> {
        self.device_id.as_deref()
    }

    /// Decodes the packed state.
    #[must_use]
    pub fn decode(&self) -> DecodedState {
        decode_packed(self.packed)
    }
}

fn lookup_state<'a>(object: &'a Map<String, Value>, field: &'a str) -> Option<(&'a str, &'a Value)> {
    object
        .get(field)
        .map(|v| (field, v))
        .or_else(|| object.get(FALLBACK_STATE_FIELD).map(|v| (FALLBACK_STATE_FIELD, v)))
}

fn packed_from_value(field: &str, raw: &Value) -> Result<u32, ParseError> {
    let invalid = |message: String| ParseError::InvalidValue {
        field: field.to_string(),
        message,
    };

    match raw {
        Value::Number(n) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| invalid(format!("{n} is not a 32-bit unsigned integer"))),
        Value::String(s) => {
            let first = s.split(',').next().unwrap_or_default().trim();
            first
                .parse::<u32>()
                .map_err(|e| invalid(format!("{first:?}: {e}")))
        }
        other => Err(invalid(format!("unexpected JSON type: {other}"))),
    }
}
