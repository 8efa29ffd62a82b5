// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bit-level codec for the packed state integer.

use std::fmt;

use crate::types::{FanSpeed, TimerHours};

use super::DeviceState;

pub(crate) const SPEED_MASK: u32 = 0x7;
pub(crate) const POWER_BIT: u32 = 1 << 4;
pub(crate) const LED_BIT: u32 = 1 << 5;
pub(crate) const SLEEP_BIT: u32 = 1 << 7;
pub(crate) const TIMER_SHIFT: u32 = 16;
pub(crate) const TIMER_MASK: u32 = 0xF;
pub(crate) const ELAPSED_SHIFT: u32 = 24;

/// Bits with no defined meaning.
pub const RESERVED_MASK: u32 = !(SPEED_MASK
    | POWER_BIT
    | LED_BIT
    | SLEEP_BIT
    | (TIMER_MASK << TIMER_SHIFT)
    | (0xFF << ELAPSED_SHIFT));

/// A field in a packed state that held a value outside its valid range.
///
/// The decoder clamps the field and reports the raw value here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DecodeAnomaly {
    /// The 3-bit speed field held 7; decoded as the maximum speed.
    SpeedOutOfRange {
        /// The raw field value.
        raw: u8,
    },
    /// The 4-bit timer field held a value above 4; decoded as 4 hours.
    TimerOutOfRange {
        /// The raw field value.
        raw: u8,
    },
}

impl fmt::Display for DecodeAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpeedOutOfRange { raw } => {
                write!(f, "unexpected speed value {raw}, clamped to {}", FanSpeed::MAX)
            }
            Self::TimerOutOfRange { raw } => {
                write!(f, "unexpected timer value {raw}, clamped to {}", TimerHours::MAX)
            }
        }
    }
}

/// Result of decoding a packed state integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedState {
    /// The decoded, always-valid state.
    pub state: DeviceState,
    /// Fields that had to be clamped.
    pub anomalies: Vec<DecodeAnomaly>,
}

impl DecodedState {
    /// Returns `true` if no field had to be clamped.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.anomalies.is_empty()
    }
}

/// Decodes a packed state integer.
///
/// Never fails: every 32-bit input yields a valid [`DeviceState`]. Reserved
/// bits are ignored and out-of-range fields are clamped and listed in
/// [`DecodedState::anomalies`].
///
/// # Examples
///
/// ```
/// use atomberg_lib::state::{DecodeAnomaly, decode_packed};
///
/// let decoded = decode_packed(0x0005_0017);
/// assert_eq!(decoded.state.speed().value(), 6);
/// assert_eq!(decoded.state.timer().value(), 4);
/// assert_eq!(
///     decoded.anomalies,
///     vec![
///         DecodeAnomaly::SpeedOutOfRange { raw: 7 },
///         DecodeAnomaly::TimerOutOfRange { raw: 5 },
///     ]
/// );
/// ```
#[must_use]
pub fn decode_packed(raw: u32) -> DecodedState {
    let mut anomalies = Vec::new();

    // Each field is masked before narrowing
    #[allow(clippy::cast_possible_truncation)]
    let speed_raw = (raw & SPEED_MASK) as u8;
    if speed_raw > FanSpeed::MAX {
        anomalies.push(DecodeAnomaly::SpeedOutOfRange { raw: speed_raw });
    }

    #[allow(clippy::cast_possible_truncation)]
    let timer_raw = ((raw >> TIMER_SHIFT) & TIMER_MASK) as u8;
    if timer_raw > TimerHours::MAX {
        anomalies.push(DecodeAnomaly::TimerOutOfRange { raw: timer_raw });
    }

    #[allow(clippy::cast_possible_truncation)]
    let elapsed = (raw >> ELAPSED_SHIFT) as u8;

    let state = DeviceState::new()
        .with_power(raw & POWER_BIT != 0)
        .with_speed(FanSpeed::clamped(speed_raw))
        .with_led(raw & LED_BIT != 0)
        .with_sleep(raw & SLEEP_BIT != 0)
        .with_timer(TimerHours::clamped(timer_raw))
        .with_timer_elapsed_minutes(elapsed);

    DecodedState { state, anomalies }
}

/// Packs a state into its wire integer with all reserved bits zero.
pub(crate) fn encode_packed(state: &DeviceState) -> u32 {
    let mut raw = u32::from(state.speed().value()) & SPEED_MASK;
    if state.power() {
        raw |= POWER_BIT;
    }
    if state.led() {
        raw |= LED_BIT;
    }
    if state.sleep() {
        raw |= SLEEP_BIT;
    }
    raw |= (u32::from(state.timer().value()) & TIMER_MASK) << TIMER_SHIFT;
    raw |= u32::from(state.timer_elapsed_minutes()) << ELAPSED_SHIFT;
    raw
}
