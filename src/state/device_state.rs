// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fan state value type.

use std::fmt;

use crate::types::{FanSpeed, TimerHours};

use super::StateChange;
use super::packed::{decode_packed, encode_packed};

/// Full operating state of a fan, as reported by its telemetry broadcast.
///
/// Unlike a command, a state is never partial: every broadcast carries every
/// field, so all fields are always present and within range.
///
/// # Examples
///
/// ```
/// use atomberg_lib::state::DeviceState;
/// use atomberg_lib::types::FanSpeed;
///
/// let state = DeviceState::new()
///     .with_power(true)
///     .with_speed(FanSpeed::new(3).unwrap());
///
/// assert_eq!(DeviceState::from_packed(state.to_packed()), state);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct DeviceState {
    power: bool,
    speed: FanSpeed,
    led: bool,
    sleep: bool,
    timer: TimerHours,
    timer_elapsed_minutes: u8,
}

impl DeviceState {
    /// Creates a state with everything off.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a packed state integer, discarding any decode anomalies.
    ///
    /// Use [`decode_packed`](super::decode_packed) to observe the anomalies.
    #[must_use]
    pub fn from_packed(raw: u32) -> Self {
        decode_packed(raw).state
    }

    /// Encodes this state as a packed integer with reserved bits zeroed.
    #[must_use]
    pub fn to_packed(&self) -> u32 {
        encode_packed(self)
    }

    // ========== Accessors ==========

    /// Returns `true` if the fan is powered on.
    #[must_use]
    pub fn power(&self) -> bool {
        self.power
    }

    /// Returns the speed level.
    #[must_use]
    pub fn speed(&self) -> FanSpeed {
        self.speed
    }

    /// Returns `true` if the indicator LED is on.
    #[must_use]
    pub fn led(&self) -> bool {
        self.led
    }

    /// Returns `true` if sleep mode is active.
    #[must_use]
    pub fn sleep(&self) -> bool {
        self.sleep
    }

    /// Returns the armed timer duration.
    #[must_use]
    pub fn timer(&self) -> TimerHours {
        self.timer
    }

    /// Returns minutes elapsed since the timer was armed.
    #[must_use]
    pub fn timer_elapsed_minutes(&self) -> u8 {
        self.timer_elapsed_minutes
    }

    /// Returns the minutes left on the timer, or `None` if no timer is armed.
    #[must_use]
    pub fn timer_remaining_minutes(&self) -> Option<u16> {
        self.timer.is_set().then(|| {
            self.timer
                .total_minutes()
                .saturating_sub(u16::from(self.timer_elapsed_minutes))
        })
    }

    // ========== Builders ==========

    /// Returns a copy with the power flag set.
    #[must_use]
    pub fn with_power(mut self, power: bool) -> Self {
        self.power = power;
        self
    }

    /// Returns a copy with the speed set.
    #[must_use]
    pub fn with_speed(mut self, speed: FanSpeed) -> Self {
        self.speed = speed;
        self
    }

    /// Returns a copy with the LED flag set.
    #[must_use]
    pub fn with_led(mut self, led: bool) -> Self {
        self.led = led;
        self
    }

    /// Returns a copy with the sleep flag set.
    #[must_use]
    pub fn with_sleep(mut self, sleep: bool) -> Self {
        self.sleep = sleep;
        self
    }

    /// Returns a copy with the timer set.
    #[must_use]
    pub fn with_timer(mut self, timer: TimerHours) -> Self {
        self.timer = timer;
        self
    }

    /// Returns a copy with the elapsed timer minutes set.
    #[must_use]
    pub fn with_timer_elapsed_minutes(mut self, minutes: u8) -> Self {
        self.timer_elapsed_minutes = minutes;
        self
    }

    // ========== State Changes ==========

    /// Applies a state change and returns whether the state actually changed.
    pub fn apply(&mut self, change: &StateChange) -> bool {
        let before = *self;
        match *change {
            StateChange::Power(on) => self.power = on,
            StateChange::Speed(speed) => self.speed = speed,
            StateChange::Led(on) => self.led = on,
            StateChange::Sleep(on) => self.sleep = on,
            StateChange::Timer(timer) => self.timer = timer,
            StateChange::TimerElapsed(minutes) => self.timer_elapsed_minutes = minutes,
        }
        before != *self
    }

    /// Lists the fields that differ between `self` and `newer`.
    ///
    /// Each change carries the value from `newer`.
    #[must_use]
    pub fn diff(&self, newer: &Self) -> Vec<StateChange> {
        let mut changes = Vec::new();
        if self.power != newer.power {
            changes.push(StateChange::Power(newer.power));
        }
        if self.speed != newer.speed {
            changes.push(StateChange::Speed(newer.speed));
        }
        if self.led != newer.led {
            changes.push(StateChange::Led(newer.led));
        }
        if self.sleep != newer.sleep {
            changes.push(StateChange::Sleep(newer.sleep));
        }
        if self.timer != newer.timer {
            changes.push(StateChange::Timer(newer.timer));
        }
        if self.timer_elapsed_minutes != newer.timer_elapsed_minutes {
            changes.push(StateChange::TimerElapsed(newer.timer_elapsed_minutes));
        }
        changes
    }

    /// Lists every field of this state as a change, for a first observation.
    #[must_use]
    pub fn as_changes(&self) -> Vec<StateChange> {
        vec![
            StateChange::Power(self.power),
            StateChange::Speed(self.speed),
            StateChange::Led(self.led),
            StateChange::Sleep(self.sleep),
            StateChange::Timer(self.timer),
            StateChange::TimerElapsed(self.timer_elapsed_minutes),
        ]
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let on_off = |b: bool| if b { "on" } else { "off" };
        write!(
            f,
            "power={} speed={} led={} sleep={} timer={}",
            on_off(self.power),
            self.speed,
            on_off(self.led),
            on_off(self.sleep),
            self.timer,
        )?;
        if let Some(remaining) = self.timer_remaining_minutes() {
            write!(f, " ({remaining} min left)")?;
        }
        Ok(())
    }
}
