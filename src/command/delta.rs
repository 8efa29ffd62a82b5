// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sparse command type.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;
use crate::state::StateChange;
use crate::types::{FanSpeed, TimerHours};

/// A sparse set of field assignments sent to a fan.
///
/// Values are stored as given and checked by [`validate`](Self::validate),
/// which [`encode_command`](super::encode_command) always calls first. This
/// lets a caller build a delta from raw user input and get a single, precise
/// error back.
///
/// # Examples
///
/// ```
/// use atomberg_lib::command::CommandDelta;
///
/// let delta = CommandDelta::new().with_power(true).with_speed(3);
/// assert_eq!(delta.len(), 2);
/// assert!(delta.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CommandDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    power: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    speed: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    led: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sleep: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timer: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    speed_delta: Option<i8>,
}

impl CommandDelta {
    /// Smallest accepted speed delta.
    pub const SPEED_DELTA_MIN: i8 = -1;

    /// Largest accepted speed delta.
    pub const SPEED_DELTA_MAX: i8 = 5;

    /// Creates an empty delta.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Turns the fan on.
    #[must_use]
    pub fn power_on() -> Self {
        Self::new().with_power(true)
    }

    /// Turns the fan off.
    #[must_use]
    pub fn power_off() -> Self {
        Self::new().with_power(false)
    }

    /// Sets the power flag.
    #[must_use]
    pub fn with_power(mut self, on: bool) -> Self {
        self.power = Some(on);
        self
    }

    /// Sets the speed level (valid range 0-6).
    #[must_use]
    pub fn with_speed(mut self, level: u8) -> Self {
        self.speed = Some(level);
        self
    }

    /// Sets the indicator LED.
    #[must_use]
    pub fn with_led(mut self, on: bool) -> Self {
        self.led = Some(on);
        self
    }

    /// Sets sleep mode.
    #[must_use]
    pub fn with_sleep(mut self, on: bool) -> Self {
        self.sleep = Some(on);
        self
    }

    /// Sets the timer in hours (valid range 0-4, 0 cancels the timer).
    #[must_use]
    pub fn with_timer(mut self, hours: u8) -> Self {
        self.timer = Some(hours);
        self
    }

    /// Asks the fan to change speed relative to its current level.
    ///
    /// Valid values are -1 and 1 through 5.
    #[must_use]
    pub fn with_speed_delta(mut self, delta: i8) -> Self {
        self.speed_delta = Some(delta);
        self
    }

    /// Returns the requested power flag.
    #[must_use]
    pub fn power(&self) -> Option<bool> {
        self.power
    }

    /// Returns the requested speed level.
    #[must_use]
    pub fn speed(&self) -> Option<u8> {
        self.speed
    }

    /// Returns the requested LED flag.
    #[must_use]
    pub fn led(&self) -> Option<bool> {
        self.led
    }

    /// Returns the requested sleep flag.
    #[must_use]
    pub fn sleep(&self) -> Option<bool> {
        self.sleep
    }

    /// Returns the requested timer hours.
    #[must_use]
    pub fn timer(&self) -> Option<u8> {
        self.timer
    }

    /// Returns the requested relative speed change.
    #[must_use]
    pub fn speed_delta(&self) -> Option<i8> {
        self.speed_delta
    }

    /// Returns the number of fields present.
    #[must_use]
    pub fn len(&self) -> usize {
        [
            self.power.is_some(),
            self.speed.is_some(),
            self.led.is_some(),
            self.sleep.is_some(),
            self.timer.is_some(),
            self.speed_delta.is_some(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count()
    }

    /// Returns `true` if no field is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks every present field against its range.
    ///
    /// # Errors
    ///
    /// Returns the first `ValueError` found, checking speed, then timer, then
    /// speed delta.
    pub fn validate(&self) -> Result<(), ValueError> {
        if let Some(level) = self.speed {
            FanSpeed::new(level)?;
        }
        if let Some(hours) = self.timer {
            TimerHours::new(hours)?;
        }
        if let Some(delta) = self.speed_delta
            && (delta == 0 || !(Self::SPEED_DELTA_MIN..=Self::SPEED_DELTA_MAX).contains(&delta))
        {
            return Err(ValueError::InvalidSpeedDelta(delta));
        }
        Ok(())
    }
}

impl TryFrom<StateChange> for CommandDelta {
    type Error = ValueError;

    /// Builds the command that would reproduce a state change.
    ///
    /// Elapsed timer minutes are device-driven and cannot be commanded.
    fn try_from(change: StateChange) -> Result<Self, Self::Error> {
        let delta = Self::new();
        Ok(match change {
            StateChange::Power(on) => delta.with_power(on),
            StateChange::Speed(speed) => delta.with_speed(speed.value()),
            StateChange::Led(on) => delta.with_led(on),
            StateChange::Sleep(on) => delta.with_sleep(on),
            StateChange::Timer(timer) => delta.with_timer(timer.value()),
            StateChange::TimerElapsed(minutes) => {
                return Err(ValueError::OutOfRange {
                    field: "timer_elapsed",
                    min: 0,
                    max: 0,
                    actual: i16::from(minutes),
                });
            }
        })
    }
}

impl fmt::Display for CommandDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => f.write_str("{?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_delta_is_empty() {
        let delta = CommandDelta::new();
        assert!(delta.is_empty());
        assert_eq!(delta.len(), 0);
    }

    #[test]
    fn builders_set_fields() {
        let delta = CommandDelta::power_on().with_led(false).with_timer(3);
        assert_eq!(delta.power(), Some(true));
        assert_eq!(delta.led(), Some(false));
        assert_eq!(delta.timer(), Some(3));
        assert_eq!(delta.speed(), None);
        assert_eq!(delta.len(), 3);
    }

    #[test]
    fn validate_ranges() {
        assert!(CommandDelta::new().with_speed(6).validate().is_ok());
        assert!(CommandDelta::new().with_speed(7).validate().is_err());
        assert!(CommandDelta::new().with_timer(4).validate().is_ok());
        assert!(CommandDelta::new().with_timer(5).validate().is_err());
    }

    #[test]
    fn validate_speed_delta() {
        for ok in [-1, 1, 2, 3, 4, 5] {
            assert!(CommandDelta::new().with_speed_delta(ok).validate().is_ok());
        }
        for bad in [-2, 0, 6] {
            assert_eq!(
                CommandDelta::new().with_speed_delta(bad).validate(),
                Err(ValueError::InvalidSpeedDelta(bad))
            );
        }
    }

    #[test]
    fn from_state_change() {
        let delta = CommandDelta::try_from(StateChange::Speed(FanSpeed::MAX_SPEED)).unwrap();
        assert_eq!(delta, CommandDelta::new().with_speed(6));
        assert!(CommandDelta::try_from(StateChange::TimerElapsed(3)).is_err());
    }

    #[test]
    fn deserialize_wire_payload() {
        let delta: CommandDelta = serde_json::from_str(r#"{"power":true,"speedDelta":2}"#).unwrap();
        assert_eq!(delta, CommandDelta::power_on().with_speed_delta(2));
        assert!(serde_json::from_str::<CommandDelta>(r#"{"volume":3}"#).is_err());
    }

    #[test]
    fn display_is_wire_json() {
        assert_eq!(CommandDelta::power_off().to_string(), r#"{"power":false}"#);
    }
}
