// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sleep timer duration type.

use std::fmt;
use std::time::Duration;

use crate::error::ValueError;

/// Sleep timer setting in whole hours (0-4).
///
/// Zero means no timer is armed.
///
/// # Examples
///
/// ```
/// use atomberg_lib::types::TimerHours;
///
/// let timer = TimerHours::new(2).unwrap();
/// assert!(timer.is_set());
/// assert_eq!(timer.total_minutes(), 120);
///
/// assert!(!TimerHours::OFF.is_set());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct TimerHours(u8);

impl TimerHours {
    /// Minimum value (no timer).
    pub const MIN: u8 = 0;

    /// Maximum value in hours.
    pub const MAX: u8 = 4;

    /// No timer armed.
    pub const OFF: Self = Self(0);

    /// Creates a new timer setting.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if value is greater than 4.
    pub fn new(hours: u8) -> Result<Self, ValueError> {
        if hours > Self::MAX {
            return Err(ValueError::OutOfRange {
                field: "timer",
                min: i16::from(Self::MIN),
                max: i16::from(Self::MAX),
                actual: i16::from(hours),
            });
        }
        Ok(Self(hours))
    }

    /// Creates a timer setting, clamping to the valid range.
    #[must_use]
    pub const fn clamped(hours: u8) -> Self {
        if hours > Self::MAX {
            Self(Self::MAX)
        } else {
            Self(hours)
        }
    }

    /// Returns the number of hours.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Returns `true` if a timer is armed.
    #[must_use]
    pub const fn is_set(&self) -> bool {
        self.0 > 0
    }

    /// Returns the timer length in minutes.
    #[must_use]
    pub fn total_minutes(&self) -> u16 {
        u16::from(self.0) * 60
    }

    /// Returns the timer length as a [`Duration`].
    #[must_use]
    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.0) * 3600)
    }
}

impl Default for TimerHours {
    fn default() -> Self {
        Self::OFF
    }
}

impl fmt::Display for TimerHours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_set() {
            write!(f, "{}h", self.0)
        } else {
            f.write_str("off")
        }
    }
}

impl TryFrom<u8> for TimerHours {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TimerHours> for u8 {
    fn from(timer: TimerHours) -> Self {
        timer.0
    }
}
