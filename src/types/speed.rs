// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fan speed level type.

use std::fmt;

use crate::error::ValueError;

/// Fan speed level (0-6).
///
/// Level 0 keeps the motor idle while the fan stays powered; 6 is the
/// fastest setting.
///
/// # Examples
///
/// ```
/// use atomberg_lib::types::FanSpeed;
///
/// let speed = FanSpeed::new(4).unwrap();
/// assert_eq!(speed.value(), 4);
///
/// assert!(FanSpeed::new(7).is_err());
/// assert_eq!(FanSpeed::clamped(7), FanSpeed::MAX_SPEED);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct FanSpeed(u8);

impl FanSpeed {
    /// Minimum speed level.
    pub const MIN: u8 = 0;

    /// Maximum speed level.
    pub const MAX: u8 = 6;

    /// Idle speed.
    pub const IDLE: Self = Self(Self::MIN);

    /// Fastest speed.
    pub const MAX_SPEED: Self = Self(Self::MAX);

    /// Creates a new speed level.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if value is greater than 6.
    pub fn new(value: u8) -> Result<Self, ValueError> {
        if value > Self::MAX {
            return Err(ValueError::OutOfRange {
                field: "speed",
                min: i16::from(Self::MIN),
                max: i16::from(Self::MAX),
                actual: i16::from(value),
            });
        }
        Ok(Self(value))
    }

    /// Creates a speed level, clamping to the valid range.
    #[must_use]
    pub const fn clamped(value: u8) -> Self {
        if value > Self::MAX {
            Self(Self::MAX)
        } else {
            Self(value)
        }
    }

    /// Returns the speed level.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Returns the speed `delta` steps away from this one, clamped to 0-6.
    #[must_use]
    pub fn step(self, delta: i8) -> Self {
        let target = i16::from(self.0) + i16::from(delta);
        let clamped = target.clamp(i16::from(Self::MIN), i16::from(Self::MAX));
        // Safe: clamped is within 0..=6
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Self(clamped as u8)
    }
}

impl Default for FanSpeed {
    fn default() -> Self {
        Self::IDLE
    }
}

impl fmt::Display for FanSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for FanSpeed {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FanSpeed> for u8 {
    fn from(speed: FanSpeed) -> Self {
        speed.0
    }
}
