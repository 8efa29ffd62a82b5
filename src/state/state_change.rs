// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State change representation.
//!
//! A [`StateChange`] names one field of a [`DeviceState`](super::DeviceState)
//! together with its new value. The cache computes them by diffing the
//! previous and the newly broadcast state, so subscribers can react to the
//! specific fields that moved.
//!
//! # Examples
//!
//! ```
//! use atomberg_lib::state::{DeviceState, StateChange};
//!
//! let before = DeviceState::new();
//! let after = before.with_power(true);
//!
//! assert_eq!(before.diff(&after), vec![StateChange::Power(true)]);
//! ```

use std::fmt;

use crate::types::{FanSpeed, TimerHours};

/// A change of a single state field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum StateChange {
    /// Power switched on or off.
    Power(bool),

    /// Speed level changed.
    Speed(FanSpeed),

    /// Indicator LED switched on or off.
    Led(bool),

    /// Sleep mode switched on or off.
    Sleep(bool),

    /// Timer setting changed.
    Timer(TimerHours),

    /// Elapsed timer minutes advanced or reset.
    TimerElapsed(u8),
}

impl StateChange {
    /// Returns the name of the changed field.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Power(_) => "power",
            Self::Speed(_) => "speed",
            Self::Led(_) => "led",
            Self::Sleep(_) => "sleep",
            Self::Timer(_) => "timer",
            Self::TimerElapsed(_) => "timer_elapsed",
        }
    }

    /// Returns `true` for changes the device makes on its own, without a command.
    #[must_use]
    pub const fn is_autonomous(&self) -> bool {
        matches!(self, Self::TimerElapsed(_))
    }
}

impl fmt::Display for StateChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Power(on) | Self::Led(on) | Self::Sleep(on) => {
                write!(f, "{}={}", self.field(), if *on { "on" } else { "off" })
            }
            Self::Speed(speed) => write!(f, "speed={speed}"),
            Self::Timer(timer) => write!(f, "timer={timer}"),
            Self::TimerElapsed(minutes) => write!(f, "timer_elapsed={minutes}min"),
        }
    }
}
