// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for fan control.
//!
//! Each type guarantees its value is inside the range the fan firmware
//! understands. Construction with [`new`](FanSpeed::new) validates; the
//! `clamped` constructors are used by the telemetry decoder, which must accept
//! anything a device sends.
//!
//! # Types
//!
//! - [`DeviceAddress`] - IP and command port of a fan
//! - [`FanSpeed`] - Speed level (0-6)
//! - [`TimerHours`] - Sleep timer duration in hours (0-4, 0 = no timer)

mod address;
mod speed;
mod timer;

pub use address::{DEFAULT_COMMAND_PORT, DeviceAddress};
pub use speed::FanSpeed;
pub use timer::TimerHours;
