// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `atomberg_lib` - A Rust library to control Atomberg smart fans on the
//! local network.
//!
//! Fans expose two unauthenticated UDP flows: they accept small JSON command
//! objects on port 5600, and they broadcast their full state as a bit-packed
//! integer on port 5625. This crate encodes the commands, decodes the
//! broadcasts, and keeps the latest state of every fan in a concurrent cache
//! that any number of front ends can read or subscribe to.
//!
//! # Supported Features
//!
//! - **Power, LED and sleep mode**: switch on/off or toggle from the last
//!   observed state
//! - **Speed**: absolute levels 0 to 6, relative steps, and the fan's own
//!   speed-delta command
//! - **Timer**: 0 (off) to 4 hours, with elapsed minutes from telemetry
//! - **Telemetry**: a background listener with diagnostics for malformed or
//!   out-of-range broadcasts
//!
//! # Quick Start
//!
//! ```no_run
//! use atomberg_lib::{CommandDelta, ControllerConfig, DeviceRegistry, FanController};
//!
//! #[tokio::main]
//! async fn main() -> atomberg_lib::Result<()> {
//!     let registry = DeviceRegistry::builder()
//!         .device("Sofa Fan", "192.168.29.14".parse().unwrap())
//!         .device("Table Fan", "192.168.29.15".parse().unwrap())
//!         .build()?;
//!
//!     let controller = FanController::new(registry, ControllerConfig::default());
//!     let mut updates = controller.on_state_changed();
//!     controller.start_listening().await?;
//!
//!     controller
//!         .request_change("Sofa Fan", &CommandDelta::power_on().with_speed(3))
//!         .await?;
//!
//!     while let Some(update) = updates.next_state().await {
//!         println!("{}: {}", update.display_name(), update.state);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Decoding Telemetry Directly
//!
//! ```
//! use atomberg_lib::DeviceState;
//!
//! let state = DeviceState::from_packed(0x0000_0011);
//! assert!(state.power());
//! assert_eq!(state.speed().value(), 1);
//! assert!(!state.led());
//! ```
//!
//! # Delivery Guarantees
//!
//! Commands are fire-and-forget: fans never acknowledge them and this crate
//! never retries. The cache only ever reflects what fans broadcast, so a
//! command becomes visible once, and only if, the fan reports its new state.

pub mod cache;
pub mod command;
pub mod error;
pub mod event;
pub mod manager;
pub mod protocol;
pub mod registry;
pub mod state;
pub mod telemetry;
pub mod types;

pub use cache::{CachedState, StateCache};
pub use command::{CommandDelta, encode_command};
pub use error::{BindError, Error, ParseError, RegistryError, Result, SendError, ValueError};
pub use event::{DeviceEvent, EventBus, StateUpdate, Subscription};
pub use manager::{ControllerConfig, DeviceRecord, FanController};
pub use protocol::{BroadcastListener, CommandSender, ListenerConfig, ListenerState};
pub use registry::{DeviceRegistry, RegistryConfig};
pub use state::{DecodeAnomaly, DeviceState, StateChange, decode_packed};
pub use telemetry::{Diagnostic, DiagnosticSnapshot, TelemetryMessage};
pub use types::{DeviceAddress, FanSpeed, TimerHours};
