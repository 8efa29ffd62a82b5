// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! High-level controller for a set of fans.
//!
//! The [`FanController`] is the single entry point a front end needs. It
//! provides:
//!
//! - **Device listing**: registered names in a stable order
//! - **State queries**: the last broadcast state of each fan, never blocking
//! - **Commands**: validated, fire-and-forget change requests by name
//! - **Event feed**: a multicast subscription of state updates and listener
//!   lifecycle events
//!
//! # Examples
//!
//! ## Watching fans
//!
//! ```no_run
//! use atomberg_lib::event::DeviceEvent;
//! use atomberg_lib::manager::{ControllerConfig, FanController};
//! use atomberg_lib::registry::DeviceRegistry;
//!
//! # async fn example() -> atomberg_lib::Result<()> {
//! let registry = DeviceRegistry::builder()
//!     .device("Sofa Fan", "192.168.29.14".parse().unwrap())
//!     .device("Table Fan", "192.168.29.15".parse().unwrap())
//!     .build()?;
//! let controller = FanController::new(registry, ControllerConfig::default());
//! let mut events = controller.on_state_changed();
//! controller.start_listening().await?;
//!
//! while let Some(event) = events.recv().await {
//!     match event {
//!         DeviceEvent::StateChanged(update) => {
//!             println!("{} -> {}", update.display_name(), update.state);
//!         }
//!         DeviceEvent::ListenerStopped => break,
//!         _ => {}
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod controller_config;
mod device_record;
mod fan_controller;

pub use controller_config::ControllerConfig;
pub use device_record::DeviceRecord;
pub use fan_controller::FanController;
