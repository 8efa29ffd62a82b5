// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Controller coordinating the registry, cache, sender and listener.

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::cache::StateCache;
use crate::command::CommandDelta;
use crate::error::Error;
use crate::event::{EventBus, Subscription};
use crate::protocol::{BroadcastListener, CommandSender, ListenerState};
use crate::registry::{DeviceRegistry, RegisteredDevice};
use crate::state::DeviceState;
use crate::telemetry::DiagnosticSnapshot;
use crate::types::DeviceAddress;

use super::controller_config::ControllerConfig;
use super::device_record::DeviceRecord;

/// Front-end facing controller for a set of fans.
///
/// A `FanController` owns one telemetry listener and one state cache for a
/// fixed [`DeviceRegistry`]. Commands go out immediately and never touch the
/// cache: a fan's new state becomes visible only when the fan broadcasts it.
///
/// # Examples
///
/// ```no_run
/// use atomberg_lib::command::CommandDelta;
/// use atomberg_lib::manager::{ControllerConfig, FanController};
/// use atomberg_lib::registry::DeviceRegistry;
///
/// #[tokio::main]
/// async fn main() -> atomberg_lib::Result<()> {
///     let registry = DeviceRegistry::builder()
///         .device("Sofa Fan", "192.168.29.14".parse().unwrap())
///         .build()?;
///     let controller = FanController::new(registry, ControllerConfig::default());
///
///     let mut updates = controller.on_state_changed();
///     controller.start_listening().await?;
///
///     controller
///         .request_change("Sofa Fan", &CommandDelta::new().with_speed(4))
///         .await?;
///
///     if let Some(update) = updates.next_state().await {
///         println!("{}: {}", update.display_name(), update.state);
///     }
///
///     controller.stop_listening().await;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct FanController {
    registry: Arc<DeviceRegistry>,
    config: ControllerConfig,
    cache: StateCache,
    sender: CommandSender,
    listener: BroadcastListener,
}

impl FanController {
    /// Creates a controller. The listener is not started.
    #[must_use]
    pub fn new(registry: DeviceRegistry, config: ControllerConfig) -> Self {
        let registry = Arc::new(registry);
        let cache = StateCache::new(EventBus::new());
        let listener = BroadcastListener::new(
            config.listener_config(),
            Arc::clone(&registry),
            cache.clone(),
        );

        Self {
            registry,
            config,
            cache,
            sender: CommandSender::new(),
            listener,
        }
    }

    // ========== Devices ==========

    /// Returns device names in registration order.
    #[must_use]
    pub fn list_devices(&self) -> Vec<String> {
        self.registry
            .names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Returns the last broadcast state of a named fan.
    ///
    /// `None` if the name is unknown or nothing has been received yet.
    #[must_use]
    pub fn current_state(&self, name: &str) -> Option<DeviceState> {
        let device = self.registry.get(name)?;
        self.cache.get(device.address().ip())
    }

    /// Returns when the last broadcast from a named fan arrived.
    #[must_use]
    pub fn last_updated(&self, name: &str) -> Option<DateTime<Utc>> {
        let device = self.registry.get(name)?;
        self.cache
            .entry(device.address().ip())
            .map(|entry| entry.updated_at)
    }

    /// Returns a snapshot of a named fan.
    #[must_use]
    pub fn record(&self, name: &str) -> Option<DeviceRecord> {
        self.registry.get(name).map(|device| self.record_for(device))
    }

    /// Returns snapshots of every registered fan in registration order.
    #[must_use]
    pub fn devices(&self) -> Vec<DeviceRecord> {
        self.registry
            .devices()
            .iter()
            .map(|device| self.record_for(device))
            .collect()
    }

    fn record_for(&self, device: &RegisteredDevice) -> DeviceRecord {
        let entry = self.cache.entry(device.address().ip());
        DeviceRecord {
            name: device.name().to_string(),
            address: self.command_address(device.address()),
            last_known_state: entry.map(|e| e.state),
            last_updated: entry.map(|e| e.updated_at),
        }
    }

    // ========== Commands ==========

    /// Sends a command to a named fan.
    ///
    /// The command is validated before anything is sent. Success means the
    /// datagram left this host; the fan does not acknowledge it.
    ///
    /// # Errors
    ///
    /// Returns `Error::DeviceNotFound` for an unknown name, `Error::Value` for
    /// an out-of-range delta, or `Error::Send` if the transmit failed.
    pub async fn request_change(&self, name: &str, delta: &CommandDelta) -> Result<(), Error> {
        let address = self.registry.resolve_address(name)?;
        delta.validate()?;

        tracing::debug!(device = %name, command = %delta, "Requesting fan change");
        self.sender
            .send(self.command_address(address), delta)
            .await
    }

    /// Flips the power of a named fan based on its last broadcast state.
    ///
    /// # Errors
    ///
    /// Returns `Error::StateUnknown` if no broadcast has been received from
    /// this fan, plus the errors of [`request_change`](Self::request_change).
    pub async fn toggle_power(&self, name: &str) -> Result<(), Error> {
        let state = self.known_state(name)?;
        self.request_change(name, &CommandDelta::new().with_power(!state.power()))
            .await
    }

    /// Flips the LED of a named fan based on its last broadcast state.
    ///
    /// # Errors
    ///
    /// See [`toggle_power`](Self::toggle_power).
    pub async fn toggle_led(&self, name: &str) -> Result<(), Error> {
        let state = self.known_state(name)?;
        self.request_change(name, &CommandDelta::new().with_led(!state.led()))
            .await
    }

    /// Flips sleep mode of a named fan based on its last broadcast state.
    ///
    /// # Errors
    ///
    /// See [`toggle_power`](Self::toggle_power).
    pub async fn toggle_sleep(&self, name: &str) -> Result<(), Error> {
        let state = self.known_state(name)?;
        self.request_change(name, &CommandDelta::new().with_sleep(!state.sleep()))
            .await
    }

    /// Moves the speed of a named fan by `steps`, saturating at 0 and 6.
    ///
    /// The new absolute speed is computed from the last broadcast state and
    /// sent as a `speed` command.
    ///
    /// # Errors
    ///
    /// See [`toggle_power`](Self::toggle_power).
    pub async fn step_speed(&self, name: &str, steps: i8) -> Result<(), Error> {
        let state = self.known_state(name)?;
        let target = state.speed().step(steps);
        self.request_change(name, &CommandDelta::new().with_speed(target.value()))
            .await
    }

    fn known_state(&self, name: &str) -> Result<DeviceState, Error> {
        let address = self.registry.resolve_address(name)?;
        self.cache
            .get(address.ip())
            .ok_or_else(|| Error::StateUnknown(name.to_string()))
    }

    fn command_address(&self, address: DeviceAddress) -> DeviceAddress {
        match self.config.command_port {
            Some(port) => address.with_port(port),
            None => address,
        }
    }

    // ========== Telemetry ==========

    /// Subscribes to state updates and listener events published from now on.
    #[must_use]
    pub fn on_state_changed(&self) -> Subscription {
        self.cache.subscribe()
    }

    /// Starts the telemetry listener.
    ///
    /// # Errors
    ///
    /// Returns `Error::Bind` if the telemetry port cannot be bound. The
    /// listener stays stopped and the call can be retried.
    pub async fn start_listening(&self) -> Result<SocketAddr, Error> {
        self.listener.start().await
    }

    /// Stops the telemetry listener and waits for its socket to close.
    pub async fn stop_listening(&self) {
        self.listener.stop().await;
    }

    /// Returns the listener lifecycle state.
    #[must_use]
    pub fn listener_state(&self) -> ListenerState {
        self.listener.state()
    }

    /// Returns telemetry counters.
    #[must_use]
    pub fn diagnostics(&self) -> DiagnosticSnapshot {
        self.listener.diagnostics()
    }

    // ========== Components ==========

    /// Returns the device registry.
    #[must_use]
    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    /// Returns the state cache.
    #[must_use]
    pub fn cache(&self) -> &StateCache {
        &self.cache
    }

    /// Returns the controller configuration.
    #[must_use]
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }
}
