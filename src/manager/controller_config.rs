// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Controller configuration.

use std::net::{Ipv4Addr, SocketAddr};

use crate::protocol::{DEFAULT_MAX_DATAGRAM_SIZE, DEFAULT_TELEMETRY_PORT, ListenerConfig};
use crate::telemetry::DEFAULT_STATE_FIELD;

/// Settings for a [`FanController`](super::FanController).
///
/// # Examples
///
/// ```
/// use atomberg_lib::manager::ControllerConfig;
///
/// let config = ControllerConfig::default()
///     .with_telemetry_bind("0.0.0.0:15625".parse().unwrap())
///     .with_max_datagram_size(512);
///
/// assert_eq!(config.telemetry_bind.port(), 15625);
/// assert_eq!(config.command_port, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Command port used for every device, replacing the registered ports.
    ///
    /// `None` keeps each device's own port (5600 unless registered otherwise).
    pub command_port: Option<u16>,
    /// Local address the telemetry listener binds.
    pub telemetry_bind: SocketAddr,
    /// Receive buffer size per telemetry datagram.
    pub max_datagram_size: usize,
    /// JSON field holding the packed state in telemetry.
    pub state_field: String,
}

impl ControllerConfig {
    /// Sends every command to `port` instead of the registered port.
    #[must_use]
    pub fn with_command_port(mut self, port: u16) -> Self {
        self.command_port = Some(port);
        self
    }

    /// Sets the telemetry bind address.
    #[must_use]
    pub fn with_telemetry_bind(mut self, addr: SocketAddr) -> Self {
        self.telemetry_bind = addr;
        self
    }

    /// Sets the telemetry receive buffer size.
    #[must_use]
    pub fn with_max_datagram_size(mut self, size: usize) -> Self {
        self.max_datagram_size = size.max(1);
        self
    }

    /// Sets the telemetry state field name.
    #[must_use]
    pub fn with_state_field(mut self, field: impl Into<String>) -> Self {
        self.state_field = field.into();
        self
    }

    pub(crate) fn listener_config(&self) -> ListenerConfig {
        ListenerConfig::default()
            .with_bind_addr(self.telemetry_bind)
            .with_max_datagram_size(self.max_datagram_size)
            .with_state_field(self.state_field.clone())
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            command_port: None,
            telemetry_bind: (Ipv4Addr::UNSPECIFIED, DEFAULT_TELEMETRY_PORT).into(),
            max_datagram_size: DEFAULT_MAX_DATAGRAM_SIZE,
            state_field: DEFAULT_STATE_FIELD.to_string(),
        }
    }
}
